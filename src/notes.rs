//! Markdown notes with a delimited metadata header.
//!
//! Format:
//!
//! ```text
//! ---
//! Title: <title>
//! Date Created: <timestamp>
//! Last Modified: <timestamp>
//! ---
//!
//! <body>
//! ```
//!
//! `Date Created` is written once and preserved across saves;
//! `Last Modified` is rewritten on every save.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DELIMITER: &str = "---";
const DEFAULT_TITLE: &str = "Untitled";

#[derive(thiserror::Error, Debug)]
pub enum NoteError {
    #[error("no metadata header found (expected a block delimited by --- lines)")]
    MissingMetadata,
    #[error("reading or writing note file")]
    Io(#[from] std::io::Error),
    #[error("pdf conversion failed: {0}")]
    PdfConversion(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDocument {
    pub title: String,
    pub created: String,
    pub modified: String,
    pub body: String,
}

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Serializes a note. The body is trimmed of surrounding whitespace; all
/// three header fields are always written.
pub fn encode(doc: &NoteDocument) -> String {
    format!(
        "---\nTitle: {}\nDate Created: {}\nLast Modified: {}\n---\n\n{}\n",
        doc.title,
        doc.created,
        doc.modified,
        doc.body.trim()
    )
}

/// Parses note text. The header block must sit at the very start of the
/// text; without it the whole parse fails. Fields missing *inside* a
/// present block fall back per field: title to "Untitled", timestamps to
/// `now`.
pub fn decode(text: &str, now: &str) -> Result<NoteDocument, NoteError> {
    let mut lines = text.lines();
    if lines.next().map(str::trim_end) != Some(DELIMITER) {
        return Err(NoteError::MissingMetadata);
    }

    let mut header = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        header.push(line);
    }
    if !closed {
        return Err(NoteError::MissingMetadata);
    }

    let field = |name: &str| {
        header
            .iter()
            .find_map(|line| line.strip_prefix(name))
            .map(|rest| rest.trim().to_string())
    };

    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    Ok(NoteDocument {
        title: field("Title:").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        created: field("Date Created:").unwrap_or_else(|| now.to_string()),
        modified: field("Last Modified:").unwrap_or_else(|| now.to_string()),
        body,
    })
}

/// Writes a note to `path`, merging with any existing file first: an
/// existing `Date Created` survives, `Last Modified` becomes `now`. A
/// fresh path gets both timestamps set to `now`.
pub fn save_note(path: &Path, title: &str, body: &str, now: &str) -> Result<NoteDocument, NoteError> {
    let created = match fs::read_to_string(path) {
        Ok(existing) => decode(&existing, now)
            .map(|doc| doc.created)
            .unwrap_or_else(|_| now.to_string()),
        Err(_) => now.to_string(),
    };
    let title = title.trim();
    let doc = NoteDocument {
        title: if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title.to_string()
        },
        created,
        modified: now.to_string(),
        body: body.trim().to_string(),
    };
    fs::write(path, encode(&doc))?;
    Ok(doc)
}

pub fn open_note(path: &Path) -> Result<NoteDocument, NoteError> {
    let text = fs::read_to_string(path)?;
    decode(&text, &timestamp_now())
}

/// Runs pandoc to produce a sibling `.pdf`. Failure here never touches
/// the already-written markdown file; callers surface it as a warning.
pub fn export_pdf(markdown_path: &Path) -> Result<PathBuf, NoteError> {
    let pdf_path = markdown_path.with_extension("pdf");
    let status = Command::new("pandoc")
        .arg(markdown_path)
        .arg("-o")
        .arg(&pdf_path)
        .status()
        .map_err(|err| NoteError::PdfConversion(err.to_string()))?;
    if !status.success() {
        return Err(NoteError::PdfConversion(format!(
            "pandoc exited with {status}"
        )));
    }
    Ok(pdf_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2025-03-01 10:00:00";

    fn sample() -> NoteDocument {
        NoteDocument {
            title: "Meeting notes".into(),
            created: "2025-01-24 09:15:00".into(),
            modified: "2025-02-01 18:30:00".into(),
            body: "# Agenda\n\n- roadmap\n- hiring".into(),
        }
    }

    #[test]
    fn encode_writes_exact_header() {
        let text = encode(&sample());
        assert!(text.starts_with(
            "---\nTitle: Meeting notes\nDate Created: 2025-01-24 09:15:00\n\
             Last Modified: 2025-02-01 18:30:00\n---\n\n# Agenda\n"
        ));
        assert!(text.ends_with("- hiring\n"));
    }

    #[test]
    fn decode_round_trips_encode() {
        let doc = sample();
        assert_eq!(decode(&encode(&doc), NOW).unwrap(), doc);
    }

    #[test]
    fn decode_without_header_fails() {
        assert!(matches!(
            decode("just some markdown\n", NOW),
            Err(NoteError::MissingMetadata)
        ));
        // An opening delimiter that never closes is no header either.
        assert!(matches!(
            decode("---\nTitle: x\nno closing line\n", NOW),
            Err(NoteError::MissingMetadata)
        ));
        // Header not at the very start does not count.
        assert!(matches!(
            decode("preamble\n---\nTitle: x\n---\n\nbody\n", NOW),
            Err(NoteError::MissingMetadata)
        ));
    }

    #[test]
    fn missing_fields_default_individually() {
        let doc = decode("---\nLast Modified: 2025-02-02 08:00:00\n---\n\nbody\n", NOW).unwrap();
        assert_eq!(doc.title, "Untitled");
        assert_eq!(doc.created, NOW);
        assert_eq!(doc.modified, "2025-02-02 08:00:00");
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn body_is_trimmed_on_encode_and_decode() {
        let mut doc = sample();
        doc.body = "\n\n  text  \n\n".into();
        let decoded = decode(&encode(&doc), NOW).unwrap();
        assert_eq!(decoded.body, "text");
    }
}
