//! Header stripping for artifact text.
//!
//! Exported artifacts start with host metadata (`VERSION`, `BEGIN` … `END`
//! blocks and `Attribute` lines). Everything from the first line that is not
//! such a header is code and is kept verbatim, including header-looking lines
//! further down.

use std::path::{Path, PathBuf};

use crate::codepage::{decode_file, Encoding};
use crate::error::{text_io_err, TextError};

/// Line prefixes that mark host metadata. Matched after trimming the line.
pub const RESERVED_PREFIXES: [&str; 5] = ["Attribute ", "VERSION ", "BEGIN", "END", "MultiUse "];

/// The host's native line terminator.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Whether `line` is a host metadata line.
pub fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// Strip leading header lines and re-join with [`LINE_TERMINATOR`].
///
/// The code block is trimmed. When every line is a header the full line set
/// is returned as-is, without trimming.
pub fn normalize(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    match lines.iter().position(|line| !is_header_line(line)) {
        Some(start) => lines[start..].join(LINE_TERMINATOR).trim().to_owned(),
        None => lines.join(LINE_TERMINATOR),
    }
}

/// Result of post-processing an exported file in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedFile {
    pub path: PathBuf,
    /// Header lines were removed (not only re-encoded).
    pub stripped: bool,
}

/// Rewrite a freshly exported file from Windows-1252 to UTF-8.
///
/// With `strip_header` the text also goes through [`normalize`]. A decoding
/// failure leaves the file untouched and is returned to the caller.
pub fn clean_exported_file(path: &Path, strip_header: bool) -> Result<CleanedFile, TextError> {
    let bytes = std::fs::read(path).map_err(|e| text_io_err(path, e))?;
    let text = decode_file(path, &bytes, Encoding::Windows1252)?;
    let cleaned = if strip_header { normalize(&text) } else { text };

    let tmp = PathBuf::from(format!("{}.vbasync.tmp", path.display()));
    std::fs::write(&tmp, cleaned.as_bytes()).map_err(|e| text_io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(text_io_err(path, e));
    }

    Ok(CleanedFile {
        path: path.to_path_buf(),
        stripped: strip_header,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLASS_EXPORT: &str = "VERSION 1.0 CLASS\r\n\
BEGIN\r\n\
  MultiUse = -1  'True\r\n\
END\r\n\
Attribute VB_Name = \"Invoice\"\r\n\
Attribute VB_PredeclaredId = False\r\n\
Option Explicit\r\n\
\r\n\
Public Total As Double\r\n";

    #[test]
    fn strips_class_header() {
        assert_eq!(
            normalize(CLASS_EXPORT),
            "Option Explicit\r\n\r\nPublic Total As Double"
        );
    }

    #[test]
    fn indented_header_lines_are_recognized() {
        assert!(is_header_line("  MultiUse = -1  'True"));
        assert!(is_header_line("\tAttribute VB_Name = \"X\""));
        assert!(!is_header_line("' Attribute VB_Name"));
        assert!(!is_header_line("Begin {C62A69F0-16DC-11CE-9E98-00AA00574A4F} Form1"));
    }

    #[test]
    fn later_header_lookalikes_are_kept() {
        let raw = "Attribute VB_Name = \"M\"\nSub A()\nEND\nAttribute x\nEnd Sub\n";
        assert_eq!(normalize(raw), "Sub A()\r\nEND\r\nAttribute x\r\nEnd Sub");
    }

    #[test]
    fn blank_line_ends_header_scan_and_is_trimmed() {
        let raw = "Attribute VB_Name = \"M\"\n\n\nSub A()\nEnd Sub\n\n";
        assert_eq!(normalize(raw), "Sub A()\r\nEnd Sub");
    }

    #[test]
    fn all_header_input_is_returned_untrimmed() {
        let raw = "  Attribute VB_Name = \"M\"\nVERSION 1.0 CLASS  ";
        assert_eq!(normalize(raw), "  Attribute VB_Name = \"M\"\r\nVERSION 1.0 CLASS  ");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn idempotent_on_header_free_text() {
        for raw in [
            "Sub A()\nEnd Sub",
            "\n\n  Sub A()\r\n    x = 1\r\nEnd Sub  \n",
            "Option Explicit",
            "   ",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn clean_exported_file_strips_and_transcodes() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("Module1.bas");
        std::fs::write(
            &path,
            b"Attribute VB_Name = \"Module1\"\r\nSub Gr\xFC\xDFe()\r\nEnd Sub\r\n",
        )
        .expect("write");

        let cleaned = clean_exported_file(&path, true).expect("clean");
        assert!(cleaned.stripped);
        let on_disk = std::fs::read_to_string(&path).expect("utf-8 on disk");
        assert_eq!(on_disk, "Sub Grüße()\r\nEnd Sub");
        assert!(!PathBuf::from(format!("{}.vbasync.tmp", path.display())).exists());
    }

    #[test]
    fn clean_exported_file_keeps_header_when_asked() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("Invoice.cls");
        std::fs::write(&path, CLASS_EXPORT).expect("write");

        clean_exported_file(&path, false).expect("clean");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), CLASS_EXPORT);
    }

    #[test]
    fn clean_exported_file_reports_undecodable_bytes_and_leaves_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("Broken.bas");
        let original = b"Attribute VB_Name = \"Broken\"\r\nx = \x81\r\n".to_vec();
        std::fs::write(&path, &original).expect("write");

        let err = clean_exported_file(&path, true).unwrap_err();
        assert!(matches!(err, TextError::Decode { byte: 0x81, .. }), "got: {err}");
        assert_eq!(std::fs::read(&path).expect("read"), original);
    }
}
