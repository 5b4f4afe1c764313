//! Host-native text form of artifacts: what an export writes and an import
//! reads.
//!
//! An export is Windows-1252 with CRLF line endings, starting with the
//! kind's header block. An import accepts UTF-8 or Windows-1252, with or
//! without a header; the header (when present) decides the kind and name.

use std::path::Path;

use crate::codepage::{decode_file, encode_windows_1252, Encoding};
use crate::error::{text_io_err, HostError, TextError};
use crate::normalize::{is_header_line, normalize, LINE_TERMINATOR};
use crate::types::{ArtifactKind, ArtifactName};

const CLASS_SIGNATURE: &str = "VERSION 1.0 CLASS";
const FORM_SIGNATURE: &str = "VERSION 5.00";
const NAME_ATTRIBUTE: &str = "Attribute VB_Name";

/// Header lines an export of `kind` starts with.
pub fn export_header(name: &ArtifactName, kind: ArtifactKind) -> Vec<String> {
    let name_line = format!("{NAME_ATTRIBUTE} = \"{}\"", name.0);
    let class_attributes = |predeclared: bool| {
        vec![
            name_line.clone(),
            "Attribute VB_GlobalNameSpace = False".to_owned(),
            "Attribute VB_Creatable = False".to_owned(),
            format!(
                "Attribute VB_PredeclaredId = {}",
                if predeclared { "True" } else { "False" }
            ),
            "Attribute VB_Exposed = False".to_owned(),
        ]
    };

    match kind {
        ArtifactKind::StandardModule | ArtifactKind::Other => vec![name_line],
        ArtifactKind::ClassModule | ArtifactKind::DocumentModule => {
            let mut lines = vec![
                CLASS_SIGNATURE.to_owned(),
                "BEGIN".to_owned(),
                "  MultiUse = -1  'True".to_owned(),
                "END".to_owned(),
            ];
            lines.extend(class_attributes(kind == ArtifactKind::DocumentModule));
            lines
        }
        ArtifactKind::FormModule => {
            let mut lines = vec![FORM_SIGNATURE.to_owned()];
            lines.extend(class_attributes(true));
            lines
        }
    }
}

/// Full export text (header + body) with CRLF line endings.
pub fn render_export(name: &ArtifactName, kind: ArtifactKind, body: &str) -> String {
    let mut lines = export_header(name, kind);
    lines.extend(body.lines().map(str::to_owned));
    let mut text = lines.join(LINE_TERMINATOR);
    text.push_str(LINE_TERMINATOR);
    text
}

/// Write the export of an artifact to `destination` in the host code page.
pub fn write_export(
    destination: &Path,
    name: &ArtifactName,
    kind: ArtifactKind,
    body: &str,
) -> Result<(), HostError> {
    let text = render_export(name, kind, body);
    let bytes = encode_windows_1252(&text).map_err(|ch| HostError::Unencodable {
        name: name.clone(),
        ch,
    })?;
    std::fs::write(destination, bytes).map_err(|e| crate::error::io_err(destination, e))
}

/// An artifact as recovered from an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedArtifact {
    pub name: ArtifactName,
    pub kind: ArtifactKind,
    pub body: String,
}

/// Read an import file: UTF-8 first, Windows-1252 as a fallback.
pub fn read_import(path: &Path) -> Result<ImportedArtifact, TextError> {
    let bytes = std::fs::read(path).map_err(|e| text_io_err(path, e))?;
    let text = match decode_file(path, &bytes, Encoding::Utf8) {
        Ok(text) => text,
        Err(_) => decode_file(path, &bytes, Encoding::Windows1252)?,
    };
    Ok(parse_import(path, &text))
}

/// Derive kind, name and body from import text.
///
/// Import never produces a document module: those only come into existence
/// with the document element they belong to.
pub fn parse_import(path: &Path, text: &str) -> ImportedArtifact {
    let header: Vec<&str> = text.lines().take_while(|line| is_header_line(line)).collect();

    let kind = match header.first().map(|line| line.trim()) {
        Some(first) if first.starts_with(CLASS_SIGNATURE) => ArtifactKind::ClassModule,
        Some(first) if first.starts_with(FORM_SIGNATURE) => ArtifactKind::FormModule,
        _ => ArtifactKind::StandardModule,
    };

    let name = header
        .iter()
        .find_map(|line| name_attribute(line))
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    ImportedArtifact {
        name: ArtifactName::from(name),
        kind,
        body: normalize(text),
    }
}

fn name_attribute(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(NAME_ATTRIBUTE)?;
    let value = rest.trim_start().strip_prefix('=')?.trim();
    let value = value.trim_matches('"');
    (!value.is_empty()).then(|| value.to_owned())
}
