//! Document-text extraction for uploaded files.
//!
//! Only plain text and PDF are accepted; anything else is rejected at
//! the boundary, before the pipeline runs.

use crate::error::ExtractError;

/// Supported upload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Plain,
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from the uploaded filename's extension.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let lowered = filename.to_lowercase();
        if lowered.ends_with(".txt") {
            Ok(Self::Plain)
        } else if lowered.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else {
            Err(ExtractError::UnsupportedKind(filename.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Pdf => "pdf",
        }
    }
}

/// Extract raw text from an uploaded document.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Plain => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map(|text| text.trim().to_string())
            .map_err(|e| ExtractError::ExtractionFailed {
                kind: "pdf".into(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kind_from_extension_case_insensitively() {
        assert_eq!(
            DocumentKind::from_filename("email.txt").unwrap(),
            DocumentKind::Plain
        );
        assert_eq!(
            DocumentKind::from_filename("Relatorio.PDF").unwrap(),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn rejects_unsupported_extensions() {
        for name in ["photo.png", "sheet.xlsx", "noextension", "archive.tar.gz"] {
            assert!(matches!(
                DocumentKind::from_filename(name),
                Err(ExtractError::UnsupportedKind(_))
            ));
        }
    }

    #[test]
    fn plain_text_decodes_lossily() {
        let text = extract_text("Olá, preciso de ajuda".as_bytes(), DocumentKind::Plain).unwrap();
        assert_eq!(text, "Olá, preciso de ajuda");

        // Invalid UTF-8 degrades instead of failing.
        let text = extract_text(&[0x4f, 0x6c, 0xff, 0x61], DocumentKind::Plain).unwrap();
        assert!(text.starts_with("Ol"));
    }

    #[test]
    fn malformed_pdf_is_an_extraction_error() {
        let err = extract_text(b"definitely not a pdf", DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, ExtractError::ExtractionFailed { .. }));
    }
}
