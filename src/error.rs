//! Scan errors. Each is scoped to one scan attempt.

use std::fmt;

use serde::Serialize;

/// Pipeline stage, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Recognize,
    Parse,
    Match,
    Score,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Recognize => "recognize",
            Stage::Parse => "parse",
            Stage::Match => "match",
            Stage::Score => "score",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by a scan session. `Display` is the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("No image selected")]
    MissingInput,

    #[error("Couldn't access camera. Please check permissions.")]
    CameraAccess { detail: String },

    #[error("Failed to extract text from image")]
    OcrFailure { detail: String },

    #[error("Scan failed during {stage}: {message}")]
    Stage { stage: Stage, message: String },
}

impl ScanError {
    /// Underlying cause, for logs. Not shown to users.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ScanError::CameraAccess { detail } | ScanError::OcrFailure { detail } => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(ScanError::MissingInput.to_string(), "No image selected");
        let ocr = ScanError::OcrFailure {
            detail: "tesseract exited with 1".to_string(),
        };
        assert_eq!(ocr.to_string(), "Failed to extract text from image");
        assert_eq!(ocr.detail(), Some("tesseract exited with 1"));
        let stage = ScanError::Stage {
            stage: Stage::Recognize,
            message: "confidence is NaN".to_string(),
        };
        assert_eq!(stage.to_string(), "Scan failed during recognize: confidence is NaN");
    }
}
