//! Error reports with hints and the underlying cause chain.

use std::error::Error;

use pod_core::error::PodError;

use super::colors::ColorSupport;

/// Renders `PodError`s for the terminal
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Message, hint, then each cause on its own line
    pub fn format_error(&self, error: &PodError) -> String {
        let mut output = format!("{}: {}", self.colors.red("error"), error);

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("\n{}: {}", self.colors.dim("help"), suggestion));
        }

        let mut source = error.source();
        while let Some(err) = source {
            output.push_str(&format!("\n{}: {}", self.colors.dim("caused by"), err));
            source = err.source();
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn plain() -> ErrorFormatter {
        ErrorFormatter::with_colors(ColorSupport::disabled())
    }

    #[test]
    fn test_parse_error_without_hint() {
        let err = PodError::parse("/specs/Zip/1.0/Zip.podspec.toml", "unknown key `nmae`");
        assert_eq!(
            plain().format_error(&err),
            "error: Failed to parse /specs/Zip/1.0/Zip.podspec.toml: unknown key `nmae`"
        );
    }

    #[test]
    fn test_download_error_shows_hint_and_cause() {
        let err = PodError::Download {
            package: "Zip".to_string(),
            version: "1.0".to_string(),
            destination: PathBuf::from("/project/Pods/Zip-1.0"),
            message: "connection reset".to_string(),
            source: Some("connection reset".into()),
        };
        let report = plain().format_error(&err);

        assert!(report.starts_with("error: Failed to download Zip 1.0"));
        assert!(report.contains("/project/Pods/Zip-1.0"));
        assert!(report.contains("\nhelp: "));
        assert!(report.ends_with("caused by: connection reset"));
    }
}
