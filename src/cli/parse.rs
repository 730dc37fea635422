use essay_cv_core::config::InputKind;
use essay_cv_core::format::OutputFormat;

/// Parse the token view from string
pub fn parse_input_kind(s: &str) -> std::result::Result<InputKind, String> {
    s.parse::<InputKind>().map_err(|e| e.to_string())
}

/// Parse output format from string
pub fn parse_output_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}
