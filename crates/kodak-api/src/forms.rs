/// A form field counts as present only if it has non-whitespace content.
/// Returns the trimmed value.
pub fn required(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Passwords are taken verbatim; only an empty one is rejected.
pub fn required_secret(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}
