//! Turns free-text form input into the lists and optionals the backend expects.

/// Splits on `delimiter`, trims each entry and drops the empty ones.
pub fn split_list(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"Python, Go"` → `["Python", "Go"]`. Used for skills, technologies and user skills.
pub fn comma_list(text: &str) -> Vec<String> {
    split_list(text, ',')
}

/// One entry per line. Used for experience bullets.
pub fn line_list(text: &str) -> Vec<String> {
    split_list(text, '\n')
}

/// Same as `comma_list`, but `None` when nothing is left.
pub fn optional_comma_list(text: &str) -> Option<Vec<String>> {
    Some(comma_list(text)).filter(|v| !v.is_empty())
}

pub fn optional_line_list(text: &str) -> Option<Vec<String>> {
    Some(line_list(text)).filter(|v| !v.is_empty())
}

/// Trimmed text, or `None` for blank input.
pub fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reverse of `optional` for loading server values back into a text field.
pub fn text_of(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
