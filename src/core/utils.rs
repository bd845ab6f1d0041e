/// Cuts `text` to at most `max_chars` characters, respecting char boundaries.
///
/// When something was cut, the last character is replaced by an ellipsis so the
/// result still fits in `max_chars`.
///
/// # Example
///
/// ```
/// use mediarelay::core::utils::truncate_chars;
///
/// assert_eq!(truncate_chars("hello", 10), "hello");
/// assert_eq!(truncate_chars("hello world", 5), "hell…");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut result: String = text.chars().take(max_chars - 1).collect();
    result.push('…');
    result
}

/// Builds the media caption: title, a blank line, then a description preview.
///
/// The description is previewed up to `description_preview` characters, and the
/// whole caption is then capped at `max_caption` characters. The two caps are
/// independent: a short title with a long description still hits the outer cap.
///
/// # Example
///
/// ```
/// use mediarelay::core::utils::build_caption;
///
/// assert_eq!(build_caption("Title", "", 1500, 1024), "Title");
/// assert_eq!(build_caption("Title", "Body", 1500, 1024), "Title\n\nBody");
/// ```
pub fn build_caption(title: &str, description: &str, description_preview: usize, max_caption: usize) -> String {
    let title = title.trim();
    let description = description.trim();

    let caption = if description.is_empty() {
        title.to_string()
    } else {
        format!("{}\n\n{}", title, truncate_chars(description, description_preview))
    };

    truncate_chars(&caption, max_caption)
}

/// Formats a byte count as megabytes with one decimal, e.g. `80.0 MB`.
///
/// # Example
///
/// ```
/// use mediarelay::core::utils::format_megabytes;
///
/// assert_eq!(format_megabytes(50 * 1024 * 1024), "50.0 MB");
/// ```
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Replaces characters that are unsafe in file names.
///
/// Path separators, Windows-reserved characters and control characters become `_`,
/// double quotes become single quotes. Leading/trailing dots and whitespace are
/// trimmed; an empty result becomes `unnamed`.
///
/// # Example
///
/// ```
/// use mediarelay::core::utils::escape_filename;
///
/// assert_eq!(escape_filename("song/name*.mp4"), "song_name_.mp4");
/// assert_eq!(escape_filename(" ... "), "unnamed");
/// ```
pub fn escape_filename(filename: &str) -> String {
    let result: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            '"' => '\'',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let result = result.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if result.is_empty() {
        "unnamed".to_string()
    } else {
        result.to_string()
    }
}
