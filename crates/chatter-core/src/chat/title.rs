//! Conversation titles.

/// Characters kept from the first message when deriving a title.
pub const DERIVED_TITLE_CHARS: usize = 50;

/// Longest title accepted on create or rename.
pub const MAX_TITLE_CHARS: usize = 200;

/// Derive a title from the first message of a conversation.
///
/// Takes the first 50 characters of the trimmed content and appends `...`
/// when anything was cut off.
pub fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    let mut title: String = trimmed.chars().take(DERIVED_TITLE_CHARS).collect();
    if trimmed.chars().count() > DERIVED_TITLE_CHARS {
        title.push_str("...");
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_kept_whole() {
        assert_eq!(derive_title("  what is 12 x 4?  "), "what is 12 x 4?");
    }

    #[test]
    fn test_long_content_truncated() {
        let content = "a".repeat(80);
        let title = derive_title(&content);
        assert_eq!(title, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_exactly_fifty_chars_has_no_ellipsis() {
        let content = "b".repeat(50);
        assert_eq!(derive_title(&content), content);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let content = "é".repeat(60);
        let title = derive_title(&content);
        assert_eq!(title.chars().count(), 53);
    }
}
