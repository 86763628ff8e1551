use super::fallback::fallback_suggestions;
use super::prompts::{BULLET, SUGGESTIONS_HEADER};
use super::Category;

/// Most suggestions kept from one answer.
pub const MAX_SUGGESTIONS: usize = 5;

/// Parse the suggestion block out of a generated answer.
///
/// Grammar:
///
/// ```text
/// block  := HEADER ws* NEWLINE line+
/// line   := "• " text NEWLINE?
/// ```
///
/// `HEADER` is [`SUGGESTIONS_HEADER`]. Every occurrence of the header is
/// tried in order and the first one followed by a usable block wins, so an
/// inline mention of the header earlier in the answer is skipped. The block
/// ends at the first line that does not start with the bullet marker. Items
/// are trimmed, empty ones are dropped, and at most [`MAX_SUGGESTIONS`] are
/// returned.
pub fn parse_block(text: &str) -> Vec<String> {
    text.match_indices(SUGGESTIONS_HEADER)
        .map(|(idx, _)| block_after(&text[idx + SUGGESTIONS_HEADER.len()..]))
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

/// Bullet items following one header occurrence.
fn block_after(after: &str) -> Vec<String> {
    // The rest of the header line must be blank.
    let Some(newline) = after.find('\n') else {
        return vec![];
    };
    if !after[..newline].trim().is_empty() {
        return vec![];
    }

    after[newline + 1..]
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .take_while(|line| line.starts_with(BULLET))
        .map(|line| line[BULLET.len()..].trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggestions from a generated answer, or the canned ones for the query
/// when the answer carries none.
pub fn extract(response_text: &str, original_query: &str, category: Category) -> Vec<String> {
    let parsed = parse_block(response_text);
    if parsed.is_empty() {
        fallback_suggestions(original_query, category)
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_three_bullets() {
        let text = "Answer body.\n\n**Related Documentation Search Suggestions:**\n• a\n• b\n• c";
        assert_eq!(extract(text, "q", Category::Security), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "**Related Documentation Search Suggestions:**\n• a\n• b\n• c\n";
        let once = extract(text, "q", Category::Fraud);
        let twice = extract(text, "q", Category::Fraud);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_block_stops_at_first_non_bullet() {
        let text = "**Related Documentation Search Suggestions:**\n\
                    • key rotation\n\
                    • secrets vault\n\
                    \n\
                    • not part of the block";
        assert_eq!(parse_block(text), vec!["key rotation", "secrets vault"]);
    }

    #[test]
    fn test_block_trims_and_drops_empty() {
        let text = "**Related Documentation Search Suggestions:**  \r\n•   padded  \r\n•  \n• last";
        assert_eq!(parse_block(text), vec!["padded", "last"]);
    }

    #[test]
    fn test_block_capped_at_five() {
        let mut text = String::from("**Related Documentation Search Suggestions:**\n");
        for i in 0..8 {
            text.push_str(&format!("• term {}\n", i));
        }
        assert_eq!(parse_block(&text).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_no_header_matches_fallback() {
        let query = "How do we handle chargeback disputes";
        let text = "Here is an answer without any suggestions.\n• stray bullet";
        assert_eq!(
            extract(text, query, Category::Fraud),
            fallback_suggestions(query, Category::Fraud)
        );
    }

    #[test]
    fn test_header_without_bullets_falls_back() {
        let text = "**Related Documentation Search Suggestions:**\nnone today";
        assert_eq!(
            extract(text, "q", Category::Data),
            fallback_suggestions("q", Category::Data)
        );
    }

    #[test]
    fn test_header_with_trailing_text_is_not_a_block() {
        let text = "**Related Documentation Search Suggestions:** see below\n• a";
        assert!(parse_block(text).is_empty());
    }

    #[test]
    fn test_inline_header_mention_is_skipped() {
        let text = "Use the **Related Documentation Search Suggestions:** list below.\n\n\
                    **Related Documentation Search Suggestions:**\n• a\n• b\n";
        assert_eq!(parse_block(text), vec!["a", "b"]);
        assert_eq!(extract(text, "q", Category::Security), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_inputs_do_not_panic() {
        for text in [
            "",
            "**Related Documentation Search Suggestions:**",
            "**Related Documentation Search Suggestions:**\n",
            "**Related Documentation Search Suggestions:**\n•",
            "•••\n**Related",
        ] {
            let got = extract(text, "ünïcödé query text", Category::Identity);
            assert!(got.len() <= MAX_SUGGESTIONS);
        }
    }
}
