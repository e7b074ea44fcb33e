//! Query text pre-processing.
//!
//! Shared by both text-search strategies and by the postcode and house-number
//! lookups: digit normalization, quote stripping, script detection and
//! tokenization.

use std::collections::HashSet;

/// Minimum token length (in characters) kept by [`query_tokens`].
pub const MIN_TOKEN_CHARS: usize = 2;

/// Maximum number of tokens kept by [`query_tokens`].
pub const MAX_QUERY_TOKENS: usize = 5;

/// Arabic comma, used as a separator alongside ASCII comma.
const ARABIC_COMMA: char = '\u{060C}';

/// Maps Arabic-Indic (U+0660..U+0669) and Extended Arabic-Indic / Persian
/// (U+06F0..U+06F9) digits to ASCII digits. Other characters pass through.
///
/// # Example
///
/// ```
/// use tilegeo::text::normalize_digits;
///
/// assert_eq!(normalize_digits("١٣٨٤٧"), "13847");
/// assert_eq!(normalize_digits("۱۳۸۴۷"), "13847");
/// ```
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => ascii_digit(c as u32 - 0x0660),
            '\u{06F0}'..='\u{06F9}' => ascii_digit(c as u32 - 0x06F0),
            other => other,
        })
        .collect()
}

fn ascii_digit(offset: u32) -> char {
    char::from_digit(offset, 10).unwrap_or('0')
}

/// Strips quote characters, normalizes digits and collapses whitespace.
pub fn clean_query(input: &str) -> String {
    let stripped: String = normalize_digits(input)
        .chars()
        .filter(|c| !is_quote(*c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_quote(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '`' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}'
    )
}

/// Returns true if any character falls in an Arabic Unicode block.
pub fn has_arabic(input: &str) -> bool {
    input.chars().any(is_arabic_char)
}

fn is_arabic_char(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}'
    )
}

/// Splits on whitespace, ASCII comma and Arabic comma, lowercasing each piece.
///
/// Empty pieces are dropped. Lowercasing is a no-op for Arabic script.
pub fn tokenize(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ARABIC_COMMA)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Tokens used by the fallback relevance gate.
///
/// Drops tokens shorter than [`MIN_TOKEN_CHARS`] and keeps at most
/// [`MAX_QUERY_TOKENS`], preserving query order.
pub fn query_tokens(cleaned: &str) -> Vec<String> {
    tokenize(cleaned)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .take(MAX_QUERY_TOKENS)
        .collect()
}

/// Intersection-over-union of the token sets of two strings, in `[0, 1]`.
///
/// Two empty token sets score 0.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<String> = tokenize(a).into_iter().collect();
    let right: HashSet<String> = tokenize(b).into_iter().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_arabic_indic_digits() {
        assert_eq!(normalize_digits("١٣٨٤٧"), "13847");
    }

    #[test]
    fn test_normalize_persian_digits() {
        assert_eq!(normalize_digits("۱۳۸۴۷"), "13847");
    }

    #[test]
    fn test_normalize_mixed_text_untouched() {
        assert_eq!(normalize_digits("Riyadh ١٢ st"), "Riyadh 12 st");
    }

    #[test]
    fn test_clean_query_strips_quotes_and_whitespace() {
        assert_eq!(clean_query("  \"King  Fahd\" 'Road'  "), "King Fahd Road");
    }

    #[test]
    fn test_has_arabic() {
        assert!(has_arabic("طريق الملك فهد"));
        assert!(has_arabic("King Fahd طريق"));
        assert!(!has_arabic("King Fahd Road"));
        assert!(!has_arabic(""));
    }

    #[test]
    fn test_tokenize_separators() {
        assert_eq!(
            tokenize("Olaya,Riyadh  الرياض،حي"),
            vec!["olaya", "riyadh", "الرياض", "حي"]
        );
    }

    #[test]
    fn test_query_tokens_filters_short_and_caps() {
        let tokens = query_tokens("a bb cc dd ee ff gg");
        assert_eq!(tokens, vec!["bb", "cc", "dd", "ee", "ff"]);
    }

    #[test]
    fn test_query_tokens_empty() {
        assert!(query_tokens("").is_empty());
        assert!(query_tokens("a b c").is_empty());
    }

    #[test]
    fn test_token_similarity() {
        assert_eq!(token_similarity("king fahd road", "King Fahd Road"), 1.0);
        assert_eq!(token_similarity("king fahd", "fahd road"), 1.0 / 3.0);
        assert_eq!(token_similarity("", ""), 0.0);
        assert_eq!(token_similarity("olaya", "malaz"), 0.0);
    }

    proptest! {
        #[test]
        fn prop_normalized_digits_are_ascii(n in 0u64..10_000_000) {
            let latin = n.to_string();
            let arabic: String = latin
                .chars()
                .map(|c| char::from_u32(0x0660 + c.to_digit(10).unwrap()).unwrap())
                .collect();
            let persian: String = latin
                .chars()
                .map(|c| char::from_u32(0x06F0 + c.to_digit(10).unwrap()).unwrap())
                .collect();
            prop_assert_eq!(normalize_digits(&arabic), latin.clone());
            prop_assert_eq!(normalize_digits(&persian), latin.clone());
            prop_assert_eq!(normalize_digits(&latin), latin);
        }

        #[test]
        fn prop_similarity_bounded(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
            let s = token_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
            prop_assert_eq!(s, token_similarity(&b, &a));
        }
    }
}
