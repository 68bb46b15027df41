//! Text normalization for the classification pipeline.
//!
//! URL extraction runs on the raw message; only the classifier sees
//! normalized text.

/// Normalize raw message text for feature extraction.
///
/// Lowercases the input and replaces every character that is not a Unicode
/// letter, digit or underscore with a space. Whitespace runs collapse to one
/// space and the ends are trimmed. Total for any input (the empty string maps
/// to the empty string) and idempotent.
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        let keep = ch.is_alphanumeric() || ch == '_';
        if keep {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            // Control characters, punctuation and whitespace all collapse
            // into a single separating space.
            pending_space = true;
        }
    }

    out
}

/// Split normalized text into word tokens.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_symbol_stripping() {
        assert_eq!(
            preprocess("URGENT!!! Verify your account NOW."),
            "urgent verify your account now"
        );
    }

    #[test]
    fn test_whitespace_collapsing() {
        assert_eq!(preprocess("  hello\t\nworld   again "), "hello world again");
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess("!!! ??? ..."), "");
    }

    #[test]
    fn test_unicode_input_is_kept() {
        assert_eq!(preprocess("Panam jeyikum! 100% guarantee"), "panam jeyikum 100 guarantee");
        assert_eq!(preprocess("вам приз!"), "вам приз");
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(preprocess("win\u{0000}\u{0007}now"), "win now");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "URGENT! Your bank account has been suspended.",
            "  mixed   Casing \t and\npunctuation!!!",
            "",
            "already normalized text",
        ];
        for s in &samples {
            let once = preprocess(s);
            assert_eq!(preprocess(&once), once);
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("free prize now"), vec!["free", "prize", "now"]);
        assert!(tokenize("").is_empty());
    }
}
