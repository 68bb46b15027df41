//! URL candidate extraction from raw (un-normalized) message text.
//!
//! Three URL shapes are recognized, in priority order: fully-qualified
//! scheme URLs, bare `www.`/`domain.tld` strings, and known shortener hosts
//! embedded mid-sentence. Overlapping matches are resolved so each character
//! span is claimed by at most one candidate.

use regex::Regex;
use std::collections::HashSet;

/// Sentence punctuation excluded from the end of a match.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', ')'];

/// A URL-shaped substring and its byte offset in the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCandidate {
    pub url: String,
    pub offset: usize,
}

pub struct UrlExtractor {
    /// Patterns in descending priority; earlier patterns claim spans first.
    patterns: Vec<Regex>,
}

impl Default for UrlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlExtractor {
    pub fn new() -> Self {
        let patterns = vec![
            // 1. Fully-qualified URLs.
            Regex::new(r#"https?://[^\s<>"']+"#).unwrap(),
            // 2. Bare www. or domain.tld strings without a scheme.
            Regex::new(
                r#"(?:www\.|[a-zA-Z0-9-]+\.(?:com|org|net|in|co|io|ai|app|xyz|info|biz|tk|ml|ga|cf|gq))[^\s<>"']*"#,
            )
            .unwrap(),
            // 3. Shortener hosts, even mid-sentence.
            Regex::new(r"(?:bit\.ly|tinyurl\.com|goo\.gl|ow\.ly|t\.co|cutt\.ly|is\.gd)/[A-Za-z0-9]+")
                .unwrap(),
        ];
        Self { patterns }
    }

    /// Extract URL candidates in order of first occurrence. Calling this
    /// repeatedly with identical input yields identical output.
    pub fn extract(&self, raw_text: &str) -> Vec<UrlCandidate> {
        let mut matches: Vec<Span> = Vec::new();
        for (priority, pattern) in self.patterns.iter().enumerate() {
            for m in pattern.find_iter(raw_text) {
                matches.push(Span {
                    start: m.start(),
                    end: m.end(),
                    priority,
                });
            }
        }

        // Earliest start wins; at equal start the higher-priority and then
        // longer match claims the span.
        matches.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(a.priority.cmp(&b.priority))
                .then(b.end.cmp(&a.end))
        });

        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for span in matches {
            if claimed
                .iter()
                .any(|&(start, end)| span.start < end && start < span.end)
            {
                continue;
            }
            claimed.push((span.start, span.end));

            let url = raw_text[span.start..span.end]
                .trim_end_matches(TRAILING_PUNCTUATION)
                .to_string();
            if url.is_empty() {
                continue;
            }
            // De-duplicate by exact string within one message.
            if seen.insert(url.clone()) {
                candidates.push(UrlCandidate {
                    url,
                    offset: span.start,
                });
            }
        }

        candidates
    }
}

struct Span {
    start: usize,
    end: usize,
    priority: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(text: &str) -> Vec<String> {
        UrlExtractor::new()
            .extract(text)
            .into_iter()
            .map(|c| c.url)
            .collect()
    }

    #[test]
    fn test_fully_qualified_url() {
        assert_eq!(
            urls("click http://secure-bank-verify.tk/login to restore"),
            vec!["http://secure-bank-verify.tk/login"]
        );
    }

    #[test]
    fn test_bare_domain_and_www() {
        assert_eq!(
            urls("visit www.example-shop.com/deals or promo-site.xyz/win today"),
            vec!["www.example-shop.com/deals", "promo-site.xyz/win"]
        );
    }

    #[test]
    fn test_shortener_mid_sentence() {
        assert_eq!(urls("pay the fee to bit.ly/claim123 now"), vec!["bit.ly/claim123"]);
    }

    #[test]
    fn test_trailing_punctuation_excluded() {
        assert_eq!(urls("go to http://example.com/x."), vec!["http://example.com/x"]);
        assert_eq!(urls("go to (http://example.com/x),"), vec!["http://example.com/x"]);
        assert_eq!(urls("really, bit.ly/abc!"), vec!["bit.ly/abc"]);
    }

    #[test]
    fn test_overlapping_match_claimed_once() {
        // The scheme URL contains both a bare-domain shape and a shortener
        // shape; only the full match survives.
        assert_eq!(
            urls("see https://tinyurl.com/abc123 for details"),
            vec!["https://tinyurl.com/abc123"]
        );
    }

    #[test]
    fn test_duplicates_removed_keeping_first() {
        assert_eq!(
            urls("bit.ly/x then again bit.ly/x and bit.ly/y"),
            vec!["bit.ly/x", "bit.ly/y"]
        );
    }

    #[test]
    fn test_order_is_first_occurrence() {
        let found = urls("first www.aaa.com then http://bbb.com then bit.ly/ccc");
        assert_eq!(found, vec!["www.aaa.com", "http://bbb.com", "bit.ly/ccc"]);
    }

    #[test]
    fn test_no_urls() {
        assert!(urls("Hi, how are you? Let's meet tomorrow.").is_empty());
        assert!(urls("").is_empty());
    }

    #[test]
    fn test_extraction_is_restartable() {
        let extractor = UrlExtractor::new();
        let text = "go to http://a.com and www.b.org/c now";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }
}
