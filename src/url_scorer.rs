//! Heuristic URL risk scoring.
//!
//! Each rule is evaluated independently; triggered weights are summed and
//! clamped to 100, and every point traces back to a named reason string.

use crate::config::UrlRuleConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Risk assessment for one URL candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub url: String,
    pub suspicion_score: u32,
    pub is_suspicious: bool,
    pub reasons: Vec<String>,
}

pub struct UrlScorer {
    config: UrlRuleConfig,
}

impl Default for UrlScorer {
    fn default() -> Self {
        Self::new(UrlRuleConfig::default())
    }
}

impl UrlScorer {
    pub fn new(config: UrlRuleConfig) -> Self {
        Self { config }
    }

    /// Score one URL. Total for any input string: candidates the URL parser
    /// rejects fall back to string-level splitting rather than failing.
    pub fn score(&self, url: &str) -> UrlAnalysis {
        let url_lower = url.to_lowercase();
        let parts = UrlParts::parse(&url_lower);

        let mut score: u32 = 0;
        let mut reasons = Vec::new();

        // Phishing keywords in host or path, one hit per distinct keyword.
        let searchable = format!("{}{}", parts.host, parts.path);
        for keyword in &self.config.phishing_keywords {
            if searchable.contains(keyword.to_lowercase().as_str()) {
                score += self.config.keyword_weight;
                reasons.push(format!("Contains keyword: {keyword}"));
            }
        }

        if self.is_shortener(&parts.host) {
            score += self.config.shortener_weight;
            reasons.push("Shortened URL".to_string());
        }

        // Literal @ anywhere: classic host-spoofing trick.
        if url.contains('@') {
            score += self.config.at_symbol_weight;
            reasons.push("Contains @ symbol".to_string());
        }

        // More than one "//" means slashes beyond the scheme separator.
        if url.matches("//").count() > 1 {
            score += self.config.double_slash_weight;
            reasons.push("Multiple slashes".to_string());
        }

        if let Some(tld) = parts.tld() {
            if self.config.suspicious_tlds.iter().any(|t| t == tld) {
                score += self.config.suspicious_tld_weight;
                reasons.push("Suspicious TLD".to_string());
            }
        }

        if is_ipv4_host(&parts.host) {
            score += self.config.ip_host_weight;
            reasons.push("IP address in URL".to_string());
        }

        if url.chars().count() > self.config.max_url_length {
            score += self.config.long_url_weight;
            reasons.push("Unusually long URL".to_string());
        }

        if parts.host.split('.').any(|label| label.matches('-').count() >= 2) {
            score += self.config.hyphenated_domain_weight;
            reasons.push("Multiple hyphens".to_string());
        }

        let suspicion_score = score.min(100);
        UrlAnalysis {
            url: url.to_string(),
            suspicion_score,
            is_suspicious: suspicion_score >= self.config.suspicion_threshold,
            reasons,
        }
    }

    pub fn suspicion_threshold(&self) -> u32 {
        self.config.suspicion_threshold
    }

    fn is_shortener(&self, host: &str) -> bool {
        self.config
            .shortener_domains
            .iter()
            .any(|s| host == s || host.ends_with(&format!(".{s}")))
    }
}

/// Host and path split out of a URL string, scheme or not.
struct UrlParts {
    host: String,
    path: String,
}

impl UrlParts {
    fn parse(url_lower: &str) -> Self {
        let with_scheme = if url_lower.contains("://") {
            url_lower.to_string()
        } else {
            format!("http://{url_lower}")
        };

        if let Ok(parsed) = Url::parse(&with_scheme) {
            if let Some(host) = parsed.host_str() {
                return Self {
                    host: host.to_string(),
                    path: parsed.path().to_string(),
                };
            }
        }

        // Parser rejected it; degrade to a plain string split so the rest
        // of the rules still apply.
        let stripped = url_lower
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(url_lower);
        match stripped.split_once('/') {
            Some((host, path)) => Self {
                host: host.to_string(),
                path: format!("/{path}"),
            },
            None => Self {
                host: stripped.to_string(),
                path: String::new(),
            },
        }
    }

    fn tld(&self) -> Option<&str> {
        let mut labels = self.host.rsplit('.');
        let last = labels.next()?;
        // A lone label has no TLD.
        labels.next()?;
        Some(last)
    }
}

fn is_ipv4_host(host: &str) -> bool {
    let octets: Vec<&str> = host.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.len() <= 3 && o.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> UrlScorer {
        UrlScorer::default()
    }

    #[test]
    fn test_phishing_url_accumulates_keyword_and_tld_hits() {
        let analysis = scorer().score("http://secure-bank-verify.tk/login");

        // secure + bank + verify + login keywords, .tk TLD, 2 hyphens.
        assert_eq!(analysis.suspicion_score, 4 * 15 + 15 + 10);
        assert!(analysis.is_suspicious);
        assert!(analysis.reasons.iter().any(|r| r == "Contains keyword: verify"));
        assert!(analysis.reasons.iter().any(|r| r == "Contains keyword: login"));
        assert!(analysis.reasons.iter().any(|r| r == "Contains keyword: bank"));
        assert!(analysis.reasons.iter().any(|r| r == "Suspicious TLD"));
        assert!(analysis.reasons.iter().any(|r| r == "Multiple hyphens"));
    }

    #[test]
    fn test_shortener_with_claim_keyword() {
        let analysis = scorer().score("bit.ly/claim123");
        assert_eq!(analysis.suspicion_score, 20 + 15);
        assert!(!analysis.is_suspicious);
        assert!(analysis.reasons.contains(&"Shortened URL".to_string()));
        assert!(analysis.reasons.contains(&"Contains keyword: claim".to_string()));
    }

    #[test]
    fn test_at_symbol() {
        let analysis = scorer().score("http://paypal.com@evil.example.net/");
        assert!(analysis.reasons.contains(&"Contains @ symbol".to_string()));
        assert!(analysis.suspicion_score >= 25);
    }

    #[test]
    fn test_extra_double_slashes() {
        let analysis = scorer().score("http://example.com//redirect//deep");
        assert!(analysis.reasons.contains(&"Multiple slashes".to_string()));

        let clean = scorer().score("http://example.com/one/two");
        assert!(!clean.reasons.contains(&"Multiple slashes".to_string()));
    }

    #[test]
    fn test_ipv4_host() {
        let analysis = scorer().score("http://192.168.1.1/invest");
        assert!(analysis.reasons.contains(&"IP address in URL".to_string()));

        let not_ip = scorer().score("http://192.168.example.com/");
        assert!(!not_ip.reasons.contains(&"IP address in URL".to_string()));
    }

    #[test]
    fn test_long_url() {
        let long_path = "x".repeat(120);
        let analysis = scorer().score(&format!("http://example.com/{long_path}"));
        assert!(analysis.reasons.contains(&"Unusually long URL".to_string()));
    }

    #[test]
    fn test_hyphen_rule_is_per_label() {
        // One hyphen per label does not trigger.
        let one = scorer().score("http://my-shop.example-site.com/");
        assert!(!one.reasons.contains(&"Multiple hyphens".to_string()));

        let two = scorer().score("http://free-iphone-claim.xyz/");
        assert!(two.reasons.contains(&"Multiple hyphens".to_string()));
    }

    #[test]
    fn test_score_clamped_to_100() {
        // Every keyword plus several structural rules pushes far past 100.
        let url = "http://1.2.3.4@verify-login-secure-bank-account.tk//confirm//update/suspended/claim/prize/winner/urgent";
        let analysis = scorer().score(url);
        assert_eq!(analysis.suspicion_score, 100);
        assert!(analysis.is_suspicious);
    }

    #[test]
    fn test_benign_url_scores_zero() {
        let analysis = scorer().score("https://example.org/docs");
        assert_eq!(analysis.suspicion_score, 0);
        assert!(!analysis.is_suspicious);
        assert!(analysis.reasons.is_empty());
    }

    #[test]
    fn test_is_suspicious_tracks_threshold() {
        let mut config = UrlRuleConfig::default();
        config.suspicion_threshold = 30;
        let scorer = UrlScorer::new(config);
        let analysis = scorer.score("bit.ly/claim123");
        assert_eq!(analysis.suspicion_score, 35);
        assert!(analysis.is_suspicious);
    }

    #[test]
    fn test_unparseable_candidate_still_scores() {
        // Not a valid authority, but string-level rules still apply.
        let analysis = scorer().score("http://[broken/verify");
        assert!(analysis.reasons.iter().any(|r| r.starts_with("Contains keyword")));
        assert!(analysis.suspicion_score <= 100);
    }

    #[test]
    fn test_fixture_rule_table_substitution() {
        let config = UrlRuleConfig {
            phishing_keywords: vec!["zebra".to_string()],
            keyword_weight: 50,
            shortener_domains: Vec::new(),
            suspicious_tlds: Vec::new(),
            ..UrlRuleConfig::default()
        };
        let scorer = UrlScorer::new(config);
        let analysis = scorer.score("http://zebra.example.com/");
        assert_eq!(analysis.suspicion_score, 50);
        assert!(analysis.is_suspicious);
    }
}
