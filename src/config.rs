//! Detection configuration: heuristic rule tables, weights and thresholds.
//!
//! Everything the URL scorer and decision fuser consult lives here as
//! explicit data so deployments can tune rule sets in YAML and tests can
//! substitute fixture tables.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub url_rules: UrlRuleConfig,
}

impl DetectionConfig {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DetectionConfig = serde_yaml::from_str(&content)?;
        log::info!("loaded detection config from {}", path.display());
        Ok(config)
    }

    /// Write the built-in defaults as a YAML starting point.
    pub fn write_default(path: &Path) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(&Self::default())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

/// Weights and thresholds for combining text probability with URL risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    pub text_weight: f64,
    pub url_weight: f64,
    /// Final score at or above this is a SCAM verdict.
    pub scam_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            text_weight: 0.6,
            url_weight: 0.4,
            scam_threshold: 0.5,
        }
    }
}

/// Rule tables and weights for the URL risk scorer. Weights of triggered
/// rules are summed and clamped to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRuleConfig {
    pub phishing_keywords: Vec<String>,
    pub keyword_weight: u32,
    pub shortener_domains: Vec<String>,
    pub shortener_weight: u32,
    pub at_symbol_weight: u32,
    pub double_slash_weight: u32,
    /// TLDs without the leading dot.
    pub suspicious_tlds: Vec<String>,
    pub suspicious_tld_weight: u32,
    pub ip_host_weight: u32,
    pub max_url_length: usize,
    pub long_url_weight: u32,
    pub hyphenated_domain_weight: u32,
    /// Scores at or above this mark the URL suspicious.
    pub suspicion_threshold: u32,
}

impl Default for UrlRuleConfig {
    fn default() -> Self {
        Self {
            phishing_keywords: to_strings(&[
                "verify",
                "login",
                "secure",
                "bank",
                "account",
                "confirm",
                "update",
                "suspended",
                "claim",
                "prize",
                "winner",
                "urgent",
            ]),
            keyword_weight: 15,
            shortener_domains: to_strings(&[
                "bit.ly",
                "tinyurl.com",
                "goo.gl",
                "t.co",
                "ow.ly",
                "cutt.ly",
                "is.gd",
            ]),
            shortener_weight: 20,
            at_symbol_weight: 25,
            double_slash_weight: 20,
            suspicious_tlds: to_strings(&["tk", "ml", "ga", "cf", "gq", "xyz"]),
            suspicious_tld_weight: 15,
            ip_host_weight: 20,
            max_url_length: 100,
            long_url_weight: 10,
            hyphenated_domain_weight: 10,
            suspicion_threshold: 40,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_match_rule_table() {
        let config = UrlRuleConfig::default();
        assert_eq!(config.keyword_weight, 15);
        assert_eq!(config.shortener_weight, 20);
        assert_eq!(config.at_symbol_weight, 25);
        assert_eq!(config.suspicion_threshold, 40);
        assert_eq!(config.phishing_keywords.len(), 12);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = DetectionConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: DetectionConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.fusion.text_weight, config.fusion.text_weight);
        assert_eq!(
            parsed.url_rules.suspicious_tlds,
            config.url_rules.suspicious_tlds
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "fusion:\n  text_weight: 0.7\n  url_weight: 0.3\n  scam_threshold: 0.5\n";
        let parsed: DetectionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.fusion.text_weight, 0.7);
        assert_eq!(parsed.url_rules.suspicion_threshold, 40);
    }
}
