//! Extractor tunables.
//!
//! All knobs of the extraction pipeline live in [`ExtractorConfig`]. The
//! defaults are the values the service runs with in production; a YAML file
//! passed with `--config` can override any subset of them.
//!
//! ```yaml
//! min_content_chars: 400
//! escalation_chars: 300
//! max_homepage_candidates: 30
//! redirect_delay_ms: 2000
//! redirector_hosts: ["news.google.com"]
//! default_category_id: 1
//! cities:
//!   - { name: "Ubatuba", category_id: 12 }
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// A city name and the WordPress category id assigned when it is mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CityCategory {
    pub name: String,
    pub category_id: i64,
}

impl CityCategory {
    fn new(name: &str, category_id: i64) -> Self {
        Self {
            name: name.to_string(),
            category_id,
        }
    }
}

/// Category id for Ubatuba in the default city table.
pub const UBATUBA_CATEGORY_ID: i64 = 12;

/// Category id used when no known city is mentioned.
pub const DEFAULT_CATEGORY_ID: i64 = 1;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Acceptance gate: minimum plain-text length of an extracted article.
    pub min_content_chars: usize,
    /// Below this plain-text length the readability result is replaced by
    /// the generic block scan.
    pub escalation_chars: usize,
    /// Upper bound on article links tried from a homepage.
    pub max_homepage_candidates: usize,
    /// Wait before resolving a redirector URL.
    pub redirect_delay_ms: u64,
    /// Hosts whose links are redirect pages rather than articles.
    pub redirector_hosts: Vec<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_tags: usize,
    pub default_category_id: i64,
    /// Checked in order; the first city found in the text wins.
    pub cities: Vec<CityCategory>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 400,
            escalation_chars: 300,
            max_homepage_candidates: 30,
            redirect_delay_ms: 2_000,
            redirector_hosts: vec!["news.google.com".to_string()],
            request_timeout_secs: 20,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            max_tags: 10,
            default_category_id: DEFAULT_CATEGORY_ID,
            cities: vec![
                CityCategory::new("Ubatuba", UBATUBA_CATEGORY_ID),
                CityCategory::new("Caraguatatuba", 13),
                CityCategory::new("São Sebastião", 14),
                CityCategory::new("Ilhabela", 15),
                CityCategory::new("Bertioga", 16),
                CityCategory::new("Paraty", 17),
            ],
        }
    }
}

impl ExtractorConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load a config from a YAML file. Missing keys keep their defaults.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&raw)?;
        info!(
            min_content_chars = config.min_content_chars,
            escalation_chars = config.escalation_chars,
            cities = config.cities.len(),
            "Loaded extractor config"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ExtractorConfig::default();
        assert_eq!(c.min_content_chars, 400);
        assert_eq!(c.escalation_chars, 300);
        assert_eq!(c.max_homepage_candidates, 30);
        assert_eq!(c.max_tags, 10);
        assert_eq!(c.redirect_delay(), Duration::from_secs(2));
        assert_eq!(c.cities[0].name, "Ubatuba");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let c = ExtractorConfig::from_yaml("min_content_chars: 250\nredirect_delay_ms: 0\n").unwrap();
        assert_eq!(c.min_content_chars, 250);
        assert_eq!(c.redirect_delay_ms, 0);
        assert_eq!(c.escalation_chars, 300);
        assert_eq!(c.redirector_hosts, vec!["news.google.com".to_string()]);
    }

    #[test]
    fn test_yaml_city_table_replaces_default() {
        let c = ExtractorConfig::from_yaml(
            "cities:\n  - { name: \"Santos\", category_id: 40 }\ndefault_category_id: 7\n",
        )
        .unwrap();
        assert_eq!(c.cities, vec![CityCategory::new("Santos", 40)]);
        assert_eq!(c.default_category_id, 7);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.yaml");
        tokio::fs::write(&path, "max_homepage_candidates: 5\n").await.unwrap();
        let c = ExtractorConfig::load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(c.max_homepage_candidates, 5);
    }
}
