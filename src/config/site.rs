//! Site configuration (_config.yml plus environment overrides)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Date format (Moment.js-style tokens)
    pub date_format: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Server
    pub port: u16,

    // Content backend
    #[serde(default)]
    pub sanity: SanityConfig,

    // Comments
    #[serde(default)]
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "medium blog".to_string(),
            description: String::new(),
            language: "en".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            date_format: "M/D/YYYY, h:mm:ss A".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            port: 3000,

            sanity: SanityConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `SANITY_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply `SANITY_*` overrides from an arbitrary lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup("SANITY_PROJECT_ID") {
            self.sanity.project_id = project_id;
        }
        if let Some(dataset) = lookup("SANITY_DATASET") {
            self.sanity.dataset = dataset;
        }
        if let Some(api_version) = lookup("SANITY_API_VERSION") {
            self.sanity.api_version = api_version;
        }
        if let Some(token) = lookup("SANITY_API_TOKEN") {
            self.sanity.token = Some(token);
        }
        if let Some(use_cdn) = lookup("SANITY_USE_CDN") {
            self.sanity.use_cdn = matches!(use_cdn.as_str(), "1" | "true" | "yes");
        }
        if let Some(api_host) = lookup("SANITY_API_HOST") {
            self.sanity.api_host = Some(api_host);
        }
    }
}

/// Connection settings for the Sanity content API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    /// Write token, needed only to create comments
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Overrides the `https://<project>.api.sanity.io` host
    pub api_host: Option<String>,
    pub image_host: String,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2021-03-25".to_string(),
            use_cdn: false,
            token: None,
            api_host: None,
            image_host: "https://cdn.sanity.io".to_string(),
        }
    }
}

impl SanityConfig {
    /// Host used for queries
    pub fn query_host(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None if self.use_cdn => format!("https://{}.apicdn.sanity.io", self.project_id),
            None => self.live_host(),
        }
    }

    /// Host used for mutations, never the CDN
    pub fn mutation_host(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => self.live_host(),
        }
    }

    fn live_host(&self) -> String {
        format!("https://{}.api.sanity.io", self.project_id)
    }

    /// API version path segment, e.g. `v2021-03-25`
    pub fn version_segment(&self) -> String {
        let version = self.api_version.trim_start_matches('v');
        format!("v{}", version)
    }
}

/// Comment form configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// Seconds the "thanks" banner stays before the form comes back
    pub ack_seconds: u64,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self { ack_seconds: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "medium blog");
        assert_eq!(config.sanity.dataset, "production");
        assert_eq!(config.sanity.api_version, "2021-03-25");
        assert_eq!(config.comments.ack_seconds, 5);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
port: 8080
sanity:
  project_id: abc123
  dataset: staging
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.port, 8080);
        assert_eq!(config.sanity.project_id, "abc123");
        assert_eq!(config.sanity.dataset, "staging");
        assert_eq!(config.sanity.api_version, "2021-03-25");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SANITY_PROJECT_ID", "p9"),
            ("SANITY_DATASET", "dev"),
            ("SANITY_API_TOKEN", "sk-test"),
            ("SANITY_USE_CDN", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = SiteConfig::default();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.sanity.project_id, "p9");
        assert_eq!(config.sanity.dataset, "dev");
        assert_eq!(config.sanity.token.as_deref(), Some("sk-test"));
        assert!(config.sanity.use_cdn);
        assert_eq!(config.sanity.api_version, "2021-03-25");
    }

    #[test]
    fn test_hosts() {
        let mut sanity = SanityConfig {
            project_id: "p9".to_string(),
            ..Default::default()
        };
        assert_eq!(sanity.query_host(), "https://p9.api.sanity.io");

        sanity.use_cdn = true;
        assert_eq!(sanity.query_host(), "https://p9.apicdn.sanity.io");
        assert_eq!(sanity.mutation_host(), "https://p9.api.sanity.io");

        sanity.api_host = Some("http://127.0.0.1:9000/".to_string());
        assert_eq!(sanity.query_host(), "http://127.0.0.1:9000");
        assert_eq!(sanity.mutation_host(), "http://127.0.0.1:9000");
        assert_eq!(sanity.version_segment(), "v2021-03-25");
    }
}
