//! Site registry: maps URLs to platform keys and their selector profiles.
//!
//! The extraction engine never decides platform identity on its own; it
//! asks this registry. Definitions load from a TOML file, with embedded
//! defaults shipped in the binary and an optional user override under the
//! standard config directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, ScrapeError};
use crate::profile::PlatformProfile;
use crate::utils::extract_domain;

/// One registered site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteDef {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Domains this site serves (substring match on the URL host)
    #[serde(default)]
    pub domains: Vec<String>,
    /// Path regexes, any of which must match ("*" matches everything)
    #[serde(default)]
    pub path_patterns: Vec<String>,
    /// Lower number = consulted earlier
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Selector table applied by the known-site adapter
    pub profile: PlatformProfile,
}

fn default_priority() -> i32 {
    999
}

fn default_enabled() -> bool {
    true
}

impl SiteDef {
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(key)
    }

    fn matches(&self, host: &str, path: &str) -> bool {
        let domain_ok = self
            .domains
            .iter()
            .any(|d| d == "*" || host.contains(d.as_str()));
        if !domain_ok {
            return false;
        }

        if self.path_patterns.is_empty() {
            return true;
        }
        self.path_patterns.iter().any(|p| {
            p == "*" || Regex::new(p).map(|re| re.is_match(path)).unwrap_or(false)
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    blocked_domains: Vec<String>,
    #[serde(default)]
    sites: HashMap<String, SiteDef>,
}

/// The loaded site registry
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: HashMap<String, SiteDef>,
    blocked_domains: Vec<String>,
}

impl SiteRegistry {
    /// Parse a registry from TOML, validating every profile up front so a
    /// broken selector table fails at load time rather than mid-scrape.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content)?;
        for (key, site) in &file.sites {
            site.profile.validate().map_err(|e| {
                ScrapeError::ConfigError(format!("site '{}': {}", key, e))
            })?;
        }
        Ok(SiteRegistry {
            sites: file.sites,
            blocked_domains: file.blocked_domains,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Load from the user config dir if present, else embedded defaults
    pub fn load_default() -> Self {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "reviewlens") {
            let user_registry = proj_dirs.config_dir().join("platforms.toml");
            if user_registry.exists() {
                if let Ok(registry) = Self::load_from_file(&user_registry) {
                    return registry;
                }
                eprintln!(
                    "Warning: ignoring unreadable registry at {}",
                    user_registry.display()
                );
            }
        }
        Self::embedded_defaults()
    }

    /// Registry compiled into the binary
    pub fn embedded_defaults() -> Self {
        let defaults = include_str!("../assets/platforms.toml");
        Self::parse_toml(defaults).unwrap_or_default()
    }

    /// Ensure a user registry file exists (copy defaults if not)
    pub fn ensure_user_registry() -> Result<PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("", "", "reviewlens")
            .ok_or_else(|| ScrapeError::ConfigError("could not find config directory".into()))?;
        let config_dir = proj_dirs.config_dir();
        let registry_path = config_dir.join("platforms.toml");

        if !registry_path.exists() {
            fs::create_dir_all(config_dir)?;
            fs::write(&registry_path, include_str!("../assets/platforms.toml"))?;
        }
        Ok(registry_path)
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        let Some(host) = extract_domain(url) else {
            return false;
        };
        self.blocked_domains.iter().any(|b| host.contains(b.as_str()))
    }

    /// Identify which platform a URL belongs to. Blocked domains and
    /// disabled sites yield no key; ties break by ascending priority.
    pub fn identify(&self, url: &str) -> Option<&str> {
        if self.is_blocked(url) {
            return None;
        }
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let path = parsed.path().to_lowercase();

        let mut ordered: Vec<(&String, &SiteDef)> = self
            .sites
            .iter()
            .filter(|(_, site)| site.enabled)
            .collect();
        ordered.sort_by_key(|(key, site)| (site.priority, key.as_str()));

        ordered
            .into_iter()
            .find(|(_, site)| site.matches(&host, &path))
            .map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&SiteDef> {
        self.sites.get(key)
    }

    pub fn profile(&self, key: &str) -> Option<&PlatformProfile> {
        self.sites.get(key).map(|site| &site.profile)
    }

    /// All enabled platform keys, sorted for stable output
    pub fn platform_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .sites
            .iter()
            .filter(|(_, site)| site.enabled)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> SiteRegistry {
        let toml = r#"
blocked_domains = ["facebook.com"]

[sites.flipkart]
name = "Flipkart"
domains = ["flipkart.com"]
path_patterns = ["/p/", "/product-reviews/"]
priority = 1

[sites.flipkart.profile]
product_name = ["span.VU-ZEz", "span.B_NuCI"]
review_block = ["div.cPHDOP", "div._27M-vq"]
review_text = ["div.ZmyHeo"]

[sites.generic-shop]
name = "Generic Shop"
domains = ["*"]
path_patterns = ["/product/"]
priority = 50

[sites.generic-shop.profile]
review_text = [".review-text"]

[sites.disabled-site]
domains = ["flipkart.com"]
enabled = false

[sites.disabled-site.profile]
review_text = [".never"]
"#;
        SiteRegistry::parse_toml(toml).unwrap()
    }

    #[test]
    fn test_identify_by_domain_and_path() {
        let registry = sample_registry();
        assert_eq!(
            registry.identify("https://www.flipkart.com/p/itm123"),
            Some("flipkart")
        );
        assert_eq!(
            registry.identify("https://www.flipkart.com/product-reviews/itm123"),
            Some("flipkart")
        );
    }

    #[test]
    fn test_identify_respects_path_patterns() {
        let registry = sample_registry();
        assert_eq!(registry.identify("https://www.flipkart.com/careers"), None);
    }

    #[test]
    fn test_identify_priority_order() {
        let registry = sample_registry();
        // Wildcard domain would also match, but flipkart has priority 1
        assert_eq!(
            registry.identify("https://www.flipkart.com/p/x"),
            Some("flipkart")
        );
        assert_eq!(
            registry.identify("https://shop.example.com/product/42"),
            Some("generic-shop")
        );
    }

    #[test]
    fn test_blocked_domain_yields_no_key() {
        let registry = sample_registry();
        assert!(registry.is_blocked("https://www.facebook.com/marketplace/item/1"));
        assert_eq!(
            registry.identify("https://www.facebook.com/marketplace/item/1"),
            None
        );
    }

    #[test]
    fn test_disabled_sites_skipped() {
        let registry = sample_registry();
        assert!(!registry.platform_keys().contains(&"disabled-site"));
    }

    #[test]
    fn test_profile_lookup() {
        let registry = sample_registry();
        let profile = registry.profile("flipkart").unwrap();
        assert_eq!(profile.review_text, vec!["div.ZmyHeo".to_string()]);
    }

    #[test]
    fn test_invalid_profile_rejected_at_load() {
        let toml = r#"
[sites.broken]
domains = ["broken.example"]

[sites.broken.profile]
product_name = ["h1"]
"#;
        // No review selectors at all
        assert!(SiteRegistry::parse_toml(toml).is_err());
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let registry = SiteRegistry::embedded_defaults();
        assert!(!registry.platform_keys().is_empty());
    }
}
