//! Attribution of large files to whoever ships them.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::config::SourceConfig;

static URL_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*:)?//([^/?#:@]+)(?::\d+)?([^?#]*)").expect("valid regex")
});

static EXTENSION_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/wp-content/(plugins|themes|mu-plugins)/([^/]+)/").expect("valid regex")
});

/// Lowercased host of an absolute or scheme-relative URL.
#[must_use]
pub fn url_host(url: &str) -> Option<String> {
    URL_PARTS
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|host| host.as_str().to_ascii_lowercase())
}

/// Maps a resource URL to a human-readable source label.
pub trait SourceResolver {
    fn resolve(&self, url: &str) -> String;
}

/// Resolves sources from configured host labels and well-known install paths.
///
/// Lookup order:
/// 1. configured host label (`fonts.gstatic.com` -> `Google Fonts`)
/// 2. `/wp-content/plugins/<slug>/` -> `plugin:<slug>`, likewise `theme:<slug>`
/// 3. `/wp-includes/`, `/wp-admin/` -> `core`
/// 4. the site's own host (or a relative URL) -> `site`
/// 5. the bare host
#[derive(Debug, Clone, Default)]
pub struct PathSourceResolver {
    site_host: Option<String>,
    hosts: BTreeMap<String, String>,
}

impl PathSourceResolver {
    #[must_use]
    pub fn new(site_host: Option<String>) -> Self {
        Self {
            site_host: site_host.map(|host| host.to_ascii_lowercase()),
            hosts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SourceConfig) -> Self {
        let mut resolver = Self::new(config.site_host.clone());
        for (host, label) in &config.hosts {
            resolver = resolver.with_host(host, label);
        }
        resolver
    }

    #[must_use]
    pub fn with_host(mut self, host: &str, label: impl Into<String>) -> Self {
        self.hosts.insert(host.to_ascii_lowercase(), label.into());
        self
    }
}

impl SourceResolver for PathSourceResolver {
    fn resolve(&self, url: &str) -> String {
        let url = url.trim();
        let (host, path) = match URL_PARTS.captures(url) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().to_ascii_lowercase()),
                caps.get(2).map_or("", |m| m.as_str()),
            ),
            None if url.starts_with('/') => (None, url),
            None => return "unknown".to_string(),
        };

        if let Some(label) = host.as_deref().and_then(|h| self.hosts.get(h)) {
            return label.clone();
        }

        if let Some(caps) = EXTENSION_PATH.captures(path) {
            let kind = match &caps[1] {
                "themes" => "theme",
                _ => "plugin",
            };
            return format!("{kind}:{}", &caps[2]);
        }

        if path.contains("/wp-includes/") || path.contains("/wp-admin/") {
            return "core".to_string();
        }

        match host {
            None => "site".to_string(),
            Some(host) if self.site_host.as_deref() == Some(host.as_str()) => "site".to_string(),
            Some(host) => host,
        }
    }
}
