use serde::{Deserialize, Serialize};

/// An installed, named piece of software with its version string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl Package {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Installed-software inventory captured alongside a period report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    #[serde(default)]
    pub core_version: String,
    #[serde(default)]
    pub active_plugins: Vec<Package>,
    #[serde(default)]
    pub active_theme: Package,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_theme: Option<Package>,
}

impl EnvironmentSnapshot {
    #[must_use]
    pub fn plugin(&self, name: &str) -> Option<&Package> {
        self.active_plugins.iter().find(|plugin| plugin.name == name)
    }
}
