use serde::{Deserialize, Serialize};
use std::fmt;

use crate::version::{self, VersionTriple};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Activate,
    Deactivate,
    Update,
    Downgrade,
    Change,
}

impl ChangeAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Update => "update",
            Self::Downgrade => "downgrade",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Core,
    Plugin,
    Theme,
    ParentTheme,
    ChildTheme,
}

impl ObjectType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Plugin => "plugin",
            Self::Theme => "theme",
            Self::ParentTheme => "parent_theme",
            Self::ChildTheme => "child_theme",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a change: what kind of object, which one, at what version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSubject {
    pub object_type: ObjectType,
    pub name: String,
    pub version: String,
    /// Decomposed `version`, when it parses.
    pub version_parts: Option<VersionTriple>,
}

impl ChangeSubject {
    #[must_use]
    pub fn new(object_type: ObjectType, name: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            object_type,
            name: name.into(),
            version_parts: version::parse(&version),
            version,
        }
    }
}

/// A classified difference between two consecutive environment snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChangeEventRepr", into = "ChangeEventRepr")]
pub struct ChangeEvent {
    pub action: ChangeAction,
    pub object: ChangeSubject,
    /// Present for `update`, `downgrade` and `change`.
    pub previous: Option<ChangeSubject>,
}

impl ChangeEvent {
    #[must_use]
    pub const fn new(
        action: ChangeAction,
        object: ChangeSubject,
        previous: Option<ChangeSubject>,
    ) -> Self {
        Self {
            action,
            object,
            previous,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.action, self.object.object_type, self.object.name)?;
        match &self.previous {
            Some(previous) if previous.name != self.object.name => write!(
                f,
                " ({} {} -> {} {})",
                previous.name, previous.version, self.object.name, self.object.version
            ),
            Some(previous) => write!(f, " {} -> {}", previous.version, self.object.version),
            None if self.object.version.is_empty() => Ok(()),
            None => write!(f, " {}", self.object.version),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ChangeEventRepr {
    action: ChangeAction,
    object_type: ObjectType,
    object_name: String,
    #[serde(default)]
    object_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_version_major: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_version_minor: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_version_patch: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_object_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_object_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_object_version_major: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_object_version_minor: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_object_version_patch: Option<u64>,
}

impl From<ChangeEventRepr> for ChangeEvent {
    fn from(repr: ChangeEventRepr) -> Self {
        // Decomposed parts are derived data; re-derive instead of trusting the blob.
        let previous = match (repr.previous_object_type, repr.previous_object_name) {
            (Some(object_type), Some(name)) => Some(ChangeSubject::new(
                object_type,
                name,
                repr.previous_object_version.unwrap_or_default(),
            )),
            _ => None,
        };
        Self::new(
            repr.action,
            ChangeSubject::new(repr.object_type, repr.object_name, repr.object_version),
            previous,
        )
    }
}

impl From<ChangeEvent> for ChangeEventRepr {
    fn from(event: ChangeEvent) -> Self {
        let parts = event.object.version_parts;
        let previous_parts = event.previous.as_ref().and_then(|p| p.version_parts);
        let (previous_object_type, previous_object_name, previous_object_version) =
            match event.previous {
                Some(previous) => (
                    Some(previous.object_type),
                    Some(previous.name),
                    Some(previous.version),
                ),
                None => (None, None, None),
            };

        Self {
            action: event.action,
            object_type: event.object.object_type,
            object_name: event.object.name,
            object_version: event.object.version,
            object_version_major: parts.map(|p| p.major),
            object_version_minor: parts.map(|p| p.minor),
            object_version_patch: parts.map(|p| p.patch),
            previous_object_type,
            previous_object_name,
            previous_object_version,
            previous_object_version_major: previous_parts.map(|p| p.major),
            previous_object_version_minor: previous_parts.map(|p| p.minor),
            previous_object_version_patch: previous_parts.map(|p| p.patch),
        }
    }
}
