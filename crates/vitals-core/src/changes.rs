//! Classification of environment inventory deltas into change events.
//!
//! [`detect`] runs a fixed sequence of rules over two consecutive snapshots
//! and concatenates their output:
//!
//! 1. core version update/downgrade
//! 2. plugin activations, then deactivations (matched by name)
//! 3. plugin version changes
//! 4. theme identity change, or else theme version changes

use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::model::{
    ChangeAction, ChangeEvent, ChangeSubject, EnvironmentSnapshot, ObjectType, Package,
};
use crate::version;

/// Object name used for core events.
pub const CORE_NAME: &str = "core";

/// Diff two snapshots into change events, in rule order.
#[must_use]
pub fn detect(previous: &EnvironmentSnapshot, current: &EnvironmentSnapshot) -> Vec<ChangeEvent> {
    let mut events = Vec::new();

    events.extend(core_change(previous, current));
    events.extend(plugin_presence_changes(previous, current));
    events.extend(plugin_version_changes(previous, current));
    events.extend(theme_changes(previous, current));

    debug!(events = events.len(), "detected environment changes");
    events
}

fn core_change(previous: &EnvironmentSnapshot, current: &EnvironmentSnapshot) -> Option<ChangeEvent> {
    version_change(
        ObjectType::Core,
        &Package::new(CORE_NAME, previous.core_version.as_str()),
        &Package::new(CORE_NAME, current.core_version.as_str()),
    )
}

fn plugin_presence_changes(
    previous: &EnvironmentSnapshot,
    current: &EnvironmentSnapshot,
) -> Vec<ChangeEvent> {
    let previous_names: HashSet<&str> = previous
        .active_plugins
        .iter()
        .map(|plugin| plugin.name.as_str())
        .collect();
    let current_names: HashSet<&str> = current
        .active_plugins
        .iter()
        .map(|plugin| plugin.name.as_str())
        .collect();

    let activated = current
        .active_plugins
        .iter()
        .filter(|plugin| !previous_names.contains(plugin.name.as_str()))
        .map(|plugin| presence_event(ChangeAction::Activate, plugin));
    let deactivated = previous
        .active_plugins
        .iter()
        .filter(|plugin| !current_names.contains(plugin.name.as_str()))
        .map(|plugin| presence_event(ChangeAction::Deactivate, plugin));

    activated.chain(deactivated).collect()
}

fn presence_event(action: ChangeAction, plugin: &Package) -> ChangeEvent {
    ChangeEvent::new(
        action,
        ChangeSubject::new(ObjectType::Plugin, plugin.name.as_str(), plugin.version.as_str()),
        None,
    )
}

/// One event per current plugin, diffed against the first previous plugin
/// with the same name and a different version string.
fn plugin_version_changes(
    previous: &EnvironmentSnapshot,
    current: &EnvironmentSnapshot,
) -> Vec<ChangeEvent> {
    current
        .active_plugins
        .iter()
        .filter_map(|plugin| {
            let before = previous
                .active_plugins
                .iter()
                .find(|before| before.name == plugin.name && before.version != plugin.version)?;
            version_change(ObjectType::Plugin, before, plugin)
        })
        .collect()
}

fn theme_changes(previous: &EnvironmentSnapshot, current: &EnvironmentSnapshot) -> Vec<ChangeEvent> {
    let (before, after) = (&previous.active_theme, &current.active_theme);

    if before.name != after.name {
        return vec![ChangeEvent::new(
            ChangeAction::Change,
            subject(ObjectType::Theme, after),
            Some(subject(ObjectType::Theme, before)),
        )];
    }

    match (&previous.parent_theme, &current.parent_theme) {
        (Some(parent_before), Some(parent_after)) => {
            version_change(ObjectType::ParentTheme, parent_before, parent_after)
                .into_iter()
                .chain(version_change(ObjectType::ChildTheme, before, after))
                .collect()
        }
        _ => version_change(ObjectType::Theme, before, after)
            .into_iter()
            .collect(),
    }
}

/// Classify a version move of one named object.
///
/// Returns `None` when the names differ or the versions compare equal;
/// otherwise `update` when `current` orders after `previous`, else
/// `downgrade`.
#[must_use]
pub fn version_change(
    object_type: ObjectType,
    previous: &Package,
    current: &Package,
) -> Option<ChangeEvent> {
    if previous.name != current.name {
        return None;
    }

    let action = match version::compare(&current.version, &previous.version) {
        Ordering::Equal => return None,
        Ordering::Greater => ChangeAction::Update,
        Ordering::Less => ChangeAction::Downgrade,
    };

    Some(ChangeEvent::new(
        action,
        subject(object_type, current),
        Some(subject(object_type, previous)),
    ))
}

fn subject(object_type: ObjectType, package: &Package) -> ChangeSubject {
    ChangeSubject::new(object_type, package.name.as_str(), package.version.as_str())
}
