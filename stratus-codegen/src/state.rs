//! Per-resource progress through generation.

use std::fmt;

use indexmap::IndexMap;

/// Stage of one resource. Stages only move forward; `Skipped` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    Unseen,
    TypeResolved,
    ValueFlattened,
    ReferencesRewritten,
    Emitted,
    Skipped(String),
}

impl ResourceState {
    fn rank(&self) -> u8 {
        match self {
            ResourceState::Unseen => 0,
            ResourceState::TypeResolved => 1,
            ResourceState::ValueFlattened => 2,
            ResourceState::ReferencesRewritten => 3,
            ResourceState::Emitted => 4,
            ResourceState::Skipped(_) => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResourceState::Emitted | ResourceState::Skipped(_))
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Unseen => f.write_str("unseen"),
            ResourceState::TypeResolved => f.write_str("type resolved"),
            ResourceState::ValueFlattened => f.write_str("value flattened"),
            ResourceState::ReferencesRewritten => f.write_str("references rewritten"),
            ResourceState::Emitted => f.write_str("emitted"),
            ResourceState::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}

/// Stage of every resource in template order.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    states: IndexMap<String, ResourceState>,
}

impl ImportReport {
    pub(crate) fn new<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            states: names
                .into_iter()
                .map(|name| (name.clone(), ResourceState::Unseen))
                .collect(),
        }
    }

    /// Move `name` forward. Transitions out of a terminal state, or back to
    /// an earlier stage, are ignored.
    pub(crate) fn advance(&mut self, name: &str, next: ResourceState) {
        let Some(current) = self.states.get_mut(name) else {
            return;
        };
        if current.is_terminal() || next.rank() <= current.rank() {
            tracing::debug!(resource = name, from = %current, to = %next, "ignored backward transition");
            return;
        }
        tracing::trace!(resource = name, state = %next, "resource state");
        *current = next;
    }

    /// Advance every resource still at `from` to `to`.
    pub(crate) fn advance_all(&mut self, from: &ResourceState, to: ResourceState) {
        let names: Vec<String> = self
            .states
            .iter()
            .filter(|(_, state)| *state == from)
            .map(|(name, _)| name.clone())
            .collect();
        for name in names {
            self.advance(&name, to.clone());
        }
    }

    pub fn state(&self, name: &str) -> Option<&ResourceState> {
        self.states.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceState)> {
        self.states.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resources emitted as untyped placeholders, with the reason.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.states.iter().filter_map(|(name, state)| match state {
            ResourceState::Skipped(reason) => Some((name.as_str(), reason.as_str())),
            _ => None,
        })
    }
}
