//! Route-guard decision table.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected UI subtrees ask this module what to do with the current
//! [`CacheSnapshot`]. The answer is recomputed on every snapshot change; there
//! is no state beyond the snapshot itself.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::model::{CacheSnapshot, Role};

/// Privilege a protected subtree requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Any signed-in identity.
    #[default]
    None,
    /// Identity with [`Role::Admin`].
    Admin,
}

impl Capability {
    #[must_use]
    pub fn admin_only(admin_only: bool) -> Self {
        if admin_only { Self::Admin } else { Self::None }
    }

    #[must_use]
    pub fn is_satisfied_by(self, role: Role) -> bool {
        match self {
            Self::None => true,
            Self::Admin => role == Role::Admin,
        }
    }
}

/// Where a redirect sends the visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    SignIn,
    Home,
}

impl Destination {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/login",
            Self::Home => "/",
        }
    }
}

/// Outcome of evaluating a guard against a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardDecision {
    /// Auth is still settling; show a placeholder and do not navigate.
    Placeholder,
    Redirect(Destination),
    Render,
}

/// Decide what a subtree requiring `required` shows for `snapshot`.
#[must_use]
pub fn decide(snapshot: &CacheSnapshot, required: Capability) -> GuardDecision {
    if snapshot.is_loading {
        return GuardDecision::Placeholder;
    }
    let Some(identity) = &snapshot.identity else {
        return GuardDecision::Redirect(Destination::SignIn);
    };
    if !required.is_satisfied_by(identity.role) {
        return GuardDecision::Redirect(Destination::Home);
    }
    GuardDecision::Render
}
