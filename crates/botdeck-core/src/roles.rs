//! Operator roles and the section capability model.
//!
//! `visible_sections` is the single gating function: every navigation
//! decision and every privileged action check goes through it (or through
//! `Section::allowed_for`, which it is built on). Client-side gating is a
//! UX affordance only; the server independently re-checks the role on
//! privileged endpoints.

use serde::{Deserialize, Serialize};

/// Panel operator role.
///
/// Owner is a strict capability superset of admin; the two differ exactly
/// by administrator account management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
}

impl Role {
    /// Returns the short display name for this role.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    /// Whether this role may manage administrator accounts.
    pub fn can_manage_admins(self) -> bool {
        matches!(self, Role::Owner)
    }
}

/// Panel sections, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Dashboard,
    Users,
    Messages,
    Broadcast,
    Logs,
    Admins,
    Settings,
}

impl Section {
    /// Returns all sections in display order.
    pub fn all() -> &'static [Section] {
        &[
            Section::Dashboard,
            Section::Users,
            Section::Messages,
            Section::Broadcast,
            Section::Logs,
            Section::Admins,
            Section::Settings,
        ]
    }

    /// Returns the section title shown in the sidebar and header.
    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Users => "Users",
            Section::Messages => "Messages",
            Section::Broadcast => "Broadcast",
            Section::Logs => "Logs",
            Section::Admins => "Administrators",
            Section::Settings => "Settings",
        }
    }

    /// Whether this section is reachable for the given role.
    ///
    /// Sections not allowed here must also reject direct invocation
    /// (keyboard shortcuts), not just disappear from the sidebar.
    pub fn allowed_for(self, role: Role) -> bool {
        match self {
            Section::Admins => role.can_manage_admins(),
            _ => true,
        }
    }
}

/// Returns the ordered list of sections permitted for the given role.
pub fn visible_sections(role: Role) -> Vec<Section> {
    Section::all()
        .iter()
        .copied()
        .filter(|section| section.allowed_for(role))
        .collect()
}
