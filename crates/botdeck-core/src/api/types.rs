//! Wire types for the management API.
//!
//! The API speaks camelCase JSON; every struct here renames accordingly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Panel operator account as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelUser {
    pub id: i64,
    pub login: String,
    pub display_name: String,
    pub role: Role,
}

/// Response to the setup probe: whether an owner account exists yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub has_owner: bool,
}

/// Successful sign-in or owner registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: PanelUser,
}

/// Envelope for the session validation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: PanelUser,
}

/// Administrator account row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub id: i64,
    pub login: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminsResponse {
    pub admins: Vec<AdminAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminResponse {
    pub admin: AdminAccount,
}

/// One day of message activity for the dashboard chart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    pub day: String,
    pub value: u64,
}

/// Command popularity row for the dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandUsage {
    pub name: String,
    pub count: u64,
    #[serde(default)]
    pub percentage: f64,
}

/// Aggregate bot statistics for the dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub new_users_today: u64,
    #[serde(default)]
    pub users_change: String,
    pub messages_today: u64,
    #[serde(default)]
    pub messages_change: String,
    pub commands_today: u64,
    pub active_sessions: u64,
    pub blocked_users: u64,
    #[serde(default)]
    pub weekly_activity: Vec<ActivityPoint>,
    #[serde(default)]
    pub top_commands: Vec<CommandUsage>,
}

/// End user of the bot, as distinct from a panel operator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_blocked: bool,
    pub joined_at: String,
    pub last_active_at: Option<String>,
}

impl BotUser {
    /// Best available human-readable label for this user.
    pub fn label(&self) -> String {
        if let Some(username) = self.username.as_deref() {
            return format!("@{username}");
        }
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.telegram_id.to_string()
        } else {
            name
        }
    }
}

/// One page of the user directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    pub users: Vec<BotUser>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

/// Past broadcast with delivery counters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub id: i64,
    pub text: String,
    pub sent_count: u64,
    pub failed_count: u64,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastsResponse {
    pub broadcasts: Vec<Broadcast>,
}

/// Delivery receipt for a just-sent broadcast.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    pub broadcast_id: i64,
    pub sent_count: u64,
    pub failed_count: u64,
    pub status: String,
}

/// Message log row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub direction: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// Bot settings are an open key/value map; the panel does not interpret
/// individual keys.
pub type SettingsMap = HashMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsResponse {
    pub settings: SettingsMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_user_parses_camel_case() {
        let user: PanelUser = serde_json::from_str(
            r#"{"id": 1, "login": "root", "displayName": "Root", "role": "owner"}"#,
        )
        .unwrap();
        assert_eq!(user.display_name, "Root");
        assert_eq!(user.role, Role::Owner);
    }

    #[test]
    fn test_stats_tolerate_missing_optional_fields() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{
                "totalUsers": 10, "newUsersToday": 2, "messagesToday": 40,
                "commandsToday": 7, "activeSessions": 3, "blockedUsers": 1
            }"#,
        )
        .unwrap();
        assert_eq!(stats.total_users, 10);
        assert!(stats.weekly_activity.is_empty());
        assert!(stats.users_change.is_empty());
    }

    #[test]
    fn test_bot_user_label_prefers_username() {
        let user: BotUser = serde_json::from_str(
            r#"{
                "telegramId": 42, "username": "alice", "firstName": "Alice",
                "lastName": null, "isBlocked": false,
                "joinedAt": "2026-01-01", "lastActiveAt": null
            }"#,
        )
        .unwrap();
        assert_eq!(user.label(), "@alice");
    }

    #[test]
    fn test_bot_user_label_falls_back_to_name_then_id() {
        let named: BotUser = serde_json::from_str(
            r#"{
                "telegramId": 42, "username": null, "firstName": "Alice",
                "lastName": "Smith", "isBlocked": false,
                "joinedAt": "2026-01-01", "lastActiveAt": null
            }"#,
        )
        .unwrap();
        assert_eq!(named.label(), "Alice Smith");

        let anonymous: BotUser = serde_json::from_str(
            r#"{
                "telegramId": 42, "username": null, "firstName": null,
                "lastName": null, "isBlocked": true,
                "joinedAt": "2026-01-01", "lastActiveAt": null
            }"#,
        )
        .unwrap();
        assert_eq!(anonymous.label(), "42");
    }
}
