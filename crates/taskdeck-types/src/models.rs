use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full user record, including the password hash. Never serialized to the
/// wire — handlers convert to [`PublicUser`] first.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        PublicUser {
            id: u.id,
            email: u.email,
            name: u.name,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Lenient decode for values coming back from storage. Unknown text
    /// degrades to the default rather than failing the whole read.
    pub fn from_db(s: &str) -> Priority {
        match s {
            "low" => Priority::Low,
            "high" => Priority::High,
            _ => Priority::Medium,
        }
    }
}

/// A workflow column. Two distinct notions hide behind this record and must
/// not be conflated: the status with the lowest `sort_order` is assigned to
/// new tasks, while the status with `is_done = true` forces `completed` on
/// any task moved into it. The wire keeps the original field names
/// (`order`, `isDefault`); the code uses the unambiguous ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(rename = "isDefault")]
    pub is_done: bool,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub deadline: Option<i64>,
    pub status_id: Option<Uuid>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub push_enabled: bool,
    pub new_todo_enabled: bool,
    pub deadline_enabled: bool,
    pub completed_enabled: bool,
    pub updated_enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
