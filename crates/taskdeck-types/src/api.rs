use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::{NotificationSettings, Priority, PublicUser, PushSubscription, Todo};

// -- JWT Claims --

/// JWT claims shared between the auth handlers (issuing) and the request
/// middleware (validation). Canonical definition lives here in taskdeck-types
/// to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

// -- Todos --

/// Deserializes a field that distinguishes "absent" from "explicit null".
/// With `#[serde(default)]` an absent key stays `None`; a present key (null
/// or value) becomes `Some(inner)`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub text: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub deadline: Option<i64>,
    #[serde(default)]
    pub status_id: Option<Uuid>,
}

/// Partial update: only present fields are touched. `category`, `deadline`
/// and `statusId` are nullable, so they use the double-option encoding to
/// tell "leave alone" apart from "clear".
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub status_id: Option<Option<Uuid>>,
}

impl UpdateTodoRequest {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.category.is_none()
            && self.deadline.is_none()
            && self.status_id.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoResponse {
    pub todo: Todo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
}

// -- Statuses --

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatusRequest {
    pub name: String,
    pub color: String,
    #[serde(default, rename = "isDefault")]
    pub is_done: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: i64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "isDefault")]
    pub is_done: Option<bool>,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
}

// -- Notification settings --

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub push_enabled: Option<bool>,
    #[serde(default)]
    pub new_todo_enabled: Option<bool>,
    #[serde(default)]
    pub deadline_enabled: Option<bool>,
    #[serde(default)]
    pub completed_enabled: Option<bool>,
    #[serde(default)]
    pub updated_enabled: Option<bool>,
}

// -- Push --

/// The browser-issued subscription object, as produced by
/// `PushManager.subscribe()`.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub subscription: PushSubscription,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<PushSubscription>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub settings: NotificationSettings,
}

// -- Errors --

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_todo_distinguishes_absent_from_null() {
        let req: UpdateTodoRequest = serde_json::from_str(r#"{"deadline": null}"#).unwrap();
        assert_eq!(req.deadline, Some(None));
        assert_eq!(req.category, None);

        let req: UpdateTodoRequest = serde_json::from_str(r#"{"deadline": 1000}"#).unwrap();
        assert_eq!(req.deadline, Some(Some(1000)));

        let req: UpdateTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
    }

    #[test]
    fn status_wire_names_preserved() {
        let req: CreateStatusRequest = serde_json::from_str(
            r##"{"name":"Done","color":"#22c55e","isDefault":true,"order":3}"##,
        )
        .unwrap();
        assert_eq!(req.is_done, Some(true));
        assert_eq!(req.sort_order, 3);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), r#""high""#);
        let p: Priority = serde_json::from_str(r#""low""#).unwrap();
        assert_eq!(p, Priority::Low);
    }
}
