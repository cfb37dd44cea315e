//! Row → domain conversions. Column order matches the SELECT lists in the
//! per-entity query modules.

use rusqlite::Row;
use rusqlite::types::Type;
use uuid::Uuid;

use taskdeck_types::models::{NotificationSettings, Priority, PushSubscription, Status, Todo, User};

pub(crate) fn uuid_col(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_uuid_col(row: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Uuid::parse_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// SELECT id, email, name, password, created_at, updated_at
pub(crate) fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_col(row, 0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// SELECT id, user_id, name, color, is_done, sort_order, created_at, updated_at
pub(crate) fn status_from_row(row: &Row) -> rusqlite::Result<Status> {
    Ok(Status {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        is_done: row.get(4)?,
        sort_order: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// SELECT id, user_id, text, completed, priority, category, tags, deadline,
///        status_id, created_at, updated_at
pub(crate) fn todo_from_row(row: &Row) -> rusqlite::Result<Todo> {
    let priority: String = row.get(4)?;
    // Corrupt tag JSON degrades to an empty list, never an error.
    let tags: Vec<String> = row
        .get::<_, Option<String>>(6)?
        .map(|raw| serde_json::from_str(&raw).unwrap_or_default())
        .unwrap_or_default();

    Ok(Todo {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        text: row.get(2)?,
        completed: row.get(3)?,
        priority: Priority::from_db(&priority),
        category: row.get(5)?,
        tags,
        deadline: row.get(7)?,
        status_id: opt_uuid_col(row, 8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// SELECT id, user_id, endpoint, p256dh, auth, created_at, updated_at
pub(crate) fn subscription_from_row(row: &Row) -> rusqlite::Result<PushSubscription> {
    Ok(PushSubscription {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        endpoint: row.get(2)?,
        p256dh: row.get(3)?,
        auth: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// SELECT id, user_id, push_enabled, new_todo_enabled, deadline_enabled,
///        completed_enabled, updated_enabled, created_at, updated_at
pub(crate) fn settings_from_row(row: &Row) -> rusqlite::Result<NotificationSettings> {
    Ok(NotificationSettings {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        push_enabled: row.get(2)?,
        new_todo_enabled: row.get(3)?,
        deadline_enabled: row.get(4)?,
        completed_enabled: row.get(5)?,
        updated_enabled: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
