use rusqlite::{Connection, OptionalExtension, ToSql, params};
use uuid::Uuid;

use taskdeck_types::api::UpdateSettingsRequest;
use taskdeck_types::models::NotificationSettings;
use taskdeck_types::now_ms;

use crate::models::settings_from_row;
use crate::{Database, StoreError};

const SETTINGS_COLS: &str = "id, user_id, push_enabled, new_todo_enabled, deadline_enabled, \
                             completed_enabled, updated_enabled, created_at, updated_at";

impl Database {
    /// Fetches the user's notification settings, lazily creating the row
    /// with the fixed defaults on first access.
    pub fn settings_for_user(&self, user_id: &Uuid) -> Result<NotificationSettings, StoreError> {
        self.with_conn(|conn| get_or_create_settings(conn, user_id))
    }

    /// Partial update of the toggles; an empty payload just returns the
    /// current row.
    pub fn update_settings(
        &self,
        user_id: &Uuid,
        req: &UpdateSettingsRequest,
    ) -> Result<NotificationSettings, StoreError> {
        let now = now_ms();
        self.with_conn(|conn| {
            // Guarantees the row exists before the UPDATE.
            get_or_create_settings(conn, user_id)?;

            let mut fields: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();

            for (col, value) in [
                ("push_enabled = ?", req.push_enabled),
                ("new_todo_enabled = ?", req.new_todo_enabled),
                ("deadline_enabled = ?", req.deadline_enabled),
                ("completed_enabled = ?", req.completed_enabled),
                ("updated_enabled = ?", req.updated_enabled),
            ] {
                if let Some(v) = value {
                    fields.push(col);
                    values.push(Box::new(v));
                }
            }

            if fields.is_empty() {
                return get_or_create_settings(conn, user_id);
            }

            fields.push("updated_at = ?");
            values.push(Box::new(now));
            values.push(Box::new(user_id.to_string()));

            let sql = format!(
                "UPDATE notification_settings SET {} WHERE user_id = ?{}",
                numbered(&fields),
                fields.len() + 1
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;

            get_or_create_settings(conn, user_id)
        })
    }
}

fn get_or_create_settings(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<NotificationSettings, StoreError> {
    let sql = format!("SELECT {SETTINGS_COLS} FROM notification_settings WHERE user_id = ?1");
    if let Some(settings) = conn
        .query_row(&sql, [user_id.to_string()], settings_from_row)
        .optional()?
    {
        return Ok(settings);
    }

    // Defaults: push on, new-task on, deadline on, completed off, updated on.
    let now = now_ms();
    conn.execute(
        "INSERT INTO notification_settings
             (id, user_id, push_enabled, new_todo_enabled, deadline_enabled,
              completed_enabled, updated_enabled, created_at, updated_at)
         VALUES (?1, ?2, 1, 1, 1, 0, 1, ?3, ?4)",
        params![Uuid::new_v4().to_string(), user_id.to_string(), now, now],
    )?;

    conn.query_row(&sql, [user_id.to_string()], settings_from_row)
        .map_err(StoreError::from)
}

fn numbered(fields: &[&str]) -> String {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| f.replace('?', &format!("?{}", i + 1)))
        .collect::<Vec<_>>()
        .join(", ")
}
