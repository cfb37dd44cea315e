use rusqlite::{Connection, OptionalExtension, ToSql, params};
use uuid::Uuid;

use taskdeck_types::api::{CreateStatusRequest, UpdateStatusRequest};
use taskdeck_types::models::Status;
use taskdeck_types::now_ms;

use crate::models::status_from_row;
use crate::{Database, StoreError};

const STATUS_COLS: &str = "id, user_id, name, color, is_done, sort_order, created_at, updated_at";

/// The three columns every fresh account starts with. Only the last one is
/// the completion status.
const DEFAULT_STATUSES: &[(&str, &str, i64, bool)] = &[
    ("To do", "#3b82f6", 1, false),
    ("In progress", "#eab308", 2, false),
    ("Done", "#22c55e", 3, true),
];

impl Database {
    /// Seeds the fixed default statuses for a freshly registered user. Not
    /// idempotent; called exactly once, at registration.
    pub fn seed_default_statuses(&self, user_id: &Uuid) -> Result<(), StoreError> {
        let now = now_ms();
        self.with_conn(|conn| {
            for (name, color, sort_order, is_done) in DEFAULT_STATUSES {
                conn.execute(
                    "INSERT INTO statuses (id, user_id, name, color, is_done, sort_order, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        Uuid::new_v4().to_string(),
                        user_id.to_string(),
                        name,
                        color,
                        is_done,
                        sort_order,
                        now,
                        now
                    ],
                )?;
            }
            Ok(())
        })
    }

    pub fn create_status(
        &self,
        user_id: &Uuid,
        req: &CreateStatusRequest,
    ) -> Result<Status, StoreError> {
        let id = Uuid::new_v4();
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO statuses (id, user_id, name, color, is_done, sort_order, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.to_string(),
                    user_id.to_string(),
                    req.name,
                    req.color,
                    req.is_done.unwrap_or(false),
                    req.sort_order,
                    now,
                    now
                ],
            )?;
            query_status_by_id(conn, &id, user_id)?.ok_or(StoreError::NotFound("status"))
        })
    }

    /// All statuses owned by the user, ascending by `sort_order`.
    pub fn statuses_for_user(&self, user_id: &Uuid) -> Result<Vec<Status>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {STATUS_COLS} FROM statuses WHERE user_id = ?1 ORDER BY sort_order ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], status_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Partial update; absent fields are left untouched, `updated_at` always
    /// refreshes.
    pub fn update_status(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        req: &UpdateStatusRequest,
    ) -> Result<Status, StoreError> {
        let now = now_ms();
        self.with_conn(|conn| {
            let mut fields: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(name) = &req.name {
                fields.push("name = ?");
                values.push(Box::new(name.clone()));
            }
            if let Some(color) = &req.color {
                fields.push("color = ?");
                values.push(Box::new(color.clone()));
            }
            if let Some(is_done) = req.is_done {
                fields.push("is_done = ?");
                values.push(Box::new(is_done));
            }
            if let Some(sort_order) = req.sort_order {
                fields.push("sort_order = ?");
                values.push(Box::new(sort_order));
            }

            fields.push("updated_at = ?");
            values.push(Box::new(now));
            values.push(Box::new(id.to_string()));
            values.push(Box::new(user_id.to_string()));

            let sql = format!(
                "UPDATE statuses SET {} WHERE id = ?{} AND user_id = ?{}",
                numbered(&fields),
                fields.len() + 1,
                fields.len() + 2
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;

            query_status_by_id(conn, id, user_id)?.ok_or(StoreError::NotFound("status"))
        })
    }

    /// Refuses to delete a status while any of the user's todos reference it.
    /// The check and the delete are separate statements, matching the
    /// observable behavior this service has always had.
    pub fn delete_status(&self, id: &Uuid, user_id: &Uuid) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let in_use: i64 = conn.query_row(
                "SELECT COUNT(*) FROM todos WHERE status_id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
                |row| row.get(0),
            )?;
            if in_use > 0 {
                return Err(StoreError::StatusInUse);
            }

            let affected = conn.execute(
                "DELETE FROM statuses WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
            )?;
            if affected == 0 {
                return Err(StoreError::NotFound("status"));
            }
            Ok(())
        })
    }

    /// The status assigned to newly created todos: lowest `sort_order`,
    /// regardless of the `is_done` flag.
    pub fn first_status_id(&self, user_id: &Uuid) -> Result<Option<Uuid>, StoreError> {
        self.with_conn(|conn| query_first_status_id(conn, user_id))
    }

    /// The status that counts as completion: the one flagged `is_done`.
    /// Distinct from [`Database::first_status_id`]; do not confuse the two.
    pub fn done_status_id(&self, user_id: &Uuid) -> Result<Option<Uuid>, StoreError> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT id FROM statuses WHERE user_id = ?1 AND is_done = 1 LIMIT 1",
                    [user_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            parse_opt_uuid(raw)
        })
    }
}

pub(crate) fn query_first_status_id(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Uuid>, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT id FROM statuses WHERE user_id = ?1 ORDER BY sort_order ASC LIMIT 1",
            [user_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    parse_opt_uuid(raw)
}

/// Returns the `is_done` flag of a status iff it exists and belongs to the
/// user.
pub(crate) fn query_status_is_done(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<bool>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT is_done FROM statuses WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
            |row| row.get(0),
        )
        .optional()?)
}

fn query_status_by_id(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Status>, StoreError> {
    let sql = format!("SELECT {STATUS_COLS} FROM statuses WHERE id = ?1 AND user_id = ?2");
    Ok(conn
        .query_row(
            &sql,
            params![id.to_string(), user_id.to_string()],
            status_from_row,
        )
        .optional()?)
}

fn parse_opt_uuid(raw: Option<String>) -> Result<Option<Uuid>, StoreError> {
    raw.map(|s| {
        Uuid::parse_str(&s).map_err(|e| StoreError::Internal(format!("bad uuid in statuses: {e}")))
    })
    .transpose()
}

/// `["name = ?", "color = ?"]` → `"name = ?1, color = ?2"`.
fn numbered(fields: &[&str]) -> String {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| f.replace('?', &format!("?{}", i + 1)))
        .collect::<Vec<_>>()
        .join(", ")
}
