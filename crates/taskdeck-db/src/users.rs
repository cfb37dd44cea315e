use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use taskdeck_types::models::User;
use taskdeck_types::now_ms;

use crate::models::user_from_row;
use crate::{Database, StoreError};

const USER_COLS: &str = "id, email, name, password, created_at, updated_at";

impl Database {
    /// Inserts a new user. Hashing is the caller's concern — `password_hash`
    /// is stored verbatim.
    pub fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let id = Uuid::new_v4();
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, name, password, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id.to_string(), email, name, password_hash, now, now],
            )?;
            query_user_by_id(conn, &id)?.ok_or(StoreError::NotFound("user"))
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLS} FROM users WHERE email = ?1");
            Ok(conn
                .query_row(&sql, [email], user_from_row)
                .optional()?)
        })
    }

    pub fn user_by_id(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }
}

fn query_user_by_id(conn: &Connection, id: &Uuid) -> Result<Option<User>, StoreError> {
    let sql = format!("SELECT {USER_COLS} FROM users WHERE id = ?1");
    Ok(conn
        .query_row(&sql, [id.to_string()], user_from_row)
        .optional()?)
}
