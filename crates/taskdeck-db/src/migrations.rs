use rusqlite::Connection;
use tracing::info;

use crate::StoreError;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL,
            password    TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS statuses (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            name        TEXT NOT NULL,
            color       TEXT NOT NULL,
            is_done     INTEGER NOT NULL DEFAULT 0,
            sort_order  INTEGER NOT NULL,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_statuses_user
            ON statuses(user_id, sort_order);

        CREATE TABLE IF NOT EXISTS todos (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            text        TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            priority    TEXT NOT NULL DEFAULT 'medium',
            category    TEXT,
            tags        TEXT,
            deadline    INTEGER,
            status_id   TEXT REFERENCES statuses(id),
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_todos_user
            ON todos(user_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_todos_status
            ON todos(status_id);

        CREATE TABLE IF NOT EXISTS push_subscriptions (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            endpoint    TEXT NOT NULL,
            p256dh      TEXT NOT NULL,
            auth        TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL,
            UNIQUE(user_id, endpoint)
        );

        CREATE TABLE IF NOT EXISTS notification_settings (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL UNIQUE REFERENCES users(id),
            push_enabled        INTEGER NOT NULL DEFAULT 1,
            new_todo_enabled    INTEGER NOT NULL DEFAULT 1,
            deadline_enabled    INTEGER NOT NULL DEFAULT 1,
            completed_enabled   INTEGER NOT NULL DEFAULT 0,
            updated_enabled     INTEGER NOT NULL DEFAULT 1,
            created_at          INTEGER NOT NULL,
            updated_at          INTEGER NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
