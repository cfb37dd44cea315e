use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use taskdeck_types::models::PushSubscription;
use taskdeck_types::now_ms;

use crate::models::subscription_from_row;
use crate::{Database, StoreError};

const SUB_COLS: &str = "id, user_id, endpoint, p256dh, auth, created_at, updated_at";

impl Database {
    /// Registers a push subscription. Re-subscribing the same endpoint for
    /// the same user refreshes the key material instead of duplicating.
    pub fn upsert_subscription(
        &self,
        user_id: &Uuid,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
    ) -> Result<PushSubscription, StoreError> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO push_subscriptions (id, user_id, endpoint, p256dh, auth, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id, endpoint) DO UPDATE SET
                     p256dh = excluded.p256dh,
                     auth = excluded.auth,
                     updated_at = excluded.updated_at",
                params![
                    Uuid::new_v4().to_string(),
                    user_id.to_string(),
                    endpoint,
                    p256dh,
                    auth,
                    now,
                    now
                ],
            )?;
            query_subscription(conn, user_id, endpoint)?
                .ok_or(StoreError::NotFound("subscription"))
        })
    }

    pub fn subscriptions_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<PushSubscription>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {SUB_COLS} FROM push_subscriptions WHERE user_id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], subscription_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Removing an endpoint that is already gone is not an error.
    pub fn delete_subscription(&self, user_id: &Uuid, endpoint: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM push_subscriptions WHERE user_id = ?1 AND endpoint = ?2",
                params![user_id.to_string(), endpoint],
            )?;
            Ok(())
        })
    }
}

fn query_subscription(
    conn: &Connection,
    user_id: &Uuid,
    endpoint: &str,
) -> Result<Option<PushSubscription>, StoreError> {
    let sql = format!("SELECT {SUB_COLS} FROM push_subscriptions WHERE user_id = ?1 AND endpoint = ?2");
    Ok(conn
        .query_row(&sql, params![user_id.to_string(), endpoint], subscription_from_row)
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_user() -> (Database, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("a@b.c", "A", "hash").unwrap();
        (db, user.id)
    }

    #[test]
    fn resubscribing_upserts_key_material() {
        let (db, uid) = db_with_user();
        let first = db
            .upsert_subscription(&uid, "https://push.example/ep1", "key-a", "auth-a")
            .unwrap();
        let second = db
            .upsert_subscription(&uid, "https://push.example/ep1", "key-b", "auth-b")
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.p256dh, "key-b");
        assert_eq!(db.subscriptions_for_user(&uid).unwrap().len(), 1);
    }

    #[test]
    fn same_endpoint_for_two_users_is_two_rows() {
        let (db, uid) = db_with_user();
        let other = db.create_user("x@y.z", "X", "hash").unwrap();

        db.upsert_subscription(&uid, "https://push.example/ep", "k", "a")
            .unwrap();
        db.upsert_subscription(&other.id, "https://push.example/ep", "k", "a")
            .unwrap();

        assert_eq!(db.subscriptions_for_user(&uid).unwrap().len(), 1);
        assert_eq!(db.subscriptions_for_user(&other.id).unwrap().len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let (db, uid) = db_with_user();
        db.upsert_subscription(&uid, "https://push.example/ep", "k", "a")
            .unwrap();
        db.delete_subscription(&uid, "https://push.example/ep").unwrap();
        db.delete_subscription(&uid, "https://push.example/ep").unwrap();
        assert!(db.subscriptions_for_user(&uid).unwrap().is_empty());
    }
}
