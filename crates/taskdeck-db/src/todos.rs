use rusqlite::{Connection, OptionalExtension, ToSql, params};
use uuid::Uuid;

use taskdeck_types::api::{CreateTodoRequest, UpdateTodoRequest};
use taskdeck_types::models::Todo;
use taskdeck_types::now_ms;

use crate::models::todo_from_row;
use crate::statuses::{query_first_status_id, query_status_is_done};
use crate::{Database, StoreError};

const TODO_COLS: &str =
    "id, user_id, text, completed, priority, category, tags, deadline, status_id, created_at, updated_at";

impl Database {
    /// Creates a todo. When no status is supplied the user's lowest-ordered
    /// status is assigned; a todo landing on the completion status is forced
    /// `completed = true` whatever the payload said.
    pub fn create_todo(&self, user_id: &Uuid, req: &CreateTodoRequest) -> Result<Todo, StoreError> {
        let id = Uuid::new_v4();
        let now = now_ms();
        self.with_conn(|conn| {
            let status_id = match req.status_id {
                Some(sid) => {
                    if query_status_is_done(conn, &sid, user_id)?.is_none() {
                        return Err(StoreError::NotFound("status"));
                    }
                    Some(sid)
                }
                None => query_first_status_id(conn, user_id)?,
            };

            let mut completed = req.completed.unwrap_or(false);
            if let Some(sid) = &status_id {
                if query_status_is_done(conn, sid, user_id)?.unwrap_or(false) {
                    completed = true;
                }
            }

            let tags_json = req
                .tags
                .as_ref()
                .map(|t| serde_json::to_string(t))
                .transpose()
                .map_err(|e| StoreError::Internal(format!("tag encode: {e}")))?;

            conn.execute(
                "INSERT INTO todos (id, user_id, text, completed, priority, category, tags, deadline, status_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    id.to_string(),
                    user_id.to_string(),
                    req.text,
                    completed,
                    req.priority.unwrap_or_default().as_str(),
                    req.category,
                    tags_json,
                    req.deadline,
                    status_id.map(|s| s.to_string()),
                    now,
                    now
                ],
            )?;

            query_todo_by_id(conn, &id, user_id)?.ok_or(StoreError::NotFound("task"))
        })
    }

    pub fn todo_by_id(&self, id: &Uuid, user_id: &Uuid) -> Result<Todo, StoreError> {
        self.with_conn(|conn| {
            query_todo_by_id(conn, id, user_id)?.ok_or(StoreError::NotFound("task"))
        })
    }

    /// Newest-created first.
    pub fn todos_for_user(&self, user_id: &Uuid) -> Result<Vec<Todo>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TODO_COLS} FROM todos WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], todo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Partial update. Moving a todo onto the completion status forces
    /// `completed = true`, overriding an explicit `completed: false` in the
    /// same payload. `updated_at` always refreshes.
    pub fn update_todo(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        req: &UpdateTodoRequest,
    ) -> Result<Todo, StoreError> {
        let now = now_ms();
        self.with_conn(|conn| {
            let mut fields: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(text) = &req.text {
                fields.push("text = ?");
                values.push(Box::new(text.clone()));
            }
            if let Some(completed) = req.completed {
                fields.push("completed = ?");
                values.push(Box::new(completed));
            }
            if let Some(priority) = req.priority {
                fields.push("priority = ?");
                values.push(Box::new(priority.as_str()));
            }
            if let Some(tags) = &req.tags {
                let tags_json = serde_json::to_string(tags)
                    .map_err(|e| StoreError::Internal(format!("tag encode: {e}")))?;
                fields.push("tags = ?");
                values.push(Box::new(tags_json));
            }
            if let Some(category) = &req.category {
                fields.push("category = ?");
                values.push(Box::new(category.clone()));
            }
            if let Some(deadline) = req.deadline {
                fields.push("deadline = ?");
                values.push(Box::new(deadline));
            }
            if let Some(status_id) = &req.status_id {
                fields.push("status_id = ?");
                values.push(Box::new(status_id.map(|s| s.to_string())));

                if let Some(sid) = status_id {
                    match query_status_is_done(conn, sid, user_id)? {
                        None => return Err(StoreError::NotFound("status")),
                        Some(true) => {
                            // Completion status wins over the payload's own
                            // `completed` value.
                            fields.push("completed = ?");
                            values.push(Box::new(true));
                        }
                        Some(false) => {}
                    }
                }
            }

            fields.push("updated_at = ?");
            values.push(Box::new(now));
            values.push(Box::new(id.to_string()));
            values.push(Box::new(user_id.to_string()));

            let sql = format!(
                "UPDATE todos SET {} WHERE id = ?{} AND user_id = ?{}",
                numbered(&fields),
                fields.len() + 1,
                fields.len() + 2
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;

            query_todo_by_id(conn, id, user_id)?.ok_or(StoreError::NotFound("task"))
        })
    }

    pub fn delete_todo(&self, id: &Uuid, user_id: &Uuid) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM todos WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
            )?;
            if affected == 0 {
                return Err(StoreError::NotFound("task"));
            }
            Ok(())
        })
    }
}

fn query_todo_by_id(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Todo>, StoreError> {
    let sql = format!("SELECT {TODO_COLS} FROM todos WHERE id = ?1 AND user_id = ?2");
    Ok(conn
        .query_row(
            &sql,
            params![id.to_string(), user_id.to_string()],
            todo_from_row,
        )
        .optional()?)
}

/// `["text = ?", "completed = ?"]` → `"text = ?1, completed = ?2"`.
fn numbered(fields: &[&str]) -> String {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| f.replace('?', &format!("?{}", i + 1)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_types::models::Priority;

    fn seeded_db() -> (Database, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("a@b.c", "A", "hash").unwrap();
        db.seed_default_statuses(&user.id).unwrap();
        (db, user.id)
    }

    fn new_todo(db: &Database, uid: &Uuid, text: &str) -> Todo {
        db.create_todo(
            uid,
            &CreateTodoRequest {
                text: text.into(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn create_assigns_lowest_ordered_status_by_default() {
        let (db, uid) = seeded_db();
        let todo = new_todo(&db, &uid, "defaults");
        assert_eq!(todo.status_id, db.first_status_id(&uid).unwrap());
        assert!(!todo.completed);
        assert_eq!(todo.priority, Priority::Medium);
    }

    #[test]
    fn moving_to_done_status_forces_completed() {
        let (db, uid) = seeded_db();
        let done = db.done_status_id(&uid).unwrap().unwrap();
        let todo = new_todo(&db, &uid, "finish me");

        // The payload explicitly claims the todo is not completed; the
        // completion status overrides it.
        let updated = db
            .update_todo(
                &todo.id,
                &uid,
                &UpdateTodoRequest {
                    completed: Some(false),
                    status_id: Some(Some(done)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.status_id, Some(done));
    }

    #[test]
    fn creating_directly_on_done_status_forces_completed() {
        let (db, uid) = seeded_db();
        let done = db.done_status_id(&uid).unwrap().unwrap();
        let todo = db
            .create_todo(
                &uid,
                &CreateTodoRequest {
                    text: "born done".into(),
                    completed: Some(false),
                    status_id: Some(done),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(todo.completed);
    }

    #[test]
    fn tags_round_trip_in_order() {
        let (db, uid) = seeded_db();
        let todo = db
            .create_todo(
                &uid,
                &CreateTodoRequest {
                    text: "tagged".into(),
                    tags: Some(vec!["a".into(), "b".into(), "c".into()]),
                    ..Default::default()
                },
            )
            .unwrap();
        let fetched = db.todo_by_id(&todo.id, &uid).unwrap();
        assert_eq!(fetched.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn corrupt_tags_read_back_as_empty() {
        let (db, uid) = seeded_db();
        let todo = new_todo(&db, &uid, "bad tags");
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE todos SET tags = 'not json' WHERE id = ?1",
                [todo.id.to_string()],
            )?;
            Ok(())
        })
        .unwrap();

        let fetched = db.todo_by_id(&todo.id, &uid).unwrap();
        assert!(fetched.tags.is_empty());
    }

    #[test]
    fn partial_update_clears_only_explicit_nulls() {
        let (db, uid) = seeded_db();
        let todo = db
            .create_todo(
                &uid,
                &CreateTodoRequest {
                    text: "deadline".into(),
                    deadline: Some(5000),
                    category: Some("home".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        // Deadline cleared, category untouched.
        let updated = db
            .update_todo(
                &todo.id,
                &uid,
                &UpdateTodoRequest {
                    deadline: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.deadline, None);
        assert_eq!(updated.category.as_deref(), Some("home"));
        assert!(updated.updated_at >= todo.updated_at);
    }

    #[test]
    fn list_is_newest_first() {
        let (db, uid) = seeded_db();
        new_todo(&db, &uid, "first");
        new_todo(&db, &uid, "second");
        new_todo(&db, &uid, "third");

        let todos = db.todos_for_user(&uid).unwrap();
        let texts: Vec<&str> = todos.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[test]
    fn foreign_todos_are_invisible() {
        let (db, uid) = seeded_db();
        let other = db.create_user("x@y.z", "X", "hash").unwrap();
        db.seed_default_statuses(&other.id).unwrap();
        let theirs = new_todo(&db, &other.id, "not yours");

        assert!(matches!(
            db.todo_by_id(&theirs.id, &uid),
            Err(StoreError::NotFound("task"))
        ));
        assert!(matches!(
            db.update_todo(
                &theirs.id,
                &uid,
                &UpdateTodoRequest {
                    text: Some("hijack".into()),
                    ..Default::default()
                }
            ),
            Err(StoreError::NotFound("task"))
        ));
        assert!(matches!(
            db.delete_todo(&theirs.id, &uid),
            Err(StoreError::NotFound("task"))
        ));

        // And the row is untouched.
        let still = db.todo_by_id(&theirs.id, &other.id).unwrap();
        assert_eq!(still.text, "not yours");
    }

    #[test]
    fn cannot_attach_another_users_status() {
        let (db, uid) = seeded_db();
        let other = db.create_user("x@y.z", "X", "hash").unwrap();
        db.seed_default_statuses(&other.id).unwrap();
        let foreign_status = db.first_status_id(&other.id).unwrap().unwrap();

        let result = db.create_todo(
            &uid,
            &CreateTodoRequest {
                text: "sneaky".into(),
                status_id: Some(foreign_status),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::NotFound("status"))));
    }
}
