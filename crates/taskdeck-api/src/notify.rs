//! Notification side effects of task mutations. Everything here is
//! best-effort: failures are logged and swallowed so mutations never fail
//! because of notification delivery.

use serde_json::json;
use tracing::warn;

use taskdeck_push::PushMessage;
use taskdeck_types::models::{NotificationSettings, Todo};
use taskdeck_types::now_ms;

use crate::AppState;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub(crate) async fn todo_created(state: &AppState, todo: &Todo) {
    let Some(settings) = load_settings(state, todo).await else {
        return;
    };
    if !(settings.push_enabled && settings.new_todo_enabled) {
        return;
    }

    state
        .push
        .notify(
            state.db.clone(),
            todo.user_id,
            PushMessage {
                title: "New task".into(),
                body: truncated(&todo.text, 50),
                tag: format!("todo-{}", todo.id),
                data: json!({ "todoId": todo.id, "type": "new" }),
            },
        )
        .await;
}

pub(crate) async fn todo_updated(
    state: &AppState,
    before: &Todo,
    after: &Todo,
    content_touched: bool,
) {
    let Some(settings) = load_settings(state, after).await else {
        return;
    };
    if !settings.push_enabled {
        return;
    }

    let just_completed = !before.completed && after.completed;
    if just_completed && settings.completed_enabled {
        state
            .push
            .notify(
                state.db.clone(),
                after.user_id,
                PushMessage {
                    title: "Task completed".into(),
                    body: truncated(&after.text, 50),
                    tag: format!("todo-{}-completed", after.id),
                    data: json!({ "todoId": after.id, "type": "completed" }),
                },
            )
            .await;
    } else if !after.completed && content_touched && settings.updated_enabled {
        state
            .push
            .notify(
                state.db.clone(),
                after.user_id,
                PushMessage {
                    title: "Task updated".into(),
                    body: truncated(&after.text, 50),
                    tag: format!("todo-{}-updated", after.id),
                    data: json!({ "todoId": after.id, "type": "updated" }),
                },
            )
            .await;
    }

    // Fires on every update that leaves the deadline inside the 24h window,
    // not only the one that set it.
    if let Some(deadline) = after.deadline {
        let now = now_ms();
        if settings.deadline_enabled && deadline > now && deadline - now <= DAY_MS {
            state
                .push
                .notify(
                    state.db.clone(),
                    after.user_id,
                    PushMessage {
                        title: "Deadline approaching".into(),
                        body: format!("\"{}\" is due soon", truncated(&after.text, 30)),
                        tag: format!("todo-{}-deadline", after.id),
                        data: json!({ "todoId": after.id, "type": "deadline" }),
                    },
                )
                .await;
        }
    }
}

async fn load_settings(state: &AppState, todo: &Todo) -> Option<NotificationSettings> {
    let db = state.db.clone();
    let user_id = todo.user_id;
    match tokio::task::spawn_blocking(move || db.settings_for_user(&user_id)).await {
        Ok(Ok(settings)) => Some(settings),
        Ok(Err(e)) => {
            warn!("failed to load notification settings: {e}");
            None
        }
        Err(e) => {
            warn!("settings load task failed: {e}");
            None
        }
    }
}

fn truncated(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}
