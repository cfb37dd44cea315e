//! Push notification fan-out. VAPID signing and delivery are an external
//! capability behind [`PushTransport`]; the dispatcher owns the policy:
//! send to every subscription concurrently, drop subscriptions the push
//! service reports as gone, and never let a delivery failure escape into a
//! task mutation.

mod transport;

pub use transport::WebPushTransport;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use taskdeck_db::Database;
use taskdeck_types::models::PushSubscription;

/// Outcome of one delivery attempt.
#[derive(Debug)]
pub enum SendFailure {
    /// The push service answered 404 or 410: the endpoint is permanently
    /// invalid and the subscription must be dropped.
    Gone,
    Other(String),
}

#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), SendFailure>;
}

/// One notification, before fan-out.
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub data: serde_json::Value,
}

const DEFAULT_ICON: &str = "/web-app-manifest-192x192.png";

#[derive(Clone)]
pub struct PushDispatcher {
    transport: Option<Arc<dyn PushTransport>>,
    public_key: Option<String>,
}

impl PushDispatcher {
    pub fn new(transport: Arc<dyn PushTransport>, public_key: String) -> Self {
        Self {
            transport: Some(transport),
            public_key: Some(public_key),
        }
    }

    /// Dispatcher for deployments without VAPID keys: sends are skipped and
    /// the public-key route reports unconfigured.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            public_key: None,
        }
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// Sends `msg` to every subscription of `user_id`. All attempts settle;
    /// gone endpoints are deleted as a side effect; every failure is logged
    /// and swallowed. Mutation paths rely on this never returning an error.
    pub async fn notify(&self, db: Arc<Database>, user_id: Uuid, msg: PushMessage) {
        let Some(transport) = &self.transport else {
            debug!("push not configured, skipping notification");
            return;
        };

        let subs = {
            let db = db.clone();
            match tokio::task::spawn_blocking(move || db.subscriptions_for_user(&user_id)).await {
                Ok(Ok(subs)) => subs,
                Ok(Err(e)) => {
                    warn!("failed to load push subscriptions: {e}");
                    return;
                }
                Err(e) => {
                    warn!("subscription load task failed: {e}");
                    return;
                }
            }
        };
        if subs.is_empty() {
            return;
        }

        let payload = json!({
            "title": msg.title,
            "body": msg.body,
            "icon": DEFAULT_ICON,
            "badge": DEFAULT_ICON,
            "tag": msg.tag,
            "data": msg.data,
        })
        .to_string()
        .into_bytes();

        let attempts = subs.iter().map(|sub| {
            let payload = &payload;
            async move { (sub, transport.send(sub, payload).await) }
        });

        for (sub, result) in join_all(attempts).await {
            match result {
                Ok(()) => {}
                Err(SendFailure::Gone) => {
                    debug!("push endpoint gone, dropping subscription: {}", sub.endpoint);
                    let db = db.clone();
                    let endpoint = sub.endpoint.clone();
                    let outcome = tokio::task::spawn_blocking(move || {
                        db.delete_subscription(&user_id, &endpoint)
                    })
                    .await;
                    if let Ok(Err(e)) = outcome {
                        warn!("failed to drop gone subscription: {e}");
                    }
                }
                Err(SendFailure::Other(e)) => {
                    warn!("push send to {} failed: {e}", sub.endpoint);
                }
            }
        }
    }
}
