use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use taskdeck_api::{AppState, AppStateInner};
use taskdeck_push::{PushDispatcher, WebPushTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("TASKDECK_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("TASKDECK_DB_PATH").unwrap_or_else(|_| "taskdeck.db".into());
    let host = std::env::var("TASKDECK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TASKDECK_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let token_days: i64 = std::env::var("TASKDECK_JWT_DAYS")
        .unwrap_or_else(|_| "7".into())
        .parse()?;

    // Init database
    let db = Arc::new(taskdeck_db::Database::open(&PathBuf::from(&db_path))?);

    // Web push is optional; without VAPID keys the push endpoints report 503
    // and notification triggers are no-ops.
    let push = match (
        std::env::var("VAPID_PUBLIC_KEY"),
        std::env::var("VAPID_PRIVATE_KEY"),
    ) {
        (Ok(public_key), Ok(private_key)) => {
            let subject = std::env::var("VAPID_SUBJECT")
                .unwrap_or_else(|_| "mailto:admin@taskdeck.app".into());
            let transport = WebPushTransport::new(private_key, subject);
            PushDispatcher::new(Arc::new(transport), public_key)
        }
        _ => {
            warn!("VAPID keys not set, push notifications disabled");
            PushDispatcher::disabled()
        }
    };

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        token_days,
        push,
    });

    let app = taskdeck_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Taskdeck server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
