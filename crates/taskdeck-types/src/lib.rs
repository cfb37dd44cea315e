pub mod api;
pub mod models;

/// Current wall-clock time as integer epoch milliseconds, the unit used for
/// every timestamp and deadline on the wire and in the database.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
