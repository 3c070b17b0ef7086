// src/services/activity.rs

use sqlx::{Connection, SqliteConnection};

use crate::models::activity::Target;

/// Records a business event in `activity_logs`.
///
/// Fire-and-forget: the insert runs inside a savepoint of the caller's
/// transaction, so a failing log write is rolled back on its own and the
/// caller's primary effect still commits. Failures are reported through
/// `tracing` only.
pub async fn log_activity(
    conn: &mut SqliteConnection,
    user_id: i64,
    action: &str,
    target: Option<Target>,
) {
    let mut savepoint = match conn.begin().await {
        Ok(sp) => sp,
        Err(e) => {
            tracing::warn!(user_id, "Failed to open activity log savepoint: {:?}", e);
            return;
        }
    };

    let result = sqlx::query(
        "INSERT INTO activity_logs (user_id, action, target_type, target_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(action)
    .bind(target.map(|t| t.kind()))
    .bind(target.map(|t| t.id()))
    .execute(&mut *savepoint)
    .await;

    match result {
        Ok(_) => {
            if let Err(e) = savepoint.commit().await {
                tracing::warn!(user_id, "Failed to release activity log savepoint: {:?}", e);
            }
        }
        Err(e) => {
            tracing::warn!(user_id, action, "Failed to write activity log: {:?}", e);
            if let Err(e) = savepoint.rollback().await {
                tracing::warn!(user_id, "Failed to roll back activity log savepoint: {:?}", e);
            }
        }
    }
}
