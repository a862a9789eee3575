use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::audit_logs::ActiveModel as AuditActive,
    error::AppResult,
};

pub async fn log_audit(
    conn: &OrmConn,
    actor_id: Option<Uuid>,
    action: &str,
    resource: &str,
    resource_id: Option<String>,
    metadata: Option<Value>,
) -> AppResult<()> {
    AuditActive {
        id: Set(Uuid::new_v4()),
        actor_id: Set(actor_id),
        action: Set(action.to_string()),
        resource: Set(resource.to_string()),
        resource_id: Set(resource_id),
        metadata: Set(metadata),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;

    Ok(())
}

/// Like [`log_audit`], but a failure is only logged.
pub async fn log_audit_best_effort(
    conn: &OrmConn,
    actor_id: Option<Uuid>,
    action: &str,
    resource: &str,
    resource_id: Option<String>,
    metadata: Option<Value>,
) {
    if let Err(err) = log_audit(conn, actor_id, action, resource, resource_id, metadata).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
