//! Resume token consumption: continuing a suspended execution.

use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use jiff::Timestamp;
use loom_nats::{ExecutionEntry, ExecutionPayload, ExecutionQueue, QueuePriority, TriggerKind};
use loom_postgres::model::UpdateWorkflowExecution;
use loom_postgres::query::{ResumeTokenRepository, WorkflowExecutionRepository};
use loom_postgres::types::ExecutionStatus;

use super::request::{ResumeExecution, ResumePathParams};
use super::response::ExecutionAck;
use crate::extract::{AuthState, Json, Path, PgPool};
use crate::handler::Result;
use crate::handler::error::ErrorKind;
use crate::service::{AuthKeys, ServiceState, verify_resume_token};

/// Tracing target for resume operations.
const TRACING_TARGET: &str = "loom_server::handler::resume";

/// Consumes a resume token and re-enqueues the execution it belongs to.
#[tracing::instrument(
    skip_all,
    fields(organization_id = %auth_state.organization_id, execution_id = %path.exec_id, node_id = %path.node_id)
)]
async fn resume_execution(
    State(auth_keys): State<AuthKeys>,
    State(queue): State<Arc<ExecutionQueue>>,
    auth_state: AuthState,
    Path(path): Path<ResumePathParams>,
    PgPool(mut conn): PgPool,
    Json(request): Json<ResumeExecution>,
) -> Result<Json<ExecutionAck>> {
    let organization_id = auth_state.organization_id;
    let now = Timestamp::now();

    let execution = conn
        .find_execution_in_organization(organization_id, path.exec_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Execution not found").with_resource("execution"))?;

    let token = conn
        .find_valid_resume_token(request.token_id, now)
        .await?
        .ok_or_else(|| {
            ErrorKind::Gone
                .with_message("Resume token is invalid or already consumed")
                .with_resource("resume_token")
        })?;

    if token.execution_id != path.exec_id || token.node_id != path.node_id {
        return Err(ErrorKind::BadRequest
            .with_message("Resume token does not match this execution and node")
            .with_resource("resume_token"));
    }

    let signature_valid = verify_resume_token(
        auth_keys.secret_bytes(),
        token.id,
        token.execution_id,
        &token.node_id,
        token.expires_at.into(),
        &request.signature,
    );
    if !signature_valid {
        return Err(ErrorKind::BadRequest
            .with_message("Invalid resume token signature")
            .with_resource("resume_token"));
    }

    let consumed = conn
        .consume_resume_token(token.id, now)
        .await?
        .ok_or_else(|| {
            ErrorKind::Gone
                .with_message("Resume token is invalid or already consumed")
                .with_resource("resume_token")
        })?;

    let update = UpdateWorkflowExecution {
        status: Some(ExecutionStatus::Queued),
        ..Default::default()
    };
    conn.update_workflow_execution(execution.id, update).await?;

    let entry = ExecutionEntry::new(
        execution.id,
        execution.workflow_id,
        organization_id,
        QueuePriority::Resume,
        ExecutionPayload {
            trigger_type: TriggerKind::Resume,
            trigger_data: execution.trigger_data.clone(),
            resume_state: Some(consumed.payload),
            resume_node_id: Some(consumed.node_id),
        },
    );
    queue.enqueue(&entry).await?;

    tracing::info!(target: TRACING_TARGET, execution_id = %execution.id, "execution resumed");

    Ok(Json(ExecutionAck::new(execution.id)))
}

fn resume_execution_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Resume a suspended execution")
        .description("Consumes a resume token minted by a wait node and re-enqueues the execution.")
        .response::<200, Json<ExecutionAck>>()
        .response::<400, ()>()
        .response::<410, ()>()
}

/// Returns an [`ApiRouter`] with the resume route.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/runs/{exec_id}/nodes/{node_id}/resume",
            post_with(resume_execution, resume_execution_docs),
        )
        .with_path_items(|item| item.tag("Executions"))
}
