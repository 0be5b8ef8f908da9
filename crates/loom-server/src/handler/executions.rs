//! Execution lifecycle handlers: manual runs, retries, and listing.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use loom_nats::{ExecutionEntry, ExecutionPayload, ExecutionQueue, QueuePriority, TriggerKind};
use loom_postgres::query::{WorkflowExecutionRepository, WorkflowRepository, WorkflowVersionRepository};
use std::sync::Arc;

use super::request::{CreateExecution, ExecutionFilter};
use super::response::{Execution, ExecutionAck, ExecutionsPage, Page};
use crate::extract::{AuthState, Json, Path, PgPool, Query};
use crate::handler::Result;
use crate::handler::error::ErrorKind;
use crate::handler::request::ExecutionPathParams;
use crate::service::ServiceState;

/// Tracing target for execution operations.
const TRACING_TARGET: &str = "loom_server::handler::executions";

/// Starts a manual execution of a workflow's currently deployed version.
#[tracing::instrument(skip_all, fields(organization_id = %auth_state.organization_id, workflow_id = %request.workflow_id))]
async fn create_execution(
    State(queue): State<Arc<ExecutionQueue>>,
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    Json(request): Json<CreateExecution>,
) -> Result<(StatusCode, Json<ExecutionAck>)> {
    let organization_id = auth_state.organization_id;

    let workflow = conn
        .find_workflow_in_organization(organization_id, request.workflow_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Workflow not found").with_resource("workflow"))?;

    let version_number = workflow
        .active_version
        .ok_or_else(|| ErrorKind::NotFound.with_message("Workflow has no deployed version").with_resource("workflow"))?;

    let version = conn
        .find_workflow_version_by_number(workflow.id, version_number)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Deployed version not found").with_resource("workflow_version"))?;

    let trigger_data = request.trigger_data.clone().unwrap_or(serde_json::Value::Null);
    let new_execution = request.into_model(organization_id, version.id);
    let execution = conn.create_workflow_execution(new_execution).await?;

    let entry = ExecutionEntry::new(
        execution.id,
        execution.workflow_id,
        organization_id,
        QueuePriority::Manual,
        ExecutionPayload { trigger_type: TriggerKind::Manual, trigger_data, resume_state: None, resume_node_id: None },
    );
    queue.enqueue(&entry).await?;

    tracing::info!(target: TRACING_TARGET, execution_id = %execution.id, "execution enqueued");

    Ok((StatusCode::ACCEPTED, Json(ExecutionAck::new(execution.id))))
}

fn create_execution_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Start a manual execution")
        .description("Runs a workflow's currently deployed version with an optional trigger payload.")
        .response::<202, Json<ExecutionAck>>()
        .response::<403, ()>()
        .response::<404, ()>()
}

/// Re-enqueues a failed or timed-out execution for another attempt.
#[tracing::instrument(skip_all, fields(organization_id = %auth_state.organization_id, execution_id = %path.id))]
async fn retry_execution(
    State(queue): State<Arc<ExecutionQueue>>,
    auth_state: AuthState,
    Path(path): Path<ExecutionPathParams>,
    PgPool(mut conn): PgPool,
) -> Result<(StatusCode, Json<ExecutionAck>)> {
    let organization_id = auth_state.organization_id;

    let execution = conn
        .find_execution_in_organization(organization_id, path.id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Execution not found").with_resource("execution"))?;

    if !execution.status.is_retryable() {
        return Err(ErrorKind::Conflict
            .with_message("Execution is not in a retryable state")
            .with_context(format!("current status is {}", execution.status))
            .with_resource("execution"));
    }

    let update = loom_postgres::model::UpdateWorkflowExecution {
        status: Some(loom_postgres::types::ExecutionStatus::Queued),
        attempt: Some(execution.attempt + 1),
        started_at: Some(None),
        finished_at: Some(None),
        error: Some(None),
        ..Default::default()
    };
    conn.update_workflow_execution(execution.id, update).await?;

    let entry = ExecutionEntry::new(
        execution.id,
        execution.workflow_id,
        organization_id,
        QueuePriority::Manual,
        ExecutionPayload {
            trigger_type: TriggerKind::Manual,
            trigger_data: execution.trigger_data.clone(),
            resume_state: None,
            resume_node_id: None,
        },
    );
    queue.enqueue(&entry).await?;

    tracing::info!(target: TRACING_TARGET, execution_id = %execution.id, "execution retried");

    Ok((StatusCode::ACCEPTED, Json(ExecutionAck::new(execution.id))))
}

fn retry_execution_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Retry an execution")
        .description("Replays a failed, timed-out, or cancelled execution for another attempt.")
        .response::<202, Json<ExecutionAck>>()
        .response::<403, ()>()
        .response::<409, ()>()
}

/// Returns a single execution, scoped to the caller's organization.
#[tracing::instrument(skip_all, fields(organization_id = %auth_state.organization_id, execution_id = %path.id))]
async fn get_execution(
    auth_state: AuthState,
    Path(path): Path<ExecutionPathParams>,
    PgPool(mut conn): PgPool,
) -> Result<Json<Execution>> {
    let execution = conn
        .find_execution_in_organization(auth_state.organization_id, path.id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Execution not found").with_resource("execution"))?;

    Ok(Json(Execution::from_model(execution)))
}

fn get_execution_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get an execution")
        .description("Returns a single execution's status, outputs, and timing.")
        .response::<200, Json<Execution>>()
        .response::<403, ()>()
        .response::<404, ()>()
}

/// Lists executions for the caller's organization, newest first.
#[tracing::instrument(skip_all, fields(organization_id = %auth_state.organization_id, status = ?filter.status))]
async fn list_executions(
    auth_state: AuthState,
    Query(filter): Query<ExecutionFilter>,
    PgPool(mut conn): PgPool,
) -> Result<Json<ExecutionsPage>> {
    let pagination = filter.into_cursor_pagination();
    let page = conn
        .cursor_list_executions(auth_state.organization_id, filter.status, pagination)
        .await?;

    let page = page.map(Execution::from_model);
    Ok(Json(Page::from(page)))
}

fn list_executions_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List executions")
        .description("Cursor-paginated list of executions scoped to the caller's organization.")
        .response::<200, Json<ExecutionsPage>>()
        .response::<400, ()>()
}

/// Returns an [`ApiRouter`] with all execution routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/executions",
            post_with(create_execution, create_execution_docs)
                .get_with(list_executions, list_executions_docs),
        )
        .api_route("/executions/{id}", get_with(get_execution, get_execution_docs))
        .api_route("/executions/{id}/retry", post_with(retry_execution, retry_execution_docs))
        .with_path_items(|item| item.tag("Executions"))
}
