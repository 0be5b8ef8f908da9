//! Public webhook ingress: verifies, dedupes, logs, and enqueues inbound
//! deliveries against a registered webhook trigger.

use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use jiff::SignedDuration;
use loom_nats::{DedupeOutcome, DedupeStore, ExecutionEntry, ExecutionPayload, ExecutionQueue, QueuePriority, TriggerKind};
use loom_postgres::model::{NewWebhookLog, NewWorkflowExecution};
use loom_postgres::query::{WebhookLogRepository, WorkflowExecutionRepository, WorkflowRepository, WorkflowVersionRepository};
use loom_postgres::types::WebhookLogSource;
use loom_webhook::{IncomingWebhook, SignatureStrategy, verify_delivery};

use super::request::WebhookPathParams;
use super::response::WebhookAck;
use crate::extract::{Json, Path, PgPool};
use crate::handler::Result;
use crate::handler::error::ErrorKind;
use crate::service::{RateLimitKey, RateLimiter, ServiceState, TriggerRegistry};

/// Tracing target for webhook ingress operations.
const TRACING_TARGET: &str = "loom_server::handler::webhooks";

/// Dedupe ledger TTL: long enough to cover provider retry windows.
const DEDUPE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Maps a trigger's connector app id to its signature verification strategy.
fn strategy_for_app(app_id: &str) -> SignatureStrategy {
    match app_id {
        "slack" => SignatureStrategy::SlackV0,
        "github" => SignatureStrategy::GithubHmacSha256,
        "stripe" => SignatureStrategy::StripeSha256,
        _ => SignatureStrategy::GenericHmacSha256,
    }
}

/// Accepts an inbound webhook delivery: verifies its signature, dedupes it,
/// and enqueues the resulting execution.
#[tracing::instrument(skip_all, fields(webhook_id = %path.id))]
async fn ingest_webhook(
    State(rate_limiter): State<RateLimiter>,
    State(dedupe_store): State<DedupeStore>,
    State(queue): State<Arc<ExecutionQueue>>,
    State(service_state): State<ServiceState>,
    State(trigger_registry): State<TriggerRegistry>,
    Path(path): Path<WebhookPathParams>,
    PgPool(mut conn): PgPool,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>)> {
    rate_limiter.check(RateLimitKey::from_webhook_id(path.id.clone())).await?;

    let trigger = trigger_registry
        .find_by_endpoint(&path.id)
        .await
        .ok_or_else(|| ErrorKind::NotFound.with_message("Unknown or inactive webhook").with_resource("webhook"))?;

    let headers_map = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
        .collect();
    let webhook = IncomingWebhook::new(headers_map, body.to_vec());

    if let Some(secret) = trigger.secret.as_deref() {
        if let Err(error) = verify_delivery(
            strategy_for_app(&trigger.app_id),
            secret,
            &webhook,
            SignedDuration::from_secs(service_state.webhook_replay_tolerance_seconds()),
        ) {
            let log = NewWebhookLog {
                trigger_id: trigger.id,
                organization_id: trigger.organization_id,
                source: WebhookLogSource::SignatureRejected,
                processed: false,
                payload_digest: webhook.body_digest(),
                error: Some(error.to_string()),
                execution_id: None,
            };
            conn.create_webhook_log(log).await?;
            return Err(error.into());
        }
    }

    let dedupe_token = webhook.header("X-Event-Id").map(str::to_owned).unwrap_or_else(|| webhook.body_digest());
    let dedupe_scope = format!("webhook.{}", trigger.id);
    let outcome = dedupe_store.record_if_absent(&dedupe_scope, &dedupe_token, DEDUPE_TTL_MS).await?;

    if outcome == DedupeOutcome::Duplicate {
        tracing::info!(target: TRACING_TARGET, trigger_id = %trigger.id, "duplicate delivery, no side effects");
        return Ok((StatusCode::OK, Json(WebhookAck::duplicate())));
    }

    let workflow = conn
        .find_workflow_in_organization(trigger.organization_id, trigger.workflow_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Workflow not found").with_resource("workflow"))?;

    let version_number = workflow
        .active_version
        .ok_or_else(|| ErrorKind::NotFound.with_message("Workflow has no deployed version").with_resource("workflow"))?;

    let version = conn
        .find_workflow_version_by_number(workflow.id, version_number)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Deployed version not found").with_resource("workflow_version"))?;

    let trigger_data = webhook.body_as_json().unwrap_or(serde_json::Value::Null);

    let new_execution = NewWorkflowExecution {
        workflow_id: workflow.id,
        workflow_version_id: version.id,
        organization_id: trigger.organization_id,
        trigger_id: Some(trigger.id),
        priority: QueuePriority::Default.to_string(),
        trigger_data: trigger_data.clone(),
    };
    let execution = conn.create_workflow_execution(new_execution).await?;

    let entry = ExecutionEntry::new(
        execution.id,
        execution.workflow_id,
        trigger.organization_id,
        QueuePriority::Default,
        ExecutionPayload { trigger_type: TriggerKind::Webhook, trigger_data, resume_state: None, resume_node_id: None },
    );
    let enqueued = queue.enqueue(&entry).await;

    let log = NewWebhookLog {
        trigger_id: trigger.id,
        organization_id: trigger.organization_id,
        source: WebhookLogSource::Ingress,
        processed: enqueued.is_ok(),
        payload_digest: webhook.body_digest(),
        error: enqueued.as_ref().err().map(ToString::to_string),
        execution_id: enqueued.is_ok().then_some(execution.id),
    };
    conn.create_webhook_log(log).await?;
    enqueued?;

    tracing::info!(target: TRACING_TARGET, execution_id = %execution.id, "webhook delivery enqueued");

    Ok((StatusCode::OK, Json(WebhookAck::new(execution.id))))
}

fn ingest_webhook_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Ingest a webhook delivery")
        .description("Verifies the delivery's signature, dedupes it, and enqueues the resulting execution.")
        .response::<200, Json<WebhookAck>>()
        .response::<400, ()>()
        .response::<404, ()>()
        .response::<429, ()>()
}

/// Returns an [`ApiRouter`] with the webhook ingress route.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/webhooks/{id}", post_with(ingest_webhook, ingest_webhook_docs))
        .with_path_items(|item| item.tag("Webhooks"))
}
