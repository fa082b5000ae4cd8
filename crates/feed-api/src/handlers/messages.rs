//! Message handlers
//!
//! The store API the admin editor talks to.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use feed_core::CounterDelta;
use feed_service::dto::{
    CreateMessageRequest, DeleteMessageRequest, DeleteResponse, MessageQuery, MessageResponse,
    UpdateMessageRequest,
};
use feed_service::MessageService;
use serde::Serialize;

use crate::extractors::{
    json_rejection, MessageForm, MessageIdPath, OptionalValidatedJson, QueryParams,
};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// List body: the whole feed, or one message when `?id=` is given
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageListing {
    One(MessageResponse),
    All(Vec<MessageResponse>),
}

/// List messages
///
/// GET /api/messages
pub async fn list_messages(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<MessageQuery>,
) -> ApiResult<Json<MessageListing>> {
    let service = MessageService::new(state.service_context());
    let listing = match query.id {
        Some(id) => MessageListing::One(service.get(id).await?),
        None => MessageListing::All(service.list().await?),
    };
    Ok(Json(listing))
}

/// Get message by ID
///
/// GET /api/messages/:id
pub async fn get_message(
    State(state): State<AppState>,
    Path(path): Path<MessageIdPath>,
) -> ApiResult<Json<MessageResponse>> {
    let id = path.message_id()?;
    let response = MessageService::new(state.service_context()).get(id).await?;
    Ok(Json(response))
}

/// Create message
///
/// POST /api/messages
pub async fn create_message(
    State(state): State<AppState>,
    form: MessageForm<CreateMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let response = MessageService::new(state.service_context())
        .create(form.body, form.upload)
        .await?;
    Ok(Created(Json(response)))
}

/// Partially update a message, id in the body
///
/// PATCH /api/messages
pub async fn update_message(
    State(state): State<AppState>,
    form: MessageForm<UpdateMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = MessageService::new(state.service_context())
        .update(form.body, form.upload)
        .await?;
    Ok(Json(response))
}

/// Delete message
///
/// DELETE /api/messages?id=
pub async fn delete_message(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<MessageQuery>,
    OptionalValidatedJson(body): OptionalValidatedJson<DeleteMessageRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = query.id.or_else(|| body.and_then(|b| b.id));
    MessageService::new(state.service_context()).delete(id).await?;
    Ok(Json(DeleteResponse::ok()))
}

/// Apply an atomic counter delta
///
/// POST /api/messages/:id/counters
pub async fn apply_counters(
    State(state): State<AppState>,
    Path(path): Path<MessageIdPath>,
    delta: Result<Json<CounterDelta>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = path.message_id()?;
    let Json(delta) = delta.map_err(json_rejection)?;
    let response = MessageService::new(state.service_context())
        .apply_counters(id, delta)
        .await?;
    Ok(Json(response))
}
