use axum::{
    body::Bytes,
    extract::{Extension, Path},
    response::Response,
};

use crate::db::{events, DbScope};
use crate::models::EventPayload;
use crate::utils::error::AppError;
use crate::utils::response::{created, no_content, not_found, success};

/// `GET /api/events`
pub async fn list_events(Extension(db): Extension<DbScope>) -> Result<Response, AppError> {
    let mut conn = db.connection().await?;
    let events = events::list_events(&mut conn).await?;

    Ok(success(events))
}

/// `POST /api/events`. A body that is not a JSON object counts as `{}`.
pub async fn create_event(
    Extension(db): Extension<DbScope>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = EventPayload::from_body(&body);

    let mut conn = db.connection().await?;
    let event = events::create_event(&mut conn, &payload).await?;

    Ok(created(event))
}

/// `PUT /api/events/{id}`. Replaces every field; an unknown id answers
/// `200` with a `null` body.
pub async fn update_event(
    Path(id): Path<i64>,
    Extension(db): Extension<DbScope>,
    body: Bytes,
) -> Result<Response, AppError> {
    if id < 0 {
        return Ok(not_found());
    }
    let payload = EventPayload::from_body(&body);

    let mut conn = db.connection().await?;
    let event = events::update_event(&mut conn, id, &payload).await?;
    if event.is_none() {
        tracing::debug!(event_id = id, "Update matched no event");
    }

    Ok(success(event))
}

/// `DELETE /api/events/{id}`. Ids are non-negative; a negative one is not
/// a route at all.
pub async fn delete_event(
    Path(id): Path<i64>,
    Extension(db): Extension<DbScope>,
) -> Result<Response, AppError> {
    if id < 0 {
        return Ok(not_found());
    }
    let mut conn = db.connection().await?;
    events::delete_event(&mut conn, id).await?;

    Ok(no_content())
}
