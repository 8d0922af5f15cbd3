use sqlx::SqliteConnection;

use crate::models::{Event, EventPayload};

const LIST_EVENTS: &str = "SELECT e.id, e.title, e.date, e.venue, e.description, e.org_id, o.name AS org_name
    FROM events e LEFT JOIN orgs o ON e.org_id = o.id
    ORDER BY datetime(e.date) DESC, e.id DESC";

const FIND_EVENT: &str = "SELECT e.id, e.title, e.date, e.venue, e.description, e.org_id, o.name AS org_name
    FROM events e LEFT JOIN orgs o ON e.org_id = o.id
    WHERE e.id = ?";

/// All events with their organization name, latest date first.
/// Dates SQLite cannot parse sort after every valid one.
pub async fn list_events(conn: &mut SqliteConnection) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(LIST_EVENTS)
        .fetch_all(&mut *conn)
        .await
}

pub async fn find_event(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(FIND_EVENT)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Inserts the payload and reads the new row back with its `org_name`.
pub async fn create_event(
    conn: &mut SqliteConnection,
    payload: &EventPayload,
) -> Result<Event, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO events (title, date, venue, description, org_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(payload.title.as_deref())
    .bind(payload.date.as_deref())
    .bind(payload.venue.as_deref())
    .bind(payload.description.as_deref())
    .bind(payload.org_id)
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(event_id = id, "Event created");

    sqlx::query_as::<_, Event>(FIND_EVENT)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

/// Overwrites every mutable column, writing `NULL` for absent payload fields.
/// Returns `None` when no event has this id.
pub async fn update_event(
    conn: &mut SqliteConnection,
    id: i64,
    payload: &EventPayload,
) -> Result<Option<Event>, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE events SET title = ?, date = ?, venue = ?, description = ?, org_id = ? WHERE id = ?",
    )
    .bind(payload.title.as_deref())
    .bind(payload.date.as_deref())
    .bind(payload.venue.as_deref())
    .bind(payload.description.as_deref())
    .bind(payload.org_id)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(event_id = id, rows = result.rows_affected(), "Event updated");

    find_event(conn, id).await
}

/// Hard delete. Returns the number of rows removed, 0 for an unknown id.
pub async fn delete_event(conn: &mut SqliteConnection, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(event_id = id, rows = result.rows_affected(), "Event deleted");
    Ok(result.rows_affected())
}
