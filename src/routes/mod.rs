use axum::{
    routing::{get, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::db::DbScopeLayer;
use crate::handlers::{create_event, delete_event, list_events, list_orgs, update_event};

pub fn create_routes(pool: SqlitePool) -> Router {
    Router::new()
        .route("/api/orgs", get(list_orgs))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/:id", put(update_event).delete(delete_event))
        .layer(DbScopeLayer::new(pool))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
}
