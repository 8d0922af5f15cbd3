use axum::{extract::Extension, response::Response};

use crate::db::{orgs, DbScope};
use crate::utils::error::AppError;
use crate::utils::response::success;

/// `GET /api/orgs`
pub async fn list_orgs(Extension(db): Extension<DbScope>) -> Result<Response, AppError> {
    let mut conn = db.connection().await?;
    let orgs = orgs::list_orgs(&mut conn).await?;

    Ok(success(orgs))
}
