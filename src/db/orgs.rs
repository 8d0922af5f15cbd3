use sqlx::SqliteConnection;

use crate::models::{NewOrg, Org};

/// All organizations, newest first.
pub async fn list_orgs(conn: &mut SqliteConnection) -> Result<Vec<Org>, sqlx::Error> {
    sqlx::query_as::<_, Org>(
        "SELECT id, name, tagline, contact, email, description, logo FROM orgs ORDER BY id DESC",
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn count_orgs(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orgs")
        .fetch_one(&mut *conn)
        .await
}

/// Returns the id assigned to the new row.
pub async fn insert_org(conn: &mut SqliteConnection, org: &NewOrg<'_>) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO orgs (name, tagline, contact, email, description, logo) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(org.name)
    .bind(org.tagline)
    .bind(org.contact)
    .bind(org.email)
    .bind(org.description)
    .bind(org.logo)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}
