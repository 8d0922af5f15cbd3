use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Org {
    pub id: i64,
    pub name: String,
    pub tagline: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
}

/// Column values for an organization insert.
#[derive(Debug, Clone, Copy)]
pub struct NewOrg<'a> {
    pub name: &'a str,
    pub tagline: Option<&'a str>,
    pub contact: Option<&'a str>,
    pub email: Option<&'a str>,
    pub description: Option<&'a str>,
    pub logo: Option<&'a str>,
}
