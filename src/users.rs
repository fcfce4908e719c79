use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// A user known from the identity provider
///
/// Users are registered the first time they show up with a valid token
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
