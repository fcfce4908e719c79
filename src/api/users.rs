//! User API endpoints

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::storage::Storage;
use crate::users::User;

use super::CurrentUser;
use super::Error;
use super::Success;

/// The user response information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// Email address, if known
    pub email: Option<String>,

    /// First time the user was seen
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Get the current user
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/users/me
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "email": "someone@example.com", "createdAt": "..." } }
/// ```
pub async fn me<S: Storage>(current_user: CurrentUser<S>) -> Result<Success<UserResponse>, Error> {
    Ok(Success::ok(UserResponse::from_user(&current_user)))
}
