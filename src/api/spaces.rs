//! Spaces API endpoints
//!
//! Spaces are only visible to their two members

use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::shared_notes::SharedNote;
use crate::spaces::Space;
use crate::storage::AuditEntry;
use crate::storage::Storage;
use crate::users::User;

use super::AuditTrail;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;

/// List all spaces of the current user
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<Space>>, Error> {
    let spaces = storage.find_all_spaces_by_user(&current_user).await?;

    Ok(Success::ok(spaces))
}

/// Get a single space
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(space_id): PathParameters<Uuid>,
) -> Result<Success<Space>, Error> {
    get_space(&storage, &current_user, &space_id)
        .await
        .map(Success::ok)
}

/// Create space form
#[derive(Debug, Deserialize)]
pub struct CreateSpaceForm {
    /// The user to pair with
    partner_id: Uuid,

    /// Display name of the space
    #[serde(default)]
    name: Option<String>,
}

/// Pair the current user with another user
///
/// The partner has to have signed in at least once
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "partner_id": "<uuid>", "name": "Home" }' \
///     http://localhost:6000/api/spaces
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "user_a_id": "<uuid>", "user_b_id": "<uuid>", "name": "Home", ... } }
/// ```
pub async fn create<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateSpaceForm>,
) -> Result<Success<Space>, Error> {
    let space = Space::pair(current_user.id, form.partner_id, form.name)?;

    storage
        .find_single_user_by_id(&form.partner_id)
        .await?
        .ok_or_else(|| Error::bad_request("Unknown partner"))?;

    let space = storage.create_space(&space).await?;

    tracing::debug!(
        "Space {} created for {} and {}",
        space.id,
        space.user_a_id,
        space.user_b_id
    );

    audit_trail.register(AuditEntry::CreateSpace(&space)).await;

    Ok(Success::created(space))
}

/// List all notes shared in a space, in both directions
pub async fn shared_notes<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(space_id): PathParameters<Uuid>,
) -> Result<Success<Vec<SharedNote>>, Error> {
    let space = get_space(&storage, &current_user, &space_id).await?;

    let shared_notes = storage.find_all_shared_notes_by_space(&space).await?;

    Ok(Success::ok(shared_notes))
}

/// Fetch a space the user is a member of
///
/// Spaces of others do not exist as far as the user is concerned
pub async fn get_space<S: Storage>(
    storage: &S,
    user: &User,
    space_id: &Uuid,
) -> Result<Space, Error> {
    storage
        .find_single_space_by_id(space_id)
        .await?
        .filter(|space| space.has_member(&user.id))
        .map_or_else(|| Err(Error::not_found("Space not found")), Ok)
}
