//! Shared notes API endpoints
//!
//! Shared notes are created by sharing a note, see [`notes::share`](super::notes::share)

use axum::Extension;
use uuid::Uuid;

use crate::shared_notes::SharedNote;
use crate::storage::Storage;

use super::CurrentUser;
use super::Error;
use super::PathParameters;
use super::Success;

/// List all notes shared with the current user
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<SharedNote>>, Error> {
    let shared_notes = storage
        .find_all_shared_notes_by_recipient(&current_user)
        .await?;

    Ok(Success::ok(shared_notes))
}

/// Get a single shared note
///
/// Only the sender and the receiver can see it
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(shared_note_id): PathParameters<Uuid>,
) -> Result<Success<SharedNote>, Error> {
    storage
        .find_single_shared_note_by_id(&shared_note_id)
        .await?
        .filter(|shared_note| shared_note.is_visible_to(&current_user.id))
        .map(Success::ok)
        .ok_or_else(|| Error::not_found("Shared note not found"))
}
