//! Notes API endpoints
//!
//! Notes are private to their owner, other users get a `404` for them

use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::notes::Note;
use crate::notes::NoteFields;
use crate::notes::NotePatch;
use crate::nullable::Nullable;
use crate::shared_notes::SharedNote;
use crate::storage::AuditEntry;
use crate::storage::Storage;
use crate::users::User;

use super::AuditTrail;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::spaces::get_space;

/// List all notes of the current user
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/notes
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "id": "<uuid>", "title": "Dinner", ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<Note>>, Error> {
    let notes = storage.find_all_notes_by_user(&current_user).await?;

    Ok(Success::ok(notes))
}

/// Get a single note
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<Note>, Error> {
    get_note(&storage, &current_user.id, &note_id)
        .await
        .map(Success::ok)
}

/// Create a note
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Dinner", "start_time": null, "color": "red" }' \
///     http://localhost:6000/api/notes
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "title": "Dinner", "color": "red", ... } }
/// ```
pub async fn create<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<NoteFields>,
) -> Result<Success<Note>, Error> {
    check_space_link(&storage, &current_user, &form.space_id).await?;

    let note = Note::create(current_user.id, form)?;
    let note = storage.create_note(&note).await?;

    tracing::debug!("Note {} created by {}", note.id, current_user.id);

    audit_trail.register(AuditEntry::CreateNote(&note)).await;

    Ok(Success::created(note))
}

/// Update a note
///
/// Keys that are left out keep their value, `null` clears a nullable field
pub async fn update<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<NotePatch>,
) -> Result<Success<Note>, Error> {
    let note = get_note(&storage, &current_user.id, &note_id).await?;

    check_space_link(&storage, &current_user, &form.space_id).await?;

    let note = note.apply(form)?;
    let note = storage.update_note(&note).await?;

    audit_trail.register(AuditEntry::UpdateNote(&note)).await;

    Ok(Success::ok(note))
}

/// Delete a note
///
/// Copies shared before stay with their recipients
pub async fn delete<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<&'static str>, Error> {
    let note = get_note(&storage, &current_user.id, &note_id).await?;

    storage.delete_note(&note).await?;

    audit_trail.register(AuditEntry::DeleteNote(&note)).await;

    Ok(Success::<&'static str>::no_content())
}

/// Share form
#[derive(Debug, Deserialize)]
pub struct ShareNoteForm {
    /// Space to share the note into
    space_id: Uuid,
}

/// Share a note into a space
///
/// The other member of the space receives a copy of the note as it is now
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "space_id": "<uuid>" }' \
///     http://localhost:6000/api/notes/<uuid>/share
/// ```
pub async fn share<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<ShareNoteForm>,
) -> Result<Success<SharedNote>, Error> {
    let note = get_note(&storage, &current_user.id, &note_id).await?;
    let space = get_space(&storage, &current_user, &form.space_id).await?;

    let shared_note = SharedNote::share(&note, &space, &current_user.id)?;
    let shared_note = storage.create_shared_note(&shared_note).await?;

    tracing::debug!(
        "Note {} shared from {} to {} in space {}",
        note.id,
        shared_note.from_user_id,
        shared_note.to_user_id,
        space.id
    );

    audit_trail
        .register(AuditEntry::ShareNote(&note, &shared_note))
        .await;

    Ok(Success::created(shared_note))
}

/// A note can only be linked into a space of its owner
///
/// The link is kept as written, but it has to name an existing space
async fn check_space_link<S: Storage>(
    storage: &S,
    user: &User,
    space_id: &Nullable<String>,
) -> Result<(), Error> {
    let Some(space_id) = space_id.as_option() else {
        return Ok(());
    };

    let Ok(space_id) = Uuid::parse_str(space_id) else {
        return Err(Error::bad_request("Unknown space"));
    };

    let space = storage.find_single_space_by_id(&space_id).await?;

    match space {
        Some(space) if space.has_member(&user.id) => Ok(()),
        _ => Err(Error::bad_request("Unknown space")),
    }
}

async fn get_note<S: Storage>(storage: &S, user_id: &Uuid, note_id: &Uuid) -> Result<Note, Error> {
    storage
        .find_single_note_by_id(user_id, note_id)
        .await?
        .map_or_else(|| Err(Error::not_found("Note not found")), Ok)
}
