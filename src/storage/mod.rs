//! All things related to the storage of users, notes, spaces and shared notes

use std::future::Future;
use std::net::IpAddr;

use thiserror::Error;
use uuid::Uuid;

use crate::notes::Note;
use crate::shared_notes::SharedNote;
use crate::spaces::Space;
use crate::users::User;

#[cfg(not(feature = "postgres"))]
use memory::Memory;
#[cfg(feature = "postgres")]
use postgres::Postgres;

#[cfg(not(feature = "postgres"))]
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> anyhow::Result<Memory> {
    Ok(Memory::new())
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup() -> anyhow::Result<Postgres> {
    Postgres::new().await
}

/// Storage errors
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to register a user
pub struct UpsertUserValues<'a> {
    /// The ID given by the identity provider
    pub id: &'a Uuid,

    /// The email address, if the identity provider shares it
    pub email: Option<&'a str>,
}

/// Possible audit trail entry types
pub enum AuditEntry<'a> {
    /// Note is created
    CreateNote(&'a Note),

    /// Note is updated
    UpdateNote(&'a Note),

    /// Note is deleted
    DeleteNote(&'a Note),

    /// Space is created
    CreateSpace(&'a Space),

    /// Note is shared into a space
    ShareNote(&'a Note, &'a SharedNote),
}

impl AuditEntry<'_> {
    /// Name of the entry type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateNote(_) => "create-note",
            Self::UpdateNote(_) => "update-note",
            Self::DeleteNote(_) => "delete-note",
            Self::CreateSpace(_) => "create-space",
            Self::ShareNote(_, _) => "share-note",
        }
    }

    /// ID of the entity the entry is about
    pub fn subject_id(&self) -> Uuid {
        match self {
            Self::CreateNote(note) | Self::UpdateNote(note) | Self::DeleteNote(note) => note.id,
            Self::CreateSpace(space) => space.id,
            Self::ShareNote(_, shared_note) => shared_note.id,
        }
    }
}

/// Storage with all supported operations
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its ID
    fn find_single_user_by_id(
        &self,
        id: &Uuid,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Register a user, or refresh the email of a known one
    fn upsert_user(&self, values: &UpsertUserValues) -> impl Future<Output = Result<User>> + Send;

    /// Find all notes of a user, newest first
    fn find_all_notes_by_user(&self, user: &User)
    -> impl Future<Output = Result<Vec<Note>>> + Send;

    /// Find a single note of a user
    fn find_single_note_by_id(
        &self,
        user_id: &Uuid,
        note_id: &Uuid,
    ) -> impl Future<Output = Result<Option<Note>>> + Send;

    /// Store a new note
    fn create_note(&self, note: &Note) -> impl Future<Output = Result<Note>> + Send;

    /// Replace an existing note
    fn update_note(&self, note: &Note) -> impl Future<Output = Result<Note>> + Send;

    /// Delete a note
    ///
    /// Shared copies of the note stay
    fn delete_note(&self, note: &Note) -> impl Future<Output = Result<()>> + Send;

    /// Find all spaces the user is a member of, newest first
    fn find_all_spaces_by_user(
        &self,
        user: &User,
    ) -> impl Future<Output = Result<Vec<Space>>> + Send;

    /// Find a single space by its ID
    fn find_single_space_by_id(
        &self,
        id: &Uuid,
    ) -> impl Future<Output = Result<Option<Space>>> + Send;

    /// Store a new space
    fn create_space(&self, space: &Space) -> impl Future<Output = Result<Space>> + Send;

    /// Find all shared notes received by a user, newest first
    fn find_all_shared_notes_by_recipient(
        &self,
        user: &User,
    ) -> impl Future<Output = Result<Vec<SharedNote>>> + Send;

    /// Find all shared notes in a space, both directions, newest first
    fn find_all_shared_notes_by_space(
        &self,
        space: &Space,
    ) -> impl Future<Output = Result<Vec<SharedNote>>> + Send;

    /// Find a single shared note by its ID
    fn find_single_shared_note_by_id(
        &self,
        id: &Uuid,
    ) -> impl Future<Output = Result<Option<SharedNote>>> + Send;

    /// Store a new shared note
    fn create_shared_note(
        &self,
        shared_note: &SharedNote,
    ) -> impl Future<Output = Result<SharedNote>> + Send;

    /// Register a creative/destructive action on the audit trail
    fn register_audit_trail(
        &self,
        user: &User,
        entry: &AuditEntry,
        ip_address: Option<&IpAddr>,
    ) -> impl Future<Output = Result<()>> + Send;
}
