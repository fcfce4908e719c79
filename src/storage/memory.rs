//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::notes::Note;
use crate::shared_notes::SharedNote;
use crate::spaces::Space;
use crate::users::User;

use super::AuditEntry;
use super::Result;
use super::Storage;
use super::UpsertUserValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All notes in storage
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,

    /// All spaces in storage
    spaces: Arc<Mutex<HashMap<Uuid, Space>>>,

    /// All shared notes in storage
    shared_notes: Arc<Mutex<HashMap<Uuid, SharedNote>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
            notes: Arc::new(Mutex::new(HashMap::new())),
            spaces: Arc::new(Mutex::new(HashMap::new())),
            shared_notes: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Storage for Memory {
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn upsert_user(&self, values: &UpsertUserValues<'_>) -> Result<User> {
        let mut users = self.users.lock().await;

        let user = users.entry(*values.id).or_insert_with(|| User {
            id: *values.id,
            email: None,
            created_at: Utc::now(),
        });

        if let Some(email) = values.email {
            user.email = Some(email.to_string());
        }

        Ok(user.clone())
    }

    async fn find_all_notes_by_user(&self, user: &User) -> Result<Vec<Note>> {
        let mut notes = self
            .notes
            .lock()
            .await
            .values()
            .filter(|note| note.is_owned_by(&user.id))
            .cloned()
            .collect::<Vec<_>>();

        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(notes)
    }

    async fn find_single_note_by_id(&self, user_id: &Uuid, note_id: &Uuid) -> Result<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .get(note_id)
            .filter(|note| note.is_owned_by(user_id))
            .cloned())
    }

    async fn create_note(&self, note: &Note) -> Result<Note> {
        self.notes.lock().await.insert(note.id, note.clone());

        Ok(note.clone())
    }

    async fn update_note(&self, note: &Note) -> Result<Note> {
        self.notes.lock().await.insert(note.id, note.clone());

        Ok(note.clone())
    }

    async fn delete_note(&self, note: &Note) -> Result<()> {
        self.notes.lock().await.remove(&note.id);

        Ok(())
    }

    async fn find_all_spaces_by_user(&self, user: &User) -> Result<Vec<Space>> {
        let mut spaces = self
            .spaces
            .lock()
            .await
            .values()
            .filter(|space| space.has_member(&user.id))
            .cloned()
            .collect::<Vec<_>>();

        spaces.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(spaces)
    }

    async fn find_single_space_by_id(&self, id: &Uuid) -> Result<Option<Space>> {
        Ok(self.spaces.lock().await.get(id).cloned())
    }

    async fn create_space(&self, space: &Space) -> Result<Space> {
        self.spaces.lock().await.insert(space.id, space.clone());

        Ok(space.clone())
    }

    async fn find_all_shared_notes_by_recipient(&self, user: &User) -> Result<Vec<SharedNote>> {
        let mut shared_notes = self
            .shared_notes
            .lock()
            .await
            .values()
            .filter(|shared_note| shared_note.to_user_id == user.id)
            .cloned()
            .collect::<Vec<_>>();

        shared_notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(shared_notes)
    }

    async fn find_all_shared_notes_by_space(&self, space: &Space) -> Result<Vec<SharedNote>> {
        let mut shared_notes = self
            .shared_notes
            .lock()
            .await
            .values()
            .filter(|shared_note| shared_note.is_in_space(space))
            .cloned()
            .collect::<Vec<_>>();

        shared_notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(shared_notes)
    }

    async fn find_single_shared_note_by_id(&self, id: &Uuid) -> Result<Option<SharedNote>> {
        Ok(self.shared_notes.lock().await.get(id).cloned())
    }

    async fn create_shared_note(&self, shared_note: &SharedNote) -> Result<SharedNote> {
        self.shared_notes
            .lock()
            .await
            .insert(shared_note.id, shared_note.clone());

        Ok(shared_note.clone())
    }

    async fn register_audit_trail(
        &self,
        user: &User,
        entry: &AuditEntry<'_>,
        _ip_address: Option<&IpAddr>,
    ) -> Result<()> {
        tracing::debug!(
            "Audit trail: {} {} by {}",
            entry.kind(),
            entry.subject_id(),
            user.id
        );

        Ok(())
    }
}
