//! Postgres storage

use std::net::IpAddr;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::ipnetwork::IpNetwork;
use uuid::Uuid;

use crate::notes::Note;
use crate::shared_notes::SharedNote;
use crate::spaces::Space;
use crate::users::User;

use super::AuditEntry;
use super::Error;
use super::Result;
use super::Storage;
use super::UpsertUserValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns of the notes table, in `NoteRow` order
const NOTE_COLUMNS: &str =
    "id, user_id, space_id, title, content, start_time, end_time, color, created_at";

/// Columns of the shared notes table, in `SharedNoteRow` order
const SHARED_NOTE_COLUMNS: &str = "id, space_id, from_user_id, to_user_id, title, content, \
    start_time, end_time, color, original_note_id, created_at";

/// Postgres type for audit trail entry type
#[derive(PartialEq, Debug, sqlx::Type)]
#[sqlx(type_name = "audit_trail_entry_type")]
#[sqlx(rename_all = "kebab-case")]
enum AuditEntryType {
    /// Note is created
    CreateNote,

    /// Note is updated
    UpdateNote,

    /// Note is deleted
    DeleteNote,

    /// Space is created
    CreateSpace,

    /// Note is shared
    ShareNote,
}

impl AuditEntryType {
    /// Create audit entry type from audit entry
    fn from_audit_entry(entry: &AuditEntry) -> Self {
        match entry {
            AuditEntry::CreateNote(_) => Self::CreateNote,
            AuditEntry::UpdateNote(_) => Self::UpdateNote,
            AuditEntry::DeleteNote(_) => Self::DeleteNote,
            AuditEntry::CreateSpace(_) => Self::CreateSpace,
            AuditEntry::ShareNote(_, _) => Self::ShareNote,
        }
    }
}

/// Postgres row of a user
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Postgres row of a note, nullable columns come back as `null`, never absent
#[derive(sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    user_id: Uuid,
    space_id: Option<String>,
    title: String,
    content: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl NoteRow {
    fn into_note(self) -> Note {
        Note {
            id: self.id,
            user_id: self.user_id,
            space_id: self.space_id.into(),
            title: self.title,
            content: self.content,
            start_time: self.start_time.into(),
            end_time: self.end_time.into(),
            color: self.color.into(),
            created_at: self.created_at,
        }
    }
}

/// Postgres row of a space
#[derive(sqlx::FromRow)]
struct SpaceRow {
    id: Uuid,
    user_a_id: Uuid,
    user_b_id: Uuid,
    name: Option<String>,
    created_at: DateTime<Utc>,
}

impl SpaceRow {
    fn into_space(self) -> Space {
        Space {
            id: self.id,
            user_a_id: self.user_a_id,
            user_b_id: self.user_b_id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// Postgres row of a shared note
#[derive(sqlx::FromRow)]
struct SharedNoteRow {
    id: Uuid,
    space_id: Option<String>,
    from_user_id: Uuid,
    to_user_id: Uuid,
    title: String,
    content: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    color: Option<String>,
    original_note_id: Uuid,
    created_at: DateTime<Utc>,
}

impl SharedNoteRow {
    fn into_shared_note(self) -> SharedNote {
        SharedNote {
            id: self.id,
            space_id: self.space_id.into(),
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            title: self.title,
            content: self.content,
            start_time: self.start_time.into(),
            end_time: self.end_time.into(),
            color: self.color.into(),
            original_note_id: self.original_note_id,
            created_at: self.created_at,
        }
    }
}

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    pub async fn new() -> anyhow::Result<Self> {
        let database_connection_string = std::env::var("DATABASE_URL")?;

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await?;

        MIGRATOR.run(&connection_pool).await?;

        Ok(Self { connection_pool })
    }
}

impl Storage for Postgres {
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, created_at
            FROM users
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user.map(UserRow::into_user))
    }

    async fn upsert_user(&self, values: &UpsertUserValues<'_>) -> Result<User> {
        let user = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET email = COALESCE(EXCLUDED.email, users.email)
            RETURNING id, email, created_at
            ",
        )
        .bind(values.id)
        .bind(values.email)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user.into_user())
    }

    async fn find_all_notes_by_user(&self, user: &User) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, NoteRow>(&format!(
            r"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "
        ))
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(notes.into_iter().map(NoteRow::into_note).collect())
    }

    async fn find_single_note_by_id(&self, user_id: &Uuid, note_id: &Uuid) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, NoteRow>(&format!(
            r"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE user_id = $1 AND id = $2
            LIMIT 1
            "
        ))
        .bind(user_id)
        .bind(note_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(note.map(NoteRow::into_note))
    }

    async fn create_note(&self, note: &Note) -> Result<Note> {
        let note = sqlx::query_as::<_, NoteRow>(&format!(
            r"
            INSERT INTO notes ({NOTE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {NOTE_COLUMNS}
            "
        ))
        .bind(note.id)
        .bind(note.user_id)
        .bind(note.space_id.as_option())
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.start_time.as_option())
        .bind(note.end_time.as_option())
        .bind(note.color.as_option())
        .bind(note.created_at)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(note.into_note())
    }

    async fn update_note(&self, note: &Note) -> Result<Note> {
        let note = sqlx::query_as::<_, NoteRow>(&format!(
            r"
            UPDATE notes
            SET space_id = $2, title = $3, content = $4, start_time = $5, end_time = $6, color = $7
            WHERE id = $1
            RETURNING {NOTE_COLUMNS}
            "
        ))
        .bind(note.id)
        .bind(note.space_id.as_option())
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.start_time.as_option())
        .bind(note.end_time.as_option())
        .bind(note.color.as_option())
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(note.into_note())
    }

    async fn delete_note(&self, note: &Note) -> Result<()> {
        sqlx::query(
            r"
            DELETE FROM notes
            WHERE id = $1
            ",
        )
        .bind(note.id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn find_all_spaces_by_user(&self, user: &User) -> Result<Vec<Space>> {
        let spaces = sqlx::query_as::<_, SpaceRow>(
            r"
            SELECT id, user_a_id, user_b_id, name, created_at
            FROM spaces
            WHERE user_a_id = $1 OR user_b_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(spaces.into_iter().map(SpaceRow::into_space).collect())
    }

    async fn find_single_space_by_id(&self, id: &Uuid) -> Result<Option<Space>> {
        let space = sqlx::query_as::<_, SpaceRow>(
            r"
            SELECT id, user_a_id, user_b_id, name, created_at
            FROM spaces
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(space.map(SpaceRow::into_space))
    }

    async fn create_space(&self, space: &Space) -> Result<Space> {
        let space = sqlx::query_as::<_, SpaceRow>(
            r"
            INSERT INTO spaces (id, user_a_id, user_b_id, name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_a_id, user_b_id, name, created_at
            ",
        )
        .bind(space.id)
        .bind(space.user_a_id)
        .bind(space.user_b_id)
        .bind(&space.name)
        .bind(space.created_at)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(space.into_space())
    }

    async fn find_all_shared_notes_by_recipient(&self, user: &User) -> Result<Vec<SharedNote>> {
        let shared_notes = sqlx::query_as::<_, SharedNoteRow>(&format!(
            r"
            SELECT {SHARED_NOTE_COLUMNS}
            FROM shared_notes
            WHERE to_user_id = $1
            ORDER BY created_at DESC
            "
        ))
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(shared_notes
            .into_iter()
            .map(SharedNoteRow::into_shared_note)
            .collect())
    }

    async fn find_all_shared_notes_by_space(&self, space: &Space) -> Result<Vec<SharedNote>> {
        let shared_notes = sqlx::query_as::<_, SharedNoteRow>(&format!(
            r"
            SELECT {SHARED_NOTE_COLUMNS}
            FROM shared_notes
            WHERE space_id = $1
            ORDER BY created_at DESC
            "
        ))
        .bind(space.id.to_string())
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(shared_notes
            .into_iter()
            .map(SharedNoteRow::into_shared_note)
            .collect())
    }

    async fn find_single_shared_note_by_id(&self, id: &Uuid) -> Result<Option<SharedNote>> {
        let shared_note = sqlx::query_as::<_, SharedNoteRow>(&format!(
            r"
            SELECT {SHARED_NOTE_COLUMNS}
            FROM shared_notes
            WHERE id = $1
            LIMIT 1
            "
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(shared_note.map(SharedNoteRow::into_shared_note))
    }

    async fn create_shared_note(&self, shared_note: &SharedNote) -> Result<SharedNote> {
        let shared_note = sqlx::query_as::<_, SharedNoteRow>(&format!(
            r"
            INSERT INTO shared_notes ({SHARED_NOTE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SHARED_NOTE_COLUMNS}
            "
        ))
        .bind(shared_note.id)
        .bind(shared_note.space_id.as_option())
        .bind(shared_note.from_user_id)
        .bind(shared_note.to_user_id)
        .bind(&shared_note.title)
        .bind(&shared_note.content)
        .bind(shared_note.start_time.as_option())
        .bind(shared_note.end_time.as_option())
        .bind(shared_note.color.as_option())
        .bind(shared_note.original_note_id)
        .bind(shared_note.created_at)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(shared_note.into_shared_note())
    }

    async fn register_audit_trail(
        &self,
        created_by: &User,
        entry: &AuditEntry<'_>,
        ip_address: Option<&IpAddr>,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO audit_trail (id, type, created_by, subject_id, ip_address)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(Uuid::new_v4())
        .bind(AuditEntryType::from_audit_entry(entry))
        .bind(created_by.id)
        .bind(entry.subject_id())
        .bind(ip_address.map(|ip_address| IpNetwork::from(*ip_address)))
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
