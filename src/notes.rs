//! Notes
//!
//! A note belongs to exactly one user, can optionally be linked into a space and can carry a
//! scheduling window

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::nullable::Nullable;

/// Note validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The title is empty or only whitespace
    #[error("Title can not be empty")]
    EmptyTitle,

    /// The scheduling window ends before it starts
    #[error("Start time can not be after end time")]
    StartAfterEnd,
}

/// A user-authored note
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Note {
    /// Note ID
    pub id: Uuid,

    /// The owner of the note
    pub user_id: Uuid,

    /// Space the note is linked into, kept as it was written
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub space_id: Nullable<String>,

    /// Title
    pub title: String,

    /// Free text, usually markdown
    pub content: String,

    /// Start of the scheduling window
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub start_time: Nullable<DateTime<Utc>>,

    /// End of the scheduling window
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub end_time: Nullable<DateTime<Utc>>,

    /// Categorical color tag
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub color: Nullable<String>,

    /// Creation date
    pub created_at: DateTime<Utc>,
}

/// The fields a user provides when writing a note
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NoteFields {
    /// Title
    pub title: String,

    /// Content, empty when left out
    #[serde(default)]
    pub content: String,

    /// Space to link the note into
    #[serde(default)]
    pub space_id: Nullable<String>,

    /// Start of the scheduling window
    #[serde(default)]
    pub start_time: Nullable<DateTime<Utc>>,

    /// End of the scheduling window
    #[serde(default)]
    pub end_time: Nullable<DateTime<Utc>>,

    /// Color tag
    #[serde(default)]
    pub color: Nullable<String>,
}

/// Changes to an existing note
///
/// Missing keys keep the current value, `null` clears a nullable field
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NotePatch {
    /// New title
    pub title: Option<String>,

    /// New content
    pub content: Option<String>,

    /// New space link
    #[serde(default)]
    pub space_id: Nullable<String>,

    /// New start of the scheduling window
    #[serde(default)]
    pub start_time: Nullable<DateTime<Utc>>,

    /// New end of the scheduling window
    #[serde(default)]
    pub end_time: Nullable<DateTime<Utc>>,

    /// New color tag
    #[serde(default)]
    pub color: Nullable<String>,
}

impl Note {
    /// Create a new note for a user
    ///
    /// Nullable fields that were left out are stored as `null`
    pub fn create(user_id: Uuid, fields: NoteFields) -> Result<Self, Error> {
        let note = Self {
            id: Uuid::new_v4(),
            user_id,
            space_id: fields.space_id.or_null(),
            title: fields.title,
            content: fields.content,
            start_time: fields.start_time.or_null(),
            end_time: fields.end_time.or_null(),
            color: fields.color.or_null(),
            created_at: Utc::now(),
        };

        note.validate()?;

        Ok(note)
    }

    /// Apply a patch, returning the updated note
    ///
    /// The identity, owner and creation date never change
    pub fn apply(&self, patch: NotePatch) -> Result<Self, Error> {
        let note = Self {
            id: self.id,
            user_id: self.user_id,
            space_id: patch.space_id.patch(self.space_id.clone()),
            title: patch.title.unwrap_or_else(|| self.title.clone()),
            content: patch.content.unwrap_or_else(|| self.content.clone()),
            start_time: patch.start_time.patch(self.start_time.clone()),
            end_time: patch.end_time.patch(self.end_time.clone()),
            color: patch.color.patch(self.color.clone()),
            created_at: self.created_at,
        };

        note.validate()?;

        Ok(note)
    }

    /// Check the field constraints
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }

        check_schedule(&self.start_time, &self.end_time)
    }

    /// Is the note owned by the user?
    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        &self.user_id == user_id
    }
}

/// A window is only checked when both ends are set
pub fn check_schedule(
    start_time: &Nullable<DateTime<Utc>>,
    end_time: &Nullable<DateTime<Utc>>,
) -> Result<(), Error> {
    if let (Some(start_time), Some(end_time)) = (start_time.as_option(), end_time.as_option()) {
        if start_time > end_time {
            return Err(Error::StartAfterEnd);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 27, hour, 0, 0).unwrap()
    }

    fn fields(title: &str) -> NoteFields {
        NoteFields {
            title: title.to_string(),
            ..NoteFields::default()
        }
    }

    #[test]
    fn test_create_normalizes_absent_to_null() {
        let note = Note::create(Uuid::new_v4(), fields("Groceries")).unwrap();

        assert_eq!(Nullable::Null, note.space_id);
        assert_eq!(Nullable::Null, note.start_time);
        assert_eq!(Nullable::Null, note.end_time);
        assert_eq!(Nullable::Null, note.color);

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(json!(null), value["space_id"]);
        assert_eq!(json!(null), value["color"]);
    }

    #[test]
    fn test_create_requires_title() {
        let result = Note::create(Uuid::new_v4(), fields("   "));
        assert_eq!(Err(Error::EmptyTitle), result);
    }

    #[test]
    fn test_schedule_window() {
        let mut window = fields("Dinner");
        window.start_time = Nullable::Value(at(18));
        window.end_time = Nullable::Value(at(20));
        assert!(Note::create(Uuid::new_v4(), window.clone()).is_ok());

        window.end_time = Nullable::Value(at(18));
        assert!(Note::create(Uuid::new_v4(), window.clone()).is_ok());

        window.end_time = Nullable::Value(at(17));
        assert_eq!(
            Err(Error::StartAfterEnd),
            Note::create(Uuid::new_v4(), window)
        );
    }

    #[test]
    fn test_open_ended_window() {
        let mut open = fields("Trip");
        open.start_time = Nullable::Value(at(9));
        assert!(Note::create(Uuid::new_v4(), open).is_ok());
    }

    #[test]
    fn test_apply_patch() {
        let mut initial = fields("Dinner");
        initial.color = Nullable::Value("red".to_string());
        initial.start_time = Nullable::Value(at(18));
        let note = Note::create(Uuid::new_v4(), initial).unwrap();

        let patch = NotePatch {
            content: Some("At the usual place".to_string()),
            color: Nullable::Null,
            ..NotePatch::default()
        };
        let updated = note.apply(patch).unwrap();

        assert_eq!(note.id, updated.id);
        assert_eq!(note.created_at, updated.created_at);
        assert_eq!("Dinner", updated.title);
        assert_eq!("At the usual place", updated.content);
        assert_eq!(Nullable::Null, updated.color);
        assert_eq!(Nullable::Value(at(18)), updated.start_time);
    }

    #[test]
    fn test_apply_patch_validates() {
        let mut initial = fields("Dinner");
        initial.start_time = Nullable::Value(at(18));
        let note = Note::create(Uuid::new_v4(), initial).unwrap();

        let patch = NotePatch {
            end_time: Nullable::Value(at(12)),
            ..NotePatch::default()
        };
        assert_eq!(Err(Error::StartAfterEnd), note.apply(patch));
    }

    #[test]
    fn test_decode_keeps_empty_color() {
        let note: Note = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "title": "Plain",
            "content": "",
            "color": "",
            "created_at": "2024-06-27T10:00:00Z",
        }))
        .unwrap();

        assert_eq!(Nullable::Value(String::new()), note.color);
        assert_eq!(Nullable::Absent, note.space_id);
    }

    #[test]
    fn test_decode_keeps_space_id_as_written() {
        for space_id in [json!("s1"), json!(""), json!(null)] {
            let input = json!({
                "id": Uuid::new_v4(),
                "user_id": Uuid::new_v4(),
                "space_id": space_id,
                "title": "Plain",
                "content": "",
                "created_at": "2024-06-27T10:00:00Z",
            });

            let note: Note = serde_json::from_value(input.clone()).unwrap();
            assert_eq!(input, serde_json::to_value(&note).unwrap());
        }
    }
}
