//! Shared notes
//!
//! Sharing copies a note into a space for the other member. The copy lives on its own: editing
//! or deleting the original note does not touch it, `original_note_id` is only kept to trace
//! where it came from.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::notes::Note;
use crate::nullable::Nullable;
use crate::spaces::Space;

/// Sharing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Only the owner of a note can share it
    #[error("Only the owner can share a note")]
    NotOwner,

    /// The sharing user is not part of the space
    #[error("Not a member of this space")]
    NotAMember,

    /// Sender and receiver are the same user
    #[error("A note can not be shared with yourself")]
    SameUser,

    /// The shared note points at another space
    #[error("Shared note is not part of this space")]
    OtherSpace,
}

/// Snapshot of a note, shared from one member of a space to the other
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SharedNote {
    /// Shared note ID
    pub id: Uuid,

    /// Space the note is shared in, kept as it was written
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub space_id: Nullable<String>,

    /// Sharing user
    pub from_user_id: Uuid,

    /// Receiving user
    pub to_user_id: Uuid,

    /// Title at the time of sharing
    pub title: String,

    /// Content at the time of sharing
    pub content: String,

    /// Start of the scheduling window at the time of sharing
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub start_time: Nullable<DateTime<Utc>>,

    /// End of the scheduling window at the time of sharing
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub end_time: Nullable<DateTime<Utc>>,

    /// Color tag at the time of sharing
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub color: Nullable<String>,

    /// The note this is a copy of, which might no longer exist
    pub original_note_id: Uuid,

    /// Moment of sharing
    pub created_at: DateTime<Utc>,
}

impl SharedNote {
    /// Share a note into a space
    ///
    /// The sharing user has to own the note and be a member of the space, the receiving user is
    /// the other member
    pub fn share(note: &Note, space: &Space, from_user_id: &Uuid) -> Result<Self, Error> {
        if !note.is_owned_by(from_user_id) {
            return Err(Error::NotOwner);
        }

        let to_user_id = space.partner_of(from_user_id).ok_or(Error::NotAMember)?;

        let shared_note = Self {
            id: Uuid::new_v4(),
            space_id: Nullable::Value(space.id.to_string()),
            from_user_id: *from_user_id,
            to_user_id,
            title: note.title.clone(),
            content: note.content.clone(),
            start_time: note.start_time.clone().or_null(),
            end_time: note.end_time.clone().or_null(),
            color: note.color.clone().or_null(),
            original_note_id: note.id,
            created_at: Utc::now(),
        };

        shared_note.validate(space)?;

        Ok(shared_note)
    }

    /// Check a shared note against the space it claims to be in
    ///
    /// Sender and receiver differ, and both are members of the space
    pub fn validate(&self, space: &Space) -> Result<(), Error> {
        if self.from_user_id == self.to_user_id {
            return Err(Error::SameUser);
        }

        if !self.is_in_space(space) {
            return Err(Error::OtherSpace);
        }

        if !space.has_member(&self.from_user_id) || !space.has_member(&self.to_user_id) {
            return Err(Error::NotAMember);
        }

        Ok(())
    }

    /// Can the user see this shared note?
    ///
    /// Only the sender and the receiver can
    pub fn is_visible_to(&self, user_id: &Uuid) -> bool {
        &self.from_user_id == user_id || &self.to_user_id == user_id
    }

    /// Is the shared note part of the space?
    ///
    /// A `space_id` that is no space ID is in no space
    pub fn is_in_space(&self, space: &Space) -> bool {
        self.space_id
            .as_option()
            .and_then(|space_id| Uuid::parse_str(space_id).ok())
            == Some(space.id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::notes::NoteFields;
    use crate::notes::NotePatch;

    fn note_for(user_id: Uuid) -> Note {
        Note::create(
            user_id,
            NoteFields {
                title: "Anniversary".to_string(),
                content: "Book the restaurant".to_string(),
                start_time: Nullable::Value(Utc.with_ymd_and_hms(2024, 9, 1, 19, 0, 0).unwrap()),
                color: Nullable::Value("pink".to_string()),
                ..NoteFields::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_share_copies_the_note() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let space = Space::pair(alice, bob, None).unwrap();
        let note = note_for(alice);

        let shared = SharedNote::share(&note, &space, &alice).unwrap();

        assert_eq!(Nullable::Value(space.id.to_string()), shared.space_id);
        assert_eq!(alice, shared.from_user_id);
        assert_eq!(bob, shared.to_user_id);
        assert_eq!(note.title, shared.title);
        assert_eq!(note.content, shared.content);
        assert_eq!(note.start_time, shared.start_time);
        assert_eq!(Nullable::Null, shared.end_time);
        assert_eq!(note.color, shared.color);
        assert_eq!(note.id, shared.original_note_id);
        assert_ne!(note.id, shared.id);
    }

    #[test]
    fn test_share_direction_follows_sharer() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let space = Space::pair(alice, bob, None).unwrap();

        let shared = SharedNote::share(&note_for(bob), &space, &bob).unwrap();

        assert_eq!(bob, shared.from_user_id);
        assert_eq!(alice, shared.to_user_id);
    }

    #[test]
    fn test_share_is_a_snapshot() {
        let alice = Uuid::new_v4();
        let space = Space::pair(alice, Uuid::new_v4(), None).unwrap();
        let note = note_for(alice);

        let shared = SharedNote::share(&note, &space, &alice).unwrap();

        let patch = NotePatch {
            title: Some("Cancelled".to_string()),
            ..NotePatch::default()
        };
        let edited = note.apply(patch).unwrap();

        assert_eq!("Cancelled", edited.title);
        assert_eq!("Anniversary", shared.title);
    }

    #[test]
    fn test_share_requires_owner() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let space = Space::pair(alice, bob, None).unwrap();

        let result = SharedNote::share(&note_for(alice), &space, &bob);
        assert_eq!(Err(Error::NotOwner), result);
    }

    #[test]
    fn test_share_requires_membership() {
        let eve = Uuid::new_v4();
        let space = Space::pair(Uuid::new_v4(), Uuid::new_v4(), None).unwrap();

        let result = SharedNote::share(&note_for(eve), &space, &eve);
        assert_eq!(Err(Error::NotAMember), result);
    }

    #[test]
    fn test_visibility() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let space = Space::pair(alice, bob, None).unwrap();
        let shared = SharedNote::share(&note_for(alice), &space, &alice).unwrap();

        assert!(shared.is_visible_to(&alice));
        assert!(shared.is_visible_to(&bob));
        assert!(!shared.is_visible_to(&Uuid::new_v4()));
        assert!(shared.is_in_space(&space));
    }

    #[test]
    fn test_validate_against_space() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let space = Space::pair(alice, bob, None).unwrap();
        let shared = SharedNote::share(&note_for(alice), &space, &alice).unwrap();

        assert_eq!(Ok(()), shared.validate(&space));

        let to_self = SharedNote {
            to_user_id: alice,
            ..shared.clone()
        };
        assert_eq!(Err(Error::SameUser), to_self.validate(&space));

        let to_stranger = SharedNote {
            to_user_id: Uuid::new_v4(),
            ..shared.clone()
        };
        assert_eq!(Err(Error::NotAMember), to_stranger.validate(&space));

        let other_space = Space::pair(alice, bob, None).unwrap();
        assert_eq!(Err(Error::OtherSpace), shared.validate(&other_space));

        let unlinked = SharedNote {
            space_id: Nullable::Value(String::new()),
            ..shared
        };
        assert_eq!(Err(Error::OtherSpace), unlinked.validate(&space));
    }

    #[test]
    fn test_wire_format_keeps_null_and_absent_apart() {
        let input = json!({
            "id": "5a0fbb5e-8c55-4b8f-9d1c-0c1f3f0c2f71",
            "space_id": "s1",
            "from_user_id": "a1f5a3b2-8e0b-4a4b-9c2e-3b4d5e6f7a80",
            "to_user_id": "b2e6b4c3-9f1c-4b5c-8d3f-4c5e6f7a8b91",
            "title": "Dinner",
            "content": "",
            "start_time": null,
            "color": null,
            "original_note_id": "c3d7c5d4-0a2d-4c6d-9e4a-5d6f7a8b9ca2",
            "created_at": "2024-06-27T10:00:00Z",
        });

        let shared: SharedNote = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(Nullable::Value("s1".to_string()), shared.space_id);
        assert_eq!(Nullable::Null, shared.start_time);
        assert_eq!(Nullable::Absent, shared.end_time);
        assert_eq!(Nullable::Null, shared.color);

        let output = serde_json::to_value(&shared).unwrap();
        assert_eq!(input, output);
        assert!(output.get("end_time").is_none());

        let again: SharedNote = serde_json::from_value(output).unwrap();
        assert_eq!(shared, again);
    }

    #[test]
    fn test_wire_format_keeps_empty_space_id() {
        let input = json!({
            "id": "5a0fbb5e-8c55-4b8f-9d1c-0c1f3f0c2f71",
            "space_id": "",
            "from_user_id": "a1f5a3b2-8e0b-4a4b-9c2e-3b4d5e6f7a80",
            "to_user_id": "b2e6b4c3-9f1c-4b5c-8d3f-4c5e6f7a8b91",
            "title": "Dinner",
            "content": "",
            "color": "",
            "original_note_id": "c3d7c5d4-0a2d-4c6d-9e4a-5d6f7a8b9ca2",
            "created_at": "2024-06-27T10:00:00Z",
        });

        let shared: SharedNote = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(Nullable::Value(String::new()), shared.space_id);
        assert_eq!(Nullable::Value(String::new()), shared.color);
        assert_eq!(Nullable::Absent, shared.start_time);
        assert_eq!(input, serde_json::to_value(&shared).unwrap());
    }
}
