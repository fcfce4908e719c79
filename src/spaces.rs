//! Spaces
//!
//! A space pairs two users. The member order is kept as given and has no meaning.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Space validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Both members are the same user
    #[error("A space needs two different users")]
    SameUser,
}

/// A pairing between two users
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Space {
    /// Space ID
    pub id: Uuid,

    /// First member
    pub user_a_id: Uuid,

    /// Second member
    pub user_b_id: Uuid,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Creation date
    pub created_at: DateTime<Utc>,
}

impl Space {
    /// Pair two users
    pub fn pair(user_a_id: Uuid, user_b_id: Uuid, name: Option<String>) -> Result<Self, Error> {
        // blank names are no names
        let name = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let space = Self {
            id: Uuid::new_v4(),
            user_a_id,
            user_b_id,
            name,
            created_at: Utc::now(),
        };

        space.validate()?;

        Ok(space)
    }

    /// Check the field constraints
    pub fn validate(&self) -> Result<(), Error> {
        if self.user_a_id == self.user_b_id {
            return Err(Error::SameUser);
        }

        Ok(())
    }

    /// Is the user one of the two members?
    pub fn has_member(&self, user_id: &Uuid) -> bool {
        &self.user_a_id == user_id || &self.user_b_id == user_id
    }

    /// The other member of the space, if the user is a member
    pub fn partner_of(&self, user_id: &Uuid) -> Option<Uuid> {
        if &self.user_a_id == user_id {
            Some(self.user_b_id)
        } else if &self.user_b_id == user_id {
            Some(self.user_a_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_needs_two_users() {
        let user = Uuid::new_v4();
        assert_eq!(Err(Error::SameUser), Space::pair(user, user, None));
    }

    #[test]
    fn test_members() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let eve = Uuid::new_v4();

        let space = Space::pair(alice, bob, Some("  Home ".to_string())).unwrap();

        assert_eq!(Some("Home".to_string()), space.name);
        assert!(space.has_member(&alice));
        assert!(space.has_member(&bob));
        assert!(!space.has_member(&eve));

        assert_eq!(Some(bob), space.partner_of(&alice));
        assert_eq!(Some(alice), space.partner_of(&bob));
        assert_eq!(None, space.partner_of(&eve));
    }

    #[test]
    fn test_validate_decoded_space() {
        let user = Uuid::new_v4();
        let space: Space = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "user_a_id": user,
            "user_b_id": user,
            "created_at": "2024-06-27T10:00:00Z",
        }))
        .unwrap();

        assert_eq!(Err(Error::SameUser), space.validate());

        let space = Space {
            user_b_id: Uuid::new_v4(),
            ..space
        };
        assert_eq!(Ok(()), space.validate());
    }

    #[test]
    fn test_blank_name_is_dropped() {
        let space = Space::pair(Uuid::new_v4(), Uuid::new_v4(), Some("  ".to_string())).unwrap();
        assert_eq!(None, space.name);
    }
}
