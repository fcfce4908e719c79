//! Three-state optional values
//!
//! JSON can leave a key out, set it to `null` or give it a value. [`Nullable`] keeps those three
//! states apart, where an `Option` would fold the first two together.
//!
//! Use it on struct fields together with
//! `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`: a missing key decodes to
//! [`Nullable::Absent`] and is left out again when encoding.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// A value that can be absent, explicitly null or present
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Nullable<T> {
    /// The key was not there at all
    Absent,

    /// The key was there, set to `null`
    Null,

    /// The key was there with a value
    Value(T),
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Nullable<T> {
    /// Is the key missing?
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Borrow the value, if any
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Turn a missing key into an explicit `null`
    ///
    /// Stored records always carry their nullable keys
    #[must_use]
    pub fn or_null(self) -> Self {
        match self {
            Self::Absent => Self::Null,
            other => other,
        }
    }

    /// Apply `self` as a patch on top of `current`
    ///
    /// A missing key keeps the current value, `null` clears it and a value replaces it
    #[must_use]
    pub fn patch(self, current: Self) -> Self {
        match self {
            Self::Absent => current,
            other => other,
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<T> Serialize for Nullable<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            // only reachable without `skip_serializing_if`, null is the closest thing
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // a missing key never gets here, `#[serde(default)]` turns it into `Absent`
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
