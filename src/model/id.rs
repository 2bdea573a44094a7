use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

/// The canonical identity of a `Transaction` or `Budget`. Always non-empty once an entity has
/// passed through reconciliation.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

/// Returned when attempting to construct an `EntityId` from an empty string.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("an entity id cannot be empty")]
pub struct EmptyIdError;

impl EntityId {
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmptyIdError);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for EntityId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntityId::new(s).map_err(serde::de::Error::custom)
    }
}
