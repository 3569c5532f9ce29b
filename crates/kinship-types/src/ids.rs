//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Individuals are identified by UUIDs. Freshly created individuals use
//! UUID v7 (time-ordered); seeded populations can derive their identifiers
//! from caller-supplied random bytes so a whole run stays reproducible.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an individual in the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndividualId(pub Uuid);

impl IndividualId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create an identifier from 16 caller-supplied random bytes (UUID v4 layout).
    ///
    /// Used by seeded spawners so identifiers are a pure function of the seed.
    pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl Default for IndividualId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for IndividualId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for IndividualId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<IndividualId> for Uuid {
    fn from(id: IndividualId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = IndividualId::new();
        let b = IndividualId::new();
        assert_ne!(a, b);
        assert_ne!(Uuid::from(a), Uuid::nil());
    }

    #[test]
    fn random_bytes_are_deterministic() {
        let bytes = [7_u8; 16];
        assert_eq!(
            IndividualId::from_random_bytes(bytes),
            IndividualId::from_random_bytes(bytes)
        );
        assert_eq!(
            Uuid::from(IndividualId::from_random_bytes(bytes)).get_version_num(),
            4
        );
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = IndividualId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{id}\"")));
    }
}
