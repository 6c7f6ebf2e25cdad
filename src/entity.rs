//! Legal entity types and identity.
//!
//! Entities are the argument slots of fact keys. Identity is a plain
//! string id chosen by the caller (or generated); the entity category is an
//! explicit discriminant set at construction, never inferred from anything
//! else.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ContractError;

/// Stable identity of a legal entity, used inside fact keys.
///
/// # Examples
///
/// ```
/// use juris::EntityId;
///
/// let id = EntityId::new("p1").unwrap();
/// assert_eq!(id.as_str(), "p1");
/// assert!(EntityId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an entity id from a caller-chosen string.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::EmptyEntityId`] if the id is empty or
    /// whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ContractError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ContractError::EmptyEntityId);
        }
        Ok(Self(id))
    }

    /// Generates a random unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The underlying id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a legal entity: an explicit tag, set at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A natural person.
    Person,
    /// A corporation or other juridical person.
    Corporation,
    /// A composite of member entities (e.g. a household or partnership).
    Composite,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Corporation => write!(f, "corporation"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

/// A party that facts can be about.
///
/// Composite entities hold member *ids*, not owned entities: membership is
/// a relationship, and members are looked up where needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntity {
    /// Stable identity.
    pub id: EntityId,
    /// Explicit category discriminant.
    pub kind: EntityKind,
    /// Member ids; populated only for `Composite` entities.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub members: BTreeSet<EntityId>,
}

impl LegalEntity {
    /// Creates a natural person.
    #[must_use]
    pub fn person(id: EntityId) -> Self {
        Self {
            id,
            kind: EntityKind::Person,
            members: BTreeSet::new(),
        }
    }

    /// Creates a corporation.
    #[must_use]
    pub fn corporation(id: EntityId) -> Self {
        Self {
            id,
            kind: EntityKind::Corporation,
            members: BTreeSet::new(),
        }
    }

    /// Creates a composite entity over the given members.
    #[must_use]
    pub fn composite(id: EntityId, members: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            id,
            kind: EntityKind::Composite,
            members: members.into_iter().collect(),
        }
    }

    /// Returns true if `member` belongs to this (composite) entity.
    #[must_use]
    pub fn has_member(&self, member: &EntityId) -> bool {
        self.members.contains(member)
    }

    /// Number of members; zero for non-composite entities.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

impl fmt::Display for LegalEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
