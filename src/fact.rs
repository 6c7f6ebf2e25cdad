//! Facts: keyed temporal values with provenance.
//!
//! A fact is identified by its canonical key (relationship name plus
//! ordered entity arguments, arity 1..=3) and holds one timeline, a
//! provenance flag, and an as-of date. Question text for facts that must
//! be obtained from the user lives in the store's per-relationship
//! catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::ContractError;
use crate::knowledge::KnowledgeState;
use crate::temporal::TemporalValue;

/// Maximum number of entity arguments in a fact key.
pub const MAX_ARITY: usize = 3;

/// Canonical fact identity: relationship name plus ordered arguments.
///
/// # Examples
///
/// ```
/// use juris::{EntityId, FactKey};
///
/// let p1 = EntityId::new("p1").unwrap();
/// let p2 = EntityId::new("p2").unwrap();
/// let key = FactKey::new("IsMarriedTo", vec![p1, p2]).unwrap();
/// assert_eq!(format!("{key}"), "IsMarriedTo(p1, p2)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactKey {
    relationship: String,
    args: Vec<EntityId>,
}

impl FactKey {
    /// Creates a validated fact key.
    ///
    /// # Errors
    ///
    /// [`ContractError::EmptyRelationship`] for a blank relationship name,
    /// [`ContractError::FactArity`] when the argument count is outside
    /// `1..=`[`MAX_ARITY`].
    pub fn new(
        relationship: impl Into<String>,
        args: Vec<EntityId>,
    ) -> Result<Self, ContractError> {
        let relationship = relationship.into();
        if relationship.trim().is_empty() {
            return Err(ContractError::EmptyRelationship);
        }
        if args.is_empty() || args.len() > MAX_ARITY {
            return Err(ContractError::FactArity {
                relationship,
                arity: args.len(),
            });
        }
        Ok(Self { relationship, args })
    }

    /// The relationship name.
    #[must_use]
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// The ordered entity arguments.
    #[must_use]
    pub fn args(&self) -> &[EntityId] {
        &self.args
    }
}

impl std::fmt::Display for FactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.relationship)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// How a fact came to exist in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Asserted directly by the caller.
    Asserted,
    /// Produced by a rule during resolution.
    Derived,
}

/// A stored fact: one timeline plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Canonical identity.
    pub key: FactKey,
    /// The fact's timeline.
    pub value: TemporalValue,
    /// Asserted or derived.
    pub provenance: Provenance,
    /// The date knowledge of this fact is current as of.
    pub as_of: NaiveDate,
}

/// A fact the resolver determined is required, but not yet known, to fully
/// answer a goal. Deduplicated by key within a resolution session; `Stub`
/// keys never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeededFact {
    /// The missing fact's key.
    pub key: FactKey,
    /// The blocking state observed (`Unstated` or `Uncertain`).
    pub state: KnowledgeState,
    /// Question to present to the user, if one is catalogued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// Help text accompanying the question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}
