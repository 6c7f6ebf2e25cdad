//! The knowledge-state lattice.
//!
//! Every temporal value carries a [`KnowledgeState`] describing how much is
//! known about it. States form a total order by "how blocking" they are, and
//! every composite operation takes the lattice maximum of its operands'
//! states before attempting any real computation. Only when all relevant
//! operands are `Known` does a composite compute an actual timeline.

use serde::{Deserialize, Serialize};

/// How much is known about a value.
///
/// The ordering is `Known < Uncertain < Unstated < Stub`: a `Stub` dominates
/// everything, a fully `Known` value dominates nothing.
///
/// # Examples
///
/// ```
/// use juris::KnowledgeState;
///
/// assert_eq!(KnowledgeState::Known.combine(KnowledgeState::Unstated),
///            KnowledgeState::Unstated);
/// assert!(KnowledgeState::Stub > KnowledgeState::Uncertain);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeState {
    /// The value is fully computed; its timeline is meaningful.
    #[default]
    Known,
    /// The value was computed from inherently fuzzy or contested inputs,
    /// or the user explicitly stated they do not know it.
    Uncertain,
    /// The fact has not yet been supplied by the user.
    Unstated,
    /// A modeling placeholder, intentionally never meant to be resolved.
    /// Never surfaced as a question.
    Stub,
}

impl KnowledgeState {
    /// Lattice join: the more blocking of the two states.
    ///
    /// Commutative, associative, idempotent; `Known` is the identity.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }

    /// Folds [`combine`](Self::combine) over any number of states.
    ///
    /// An empty iterator yields `Known` (the lattice identity).
    #[must_use]
    pub fn combine_all(states: impl IntoIterator<Item = Self>) -> Self {
        states
            .into_iter()
            .fold(Self::Known, KnowledgeState::combine)
    }

    /// Returns true if this state blocks computation (anything above `Known`).
    #[must_use]
    pub fn is_blocking(self) -> bool {
        self > Self::Known
    }

    /// Returns true if a fact in this state should be asked of the user.
    ///
    /// `Stub` is excluded by design: a placeholder is never something to
    /// ask the user for.
    #[must_use]
    pub const fn asks_user(self) -> bool {
        matches!(self, Self::Uncertain | Self::Unstated)
    }
}

impl std::fmt::Display for KnowledgeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known => write!(f, "known"),
            Self::Uncertain => write!(f, "uncertain"),
            Self::Unstated => write!(f, "unstated"),
            Self::Stub => write!(f, "stub"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [KnowledgeState; 4] = [
        KnowledgeState::Known,
        KnowledgeState::Uncertain,
        KnowledgeState::Unstated,
        KnowledgeState::Stub,
    ];

    #[test]
    fn test_total_order() {
        assert!(KnowledgeState::Known < KnowledgeState::Uncertain);
        assert!(KnowledgeState::Uncertain < KnowledgeState::Unstated);
        assert!(KnowledgeState::Unstated < KnowledgeState::Stub);
    }

    #[test]
    fn test_combine_identity() {
        for state in ALL {
            assert_eq!(KnowledgeState::Known.combine(state), state);
            assert_eq!(state.combine(KnowledgeState::Known), state);
        }
    }

    #[test]
    fn test_combine_commutative_associative_idempotent() {
        for a in ALL {
            assert_eq!(a.combine(a), a);
            for b in ALL {
                assert_eq!(a.combine(b), b.combine(a));
                for c in ALL {
                    assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
                }
            }
        }
    }

    #[test]
    fn test_combine_all() {
        assert_eq!(KnowledgeState::combine_all([]), KnowledgeState::Known);
        assert_eq!(
            KnowledgeState::combine_all([
                KnowledgeState::Known,
                KnowledgeState::Uncertain,
                KnowledgeState::Unstated,
            ]),
            KnowledgeState::Unstated
        );
    }

    #[test]
    fn test_is_blocking() {
        assert!(!KnowledgeState::Known.is_blocking());
        assert!(KnowledgeState::Uncertain.is_blocking());
        assert!(KnowledgeState::Unstated.is_blocking());
        assert!(KnowledgeState::Stub.is_blocking());
    }

    #[test]
    fn test_asks_user_excludes_stub() {
        assert!(!KnowledgeState::Known.asks_user());
        assert!(KnowledgeState::Uncertain.asks_user());
        assert!(KnowledgeState::Unstated.asks_user());
        assert!(!KnowledgeState::Stub.asks_user());
    }

    #[test]
    fn test_serde_is_snake_case_string() {
        let json = serde_json::to_string(&KnowledgeState::Unstated).unwrap();
        assert_eq!(json, "\"unstated\"");
        let parsed: KnowledgeState = serde_json::from_str("\"stub\"").unwrap();
        assert_eq!(parsed, KnowledgeState::Stub);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", KnowledgeState::Known), "known");
        assert_eq!(format!("{}", KnowledgeState::Stub), "stub");
    }
}
