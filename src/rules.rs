//! The rule registry.
//!
//! Rules are external pure functions composed from kernel operators and
//! fact-store lookups. The engine never declares a dependency graph up
//! front: a rule's dependencies are whatever it happens to look up or
//! derive while running, discovered as a call trace through the session.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::EntityId;
use crate::error::JurisResult;
use crate::session::Session;
use crate::temporal::TemporalValue;

/// A rule body: a pure function over the session's facts.
///
/// Rule functions must be pure and inexpensive per call; derived Known
/// results are memoized in the session's store, but blocked results are
/// re-evaluated.
pub type RuleFn = Arc<dyn Fn(&mut Session, &[EntityId]) -> JurisResult<TemporalValue> + Send + Sync>;

/// A registered rule: relationship name, declared arity, body.
#[derive(Clone)]
pub struct Rule {
    relationship: String,
    arity: usize,
    func: RuleFn,
}

impl Rule {
    /// The relationship this rule derives.
    #[must_use]
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// The declared argument count, checked at call time.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// The rule body.
    #[must_use]
    pub fn func(&self) -> RuleFn {
        Arc::clone(&self.func)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("relationship", &self.relationship)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Registry of rules keyed by relationship name.
///
/// Shared read-only across sessions; rule bodies themselves are pure.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: HashMap<String, Rule>,
}

impl RuleSet {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule for `relationship`, replacing any prior rule for
    /// the same name.
    pub fn register<F>(&mut self, relationship: impl Into<String>, arity: usize, func: F)
    where
        F: Fn(&mut Session, &[EntityId]) -> JurisResult<TemporalValue> + Send + Sync + 'static,
    {
        let relationship = relationship.into();
        self.rules.insert(
            relationship.clone(),
            Rule {
                relationship,
                arity,
                func: Arc::new(func),
            },
        );
    }

    /// The rule registered for `relationship`, if any.
    #[must_use]
    pub fn get(&self, relationship: &str) -> Option<&Rule> {
        self.rules.get(relationship)
    }

    /// Returns true if a rule is registered for `relationship`.
    #[must_use]
    pub fn contains(&self, relationship: &str) -> bool {
        self.rules.contains_key(relationship)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
