//! Resolution sessions: the backward-chaining driver.
//!
//! A session owns one fact store, shares a read-only rule registry, and
//! threads the needed-fact accumulator through every lookup a rule makes.
//! The "dependency graph" of a goal only exists as this call trace; nothing
//! is precomputed. Any leaf lookup that is not Known yields a state-tagged
//! timeline that short-circuits upward through the kernel's operators and
//! is recorded here as a needed fact.
//!
//! Sessions are single-threaded and never shared; concurrent callers each
//! create their own.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::entity::EntityId;
use crate::error::{ContractError, JurisResult, ResolveError};
use crate::fact::{FactKey, NeededFact};
use crate::knowledge::KnowledgeState;
use crate::rules::RuleSet;
use crate::store::FactStore;
use crate::temporal::TemporalValue;

/// Default bound on the rule-call stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A fact pattern to resolve: relationship, entity arguments, as-of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// The fact pattern being asked about.
    pub key: FactKey,
    /// The date the answer is wanted as of.
    pub as_of: NaiveDate,
}

impl Goal {
    /// Creates a goal from a relationship pattern.
    ///
    /// # Errors
    ///
    /// Propagates key validation ([`ContractError`]).
    pub fn new(
        relationship: impl Into<String>,
        args: Vec<EntityId>,
        as_of: NaiveDate,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            key: FactKey::new(relationship, args)?,
            as_of,
        })
    }
}

/// Where one goal's evaluation ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalOutcome {
    /// The goal computed a fully Known timeline.
    Resolved {
        /// The goal's timeline.
        value: TemporalValue,
    },
    /// Missing knowledge blocked the computation.
    Blocked {
        /// The dominating knowledge state.
        state: KnowledgeState,
        /// Needed facts first recorded while evaluating this goal.
        needed: Vec<NeededFact>,
    },
    /// A structural error (contract violation, arithmetic, cycle) was
    /// caught at the goal boundary; other goals still resolve.
    Failed {
        /// Human-readable error.
        error: String,
    },
}

/// The result of resolving one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// The goal as posed.
    pub goal: Goal,
    /// How it ended.
    pub outcome: GoalOutcome,
}

impl Resolution {
    /// The resolved timeline, if the goal resolved.
    #[must_use]
    pub fn value(&self) -> Option<&TemporalValue> {
        match &self.outcome {
            GoalOutcome::Resolved { value } => Some(value),
            _ => None,
        }
    }
}

/// One resolution session: fact store, rule registry, and the accumulators
/// that turn lazy lookups into a needed-fact list.
#[derive(Debug)]
pub struct Session {
    store: FactStore,
    rules: Arc<RuleSet>,
    needed: BTreeMap<FactKey, NeededFact>,
    touched: BTreeSet<FactKey>,
    stack: Vec<FactKey>,
    max_depth: usize,
    today: NaiveDate,
}

impl Session {
    /// Creates a session over a store and shared rule registry.
    #[must_use]
    pub fn new(store: FactStore, rules: Arc<RuleSet>) -> Self {
        Self {
            store,
            rules,
            needed: BTreeMap::new(),
            touched: BTreeSet::new(),
            stack: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            today: chrono::Utc::now().date_naive(),
        }
    }

    /// Overrides the rule-call depth bound.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Read access to the session's store.
    #[must_use]
    pub const fn store(&self) -> &FactStore {
        &self.store
    }

    /// Mutable access to the session's store (for assertions).
    pub fn store_mut(&mut self) -> &mut FactStore {
        &mut self.store
    }

    /// Looks up a fact, recording it as touched and, when its state is
    /// `Unstated` or `Uncertain`, as needed. Absence is not an error.
    pub fn lookup(&mut self, key: &FactKey) -> TemporalValue {
        let value = self.store.lookup(key);
        self.note(key, value.state());
        value
    }

    /// Looks up a fact whose absence is an intentional placeholder: a
    /// missing key yields `Stub`, which is absorbed silently and never
    /// surfaces as a question.
    pub fn lookup_or_stub(&mut self, key: &FactKey) -> TemporalValue {
        let value = self.store.lookup_or_stub(key);
        self.note(key, value.state());
        value
    }

    /// Backward chaining: the value of `relationship(args...)`.
    ///
    /// Asserted facts win; otherwise the registered rule runs (Known
    /// results are memoized into the store with `Derived` provenance);
    /// otherwise this is a leaf fact nobody has supplied, yielding
    /// `Unstated`.
    ///
    /// # Errors
    ///
    /// [`ContractError`] on a malformed key or arity mismatch,
    /// [`ResolveError::CyclicDependency`] when a rule transitively calls
    /// itself for the same key, [`ResolveError::DepthExceeded`] past the
    /// depth bound, plus whatever the rule body itself raises.
    pub fn derive(&mut self, relationship: &str, args: &[EntityId]) -> JurisResult<TemporalValue> {
        let key = FactKey::new(relationship, args.to_vec())?;

        if self.store.contains(&key) {
            let value = self.store.lookup(&key);
            self.note(&key, value.state());
            return Ok(value);
        }

        let registered = self
            .rules
            .get(relationship)
            .map(|rule| (rule.arity(), rule.func()));
        let Some((arity, func)) = registered else {
            self.note(&key, KnowledgeState::Unstated);
            return Ok(TemporalValue::with_state(KnowledgeState::Unstated));
        };

        if arity != args.len() {
            return Err(ContractError::ArityMismatch {
                relationship: relationship.to_string(),
                expected: arity,
                actual: args.len(),
            }
            .into());
        }
        if self.stack.contains(&key) {
            return Err(ResolveError::CyclicDependency {
                key: key.to_string(),
            }
            .into());
        }
        if self.stack.len() >= self.max_depth {
            return Err(ResolveError::DepthExceeded {
                max_depth: self.max_depth,
            }
            .into());
        }

        self.touched.insert(key.clone());
        self.stack.push(key.clone());
        let result = func(self, args);
        self.stack.pop();

        let value = result?;
        if value.is_known() {
            self.store.record_derived(key, value.clone(), self.today);
        }
        Ok(value)
    }

    /// Evaluates one goal, catching structural errors at the goal boundary
    /// so other goals in the same session still resolve.
    pub fn resolve(&mut self, goal: &Goal) -> Resolution {
        debug!(goal = %goal.key, as_of = %goal.as_of, "resolving goal");
        let needed_before: BTreeSet<FactKey> = self.needed.keys().cloned().collect();

        let result = self.derive(goal.key.relationship(), goal.key.args());
        self.stack.clear();

        let outcome = match result {
            Err(err) => {
                debug!(goal = %goal.key, error = %err, "goal failed");
                GoalOutcome::Failed {
                    error: err.to_string(),
                }
            }
            Ok(value) if value.is_known() => GoalOutcome::Resolved { value },
            Ok(value) => {
                let needed: Vec<NeededFact> = self
                    .needed
                    .values()
                    .filter(|nf| !needed_before.contains(&nf.key))
                    .cloned()
                    .collect();
                debug!(goal = %goal.key, state = %value.state(), new_needed = needed.len(), "goal blocked");
                GoalOutcome::Blocked {
                    state: value.state(),
                    needed,
                }
            }
        };

        Resolution {
            goal: goal.clone(),
            outcome,
        }
    }

    /// All needed facts recorded this session, deduplicated by key.
    #[must_use]
    pub fn needed_facts(&self) -> Vec<NeededFact> {
        self.needed.values().cloned().collect()
    }

    /// Distinct fact keys touched this session (Known and not).
    #[must_use]
    pub fn facts_touched(&self) -> usize {
        self.touched.len()
    }

    /// Completion fraction in `[0, 1]`: `1 − needed/touched`. An untouched
    /// session counts as complete. Stub lookups count toward the
    /// denominator but never the numerator.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completeness(&self) -> f64 {
        if self.touched.is_empty() {
            return 1.0;
        }
        (1.0 - self.needed.len() as f64 / self.touched.len() as f64).clamp(0.0, 1.0)
    }

    fn note(&mut self, key: &FactKey, state: KnowledgeState) {
        self.touched.insert(key.clone());
        if !state.asks_user() {
            return;
        }
        if !self.needed.contains_key(key) {
            trace!(key = %key, state = %state, "needed fact recorded");
            let catalogued = self.store.question_for(key.relationship());
            self.needed.insert(
                key.clone(),
                NeededFact {
                    key: key.clone(),
                    state,
                    question: catalogued.map(|q| q.question.clone()),
                    help: catalogued.and_then(|q| q.help.clone()),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::value::Value;

    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    fn key(rel: &str, args: &[&str]) -> FactKey {
        FactKey::new(rel, args.iter().map(|a| id(a)).collect()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session_with(rules: RuleSet) -> Session {
        Session::new(FactStore::new(), Arc::new(rules))
    }

    #[test]
    fn test_lookup_records_needed_and_touched() {
        let mut session = session_with(RuleSet::new());
        let k = key("IsOver18", &["p1"]);

        let value = session.lookup(&k);
        assert_eq!(value.state(), KnowledgeState::Unstated);
        assert_eq!(session.facts_touched(), 1);
        assert_eq!(session.needed_facts().len(), 1);
        assert_eq!(session.needed_facts()[0].key, k);
    }

    #[test]
    fn test_needed_facts_deduplicate() {
        let mut session = session_with(RuleSet::new());
        let k = key("IsOver18", &["p1"]);
        session.lookup(&k);
        session.lookup(&k);
        assert_eq!(session.needed_facts().len(), 1);
        assert_eq!(session.facts_touched(), 1);
    }

    #[test]
    fn test_stub_lookups_never_surface() {
        let mut session = session_with(RuleSet::new());
        let k = key("FutureRule", &["p1"]);

        let value = session.lookup_or_stub(&k);
        assert_eq!(value.state(), KnowledgeState::Stub);
        assert!(session.needed_facts().is_empty());
        assert_eq!(session.facts_touched(), 1);
    }

    #[test]
    fn test_known_lookup_not_needed() {
        let mut session = session_with(RuleSet::new());
        let k = key("IsOver18", &["p1"]);
        session.store_mut().assert_eternal(k.clone(), Value::Bool(true));

        let value = session.lookup(&k);
        assert!(value.is_known());
        assert!(session.needed_facts().is_empty());
        assert_eq!(session.facts_touched(), 1);
    }

    #[test]
    fn test_uncertain_assertion_is_needed() {
        let mut session = session_with(RuleSet::new());
        let k = key("Income", &["p1"]);
        session.store_mut().assert_unknown(k.clone());

        session.lookup(&k);
        let needed = session.needed_facts();
        assert_eq!(needed.len(), 1);
        assert_eq!(needed[0].state, KnowledgeState::Uncertain);
    }

    #[test]
    fn test_derive_prefers_assertions_over_rules() {
        let mut rules = RuleSet::new();
        rules.register("IsAdult", 1, |_s, _a| {
            Ok(TemporalValue::constant(Value::Bool(false)))
        });
        let mut session = session_with(rules);
        let k = key("IsAdult", &["p1"]);
        session.store_mut().assert_eternal(k, Value::Bool(true));

        let value = session.derive("IsAdult", &[id("p1")]).unwrap();
        assert_eq!(value.at(date(2024, 1, 1)), Value::Bool(true));
    }

    #[test]
    fn test_derive_runs_rule_and_memoizes_known() {
        let mut rules = RuleSet::new();
        rules.register("IsAdult", 1, |session, args| {
            let age = session.lookup(&FactKey::new("Age", args.to_vec())?);
            age.gte(&TemporalValue::constant(Value::Int(18)))
                .map_err(Into::into)
        });
        let mut session = session_with(rules);
        session
            .store_mut()
            .assert_eternal(key("Age", &["p1"]), Value::Int(21));

        let value = session.derive("IsAdult", &[id("p1")]).unwrap();
        assert_eq!(value.at(date(2024, 1, 1)), Value::Bool(true));

        // Known result memoized with Derived provenance.
        let stored = session.store().get(&key("IsAdult", &["p1"])).unwrap();
        assert_eq!(stored.provenance, crate::fact::Provenance::Derived);
    }

    #[test]
    fn test_derive_blocked_result_not_memoized() {
        let mut rules = RuleSet::new();
        rules.register("IsAdult", 1, |session, args| {
            Ok(session.lookup(&FactKey::new("Age", args.to_vec())?))
        });
        let mut session = session_with(rules);

        let value = session.derive("IsAdult", &[id("p1")]).unwrap();
        assert_eq!(value.state(), KnowledgeState::Unstated);
        assert!(!session.store().contains(&key("IsAdult", &["p1"])));
    }

    #[test]
    fn test_derive_unregistered_leaf_is_unstated() {
        let mut session = session_with(RuleSet::new());
        let value = session.derive("NoSuchRule", &[id("p1")]).unwrap();
        assert_eq!(value.state(), KnowledgeState::Unstated);
        assert_eq!(session.needed_facts().len(), 1);
    }

    #[test]
    fn test_arity_mismatch_is_contract_error() {
        let mut rules = RuleSet::new();
        rules.register("IsMarriedTo", 2, |_s, _a| {
            Ok(TemporalValue::constant(Value::Bool(true)))
        });
        let mut session = session_with(rules);

        let err = session.derive("IsMarriedTo", &[id("p1")]).unwrap_err();
        assert!(err.is_contract());
    }

    #[test]
    fn test_cycle_detected_not_stack_overflow() {
        let mut rules = RuleSet::new();
        rules.register("A", 1, |session, args| session.derive("B", args));
        rules.register("B", 1, |session, args| session.derive("A", args));
        let mut session = session_with(rules);

        let err = session.derive("A", &[id("p1")]).unwrap_err();
        assert!(err.is_resolve());
        assert!(err.to_string().contains("Cyclic"));
    }

    #[test]
    fn test_depth_bound() {
        let mut rules = RuleSet::new();
        // Not a key-cycle: each call derives a different entity id.
        rules.register("Chain", 1, |session, args| {
            let next = EntityId::new(format!("{}x", args[0].as_str()))
                .map_err(crate::error::JurisError::from)?;
            session.derive("Chain", &[next])
        });
        let mut session = session_with(rules).with_max_depth(10);

        let err = session.derive("Chain", &[id("p")]).unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn test_resolve_catches_errors_per_goal() {
        let mut rules = RuleSet::new();
        rules.register("Broken", 1, |_s, _a| {
            Err(crate::error::ArithmeticError::DivisionByZero.into())
        });
        rules.register("Fine", 1, |_s, _a| {
            Ok(TemporalValue::constant(Value::Bool(true)))
        });
        let mut session = session_with(rules);
        let as_of = date(2024, 1, 1);

        let broken = session.resolve(&Goal::new("Broken", vec![id("p1")], as_of).unwrap());
        assert!(matches!(broken.outcome, GoalOutcome::Failed { .. }));

        let fine = session.resolve(&Goal::new("Fine", vec![id("p1")], as_of).unwrap());
        assert!(matches!(fine.outcome, GoalOutcome::Resolved { .. }));
        assert_eq!(fine.value().unwrap().at(as_of), Value::Bool(true));
    }

    #[test]
    fn test_resolve_blocked_reports_new_needed() {
        let mut rules = RuleSet::new();
        rules.register("IsEligible", 1, |session, args| {
            let a = session.lookup(&FactKey::new("IsResident", args.to_vec())?);
            let b = session.lookup(&FactKey::new("IsOver18", args.to_vec())?);
            a.and(&b).map_err(Into::into)
        });
        let mut session = session_with(rules);
        let goal = Goal::new("IsEligible", vec![id("p1")], date(2024, 1, 1)).unwrap();

        let result = session.resolve(&goal);
        match result.outcome {
            GoalOutcome::Blocked { state, needed } => {
                assert_eq!(state, KnowledgeState::Unstated);
                assert_eq!(needed.len(), 2);
            }
            other => panic!("expected blocked outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_completeness() {
        let mut session = session_with(RuleSet::new());
        assert!((session.completeness() - 1.0).abs() < f64::EPSILON);

        session
            .store_mut()
            .assert_eternal(key("A", &["p1"]), Value::Bool(true));
        session.lookup(&key("A", &["p1"]));
        session.lookup(&key("B", &["p1"])); // unstated
        assert!((session.completeness() - 0.5).abs() < f64::EPSILON);

        // Stubs count toward the denominator only.
        session.lookup_or_stub(&key("C", &["p1"]));
        assert!((session.completeness() - (2.0 / 3.0)).abs() < 1e-9);
    }
}
