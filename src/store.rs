//! The fact store: a keyed repository of asserted and derived facts.
//!
//! One store belongs to one resolution session (one case or user
//! interaction). Absence of a fact is not an error; a lookup of a missing
//! key yields an `Unstated` timeline, which is what drives needed-fact
//! collection upstream. Concurrent sessions each own an independent store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fact::{Fact, FactKey, Provenance};
use crate::knowledge::KnowledgeState;
use crate::temporal::TemporalValue;
use crate::value::Value;

/// Catalogued question text for a relationship, shown when a fact of that
/// relationship is needed from the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionText {
    /// The question itself.
    pub question: String,
    /// Optional longer help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Keyed repository of facts plus the per-relationship question catalog.
///
/// # Examples
///
/// ```
/// use juris::{EntityId, FactKey, FactStore, KnowledgeState, Value};
///
/// let mut store = FactStore::new();
/// let key = FactKey::new("IsOver18", vec![EntityId::new("p1").unwrap()]).unwrap();
///
/// assert_eq!(store.lookup(&key).state(), KnowledgeState::Unstated);
/// store.assert_eternal(key.clone(), Value::Bool(true));
/// assert!(store.lookup(&key).is_known());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactStore {
    facts: BTreeMap<FactKey, Fact>,
    questions: BTreeMap<String, QuestionText>,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts an asserted fact: replaces any prior value for the same key
    /// outright, whatever its provenance. No merging.
    pub fn assert(&mut self, key: FactKey, value: TemporalValue) {
        self.assert_as_of(key, value, chrono::Utc::now().date_naive());
    }

    /// [`assert`](Self::assert) with an explicit as-of date.
    pub fn assert_as_of(&mut self, key: FactKey, value: TemporalValue, as_of: NaiveDate) {
        self.facts.insert(
            key.clone(),
            Fact {
                key,
                value,
                provenance: Provenance::Asserted,
                as_of,
            },
        );
    }

    /// Asserts an eternal constant value for the key.
    pub fn assert_eternal(&mut self, key: FactKey, value: Value) {
        self.assert(key, TemporalValue::constant(value));
    }

    /// Records that the user was asked and stated they do not know: the
    /// fact exists, with an `Uncertain` timeline.
    pub fn assert_unknown(&mut self, key: FactKey) {
        self.assert(key, TemporalValue::with_state(KnowledgeState::Uncertain));
    }

    /// The stored timeline for `key`, or an `Unstated` timeline if absent.
    #[must_use]
    pub fn lookup(&self, key: &FactKey) -> TemporalValue {
        self.facts.get(key).map_or_else(
            || TemporalValue::with_state(KnowledgeState::Unstated),
            |fact| fact.value.clone(),
        )
    }

    /// Like [`lookup`](Self::lookup), but an absent key yields a `Stub`
    /// timeline. Used by rule authors for known-incomplete sub-rules whose
    /// absence must never surface as a question.
    #[must_use]
    pub fn lookup_or_stub(&self, key: &FactKey) -> TemporalValue {
        self.facts.get(key).map_or_else(
            || TemporalValue::with_state(KnowledgeState::Stub),
            |fact| fact.value.clone(),
        )
    }

    /// Records a rule-derived fact. Never overwrites an asserted fact:
    /// assertions win over derivations for the same key.
    pub fn record_derived(&mut self, key: FactKey, value: TemporalValue, as_of: NaiveDate) {
        if matches!(
            self.facts.get(&key),
            Some(fact) if fact.provenance == Provenance::Asserted
        ) {
            return;
        }
        self.facts.insert(
            key.clone(),
            Fact {
                key,
                value,
                provenance: Provenance::Derived,
                as_of,
            },
        );
    }

    /// Returns the full stored fact, if any.
    #[must_use]
    pub fn get(&self, key: &FactKey) -> Option<&Fact> {
        self.facts.get(key)
    }

    /// Returns true if a fact is stored for `key`.
    #[must_use]
    pub fn contains(&self, key: &FactKey) -> bool {
        self.facts.contains_key(key)
    }

    /// Catalogues question text for a relationship.
    pub fn define_question(
        &mut self,
        relationship: impl Into<String>,
        question: impl Into<String>,
        help: Option<String>,
    ) {
        self.questions.insert(
            relationship.into(),
            QuestionText {
                question: question.into(),
                help,
            },
        );
    }

    /// Catalogued question text for a relationship, if any.
    #[must_use]
    pub fn question_for(&self, relationship: &str) -> Option<&QuestionText> {
        self.questions.get(relationship)
    }

    /// Iterates all stored facts in key order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Number of stored facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if no facts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
