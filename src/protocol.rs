//! The request/response document the core exposes to a hosting service.
//!
//! This is plain serde data with no transport: a host maps it onto
//! whatever framing it likes. A request carries goal patterns and fact
//! assertions; the response carries per-goal reports, the (verbosity-
//! filtered) needed facts, completion percentage, and timing. When `echo`
//! is set, asserted facts are mirrored back in the response.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::EntityId;
use crate::error::JurisResult;
use crate::fact::{Fact, FactKey, NeededFact, Provenance};
use crate::rules::RuleSet;
use crate::session::{Goal, GoalOutcome, Resolution, Session};
use crate::store::FactStore;
use crate::temporal::{Breakpoint, TemporalValue};
use crate::value::Value;

/// How many needed facts to surface in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// At most one needed fact: the single next question to ask.
    Concise,
    /// The first needed fact of each blocked goal.
    Top,
    /// A screenful: at most ten needed facts.
    Screen,
    /// Every needed fact recorded this session.
    #[default]
    All,
}

/// One fact asserted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactAssertion {
    /// Relationship name.
    pub relationship: String,
    /// Ordered entity-id arguments (arity 1..=3).
    pub args: Vec<String>,
    /// The asserted value.
    pub value: AssertedValue,
    /// Optional as-of date for the assertion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

/// The shape of an asserted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertedValue {
    /// A single value holding for all of time.
    Eternal(Value),
    /// An explicit breakpoint timeline.
    Timeline(Vec<Breakpoint<Value>>),
    /// The user was asked and stated they do not know.
    Unknown,
}

/// One goal pattern to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPattern {
    /// Relationship name.
    pub relationship: String,
    /// Ordered entity-id arguments.
    pub args: Vec<String>,
    /// Date the answer is wanted as of; defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

/// A resolution request: goals plus the facts known so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Goal patterns to resolve, in order.
    pub goals: Vec<GoalPattern>,
    /// Facts asserted before resolution begins.
    #[serde(default)]
    pub facts: Vec<FactAssertion>,
    /// Mirror asserted facts back in the response.
    #[serde(default)]
    pub echo: bool,
    /// Needed-fact filtering level.
    #[serde(default)]
    pub verbosity: Verbosity,
}

/// Per-goal slice of the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalReport {
    /// The goal as evaluated.
    pub goal: Goal,
    /// How it ended.
    pub outcome: GoalOutcome,
    /// For resolved goals, the timeline's value at the goal's as-of date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_as_of: Option<Value>,
}

/// The resolution response document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// One report per requested goal, in request order.
    pub goals: Vec<GoalReport>,
    /// Needed facts after verbosity filtering, deduplicated by key.
    pub needed_facts: Vec<NeededFact>,
    /// Completion percentage in `[0, 100]`.
    pub percentage_complete: f64,
    /// Wall-clock evaluation time.
    pub elapsed_ms: u64,
    /// Asserted facts, mirrored back when the request set `echo`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<Vec<Fact>>,
}

/// Evaluates a request against a rule registry.
///
/// Each request gets a fresh session and store, so concurrent callers are
/// isolated by construction. Structural errors inside a goal are reported
/// in that goal's report; only malformed request data (bad keys, bad
/// entity ids) fails the whole request.
///
/// # Errors
///
/// [`crate::ContractError`] via [`crate::JurisError`] when an assertion or
/// goal pattern is malformed.
pub fn execute(rules: &Arc<RuleSet>, request: &ResolveRequest) -> JurisResult<ResolveResponse> {
    let started = Instant::now();
    let today = chrono::Utc::now().date_naive();

    let mut store = FactStore::new();
    for assertion in &request.facts {
        let key = parse_key(&assertion.relationship, &assertion.args)?;
        let as_of = assertion.as_of.unwrap_or(today);
        match &assertion.value {
            AssertedValue::Eternal(value) => {
                store.assert_as_of(key, TemporalValue::constant(value.clone()), as_of);
            }
            AssertedValue::Timeline(points) => {
                let timeline = TemporalValue::from_breakpoints(
                    points.iter().map(|bp| (bp.date, bp.value.clone())),
                );
                store.assert_as_of(key, timeline, as_of);
            }
            AssertedValue::Unknown => store.assert_unknown(key),
        }
    }

    let mut session = Session::new(store, Arc::clone(rules));
    let mut resolutions = Vec::with_capacity(request.goals.len());
    for pattern in &request.goals {
        let goal = Goal {
            key: parse_key(&pattern.relationship, &pattern.args)?,
            as_of: pattern.as_of.unwrap_or(today),
        };
        resolutions.push(session.resolve(&goal));
    }

    let goals = resolutions
        .iter()
        .map(|resolution| GoalReport {
            goal: resolution.goal.clone(),
            outcome: resolution.outcome.clone(),
            value_as_of: resolution.value().map(|v| v.at(resolution.goal.as_of)),
        })
        .collect();

    let needed_facts = filter_needed(request.verbosity, &session, &resolutions);
    let percentage_complete = session.completeness() * 100.0;

    let facts = request.echo.then(|| {
        session
            .store()
            .facts()
            .filter(|fact| fact.provenance == Provenance::Asserted)
            .cloned()
            .collect()
    });

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    debug!(
        goals = request.goals.len(),
        needed = needed_facts.len(),
        percentage_complete,
        elapsed_ms,
        "request evaluated"
    );

    Ok(ResolveResponse {
        goals,
        needed_facts,
        percentage_complete,
        elapsed_ms,
        facts,
    })
}

fn parse_key(relationship: &str, args: &[String]) -> JurisResult<FactKey> {
    let ids = args
        .iter()
        .map(EntityId::new)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FactKey::new(relationship, ids)?)
}

fn filter_needed(
    verbosity: Verbosity,
    session: &Session,
    resolutions: &[Resolution],
) -> Vec<NeededFact> {
    let all = session.needed_facts();
    match verbosity {
        Verbosity::All => all,
        Verbosity::Screen => all.into_iter().take(10).collect(),
        Verbosity::Concise => all.into_iter().take(1).collect(),
        Verbosity::Top => {
            let mut out: Vec<NeededFact> = Vec::new();
            for resolution in resolutions {
                if let GoalOutcome::Blocked { needed, .. } = &resolution.outcome {
                    if let Some(first) = needed.first() {
                        if !out.iter().any(|nf| nf.key == first.key) {
                            out.push(first.clone());
                        }
                    }
                }
            }
            out
        }
    }
}
