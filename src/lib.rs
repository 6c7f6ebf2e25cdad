//! A temporal-value kernel and goal-directed fact resolver for encoding
//! statutory and business rules.
//!
//! # Core Concepts
//!
//! - **Temporal value**: every quantity is a step function over dates, a
//!   sorted list of breakpoints where the value changes. "Is this person
//!   married?" has an answer for every date, not just today.
//! - **Knowledge state**: a timeline is tagged `Known`, `Uncertain`
//!   (asked, the user did not know), `Unstated` (never asked), or `Stub`
//!   (an intentional placeholder). Non-`Known` states short-circuit
//!   through every operator, so partial knowledge degrades computations
//!   instead of crashing them.
//! - **Facts and rules**: leaf facts live in a per-session [`FactStore`];
//!   derived facts come from pure rule functions in a shared [`RuleSet`].
//!   Assertions always win over derivations.
//! - **Goal resolution**: [`Session::resolve`] backward-chains from a goal
//!   through rules to leaf facts, collecting every missing fact as a
//!   [`NeededFact`] with catalogued question text. The caller answers some
//!   questions and resolves again; the loop converges as knowledge
//!   accumulates.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use juris::{FactKey, FactStore, Goal, GoalOutcome, RuleSet, Session, Value};
//!
//! let mut rules = RuleSet::new();
//! rules.register("MayEnlist", 1, |session, args| {
//!     let over18 = session.lookup(&FactKey::new("IsOver18", args.to_vec())?);
//!     let citizen = session.lookup(&FactKey::new("IsCitizen", args.to_vec())?);
//!     over18.and(&citizen).map_err(Into::into)
//! });
//! let rules = Arc::new(rules);
//!
//! let mut store = FactStore::new();
//! store.assert_eternal(
//!     FactKey::new("IsOver18", vec![juris::EntityId::new("p1")?])?,
//!     Value::Bool(true),
//! );
//! store.assert_eternal(
//!     FactKey::new("IsCitizen", vec![juris::EntityId::new("p1")?])?,
//!     Value::Bool(true),
//! );
//!
//! let mut session = Session::new(store, rules);
//! let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let goal = Goal::new("MayEnlist", vec![juris::EntityId::new("p1")?], as_of)?;
//! let resolution = session.resolve(&goal);
//!
//! assert!(matches!(resolution.outcome, GoalOutcome::Resolved { .. }));
//! assert_eq!(resolution.value().unwrap().at(as_of), Value::Bool(true));
//! # Ok::<(), juris::JurisError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod calendar;
pub mod entity;
pub mod error;
pub mod fact;
pub mod knowledge;
pub mod protocol;
pub mod rules;
pub mod session;
pub mod store;
pub mod temporal;
pub mod time;
pub mod value;

pub use calendar::{Calendar, WeekendsOnly};
pub use entity::{EntityId, EntityKind, LegalEntity};
pub use error::{
    ArithmeticError, ContractError, JurisError, JurisResult, ResolveError,
};
pub use fact::{Fact, FactKey, NeededFact, Provenance, MAX_ARITY};
pub use knowledge::KnowledgeState;
pub use protocol::{
    execute, AssertedValue, FactAssertion, GoalPattern, GoalReport, ResolveRequest,
    ResolveResponse, Verbosity,
};
pub use rules::{Rule, RuleFn, RuleSet};
pub use session::{Goal, GoalOutcome, Resolution, Session, DEFAULT_MAX_DEPTH};
pub use store::{FactStore, QuestionText};
pub use temporal::elapsed::{calendar_years, elapsed_days, elapsed_days_per};
pub use temporal::{Breakpoint, Temporal, TemporalValue};
pub use time::{beginning_of_time, days_between, end_of_time, DateSpan};
pub use value::Value;
