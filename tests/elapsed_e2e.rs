//! End-to-end interval aggregation: elapsed-days-per-partition driven from
//! rules over asserted temporal facts.

use std::sync::Arc;

use chrono::NaiveDate;
use juris::{
    beginning_of_time, calendar_years, EntityId, FactKey, FactStore, RuleSet, Session, Value,
};

fn id(s: &str) -> EntityId {
    EntityId::new(s).unwrap()
}

fn key(rel: &str, args: &[&str]) -> FactKey {
    FactKey::new(rel, args.iter().map(|a| id(a)).collect()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn presence_rules() -> Arc<RuleSet> {
    let mut rules = RuleSet::new();
    rules.register("DaysPresentPerYear", 1, |session, args| {
        let present = session.lookup(&FactKey::new("IsPresentInCountry", args.to_vec())?);
        let years = calendar_years(2009, 2014).map(|y| Value::Int(i64::from(*y)));
        present.elapsed_days_per(&years).map_err(Into::into)
    });
    Arc::new(rules)
}

#[test]
fn single_day_of_presence_lands_in_its_year() {
    let rules = presence_rules();
    let mut store = FactStore::new();

    // In the country exactly one day, 2011-12-31.
    store.assert(
        key("IsPresentInCountry", &["p1"]),
        juris::TemporalValue::from_breakpoints([
            (beginning_of_time(), Value::Bool(false)),
            (date(2011, 12, 31), Value::Bool(true)),
            (date(2012, 1, 1), Value::Bool(false)),
        ]),
    );

    let mut session = Session::new(store, rules);
    let per_year = session.derive("DaysPresentPerYear", &[id("p1")]).unwrap();

    assert_eq!(per_year.at(date(2010, 7, 1)), Value::Int(0));
    assert_eq!(per_year.at(date(2011, 7, 1)), Value::Int(1));
    assert_eq!(per_year.at(date(2012, 7, 1)), Value::Int(0));
}

#[test]
fn multi_year_presence_splits_at_boundaries() {
    let rules = presence_rules();
    let mut store = FactStore::new();

    // Present 2010-11-01 through 2011-03-01 (exclusive).
    store.assert(
        key("IsPresentInCountry", &["p1"]),
        juris::TemporalValue::from_breakpoints([
            (beginning_of_time(), Value::Bool(false)),
            (date(2010, 11, 1), Value::Bool(true)),
            (date(2011, 3, 1), Value::Bool(false)),
        ]),
    );

    let mut session = Session::new(store, rules);
    let per_year = session.derive("DaysPresentPerYear", &[id("p1")]).unwrap();

    // November + December 2010, then January + February 2011.
    assert_eq!(per_year.at(date(2010, 7, 1)), Value::Int(61));
    assert_eq!(per_year.at(date(2011, 7, 1)), Value::Int(59));
    assert_eq!(per_year.at(date(2012, 7, 1)), Value::Int(0));
}

#[test]
fn missing_presence_fact_blocks_aggregation() {
    let rules = presence_rules();
    let mut session = Session::new(FactStore::new(), rules);

    let result = session.derive("DaysPresentPerYear", &[id("p1")]).unwrap();
    assert_eq!(result.state(), juris::KnowledgeState::Unstated);
    assert_eq!(
        session.needed_facts()[0].key,
        key("IsPresentInCountry", &["p1"])
    );
}

#[test]
fn substantial_presence_threshold_rule() {
    // A statutory-style test built on the aggregate: at least 183 days of
    // presence in the year containing the as-of date.
    let mut rules = RuleSet::new();
    rules.register("DaysPresentPerYear", 1, |session, args| {
        let present = session.lookup(&FactKey::new("IsPresentInCountry", args.to_vec())?);
        let years = calendar_years(2009, 2014).map(|y| Value::Int(i64::from(*y)));
        present.elapsed_days_per(&years).map_err(Into::into)
    });
    rules.register("MeetsSubstantialPresence", 1, |session, args| {
        let per_year = session.derive("DaysPresentPerYear", args)?;
        per_year
            .gte(&juris::TemporalValue::constant(Value::Int(183)))
            .map_err(Into::into)
    });
    let rules = Arc::new(rules);

    let mut store = FactStore::new();
    // Present all of 2012, nothing else.
    store.assert(
        key("IsPresentInCountry", &["p1"]),
        juris::TemporalValue::from_breakpoints([
            (beginning_of_time(), Value::Bool(false)),
            (date(2012, 1, 1), Value::Bool(true)),
            (date(2013, 1, 1), Value::Bool(false)),
        ]),
    );

    let mut session = Session::new(store, rules);
    let meets = session
        .derive("MeetsSubstantialPresence", &[id("p1")])
        .unwrap();

    assert_eq!(meets.at(date(2012, 7, 1)), Value::Bool(true));
    assert_eq!(meets.at(date(2013, 7, 1)), Value::Bool(false));
}
