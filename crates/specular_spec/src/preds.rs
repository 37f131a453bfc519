//! Standard predicate specs.
//!
//! Names follow the familiar `int?` / `pos-int?` convention so they read well
//! inside problem reports.

use regex::Regex;

use crate::error::{SpecError, SpecResult};
use crate::spec::{predicate, Spec};
use crate::value::{Set, Value};

pub fn any() -> Spec {
    predicate("any?", |_| true)
}

pub fn nil() -> Spec {
    predicate("nil?", Value::is_nil)
}

pub fn boolean() -> Spec {
    predicate("boolean?", |v| matches!(v, Value::Bool(_)))
}

pub fn int() -> Spec {
    predicate("int?", |v| matches!(v, Value::Int(_)))
}

pub fn float() -> Spec {
    predicate("float?", |v| matches!(v, Value::Float(_)))
}

pub fn number() -> Spec {
    predicate("number?", |v| v.as_f64().is_some())
}

pub fn string() -> Spec {
    predicate("string?", |v| matches!(v, Value::Str(_)))
}

pub fn keyword() -> Spec {
    predicate("keyword?", |v| matches!(v, Value::Keyword(_)))
}

pub fn map() -> Spec {
    predicate("map?", |v| matches!(v, Value::Map(_)))
}

pub fn vector() -> Spec {
    predicate("vector?", |v| matches!(v, Value::Vector(_)))
}

pub fn list() -> Spec {
    predicate("list?", |v| matches!(v, Value::List(_)))
}

pub fn set() -> Spec {
    predicate("set?", |v| matches!(v, Value::Set(_)))
}

pub fn sequential() -> Spec {
    predicate("sequential?", Value::is_sequential)
}

pub fn coll() -> Spec {
    predicate("coll?", Value::is_coll)
}

pub fn pos_int() -> Spec {
    predicate("pos-int?", |v| v.as_int().is_some_and(|i| i > 0))
}

pub fn nat_int() -> Spec {
    predicate("nat-int?", |v| v.as_int().is_some_and(|i| i >= 0))
}

pub fn neg_int() -> Spec {
    predicate("neg-int?", |v| v.as_int().is_some_and(|i| i < 0))
}

pub fn even() -> Spec {
    predicate("even?", |v| v.as_int().is_some_and(|i| i % 2 == 0))
}

pub fn odd() -> Spec {
    predicate("odd?", |v| v.as_int().is_some_and(|i| i % 2 != 0))
}

pub fn zero() -> Spec {
    predicate("zero?", |v| v.as_f64().is_some_and(|x| x == 0.0))
}

pub fn pos() -> Spec {
    predicate("pos?", |v| v.as_f64().is_some_and(|x| x > 0.0))
}

pub fn neg() -> Spec {
    predicate("neg?", |v| v.as_f64().is_some_and(|x| x < 0.0))
}

/// Membership in a literal set of values, e.g. `#{:club :heart}`.
pub fn one_of(values: impl IntoIterator<Item = Value>) -> Spec {
    let members: Set = values.into_iter().collect();
    let name = Value::Set(members.clone()).to_string();
    predicate(name, move |v| members.contains(v))
}

/// Integer in the half-open range `[lo, hi)`.
pub fn int_in(lo: i64, hi: i64) -> Spec {
    predicate(format!("(int-in {} {})", lo, hi), move |v| {
        v.as_int().is_some_and(|i| lo <= i && i < hi)
    })
}

/// Finite number in the inclusive range `[lo, hi]`.
pub fn double_in(lo: f64, hi: f64) -> Spec {
    predicate(format!("(double-in :min {} :max {})", lo, hi), move |v| {
        v.as_f64().is_some_and(|x| x.is_finite() && lo <= x && x <= hi)
    })
}

/// String whose character count lies in `[min, max]`.
pub fn string_len_in(min: usize, max: usize) -> Spec {
    predicate(format!("(string-len-in {} {})", min, max), move |v| {
        v.as_str()
            .map(|s| s.chars().count())
            .is_some_and(|n| min <= n && n <= max)
    })
}

/// String matching a regular expression anywhere.
///
/// Anchor the pattern with `^...$` for a whole-string match.
pub fn matches(pattern: &str) -> SpecResult<Spec> {
    let re = Regex::new(pattern).map_err(|source| SpecError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(predicate(format!("(re-matches {:?} %)", pattern), move |v| {
        v.as_str().is_some_and(|s| re.is_match(s))
    }))
}

/// Look up a standard predicate by its conventional name.
pub fn by_name(name: &str) -> Option<Spec> {
    let spec = match name.trim_end_matches('?') {
        "any" => any(),
        "nil" => nil(),
        "boolean" => boolean(),
        "int" => int(),
        "float" | "double" => float(),
        "number" => number(),
        "string" => string(),
        "keyword" => keyword(),
        "map" => map(),
        "vector" => vector(),
        "list" => list(),
        "set" => set(),
        "sequential" => sequential(),
        "coll" => coll(),
        "pos-int" => pos_int(),
        "nat-int" => nat_int(),
        "neg-int" => neg_int(),
        "even" => even(),
        "odd" => odd(),
        "zero" => zero(),
        "pos" => pos(),
        "neg" => neg(),
        _ => return None,
    };
    Some(spec)
}

/// Names understood by [`by_name`].
pub const STANDARD_NAMES: &[&str] = &[
    "any?", "nil?", "boolean?", "int?", "float?", "number?", "string?", "keyword?", "map?",
    "vector?", "list?", "set?", "sequential?", "coll?", "pos-int?", "nat-int?", "neg-int?",
    "even?", "odd?", "zero?", "pos?", "neg?",
];
