//! Explanations of why a value does not conform.
//!
//! The explainer walks the same dispatch tree as conform. `And` and `Cat`
//! report only their first failing part; `Or` and `Alt` report every branch.

use std::fmt;

use serde::Serialize;

use crate::conform::{coll_elements, coll_violation, tag_of, Engine};
use crate::error::SpecResult;
use crate::registry::Registry;
use crate::spec::{spec_ref, RepeatKind, Spec, SpecKind};
use crate::value::Value;

pub const INSUFFICIENT_INPUT: &str = "Insufficient input";
pub const EXTRA_INPUT: &str = "Extra input";
pub const NO_METHOD: &str = "no method";

/// One located validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// Tags traversed inside the spec tree.
    pub path: Vec<String>,
    /// Description of what was required.
    pub pred: String,
    /// The offending sub-value.
    pub val: Value,
    /// Named specs entered on the way here.
    pub via: Vec<String>,
    /// Keys and indices traversed inside the input.
    #[serde(rename = "in")]
    pub in_path: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} - failed: {}", self.val, reason)?,
            None => write!(f, "{} - failed: {}", self.val, self.pred)?,
        }
        if !self.in_path.is_empty() {
            let parts: Vec<String> = self.in_path.iter().map(Value::to_string).collect();
            write!(f, " in: [{}]", parts.join(" "))?;
        }
        if !self.path.is_empty() {
            let parts: Vec<String> = self.path.iter().map(|t| format!(":{}", t)).collect();
            write!(f, " at: [{}]", parts.join(" "))?;
        }
        if let Some(name) = self.via.last() {
            write!(f, " spec: :{}", name)?;
        }
        Ok(())
    }
}

/// All problems found for a value, plus what was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub problems: Vec<Problem>,
    pub spec: String,
    pub value: Value,
}

impl Explanation {
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "spec": self.spec,
            "value": self.value.to_json(),
            "problems": self.problems.iter().map(|p| {
                let mut obj = serde_json::json!({
                    "path": p.path.iter().map(|t| format!(":{}", t)).collect::<Vec<_>>(),
                    "pred": p.pred,
                    "val": p.val.to_json(),
                    "via": p.via.iter().map(|n| format!(":{}", n)).collect::<Vec<_>>(),
                    "in": p.in_path.iter().map(Value::to_json).collect::<Vec<_>>(),
                });
                if let Some(reason) = &p.reason {
                    obj["reason"] = serde_json::Value::String(reason.clone());
                }
                obj
            }).collect::<Vec<_>>(),
        })
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.problems.is_empty() {
            return writeln!(f, "Success!");
        }
        for problem in &self.problems {
            writeln!(f, "{}", problem)?;
        }
        Ok(())
    }
}

/// Where the walk currently is.
#[derive(Debug, Clone, Default)]
struct Location {
    path: Vec<String>,
    via: Vec<String>,
    in_path: Vec<Value>,
}

impl Location {
    fn at(&self, tag: &str) -> Self {
        let mut next = self.clone();
        next.path.push(tag.to_string());
        next
    }

    fn within(&self, key: Value) -> Self {
        let mut next = self.clone();
        next.in_path.push(key);
        next
    }

    fn via(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.via.push(name.to_string());
        next
    }

    fn problem(&self, pred: impl Into<String>, val: &Value) -> Problem {
        Problem {
            path: self.path.clone(),
            pred: pred.into(),
            val: val.clone(),
            via: self.via.clone(),
            in_path: self.in_path.clone(),
            reason: None,
        }
    }

    fn problem_because(&self, reason: &str, pred: impl Into<String>, val: &Value) -> Problem {
        Problem {
            reason: Some(reason.to_string()),
            ..self.problem(pred, val)
        }
    }
}

pub(crate) struct Explainer<'r> {
    engine: Engine<'r>,
}

impl<'r> Explainer<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            engine: Engine::new(registry),
        }
    }

    pub(crate) fn explain(&self, spec: &Spec, value: &Value) -> SpecResult<Explanation> {
        let problems = self.problems(spec, value, &Location::default())?;
        Ok(Explanation {
            problems,
            spec: spec.describe(),
            value: value.clone(),
        })
    }

    fn problems(&self, spec: &Spec, value: &Value, loc: &Location) -> SpecResult<Vec<Problem>> {
        if self.engine.conform(spec, value)?.is_some() {
            return Ok(Vec::new());
        }
        let problems = self.invalid(spec, value, loc)?;
        if problems.is_empty() {
            return Ok(vec![loc.problem(spec.describe(), value)]);
        }
        Ok(problems)
    }

    /// Problems for a value already known not to conform.
    fn invalid(&self, spec: &Spec, value: &Value, loc: &Location) -> SpecResult<Vec<Problem>> {
        match spec.kind() {
            SpecKind::Predicate(p) => Ok(vec![loc.problem(p.name.clone(), value)]),
            SpecKind::And(specs) => {
                let mut current = value.clone();
                for spec in specs {
                    match self.engine.conform(spec, &current)? {
                        Some(next) => current = next,
                        None => return self.problems(spec, &current, loc),
                    }
                }
                Ok(Vec::new())
            }
            SpecKind::Or(branches) => {
                let mut out = Vec::new();
                for (tag, branch) in branches {
                    out.extend(self.problems(branch, value, &loc.at(tag))?);
                }
                Ok(out)
            }
            SpecKind::CollOf(elem, opts) => {
                if let Some(pred) = coll_violation(opts, value) {
                    return Ok(vec![loc.problem(pred, value)]);
                }
                let mut out = Vec::new();
                for (i, item) in coll_elements(value).into_iter().enumerate() {
                    out.extend(self.problems(elem, item, &loc.within(i.into()))?);
                }
                Ok(out)
            }
            SpecKind::MapOf { key, val } => {
                let Value::Map(map) = value else {
                    return Ok(vec![loc.problem("map?", value)]);
                };
                let mut out = Vec::new();
                for (k, v) in map.iter() {
                    let entry = loc.within(k.clone());
                    out.extend(self.problems(key, k, &entry.within(0.into()))?);
                    out.extend(self.problems(val, v, &entry.within(1.into()))?);
                }
                Ok(out)
            }
            SpecKind::Keys(keys) => {
                self.engine.resolve_fields(keys)?;
                let Value::Map(map) = value else {
                    return Ok(vec![loc.problem("map?", value)]);
                };
                let mut out = Vec::new();
                for field in &keys.req {
                    if !map.contains_key(&field.key) {
                        out.push(loc.problem(format!("(contains? % {})", field.key), value));
                    }
                }
                for field in keys.fields() {
                    if let Some(field_value) = map.get(&field.key) {
                        let field_loc = loc.at(&tag_of(&field.key)).within(field.key.clone());
                        out.extend(self.problems(
                            &spec_ref(&field.spec_name),
                            field_value,
                            &field_loc,
                        )?);
                    }
                }
                Ok(out)
            }
            SpecKind::Merge(specs) => {
                if !matches!(value, Value::Map(_)) {
                    return Ok(vec![loc.problem("map?", value)]);
                }
                let mut out = Vec::new();
                for spec in specs {
                    out.extend(self.problems(spec, value, loc)?);
                }
                Ok(out)
            }
            SpecKind::Tuple(specs) => {
                let Some(items) = value.as_seq() else {
                    return Ok(vec![loc.problem("vector?", value)]);
                };
                if items.len() != specs.len() {
                    return Ok(vec![loc.problem(format!("(= (count %) {})", specs.len()), value)]);
                }
                let mut out = Vec::new();
                for (i, (spec, item)) in specs.iter().zip(items).enumerate() {
                    out.extend(self.problems(spec, item, &loc.at(&i.to_string()).within(i.into()))?);
                }
                Ok(out)
            }
            SpecKind::Cat(_) | SpecKind::Alt(_) | SpecKind::Repeat(..) | SpecKind::RegexAnd(..) => {
                let Some(items) = value.as_seq() else {
                    return Ok(vec![loc.problem("sequential?", value)]);
                };
                match self.engine.match_regex(spec, items, 0)? {
                    Some((_, end)) if end < items.len() => {
                        // a repetition stopped early: explain the element it rejected
                        if let SpecKind::Repeat(RepeatKind::ZeroOrMore | RepeatKind::OneOrMore, inner) =
                            spec.kind()
                        {
                            if self.engine.match_regex(inner, items, end)?.is_none() {
                                return self.regex_problems(inner, items, end, loc);
                            }
                        }
                        Ok(vec![loc.within(end.into()).problem_because(
                            EXTRA_INPUT,
                            spec.describe(),
                            &Value::List(items[end..].to_vec()),
                        )])
                    }
                    Some(_) => Ok(Vec::new()),
                    None => self.regex_problems(spec, items, 0, loc),
                }
            }
            SpecKind::Nilable(inner) => {
                let mut out = self.problems(inner, value, &loc.at("pred"))?;
                out.push(loc.at("nil").problem("nil?", value));
                Ok(out)
            }
            SpecKind::Ref(name) => {
                let resolved = self.engine.resolve(name)?;
                self.problems(&resolved, value, &loc.via(name))
            }
            SpecKind::Multi(multi) => {
                let Some(discriminant) = value.get(&multi.key) else {
                    return Ok(vec![loc.problem(format!("(contains? % {})", multi.key), value)]);
                };
                let case_loc = loc.at(&tag_of(discriminant));
                match multi.case(discriminant) {
                    Some(case) => self.problems(case, value, &case_loc),
                    None => Ok(vec![case_loc.problem_because(NO_METHOD, spec.describe(), value)]),
                }
            }
            SpecKind::Conformer(_) => Ok(vec![loc.problem(spec.describe(), value)]),
            SpecKind::Nested(inner) => self.problems(inner, value, loc),
        }
    }

    /// Problems for a regex spec that does not match at `pos`.
    fn regex_problems(
        &self,
        spec: &Spec,
        items: &[Value],
        pos: usize,
        loc: &Location,
    ) -> SpecResult<Vec<Problem>> {
        let problems = self.regex_invalid(spec, items, pos, loc)?;
        if problems.is_empty() {
            return Ok(vec![loc.problem(spec.describe(), &Value::List(items[pos..].to_vec()))]);
        }
        Ok(problems)
    }

    fn regex_invalid(
        &self,
        spec: &Spec,
        items: &[Value],
        pos: usize,
        loc: &Location,
    ) -> SpecResult<Vec<Problem>> {
        let insufficient = || {
            vec![loc.problem_because(INSUFFICIENT_INPUT, spec.describe(), &Value::List(Vec::new()))]
        };
        match spec.kind() {
            SpecKind::Ref(name) => {
                let resolved = self.engine.resolve(name)?;
                self.regex_problems(&resolved, items, pos, &loc.via(name))
            }
            SpecKind::Cat(parts) => {
                let mut at = pos;
                for (tag, part) in parts {
                    match self.engine.match_regex(part, items, at)? {
                        Some((_, next)) => at = next,
                        None => return self.regex_problems(part, items, at, &loc.at(tag)),
                    }
                }
                Ok(Vec::new())
            }
            SpecKind::Alt(branches) => {
                if pos >= items.len() {
                    return Ok(insufficient());
                }
                let mut out = Vec::new();
                for (tag, branch) in branches {
                    out.extend(self.regex_problems(branch, items, pos, &loc.at(tag))?);
                }
                Ok(out)
            }
            SpecKind::Repeat(RepeatKind::OneOrMore, inner) => {
                if pos >= items.len() {
                    return Ok(insufficient());
                }
                self.regex_problems(inner, items, pos, loc)
            }
            SpecKind::Repeat(..) => Ok(Vec::new()),
            SpecKind::RegexAnd(inner, preds) => {
                let Some((mut current, _)) = self.engine.match_regex(inner, items, pos)? else {
                    return self.regex_problems(inner, items, pos, loc);
                };
                for pred in preds {
                    match self.engine.conform(pred, &current)? {
                        Some(next) => current = next,
                        None => return self.problems(pred, &current, loc),
                    }
                }
                Ok(Vec::new())
            }
            _ => match items.get(pos) {
                Some(item) => self.problems(spec, item, &loc.within(pos.into())),
                None => Ok(insufficient()),
            },
        }
    }
}
