//! Conformance engine.
//!
//! `conform` dispatches on the spec variant and either returns the conformed
//! (destructured) value or `None`. Sequence regex ops are matched greedily,
//! left to right, without backtracking.

use std::cell::Cell;

use crate::error::{SpecError, SpecResult};
use crate::registry::Registry;
use crate::spec::{CollOpts, KeyField, Keys, RepeatKind, Spec, SpecKind};
use crate::value::{Map, Value};

/// Upper bound on chained name-to-name references before giving up.
const MAX_REF_HOPS: usize = 64;

/// Upper bound on named references entered while checking one value.
///
/// Left recursion (`a = (nilable :a)`) and very deep data both stop here.
const MAX_REF_DEPTH: usize = 128;

/// Outcome of conforming a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conformance {
    Conformed(Value),
    Invalid,
}

impl Conformance {
    pub fn is_conformed(&self) -> bool {
        matches!(self, Conformance::Conformed(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Conformance::Invalid)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Conformance::Conformed(v) => Some(v),
            Conformance::Invalid => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Conformance::Conformed(v) => Some(v),
            Conformance::Invalid => None,
        }
    }
}

impl From<Option<Value>> for Conformance {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(v) => Conformance::Conformed(v),
            None => Conformance::Invalid,
        }
    }
}

/// First violated collection constraint, as a predicate description.
pub(crate) fn coll_violation(opts: &CollOpts, value: &Value) -> Option<String> {
    if !matches!(value, Value::Vector(_) | Value::List(_) | Value::Set(_)) {
        return Some("coll?".to_string());
    }
    if let Some(kind) = opts.kind {
        if !kind.accepts(value.kind()) {
            return Some(kind.predicate_name().to_string());
        }
    }
    let count = value.count().unwrap_or(0);
    if let Some(expected) = opts.count {
        if count != expected {
            return Some(format!("(= {} (count %))", expected));
        }
    }
    if let Some(min) = opts.min_count {
        if count < min {
            return Some(format!("(<= {} (count %))", min));
        }
    }
    if let Some(max) = opts.max_count {
        if count > max {
            return Some(format!("(<= (count %) {})", max));
        }
    }
    if opts.distinct {
        if let Some(items) = value.as_seq() {
            let mut seen = std::collections::HashSet::new();
            if !items.iter().all(|item| seen.insert(item)) {
                return Some("distinct?".to_string());
            }
        }
    }
    None
}

/// Elements of a collection in iteration order.
pub(crate) fn coll_elements(value: &Value) -> Vec<&Value> {
    match value {
        Value::Vector(items) | Value::List(items) => items.iter().collect(),
        Value::Set(set) => set.iter().collect(),
        _ => Vec::new(),
    }
}

/// Map key rendered as a path tag.
pub(crate) fn tag_of(value: &Value) -> String {
    match value {
        Value::Keyword(k) => k.clone(),
        other => other.to_string(),
    }
}

/// Split a `[:tag value]` pair.
fn untag(value: &Value) -> Option<(&str, &Value)> {
    match value.as_seq()? {
        [Value::Keyword(tag), inner] => Some((tag, inner)),
        _ => None,
    }
}

pub(crate) struct Engine<'r> {
    registry: &'r Registry,
    depth: Cell<usize>,
}

impl<'r> Engine<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            depth: Cell::new(0),
        }
    }

    pub(crate) fn resolve(&self, name: &str) -> SpecResult<Spec> {
        self.registry.resolve(name)
    }

    /// Follow named references until a concrete spec is reached.
    pub(crate) fn deref(&self, spec: &Spec) -> SpecResult<Spec> {
        let mut current = spec.clone();
        let mut hops = 0;
        while let Some(name) = current.ref_name() {
            if hops == MAX_REF_HOPS {
                return Err(SpecError::CircularReference(name.to_string()));
            }
            current = self.resolve(name)?;
            hops += 1;
        }
        Ok(current)
    }

    /// Run `f` on the spec a named reference resolves to, one level deeper.
    fn enter_ref<T>(&self, spec: &Spec, f: impl FnOnce(&Spec) -> SpecResult<T>) -> SpecResult<T> {
        let depth = self.depth.get();
        if depth == MAX_REF_DEPTH {
            return Err(SpecError::RecursionLimit {
                name: spec.ref_name().unwrap_or_default().to_string(),
                limit: MAX_REF_DEPTH,
            });
        }
        self.depth.set(depth + 1);
        let result = self.deref(spec).and_then(|resolved| f(&resolved));
        self.depth.set(depth);
        result
    }

    pub(crate) fn conform(&self, spec: &Spec, value: &Value) -> SpecResult<Option<Value>> {
        match spec.kind() {
            SpecKind::Predicate(p) => Ok(p.test(value).then(|| value.clone())),
            SpecKind::And(specs) => {
                let mut current = value.clone();
                for spec in specs {
                    match self.conform(spec, &current)? {
                        Some(next) => current = next,
                        None => return Ok(None),
                    }
                }
                Ok(Some(current))
            }
            SpecKind::Or(branches) => {
                for (tag, spec) in branches {
                    if let Some(conformed) = self.conform(spec, value)? {
                        return Ok(Some(Value::tagged(tag, conformed)));
                    }
                }
                Ok(None)
            }
            SpecKind::CollOf(elem, opts) => self.conform_coll(elem, opts, value),
            SpecKind::MapOf { key, val } => {
                let Value::Map(map) = value else {
                    return Ok(None);
                };
                let mut out = Map::new();
                for (k, v) in map.iter() {
                    let (Some(k), Some(v)) = (self.conform(key, k)?, self.conform(val, v)?) else {
                        return Ok(None);
                    };
                    out.insert(k, v);
                }
                Ok(Some(Value::Map(out)))
            }
            SpecKind::Keys(keys) => self.conform_keys(keys, value),
            SpecKind::Merge(specs) => {
                let Value::Map(original) = value else {
                    return Ok(None);
                };
                let mut merged = original.clone();
                for spec in specs {
                    match self.conform(spec, value)? {
                        Some(Value::Map(conformed)) => {
                            for (k, v) in conformed {
                                merged.insert(k, v);
                            }
                        }
                        Some(_) => {}
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::Map(merged)))
            }
            SpecKind::Tuple(specs) => {
                let Some(items) = value.as_seq() else {
                    return Ok(None);
                };
                if items.len() != specs.len() {
                    return Ok(None);
                }
                let mut out = Vec::with_capacity(items.len());
                for (spec, item) in specs.iter().zip(items) {
                    match self.conform(spec, item)? {
                        Some(conformed) => out.push(conformed),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::Vector(out)))
            }
            SpecKind::Cat(_) | SpecKind::Alt(_) | SpecKind::Repeat(..) | SpecKind::RegexAnd(..) => {
                let Some(items) = value.as_seq() else {
                    return Ok(None);
                };
                match self.match_regex(spec, items, 0)? {
                    Some((conformed, end)) if end == items.len() => Ok(Some(conformed)),
                    _ => Ok(None),
                }
            }
            SpecKind::Nilable(inner) => {
                if value.is_nil() {
                    Ok(Some(Value::Nil))
                } else {
                    self.conform(inner, value)
                }
            }
            SpecKind::Ref(_) => self.enter_ref(spec, |resolved| self.conform(resolved, value)),
            SpecKind::Multi(multi) => match value.get(&multi.key).and_then(|d| multi.case(d)) {
                Some(case) => self.conform(case, value),
                None => Ok(None),
            },
            SpecKind::Conformer(c) => Ok(c.conform(value)),
            SpecKind::Nested(inner) => self.conform(inner, value),
        }
    }

    fn conform_coll(&self, elem: &Spec, opts: &CollOpts, value: &Value) -> SpecResult<Option<Value>> {
        if coll_violation(opts, value).is_some() {
            return Ok(None);
        }
        let mut out = Vec::new();
        for item in coll_elements(value) {
            match self.conform(elem, item)? {
                Some(conformed) => out.push(conformed),
                None => return Ok(None),
            }
        }
        Ok(Some(match value {
            Value::List(_) => Value::List(out),
            Value::Set(_) => Value::set(out),
            _ => Value::Vector(out),
        }))
    }

    /// Resolve every declared field spec, present in the data or not.
    pub(crate) fn resolve_fields<'k>(
        &self,
        keys: &'k Keys,
    ) -> SpecResult<Vec<(&'k KeyField, Spec)>> {
        keys.fields()
            .map(|field| Ok((field, self.resolve(&field.spec_name)?)))
            .collect()
    }

    fn conform_keys(&self, keys: &Keys, value: &Value) -> SpecResult<Option<Value>> {
        let fields = self.resolve_fields(keys)?;
        let Value::Map(map) = value else {
            return Ok(None);
        };
        if keys.req.iter().any(|field| !map.contains_key(&field.key)) {
            return Ok(None);
        }
        let mut out = map.clone();
        for (field, field_spec) in fields {
            let Some(field_value) = map.get(&field.key) else {
                continue;
            };
            match self.conform(&field_spec, field_value)? {
                Some(conformed) => {
                    out.insert(field.key.clone(), conformed);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(Value::Map(out)))
    }

    /// Match `spec` against `items` starting at `pos`.
    ///
    /// Returns the conformed value and the position just past the match.
    /// Non-regex specs consume exactly one element; references to regex
    /// specs splice into the enclosing sequence.
    pub(crate) fn match_regex(
        &self,
        spec: &Spec,
        items: &[Value],
        pos: usize,
    ) -> SpecResult<Option<(Value, usize)>> {
        if spec.ref_name().is_some() {
            return self.enter_ref(spec, |resolved| self.match_regex(resolved, items, pos));
        }
        let spec = spec.clone();
        match spec.kind() {
            SpecKind::Cat(parts) => {
                let mut out = Map::new();
                let mut at = pos;
                for (tag, part) in parts {
                    match self.match_regex(part, items, at)? {
                        Some((conformed, next)) => {
                            out.insert(Value::keyword(tag), conformed);
                            at = next;
                        }
                        None => return Ok(None),
                    }
                }
                Ok(Some((Value::Map(out), at)))
            }
            SpecKind::Alt(branches) => {
                for (tag, branch) in branches {
                    if let Some((conformed, next)) = self.match_regex(branch, items, pos)? {
                        return Ok(Some((Value::tagged(tag, conformed), next)));
                    }
                }
                Ok(None)
            }
            SpecKind::Repeat(kind, inner) => {
                let mut out = Vec::new();
                let mut at = pos;
                while at < items.len() {
                    if *kind == RepeatKind::ZeroOrOne && !out.is_empty() {
                        break;
                    }
                    match self.match_regex(inner, items, at)? {
                        // zero-width matches would loop forever
                        Some((conformed, next)) if next > at => {
                            out.push(conformed);
                            at = next;
                        }
                        _ => break,
                    }
                }
                if *kind == RepeatKind::OneOrMore && out.is_empty() {
                    return Ok(None);
                }
                Ok(Some((Value::Vector(out), at)))
            }
            SpecKind::RegexAnd(inner, preds) => {
                let Some((mut current, next)) = self.match_regex(inner, items, pos)? else {
                    return Ok(None);
                };
                for pred in preds {
                    match self.conform(pred, &current)? {
                        Some(conformed) => current = conformed,
                        None => return Ok(None),
                    }
                }
                Ok(Some((current, next)))
            }
            _ => match items.get(pos) {
                Some(item) => Ok(self.conform(&spec, item)?.map(|c| (c, pos + 1))),
                None => Ok(None),
            },
        }
    }

    pub(crate) fn unform(&self, spec: &Spec, value: &Value) -> SpecResult<Value> {
        match spec.kind() {
            SpecKind::Predicate(_) => Ok(value.clone()),
            SpecKind::And(specs) => {
                let mut current = value.clone();
                for spec in specs.iter().rev() {
                    current = self.unform(spec, &current)?;
                }
                Ok(current)
            }
            SpecKind::Or(branches) => {
                let (tag, inner) = untag(value).ok_or_else(|| unformable(spec, value))?;
                let branch = find_tagged(branches, tag).ok_or_else(|| unformable(spec, value))?;
                self.unform(branch, inner)
            }
            SpecKind::CollOf(elem, _) => {
                let out = coll_elements(value)
                    .into_iter()
                    .map(|item| self.unform(elem, item))
                    .collect::<SpecResult<Vec<_>>>()?;
                match value {
                    Value::Vector(_) => Ok(Value::Vector(out)),
                    Value::List(_) => Ok(Value::List(out)),
                    Value::Set(_) => Ok(Value::set(out)),
                    _ => Err(unformable(spec, value)),
                }
            }
            SpecKind::MapOf { key, val } => {
                let map = value.as_map().ok_or_else(|| unformable(spec, value))?;
                let mut out = Map::new();
                for (k, v) in map.iter() {
                    out.insert(self.unform(key, k)?, self.unform(val, v)?);
                }
                Ok(Value::Map(out))
            }
            SpecKind::Keys(keys) => {
                let map = value.as_map().ok_or_else(|| unformable(spec, value))?;
                let mut out = map.clone();
                for field in keys.fields() {
                    if let Some(field_value) = map.get(&field.key) {
                        let field_spec = self.resolve(&field.spec_name)?;
                        out.insert(field.key.clone(), self.unform(&field_spec, field_value)?);
                    }
                }
                Ok(Value::Map(out))
            }
            SpecKind::Merge(specs) => {
                let mut current = value.clone();
                for spec in specs.iter().rev() {
                    current = self.unform(spec, &current)?;
                }
                Ok(current)
            }
            SpecKind::Tuple(specs) => {
                let items = value.as_seq().ok_or_else(|| unformable(spec, value))?;
                if items.len() != specs.len() {
                    return Err(unformable(spec, value));
                }
                let out = specs
                    .iter()
                    .zip(items)
                    .map(|(spec, item)| self.unform(spec, item))
                    .collect::<SpecResult<Vec<_>>>()?;
                Ok(Value::Vector(out))
            }
            SpecKind::Cat(_) | SpecKind::Alt(_) | SpecKind::Repeat(..) | SpecKind::RegexAnd(..) => {
                Ok(Value::Vector(self.unform_regex(spec, value)?))
            }
            SpecKind::Nilable(inner) => {
                if value.is_nil() {
                    Ok(Value::Nil)
                } else {
                    self.unform(inner, value)
                }
            }
            SpecKind::Ref(_) => self.enter_ref(spec, |resolved| self.unform(resolved, value)),
            SpecKind::Multi(multi) => {
                let case = value
                    .get(&multi.key)
                    .and_then(|d| multi.case(d))
                    .ok_or_else(|| unformable(spec, value))?;
                self.unform(case, value)
            }
            SpecKind::Conformer(c) => c
                .unform(value)
                .ok_or_else(|| SpecError::NoUnformer(c.name.clone())),
            SpecKind::Nested(inner) => self.unform(inner, value),
        }
    }

    /// Elements a regex match produced, re-spliced from its conformed form.
    fn unform_regex(&self, spec: &Spec, value: &Value) -> SpecResult<Vec<Value>> {
        if spec.ref_name().is_some() {
            return self.enter_ref(spec, |resolved| self.unform_regex(resolved, value));
        }
        let spec = spec.clone();
        match spec.kind() {
            SpecKind::Cat(parts) => {
                let map = value.as_map().ok_or_else(|| unformable(&spec, value))?;
                let mut out = Vec::new();
                for (tag, part) in parts {
                    if let Some(part_value) = map.get(&Value::keyword(tag)) {
                        out.extend(self.unform_regex(part, part_value)?);
                    }
                }
                Ok(out)
            }
            SpecKind::Alt(branches) => {
                let (tag, inner) = untag(value).ok_or_else(|| unformable(&spec, value))?;
                let branch = find_tagged(branches, tag).ok_or_else(|| unformable(&spec, value))?;
                self.unform_regex(branch, inner)
            }
            SpecKind::Repeat(_, inner) => {
                let items = value.as_seq().ok_or_else(|| unformable(&spec, value))?;
                let mut out = Vec::new();
                for item in items {
                    out.extend(self.unform_regex(inner, item)?);
                }
                Ok(out)
            }
            SpecKind::RegexAnd(inner, preds) => {
                let mut current = value.clone();
                for pred in preds.iter().rev() {
                    current = self.unform(pred, &current)?;
                }
                self.unform_regex(inner, &current)
            }
            _ => Ok(vec![self.unform(&spec, value)?]),
        }
    }
}

fn find_tagged<'a>(tagged: &'a [(String, Spec)], tag: &str) -> Option<&'a Spec> {
    tagged.iter().find(|(t, _)| t == tag).map(|(_, spec)| spec)
}

fn unformable(spec: &Spec, value: &Value) -> SpecError {
    SpecError::Unformable {
        spec: spec.describe(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preds;
    use crate::spec::{
        alt, and_of, cat, collection_of, conformer, keys, map_of, nilable, opt, or_of, predicate,
        repeat0, repeat1, spec_ref, tuple, CollKind, Keys,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn kw(name: &str) -> Value {
        Value::keyword(name)
    }

    fn ints(items: &[i64]) -> Value {
        Value::vector(items.iter().map(|i| Value::Int(*i)))
    }

    #[test]
    fn test_and_short_circuits() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let spec = and_of([
            preds::int(),
            preds::even(),
            predicate("counted?", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        ]);

        assert!(registry.conform(&spec, &Value::Int(3)).unwrap().is_invalid());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(
            registry.conform(&spec, &Value::Int(4)).unwrap(),
            Conformance::Conformed(Value::Int(4))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_and_threads_conformed_value() {
        let registry = Registry::new();
        let spec = and_of([
            or_of([("i", preds::int()), ("s", preds::string())]).unwrap(),
            predicate("tagged-int?", |v| v.as_seq().is_some_and(|s| s[0] == kw("i"))),
        ]);
        assert_eq!(
            registry.conform(&spec, &Value::Int(5)).unwrap().into_value(),
            Some(Value::tagged("i", Value::Int(5)))
        );
        assert!(!registry.valid(&spec, &Value::from("x")).unwrap());
    }

    #[test]
    fn test_or_first_branch_wins() {
        let registry = Registry::new();
        let spec = or_of([("num", preds::number()), ("int", preds::int())]).unwrap();
        assert_eq!(
            registry.conform(&spec, &Value::Int(1)).unwrap().into_value(),
            Some(Value::tagged("num", Value::Int(1)))
        );
        assert!(registry.conform(&spec, &Value::Nil).unwrap().is_invalid());
    }

    #[test]
    fn test_coll_of_min_count_on_set() {
        let registry = Registry::new();
        let spec = collection_of(preds::keyword(), CollOpts::new().min_count(2)).unwrap();
        assert!(registry
            .valid(&spec, &Value::set([kw("a"), kw("b"), kw("c")]))
            .unwrap());
        assert!(!registry.valid(&spec, &Value::set([kw("a")])).unwrap());
        assert!(!registry.valid(&spec, &Value::Int(1)).unwrap());
    }

    #[test]
    fn test_coll_of_kind_and_distinct() {
        let registry = Registry::new();
        let spec = collection_of(
            preds::int(),
            CollOpts::new().kind(CollKind::Vector).distinct().max_count(3),
        )
        .unwrap();
        assert!(registry.valid(&spec, &ints(&[1, 2, 3])).unwrap());
        assert!(!registry.valid(&spec, &ints(&[1, 1])).unwrap());
        assert!(!registry.valid(&spec, &ints(&[1, 2, 3, 4])).unwrap());
        assert!(!registry
            .valid(&spec, &Value::list([1.into(), 2.into()]))
            .unwrap());
    }

    #[test]
    fn test_coll_of_rebuilds_conformed_elements() {
        let registry = Registry::new();
        let spec = collection_of(
            or_of([("i", preds::int()), ("s", preds::string())]).unwrap(),
            CollOpts::new(),
        )
        .unwrap();
        let conformed = registry
            .conform(&spec, &Value::list([1.into(), "a".into()]))
            .unwrap();
        assert_eq!(
            conformed.into_value(),
            Some(Value::list([
                Value::tagged("i", 1.into()),
                Value::tagged("s", "a".into())
            ]))
        );
    }

    #[test]
    fn test_map_of() {
        let registry = Registry::new();
        let spec = map_of(preds::keyword(), preds::int());
        let good = Value::map([(kw("a"), 1.into()), (kw("b"), 2.into())]);
        let bad = Value::map([(kw("a"), "x".into())]);
        assert!(registry.valid(&spec, &good).unwrap());
        assert!(!registry.valid(&spec, &bad).unwrap());
        assert!(!registry.valid(&spec, &ints(&[1])).unwrap());
    }

    #[test]
    fn test_keys_substitutes_conformed_fields() {
        let registry = Registry::new();
        registry.register(
            "acct/id",
            or_of([("num", preds::int()), ("name", preds::string())]).unwrap(),
        );
        registry.register("acct/note", preds::string());
        let spec = keys(Keys::new().req_un("acct/id").opt_un("acct/note"));

        let value = Value::map([(kw("id"), 7.into()), (kw("extra"), true.into())]);
        let conformed = registry.conform(&spec, &value).unwrap().into_value().unwrap();
        assert_eq!(conformed.get(&kw("id")), Some(&Value::tagged("num", 7.into())));
        assert_eq!(conformed.get(&kw("extra")), Some(&Value::Bool(true)));

        let missing = Value::map([(kw("note"), "hi".into())]);
        assert!(!registry.valid(&spec, &missing).unwrap());
    }

    #[test]
    fn test_keys_unregistered_field_is_usage_error() {
        let registry = Registry::new();
        let spec = keys(Keys::new().req("ghost/field"));
        let value = Value::map([(kw("ghost/field"), 1.into())]);
        let err = registry.conform(&spec, &value).unwrap_err();
        assert!(matches!(err, SpecError::UnregisteredSpec(ref n) if n == "ghost/field"));
    }

    #[test]
    fn test_keys_resolves_fields_before_checking_data() {
        let registry = Registry::new();
        let spec = keys(Keys::new().req_un("a/x"));
        for value in [
            Value::Map(Map::new()),
            Value::map([(kw("x"), 1.into())]),
            Value::Int(1),
        ] {
            let err = registry.conform(&spec, &value).unwrap_err();
            assert!(matches!(err, SpecError::UnregisteredSpec(ref n) if n == "a/x"));
        }
        registry.register("a/x", preds::int());
        assert!(!registry.valid(&spec, &Value::Map(Map::new())).unwrap());
    }

    #[test]
    fn test_tuple() {
        let registry = Registry::new();
        let spec = tuple([preds::double_in(-90.0, 90.0), preds::double_in(-180.0, 180.0)]).unwrap();
        let point = Value::vector([Value::Float(45.0), Value::Float(-120.5)]);
        assert_eq!(registry.conform(&spec, &point).unwrap().into_value(), Some(point));
        assert!(!registry.valid(&spec, &Value::vector([Value::Float(1.0)])).unwrap());
    }

    #[test]
    fn test_cat_of_repeats() {
        let registry = Registry::new();
        let spec = cat([("odds", repeat1(preds::odd())), ("even", opt(preds::even()))]).unwrap();

        let conformed = registry.conform(&spec, &ints(&[1, 3, 5, 100])).unwrap();
        assert_eq!(
            conformed.into_value(),
            Some(Value::map([
                (kw("odds"), ints(&[1, 3, 5])),
                (kw("even"), ints(&[100])),
            ]))
        );

        let conformed = registry.conform(&spec, &ints(&[1, 3, 5])).unwrap();
        assert_eq!(
            conformed.into_value(),
            Some(Value::map([(kw("odds"), ints(&[1, 3, 5])), (kw("even"), ints(&[]))]))
        );

        assert!(registry.conform(&spec, &ints(&[100])).unwrap().is_invalid());
        assert!(registry.conform(&spec, &ints(&[1, 2, 3])).unwrap().is_invalid());
        assert!(registry.conform(&spec, &Value::Int(1)).unwrap().is_invalid());
    }

    #[test]
    fn test_cat_greedy_without_backtracking() {
        let registry = Registry::new();
        let spec = cat([("xs", repeat0(preds::int())), ("last", preds::int())]).unwrap();
        assert!(!registry.valid(&spec, &ints(&[1, 2, 3])).unwrap());
    }

    #[test]
    fn test_alt_inside_repeat() {
        let registry = Registry::new();
        let spec = repeat0(
            cat([
                ("prop", preds::string()),
                ("val", alt([("s", preds::string()), ("b", preds::boolean())]).unwrap()),
            ])
            .unwrap(),
        );
        let value = Value::vector(["-server".into(), "foo".into(), "-verbose".into(), true.into()]);
        let conformed = registry.conform(&spec, &value).unwrap().into_value().unwrap();
        assert_eq!(
            conformed,
            Value::vector([
                Value::map([
                    (kw("prop"), "-server".into()),
                    (kw("val"), Value::tagged("s", "foo".into())),
                ]),
                Value::map([
                    (kw("prop"), "-verbose".into()),
                    (kw("val"), Value::tagged("b", true.into())),
                ]),
            ])
        );
    }

    #[test]
    fn test_named_regex_splices() {
        let registry = Registry::new();
        registry.register("pair", cat([("k", preds::keyword()), ("v", preds::int())]).unwrap());
        let spec = repeat1(spec_ref("pair"));
        let value = Value::vector([kw("a"), 1.into(), kw("b"), 2.into()]);
        assert!(registry.valid(&spec, &value).unwrap());
    }

    #[test]
    fn test_nilable() {
        let registry = Registry::new();
        let spec = nilable(preds::string());
        assert_eq!(
            registry.conform(&spec, &Value::Nil).unwrap(),
            Conformance::Conformed(Value::Nil)
        );
        assert!(registry.valid(&spec, &"x".into()).unwrap());
        assert!(!registry.valid(&spec, &1.into()).unwrap());
    }

    #[test]
    fn test_conformer_and_unform() {
        let registry = Registry::new();
        let spec = conformer("->int", |v| v.as_str().and_then(|s| s.parse::<i64>().ok()).map(Value::Int));
        assert_eq!(
            registry.conform(&spec, &"42".into()).unwrap().into_value(),
            Some(Value::Int(42))
        );
        assert!(matches!(
            registry.unform(&spec, &Value::Int(42)),
            Err(SpecError::NoUnformer(_))
        ));
    }

    #[test]
    fn test_unform_round_trip_regex() {
        let registry = Registry::new();
        let spec = cat([("odds", repeat1(preds::odd())), ("even", opt(preds::even()))]).unwrap();
        let value = ints(&[1, 3, 100]);
        let conformed = registry.conform(&spec, &value).unwrap().into_value().unwrap();
        assert_eq!(registry.unform(&spec, &conformed).unwrap(), value);
    }

    #[test]
    fn test_circular_reference_detected() {
        let registry = Registry::new();
        registry.register("a", spec_ref("b"));
        registry.register("b", spec_ref("a"));
        let err = registry.valid("a", &Value::Nil).unwrap_err();
        assert!(matches!(err, SpecError::CircularReference(_)));
    }

    #[test]
    fn test_left_recursion_stops_at_depth_limit() {
        let registry = Registry::new();
        registry.register("loop/nilable", nilable(spec_ref("loop/nilable")));
        registry.register("loop/and", and_of([spec_ref("loop/and"), preds::int()]));
        registry.register(
            "loop/expr",
            alt([
                ("sum", cat([("lhs", spec_ref("loop/expr")), ("rhs", preds::int())]).unwrap()),
                ("num", preds::int()),
            ])
            .unwrap(),
        );
        for name in ["loop/nilable", "loop/and", "loop/expr"] {
            let err = registry.valid(&spec_ref(name), &ints(&[1])).unwrap_err();
            assert!(
                matches!(err, SpecError::RecursionLimit { limit: MAX_REF_DEPTH, .. }),
                "{name}: {err}"
            );
        }
        let err = registry.unform(&spec_ref("loop/nilable"), &Value::Int(1)).unwrap_err();
        assert!(matches!(err, SpecError::RecursionLimit { .. }));
        assert!(registry.valid(&spec_ref("loop/nilable"), &Value::Nil).unwrap());
    }

    #[test]
    fn test_recursive_spec_within_depth_limit() {
        let registry = Registry::new();
        registry.register(
            "tree/node",
            or_of([
                ("leaf", preds::int()),
                (
                    "branch",
                    collection_of(spec_ref("tree/node"), CollOpts::new()).unwrap(),
                ),
            ])
            .unwrap(),
        );
        let mut value = Value::Int(0);
        for _ in 0..MAX_REF_DEPTH / 2 {
            value = Value::vector([value, Value::Int(1)]);
        }
        assert!(registry.valid(&spec_ref("tree/node"), &value).unwrap());
    }
}
