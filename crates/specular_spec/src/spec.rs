//! Spec trees and their constructors.
//!
//! A [`Spec`] is an immutable, cheaply cloneable node. Composite variants hold
//! child specs directly; [`SpecKind::Ref`] refers to a registry name and is
//! resolved lazily, which is how recursive and forward-declared specs work.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::value::{Value, ValueKind};

/// Leaf predicate function.
pub type PredFn = dyn Fn(&Value) -> bool + Send + Sync;
/// Custom conform function; `None` means the value is invalid.
pub type ConformFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;
/// Inverse of a [`ConformFn`].
pub type UnformFn = dyn Fn(&Value) -> Value + Send + Sync;

/// Strip leading colons so `":person/name"` and `"person/name"` name the
/// same spec.
pub fn normalize_name(name: &str) -> String {
    name.trim_start_matches(':').to_string()
}

/// A composable specification.
#[derive(Clone)]
pub struct Spec(Arc<SpecKind>);

/// The variants a spec node can take.
pub enum SpecKind {
    Predicate(Predicate),
    And(Vec<Spec>),
    Or(Vec<(String, Spec)>),
    CollOf(Spec, CollOpts),
    MapOf { key: Spec, val: Spec },
    Keys(Keys),
    Merge(Vec<Spec>),
    Tuple(Vec<Spec>),
    Cat(Vec<(String, Spec)>),
    Alt(Vec<(String, Spec)>),
    Repeat(RepeatKind, Spec),
    RegexAnd(Spec, Vec<Spec>),
    Nilable(Spec),
    Ref(String),
    Multi(MultiSpec),
    Conformer(Conformer),
    Nested(Spec),
}

impl Spec {
    pub fn new(kind: SpecKind) -> Self {
        Spec(Arc::new(kind))
    }

    pub fn kind(&self) -> &SpecKind {
        &self.0
    }

    /// Whether this node is a sequence regex operator.
    ///
    /// References are not inspected; the engine resolves them first.
    pub fn is_regex(&self) -> bool {
        matches!(
            self.kind(),
            SpecKind::Cat(_) | SpecKind::Alt(_) | SpecKind::Repeat(..) | SpecKind::RegexAnd(..)
        )
    }

    /// Registry name if this spec is a named reference.
    pub fn ref_name(&self) -> Option<&str> {
        match self.kind() {
            SpecKind::Ref(name) => Some(name),
            _ => None,
        }
    }

    /// Describing form, e.g. `(cat :odds (+ odd?) :even (? even?))`.
    pub fn describe(&self) -> String {
        match self.kind() {
            SpecKind::Predicate(p) => p.name.clone(),
            SpecKind::And(specs) => form("and", specs.iter().map(Spec::describe)),
            SpecKind::Or(tagged) => form("or", tagged_forms(tagged)),
            SpecKind::CollOf(elem, opts) => {
                let mut parts = vec![elem.describe()];
                parts.extend(opts.describe_parts());
                form("coll-of", parts)
            }
            SpecKind::MapOf { key, val } => form("map-of", [key.describe(), val.describe()]),
            SpecKind::Keys(keys) => keys.describe(),
            SpecKind::Merge(specs) => form("merge", specs.iter().map(Spec::describe)),
            SpecKind::Tuple(specs) => form("tuple", specs.iter().map(Spec::describe)),
            SpecKind::Cat(tagged) => form("cat", tagged_forms(tagged)),
            SpecKind::Alt(tagged) => form("alt", tagged_forms(tagged)),
            SpecKind::Repeat(kind, spec) => form(kind.symbol(), [spec.describe()]),
            SpecKind::RegexAnd(spec, preds) => form(
                "&",
                std::iter::once(spec.describe()).chain(preds.iter().map(Spec::describe)),
            ),
            SpecKind::Nilable(spec) => form("nilable", [spec.describe()]),
            SpecKind::Ref(name) => format!(":{}", name),
            SpecKind::Multi(multi) => form("multi-spec", [multi.key.to_string()]),
            SpecKind::Conformer(c) => form("conformer", [c.name.clone()]),
            SpecKind::Nested(spec) => form("spec", [spec.describe()]),
        }
    }
}

fn form(head: &str, parts: impl IntoIterator<Item = String>) -> String {
    let mut out = format!("({}", head);
    for part in parts {
        out.push(' ');
        out.push_str(&part);
    }
    out.push(')');
    out
}

fn tagged_forms(tagged: &[(String, Spec)]) -> impl Iterator<Item = String> + '_ {
    tagged
        .iter()
        .map(|(tag, spec)| format!(":{} {}", tag, spec.describe()))
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spec({})", self.describe())
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl From<&str> for Spec {
    fn from(name: &str) -> Self {
        spec_ref(name)
    }
}

impl From<String> for Spec {
    fn from(name: String) -> Self {
        spec_ref(&name)
    }
}

impl From<&Spec> for Spec {
    fn from(spec: &Spec) -> Self {
        spec.clone()
    }
}

/// A named single-argument test.
#[derive(Clone)]
pub struct Predicate {
    pub name: String,
    test: Arc<PredFn>,
}

impl Predicate {
    pub fn test(&self, value: &Value) -> bool {
        (self.test)(value)
    }
}

/// Custom conform/unform pair.
#[derive(Clone)]
pub struct Conformer {
    pub name: String,
    conform: Arc<ConformFn>,
    unform: Option<Arc<UnformFn>>,
}

impl Conformer {
    pub fn conform(&self, value: &Value) -> Option<Value> {
        (self.conform)(value)
    }

    pub fn unform(&self, value: &Value) -> Option<Value> {
        self.unform.as_ref().map(|u| u(value))
    }
}

/// Repetition operators over a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    /// `?`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl RepeatKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            RepeatKind::ZeroOrOne => "?",
            RepeatKind::ZeroOrMore => "*",
            RepeatKind::OneOrMore => "+",
        }
    }
}

/// Required container kind for `coll_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollKind {
    Vector,
    List,
    Set,
    Sequential,
}

impl CollKind {
    pub fn accepts(&self, kind: ValueKind) -> bool {
        match self {
            CollKind::Vector => kind == ValueKind::Vector,
            CollKind::List => kind == ValueKind::List,
            CollKind::Set => kind == ValueKind::Set,
            CollKind::Sequential => matches!(kind, ValueKind::Vector | ValueKind::List),
        }
    }

    pub fn predicate_name(&self) -> &'static str {
        match self {
            CollKind::Vector => "vector?",
            CollKind::List => "list?",
            CollKind::Set => "set?",
            CollKind::Sequential => "sequential?",
        }
    }
}

/// Constraints checked on a collection before its elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollOpts {
    pub kind: Option<CollKind>,
    pub count: Option<usize>,
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub distinct: bool,
}

impl CollOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: CollKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn min_count(mut self, min: usize) -> Self {
        self.min_count = Some(min);
        self
    }

    pub fn max_count(mut self, max: usize) -> Self {
        self.max_count = Some(max);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    fn validate(&self) -> SpecResult<()> {
        if self.count.is_some() && (self.min_count.is_some() || self.max_count.is_some()) {
            return Err(SpecError::InvalidOptions {
                kind: "coll-of",
                message: "count cannot be combined with min-count or max-count".to_string(),
            });
        }
        if let (Some(min), Some(max)) = (self.min_count, self.max_count) {
            if min > max {
                return Err(SpecError::InvalidOptions {
                    kind: "coll-of",
                    message: format!("min-count {} exceeds max-count {}", min, max),
                });
            }
        }
        Ok(())
    }

    fn describe_parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(kind) = self.kind {
            parts.push(format!(":kind {}", kind.predicate_name()));
        }
        if let Some(count) = self.count {
            parts.push(format!(":count {}", count));
        }
        if let Some(min) = self.min_count {
            parts.push(format!(":min-count {}", min));
        }
        if let Some(max) = self.max_count {
            parts.push(format!(":max-count {}", max));
        }
        if self.distinct {
            parts.push(":distinct true".to_string());
        }
        parts
    }
}

/// A map field declared by a `keys` spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyField {
    /// Registry name of the field's spec.
    pub spec_name: String,
    /// Key looked up in the validated map.
    pub key: Value,
    pub qualified: bool,
}

impl KeyField {
    /// Qualified field: the map key is the full spec name.
    pub fn qualified(spec_name: &str) -> Self {
        let spec_name = normalize_name(spec_name);
        Self {
            key: Value::Keyword(spec_name.clone()),
            spec_name,
            qualified: true,
        }
    }

    /// Unqualified field: the map key drops the namespace.
    pub fn unqualified(spec_name: &str) -> Self {
        let spec_name = normalize_name(spec_name);
        let local = spec_name.rsplit('/').next().unwrap_or(&spec_name).to_string();
        Self {
            key: Value::Keyword(local),
            spec_name,
            qualified: false,
        }
    }
}

/// Required and optional fields of a map.
#[derive(Debug, Clone, Default)]
pub struct Keys {
    pub req: Vec<KeyField>,
    pub opt: Vec<KeyField>,
}

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn req(mut self, spec_name: &str) -> Self {
        self.req.push(KeyField::qualified(spec_name));
        self
    }

    pub fn req_un(mut self, spec_name: &str) -> Self {
        self.req.push(KeyField::unqualified(spec_name));
        self
    }

    pub fn opt(mut self, spec_name: &str) -> Self {
        self.opt.push(KeyField::qualified(spec_name));
        self
    }

    pub fn opt_un(mut self, spec_name: &str) -> Self {
        self.opt.push(KeyField::unqualified(spec_name));
        self
    }

    /// Every declared field, required first.
    pub fn fields(&self) -> impl Iterator<Item = &KeyField> {
        self.req.iter().chain(self.opt.iter())
    }

    fn describe(&self) -> String {
        let group = |fields: &[KeyField], qualified: bool| -> Vec<String> {
            fields
                .iter()
                .filter(|f| f.qualified == qualified)
                .map(|f| format!(":{}", f.spec_name))
                .collect()
        };
        let mut parts = Vec::new();
        for (label, fields, qualified) in [
            (":req", &self.req, true),
            (":req-un", &self.req, false),
            (":opt", &self.opt, true),
            (":opt-un", &self.opt, false),
        ] {
            let names = group(fields, qualified);
            if !names.is_empty() {
                parts.push(format!("{} [{}]", label, names.join(" ")));
            }
        }
        form("keys", parts)
    }
}

/// Tagged union selected by a discriminant map entry.
#[derive(Debug, Clone)]
pub struct MultiSpec {
    pub key: Value,
    pub cases: Vec<(Value, Spec)>,
}

impl MultiSpec {
    pub fn case(&self, discriminant: &Value) -> Option<&Spec> {
        self.cases
            .iter()
            .find(|(d, _)| d == discriminant)
            .map(|(_, spec)| spec)
    }
}

fn tagged(
    kind: &'static str,
    items: impl IntoIterator<Item = (impl Into<String>, Spec)>,
) -> SpecResult<Vec<(String, Spec)>> {
    let mut out: Vec<(String, Spec)> = Vec::new();
    for (tag, spec) in items {
        let tag = normalize_name(&tag.into());
        if out.iter().any(|(t, _)| *t == tag) {
            return Err(SpecError::DuplicateTag { kind, tag });
        }
        out.push((tag, spec));
    }
    if out.is_empty() {
        return Err(SpecError::EmptySpec(kind));
    }
    Ok(out)
}

/// Leaf spec from a named predicate function.
pub fn predicate(
    name: impl Into<String>,
    test: impl Fn(&Value) -> bool + Send + Sync + 'static,
) -> Spec {
    Spec::new(SpecKind::Predicate(Predicate {
        name: name.into(),
        test: Arc::new(test),
    }))
}

/// All sub-specs must conform, each receiving the previous conformed value.
pub fn and_of(specs: impl IntoIterator<Item = Spec>) -> Spec {
    Spec::new(SpecKind::And(specs.into_iter().collect()))
}

/// First conforming tagged branch wins.
pub fn or_of(branches: impl IntoIterator<Item = (impl Into<String>, Spec)>) -> SpecResult<Spec> {
    Ok(Spec::new(SpecKind::Or(tagged("or", branches)?)))
}

/// Homogeneous collection whose elements all conform to `elem`, within `opts`.
pub fn collection_of(elem: Spec, opts: CollOpts) -> SpecResult<Spec> {
    opts.validate()?;
    Ok(Spec::new(SpecKind::CollOf(elem, opts)))
}

/// Map whose keys conform to `key` and values to `val`.
pub fn map_of(key: Spec, val: Spec) -> Spec {
    Spec::new(SpecKind::MapOf { key, val })
}

/// Map with required and optional keys, each checked by its registered spec.
pub fn keys(keys: Keys) -> Spec {
    Spec::new(SpecKind::Keys(keys))
}

/// Value must satisfy every sub-spec; conformed maps are merged.
pub fn merge(specs: impl IntoIterator<Item = Spec>) -> SpecResult<Spec> {
    let specs: Vec<Spec> = specs.into_iter().collect();
    if specs.is_empty() {
        return Err(SpecError::EmptySpec("merge"));
    }
    Ok(Spec::new(SpecKind::Merge(specs)))
}

/// Fixed-length sequence, one spec per position.
pub fn tuple(specs: impl IntoIterator<Item = Spec>) -> SpecResult<Spec> {
    let specs: Vec<Spec> = specs.into_iter().collect();
    if specs.is_empty() {
        return Err(SpecError::EmptySpec("tuple"));
    }
    Ok(Spec::new(SpecKind::Tuple(specs)))
}

/// Concatenation of tagged regex elements.
pub fn cat(parts: impl IntoIterator<Item = (impl Into<String>, Spec)>) -> SpecResult<Spec> {
    Ok(Spec::new(SpecKind::Cat(tagged("cat", parts)?)))
}

/// Choice between tagged regex elements.
pub fn alt(branches: impl IntoIterator<Item = (impl Into<String>, Spec)>) -> SpecResult<Spec> {
    Ok(Spec::new(SpecKind::Alt(tagged("alt", branches)?)))
}

/// Zero or more repetitions (`*`).
pub fn repeat0(spec: Spec) -> Spec {
    Spec::new(SpecKind::Repeat(RepeatKind::ZeroOrMore, spec))
}

/// One or more repetitions (`+`).
pub fn repeat1(spec: Spec) -> Spec {
    Spec::new(SpecKind::Repeat(RepeatKind::OneOrMore, spec))
}

/// Zero or one repetition (`?`).
pub fn opt(spec: Spec) -> Spec {
    Spec::new(SpecKind::Repeat(RepeatKind::ZeroOrOne, spec))
}

/// Regex op that also requires its conformed result to satisfy `preds`.
pub fn regex_and(spec: Spec, preds: impl IntoIterator<Item = Spec>) -> Spec {
    Spec::new(SpecKind::RegexAnd(spec, preds.into_iter().collect()))
}

/// `nil`, or a value conforming to `spec`.
pub fn nilable(spec: Spec) -> Spec {
    Spec::new(SpecKind::Nilable(spec))
}

/// Lazily resolved reference to a registered spec.
pub fn spec_ref(name: &str) -> Spec {
    Spec::new(SpecKind::Ref(normalize_name(name)))
}

/// Tagged union dispatched on the map entry under `key`.
pub fn multi_spec(
    key: &str,
    cases: impl IntoIterator<Item = (Value, Spec)>,
) -> SpecResult<Spec> {
    let cases: Vec<(Value, Spec)> = cases.into_iter().collect();
    if cases.is_empty() {
        return Err(SpecError::EmptySpec("multi-spec"));
    }
    Ok(Spec::new(SpecKind::Multi(MultiSpec {
        key: Value::keyword(key),
        cases,
    })))
}

pub fn conformer(
    name: impl Into<String>,
    conform: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
) -> Spec {
    Spec::new(SpecKind::Conformer(Conformer {
        name: name.into(),
        conform: Arc::new(conform),
        unform: None,
    }))
}

pub fn conformer_with_unform(
    name: impl Into<String>,
    conform: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    unform: impl Fn(&Value) -> Value + Send + Sync + 'static,
) -> Spec {
    Spec::new(SpecKind::Conformer(Conformer {
        name: name.into(),
        conform: Arc::new(conform),
        unform: Some(Arc::new(unform)),
    }))
}

/// Match a regex spec against one nested sequence element instead of
/// splicing it into the enclosing sequence.
pub fn nested(spec: Spec) -> Spec {
    Spec::new(SpecKind::Nested(spec))
}
