//! Dynamic value model validated by specs.
//!
//! `Value` is a small EDN-like data model: scalars, keywords, two sequential
//! kinds and two unordered kinds. Maps and sets keep insertion order for
//! iteration and rendering while comparing and hashing order-insensitively.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// A dynamically typed value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Keyword name without the leading colon, e.g. `person/name`.
    Keyword(String),
    Vector(Vec<Value>),
    List(Vec<Value>),
    Set(Set),
    Map(Map),
}

/// Broad kind of a value, used in container-kind checks and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Keyword,
    Vector,
    List,
    Set,
    Map,
}

impl Value {
    /// Build a keyword, accepting an optional leading colon.
    pub fn keyword(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        Value::Keyword(name.strip_prefix(':').unwrap_or(name).to_string())
    }

    pub fn vector(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Vector(items.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(entries.into_iter().collect())
    }

    /// Two-element `[:tag value]` vector used for tagged conform results.
    pub fn tagged(tag: &str, value: Value) -> Self {
        Value::Vector(vec![Value::keyword(tag), value])
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Keyword(_) => ValueKind::Keyword,
            Value::Vector(_) => ValueKind::Vector,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Value::Vector(_) | Value::List(_))
    }

    pub fn is_coll(&self) -> bool {
        matches!(
            self,
            Value::Vector(_) | Value::List(_) | Value::Set(_) | Value::Map(_)
        )
    }

    /// Elements of a vector or list.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Vector(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of ints and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Value::Keyword(k) => Some(k),
            _ => None,
        }
    }

    /// Number of elements for collections and characters for strings.
    pub fn count(&self) -> Option<usize> {
        match self {
            Value::Vector(items) | Value::List(items) => Some(items.len()),
            Value::Set(set) => Some(set.len()),
            Value::Map(map) => Some(map.len()),
            Value::Str(s) => Some(s.chars().count()),
            Value::Nil => Some(0),
            _ => None,
        }
    }

    /// Look up `key` in a map value.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Convert from JSON. Object keys become keywords, strings with a
    /// leading colon become keywords, arrays become vectors.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => string_or_keyword(s),
            serde_json::Value::Array(items) => {
                Value::Vector(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (Value::keyword(k), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert from YAML using the same conventions as [`Value::from_json`].
    pub fn from_yaml(yaml: serde_yaml::Value) -> Self {
        match yaml {
            serde_yaml::Value::Null => Value::Nil,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => string_or_keyword(s),
            serde_yaml::Value::Sequence(items) => {
                Value::Vector(items.into_iter().map(Value::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Value::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| {
                        let key = match k {
                            serde_yaml::Value::String(s) => Value::keyword(s),
                            other => Value::from_yaml(other),
                        };
                        (key, Value::from_yaml(v))
                    })
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(tagged.value),
        }
    }

    /// Render as JSON. Keywords become `":name"` strings, except as map keys
    /// where the bare name is used.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Keyword(k) => serde_json::Value::String(format!(":{}", k)),
            Value::Vector(items) | Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Set(set) => serde_json::Value::Array(set.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| {
                        let key = match k {
                            Value::Keyword(name) | Value::Str(name) => name.clone(),
                            other => other.to_string(),
                        };
                        (key, v.to_json())
                    })
                    .collect(),
            ),
        }
    }
}

fn string_or_keyword(s: String) -> Value {
    match s.strip_prefix(':') {
        Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
            Value::Keyword(name.to_string())
        }
        _ => Value::Str(s),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b).is_eq(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // vectors and lists with the same elements are equal
            (a, b) => match (a.as_seq(), b.as_seq()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Nil => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Str(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Value::Keyword(k) => {
                5u8.hash(state);
                k.hash(state);
            }
            Value::Vector(items) | Value::List(items) => {
                6u8.hash(state);
                items.hash(state);
            }
            Value::Set(set) => {
                7u8.hash(state);
                set.len().hash(state);
                unordered_hash(set.iter()).hash(state);
            }
            Value::Map(map) => {
                8u8.hash(state);
                map.len().hash(state);
                unordered_hash(map.iter()).hash(state);
            }
        }
    }
}

fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items
        .map(|item| {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            hasher.finish()
        })
        .fold(0u64, u64::wrapping_add)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Keyword(k) => write!(f, ":{}", k),
            Value::Vector(items) => write_seq(f, "[", items.iter(), "]"),
            Value::List(items) => write_seq(f, "(", items.iter(), ")"),
            Value::Set(set) => write_seq(f, "#{", set.iter(), "}"),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Vector(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Set> for Value {
    fn from(set: Set) -> Self {
        Value::Set(set)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Nil)
    }
}

/// Insertion-ordered map with order-insensitive equality.
///
/// Entries live in a `Vec` for ordered iteration; a hash index from key to
/// position keeps lookups and inserts constant time.
#[derive(Clone, Default)]
pub struct Map {
    entries: Vec<(Value, Value)>,
    index: HashMap<Value, usize>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing an existing value in place.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.index.contains_key(key)
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (offset, (k, _)) in self.entries[position..].iter().enumerate() {
            if let Some(slot) = self.index.get_mut(k) {
                *slot = position + offset;
            }
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Map {}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Insertion-ordered set with order-insensitive equality.
#[derive(Clone, Default)]
pub struct Set {
    items: Vec<Value>,
    index: HashSet<Value>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; returns `false` if it was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        if !self.index.insert(value.clone()) {
            return false;
        }
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.index.contains(value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl Eq for Set {}

impl FromIterator<Value> for Set {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Set::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

impl IntoIterator for Set {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_equality_ignores_order() {
        let a = Value::map([(Value::keyword("a"), 1.into()), (Value::keyword("b"), 2.into())]);
        let b = Value::map([(Value::keyword("b"), 2.into()), (Value::keyword("a"), 1.into())]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{:a 1, :b 2}");
        assert_eq!(b.to_string(), "{:b 2, :a 1}");
    }

    #[test]
    fn test_map_insert_replaces_in_place() {
        let mut map = Map::new();
        map.insert(Value::keyword("a"), 1.into());
        map.insert(Value::keyword("b"), 2.into());
        let old = map.insert(Value::keyword("a"), 3.into());
        assert_eq!(old, Some(Value::Int(1)));
        assert_eq!(Value::Map(map).to_string(), "{:a 3, :b 2}");
    }

    #[test]
    fn test_map_remove_keeps_order() {
        let mut map: Map = (0..5).map(|i| (Value::Int(i), Value::Int(i * 10))).collect();
        assert_eq!(map.remove(&Value::Int(1)), Some(Value::Int(10)));
        assert_eq!(map.remove(&Value::Int(1)), None);
        assert_eq!(map.get(&Value::Int(3)), Some(&Value::Int(30)));
        map.insert(Value::Int(4), Value::Int(-4));
        assert_eq!(Value::Map(map).to_string(), "{0 0, 2 20, 3 30, 4 -4}");
    }

    #[test]
    fn test_large_object_from_json() {
        let n = 50_000;
        let object: serde_json::Map<String, serde_json::Value> =
            (0..n).map(|i| (format!("k{i}"), json!(i))).collect();
        let value = Value::from_json(serde_json::Value::Object(object));
        assert_eq!(value.count(), Some(n));
        assert_eq!(value.get(&Value::keyword("k49999")), Some(&Value::Int(49_999)));

        let reversed = Value::map(
            (0..n)
                .rev()
                .map(|i| (Value::keyword(format!("k{i}")), Value::Int(i as i64))),
        );
        assert_eq!(value, reversed);

        let set = Value::set((0..n).chain(0..n).map(|i| Value::Int(i as i64)));
        assert_eq!(set.count(), Some(n));
    }

    #[test]
    fn test_set_ignores_duplicates() {
        let set = Value::set([Value::keyword("a"), Value::keyword("b"), Value::keyword("a")]);
        assert_eq!(set.count(), Some(2));
        assert_eq!(set.to_string(), "#{:a :b}");
    }

    #[test]
    fn test_vector_equals_list() {
        let v = Value::vector([1.into(), 2.into()]);
        let l = Value::list([1.into(), 2.into()]);
        assert_eq!(v, l);
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_from_json_keywordizes_keys() {
        let value = Value::from_json(json!({"name": "Ada", "suit": ":club", "scores": [1, 2.5]}));
        assert_eq!(value.get(&Value::keyword("name")), Some(&Value::from("Ada")));
        assert_eq!(value.get(&Value::keyword("suit")), Some(&Value::keyword("club")));
        assert_eq!(
            value.get(&Value::keyword("scores")),
            Some(&Value::vector([Value::Int(1), Value::Float(2.5)]))
        );
    }

    #[test]
    fn test_to_json_renders_keywords() {
        let value = Value::map([(Value::keyword("suit"), Value::keyword("club"))]);
        assert_eq!(value.to_json(), json!({"suit": ":club"}));
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::keyword(":x/y").to_string(), ":x/y");
    }
}
