//! # specular_spec
//!
//! A data specification engine: register composable specs by name, validate
//! values against them, conform (destructure) valid values and explain
//! invalid ones.
//!
//! ## Features
//!
//! - **Composable specs**: predicates, `and`/`or`, collections, maps, keyed
//!   records, tuples, multi-specs and custom conformers
//! - **Sequence regex**: `cat`, `alt`, `*`, `+`, `?` and `&` over vectors
//! - **Explanations**: every failure located by spec path, input path and
//!   the chain of named specs traversed
//! - **Function specs**: argument/return checking for instrumented calls
//! - **Spec documents**: declarative YAML/JSON definitions
//!
//! ## Example
//!
//! ```rust
//! use specular_spec::{cat, opt, preds, repeat1, Registry, Value};
//!
//! let registry = Registry::new();
//! registry.register(
//!     "odds-then-even",
//!     cat([("odds", repeat1(preds::odd())), ("even", opt(preds::even()))]).unwrap(),
//! );
//!
//! let value = Value::vector([1.into(), 3.into(), 100.into()]);
//! let conformed = registry.conform("odds-then-even", &value).unwrap();
//! assert!(conformed.is_conformed());
//!
//! let explanation = registry.explain("odds-then-even", &Value::vector([100.into()])).unwrap();
//! println!("{}", explanation);
//! ```

pub mod config;
pub mod conform;
pub mod document;
pub mod error;
pub mod explain;
pub mod instrument;
pub mod preds;
pub mod registry;
pub mod spec;
pub mod value;

pub use config::EngineConfig;
pub use conform::Conformance;
pub use document::{SpecDef, SpecDocument};
pub use error::{InstrumentStage, SpecError, SpecResult};
pub use explain::{Explanation, Problem};
pub use instrument::{instrument, FnSpec, Instrumented};
pub use registry::Registry;
pub use spec::{
    alt, and_of, cat, collection_of, conformer, conformer_with_unform, keys, map_of, merge,
    multi_spec, nested, nilable, opt, or_of, predicate, regex_and, repeat0, repeat1, spec_ref,
    tuple, CollKind, CollOpts, KeyField, Keys, RepeatKind, Spec, SpecKind,
};
pub use value::{Map, Set, Value, ValueKind};

use lazy_static::lazy_static;

lazy_static! {
    static ref GLOBAL: Registry = Registry::with_config(EngineConfig::from_env());
}

/// The process-wide registry behind the free functions below.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Register `spec` under `name` in the global registry.
pub fn register(name: &str, spec: impl Into<Spec>) {
    global().register(name, spec)
}

pub fn resolve(name: &str) -> SpecResult<Spec> {
    global().resolve(name)
}

pub fn valid(spec: impl Into<Spec>, value: &Value) -> SpecResult<bool> {
    global().valid(spec, value)
}

pub fn conform(spec: impl Into<Spec>, value: &Value) -> SpecResult<Conformance> {
    global().conform(spec, value)
}

pub fn explain(spec: impl Into<Spec>, value: &Value) -> SpecResult<Explanation> {
    global().explain(spec, value)
}

pub fn unform(spec: impl Into<Spec>, conformed: &Value) -> SpecResult<Value> {
    global().unform(spec, conformed)
}
