//! Declarative spec definitions loaded from YAML or JSON.
//!
//! ```yaml
//! specs:
//!   person/name: string?
//!   person/email:
//!     matches: "^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\\.[a-zA-Z]{2,63}$"
//!   person/age:
//!     int_in: [0, 150]
//!   person:
//!     keys:
//!       req_un: [person/name, person/email]
//!       opt_un: [person/age]
//! ```
//!
//! A bare string is a standard predicate name (`int?`) or, failing that, a
//! reference to another registered spec.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SpecError, SpecResult};
use crate::preds;
use crate::registry::Registry;
use crate::spec::{self, CollKind, CollOpts, Keys, Spec};
use crate::value::Value;

/// A document of named spec definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecDocument {
    #[serde(default)]
    pub specs: BTreeMap<String, SpecDef>,
}

/// One spec definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecDef {
    Name(String),
    Form(SpecForm),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecForm {
    Pred(String),
    Ref(String),
    OneOf(Vec<serde_json::Value>),
    Matches(String),
    IntIn([i64; 2]),
    DoubleIn([f64; 2]),
    And(Vec<SpecDef>),
    Or(Vec<TaggedDef>),
    CollOf {
        of: Box<SpecDef>,
        #[serde(default)]
        kind: Option<CollKind>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        min_count: Option<usize>,
        #[serde(default)]
        max_count: Option<usize>,
        #[serde(default)]
        distinct: bool,
    },
    MapOf {
        key: Box<SpecDef>,
        val: Box<SpecDef>,
    },
    Keys(KeysDef),
    Merge(Vec<SpecDef>),
    Tuple(Vec<SpecDef>),
    Cat(Vec<TaggedDef>),
    Alt(Vec<TaggedDef>),
    Star(Box<SpecDef>),
    Plus(Box<SpecDef>),
    Opt(Box<SpecDef>),
    Nilable(Box<SpecDef>),
    Nested(Box<SpecDef>),
    Multi {
        key: String,
        cases: Vec<CaseDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedDef {
    pub tag: String,
    pub spec: SpecDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysDef {
    pub req: Vec<String>,
    pub req_un: Vec<String>,
    pub opt: Vec<String>,
    pub opt_un: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDef {
    /// Discriminant value selecting this case.
    pub when: serde_json::Value,
    pub spec: SpecDef,
}

impl SpecDef {
    /// Build the spec tree this definition describes.
    pub fn build(&self) -> SpecResult<Spec> {
        match self {
            SpecDef::Name(name) => Ok(preds::by_name(name).unwrap_or_else(|| spec::spec_ref(name))),
            SpecDef::Form(form) => form.build(),
        }
    }
}

impl SpecForm {
    fn build(&self) -> SpecResult<Spec> {
        match self {
            SpecForm::Pred(name) => preds::by_name(name).ok_or_else(|| SpecError::Definition {
                name: name.clone(),
                message: format!("unknown predicate {}", name),
            }),
            SpecForm::Ref(name) => Ok(spec::spec_ref(name)),
            SpecForm::OneOf(values) => Ok(preds::one_of(
                values.iter().cloned().map(Value::from_json),
            )),
            SpecForm::Matches(pattern) => preds::matches(pattern),
            SpecForm::IntIn([lo, hi]) => Ok(preds::int_in(*lo, *hi)),
            SpecForm::DoubleIn([lo, hi]) => Ok(preds::double_in(*lo, *hi)),
            SpecForm::And(defs) => Ok(spec::and_of(build_all(defs)?)),
            SpecForm::Or(tagged) => spec::or_of(build_tagged(tagged)?),
            SpecForm::CollOf {
                of,
                kind,
                count,
                min_count,
                max_count,
                distinct,
            } => {
                let opts = CollOpts {
                    kind: *kind,
                    count: *count,
                    min_count: *min_count,
                    max_count: *max_count,
                    distinct: *distinct,
                };
                spec::collection_of(of.build()?, opts)
            }
            SpecForm::MapOf { key, val } => Ok(spec::map_of(key.build()?, val.build()?)),
            SpecForm::Keys(def) => {
                let mut keys = Keys::new();
                for name in &def.req {
                    keys = keys.req(name);
                }
                for name in &def.req_un {
                    keys = keys.req_un(name);
                }
                for name in &def.opt {
                    keys = keys.opt(name);
                }
                for name in &def.opt_un {
                    keys = keys.opt_un(name);
                }
                Ok(spec::keys(keys))
            }
            SpecForm::Merge(defs) => spec::merge(build_all(defs)?),
            SpecForm::Tuple(defs) => spec::tuple(build_all(defs)?),
            SpecForm::Cat(tagged) => spec::cat(build_tagged(tagged)?),
            SpecForm::Alt(tagged) => spec::alt(build_tagged(tagged)?),
            SpecForm::Star(def) => Ok(spec::repeat0(def.build()?)),
            SpecForm::Plus(def) => Ok(spec::repeat1(def.build()?)),
            SpecForm::Opt(def) => Ok(spec::opt(def.build()?)),
            SpecForm::Nilable(def) => Ok(spec::nilable(def.build()?)),
            SpecForm::Nested(def) => Ok(spec::nested(def.build()?)),
            SpecForm::Multi { key, cases } => {
                let cases = cases
                    .iter()
                    .map(|c| Ok((Value::from_json(c.when.clone()), c.spec.build()?)))
                    .collect::<SpecResult<Vec<_>>>()?;
                spec::multi_spec(key, cases)
            }
        }
    }
}

fn build_all(defs: &[SpecDef]) -> SpecResult<Vec<Spec>> {
    defs.iter().map(SpecDef::build).collect()
}

fn build_tagged(tagged: &[TaggedDef]) -> SpecResult<Vec<(String, Spec)>> {
    tagged
        .iter()
        .map(|t| Ok((t.tag.clone(), t.spec.build()?)))
        .collect()
}

impl SpecDocument {
    pub fn from_yaml_str(content: &str) -> SpecResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> SpecResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a document, choosing the parser by file extension.
    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.exists() {
            return Err(SpecError::DocumentNotFound(path.to_path_buf()));
        }
        debug!("Loading spec document from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|e| e == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Build every definition, then register them all.
    ///
    /// Nothing is registered if any definition fails to build.
    pub fn install(&self, registry: &Registry) -> SpecResult<Vec<String>> {
        let mut built = Vec::with_capacity(self.specs.len());
        for (name, def) in &self.specs {
            let spec = def.build().map_err(|e| SpecError::Definition {
                name: name.clone(),
                message: match e {
                    SpecError::Definition { message, .. } => message,
                    other => other.to_string(),
                },
            })?;
            built.push((name.clone(), spec));
        }
        let names: Vec<String> = built.iter().map(|(n, _)| n.clone()).collect();
        for (name, spec) in built {
            registry.register(&name, spec);
        }
        info!("Installed {} spec definitions", names.len());
        Ok(names)
    }
}
