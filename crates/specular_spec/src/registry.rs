//! Spec registry for named specifications.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::conform::{Conformance, Engine};
use crate::error::{SpecError, SpecResult};
use crate::explain::{Explainer, Explanation};
use crate::instrument::FnSpec;
use crate::spec::{normalize_name, Spec};
use crate::value::Value;

/// A registry of named specs.
///
/// Names map to spec trees; re-registering a name replaces the binding for
/// every later resolution. Resolution clones the `Spec` handle, so a
/// validation that already resolved a name keeps the definition it saw.
pub struct Registry {
    specs: RwLock<HashMap<String, Spec>>,
    fn_specs: RwLock<HashMap<String, FnSpec>>,
    check_asserts: AtomicBool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            specs: RwLock::new(HashMap::new()),
            fn_specs: RwLock::new(HashMap::new()),
            check_asserts: AtomicBool::new(config.check_asserts),
        }
    }

    /// Register a spec under `name`, replacing any prior binding.
    pub fn register(&self, name: &str, spec: impl Into<Spec>) {
        let name = normalize_name(name);
        let spec = spec.into();
        debug!("Registering spec :{} = {}", name, spec.describe());
        if let Some(previous) = self.specs.write().insert(name.clone(), spec) {
            debug!("Replaced previous definition of :{} ({})", name, previous.describe());
        }
    }

    /// Get a spec by name.
    pub fn get(&self, name: &str) -> Option<Spec> {
        self.specs.read().get(&normalize_name(name)).cloned()
    }

    /// Get a spec by name, returning an error if not found.
    pub fn resolve(&self, name: &str) -> SpecResult<Spec> {
        trace!("Resolving spec :{}", name);
        self.get(name)
            .ok_or_else(|| SpecError::UnregisteredSpec(normalize_name(name)))
    }

    /// Check if a spec is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.specs.read().contains_key(&normalize_name(name))
    }

    /// All registered spec names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.specs.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.specs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.read().is_empty()
    }

    /// Remove a spec from the registry.
    pub fn unregister(&self, name: &str) -> Option<Spec> {
        debug!("Unregistering spec :{}", name);
        self.specs.write().remove(&normalize_name(name))
    }

    /// Register the argument/return spec of a function.
    pub fn register_fn(&self, name: &str, fn_spec: FnSpec) {
        let name = normalize_name(name);
        debug!("Registering function spec {}", name);
        if self.fn_specs.write().insert(name.clone(), fn_spec).is_some() {
            warn!("Function spec {} was redefined", name);
        }
    }

    pub fn resolve_fn(&self, name: &str) -> SpecResult<FnSpec> {
        self.fn_specs
            .read()
            .get(&normalize_name(name))
            .cloned()
            .ok_or_else(|| SpecError::UnregisteredFnSpec(normalize_name(name)))
    }

    pub fn fn_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fn_specs.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether [`Registry::assert`] checks values.
    pub fn check_asserts(&self) -> bool {
        self.check_asserts.load(Ordering::Relaxed)
    }

    pub fn set_check_asserts(&self, enabled: bool) {
        self.check_asserts.store(enabled, Ordering::Relaxed);
    }

    /// Whether `value` conforms to `spec`.
    pub fn valid(&self, spec: impl Into<Spec>, value: &Value) -> SpecResult<bool> {
        Ok(self.conform(spec, value)?.is_conformed())
    }

    /// Validate and destructure `value`.
    pub fn conform(&self, spec: impl Into<Spec>, value: &Value) -> SpecResult<Conformance> {
        let spec = spec.into();
        Ok(Engine::new(self).conform(&spec, value)?.into())
    }

    /// Every problem that keeps `value` from conforming to `spec`.
    pub fn explain(&self, spec: impl Into<Spec>, value: &Value) -> SpecResult<Explanation> {
        let spec = spec.into();
        Explainer::new(self).explain(&spec, value)
    }

    /// Rebuild the original shape from a conformed value.
    pub fn unform(&self, spec: impl Into<Spec>, conformed: &Value) -> SpecResult<Value> {
        let spec = spec.into();
        Engine::new(self).unform(&spec, conformed)
    }

    /// Return `value` if it conforms, otherwise fail with the explanation.
    ///
    /// Does nothing when assertion checking is disabled.
    pub fn assert(&self, spec: impl Into<Spec>, value: &Value) -> SpecResult<Value> {
        if !self.check_asserts() {
            return Ok(value.clone());
        }
        let explanation = self.explain(spec, value)?;
        if explanation.is_empty() {
            Ok(value.clone())
        } else {
            Err(SpecError::AssertionFailed(explanation.to_string()))
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("specs", &self.names())
            .field("fn_specs", &self.fn_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preds;
    use crate::spec::spec_ref;

    #[test]
    fn test_registry_register() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        registry.register("::user/age", preds::pos_int());

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("user/age"));
        assert!(registry.contains(":user/age"));
    }

    #[test]
    fn test_registry_resolve_missing() {
        let registry = Registry::new();
        let err = registry.resolve("nonexistent").unwrap_err();
        assert!(matches!(err, SpecError::UnregisteredSpec(ref name) if name == "nonexistent"));
        assert!(err.is_unregistered());
    }

    #[test]
    fn test_registry_names_sorted() {
        let registry = Registry::new();
        registry.register("b/spec", preds::int());
        registry.register("a/spec", preds::string());
        assert_eq!(registry.names(), vec!["a/spec", "b/spec"]);
    }

    #[test]
    fn test_registry_unregister() {
        let registry = Registry::new();
        registry.register("test", preds::int());
        assert!(registry.unregister("test").is_some());
        assert!(!registry.contains("test"));
    }

    #[test]
    fn test_reregistering_changes_dependents() {
        let registry = Registry::new();
        registry.register("foo", preds::int());
        let dependent = spec_ref("foo");

        assert!(registry.valid(&dependent, &Value::Int(1)).unwrap());
        assert!(!registry.valid(&dependent, &Value::from("one")).unwrap());

        registry.register("foo", preds::string());

        assert!(!registry.valid(&dependent, &Value::Int(1)).unwrap());
        assert!(registry.valid(&dependent, &Value::from("one")).unwrap());
    }

    #[test]
    fn test_resolved_spec_is_a_snapshot() {
        let registry = Registry::new();
        registry.register("foo", preds::int());
        let snapshot = registry.resolve("foo").unwrap();
        registry.register("foo", preds::string());
        assert!(registry.valid(&snapshot, &Value::Int(1)).unwrap());
    }

    #[test]
    fn test_assert_respects_config() {
        let registry = Registry::new();
        registry.register("n", preds::int());
        assert!(registry.assert("n", &Value::Int(3)).is_ok());
        let err = registry.assert("n", &Value::from("x")).unwrap_err();
        assert!(err.to_string().contains("int?"));

        registry.set_check_asserts(false);
        assert_eq!(registry.assert("n", &Value::from("x")).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_concurrent_readers_see_one_definition() {
        let registry = Registry::new();
        let first = crate::spec::or_of([("first", preds::any())]).unwrap();
        let second = crate::spec::or_of([("second", preds::any())]).unwrap();
        registry.register("flip", first.clone());

        let value = Value::Int(1);
        let expected = [
            Value::tagged("first", value.clone()),
            Value::tagged("second", value.clone()),
        ];

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..500 {
                    let next = if i % 2 == 0 { &second } else { &first };
                    registry.register("flip", next.clone());
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        let conformed = registry
                            .conform(spec_ref("flip"), &value)
                            .unwrap()
                            .into_value()
                            .unwrap();
                        assert!(expected.contains(&conformed), "unexpected {conformed}");

                        let snapshot = registry.resolve("flip").unwrap();
                        let again = registry.conform(&snapshot, &value).unwrap().into_value();
                        assert!(again.is_some_and(|v| expected.contains(&v)));
                    }
                });
            }
        });
    }
}
