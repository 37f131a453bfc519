//! Function specs and call instrumentation.
//!
//! A [`FnSpec`] describes a function's argument list, return value and an
//! optional relation between the two. [`instrument`] wraps a function so
//! every call is checked against the spec registered for it.

use tracing::debug;

use crate::conform::Conformance;
use crate::error::{InstrumentStage, SpecError, SpecResult};
use crate::registry::Registry;
use crate::spec::Spec;
use crate::value::Value;

/// Argument, return and relation specs of a function.
#[derive(Debug, Clone)]
pub struct FnSpec {
    /// Spec over the argument vector, usually a `cat`.
    pub args: Spec,
    pub ret: Option<Spec>,
    /// Spec over `{:args <conformed args>, :ret <conformed ret>}`.
    pub relation: Option<Spec>,
}

impl FnSpec {
    pub fn new(args: Spec) -> Self {
        Self {
            args,
            ret: None,
            relation: None,
        }
    }

    pub fn ret(mut self, ret: Spec) -> Self {
        self.ret = Some(ret);
        self
    }

    pub fn relation(mut self, relation: Spec) -> Self {
        self.relation = Some(relation);
        self
    }
}

/// A function whose calls are checked against its registered [`FnSpec`].
pub struct Instrumented<'r, F> {
    name: String,
    fn_spec: FnSpec,
    registry: &'r Registry,
    f: F,
}

impl<'r, F> Instrumented<'r, F>
where
    F: Fn(&[Value]) -> Value,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the wrapped function, checking arguments first and the return
    /// value and relation afterwards.
    pub fn call(&self, args: &[Value]) -> SpecResult<Value> {
        let args_value = Value::Vector(args.to_vec());
        let conformed_args = self.check(InstrumentStage::Args, &self.fn_spec.args, &args_value)?;

        let ret = (self.f)(args);

        let conformed_ret = match &self.fn_spec.ret {
            Some(ret_spec) => self.check(InstrumentStage::Ret, ret_spec, &ret)?,
            None => ret.clone(),
        };
        if let Some(relation) = &self.fn_spec.relation {
            let pair = Value::map([
                (Value::keyword("args"), conformed_args),
                (Value::keyword("ret"), conformed_ret),
            ]);
            self.check(InstrumentStage::Fn, relation, &pair)?;
        }
        Ok(ret)
    }

    fn check(&self, stage: InstrumentStage, spec: &Spec, value: &Value) -> SpecResult<Value> {
        match self.registry.conform(spec, value)? {
            Conformance::Conformed(conformed) => Ok(conformed),
            Conformance::Invalid => {
                let explanation = self.registry.explain(spec, value)?;
                Err(SpecError::InstrumentFailure {
                    name: self.name.clone(),
                    stage,
                    explanation: explanation.to_string(),
                })
            }
        }
    }
}

/// Wrap `f` with the function spec registered under `name`.
///
/// The spec is looked up once, when instrumenting.
pub fn instrument<'r, F>(registry: &'r Registry, name: &str, f: F) -> SpecResult<Instrumented<'r, F>>
where
    F: Fn(&[Value]) -> Value,
{
    let fn_spec = registry.resolve_fn(name)?;
    debug!("Instrumenting {}", name);
    Ok(Instrumented {
        name: name.to_string(),
        fn_spec,
        registry,
        f,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preds;
    use crate::spec::{cat, predicate};

    fn ranged_rand_registry() -> Registry {
        let registry = Registry::new();
        registry.register_fn(
            "ranged-rand",
            FnSpec::new(
                cat([("start", preds::int()), ("end", preds::int())]).unwrap(),
            )
            .ret(preds::int())
            .relation(predicate("(>= (:ret %) (-> % :args :start))", |v| {
                let start = v
                    .get(&Value::keyword("args"))
                    .and_then(|a| a.get(&Value::keyword("start")))
                    .and_then(Value::as_int);
                let ret = v.get(&Value::keyword("ret")).and_then(Value::as_int);
                matches!((start, ret), (Some(s), Some(r)) if r >= s)
            })),
        );
        registry
    }

    #[test]
    fn test_instrumented_call_passes() {
        let registry = ranged_rand_registry();
        let f = instrument(&registry, "ranged-rand", |args| args[0].clone()).unwrap();
        assert_eq!(f.call(&[Value::Int(3), Value::Int(9)]).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_instrumented_args_mismatch() {
        let registry = ranged_rand_registry();
        let f = instrument(&registry, "ranged-rand", |_| Value::Int(0)).unwrap();
        let err = f.call(&[Value::from("a"), Value::Int(9)]).unwrap_err();
        assert!(matches!(
            err,
            SpecError::InstrumentFailure { stage: InstrumentStage::Args, .. }
        ));
    }

    #[test]
    fn test_instrumented_relation_mismatch() {
        let registry = ranged_rand_registry();
        let f = instrument(&registry, "ranged-rand", |_| Value::Int(-100)).unwrap();
        let err = f.call(&[Value::Int(1), Value::Int(9)]).unwrap_err();
        assert!(matches!(
            err,
            SpecError::InstrumentFailure { stage: InstrumentStage::Fn, .. }
        ));
    }

    #[test]
    fn test_instrument_unknown_function() {
        let registry = Registry::new();
        let err = instrument(&registry, "nope", |_| Value::Nil).err().unwrap();
        assert!(matches!(err, SpecError::UnregisteredFnSpec(_)));
    }
}
