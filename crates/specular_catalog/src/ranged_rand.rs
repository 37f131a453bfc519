//! A function spec with an argument relation: `ranged-rand` returns an int in
//! `[start, end)`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use specular_spec::{and_of, cat, predicate, preds, FnSpec, Registry, SpecResult, Value};

pub const RANGED_RAND: &str = "ranged-rand";

pub const SPECS: &[&str] = &[];
pub const FN_SPECS: &[&str] = &[RANGED_RAND];

fn int_at(value: &Value, path: &[&str]) -> Option<i64> {
    path.iter()
        .try_fold(value, |v, key| v.get(&Value::keyword(key)))
        .and_then(Value::as_int)
}

/// Pick an int in `[start, end)` derived from the arguments.
///
/// Returns `start` when the range is empty.
pub fn ranged_rand(args: &[Value]) -> Value {
    let (Some(start), Some(end)) = (
        args.first().and_then(Value::as_int),
        args.get(1).and_then(Value::as_int),
    ) else {
        return Value::Nil;
    };
    if end <= start {
        return Value::Int(start);
    }
    let mut hasher = DefaultHasher::new();
    (start, end).hash(&mut hasher);
    let width = end.abs_diff(start);
    let offset = hasher.finish() % width;
    Value::Int(start.wrapping_add(offset as i64))
}

pub fn install(registry: &Registry) -> SpecResult<()> {
    let args = and_of([
        cat([("start", preds::int()), ("end", preds::int())])?,
        predicate("(< (:start %) (:end %))", |v| {
            matches!(
                (int_at(v, &["start"]), int_at(v, &["end"])),
                (Some(start), Some(end)) if start < end
            )
        }),
    ]);
    let relation = and_of([
        predicate("(>= (:ret %) (-> % :args :start))", |v| {
            matches!(
                (int_at(v, &["ret"]), int_at(v, &["args", "start"])),
                (Some(ret), Some(start)) if ret >= start
            )
        }),
        predicate("(< (:ret %) (-> % :args :end))", |v| {
            matches!(
                (int_at(v, &["ret"]), int_at(v, &["args", "end"])),
                (Some(ret), Some(end)) if ret < end
            )
        }),
    ]);
    registry.register_fn(
        RANGED_RAND,
        FnSpec::new(args).ret(preds::int()).relation(relation),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specular_spec::{instrument, InstrumentStage, SpecError};

    #[test]
    fn test_result_in_range() {
        let registry = Registry::new();
        install(&registry).unwrap();
        let f = instrument(&registry, RANGED_RAND, ranged_rand).unwrap();
        for (start, end) in [(0, 1), (-5, 5), (10, 1000)] {
            let ret = f.call(&[Value::Int(start), Value::Int(end)]).unwrap();
            let ret = ret.as_int().unwrap();
            assert!(start <= ret && ret < end);
        }
    }

    #[test]
    fn test_reversed_range_rejected() {
        let registry = Registry::new();
        install(&registry).unwrap();
        let f = instrument(&registry, RANGED_RAND, ranged_rand).unwrap();
        let err = f.call(&[Value::Int(8), Value::Int(5)]).unwrap_err();
        assert!(matches!(
            err,
            SpecError::InstrumentFailure { stage: InstrumentStage::Args, .. }
        ));
    }

    #[test]
    fn test_broken_implementation_fails_relation() {
        let registry = Registry::new();
        install(&registry).unwrap();
        let f = instrument(&registry, RANGED_RAND, |args: &[Value]| args[1].clone()).unwrap();
        let err = f.call(&[Value::Int(1), Value::Int(5)]).unwrap_err();
        assert!(matches!(
            err,
            SpecError::InstrumentFailure { stage: InstrumentStage::Fn, .. }
        ));
    }
}
