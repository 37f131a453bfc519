//! Property tests relating validity, conformance and explanation.

use proptest::prelude::*;
use specular_spec::{
    alt, and_of, cat, collection_of, keys, map_of, nilable, opt, or_of, preds, repeat0, repeat1,
    tuple, CollOpts, Keys, Registry, Spec, Value,
};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::Int),
        "[a-z]{0,6}".prop_map(Value::Str),
        prop::sample::select(vec!["a", "b", "name", "age"]).prop_map(Value::keyword),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Vector),
            prop::collection::vec(
                (
                    prop::sample::select(vec!["a", "b", "name", "age"]).prop_map(Value::keyword),
                    inner
                ),
                0..4
            )
            .prop_map(Value::map),
        ]
    })
}

fn registry() -> Registry {
    let registry = Registry::new();
    registry.register("prop/name", preds::string());
    registry.register("prop/age", preds::nat_int());
    registry
}

fn specs() -> Vec<Spec> {
    vec![
        preds::int(),
        and_of([preds::int(), preds::even()]),
        or_of([("s", preds::string()), ("i", preds::int())]).unwrap(),
        nilable(preds::keyword()),
        collection_of(preds::int(), CollOpts::new().max_count(3)).unwrap(),
        map_of(preds::keyword(), preds::any()),
        keys(Keys::new().req_un("prop/name").opt_un("prop/age")),
        tuple([preds::int(), preds::any()]).unwrap(),
        cat([("ints", repeat0(preds::int())), ("tail", opt(preds::string()))]).unwrap(),
        repeat1(alt([("b", preds::boolean()), ("k", preds::keyword())]).unwrap()),
    ]
}

proptest! {
    #[test]
    fn prop_valid_matches_conform(value in arb_value()) {
        let registry = registry();
        for spec in specs() {
            let valid = registry.valid(&spec, &value).unwrap();
            let conformed = registry.conform(&spec, &value).unwrap();
            prop_assert_eq!(valid, conformed.is_conformed(), "spec {}", spec);
        }
    }

    #[test]
    fn prop_explanation_empty_iff_valid(value in arb_value()) {
        let registry = registry();
        for spec in specs() {
            let valid = registry.valid(&spec, &value).unwrap();
            let explanation = registry.explain(&spec, &value).unwrap();
            prop_assert_eq!(valid, explanation.is_empty(), "spec {}", spec);
        }
    }

    #[test]
    fn prop_untagged_conform_is_idempotent(value in arb_value()) {
        let registry = registry();
        let untagged = [
            preds::int(),
            and_of([preds::int(), preds::even()]),
            nilable(preds::keyword()),
            map_of(preds::keyword(), preds::any()),
        ];
        for spec in untagged {
            if let Some(conformed) = registry.conform(&spec, &value).unwrap().into_value() {
                prop_assert_eq!(&conformed, &value);
                let again = registry.conform(&spec, &conformed).unwrap().into_value();
                prop_assert_eq!(again, Some(conformed));
            }
        }
    }

    #[test]
    fn prop_unform_inverts_conform(value in arb_value()) {
        let registry = registry();
        let spec = or_of([("s", preds::string()), ("i", preds::int())]).unwrap();
        if let Some(conformed) = registry.conform(&spec, &value).unwrap().into_value() {
            prop_assert_eq!(registry.unform(&spec, &conformed).unwrap(), value);
        }
    }
}
