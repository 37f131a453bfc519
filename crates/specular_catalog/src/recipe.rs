//! Sequence specs: recipe ingredients and friends.

use specular_spec::{
    cat, collection_of, nested, opt, predicate, preds, regex_and, repeat0, repeat1, spec_ref,
    CollOpts, Registry, SpecResult, Value,
};

pub const INGREDIENT: &str = "recipe/ingredient";
pub const INGREDIENTS: &str = "recipe/ingredients";
pub const SEQ_OF_KEYWORDS: &str = "recipe/seq-of-keywords";
pub const ODDS_THEN_MAYBE_EVEN: &str = "recipe/odds-then-maybe-even";
pub const EVEN_STRINGS: &str = "recipe/even-strings";
pub const NESTED: &str = "recipe/nested";

pub const SPECS: &[&str] = &[
    INGREDIENT,
    INGREDIENTS,
    SEQ_OF_KEYWORDS,
    ODDS_THEN_MAYBE_EVEN,
    EVEN_STRINGS,
    NESTED,
];

/// `[quantity unit]`, e.g. `[2 :teaspoon]`.
pub fn ingredient(quantity: impl Into<Value>, unit: &str) -> Value {
    Value::vector([quantity.into(), Value::keyword(unit)])
}

pub fn install(registry: &Registry) -> SpecResult<()> {
    registry.register(
        INGREDIENT,
        cat([("quantity", preds::number()), ("unit", preds::keyword())])?,
    );
    registry.register(
        INGREDIENTS,
        collection_of(spec_ref(INGREDIENT), CollOpts::new().min_count(1))?,
    );
    registry.register(SEQ_OF_KEYWORDS, repeat0(preds::keyword()));
    registry.register(
        ODDS_THEN_MAYBE_EVEN,
        cat([("odds", repeat1(preds::odd())), ("even", opt(preds::even()))])?,
    );
    registry.register(
        EVEN_STRINGS,
        regex_and(
            repeat0(preds::string()),
            [predicate("(even? (count %))", |v| {
                v.count().is_some_and(|n| n % 2 == 0)
            })],
        ),
    );
    registry.register(
        NESTED,
        cat([
            ("names-kw", preds::one_of([Value::keyword("names")])),
            ("names", nested(repeat0(preds::keyword()))),
            ("nums-kw", preds::one_of([Value::keyword("nums")])),
            ("nums", nested(repeat0(preds::number()))),
        ])?,
    );
    Ok(())
}
