//! The fish rhyme: `One fish. Two fish. Red fish. Blue fish.`

use specular_spec::{
    cat, preds, predicate, regex_and, spec_ref, FnSpec, Registry, SpecResult, Value,
};

pub const FISH_NUMBER: &str = "fish/fish-number";
pub const COLOR: &str = "fish/color";
pub const FIRST_LINE: &str = "fish/first-line";
/// Function spec for [`fish_line`].
pub const FISH_LINE: &str = "fish/fish-line";

pub const SPECS: &[&str] = &[FISH_NUMBER, COLOR, FIRST_LINE];
pub const FN_SPECS: &[&str] = &[FISH_LINE];

const NUMBER_WORDS: [&str; 3] = ["Zero", "One", "Two"];

/// Render a rhyme line from `[n1 n2 c1 c2]`.
pub fn fish_line(args: &[Value]) -> Value {
    let words: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            Value::Int(n) => usize::try_from(*n)
                .ok()
                .and_then(|i| NUMBER_WORDS.get(i))
                .map(|w| w.to_string())
                .unwrap_or_else(|| n.to_string()),
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        })
        .map(|w| format!("{} fish.", w))
        .collect();
    Value::Str(words.join(" "))
}

fn field(value: &Value, name: &str) -> Option<Value> {
    value.get(&Value::keyword(name)).cloned()
}

pub fn install(registry: &Registry) -> SpecResult<()> {
    registry.register(
        FISH_NUMBER,
        preds::one_of((0..NUMBER_WORDS.len() as i64).map(Value::Int)),
    );
    registry.register(
        COLOR,
        preds::one_of(["Red", "Blue", "Dun"].into_iter().map(Value::from)),
    );

    let one_bigger = predicate("one-bigger?", |v| {
        match (
            field(v, "n1").as_ref().and_then(Value::as_int),
            field(v, "n2").as_ref().and_then(Value::as_int),
        ) {
            (Some(n1), Some(n2)) => n2 == n1 + 1,
            _ => false,
        }
    });
    let different_colors = predicate("(not= (:c1 %) (:c2 %))", |v| {
        field(v, "c1") != field(v, "c2")
    });
    registry.register(
        FIRST_LINE,
        regex_and(
            cat([
                ("n1", spec_ref(FISH_NUMBER)),
                ("n2", spec_ref(FISH_NUMBER)),
                ("c1", spec_ref(COLOR)),
                ("c2", spec_ref(COLOR)),
            ])?,
            [one_bigger, different_colors],
        ),
    );
    registry.register_fn(
        FISH_LINE,
        FnSpec::new(spec_ref(FIRST_LINE)).ret(preds::string()),
    );
    Ok(())
}
