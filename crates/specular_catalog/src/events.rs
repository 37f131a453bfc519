//! Events whose required keys depend on their `:event/type`.

use specular_spec::{keys, multi_spec, preds, Keys, Registry, SpecResult, Value};

pub const TYPE: &str = "event/type";
pub const TIMESTAMP: &str = "event/timestamp";
pub const SEARCH_URL: &str = "search/url";
pub const ERROR_MESSAGE: &str = "error/message";
pub const ERROR_CODE: &str = "error/code";
pub const EVENT: &str = "event/event";

pub const SPECS: &[&str] = &[TYPE, TIMESTAMP, SEARCH_URL, ERROR_MESSAGE, ERROR_CODE, EVENT];

pub fn search(timestamp: i64, url: &str) -> Value {
    Value::map([
        (Value::keyword(TYPE), Value::keyword("event/search")),
        (Value::keyword(TIMESTAMP), timestamp.into()),
        (Value::keyword(SEARCH_URL), url.into()),
    ])
}

pub fn error(timestamp: i64, message: &str, code: i64) -> Value {
    Value::map([
        (Value::keyword(TYPE), Value::keyword("event/error")),
        (Value::keyword(TIMESTAMP), timestamp.into()),
        (Value::keyword(ERROR_MESSAGE), message.into()),
        (Value::keyword(ERROR_CODE), code.into()),
    ])
}

pub fn install(registry: &Registry) -> SpecResult<()> {
    registry.register(TYPE, preds::keyword());
    registry.register(TIMESTAMP, preds::int());
    registry.register(SEARCH_URL, preds::string());
    registry.register(ERROR_MESSAGE, preds::string());
    registry.register(ERROR_CODE, preds::int());

    let common = || Keys::new().req(TYPE).req(TIMESTAMP);
    registry.register(
        EVENT,
        multi_spec(
            TYPE,
            [
                (Value::keyword("event/search"), keys(common().req(SEARCH_URL))),
                (
                    Value::keyword("event/error"),
                    keys(common().req(ERROR_MESSAGE).req(ERROR_CODE)),
                ),
            ],
        )?,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_dispatch() {
        let registry = Registry::new();
        install(&registry).unwrap();
        assert!(registry.valid(EVENT, &search(1463970123000, "https://clojure.org")).unwrap());
        assert!(registry.valid(EVENT, &error(1463970123000, "Invalid host", 500)).unwrap());

        let unknown = Value::map([(Value::keyword(TYPE), Value::keyword("event/restart"))]);
        let explanation = registry.explain(EVENT, &unknown).unwrap();
        assert_eq!(explanation.problems[0].reason.as_deref(), Some("no method"));
    }

    #[test]
    fn test_missing_case_key() {
        let registry = Registry::new();
        install(&registry).unwrap();
        let bad = Value::map([
            (Value::keyword(TYPE), Value::keyword("event/search")),
            (Value::keyword(TIMESTAMP), Value::Int(1)),
        ]);
        let explanation = registry.explain(EVENT, &bad).unwrap();
        assert_eq!(explanation.len(), 1);
        assert_eq!(explanation.problems[0].pred, "(contains? % :search/url)");
        assert_eq!(explanation.problems[0].path, vec!["event/search"]);
    }
}
