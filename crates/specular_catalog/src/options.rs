//! Command-line style configuration options: `["-server" "foo" "-verbose" true]`.

use specular_spec::{alt, cat, preds, repeat0, Map, Registry, SpecResult, Value};

pub const CONFIG: &str = "options/config";

pub const SPECS: &[&str] = &[CONFIG];

pub fn install(registry: &Registry) -> SpecResult<()> {
    registry.register(
        CONFIG,
        repeat0(cat([
            ("prop", preds::string()),
            ("val", alt([("s", preds::string()), ("b", preds::boolean())])?),
        ])?),
    );
    Ok(())
}

/// Collapse a conformed config into `{"server" "foo", "verbose" true}`.
///
/// Leading dashes are dropped from option names. Returns `None` for a value
/// that is not a conformed config.
pub fn settings(conformed: &Value) -> Option<Map> {
    let mut settings = Map::new();
    for entry in conformed.as_seq()? {
        let prop = entry.get(&Value::keyword("prop"))?.as_str()?;
        let val = match entry.get(&Value::keyword("val"))?.as_seq()? {
            [_, inner] => inner.clone(),
            _ => return None,
        };
        settings.insert(prop.trim_start_matches('-').into(), val);
    }
    Some(settings)
}
