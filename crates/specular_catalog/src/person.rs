//! Person records with a regex-checked email address.

use specular_spec::{and_of, keys, preds, Keys, Registry, SpecResult};

pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,63}$";

pub const FIRST_NAME: &str = "person/first-name";
pub const LAST_NAME: &str = "person/last-name";
pub const EMAIL: &str = "person/email";
pub const PHONE: &str = "person/phone";
/// Qualified keys: `{:person/first-name ...}`.
pub const PERSON: &str = "person/person";
/// Unqualified keys: `{:first-name ...}`, the shape plain JSON produces.
pub const UNQ_PERSON: &str = "person/unq-person";

pub const SPECS: &[&str] = &[FIRST_NAME, LAST_NAME, EMAIL, PHONE, PERSON, UNQ_PERSON];

pub fn install(registry: &Registry) -> SpecResult<()> {
    registry.register(FIRST_NAME, preds::string());
    registry.register(LAST_NAME, preds::string());
    registry.register(EMAIL, and_of([preds::string(), preds::matches(EMAIL_PATTERN)?]));
    registry.register(PHONE, preds::string());
    registry.register(
        PERSON,
        keys(Keys::new().req(FIRST_NAME).req(LAST_NAME).req(EMAIL).opt(PHONE)),
    );
    registry.register(
        UNQ_PERSON,
        keys(
            Keys::new()
                .req_un(FIRST_NAME)
                .req_un(LAST_NAME)
                .req_un(EMAIL)
                .opt_un(PHONE),
        ),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specular_spec::Value;

    #[test]
    fn test_email_pattern() {
        let registry = Registry::new();
        install(&registry).unwrap();
        assert!(registry.valid(EMAIL, &"elon@example.com".into()).unwrap());
        assert!(!registry.valid(EMAIL, &"n/a".into()).unwrap());
        assert!(!registry.valid(EMAIL, &Value::Int(1)).unwrap());
    }

    #[test]
    fn test_unqualified_person() {
        let registry = Registry::new();
        install(&registry).unwrap();
        let person = Value::map([
            (Value::keyword("first-name"), "Elon".into()),
            (Value::keyword("last-name"), "Musk".into()),
            (Value::keyword("email"), "elon@example.com".into()),
            (Value::keyword("phone"), "555-1212".into()),
        ]);
        assert!(registry.valid(UNQ_PERSON, &person).unwrap());
        assert!(!registry.valid(PERSON, &person).unwrap());
    }
}
