//! Target schema identity.

use crate::newtype_string::define_identifier;

define_identifier! {
    /// Identity of one target schema, e.g. `app` or `app.public`.
    ///
    /// Every sequencing and ordering decision in the ledger is scoped to a
    /// single namespace; two namespaces never observe each other.
    pub struct Namespace, "namespace";
}

impl Namespace {
    /// Split `db.schema` into its parts; unqualified names have no schema.
    pub fn parts(&self) -> (&str, Option<&str>) {
        match self.as_str().split_once('.') {
            Some((db, schema)) => (db, Some(schema)),
            None => (self.as_str(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Namespace::parse("").is_err());
        assert!(Namespace::try_new("").is_none());
    }

    #[test]
    fn test_parse_rejects_padding() {
        let err = Namespace::parse(" app").unwrap_err();
        assert!(err.to_string().contains("surrounding whitespace"));
    }

    #[test]
    fn test_parts() {
        let ns = Namespace::parse("app.public").unwrap();
        assert_eq!(ns.parts(), ("app", Some("public")));
        let ns = Namespace::parse("app").unwrap();
        assert_eq!(ns.parts(), ("app", None));
    }

    #[test]
    fn test_borrow_lookup() {
        let mut map: HashMap<Namespace, i64> = HashMap::new();
        map.insert(Namespace::parse("app").unwrap(), 3);
        assert_eq!(map.get("app"), Some(&3));
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        let result: Result<Namespace, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());
        let ns: Namespace = serde_json::from_str(r#""app""#).unwrap();
        assert_eq!(ns, "app");
    }
}
