//! Required-field validation

use crate::error::{Error, Result};
use crate::value::PropertyMap;

/// Check `candidate` against a set of required fields
///
/// A field is missing when absent, null, or an empty string. The error names
/// every missing field in the order the required set yields them.
pub fn validate<'a, I>(candidate: &PropertyMap, required: I) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let missing: Vec<String> = required
        .into_iter()
        .filter(|field| candidate.get(*field).map_or(true, |v| v.is_blank()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingFields(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::collections::BTreeSet;

    fn required(fields: &[&str]) -> BTreeSet<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_all_present() {
        let mut obj = PropertyMap::new();
        obj.insert("name".into(), Value::from("Ada"));
        obj.insert("age".into(), Value::from(0));
        assert!(validate(&obj, &required(&["name", "age"])).is_ok());
    }

    #[test]
    fn test_reports_every_missing_field() {
        let mut obj = PropertyMap::new();
        obj.insert("name".into(), Value::from(""));
        obj.insert("email".into(), Value::Null);
        obj.insert("city".into(), Value::from("Oslo"));

        let err = validate(&obj, &required(&["name", "email", "phone", "city"])).unwrap_err();
        assert_eq!(
            err.missing_fields().unwrap(),
            &["email".to_string(), "name".to_string(), "phone".to_string()]
        );
    }

    #[test]
    fn test_empty_requirement_set() {
        assert!(validate(&PropertyMap::new(), &BTreeSet::new()).is_ok());
    }
}
