use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserializes an optional UUID from a query string, treating the empty
/// string as absent.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        id: Option<Uuid>,
    }

    #[test]
    fn test_empty_string_is_none() {
        let w: Wrapper = serde_json::from_str(r#"{"id":""}"#).unwrap();
        assert!(w.id.is_none());
    }

    #[test]
    fn test_missing_field_is_none() {
        let w: Wrapper = serde_json::from_str(r#"{}"#).unwrap();
        assert!(w.id.is_none());
    }

    #[test]
    fn test_valid_uuid_parses() {
        let id = Uuid::new_v4();
        let w: Wrapper = serde_json::from_str(&format!(r#"{{"id":"{}"}}"#, id)).unwrap();
        assert_eq!(w.id, Some(id));
    }

    #[test]
    fn test_garbage_uuid_fails() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"id":"not-a-uuid"}"#).is_err());
    }
}
