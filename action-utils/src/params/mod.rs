//! Parameter maps shared by templates and URL generation
//!
//! [`Parameters`] is a thin wrapper around a JSON object. Templates receive it
//! as their rendering context; the router reads path variables and query
//! values from it.
//!
//! # Examples
//!
//! ```rust
//! use action_utils::params::Parameters;
//!
//! let params = Parameters::new()
//!     .with("slug", "hello-world")
//!     .with("page", 2);
//!
//! assert_eq!(params.len(), 2);
//! assert_eq!(params.get_str("slug"), Some("hello-world"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed map of JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    /// Create an empty parameter map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from any serializable value
    ///
    /// `null` yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            Value::Null => Ok(Self::new()),
            other => serde_json::from_value(other).map(Self),
        }
    }

    /// Add a parameter, builder style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a parameter, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a parameter value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a parameter as a string slice, if it is a JSON string
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Remove a parameter
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Whether the map contains `key`
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over key/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into the underlying JSON object
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_lookup() {
        let params = Parameters::new().with("id", 7).with("name", "alice");
        assert_eq!(params.get("id"), Some(&json!(7)));
        assert_eq!(params.get_str("name"), Some("alice"));
        assert!(params.get_str("id").is_none());
        assert!(!params.is_empty());
    }

    #[test]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct Post {
            id: u32,
            title: &'static str,
        }

        let params = Parameters::from_serialize(&Post { id: 3, title: "Hi" }).unwrap();
        assert_eq!(params.get("id"), Some(&json!(3)));
        assert_eq!(params.get_str("title"), Some("Hi"));
    }

    #[test]
    fn test_from_serialize_null_is_empty() {
        let params = Parameters::from_serialize(&Option::<u8>::None).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_from_serialize_rejects_non_objects() {
        assert!(Parameters::from_serialize(&[1, 2, 3]).is_err());
        assert!(Parameters::from_serialize("text").is_err());
    }

    #[test]
    fn test_serializes_transparently() {
        let params: Parameters = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({"a": 1, "b": 2}));
    }
}
