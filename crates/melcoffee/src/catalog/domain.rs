use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier wrapper for catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoffeeId(pub u64);

impl fmt::Display for CoffeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single drink on the menu.
///
/// Only `tags` and `popularity` feed the recommendation engine. Every other
/// field (name, description, price, anything an operator adds) is carried in
/// `details` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: CoffeeId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CatalogItem {
    pub fn new(id: CoffeeId) -> Self {
        Self {
            id,
            tags: Vec::new(),
            popularity: None,
            details: Map::new(),
        }
    }

    /// Build an item from an operator supplied JSON object. Any `id` in the
    /// object is replaced by `id`.
    pub fn from_object(id: CoffeeId, mut object: Map<String, Value>) -> serde_json::Result<Self> {
        object.insert("id".to_string(), Value::from(id.0));
        serde_json::from_value(Value::Object(object))
    }

    /// Shallow-merge `patch` over this item, keeping the identifier.
    pub fn merged(&self, patch: Map<String, Value>) -> serde_json::Result<Self> {
        let mut object = match serde_json::to_value(self)? {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        for (key, value) in patch {
            if key != "id" {
                object.insert(key, value);
            }
        }
        Self::from_object(self.id, object)
    }

    pub fn name(&self) -> Option<&str> {
        self.details.get("name").and_then(Value::as_str)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.details
            .insert("name".to_string(), Value::String(name.into()));
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    /// Tags lowercased and deduplicated for membership tests.
    pub fn normalized_tags(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .map(|tag| tag.to_lowercase())
            .collect()
    }

    /// Popularity with absent or negative values read as zero.
    pub fn popularity_or_zero(&self) -> f64 {
        self.popularity
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
            .max(0.0)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
