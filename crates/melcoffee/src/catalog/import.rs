use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};
use std::io::Read;
use std::path::Path;

/// Reads catalog drafts from a spreadsheet export.
///
/// Expected headers: `name`, `description`, `price`, `tags`, `popularity`.
/// Only `name` is required. Tags are separated by `;` or `|`.
pub struct CatalogCsvImporter;

impl CatalogCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Map<String, Value>>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Map<String, Value>>, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut drafts = Vec::new();

        for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let row = record?;
            if row.name.trim().is_empty() {
                return Err(CatalogImportError::MissingName { row: index + 1 });
            }
            drafts.push(row.into_draft()?);
        }

        Ok(drafts)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(alias = "Name")]
    name: String,
    #[serde(default, alias = "Description", deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, alias = "Price", deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(default, alias = "Tags", deserialize_with = "empty_string_as_none")]
    tags: Option<String>,
    #[serde(default, alias = "Popularity", deserialize_with = "empty_string_as_none")]
    popularity: Option<String>,
}

impl CatalogRow {
    fn into_draft(self) -> Result<Map<String, Value>, CatalogImportError> {
        let mut draft = Map::new();
        draft.insert("name".to_string(), Value::String(self.name));
        if let Some(description) = self.description {
            draft.insert("description".to_string(), Value::String(description));
        }
        if let Some(price) = self.price {
            draft.insert("price".to_string(), Value::String(price));
        }

        let tags: Vec<Value> = self
            .tags
            .as_deref()
            .map(split_tags)
            .unwrap_or_default()
            .into_iter()
            .map(Value::String)
            .collect();
        draft.insert("tags".to_string(), Value::Array(tags));

        if let Some(raw) = self.popularity {
            let popularity = raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or(CatalogImportError::InvalidPopularity { value: raw })?;
            draft.insert("popularity".to_string(), Value::Number(popularity));
        }

        Ok(draft)
    }
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split([';', '|'])
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read catalog export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row} has no name")]
    MissingName { row: usize },
    #[error("popularity '{value}' is not a number")]
    InvalidPopularity { value: String },
}
