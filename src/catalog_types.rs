use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub type DestinationMap = HashMap<String, Destination>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Active,
    #[default]
    Draft,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Active => "active",
            PackageStatus::Draft => "draft",
        }
    }

    /// Anything that is not "active" is kept out of the storefront.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("active") {
            PackageStatus::Active
        } else {
            PackageStatus::Draft
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    pub id: String,
    pub title: String,
    /// Raw destination id, resolved through a `DestinationMap` for display.
    pub destination: String,
    pub price: f64,
    pub rating: f64,
    pub duration: u32,
    pub status: PackageStatus,
    pub categories: BTreeSet<String>,
    pub image: Option<String>,
}

impl Package {
    /// Builds a package from one backend record, tolerating the loose typing
    /// the admin forms produce (numeric strings, string-or-array labels,
    /// populated destination objects).
    pub fn from_json(record: &Value) -> Self {
        let mut categories = BTreeSet::new();
        for key in ["category", "categories", "tags"] {
            if let Some(labels) = record.get(key) {
                categories.extend(normalize_labels(labels));
            }
        }

        let image = record
            .get("image")
            .or_else(|| record.get("coverImage"))
            .and_then(first_string);

        Self {
            id: id_of(record),
            title: string_field(record, "title"),
            destination: destination_ref(record.get("destination")),
            price: number_field(record, "price"),
            rating: number_field(record, "rating"),
            duration: number_field(record, "duration").max(0.0) as u32,
            status: PackageStatus::from_label(&string_field(record, "status")),
            categories,
            image,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PackageStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub id: String,
    pub place: String,
    pub state: String,
    pub country: String,
    pub tags: Vec<String>,
}

impl Destination {
    pub fn from_json(record: &Value) -> Self {
        Self {
            id: id_of(record),
            place: string_field(record, "place"),
            state: string_field(record, "state"),
            country: string_field(record, "country"),
            tags: record
                .get("tags")
                .map(|tags| normalize_labels(tags).into_iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn display_name(&self) -> String {
        [self.place.trim(), self.country.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Converts a string, comma-separated string or array of strings into the
/// canonical lowercase label set.
pub fn normalize_labels(value: &Value) -> BTreeSet<String> {
    match value {
        Value::String(s) => split_labels(s),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split_labels)
            .collect(),
        _ => BTreeSet::new(),
    }
}

pub fn split_labels(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect()
}

fn id_of(record: &Value) -> String {
    record
        .get("_id")
        .or_else(|| record.get("id"))
        .map(scalar_to_string)
        .unwrap_or_default()
}

fn destination_ref(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(_)) => value.map(id_of).unwrap_or_default(),
        Some(other) => scalar_to_string(other),
        None => String::new(),
    }
}

fn string_field(record: &Value, key: &str) -> String {
    record.get(key).map(scalar_to_string).unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

/// Missing or non-numeric values count as zero.
fn number_field(record: &Value, key: &str) -> f64 {
    let parsed = match record.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}
