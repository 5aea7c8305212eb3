//! Semantic column types and the dtype table.
//!
//! A [`Dtype`] classifies what a column *means* (binary, nominal, ordinal or
//! numeric), which is distinct from how it is stored. The engine picks its
//! test from the dtype pair. The synthetic builder writes each dtype with a
//! fixed Arrow storage type, see [`Dtype::storage_type`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};

use crate::error::{EvidenceError, Result};

/// Semantic type tag of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    /// Two-valued column stored as 0/1 integers
    Binary,
    /// Unordered categories stored as string labels
    Nominal,
    /// Ordered categories stored as integers
    Ordinal,
    /// Continuous values
    Numeric,
}

impl Dtype {
    /// All dtypes in declaration order.
    pub const ALL: [Dtype; 4] = [Dtype::Binary, Dtype::Nominal, Dtype::Ordinal, Dtype::Numeric];

    /// Lowercase tag, also used as the auto-naming prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::Binary => "binary",
            Dtype::Nominal => "nominal",
            Dtype::Ordinal => "ordinal",
            Dtype::Numeric => "numeric",
        }
    }

    /// Arrow type the synthetic builder stores this dtype as.
    pub fn storage_type(&self) -> DataType {
        match self {
            Dtype::Binary | Dtype::Ordinal => DataType::Int64,
            Dtype::Nominal => DataType::Utf8,
            Dtype::Numeric => DataType::Float64,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dtype {
    type Err = EvidenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(Dtype::Binary),
            "nominal" => Ok(Dtype::Nominal),
            "ordinal" => Ok(Dtype::Ordinal),
            "numeric" => Ok(Dtype::Numeric),
            other => Err(EvidenceError::invalid_parameter(format!(
                "unknown dtype tag '{other}'"
            ))),
        }
    }
}

/// Mapping from column name to [`Dtype`].
///
/// Entries are inserted or overwritten, never removed. Iteration order is
/// by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DtypeTable {
    entries: BTreeMap<String, Dtype>,
}

impl DtypeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the dtype of a column.
    pub fn get(&self, column: &str) -> Option<Dtype> {
        self.entries.get(column).copied()
    }

    /// Looks up the dtype of a column, failing with
    /// [`EvidenceError::UnknownField`] when absent.
    pub fn require(&self, column: &str) -> Result<Dtype> {
        self.get(column)
            .ok_or_else(|| EvidenceError::unknown_field(column))
    }

    /// Sets the dtype of a column, returning the previous tag if any.
    pub fn set(&mut self, column: impl Into<String>, dtype: Dtype) -> Option<Dtype> {
        self.entries.insert(column.into(), dtype)
    }

    /// Returns true if the column has an entry.
    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(column, dtype)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Dtype)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Columns tagged with the given dtype.
    pub fn columns_of(&self, dtype: Dtype) -> Vec<&str> {
        self.iter()
            .filter(|(_, d)| *d == dtype)
            .map(|(c, _)| c)
            .collect()
    }

    /// Serializes the table as a JSON object of lowercase tags.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a table from a JSON object such as `{"age": "numeric"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<S: Into<String>> FromIterator<(S, Dtype)> for DtypeTable {
    fn from_iter<I: IntoIterator<Item = (S, Dtype)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<S: Into<String>> Extend<(S, Dtype)> for DtypeTable {
    fn extend<I: IntoIterator<Item = (S, Dtype)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.entries.insert(k.into(), v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_tags() {
        for dtype in Dtype::ALL {
            let parsed: Dtype = dtype.as_str().parse().unwrap();
            assert_eq!(parsed, dtype);
        }
        assert_eq!(" Numeric ".parse::<Dtype>().unwrap(), Dtype::Numeric);
        assert!("interval".parse::<Dtype>().is_err());
    }

    #[test]
    fn test_storage_types() {
        assert_eq!(Dtype::Binary.storage_type(), DataType::Int64);
        assert_eq!(Dtype::Nominal.storage_type(), DataType::Utf8);
        assert_eq!(Dtype::Ordinal.storage_type(), DataType::Int64);
        assert_eq!(Dtype::Numeric.storage_type(), DataType::Float64);
    }

    #[test]
    fn test_table_set_overwrites() {
        let mut table = DtypeTable::new();
        assert_eq!(table.set("x", Dtype::Binary), None);
        assert_eq!(table.set("x", Dtype::Numeric), Some(Dtype::Binary));
        assert_eq!(table.get("x"), Some(Dtype::Numeric));
        assert_eq!(table.len(), 1);
        assert!(table.require("y").is_err());
    }

    #[test]
    fn test_table_json() {
        let table: DtypeTable = [("age", Dtype::Numeric), ("group", Dtype::Nominal)]
            .into_iter()
            .collect();
        let json = table.to_json().unwrap();
        assert_eq!(json, r#"{"age":"numeric","group":"nominal"}"#);
        assert_eq!(DtypeTable::from_json(&json).unwrap(), table);
        assert!(DtypeTable::from_json(r#"{"age":"ratio"}"#).is_err());
    }

    #[test]
    fn test_columns_of() {
        let table: DtypeTable = [
            ("numeric_0", Dtype::Numeric),
            ("binary_0", Dtype::Binary),
            ("numeric_1", Dtype::Numeric),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.columns_of(Dtype::Numeric), vec!["numeric_0", "numeric_1"]);
        assert!(table.columns_of(Dtype::Ordinal).is_empty());
    }
}
