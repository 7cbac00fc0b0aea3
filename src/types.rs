//! Core data model types.
//!
//! A resource is classified into a [`FormatTag`] and converted into a [`Representation`], whose
//! shape is named by a [`RepresentationTag`]. Tabular output uses [`DataSet`], a list of typed
//! [`Field`]s plus row-major [`Value`]s.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConversionError;

/// Structured-data formats the prober knows about.
///
/// Declaration order is significant: it is the tie-break priority used when planning
/// conversions for content that probes as more than one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    /// JSON document text.
    Json,
    /// Comma-separated values with a header row.
    Csv,
    /// Tab-separated values with a header row.
    Tsv,
    /// XML markup.
    Xml,
    /// Spreadsheet workbook (`.xlsx`, `.xls`, `.ods`, ...).
    Spreadsheet,
}

impl FormatTag {
    /// Every format, in declaration order.
    pub const ALL: [FormatTag; 5] = [
        FormatTag::Json,
        FormatTag::Csv,
        FormatTag::Tsv,
        FormatTag::Xml,
        FormatTag::Spreadsheet,
    ];

    /// Position of this format in [`FormatTag::ALL`].
    pub fn declaration_index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatTag::Json => "json",
            FormatTag::Csv => "csv",
            FormatTag::Tsv => "tsv",
            FormatTag::Xml => "xml",
            FormatTag::Spreadsheet => "spreadsheet",
        };
        f.write_str(name)
    }
}

/// Output shapes a resource can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepresentationTag {
    /// Key → value mapping with unique keys.
    Mapping,
    /// Ordered list of records.
    Sequence,
    /// Typed table with named columns.
    Table,
}

impl RepresentationTag {
    /// Every representation, in declaration order.
    pub const ALL: [RepresentationTag; 3] = [
        RepresentationTag::Mapping,
        RepresentationTag::Sequence,
        RepresentationTag::Table,
    ];
}

impl fmt::Display for RepresentationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepresentationTag::Mapping => "mapping",
            RepresentationTag::Sequence => "sequence",
            RepresentationTag::Table => "table",
        };
        f.write_str(name)
    }
}

impl FromStr for RepresentationTag {
    type Err = ConversionError;

    /// Parse a representation selector (case-insensitive).
    ///
    /// Accepts the canonical names plus the common aliases `dict`/`map`, `list`/`records` and
    /// `dataframe`/`frame`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapping" | "map" | "dict" => Ok(Self::Mapping),
            "sequence" | "list" | "records" => Ok(Self::Sequence),
            "table" | "dataframe" | "frame" => Ok(Self::Table),
            _ => Err(ConversionError::UnsupportedOutputType {
                requested: s.to_string(),
            }),
        }
    }
}

/// A decoded resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Representation {
    /// Key → value mapping; insertion order is preserved.
    Mapping(serde_json::Map<String, serde_json::Value>),
    /// Ordered records.
    Sequence(Vec<serde_json::Value>),
    /// Typed table.
    Table(DataSet),
}

impl Representation {
    /// The tag describing this value's shape.
    pub fn tag(&self) -> RepresentationTag {
        match self {
            Representation::Mapping(_) => RepresentationTag::Mapping,
            Representation::Sequence(_) => RepresentationTag::Sequence,
            Representation::Table(_) => RepresentationTag::Table,
        }
    }

    /// Number of top-level entries (keys, records or rows).
    pub fn len(&self) -> usize {
        match self {
            Representation::Mapping(m) => m.len(),
            Representation::Sequence(s) => s.len(),
            Representation::Table(t) => t.row_count(),
        }
    }

    /// Returns `true` when [`Self::len`] is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            Representation::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[serde_json::Value]> {
        match self {
            Representation::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&DataSet> {
        match self {
            Representation::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// Logical data type for a table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Column data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of columns describing a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed cell in a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate the cells of one column by name, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null)))
    }
}
