//! Building typed [`DataSet`]s from loosely typed cells.
//!
//! Rows are pushed as `(column, value)` pairs; columns are registered in first-seen order and
//! cells missing from a row become [`Value::Null`]. Column types are inferred when the table is
//! finished:
//!
//! - every non-null cell an integer → [`DataType::Int64`]
//! - only integers and floats, at least one float → [`DataType::Float64`] (integers widened)
//! - every non-null cell a boolean → [`DataType::Bool`]
//! - anything else (including all-null columns) → [`DataType::Utf8`], non-string cells rendered

use std::collections::HashMap;

use crate::types::{DataSet, DataType, Field, Schema, Value};

#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl TableBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a column without adding cells (keeps header-only columns).
    pub(crate) fn column(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub(crate) fn push_row(&mut self, cells: impl IntoIterator<Item = (String, Value)>) {
        let mut row: Vec<Value> = vec![Value::Null; self.columns.len()];
        for (name, value) in cells {
            let idx = self.column(&name);
            if idx >= row.len() {
                row.resize(idx + 1, Value::Null);
            }
            row[idx] = value;
        }
        self.rows.push(row);
    }

    pub(crate) fn finish(self) -> DataSet {
        let width = self.columns.len();
        let mut rows = self.rows;
        for row in &mut rows {
            row.resize(width, Value::Null);
        }

        let mut fields = Vec::with_capacity(width);
        for (idx, name) in self.columns.into_iter().enumerate() {
            let data_type = infer_column_type(rows.iter().map(|r| &r[idx]));
            for row in &mut rows {
                let cell = std::mem::replace(&mut row[idx], Value::Null);
                row[idx] = coerce(cell, &data_type);
            }
            fields.push(Field::new(name, data_type));
        }

        DataSet::new(Schema::new(fields), rows)
    }
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a Value>) -> DataType {
    let (mut ints, mut floats, mut bools, mut other) = (0usize, 0usize, 0usize, 0usize);
    for cell in cells {
        match cell {
            Value::Null => {}
            Value::Int64(_) => ints += 1,
            Value::Float64(_) => floats += 1,
            Value::Bool(_) => bools += 1,
            Value::Utf8(_) => other += 1,
        }
    }

    if other > 0 || ints + floats + bools == 0 {
        return DataType::Utf8;
    }
    match (ints + floats > 0, bools > 0) {
        (true, false) if floats > 0 => DataType::Float64,
        (true, false) => DataType::Int64,
        (false, true) => DataType::Bool,
        _ => DataType::Utf8,
    }
}

fn coerce(cell: Value, data_type: &DataType) -> Value {
    match (cell, data_type) {
        (Value::Null, _) => Value::Null,
        (Value::Int64(i), DataType::Float64) => Value::Float64(i as f64),
        (Value::Int64(i), DataType::Utf8) => Value::Utf8(i.to_string()),
        (Value::Float64(f), DataType::Utf8) => Value::Utf8(f.to_string()),
        (Value::Bool(b), DataType::Utf8) => Value::Utf8(b.to_string()),
        (cell, _) => cell,
    }
}
