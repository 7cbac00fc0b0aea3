#![cfg(feature = "excel")]

//! Spreadsheet decoding (`.xlsx`, `.xls`, `.xlsb`, `.ods`).
//!
//! Workbooks are read from the resource stream when one is held, and re-read by location
//! otherwise. There is no cheap structural pre-check, so probing performs the full decode.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};

use crate::error::{DecodeError, DecodeResult};
use crate::resource::{Locality, ResourceDescriptor, local_path};
use crate::types::{DataSet, Representation, Value};

use super::SheetSelection;
use super::table::TableBuilder;

/// Admissible iff the workbook opens and the selected sheets read without error.
pub fn probe_spreadsheet(
    resource: &mut ResourceDescriptor,
    selection: &SheetSelection,
) -> DecodeResult<()> {
    spreadsheet_to_table(resource, selection).map(|_| ())
}

/// Decode into [`Representation::Table`].
pub fn decode_spreadsheet_table(
    resource: &mut ResourceDescriptor,
    selection: &SheetSelection,
) -> DecodeResult<Representation> {
    spreadsheet_to_table(resource, selection).map(Representation::Table)
}

/// Read the selected sheets into one table.
///
/// On each sheet the first non-empty row is the header; later rows become table rows. With
/// several sheets, rows are concatenated in sheet order and columns are matched by header name.
pub fn spreadsheet_to_table(
    resource: &mut ResourceDescriptor,
    selection: &SheetSelection,
) -> DecodeResult<DataSet> {
    let mut workbook = open_workbook(resource)?;

    let sheets: Vec<String> = match selection {
        SheetSelection::First => workbook.sheet_names().into_iter().take(1).collect(),
        SheetSelection::Sheet(name) => vec![name.clone()],
        SheetSelection::AllSheets => workbook.sheet_names(),
        SheetSelection::Sheets(names) => names.clone(),
    };
    if sheets.is_empty() {
        return Err(DecodeError::shape("workbook has no sheets"));
    }

    let mut builder = TableBuilder::new();
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        append_sheet(&mut builder, &sheet, &range)?;
    }
    Ok(builder.finish())
}

fn open_workbook(resource: &mut ResourceDescriptor) -> DecodeResult<Sheets<Cursor<Vec<u8>>>> {
    let bytes = if resource.has_stream() {
        resource.read_bytes()?
    } else if resource.locality() == Locality::Local {
        std::fs::read(local_path(resource.location()))?
    } else {
        return Err(DecodeError::shape(
            "remote workbook has no buffered content to read",
        ));
    };
    Ok(open_workbook_auto_from_rs(Cursor::new(bytes))?)
}

fn append_sheet(builder: &mut TableBuilder, sheet: &str, range: &Range<Data>) -> DecodeResult<()> {
    let mut rows = range.rows();
    let header_cells: Vec<String> = rows
        .by_ref()
        .find(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, c)| header_name(idx, c))
                .collect()
        })
        .ok_or_else(|| {
            DecodeError::shape(format!(
                "sheet '{sheet}' has no non-empty rows (no header row found)"
            ))
        })?;

    for name in &header_cells {
        builder.column(name);
    }

    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        builder.push_row(
            header_cells
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.clone(), cell_value(cell))),
        );
    }
    Ok(())
}

fn header_name(idx: usize, c: &Data) -> String {
    let name = cell_to_header_string(c);
    let name = name.trim();
    if name.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        name.to_string()
    }
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}

/// Typed cell value before column inference; integral floats count as integers.
fn cell_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::Int64(*f as i64),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(cell_to_header_string(other)),
    }
}
