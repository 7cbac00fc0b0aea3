//! Delimited text (CSV / TSV) probing and decoding.

use std::io::Read;

use serde_json::{Map, Value as JsonValue};

use crate::error::{DecodeError, DecodeResult};
use crate::resource::ResourceDescriptor;
use crate::types::Representation;

pub const COMMA: u8 = b',';
pub const TAB: u8 = b'\t';

pub fn probe_csv(resource: &mut ResourceDescriptor) -> DecodeResult<()> {
    resource.read_content(|r| probe_delimited(r, COMMA))
}

pub fn probe_tsv(resource: &mut ResourceDescriptor) -> DecodeResult<()> {
    resource.read_content(|r| probe_delimited(r, TAB))
}

pub fn decode_csv_sequence(resource: &mut ResourceDescriptor) -> DecodeResult<Representation> {
    resource
        .read_content(|r| delimited_to_records(r, COMMA))
        .map(Representation::Sequence)
}

pub fn decode_tsv_sequence(resource: &mut ResourceDescriptor) -> DecodeResult<Representation> {
    resource
        .read_content(|r| delimited_to_records(r, TAB))
        .map(Representation::Sequence)
}

/// Admissible iff every record (header included) has the same field count, that count is
/// greater than one, and at least one data record follows the header.
///
/// Single-column text is rejected: it cannot be told apart from prose.
pub fn probe_delimited<R: Read>(input: R, delimiter: u8) -> DecodeResult<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(input);

    let mut width: Option<usize> = None;
    let mut records = 0usize;
    for result in rdr.records() {
        let record = result?;
        records += 1;
        match width {
            None => width = Some(record.len()),
            Some(w) if w != record.len() => {
                return Err(DecodeError::shape(format!(
                    "record {records} has {} fields, expected {w}",
                    record.len()
                )));
            }
            Some(_) => {}
        }
    }

    match width {
        None => Err(DecodeError::shape("no records")),
        Some(w) if w < 2 => Err(DecodeError::shape("single-column text is not delimited data")),
        Some(_) if records < 2 => Err(DecodeError::shape("header without data records")),
        Some(_) => Ok(()),
    }
}

/// Decode delimited text with a header row into records keyed by header name.
///
/// Values are kept as strings; every record must have as many fields as the header.
pub fn delimited_to_records<R: Read>(input: R, delimiter: u8) -> DecodeResult<Vec<JsonValue>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(input);
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut obj = Map::with_capacity(headers.len());
        for (name, raw) in headers.iter().zip(record.iter()) {
            obj.insert(name.to_string(), JsonValue::String(raw.to_string()));
        }
        records.push(JsonValue::Object(obj));
    }
    Ok(records)
}
