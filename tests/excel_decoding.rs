#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_data_objectify::conversion::{FormatProber, probe_formats};
use rust_data_objectify::decode::SheetSelection;
use rust_data_objectify::decode::excel::{decode_spreadsheet_table, spreadsheet_to_table};
use rust_data_objectify::resource::{Locality, ResourceDescriptor};
use rust_data_objectify::types::{DataType, Value};
use rust_data_objectify::{ConversionOptions, Converter, FormatTag, RepresentationTag, convert_from_location};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rust-data-objectify-{name}-{nanos}.xlsx"))
}

fn write_people_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Sheet1").unwrap();

    ws.write_string(0, 0, "id").unwrap();
    ws.write_string(0, 1, "name").unwrap();
    ws.write_string(0, 2, "score").unwrap();
    ws.write_string(0, 3, "active").unwrap();

    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, "Ada").unwrap();
    ws.write_number(1, 2, 98.5).unwrap();
    ws.write_boolean(1, 3, true).unwrap();

    ws.write_number(2, 0, 2).unwrap();
    ws.write_string(2, 1, "Grace").unwrap();
    ws.write_number(2, 2, 87.25).unwrap();
    ws.write_boolean(2, 3, false).unwrap();

    wb.save(path).unwrap();
}

fn write_two_sheet_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    let ws1 = wb.add_worksheet();
    ws1.set_name("Sheet1").unwrap();
    ws1.write_string(0, 0, "id").unwrap();
    ws1.write_string(0, 1, "name").unwrap();
    ws1.write_number(1, 0, 1).unwrap();
    ws1.write_string(1, 1, "Ada").unwrap();

    // Header starts one row down and misses the `name` column.
    let ws2 = wb.add_worksheet();
    ws2.set_name("Sheet2").unwrap();
    ws2.write_string(1, 0, "id").unwrap();
    ws2.write_string(1, 1, "team").unwrap();
    ws2.write_number(2, 0, 2).unwrap();
    ws2.write_string(2, 1, "engines").unwrap();

    wb.save(path).unwrap();
}

fn file_resource(path: &PathBuf) -> ResourceDescriptor {
    let bytes = std::fs::read(path).unwrap();
    ResourceDescriptor::from_bytes(path.display().to_string(), Locality::Local, bytes)
}

#[test]
fn workbook_decodes_into_typed_table() {
    let path = tmp_file("people");
    write_people_xlsx(&path);

    let out = decode_spreadsheet_table(&mut file_resource(&path), &SheetSelection::First).unwrap();
    let ds = out.as_table().unwrap();
    assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), vec!["id", "name", "score", "active"]);
    let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type.clone()).collect();
    assert_eq!(
        types,
        vec![DataType::Int64, DataType::Utf8, DataType::Float64, DataType::Bool]
    );
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[1][1], Value::Utf8("Grace".to_string()));
    assert_eq!(ds.rows[0][2], Value::Float64(98.5));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn workbook_probes_as_spreadsheet_only() {
    let path = tmp_file("probe");
    write_people_xlsx(&path);

    let formats = probe_formats(&mut file_resource(&path)).unwrap();
    assert_eq!(formats, vec![FormatTag::Spreadsheet]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_sheet_rejects_the_probe() {
    let path = tmp_file("missing-sheet");
    write_people_xlsx(&path);

    let prober = FormatProber::new(SheetSelection::Sheet("Nope".to_string()));
    assert!(prober.probe_one(&mut file_resource(&path), FormatTag::Spreadsheet).is_err());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn all_sheets_concatenate_by_header_name() {
    let path = tmp_file("two-sheets");
    write_two_sheet_xlsx(&path);

    let ds = spreadsheet_to_table(&mut file_resource(&path), &SheetSelection::AllSheets).unwrap();
    assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), vec!["id", "name", "team"]);
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0][0], Value::Int64(1));
    assert_eq!(ds.rows[0][2], Value::Null);
    assert_eq!(ds.rows[1][1], Value::Null);
    assert_eq!(ds.rows[1][2], Value::Utf8("engines".to_string()));

    let second = spreadsheet_to_table(
        &mut file_resource(&path),
        &SheetSelection::Sheets(vec!["Sheet2".to_string()]),
    )
    .unwrap();
    assert_eq!(second.schema.field_names().collect::<Vec<_>>(), vec!["id", "team"]);
    assert_eq!(second.row_count(), 1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn workbook_converts_from_location() {
    let path = tmp_file("convert");
    write_people_xlsx(&path);
    let location = path.to_str().unwrap();

    let out = convert_from_location(location, None).unwrap();
    assert_eq!(out.tag(), RepresentationTag::Table);
    assert_eq!(out.len(), 2);

    let converter = Converter::new(ConversionOptions {
        sheet_selection: SheetSelection::Sheet("Sheet1".to_string()),
        ..Default::default()
    });
    let outcome = converter.convert_detailed(location, Some(RepresentationTag::Table)).unwrap();
    assert_eq!(outcome.candidate.format, FormatTag::Spreadsheet);
    assert_eq!(outcome.attempts, 1);

    let err = converter.convert_as(location, Some(RepresentationTag::Sequence)).unwrap_err();
    assert!(matches!(
        err,
        rust_data_objectify::ConversionError::UnsupportedRepresentation { .. }
    ));

    let _ = std::fs::remove_file(&path);
}
