use std::io::{Seek, SeekFrom};

use rust_data_objectify::conversion::{FormatProber, probe_formats};
use rust_data_objectify::resource::{Locality, ResourceDescriptor};
use rust_data_objectify::{ConversionError, FormatTag};

fn text_resource(text: &str) -> ResourceDescriptor {
    ResourceDescriptor::from_text("./mem", Locality::Local, text)
}

fn fixture(name: &str) -> ResourceDescriptor {
    let bytes = std::fs::read(format!("tests/fixtures/{name}")).unwrap();
    ResourceDescriptor::from_bytes(format!("./tests/fixtures/{name}"), Locality::Local, bytes)
}

fn is_declaration_subsequence(formats: &[FormatTag]) -> bool {
    formats
        .windows(2)
        .all(|w| w[0].declaration_index() < w[1].declaration_index())
}

#[test]
fn fixtures_probe_as_their_own_format() {
    assert_eq!(probe_formats(&mut fixture("people.json")).unwrap(), vec![FormatTag::Json]);
    assert_eq!(probe_formats(&mut fixture("people.csv")).unwrap(), vec![FormatTag::Csv]);
    assert_eq!(probe_formats(&mut fixture("people.tsv")).unwrap(), vec![FormatTag::Tsv]);
    assert_eq!(probe_formats(&mut fixture("people.xml")).unwrap(), vec![FormatTag::Xml]);
}

#[test]
fn structured_object_text_probes_as_json() {
    let formats = probe_formats(&mut text_resource(r#"{"a": [1,2,3]}"#)).unwrap();
    assert!(formats.contains(&FormatTag::Json));
}

#[test]
fn ambiguous_content_keeps_declaration_order() {
    // Valid JSON whose two lines also split into two comma-separated fields each.
    let text = "[1,2\n,3]";
    let report = FormatProber::default().probe(&mut text_resource(text));
    let order: Vec<FormatTag> = report.outcomes.iter().map(|o| o.format).collect();
    assert_eq!(order, FormatTag::ALL.to_vec());
    assert_eq!(report.admissible(), vec![FormatTag::Json, FormatTag::Csv]);
    assert!(is_declaration_subsequence(&report.admissible()));
}

#[test]
fn csv_lookalike_numbers_are_not_json() {
    let formats = probe_formats(&mut text_resource("1,2\n3,4\n")).unwrap();
    assert_eq!(formats, vec![FormatTag::Csv]);
    assert!(is_declaration_subsequence(&formats));
}

#[test]
fn single_column_text_never_probes_as_delimited() {
    let report = FormatProber::default().probe(&mut fixture("single_column.csv"));
    let admissible = report.admissible();
    assert!(!admissible.contains(&FormatTag::Csv));
    assert!(!admissible.contains(&FormatTag::Tsv));
    assert!(report.rejection(FormatTag::Csv).is_some());
}

#[test]
fn markup_without_leading_delimiter_is_not_xml() {
    let report = FormatProber::default().probe(&mut text_resource("note <b>bold</b> text"));
    assert!(!report.admissible().contains(&FormatTag::Xml));
    let reason = report.rejection(FormatTag::Xml).unwrap().to_string();
    assert!(reason.contains("does not start with '<'"));
}

#[test]
fn unmatched_content_is_unsupported_format() {
    let err = probe_formats(&mut fixture("prose.txt")).unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("prose.txt"));
}

#[test]
fn probing_leaves_the_stream_at_the_start() {
    let path = "tests/fixtures/people.csv";
    let file = std::fs::File::open(path).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    let mut resource = ResourceDescriptor::new(
        format!("./{path}"),
        Locality::Local,
        Some(text.clone()),
        Some(Box::new(file)),
    );

    FormatProber::default().probe(&mut resource);
    assert!(resource.has_stream());
    assert_eq!(resource.read_bytes().unwrap(), text.into_bytes());
}

#[test]
fn probes_read_from_the_start_whatever_the_stream_position() {
    let path = "tests/fixtures/people.tsv";
    let mut file = std::fs::File::open(path).unwrap();
    file.seek(SeekFrom::End(0)).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    let mut resource = ResourceDescriptor::new(format!("./{path}"), Locality::Local, Some(text), Some(Box::new(file)));

    let prober = FormatProber::default();
    assert!(prober.probe_one(&mut resource, FormatTag::Tsv).is_ok());
    assert!(prober.probe_one(&mut resource, FormatTag::Csv).is_err());
    assert!(prober.probe_one(&mut resource, FormatTag::Tsv).is_ok());
}
