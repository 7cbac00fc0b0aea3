use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rust_data_objectify::conversion::{ConversionCandidate, execute};
use rust_data_objectify::decode::{DecoderRegistry, SheetSelection};
use rust_data_objectify::resource::{Locality, ResourceDescriptor};
use rust_data_objectify::{ConversionError, DecodeError, FormatTag, Representation, RepresentationTag};
use serde_json::json;

fn resource(text: &str) -> ResourceDescriptor {
    ResourceDescriptor::from_text("./mem", Locality::Local, text)
}

fn candidate(format: FormatTag, representation: RepresentationTag) -> ConversionCandidate {
    ConversionCandidate::new(format, representation)
}

#[test]
fn first_successful_candidate_wins() {
    let registry = DecoderRegistry::standard(SheetSelection::default());
    let candidates = [
        candidate(FormatTag::Json, RepresentationTag::Mapping),
        candidate(FormatTag::Json, RepresentationTag::Sequence),
    ];
    let outcome = execute(&registry, &mut resource(r#"{"a": [1,2,3]}"#), &candidates).unwrap();
    assert_eq!(outcome.candidate, candidates[0]);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.value.as_mapping().unwrap()["a"], json!([1, 2, 3]));
}

#[test]
fn failed_decodes_fall_through_to_later_candidates() {
    // Neither the json nor the xml decoder accepts delimited text; the csv decoder does.
    let registry = DecoderRegistry::standard(SheetSelection::default());
    let candidates = [
        candidate(FormatTag::Json, RepresentationTag::Table),
        candidate(FormatTag::Xml, RepresentationTag::Mapping),
        candidate(FormatTag::Csv, RepresentationTag::Sequence),
    ];
    let outcome = execute(&registry, &mut resource("a,b\n1,2\n"), &candidates).unwrap();
    assert_eq!(outcome.candidate.format, FormatTag::Csv);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.value, Representation::Sequence(vec![json!({"a": "1", "b": "2"})]));
}

#[test]
fn every_candidate_failing_is_no_viable_conversion() {
    let registry = DecoderRegistry::standard(SheetSelection::default());
    let candidates = [
        candidate(FormatTag::Json, RepresentationTag::Table),
        candidate(FormatTag::Json, RepresentationTag::Mapping),
    ];
    let err = execute(&registry, &mut resource("[1, 2, 3]"), &candidates[..1]).unwrap_err();
    match err {
        ConversionError::NoViableConversion { attempted, .. } => assert_eq!(attempted, 1),
        other => panic!("unexpected error: {other}"),
    }

    // The same content converts once a compatible candidate is added.
    let outcome = execute(&registry, &mut resource("[1, 2, 3]"), &candidates).unwrap();
    assert_eq!(outcome.value.as_mapping().unwrap()["data"], json!([1, 2, 3]));
}

#[test]
fn missing_decoder_counts_as_a_failed_candidate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mut registry = DecoderRegistry::new();
    registry.register(
        FormatTag::Csv,
        RepresentationTag::Sequence,
        move |_: &mut ResourceDescriptor| -> Result<Representation, DecodeError> {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Representation::Sequence(Vec::new()))
        },
    );

    let candidates = [
        candidate(FormatTag::Json, RepresentationTag::Mapping),
        candidate(FormatTag::Csv, RepresentationTag::Sequence),
    ];
    let outcome = execute(&registry, &mut resource("a,b\n1,2\n"), &candidates).unwrap();
    assert_eq!(outcome.attempts, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn registered_decoders_override_builtins() {
    let mut registry = DecoderRegistry::standard(SheetSelection::default());
    registry.register(
        FormatTag::Json,
        RepresentationTag::Mapping,
        |_: &mut ResourceDescriptor| -> Result<Representation, DecodeError> {
            Err(DecodeError::Shape {
                message: "always fails".to_string(),
            })
        },
    );
    assert!(registry.contains(FormatTag::Json, RepresentationTag::Mapping));

    let candidates = [
        candidate(FormatTag::Json, RepresentationTag::Mapping),
        candidate(FormatTag::Json, RepresentationTag::Sequence),
    ];
    let outcome = execute(&registry, &mut resource(r#"{"k": "v"}"#), &candidates).unwrap();
    assert_eq!(outcome.candidate.representation, RepresentationTag::Sequence);
    assert_eq!(outcome.value, Representation::Sequence(vec![json!({"k": "v"})]));
}

#[test]
fn empty_plan_is_no_viable_conversion() {
    let registry = DecoderRegistry::standard(SheetSelection::default());
    let err = execute(&registry, &mut resource("{}"), &[]).unwrap_err();
    assert!(matches!(err, ConversionError::NoViableConversion { attempted: 0, .. }));
}
