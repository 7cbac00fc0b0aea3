use rust_data_objectify::decode::json::{
    decode_json_mapping, decode_json_sequence, decode_json_table, json_to_table, probe_json,
};
use rust_data_objectify::resource::{Locality, ResourceDescriptor};
use rust_data_objectify::types::{DataType, Representation, Value};
use serde_json::json;

fn resource(text: &str) -> ResourceDescriptor {
    ResourceDescriptor::from_text("mem://test.json", Locality::RemoteStatic, text)
}

#[test]
fn probe_json_accepts_documents_and_rejects_garbage() {
    assert!(probe_json(&resource(r#"{"a": [1, 2, 3]}"#)).is_ok());
    assert!(probe_json(&resource("[1, 2, 3]")).is_ok());
    assert!(probe_json(&resource("a,b\n1,2\n")).is_err());
    assert!(probe_json(&resource("")).is_err());
}

#[test]
fn mapping_returns_objects_unchanged() {
    let out = decode_json_mapping(&mut resource(r#"{"a": [1, 2, 3]}"#)).unwrap();
    assert_eq!(out, Representation::Mapping(json!({"a": [1, 2, 3]}).as_object().unwrap().clone()));
}

#[test]
fn mapping_wraps_top_level_array_under_data_key() {
    let out = decode_json_mapping(&mut resource(r#"[{"id": 1}, {"id": 2}]"#)).unwrap();
    let map = out.as_mapping().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["data"], json!([{"id": 1}, {"id": 2}]));
}

#[test]
fn sequence_wraps_top_level_object_in_a_list() {
    let out = decode_json_sequence(&mut resource(r#"{"a": [1, 2, 3]}"#)).unwrap();
    assert_eq!(out, Representation::Sequence(vec![json!({"a": [1, 2, 3]})]));
}

#[test]
fn scalars_have_no_mapping_or_sequence_shape() {
    let err = decode_json_mapping(&mut resource("42")).unwrap_err();
    assert!(err.to_string().contains("shape mismatch"));
    assert!(decode_json_sequence(&mut resource("\"text\"")).is_err());
}

#[test]
fn table_flattens_nested_objects_into_dot_paths() {
    let input = r#"[
        {"id": 1, "user": {"name": "Ada", "meta": {"lang": "en"}}, "score": 98.5, "active": true},
        {"id": 2, "user": {"name": "Grace"}, "score": 87, "active": false, "extra": "x"}
    ]"#;
    let out = decode_json_table(&mut resource(input)).unwrap();
    let ds = out.as_table().unwrap();

    let names: Vec<&str> = ds.schema.field_names().collect();
    assert_eq!(names, vec!["id", "user.name", "user.meta.lang", "score", "active", "extra"]);
    assert_eq!(ds.row_count(), 2);

    assert_eq!(ds.schema.fields[0].data_type, DataType::Int64);
    assert_eq!(ds.schema.fields[3].data_type, DataType::Float64);
    assert_eq!(ds.schema.fields[4].data_type, DataType::Bool);

    // Integer scores are widened because the column also holds a float.
    assert_eq!(ds.rows[1][3], Value::Float64(87.0));
    // Cells missing from a row are null.
    assert_eq!(ds.rows[1][2], Value::Null);
    assert_eq!(ds.rows[0][5], Value::Null);
    assert_eq!(ds.rows[1][5], Value::Utf8("x".to_string()));
}

#[test]
fn table_keeps_nested_arrays_as_json_text() {
    let ds = json_to_table(&json!({"a": [1, 2, 3]})).unwrap();
    assert_eq!(ds.row_count(), 1);
    assert_eq!(ds.schema.fields[0].name, "a");
    assert_eq!(ds.rows[0][0], Value::Utf8("[1,2,3]".to_string()));
}

#[test]
fn table_mixed_column_falls_back_to_strings() {
    let ds = json_to_table(&json!([{"v": 1}, {"v": "two"}, {"v": true}, {"v": null}])).unwrap();
    assert_eq!(ds.schema.fields[0].data_type, DataType::Utf8);
    assert_eq!(
        ds.column("v").unwrap().cloned().collect::<Vec<_>>(),
        vec![
            Value::Utf8("1".to_string()),
            Value::Utf8("two".to_string()),
            Value::Utf8("true".to_string()),
            Value::Null,
        ]
    );
}

#[test]
fn table_rejects_arrays_of_non_objects() {
    let err = decode_json_table(&mut resource("[1, 2, 3]")).unwrap_err();
    assert!(err.to_string().contains("row 1 is not a json object"));
}

#[test]
fn decoders_need_text() {
    let mut binary = ResourceDescriptor::from_bytes(
        "mem://blob",
        Locality::RemoteStatic,
        vec![0xff, 0xfe, 0x00, 0x01],
    );
    assert!(binary.text().is_none());
    let err = decode_json_mapping(&mut binary).unwrap_err();
    assert!(err.to_string().contains("not text"));
}

#[test]
fn table_rejects_keys_that_collide_with_dot_paths() {
    let err = json_to_table(&json!({"a.b": 1, "a": {"b": "x"}})).unwrap_err();
    assert!(err.to_string().contains("column 'a.b' is produced by more than one key"));

    // The same record still has mapping and sequence shapes.
    let input = r#"{"a.b": 1, "a": {"b": "x"}}"#;
    let mapping = decode_json_mapping(&mut resource(input)).unwrap();
    assert_eq!(mapping.as_mapping().unwrap()["a.b"], json!(1));
    assert!(decode_json_table(&mut resource(input)).is_err());
}
