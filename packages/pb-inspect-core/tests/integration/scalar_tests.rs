//! Scalar rendering and field presence.

use ntest::timeout;

use pb_inspect_core::error::PrintError;
use pb_inspect_core::schema::{FieldSpec, MessageSpec, Schema, SchemaBuilder, ValueKind};
use pb_inspect_core::{pretty_print, Instance};

use super::helpers::{data_cell, render, size_cell, zeroed_record};

fn person_schema() -> Schema {
    SchemaBuilder::new()
        .message(
            MessageSpec::new("Person")
                .field(FieldSpec::required("id", 1, ValueKind::Uvarint, 4))
                .field(FieldSpec::optional("name", 2, ValueKind::String, 16).with_has_flag()),
        )
        .build()
        .unwrap()
}

#[timeout(1000)]
#[test]
fn test_required_and_flagged_optional() {
    let schema = person_schema();
    let (mut memory, base) = zeroed_record(&schema, "Person");
    memory.write_uint(data_cell(&schema, "Person", "id", base), 4, 42).unwrap();
    let (flag, width) = size_cell(&schema, "Person", "name", base);
    memory.write_uint(flag, width, 1).unwrap();
    memory.write(data_cell(&schema, "Person", "name", base), b"x\0").unwrap();

    let (text, result) = render(&schema, "Person", &memory, base);
    result.unwrap();
    assert_eq!(text, "- id: 0x2a\n- name: x\n\n");
}

#[timeout(1000)]
#[test]
fn test_cleared_flag_hides_value() {
    let schema = person_schema();
    let (mut memory, base) = zeroed_record(&schema, "Person");
    memory.write_uint(data_cell(&schema, "Person", "id", base), 4, 42).unwrap();
    memory.write(data_cell(&schema, "Person", "name", base), b"stale").unwrap();

    let (text, result) = render(&schema, "Person", &memory, base);
    result.unwrap();
    assert_eq!(text, "- id: 0x2a\n\n");
}

#[timeout(1000)]
#[test]
fn test_set_flag_prints_default_value() {
    let schema = person_schema();
    let (mut memory, base) = zeroed_record(&schema, "Person");
    let (flag, width) = size_cell(&schema, "Person", "name", base);
    memory.write_uint(flag, width, 1).unwrap();

    let (text, result) = render(&schema, "Person", &memory, base);
    result.unwrap();
    assert_eq!(text, "- id: 0x0\n- name: \n\n");
}

#[timeout(1000)]
#[test]
fn test_optional_without_flag_skips_defaults() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Counters")
                .field(FieldSpec::optional("count", 1, ValueKind::Uvarint, 4))
                .field(FieldSpec::optional("enabled", 2, ValueKind::Bool, 1))
                .field(FieldSpec::optional("label", 3, ValueKind::String, 8))
                .field(FieldSpec::optional("blob", 4, ValueKind::Bytes, 6)),
        )
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Counters");

    let (text, result) = render(&schema, "Counters", &memory, base);
    result.unwrap();
    assert_eq!(text, "\n");

    memory.write_uint(data_cell(&schema, "Counters", "count", base), 4, 5).unwrap();
    memory
        .write(data_cell(&schema, "Counters", "blob", base), &[2, 0, 0xab, 0x1c])
        .unwrap();

    let (text, result) = render(&schema, "Counters", &memory, base);
    result.unwrap();
    assert_eq!(text, "- count: 0x5\n- blob: bc\n\n");
}

#[timeout(1000)]
#[test]
fn test_oneof_prints_only_active_member() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Shape")
                .field(FieldSpec::oneof("shape", "circle", 1, ValueKind::Uvarint, 4))
                .field(FieldSpec::oneof("shape", "square", 2, ValueKind::Fixed64, 8))
                .field(FieldSpec::required("label", 3, ValueKind::String, 5)),
        )
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Shape");
    memory.write(data_cell(&schema, "Shape", "label", base), b"sq").unwrap();
    let (disc, width) = size_cell(&schema, "Shape", "circle", base);

    let (text, _) = render(&schema, "Shape", &memory, base);
    assert_eq!(text, "- label: sq\n\n");

    memory.write_uint(disc, width, 2).unwrap();
    memory
        .write(
            data_cell(&schema, "Shape", "square", base),
            &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
        )
        .unwrap();
    let (text, result) = render(&schema, "Shape", &memory, base);
    result.unwrap();
    assert_eq!(text, "- square: 87654321\n- label: sq\n\n");

    memory.write_uint(disc, width, 1).unwrap();
    memory.write_uint(data_cell(&schema, "Shape", "circle", base), 4, 7).unwrap();
    let (text, result) = render(&schema, "Shape", &memory, base);
    result.unwrap();
    assert_eq!(text, "- circle: 0x7\n- label: sq\n\n");
}

#[timeout(1000)]
#[test]
fn test_value_formats() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Formats")
                .field(FieldSpec::required("word", 1, ValueKind::Fixed32, 4))
                .field(FieldSpec::required("raw", 2, ValueKind::FixedLengthBytes, 3))
                .field(FieldSpec::required("ok", 3, ValueKind::Bool, 1))
                .field(FieldSpec::required("delta", 4, ValueKind::Svarint, 4)),
        )
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Formats");
    memory
        .write(data_cell(&schema, "Formats", "word", base), &[0x12, 0x34, 0xab, 0xcd])
        .unwrap();
    memory
        .write(data_cell(&schema, "Formats", "raw", base), &[0x1f, 0x2e, 0x3d])
        .unwrap();
    memory.write_uint(data_cell(&schema, "Formats", "ok", base), 1, 2).unwrap();
    memory
        .write_uint(data_cell(&schema, "Formats", "delta", base), 4, u64::from(u32::MAX))
        .unwrap();

    let (text, result) = render(&schema, "Formats", &memory, base);
    result.unwrap();
    assert_eq!(
        text,
        "- word: db42\n- raw: fed\n- ok: true\n- delta: 0xffffffff\n\n"
    );
}

#[timeout(1000)]
#[test]
fn test_fixed32_value_prints_high_byte_first() {
    let schema = SchemaBuilder::new()
        .message(MessageSpec::new("Word").field(FieldSpec::required("w", 1, ValueKind::Fixed32, 4)))
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Word");
    memory
        .write_uint(data_cell(&schema, "Word", "w", base), 4, 0x1234_5678)
        .unwrap();

    let (text, result) = render(&schema, "Word", &memory, base);
    result.unwrap();
    assert_eq!(text, "- w: 2468\n\n");
}

#[timeout(1000)]
#[test]
fn test_extension_stops_record() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Extended")
                .field(FieldSpec::required("a", 1, ValueKind::Uvarint, 1))
                .field(FieldSpec::optional("ext", 2, ValueKind::Extension, 0))
                .field(FieldSpec::required("b", 3, ValueKind::Uvarint, 1)),
        )
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Extended");
    memory.write_uint(data_cell(&schema, "Extended", "a", base), 1, 1).unwrap();
    memory.write_uint(data_cell(&schema, "Extended", "b", base), 1, 2).unwrap();

    let (text, result) = render(&schema, "Extended", &memory, base);
    let err = result.unwrap_err();
    assert!(matches!(err, PrintError::ExtensionField { .. }));
    assert_eq!(err.path(), Some("ext"));
    assert_eq!(text, "- a: 0x1\n");
}

#[timeout(1000)]
#[test]
fn test_callback_storage_fails_record() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Streamed")
                .field(FieldSpec::required("payload", 1, ValueKind::Bytes, 0).callback())
                .field(FieldSpec::required("after", 2, ValueKind::Uvarint, 1)),
        )
        .build()
        .unwrap();
    let (memory, base) = zeroed_record(&schema, "Streamed");

    let (text, result) = render(&schema, "Streamed", &memory, base);
    let err = result.unwrap_err();
    assert!(matches!(err, PrintError::CallbackStorage { .. }));
    assert_eq!(err.path(), Some("payload"));
    assert_eq!(text, "- payload: ");
}

#[timeout(1000)]
#[test]
fn test_unsupported_width_fails_record() {
    let schema = SchemaBuilder::new()
        .message(MessageSpec::new("Odd").field(FieldSpec::required("id", 1, ValueKind::Uvarint, 3)))
        .build()
        .unwrap();
    let (memory, base) = zeroed_record(&schema, "Odd");

    let (text, result) = render(&schema, "Odd", &memory, base);
    assert!(matches!(
        result,
        Err(PrintError::UnsupportedWidth { width: 3, ref path, .. }) if path == "id"
    ));
    assert_eq!(text, "- id: ");
}

#[timeout(1000)]
#[test]
fn test_submessage_with_callback_is_unsupported() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Wrapper")
                .field(FieldSpec::required("inner", 1, ValueKind::SubmessageWithCallback, 4)),
        )
        .build()
        .unwrap();
    let (memory, base) = zeroed_record(&schema, "Wrapper");

    let (text, result) = render(&schema, "Wrapper", &memory, base);
    assert!(matches!(result, Err(PrintError::UnsupportedKind { .. })));
    assert_eq!(text, "- inner: ");
}

#[timeout(1000)]
#[test]
fn test_inline_bytes_length_overflow() {
    let schema = SchemaBuilder::new()
        .message(MessageSpec::new("Blob").field(FieldSpec::required("data", 1, ValueKind::Bytes, 6)))
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Blob");
    memory.write_uint(data_cell(&schema, "Blob", "data", base), 2, 9).unwrap();

    let (_, result) = render(&schema, "Blob", &memory, base);
    assert!(matches!(
        result,
        Err(PrintError::LengthOverflow { len: 9, capacity: 4, .. })
    ));
}

#[timeout(1000)]
#[test]
fn test_empty_message_prints_blank_line() {
    let schema = SchemaBuilder::new()
        .message(MessageSpec::new("Empty"))
        .build()
        .unwrap();
    let (memory, base) = zeroed_record(&schema, "Empty");

    let (text, result) = render(&schema, "Empty", &memory, base);
    result.unwrap();
    assert_eq!(text, "\n");
}

#[timeout(1000)]
#[test]
fn test_printing_is_repeatable() {
    let schema = person_schema();
    let (mut memory, base) = zeroed_record(&schema, "Person");
    memory.write_uint(data_cell(&schema, "Person", "id", base), 4, 7).unwrap();

    let first = render(&schema, "Person", &memory, base);
    let second = render(&schema, "Person", &memory, base);
    assert_eq!(first.0, second.0);
    assert!(first.1.is_ok() && second.1.is_ok());
}

#[timeout(1000)]
#[test]
fn test_pretty_print_reports_outcome() {
    let schema = person_schema();
    let (memory, base) = zeroed_record(&schema, "Person");
    assert!(pretty_print(
        schema.descriptor("Person").unwrap(),
        &Instance::new(&memory, base)
    ));

    let odd = SchemaBuilder::new()
        .message(MessageSpec::new("Odd").field(FieldSpec::required("id", 1, ValueKind::Uvarint, 3)))
        .build()
        .unwrap();
    let (memory, base) = zeroed_record(&odd, "Odd");
    assert!(!pretty_print(
        odd.descriptor("Odd").unwrap(),
        &Instance::new(&memory, base)
    ));
}
