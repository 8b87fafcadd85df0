//! Repeated fields and nested records.

use ntest::timeout;

use pb_inspect_core::error::PrintError;
use pb_inspect_core::schema::{FieldSpec, MessageSpec, Schema, SchemaBuilder, ValueKind};

use super::helpers::{data_cell, render, size_cell, zeroed_record};

fn values_schema(kind: ValueKind, data_size: usize) -> Schema {
    SchemaBuilder::new()
        .message(MessageSpec::new("Series").field(FieldSpec::repeated("values", 1, kind, data_size, 4)))
        .build()
        .unwrap()
}

#[timeout(1000)]
#[test]
fn test_array_of_integers() {
    let schema = values_schema(ValueKind::Uvarint, 4);
    let (mut memory, base) = zeroed_record(&schema, "Series");
    let (count, width) = size_cell(&schema, "Series", "values", base);
    memory.write_uint(count, width, 3).unwrap();
    let data = data_cell(&schema, "Series", "values", base);
    for (i, value) in [1u64, 2, 3].into_iter().enumerate() {
        memory.write_uint(data.add(i * 4), 4, value).unwrap();
    }

    let (text, result) = render(&schema, "Series", &memory, base);
    result.unwrap();
    assert_eq!(text, "- values: [0x1,0x2,0x3,]\n\n");
}

#[timeout(1000)]
#[test]
fn test_empty_array() {
    let schema = values_schema(ValueKind::Uvarint, 4);
    let (memory, base) = zeroed_record(&schema, "Series");

    let (text, result) = render(&schema, "Series", &memory, base);
    result.unwrap();
    assert_eq!(text, "- values: []\n\n");
}

#[timeout(1000)]
#[test]
fn test_fixed_count_array_prints_every_slot() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Pair")
                .field(FieldSpec::repeated("xy", 1, ValueKind::Uvarint, 1, 2).fixed_count()),
        )
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Pair");
    memory.write(data_cell(&schema, "Pair", "xy", base), &[9, 10]).unwrap();

    let (text, result) = render(&schema, "Pair", &memory, base);
    result.unwrap();
    assert_eq!(text, "- xy: [0x9,0xa,]\n\n");
}

#[timeout(1000)]
#[test]
fn test_array_count_overflow() {
    let schema = values_schema(ValueKind::Uvarint, 4);
    let (mut memory, base) = zeroed_record(&schema, "Series");
    let (count, width) = size_cell(&schema, "Series", "values", base);
    memory.write_uint(count, width, 5).unwrap();

    let (text, result) = render(&schema, "Series", &memory, base);
    assert!(matches!(
        result,
        Err(PrintError::CountOverflow { count: 5, capacity: 4, .. })
    ));
    assert_eq!(text, "- values: ");
}

#[timeout(1000)]
#[test]
fn test_array_element_failure_stops_array() {
    let schema = values_schema(ValueKind::Varint, 3);
    let (mut memory, base) = zeroed_record(&schema, "Series");
    let (count, width) = size_cell(&schema, "Series", "values", base);
    memory.write_uint(count, width, 2).unwrap();

    let (text, result) = render(&schema, "Series", &memory, base);
    let err = result.unwrap_err();
    assert!(matches!(err, PrintError::UnsupportedWidth { .. }));
    assert_eq!(err.path(), Some("values"));
    assert_eq!(text, "- values: [,");
}

#[timeout(1000)]
#[test]
fn test_array_of_records() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("List")
                .field(FieldSpec::repeated("items", 1, ValueKind::Submessage, 0, 2).submessage("Item")),
        )
        .message(MessageSpec::new("Item").field(FieldSpec::required("id", 1, ValueKind::Uvarint, 1)))
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "List");
    let (count, width) = size_cell(&schema, "List", "items", base);
    memory.write_uint(count, width, 2).unwrap();
    memory.write(data_cell(&schema, "List", "items", base), &[5, 6]).unwrap();

    let (text, result) = render(&schema, "List", &memory, base);
    result.unwrap();
    assert_eq!(
        text,
        "- items: [\n    - id: 0x5\n\n,\n    - id: 0x6\n\n,]\n\n"
    );
}

fn nested_schema() -> Schema {
    SchemaBuilder::new()
        .message(
            MessageSpec::new("Outer")
                .field(FieldSpec::required("id", 1, ValueKind::Uvarint, 1))
                .field(FieldSpec::required("inner", 2, ValueKind::Submessage, 0).submessage("Inner")),
        )
        .message(
            MessageSpec::new("Inner")
                .field(FieldSpec::required("a", 1, ValueKind::Uvarint, 1))
                .field(FieldSpec::required("deep", 2, ValueKind::Submessage, 0).submessage("Deep")),
        )
        .message(MessageSpec::new("Deep").field(FieldSpec::required("z", 1, ValueKind::Bool, 1)))
        .build()
        .unwrap()
}

#[timeout(1000)]
#[test]
fn test_nested_records_indent_per_level() {
    let schema = nested_schema();
    assert_eq!(
        schema.descriptor("Outer").unwrap().message().record_size,
        3
    );
    let (mut memory, base) = zeroed_record(&schema, "Outer");
    memory.write(base, &[1, 2, 1]).unwrap();

    let (text, result) = render(&schema, "Outer", &memory, base);
    result.unwrap();
    assert_eq!(
        text,
        "- id: 0x1\n- inner: \n    - a: 0x2\n    - deep: \n        - z: true\n\n\n\n\n\n"
    );

    let field_lines: Vec<&str> = text.lines().filter(|line| line.contains("- ")).collect();
    assert_eq!(
        field_lines,
        vec![
            "- id: 0x1",
            "- inner: ",
            "    - a: 0x2",
            "    - deep: ",
            "        - z: true"
        ]
    );
}

#[timeout(1000)]
#[test]
fn test_nested_error_reports_full_path() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Outer")
                .field(FieldSpec::required("inner", 1, ValueKind::Submessage, 0).submessage("Inner"))
                .field(FieldSpec::required("after", 2, ValueKind::Uvarint, 1)),
        )
        .message(
            MessageSpec::new("Inner")
                .field(FieldSpec::required("x", 1, ValueKind::Uvarint, 1))
                .field(FieldSpec::optional("ext", 2, ValueKind::Extension, 0)),
        )
        .build()
        .unwrap();
    let (memory, base) = zeroed_record(&schema, "Outer");

    let (text, result) = render(&schema, "Outer", &memory, base);
    let err = result.unwrap_err();
    assert!(matches!(err, PrintError::ExtensionField { .. }));
    assert_eq!(err.path(), Some("inner.ext"));
    assert_eq!(text, "- inner: \n    - x: 0x0\n");
}

#[timeout(1000)]
#[test]
fn test_submessage_without_descriptor_prints_nothing() {
    let schema = SchemaBuilder::new()
        .message(
            MessageSpec::new("Holder")
                .field(FieldSpec::required("child", 1, ValueKind::Submessage, 4))
                .field(FieldSpec::required("n", 2, ValueKind::Uvarint, 1)),
        )
        .build()
        .unwrap();
    let (mut memory, base) = zeroed_record(&schema, "Holder");
    memory.write_uint(data_cell(&schema, "Holder", "n", base), 1, 3).unwrap();

    let (text, result) = render(&schema, "Holder", &memory, base);
    result.unwrap();
    assert_eq!(text, "- child: \n\n- n: 0x3\n\n");
}
