// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Port of the Avro specification's wire-format examples.

use dynavro::{
    Codec, Options, Reader, Schema, Writer, from_avro_datum, to_avro_datum,
    to_avro_datum_with_options,
    types::{Record, Value},
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_record_example_wire_format() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type":"record","name":"Example","fields":[{"name":"name","type":"string"},{"name":"age","type":"int"}]}"#,
    )?;
    let mut record = Record::new(&schema).unwrap();
    record.put("name", "John");
    record.put("age", 42);

    let encoded = to_avro_datum(&schema, record)?;
    assert_eq!(encoded, vec![0x08, 0x4A, 0x6F, 0x68, 0x6E, 0x54]);

    let decoded = from_avro_datum(&schema, &mut &encoded[..], None)?;
    assert_eq!(
        decoded,
        Value::record(vec![
            ("name".into(), Value::String("John".into())),
            ("age".into(), Value::Int(42)),
        ])
    );
    Ok(())
}

#[test]
fn test_nullable_union_wire_format() -> TestResult {
    let schema = Schema::parse_str(r#"["null", "string"]"#)?;

    assert_eq!(to_avro_datum(&schema, Value::Null)?, vec![0x00]);
    assert_eq!(
        to_avro_datum(&schema, Value::String("hi".into()))?,
        vec![0x02, 0x04, 0x68, 0x69]
    );

    let mut bytes: &[u8] = &[0x02, 0x04, 0x68, 0x69];
    assert_eq!(
        from_avro_datum(&schema, &mut bytes, None)?,
        Value::Union(1, Box::new(Value::String("hi".into())))
    );
    Ok(())
}

#[test]
fn test_defaults_fill_missing_fields() -> TestResult {
    let schema = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "Person",
            "fields": [
                {"name": "name", "type": "string", "default": "JDoe"},
                {"name": "age", "type": "int", "default": 25}
            ]
        }"#,
    )?;

    let encoded = to_avro_datum(&schema, Value::Map(HashMap::new()))?;
    assert_eq!(encoded, vec![0x08, b'J', b'D', b'o', b'e', 0x32]);

    let options = Options::default().with_record_encode_use_defaults(false);
    assert!(to_avro_datum_with_options(&schema, Value::Map(HashMap::new()), &options).is_err());
    Ok(())
}

#[test]
fn test_type_hint_union_roundtrip() -> TestResult {
    let schema = Schema::parse_str(
        r#"[
            {"type": "record", "name": "A", "fields": [{"name": "value", "type": "int"}]},
            {"type": "record", "name": "B", "fields": [{"name": "value", "type": "long"}]}
        ]"#,
    )?;
    let options = Options::default().with_record_values_type_hint(true);

    let mut items = HashMap::new();
    items.insert("-type".to_string(), Value::String("B".into()));
    items.insert("value".to_string(), Value::Int(42));
    let encoded = to_avro_datum_with_options(&schema, Value::Map(items), &options)?;
    assert_eq!(encoded, vec![0x02, 0x54]);

    let decoded = from_avro_datum(&schema, &mut &encoded[..], None)?;
    assert_eq!(
        decoded,
        Value::Union(
            1,
            Box::new(Value::record(vec![("value".into(), Value::Long(42))]))
        )
    );
    Ok(())
}

#[test]
fn test_container_file_roundtrip() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type":"record","name":"Example","fields":[{"name":"name","type":"string"},{"name":"age","type":"int"}]}"#,
    )?;

    let mut writer = Writer::new(&schema, Vec::new())?;
    let mut v1 = Record::new(&schema).unwrap();
    v1.put("name", "John");
    v1.put("age", 42);
    let mut v2 = Record::new(&schema).unwrap();
    v2.put("name", "Jane");
    v2.put("age", 37);
    writer.append_value(v1)?;
    writer.append_value(v2)?;
    let encoded = writer.into_inner()?;

    let values: Result<Vec<_>, _> = Reader::new(&encoded[..])?.collect();
    let values = values?;
    assert_eq!(values.len(), 2);
    assert_eq!(
        values[0],
        Value::record(vec![
            ("name".into(), Value::String("John".into())),
            ("age".into(), Value::Int(42)),
        ])
    );
    assert_eq!(
        values[1],
        Value::record(vec![
            ("name".into(), Value::String("Jane".into())),
            ("age".into(), Value::Int(37)),
        ])
    );

    // a truncated stream raises before yielding the second value
    let truncated = &encoded[..encoded.len() - 1];
    let collected: Vec<_> = Reader::new(truncated)?.collect();
    assert!(collected.last().unwrap().is_err());
    Ok(())
}

#[test]
fn test_container_file_compressed_roundtrip() -> TestResult {
    let schema = Schema::parse_str(r#"{"type": "array", "items": "long"}"#)?;
    let value = Value::Array((0..100).map(Value::Long).collect());

    let mut codecs = vec![Codec::Null, Codec::Deflate];
    #[cfg(feature = "snappy")]
    codecs.push(Codec::Snappy);
    #[cfg(feature = "zstandard")]
    codecs.push(Codec::Zstandard);

    for codec in codecs {
        let mut writer = Writer::with_codec(&schema, Vec::new(), codec)?;
        writer.append_value_ref(&value)?;
        let encoded = writer.into_inner()?;

        let mut reader = Reader::new(&encoded[..])?;
        assert_eq!(reader.next().unwrap()?, value);
        assert!(reader.next().is_none());
    }
    Ok(())
}

#[test]
fn test_container_multiple_blocks() -> TestResult {
    let schema = Schema::parse_str(r#"{"type": "string"}"#)?;
    // a tiny block size forces one block per value
    let mut writer = Writer::builder(&schema, Vec::new()).block_size(1).build()?;
    for word in ["one", "two", "three"] {
        writer.append_value_ref(&Value::String(word.into()))?;
    }
    let encoded = writer.into_inner()?;

    let values: Result<Vec<_>, _> = Reader::new(&encoded[..])?.collect();
    assert_eq!(
        values?,
        vec![
            Value::String("one".into()),
            Value::String("two".into()),
            Value::String("three".into()),
        ]
    );
    Ok(())
}

#[test]
fn test_user_metadata_roundtrip() -> TestResult {
    let schema = Schema::parse_str(r#"{"type": "string"}"#)?;
    let mut writer = Writer::new(&schema, Vec::new())?;
    writer.add_user_metadata("stringKey".to_string(), "stringValue")?;
    writer.add_user_metadata("bytesKey".to_string(), b"bytesValue")?;
    writer.append_value_ref(&Value::String("hello".into()))?;
    let encoded = writer.into_inner()?;

    let reader = Reader::new(&encoded[..])?;
    assert_eq!(
        reader.user_metadata().get("stringKey"),
        Some(&b"stringValue".to_vec())
    );
    assert_eq!(
        reader.user_metadata().get("bytesKey"),
        Some(&b"bytesValue".to_vec())
    );
    Ok(())
}

#[test]
fn test_zigzag_examples() -> TestResult {
    let cases: &[(i64, &[u8])] = &[
        (0, &[0x00]),
        (-1, &[0x01]),
        (1, &[0x02]),
        (63, &[0x7E]),
        (64, &[0x80, 0x01]),
        (-64, &[0x7F]),
    ];
    for (n, expected) in cases {
        assert_eq!(
            to_avro_datum(&Schema::Long, Value::Long(*n))?,
            expected.to_vec()
        );
    }

    assert_eq!(
        to_avro_datum(&Schema::Long, Value::Long(1 << 40))?.len(),
        6
    );
    Ok(())
}

#[test]
fn test_logical_value_container_roundtrip() -> TestResult {
    let schema = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "Event",
            "fields": [
                {"name": "id", "type": {"type": "string", "logicalType": "uuid"}},
                {"name": "at", "type": {"type": "long", "logicalType": "timestamp-millis"}},
                {"name": "day", "type": {"type": "int", "logicalType": "date"}}
            ]
        }"#,
    )?;

    let value = Value::record(vec![
        (
            "id".into(),
            Value::Uuid("550e8400-e29b-41d4-a716-446655440000".parse()?),
        ),
        ("at".into(), Value::TimestampMillis(1_700_000_000_000)),
        ("day".into(), Value::Date(19_000)),
    ]);

    let mut writer = Writer::new(&schema, Vec::new())?;
    writer.append_value_ref(&value)?;
    let encoded = writer.into_inner()?;

    let mut reader = Reader::new(&encoded[..])?;
    assert_eq!(reader.next().unwrap()?, value);
    Ok(())
}

#[test]
fn test_decimal_fixed_roundtrip() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "fixed", "name": "money", "size": 4, "logicalType": "decimal", "precision": 9, "scale": 2}"#,
    )?;
    let value = Value::Decimal(dynavro::Decimal::from(12345i32.to_be_bytes()));

    let encoded = to_avro_datum(&schema, value.clone())?;
    assert_eq!(encoded.len(), 4);
    assert_eq!(from_avro_datum(&schema, &mut &encoded[..], None)?, value);
    Ok(())
}
