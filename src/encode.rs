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

use crate::{
    AvroResult,
    error::Details,
    options::Options,
    schema::{
        DecimalSchema, EnumSchema, FixedSchema, Name, Namespace, RecordSchema, ResolvedSchema,
        Schema, SchemaKind, UnionSchema, record_fullname_of,
    },
    types::{RecordValue, Value, ValueKind},
    util::{write_int, write_long},
};
use log::error;
use std::{borrow::Borrow, collections::HashMap, io::Write};

/// Encode a `Value` into avro format using the default [`Options`].
///
/// The write is transactional at value granularity: on failure nothing is
/// written to `writer`.
pub fn encode<W: Write>(value: &Value, schema: &Schema, writer: &mut W) -> AvroResult<usize> {
    encode_with_options(value, schema, &Options::default(), writer)
}

/// Encode a `Value` into avro format, honoring the given [`Options`].
pub fn encode_with_options<W: Write>(
    value: &Value,
    schema: &Schema,
    options: &Options,
    writer: &mut W,
) -> AvroResult<usize> {
    let rs = ResolvedSchema::try_from(schema)?;
    let mut buffer = Vec::new();
    encode_internal(
        value,
        schema,
        rs.get_names(),
        &schema.namespace(),
        options,
        &mut buffer,
    )?;
    writer.write_all(&buffer).map_err(Details::IoWrite)?;
    Ok(buffer.len())
}

pub(crate) fn encode_bytes<B: AsRef<[u8]> + ?Sized, W: Write>(
    s: &B,
    writer: &mut W,
) -> AvroResult<usize> {
    let bytes = s.as_ref();
    let prefix = write_long(bytes.len() as i64, writer)?;
    writer.write_all(bytes).map_err(Details::IoWrite)?;
    Ok(prefix + bytes.len())
}

fn write_raw<W: Write>(bytes: &[u8], writer: &mut W) -> AvroResult<usize> {
    writer.write_all(bytes).map_err(Details::IoWrite)?;
    Ok(bytes.len())
}

pub(crate) fn encode_internal<W: Write, S: Borrow<Schema>>(
    value: &Value,
    schema: &Schema,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
    options: &Options,
    writer: &mut W,
) -> AvroResult<usize> {
    if let Schema::Ref { name } = schema {
        let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
        let resolved = names
            .get(&fully_qualified_name)
            .ok_or(Details::UnresolvedReference(fully_qualified_name.clone()))?;
        return encode_internal(
            value,
            resolved.borrow(),
            names,
            &fully_qualified_name.namespace,
            options,
            writer,
        );
    }

    // Union schemas dispatch to a branch first; everything else encodes the
    // value against the concrete schema.
    if let Schema::Union(inner) = schema {
        return encode_union(value, inner, names, enclosing_namespace, options, writer);
    }

    // A pre-tagged union value against a non-union schema: encode the inner
    // value directly.
    if let Value::Union(_i, item) = value {
        return encode_internal(item, schema, names, enclosing_namespace, options, writer);
    }

    match value {
        Value::Null => match schema {
            Schema::Null => Ok(0),
            _ => Err(unsupported(value, schema)),
        },
        Value::Boolean(b) => match schema {
            Schema::Boolean => write_raw(&[u8::from(*b)], writer),
            _ => Err(unsupported(value, schema)),
        },
        // Pattern | Pattern here to signify that these _must_ have the same encoding.
        Value::Int(i) | Value::Date(i) | Value::TimeMillis(i) => match schema {
            Schema::Int | Schema::Date | Schema::TimeMillis => write_int(*i, writer),
            Schema::Long
            | Schema::TimeMicros
            | Schema::TimestampMillis
            | Schema::TimestampMicros => write_long(i64::from(*i), writer),
            Schema::Float => write_raw(&(*i as f32).to_le_bytes(), writer),
            Schema::Double => write_raw(&f64::from(*i).to_le_bytes(), writer),
            _ => Err(unsupported(value, schema)),
        },
        Value::Long(i)
        | Value::TimestampMillis(i)
        | Value::TimestampMicros(i)
        | Value::TimeMicros(i) => match schema {
            Schema::Long
            | Schema::TimeMicros
            | Schema::TimestampMillis
            | Schema::TimestampMicros => write_long(*i, writer),
            Schema::Float => write_raw(&(*i as f32).to_le_bytes(), writer),
            Schema::Double => write_raw(&(*i as f64).to_le_bytes(), writer),
            _ => Err(unsupported(value, schema)),
        },
        Value::Float(x) => match schema {
            Schema::Float => write_raw(&x.to_le_bytes(), writer),
            Schema::Double => write_raw(&f64::from(*x).to_le_bytes(), writer),
            _ => Err(unsupported(value, schema)),
        },
        Value::Double(x) => match schema {
            Schema::Double => write_raw(&x.to_le_bytes(), writer),
            Schema::Float => {
                let downcast = *x as f32;
                if f64::from(downcast) == *x {
                    write_raw(&downcast.to_le_bytes(), writer)
                } else {
                    Err(unsupported(value, schema))
                }
            }
            // Legacy producers emitted timestamp-millis as floating seconds.
            Schema::TimestampMillis if options.alternate_timestamp_millis_encoding => {
                write_long((*x * 1000.0) as i64, writer)
            }
            _ => Err(unsupported(value, schema)),
        },
        Value::Decimal(decimal) => match schema {
            Schema::Decimal(DecimalSchema {
                inner, precision, ..
            }) => {
                if options.decimal_check_exp_overflow && decimal.digit_count() > *precision as u64 {
                    return Err(Details::DecimalPrecisionOverflow {
                        precision: *precision,
                        digits: decimal.digit_count(),
                    }
                    .into());
                }
                match inner.as_ref() {
                    Schema::Fixed(FixedSchema { size, .. }) => {
                        write_raw(&decimal.sign_extended(*size)?, writer)
                    }
                    Schema::Bytes => encode_bytes(&decimal.to_bytes()?, writer),
                    other => Err(Details::DecimalPhysicalType(other.into()).into()),
                }
            }
            Schema::Bytes => encode_bytes(&decimal.to_bytes()?, writer),
            _ => Err(unsupported(value, schema)),
        },
        &Value::Duration(duration) => match schema {
            Schema::Duration(_) => {
                let slice: [u8; 12] = duration.into();
                write_raw(&slice, writer)
            }
            Schema::Fixed(FixedSchema { size: 12, .. }) => {
                let slice: [u8; 12] = duration.into();
                write_raw(&slice, writer)
            }
            _ => Err(unsupported(value, schema)),
        },
        Value::Uuid(uuid) => match schema {
            // the call to .to_string() properly converts ASCII to UTF-8
            Schema::Uuid | Schema::String => encode_bytes(&uuid.to_string(), writer),
            _ => Err(unsupported(value, schema)),
        },
        Value::Bytes(bytes) => match schema {
            Schema::Bytes => encode_bytes(bytes, writer),
            Schema::Fixed(FixedSchema { size, .. }) => {
                if bytes.len() == *size {
                    write_raw(bytes.as_slice(), writer)
                } else {
                    Err(Details::FixedSizeMismatch {
                        expected: *size,
                        actual: bytes.len(),
                    }
                    .into())
                }
            }
            Schema::Decimal(DecimalSchema { inner, .. }) => match inner.as_ref() {
                Schema::Bytes => encode_bytes(bytes, writer),
                Schema::Fixed(FixedSchema { size, .. }) if bytes.len() == *size => {
                    write_raw(bytes.as_slice(), writer)
                }
                _ => Err(unsupported(value, schema)),
            },
            _ => Err(unsupported(value, schema)),
        },
        Value::String(s) => match schema {
            Schema::String | Schema::Uuid => encode_bytes(s, writer),
            Schema::Bytes if options.types_str_to_bytes => encode_bytes(s.as_bytes(), writer),
            Schema::Enum(EnumSchema { symbols, .. }) => {
                if let Some(index) = symbols.iter().position(|item| item == s) {
                    write_int(index as i32, writer)
                } else {
                    error!("Invalid symbol string {:?}.", &s[..]);
                    Err(Details::UnknownEnumSymbol(s.clone()).into())
                }
            }
            _ => Err(unsupported(value, schema)),
        },
        Value::Fixed(n, bytes) => match schema {
            Schema::Fixed(FixedSchema { size, .. }) => {
                if n == size {
                    write_raw(bytes.as_slice(), writer)
                } else {
                    Err(Details::FixedSizeMismatch {
                        expected: *size,
                        actual: *n,
                    }
                    .into())
                }
            }
            Schema::Duration(_) if *n == 12 => write_raw(bytes.as_slice(), writer),
            Schema::Decimal(DecimalSchema { inner, .. }) => match inner.as_ref() {
                Schema::Fixed(FixedSchema { size, .. }) if n == size => {
                    write_raw(bytes.as_slice(), writer)
                }
                _ => Err(unsupported(value, schema)),
            },
            _ => Err(unsupported(value, schema)),
        },
        Value::Enum(i, s) => match schema {
            Schema::Enum(EnumSchema { symbols, .. }) => match symbols.get(*i as usize) {
                Some(symbol) if symbol == s => write_int(*i as i32, writer),
                Some(_) => Err(Details::UnknownEnumSymbol(s.clone()).into()),
                None => Err(Details::EnumIndexOutOfRange {
                    index: i64::from(*i),
                    nsymbols: symbols.len(),
                }
                .into()),
            },
            _ => Err(unsupported(value, schema)),
        },
        Value::Union(_, _) => unreachable!("handled before the match"),
        Value::Array(items) => match schema {
            Schema::Array(inner) => {
                let mut written = 0;
                if !items.is_empty() {
                    written += write_long(items.len() as i64, writer)?;
                    for item in items.iter() {
                        written += encode_internal(
                            item,
                            inner,
                            names,
                            enclosing_namespace,
                            options,
                            writer,
                        )?;
                    }
                }
                written += write_raw(&[0u8], writer)?;
                Ok(written)
            }
            _ => {
                error!("invalid schema type for Array: {schema:?}");
                Err(unsupported(value, schema))
            }
        },
        Value::Map(items) => match schema {
            Schema::Map(inner) => {
                let mut written = 0;
                if !items.is_empty() {
                    written += write_long(items.len() as i64, writer)?;
                    for (key, value) in items {
                        written += encode_bytes(key, writer)?;
                        written += encode_internal(
                            value,
                            inner,
                            names,
                            enclosing_namespace,
                            options,
                            writer,
                        )?;
                    }
                }
                written += write_raw(&[0u8], writer)?;
                Ok(written)
            }
            Schema::Record(record) => {
                if !options.record_can_encode_dict {
                    return Err(unsupported(value, schema));
                }
                let lookup: HashMap<&str, &Value> = items
                    .iter()
                    .map(|(key, value)| (key.as_str(), value))
                    .collect();
                encode_record_fields(record, lookup, names, enclosing_namespace, options, writer)
            }
            _ => {
                error!("invalid schema type for Map: {schema:?}");
                Err(unsupported(value, schema))
            }
        },
        Value::Record(record_value) => match schema {
            Schema::Record(record) => encode_record_value(
                record_value,
                record,
                names,
                enclosing_namespace,
                options,
                writer,
            ),
            _ => {
                error!("invalid schema type for Record: {schema:?}");
                Err(unsupported(value, schema))
            }
        },
    }
}

/// Encode a record value against a record schema.
///
/// A value carrying the identity of this very compilation is reused directly,
/// in declaration order. A value from a foreign compilation goes through
/// adaptation while `adapt_record_types` is on: its fully-qualified name and
/// ordered field shape must match the target, else `RecordNotAdaptable`. With
/// the option off the value is reused blindly, fields looked up by name.
fn encode_record_value<W: Write, S: Borrow<Schema>>(
    record_value: &RecordValue,
    record: &RecordSchema,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
    options: &Options,
    writer: &mut W,
) -> AvroResult<usize> {
    let same_compilation = record_value.schema_id == Some(record.id)
        && record_value.fields.len() == record.fields.len();

    if !same_compilation && options.adapt_record_types {
        if let Some(foreign_id) = record_value.schema_id {
            check_adaptable(record_value, record, foreign_id, names, enclosing_namespace)?;
        }
    }

    let adapted_positionally = same_compilation
        || (options.adapt_record_types && record_value.schema_id.is_some());

    if adapted_positionally {
        // field names are known to line up with the declaration order
        let record_namespace = record
            .name
            .fully_qualified_name(enclosing_namespace)
            .namespace;
        let mut written = 0;
        for ((_, value), field) in record_value.fields.iter().zip(record.fields.iter()) {
            written += encode_internal(
                value,
                &field.schema,
                names,
                &record_namespace,
                options,
                writer,
            )?;
        }
        return Ok(written);
    }

    let lookup: HashMap<&str, &Value> = record_value
        .fields
        .iter()
        .map(|(name, field)| (name.as_str(), field))
        .collect();
    encode_record_fields(record, lookup, names, enclosing_namespace, options, writer)
}

/// Check that a foreign record value matches the target compilation: same
/// fully-qualified name, same ordered field names, and every field value
/// acceptable to the target field's schema.
fn check_adaptable<S: Borrow<Schema>>(
    record_value: &RecordValue,
    record: &RecordSchema,
    foreign_id: u64,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
) -> AvroResult<()> {
    let target_name = record
        .name
        .fully_qualified_name(enclosing_namespace)
        .fullname(None);
    let refuse = |reason: String| {
        crate::Error::new(Details::RecordNotAdaptable {
            record: target_name.clone(),
            reason,
        })
    };

    if let Some(foreign_name) = record_fullname_of(foreign_id) {
        if foreign_name != target_name {
            return Err(refuse(format!(
                "the value originates from record {foreign_name:?}"
            )));
        }
    }
    if record_value.fields.len() != record.fields.len() {
        return Err(refuse(format!(
            "the value has {} fields, the schema declares {}",
            record_value.fields.len(),
            record.fields.len()
        )));
    }
    let record_namespace = record
        .name
        .fully_qualified_name(enclosing_namespace)
        .namespace;
    for ((value_name, value), field) in record_value.fields.iter().zip(record.fields.iter()) {
        if *value_name != field.name {
            return Err(refuse(format!(
                "field {value_name:?} does not match declared field {:?}",
                field.name
            )));
        }
        if let Some(reason) = value.validate_internal(&field.schema, names, &record_namespace) {
            return Err(refuse(format!("field {value_name:?}: {reason}")));
        }
    }
    Ok(())
}

fn encode_union<W: Write, S: Borrow<Schema>>(
    value: &Value,
    union: &UnionSchema,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
    options: &Options,
    writer: &mut W,
) -> AvroResult<usize> {
    if union.variants().is_empty() {
        return Err(Details::EmptyUnion.into());
    }

    if let Value::Union(idx, item) = value {
        let inner_schema =
            union
                .variants()
                .get(*idx as usize)
                .ok_or(Details::InvalidUnionTag {
                    index: i64::from(*idx),
                    num_branches: union.variants().len(),
                })?;
        let mut written = write_long(i64::from(*idx), writer)?;
        written += encode_internal(
            item,
            inner_schema,
            names,
            enclosing_namespace,
            options,
            writer,
        )?;
        return Ok(written);
    }

    if let Value::Map(items) = value {
        // A `-type` hint names the branch explicitly; tuple notation uses a
        // single-entry mapping as an explicit branch selector. The hint is
        // checked first.
        if options.record_values_type_hint {
            if let Some(Value::String(wanted)) = items.get("-type") {
                if let Some((index, branch)) = union.branch_by_name(wanted) {
                    let mut written = write_long(index as i64, writer)?;
                    written += encode_internal(
                        value,
                        branch,
                        names,
                        enclosing_namespace,
                        options,
                        writer,
                    )?;
                    return Ok(written);
                }
            }
        }
        if options.allow_tuple_notation && items.len() == 1 {
            let (key, payload) = items.iter().next().expect("mapping has one entry");
            if let Some((index, branch)) = union.branch_by_name(key) {
                let mut written = write_long(index as i64, writer)?;
                written += encode_internal(
                    payload,
                    branch,
                    names,
                    enclosing_namespace,
                    options,
                    writer,
                )?;
                return Ok(written);
            }
        }
    }

    let (index, branch) = union.find_schema(value, names, enclosing_namespace, options)?;
    let mut written = write_long(index as i64, writer)?;
    written += encode_internal(value, branch, names, enclosing_namespace, options, writer)?;
    Ok(written)
}

fn encode_record_fields<W: Write, S: Borrow<Schema>>(
    record: &RecordSchema,
    lookup: HashMap<&str, &Value>,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
    options: &Options,
    writer: &mut W,
) -> AvroResult<usize> {
    let record_namespace = record
        .name
        .fully_qualified_name(enclosing_namespace)
        .namespace;

    if !options.record_allow_extra_fields {
        for key in lookup.keys() {
            let is_hint = options.record_values_type_hint && *key == "-type";
            if !is_hint && !record.lookup.contains_key(*key) {
                return Err(Details::UnknownField {
                    field: (*key).to_string(),
                    record: record.name.fullname(None),
                }
                .into());
            }
        }
    }

    let mut written = 0;
    for field in record.fields.iter() {
        let value = lookup.get(field.name.as_str()).copied().or_else(|| {
            field
                .aliases
                .iter()
                .find_map(|alias| lookup.get(alias.as_str()).copied())
        });

        match value {
            Some(value) => {
                written += encode_internal(
                    value,
                    &field.schema,
                    names,
                    &record_namespace,
                    options,
                    writer,
                )?;
            }
            None => match field.default {
                // Defaults are rebuilt from their JSON form on every use, so
                // no decoded value ever aliases schema-owned memory.
                Some(ref default) if options.record_encode_use_defaults => {
                    let default_value = Value::from_json_with_schema(
                        default,
                        &field.schema,
                        names,
                        &record_namespace,
                        false,
                    )?;
                    written += encode_internal(
                        &default_value,
                        &field.schema,
                        names,
                        &record_namespace,
                        options,
                        writer,
                    )?;
                }
                _ => return Err(Details::MissingField(field.name.clone()).into()),
            },
        }
    }
    Ok(written)
}

fn unsupported(value: &Value, schema: &Schema) -> crate::Error {
    Details::UnexpectedValueKind {
        value_kind: ValueKind::from(value),
        supported: vec![SchemaKind::from(schema)],
    }
    .into()
}

/// Encode a `Value` into a fresh buffer using the default [`Options`].
pub fn encode_to_vec(value: &Value, schema: &Schema) -> AvroResult<Vec<u8>> {
    let mut buffer = Vec::new();
    encode(value, schema, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::TestResult;
    use crate::decode::decode;
    use pretty_assertions::assert_eq;

    pub(crate) fn success(value: &Value, schema: &Schema) -> String {
        format!(
            "Value: {:?}\n should encode with schema:\n{:?}",
            &value, &schema
        )
    }

    #[test]
    fn test_encode_empty_array() {
        let mut buf = Vec::new();
        let empty: Vec<Value> = Vec::new();
        encode(
            &Value::Array(empty.clone()),
            &Schema::array(Schema::Int),
            &mut buf,
        )
        .expect(&success(&Value::Array(empty), &Schema::array(Schema::Int)));
        assert_eq!(vec![0u8], buf);
    }

    #[test]
    fn test_encode_empty_map() {
        let mut buf = Vec::new();
        let empty: HashMap<String, Value> = HashMap::new();
        encode(
            &Value::Map(empty.clone()),
            &Schema::map(Schema::Int),
            &mut buf,
        )
        .expect(&success(&Value::Map(empty), &Schema::map(Schema::Int)));
        assert_eq!(vec![0u8], buf);
    }

    #[test]
    fn test_encode_record_wire_format() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "Example",
                "fields": [
                    {"name": "name", "type": "string"},
                    {"name": "age", "type": "int"}
                ]
            }"#,
        )?;
        let value = Value::record(vec![
            ("name".into(), Value::String("John".into())),
            ("age".into(), Value::Int(42)),
        ]);
        let mut buf = Vec::new();
        encode(&value, &schema, &mut buf)?;
        assert_eq!(buf, vec![0x08, 0x4A, 0x6F, 0x68, 0x6E, 0x54]);
        Ok(())
    }

    #[test]
    fn test_encode_union_wire_format() -> TestResult {
        let schema = Schema::parse_str(r#"["null", "string"]"#)?;

        let mut buf = Vec::new();
        encode(&Value::Null, &schema, &mut buf)?;
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode(&Value::String("hi".into()), &schema, &mut buf)?;
        assert_eq!(buf, vec![0x02, 0x04, 0x68, 0x69]);
        Ok(())
    }

    #[test]
    fn test_encode_dict_as_record_with_defaults() -> TestResult {
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
        let empty = Value::Map(HashMap::new());

        let mut buf = Vec::new();
        encode(&empty, &schema, &mut buf)?;
        // "JDoe" (len 4) then zigzag 25
        assert_eq!(buf, vec![0x08, b'J', b'D', b'o', b'e', 0x32]);

        // with defaults disabled the missing field is an error
        let options = Options::default().with_record_encode_use_defaults(false);
        let mut buf = Vec::new();
        let result = encode_with_options(&empty, &schema, &options, &mut buf)
            .map_err(crate::Error::into_details);
        match result {
            Err(Details::MissingField(field)) => assert_eq!(field, "name"),
            other => panic!("Expected Details::MissingField, got {other:?}"),
        }
        assert!(buf.is_empty());
        Ok(())
    }

    #[test]
    fn test_encode_dict_extra_fields() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "Person",
                "fields": [{"name": "age", "type": "int"}]
            }"#,
        )?;
        let mut items = HashMap::new();
        items.insert("age".to_string(), Value::Int(3));
        items.insert("unknown".to_string(), Value::Int(4));
        let value = Value::Map(items);

        // dropped silently by default
        let mut buf = Vec::new();
        encode(&value, &schema, &mut buf)?;
        assert_eq!(buf, vec![0x06]);

        let options = Options::default().with_record_allow_extra_fields(false);
        let mut buf = Vec::new();
        let result = encode_with_options(&value, &schema, &options, &mut buf)
            .map_err(crate::Error::into_details);
        match result {
            Err(Details::UnknownField { field, .. }) => assert_eq!(field, "unknown"),
            other => panic!("Expected Details::UnknownField, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_encode_dict_disallowed() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "Person",
                "fields": [{"name": "age", "type": "int"}]
            }"#,
        )?;
        let mut items = HashMap::new();
        items.insert("age".to_string(), Value::Int(3));
        let value = Value::Map(items);

        let options = Options::default().with_record_can_encode_dict(false);
        let mut buf = Vec::new();
        assert!(encode_with_options(&value, &schema, &options, &mut buf).is_err());
        Ok(())
    }

    #[test]
    fn test_encode_type_hint_selects_union_branch() -> TestResult {
        let schema = Schema::parse_str(
            r#"[
                {"type": "record", "name": "A", "fields": [{"name": "value", "type": "int"}]},
                {"type": "record", "name": "B", "fields": [{"name": "value", "type": "long"}]}
            ]"#,
        )?;
        let mut items = HashMap::new();
        items.insert("-type".to_string(), Value::String("B".into()));
        items.insert("value".to_string(), Value::Int(42));
        let value = Value::Map(items);

        let options = Options::default().with_record_values_type_hint(true);
        let mut buf = Vec::new();
        encode_with_options(&value, &schema, &options, &mut buf)?;
        assert_eq!(buf, vec![0x02, 0x54]);
        Ok(())
    }

    #[test]
    fn test_encode_tuple_notation() -> TestResult {
        let schema = Schema::parse_str(r#"["null", "string", "int"]"#)?;
        let mut items = HashMap::new();
        items.insert("int".to_string(), Value::Int(42));
        let value = Value::Map(items);

        let options = Options::default().with_allow_tuple_notation(true);
        let mut buf = Vec::new();
        encode_with_options(&value, &schema, &options, &mut buf)?;
        assert_eq!(buf, vec![0x04, 0x54]);
        Ok(())
    }

    #[test]
    fn test_encode_str_to_bytes() -> TestResult {
        let mut buf = Vec::new();
        encode(&Value::String("hi".into()), &Schema::Bytes, &mut buf)?;
        assert_eq!(buf, vec![0x04, 0x68, 0x69]);

        let options = Options::default().with_types_str_to_bytes(false);
        let mut buf = Vec::new();
        assert!(
            encode_with_options(&Value::String("hi".into()), &Schema::Bytes, &options, &mut buf)
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_encode_decimal_overflow_check() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "bytes", "logicalType": "decimal", "precision": 2, "scale": 0}"#,
        )?;
        // 1000 needs 4 digits but the declared precision is 2
        let decimal = crate::Decimal::from(1000i32.to_be_bytes());
        let mut buf = Vec::new();
        assert!(encode(&Value::Decimal(decimal.clone()), &schema, &mut buf).is_err());

        let options = Options::default().with_decimal_check_exp_overflow(false);
        let mut buf = Vec::new();
        encode_with_options(&Value::Decimal(decimal), &schema, &options, &mut buf)?;
        assert!(!buf.is_empty());
        Ok(())
    }

    #[test]
    fn test_same_compilation_reuses_directly() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "Person",
                "fields": [
                    {"name": "a", "type": "int"},
                    {"name": "b", "type": "int"}
                ]
            }"#,
        )?;
        // decoding stamps the value with this compilation's identity
        let mut buf = Vec::new();
        encode(
            &Value::record(vec![
                ("a".into(), Value::Int(1)),
                ("b".into(), Value::Int(2)),
            ]),
            &schema,
            &mut buf,
        )?;
        let decoded = decode(&schema, &mut &buf[..])?;

        let mut again = Vec::new();
        encode(&decoded, &schema, &mut again)?;
        assert_eq!(buf, again);
        Ok(())
    }

    #[test]
    fn test_adapts_foreign_record_with_matching_shape() -> TestResult {
        let json = r#"
            {
                "type": "record",
                "name": "Person",
                "fields": [{"name": "age", "type": "int"}]
            }"#;
        let writer_compilation = Schema::parse_str(json)?;
        let target_compilation = Schema::parse_str(json)?;

        let mut buf = Vec::new();
        encode(
            &Value::record(vec![("age".into(), Value::Int(7))]),
            &writer_compilation,
            &mut buf,
        )?;
        // the decoded value carries the writer compilation's identity
        let foreign = decode(&writer_compilation, &mut &buf[..])?;

        // names and field shapes match: accepted by re-encoding field-by-field
        let mut again = Vec::new();
        encode(&foreign, &target_compilation, &mut again)?;
        assert_eq!(again, vec![0x0E]);
        Ok(())
    }

    #[test]
    fn test_foreign_record_with_wrong_name_not_adaptable() -> TestResult {
        let writer_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Other", "fields": [{"name": "age", "type": "int"}]}"#,
        )?;
        let target_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Person", "fields": [{"name": "age", "type": "int"}]}"#,
        )?;

        let mut buf = Vec::new();
        encode(
            &Value::record(vec![("age".into(), Value::Int(7))]),
            &writer_compilation,
            &mut buf,
        )?;
        let foreign = decode(&writer_compilation, &mut &buf[..])?;

        let mut again = Vec::new();
        let result = encode(&foreign, &target_compilation, &mut again)
            .map_err(crate::Error::into_details);
        match result {
            Err(Details::RecordNotAdaptable { record, .. }) => assert_eq!(record, "Person"),
            other => panic!("Expected Details::RecordNotAdaptable, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_foreign_record_with_wrong_shape_not_adaptable() -> TestResult {
        let writer_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Person", "fields": [{"name": "years", "type": "int"}]}"#,
        )?;
        let target_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Person", "fields": [{"name": "age", "type": "int"}]}"#,
        )?;

        let mut buf = Vec::new();
        encode(
            &Value::record(vec![("years".into(), Value::Int(7))]),
            &writer_compilation,
            &mut buf,
        )?;
        let foreign = decode(&writer_compilation, &mut &buf[..])?;

        let mut again = Vec::new();
        let result = encode(&foreign, &target_compilation, &mut again)
            .map_err(crate::Error::into_details);
        assert!(matches!(result, Err(Details::RecordNotAdaptable { .. })));
        Ok(())
    }

    #[test]
    fn test_foreign_record_with_incompatible_field_not_adaptable() -> TestResult {
        let writer_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Person", "fields": [{"name": "age", "type": "string"}]}"#,
        )?;
        let target_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Person", "fields": [{"name": "age", "type": "int"}]}"#,
        )?;

        let mut buf = Vec::new();
        encode(
            &Value::record(vec![("age".into(), Value::String("seven".into()))]),
            &writer_compilation,
            &mut buf,
        )?;
        let foreign = decode(&writer_compilation, &mut &buf[..])?;

        let mut again = Vec::new();
        let result = encode(&foreign, &target_compilation, &mut again)
            .map_err(crate::Error::into_details);
        assert!(matches!(result, Err(Details::RecordNotAdaptable { .. })));
        Ok(())
    }

    #[test]
    fn test_adaptation_disabled_reuses_blindly() -> TestResult {
        // with adapt_record_types off, a foreign value is not checked; its
        // fields are simply looked up by name
        let writer_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Other", "fields": [{"name": "age", "type": "int"}]}"#,
        )?;
        let target_compilation = Schema::parse_str(
            r#"{"type": "record", "name": "Person", "fields": [{"name": "age", "type": "int"}]}"#,
        )?;

        let mut buf = Vec::new();
        encode(
            &Value::record(vec![("age".into(), Value::Int(7))]),
            &writer_compilation,
            &mut buf,
        )?;
        let foreign = decode(&writer_compilation, &mut &buf[..])?;

        let options = Options::default().with_adapt_record_types(false);
        let mut again = Vec::new();
        encode_with_options(&foreign, &target_compilation, &options, &mut again)?;
        assert_eq!(again, vec![0x0E]);
        Ok(())
    }

    #[test]
    fn test_hand_built_record_encodes_by_name() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "Person",
                "fields": [
                    {"name": "a", "type": "int"},
                    {"name": "b", "type": "int"}
                ]
            }"#,
        )?;
        // a literal carries no identity; its fields may come in any order
        let reordered = Value::record(vec![
            ("b".into(), Value::Int(2)),
            ("a".into(), Value::Int(1)),
        ]);
        let mut buf = Vec::new();
        encode(&reordered, &schema, &mut buf)?;
        assert_eq!(buf, vec![0x02, 0x04]);
        Ok(())
    }

    #[test]
    fn test_recursive_definition_encode_record() -> TestResult {
        let mut buf = Vec::new();
        let schema = Schema::parse_str(
            r#"
            {
                "type":"record",
                "name":"TestStruct",
                "fields": [
                    {
                        "name":"a",
                        "type":{
                            "type":"record",
                            "name": "Inner",
                            "fields": [ {
                                "name":"z",
                                "type":"int"
                            }]
                        }
                    },
                    {
                        "name":"b",
                        "type":"Inner"
                    }
                ]
            }"#,
        )?;

        let inner_value1 = Value::record(vec![("z".into(), Value::Int(3))]);
        let inner_value2 = Value::record(vec![("z".into(), Value::Int(6))]);
        let outer_value =
            Value::record(vec![("a".into(), inner_value1), ("b".into(), inner_value2)]);
        encode(&outer_value, &schema, &mut buf).expect(&success(&outer_value, &schema));
        assert_eq!(buf, vec![0x06, 0x0C]);
        Ok(())
    }

    #[test]
    fn test_multi_level_namespace_encoding() -> TestResult {
        let schema = r#"
        {
          "name": "record_name",
          "namespace": "space",
          "type": "record",
          "fields": [
            {
              "name": "outer_field_1",
              "type": [
                        "null",
                        {
                            "type": "record",
                            "name": "middle_record_name",
                            "fields":[
                                {
                                    "name":"middle_field_1",
                                    "type":["null", "double"]
                                }
                            ]
                        }
                    ]
            },
            {
                "name": "outer_field_2",
                "type" : "space.middle_record_name"
            }
          ]
        }
        "#;
        let schema = Schema::parse_str(schema)?;
        let middle = Value::record(vec![(
            "middle_field_1".into(),
            Value::Union(1, Box::new(Value::Double(5.4))),
        )]);
        let outer = Value::record(vec![
            (
                "outer_field_1".into(),
                Value::Union(1, Box::new(middle.clone())),
            ),
            ("outer_field_2".into(), middle),
        ]);
        let mut buf = Vec::new();
        encode(&outer, &schema, &mut buf).expect(&success(&outer, &schema));
        assert!(!buf.is_empty());
        Ok(())
    }

    #[test]
    fn test_failed_encode_leaves_writer_untouched() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "Person",
                "fields": [
                    {"name": "a", "type": "int"},
                    {"name": "b", "type": "string"}
                ]
            }"#,
        )?;
        // `b` is missing and has no default: the encode fails after `a`
        // would already have been written.
        let value = Value::record(vec![("a".into(), Value::Int(5))]);
        let mut buf = Vec::new();
        assert!(encode(&value, &schema, &mut buf).is_err());
        assert!(buf.is_empty());
        Ok(())
    }
}
