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
    decimal::Decimal,
    duration::Duration,
    error::Details,
    options::Options,
    schema::{
        DecimalSchema, EnumSchema, FixedSchema, Name, Namespace, ResolvedSchema, Schema,
        UnionSchema,
    },
    types::{RecordValue, Value},
    util::{read_int, read_long, safe_len},
};
use std::{borrow::Borrow, collections::HashMap, io::Read, str::FromStr};
use uuid::Uuid;

/// Decode a `Value` from avro format given its `Schema`, using the default
/// [`Options`].
pub fn decode<R: Read>(schema: &Schema, reader: &mut R) -> AvroResult<Value> {
    decode_with_options(schema, &Options::default(), reader)
}

/// Decode a `Value` from avro format given its `Schema`, honoring the given
/// [`Options`].
pub fn decode_with_options<R: Read>(
    schema: &Schema,
    options: &Options,
    reader: &mut R,
) -> AvroResult<Value> {
    let rs = ResolvedSchema::try_from(schema)?;
    decode_internal(schema, rs.get_names(), &schema.namespace(), options, reader)
}

fn decode_len<R: Read>(reader: &mut R) -> AvroResult<usize> {
    let len = read_long(reader)?;
    let len = usize::try_from(len).map_err(|_| Details::InvalidLength(len))?;
    safe_len(len)
}

/// Decode the length of a sequence.
///
/// Maps and arrays are 0-terminated, 0 length sequences are therefore the end
/// of the sequence. If the sequence length is negative, it is preceded by a
/// number of bytes that the block takes up, which this also consumes.
fn decode_seq_len<R: Read>(reader: &mut R) -> AvroResult<usize> {
    let raw_len = read_long(reader)?;
    let len = match raw_len.cmp(&0) {
        std::cmp::Ordering::Equal => return Ok(0),
        std::cmp::Ordering::Less => {
            let _size = read_long(reader)?;
            raw_len.checked_neg().ok_or(Details::IntegerOverflow)?
        }
        std::cmp::Ordering::Greater => raw_len,
    };
    let len = usize::try_from(len).map_err(|_| Details::InvalidLength(len))?;
    safe_len(len)
}

fn read_exact_buf<R: Read>(reader: &mut R, len: usize) -> AvroResult<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(Details::TruncatedInput)?;
    Ok(buf)
}

pub(crate) fn decode_internal<R: Read, S: Borrow<Schema>>(
    schema: &Schema,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
    options: &Options,
    reader: &mut R,
) -> AvroResult<Value> {
    match schema {
        Schema::Ref { name } => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            let resolved = names
                .get(&fully_qualified_name)
                .ok_or(Details::UnresolvedReference(fully_qualified_name.clone()))?;
            decode_internal(
                resolved.borrow(),
                names,
                &fully_qualified_name.namespace,
                options,
                reader,
            )
        }
        Schema::Null => Ok(Value::Null),
        Schema::Boolean => {
            let byte = read_exact_buf(reader, 1)?[0];
            match byte {
                0u8 => Ok(Value::Boolean(false)),
                1u8 => Ok(Value::Boolean(true)),
                other => Err(Details::InvalidBoolean(other).into()),
            }
        }
        Schema::Int => read_int(reader).map(Value::Int),
        Schema::Long => read_long(reader).map(Value::Long),
        Schema::Float => {
            let buf = read_exact_buf(reader, 4)?;
            Ok(Value::Float(f32::from_le_bytes(
                buf.try_into().expect("exactly four bytes"),
            )))
        }
        Schema::Double => {
            let buf = read_exact_buf(reader, 8)?;
            Ok(Value::Double(f64::from_le_bytes(
                buf.try_into().expect("exactly eight bytes"),
            )))
        }
        Schema::Bytes => {
            let len = decode_len(reader)?;
            Ok(Value::Bytes(read_exact_buf(reader, len)?))
        }
        Schema::String => {
            let len = decode_len(reader)?;
            let string =
                String::from_utf8(read_exact_buf(reader, len)?).map_err(Details::InvalidUtf8)?;
            if options.string_types_default_to_logical_uuid && string.len() == 36 {
                if let Ok(uuid) = Uuid::from_str(&string) {
                    return Ok(Value::Uuid(uuid));
                }
            }
            Ok(Value::String(string))
        }
        Schema::Fixed(FixedSchema { size, .. }) => {
            Ok(Value::Fixed(*size, read_exact_buf(reader, *size)?))
        }
        Schema::Array(inner) => {
            let mut items = Vec::new();

            loop {
                let len = decode_seq_len(reader)?;
                if len == 0 {
                    break;
                }

                items.reserve(len);
                for _ in 0..len {
                    items.push(decode_internal(
                        inner,
                        names,
                        enclosing_namespace,
                        options,
                        reader,
                    )?);
                }
            }

            Ok(Value::Array(items))
        }
        Schema::Map(inner) => {
            let mut items = HashMap::new();

            loop {
                let len = decode_seq_len(reader)?;
                if len == 0 {
                    break;
                }

                items.reserve(len);
                for _ in 0..len {
                    // keys are plain strings, never subject to uuid detection
                    let key_len = decode_len(reader)?;
                    let key = String::from_utf8(read_exact_buf(reader, key_len)?)
                        .map_err(Details::InvalidUtf8)?;
                    let value =
                        decode_internal(inner, names, enclosing_namespace, options, reader)?;
                    items.insert(key, value);
                }
            }

            Ok(Value::Map(items))
        }
        Schema::Union(UnionSchema { schemas, .. }) => {
            let index = read_long(reader)?;
            let branch = usize::try_from(index)
                .ok()
                .and_then(|i| schemas.get(i))
                .ok_or(Details::InvalidUnionTag {
                    index,
                    num_branches: schemas.len(),
                })?;
            let value = decode_internal(branch, names, enclosing_namespace, options, reader)?;
            Ok(Value::Union(index as u32, Box::new(value)))
        }
        Schema::Record(record) => {
            let fully_qualified_name = record.name.fully_qualified_name(enclosing_namespace);
            let mut items = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let value = decode_internal(
                    &field.schema,
                    names,
                    &fully_qualified_name.namespace,
                    options,
                    reader,
                )?;
                items.push((field.name.clone(), value));
            }
            if options.record_decodes_to_dict {
                Ok(Value::Map(items.into_iter().collect()))
            } else {
                // decoded records carry the identity of the compilation that
                // shaped them
                Ok(Value::Record(RecordValue {
                    schema_id: Some(record.id),
                    fields: items,
                }))
            }
        }
        Schema::Enum(EnumSchema { symbols, .. }) => {
            let raw_index = read_int(reader)?;
            let symbol = usize::try_from(raw_index)
                .ok()
                .and_then(|i| symbols.get(i));
            match symbol {
                Some(symbol) => Ok(Value::Enum(raw_index as u32, symbol.clone())),
                None => Err(Details::EnumIndexOutOfRange {
                    index: i64::from(raw_index),
                    nsymbols: symbols.len(),
                }
                .into()),
            }
        }
        Schema::Decimal(DecimalSchema { inner, .. }) => {
            let buf = match inner.as_ref() {
                Schema::Fixed(FixedSchema { size, .. }) => read_exact_buf(reader, *size)?,
                _ => {
                    let len = decode_len(reader)?;
                    read_exact_buf(reader, len)?
                }
            };
            Ok(Value::Decimal(Decimal::from(buf)))
        }
        Schema::Uuid => {
            let len = decode_len(reader)?;
            let string =
                String::from_utf8(read_exact_buf(reader, len)?).map_err(Details::InvalidUtf8)?;
            // A malformed payload falls back to the physical string so that
            // unknown producers still round-trip.
            Ok(match Uuid::from_str(&string) {
                Ok(uuid) => Value::Uuid(uuid),
                Err(_) => Value::String(string),
            })
        }
        Schema::Date => read_int(reader).map(Value::Date),
        Schema::TimeMillis => read_int(reader).map(Value::TimeMillis),
        Schema::TimeMicros => read_long(reader).map(Value::TimeMicros),
        Schema::TimestampMillis => read_long(reader).map(Value::TimestampMillis),
        Schema::TimestampMicros => read_long(reader).map(Value::TimestampMicros),
        Schema::Duration(_) => {
            let buf = read_exact_buf(reader, 12)?;
            let array: [u8; 12] = buf.try_into().expect("exactly twelve bytes");
            Ok(Value::Duration(Duration::from(array)))
        }
    }
}
