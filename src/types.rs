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

//! Logic handling the intermediate representation of Avro values.

use crate::{
    AvroResult,
    decimal::Decimal,
    duration::Duration,
    error::Details,
    schema::{
        EnumSchema, FixedSchema, Name, Names, Namespace, RecordSchema, ResolvedSchema, Schema,
        SchemaKind, UnionSchema, resolve_names, resolve_names_with_schemata,
    },
};
use serde_json::Value as JsonValue;
use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    str::FromStr,
};
use strum::EnumDiscriminants;
use uuid::Uuid;

/// A `record` value: ordered `(field name, value)` pairs plus the opaque
/// identity of the schema compilation that produced them.
///
/// Equality ignores the identity — two records with equal fields are equal no
/// matter where they came from. Record adaptation uses the identity to
/// short-circuit same-schema encodes and to recognize values from a foreign
/// compilation.
#[derive(Clone, Debug)]
pub struct RecordValue {
    /// Handle of the originating record schema; `None` for hand-built values.
    pub schema_id: Option<u64>,
    /// The fields, in declaration order of the originating schema.
    pub fields: Vec<(String, Value)>,
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl From<Vec<(String, Value)>> for RecordValue {
    fn from(fields: Vec<(String, Value)>) -> Self {
        Self {
            schema_id: None,
            fields,
        }
    }
}

/// Represents any valid Avro value.
///
/// More information about Avro values can be found in the
/// [Avro Specification](https://avro.apache.org/docs/current/specification/#schema-declaration)
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind))]
pub enum Value {
    /// A `null` Avro value.
    Null,
    /// A `boolean` Avro value.
    Boolean(bool),
    /// A `int` Avro value.
    Int(i32),
    /// A `long` Avro value.
    Long(i64),
    /// A `float` Avro value.
    Float(f32),
    /// A `double` Avro value.
    Double(f64),
    /// A `bytes` Avro value.
    Bytes(Vec<u8>),
    /// A `string` Avro value.
    String(String),
    /// A `fixed` Avro value.
    /// This variant holds the data length, and the data itself.
    Fixed(usize, Vec<u8>),
    /// An `enum` Avro value.
    ///
    /// An Enum is represented by a symbol and its position in the symbols
    /// list of its corresponding schema. This allows schema-less encoding,
    /// as well as schema resolution while reading values.
    Enum(u32, String),
    /// An `union` Avro value.
    ///
    /// A Union is represented by the value it holds and its position in the
    /// types list of its corresponding schema.
    Union(u32, Box<Value>),
    /// An `array` Avro value.
    Array(Vec<Value>),
    /// A `map` Avro value.
    Map(HashMap<String, Value>),
    /// A `record` Avro value. See [`RecordValue`].
    Record(RecordValue),
    /// A `decimal` logical value: an unscaled two's-complement integer.
    Decimal(Decimal),
    /// A `uuid` logical value.
    Uuid(Uuid),
    /// Number of days since the unix epoch.
    Date(i32),
    /// Milliseconds since midnight.
    TimeMillis(i32),
    /// Microseconds since midnight.
    TimeMicros(i64),
    /// Milliseconds since the unix epoch.
    TimestampMillis(i64),
    /// Microseconds since the unix epoch.
    TimestampMicros(i64),
    /// A months/days/milliseconds triple.
    Duration(Duration),
}

macro_rules! to_value(
    ($type:ty, $variant_constructor:expr) => (
        impl From<$type> for Value {
            fn from(value: $type) -> Self {
                $variant_constructor(value)
            }
        }
    );
);

to_value!(bool, Value::Boolean);
to_value!(i32, Value::Int);
to_value!(i64, Value::Long);
to_value!(f32, Value::Float);
to_value!(f64, Value::Double);
to_value!(String, Value::String);
to_value!(Uuid, Value::Uuid);
to_value!(Decimal, Value::Decimal);
to_value!(Duration, Value::Duration);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        // here we assume the round-trip default of ["null", T]
        match value {
            Some(v) => Self::Union(1, Box::new(v.into())),
            None => Self::Union(0, Box::new(Self::Null)),
        }
    }
}

impl<K, V> From<HashMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Self>,
{
    fn from(value: HashMap<K, V>) -> Self {
        Self::Map(
            value
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Utility interface to build `Value::Record` objects.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    /// List of fields attached to the record object in form of
    /// `(field name, value)`.
    pub fields: Vec<(String, Value)>,
    schema_id: u64,
    schema_lookup: &'a BTreeMap<String, usize>,
}

impl<'a> Record<'a> {
    /// Create a `Record` given a `Schema`.
    ///
    /// If the `Schema` is not a `Schema::Record` variant, `None` will be
    /// returned.
    pub fn new(schema: &Schema) -> Option<Record<'_>> {
        match *schema {
            Schema::Record(ref record) => {
                let mut fields = Vec::with_capacity(record.fields.len());
                for schema_field in record.fields.iter() {
                    fields.push((schema_field.name.clone(), Value::Null));
                }

                Some(Record {
                    fields,
                    schema_id: record.id,
                    schema_lookup: &record.lookup,
                })
            }
            _ => None,
        }
    }

    /// Put a compatible value (anything convertible into a [`Value`]) in the
    /// `Record` for a given `field` name.
    ///
    /// **NOTE** Only ensure that the field name is present in the `Schema`
    /// given when creating this `Record`. Does not perform any schema
    /// validation.
    pub fn put<V>(&mut self, field: &str, value: V)
    where
        V: Into<Value>,
    {
        if let Some(&position) = self.schema_lookup.get(field) {
            self.fields[position].1 = value.into()
        }
    }
}

impl<'a> From<Record<'a>> for Value {
    fn from(value: Record<'a>) -> Self {
        Self::Record(RecordValue {
            schema_id: Some(value.schema_id),
            fields: value.fields,
        })
    }
}

impl TryFrom<Value> for JsonValue {
    type Error = crate::Error;

    fn try_from(value: Value) -> AvroResult<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Boolean(b) => Ok(Self::Bool(b)),
            Value::Int(i) => Ok(Self::Number(i.into())),
            Value::Long(l) => Ok(Self::Number(l.into())),
            Value::Float(f) => serde_json::Number::from_f64(f.into())
                .map(Self::Number)
                .ok_or_else(|| Details::NonFiniteDouble(f.into()).into()),
            Value::Double(d) => serde_json::Number::from_f64(d)
                .map(Self::Number)
                .ok_or_else(|| Details::NonFiniteDouble(d).into()),
            Value::Bytes(bytes) => Ok(Self::Array(
                bytes.into_iter().map(|b| b.into()).collect(),
            )),
            Value::String(s) => Ok(Self::String(s)),
            Value::Fixed(_size, items) => Ok(Self::Array(
                items.into_iter().map(|v| v.into()).collect(),
            )),
            Value::Enum(_i, s) => Ok(Self::String(s)),
            Value::Union(_i, b) => Self::try_from(*b),
            Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            Value::Map(items) => items
                .into_iter()
                .map(|(key, value)| Self::try_from(value).map(|v| (key, v)))
                .collect::<Result<Vec<_>, _>>()
                .map(|v| Self::Object(v.into_iter().collect())),
            Value::Record(record) => record
                .fields
                .into_iter()
                .map(|(key, value)| Self::try_from(value).map(|v| (key, v)))
                .collect::<Result<Vec<_>, _>>()
                .map(|v| Self::Object(v.into_iter().collect())),
            Value::Decimal(ref d) => <Vec<u8>>::try_from(d)
                .map(|vec| Self::Array(vec.into_iter().map(|v| v.into()).collect())),
            Value::Uuid(uuid) => Ok(Self::String(uuid.as_hyphenated().to_string())),
            Value::Date(d) => Ok(Self::Number(d.into())),
            Value::TimeMillis(t) => Ok(Self::Number(t.into())),
            Value::TimeMicros(t) => Ok(Self::Number(t.into())),
            Value::TimestampMillis(t) => Ok(Self::Number(t.into())),
            Value::TimestampMicros(t) => Ok(Self::Number(t.into())),
            Value::Duration(d) => Ok(Self::Array(
                <[u8; 12]>::from(d).iter().map(|&v| v.into()).collect(),
            )),
        }
    }
}

/// Classifies a JSON value the way [`Value`] would represent it, for error
/// reporting.
pub(crate) fn json_value_kind(json: &JsonValue) -> ValueKind {
    match json {
        JsonValue::Null => ValueKind::Null,
        JsonValue::Bool(_) => ValueKind::Boolean,
        JsonValue::Number(n) => {
            if n.is_i64() {
                let v = n.as_i64().unwrap_or_default();
                if i32::try_from(v).is_ok() {
                    ValueKind::Int
                } else {
                    ValueKind::Long
                }
            } else {
                ValueKind::Double
            }
        }
        JsonValue::String(_) => ValueKind::String,
        JsonValue::Array(_) => ValueKind::Array,
        JsonValue::Object(_) => ValueKind::Map,
    }
}

/// Reads a JSON string as the byte sequence of its code points, the Avro JSON
/// representation of `bytes` and `fixed` defaults.
fn json_string_to_bytes(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| {
            let cp = c as u32;
            u8::try_from(cp).ok()
        })
        .collect()
}

impl Value {
    /// A record value with no schema identity attached (a hand-built
    /// literal).
    pub fn record(fields: Vec<(String, Value)>) -> Self {
        Self::Record(RecordValue {
            schema_id: None,
            fields,
        })
    }

    /// Validate the value against the given [Schema].
    ///
    /// See the [Avro specification](https://avro.apache.org/docs/current/specification)
    /// for the full set of rules of schema validation.
    pub fn validate(&self, schema: &Schema) -> bool {
        match ResolvedSchema::try_from(schema) {
            Ok(rs) => self
                .validate_internal(schema, rs.get_names(), &schema.namespace())
                .is_none(),
            Err(_) => false,
        }
    }

    /// Validates the value against the provided schema, returning the reason
    /// of the first mismatch found, if any. The reason includes the dotted
    /// path of the offending value.
    pub(crate) fn validate_internal<S: Borrow<Schema>>(
        &self,
        schema: &Schema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
    ) -> Option<String> {
        match (self, schema) {
            (_, Schema::Ref { name }) => {
                let name = name.fully_qualified_name(enclosing_namespace);
                match names.get(&name) {
                    Some(resolved) => {
                        self.validate_internal(resolved.borrow(), names, &name.namespace)
                    }
                    None => Some(format!("Unresolved schema reference: '{name}'")),
                }
            }
            (&Value::Null, &Schema::Null) => None,
            (&Value::Boolean(_), &Schema::Boolean) => None,
            (&Value::Int(_), &Schema::Int) => None,
            (&Value::Int(_), &Schema::Long)
            | (&Value::Int(_), &Schema::Float)
            | (&Value::Int(_), &Schema::Double) => None,
            (&Value::Int(_), &Schema::Date) | (&Value::Int(_), &Schema::TimeMillis) => None,
            (&Value::Long(_), &Schema::Long)
            | (&Value::Long(_), &Schema::Float)
            | (&Value::Long(_), &Schema::Double) => None,
            (&Value::Long(_), &Schema::TimeMicros)
            | (&Value::Long(_), &Schema::TimestampMillis)
            | (&Value::Long(_), &Schema::TimestampMicros) => None,
            (&Value::Float(_), &Schema::Float) | (&Value::Float(_), &Schema::Double) => None,
            (&Value::Double(_), &Schema::Double) => None,
            (&Value::Double(n), &Schema::Float) => {
                // allowed only when the downcast is bit-exact
                if (n as f32) as f64 == n {
                    None
                } else {
                    Some(format!("Double {n} cannot be downcast to Float exactly"))
                }
            }
            (&Value::Bytes(_), &Schema::Bytes) => None,
            (Value::Bytes(bytes), &Schema::Fixed(FixedSchema { size, .. })) => {
                if bytes.len() == size {
                    None
                } else {
                    Some(format!(
                        "Bytes of length {} do not match Fixed of size {size}",
                        bytes.len()
                    ))
                }
            }
            (&Value::Bytes(_), &Schema::Decimal(_)) => None,
            (&Value::String(_), &Schema::String) => None,
            (&Value::String(_), &Schema::Uuid) => None,
            (Value::String(s), Schema::Enum(EnumSchema { symbols, .. })) => {
                if symbols.contains(s) {
                    None
                } else {
                    Some(format!("'{s}' is not a member of the possible symbols"))
                }
            }
            (Value::Fixed(n, _), &Schema::Fixed(FixedSchema { size, .. })) => {
                if *n == size {
                    None
                } else {
                    Some(format!(
                        "The value's size ({n}) is different than the schema's size ({size})"
                    ))
                }
            }
            (Value::Fixed(n, _), &Schema::Duration(_)) => {
                if *n == 12 {
                    None
                } else {
                    Some(format!("The value's size ('{n}') must be exactly 12"))
                }
            }
            (Value::Fixed(n, _), Schema::Decimal(decimal)) => match decimal.inner.as_ref() {
                Schema::Fixed(FixedSchema { size, .. }) => {
                    if n == size {
                        None
                    } else {
                        Some(format!(
                            "The value's size ({n}) is different than the decimal's size ({size})"
                        ))
                    }
                }
                _ => Some("Fixed value for a decimal with bytes encoding".to_string()),
            },
            (&Value::Decimal(_), &Schema::Decimal(_)) => None,
            (&Value::Uuid(_), &Schema::Uuid) | (&Value::Uuid(_), &Schema::String) => None,
            (&Value::Date(_), &Schema::Date) | (&Value::Date(_), &Schema::Int) => None,
            (&Value::TimeMillis(_), &Schema::TimeMillis)
            | (&Value::TimeMillis(_), &Schema::Int) => None,
            (&Value::TimeMicros(_), &Schema::TimeMicros)
            | (&Value::TimeMicros(_), &Schema::Long) => None,
            (&Value::TimestampMillis(_), &Schema::TimestampMillis)
            | (&Value::TimestampMillis(_), &Schema::Long) => None,
            (&Value::TimestampMicros(_), &Schema::TimestampMicros)
            | (&Value::TimestampMicros(_), &Schema::Long) => None,
            (&Value::Duration(_), &Schema::Duration(_)) => None,
            (Value::Enum(i, s), Schema::Enum(EnumSchema { symbols, .. })) => symbols
                .get(*i as usize)
                .map(|ref symbol| {
                    if symbol != &s {
                        Some(format!("Symbol '{s}' is not at position '{i}'"))
                    } else {
                        None
                    }
                })
                .unwrap_or_else(|| Some(format!("No symbol at position '{i}'"))),
            (Value::Union(i, value), Schema::Union(inner)) => inner
                .variants()
                .get(*i as usize)
                .map(|schema| value.validate_internal(schema, names, enclosing_namespace))
                .unwrap_or_else(|| Some(format!("No schema in the union at position '{i}'"))),
            (v, Schema::Union(inner)) => {
                if inner.variants().iter().any(|schema| {
                    v.validate_internal(schema, names, enclosing_namespace)
                        .is_none()
                }) {
                    None
                } else {
                    Some("Could not find matching union branch".to_string())
                }
            }
            (Value::Array(items), Schema::Array(inner)) => {
                items.iter().enumerate().find_map(|(index, item)| {
                    item.validate_internal(inner, names, enclosing_namespace)
                        .map(|reason| format!("[{index}]: {reason}"))
                })
            }
            (Value::Map(items), Schema::Map(inner)) => items.iter().find_map(|(key, value)| {
                value
                    .validate_internal(inner, names, enclosing_namespace)
                    .map(|reason| format!(".{key}: {reason}"))
            }),
            (
                Value::Record(record_value),
                Schema::Record(RecordSchema { name, fields, .. }),
            ) => {
                let record_namespace = name.fully_qualified_name(enclosing_namespace).namespace;
                // Unknown keys are tolerated here; the encoder enforces the
                // record_allow_extra_fields option.
                let provided: HashMap<&str, &Value> = record_value
                    .fields
                    .iter()
                    .map(|(name, value)| (name.as_str(), value))
                    .collect();

                fields.iter().find_map(|field| {
                    let value = provided.get(field.name.as_str()).copied().or_else(|| {
                        field
                            .aliases
                            .iter()
                            .find_map(|alias| provided.get(alias.as_str()).copied())
                    });
                    match value {
                        Some(value) => value
                            .validate_internal(&field.schema, names, &record_namespace)
                            .map(|reason| format!(".{}: {reason}", field.name)),
                        None if field.default.is_some() => None,
                        None => Some(format!("Missing field '{}'", field.name)),
                    }
                })
            }
            (
                Value::Map(items),
                Schema::Record(RecordSchema { name, fields, .. }),
            ) => {
                let record_namespace = name.fully_qualified_name(enclosing_namespace).namespace;
                fields.iter().find_map(|field| {
                    match items.get(&field.name).or_else(|| {
                        field.aliases.iter().find_map(|alias| items.get(alias))
                    }) {
                        Some(value) => value
                            .validate_internal(&field.schema, names, &record_namespace)
                            .map(|reason| format!(".{}: {reason}", field.name)),
                        None if field.default.is_some() => None,
                        None => Some(format!("Missing field '{}'", field.name)),
                    }
                })
            }
            (value, schema) => Some(format!(
                "Unsupported value-schema combination: {:?} and {:?}",
                ValueKind::from(value),
                SchemaKind::from(schema)
            )),
        }
    }

    /// Attempt to perform schema resolution on the value, with the given
    /// [Schema](../schema/enum.Schema.html).
    ///
    /// See [Schema Resolution](https://avro.apache.org/docs/current/specification/#schema-resolution)
    /// in the Avro specification for the full set of rules of schema
    /// resolution.
    pub fn resolve(self, schema: &Schema) -> AvroResult<Self> {
        let enclosing_namespace = schema.namespace();
        let rs = ResolvedSchema::try_from(schema)?;
        self.resolve_internal(schema, rs.get_names(), &enclosing_namespace, &None)
    }

    /// Attempt to perform schema resolution on the value, with the given
    /// [Schema](../schema/enum.Schema.html) and set of schemas to use for
    /// resolving any `Schema::Ref`s.
    pub fn resolve_schemata(self, schema: &Schema, schemata: Vec<&Schema>) -> AvroResult<Self> {
        let enclosing_namespace = schema.namespace();
        let mut names = Names::new();
        resolve_names_with_schemata(schemata, &mut names, &enclosing_namespace)?;
        // the schema itself may already be among the provided schemata; its
        // named types only fill remaining gaps
        let mut own = Names::new();
        let _ = resolve_names(schema, &mut own, &enclosing_namespace);
        for (name, resolved) in own {
            names.entry(name).or_insert(resolved);
        }
        self.resolve_internal(schema, &names, &enclosing_namespace, &None)
    }

    pub(crate) fn resolve_internal<S: Borrow<Schema>>(
        mut self,
        schema: &Schema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
        field_default: &Option<JsonValue>,
    ) -> AvroResult<Self> {
        // Check if this schema is a union, and if the reader schema is not.
        if ValueKind::from(&self) == ValueKind::Union
            && SchemaKind::from(schema) != SchemaKind::Union
        {
            // Pull out the Union, and attempt to resolve against it.
            let v = match self {
                Value::Union(_i, b) => *b,
                _ => unreachable!(),
            };
            self = v;
        }
        match *schema {
            Schema::Ref { ref name } => {
                let name = name.fully_qualified_name(enclosing_namespace);

                if let Some(resolved) = names.get(&name) {
                    self.resolve_internal(resolved.borrow(), names, &name.namespace, field_default)
                } else {
                    Err(Details::UnresolvedReference(name).into())
                }
            }
            Schema::Null => self.resolve_null(),
            Schema::Boolean => self.resolve_boolean(),
            Schema::Int => self.resolve_int(),
            Schema::Long => self.resolve_long(),
            Schema::Float => self.resolve_float(),
            Schema::Double => self.resolve_double(),
            Schema::Bytes => self.resolve_bytes(),
            Schema::String => self.resolve_string(),
            Schema::Fixed(FixedSchema { size, .. }) => self.resolve_fixed(size),
            Schema::Union(ref inner) => {
                self.resolve_union(inner, names, enclosing_namespace, field_default)
            }
            Schema::Enum(EnumSchema {
                ref symbols,
                ref default,
                ..
            }) => self.resolve_enum(symbols, default, field_default),
            Schema::Array(ref inner) => self.resolve_array(inner, names, enclosing_namespace),
            Schema::Map(ref inner) => self.resolve_map(inner, names, enclosing_namespace),
            Schema::Record(ref record) => self.resolve_record(record, names, enclosing_namespace),
            Schema::Decimal(ref decimal) => self.resolve_decimal(decimal),
            Schema::Uuid => self.resolve_uuid(),
            Schema::Date => self.resolve_date(),
            Schema::TimeMillis => self.resolve_time_millis(),
            Schema::TimeMicros => self.resolve_time_micros(),
            Schema::TimestampMillis => self.resolve_timestamp_millis(),
            Schema::TimestampMicros => self.resolve_timestamp_micros(),
            Schema::Duration(_) => self.resolve_duration(),
        }
    }

    fn mismatch(self, target: SchemaKind) -> crate::Error {
        Details::ResolutionMismatch {
            target,
            value: self,
        }
        .into()
    }

    fn resolve_null(self) -> AvroResult<Self> {
        match self {
            Value::Null => Ok(Value::Null),
            other => Err(other.mismatch(SchemaKind::Null)),
        }
    }

    fn resolve_boolean(self) -> AvroResult<Self> {
        match self {
            Value::Boolean(b) => Ok(Value::Boolean(b)),
            other => Err(other.mismatch(SchemaKind::Boolean)),
        }
    }

    fn resolve_int(self) -> AvroResult<Self> {
        match self {
            Value::Int(n) => Ok(Value::Int(n)),
            other => Err(other.mismatch(SchemaKind::Int)),
        }
    }

    fn resolve_long(self) -> AvroResult<Self> {
        match self {
            Value::Int(n) => Ok(Value::Long(i64::from(n))),
            Value::Long(n) => Ok(Value::Long(n)),
            other => Err(other.mismatch(SchemaKind::Long)),
        }
    }

    fn resolve_float(self) -> AvroResult<Self> {
        match self {
            Value::Int(n) => Ok(Value::Float(n as f32)),
            Value::Long(n) => Ok(Value::Float(n as f32)),
            Value::Float(x) => Ok(Value::Float(x)),
            other => Err(other.mismatch(SchemaKind::Float)),
        }
    }

    fn resolve_double(self) -> AvroResult<Self> {
        match self {
            Value::Int(n) => Ok(Value::Double(f64::from(n))),
            Value::Long(n) => Ok(Value::Double(n as f64)),
            Value::Float(x) => Ok(Value::Double(f64::from(x))),
            Value::Double(x) => Ok(Value::Double(x)),
            other => Err(other.mismatch(SchemaKind::Double)),
        }
    }

    fn resolve_bytes(self) -> AvroResult<Self> {
        match self {
            Value::Bytes(bytes) => Ok(Value::Bytes(bytes)),
            Value::String(s) => Ok(Value::Bytes(s.into_bytes())),
            other => Err(other.mismatch(SchemaKind::Bytes)),
        }
    }

    fn resolve_string(self) -> AvroResult<Self> {
        match self {
            Value::String(s) => Ok(Value::String(s)),
            Value::Bytes(bytes) => Ok(Value::String(
                String::from_utf8(bytes).map_err(Details::InvalidUtf8)?,
            )),
            other => Err(other.mismatch(SchemaKind::String)),
        }
    }

    fn resolve_fixed(self, size: usize) -> AvroResult<Self> {
        match self {
            Value::Fixed(n, bytes) => {
                if n == size {
                    Ok(Value::Fixed(n, bytes))
                } else {
                    Err(Details::FixedSizeMismatch {
                        expected: size,
                        actual: n,
                    }
                    .into())
                }
            }
            Value::Bytes(bytes) => {
                if bytes.len() == size {
                    Ok(Value::Fixed(size, bytes))
                } else {
                    Err(Details::FixedSizeMismatch {
                        expected: size,
                        actual: bytes.len(),
                    }
                    .into())
                }
            }
            Value::String(s) => {
                if s.len() == size {
                    Ok(Value::Fixed(size, s.into_bytes()))
                } else {
                    Err(Details::FixedSizeMismatch {
                        expected: size,
                        actual: s.len(),
                    }
                    .into())
                }
            }
            other => Err(other.mismatch(SchemaKind::Fixed)),
        }
    }

    pub(crate) fn resolve_enum(
        self,
        symbols: &[String],
        enum_default: &Option<String>,
        field_default: &Option<JsonValue>,
    ) -> AvroResult<Self> {
        let pick = |wanted: &str| {
            symbols
                .iter()
                .position(|candidate| candidate == wanted)
                .map(|index| Value::Enum(index as u32, wanted.to_string()))
        };

        match self {
            Value::Enum(_, symbol) | Value::String(symbol) => pick(&symbol)
                .or_else(|| enum_default.as_deref().and_then(pick))
                .or_else(|| match field_default {
                    Some(JsonValue::String(fallback)) => pick(fallback),
                    _ => None,
                })
                .ok_or_else(|| {
                    Details::EnumMismatch {
                        symbol,
                        symbols: symbols.to_vec(),
                    }
                    .into()
                }),
            other => Err(other.mismatch(SchemaKind::Enum)),
        }
    }

    fn resolve_union<S: Borrow<Schema>>(
        self,
        schema: &UnionSchema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
        field_default: &Option<JsonValue>,
    ) -> AvroResult<Self> {
        let v = match self {
            // Both are unions case.
            Value::Union(_i, v) => *v,
            // Reader is a union, but writer is not.
            v => v,
        };

        // A union might contain references to another schema in the form of
        // a Schema::Ref, resolve these prior to finding the schema.
        let resolved_schemas: Vec<Schema> = schema
            .variants()
            .iter()
            .map(|schema| match schema {
                Schema::Ref { name } => {
                    let name = name.fully_qualified_name(enclosing_namespace);
                    names
                        .get(&name)
                        .map(|s| s.borrow().clone())
                        .ok_or_else(|| crate::Error::new(Details::UnresolvedReference(name)))
                }
                schema => Ok(schema.clone()),
            })
            .collect::<Result<_, _>>()?;

        let (i, inner) = resolved_schemas
            .iter()
            .enumerate()
            .find_map(|(i, candidate)| {
                v.clone()
                    .resolve_internal(candidate, names, enclosing_namespace, field_default)
                    .ok()
                    .map(|resolved| (i, resolved))
            })
            .ok_or_else(|| {
                crate::Error::new(Details::DispatchNoMatch {
                    branches: schema.branch_names(),
                    value_kind: ValueKind::from(&v),
                })
            })?;

        Ok(Value::Union(i as u32, Box::new(inner)))
    }

    fn resolve_array<S: Borrow<Schema>>(
        self,
        schema: &Schema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Self> {
        match self {
            Value::Array(items) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(|item| item.resolve_internal(schema, names, enclosing_namespace, &None))
                    .collect::<Result<_, _>>()?,
            )),
            other => Err(other.mismatch(SchemaKind::Array)),
        }
    }

    fn resolve_map<S: Borrow<Schema>>(
        self,
        schema: &Schema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Self> {
        match self {
            Value::Map(items) => Ok(Value::Map(
                items
                    .into_iter()
                    .map(|(key, value)| {
                        value
                            .resolve_internal(schema, names, enclosing_namespace, &None)
                            .map(|value| (key, value))
                    })
                    .collect::<Result<_, _>>()?,
            )),
            other => Err(other.mismatch(SchemaKind::Map)),
        }
    }

    fn resolve_record<S: Borrow<Schema>>(
        self,
        record: &RecordSchema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Self> {
        let record_namespace = record
            .name
            .fully_qualified_name(enclosing_namespace)
            .namespace;
        let mut items = match self {
            Value::Map(items) => items,
            Value::Record(value) => value.fields.into_iter().collect::<HashMap<_, _>>(),
            other => return Err(other.mismatch(SchemaKind::Record)),
        };

        let new_fields = record
            .fields
            .iter()
            .map(|field| {
                let value = match items
                    .remove(&field.name)
                    .or_else(|| {
                        field
                            .aliases
                            .iter()
                            .find_map(|alias| items.remove(alias))
                    }) {
                    Some(value) => value,
                    None => match field.default {
                        Some(ref default_json) => Value::from_json_with_schema(
                            default_json,
                            &field.schema,
                            names,
                            &record_namespace,
                            false,
                        )?,
                        None => return Err(Details::MissingField(field.name.clone()).into()),
                    },
                };
                value
                    .resolve_internal(&field.schema, names, &record_namespace, &field.default)
                    .map(|value| (field.name.clone(), value))
            })
            .collect::<Result<Vec<_>, crate::Error>>()?;

        Ok(Value::Record(RecordValue {
            schema_id: Some(record.id),
            fields: new_fields,
        }))
    }

    fn resolve_decimal(self, decimal: &crate::schema::DecimalSchema) -> AvroResult<Self> {
        match self {
            Value::Decimal(d) => Ok(Value::Decimal(d)),
            Value::Bytes(bytes) => Ok(Value::Decimal(Decimal::from(bytes))),
            Value::Fixed(size, bytes) => match decimal.inner.as_ref() {
                Schema::Fixed(FixedSchema { size: expected, .. }) if size != *expected => {
                    Err(Details::FixedSizeMismatch {
                        expected: *expected,
                        actual: size,
                    }
                    .into())
                }
                _ => Ok(Value::Decimal(Decimal::from(bytes))),
            },
            other => Err(other.mismatch(SchemaKind::Decimal)),
        }
    }

    fn resolve_uuid(self) -> AvroResult<Self> {
        match self {
            Value::Uuid(uuid) => Ok(Value::Uuid(uuid)),
            Value::String(ref string) => Ok(Value::Uuid(
                Uuid::from_str(string).map_err(Details::InvalidUuid)?,
            )),
            other => Err(other.mismatch(SchemaKind::Uuid)),
        }
    }

    fn resolve_date(self) -> AvroResult<Self> {
        match self {
            Value::Date(d) | Value::Int(d) => Ok(Value::Date(d)),
            other => Err(other.mismatch(SchemaKind::Date)),
        }
    }

    fn resolve_time_millis(self) -> AvroResult<Self> {
        match self {
            Value::TimeMillis(t) | Value::Int(t) => Ok(Value::TimeMillis(t)),
            other => Err(other.mismatch(SchemaKind::TimeMillis)),
        }
    }

    fn resolve_time_micros(self) -> AvroResult<Self> {
        match self {
            Value::TimeMicros(t) | Value::Long(t) => Ok(Value::TimeMicros(t)),
            Value::Int(t) => Ok(Value::TimeMicros(i64::from(t))),
            other => Err(other.mismatch(SchemaKind::TimeMicros)),
        }
    }

    fn resolve_timestamp_millis(self) -> AvroResult<Self> {
        match self {
            Value::TimestampMillis(ts) | Value::Long(ts) => Ok(Value::TimestampMillis(ts)),
            Value::Int(ts) => Ok(Value::TimestampMillis(i64::from(ts))),
            other => Err(other.mismatch(SchemaKind::TimestampMillis)),
        }
    }

    fn resolve_timestamp_micros(self) -> AvroResult<Self> {
        match self {
            Value::TimestampMicros(ts) | Value::Long(ts) => Ok(Value::TimestampMicros(ts)),
            Value::Int(ts) => Ok(Value::TimestampMicros(i64::from(ts))),
            other => Err(other.mismatch(SchemaKind::TimestampMicros)),
        }
    }

    fn resolve_duration(self) -> AvroResult<Self> {
        match self {
            Value::Duration(duration) => Ok(Value::Duration(duration)),
            Value::Fixed(size, bytes) => {
                if size != 12 {
                    return Err(Value::Fixed(size, bytes).mismatch(SchemaKind::Duration));
                }
                let mut array = [0u8; 12];
                array.copy_from_slice(&bytes);
                Ok(Value::Duration(Duration::from(array)))
            }
            other => Err(other.mismatch(SchemaKind::Duration)),
        }
    }

    /// Build a `Value` from its JSON representation, guided by a schema.
    ///
    /// The inverse of [`JsonValue::try_from`]: the JSON codec path. Union
    /// values match the first accepting branch.
    pub fn from_json(json: &JsonValue, schema: &Schema) -> AvroResult<Self> {
        let rs = ResolvedSchema::try_from(schema)?;
        Self::from_json_with_schema(json, schema, rs.get_names(), &schema.namespace(), true)
    }

    /// Build a fresh `Value` from a JSON value, guided by a schema.
    ///
    /// This is the conversion used for record field defaults (validation at
    /// compile time, deep-copied injection at encode and resolution time) and
    /// for the JSON value codec. Union values match the first branch only,
    /// unless `allow_any_union_branch` is set.
    pub(crate) fn from_json_with_schema<S: Borrow<Schema>>(
        json: &JsonValue,
        schema: &Schema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
        allow_any_union_branch: bool,
    ) -> AvroResult<Self> {
        let mismatch = || {
            crate::Error::new(Details::JsonValueMismatch {
                value: json.clone(),
                schema: SchemaKind::from(schema),
            })
        };
        match schema {
            Schema::Ref { name } => {
                let name = name.fully_qualified_name(enclosing_namespace);
                match names.get(&name).map(Borrow::borrow) {
                    // a reference chain means the registry is still being
                    // built; treat it as unresolvable rather than looping
                    Some(Schema::Ref { .. }) | None => {
                        Err(Details::UnresolvedReference(name).into())
                    }
                    Some(resolved) => Self::from_json_with_schema(
                        json,
                        resolved,
                        names,
                        &name.namespace,
                        allow_any_union_branch,
                    ),
                }
            }
            Schema::Null => match json {
                JsonValue::Null => Ok(Value::Null),
                _ => Err(mismatch()),
            },
            Schema::Boolean => match json {
                JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
                _ => Err(mismatch()),
            },
            Schema::Int => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int)
                .ok_or_else(mismatch),
            Schema::Long => json.as_i64().map(Value::Long).ok_or_else(mismatch),
            Schema::Float => json
                .as_f64()
                .map(|n| Value::Float(n as f32))
                .ok_or_else(mismatch),
            Schema::Double => json.as_f64().map(Value::Double).ok_or_else(mismatch),
            Schema::Bytes => match json {
                JsonValue::String(s) => json_string_to_bytes(s)
                    .map(Value::Bytes)
                    .ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            Schema::String => match json {
                JsonValue::String(s) => Ok(Value::String(s.clone())),
                _ => Err(mismatch()),
            },
            Schema::Fixed(FixedSchema { size, .. }) => match json {
                JsonValue::String(s) => {
                    let bytes = json_string_to_bytes(s).ok_or_else(mismatch)?;
                    if bytes.len() == *size {
                        Ok(Value::Fixed(*size, bytes))
                    } else {
                        Err(mismatch())
                    }
                }
                _ => Err(mismatch()),
            },
            Schema::Enum(EnumSchema { symbols, .. }) => match json {
                JsonValue::String(s) => symbols
                    .iter()
                    .position(|symbol| symbol == s)
                    .map(|index| Value::Enum(index as u32, s.clone()))
                    .ok_or_else(|| Details::UnknownEnumSymbol(s.clone()).into()),
                _ => Err(mismatch()),
            },
            Schema::Array(inner) => match json {
                JsonValue::Array(items) => items
                    .iter()
                    .map(|item| {
                        Self::from_json_with_schema(
                            item,
                            inner,
                            names,
                            enclosing_namespace,
                            allow_any_union_branch,
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                _ => Err(mismatch()),
            },
            Schema::Map(inner) => match json {
                JsonValue::Object(items) => items
                    .iter()
                    .map(|(key, value)| {
                        Self::from_json_with_schema(
                            value,
                            inner,
                            names,
                            enclosing_namespace,
                            allow_any_union_branch,
                        )
                        .map(|value| (key.clone(), value))
                    })
                    .collect::<Result<HashMap<_, _>, _>>()
                    .map(Value::Map),
                _ => Err(mismatch()),
            },
            Schema::Union(union) => {
                let branches: &[Schema] = union.variants();
                if branches.is_empty() {
                    return Err(Details::EmptyUnion.into());
                }
                let limit = if allow_any_union_branch {
                    branches.len()
                } else {
                    1
                };
                for (index, branch) in branches.iter().take(limit).enumerate() {
                    if let Ok(value) = Self::from_json_with_schema(
                        json,
                        branch,
                        names,
                        enclosing_namespace,
                        allow_any_union_branch,
                    ) {
                        return Ok(Value::Union(index as u32, Box::new(value)));
                    }
                }
                Err(mismatch())
            }
            Schema::Record(record) => match json {
                JsonValue::Object(items) => {
                    let record_namespace = record
                        .name
                        .fully_qualified_name(enclosing_namespace)
                        .namespace;
                    let mut new_fields = Vec::with_capacity(record.fields.len());
                    for field in &record.fields {
                        let value = match items.get(&field.name) {
                            Some(value) => Self::from_json_with_schema(
                                value,
                                &field.schema,
                                names,
                                &record_namespace,
                                allow_any_union_branch,
                            )?,
                            None => match field.default {
                                Some(ref default) => Self::from_json_with_schema(
                                    default,
                                    &field.schema,
                                    names,
                                    &record_namespace,
                                    allow_any_union_branch,
                                )?,
                                None => {
                                    return Err(Details::MissingField(field.name.clone()).into());
                                }
                            },
                        };
                        new_fields.push((field.name.clone(), value));
                    }
                    Ok(Value::Record(RecordValue {
                        schema_id: Some(record.id),
                        fields: new_fields,
                    }))
                }
                _ => Err(mismatch()),
            },
            Schema::Decimal(_) => match json {
                JsonValue::String(s) => json_string_to_bytes(s)
                    .map(|bytes| Value::Decimal(Decimal::from(bytes)))
                    .ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            Schema::Uuid => match json {
                JsonValue::String(s) => Uuid::from_str(s)
                    .map(Value::Uuid)
                    .map_err(|e| Details::InvalidUuid(e).into()),
                _ => Err(mismatch()),
            },
            Schema::Date => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Date)
                .ok_or_else(mismatch),
            Schema::TimeMillis => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::TimeMillis)
                .ok_or_else(mismatch),
            Schema::TimeMicros => json.as_i64().map(Value::TimeMicros).ok_or_else(mismatch),
            Schema::TimestampMillis => json
                .as_i64()
                .map(Value::TimestampMillis)
                .ok_or_else(mismatch),
            Schema::TimestampMicros => json
                .as_i64()
                .map(Value::TimestampMicros)
                .ok_or_else(mismatch),
            Schema::Duration(_) => match json {
                JsonValue::String(s) => {
                    let bytes = json_string_to_bytes(s).ok_or_else(mismatch)?;
                    let array: [u8; 12] = bytes.try_into().map_err(|_| mismatch())?;
                    Ok(Value::Duration(Duration::from(array)))
                }
                _ => Err(mismatch()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_validate_primitives() -> TestResult {
        assert!(Value::Null.validate(&Schema::Null));
        assert!(Value::Boolean(true).validate(&Schema::Boolean));
        assert!(Value::Int(42).validate(&Schema::Int));
        assert!(Value::Int(42).validate(&Schema::Long));
        assert!(Value::Long(42).validate(&Schema::Long));
        assert!(!Value::Long(42).validate(&Schema::Int));
        assert!(Value::Float(1.5).validate(&Schema::Float));
        assert!(Value::Float(1.5).validate(&Schema::Double));
        assert!(Value::Double(0.5).validate(&Schema::Float));
        assert!(!Value::Double(0.1).validate(&Schema::Float));
        assert!(Value::String("hi".into()).validate(&Schema::String));
        assert!(!Value::String("hi".into()).validate(&Schema::Int));
        Ok(())
    }

    #[test]
    fn test_validate_fixed() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "fixed", "name": "f", "size": 2}"#)?;
        assert!(Value::Fixed(2, vec![1, 2]).validate(&schema));
        assert!(!Value::Fixed(3, vec![1, 2, 3]).validate(&schema));
        assert!(Value::Bytes(vec![1, 2]).validate(&schema));
        Ok(())
    }

    #[test]
    fn test_validate_record_with_missing_field() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long"},
                    {"name": "b", "type": "string", "default": "unset"}
                ]
            }
        "#,
        )?;
        // `b` has a default, so it may be omitted
        assert!(Value::record(vec![("a".into(), Value::Long(1))]).validate(&schema));
        // `a` has no default
        assert!(!Value::record(vec![("b".into(), Value::String("x".into()))]).validate(&schema));
        Ok(())
    }

    #[test]
    fn test_validate_union() -> TestResult {
        let schema = Schema::parse_str(r#"["null", "int"]"#)?;
        assert!(Value::Union(0, Box::new(Value::Null)).validate(&schema));
        assert!(Value::Union(1, Box::new(Value::Int(4))).validate(&schema));
        assert!(!Value::Union(2, Box::new(Value::Int(4))).validate(&schema));
        assert!(Value::Int(4).validate(&schema));
        Ok(())
    }

    #[test]
    fn test_record_equality_ignores_identity() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "test", "fields": [{"name": "a", "type": "long"}]}"#,
        )?;
        let mut built = Record::new(&schema).unwrap();
        built.put("a", 1i64);
        let built: Value = built.into();
        let literal = Value::record(vec![("a".into(), Value::Long(1))]);
        // one has a schema identity, the other does not
        assert_eq!(built, literal);
        Ok(())
    }

    #[test]
    fn test_resolve_promotions() -> TestResult {
        assert_eq!(Value::Int(42).resolve(&Schema::Long)?, Value::Long(42));
        assert_eq!(
            Value::Int(42).resolve(&Schema::Double)?,
            Value::Double(42.0)
        );
        assert_eq!(
            Value::Long(42).resolve(&Schema::Double)?,
            Value::Double(42.0)
        );
        assert_eq!(
            Value::Float(1.5).resolve(&Schema::Double)?,
            Value::Double(1.5)
        );
        assert_eq!(
            Value::String("hi".into()).resolve(&Schema::Bytes)?,
            Value::Bytes(vec![b'h', b'i'])
        );
        assert_eq!(
            Value::Bytes(vec![b'h', b'i']).resolve(&Schema::String)?,
            Value::String("hi".into())
        );
        assert!(Value::Long(42).resolve(&Schema::Int).is_err());
        Ok(())
    }

    #[test]
    fn test_resolve_record_with_reader_default() -> TestResult {
        let reader = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long"},
                    {"name": "b", "type": "string", "default": "unset"}
                ]
            }
        "#,
        )?;
        let resolved = Value::record(vec![("a".into(), Value::Long(3))]).resolve(&reader)?;
        assert_eq!(
            resolved,
            Value::record(vec![
                ("a".into(), Value::Long(3)),
                ("b".into(), Value::String("unset".into())),
            ])
        );
        Ok(())
    }

    #[test]
    fn test_resolve_attaches_reader_identity() -> TestResult {
        let reader = Schema::parse_str(
            r#"{"type": "record", "name": "test", "fields": [{"name": "a", "type": "long"}]}"#,
        )?;
        let resolved = Value::record(vec![("a".into(), Value::Long(3))]).resolve(&reader)?;
        match (resolved, &reader) {
            (Value::Record(value), Schema::Record(record)) => {
                assert_eq!(value.schema_id, Some(record.id));
            }
            other => panic!("Expected a record, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_resolve_record_missing_field_without_default() -> TestResult {
        let reader = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long"},
                    {"name": "b", "type": "string"}
                ]
            }
        "#,
        )?;
        let result = Value::record(vec![("a".into(), Value::Long(3))]).resolve(&reader);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_resolve_enum_with_default() -> TestResult {
        let reader = Schema::parse_str(
            r#"{"type": "enum", "name": "suit", "symbols": ["spades", "clubs"], "default": "spades"}"#,
        )?;
        // unknown writer symbol falls back to the reader default
        let resolved = Value::Enum(3, "hearts".into()).resolve(&reader)?;
        assert_eq!(resolved, Value::Enum(0, "spades".into()));

        let resolved = Value::Enum(1, "clubs".into()).resolve(&reader)?;
        assert_eq!(resolved, Value::Enum(1, "clubs".into()));
        Ok(())
    }

    #[test]
    fn test_resolve_union_reader_not_writer() -> TestResult {
        let reader = Schema::parse_str(r#"["null", "long"]"#)?;
        let resolved = Value::Int(42).resolve(&reader)?;
        assert_eq!(resolved, Value::Union(1, Box::new(Value::Long(42))));
        Ok(())
    }

    #[test]
    fn test_resolve_identity_roundtrip() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long"},
                    {"name": "b", "type": ["null", "string"]}
                ]
            }
        "#,
        )?;
        let value = Value::record(vec![
            ("a".into(), Value::Long(3)),
            (
                "b".into(),
                Value::Union(1, Box::new(Value::String("x".into()))),
            ),
        ]);
        assert_eq!(value.clone().resolve(&schema)?, value);
        Ok(())
    }

    #[test]
    fn test_from_json_defaults_are_deep_copied() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#)?;
        let names: Names = Names::new();
        let json = json!([1, 2, 3]);
        let one = Value::from_json_with_schema(&json, &schema, &names, &None, false)?;
        let two = Value::from_json_with_schema(&json, &schema, &names, &None, false)?;
        assert_eq!(one, two);
        // mutating one decoded default must not affect the other
        if let (Value::Array(mut a), Value::Array(b)) = (one, two) {
            a[0] = Value::Int(99);
            assert_eq!(b[0], Value::Int(1));
        }
        Ok(())
    }

    #[test]
    fn test_json_roundtrip() -> TestResult {
        let value = Value::record(vec![
            ("name".into(), Value::String("John".into())),
            ("age".into(), Value::Int(42)),
        ]);
        let json = JsonValue::try_from(value)?;
        assert_eq!(json, json!({"name": "John", "age": 42}));
        Ok(())
    }

    #[test]
    fn test_bytes_default_uses_codepoints() -> TestResult {
        let schema = Schema::Bytes;
        let names: Names = Names::new();
        let value = Value::from_json_with_schema(
            &json!("\u{00ff}\u{0001}"),
            &schema,
            &names,
            &None,
            false,
        )?;
        assert_eq!(value, Value::Bytes(vec![0xFF, 0x01]));
        Ok(())
    }
}
