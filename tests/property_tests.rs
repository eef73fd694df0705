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

//! Property-based tests verifying universal invariants across generated
//! inputs.

use proptest::prelude::*;

use dynavro::{
    Schema, from_avro_datum, to_avro_datum,
    types::Value,
    util::{read_long, write_long},
};
use std::collections::HashMap;

// ============================================================================
// Generators
// ============================================================================

/// Generate valid Avro names (must start with [A-Za-z_] and contain only
/// [A-Za-z0-9_]).
fn arb_avro_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,15}".prop_filter("name must not be empty", |s| !s.is_empty())
}

/// A primitive schema together with a generator for values it accepts.
#[derive(Clone, Debug)]
enum PrimitiveKind {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

fn arb_primitive_kind() -> impl Strategy<Value = PrimitiveKind> {
    prop_oneof![
        Just(PrimitiveKind::Boolean),
        Just(PrimitiveKind::Int),
        Just(PrimitiveKind::Long),
        Just(PrimitiveKind::Float),
        Just(PrimitiveKind::Double),
        Just(PrimitiveKind::Bytes),
        Just(PrimitiveKind::String),
    ]
}

fn primitive_schema(kind: &PrimitiveKind) -> Schema {
    match kind {
        PrimitiveKind::Boolean => Schema::Boolean,
        PrimitiveKind::Int => Schema::Int,
        PrimitiveKind::Long => Schema::Long,
        PrimitiveKind::Float => Schema::Float,
        PrimitiveKind::Double => Schema::Double,
        PrimitiveKind::Bytes => Schema::Bytes,
        PrimitiveKind::String => Schema::String,
    }
}

fn arb_primitive_value(kind: PrimitiveKind) -> BoxedStrategy<Value> {
    match kind {
        PrimitiveKind::Boolean => any::<bool>().prop_map(Value::Boolean).boxed(),
        PrimitiveKind::Int => any::<i32>().prop_map(Value::Int).boxed(),
        PrimitiveKind::Long => any::<i64>().prop_map(Value::Long).boxed(),
        PrimitiveKind::Float => any::<f32>().prop_map(Value::Float).boxed(),
        PrimitiveKind::Double => any::<f64>().prop_map(Value::Double).boxed(),
        PrimitiveKind::Bytes => proptest::collection::vec(any::<u8>(), 0..64)
            .prop_map(Value::Bytes)
            .boxed(),
        PrimitiveKind::String => "[a-zA-Z0-9 ]{0,32}".prop_map(Value::String).boxed(),
    }
}

/// Generate a (schema, value) pair where the value is valid for the schema.
fn arb_schema_and_value() -> impl Strategy<Value = (Schema, Value)> {
    let primitive = arb_primitive_kind()
        .prop_flat_map(|kind| {
            let schema = primitive_schema(&kind);
            arb_primitive_value(kind).prop_map(move |value| (schema.clone(), value))
        })
        .boxed();

    let array = arb_primitive_kind()
        .prop_flat_map(|kind| {
            let schema = Schema::array(primitive_schema(&kind));
            proptest::collection::vec(arb_primitive_value(kind), 0..8)
                .prop_map(move |items| (schema.clone(), Value::Array(items)))
        })
        .boxed();

    let map = arb_primitive_kind()
        .prop_flat_map(|kind| {
            let schema = Schema::map(primitive_schema(&kind));
            proptest::collection::hash_map(arb_avro_name(), arb_primitive_value(kind), 0..8)
                .prop_map(move |items| {
                    (
                        schema.clone(),
                        Value::Map(items.into_iter().collect::<HashMap<_, _>>()),
                    )
                })
        })
        .boxed();

    let nullable = arb_primitive_kind()
        .prop_flat_map(|kind| {
            let schema = Schema::parse_str(&format!(
                r#"["null", "{}"]"#,
                match kind {
                    PrimitiveKind::Boolean => "boolean",
                    PrimitiveKind::Int => "int",
                    PrimitiveKind::Long => "long",
                    PrimitiveKind::Float => "float",
                    PrimitiveKind::Double => "double",
                    PrimitiveKind::Bytes => "bytes",
                    PrimitiveKind::String => "string",
                }
            ))
            .expect("valid union schema");
            prop_oneof![
                Just(Value::Union(0, Box::new(Value::Null))),
                arb_primitive_value(kind).prop_map(|v| Value::Union(1, Box::new(v))),
            ]
            .prop_map(move |value| (schema.clone(), value))
        })
        .boxed();

    prop_oneof![primitive, array, map, nullable]
}

// Compare values, treating NaN as equal to itself so round-trips of NaN pass.
fn values_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => (x.is_nan() && y.is_nan()) || x == y,
        (Value::Double(x), Value::Double(y)) => (x.is_nan() && y.is_nan()) || x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|(x, y)| values_equivalent(x, y))
        }
        (Value::Map(xs), Value::Map(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equivalent(x, y)))
        }
        (Value::Union(i, x), Value::Union(j, y)) => i == j && values_equivalent(x, y),
        _ => a == b,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// ZigZag bijection: decode of encode is the identity for every long.
    #[test]
    fn prop_zigzag_roundtrip(n in any::<i64>()) {
        let mut encoded = Vec::new();
        write_long(n, &mut encoded).expect("write to vec cannot fail");
        let decoded = read_long(&mut &encoded[..]).expect("decode of a valid encoding");
        prop_assert_eq!(n, decoded);
    }

    /// The shortest encoding is produced: no trailing continuation group.
    #[test]
    fn prop_zigzag_minimal(n in any::<i64>()) {
        let mut encoded = Vec::new();
        write_long(n, &mut encoded).expect("write to vec cannot fail");
        prop_assert!(encoded.len() <= 10);
        let last = *encoded.last().expect("at least one byte");
        prop_assert_eq!(last & 0x80, 0);
        if encoded.len() > 1 {
            // a shorter encoding would have fit if the last group were zero
            prop_assert_ne!(last, 0);
        }
    }

    /// Round-trip: decode(encode(v)) == v for schema-valid values.
    #[test]
    fn prop_value_roundtrip((schema, value) in arb_schema_and_value()) {
        let encoded = to_avro_datum(&schema, value.clone()).expect("value is valid for schema");
        let decoded = from_avro_datum(&schema, &mut &encoded[..], None)
            .expect("decode of a valid encoding");
        prop_assert!(
            values_equivalent(&value, &decoded),
            "value {:?} decoded as {:?}",
            value,
            decoded
        );
    }

    /// Canonical form is stable under parse -> canonicalize -> parse.
    #[test]
    fn prop_canonical_form_stable(
        name in arb_avro_name(),
        field_names in proptest::collection::btree_set("[a-z][a-z0-9_]{0,10}", 1..5),
    ) {
        let fields = field_names
            .iter()
            .map(|f| format!(r#"{{"name": "{f}", "type": "long"}}"#))
            .collect::<Vec<_>>()
            .join(",");
        let raw = format!(
            r#"{{"type": "record", "name": "{name}", "fields": [{fields}]}}"#
        );
        let schema = Schema::parse_str(&raw).expect("valid schema");
        let canonical = schema.canonical_form();
        let reparsed = Schema::parse_str(&canonical).expect("canonical form parses");
        prop_assert_eq!(canonical, reparsed.canonical_form());
    }

    /// Schemas with equal canonical forms have equal fingerprints.
    #[test]
    fn prop_fingerprint_follows_canonical_form(name in arb_avro_name()) {
        use dynavro::rabin::Rabin;

        let compact = format!(
            r#"{{"type":"record","name":"{name}","fields":[{{"name":"x","type":"int"}}]}}"#
        );
        let spaced = format!(
            r#"{{
                "type": "record",
                "name": "{name}",
                "doc": "documentation is stripped",
                "fields": [ {{"name": "x", "type": "int"}} ]
            }}"#
        );
        let one = Schema::parse_str(&compact).expect("valid schema");
        let two = Schema::parse_str(&spaced).expect("valid schema");
        prop_assert_eq!(one.canonical_form(), two.canonical_form());
        prop_assert_eq!(
            one.fingerprint::<Rabin>().bytes,
            two.fingerprint::<Rabin>().bytes
        );
    }

    /// Union dispatch is deterministic: encoding the same value twice against
    /// the same union picks the same branch.
    #[test]
    fn prop_union_dispatch_deterministic((_, value) in arb_schema_and_value()) {
        let union = Schema::parse_str(
            r#"["null", "boolean", "long", "double", "bytes", "string",
                {"type": "array", "items": "long"},
                {"type": "map", "values": "long"}]"#,
        )
        .expect("valid union schema");

        let value = match value {
            // unwrap pre-tagged unions so dispatch actually runs
            Value::Union(_, inner) => *inner,
            other => other,
        };

        let first = to_avro_datum(&union, value.clone());
        let second = to_avro_datum(&union, value.clone());
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            (a, b) => prop_assert!(false, "non-deterministic dispatch: {:?} vs {:?}", a, b),
        }
    }

    /// Identity resolution equals direct decoding.
    #[test]
    fn prop_identity_resolution((schema, value) in arb_schema_and_value()) {
        let encoded = to_avro_datum(&schema, value.clone()).expect("value is valid for schema");
        let direct = from_avro_datum(&schema, &mut &encoded[..], None)
            .expect("decode of a valid encoding");
        let resolved = from_avro_datum(&schema, &mut &encoded[..], Some(&schema))
            .expect("identity resolution succeeds");
        prop_assert!(
            values_equivalent(&direct, &resolved),
            "direct {:?} != resolved {:?}",
            direct,
            resolved
        );
    }
}
