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

use crate::AvroResult;
use crate::error::Details;
use crate::options::Options;
use crate::schema::{Name, Namespace, Schema};
use crate::types::{Value, ValueKind};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};

/// The coarse tag a union branch is filed under.
///
/// No two branches of a legal union may share a category key. Named types
/// are keyed by their fully qualified name, logical types by their physical
/// encoding.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum CategoryKey {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Array,
    Map,
    Named(String),
}

pub(crate) fn category_key(schema: &Schema) -> CategoryKey {
    match schema {
        Schema::Null => CategoryKey::Null,
        Schema::Boolean => CategoryKey::Boolean,
        Schema::Int | Schema::Date | Schema::TimeMillis => CategoryKey::Int,
        Schema::Long
        | Schema::TimeMicros
        | Schema::TimestampMillis
        | Schema::TimestampMicros => CategoryKey::Long,
        Schema::Float => CategoryKey::Float,
        Schema::Double => CategoryKey::Double,
        Schema::Bytes => CategoryKey::Bytes,
        Schema::String | Schema::Uuid => CategoryKey::String,
        Schema::Array(_) => CategoryKey::Array,
        Schema::Map(_) => CategoryKey::Map,
        Schema::Decimal(inner) => match inner.inner.as_ref() {
            Schema::Fixed(fixed) => CategoryKey::Named(fixed.name.fullname(None)),
            _ => CategoryKey::Bytes,
        },
        Schema::Record(inner) => CategoryKey::Named(inner.name.fullname(None)),
        Schema::Enum(inner) => CategoryKey::Named(inner.name.fullname(None)),
        Schema::Fixed(inner) | Schema::Duration(inner) => {
            CategoryKey::Named(inner.name.fullname(None))
        }
        Schema::Ref { name } => CategoryKey::Named(name.fullname(None)),
        Schema::Union(_) => unreachable!("unions cannot nest"),
    }
}

/// A description of a Union schema
#[derive(Debug, Clone)]
pub struct UnionSchema {
    /// The schemas that make up this union
    pub(crate) schemas: Vec<Schema>,
    // Used to ensure uniqueness of branch categories, and provide constant
    // time finding of the branch index given a value's category.
    variant_index: BTreeMap<CategoryKey, usize>,
}

impl UnionSchema {
    /// Creates a new UnionSchema from a vector of schemas.
    ///
    /// # Errors
    /// Will return an error if two `schemas` share a category key or if
    /// `schemas` contains a union.
    pub fn new(schemas: Vec<Schema>) -> AvroResult<Self> {
        let mut vindex = BTreeMap::new();
        for (i, schema) in schemas.iter().enumerate() {
            if let Schema::Union(_) = schema {
                return Err(Details::NestedUnion.into());
            }
            if vindex.insert(category_key(schema), i).is_some() {
                return Err(Details::DuplicateUnionBranch.into());
            }
        }
        Ok(UnionSchema {
            schemas,
            variant_index: vindex,
        })
    }

    /// Returns a slice to all variants of this schema.
    pub fn variants(&self) -> &[Schema] {
        &self.schemas
    }

    /// Returns true if any of the variants of this `UnionSchema` is `Null`.
    pub fn is_nullable(&self) -> bool {
        self.schemas.iter().any(|x| matches!(x, Schema::Null))
    }

    /// Human-readable branch labels, used in dispatch errors.
    pub(crate) fn branch_names(&self) -> Vec<String> {
        self.schemas.iter().map(branch_name).collect()
    }

    /// Returns the index of the branch with the given name, matching named
    /// branches by simple name or fullname and unnamed branches by their
    /// type name.
    pub(crate) fn branch_by_name(&self, wanted: &str) -> Option<(usize, &Schema)> {
        self.schemas.iter().enumerate().find(|(_, schema)| {
            if let Some(name) = schema.name() {
                name.name == wanted || name.fullname(None) == wanted
            } else {
                branch_name(schema) == wanted
            }
        })
    }

    /// Selects the branch matching a host value, per the category-key
    /// dispatch rules.
    ///
    /// Exact category matches win over promotion matches; within records the
    /// earlier-declared branch wins. Mappings go through the `-type` hint and
    /// structural record matching before falling back to a `map` branch.
    pub(crate) fn find_schema<S: Borrow<Schema>>(
        &self,
        value: &Value,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
        options: &Options,
    ) -> AvroResult<(usize, &Schema)> {
        if let Value::Union(i, _) = value {
            let i = *i as usize;
            return match self.schemas.get(i) {
                Some(schema) => Ok((i, schema)),
                None => Err(Details::InvalidUnionTag {
                    index: i as i64,
                    num_branches: self.schemas.len(),
                }
                .into()),
            };
        }

        if let Value::Map(items) = value {
            return self.dispatch_mapping(value, items, names, enclosing_namespace, options);
        }

        // Exact category first, promotions after.
        let candidates: &[CategoryKey] = match value {
            Value::Null => &[CategoryKey::Null],
            Value::Boolean(_) => &[CategoryKey::Boolean],
            Value::Int(_) | Value::Date(_) | Value::TimeMillis(_) => &[
                CategoryKey::Int,
                CategoryKey::Long,
                CategoryKey::Float,
                CategoryKey::Double,
            ],
            Value::Long(_)
            | Value::TimeMicros(_)
            | Value::TimestampMillis(_)
            | Value::TimestampMicros(_) => {
                &[CategoryKey::Long, CategoryKey::Float, CategoryKey::Double]
            }
            Value::Float(_) => &[CategoryKey::Float, CategoryKey::Double],
            Value::Double(n) => {
                // A downcast to float is allowed only when it is bit-exact.
                if (*n as f32) as f64 == *n {
                    &[CategoryKey::Double, CategoryKey::Float]
                } else {
                    &[CategoryKey::Double]
                }
            }
            Value::Bytes(_) | Value::Decimal(_) => &[CategoryKey::Bytes],
            Value::String(_) => {
                if options.types_str_to_bytes {
                    &[CategoryKey::String, CategoryKey::Bytes]
                } else {
                    &[CategoryKey::String]
                }
            }
            Value::Uuid(_) => &[CategoryKey::String],
            Value::Array(_) => &[CategoryKey::Array],
            // Records, enums, fixeds and durations carry no category that can
            // be derived from the value alone; they go through the scan below.
            _ => &[],
        };

        for key in candidates {
            if let Some(&i) = self.variant_index.get(key) {
                return Ok((i, &self.schemas[i]));
            }
        }

        // Slow path: first branch the value validates against. Within
        // records this makes the earlier-declared branch win.
        if let Some((i, schema)) = self.schemas.iter().enumerate().find(|(_, schema)| {
            value
                .validate_internal(schema, names, enclosing_namespace)
                .is_none()
        }) {
            return Ok((i, schema));
        }

        Err(Details::DispatchNoMatch {
            branches: self.branch_names(),
            value_kind: ValueKind::from(value),
        }
        .into())
    }

    fn dispatch_mapping<S: Borrow<Schema>>(
        &self,
        value: &Value,
        items: &HashMap<String, Value>,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
        options: &Options,
    ) -> AvroResult<(usize, &Schema)> {
        // A `-type` key names the record branch explicitly.
        if options.record_values_type_hint {
            if let Some(Value::String(wanted)) = items.get("-type") {
                if let Some(found) = self.branch_by_name(wanted) {
                    return Ok(found);
                }
            }
        }

        // Structural match: record branches whose declared field names cover
        // the mapping's keys.
        let hinted = options.record_values_type_hint && items.contains_key("-type");
        let mut matches: Vec<(usize, &Schema)> = Vec::new();
        for (i, schema) in self.schemas.iter().enumerate() {
            if let Some(record) = resolve_record(schema, names, enclosing_namespace) {
                let covers = items.keys().all(|key| {
                    (hinted && key == "-type")
                        || record.lookup.contains_key(key)
                        || options.record_allow_extra_fields
                });
                let fillable = record.fields.iter().all(|field| {
                    items.contains_key(&field.name)
                        || field
                            .aliases
                            .iter()
                            .any(|alias| items.contains_key(alias))
                        || field.default.is_some() && options.record_encode_use_defaults
                });
                if covers && fillable {
                    matches.push((i, schema));
                }
            }
        }
        match matches.len() {
            1 => return Ok(matches[0]),
            0 => {}
            _ => {
                // More than one record candidate: a map branch, if present,
                // disambiguates; otherwise the dispatch is ambiguous.
                if let Some(&i) = self.variant_index.get(&CategoryKey::Map) {
                    return Ok((i, &self.schemas[i]));
                }
                return Err(Details::DispatchAmbiguous {
                    branches: matches.iter().map(|(_, s)| branch_name(s)).collect(),
                    value_kind: ValueKind::from(value),
                }
                .into());
            }
        }

        if let Some(&i) = self.variant_index.get(&CategoryKey::Map) {
            return Ok((i, &self.schemas[i]));
        }

        Err(Details::DispatchNoMatch {
            branches: self.branch_names(),
            value_kind: ValueKind::from(value),
        }
        .into())
    }
}

/// Chases `Ref`s to a record schema, if the branch is one.
fn resolve_record<'s, S: Borrow<Schema>>(
    schema: &'s Schema,
    names: &'s HashMap<Name, S>,
    enclosing_namespace: &Namespace,
) -> Option<&'s super::RecordSchema> {
    match schema {
        Schema::Record(record) => Some(record),
        Schema::Ref { name } => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            match names.get(&fully_qualified_name).map(Borrow::borrow) {
                Some(Schema::Record(record)) => Some(record),
                _ => None,
            }
        }
        _ => None,
    }
}

pub(crate) fn branch_name(schema: &Schema) -> String {
    match schema.name() {
        Some(name) => name.fullname(None),
        None => match schema {
            Schema::Null => "null".to_string(),
            Schema::Boolean => "boolean".to_string(),
            Schema::Int => "int".to_string(),
            Schema::Long => "long".to_string(),
            Schema::Float => "float".to_string(),
            Schema::Double => "double".to_string(),
            Schema::Bytes => "bytes".to_string(),
            Schema::String => "string".to_string(),
            Schema::Array(_) => "array".to_string(),
            Schema::Map(_) => "map".to_string(),
            Schema::Uuid => "uuid".to_string(),
            Schema::Date => "date".to_string(),
            Schema::TimeMillis => "time-millis".to_string(),
            Schema::TimeMicros => "time-micros".to_string(),
            Schema::TimestampMillis => "timestamp-millis".to_string(),
            Schema::TimestampMicros => "timestamp-micros".to_string(),
            Schema::Decimal(_) => "decimal".to_string(),
            other => format!("{other:?}"),
        },
    }
}

// No need to compare variant_index, it is derivative of schemas.
impl PartialEq for UnionSchema {
    fn eq(&self, other: &UnionSchema) -> bool {
        self.schemas.eq(&other.schemas)
    }
}
