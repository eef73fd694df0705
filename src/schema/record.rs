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
use crate::error::{Details, Error};
use crate::schema::parser::{doc_attr, name_attr};
use crate::schema::{Documentation, Name, Names, Parser, Schema, SchemaKind};
use crate::types;
use crate::validator::validate_record_field_name;
use log::warn;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

// Every record compilation gets a process-unique identity. Record values
// carry it so that encoding against the very schema that produced them can
// skip adaptation, and so that values from a different compilation can be
// recognized as foreign.
static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

fn identity_table() -> &'static Mutex<HashMap<u64, String>> {
    static TABLE: OnceLock<Mutex<HashMap<u64, String>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Assign a fresh identity to a record compilation, remembering its fullname.
pub(crate) fn register_record_identity(fullname: String) -> u64 {
    let id = NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed);
    identity_table()
        .lock()
        .expect("record identity table poisoned")
        .insert(id, fullname);
    id
}

/// The fullname a record identity was registered under.
pub(crate) fn record_fullname_of(id: u64) -> Option<String> {
    identity_table()
        .lock()
        .expect("record identity table poisoned")
        .get(&id)
        .cloned()
}

/// Represents any type of order defined on a `record` field.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordFieldOrder {
    Ascending,
    Descending,
    Ignore,
}

/// Represents a `field` in a `record` Avro schema.
#[derive(Clone, PartialEq)]
pub struct RecordField {
    /// Name of the field.
    pub name: String,
    /// Documentation of the field.
    pub doc: Documentation,
    /// Aliases of the field's name. They have no namespace.
    pub aliases: Vec<String>,
    /// Default value of the field.
    /// This value will be used when reading Avro datum if schema resolution
    /// is enabled, and at encode time when the source omits the field and
    /// default injection is enabled.
    pub default: Option<Value>,
    /// Schema of the field.
    pub schema: Schema,
    /// Order of the field.
    pub order: RecordFieldOrder,
    /// A collection of all unknown fields in the record field.
    pub custom_attributes: BTreeMap<String, Value>,
}

impl Debug for RecordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("RecordField");
        debug.field("name", &self.name);
        if let Some(doc) = &self.doc {
            debug.field("doc", &doc);
        }
        if !self.aliases.is_empty() {
            debug.field("aliases", &self.aliases);
        }
        if let Some(default) = &self.default {
            debug.field("default", &default);
        }
        debug.field("schema", &self.schema);
        if !self.custom_attributes.is_empty() {
            debug.field("custom_attributes", &self.custom_attributes);
        }
        debug.finish_non_exhaustive()
    }
}

impl RecordField {
    /// Parse a `serde_json::Value` into a `RecordField`.
    pub(crate) fn parse(
        field: &Map<String, Value>,
        parser: &mut Parser,
        enclosing_record: &Name,
    ) -> AvroResult<Self> {
        let name = name_attr(field).ok_or(Details::MissingAttribute("name"))?;

        validate_record_field_name(&name)?;

        let ty = field.get("type").ok_or(Details::MissingAttribute("type"))?;
        let schema = parser.parse(ty, &enclosing_record.namespace)?;

        if let Some(logical_type) = field.get("logicalType") {
            warn!(
                "Ignored the {enclosing_record}.logicalType property (`{logical_type}`). It should probably be nested inside the `type` for the field"
            );
        }

        let default = field.get("default").cloned();
        if !parser.options().allow_invalid_default_values {
            Self::resolve_default_value(
                &schema,
                &name,
                &enclosing_record.fullname(None),
                parser.compiled_types(),
                &default,
                parser.options().allow_union_default_any_member,
            )?;
        }

        let order = field
            .get("order")
            .and_then(|order| order.as_str())
            .map(|order| match order {
                "descending" => RecordFieldOrder::Descending,
                "ignore" => RecordFieldOrder::Ignore,
                _ => RecordFieldOrder::Ascending,
            })
            .unwrap_or(RecordFieldOrder::Ascending);

        let aliases = field
            .get("aliases")
            .and_then(|aliases| {
                aliases.as_array().map(|aliases| {
                    aliases
                        .iter()
                        .flat_map(|alias| alias.as_str())
                        .map(|alias| alias.to_string())
                        .collect::<Vec<String>>()
                })
            })
            .unwrap_or_default();

        Ok(RecordField {
            name,
            doc: doc_attr(field),
            default,
            aliases,
            order,
            custom_attributes: RecordField::get_field_custom_attributes(field),
            schema,
        })
    }

    fn resolve_default_value(
        field_schema: &Schema,
        field_name: &str,
        record_name: &str,
        names: &Names,
        default: &Option<Value>,
        allow_any_union_branch: bool,
    ) -> AvroResult<()> {
        let value = match default {
            Some(value) => value,
            None => return Ok(()),
        };
        let converts = types::Value::from_json_with_schema(
            value,
            field_schema,
            names,
            &field_schema.namespace(),
            allow_any_union_branch,
        )
        .is_ok();
        if converts {
            return Ok(());
        }
        match field_schema {
            Schema::Union(union_schema) => match union_schema.variants().first() {
                Some(first_branch) => Err(Details::InvalidUnionDefault {
                    first_branch: SchemaKind::from(first_branch),
                    default: types::json_value_kind(value),
                }
                .into()),
                None => Err(Details::EmptyUnion.into()),
            },
            _ => Err(Details::InvalidDefault {
                field: field_name.to_string(),
                record: record_name.to_string(),
                schema: field_schema.canonical_form(),
            }
            .into()),
        }
    }

    fn get_field_custom_attributes(field: &Map<String, Value>) -> BTreeMap<String, Value> {
        let mut custom_attributes: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in field {
            match key.as_str() {
                "type" | "name" | "doc" | "default" | "aliases" | "order" => continue,
                _ => custom_attributes.insert(key.clone(), value.clone()),
            };
        }
        custom_attributes
    }

    /// Returns true if this `RecordField` is nullable, meaning the schema is
    /// a `UnionSchema` where one of the variants is `Null`.
    pub fn is_nullable(&self) -> bool {
        match self.schema {
            Schema::Union(ref inner) => inner.is_nullable(),
            _ => false,
        }
    }
}

impl Serialize for RecordField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.schema)?;

        if let Some(default) = &self.default {
            map.serialize_entry("default", default)?;
        }

        if let Some(doc) = &self.doc {
            map.serialize_entry("doc", doc)?;
        }

        if !self.aliases.is_empty() {
            map.serialize_entry("aliases", &self.aliases)?;
        }

        if self.order == RecordFieldOrder::Descending || self.order == RecordFieldOrder::Ignore {
            let order = match self.order {
                RecordFieldOrder::Descending => "descending",
                _ => "ignore",
            };
            map.serialize_entry("order", order)?;
        }

        for attr in &self.custom_attributes {
            map.serialize_entry(attr.0, attr.1)?;
        }

        map.end()
    }
}

/// A description of a Record schema.
#[derive(Clone)]
pub struct RecordSchema {
    /// The identity of this compilation. Clones share it; re-parsing the
    /// same JSON yields a new one.
    pub(crate) id: u64,
    /// The name of the schema
    pub name: Name,
    /// The aliases of the schema
    pub aliases: super::Aliases,
    /// The documentation of the schema
    pub doc: Documentation,
    /// The set of fields of the schema
    pub fields: Vec<RecordField>,
    /// The `lookup` table maps field names (and field aliases) to their
    /// position in the `Vec` of `fields`.
    pub lookup: BTreeMap<String, usize>,
    /// The custom attributes of the schema
    pub attributes: BTreeMap<String, Value>,
}

impl Debug for RecordSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("RecordSchema");
        debug.field("name", &self.name);
        if let Some(doc) = &self.doc {
            debug.field("doc", doc);
        }
        debug.field("fields", &self.fields);
        if !self.attributes.is_empty() {
            debug.field("attributes", &self.attributes);
        }
        debug.finish_non_exhaustive()
    }
}

impl RecordSchema {
    /// Create a new `RecordSchema` from fields, computing the lookup table
    /// and assigning a fresh compilation identity.
    pub fn new(name: Name, fields: Vec<RecordField>) -> AvroResult<Self> {
        let mut lookup = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            if lookup.insert(field.name.clone(), position).is_some() {
                return Err(Error::new(Details::DuplicateFieldName(field.name.clone())));
            }
            for alias in &field.aliases {
                lookup.insert(alias.clone(), position);
            }
        }
        Ok(Self {
            id: register_record_identity(name.fullname(None)),
            name,
            aliases: None,
            doc: None,
            fields,
            lookup,
            attributes: BTreeMap::new(),
        })
    }
}
