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

//! The schema compiler: structured JSON in, [`Schema`] trees out.
//!
//! Named types register in the compiler's registry *before* their bodies
//! compile, which is what lets a record reference itself (directly or through
//! unions and other records). While a definition is being compiled its name
//! maps to a [`Schema::Ref`]; once finished, the full schema replaces it.

use crate::error::Details;
use crate::options::Options;
use crate::schema::record::register_record_identity;
use crate::schema::{
    Alias, Aliases, DecimalSchema, Documentation, EnumSchema, FixedSchema, Name, Names, Namespace,
    RecordField, RecordSchema, Schema, SchemaKind, UnionSchema,
};
use crate::validator::validate_enum_symbol_name;
use crate::{AvroResult, Error};
use log::{debug, error, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

// ---- JSON attribute access -------------------------------------------------

pub(crate) fn string_attr(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn name_attr(map: &Map<String, Value>) -> Option<String> {
    string_attr(map, "name")
}

pub(crate) fn doc_attr(map: &Map<String, Value>) -> Documentation {
    string_attr(map, "doc")
}

pub(crate) fn aliases_attr(map: &Map<String, Value>) -> Option<Vec<String>> {
    let aliases = map.get("aliases")?.as_array()?;
    aliases
        .iter()
        .map(|alias| alias.as_str().map(str::to_string))
        .collect()
}

// ---- the compiler ----------------------------------------------------------

pub(crate) struct Parser {
    /// Named definitions supplied up front, consumed as they compile.
    pending: HashMap<Name, Value>,
    /// Names whose definitions are mid-compilation; each maps to a
    /// `Schema::Ref` so that recursive references resolve.
    in_progress: Names,
    /// The order `pending` entries were supplied in, for `compile_pending`.
    pending_order: Vec<Name>,
    /// Fully compiled named types.
    compiled: Names,
    options: Options,
}

impl Default for Parser {
    fn default() -> Self {
        Self::with_options(Options::default())
    }
}

impl Parser {
    pub(crate) fn with_options(options: Options) -> Self {
        Self::new(HashMap::new(), Vec::new(), HashMap::new(), options)
    }

    pub(crate) fn new(
        pending: HashMap<Name, Value>,
        pending_order: Vec<Name>,
        compiled: Names,
        options: Options,
    ) -> Self {
        // Externally defined types satisfy references exactly as if they had
        // been compiled earlier in the same input.
        let mut compiled = compiled;
        for (name, schema) in &options.externally_defined_types {
            compiled.insert(name.clone(), schema.clone());
        }
        Self {
            pending,
            in_progress: HashMap::new(),
            pending_order,
            compiled,
            options,
        }
    }

    pub(crate) fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn compiled_types(&self) -> &Names {
        &self.compiled
    }

    /// Compile a schema given as a JSON string.
    pub(super) fn parse_str(&mut self, input: &str) -> AvroResult<Schema> {
        let json = serde_json::from_str(input).map_err(Details::SchemaJson)?;
        self.parse(&json, &None)
    }

    /// Compile every pending definition and return them in input order.
    pub(super) fn parse_list(&mut self) -> AvroResult<Vec<Schema>> {
        self.parse_input_schemas()?;

        let mut ordered = Vec::with_capacity(self.pending_order.len());
        for name in self.pending_order.drain(..) {
            let schema = self
                .compiled
                .remove(&name)
                .expect("every pending schema compiles or errors out");
            ordered.push(schema);
        }
        Ok(ordered)
    }

    /// Drain `pending`, compiling each definition into `compiled`.
    pub(super) fn parse_input_schemas(&mut self) -> Result<(), Error> {
        while let Some(name) = self.pending.keys().next().cloned() {
            let (name, json) = self
                .pending
                .remove_entry(&name)
                .expect("key taken from the map");
            let schema = self.parse(&json, &None)?;
            self.compiled.insert(registry_key(name, &json), schema);
        }
        Ok(())
    }

    /// Compile one JSON value into a [`Schema`].
    pub(super) fn parse(
        &mut self,
        json: &Value,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        match json {
            Value::String(type_name) => self.parse_type_name(type_name, enclosing_namespace),
            Value::Object(attributes) => self.parse_complex(attributes, enclosing_namespace),
            Value::Array(branches) => self.parse_union(branches, enclosing_namespace),
            _ => Err(Details::SchemaInputShape.into()),
        }
    }

    /// A bare string: either a primitive type name or a reference to a named
    /// type.
    fn parse_type_name(
        &mut self,
        type_name: &str,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        match primitive_schema(type_name) {
            Some(primitive) => Ok(primitive),
            None => self.resolve_reference(type_name, enclosing_namespace),
        }
    }

    /// Resolve a reference to a named type: compiled first, in-progress
    /// second, then a still-pending definition (compiled on demand).
    fn resolve_reference(
        &mut self,
        reference: &str,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        let wanted = Name::new(reference)?.fully_qualified_name(enclosing_namespace);

        if self.compiled.contains_key(&wanted) {
            return Ok(Schema::Ref { name: wanted });
        }
        if let Some(placeholder) = self.in_progress.get(&wanted) {
            return Ok(placeholder.clone());
        }

        let json = self
            .pending
            .remove(&wanted)
            .ok_or_else(|| Details::UnknownType(wanted.fullname(None)))?;

        // a pending definition does not inherit the referencing namespace
        let schema = self.parse(&json, &None)?;
        self.compiled
            .insert(registry_key(wanted, &json), schema.clone());

        Ok(match schema.name() {
            Some(name) => Schema::Ref { name: name.clone() },
            None => schema,
        })
    }

    /// A JSON object: a complex type, possibly wearing a `logicalType`
    /// annotation.
    pub(super) fn parse_complex(
        &mut self,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        match attributes.get("logicalType") {
            Some(Value::String(logical)) if self.options.logical_types => {
                return self.parse_logical(logical, attributes, enclosing_namespace);
            }
            Some(Value::String(_)) => {
                // the logical-type layer is disabled: fall through to the
                // underlying physical type
            }
            Some(other) => {
                return Err(Details::InvalidAttribute {
                    key: "logicalType",
                    value: other.clone(),
                }
                .into());
            }
            None => {}
        }

        match attributes.get("type") {
            Some(Value::String(type_name)) => match type_name.as_str() {
                "record" => self.parse_record(attributes, enclosing_namespace),
                "enum" => self.parse_enum(attributes, enclosing_namespace),
                "array" => self.parse_array(attributes, enclosing_namespace),
                "map" => self.parse_map(attributes, enclosing_namespace),
                "fixed" => self.parse_fixed(attributes, enclosing_namespace),
                other => self.parse_type_name(other, enclosing_namespace),
            },
            Some(Value::Object(nested)) => self.parse_complex(nested, enclosing_namespace),
            Some(Value::Array(branches)) => self.parse_union(branches, enclosing_namespace),
            Some(other) => Err(Details::UnknownComplexType(other.clone()).into()),
            None => Err(Details::MissingAttribute("type").into()),
        }
    }

    /// Wrap the underlying physical type in the logical schema the annotation
    /// names. Unrecognized or ill-attached annotations keep the physical
    /// type, per the Avro specification.
    fn parse_logical(
        &mut self,
        logical: &str,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        let physical = match attributes.get("type") {
            Some(Value::String(s)) if s == "fixed" => {
                self.parse_fixed(attributes, enclosing_namespace)?
            }
            Some(json) => self.parse(json, enclosing_namespace)?,
            None => return Err(Details::MissingAttribute("type").into()),
        };

        let wrapped = match (logical, SchemaKind::from(&physical)) {
            ("decimal", SchemaKind::Bytes | SchemaKind::Fixed) => {
                match self.decimal_metadata(attributes) {
                    Ok((precision, scale)) => Some(Schema::Decimal(DecimalSchema {
                        precision,
                        scale,
                        inner: Box::new(physical.clone()),
                    })),
                    Err(err) => {
                        warn!("Ignoring invalid decimal logical type: {err}");
                        None
                    }
                }
            }
            ("uuid", SchemaKind::String) => Some(Schema::Uuid),
            ("date", SchemaKind::Int) => Some(Schema::Date),
            ("time-millis", SchemaKind::Int) => Some(Schema::TimeMillis),
            ("time-micros", SchemaKind::Long) => Some(Schema::TimeMicros),
            ("timestamp-millis", SchemaKind::Long) => Some(Schema::TimestampMillis),
            ("timestamp-micros", SchemaKind::Long) => Some(Schema::TimestampMicros),
            ("duration", SchemaKind::Fixed) => match physical {
                Schema::Fixed(ref fixed) if fixed.size == 12 => {
                    Some(Schema::Duration(fixed.clone()))
                }
                _ => {
                    warn!("Ignoring duration logical type on a fixed whose size is not 12");
                    None
                }
            },
            _ => {
                warn!("Ignoring logical type '{logical}' on a {physical:?} schema");
                None
            }
        };

        Ok(wrapped.unwrap_or(physical))
    }

    fn decimal_metadata(&self, attributes: &Map<String, Value>) -> AvroResult<(usize, usize)> {
        let precision = decimal_attr(attributes, "precision")?
            .ok_or(Details::MissingAttribute("precision"))?;
        let scale = decimal_attr(attributes, "scale")?.unwrap_or(0);

        if precision < 1 {
            return Err(Details::DecimalPrecisionNotPositive { precision }.into());
        }
        if scale > precision {
            return Err(Details::DecimalScaleExceedsPrecision { precision, scale }.into());
        }
        Ok((precision, scale))
    }

    /// A named definition already known under this name, either mid-compile
    /// or finished. Used when a definition is repeated without its body.
    fn seen_named_type(
        &self,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> Option<&Schema> {
        let type_name = attributes.get("type")?.as_str()?;
        let name = Name::new(type_name)
            .ok()?
            .fully_qualified_name(enclosing_namespace);
        self.in_progress.get(&name).or_else(|| self.compiled.get(&name))
    }

    fn parse_record(
        &mut self,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        let declared_fields = match attributes.get("fields") {
            Some(fields) => fields,
            None => {
                return match self.seen_named_type(attributes, enclosing_namespace) {
                    Some(seen) => Ok(seen.clone()),
                    None => Err(Details::MissingAttribute("fields").into()),
                };
            }
        };
        let declared_fields = declared_fields
            .as_array()
            .ok_or(Details::MissingAttribute("fields"))?;

        let record_name = Name::parse(attributes, enclosing_namespace)?;
        let aliases = qualify_aliases(aliases_attr(attributes), &record_name.namespace);
        self.start_definition(&record_name, &aliases);

        debug!("Compiling record schema {record_name}");

        let mut fields = Vec::with_capacity(declared_fields.len());
        let mut lookup = BTreeMap::new();
        for declared in declared_fields {
            let declared = match declared.as_object() {
                Some(map) => map,
                None => continue,
            };
            let field = RecordField::parse(declared, self, &record_name)?;
            if lookup.insert(field.name.clone(), fields.len()).is_some() {
                return Err(Details::DuplicateFieldName(field.name).into());
            }
            for alias in &field.aliases {
                lookup.insert(alias.clone(), fields.len());
            }
            fields.push(field);
        }

        let schema = Schema::Record(RecordSchema {
            id: register_record_identity(record_name.fullname(None)),
            name: record_name.clone(),
            aliases: aliases.clone(),
            doc: doc_attr(attributes),
            fields,
            lookup,
            attributes: extra_attributes(attributes, &["fields"]),
        });

        self.finish_definition(&record_name, &schema, &aliases);
        Ok(schema)
    }

    fn parse_enum(
        &mut self,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        let declared_symbols = match attributes.get("symbols") {
            Some(symbols) => symbols,
            None => {
                return match self.seen_named_type(attributes, enclosing_namespace) {
                    Some(seen) => Ok(seen.clone()),
                    None => Err(Details::MissingAttribute("symbols").into()),
                };
            }
        };

        let symbols: Vec<String> = declared_symbols
            .as_array()
            .and_then(|symbols| {
                symbols
                    .iter()
                    .map(|s| s.as_str().map(str::to_string))
                    .collect::<Option<_>>()
            })
            .ok_or(Details::InvalidAttribute {
                key: "symbols",
                value: declared_symbols.clone(),
            })?;

        let mut unique: HashSet<&str> = HashSet::with_capacity(symbols.len());
        for symbol in &symbols {
            validate_enum_symbol_name(symbol)?;
            if !unique.insert(symbol) {
                return Err(Details::DuplicateSymbol(symbol.clone()).into());
            }
        }

        let default = match attributes.get("default") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(Details::InvalidAttribute {
                    key: "default",
                    value: other.clone(),
                }
                .into());
            }
            None => None,
        };
        if let Some(ref symbol) = default {
            if !symbols.contains(symbol) {
                return Err(Details::EnumMismatch {
                    symbol: symbol.clone(),
                    symbols,
                }
                .into());
            }
        }

        let enum_name = Name::parse(attributes, enclosing_namespace)?;
        let aliases = qualify_aliases(aliases_attr(attributes), &enum_name.namespace);
        let schema = Schema::Enum(EnumSchema {
            name: enum_name.clone(),
            aliases: aliases.clone(),
            doc: doc_attr(attributes),
            symbols,
            default,
            attributes: extra_attributes(attributes, &["symbols", "default"]),
        });

        self.finish_definition(&enum_name, &schema, &aliases);
        Ok(schema)
    }

    fn parse_array(
        &mut self,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        let items = attributes
            .get("items")
            .ok_or(Details::MissingAttribute("items"))?;
        Ok(Schema::array(self.parse(items, enclosing_namespace)?))
    }

    fn parse_map(
        &mut self,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        let values = attributes
            .get("values")
            .ok_or(Details::MissingAttribute("values"))?;
        Ok(Schema::map(self.parse(values, enclosing_namespace)?))
    }

    fn parse_union(
        &mut self,
        branches: &[Value],
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        if branches.is_empty() && !self.options.allow_empty_unions {
            error!(
                "Union schemas should have at least one member! \
                 Set the `allow_empty_unions` option to accept this schema."
            );
            return Err(Details::EmptyUnion.into());
        }
        if branches.len() == 1 {
            warn!("Union schema with just one member! Consider dropping the union!");
        }

        let branches = branches
            .iter()
            .map(|branch| self.parse(branch, enclosing_namespace))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema::Union(UnionSchema::new(branches)?))
    }

    fn parse_fixed(
        &mut self,
        attributes: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Schema> {
        let declared_size = match attributes.get("size") {
            Some(size) => size,
            None => {
                return match self.seen_named_type(attributes, enclosing_namespace) {
                    Some(seen) => Ok(seen.clone()),
                    None => Err(Details::MissingAttribute("size").into()),
                };
            }
        };
        let size = declared_size
            .as_u64()
            .ok_or_else(|| Details::InvalidAttribute {
                key: "size",
                value: declared_size.clone(),
            })?;

        let fixed_name = Name::parse(attributes, enclosing_namespace)?;
        let aliases = qualify_aliases(aliases_attr(attributes), &fixed_name.namespace);
        let schema = Schema::Fixed(FixedSchema {
            name: fixed_name.clone(),
            aliases: aliases.clone(),
            doc: doc_attr(attributes),
            size: size as usize,
            attributes: extra_attributes(attributes, &["size"]),
        });

        self.finish_definition(&fixed_name, &schema, &aliases);
        Ok(schema)
    }

    /// Map a name (and its aliases) to a `Schema::Ref` for the duration of
    /// its own compilation.
    fn start_definition(&mut self, name: &Name, aliases: &Aliases) {
        let placeholder = Schema::Ref { name: name.clone() };
        self.in_progress.insert(name.clone(), placeholder.clone());
        if let Some(aliases) = aliases {
            for alias in aliases {
                self.in_progress.insert(
                    alias.fully_qualified_name(&name.namespace),
                    placeholder.clone(),
                );
            }
        }
    }

    /// Promote a finished definition (and its aliases) into `compiled`.
    fn finish_definition(&mut self, name: &Name, schema: &Schema, aliases: &Aliases) {
        self.in_progress.remove(name);
        self.compiled.insert(name.clone(), schema.clone());
        if let Some(aliases) = aliases {
            for alias in aliases {
                let alias_name = alias.fully_qualified_name(&name.namespace);
                self.in_progress.remove(&alias_name);
                self.compiled.insert(alias_name, schema.clone());
            }
        }
    }
}

fn primitive_schema(type_name: &str) -> Option<Schema> {
    Some(match type_name {
        "null" => Schema::Null,
        "boolean" => Schema::Boolean,
        "int" => Schema::Int,
        "long" => Schema::Long,
        "float" => Schema::Float,
        "double" => Schema::Double,
        "bytes" => Schema::Bytes,
        "string" => Schema::String,
        _ => return None,
    })
}

/// The registry key of a supplied definition. A `{"type": {...}}` wrapper
/// names the inner definition.
fn registry_key(name: Name, json: &Value) -> Name {
    json.get("type")
        .and_then(Value::as_object)
        .and_then(name_attr)
        .and_then(|inner| Name::new(&inner).ok())
        .unwrap_or(name)
}

/// Attributes not consumed by the schema grammar are kept as custom metadata.
fn extra_attributes(
    attributes: &Map<String, Value>,
    also_reserved: &[&'static str],
) -> BTreeMap<String, Value> {
    attributes
        .iter()
        .filter(|(key, _)| {
            !matches!(
                key.as_str(),
                "type" | "name" | "namespace" | "doc" | "aliases" | "logicalType"
            ) && !also_reserved.contains(&key.as_str())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Qualify unqualified aliases with the namespace of the name they alias.
fn qualify_aliases(aliases: Option<Vec<String>>, namespace: &Namespace) -> Aliases {
    aliases.map(|aliases| {
        aliases
            .into_iter()
            .map(|alias| match namespace {
                Some(ns) if !alias.contains('.') => format!("{ns}.{alias}"),
                _ => alias,
            })
            .map(|alias| Alias::new(&alias).unwrap())
            .collect()
    })
}

fn decimal_attr(attributes: &Map<String, Value>, key: &'static str) -> AvroResult<Option<usize>> {
    match attributes.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) => Ok(Some(v as usize)),
            None => Err(Details::InvalidAttribute {
                key,
                value: Value::Number(n.clone()),
            }
            .into()),
        },
        Some(other) => Err(Details::InvalidAttribute {
            key,
            value: other.clone(),
        }
        .into()),
    }
}
