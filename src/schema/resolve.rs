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

use crate::error::Details;
use crate::schema::{Names, NamesRef, Namespace, RecordSchema, UnionSchema};
use crate::{AvroResult, Error, Schema};
use std::borrow::Borrow;
use std::collections::HashMap;

/// A schema (or set of schemas) together with the registry of every named
/// type reachable from it. Dangling `Ref`s fail construction.
#[derive(Debug)]
pub struct ResolvedSchema<'s> {
    names_ref: NamesRef<'s>,
    schemata: Vec<&'s Schema>,
}

impl<'s> TryFrom<&'s Schema> for ResolvedSchema<'s> {
    type Error = Error;

    fn try_from(schema: &'s Schema) -> AvroResult<Self> {
        let mut rs = ResolvedSchema {
            names_ref: HashMap::new(),
            schemata: vec![schema],
        };
        rs.resolve(rs.get_schemata(), &None)?;
        Ok(rs)
    }
}

impl<'s> TryFrom<Vec<&'s Schema>> for ResolvedSchema<'s> {
    type Error = Error;

    fn try_from(schemata: Vec<&'s Schema>) -> AvroResult<Self> {
        let mut rs = ResolvedSchema {
            names_ref: HashMap::new(),
            schemata,
        };
        rs.resolve(rs.get_schemata(), &None)?;
        Ok(rs)
    }
}

impl<'s> ResolvedSchema<'s> {
    pub fn get_schemata(&self) -> Vec<&'s Schema> {
        self.schemata.clone()
    }

    pub fn get_names(&self) -> &NamesRef<'s> {
        &self.names_ref
    }

    fn resolve(
        &mut self,
        schemata: Vec<&'s Schema>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<()> {
        for schema in schemata {
            match schema {
                Schema::Array(items) => self.resolve(vec![items], enclosing_namespace)?,
                Schema::Map(types) => self.resolve(vec![types], enclosing_namespace)?,
                Schema::Decimal(decimal) => {
                    self.resolve(vec![&decimal.inner], enclosing_namespace)?
                }
                Schema::Union(UnionSchema { schemas, .. }) => {
                    for schema in schemas {
                        self.resolve(vec![schema], enclosing_namespace)?
                    }
                }
                Schema::Enum(super::EnumSchema { name, .. })
                | Schema::Fixed(super::FixedSchema { name, .. })
                | Schema::Duration(super::FixedSchema { name, .. }) => {
                    let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
                    if self
                        .names_ref
                        .insert(fully_qualified_name.clone(), schema)
                        .is_some()
                    {
                        return Err(
                            Details::DuplicateName(fully_qualified_name.fullname(None)).into()
                        );
                    }
                }
                Schema::Record(RecordSchema { name, fields, .. }) => {
                    let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
                    if self
                        .names_ref
                        .insert(fully_qualified_name.clone(), schema)
                        .is_some()
                    {
                        return Err(
                            Details::DuplicateName(fully_qualified_name.fullname(None)).into()
                        );
                    } else {
                        let record_namespace = fully_qualified_name.namespace;
                        for field in fields {
                            self.resolve(vec![&field.schema], &record_namespace)?
                        }
                    }
                }
                Schema::Ref { name } => {
                    let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
                    if !self.names_ref.contains_key(&fully_qualified_name) {
                        return Err(Details::UnresolvedReference(fully_qualified_name).into());
                    }
                }
                _ => (),
            }
        }
        Ok(())
    }
}

/// Owned counterpart of [`ResolvedSchema`], used where the schema must move
/// together with its registry.
pub struct ResolvedOwnedSchema {
    names: Names,
    root_schema: Schema,
}

impl TryFrom<Schema> for ResolvedOwnedSchema {
    type Error = Error;

    fn try_from(schema: Schema) -> AvroResult<Self> {
        let mut rs = ResolvedOwnedSchema {
            names: HashMap::new(),
            root_schema: schema,
        };
        resolve_names(&rs.root_schema, &mut rs.names, &None)?;
        Ok(rs)
    }
}

impl ResolvedOwnedSchema {
    pub fn get_root_schema(&self) -> &Schema {
        &self.root_schema
    }

    pub fn get_names(&self) -> &Names {
        &self.names
    }
}

pub(crate) fn resolve_names(
    schema: &Schema,
    names: &mut Names,
    enclosing_namespace: &Namespace,
) -> AvroResult<()> {
    match schema {
        Schema::Array(items) => resolve_names(items, names, enclosing_namespace),
        Schema::Map(types) => resolve_names(types, names, enclosing_namespace),
        Schema::Decimal(decimal) => resolve_names(&decimal.inner, names, enclosing_namespace),
        Schema::Union(UnionSchema { schemas, .. }) => {
            for schema in schemas {
                resolve_names(schema, names, enclosing_namespace)?
            }
            Ok(())
        }
        Schema::Enum(super::EnumSchema { name, .. })
        | Schema::Fixed(super::FixedSchema { name, .. })
        | Schema::Duration(super::FixedSchema { name, .. }) => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            if names
                .insert(fully_qualified_name.clone(), schema.clone())
                .is_some()
            {
                Err(Details::DuplicateName(fully_qualified_name.fullname(None)).into())
            } else {
                Ok(())
            }
        }
        Schema::Record(RecordSchema { name, fields, .. }) => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            if names
                .insert(fully_qualified_name.clone(), schema.clone())
                .is_some()
            {
                Err(Details::DuplicateName(fully_qualified_name.fullname(None)).into())
            } else {
                let record_namespace = fully_qualified_name.namespace;
                for field in fields {
                    resolve_names(&field.schema, names, &record_namespace)?
                }
                Ok(())
            }
        }
        Schema::Ref { name } => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            names
                .get(&fully_qualified_name)
                .map(|_| ())
                .ok_or_else(|| Details::UnresolvedReference(fully_qualified_name).into())
        }
        _ => Ok(()),
    }
}

pub(crate) fn resolve_names_with_schemata(
    schemata: impl IntoIterator<Item = impl Borrow<Schema>>,
    names: &mut Names,
    enclosing_namespace: &Namespace,
) -> AvroResult<()> {
    for schema in schemata {
        resolve_names(schema.borrow(), names, enclosing_namespace)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use crate::schema::Name;

    #[test]
    fn test_resolution_inner_record_inherited_namespace() -> TestResult {
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
                            "type":"record",
                            "name":"inner_record_name",
                            "fields":[
                                {
                                    "name":"inner_field_1",
                                    "type":"double"
                                }
                            ]
                        }
                    ]
            },
            {
                "name": "outer_field_2",
                "type" : "inner_record_name"
            }
          ]
        }
        "#;
        let schema = Schema::parse_str(schema)?;
        let rs = ResolvedSchema::try_from(&schema).expect("Schema didn't successfully parse");
        assert_eq!(rs.get_names().len(), 2);
        for s in &["space.record_name", "space.inner_record_name"] {
            assert!(rs.get_names().contains_key(&Name::new(s)?));
        }

        Ok(())
    }

    #[test]
    fn test_resolution_dangling_reference() -> TestResult {
        let schema = r#"
        {
          "name": "record_name",
          "type": "record",
          "fields": [
            {"name": "f", "type": ["null", "double"]}
          ]
        }
        "#;
        let schema = Schema::parse_str(schema)?;
        // replace a field schema with an unknown reference
        let mut names = Names::new();
        resolve_names(&schema, &mut names, &None)?;
        assert!(
            resolve_names(
                &Schema::Ref {
                    name: Name::new("unknown")?
                },
                &mut names,
                &None
            )
            .is_err()
        );

        Ok(())
    }
}
