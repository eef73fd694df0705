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

//! Name validation per the
//! [Avro specification](https://avro.apache.org/docs/current/specification/#names).
//!
//! Full names are handled by splitting at the last dot: everything before it
//! is the namespace, everything after it the simple name, and every
//! dot-separated segment must independently be a valid identifier.

use crate::{AvroResult, error::Details};
use regex_lite::Regex;
use std::sync::OnceLock;

/// One identifier segment: a letter or underscore followed by letters,
/// digits and underscores.
fn segment() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// Validates a possibly-qualified schema name and returns the byte offset of
/// its simple-name part.
///
/// A single leading dot anchors an explicitly empty namespace and is
/// otherwise ignored, so `.name` validates like `name`.
pub(crate) fn validate_schema_name(full_name: &str) -> AvroResult<usize> {
    let simple_start = match full_name.rfind('.') {
        Some(dot) => dot + 1,
        None => 0,
    };
    let simple = &full_name[simple_start..];
    if !segment().is_match(simple) {
        return Err(Details::InvalidName(full_name.to_string()).into());
    }
    if simple_start > 1 {
        let namespace = &full_name[..simple_start - 1];
        if validate_namespace(namespace).is_err() {
            return Err(Details::InvalidName(full_name.to_string()).into());
        }
    }
    Ok(simple_start)
}

/// Validates a namespace: empty, or dot-separated identifier segments.
pub(crate) fn validate_namespace(namespace: &str) -> AvroResult<()> {
    if namespace.is_empty() {
        return Ok(());
    }
    if namespace.split('.').all(|part| segment().is_match(part)) {
        Ok(())
    } else {
        Err(Details::InvalidNamespace(namespace.to_string()).into())
    }
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    if segment().is_match(symbol) {
        Ok(())
    } else {
        Err(Details::InvalidSymbol(symbol.to_string()).into())
    }
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    if segment().is_match(field_name) {
        Ok(())
    } else {
        Err(Details::InvalidFieldName(field_name.to_string()).into())
    }
}
