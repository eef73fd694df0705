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

//! The configuration matrix that modulates schema compilation and
//! encoding/decoding behavior.

use crate::{AvroResult, error::Details, schema::Names};
use serde_json::Value as JsonValue;

/// Immutable configuration threaded through schema compilation and the
/// binary codecs.
///
/// An `Options` value is frozen once handed to a parser, encoder or decoder;
/// all fields have defaults so `Options::default()` is a useful starting
/// point. Flags can be toggled with the consuming `with_*` setters:
///
/// ```
/// use dynavro::Options;
///
/// let options = Options::default()
///     .with_record_decodes_to_dict(true)
///     .with_allow_tuple_notation(true);
/// assert!(options.record_decodes_to_dict);
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Decode returns a mapping instead of a typed record value.
    pub record_decodes_to_dict: bool,
    /// Allow mapping values where a record is expected.
    pub record_can_encode_dict: bool,
    /// Honor a `-type` key in mappings to select a union branch or
    /// disambiguate records.
    pub record_values_type_hint: bool,
    /// Silently drop mapping keys not defined in the record; when false, fail.
    pub record_allow_extra_fields: bool,
    /// Fill missing record fields from field defaults; when false, fail.
    pub record_encode_use_defaults: bool,
    /// Accept record values that originate from a different schema
    /// compilation iff names and field shapes match.
    pub adapt_record_types: bool,
    /// Treat a single-entry mapping `{branch-name: payload}` as an explicit
    /// union branch selector.
    pub allow_tuple_notation: bool,
    /// Skip default validation during compilation.
    pub allow_invalid_default_values: bool,
    /// Permit unions with zero branches (they always fail at encode/decode).
    pub allow_empty_unions: bool,
    /// Accept a record default whose value matches any union branch, not only
    /// the first.
    pub allow_union_default_any_member: bool,
    /// Fingerprint API returns raw digest bytes vs. an integer.
    pub fingerprint_returns_digest: bool,
    /// When encoding `bytes`, accept strings by UTF-8 encoding them.
    pub types_str_to_bytes: bool,
    /// Enable the logical-type promotion layer.
    pub logical_types: bool,
    /// Treat UUID-shaped strings as logical UUID when decoding plain strings.
    pub string_types_default_to_logical_uuid: bool,
    /// Reject decimals whose unscaled integer exceeds the declared precision.
    pub decimal_check_exp_overflow: bool,
    /// Accept a seconds-based floating interpretation of timestamp-millis
    /// values produced by legacy writers.
    pub alternate_timestamp_millis_encoding: bool,
    /// User-supplied named types used to satisfy schema references.
    pub externally_defined_types: Names,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            record_decodes_to_dict: false,
            record_can_encode_dict: true,
            record_values_type_hint: false,
            record_allow_extra_fields: true,
            record_encode_use_defaults: true,
            adapt_record_types: true,
            allow_tuple_notation: false,
            allow_invalid_default_values: false,
            allow_empty_unions: false,
            allow_union_default_any_member: false,
            fingerprint_returns_digest: true,
            types_str_to_bytes: true,
            logical_types: true,
            string_types_default_to_logical_uuid: false,
            decimal_check_exp_overflow: true,
            alternate_timestamp_millis_encoding: false,
            externally_defined_types: Names::new(),
        }
    }
}

macro_rules! with_flag {
    ($(#[$doc:meta])* $name:ident, $field:ident) => {
        $(#[$doc])*
        pub fn $name(mut self, value: bool) -> Self {
            self.$field = value;
            self
        }
    };
}

impl Options {
    with_flag!(with_record_decodes_to_dict, record_decodes_to_dict);
    with_flag!(with_record_can_encode_dict, record_can_encode_dict);
    with_flag!(with_record_values_type_hint, record_values_type_hint);
    with_flag!(with_record_allow_extra_fields, record_allow_extra_fields);
    with_flag!(with_record_encode_use_defaults, record_encode_use_defaults);
    with_flag!(with_adapt_record_types, adapt_record_types);
    with_flag!(with_allow_tuple_notation, allow_tuple_notation);
    with_flag!(
        with_allow_invalid_default_values,
        allow_invalid_default_values
    );
    with_flag!(with_allow_empty_unions, allow_empty_unions);
    with_flag!(
        with_allow_union_default_any_member,
        allow_union_default_any_member
    );
    with_flag!(with_fingerprint_returns_digest, fingerprint_returns_digest);
    with_flag!(with_types_str_to_bytes, types_str_to_bytes);
    with_flag!(with_logical_types, logical_types);
    with_flag!(
        with_string_types_default_to_logical_uuid,
        string_types_default_to_logical_uuid
    );
    with_flag!(with_decimal_check_exp_overflow, decimal_check_exp_overflow);
    with_flag!(
        with_alternate_timestamp_millis_encoding,
        alternate_timestamp_millis_encoding
    );

    /// Register user-supplied named types used to satisfy schema references.
    pub fn with_externally_defined_types(mut self, names: Names) -> Self {
        self.externally_defined_types = names;
        self
    }

    /// Build `Options` from dynamic `(key, JSON value)` pairs.
    ///
    /// Unknown keys are rejected with [`Details::UnknownOption`], boolean
    /// options given a non-boolean value with [`Details::InvalidOptionValue`].
    /// `externally_defined_types` carries `Schema` values and cannot be set
    /// this way; use [`Options::with_externally_defined_types`].
    pub fn from_pairs<K, I>(pairs: I) -> AvroResult<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, JsonValue)>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options = options.set(key.as_ref(), value)?;
        }
        Ok(options)
    }

    fn set(mut self, key: &str, value: JsonValue) -> AvroResult<Self> {
        let flag = match value {
            JsonValue::Bool(b) => b,
            other => {
                return Err(Details::InvalidOptionValue {
                    key: key.to_string(),
                    value: other,
                }
                .into());
            }
        };
        match key {
            "record_decodes_to_dict" => self.record_decodes_to_dict = flag,
            "record_can_encode_dict" => self.record_can_encode_dict = flag,
            "record_values_type_hint" => self.record_values_type_hint = flag,
            "record_allow_extra_fields" => self.record_allow_extra_fields = flag,
            "record_encode_use_defaults" => self.record_encode_use_defaults = flag,
            "adapt_record_types" => self.adapt_record_types = flag,
            "allow_tuple_notation" => self.allow_tuple_notation = flag,
            "allow_invalid_default_values" => self.allow_invalid_default_values = flag,
            "allow_empty_unions" => self.allow_empty_unions = flag,
            "allow_union_default_any_member" => self.allow_union_default_any_member = flag,
            "fingerprint_returns_digest" => self.fingerprint_returns_digest = flag,
            "types_str_to_bytes" => self.types_str_to_bytes = flag,
            "logical_types" => self.logical_types = flag,
            "string_types_default_to_logical_uuid" => {
                self.string_types_default_to_logical_uuid = flag
            }
            "decimal_check_exp_overflow" => self.decimal_check_exp_overflow = flag,
            "alternate_timestamp_millis_encoding" => {
                self.alternate_timestamp_millis_encoding = flag
            }
            unknown => return Err(Details::UnknownOption(unknown.to_string()).into()),
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TestResult};
    use serde_json::json;

    #[test]
    fn test_defaults_match_documented_matrix() {
        let options = Options::default();
        assert!(!options.record_decodes_to_dict);
        assert!(options.record_can_encode_dict);
        assert!(!options.record_values_type_hint);
        assert!(options.record_allow_extra_fields);
        assert!(options.record_encode_use_defaults);
        assert!(options.adapt_record_types);
        assert!(!options.allow_tuple_notation);
        assert!(!options.allow_invalid_default_values);
        assert!(!options.allow_empty_unions);
        assert!(!options.allow_union_default_any_member);
        assert!(options.fingerprint_returns_digest);
        assert!(options.types_str_to_bytes);
        assert!(options.logical_types);
        assert!(!options.string_types_default_to_logical_uuid);
        assert!(options.decimal_check_exp_overflow);
        assert!(!options.alternate_timestamp_millis_encoding);
        assert!(options.externally_defined_types.is_empty());
    }

    #[test]
    fn test_from_pairs() -> TestResult {
        let options = Options::from_pairs([
            ("record_decodes_to_dict", json!(true)),
            ("types_str_to_bytes", json!(false)),
        ])?;
        assert!(options.record_decodes_to_dict);
        assert!(!options.types_str_to_bytes);
        Ok(())
    }

    #[test]
    fn test_from_pairs_rejects_unknown_key() {
        match Options::from_pairs([("no_such_option", json!(true))]).map_err(Error::into_details) {
            Err(Details::UnknownOption(key)) => assert_eq!(key, "no_such_option"),
            other => panic!("Expected Details::UnknownOption, got {other:?}"),
        }
    }

    #[test]
    fn test_from_pairs_rejects_non_boolean_value() {
        match Options::from_pairs([("logical_types", json!("yes"))]).map_err(Error::into_details) {
            Err(Details::InvalidOptionValue { key, .. }) => assert_eq!(key, "logical_types"),
            other => panic!("Expected Details::InvalidOptionValue, got {other:?}"),
        }
    }
}
