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
    schema::{Name, Schema, SchemaKind},
    types::{Value, ValueKind},
};
use std::{error::Error as _, fmt};

/// The error type of this crate.
///
/// The interesting part lives in [`Details`]; `Error` keeps it boxed so that
/// `Result`s stay a single pointer wide. Use [`details`](Self::details) or
/// [`into_details`](Self::into_details) to match on the concrete failure.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// Every failure the crate can report, grouped by the stage that raises it:
/// option construction, schema compilation, the binary codecs, writer/reader
/// schema resolution, the JSON value codec, the container file, and block
/// compression.
#[derive(thiserror::Error)]
pub enum Details {
    // ---- option construction ----
    #[error("Unknown option key: {0}")]
    UnknownOption(String),

    #[error("Invalid value for option {key:?}: {value}")]
    InvalidOptionValue {
        key: String,
        value: serde_json::Value,
    },

    // ---- schema compilation ----
    #[error("Schema input is not valid JSON")]
    SchemaJson(#[source] serde_json::Error),

    #[error("Failed to read schema input")]
    SchemaRead(#[source] std::io::Error),

    #[error("A schema must be a JSON string, object or array")]
    SchemaInputShape,

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown complex type: {0}")]
    UnknownComplexType(serde_json::Value),

    #[error("Schema attribute `{0}` is missing")]
    MissingAttribute(&'static str),

    #[error("Schema attribute `{key}` has an unusable value: {value}")]
    InvalidAttribute {
        key: &'static str,
        value: serde_json::Value,
    },

    #[error(
        "Invalid name {0:?}: names are dot-separated segments of [A-Za-z_][A-Za-z0-9_]*, ending in the simple name"
    )]
    InvalidName(String),

    #[error("Invalid namespace {0:?}: every dot-separated segment must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidNamespace(String),

    #[error("Invalid enum symbol {0:?}: symbols must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidSymbol(String),

    #[error("Duplicate enum symbol {0}")]
    DuplicateSymbol(String),

    #[error("Invalid field name {0:?}: field names must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidFieldName(String),

    #[error("Duplicate field name {0}")]
    DuplicateFieldName(String),

    #[error("The name {0} is defined more than once")]
    DuplicateName(String),

    #[error("Unresolved reference to named type {0}")]
    UnresolvedReference(Name),

    #[error("Unions may not immediately contain other unions")]
    NestedUnion,

    #[error("Two union branches share the same category")]
    DuplicateUnionBranch,

    #[error("Union type should not be empty")]
    EmptyUnion,

    #[error("A union default must match the first branch ({first_branch:?}), got {default:?}")]
    InvalidUnionDefault {
        first_branch: SchemaKind,
        default: ValueKind,
    },

    #[error("Default for field {field:?} of record {record:?} does not match its schema {schema}")]
    InvalidDefault {
        field: String,
        record: String,
        schema: String,
    },

    // ---- decimal metadata ----
    #[error("The decimal precision ({precision}) must be a positive number")]
    DecimalPrecisionNotPositive { precision: usize },

    #[error("The decimal scale ({scale}) must not exceed the precision ({precision})")]
    DecimalScaleExceedsPrecision { precision: usize, scale: usize },

    #[error("Decimal with {digits} digits does not fit into a decimal of precision {precision}")]
    DecimalPrecisionOverflow { precision: usize, digits: u64 },

    #[error("A decimal of {needed} bytes cannot be sign-extended into {requested} bytes")]
    DecimalSignExtension { requested: usize, needed: usize },

    #[error("A decimal must be backed by bytes or fixed, not {0:?}")]
    DecimalPhysicalType(SchemaKind),

    // ---- primitive codec ----
    #[error("Unexpected end of input")]
    TruncatedInput(#[source] std::io::Error),

    #[error("Overflow when decoding integer value")]
    IntegerOverflow,

    #[error("Decoded integer out of range for i32: {1}")]
    IntOutOfRange(#[source] std::num::TryFromIntError, i64),

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i64),

    #[error("A boolean must be encoded as 0 or 1, got {0}")]
    InvalidBoolean(u8),

    #[error("Invalid utf-8 string")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),

    #[error("Invalid utf-8 string")]
    InvalidUtf8Str(#[source] std::str::Utf8Error),

    #[error("Refusing to allocate {desired} bytes (maximum allowed: {maximum})")]
    OversizedAllocation { desired: usize, maximum: usize },

    #[error("Failed to write")]
    IoWrite(#[source] std::io::Error),

    #[error("Failed to flush the underlying writer")]
    IoFlush(#[source] std::io::Error),

    // ---- validation & encoding ----
    #[error("Value {value:?} does not match schema {schema:?}: {reason}")]
    InvalidValue {
        value: Value,
        schema: Schema,
        reason: String,
    },

    #[error("A {value_kind:?} value cannot be encoded as any of {supported:?}")]
    UnexpectedValueKind {
        value_kind: ValueKind,
        supported: Vec<SchemaKind>,
    },

    #[error("Missing field in record: {0:?}")]
    MissingField(String),

    #[error("Field {field:?} is not declared in record {record:?}")]
    UnknownField { field: String, record: String },

    #[error("Record value cannot be adapted to {record:?}: {reason}")]
    RecordNotAdaptable { record: String, reason: String },

    #[error("Enum symbol not found: {0}")]
    UnknownEnumSymbol(String),

    #[error("Enum index {index} out of bounds: {nsymbols}")]
    EnumIndexOutOfRange { index: i64, nsymbols: usize },

    #[error("Union branch index {index} out of bounds: {num_branches}")]
    InvalidUnionTag { index: i64, num_branches: usize },

    #[error("No union branch in {branches:?} accepts a {value_kind:?} value")]
    DispatchNoMatch {
        branches: Vec<String>,
        value_kind: ValueKind,
    },

    #[error(
        "Mapping matches more than one union branch ({branches:?}); cannot dispatch {value_kind:?}"
    )]
    DispatchAmbiguous {
        branches: Vec<String>,
        value_kind: ValueKind,
    },

    #[error("Fixed size mismatch, expected: {expected}, got: {actual}")]
    FixedSizeMismatch { expected: usize, actual: usize },

    #[error("Not a valid UUID")]
    InvalidUuid(#[source] uuid::Error),

    // ---- writer -> reader schema resolution ----
    #[error("Cannot resolve value {value:?} against a {target:?} schema")]
    ResolutionMismatch { target: SchemaKind, value: Value },

    #[error("Symbol {symbol:?} is not among the reader's symbols {symbols:?} and no default applies")]
    EnumMismatch {
        symbol: String,
        symbols: Vec<String>,
    },

    // ---- JSON value codec ----
    #[error("Failed to convert JSON to string")]
    JsonToString(#[source] serde_json::Error),

    #[error("The non-finite double {0} has no JSON representation")]
    NonFiniteDouble(f64),

    #[error("JSON value {value} does not match schema {schema:?}")]
    JsonValueMismatch {
        value: serde_json::Value,
        schema: SchemaKind,
    },

    // ---- container file ----
    #[error("Stream does not begin with the Avro object container magic")]
    BadMagic,

    #[error("Container header carries no avro.schema entry")]
    MissingSchemaMetadata,

    #[error("Container header carries no metadata map")]
    MissingHeaderMetadata,

    #[error("avro.codec must be a bytes value")]
    BadCodecMetadata,

    #[error("Codec '{0}' is not supported/enabled")]
    UnsupportedCodec(String),

    #[error("Data block ends before its declared size")]
    TruncatedBlock(#[source] std::io::Error),

    #[error("Block sync marker does not match the header sync marker")]
    CorruptSync,

    #[error("A data block claimed objects its payload does not contain")]
    BlockNotConsumed,

    #[error("The file header is already flushed")]
    HeaderAlreadyWritten,

    #[error("Metadata keys starting with 'avro.' are reserved for internal usage: {0}")]
    ReservedMetadataKey(String),

    #[error("Block of {0} bytes is too large to frame")]
    OversizedBlock(usize),

    // ---- block compression ----
    #[error("The {codec} codec failed to compress a block: {reason}")]
    Compress {
        codec: &'static str,
        reason: String,
    },

    #[error("The {codec} codec failed to decompress a block: {reason}")]
    Decompress {
        codec: &'static str,
        reason: String,
    },

    #[cfg(feature = "snappy")]
    #[error("Bad Snappy CRC32; expected {expected:x} but got {actual:x}")]
    SnappyCrc32 { expected: u32, actual: u32 },
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut msg = self.to_string();
        if let Some(e) = self.source() {
            msg.extend([": ", &e.to_string()]);
        }
        write!(f, "{msg}")
    }
}
