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

//! **dynavro** is a dynamic [Apache Avro](https://avro.apache.org/) serialization
//! core: a schema compiler and a pair of binary codecs that operate against
//! compiled schemas, plus the object-container-file framing.
//!
//! Data is handled through the generic [`Value`](types::Value) type, which is
//! great for dealing with Avro data in a dynamic way: unknown or rapidly
//! changing schemas, or when you don't want or need to map to concrete types.
//! The [`Options`] matrix modulates how schemas compile and how values encode
//! and decode — mapping-shaped records, union branch hints, default
//! injection, logical type promotion and more.
//!
//! ```
//! use dynavro::{Codec, Reader, Schema, Writer, types::Record, types::Value};
//!
//! # fn main() -> Result<(), dynavro::Error> {
//! let raw_schema = r#"
//!     {
//!         "type": "record",
//!         "name": "test",
//!         "fields": [
//!             {"name": "a", "type": "long", "default": 42},
//!             {"name": "b", "type": "string"}
//!         ]
//!     }
//! "#;
//! let schema = Schema::parse_str(raw_schema)?;
//!
//! let mut writer = Writer::with_codec(&schema, Vec::new(), Codec::Deflate)?;
//! let mut record = Record::new(writer.schema()).unwrap();
//! record.put("a", 27i64);
//! record.put("b", "foo");
//! writer.append_value(record)?;
//! let encoded = writer.into_inner()?;
//!
//! for value in Reader::new(&encoded[..])? {
//!     println!("{:?}", value?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `snappy`: enable support for the Snappy codec
//! - `zstandard`: enable support for the Zstandard codec
//! - `bzip`: enable support for the Bzip2 codec
//! - `xz`: enable support for the Xz codec

mod codec;
mod decimal;
mod decode;
mod duration;
mod encode;
mod options;
mod reader;
mod writer;

mod validator;

pub mod error;
pub mod rabin;
pub mod schema;
pub mod types;
pub mod util;

pub use codec::Codec;
pub use decimal::Decimal;
pub use decode::{decode, decode_with_options};
pub use duration::{Days, Duration, Millis, Months};
pub use encode::{encode, encode_to_vec, encode_with_options};
pub use error::Error;
pub use options::Options;
pub use reader::{Reader, ReaderBuilder, from_avro_datum, from_avro_datum_with_options, read_marker};
pub use schema::Schema;
pub use types::Value;
pub use uuid::Uuid;
pub use writer::{Writer, WriterBuilder, to_avro_datum, to_avro_datum_with_options};

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;

#[cfg(test)]
pub(crate) type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[cfg(test)]
mod tests {
    use crate::{
        Codec, Reader, Schema, Writer, from_avro_datum,
        types::{Record, Value},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enum_default() {
        let writer_raw_schema = r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long", "default": 42},
                    {"name": "b", "type": "string"}
                ]
            }
        "#;
        let reader_raw_schema = r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long", "default": 42},
                    {"name": "b", "type": "string"},
                    {
                        "name": "c",
                        "type": {
                            "type": "enum",
                            "name": "suit",
                            "symbols": ["diamonds", "spades", "clubs", "hearts"]
                        },
                        "default": "spades"
                    }
                ]
            }
        "#;
        let writer_schema = Schema::parse_str(writer_raw_schema).unwrap();
        let reader_schema = Schema::parse_str(reader_raw_schema).unwrap();
        let mut writer = Writer::with_codec(&writer_schema, Vec::new(), Codec::Null).unwrap();
        let mut record = Record::new(writer.schema()).unwrap();
        record.put("a", 27i64);
        record.put("b", "foo");
        writer.append_value(record).unwrap();
        let input = writer.into_inner().unwrap();
        let mut reader = Reader::builder(&input[..])
            .reader_schema(&reader_schema)
            .build()
            .unwrap();
        assert_eq!(
            reader.next().unwrap().unwrap(),
            Value::record(vec![
                ("a".to_string(), Value::Long(27)),
                ("b".to_string(), Value::String("foo".to_string())),
                ("c".to_string(), Value::Enum(1, "spades".to_string())),
            ])
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_enum_string_value() {
        let raw_schema = r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long", "default": 42},
                    {"name": "b", "type": "string"},
                    {
                        "name": "c",
                        "type": {
                            "type": "enum",
                            "name": "suit",
                            "symbols": ["diamonds", "spades", "clubs", "hearts"]
                        },
                        "default": "spades"
                    }
                ]
            }
        "#;
        let schema = Schema::parse_str(raw_schema).unwrap();
        let mut writer = Writer::with_codec(&schema, Vec::new(), Codec::Null).unwrap();
        let mut record = Record::new(writer.schema()).unwrap();
        record.put("a", 27i64);
        record.put("b", "foo");
        record.put("c", "clubs");
        writer.append_value(record).unwrap();
        let input = writer.into_inner().unwrap();
        let mut reader = Reader::new(&input[..]).unwrap();
        assert_eq!(
            reader.next().unwrap().unwrap(),
            Value::record(vec![
                ("a".to_string(), Value::Long(27)),
                ("b".to_string(), Value::String("foo".to_string())),
                ("c".to_string(), Value::Enum(2, "clubs".to_string())),
            ])
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_illformed_length() {
        let raw_schema = r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long", "default": 42},
                    {"name": "b", "type": "string"}
                ]
            }
        "#;

        let schema = Schema::parse_str(raw_schema).unwrap();

        // Would allocate 18446744073709551605 bytes
        let illformed: &[u8] = &[0x3e, 0x15, 0xff, 0x1f, 0x15, 0xff];

        let value = from_avro_datum(&schema, &mut &*illformed, None);
        assert!(value.is_err());
    }
}
