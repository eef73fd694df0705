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

//! Logic handling reading from Avro format at user level.
//!
//! An object container file is a header (magic, metadata map, sync marker)
//! followed by framed data blocks. The reader decompresses one block at a
//! time and decodes objects out of it lazily; a clean end of stream is only
//! legal exactly between blocks.

use crate::{
    AvroResult, Codec, Error,
    decode::{decode_internal, decode_with_options},
    error::Details,
    options::Options,
    schema::{Names, Schema, resolve_names, resolve_names_with_schemata},
    types::Value,
    util,
};
use log::warn;
use serde_json::from_slice;
use std::{
    collections::HashMap,
    io::{ErrorKind, Read},
    str::FromStr,
};

const CONTAINER_MAGIC: [u8; 4] = *b"Obj\x01";

/// Everything the container header declares.
#[derive(Debug)]
struct ContainerHeader {
    writer_schema: Schema,
    names: Names,
    codec: Codec,
    marker: [u8; 16],
    user_metadata: HashMap<String, Vec<u8>>,
}

fn read_container_header<R: Read>(
    reader: &mut R,
    schemata: &[&Schema],
) -> AvroResult<ContainerHeader> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(Details::TruncatedInput)?;
    if magic != CONTAINER_MAGIC {
        return Err(Details::BadMagic.into());
    }

    let metadata = match decode_with_options(
        &Schema::map(Schema::Bytes),
        &Options::default(),
        reader,
    )? {
        Value::Map(metadata) => metadata,
        _ => return Err(Details::MissingHeaderMetadata.into()),
    };

    let (writer_schema, names) = schema_from_metadata(&metadata, schemata)?;
    let codec = codec_from_metadata(&metadata)?;

    let mut user_metadata = HashMap::new();
    for (key, value) in metadata {
        if key == "avro.schema" || key == "avro.codec" {
            continue;
        }
        if key.starts_with("avro.") {
            warn!("Ignoring unknown metadata key: {key}");
            continue;
        }
        match value {
            Value::Bytes(bytes) => {
                user_metadata.insert(key, bytes);
            }
            other => warn!("User metadata values must be bytes, found {other:?}"),
        }
    }

    let mut marker = [0u8; 16];
    reader
        .read_exact(&mut marker)
        .map_err(Details::TruncatedInput)?;

    Ok(ContainerHeader {
        writer_schema,
        names,
        codec,
        marker,
        user_metadata,
    })
}

/// Parse the writer schema out of `avro.schema`, collecting every named type
/// the decoder may need to chase.
fn schema_from_metadata(
    metadata: &HashMap<String, Value>,
    schemata: &[&Schema],
) -> AvroResult<(Schema, Names)> {
    let json: serde_json::Value = match metadata.get("avro.schema") {
        Some(Value::Bytes(bytes)) => {
            from_slice(bytes).map_err(|_| Details::MissingSchemaMetadata)?
        }
        _ => return Err(Details::MissingSchemaMetadata.into()),
    };

    let mut names = Names::new();
    if schemata.is_empty() {
        let writer_schema = Schema::parse(&json)?;
        resolve_names(&writer_schema, &mut names, &None)?;
        Ok((writer_schema, names))
    } else {
        resolve_names_with_schemata(schemata.iter().copied(), &mut names, &None)?;
        let writer_schema = Schema::parse_with_names(&json, names.clone())?;
        // named types the writer schema defines inline are needed as well;
        // external definitions win on collision. Best effort, because the
        // writer schema may itself only reference names supplied externally.
        let mut inline = Names::new();
        let _ = resolve_names(&writer_schema, &mut inline, &None);
        for (name, schema) in inline {
            names.entry(name).or_insert(schema);
        }
        Ok((writer_schema, names))
    }
}

fn codec_from_metadata(metadata: &HashMap<String, Value>) -> AvroResult<Codec> {
    let Some(declared) = metadata.get("avro.codec") else {
        return Ok(Codec::Null);
    };
    let Value::Bytes(bytes) = declared else {
        return Err(Details::BadCodecMetadata.into());
    };
    let name = std::str::from_utf8(bytes).map_err(Details::InvalidUtf8Str)?;
    Codec::from_str(name).map_err(|_| Details::UnsupportedCodec(name.to_string()).into())
}

/// One decompressed data block and a cursor over its remaining objects.
#[derive(Debug)]
struct BlockCursor {
    data: Vec<u8>,
    consumed: usize,
    remaining: usize,
}

impl BlockCursor {
    fn is_drained(&self) -> bool {
        self.remaining == 0
    }
}

/// Main interface for reading Avro formatted values.
///
/// To be used as an iterator:
///
/// ```no_run
/// # use dynavro::Reader;
/// # use std::io::Cursor;
/// # let input = Cursor::new(Vec::<u8>::new());
/// for value in Reader::new(input).unwrap() {
///     match value {
///         Ok(v) => println!("{:?}", v),
///         Err(e) => println!("Error: {}", e),
///     };
/// }
/// ```
#[derive(Debug)]
pub struct Reader<'a, R> {
    reader: R,
    header: ContainerHeader,
    schemata: Vec<&'a Schema>,
    reader_schema: Option<&'a Schema>,
    options: Options,
    current: Option<BlockCursor>,
    should_resolve: bool,
    errored: bool,
}

/// Configures and builds a [`Reader`].
pub struct ReaderBuilder<'a, R> {
    reader: R,
    reader_schema: Option<&'a Schema>,
    schemata: Vec<&'a Schema>,
    options: Options,
}

impl<'a, R: Read> ReaderBuilder<'a, R> {
    /// Create a builder for a `Reader` consuming `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            reader_schema: None,
            schemata: Vec::new(),
            options: Options::default(),
        }
    }

    /// Decode against this reader schema, applying schema resolution when it
    /// differs from the writer schema embedded in the stream.
    pub fn reader_schema(mut self, reader_schema: &'a Schema) -> Self {
        self.reader_schema = Some(reader_schema);
        self
    }

    /// Additional schemas used to resolve `Schema::Ref` references.
    pub fn schemata(mut self, schemata: Vec<&'a Schema>) -> Self {
        self.schemata = schemata;
        self
    }

    /// The [`Options`] used when decoding values.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build(mut self) -> AvroResult<Reader<'a, R>> {
        let schemata = if self.schemata.is_empty() {
            self.reader_schema.map(|rs| vec![rs]).unwrap_or_default()
        } else {
            self.schemata
        };
        let header = read_container_header(&mut self.reader, &schemata)?;
        let should_resolve = self
            .reader_schema
            .is_some_and(|reader_schema| header.writer_schema != *reader_schema);
        Ok(Reader {
            reader: self.reader,
            header,
            schemata,
            reader_schema: self.reader_schema,
            options: self.options,
            current: None,
            should_resolve,
            errored: false,
        })
    }
}

impl<'a, R: Read> Reader<'a, R> {
    /// Creates a `Reader` given something implementing the `io::Read` trait
    /// to read from. No reader `Schema` will be set.
    ///
    /// **NOTE** The avro header is going to be read automatically upon
    /// creation of the `Reader`.
    pub fn new(reader: R) -> AvroResult<Reader<'a, R>> {
        Reader::builder(reader).build()
    }

    /// Creates a `Reader` given a reader `Schema` and something implementing
    /// the `io::Read` trait to read from.
    ///
    /// **NOTE** The avro header is going to be read automatically upon
    /// creation of the `Reader`.
    pub fn with_schema(reader_schema: &'a Schema, reader: R) -> AvroResult<Reader<'a, R>> {
        Reader::builder(reader).reader_schema(reader_schema).build()
    }

    /// Returns a [`ReaderBuilder`] for fine-grained construction.
    pub fn builder(reader: R) -> ReaderBuilder<'a, R> {
        ReaderBuilder::new(reader)
    }

    /// Get a reference to the writer `Schema`.
    #[inline]
    pub fn writer_schema(&self) -> &Schema {
        &self.header.writer_schema
    }

    /// Get a reference to the optional reader `Schema`.
    #[inline]
    pub fn reader_schema(&self) -> Option<&Schema> {
        self.reader_schema
    }

    /// Get a reference to the user metadata.
    #[inline]
    pub fn user_metadata(&self) -> &HashMap<String, Vec<u8>> {
        &self.header.user_metadata
    }

    /// Read and decompress the next data block, or detect a clean end of
    /// stream.
    fn next_block(&mut self) -> AvroResult<Option<BlockCursor>> {
        let count = match util::read_long(&mut self.reader) {
            Ok(count) => count,
            Err(e) => {
                return match e.into_details() {
                    Details::TruncatedInput(io_err)
                        if io_err.kind() == ErrorKind::UnexpectedEof =>
                    {
                        Ok(None)
                    }
                    details => Err(Error::new(details)),
                };
            }
        };
        let count = usize::try_from(count).map_err(|_| Details::InvalidLength(count))?;

        let byte_len = util::read_long(&mut self.reader)?;
        let byte_len = usize::try_from(byte_len).map_err(|_| Details::InvalidLength(byte_len))?;
        let mut data = vec![0u8; util::safe_len(byte_len)?];
        self.reader
            .read_exact(&mut data)
            .map_err(Details::TruncatedBlock)?;

        let mut marker = [0u8; 16];
        self.reader
            .read_exact(&mut marker)
            .map_err(Details::TruncatedBlock)?;
        if marker != self.header.marker {
            return Err(Details::CorruptSync.into());
        }

        self.header.codec.decompress(&mut data)?;
        Ok(Some(BlockCursor {
            data,
            consumed: 0,
            remaining: count,
        }))
    }

    /// Decode the next object out of the given block, applying schema
    /// resolution when a diverging reader schema was configured.
    fn decode_from(&self, block: &mut BlockCursor) -> AvroResult<Value> {
        let mut slice = &block.data[block.consumed..];
        let before = slice.len();
        let value = decode_internal(
            &self.header.writer_schema,
            &self.header.names,
            &self.header.writer_schema.namespace(),
            &self.options,
            &mut slice,
        )?;
        if before != 0 && before == slice.len() {
            // nothing was consumed: bail out instead of looping forever
            return Err(Details::BlockNotConsumed.into());
        }
        block.consumed += before - slice.len();
        block.remaining -= 1;

        match (self.should_resolve, self.reader_schema) {
            (true, Some(schema)) => {
                if self.schemata.is_empty() {
                    value.resolve(schema)
                } else {
                    value.resolve_schemata(schema, self.schemata.clone())
                }
            }
            _ => Ok(value),
        }
    }

    fn read_one(&mut self) -> AvroResult<Option<Value>> {
        loop {
            match self.current.take() {
                Some(mut block) if !block.is_drained() => {
                    let value = self.decode_from(&mut block)?;
                    self.current = Some(block);
                    return Ok(Some(value));
                }
                _ => match self.next_block()? {
                    Some(block) => self.current = Some(block),
                    None => return Ok(None),
                },
            }
        }
    }
}

impl<R: Read> Iterator for Reader<'_, R> {
    type Item = AvroResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        // the iterator fuses on the first error
        if self.errored {
            return None;
        };
        match self.read_one() {
            Ok(opt) => opt.map(Ok),
            Err(e) => {
                self.errored = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode a `Value` encoded in Avro format given its `Schema` and anything
/// implementing `io::Read` to read from.
///
/// In case a reader `Schema` is provided, schema resolution will also be
/// performed.
///
/// **NOTE** This function has a quite small niche of usage and does NOT take
/// care of reading the header and consecutive data blocks; use
/// [`Reader`](struct.Reader.html) if you don't know what you are doing,
/// instead.
pub fn from_avro_datum<R: Read>(
    writer_schema: &Schema,
    reader: &mut R,
    reader_schema: Option<&Schema>,
) -> AvroResult<Value> {
    from_avro_datum_with_options(writer_schema, reader, reader_schema, &Options::default())
}

/// Decode a `Value` from raw Avro data, honoring the given [`Options`].
///
/// When a reader `Schema` is provided, schema resolution will also be
/// performed.
pub fn from_avro_datum_with_options<R: Read>(
    writer_schema: &Schema,
    reader: &mut R,
    reader_schema: Option<&Schema>,
    options: &Options,
) -> AvroResult<Value> {
    let value = decode_with_options(writer_schema, options, reader)?;
    match reader_schema {
        Some(schema) => value.resolve(schema),
        None => Ok(value),
    }
}

/// Reads the marker bytes from Avro bytes generated earlier by a `Writer`.
pub fn read_marker(bytes: &[u8]) -> [u8; 16] {
    assert!(
        bytes.len() > 16,
        "The bytes are too short to read a marker from them"
    );
    let mut marker = [0_u8; 16];
    marker.clone_from_slice(&bytes[(bytes.len() - 16)..]);
    marker
}
