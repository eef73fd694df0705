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

//! Logic handling writing in Avro format at user level.

use crate::{
    AvroResult, Codec, Error,
    encode::encode_internal,
    error::Details,
    options::Options,
    schema::{ResolvedSchema, Schema},
    types::Value,
    util::write_long,
};
use std::{collections::HashMap, io::Write, mem::ManuallyDrop};

const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;
const AVRO_OBJECT_HEADER: &[u8] = b"Obj\x01";

/// Main interface for writing Avro formatted values.
///
/// It is critical to call flush before `Writer<W>` is dropped. Though dropping
/// will attempt to flush the contents of the buffer, any errors that happen in
/// the process of dropping will be ignored. Calling flush ensures that the
/// buffer is empty and thus dropping will not even attempt file operations.
pub struct Writer<'a, W: Write> {
    schema: &'a Schema,
    writer: W,
    resolved_schema: ResolvedSchema<'a>,
    codec: Codec,
    options: Options,
    block_size: usize,
    buffer: Vec<u8>,
    num_values: usize,
    marker: [u8; 16],
    has_header: bool,
    user_metadata: HashMap<String, Value>,
}

/// Configures and builds a [`Writer`].
pub struct WriterBuilder<'a, W: Write> {
    schema: &'a Schema,
    writer: W,
    codec: Codec,
    options: Options,
    block_size: usize,
    marker: Option<[u8; 16]>,
    has_header: bool,
    user_metadata: HashMap<String, Value>,
}

impl<'a, W: Write> WriterBuilder<'a, W> {
    /// Create a builder for a `Writer` that writes to `writer` using `schema`.
    pub fn new(schema: &'a Schema, writer: W) -> Self {
        Self {
            schema,
            writer,
            codec: Codec::Null,
            options: Options::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            marker: None,
            has_header: false,
            user_metadata: HashMap::new(),
        }
    }

    /// The compression codec for data blocks. Defaults to `Codec::Null`.
    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// The [`Options`] used when encoding values.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Flush a block once its uncompressed size exceeds this many bytes.
    /// Defaults to 64 KiB.
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Use the given 16-byte sync marker instead of a random one.
    pub fn marker(mut self, marker: [u8; 16]) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Mark the header as already written. Used when appending to an
    /// existing container stream.
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Initial custom metadata entries for the file header.
    pub fn user_metadata(mut self, user_metadata: HashMap<String, Value>) -> Self {
        self.user_metadata = user_metadata;
        self
    }

    pub fn build(self) -> AvroResult<Writer<'a, W>> {
        let resolved_schema = ResolvedSchema::try_from(self.schema)?;
        Ok(Writer {
            schema: self.schema,
            writer: self.writer,
            resolved_schema,
            codec: self.codec,
            options: self.options,
            block_size: self.block_size,
            buffer: Vec::with_capacity(self.block_size),
            num_values: 0,
            marker: self.marker.unwrap_or_else(generate_sync_marker),
            has_header: self.has_header,
            user_metadata: self.user_metadata,
        })
    }
}

impl<'a, W: Write> Writer<'a, W> {
    /// Creates a `Writer` given a `Schema` and something implementing the
    /// `io::Write` trait to write to.
    /// No compression `Codec` will be used.
    pub fn new(schema: &'a Schema, writer: W) -> AvroResult<Self> {
        Writer::with_codec(schema, writer, Codec::Null)
    }

    /// Creates a `Writer` with a specific `Codec` given a `Schema` and
    /// something implementing the `io::Write` trait to write to.
    pub fn with_codec(schema: &'a Schema, writer: W, codec: Codec) -> AvroResult<Self> {
        Self::builder(schema, writer).codec(codec).build()
    }

    /// Creates a `Writer` that will append values to already populated
    /// `std::io::Write` using the provided `marker`.
    pub fn append_to(schema: &'a Schema, writer: W, marker: [u8; 16]) -> AvroResult<Self> {
        Self::builder(schema, writer)
            .marker(marker)
            .has_header(true)
            .build()
    }

    /// Returns a [`WriterBuilder`] for fine-grained construction.
    pub fn builder(schema: &'a Schema, writer: W) -> WriterBuilder<'a, W> {
        WriterBuilder::new(schema, writer)
    }

    /// Get a reference to the `Schema` associated to a `Writer`.
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Append a value to the `Writer`, also performing schema validation.
    ///
    /// Returns the number of bytes written (it might be 0, see below).
    ///
    /// **NOTE**: This function is not guaranteed to perform any actual write,
    /// since it relies on internal buffering for performance reasons. If you
    /// want to be sure the value has been written, then call
    /// [`flush`](Writer::flush).
    pub fn append_value<T: Into<Value>>(&mut self, value: T) -> AvroResult<usize> {
        let avro = value.into();
        self.append_value_ref(&avro)
    }

    /// Append a compatible value to a `Writer`, also performing schema
    /// validation.
    ///
    /// Returns the number of bytes written (it might be 0, see below).
    ///
    /// **NOTE**: This function is not guaranteed to perform any actual write,
    /// since it relies on internal buffering for performance reasons. If you
    /// want to be sure the value has been written, then call
    /// [`flush`](Writer::flush).
    pub fn append_value_ref(&mut self, value: &Value) -> AvroResult<usize> {
        let n = self.maybe_write_header()?;

        // Appends are transactional at value granularity: a failed encode
        // rolls the block buffer back to its pre-call length.
        let pos = self.buffer.len();
        match encode_internal(
            value,
            self.schema,
            self.resolved_schema.get_names(),
            &self.schema.namespace(),
            &self.options,
            &mut self.buffer,
        ) {
            Ok(_) => {
                self.num_values += 1;
                if self.buffer.len() >= self.block_size {
                    return self.flush().map(|b| b + n);
                }
                Ok(n)
            }
            Err(e) => {
                self.buffer.truncate(pos);
                Err(e)
            }
        }
    }

    /// Extend a `Writer` with an `Iterator` of values, also performing schema
    /// validation.
    ///
    /// Returns the number of bytes written.
    ///
    /// **NOTE**: This function forces the written data to be flushed (an
    /// implicit call to [`flush`](Writer::flush) is performed).
    pub fn extend<I, T: Into<Value>>(&mut self, values: I) -> AvroResult<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let mut num_bytes = 0;
        for value in values {
            num_bytes += self.append_value(value)?;
        }
        num_bytes += self.flush()?;

        Ok(num_bytes)
    }

    /// Extend a `Writer` by appending each `Value` from a slice, while also
    /// performing schema validation on each value appended.
    ///
    /// Returns the number of bytes written.
    ///
    /// **NOTE**: This function forces the written data to be flushed (an
    /// implicit call to [`flush`](Writer::flush) is performed).
    pub fn extend_from_slice(&mut self, values: &[Value]) -> AvroResult<usize> {
        let mut num_bytes = 0;
        for value in values {
            num_bytes += self.append_value_ref(value)?;
        }
        num_bytes += self.flush()?;

        Ok(num_bytes)
    }

    /// Flush the content to the inner `Writer`.
    ///
    /// Call this function to make sure all the content has been written before
    /// releasing the `Writer`. This will also write the header if it wasn't
    /// written yet.
    ///
    /// Returns the number of bytes written.
    pub fn flush(&mut self) -> AvroResult<usize> {
        let mut num_bytes = self.maybe_write_header()?;
        if self.num_values == 0 {
            return Ok(num_bytes);
        }

        self.codec.compress(&mut self.buffer)?;

        let num_values = self.num_values;
        let stream_len = self.buffer.len();

        num_bytes += self.append_long(num_values as i64)?
            + self.append_long(
                i64::try_from(stream_len).map_err(|_| Details::OversizedBlock(stream_len))?,
            )?
            + self
                .writer
                .write(self.buffer.as_ref())
                .map_err(Details::IoWrite)?
            + self.append_marker()?;

        self.buffer.clear();
        self.num_values = 0;

        self.writer.flush().map_err(Details::IoFlush)?;

        Ok(num_bytes)
    }

    /// Return what the `Writer` is writing to, consuming the `Writer` itself.
    ///
    /// **NOTE**: This function forces the written data to be flushed (an
    /// implicit call to [`flush`](Writer::flush) is performed).
    pub fn into_inner(mut self) -> AvroResult<W> {
        self.maybe_write_header()?;
        self.flush()?;

        let mut this = ManuallyDrop::new(self);

        // Extract every member that is not Copy and therefore should be dropped
        let _buffer = std::mem::take(&mut this.buffer);
        let _user_metadata = std::mem::take(&mut this.user_metadata);
        let _options = std::mem::take(&mut this.options);
        // SAFETY: resolved schema is not accessed after this and won't be dropped because of ManuallyDrop
        unsafe { std::ptr::drop_in_place(&mut this.resolved_schema) };

        // SAFETY: double-drops are prevented by putting `this` in a ManuallyDrop that is never dropped
        let writer = unsafe { std::ptr::read(&this.writer) };

        Ok(writer)
    }

    /// Gets a reference to the underlying writer.
    ///
    /// **NOTE**: There is likely data still in the buffer. To have all the
    /// data in the writer call [`flush`](Writer::flush) first.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// The sync marker separating data blocks in the output.
    pub fn marker(&self) -> &[u8; 16] {
        &self.marker
    }

    /// Generate and append synchronization marker to the payload.
    fn append_marker(&mut self) -> AvroResult<usize> {
        // using .writer.write directly to avoid mutable borrow of self
        // with ref borrowing of self.marker
        self.writer
            .write(&self.marker)
            .map_err(|e| Details::IoWrite(e).into())
    }

    /// Append a long to the payload.
    fn append_long(&mut self, value: i64) -> AvroResult<usize> {
        write_long(value, &mut self.writer)
    }

    /// Append pure bytes to the payload.
    fn append_bytes(&mut self, bytes: &[u8]) -> AvroResult<usize> {
        self.writer
            .write(bytes)
            .map_err(|e| Details::IoWrite(e).into())
    }

    /// Adds custom metadata to the file.
    /// This method could be used only before adding the first record to the
    /// writer.
    pub fn add_user_metadata<T: AsRef<[u8]>>(&mut self, key: String, value: T) -> AvroResult<()> {
        if !self.has_header {
            if key.starts_with("avro.") {
                return Err(Details::ReservedMetadataKey(key).into());
            }
            self.user_metadata
                .insert(key, Value::Bytes(value.as_ref().to_vec()));
            Ok(())
        } else {
            Err(Details::HeaderAlreadyWritten.into())
        }
    }

    /// Create an Avro header based on schema, codec and sync marker.
    fn header(&self) -> Result<Vec<u8>, Error> {
        let schema_bytes = serde_json::to_string(self.schema)
            .map_err(Details::JsonToString)?
            .into_bytes();

        let mut metadata = HashMap::with_capacity(2);
        metadata.insert("avro.schema".to_string(), Value::Bytes(schema_bytes));
        metadata.insert("avro.codec".to_string(), self.codec.into());

        for (k, v) in &self.user_metadata {
            metadata.insert(k.clone(), v.clone());
        }

        let mut header = Vec::new();
        header.extend_from_slice(AVRO_OBJECT_HEADER);
        encode_internal(
            &Value::Map(metadata),
            &Schema::map(Schema::Bytes),
            self.resolved_schema.get_names(),
            &None,
            &self.options,
            &mut header,
        )?;
        header.extend_from_slice(&self.marker);

        Ok(header)
    }

    fn maybe_write_header(&mut self) -> AvroResult<usize> {
        if !self.has_header {
            let header = self.header()?;
            let n = self.append_bytes(header.as_ref())?;
            self.has_header = true;
            Ok(n)
        } else {
            Ok(0)
        }
    }
}

impl<W: Write> Drop for Writer<'_, W> {
    /// Drop the writer, will try to flush ignoring any errors.
    fn drop(&mut self) {
        let _ = self.maybe_write_header();
        let _ = self.flush();
    }
}

/// Encode a `Value` of a given `Schema` into raw Avro data (no container
/// framing), performing schema validation.
pub fn to_avro_datum<T: Into<Value>>(schema: &Schema, value: T) -> AvroResult<Vec<u8>> {
    to_avro_datum_with_options(schema, value, &Options::default())
}

/// Encode a `Value` of a given `Schema` into raw Avro data (no container
/// framing), honoring the given [`Options`].
pub fn to_avro_datum_with_options<T: Into<Value>>(
    schema: &Schema,
    value: T,
    options: &Options,
) -> AvroResult<Vec<u8>> {
    let avro = value.into();
    let rs = ResolvedSchema::try_from(schema)?;
    if let Some(reason) =
        avro.validate_internal(schema, rs.get_names(), &schema.namespace())
    {
        return Err(Details::InvalidValue {
            value: avro,
            schema: schema.clone(),
            reason,
        }
        .into());
    }
    let mut buffer = Vec::new();
    encode_internal(
        &avro,
        schema,
        rs.get_names(),
        &schema.namespace(),
        options,
        &mut buffer,
    )?;
    Ok(buffer)
}

/// Generate a 16 byte random sync marker.
fn generate_sync_marker() -> [u8; 16] {
    rand::random()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use crate::types::Record;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = r#"
    {
      "type": "record",
      "name": "test",
      "fields": [
        {"name": "a", "type": "long", "default": 42},
        {"name": "b", "type": "string"}
      ]
    }
    "#;

    #[test]
    fn test_to_avro_datum() -> TestResult {
        let schema = Schema::parse_str(SCHEMA)?;
        let mut record = Record::new(&schema).unwrap();
        record.put("a", 27i64);
        record.put("b", "foo");

        let expected: Vec<u8> = vec![54, 6, 102, 111, 111];
        assert_eq!(to_avro_datum(&schema, record)?, expected);
        Ok(())
    }

    #[test]
    fn test_to_avro_datum_validation_fails() -> TestResult {
        let schema = Schema::parse_str(SCHEMA)?;
        let value = Value::record(vec![
            ("a".into(), Value::Long(27)),
            ("b".into(), Value::Boolean(true)),
        ]);
        assert!(to_avro_datum(&schema, value).is_err());
        Ok(())
    }

    #[test]
    fn test_writer_writes_header_and_block() -> TestResult {
        let schema = Schema::parse_str(SCHEMA)?;
        let mut writer = Writer::new(&schema, Vec::new())?;

        let mut record = Record::new(&schema).unwrap();
        record.put("a", 27i64);
        record.put("b", "foo");
        writer.append_value(record)?;
        let output = writer.into_inner()?;

        assert_eq!(&output[..4], b"Obj\x01");
        let data = vec![54u8, 6u8, 102u8, 111u8, 111u8];
        // block layout: count=1, byte length=5, payload, marker
        let block_start = output.len() - 16 - data.len() - 2;
        assert_eq!(&output[block_start..block_start + 2], &[2u8, 10u8]);
        assert_eq!(
            &output[block_start + 2..block_start + 2 + data.len()],
            &data[..]
        );
        // the block marker repeats the header marker
        assert_eq!(
            &output[block_start - 16..block_start],
            &output[output.len() - 16..]
        );
        Ok(())
    }

    #[test]
    fn test_writer_rolls_back_failed_append() -> TestResult {
        let schema = Schema::parse_str(SCHEMA)?;
        let mut writer = Writer::new(&schema, Vec::new())?;

        let mut record = Record::new(&schema).unwrap();
        record.put("a", 27i64);
        record.put("b", "foo");
        writer.append_value(record.clone())?;

        let bad = Value::record(vec![
            ("a".into(), Value::Long(3)),
            ("b".into(), Value::Boolean(true)),
        ]);
        assert!(writer.append_value_ref(&bad).is_err());

        writer.append_value(record)?;
        let output = writer.into_inner()?;

        // exactly two values survived
        let mut reader = crate::reader::Reader::new(&output[..])?;
        assert!(reader.next().is_some());
        assert!(reader.next().is_some());
        assert!(reader.next().is_none());
        Ok(())
    }

    #[test]
    fn test_user_metadata_reserved_prefix() -> TestResult {
        let schema = Schema::parse_str(SCHEMA)?;
        let mut writer = Writer::new(&schema, Vec::new())?;
        match writer
            .add_user_metadata("avro.mine".to_string(), b"x")
            .map_err(Error::into_details)
        {
            Err(Details::ReservedMetadataKey(key)) => assert_eq!(key, "avro.mine"),
            other => panic!("Expected Details::ReservedMetadataKey, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_writer_with_custom_marker_appends() -> TestResult {
        let schema = Schema::parse_str(SCHEMA)?;
        let marker = [7u8; 16];
        let mut writer = Writer::builder(&schema, Vec::new()).marker(marker).build()?;
        let mut record = Record::new(&schema).unwrap();
        record.put("a", 1i64);
        record.put("b", "x");
        writer.append_value(record)?;
        let first = writer.into_inner()?;

        // append a second block without a header
        let mut writer = Writer::append_to(&schema, first, marker)?;
        let mut record = Record::new(&schema).unwrap();
        record.put("a", 2i64);
        record.put("b", "y");
        writer.append_value(record)?;
        let output = writer.into_inner()?;

        let mut reader = crate::reader::Reader::new(&output[..])?;
        assert_eq!(reader.by_ref().count(), 2);
        Ok(())
    }
}
