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

//! Block compression for the object container file.

use crate::{AvroResult, error::Details, types::Value};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// The compression codec applied to each data block.
///
/// `null` and `deflate` are always available; the remaining codecs sit
/// behind the feature of the same name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab_case")]
pub enum Codec {
    /// Blocks are stored as-is.
    Null,
    /// RFC 1951 deflate, without the zlib wrapper or checksum.
    Deflate,
    #[cfg(feature = "snappy")]
    /// Google Snappy; each block carries a trailing 4-byte big-endian CRC32
    /// of the uncompressed data.
    Snappy,
    #[cfg(feature = "zstandard")]
    /// Zstandard.
    Zstandard,
    #[cfg(feature = "bzip")]
    /// Bzip2.
    Bzip2,
    #[cfg(feature = "xz")]
    /// Xz / LZMA2.
    Xz,
}

impl From<Codec> for Value {
    fn from(value: Codec) -> Self {
        Self::Bytes(<&str>::from(value).as_bytes().to_vec())
    }
}

impl Codec {
    /// Compress a block in place.
    pub fn compress(self, block: &mut Vec<u8>) -> AvroResult<()> {
        *block = match self {
            Codec::Null => return Ok(()),
            Codec::Deflate => deflate_compress(block),
            #[cfg(feature = "snappy")]
            Codec::Snappy => snappy::compress(block)?,
            #[cfg(feature = "zstandard")]
            Codec::Zstandard => zstandard::compress(block)?,
            #[cfg(feature = "bzip")]
            Codec::Bzip2 => bzip::compress(block)?,
            #[cfg(feature = "xz")]
            Codec::Xz => xz::compress(block)?,
        };
        Ok(())
    }

    /// Decompress a block in place.
    pub fn decompress(self, block: &mut Vec<u8>) -> AvroResult<()> {
        *block = match self {
            Codec::Null => return Ok(()),
            Codec::Deflate => deflate_decompress(block)?,
            #[cfg(feature = "snappy")]
            Codec::Snappy => snappy::decompress(block)?,
            #[cfg(feature = "zstandard")]
            Codec::Zstandard => zstandard::decompress(block)?,
            #[cfg(feature = "bzip")]
            Codec::Bzip2 => bzip::decompress(block)?,
            #[cfg(feature = "xz")]
            Codec::Xz => xz::decompress(block)?,
        };
        Ok(())
    }
}

fn deflate_compress(block: &[u8]) -> Vec<u8> {
    let level = miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8;
    miniz_oxide::deflate::compress_to_vec(block, level)
}

fn deflate_decompress(block: &[u8]) -> AvroResult<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec(block).map_err(|e| {
        Details::Decompress {
            codec: "deflate",
            reason: format!("{:?}", e.status),
        }
        .into()
    })
}

#[cfg(feature = "snappy")]
mod snappy {
    use crate::{AvroResult, error::Details};

    pub(super) fn compress(block: &[u8]) -> AvroResult<Vec<u8>> {
        let mut out = vec![0; snap::raw::max_compress_len(block.len())];
        let compressed = snap::raw::Encoder::new()
            .compress(block, &mut out)
            .map_err(|e| Details::Compress {
                codec: "snappy",
                reason: e.to_string(),
            })?;
        out.truncate(compressed);
        out.extend_from_slice(&crc32fast::hash(block).to_be_bytes());
        Ok(out)
    }

    pub(super) fn decompress(block: &[u8]) -> AvroResult<Vec<u8>> {
        let failed = |reason: String| Details::Decompress {
            codec: "snappy",
            reason,
        };
        if block.len() < 4 {
            return Err(failed("block too short for a CRC trailer".to_string()).into());
        }
        let (payload, trailer) = block.split_at(block.len() - 4);

        let size = snap::raw::decompress_len(payload).map_err(|e| failed(e.to_string()))?;
        let mut out = vec![0; size];
        snap::raw::Decoder::new()
            .decompress(payload, &mut out)
            .map_err(|e| failed(e.to_string()))?;

        let expected = u32::from_be_bytes(trailer.try_into().unwrap());
        let actual = crc32fast::hash(&out);
        if expected != actual {
            return Err(Details::SnappyCrc32 { expected, actual }.into());
        }
        Ok(out)
    }
}

#[cfg(feature = "zstandard")]
mod zstandard {
    use crate::{AvroResult, error::Details};

    pub(super) fn compress(block: &[u8]) -> AvroResult<Vec<u8>> {
        zstd::bulk::compress(block, 0).map_err(|e| {
            Details::Compress {
                codec: "zstandard",
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub(super) fn decompress(block: &[u8]) -> AvroResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut decoder = zstd::Decoder::new(block).map_err(|e| Details::Decompress {
            codec: "zstandard",
            reason: e.to_string(),
        })?;
        std::io::copy(&mut decoder, &mut out).map_err(|e| Details::Decompress {
            codec: "zstandard",
            reason: e.to_string(),
        })?;
        Ok(out)
    }
}

#[cfg(feature = "bzip")]
mod bzip {
    use crate::{AvroResult, error::Details};
    use std::io::Read;

    pub(super) fn compress(block: &[u8]) -> AvroResult<Vec<u8>> {
        let mut out = Vec::new();
        bzip2::read::BzEncoder::new(block, bzip2::Compression::best())
            .read_to_end(&mut out)
            .map_err(|e| Details::Compress {
                codec: "bzip2",
                reason: e.to_string(),
            })?;
        Ok(out)
    }

    pub(super) fn decompress(block: &[u8]) -> AvroResult<Vec<u8>> {
        let mut out = Vec::new();
        bzip2::read::BzDecoder::new(block)
            .read_to_end(&mut out)
            .map_err(|e| Details::Decompress {
                codec: "bzip2",
                reason: e.to_string(),
            })?;
        Ok(out)
    }
}

#[cfg(feature = "xz")]
mod xz {
    use crate::{AvroResult, error::Details};
    use std::io::Read;

    pub(super) fn compress(block: &[u8]) -> AvroResult<Vec<u8>> {
        let mut out = Vec::new();
        liblzma::read::XzEncoder::new(block, 9)
            .read_to_end(&mut out)
            .map_err(|e| Details::Compress {
                codec: "xz",
                reason: e.to_string(),
            })?;
        Ok(out)
    }

    pub(super) fn decompress(block: &[u8]) -> AvroResult<Vec<u8>> {
        let mut out = Vec::new();
        liblzma::read::XzDecoder::new(block)
            .read_to_end(&mut out)
            .map_err(|e| Details::Decompress {
                codec: "xz",
                reason: e.to_string(),
            })?;
        Ok(out)
    }
}
