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

//! The variable-length integer codec and the decoder allocation guard.
//!
//! Avro writes every `int` and `long` ZigZag-mapped and then split into
//! little-endian groups of seven bits, the high bit of each byte flagging a
//! continuation.

use crate::{AvroResult, error::Details};
use std::{
    io::{Read, Write},
    sync::OnceLock,
};

/// A ZigZag-coded long never needs more than ten groups.
const MAX_GROUPS: usize = 10;

/// Default ceiling for a single decoder allocation.
///
/// Ill-formed input can carry absurd length prefixes; no bytes/string/block
/// buffer may exceed this unless the limit is raised via
/// [`max_allocation_bytes`].
pub const DEFAULT_MAX_ALLOCATION_BYTES: usize = 512 * 1024 * 1024;

static MAX_ALLOCATION: OnceLock<usize> = OnceLock::new();

/// Set the ceiling for a single decoder allocation.
///
/// The limit can be set once per process, before any data is decoded; later
/// calls (and the first decode, which installs the default) freeze it.
/// Returns the limit actually in effect.
pub fn max_allocation_bytes(limit: usize) -> usize {
    *MAX_ALLOCATION.get_or_init(|| limit)
}

/// Check a decoded length prefix against the allocation ceiling.
pub fn safe_len(len: usize) -> AvroResult<usize> {
    let ceiling = *MAX_ALLOCATION.get_or_init(|| DEFAULT_MAX_ALLOCATION_BYTES);
    if len > ceiling {
        return Err(Details::OversizedAllocation {
            desired: len,
            maximum: ceiling,
        }
        .into());
    }
    Ok(len)
}

/// Write a ZigZag-coded long.
pub fn write_long<W: Write>(n: i64, writer: &mut W) -> AvroResult<usize> {
    let mut rest = ((n << 1) ^ (n >> 63)) as u64;
    let mut groups = [0u8; MAX_GROUPS];
    let mut used = 0;
    while rest >= 0x80 {
        groups[used] = rest as u8 | 0x80;
        rest >>= 7;
        used += 1;
    }
    groups[used] = rest as u8;
    used += 1;
    writer
        .write_all(&groups[..used])
        .map_err(Details::IoWrite)?;
    Ok(used)
}

/// Write a ZigZag-coded int. Shares the long wire format.
pub fn write_int<W: Write>(n: i32, writer: &mut W) -> AvroResult<usize> {
    write_long(i64::from(n), writer)
}

/// Read a ZigZag-coded long.
pub fn read_long<R: Read>(reader: &mut R) -> AvroResult<i64> {
    let mut accumulator = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = next_byte(reader)?;
        accumulator |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift as usize >= MAX_GROUPS * 7 {
            return Err(Details::IntegerOverflow.into());
        }
    }
    // undo the ZigZag mapping
    Ok(((accumulator >> 1) as i64) ^ -((accumulator & 1) as i64))
}

/// Read a ZigZag-coded int, rejecting values outside the 32-bit range.
pub fn read_int<R: Read>(reader: &mut R) -> AvroResult<i32> {
    let n = read_long(reader)?;
    i32::try_from(n).map_err(|e| Details::IntOutOfRange(e, n).into())
}

fn next_byte<R: Read>(reader: &mut R) -> AvroResult<u8> {
    let mut byte = [0u8];
    reader
        .read_exact(&mut byte)
        .map_err(Details::TruncatedInput)?;
    Ok(byte[0])
}
