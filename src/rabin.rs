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

//! Implementation of the Rabin fingerprint algorithm, the default 64-bit
//! schema fingerprint of the Avro specification (CRC-64-AVRO).

use digest::{
    FixedOutput, FixedOutputReset, HashMarker, Output, OutputSizeUser, Reset, Update, consts::U8,
};
use std::sync::OnceLock;

const EMPTY: i64 = -4513414715797952619;

fn fp_table() -> &'static [i64; 256] {
    static FPTABLE_ONCE: OnceLock<[i64; 256]> = OnceLock::new();
    FPTABLE_ONCE.get_or_init(|| {
        let mut fp_table: [i64; 256] = [0; 256];
        for i in 0..256 {
            let mut fp = i;
            for _ in 0..8 {
                fp = (fp as u64 >> 1) as i64 ^ (EMPTY & -(fp & 1));
            }
            fp_table[i as usize] = fp;
        }
        fp_table
    })
}

/// Implementation of the Rabin fingerprint algorithm using the Digest trait
/// as described in the
/// [Avro schema fingerprint documentation](https://avro.apache.org/docs/current/specification/#schema-fingerprints).
///
/// The digest is returned as the 8-byte little-endian encoding of the Rabin
/// hash, as described in the
/// [single object encoding specification](https://avro.apache.org/docs/current/specification/#single-object-encoding-specification).
///
/// ```rust
/// use dynavro::rabin::Rabin;
/// use digest::Digest;
///
/// let mut hasher = Rabin::new();
/// hasher.update(b"hello world");
/// let result = <[u8; 8]>::from(hasher.finalize());
/// assert_eq!(result, [0x17, 0x9b, 0x2b, 0x30, 0x1a, 0x2c, 0x80, 0x60]);
/// ```
#[derive(Clone)]
pub struct Rabin {
    result: i64,
}

impl Default for Rabin {
    fn default() -> Self {
        Rabin { result: EMPTY }
    }
}

impl Update for Rabin {
    fn update(&mut self, data: &[u8]) {
        let fp_table = fp_table();
        for b in data {
            self.result = (self.result as u64 >> 8) as i64
                ^ fp_table[((self.result ^ *b as i64) & 0xff) as usize];
        }
    }
}

impl FixedOutput for Rabin {
    fn finalize_into(self, out: &mut Output<Self>) {
        out.copy_from_slice(&self.result.to_le_bytes());
    }
}

impl OutputSizeUser for Rabin {
    // 8-byte little-endian form of the x64 hash
    type OutputSize = U8;
}

impl HashMarker for Rabin {}

impl Reset for Rabin {
    fn reset(&mut self) {
        self.result = EMPTY;
    }
}

impl FixedOutputReset for Rabin {
    fn finalize_into_reset(&mut self, out: &mut Output<Self>) {
        out.copy_from_slice(&self.result.to_le_bytes());
        self.result = EMPTY;
    }
}
