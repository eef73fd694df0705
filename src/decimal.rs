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

use crate::{AvroResult, Error, error::Details};
use num_bigint::{BigInt, Sign};

/// The payload of the `decimal` logical type: an unscaled integer, stored as
/// two's-complement big-endian bytes on the wire.
///
/// `precision` and `scale` are schema metadata and never live here. The byte
/// width the value was read with is remembered so that re-encoding reproduces
/// the original bytes, padding included.
#[derive(Debug, Clone, Eq)]
pub struct Decimal {
    unscaled: BigInt,
    width: usize,
}

impl Decimal {
    /// Count of significant decimal digits of the unscaled value, sign
    /// excluded. Zero counts as one digit.
    pub(crate) fn digit_count(&self) -> u64 {
        self.unscaled.magnitude().to_str_radix(10).len() as u64
    }

    /// The two's-complement bytes at the width this decimal was built with.
    pub(crate) fn to_bytes(&self) -> AvroResult<Vec<u8>> {
        self.sign_extended(self.width)
    }

    /// The two's-complement bytes, sign-extended to exactly `width` bytes.
    ///
    /// Fails when the value genuinely needs more bytes than requested.
    pub(crate) fn sign_extended(&self, width: usize) -> AvroResult<Vec<u8>> {
        let significant = self.unscaled.to_signed_bytes_be();
        if significant.len() > width {
            return Err(Details::DecimalSignExtension {
                requested: width,
                needed: significant.len(),
            }
            .into());
        }
        let fill = match self.unscaled.sign() {
            Sign::Minus => 0xFF,
            _ => 0x00,
        };
        let mut out = vec![fill; width - significant.len()];
        out.extend_from_slice(&significant);
        Ok(out)
    }
}

// Two decimals are the same number regardless of how many padding bytes each
// was read with.
impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.unscaled == other.unscaled
    }
}

impl<T: AsRef<[u8]>> From<T> for Decimal {
    fn from(bytes: T) -> Self {
        let bytes = bytes.as_ref();
        Self {
            unscaled: BigInt::from_signed_bytes_be(bytes),
            width: bytes.len(),
        }
    }
}

impl From<Decimal> for BigInt {
    fn from(decimal: Decimal) -> Self {
        decimal.unscaled
    }
}

/// The wire bytes of a decimal.
///
/// ```
/// use dynavro::Decimal;
///
/// let decimal = Decimal::from([0x01, 0x18]);
/// assert_eq!(<Vec<u8>>::try_from(&decimal).unwrap(), vec![0x01, 0x18]);
/// ```
impl TryFrom<&Decimal> for Vec<u8> {
    type Error = Error;

    fn try_from(decimal: &Decimal) -> Result<Self, Self::Error> {
        decimal.to_bytes()
    }
}

impl TryFrom<Decimal> for Vec<u8> {
    type Error = Error;

    fn try_from(decimal: Decimal) -> Result<Self, Self::Error> {
        decimal.to_bytes()
    }
}
