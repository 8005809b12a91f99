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

//! CRC-64/ECMA-182 checksum as used by OSS in `x-oss-hash-crc64ecma`.
//!
//! The checksum uses the reflected ECMA-182 polynomial with an all ones
//! initial value and final xor. Checksums of adjacent byte ranges can be
//! merged with [`crc64_combine`], which lets parallel uploads and downloads
//! verify the whole object without rereading it.

const POLY: u64 = 0xC96C_5795_D787_0F42;

const TABLE: [u64; 256] = build_table();

const fn build_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u64;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ POLY
            } else {
                crc >> 1
            };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Streaming CRC-64 digest.
///
/// ```
/// use alioss_core::crc64::Crc64;
///
/// let mut digest = Crc64::new();
/// digest.update(b"hello ");
/// digest.update(b"world");
/// assert_eq!(digest.sum64(), 0x5303_7ecd_ef23_52da);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc64 {
    crc: u64,
}

impl Crc64 {
    /// Create a digest of the empty input.
    pub fn new() -> Self {
        Self { crc: 0 }
    }

    /// Create a digest that continues from a previously computed checksum.
    pub fn with_initial(crc: u64) -> Self {
        Self { crc }
    }

    /// Feed more bytes into the digest.
    pub fn update(&mut self, data: &[u8]) {
        self.crc = update(self.crc, data);
    }

    /// Get the checksum of all bytes fed so far.
    pub fn sum64(&self) -> u64 {
        self.crc
    }
}

/// Continue a checksum over more bytes.
pub fn update(crc: u64, data: &[u8]) -> u64 {
    let mut crc = !crc;
    for b in data {
        crc = TABLE[((crc ^ *b as u64) & 0xff) as usize] ^ (crc >> 8);
    }
    !crc
}

/// Checksum of a whole buffer.
pub fn crc64(data: &[u8]) -> u64 {
    update(0, data)
}

fn gf2_matrix_times(mat: &[u64; 64], mut vec: u64) -> u64 {
    let mut sum = 0;
    let mut i = 0;
    while vec != 0 {
        if vec & 1 == 1 {
            sum ^= mat[i];
        }
        vec >>= 1;
        i += 1;
    }
    sum
}

fn gf2_matrix_square(square: &mut [u64; 64], mat: &[u64; 64]) {
    for (s, m) in square.iter_mut().zip(mat.iter()) {
        *s = gf2_matrix_times(mat, *m);
    }
}

/// Merge the checksums of two adjacent ranges.
///
/// `crc1` covers the first range, `crc2` covers the following `len2` bytes.
/// The result equals the checksum of both ranges concatenated.
pub fn crc64_combine(mut crc1: u64, crc2: u64, mut len2: u64) -> u64 {
    if len2 == 0 {
        return crc1;
    }

    let mut even = [0u64; 64];
    let mut odd = [0u64; 64];

    // Operator for one zero bit.
    odd[0] = POLY;
    let mut row = 1u64;
    for v in odd.iter_mut().skip(1) {
        *v = row;
        row <<= 1;
    }

    // Two zero bits, then four.
    gf2_matrix_square(&mut even, &odd);
    gf2_matrix_square(&mut odd, &even);

    // Apply len2 zero bytes to crc1, one bit of len2 per round.
    loop {
        gf2_matrix_square(&mut even, &odd);
        if len2 & 1 == 1 {
            crc1 = gf2_matrix_times(&even, crc1);
        }
        len2 >>= 1;
        if len2 == 0 {
            break;
        }

        gf2_matrix_square(&mut odd, &even);
        if len2 & 1 == 1 {
            crc1 = gf2_matrix_times(&odd, crc1);
        }
        len2 >>= 1;
        if len2 == 0 {
            break;
        }
    }

    crc1 ^ crc2
}
