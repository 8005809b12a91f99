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
//! Transfer managers for large objects.
//!
//! [`Uploader`] splits an object into parts uploaded concurrently with
//! multipart upload, [`Downloader`] fetches ranges concurrently into a file.
//! Both verify the CRC64 of the whole object by combining the checksums of
//! its parts in order.

mod downloader;
mod uploader;

pub use downloader::{DownloadRequest, DownloadResult, Downloader};
pub use uploader::{UploadRequest, UploadResult, Uploader};

use alioss_core::crc64::crc64_combine;

/// Default part size, 6 MiB.
pub const DEFAULT_PART_SIZE: u64 = 6 * 1024 * 1024;
/// Smallest part size accepted by multipart upload, 100 KiB.
pub const MIN_PART_SIZE: u64 = 100 * 1024;
/// Most parts a multipart upload can hold.
pub const MAX_PARTS: u64 = 10_000;
/// Default number of parts in flight.
pub const DEFAULT_PARALLEL: usize = 3;

/// A byte range of an object transferred as one part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Part {
    /// Starts at 1.
    pub number: u32,
    pub offset: u64,
    pub len: u64,
}

/// Split `size` bytes into parts of `part_size`, the last one may be shorter.
pub(crate) fn plan_parts(size: u64, part_size: u64) -> Vec<Part> {
    let part_size = part_size.max(1);
    let mut parts = Vec::with_capacity(size.div_ceil(part_size) as usize);
    let mut offset = 0;
    while offset < size {
        let len = part_size.min(size - offset);
        parts.push(Part {
            number: parts.len() as u32 + 1,
            offset,
            len,
        });
        offset += len;
    }
    parts
}

/// Checksum of the concatenation of parts given as `(crc, len)` in order.
pub(crate) fn combine_crc(parts: impl IntoIterator<Item = (u64, u64)>) -> u64 {
    parts
        .into_iter()
        .fold(0, |acc, (crc, len)| crc64_combine(acc, crc, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alioss_core::crc64::crc64;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plan_parts() {
        assert!(plan_parts(0, 5).is_empty());
        assert_eq!(
            plan_parts(12, 5),
            vec![
                Part {
                    number: 1,
                    offset: 0,
                    len: 5
                },
                Part {
                    number: 2,
                    offset: 5,
                    len: 5
                },
                Part {
                    number: 3,
                    offset: 10,
                    len: 2
                },
            ]
        );
        assert_eq!(plan_parts(10, 5).len(), 2);
    }

    #[test]
    fn test_combine_crc() {
        let data = b"hello world, hello crc";
        let parts = plan_parts(data.len() as u64, 4)
            .into_iter()
            .map(|p| {
                let chunk = &data[p.offset as usize..(p.offset + p.len) as usize];
                (crc64(chunk), p.len)
            });
        assert_eq!(combine_crc(parts), crc64(data));
        assert_eq!(combine_crc([]), 0);
    }
}
