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

//! Tokio-based file reading for alioss.
//!
//! `TokioFileRead` lets credential providers read the OIDC token file and
//! the shared credentials file without blocking the runtime.
//!
//! ## Example
//!
//! ```no_run
//! use alioss_core::{Context, OsEnv};
//! use alioss_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read_as_string("/var/run/secrets/tokens/oidc-token").await {
//!         Ok(content) => println!("read {} bytes", content.len()),
//!         Err(e) => eprintln!("failed to read credentials: {e}"),
//!     }
//! }
//! ```

use alioss_core::{Error, FileRead, Result};
use async_trait::async_trait;

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            let err = if e.kind() == std::io::ErrorKind::PermissionDenied {
                Error::credential_denied(format!("permission denied reading {path}"))
            } else {
                Error::unexpected(format!("failed to read file {path}"))
            };
            err.with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_read() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"oidc-token").unwrap();

        let content = TokioFileRead
            .file_read(f.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(content, b"oidc-token");
    }

    #[tokio::test]
    async fn test_file_read_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");

        let err = TokioFileRead
            .file_read(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), alioss_core::ErrorKind::Unexpected);
    }
}
