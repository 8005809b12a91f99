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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded lazily and cached until it is no longer valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Load a credential, reusing the cached one while it stays valid.
    pub async fn credential(&self) -> Result<Option<K>> {
        let cached = self
            .credential
            .lock()
            .map_err(|_| Error::unexpected("credential cache lock poisoned"))?
            .clone();
        if cached.is_valid() {
            return Ok(cached);
        }

        let loaded = self.loader.provide_credential(&self.ctx).await?;
        *self
            .credential
            .lock()
            .map_err(|_| Error::unexpected("credential cache lock poisoned"))? = loaded.clone();
        Ok(loaded)
    }

    /// Signing request.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let credential = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, credential.as_ref(), expires_in)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct Token(bool);

    impl SigningCredential for Token {
        fn is_valid(&self) -> bool {
            self.0
        }
    }

    #[derive(Debug)]
    struct Counting {
        calls: Arc<AtomicUsize>,
        valid: bool,
    }

    #[async_trait]
    impl ProvideCredential for Counting {
        type Credential = Token;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Token(self.valid)))
        }
    }

    #[derive(Debug)]
    struct MarkSigned;

    #[async_trait]
    impl SignRequest for MarkSigned {
        type Credential = Token;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            credential: Option<&Token>,
            _: Option<Duration>,
        ) -> Result<()> {
            if credential.is_some() {
                req.headers
                    .insert("x-signed", http::HeaderValue::from_static("yes"));
            }
            Ok(())
        }
    }

    fn parts() -> http::request::Parts {
        http::Request::get("https://oss-cn-hangzhou.aliyuncs.com/")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_valid_credential_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            Counting {
                calls: calls.clone(),
                valid: true,
            },
            MarkSigned,
        );

        let mut req = parts();
        signer.sign(&mut req, None).await.unwrap();
        signer.sign(&mut parts(), None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(req.headers["x-signed"], "yes");
    }

    #[tokio::test]
    async fn test_invalid_credential_is_reloaded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            Counting {
                calls: calls.clone(),
                valid: false,
            },
            MarkSigned,
        );

        signer.sign(&mut parts(), None).await.unwrap();
        signer.sign(&mut parts(), None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
