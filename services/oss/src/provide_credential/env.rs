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
use crate::{constants::*, Credential};
use alioss_core::{Context, ProvideCredential, Result};
use async_trait::async_trait;

/// EnvCredentialProvider loads credentials from environment variables.
///
/// The `OSS_*` set is checked first, then the `ALIBABA_CLOUD_*` set:
///
/// - `OSS_ACCESS_KEY_ID` / `ALIBABA_CLOUD_ACCESS_KEY_ID`
/// - `OSS_ACCESS_KEY_SECRET` / `ALIBABA_CLOUD_ACCESS_KEY_SECRET`
/// - `OSS_SESSION_TOKEN` / `ALIBABA_CLOUD_SECURITY_TOKEN` (optional)
///
/// A set is only used when both its key id and secret are present.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let sets = [
            (OSS_ACCESS_KEY_ID, OSS_ACCESS_KEY_SECRET, OSS_SESSION_TOKEN),
            (
                ALIBABA_CLOUD_ACCESS_KEY_ID,
                ALIBABA_CLOUD_ACCESS_KEY_SECRET,
                ALIBABA_CLOUD_SECURITY_TOKEN,
            ),
        ];

        for (ak, sk, token) in sets {
            if let (Some(ak), Some(sk)) = (envs.get(ak), envs.get(sk)) {
                return Ok(Some(Credential {
                    access_key_id: ak.clone(),
                    access_key_secret: sk.clone(),
                    security_token: envs.get(token).filter(|v| !v.is_empty()).cloned(),
                    expires_in: None,
                }));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alioss_core::StaticEnv;
    use std::collections::HashMap;

    fn ctx(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[tokio::test]
    async fn test_env_credential_provider() -> anyhow::Result<()> {
        let ctx = ctx(&[
            (ALIBABA_CLOUD_ACCESS_KEY_ID, "test_access_key"),
            (ALIBABA_CLOUD_ACCESS_KEY_SECRET, "test_secret_key"),
            (ALIBABA_CLOUD_SECURITY_TOKEN, "test_security_token"),
        ]);

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.access_key_id, "test_access_key");
        assert_eq!(cred.access_key_secret, "test_secret_key");
        assert_eq!(cred.security_token.as_deref(), Some("test_security_token"));

        Ok(())
    }

    #[tokio::test]
    async fn test_oss_prefix_wins() -> anyhow::Result<()> {
        let ctx = ctx(&[
            (OSS_ACCESS_KEY_ID, "oss_ak"),
            (OSS_ACCESS_KEY_SECRET, "oss_sk"),
            (ALIBABA_CLOUD_ACCESS_KEY_ID, "aliyun_ak"),
            (ALIBABA_CLOUD_ACCESS_KEY_SECRET, "aliyun_sk"),
        ]);

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.access_key_id, "oss_ak");
        assert!(cred.security_token.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_partial_credentials() -> anyhow::Result<()> {
        let ctx = ctx(&[
            (OSS_ACCESS_KEY_ID, "oss_ak"),
            (ALIBABA_CLOUD_ACCESS_KEY_SECRET, "aliyun_sk"),
        ]);

        let cred = EnvCredentialProvider::new().provide_credential(&ctx).await?;
        assert!(cred.is_none());

        Ok(())
    }
}
