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
use crate::{Config, Credential};
use alioss_core::{Context, ProvideCredential, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// ConfigCredentialProvider loads credential from the client config.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new `ConfigCredentialProvider` instance.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        let (Some(access_key_id), Some(access_key_secret)) =
            (&self.config.access_key_id, &self.config.access_key_secret)
        else {
            return Ok(None);
        };

        Ok(Some(Credential {
            access_key_id: access_key_id.clone(),
            access_key_secret: access_key_secret.clone(),
            security_token: self.config.security_token.clone(),
            expires_in: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_loader_with_credentials() {
        let config = Config {
            access_key_id: Some("test_access_key".to_string()),
            access_key_secret: Some("test_secret_key".to_string()),
            security_token: Some("test_token".to_string()),
            ..Default::default()
        };

        let loader = ConfigCredentialProvider::new(Arc::new(config));
        let credential = loader
            .provide_credential(&Context::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(credential.access_key_id, "test_access_key");
        assert_eq!(credential.access_key_secret, "test_secret_key");
        assert_eq!(credential.security_token.as_deref(), Some("test_token"));
    }

    #[tokio::test]
    async fn test_config_loader_without_credentials() {
        let loader = ConfigCredentialProvider::new(Arc::new(Config::default()));
        let credential = loader.provide_credential(&Context::new()).await.unwrap();

        assert!(credential.is_none());
    }
}
