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
//! Paginators for listing operations.

use crate::operation::Operation;
use crate::Client;
use alioss_core::Result;
use futures::Stream;

/// A listing request that can continue from a previous page.
pub trait PaginatedRequest: Operation + Clone {
    /// Move the request to the page after `page`.
    ///
    /// Returns false when `page` is the last one.
    fn advance(&mut self, page: &Self::Output) -> bool;
}

/// Paginator walks a listing operation page by page.
///
/// ```no_run
/// use alioss::{Client, ListObjectsV2Request};
///
/// # async fn example(client: Client) -> alioss_core::Result<()> {
/// let mut pages = client.paginate(ListObjectsV2Request::new("examplebucket").with_prefix("logs/"));
/// while let Some(page) = pages.next_page().await? {
///     for object in page.contents {
///         println!("{}", object.key);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Paginator<'a, R> {
    client: &'a Client,
    request: R,
    done: bool,
}

impl<'a, R: PaginatedRequest> Paginator<'a, R> {
    /// Create a paginator starting at the given request.
    pub fn new(client: &'a Client, request: R) -> Self {
        Self {
            client,
            request,
            done: false,
        }
    }

    /// Check if there may be more pages.
    pub fn has_next(&self) -> bool {
        !self.done
    }

    /// Fetch the next page, `None` after the last one.
    pub async fn next_page(&mut self) -> Result<Option<R::Output>> {
        if self.done {
            return Ok(None);
        }

        let page = self.client.execute(self.request.clone()).await?;
        self.done = !self.request.advance(&page);
        Ok(Some(page))
    }

    /// Turn the paginator into a stream of pages.
    pub fn into_stream(self) -> impl Stream<Item = Result<R::Output>> + 'a
    where
        R: 'a,
    {
        futures::stream::try_unfold(self, |mut paginator| async move {
            let page = paginator.next_page().await?;
            Ok::<_, alioss_core::Error>(page.map(|page| (page, paginator)))
        })
    }
}

impl Client {
    /// Create a paginator for a listing request.
    pub fn paginate<R: PaginatedRequest>(&self, request: R) -> Paginator<'_, R> {
        Paginator::new(self, request)
    }
}

/// Keep paging only when the service reports more results and hands out a
/// token that differs from the current one.
pub(crate) fn next_token(
    truncated: bool,
    current: &Option<String>,
    next: &Option<String>,
) -> Option<String> {
    match next {
        Some(next) if truncated && !next.is_empty() && current.as_ref() != Some(next) => {
            Some(next.clone())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provide_credential::StaticCredentialProvider;
    use crate::testing::MockHttpSend;
    use crate::{Config, ListObjectsV2Request};
    use alioss_core::Context;
    use futures::TryStreamExt;

    const PAGE_1: &str = r#"<ListBucketResult>
  <Name>bucket</Name>
  <Prefix></Prefix>
  <MaxKeys>1</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>token-2</NextContinuationToken>
  <KeyCount>1</KeyCount>
  <Contents><Key>a.txt</Key><Size>1</Size></Contents>
</ListBucketResult>"#;

    const PAGE_2: &str = r#"<ListBucketResult>
  <Name>bucket</Name>
  <MaxKeys>1</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <KeyCount>1</KeyCount>
  <Contents><Key>b.txt</Key><Size>2</Size></Contents>
</ListBucketResult>"#;

    fn client(http: MockHttpSend) -> Client {
        Client::new(
            Context::new().with_http_send(http),
            Config::new("cn-hangzhou"),
        )
        .unwrap()
        .with_credential_provider(StaticCredentialProvider::new("ak", "sk"))
        .unwrap()
    }

    #[tokio::test]
    async fn test_next_page() {
        let http = MockHttpSend::new()
            .with_response(200, PAGE_1)
            .with_response(200, PAGE_2);
        let client = client(http.clone());

        let mut paginator = client.paginate(ListObjectsV2Request::new("bucket").with_max_keys(1));
        let first = paginator.next_page().await.unwrap().unwrap();
        assert_eq!(first.contents[0].key, "a.txt");
        assert!(paginator.has_next());

        let second = paginator.next_page().await.unwrap().unwrap();
        assert_eq!(second.contents[0].key, "b.txt");
        assert!(!paginator.has_next());
        assert!(paginator.next_page().await.unwrap().is_none());

        let reqs = http.requests();
        assert_eq!(reqs.len(), 2);
        assert!(reqs[1]
            .uri()
            .query()
            .unwrap()
            .contains("continuation-token=token-2"));
    }

    #[tokio::test]
    async fn test_into_stream() {
        let http = MockHttpSend::new()
            .with_response(200, PAGE_1)
            .with_response(200, PAGE_2);
        let client = client(http);

        let pages: Vec<_> = client
            .paginate(ListObjectsV2Request::new("bucket"))
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_next_token() {
        let current = Some("a".to_string());
        assert_eq!(next_token(true, &None, &Some("b".to_string())), Some("b".to_string()));
        assert_eq!(next_token(true, &current, &current), None);
        assert_eq!(next_token(false, &None, &Some("b".to_string())), None);
        assert_eq!(next_token(true, &None, &Some(String::new())), None);
    }
}
