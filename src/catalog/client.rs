//! HTTP catalog client.
//!
//! The `CatalogSource` methods fail soft: a transport error, a non-success
//! status or an undecodable body all come back as an empty list, with the
//! failure logged. Callers that need to tell "failed" from "empty" use the
//! `try_*` methods on `HttpCatalog` instead.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::raw::{CollectionsBody, ItemsBody, RawCollection};
use super::CatalogError;
use crate::models::Collection;

/// Read-only access to the remote catalog.
pub trait CatalogSource {
    /// Collection skeletons (no items), in catalog order.
    fn fetch_collections(&self) -> impl Future<Output = Vec<Collection>> + Send;

    /// Undecoded item records behind one collection's `href`. Each record
    /// is decoded separately with `RawItem::from_value`.
    fn fetch_items(&self, href: &str) -> impl Future<Output = Vec<Value>> + Send;
}

pub struct HttpCatalog {
    http: reqwest::Client,
    collections_url: Url,
}

impl HttpCatalog {
    pub fn new(collections_url: &str, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| CatalogError::Transport {
            url: collections_url.to_string(),
            source,
        })?;
        Self::with_client(http, collections_url)
    }

    pub fn with_client(http: reqwest::Client, collections_url: &str) -> Result<Self, CatalogError> {
        let collections_url =
            Url::parse(collections_url).map_err(|err| CatalogError::InvalidUrl {
                href: collections_url.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            http,
            collections_url,
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn try_fetch_collections(&self) -> Result<Vec<Collection>, CatalogError> {
        let body: CollectionsBody = self.get_json(self.collections_url.clone()).await?;
        Ok(body.into_vec().into_iter().map(skeleton).collect())
    }

    pub async fn try_fetch_items(&self, href: &str) -> Result<Vec<Value>, CatalogError> {
        let url = self.resolve(href)?;
        let body: ItemsBody = self.get_json(url).await?;
        Ok(body.into_vec())
    }

    /// Resolves a collection href, which may be absolute or relative to the
    /// collections endpoint.
    fn resolve(&self, href: &str) -> Result<Url, CatalogError> {
        self.collections_url
            .join(href)
            .map_err(|err| CatalogError::InvalidUrl {
                href: href.to_string(),
                reason: err.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        debug!(%url, "GET");
        let response =
            self.http
                .get(url.clone())
                .send()
                .await
                .map_err(|source| CatalogError::Transport {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url.to_string(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl CatalogSource for HttpCatalog {
    async fn fetch_collections(&self) -> Vec<Collection> {
        match self.try_fetch_collections().await {
            Ok(collections) => collections,
            Err(err) => {
                warn!(error = %err, "Failed to fetch collections");
                Vec::new()
            }
        }
    }

    async fn fetch_items(&self, href: &str) -> Vec<Value> {
        match self.try_fetch_items(href).await {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, href, "Failed to fetch collection items");
                Vec::new()
            }
        }
    }
}

fn skeleton(raw: RawCollection) -> Collection {
    Collection::skeleton(raw.id, raw.name, raw.href, raw.theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::raw::{sample_raw_value, RawItem};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn catalog_for(server: &MockServer) -> HttpCatalog {
        HttpCatalog::new(&format!("{}/api/collections", server.uri()), None).unwrap()
    }

    #[tokio::test]
    async fn fetches_collection_skeletons() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "c1", "name": "Trending", "theme": "dark", "href": "/api/c1"},
                {"id": "c2", "name": "New", "theme": "light", "href": "/api/c2"}
            ])))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server).await;
        let collections = catalog.fetch_collections().await;

        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].title, "Trending");
        assert_eq!(collections[1].href, "/api/c2");
        assert!(collections.iter().all(|c| c.items.is_empty()));
    }

    #[tokio::test]
    async fn server_error_is_an_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server).await;
        assert!(catalog.fetch_collections().await.is_empty());

        let err = catalog.try_fetch_collections().await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn relative_item_href_resolves_against_catalog_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/c1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "a"}, {"id": "b"}]
            })))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server).await;
        let items = catalog.fetch_items("c1/items").await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["id"], "b");
    }

    #[tokio::test]
    async fn malformed_item_leaves_its_siblings_intact() {
        let server = MockServer::start().await;
        let mut bad = sample_raw_value("bad");
        bad["genre_names"] = serde_json::json!(["Drama", null]);
        Mock::given(method("GET"))
            .and(path("/api/c1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([sample_raw_value("good"), bad])),
            )
            .mount(&server)
            .await;

        let catalog = catalog_for(&server).await;
        let records = catalog.try_fetch_items("/api/c1").await.unwrap();
        assert_eq!(records.len(), 2);

        let items: Vec<RawItem> = records.into_iter().filter_map(RawItem::from_value).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server).await;
        let err = catalog.try_fetch_collections().await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode { .. }));
        assert!(catalog.fetch_collections().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_is_an_empty_result() {
        let catalog = HttpCatalog::new("http://127.0.0.1:9/api/collections", None).unwrap();
        assert!(catalog.fetch_items("/nothing").await.is_empty());
    }

    #[test]
    fn invalid_catalog_url_is_rejected() {
        let err = HttpCatalog::new("not a url", None).err().unwrap();
        assert!(matches!(err, CatalogError::InvalidUrl { .. }));
    }
}
