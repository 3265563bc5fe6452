//! Image URL construction and availability probing.

use std::future::Future;

use tracing::debug;

use crate::image_loader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    HorizontalTile,
    VerticalTile,
}

impl ImageVariant {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageVariant::HorizontalTile => (400, 225),
            ImageVariant::VerticalTile => (240, 360),
        }
    }

    pub fn format(&self) -> &'static str {
        "jpeg"
    }
}

/// Joins an artwork path to the image host and parameterizes the rendition.
pub fn image_url(base: &str, path: &str, variant: ImageVariant) -> String {
    let (width, height) = variant.dimensions();
    format!(
        "{}/{}?width={}&height={}&format={}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/'),
        width,
        height,
        variant.format()
    )
}

/// Checks that an image URL actually loads.
pub trait ImageProbe {
    /// Resolves to the URL when the image loads, `None` when it is unavailable.
    fn probe(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Downloads the image and confirms it fully decodes.
#[derive(Clone)]
pub struct HttpImageProbe {
    http: reqwest::Client,
}

impl HttpImageProbe {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn load(&self, url: &str) -> Result<(u32, u32), String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }
        let bytes = response.bytes().await.map_err(|err| err.to_string())?;
        image_loader::decoded_dimensions(&bytes).map_err(|err| err.to_string())
    }
}

impl ImageProbe for HttpImageProbe {
    async fn probe(&self, url: &str) -> Option<String> {
        match self.load(url).await {
            Ok((width, height)) => {
                debug!(url, width, height, "Image available");
                Some(url.to_string())
            }
            Err(reason) => {
                debug!(url, %reason, "Image unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::png_bytes;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn url_carries_rendition_parameters() {
        assert_eq!(
            image_url("https://img.test/", "/art/a.jpg", ImageVariant::HorizontalTile),
            "https://img.test/art/a.jpg?width=400&height=225&format=jpeg"
        );
        assert_eq!(
            image_url("https://img.test", "art/a.jpg", ImageVariant::VerticalTile),
            "https://img.test/art/a.jpg?width=240&height=360&format=jpeg"
        );
    }

    #[tokio::test]
    async fn probe_accepts_decodable_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(2, 2)))
            .mount(&server)
            .await;

        let probe = HttpImageProbe::new(reqwest::Client::new());
        let url = format!("{}/ok.png", server.uri());
        assert_eq!(probe.probe(&url).await, Some(url.clone()));
    }

    #[tokio::test]
    async fn probe_rejects_missing_and_non_image_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let probe = HttpImageProbe::new(reqwest::Client::new());
        assert_eq!(probe.probe(&format!("{}/text", server.uri())).await, None);
        assert_eq!(probe.probe(&format!("{}/gone", server.uri())).await, None);
    }

    #[tokio::test]
    async fn probe_rejects_truncated_image() {
        let server = MockServer::start().await;
        let mut bytes = png_bytes(16, 16);
        bytes.truncate(45);
        Mock::given(method("GET"))
            .and(path("/cut.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .mount(&server)
            .await;

        let probe = HttpImageProbe::new(reqwest::Client::new());
        assert_eq!(probe.probe(&format!("{}/cut.png", server.uri())).await, None);
    }
}
