//! Raw item -> display record.
//!
//! An item is dropped (returns `None`) when a required field is missing or
//! when either image orientation fails to load. Drops are logged at debug
//! level and never abort the surrounding batch.

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use super::images::{image_url, ImageProbe, ImageVariant};
use super::raw::RawItem;
use crate::models::{Branding, ContentType, Item, ReleaseDate, DEFAULT_BRANDING_LOGO};

/// Fields that must be present before any image is probed.
struct Required<'a> {
    id: &'a str,
    title: &'a str,
    horizontal_path: &'a str,
    vertical_path: &'a str,
    content_type: ContentType,
}

fn required_fields(raw: &RawItem) -> Result<Required<'_>, &'static str> {
    let id = raw.id.as_deref().ok_or("missing id")?;
    let visuals = raw.visuals.as_ref().ok_or("missing visuals")?;
    let title = visuals.headline.as_deref().ok_or("missing headline")?;
    let horizontal_path = raw
        .horizontal_path()
        .ok_or("missing visuals.artwork.horizontal_tile")?;
    let vertical_path = raw
        .vertical_path()
        .ok_or("missing visuals.artwork.vertical_tile")?;
    let content_type = raw
        .entity_type
        .as_deref()
        .and_then(ContentType::from_entity_type)
        .ok_or("missing or unknown entity_type")?;

    Ok(Required {
        id,
        title,
        horizontal_path,
        vertical_path,
        content_type,
    })
}

pub async fn normalize<P: ImageProbe>(raw: &RawItem, image_base: &str, probe: &P) -> Option<Item> {
    let required = match required_fields(raw) {
        Ok(required) => required,
        Err(reason) => {
            debug!(id = ?raw.id, reason, "Dropping malformed item");
            return None;
        }
    };

    let horizontal_url = image_url(
        image_base,
        required.horizontal_path,
        ImageVariant::HorizontalTile,
    );
    let vertical_url = image_url(image_base, required.vertical_path, ImageVariant::VerticalTile);

    let (horizontal, vertical) =
        tokio::join!(probe.probe(&horizontal_url), probe.probe(&vertical_url));
    let (Some(horizontal_image_url), Some(vertical_image_url)) = (horizontal, vertical) else {
        debug!(id = required.id, "Dropping item with unavailable artwork");
        return None;
    };

    // Checked in required_fields.
    let visuals = raw.visuals.as_ref()?;

    let branding = visuals.primary_branding.as_ref().map(|brand| Branding {
        id: brand.id.clone().unwrap_or_default(),
        name: brand.name.clone().unwrap_or_default(),
        logo_url: DEFAULT_BRANDING_LOGO.to_string(),
    });

    Some(Item {
        id: required.id.to_string(),
        action_text: visuals.action_text.clone().unwrap_or_default(),
        description: visuals.body.clone().unwrap_or_default(),
        title: required.title.to_string(),
        horizontal_image_url,
        vertical_image_url,
        branding,
        rating: raw
            .rating
            .as_ref()
            .and_then(|r| r.code.clone())
            .unwrap_or_default(),
        genres: raw.genre_names.clone().unwrap_or_default(),
        content_type: required.content_type,
        release_date: parse_release_date(raw.premiere_date.as_deref()),
    })
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates. Anything else,
/// including a missing value, becomes `ReleaseDate::Invalid`.
pub fn parse_release_date(value: Option<&str>) -> ReleaseDate {
    let Some(value) = value.map(str::trim) else {
        return ReleaseDate::Invalid(String::new());
    };
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return ReleaseDate::Valid(timestamp.date_naive());
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => ReleaseDate::Valid(date),
        Err(_) => ReleaseDate::Invalid(value.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::ImageProbe;

    /// Probe that fails any URL containing one of the configured fragments
    /// and records every URL it was asked about.
    #[derive(Default)]
    pub struct FakeProbe {
        pub failing: HashSet<String>,
        pub seen: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        pub fn failing(fragments: &[&str]) -> Self {
            Self {
                failing: fragments.iter().map(|f| f.to_string()).collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageProbe for FakeProbe {
        async fn probe(&self, url: &str) -> Option<String> {
            self.seen.lock().unwrap().push(url.to_string());
            if self.failing.iter().any(|f| url.contains(f.as_str())) {
                None
            } else {
                Some(url.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::FakeProbe;
    use super::*;
    use crate::catalog::raw::{sample_raw_item, RawBranding};

    const BASE: &str = "https://img.test";

    #[tokio::test]
    async fn normalizes_complete_item() {
        let raw = sample_raw_item("a");
        let probe = FakeProbe::default();

        let item = normalize(&raw, BASE, &probe).await.unwrap();

        assert_eq!(item.id, "a");
        assert_eq!(item.title, "Headline a");
        assert_eq!(item.rating, "TV-MA");
        assert_eq!(item.content_type, ContentType::Series);
        assert_eq!(item.release_date.year(), Some(2020));
        assert_eq!(
            item.horizontal_image_url,
            "https://img.test/art/a/h.jpg?width=400&height=225&format=jpeg"
        );
        assert!(item.branding.is_none());
        assert_eq!(probe.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_vertical_tile_drops_item() {
        let mut raw = sample_raw_item("a");
        if let Some(artwork) = raw.visuals.as_mut().and_then(|v| v.artwork.as_mut()) {
            artwork.vertical_tile = None;
        }
        let probe = FakeProbe::default();

        assert!(normalize(&raw, BASE, &probe).await.is_none());
        assert!(probe.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_image_drops_item() {
        let raw = sample_raw_item("a");

        let probe = FakeProbe::failing(&["/h.jpg"]);
        assert!(normalize(&raw, BASE, &probe).await.is_none());

        let probe = FakeProbe::failing(&["/v.jpg"]);
        assert!(normalize(&raw, BASE, &probe).await.is_none());
    }

    #[tokio::test]
    async fn branding_uses_local_logo() {
        let mut raw = sample_raw_item("a");
        if let Some(visuals) = raw.visuals.as_mut() {
            visuals.primary_branding = Some(RawBranding {
                id: Some("b1".to_string()),
                name: Some("Network One".to_string()),
            });
        }

        let item = normalize(&raw, BASE, &FakeProbe::default()).await.unwrap();
        let branding = item.branding.unwrap();
        assert_eq!(branding.name, "Network One");
        assert_eq!(branding.logo_url, DEFAULT_BRANDING_LOGO);
    }

    #[tokio::test]
    async fn unknown_entity_type_drops_item() {
        let mut raw = sample_raw_item("a");
        raw.entity_type = Some("trailer".to_string());
        assert!(normalize(&raw, BASE, &FakeProbe::default()).await.is_none());
    }

    #[test]
    fn release_date_formats() {
        assert_eq!(
            parse_release_date(Some("2018-11-02")).year(),
            Some(2018)
        );
        assert_eq!(
            parse_release_date(Some("2001-01-01T05:00:00+02:00")).year(),
            Some(2001)
        );
        assert_eq!(
            parse_release_date(Some("next spring")),
            ReleaseDate::Invalid("next spring".to_string())
        );
        assert_eq!(parse_release_date(None), ReleaseDate::Invalid(String::new()));
    }
}
