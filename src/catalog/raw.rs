//! Wire records returned by the catalog service.
//!
//! An items body is split into undecoded records first and each record is
//! decoded on its own, so one malformed item cannot fail the decode of its
//! whole batch. Item fields are optional here; the normalizer decides which
//! missing fields are fatal for an item.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Collection descriptor from the collections endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RawCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub theme: String,
    pub href: String,
}

/// Either a bare array or an envelope object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CollectionsBody {
    List(Vec<RawCollection>),
    Envelope { collections: Vec<RawCollection> },
}

impl CollectionsBody {
    pub(crate) fn into_vec(self) -> Vec<RawCollection> {
        match self {
            CollectionsBody::List(list) => list,
            CollectionsBody::Envelope { collections } => collections,
        }
    }
}

/// Item records stay undecoded until `RawItem::from_value`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemsBody {
    List(Vec<Value>),
    Envelope { items: Vec<Value> },
}

impl ItemsBody {
    pub(crate) fn into_vec(self) -> Vec<Value> {
        match self {
            ItemsBody::List(list) => list,
            ItemsBody::Envelope { items } => items,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub visuals: Option<RawVisuals>,
    #[serde(default)]
    pub rating: Option<RawRating>,
    #[serde(default)]
    pub genre_names: Option<Vec<String>>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub premiere_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawVisuals {
    #[serde(default)]
    pub artwork: Option<RawArtwork>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub action_text: Option<String>,
    #[serde(default)]
    pub primary_branding: Option<RawBranding>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawArtwork {
    #[serde(default)]
    pub horizontal_tile: Option<RawTile>,
    #[serde(default)]
    pub vertical_tile: Option<RawTile>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawTile {
    #[serde(default)]
    pub image: Option<RawImage>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawImage {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawRating {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawBranding {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawItem {
    /// Decodes a single item record. A record with a wrong-typed field is
    /// dropped here without touching its siblings.
    pub fn from_value(value: Value) -> Option<Self> {
        match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(err) => {
                debug!(error = %err, "Dropping undecodable item");
                None
            }
        }
    }

    pub fn horizontal_path(&self) -> Option<&str> {
        self.artwork()?
            .horizontal_tile
            .as_ref()?
            .image
            .as_ref()?
            .path
            .as_deref()
    }

    pub fn vertical_path(&self) -> Option<&str> {
        self.artwork()?
            .vertical_tile
            .as_ref()?
            .image
            .as_ref()?
            .path
            .as_deref()
    }

    fn artwork(&self) -> Option<&RawArtwork> {
        self.visuals.as_ref()?.artwork.as_ref()
    }
}

#[cfg(test)]
pub(crate) fn sample_raw_item(id: &str) -> RawItem {
    serde_json::from_value(sample_raw_value(id)).unwrap()
}

#[cfg(test)]
pub(crate) fn sample_raw_value(id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "visuals": {
            "artwork": {
                "horizontal_tile": { "image": { "path": format!("art/{id}/h.jpg") } },
                "vertical_tile": { "image": { "path": format!("art/{id}/v.jpg") } }
            },
            "headline": format!("Headline {id}"),
            "body": "A body of text.",
            "action_text": "Start Watching"
        },
        "rating": { "code": "TV-MA" },
        "genre_names": ["Drama", "Thriller"],
        "entity_type": "series",
        "premiere_date": "2020-03-14T00:00:00Z"
    })
}
