use chrono::{Datelike, NaiveDate};

/// Separator used when a genre list is shown as a single line.
pub const GENRE_SEPARATOR: &str = " • ";

/// Local logo shown for every branded item. Branding logos are not fetched
/// per brand, so all brands share this asset.
pub const DEFAULT_BRANDING_LOGO: &str = "resource:///shelf/branding-logo.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Series,
    Movie,
    Episode,
}

impl ContentType {
    pub fn from_entity_type(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "series" => Some(Self::Series),
            "movie" => Some(Self::Movie),
            "episode" => Some(Self::Episode),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Series => "series",
            ContentType::Movie => "movie",
            ContentType::Episode => "episode",
        }
    }
}

/// Premiere date of an item.
///
/// Unparseable or missing dates are kept as `Invalid` rather than rejected;
/// the item stays visible and the date renders as `Invalid Date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseDate {
    Valid(NaiveDate),
    Invalid(String),
}

impl ReleaseDate {
    pub fn year(&self) -> Option<i32> {
        match self {
            ReleaseDate::Valid(date) => Some(date.year()),
            ReleaseDate::Invalid(_) => None,
        }
    }

    /// Year as shown on tiles and in the detail overlay.
    pub fn display_year(&self) -> String {
        match self.year() {
            Some(year) => year.to_string(),
            None => "Invalid Date".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub id: String,
    pub name: String,
    pub logo_url: String,
}

/// A display-ready catalog item. Both image URLs were verified to load
/// when the item was normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub action_text: String,
    pub description: String,
    pub title: String,
    pub horizontal_image_url: String,
    pub vertical_image_url: String,
    pub branding: Option<Branding>,
    pub rating: String,
    pub genres: Vec<String>,
    pub content_type: ContentType,
    pub release_date: ReleaseDate,
}

impl Item {
    pub fn genre_summary(&self) -> String {
        self.genres.join(GENRE_SEPARATOR)
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.branding.as_ref().map(|b| b.logo_url.as_str())
    }
}

#[cfg(test)]
pub(crate) fn sample_item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        action_text: "Watch now".to_string(),
        description: format!("Description of {id}"),
        title: format!("Title {id}"),
        horizontal_image_url: format!("https://img.test/{id}/h.jpg"),
        vertical_image_url: format!("https://img.test/{id}/v.jpg"),
        branding: None,
        rating: "TV-14".to_string(),
        genres: vec!["Drama".to_string(), "Comedy".to_string()],
        content_type: ContentType::Series,
        release_date: ReleaseDate::Valid(NaiveDate::from_ymd_opt(2019, 6, 1).unwrap()),
    }
}
