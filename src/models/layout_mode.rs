use super::Item;

/// Grid orientation. Purely presentational: it picks which image variant a
/// tile shows and never touches the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Horizontal,
    Vertical,
}

impl LayoutMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Some(Self::Horizontal),
            "vertical" | "v" => Some(Self::Vertical),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LayoutMode::Horizontal => LayoutMode::Vertical,
            LayoutMode::Vertical => LayoutMode::Horizontal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LayoutMode::Horizontal => "horizontal",
            LayoutMode::Vertical => "vertical",
        }
    }

    pub fn image_url<'a>(&self, item: &'a Item) -> &'a str {
        match self {
            LayoutMode::Horizontal => &item.horizontal_image_url,
            LayoutMode::Vertical => &item.vertical_image_url,
        }
    }

    /// Tile size in pixels for this orientation.
    pub fn tile_size(&self) -> (i32, i32) {
        match self {
            LayoutMode::Horizontal => (320, 180),
            LayoutMode::Vertical => (160, 240),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(LayoutMode::Horizontal.toggled(), LayoutMode::Vertical);
        assert_eq!(LayoutMode::Vertical.toggled().toggled(), LayoutMode::Vertical);
    }

    #[test]
    fn image_url_follows_orientation() {
        let item = sample_item("x");
        assert_eq!(LayoutMode::Horizontal.image_url(&item), "https://img.test/x/h.jpg");
        assert_eq!(LayoutMode::Vertical.image_url(&item), "https://img.test/x/v.jpg");
    }

    #[test]
    fn parse_accepts_short_names() {
        assert_eq!(LayoutMode::parse("V"), Some(LayoutMode::Vertical));
        assert_eq!(LayoutMode::parse("horizontal"), Some(LayoutMode::Horizontal));
        assert_eq!(LayoutMode::parse("diagonal"), None);
    }
}
