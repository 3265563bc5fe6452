//! Detail overlay state.

use crate::models::Item;

/// Everything the overlay shows for the bound item.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub item_id: String,
    pub logo: Option<String>,
    pub horizontal_image: String,
    pub title: String,
    pub description: String,
    pub rating: String,
    pub date: String,
    pub genre_summary: String,
    pub content_type: &'static str,
    pub action_text: String,
    pub open: bool,
}

impl DetailView {
    pub fn from_item(item: &Item, open: bool) -> Self {
        Self {
            item_id: item.id.clone(),
            logo: item.logo_url().map(str::to_string),
            horizontal_image: item.horizontal_image_url.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            rating: item.rating.clone(),
            date: item.release_date.display_year(),
            genre_summary: item.genre_summary(),
            content_type: item.content_type.label(),
            action_text: item.action_text.clone(),
            open,
        }
    }
}

/// Open/closed state plus the item the overlay was opened for. The bound
/// item is kept after closing so a fade-out can still render it.
#[derive(Debug, Default)]
pub struct DetailOverlay {
    open: bool,
    bound: Option<Item>,
}

impl DetailOverlay {
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[cfg(test)]
    pub fn bound_item(&self) -> Option<&Item> {
        self.bound.as_ref()
    }

    pub fn open(&mut self, item: Item) -> DetailView {
        let view = DetailView::from_item(&item, true);
        self.bound = Some(item);
        self.open = true;
        view
    }

    /// Returns `false` when the overlay was already closed.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    #[cfg(test)]
    pub fn view(&self) -> Option<DetailView> {
        self.bound
            .as_ref()
            .map(|item| DetailView::from_item(item, self.open))
    }
}
