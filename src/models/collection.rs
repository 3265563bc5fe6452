use super::Item;

/// A named group of items rendered as one row of the grid.
///
/// Created as a skeleton (no items) from the collections endpoint; items are
/// attached once by the loader and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub href: String,
    pub theme: String,
    pub items: Vec<Item>,
}

impl Collection {
    pub fn skeleton(id: String, title: String, href: String, theme: String) -> Self {
        Self {
            id,
            title,
            href,
            theme,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Item counts per row, in collection order.
pub fn row_lengths(collections: &[Collection]) -> Vec<usize> {
    collections.iter().map(Collection::len).collect()
}
