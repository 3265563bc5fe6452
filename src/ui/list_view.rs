// ListView setup for displaying collection rows
// One list item per collection; each binds a horizontally scrolling RowWidget

use glib::Object;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{
    gio, glib, ListItem, ListView, NoSelection, PolicyType, ScrolledWindow, SignalListItemFactory,
};
use std::cell::RefCell;
use std::rc::Rc;

use super::row_widget::RowWidget;
use crate::layout::{GridMetrics, GridModel, RowView};
use crate::models::LayoutMode;
use crate::nav::Cursor;

// GObject wrapper for RowView to use in ListStore
mod collection_row_object {
    use super::*;
    use std::cell::Cell;

    mod imp {
        use super::*;

        #[derive(Default)]
        pub struct CollectionRowObjectInner {
            pub row: RefCell<Option<RowView>>,
            pub row_index: Cell<usize>,
            pub first_column: Cell<usize>,
            pub widget: glib::WeakRef<RowWidget>,
        }

        #[glib::object_subclass]
        impl ObjectSubclass for CollectionRowObjectInner {
            const NAME: &'static str = "ShelfCollectionRowObject";
            type Type = super::CollectionRowObject;
            type ParentType = glib::Object;
        }

        impl ObjectImpl for CollectionRowObjectInner {}
    }

    glib::wrapper! {
        pub struct CollectionRowObject(ObjectSubclass<imp::CollectionRowObjectInner>);
    }

    impl CollectionRowObject {
        pub fn new(row_index: usize, row: RowView, first_column: usize) -> Self {
            let obj: Self = Object::builder().build();
            obj.imp().row.replace(Some(row));
            obj.imp().row_index.set(row_index);
            obj.imp().first_column.set(first_column);
            obj
        }

        pub fn row_index(&self) -> usize {
            self.imp().row_index.get()
        }

        pub fn first_column(&self) -> usize {
            self.imp().first_column.get()
        }

        pub fn set_first_column(&self, column: usize) {
            self.imp().first_column.set(column);
        }

        pub fn with_row<R>(&self, f: impl FnOnce(&RowView) -> R) -> Option<R> {
            self.imp().row.borrow().as_ref().map(f)
        }

        /// Record the selected flag of one tile, and patch the bound widget
        /// if the row is currently on screen.
        pub fn set_tile_selected(&self, col: usize, selected: bool) {
            if let Some(tile) = self
                .imp()
                .row
                .borrow_mut()
                .as_mut()
                .and_then(|row| row.tiles.get_mut(col))
            {
                tile.selected = selected;
            }
            if let Some(widget) = self.bound_widget() {
                widget.set_tile_selected(col, selected);
            }
        }

        pub fn bound_widget(&self) -> Option<RowWidget> {
            self.imp().widget.upgrade()
        }

        pub fn set_bound_widget(&self, widget: Option<&RowWidget>) {
            self.imp().widget.set(widget);
        }
    }

    impl Default for CollectionRowObject {
        fn default() -> Self {
            Object::builder().build()
        }
    }
}

pub use collection_row_object::CollectionRowObject;

/// CatalogListView wraps a GTK ListView showing one row per collection
pub struct CatalogListView {
    scrolled_window: ScrolledWindow,
    list_view: ListView,
    model: gio::ListStore,
    layout: RefCell<LayoutMode>,
    on_tile_activated: Rc<RefCell<Option<Box<dyn Fn(Cursor)>>>>,
}

impl CatalogListView {
    pub fn new() -> Self {
        let model = gio::ListStore::new::<CollectionRowObject>();

        // Selection lives in the browser state, not in the list
        let selection_model = NoSelection::new(Some(model.clone()));

        let factory = SignalListItemFactory::new();

        let on_tile_activated: Rc<RefCell<Option<Box<dyn Fn(Cursor)>>>> =
            Rc::new(RefCell::new(None));
        let on_tile_activated_setup = on_tile_activated.clone();

        // Setup: create the widget when a list item is created
        factory.connect_setup(move |_factory, list_item| {
            let list_item = list_item
                .downcast_ref::<ListItem>()
                .expect("ListItem expected");
            let row_widget = RowWidget::new();
            let on_tile_activated = on_tile_activated_setup.clone();
            row_widget.connect_tile_activated(move |row, col| {
                if let Some(ref callback) = *on_tile_activated.borrow() {
                    callback(Cursor::new(row, col));
                }
            });
            list_item.set_child(Some(&row_widget));
            list_item.set_activatable(false);
        });

        // Bind: update the widget when data is bound to it
        factory.connect_bind(|_factory, list_item| {
            let list_item = list_item
                .downcast_ref::<ListItem>()
                .expect("ListItem expected");

            let row_obj = list_item
                .item()
                .and_downcast::<CollectionRowObject>()
                .expect("CollectionRowObject expected");

            let row_widget = list_item
                .child()
                .and_downcast::<RowWidget>()
                .expect("RowWidget expected");

            let row_index = row_obj.row_index();
            let first_column = row_obj.first_column();
            row_obj.with_row(|row| row_widget.bind(row_index, row, first_column));
            row_obj.set_bound_widget(Some(&row_widget));
        });

        // Unbind: clean up when data is unbound
        factory.connect_unbind(|_factory, list_item| {
            let list_item = list_item
                .downcast_ref::<ListItem>()
                .expect("ListItem expected");

            if let Some(row_obj) = list_item.item().and_downcast::<CollectionRowObject>() {
                row_obj.set_bound_widget(None);
            }
            if let Some(row_widget) = list_item.child().and_downcast::<RowWidget>() {
                row_widget.unbind();
            }
        });

        factory.connect_teardown(|_factory, list_item| {
            let list_item = list_item
                .downcast_ref::<ListItem>()
                .expect("ListItem expected");
            list_item.set_child(Option::<&gtk4::Widget>::None);
        });

        let list_view = ListView::new(Some(selection_model), Some(factory));
        list_view.set_single_click_activate(false);
        list_view.set_enable_rubberband(false);
        list_view.set_can_focus(false);
        list_view.add_css_class("catalog-list-view");
        list_view.set_hexpand(true);
        list_view.set_vexpand(true);

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Never)
            .vscrollbar_policy(PolicyType::Automatic)
            .kinetic_scrolling(true)
            .propagate_natural_width(false)
            .propagate_natural_height(false)
            .child(&list_view)
            .build();
        scrolled_window.set_min_content_width(0);
        scrolled_window.set_min_content_height(0);

        Self {
            scrolled_window,
            list_view,
            model,
            layout: RefCell::new(LayoutMode::default()),
            on_tile_activated,
        }
    }

    /// Get the scrolled window widget to add to the window
    pub fn widget(&self) -> &ScrolledWindow {
        &self.scrolled_window
    }

    /// Get the content width available to the rows (excludes scrollbars).
    pub fn content_width(&self) -> f32 {
        let mut width = self.scrolled_window.allocation().width() as f32;
        if width <= 0.0 {
            width = self.list_view.allocation().width() as f32;
        }
        if width <= 0.0 {
            return 0.0;
        }

        let vscrollbar = self.scrolled_window.vscrollbar();
        if vscrollbar.is_visible() {
            width = (width - vscrollbar.allocated_width() as f32).max(0.0);
        }
        width
    }

    /// Replace all rows. `first_columns` holds each row's horizontal
    /// scroll position in tiles.
    pub fn set_rows(&self, grid: GridModel, first_columns: &[usize]) {
        *self.layout.borrow_mut() = grid.layout;
        let objects: Vec<CollectionRowObject> = grid
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let first = first_columns.get(index).copied().unwrap_or(0);
                CollectionRowObject::new(index, row, first)
            })
            .collect();
        self.model.splice(0, self.model.n_items(), &objects);
    }

    fn row_object(&self, row: usize) -> Option<CollectionRowObject> {
        self.model
            .item(row as u32)
            .and_downcast::<CollectionRowObject>()
    }

    fn row_lengths(&self) -> Vec<usize> {
        (0..self.model.n_items() as usize)
            .map(|row| {
                self.row_object(row)
                    .and_then(|row_obj| row_obj.with_row(|r| r.tiles.len()))
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Patch the selected designation of a single tile in place.
    pub fn set_tile_selected(&self, cursor: Cursor, selected: bool) {
        if let Some(row_obj) = self.row_object(cursor.row) {
            row_obj.set_tile_selected(cursor.col, selected);
        }
    }

    /// Bring a tile into view: its row centred vertically, the tile centred
    /// within its row. `first_column` is remembered for when the row is
    /// bound again after scrolling off screen.
    pub fn scroll_to_tile(&self, cursor: Cursor, first_column: usize, metrics: &GridMetrics) {
        let layout = *self.layout.borrow();
        let vadj = self.scrolled_window.vadjustment();
        let target = metrics.vertical_target(
            layout,
            cursor.row,
            &self.row_lengths(),
            vadj.page_size() as f32,
        );
        vadj.set_value((target as f64).min((vadj.upper() - vadj.page_size()).max(0.0)));

        if let Some(row_obj) = self.row_object(cursor.row) {
            row_obj.set_first_column(first_column);
            if let Some(widget) = row_obj.bound_widget() {
                widget.scroll_to_tile(cursor.col, metrics);
            }
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> u32 {
        self.model.n_items()
    }

    pub fn connect_tile_activated<F>(&self, callback: F)
    where
        F: Fn(Cursor) + 'static,
    {
        *self.on_tile_activated.borrow_mut() = Some(Box::new(callback));
    }
}

impl Default for CatalogListView {
    fn default() -> Self {
        Self::new()
    }
}
