// Row widget for displaying one collection as a horizontal strip of tiles
// Tiles start on a placeholder texture and fill in as images arrive

use gdk4::Texture;
use glib::Object;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{
    glib, Align, Box as GtkBox, ContentFit, GestureClick, Label, Orientation, Overlay, Picture,
    PolicyType, ScrolledWindow,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::image_cache::{self, TILE_PREVIEW_SIZE};
use crate::layout::{GridMetrics, RowView, TileView};
use crate::models::LayoutMode;

// GObject subclass for RowWidget
mod imp {
    use super::*;

    /// Widgets making up a single tile
    pub struct TileSlot {
        pub widget: Overlay,
        pub picture: Picture,
        pub title: Label,
        pub meta: Label,
        pub logo: Picture,
    }

    #[derive(Default)]
    pub struct RowWidgetInner {
        pub header: RefCell<Option<Label>>,
        pub scroller: RefCell<Option<ScrolledWindow>>,
        pub strip: RefCell<Option<GtkBox>>,
        pub slots: RefCell<Vec<TileSlot>>,
        pub load_tokens: RefCell<Vec<u64>>,
        pub image_urls: RefCell<Vec<String>>,
        pub layout: Cell<Option<LayoutMode>>,
        pub row_index: Cell<usize>,
        pub on_tile_activated: RefCell<Option<Rc<dyn Fn(usize, usize)>>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for RowWidgetInner {
        const NAME: &'static str = "ShelfRowWidget";
        type Type = super::RowWidget;
        type ParentType = GtkBox;
    }

    impl ObjectImpl for RowWidgetInner {
        fn constructed(&self) {
            self.parent_constructed();

            let obj = self.obj();
            obj.set_orientation(Orientation::Vertical);
            obj.set_spacing(6);
            obj.set_hexpand(true);
            obj.add_css_class("collection-row");

            let header = Label::new(None);
            header.set_halign(Align::Start);
            header.add_css_class("collection-title");
            obj.append(&header);

            let strip = GtkBox::new(Orientation::Horizontal, GridMetrics::default().tile_gap as i32);
            strip.set_halign(Align::Start);
            strip.add_css_class("tile-strip");

            // Rows scroll independently; the cursor drives the position
            let scroller = ScrolledWindow::builder()
                .hscrollbar_policy(PolicyType::External)
                .vscrollbar_policy(PolicyType::Never)
                .propagate_natural_height(true)
                .child(&strip)
                .build();
            scroller.set_hexpand(true);
            obj.append(&scroller);

            self.header.replace(Some(header));
            self.strip.replace(Some(strip));
            self.scroller.replace(Some(scroller));
        }
    }

    impl WidgetImpl for RowWidgetInner {}
    impl BoxImpl for RowWidgetInner {}
}

glib::wrapper! {
    pub struct RowWidget(ObjectSubclass<imp::RowWidgetInner>)
        @extends GtkBox, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget, gtk4::Orientable;
}

impl RowWidget {
    pub fn new() -> Self {
        Object::builder().build()
    }

    /// Bind a collection row, creating/updating tile widgets as needed
    pub fn bind(&self, row_index: usize, row: &RowView, first_column: usize) {
        let imp = self.imp();
        imp.row_index.set(row_index);
        imp.layout.set(row.tiles.first().map(|tile| tile.layout));

        if let Some(ref header) = *imp.header.borrow() {
            header.set_text(&row.title);
        }
        // Empty collections show only their header
        if let Some(ref scroller) = *imp.scroller.borrow() {
            scroller.set_visible(!row.tiles.is_empty());
        }
        let theme_class = format!("theme-{}", row.theme);
        self.set_css_classes(&["collection-row", theme_class.as_str()]);

        {
            let mut slots = imp.slots.borrow_mut();
            let mut load_tokens = imp.load_tokens.borrow_mut();
            let strip = imp.strip.borrow();

            // Ensure we have the right number of tile slots
            while slots.len() < row.tiles.len() {
                let slot = self.create_tile_slot(slots.len());
                if let Some(ref strip) = *strip {
                    strip.append(&slot.widget);
                }
                slots.push(slot);
                load_tokens.push(0);
            }

            // Hide extra slots if we have too many
            for (i, slot) in slots.iter().enumerate() {
                slot.widget.set_visible(i < row.tiles.len());
                if i >= row.tiles.len() {
                    load_tokens[i] = 0;
                }
            }
        }

        {
            let mut urls = self.imp().image_urls.borrow_mut();
            urls.clear();
            urls.extend(row.tiles.iter().map(|tile| tile.image_url.clone()));
        }

        for (i, tile) in row.tiles.iter().enumerate() {
            self.bind_tile(i, tile);
        }

        if row.tiles.is_empty() {
            self.add_css_class("empty");
        }

        self.scroll_to_first_column(first_column);
    }

    fn bind_tile(&self, index: usize, tile: &TileView) {
        let imp = self.imp();
        let slots = imp.slots.borrow();
        let Some(slot) = slots.get(index) else {
            return;
        };

        let (width, height) = tile.layout.tile_size();
        slot.widget.set_size_request(width, height);
        slot.picture.set_size_request(width, height);
        slot.title.set_text(&tile.title);
        slot.meta.set_text(&meta_line(tile));
        slot.widget.set_tooltip_text(Some(&tile.title));

        match tile.logo_url.as_deref().and_then(image_cache::logo_texture) {
            Some(texture) => {
                slot.logo.set_paintable(Some(texture));
                slot.logo.set_visible(true);
            }
            None => slot.logo.set_visible(false),
        }

        set_selected_class(&slot.widget, tile.selected);
        for class in ["horizontal", "vertical"] {
            slot.widget.remove_css_class(class);
        }
        slot.widget.add_css_class(tile.layout.label());

        slot.picture.set_paintable(Some(image_cache::placeholder_texture()));
        let token = image_cache::next_token();
        imp.load_tokens.borrow_mut()[index] = token;
        drop(slots);

        let widget_weak = self.downgrade();
        let url = tile.image_url.clone();
        image_cache::request(&tile.image_url, TILE_PREVIEW_SIZE, move |texture| {
            if let Some(row_widget) = widget_weak.upgrade() {
                row_widget.apply_async_texture(index, token, &url, texture);
            }
        });
    }

    /// Unbind the current row, preparing for reuse
    pub fn unbind(&self) {
        let imp = self.imp();
        for slot in imp.slots.borrow().iter() {
            slot.picture.set_paintable(Some(image_cache::placeholder_texture()));
            slot.widget.set_visible(false);
            set_selected_class(&slot.widget, false);
        }
        for token in imp.load_tokens.borrow_mut().iter_mut() {
            *token = 0;
        }
        imp.image_urls.borrow_mut().clear();
        self.remove_css_class("empty");
    }

    /// Flip the selected designation of one tile without rebinding the row.
    pub fn set_tile_selected(&self, index: usize, selected: bool) {
        if let Some(slot) = self.imp().slots.borrow().get(index) {
            set_selected_class(&slot.widget, selected);
        }
    }

    /// Centre a tile horizontally within the strip.
    pub fn scroll_to_tile(&self, index: usize, metrics: &GridMetrics) {
        let imp = self.imp();
        let Some(layout) = imp.layout.get() else {
            return;
        };
        let len = imp.image_urls.borrow().len();
        if let Some(ref scroller) = *imp.scroller.borrow() {
            let hadj = scroller.hadjustment();
            let target = metrics.horizontal_target(layout, index, len, hadj.page_size() as f32);
            hadj.set_value(target as f64);
        }
    }

    /// Restore the strip to show `first_column` at its left edge. Runs once
    /// the strip has been allocated, since the adjustment has no range before.
    fn scroll_to_first_column(&self, first_column: usize) {
        let Some(layout) = self.imp().layout.get() else {
            return;
        };
        let offset = first_column as f64 * GridMetrics::default().column_pitch(layout) as f64;
        let widget_weak = self.downgrade();
        glib::idle_add_local_once(move || {
            if let Some(row_widget) = widget_weak.upgrade() {
                if let Some(ref scroller) = *row_widget.imp().scroller.borrow() {
                    let hadj = scroller.hadjustment();
                    hadj.set_value(offset.min((hadj.upper() - hadj.page_size()).max(0.0)));
                }
            }
        });
    }

    fn apply_async_texture(&self, index: usize, token: u64, expected_url: &str, texture: Option<&Texture>) {
        let Some(texture) = texture else {
            return;
        };
        let imp = self.imp();
        if imp.load_tokens.borrow().get(index).copied() != Some(token) {
            return;
        }
        if imp.image_urls.borrow().get(index).map(String::as_str) != Some(expected_url) {
            return;
        }
        if let Some(slot) = imp.slots.borrow().get(index) {
            slot.picture.set_paintable(Some(texture));
        }
    }

    pub fn connect_tile_activated<F>(&self, callback: F)
    where
        F: Fn(usize, usize) + 'static,
    {
        *self.imp().on_tile_activated.borrow_mut() = Some(Rc::new(callback));
    }

    fn create_tile_slot(&self, index: usize) -> imp::TileSlot {
        let picture = Picture::new();
        picture.set_can_shrink(true);
        picture.set_content_fit(ContentFit::Cover);
        picture.add_css_class("tile-image");

        let overlay = Overlay::new();
        overlay.set_child(Some(&picture));
        overlay.add_css_class("tile");

        let caption = GtkBox::new(Orientation::Vertical, 2);
        caption.set_valign(Align::End);
        caption.set_halign(Align::Fill);
        caption.add_css_class("tile-caption");

        let title = Label::new(None);
        title.set_halign(Align::Start);
        title.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        title.add_css_class("tile-title");
        caption.append(&title);

        let meta = Label::new(None);
        meta.set_halign(Align::Start);
        meta.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        meta.add_css_class("tile-meta");
        caption.append(&meta);
        overlay.add_overlay(&caption);

        let logo = Picture::new();
        logo.set_halign(Align::Start);
        logo.set_valign(Align::Start);
        logo.set_margin_start(6);
        logo.set_margin_top(6);
        logo.set_can_shrink(true);
        logo.set_size_request(48, 16);
        logo.add_css_class("tile-logo");
        logo.set_visible(false);
        overlay.add_overlay(&logo);

        let row_widget = self.downgrade();
        let click = GestureClick::new();
        click.set_button(1);
        click.connect_pressed(move |_, _n, _x, _y| {
            if let Some(row_widget) = row_widget.upgrade() {
                row_widget.emit_tile_activated(index);
            }
        });
        overlay.add_controller(click);

        imp::TileSlot {
            widget: overlay,
            picture,
            title,
            meta,
            logo,
        }
    }

    fn emit_tile_activated(&self, index: usize) {
        let imp = self.imp();
        if index >= imp.image_urls.borrow().len() {
            return;
        }
        let callback = imp.on_tile_activated.borrow().clone();
        if let Some(callback) = callback {
            callback(imp.row_index.get(), index);
        }
    }
}

impl Default for RowWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn set_selected_class(widget: &impl IsA<gtk4::Widget>, selected: bool) {
    if selected {
        widget.add_css_class("selected");
    } else {
        widget.remove_css_class("selected");
    }
}

/// Secondary caption line: year and genres.
fn meta_line(tile: &TileView) -> String {
    if tile.genre_summary.is_empty() {
        tile.date.clone()
    } else {
        format!("{} · {}", tile.date, tile.genre_summary)
    }
}
