// Detail overlay for the selected catalog item
// Modal panel stacked over the grid; shows artwork, metadata and branding

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{
    glib, Align, Box as GtkBox, Button, ContentFit, Label, Orientation, Picture, Widget,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::image_cache::{self, DETAIL_PREVIEW_SIZE};
use crate::nav::DetailView;

const PANEL_WIDTH: i32 = 720;
const HERO_HEIGHT: i32 = 405;

// GObject subclass for DetailOverlay
mod imp {
    use super::*;

    #[derive(Default)]
    pub struct DetailOverlayInner {
        // Dimmed backdrop holding the panel
        pub root: RefCell<Option<GtkBox>>,
        pub hero: RefCell<Option<Picture>>,
        pub logo: RefCell<Option<Picture>>,
        pub title: RefCell<Option<Label>>,
        pub facts: RefCell<Option<Label>>,
        pub genres: RefCell<Option<Label>>,
        pub description: RefCell<Option<Label>>,
        pub action: RefCell<Option<Button>>,
        // Hero image requests from an earlier show are ignored
        pub load_generation: Cell<u64>,
        pub on_close: RefCell<Option<Rc<dyn Fn()>>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for DetailOverlayInner {
        const NAME: &'static str = "ShelfDetailOverlay";
        type Type = super::DetailOverlay;
        type ParentType = glib::Object;
    }

    impl ObjectImpl for DetailOverlayInner {}
}

glib::wrapper! {
    pub struct DetailOverlay(ObjectSubclass<imp::DetailOverlayInner>);
}

impl DetailOverlay {
    pub fn new() -> Self {
        let obj: Self = glib::Object::builder().build();
        obj.setup_widgets();
        obj
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        let root = GtkBox::new(Orientation::Vertical, 0);
        root.set_halign(Align::Fill);
        root.set_valign(Align::Fill);
        root.set_hexpand(true);
        root.set_vexpand(true);
        root.add_css_class("detail-backdrop");
        root.set_visible(false);

        let panel = GtkBox::new(Orientation::Vertical, 12);
        panel.set_halign(Align::Center);
        panel.set_valign(Align::Center);
        panel.set_vexpand(true);
        panel.set_size_request(PANEL_WIDTH, -1);
        panel.add_css_class("detail-panel");

        let hero = Picture::new();
        hero.set_can_shrink(true);
        hero.set_content_fit(ContentFit::Cover);
        hero.set_size_request(PANEL_WIDTH, HERO_HEIGHT);
        hero.add_css_class("detail-hero");
        panel.append(&hero);

        let body = GtkBox::new(Orientation::Vertical, 8);
        body.add_css_class("detail-body");

        let logo = Picture::new();
        logo.set_halign(Align::Start);
        logo.set_can_shrink(true);
        logo.set_size_request(96, 32);
        logo.add_css_class("detail-logo");
        logo.set_visible(false);
        body.append(&logo);

        let title = Label::new(None);
        title.set_halign(Align::Start);
        title.set_wrap(true);
        title.add_css_class("detail-title");
        body.append(&title);

        let facts = Label::new(None);
        facts.set_halign(Align::Start);
        facts.add_css_class("detail-facts");
        body.append(&facts);

        let genres = Label::new(None);
        genres.set_halign(Align::Start);
        genres.add_css_class("detail-genres");
        body.append(&genres);

        let description = Label::new(None);
        description.set_halign(Align::Start);
        description.set_wrap(true);
        description.set_xalign(0.0);
        description.add_css_class("detail-description");
        body.append(&description);

        let buttons = GtkBox::new(Orientation::Horizontal, 8);
        let action = Button::with_label("");
        action.add_css_class("detail-action");
        action.set_can_focus(false);
        buttons.append(&action);

        let close = Button::with_label("Close");
        close.add_css_class("detail-close");
        close.set_can_focus(false);
        let overlay_weak = self.downgrade();
        close.connect_clicked(move |_| {
            if let Some(overlay) = overlay_weak.upgrade() {
                overlay.request_close();
            }
        });
        buttons.append(&close);
        body.append(&buttons);

        panel.append(&body);
        root.append(&panel);

        imp.root.replace(Some(root));
        imp.hero.replace(Some(hero));
        imp.logo.replace(Some(logo));
        imp.title.replace(Some(title));
        imp.facts.replace(Some(facts));
        imp.genres.replace(Some(genres));
        imp.description.replace(Some(description));
        imp.action.replace(Some(action));
    }

    /// The widget to stack over the grid
    pub fn widget(&self) -> Widget {
        self.imp()
            .root
            .borrow()
            .as_ref()
            .map(|root| root.clone().upcast())
            .expect("detail overlay widgets are built in new()")
    }

    /// Bind every display field and make the overlay visible
    pub fn show(&self, view: &DetailView) {
        let imp = self.imp();

        if let Some(ref title) = *imp.title.borrow() {
            title.set_text(&view.title);
        }
        if let Some(ref facts) = *imp.facts.borrow() {
            facts.set_text(&facts_line(view));
        }
        if let Some(ref genres) = *imp.genres.borrow() {
            genres.set_text(&view.genre_summary);
            genres.set_visible(!view.genre_summary.is_empty());
        }
        if let Some(ref description) = *imp.description.borrow() {
            description.set_text(&view.description);
        }
        if let Some(ref action) = *imp.action.borrow() {
            action.set_label(&view.action_text);
            action.set_visible(!view.action_text.is_empty());
        }
        if let Some(ref logo) = *imp.logo.borrow() {
            match view.logo.as_deref().and_then(image_cache::logo_texture) {
                Some(texture) => {
                    logo.set_paintable(Some(texture));
                    logo.set_visible(true);
                }
                None => logo.set_visible(false),
            }
        }

        self.set_hero(Some(image_cache::placeholder_texture()));
        let generation = imp.load_generation.get().wrapping_add(1);
        imp.load_generation.set(generation);
        let overlay_weak = self.downgrade();
        image_cache::request(&view.horizontal_image, DETAIL_PREVIEW_SIZE, move |texture| {
            let Some(overlay) = overlay_weak.upgrade() else {
                return;
            };
            if overlay.imp().load_generation.get() == generation && texture.is_some() {
                overlay.set_hero(texture);
            }
        });

        if let Some(ref root) = *imp.root.borrow() {
            root.set_visible(view.open);
        }
    }

    /// Hide the overlay. Bound fields stay until the next `show`.
    pub fn hide(&self) {
        let imp = self.imp();
        imp.load_generation.set(imp.load_generation.get().wrapping_add(1));
        if let Some(ref root) = *imp.root.borrow() {
            root.set_visible(false);
        }
    }

    /// Set callback for when the close button is pressed
    pub fn connect_close<F: Fn() + 'static>(&self, callback: F) {
        *self.imp().on_close.borrow_mut() = Some(Rc::new(callback));
    }

    fn request_close(&self) {
        let callback = self.imp().on_close.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn set_hero(&self, texture: Option<&Texture>) {
        if let Some(ref hero) = *self.imp().hero.borrow() {
            hero.set_paintable(texture);
        }
    }
}

impl Default for DetailOverlay {
    fn default() -> Self {
        Self::new()
    }
}

/// Rating, year and content type on one line, skipping empty parts.
fn facts_line(view: &DetailView) -> String {
    [view.rating.as_str(), view.date.as_str(), view.content_type]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("  ·  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;

    #[test]
    fn test_facts_line() {
        let mut view = DetailView::from_item(&sample_item("a"), true);
        assert_eq!(facts_line(&view), "TV-14  ·  2019  ·  series");

        view.rating.clear();
        assert_eq!(facts_line(&view), "2019  ·  series");
    }
}
