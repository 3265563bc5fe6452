// Main window for the shelf catalog browser
// Grid of collection rows with a detail overlay stacked on top

use gdk4::Display;
use gtk4::prelude::*;
use gtk4::{
    glib, Align, Application, ApplicationWindow, Box as GtkBox, Button, CssProvider, Label,
    Orientation, Overlay, Settings as GtkSettings, STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder as TokioRuntimeBuilder;

use anyhow::{Context, Result};

use super::detail_overlay::DetailOverlay;
use super::keybindings::Keybindings;
use super::list_view::CatalogListView;
use crate::catalog::{load_catalog, HttpCatalog, HttpImageProbe, LoadReport};
use crate::config::Settings;
use crate::layout::{GridMetrics, RenderPlan, RenderState};
use crate::models::LayoutMode;
use crate::nav::{Browser, Cursor, NavInput, Update};

/// Grid opacity while the detail overlay is open
const DIMMED_OPACITY: f64 = 0.35;

const HINTS: &str = "[hjkl/arrows] Navigate  [Enter] Details  [Esc] Close  [t] Layout";

/// Embedded stylesheet
const FALLBACK_CSS: &str = r#"
window {
    background-color: #0e0f13;
    color: #e8e8ea;
}

button {
    background-color: transparent;
    border: 1px solid #3a3b42;
    color: #e8e8ea;
}

button:hover {
    background-color: rgba(232, 232, 234, 0.06);
}

.collection-row {
    padding: 8px 24px;
}

.collection-title {
    font-size: 18px;
    font-weight: bold;
}

.collection-row.empty .collection-title {
    color: #6c6d75;
}

.tile {
    background-color: #1a1b21;
    border: 3px solid transparent;
    border-radius: 6px;
}

.tile.selected {
    border-color: #f2f2f2;
    background-color: #262730;
}

.tile-caption {
    background-color: rgba(0, 0, 0, 0.65);
    padding: 6px 8px;
}

.tile-title {
    font-weight: bold;
}

.tile-meta {
    font-size: 11px;
    color: #b5b6bd;
}

.detail-backdrop {
    background-color: rgba(0, 0, 0, 0.55);
}

.detail-panel {
    background-color: #16171c;
    border-radius: 8px;
}

.detail-body {
    padding: 16px 24px 24px 24px;
}

.detail-title {
    font-size: 24px;
    font-weight: bold;
}

.detail-facts, .detail-genres {
    color: #b5b6bd;
}

.detail-action {
    background-color: #f2f2f2;
    color: #0e0f13;
}

.status-bar {
    border-top: 1px solid #24252c;
}

.muted, .nav-hint {
    color: #8c8d95;
}
"#;

/// Load and apply the stylesheet
fn load_css() {
    let provider = CssProvider::new();
    provider.load_from_string(FALLBACK_CSS);

    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

/// Fetch and normalize the whole catalog. Runs on a background thread.
fn fetch_catalog(settings: &Settings) -> Result<LoadReport> {
    let catalog = HttpCatalog::new(settings.catalog_url.as_str(), settings.request_timeout)
        .context("Failed to create catalog client")?;
    let probe = Arc::new(HttpImageProbe::new(catalog.http().clone()));
    let runtime = TokioRuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(load_catalog(&catalog, probe, &settings.image_base)))
}

fn status_for_report(report: &LoadReport) -> String {
    if report.collections.is_empty() {
        return "> Catalog is empty".to_string();
    }
    let mut status = format!(
        "> {} collections, {} items",
        report.collections.len(),
        report.item_count()
    );
    if report.dropped_items > 0 {
        status.push_str(&format!(" ({} unavailable)", report.dropped_items));
    }
    status.push_str(&format!(" | loaded in {:.1}s", report.elapsed.as_secs_f32()));
    status
}

fn layout_button_label(layout: LayoutMode) -> String {
    format!("[layout: {}]", layout.label())
}

/// Main window for the catalog browser
pub struct MainWindow {
    self_weak: RefCell<Weak<MainWindow>>,
    window: ApplicationWindow,
    grid_box: GtkBox,
    list_view: Rc<CatalogListView>,
    detail: DetailOverlay,
    keybindings: Rc<Keybindings>,
    browser: RefCell<Browser>,
    render_state: RefCell<RenderState>,
    metrics: GridMetrics,
    settings: Settings,
    status_label: Label,
    layout_button: Button,
    last_layout_width: Cell<i32>,
}

impl MainWindow {
    pub fn new(app: &Application, settings: Settings) -> Rc<Self> {
        // Load CSS before creating widgets
        load_css();
        if let Some(gtk_settings) = GtkSettings::default() {
            gtk_settings.set_gtk_application_prefer_dark_theme(true);
        }

        let window = ApplicationWindow::builder()
            .application(app)
            .title("shelf")
            .default_width(1280)
            .default_height(800)
            .build();

        // Header with the layout toggle
        let header = GtkBox::new(Orientation::Horizontal, 8);
        header.add_css_class("header-bar");
        header.set_margin_start(24);
        header.set_margin_end(24);
        header.set_margin_top(8);
        header.set_margin_bottom(4);

        let source_label = Label::new(Some(settings.catalog_url.as_str()));
        source_label.set_halign(Align::Start);
        source_label.set_hexpand(true);
        source_label.set_ellipsize(gtk4::pango::EllipsizeMode::Start);
        source_label.add_css_class("muted");
        header.append(&source_label);

        let layout_button = Button::with_label(&layout_button_label(settings.layout));
        layout_button.set_tooltip_text(Some("Toggle layout (t)"));
        layout_button.set_can_focus(false);
        layout_button.add_css_class("btn-nav");
        header.append(&layout_button);

        let list_view = Rc::new(CatalogListView::new());
        list_view.widget().set_vexpand(true);
        list_view.widget().set_hexpand(true);

        // Status bar
        let status_bar = GtkBox::new(Orientation::Horizontal, 8);
        status_bar.add_css_class("status-bar");
        status_bar.set_margin_start(8);
        status_bar.set_margin_end(8);
        status_bar.set_margin_top(4);
        status_bar.set_margin_bottom(4);

        let status_label = Label::new(Some("> Starting"));
        status_label.set_halign(Align::Start);
        status_label.set_hexpand(true);
        status_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        status_label.add_css_class("muted");
        status_bar.append(&status_label);

        let hints_label = Label::new(Some(HINTS));
        hints_label.set_halign(Align::End);
        hints_label.add_css_class("nav-hint");
        status_bar.append(&hints_label);

        let grid_box = GtkBox::new(Orientation::Vertical, 0);
        grid_box.append(&header);
        grid_box.append(list_view.widget());

        // Overlay panel stacks above the grid
        let detail = DetailOverlay::new();
        let overlay = Overlay::new();
        overlay.set_child(Some(&grid_box));
        overlay.add_overlay(&detail.widget());
        overlay.set_vexpand(true);

        let content = GtkBox::new(Orientation::Vertical, 0);
        content.append(&overlay);
        content.append(&status_bar);
        window.set_child(Some(&content));

        let browser = Browser::new(settings.layout, settings.alignment);

        let main_window = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            grid_box,
            list_view,
            detail,
            keybindings: Rc::new(Keybindings::new()),
            browser: RefCell::new(browser),
            render_state: RefCell::new(RenderState::default()),
            metrics: GridMetrics::default(),
            settings,
            status_label,
            layout_button: layout_button.clone(),
            last_layout_width: Cell::new(0),
        });
        *main_window.self_weak.borrow_mut() = Rc::downgrade(&main_window);

        main_window.setup_keybindings();
        main_window.setup_layout_resize_observer();

        // Pointer toggle for the layout
        let window_weak = Rc::downgrade(&main_window);
        layout_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.handle_input(NavInput::ToggleLayout);
            }
        });

        // Mouse click selects a tile
        let window_weak = Rc::downgrade(&main_window);
        main_window.list_view.connect_tile_activated(move |cursor| {
            if let Some(window) = window_weak.upgrade() {
                window.select_tile(cursor);
            }
        });

        let window_weak = Rc::downgrade(&main_window);
        main_window.detail.connect_close(move || {
            if let Some(window) = window_weak.upgrade() {
                window.handle_input(NavInput::Dismiss);
            }
        });

        let window_weak = Rc::downgrade(&main_window);
        main_window.window.connect_close_request(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.teardown();
            }
            glib::Propagation::Proceed
        });

        main_window.load();
        main_window
    }

    /// Set up keybindings for the window
    fn setup_keybindings(self: &Rc<Self>) {
        self.keybindings.attach(&self.window);

        let window_weak = Rc::downgrade(self);
        self.keybindings.connect_input(move |input| {
            if let Some(window) = window_weak.upgrade() {
                window.handle_input(input);
            }
        });
    }

    fn setup_layout_resize_observer(self: &Rc<Self>) {
        let weak_self = Rc::downgrade(self);
        let scrolled = self.list_view.widget().clone();
        scrolled.add_tick_callback(move |_widget, _clock| {
            let Some(window) = weak_self.upgrade() else {
                return glib::ControlFlow::Break;
            };
            let width = window.list_view.content_width().round() as i32;
            if width > 0 && width != window.last_layout_width.get() {
                window.last_layout_width.set(width);
                window.update_visible_columns();
            }
            glib::ControlFlow::Continue
        });
    }

    fn update_visible_columns(&self) {
        let width = self.last_layout_width.get();
        if width <= 0 {
            return;
        }
        let mut browser = self.browser.borrow_mut();
        let columns = self.metrics.visible_columns(browser.layout(), width as f32);
        if columns != browser.selection().visible_columns() {
            tracing::debug!(width, columns, "Visible columns changed");
            browser.set_visible_columns(columns);
        }
    }

    /// Start loading the catalog in the background
    pub fn load(&self) {
        let generation = self.browser.borrow_mut().begin_loading();
        self.set_status(&format!("> Loading {}", self.settings.catalog_url));

        let settings = self.settings.clone();
        let (tx, rx) = flume::bounded::<(u64, LoadReport)>(1);
        std::thread::spawn(move || {
            let report = fetch_catalog(&settings).unwrap_or_else(|err| {
                tracing::warn!("Catalog load failed: {:#}", err);
                LoadReport {
                    collections: Vec::new(),
                    dropped_items: 0,
                    elapsed: Duration::ZERO,
                }
            });
            let _ = tx.send((generation, report));
        });

        let weak_self = self.self_weak.borrow().clone();
        glib::timeout_add_local(Duration::from_millis(16), move || match rx.try_recv() {
            Ok((result_generation, report)) => {
                if let Some(window) = weak_self.upgrade() {
                    window.apply_load_result(result_generation, report);
                }
                glib::ControlFlow::Break
            }
            Err(flume::TryRecvError::Empty) => {
                if weak_self.strong_count() == 0 {
                    glib::ControlFlow::Break
                } else {
                    glib::ControlFlow::Continue
                }
            }
            Err(flume::TryRecvError::Disconnected) => glib::ControlFlow::Break,
        });
    }

    fn apply_load_result(&self, generation: u64, report: LoadReport) {
        let status = status_for_report(&report);
        let update = self.browser.borrow_mut().finish_loading(generation, report);
        if update == Update::None {
            return;
        }
        self.set_status(&status);
        self.update_visible_columns();
        self.render_state.borrow_mut().invalidate();
        self.apply_update(update);
    }

    fn handle_input(&self, input: NavInput) {
        let update = self.browser.borrow_mut().handle(input);
        self.apply_update(update);
    }

    fn select_tile(&self, cursor: Cursor) {
        let update = self.browser.borrow_mut().select(cursor);
        self.apply_update(update);
    }

    fn apply_update(&self, update: Update) {
        match update {
            Update::None => {}
            Update::Reselect(change) => {
                self.sync_grid();
                self.scroll_to(change.to);
                self.update_status_for_selection();
            }
            Update::Rerender => {
                let layout = self.browser.borrow().layout();
                self.layout_button.set_label(&layout_button_label(layout));
                self.update_visible_columns();
                self.sync_grid();
                if let Some(cursor) = self.browser.borrow().cursor() {
                    self.scroll_to(cursor);
                }
            }
            Update::OverlayOpened(view) => {
                self.detail.show(&view);
                self.grid_box.set_opacity(DIMMED_OPACITY);
            }
            Update::OverlayClosed => {
                self.detail.hide();
                self.grid_box.set_opacity(1.0);
            }
        }
    }

    /// Bring the widgets in line with the browser state, replacing rows
    /// only when the structure or layout changed.
    fn sync_grid(&self) {
        let browser = self.browser.borrow();
        let plan = self.render_state.borrow_mut().plan(
            browser.collections(),
            browser.cursor(),
            browser.layout(),
        );

        match plan {
            RenderPlan::Unchanged => {}
            RenderPlan::Reselect { from, to } => {
                if let Some(from) = from {
                    self.list_view.set_tile_selected(from, false);
                }
                if let Some(to) = to {
                    self.list_view.set_tile_selected(to, true);
                }
            }
            RenderPlan::Replace => {
                let selection = browser.selection();
                let first_columns: Vec<usize> = (0..selection.row_count())
                    .map(|row| selection.row_offset(row))
                    .collect();
                self.list_view.set_rows(browser.grid(), &first_columns);
                tracing::debug!(rows = self.list_view.row_count(), "Grid re-rendered");
            }
        }
    }

    fn scroll_to(&self, cursor: Cursor) {
        let first_column = self.browser.borrow().selection().row_offset(cursor.row);
        self.list_view
            .scroll_to_tile(cursor, first_column, &self.metrics);
    }

    fn update_status_for_selection(&self) {
        let browser = self.browser.borrow();
        let (Some(cursor), Some(item)) = (browser.cursor(), browser.selected_item()) else {
            return;
        };
        let collection = browser
            .collections()
            .get(cursor.row)
            .map(|c| c.title.as_str())
            .unwrap_or_default();
        self.set_status(&format!(
            "> {} / {} [{}/{}]",
            collection,
            item.title,
            cursor.col + 1,
            browser.selection().row_len(cursor.row)
        ));
    }

    /// Stop input and drop any load still in flight
    fn teardown(&self) {
        self.browser.borrow_mut().teardown();
        self.keybindings.detach();
        self.keybindings.disconnect_input();
    }

    pub fn present(&self) {
        self.window.present();
    }

    /// Set status bar text
    pub fn set_status(&self, status: &str) {
        self.status_label.set_text(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Collection;

    #[test]
    fn test_fallback_css_has_selection_style() {
        assert!(!FALLBACK_CSS.is_empty());
        assert!(FALLBACK_CSS.contains(".tile.selected"));
        assert!(FALLBACK_CSS.contains(".detail-backdrop"));
    }

    #[test]
    fn status_reports_counts_and_drops() {
        let report = LoadReport {
            collections: vec![Collection::skeleton(
                "c".to_string(),
                "C".to_string(),
                "/c".to_string(),
                "dark".to_string(),
            )],
            dropped_items: 3,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            status_for_report(&report),
            "> 1 collections, 0 items (3 unavailable) | loaded in 1.5s"
        );

        let empty = LoadReport {
            collections: Vec::new(),
            dropped_items: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(status_for_report(&empty), "> Catalog is empty");
    }

    #[test]
    fn layout_label_names_mode() {
        assert_eq!(layout_button_label(LayoutMode::Vertical), "[layout: vertical]");
    }
}
