use gtk4::prelude::*;
use gtk4::Application;

use crate::config::Settings;
use crate::ui::MainWindow;

const APP_ID: &str = "com.shelf.CatalogBrowser";

pub struct ShelfApp {
    app: Application,
}

impl ShelfApp {
    pub fn new(settings: Settings) -> Self {
        let app = Application::builder().application_id(APP_ID).build();

        app.connect_activate(move |app| Self::on_activate(app, settings.clone()));

        Self { app }
    }

    pub fn run(&self) -> i32 {
        // Arguments are consumed by Settings; GTK only sees the program name.
        let program = std::env::args().next().unwrap_or_default();
        self.app.run_with_args(&[program]).into()
    }

    fn on_activate(app: &Application, settings: Settings) {
        let window = MainWindow::new(app, settings);
        window.present();
        // Keep the window alive by storing it on the Application.
        unsafe {
            app.set_data("main-window", window);
        }
    }
}
