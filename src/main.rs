mod app;
mod catalog;
mod config;
mod image_loader;
mod layout;
mod models;
mod nav;
mod ui;

use app::ShelfApp;
use config::Settings;

fn main() {
    // Prefer C numeric locale up-front; GTK may later adjust locale again.
    std::env::set_var("LC_NUMERIC", "C");
    unsafe {
        libc::setlocale(libc::LC_NUMERIC, b"C\0".as_ptr().cast());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shelf=info".parse().unwrap()),
        )
        .init();

    let settings = Settings::from_env(std::env::args().nth(1));
    tracing::info!(
        catalog = %settings.catalog_url,
        layout = settings.layout.label(),
        alignment = ?settings.alignment,
        "Starting shelf"
    );

    let app = ShelfApp::new(settings);
    std::process::exit(app.run());
}
