#![allow(non_snake_case)]

mod app;
mod components;
mod interop;
mod scene;

use tracing::Level;

fn main() {
    // A second init (hot reload) fails harmlessly
    let _ = dioxus_logger::init(Level::INFO);
    dioxus::launch(app::App);
}
