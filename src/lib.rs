mod app;
pub mod commands;
pub mod config;
mod redact;
pub mod session;
pub mod settings;
pub mod state;
pub mod store;
pub mod theme;
pub mod types;

pub fn run() {
    app::run();
}
