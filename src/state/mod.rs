mod app_state;

pub use app_state::{route_for, AppState};
