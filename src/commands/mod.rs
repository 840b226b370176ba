//! Calls the view layer makes. Every command settles with an [`IpcResult`]
//! the shell can render directly; none of them panic or leave state half
//! updated.
//!
//! [`IpcResult`]: crate::types::IpcResult

mod auth;
mod settings;

pub use auth::{auth_get_state, auth_sign_in, auth_sign_out};
pub use settings::{
  settings_get_state, settings_save, theme_get_state, theme_set_mode, theme_toggle,
};
