use crate::settings::{
    KEY_AUTO_RECORDING_ENABLED, KEY_HIGH_QUALITY_ENABLED, KEY_MOTION_DETECTION_ENABLED,
    KEY_NIGHT_VISION_ENABLED, KEY_NOTIFICATIONS_ENABLED, KEY_REMEMBER_THEME, KEY_THEME_MODE,
};
use crate::state::AppState;
use crate::types::{
    IpcErrorCode, IpcResult, SaveSettingsPayload, SettingsState, ThemeMode, ThemeState,
};

/// Writes the current mode to settings when the user asked to remember it.
async fn remember_theme_if_enabled(state: &AppState) {
    if !state.settings.remember_theme() {
        return;
    }
    state
        .settings
        .set(KEY_THEME_MODE, state.theme.mode().as_str());
    if let Err(err) = state.settings.persist().await {
        tracing::warn!(error = %err, "failed to remember theme");
    }
}

pub fn theme_get_state(state: &AppState) -> IpcResult<ThemeState> {
    IpcResult::ok(state.theme.state())
}

pub async fn theme_set_mode(state: &AppState, mode: ThemeMode) -> IpcResult<ThemeState> {
    state.theme.set_mode(mode);
    remember_theme_if_enabled(state).await;
    IpcResult::ok(state.theme.state())
}

pub async fn theme_toggle(state: &AppState) -> IpcResult<ThemeState> {
    state.theme.toggle();
    remember_theme_if_enabled(state).await;
    IpcResult::ok(state.theme.state())
}

pub fn settings_get_state(state: &AppState) -> IpcResult<SettingsState> {
    IpcResult::ok(state.settings_state())
}

pub async fn settings_save(
    state: &AppState,
    payload: SaveSettingsPayload,
) -> IpcResult<SettingsState> {
    state
        .settings
        .set(KEY_NOTIFICATIONS_ENABLED, payload.notifications_enabled);
    state
        .settings
        .set(KEY_MOTION_DETECTION_ENABLED, payload.motion_detection_enabled);
    state
        .settings
        .set(KEY_NIGHT_VISION_ENABLED, payload.night_vision_enabled);
    state
        .settings
        .set(KEY_AUTO_RECORDING_ENABLED, payload.auto_recording_enabled);
    state
        .settings
        .set(KEY_HIGH_QUALITY_ENABLED, payload.high_quality_enabled);
    state
        .settings
        .set(KEY_REMEMBER_THEME, payload.remember_theme);

    if payload.remember_theme {
        state
            .settings
            .set(KEY_THEME_MODE, state.theme.mode().as_str());
    } else {
        state.settings.remove(KEY_THEME_MODE);
    }

    if let Err(err) = state.settings.persist().await {
        tracing::warn!(error = %err, "failed to save settings");
        return IpcResult::err(
            IpcErrorCode::Keyring,
            "Failed to save settings to secure storage.",
        );
    }

    IpcResult::ok(state.settings_state())
}
