use crate::config::AppConfig;
use crate::session::{Authenticator, SessionManager, SessionState, SimulatedAuthenticator};
use crate::settings::{
    SettingsStore, KEY_AUTO_RECORDING_ENABLED, KEY_HIGH_QUALITY_ENABLED,
    KEY_MOTION_DETECTION_ENABLED, KEY_NIGHT_VISION_ENABLED, KEY_NOTIFICATIONS_ENABLED,
};
use crate::store::{KeyValueStore, SecureKeyValueStore};
use crate::theme::{AppearanceSource, ThemeManager};
use crate::types::{AuthState, Route, SettingsState};
use std::sync::Arc;
use std::time::Duration;

pub fn route_for(state: &SessionState) -> Route {
    match state {
        SessionState::Loading => Route::Splash,
        SessionState::SignedOut => Route::Login,
        SessionState::SignedIn(_) => Route::Tabs,
    }
}

/// Everything the view layer talks to, built once and passed down.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<SecureKeyValueStore>,
    pub session: Arc<SessionManager>,
    pub theme: Arc<ThemeManager>,
    pub appearance: AppearanceSource,
    pub settings: SettingsStore,
}

impl AppState {
    pub fn new(config: AppConfig, appearance: AppearanceSource) -> Self {
        let store = Arc::new(SecureKeyValueStore::new(
            config.backing,
            config.keyring_service.clone(),
        ));
        let auth = Arc::new(SimulatedAuthenticator::new(Duration::from_millis(
            config.auth_delay_ms,
        )));
        Self::with_parts(config, store, auth, appearance)
    }

    pub fn with_parts(
        config: AppConfig,
        store: Arc<SecureKeyValueStore>,
        auth: Arc<dyn Authenticator>,
        appearance: AppearanceSource,
    ) -> Self {
        let kv: Arc<dyn KeyValueStore> = store.clone();
        let session = SessionManager::new(kv.clone(), auth)
            .with_session_key(config.session_key.clone())
            .with_ttl(config.session_ttl());
        let theme = ThemeManager::new(config.default_theme, &appearance);
        let settings = SettingsStore::new(kv, config.settings_key.clone());

        Self {
            config: Arc::new(config),
            store,
            session: Arc::new(session),
            theme: Arc::new(theme),
            appearance,
            settings,
        }
    }

    /// Rehydrates the session and loads settings side by side, then applies a
    /// remembered theme if there is one.
    pub async fn start(&self) -> SessionState {
        let (session, settings) = tokio::join!(self.session.initialize(), self.settings.load());
        if let Err(err) = settings {
            tracing::warn!(error = %err, "settings unavailable, using defaults");
        }
        if let Some(mode) = self.settings.theme_mode() {
            self.theme.set_mode(mode);
        }
        tracing::info!(
            route = ?route_for(&session),
            theme = self.theme.mode().as_str(),
            backing = ?self.store.backing_kind(),
            "app state ready"
        );
        session
    }

    pub fn route(&self) -> Route {
        route_for(&self.session.state())
    }

    pub fn auth_state(&self) -> AuthState {
        let state = self.session.state();
        AuthState {
            is_loading: matches!(state, SessionState::Loading),
            is_authenticated: matches!(state, SessionState::SignedIn(_)),
            user: state.user().cloned(),
        }
    }

    pub fn settings_state(&self) -> SettingsState {
        SettingsState {
            notifications_enabled: self.settings.get_bool(KEY_NOTIFICATIONS_ENABLED, true),
            motion_detection_enabled: self.settings.get_bool(KEY_MOTION_DETECTION_ENABLED, true),
            night_vision_enabled: self.settings.get_bool(KEY_NIGHT_VISION_ENABLED, true),
            auto_recording_enabled: self.settings.get_bool(KEY_AUTO_RECORDING_ENABLED, true),
            high_quality_enabled: self.settings.get_bool(KEY_HIGH_QUALITY_ENABLED, true),
            remember_theme: self.settings.remember_theme(),
            secure_storage_durable: self
                .store
                .backing_kind()
                .is_some_and(|kind| kind.is_durable()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{KEY_REMEMBER_THEME, KEY_THEME_MODE};
    use crate::store::{BackingKind, MemoryStore};
    use crate::types::{Appearance, ThemeMode};

    fn test_state(backing: &MemoryStore) -> AppState {
        let store = Arc::new(SecureKeyValueStore::with_backing(
            BackingKind::Memory,
            Arc::new(backing.clone()),
        ));
        AppState::with_parts(
            AppConfig::default(),
            store,
            Arc::new(SimulatedAuthenticator::new(Duration::ZERO)),
            AppearanceSource::new(Appearance::Light),
        )
    }

    #[tokio::test]
    async fn route_follows_session_lifecycle() {
        let state = test_state(&MemoryStore::new());
        assert_eq!(state.route(), Route::Splash);
        assert!(state.auth_state().is_loading);

        state.start().await;
        assert_eq!(state.route(), Route::Login);

        state.session.sign_in("a@b.com", "pw").await.unwrap();
        assert_eq!(state.route(), Route::Tabs);
        let auth = state.auth_state();
        assert!(auth.is_authenticated);
        assert_eq!(auth.user.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn restart_restores_session_and_remembered_theme() {
        let backing = MemoryStore::new();
        let first = test_state(&backing);
        first.start().await;
        first.session.sign_in("a@b.com", "pw").await.unwrap();
        first.settings.set(KEY_REMEMBER_THEME, true);
        first.settings.set(KEY_THEME_MODE, "system");
        first.settings.persist().await.unwrap();

        let second = test_state(&backing);
        assert_eq!(second.theme.mode(), ThemeMode::Dark);
        second.start().await;
        assert_eq!(second.route(), Route::Tabs);
        assert_eq!(second.theme.mode(), ThemeMode::System);
        assert!(!second.theme.is_dark());
    }

    #[tokio::test]
    async fn theme_is_not_persisted_without_opt_in() {
        let backing = MemoryStore::new();
        let first = test_state(&backing);
        first.start().await;
        first.theme.set_mode(ThemeMode::Light);

        let second = test_state(&backing);
        second.start().await;
        assert_eq!(second.theme.mode(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn in_memory_backing_is_reported_as_not_durable() {
        let state = test_state(&MemoryStore::new());
        state.start().await;
        assert!(!state.settings_state().secure_storage_durable);
        assert!(state.settings_state().night_vision_enabled);
    }
}
