//! Theme selection and palette derivation.
//!
//! The palette is never stored. It is recomputed from `(mode, appearance)`
//! every time someone asks, so it cannot drift from its inputs.

use crate::types::{Appearance, ThemeMode, ThemeState};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: &'static str,
    pub primary_transparent: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub background_darker: &'static str,
    pub background_transparent: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub text_light: &'static str,
    pub border: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
}

pub const LIGHT_PALETTE: Palette = Palette {
    primary: "#0066CC",
    primary_transparent: "rgba(0, 102, 204, 0.1)",
    secondary: "#00CC99",
    accent: "#FF6600",
    background: "#F7F9FC",
    background_darker: "#E5E9F0",
    background_transparent: "rgba(0, 0, 0, 0.4)",
    card: "#FFFFFF",
    text: "#2E3440",
    text_secondary: "#4C566A",
    text_light: "#FFFFFF",
    border: "#E5E9F0",
    success: "#4CAF50",
    warning: "#FFA600",
    error: "#FF3B30",
};

pub const DARK_PALETTE: Palette = Palette {
    primary: "#4D9DFF",
    primary_transparent: "rgba(77, 157, 255, 0.1)",
    secondary: "#00E5AD",
    accent: "#FF7E33",
    background: "#1E2229",
    background_darker: "#171A1F",
    background_transparent: "rgba(0, 0, 0, 0.6)",
    card: "#2E343D",
    text: "#ECEFF4",
    text_secondary: "#8E99AB",
    text_light: "#FFFFFF",
    border: "#393F4A",
    success: "#5BD75B",
    warning: "#FFB84D",
    error: "#FF6961",
};

pub fn is_dark(mode: ThemeMode, appearance: Appearance) -> bool {
    match mode {
        ThemeMode::Dark => true,
        ThemeMode::Light => false,
        ThemeMode::System => appearance == Appearance::Dark,
    }
}

pub fn resolve_palette(mode: ThemeMode, appearance: Appearance) -> &'static Palette {
    if is_dark(mode, appearance) {
        &DARK_PALETTE
    } else {
        &LIGHT_PALETTE
    }
}

/// The platform side of system appearance: the host pushes the current
/// scheme in, theme managers read and watch it.
#[derive(Clone)]
pub struct AppearanceSource {
    tx: Arc<watch::Sender<Appearance>>,
}

impl AppearanceSource {
    pub fn new(initial: Appearance) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Appearance {
        *self.tx.borrow()
    }

    /// Notifies only when the scheme actually changes.
    pub fn set(&self, appearance: Appearance) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == appearance {
                false
            } else {
                *current = appearance;
                true
            }
        });
        if changed {
            tracing::debug!(?appearance, "system appearance changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Appearance> {
        self.tx.subscribe()
    }
}

impl Default for AppearanceSource {
    fn default() -> Self {
        Self::new(Appearance::default())
    }
}

pub struct ThemeManager {
    mode: watch::Sender<ThemeMode>,
    appearance: watch::Receiver<Appearance>,
}

impl ThemeManager {
    pub fn new(initial: ThemeMode, appearance: &AppearanceSource) -> Self {
        let (mode, _) = watch::channel(initial);
        Self {
            mode,
            appearance: appearance.subscribe(),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        *self.mode.borrow()
    }

    pub fn appearance(&self) -> Appearance {
        *self.appearance.borrow()
    }

    pub fn set_mode(&self, mode: ThemeMode) {
        self.mode.send_replace(mode);
        tracing::debug!(mode = mode.as_str(), "theme mode set");
    }

    /// The settings switch: dark goes to light, anything else goes to dark.
    pub fn toggle(&self) -> ThemeMode {
        let next = match self.mode() {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light | ThemeMode::System => ThemeMode::Dark,
        };
        self.set_mode(next);
        next
    }

    pub fn is_dark(&self) -> bool {
        is_dark(self.mode(), self.appearance())
    }

    pub fn palette(&self) -> &'static Palette {
        resolve_palette(self.mode(), self.appearance())
    }

    pub fn state(&self) -> ThemeState {
        let mode = self.mode();
        let appearance = self.appearance();
        ThemeState {
            mode,
            is_dark: is_dark(mode, appearance),
            colors: *resolve_palette(mode, appearance),
        }
    }

    pub fn subscribe(&self) -> ThemeObserver {
        ThemeObserver {
            mode: self.mode.subscribe(),
            appearance: self.appearance.clone(),
        }
    }
}

/// Wakes whenever either input of the palette changes.
pub struct ThemeObserver {
    mode: watch::Receiver<ThemeMode>,
    appearance: watch::Receiver<Appearance>,
}

impl ThemeObserver {
    /// Errors once the manager or the appearance source is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        tokio::select! {
            result = self.mode.changed() => result,
            result = self.appearance.changed() => result,
        }
    }

    pub fn palette(&mut self) -> &'static Palette {
        let mode = *self.mode.borrow_and_update();
        let appearance = *self.appearance.borrow_and_update();
        resolve_palette(mode, appearance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];
    const APPEARANCES: [Appearance; 2] = [Appearance::Light, Appearance::Dark];

    #[test]
    fn system_mode_mirrors_appearance() {
        for other in APPEARANCES {
            assert_eq!(
                resolve_palette(ThemeMode::System, Appearance::Dark),
                resolve_palette(ThemeMode::Dark, other)
            );
            assert_eq!(
                resolve_palette(ThemeMode::System, Appearance::Light),
                resolve_palette(ThemeMode::Light, other)
            );
        }
    }

    #[test]
    fn explicit_mode_overrides_system() {
        assert_eq!(resolve_palette(ThemeMode::Dark, Appearance::Light), &DARK_PALETTE);
        assert_eq!(resolve_palette(ThemeMode::Light, Appearance::Dark), &LIGHT_PALETTE);
    }

    #[test]
    fn resolution_is_deterministic() {
        for mode in MODES {
            for appearance in APPEARANCES {
                assert_eq!(
                    resolve_palette(mode, appearance),
                    resolve_palette(mode, appearance)
                );
                assert_eq!(
                    is_dark(mode, appearance),
                    resolve_palette(mode, appearance) == &DARK_PALETTE
                );
            }
        }
    }

    #[test]
    fn palette_serializes_with_camel_case_roles() {
        let json = serde_json::to_value(DARK_PALETTE).unwrap();
        assert_eq!(json["primary"], "#4D9DFF");
        assert_eq!(json["textSecondary"], "#8E99AB");
        assert_eq!(json["backgroundDarker"], "#171A1F");
    }

    #[test]
    fn manager_recomputes_on_every_read() {
        let source = AppearanceSource::new(Appearance::Light);
        let theme = ThemeManager::new(ThemeMode::System, &source);
        assert!(!theme.is_dark());
        assert_eq!(theme.palette(), &LIGHT_PALETTE);

        source.set(Appearance::Dark);
        assert!(theme.is_dark());
        assert_eq!(theme.palette(), &DARK_PALETTE);

        theme.set_mode(ThemeMode::Light);
        assert_eq!(theme.palette(), &LIGHT_PALETTE);
        assert_eq!(theme.state().colors, LIGHT_PALETTE);
    }

    #[test]
    fn toggle_flips_between_dark_and_light() {
        let source = AppearanceSource::default();
        let theme = ThemeManager::new(ThemeMode::Dark, &source);
        assert_eq!(theme.toggle(), ThemeMode::Light);
        assert_eq!(theme.toggle(), ThemeMode::Dark);

        theme.set_mode(ThemeMode::System);
        assert_eq!(theme.toggle(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn observer_wakes_on_mode_and_appearance_changes() {
        let source = AppearanceSource::new(Appearance::Light);
        let theme = ThemeManager::new(ThemeMode::System, &source);
        let mut observer = theme.subscribe();
        assert_eq!(observer.palette(), &LIGHT_PALETTE);

        source.set(Appearance::Dark);
        observer.changed().await.unwrap();
        assert_eq!(observer.palette(), &DARK_PALETTE);

        theme.set_mode(ThemeMode::Light);
        observer.changed().await.unwrap();
        assert_eq!(observer.palette(), &LIGHT_PALETTE);
    }

    #[test]
    fn unchanged_appearance_does_not_notify() {
        let source = AppearanceSource::new(Appearance::Dark);
        let mut rx = source.subscribe();
        source.set(Appearance::Dark);
        assert!(!rx.has_changed().unwrap());
        source.set(Appearance::Light);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Appearance::Light);
    }
}
