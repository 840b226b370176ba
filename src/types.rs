use crate::theme::Palette;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Operator,
    Viewer,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Operator => "Operator",
            Self::Viewer => "Viewer",
        }
    }
}

/// The signed-in user. Field names on the wire are the ones the app has
/// always persisted (`id`, `email`, `name`, `role`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: String,
    pub email: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// What the platform reports as its current color scheme.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Splash,
    Login,
    Tabs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IpcErrorCode {
    Validation,
    Unauthorized,
    Keyring,
    NotReady,
    Cancelled,
    Unknown,
}

impl IpcErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Keyring => "keyring",
            Self::NotReady => "not_ready",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl From<IpcErrorCode> for String {
    fn from(code: IpcErrorCode) -> Self {
        code.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpcResult<T> {
    Ok { ok: bool, value: T },
    Err { ok: bool, error: IpcError },
}

impl<T> IpcResult<T> {
    pub fn ok(value: T) -> Self {
        Self::Ok { ok: true, value }
    }

    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Err {
            ok: false,
            error: IpcError {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ok { value, .. } => Some(value),
            Self::Err { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&IpcError> {
        match self {
            Self::Ok { .. } => None,
            Self::Err { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user: Option<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub is_dark: bool,
    pub colors: Palette,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsState {
    pub notifications_enabled: bool,
    pub motion_detection_enabled: bool,
    pub night_vision_enabled: bool,
    pub auto_recording_enabled: bool,
    pub high_quality_enabled: bool,
    pub remember_theme: bool,
    pub secure_storage_durable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsPayload {
    pub notifications_enabled: bool,
    pub motion_detection_enabled: bool,
    pub night_vision_enabled: bool,
    pub auto_recording_enabled: bool,
    pub high_quality_enabled: bool,
    pub remember_theme: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_uses_persisted_field_names() {
        let session = Session {
            user_id: "1".to_string(),
            email: "a@b.com".to_string(),
            display_name: "John Doe".to_string(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["name"], "John Doe");
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn ipc_result_serializes_ok_flag() {
        let ok = serde_json::to_value(IpcResult::ok(5)).unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["value"], 5);

        let err = serde_json::to_value(IpcResult::<()>::err(IpcErrorCode::NotReady, "wait")).unwrap();
        assert_eq!(err["ok"], false);
        assert_eq!(err["error"]["code"], "not_ready");
    }

    #[test]
    fn theme_mode_parse_is_case_insensitive() {
        assert_eq!(ThemeMode::parse("SYSTEM"), Some(ThemeMode::System));
        assert_eq!(ThemeMode::parse("sepia"), None);
    }
}
