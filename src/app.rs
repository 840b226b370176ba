use crate::commands;
use crate::config::AppConfig;
use crate::state::AppState;
use crate::theme::AppearanceSource;
use crate::types::{Appearance, IpcResult};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "camwatch=info,camwatch_lib=info";
const ENV_APPEARANCE: &str = "CAMWATCH_APPEARANCE";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// What the host reports before any platform observer is attached.
fn host_appearance() -> Appearance {
    match std::env::var(ENV_APPEARANCE).as_deref().map(str::trim) {
        Ok("dark") => Appearance::Dark,
        _ => Appearance::Light,
    }
}

async fn boot(config: AppConfig) {
    let state = AppState::new(config, AppearanceSource::new(host_appearance()));
    state.start().await;

    if let IpcResult::Ok { value: auth, .. } = commands::auth_get_state(&state).await {
        match auth.user {
            Some(user) => tracing::info!(
                name = %user.display_name,
                role = user.role.label(),
                "welcome back"
            ),
            None => tracing::info!("sign in required"),
        }
    }

    let theme = state.theme.state();
    tracing::info!(
        route = ?state.route(),
        mode = theme.mode.as_str(),
        dark = theme.is_dark,
        primary = theme.colors.primary,
        background = theme.colors.background,
        "ready"
    );
}

fn try_run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(boot(config));
    Ok(())
}

pub fn run() {
    init_tracing();
    if let Err(err) = try_run() {
        tracing::error!(error = %err, "camwatch failed to start");
        std::process::exit(1);
    }
}
