use crate::session::{AuthError, SessionError};
use crate::state::AppState;
use crate::types::{AuthState, IpcErrorCode, IpcResult, SignInPayload};

fn session_error<T>(err: &SessionError) -> IpcResult<T> {
  match err {
    SessionError::Validation => IpcResult::err(IpcErrorCode::Validation, err.to_string()),
    SessionError::Auth(AuthError::InvalidCredentials) => {
      IpcResult::err(IpcErrorCode::Unauthorized, err.to_string())
    }
    SessionError::Auth(AuthError::Unreachable(_)) => {
      IpcResult::err(IpcErrorCode::Unknown, "Login failed. Please try again.")
    }
    SessionError::Store(_) => IpcResult::err(
      IpcErrorCode::Keyring,
      "Failed to store session in secure storage.",
    ),
    SessionError::NotReady => IpcResult::err(IpcErrorCode::NotReady, err.to_string()),
    SessionError::Cancelled => IpcResult::err(IpcErrorCode::Cancelled, err.to_string()),
  }
}

pub async fn auth_get_state(state: &AppState) -> IpcResult<AuthState> {
  IpcResult::ok(state.auth_state())
}

pub async fn auth_sign_in(state: &AppState, payload: SignInPayload) -> IpcResult<AuthState> {
  match state.session.sign_in(&payload.email, &payload.password).await {
    Ok(_) => IpcResult::ok(state.auth_state()),
    Err(err) => session_error(&err),
  }
}

/// Reports the signed-out state even when the stored record could not be
/// removed; the manager has already logged that failure.
pub async fn auth_sign_out(state: &AppState) -> IpcResult<AuthState> {
  match state.session.sign_out().await {
    Ok(()) | Err(SessionError::Store(_)) => IpcResult::ok(state.auth_state()),
    Err(err) => session_error(&err),
  }
}
