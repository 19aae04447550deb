//! Keychain operations for session storage.
//!
//! Uses the `keyring` crate over the native credential store (macOS
//! Keychain, Windows Credential Manager, Linux keyutils). Access tokens are
//! stored per username, never on disk, so separate CLI invocations share
//! the session the way browser tabs share localStorage.

use keyring::Entry;
use thiserror::Error;

/// Credential store service name for all taskdeck entries.
const SERVICE_NAME: &str = "com.taskdeck.cli";

/// Special username for storing the active session's username.
const CURRENT_USER_KEY: &str = "current_user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("keychain operation failed: {0}")]
    OperationFailed(String),
}

impl From<keyring::Error> for SessionError {
    fn from(err: keyring::Error) -> Self {
        SessionError::OperationFailed(err.to_string())
    }
}

/// Store an access token for the given username.
pub fn store_access_token(username: &str, token: &str) -> Result<(), SessionError> {
    let entry = Entry::new(SERVICE_NAME, username)?;
    entry.set_password(token)?;
    Ok(())
}

/// Retrieve the stored access token for the given username.
///
/// Returns `None` if no entry exists (user never logged in or was logged out).
pub fn get_access_token(username: &str) -> Result<Option<String>, SessionError> {
    let entry = Entry::new(SERVICE_NAME, username)?;
    match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(SessionError::from(e)),
    }
}

/// Delete the stored access token for the given username.
///
/// Idempotent: ignores `NoEntry` (already deleted or never stored).
pub fn delete_access_token(username: &str) -> Result<(), SessionError> {
    let entry = Entry::new(SERVICE_NAME, username)?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(SessionError::from(e)),
    }
}

/// Record which user owns the active session, so the next CLI invocation
/// knows whose token to load.
pub fn store_current_username(username: &str) -> Result<(), SessionError> {
    let entry = Entry::new(SERVICE_NAME, CURRENT_USER_KEY)?;
    entry.set_password(username)?;
    Ok(())
}

/// Retrieve the active session's username.
///
/// Returns `None` if nobody is logged in.
pub fn get_current_username() -> Result<Option<String>, SessionError> {
    let entry = Entry::new(SERVICE_NAME, CURRENT_USER_KEY)?;
    match entry.get_password() {
        Ok(username) => Ok(Some(username)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(SessionError::from(e)),
    }
}

/// Forget the active session's username.
///
/// Idempotent: ignores `NoEntry`.
pub fn clear_current_username() -> Result<(), SessionError> {
    let entry = Entry::new(SERVICE_NAME, CURRENT_USER_KEY)?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(SessionError::from(e)),
    }
}
