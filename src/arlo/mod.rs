//! Arlo device session.
//!
//! The CLI talks to devices only through the [`Session`] trait. [`ArloClient`]
//! is the production implementation; tests substitute their own.

mod client;
mod device;
mod state;

pub use client::{secure_stream_url, ArloClient, SessionSettings, ARLO_API_BASE_URL};
pub use device::{Device, DeviceKind, DeviceProperties};
pub use state::StateDir;

use crate::config::Options;
use crate::error::AppError;

/// Errors raised by the device session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("login rejected: {0}")]
    Auth(String),

    #[error("{request} returned HTTP {status}")]
    Status { request: String, status: u16 },

    #[error("API error: {0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// An authenticated handle to the account's devices.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// All devices, in the order the service returned them.
    fn devices(&self) -> &[Device];

    /// Request a live stream URL for `camera`. `Ok(None)` means the service
    /// declined without an error.
    async fn start_stream(&self, camera: &Device) -> Result<Option<String>, SessionError>;

    fn devices_of(&self, kind: DeviceKind) -> Vec<&Device> {
        self.devices().iter().filter(|d| d.is(kind)).collect()
    }

    /// First camera whose name or device id matches, ignoring case.
    fn find_camera(&self, name: Option<&str>, device_id: Option<&str>) -> Option<&Device> {
        self.devices()
            .iter()
            .filter(|d| d.is(DeviceKind::Camera))
            .find(|d| d.matches(name, device_id))
    }
}

/// Open a session with the credentials in `options`.
///
/// # Errors
///
/// `AppError::MissingCredentials` when either the username or the password is
/// unset (nothing is contacted), or `AppError::Session` when login fails.
pub async fn login(options: &Options) -> Result<ArloClient, AppError> {
    log::info!("logging in");
    let (Some(username), Some(password)) = (&options.username, &options.password) else {
        return Err(AppError::MissingCredentials);
    };

    let settings = SessionSettings {
        username: username.clone(),
        password: password.clone(),
        base_url: options.api_base_url.clone(),
        storage_dir: options.storage_dir.clone(),
        save_state: options.save_state,
        dump_packets: options.dump_packets,
    };
    Ok(ArloClient::connect(settings).await?)
}
