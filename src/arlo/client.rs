//! ArloClient - the thin adapter to the Arlo web API.
//!
//! Only the calls the CLI needs are made: one credential login, one device
//! list fetch, and start-stream requests. Tokens are never refreshed and
//! nothing is retried.

use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Device, Session, SessionError, StateDir};

/// Default base URL for the Arlo web API.
pub const ARLO_API_BASE_URL: &str = "https://my.arlo.com/hmsweb";

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const LOGIN_PATH: &str = "/login/v2";
const DEVICES_PATH: &str = "/users/devices";
const START_STREAM_PATH: &str = "/users/devices/startStream";

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub username: String,
    pub password: String,
    pub base_url: String,
    pub storage_dir: PathBuf,
    pub save_state: bool,
    pub dump_packets: bool,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    token: String,
    user_id: String,
}

/// Common wrapper around every Arlo response body.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

impl ApiResponse {
    fn into_data<T: DeserializeOwned>(self) -> Result<T, SessionError> {
        Ok(serde_json::from_value(self.data)?)
    }

    /// Human-readable reason from an unsuccessful response.
    fn reason(&self) -> String {
        self.data
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.data.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartStreamRequest<'a> {
    to: &'a str,
    from: String,
    resource: String,
    action: &'static str,
    publish_response: bool,
    trans_id: String,
    properties: StreamProperties<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamProperties<'a> {
    activity_state: &'static str,
    camera_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamData {
    #[serde(default)]
    url: Option<String>,
}

/// Authenticated connection to the Arlo service.
pub struct ArloClient {
    base_url: String,
    token: String,
    user_id: String,
    devices: Vec<Device>,
    state: StateDir,
    http_client: reqwest::Client,
}

impl ArloClient {
    /// Log in and load the device list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Auth` if the credentials are rejected,
    /// `SessionError::Status`/`SessionError::Api` for other service failures,
    /// or `SessionError::Http` if the request cannot be made.
    pub async fn connect(settings: SessionSettings) -> Result<Self, SessionError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        let mut client = Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: String::new(),
            user_id: String::new(),
            devices: Vec::new(),
            state: StateDir::new(
                settings.storage_dir,
                settings.save_state,
                settings.dump_packets,
            ),
            http_client,
        };

        client
            .authenticate(&settings.username, &settings.password)
            .await?;
        client.devices = client.fetch_devices().await?;
        client.state.save_devices(&client.devices)?;
        log::info!("loaded {} devices", client.devices.len());

        Ok(client)
    }

    async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        let request = self
            .http_client
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest {
                email: username,
                password,
            });

        let reply = self
            .exchange(&format!("POST {}", LOGIN_PATH), request)
            .await
            .map_err(|e| match e {
                SessionError::Status { status, .. } => {
                    SessionError::Auth(format!("login returned HTTP {}", status))
                }
                other => other,
            })?;

        if !reply.success {
            return Err(SessionError::Auth(reply.reason()));
        }

        let login: LoginData = reply.into_data()?;
        log::debug!("logged in as user {}", login.user_id);
        self.token = login.token;
        self.user_id = login.user_id;
        Ok(())
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>, SessionError> {
        let request = self
            .http_client
            .get(self.url(DEVICES_PATH))
            .header("Authorization", self.token.as_str());

        let reply = self
            .exchange(&format!("GET {}", DEVICES_PATH), request)
            .await?;
        if !reply.success {
            return Err(SessionError::Api(reply.reason()));
        }
        reply.into_data()
    }

    /// Send a request, record the raw body, and decode the common wrapper.
    async fn exchange(
        &self,
        label: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse, SessionError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        log::debug!("{} -> {}", label, status);
        self.state.record_packet(label, &body)?;

        if !status.is_success() {
            return Err(SessionError::Status {
                request: label.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Session for ArloClient {
    fn devices(&self) -> &[Device] {
        &self.devices
    }

    async fn start_stream(&self, camera: &Device) -> Result<Option<String>, SessionError> {
        let body = StartStreamRequest {
            to: camera.parent_id.as_deref().unwrap_or(&camera.device_id),
            from: format!("{}_web", self.user_id),
            resource: format!("cameras/{}", camera.device_id),
            action: "set",
            publish_response: true,
            trans_id: transaction_id(),
            properties: StreamProperties {
                activity_state: "startUserStream",
                camera_id: &camera.device_id,
            },
        };

        let mut request = self
            .http_client
            .post(self.url(START_STREAM_PATH))
            .header("Authorization", self.token.as_str())
            .json(&body);
        if let Some(xcloud_id) = camera.xcloud_id() {
            request = request.header("xcloudId", xcloud_id);
        }

        let reply = self
            .exchange(&format!("POST {}", START_STREAM_PATH), request)
            .await?;
        if !reply.success {
            log::warn!("stream request for {} refused: {}", camera.name, reply.reason());
            return Ok(None);
        }

        let data: StreamData = reply.into_data()?;
        Ok(data.url.map(|url| secure_stream_url(&url)))
    }
}

/// Arlo hands out `rtsp://` URLs that are only served over TLS.
pub fn secure_stream_url(url: &str) -> String {
    match url.strip_prefix("rtsp://") {
        Some(rest) => format!("rtsps://{}", rest),
        None => url.to_string(),
    }
}

fn transaction_id() -> String {
    format!("web!{}", hex::encode(rand::random::<[u8; 8]>()))
}
