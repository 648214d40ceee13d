//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use aarlo::arlo::{Device, Session, SessionError};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::json;
use tempfile::TempDir;

/// One RSA key pair per test binary; generation is slow in debug builds.
pub fn test_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate test key"))
}

pub fn test_public_key() -> RsaPublicKey {
    RsaPublicKey::from(test_key())
}

/// PEM files for the test key pair inside a temporary directory.
pub struct KeyFiles {
    pub dir: TempDir,
    pub public: PathBuf,
    pub private: PathBuf,
}

impl KeyFiles {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("rsa.public");
        let private = dir.path().join("rsa.private");
        std::fs::write(
            &public,
            test_public_key().to_public_key_pem(LineEnding::LF).unwrap(),
        )
        .unwrap();
        std::fs::write(
            &private,
            test_key().to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes(),
        )
        .unwrap();
        Self {
            dir,
            public,
            private,
        }
    }

    /// Write the private key again, encrypted under `pass_phrase`.
    pub fn encrypted_private(&self, pass_phrase: &str) -> PathBuf {
        let path = self.dir.path().join("rsa.private.enc");
        let pem = test_key()
            .to_pkcs8_encrypted_pem(&mut OsRng, pass_phrase.as_bytes(), LineEnding::LF)
            .unwrap();
        std::fs::write(&path, pem.as_bytes()).unwrap();
        path
    }
}

/// The device list the fake service and the mock HTTP server both report.
pub fn devices_json() -> serde_json::Value {
    json!([
        {
            "deviceId": "4R01787ABCD",
            "deviceName": "Hall Base",
            "deviceType": "basestation",
            "modelId": "VMB4540",
            "properties": { "hwVersion": "VMB4540r1" }
        },
        {
            "deviceId": "59U17B7XA1234",
            "deviceName": "Front Door",
            "deviceType": "camera",
            "modelId": "VMC4030",
            "parentId": "4R01787ABCD",
            "xCloudId": "XC-1",
            "presignedLastImageUrl": "https://img.example/front.jpg",
            "properties": { "hwVersion": "H7" }
        },
        {
            "deviceId": "59U17B7XA5678",
            "deviceName": "Garden",
            "deviceType": "camera",
            "modelId": "VMC4030P",
            "parentId": "4R01787ABCD"
        },
        {
            "deviceId": "A1B2C3",
            "deviceName": "Porch Light",
            "deviceType": "lights",
            "modelId": "AL1101"
        },
        {
            "deviceId": "D0RB311",
            "deviceName": "Doorbell",
            "deviceType": "doorbell",
            "modelId": "AAD1001",
            "serialNumber": "SN-DOOR-1"
        }
    ])
}

pub fn devices() -> Vec<Device> {
    serde_json::from_value(devices_json()).unwrap()
}

/// In-memory session with canned stream URLs keyed by device id.
pub struct FakeSession {
    pub devices: Vec<Device>,
    pub streams: HashMap<String, String>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            devices: devices(),
            streams: HashMap::new(),
        }
    }

    pub fn with_stream(mut self, device_id: &str, url: &str) -> Self {
        self.streams.insert(device_id.to_string(), url.to_string());
        self
    }
}

impl Session for FakeSession {
    fn devices(&self) -> &[Device] {
        &self.devices
    }

    async fn start_stream(&self, camera: &Device) -> Result<Option<String>, SessionError> {
        Ok(self.streams.get(&camera.device_id).cloned())
    }
}
