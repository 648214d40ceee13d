//! Files written into the storage directory.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use super::{Device, SessionError};

const STATE_FILE: &str = "devices.json";
const PACKET_FILE: &str = "packets.dump";

/// The storage directory and which artifacts to write into it.
#[derive(Debug, Clone)]
pub struct StateDir {
    dir: PathBuf,
    save_state: bool,
    dump_packets: bool,
}

impl StateDir {
    /// Does not touch the filesystem; directories are created on first write.
    pub fn new(dir: PathBuf, save_state: bool, dump_packets: bool) -> Self {
        Self {
            dir,
            save_state,
            dump_packets,
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn packets_path(&self) -> PathBuf {
        self.dir.join(PACKET_FILE)
    }

    /// Append a raw response body when packet dumping is on.
    pub fn record_packet(&self, request: &str, body: &str) -> Result<(), SessionError> {
        if !self.dump_packets {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.packets_path())?;
        writeln!(file, ">>> {}", request)?;
        writeln!(file, "{}", body)?;
        Ok(())
    }

    /// Overwrite the device snapshot when state saving is on.
    pub fn save_devices(&self, devices: &[Device]) -> Result<(), SessionError> {
        if !self.save_state {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(devices)?;
        std::fs::write(self.state_path(), json)?;
        log::debug!("saved {} devices to {}", devices.len(), self.state_path().display());
        Ok(())
    }
}
