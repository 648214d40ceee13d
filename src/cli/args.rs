//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{CameraAction, DeviceSelector};
use crate::config::Overrides;

/// Command-line front end for Arlo cameras
#[derive(Parser, Debug)]
#[command(name = "aarlo")]
#[command(version, about = "Query Arlo devices, start streams and encrypt state dumps", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Arlo account username
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Arlo account password
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// One line per device
    #[arg(short, long, global = true, overrides_with = "no_compact")]
    pub compact: bool,

    /// Multi-line device output
    #[arg(long, global = true, overrides_with = "compact")]
    pub no_compact: bool,

    /// Encrypt dump output
    #[arg(short, long, global = true, overrides_with = "no_encrypt")]
    pub encrypt: bool,

    /// Print dump output in clear
    #[arg(long, global = true, overrides_with = "encrypt")]
    pub no_encrypt: bool,

    /// Public key used to encrypt (default: built-in key)
    #[arg(short = 'k', long, global = true)]
    pub public_key: Option<PathBuf>,

    /// Private key used to decrypt
    #[arg(short = 'K', long, global = true)]
    pub private_key: Option<PathBuf>,

    /// Pass phrase for the private key
    #[arg(short = 'P', long, global = true)]
    pub pass_phrase: Option<String>,

    /// Where state and packet dumps are written
    #[arg(short, long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Save the device list to the storage directory
    #[arg(long, global = true, overrides_with = "no_save_state")]
    pub save_state: bool,

    #[arg(long, global = true, overrides_with = "save_state", hide = true)]
    pub no_save_state: bool,

    /// Append raw API responses to the storage directory
    #[arg(long, global = true, overrides_with = "no_dump_packets")]
    pub dump_packets: bool,

    #[arg(long, global = true, overrides_with = "dump_packets", hide = true)]
    pub no_dump_packets: bool,

    /// Arlo API base URL
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print device records as JSON, or encrypted with --encrypt
    Dump {
        #[arg(value_enum, default_value = "all", ignore_case = true)]
        item: DeviceSelector,
    },
    /// List devices by category
    List {
        #[arg(value_enum, default_value = "all", ignore_case = true)]
        item: DeviceSelector,
    },
    /// Encrypt standard input
    Encrypt,
    /// Decrypt the first encrypted block on standard input
    Decrypt,
    /// Act on one camera
    Camera(CameraArgs),
}

#[derive(ClapArgs, Debug, Clone, PartialEq)]
pub struct CameraArgs {
    /// Camera name (case-insensitive)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Camera device id (case-insensitive)
    #[arg(short, long)]
    pub device_id: Option<String>,

    /// Launch ffmpeg against the stream URL
    #[arg(short = 'f', long, overrides_with = "no_start_ffmpeg")]
    pub start_ffmpeg: bool,

    #[arg(long, overrides_with = "start_ffmpeg", hide = true)]
    pub no_start_ffmpeg: bool,

    #[arg(value_enum, ignore_case = true)]
    pub action: CameraAction,
}

impl Args {
    /// Flag values for option resolution. Unused flags stay `None`.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            username: self.username.clone(),
            password: self.password.clone(),
            storage_dir: self.storage_dir.clone(),
            save_state: flag_pair(self.save_state, self.no_save_state),
            dump_packets: flag_pair(self.dump_packets, self.no_dump_packets),
            compact: flag_pair(self.compact, self.no_compact),
            encrypt: flag_pair(self.encrypt, self.no_encrypt),
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
            pass_phrase: self.pass_phrase.clone(),
            api_base_url: self.api_url.clone(),
            verbose: self.verbose,
        }
    }
}

/// `--x` / `--no-x` as a tri-state. The parser keeps only the last one given.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
