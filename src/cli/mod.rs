//! Command-line interface definitions and helpers.
//!
//! This module contains argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

use std::io::{BufRead, Write};

pub use args::{Args, CameraArgs, Command};
pub use commands::{
    camera, decrypt, dump, encrypt, format_device, list, CAMERA_NOT_FOUND, NO_THUMBNAIL,
    STREAM_FAILED,
};
pub use enums::{CameraAction, DeviceSelector};

use crate::arlo;
use crate::config::Options;
use crate::error::AppError;

/// Run one subcommand. Commands that need devices log in first; `encrypt`
/// and `decrypt` never contact the service.
pub async fn run<R: BufRead, W: Write>(
    command: &Command,
    options: &Options,
    input: R,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        Command::Encrypt => encrypt(options, input, out),
        Command::Decrypt => decrypt(options, input, out),
        Command::Dump { item } => {
            let session = arlo::login(options).await?;
            dump(&session, *item, options, out)
        }
        Command::List { item } => {
            let session = arlo::login(options).await?;
            list(&session, *item, options.compact, out)
        }
        Command::Camera(args) => {
            let session = arlo::login(options).await?;
            camera(&session, args, options, out).await
        }
    }
}
