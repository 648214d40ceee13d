//! Subcommand handlers.
//!
//! Handlers write to the `out` they are given and never exit the process.
//! Lookup misses come back as [`AppError::LookupMiss`] so the caller can print
//! them and still finish successfully.

use std::io::{BufRead, Read, Write};

use serde_json::Value;

use super::args::CameraArgs;
use super::enums::{CameraAction, DeviceSelector};
use crate::arlo::{Device, Session};
use crate::config::Options;
use crate::envelope::{self, Armor, EnvelopeError, Scanner};
use crate::error::AppError;
use crate::stream::StreamLauncher;

pub const CAMERA_NOT_FOUND: &str = "cannot find camera";
pub const STREAM_FAILED: &str = " failed to start stream";
pub const NO_THUMBNAIL: &str = " error getting thumbnail";

/// Print the selected device records, sealed when `options.encrypt` is set.
pub fn dump<S: Session, W: Write>(
    session: &S,
    item: DeviceSelector,
    options: &Options,
    out: &mut W,
) -> Result<(), AppError> {
    let devices: Vec<&Device> = match item {
        DeviceSelector::All => session.devices().iter().collect(),
        _ => item
            .kinds()
            .iter()
            .flat_map(|&kind| session.devices_of(kind))
            .collect(),
    };
    log::info!("dumping {} {}", devices.len(), item.name());

    if options.encrypt {
        let key = envelope::load_public_key(options.public_key.as_deref())?;
        let text = envelope::encrypt_to_string(&devices, &key)?;
        writeln!(out, "{}", envelope::wrap(Armor::Dump, &text))?;
    } else {
        writeln!(out, "{}", item.name())?;
        writeln!(out, "{}", serde_json::to_string_pretty(&devices)?)?;
    }
    Ok(())
}

/// Print a heading per category followed by its devices.
pub fn list<S: Session, W: Write>(
    session: &S,
    item: DeviceSelector,
    compact: bool,
    out: &mut W,
) -> Result<(), AppError> {
    for &kind in item.kinds() {
        writeln!(out, "{}:", kind.label())?;
        for device in session.devices_of(kind) {
            out.write_all(format_device(device, compact).as_bytes())?;
        }
    }
    Ok(())
}

/// One device entry, newline terminated.
pub fn format_device(device: &Device, compact: bool) -> String {
    if compact {
        format!(
            " {};did={};mid={}/{};sno={}\n",
            device.name,
            device.device_id,
            device.model_id,
            device.hw_version(),
            device.serial_number()
        )
    } else {
        format!(
            " {}\n  device-id:{}\n  model-id:{}/{}\n  serial-number:{}\n",
            device.name,
            device.device_id,
            device.model_id,
            device.hw_version(),
            device.serial_number()
        )
    }
}

/// Seal all of `input` as a string and print it between DATA markers.
pub fn encrypt<R: Read, W: Write>(
    options: &Options,
    mut input: R,
    out: &mut W,
) -> Result<(), AppError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    let key = envelope::load_public_key(options.public_key.as_deref())?;
    let sealed = envelope::encrypt_to_string(&text, &key)?;
    writeln!(out, "{}", envelope::wrap(Armor::Data, &sealed))?;
    Ok(())
}

/// Open the first envelope block found in `input` and print what it holds.
///
/// Strings are written as-is; anything else is pretty-printed JSON. No
/// trailing newline is added.
pub fn decrypt<R: BufRead, W: Write>(
    options: &Options,
    input: R,
    out: &mut W,
) -> Result<(), AppError> {
    let block = match Scanner::new(input).next() {
        Some(block) => block?,
        None => return Err(EnvelopeError::NoBlock.into()),
    };
    log::debug!("found {:?} block of {} bytes", block.armor, block.body.len());

    let key = envelope::load_private_key(&options.private_key, options.pass_phrase.as_deref())?;
    let value: Value = envelope::decrypt_from_string(&block.body, &key)?;
    match value {
        Value::String(text) => write!(out, "{}", text)?,
        other => write!(out, "{}", serde_json::to_string_pretty(&other)?)?,
    }
    out.flush()?;
    Ok(())
}

/// Run a camera action against the first matching camera.
pub async fn camera<S: Session, W: Write>(
    session: &S,
    args: &CameraArgs,
    options: &Options,
    out: &mut W,
) -> Result<(), AppError> {
    let Some(camera) = session.find_camera(args.name.as_deref(), args.device_id.as_deref()) else {
        return Err(AppError::LookupMiss(CAMERA_NOT_FOUND.to_string()));
    };
    log::info!("using camera {} ({})", camera.name, camera.device_id);

    match args.action {
        CameraAction::StartStream => {
            writeln!(out, "starting a stream")?;
            let url = match session.start_stream(camera).await {
                Ok(Some(url)) => url,
                Ok(None) => return Err(AppError::LookupMiss(STREAM_FAILED.to_string())),
                Err(e) => {
                    log::warn!("stream request failed: {}", e);
                    return Err(AppError::LookupMiss(STREAM_FAILED.to_string()));
                }
            };
            writeln!(out, "stream-url={}", url)?;

            if args.start_ffmpeg {
                writeln!(out, "starting ffmpeg")?;
                out.flush()?;
                StreamLauncher::new(options.stream.clone()).launch(&url)?;
            }
        }
        CameraAction::StopStream => {}
        CameraAction::LastThumbnail => match camera.last_thumbnail.as_deref() {
            Some(url) if !url.is_empty() => writeln!(out, "last-thumbnail={}", url)?,
            _ => return Err(AppError::LookupMiss(NO_THUMBNAIL.to_string())),
        },
    }
    Ok(())
}
