//! Subcommand handler tests against an in-memory session.

mod common;

use std::io::Cursor;

use aarlo::arlo::{Device, DeviceKind, Session};
use aarlo::cli::{
    self, CameraAction, CameraArgs, Command, DeviceSelector, CAMERA_NOT_FOUND, NO_THUMBNAIL,
    STREAM_FAILED,
};
use aarlo::config::Options;
use aarlo::envelope::{decrypt_from_string, Armor, Scanner};
use aarlo::error::AppError;
use aarlo::stream::StreamSettings;

use common::{test_key, FakeSession, KeyFiles};

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

fn camera_args(action: CameraAction) -> CameraArgs {
    CameraArgs {
        name: None,
        device_id: None,
        start_ffmpeg: false,
        no_start_ffmpeg: false,
        action,
    }
}

// === list ===

#[test]
fn test_list_all_in_category_order() {
    let session = FakeSession::new();
    let mut out = Vec::new();
    cli::list(&session, DeviceSelector::All, true, &mut out).unwrap();

    assert_eq!(
        output(out),
        "bases:\n\
         \u{20}Hall Base;did=4R01787ABCD;mid=VMB4540/VMB4540r1;sno=4R01787ABCD\n\
         cameras:\n\
         \u{20}Front Door;did=59U17B7XA1234;mid=VMC4030/H7;sno=59U17B7XA1234\n\
         \u{20}Garden;did=59U17B7XA5678;mid=VMC4030P/;sno=59U17B7XA5678\n\
         lights:\n\
         \u{20}Porch Light;did=A1B2C3;mid=AL1101/;sno=A1B2C3\n\
         doorbells:\n\
         \u{20}Doorbell;did=D0RB311;mid=AAD1001/;sno=SN-DOOR-1\n"
    );
}

#[test]
fn test_list_line_count_matches_devices() {
    let session = FakeSession::new();
    for (selector, kind) in [
        (DeviceSelector::Cameras, DeviceKind::Camera),
        (DeviceSelector::Bases, DeviceKind::Base),
        (DeviceSelector::Lights, DeviceKind::Light),
        (DeviceSelector::Doorbells, DeviceKind::Doorbell),
    ] {
        let expected = session.devices_of(kind).len();

        let mut compact = Vec::new();
        cli::list(&session, selector, true, &mut compact).unwrap();
        assert_eq!(output(compact).lines().count(), 1 + expected);

        let mut expanded = Vec::new();
        cli::list(&session, selector, false, &mut expanded).unwrap();
        assert_eq!(output(expanded).lines().count(), 1 + 4 * expected);
    }
}

#[test]
fn test_compact_and_expanded_carry_same_fields() {
    for device in common::devices() {
        let compact = cli::format_device(&device, true);
        let expanded = cli::format_device(&device, false);
        for field in [
            device.name.as_str(),
            device.device_id.as_str(),
            device.model_id.as_str(),
            device.hw_version(),
            device.serial_number(),
        ] {
            assert!(compact.contains(field), "{compact:?} missing {field}");
            assert!(expanded.contains(field), "{expanded:?} missing {field}");
        }
    }
}

// === dump ===

#[test]
fn test_dump_all_in_clear() {
    let session = FakeSession::new();
    let mut out = Vec::new();
    cli::dump(&session, DeviceSelector::All, &Options::default(), &mut out).unwrap();

    let text = output(out);
    let (heading, body) = text.split_once('\n').unwrap();
    assert_eq!(heading, "all");
    let devices: Vec<Device> = serde_json::from_str(body).unwrap();
    assert_eq!(devices, common::devices());
}

#[test]
fn test_dump_single_category() {
    let session = FakeSession::new();
    let mut out = Vec::new();
    cli::dump(&session, DeviceSelector::Cameras, &Options::default(), &mut out).unwrap();

    let text = output(out);
    let (heading, body) = text.split_once('\n').unwrap();
    assert_eq!(heading, "cameras");
    let devices: Vec<Device> = serde_json::from_str(body).unwrap();
    assert_eq!(devices.len(), 2);
    assert!(devices.iter().all(|d| d.is(DeviceKind::Camera)));
}

#[test]
fn test_dump_encrypted_opens_with_private_key() {
    let keys = KeyFiles::new();
    let session = FakeSession::new();
    let options = Options {
        encrypt: true,
        public_key: Some(keys.public.clone()),
        ..Options::default()
    };
    let mut out = Vec::new();
    cli::dump(&session, DeviceSelector::All, &options, &mut out).unwrap();

    let text = output(out);
    assert!(text.starts_with(Armor::Dump.begin()));
    assert!(text.trim_end().ends_with(Armor::Dump.end()));

    let block = Scanner::new(Cursor::new(text)).next().unwrap().unwrap();
    let devices: Vec<Device> = decrypt_from_string(&block.body, test_key()).unwrap();
    assert_eq!(devices, common::devices());
}

// === encrypt / decrypt ===

#[test]
fn test_encrypt_then_decrypt_is_verbatim() {
    let keys = KeyFiles::new();
    let options = Options {
        public_key: Some(keys.public.clone()),
        private_key: keys.private.clone(),
        ..Options::default()
    };
    let plaintext = "line one\nline two without newline";

    let mut sealed = Vec::new();
    cli::encrypt(&options, Cursor::new(plaintext), &mut sealed).unwrap();
    let sealed = output(sealed);
    assert!(sealed.starts_with(Armor::Data.begin()));
    assert!(!sealed.contains(plaintext));

    let pasted = format!("Hi, here is my dump:\n\n{}\nThanks!\n", sealed);
    let mut opened = Vec::new();
    cli::decrypt(&options, Cursor::new(pasted), &mut opened).unwrap();
    assert_eq!(output(opened), plaintext);
}

#[test]
fn test_decrypt_skips_latin1_log_lines() {
    let keys = KeyFiles::new();
    let options = Options {
        public_key: Some(keys.public.clone()),
        private_key: keys.private.clone(),
        ..Options::default()
    };
    let mut sealed = Vec::new();
    cli::encrypt(&options, Cursor::new("from the caf\u{e9}"), &mut sealed).unwrap();

    let mut pasted = b"12:00 INFO caf\xe9 opened\n".to_vec();
    pasted.extend_from_slice(&sealed);
    pasted.extend_from_slice(b"12:01 INFO caf\xe9 closed\n");

    let mut opened = Vec::new();
    cli::decrypt(&options, Cursor::new(pasted), &mut opened).unwrap();
    assert_eq!(output(opened), "from the caf\u{e9}");
}

#[test]
fn test_decrypt_uses_pass_phrase() {
    let keys = KeyFiles::new();
    let options = Options {
        public_key: Some(keys.public.clone()),
        private_key: keys.encrypted_private("open sesame"),
        pass_phrase: Some("open sesame".to_string()),
        ..Options::default()
    };

    let mut sealed = Vec::new();
    cli::encrypt(&options, Cursor::new("guarded"), &mut sealed).unwrap();
    let mut opened = Vec::new();
    cli::decrypt(&options, Cursor::new(sealed), &mut opened).unwrap();
    assert_eq!(output(opened), "guarded");
}

#[test]
fn test_decrypt_dump_prints_json() {
    let keys = KeyFiles::new();
    let options = Options {
        encrypt: true,
        public_key: Some(keys.public.clone()),
        private_key: keys.private.clone(),
        ..Options::default()
    };
    let session = FakeSession::new();
    let mut sealed = Vec::new();
    cli::dump(&session, DeviceSelector::Lights, &options, &mut sealed).unwrap();

    let mut opened = Vec::new();
    cli::decrypt(&options, Cursor::new(sealed), &mut opened).unwrap();
    let devices: Vec<Device> = serde_json::from_slice(&opened).unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "Porch Light");
}

#[test]
fn test_decrypt_missing_private_key_file() {
    let keys = KeyFiles::new();
    let options = Options {
        public_key: Some(keys.public.clone()),
        private_key: keys.dir.path().join("absent.pem"),
        ..Options::default()
    };
    let mut sealed = Vec::new();
    cli::encrypt(&options, Cursor::new("x"), &mut sealed).unwrap();

    let mut opened = Vec::new();
    let err = cli::decrypt(&options, Cursor::new(sealed), &mut opened).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(opened.is_empty());
}

// === camera ===

#[tokio::test]
async fn test_camera_start_stream_by_device_id() {
    let session = FakeSession::new().with_stream("59U17B7XA1234", "rtsps://arlo/front");
    let mut args = camera_args(CameraAction::StartStream);
    args.device_id = Some("59u17b7xa1234".to_string());

    let mut out = Vec::new();
    cli::camera(&session, &args, &Options::default(), &mut out)
        .await
        .unwrap();
    assert_eq!(
        output(out),
        "starting a stream\nstream-url=rtsps://arlo/front\n"
    );
}

#[tokio::test]
async fn test_camera_not_found() {
    let session = FakeSession::new();
    let mut args = camera_args(CameraAction::StartStream);
    args.name = Some("Back Door".to_string());

    let mut out = Vec::new();
    let err = cli::camera(&session, &args, &Options::default(), &mut out)
        .await
        .unwrap_err();
    assert!(err.is_reported());
    assert_eq!(err.exit_code(), 0);
    assert_eq!(err.to_string(), CAMERA_NOT_FOUND);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_camera_lookup_ignores_non_cameras() {
    let session = FakeSession::new();
    let mut args = camera_args(CameraAction::LastThumbnail);
    args.name = Some("porch light".to_string());

    let mut out = Vec::new();
    let err = cli::camera(&session, &args, &Options::default(), &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), CAMERA_NOT_FOUND);
}

#[tokio::test]
async fn test_camera_stream_refused() {
    let session = FakeSession::new();
    let mut args = camera_args(CameraAction::StartStream);
    args.name = Some("garden".to_string());

    let mut out = Vec::new();
    let err = cli::camera(&session, &args, &Options::default(), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LookupMiss(ref m) if m == STREAM_FAILED));
    assert_eq!(output(out), "starting a stream\n");
}

#[tokio::test]
async fn test_camera_last_thumbnail() {
    let session = FakeSession::new();
    let mut args = camera_args(CameraAction::LastThumbnail);
    args.name = Some("FRONT DOOR".to_string());

    let mut out = Vec::new();
    cli::camera(&session, &args, &Options::default(), &mut out)
        .await
        .unwrap();
    assert_eq!(output(out), "last-thumbnail=https://img.example/front.jpg\n");

    args.name = Some("Garden".to_string());
    let err = cli::camera(&session, &args, &Options::default(), &mut Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), NO_THUMBNAIL);
}

#[tokio::test]
async fn test_camera_stop_stream_is_noop() {
    let session = FakeSession::new();
    let mut args = camera_args(CameraAction::StopStream);
    args.name = Some("Front Door".to_string());

    let mut out = Vec::new();
    cli::camera(&session, &args, &Options::default(), &mut out)
        .await
        .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_camera_start_ffmpeg_missing_binary() {
    let tmp = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_stream("59U17B7XA1234", "rtsps://arlo/front");
    let options = Options {
        stream: StreamSettings {
            ffmpeg: "aarlo-no-such-ffmpeg-binary".to_string(),
            output_dir: tmp.path().join("video_dir"),
            playlist: "video.m3u8".to_string(),
        },
        ..Options::default()
    };
    let mut args = camera_args(CameraAction::StartStream);
    args.name = Some("Front Door".to_string());
    args.start_ffmpeg = true;

    let mut out = Vec::new();
    let err = cli::camera(&session, &args, &options, &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 5);
    assert_eq!(
        output(out),
        "starting a stream\nstream-url=rtsps://arlo/front\nstarting ffmpeg\n"
    );
}

// === run ===

#[tokio::test]
async fn test_run_without_credentials_writes_nothing() {
    for command in [
        Command::List {
            item: DeviceSelector::All,
        },
        Command::Dump {
            item: DeviceSelector::All,
        },
        Command::Camera(camera_args(CameraAction::StartStream)),
    ] {
        let mut out = Vec::new();
        let err = cli::run(&command, &Options::default(), Cursor::new(""), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingCredentials));
        assert_eq!(err.exit_code(), 1);
        assert!(out.is_empty());
    }
}
