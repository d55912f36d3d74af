//! ExifTool command file for a roll.
//!
//! Each frame becomes one `exiftool` invocation that writes the frame's
//! metadata into the scanned file `<pictures_path>/*_<count><file_ending>`.

use std::borrow::Cow;
use std::path::PathBuf;

use super::{FrameExport, RollExport};
use crate::config::ExifConfig;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Quote a value for a POSIX shell when it contains anything unsafe.
#[must_use]
pub fn shell_quote(value: &str) -> Cow<'_, str> {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:+,@%".contains(c));
    if safe {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', r"'\''")))
    }
}

fn tag(name: &str, value: impl AsRef<str>) -> String {
    shell_quote(&format!("-{name}={}", value.as_ref())).into_owned()
}

fn frame_args(export: &RollExport, item: &FrameExport, exif: &ExifConfig) -> Vec<String> {
    let frame = &item.frame;
    let mut args = Vec::new();

    if let Some(camera) = &export.camera {
        args.push(tag("Make", &camera.make));
        args.push(tag("Model", &camera.model));
        if let Some(serial) = &camera.serial_number {
            args.push(tag("SerialNumber", serial));
        }
    }
    if let Some(lens) = &item.lens {
        args.push(tag("LensMake", &lens.make));
        args.push(tag("LensModel", &lens.model));
        if let Some(serial) = &lens.serial_number {
            args.push(tag("LensSerialNumber", serial));
        }
    }
    if let Some(value) = frame.shutter.and_then(|s| s.exif_value()) {
        args.push(tag("ExposureTime", &value));
        args.push(tag("ShutterSpeedValue", &value));
    }
    if let Some(aperture) = frame.aperture {
        args.push(tag("FNumber", aperture.to_string()));
        args.push(tag("ApertureValue", aperture.to_string()));
    }
    if let Some(mm) = frame.focal_length {
        args.push(tag("FocalLength", mm.to_string()));
    }
    if export.roll.iso > 0 {
        args.push(tag("ISO", export.roll.iso.to_string()));
    }
    if let Some(comp) = frame.exposure_comp {
        args.push(tag("ExposureCompensation", comp.exif_value()));
    }
    args.push(tag(
        "DateTimeOriginal",
        frame.date.format(EXIF_DATE_FORMAT).to_string(),
    ));
    if let Some(location) = frame.location {
        args.extend(location.exif_args().iter().map(|a| shell_quote(a).into_owned()));
    }
    args.push(tag("LightSource", frame.light_source.exif_code().to_string()));
    if frame.flash_used {
        args.push(tag("Flash", "Fired"));
    }

    let description = frame_description(export, item);
    if !description.is_empty() {
        args.push(tag("ImageDescription", &description));
        args.push(tag("UserComment", &description));
    }
    if let Some(artist) = &exif.artist_name {
        args.push(tag("Artist", artist));
    }
    if let Some(copyright) = &exif.copyright_info {
        args.push(tag("Copyright", copyright));
    }
    args
}

fn frame_description(export: &RollExport, item: &FrameExport) -> String {
    let mut parts = Vec::new();
    if let Some(note) = item.frame.note.as_deref().filter(|n| !n.trim().is_empty()) {
        parts.push(note.trim().to_string());
    }
    if let Some(stock) = &export.film_stock {
        parts.push(stock.to_string());
    }
    if !item.filters.is_empty() {
        let names: Vec<String> = item.filters.iter().map(ToString::to_string).collect();
        parts.push(format!("Filters: {}", names.join(", ")));
    }
    parts.join("; ")
}

fn target(exif: &ExifConfig, count: u32) -> String {
    let dir = exif
        .pictures_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let dir = dir.to_string_lossy();
    let dir = dir.trim_end_matches('/');
    // Only the wildcard stays outside quotes
    let suffix = format!("_{count}{}", exif.file_ending);
    format!("{}/*{}", shell_quote(dir), shell_quote(&suffix))
}

/// Render one `exiftool` command per frame, ordered by frame count.
#[must_use]
pub fn roll_to_commands(export: &RollExport, exif: &ExifConfig) -> String {
    let exiftool = exif.exiftool();
    let exiftool = exiftool.to_string_lossy();
    let mut out = String::new();

    for item in &export.frames {
        let mut command = vec![shell_quote(&exiftool).into_owned()];
        if exif.ignore_warnings {
            command.push("-m".to_string());
        }
        command.push("-overwrite_original".to_string());
        command.extend(frame_args(export, item, exif));
        command.push(target(exif, item.frame.count));

        out.push_str(&command.join(" "));
        out.push('\n');
    }
    out
}
