//! CSV rendering of a roll.

use std::borrow::Cow;

use chrono::NaiveDateTime;

use super::RollExport;
use crate::config::ExifConfig;
use crate::model::DATE_FORMAT;

const FRAME_HEADER: [&str; 16] = [
    "Frame Count",
    "Date",
    "Lens",
    "Lens serial number",
    "Shutter",
    "Aperture",
    "Focal length",
    "Exposure compensation",
    "Notes",
    "No of exposures",
    "Flash",
    "Light source",
    "Location",
    "Address",
    "Filter(s)",
    "Complementary picture",
];

/// Quote a field if it contains a separator, quote or line break.
#[must_use]
pub fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn date(value: Option<NaiveDateTime>) -> String {
    value.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

fn push_row(out: &mut String, fields: &[String]) {
    let line: Vec<Cow<'_, str>> = fields.iter().map(|f| escape(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn push_pair(out: &mut String, label: &str, value: impl Into<String>) {
    push_row(out, &[label.to_string(), value.into()]);
}

/// Render a roll header block followed by one row per frame.
#[must_use]
pub fn roll_to_csv(export: &RollExport, exif: &ExifConfig) -> String {
    let roll = &export.roll;
    let mut out = String::new();

    push_pair(&mut out, "Roll name", roll.name.as_str());
    push_pair(&mut out, "Loaded on", date(Some(roll.date)));
    push_pair(&mut out, "Unloaded on", date(roll.unloaded));
    push_pair(&mut out, "Developed on", date(roll.developed));
    push_pair(
        &mut out,
        "Film stock",
        export.film_stock.as_ref().map(ToString::to_string).unwrap_or_default(),
    );
    push_pair(&mut out, "ISO", roll.iso.to_string());
    push_pair(&mut out, "Format", roll.format.as_str());
    push_pair(
        &mut out,
        "Push/pull",
        roll.push_pull.map(|p| p.to_string()).unwrap_or_default(),
    );
    push_pair(
        &mut out,
        "Camera",
        export.camera.as_ref().map(ToString::to_string).unwrap_or_default(),
    );
    push_pair(
        &mut out,
        "Serial number",
        export
            .camera
            .as_ref()
            .and_then(|c| c.serial_number.clone())
            .unwrap_or_default(),
    );
    push_pair(&mut out, "Notes", roll.note.clone().unwrap_or_default());
    push_pair(&mut out, "Artist name", exif.artist_name.clone().unwrap_or_default());
    push_pair(&mut out, "Copyright", exif.copyright_info.clone().unwrap_or_default());

    push_row(&mut out, &FRAME_HEADER.map(str::to_string));

    for item in &export.frames {
        let frame = &item.frame;
        let filters = item
            .filters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|");

        push_row(
            &mut out,
            &[
                frame.count.to_string(),
                date(Some(frame.date)),
                item.lens.as_ref().map(ToString::to_string).unwrap_or_default(),
                item.lens
                    .as_ref()
                    .and_then(|l| l.serial_number.clone())
                    .unwrap_or_default(),
                frame.shutter.map(|s| s.to_string()).unwrap_or_default(),
                frame.aperture.map(|a| format!("f/{a}")).unwrap_or_default(),
                frame.focal_length.map(|mm| mm.to_string()).unwrap_or_default(),
                frame.exposure_comp.map(|c| c.to_string()).unwrap_or_default(),
                frame.note.clone().unwrap_or_default(),
                frame.no_of_exposures.to_string(),
                frame.flash_used.to_string(),
                frame.light_source.to_string(),
                frame.location.map(|l| l.to_string()).unwrap_or_default(),
                frame.formatted_address.clone().unwrap_or_default(),
                filters,
                frame.picture_filename.clone().unwrap_or_default(),
            ],
        );
    }

    out
}
