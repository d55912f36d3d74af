//! Frame commands.

use std::io::Write;

use tracing::{info, warn};

use super::{deleted, optional_text, Context};
use crate::cli::output::{opt, write_fields, write_json, Table};
use crate::cli::{FrameCommand, FrameField, FrameFields, OutputFormat};
use crate::error::{Error, Result};
use crate::model::{Frame, Roll, DATE_FORMAT};

impl FrameFields {
    /// Whether the user gave a value for the field `reconcile` names.
    fn sets(&self, field: &str) -> bool {
        match field {
            "shutter" => self.shutter.is_some(),
            "aperture" => self.aperture.is_some(),
            "exposure_comp" => self.comp.is_some(),
            "focal_length" => self.focal_length.is_some(),
            "lens" => self.lens.is_some(),
            "filters" => !self.filters.is_empty(),
            _ => false,
        }
    }
}

fn clear_field(frame: &mut Frame, field: FrameField) {
    match field {
        FrameField::Lens => frame.lens_id = None,
        FrameField::Shutter => frame.shutter = None,
        FrameField::Aperture => frame.aperture = None,
        FrameField::Comp => frame.exposure_comp = None,
        FrameField::FocalLength => frame.focal_length = None,
        FrameField::Note => frame.note = None,
        FrameField::Location => {
            frame.location = None;
            frame.formatted_address = None;
        }
        FrameField::Filters => frame.filter_ids.clear(),
        FrameField::Picture => frame.picture_filename = None,
    }
}

fn apply_frame_fields(frame: &mut Frame, fields: &FrameFields) {
    if let Some(date) = fields.date {
        frame.date = date;
    }
    if let Some(lens) = fields.lens {
        frame.lens_id = Some(lens);
    }
    if let Some(shutter) = fields.shutter {
        frame.shutter = Some(shutter);
    }
    if let Some(aperture) = fields.aperture {
        frame.aperture = Some(aperture);
    }
    if let Some(comp) = fields.comp {
        frame.exposure_comp = Some(comp);
    }
    if let Some(focal_length) = fields.focal_length {
        frame.focal_length = Some(focal_length);
    }
    if !fields.filters.is_empty() {
        frame.filter_ids.clone_from(&fields.filters);
    }
    if let Some(exposures) = fields.exposures {
        frame.no_of_exposures = exposures;
    }
    if let Some(flash) = fields.flash {
        frame.flash_used = flash;
    }
    if let Some(light) = fields.light {
        frame.light_source = light;
    }
    if let Some(note) = &fields.note {
        frame.note = optional_text(note.clone());
    }
}

/// Drop carried-over values the frame's gear no longer offers, then check
/// what the user typed against the value lists.
///
/// Values the user gave explicitly are never dropped; an unavailable one is
/// an error instead.
fn settle(ctx: &Context, roll: &Roll, frame: &mut Frame, fields: &FrameFields, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    let options = storage.frame_options(roll, frame.lens_id)?;
    let mut probe = frame.clone();
    let mut dropped = Vec::new();
    for field in options.reconcile(&mut probe) {
        if fields.sets(field) {
            continue;
        }
        match field {
            "shutter" => frame.shutter = None,
            "aperture" => frame.aperture = None,
            "exposure_comp" => frame.exposure_comp = None,
            "focal_length" => frame.focal_length = None,
            "lens" => frame.lens_id = None,
            "filters" => frame.filter_ids.clone_from(&probe.filter_ids),
            _ => continue,
        }
        dropped.push(field);
    }
    if !dropped.is_empty() {
        writeln!(out, "Not available with this gear, cleared: {}", dropped.join(", "))?;
    }

    storage.frame_options(roll, frame.lens_id)?.check(frame)
}

fn frame_fields(frame: &Frame) -> Vec<(&'static str, String)> {
    vec![
        ("ID", opt(frame.id)),
        ("Roll", frame.roll_id.to_string()),
        ("Count", frame.count.to_string()),
        ("Date", frame.date.format(DATE_FORMAT).to_string()),
        ("Lens", opt(frame.lens_id)),
        ("Shutter", opt(frame.shutter)),
        ("Aperture", frame.aperture.map(|a| format!("f/{a}")).unwrap_or_default()),
        ("Compensation", opt(frame.exposure_comp)),
        ("Focal length", frame.focal_length.map(|mm| format!("{mm} mm")).unwrap_or_default()),
        (
            "Filters",
            frame
                .filter_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        ("Exposures", frame.no_of_exposures.to_string()),
        ("Flash", frame.flash_used.to_string()),
        ("Light source", frame.light_source.to_string()),
        ("Location", frame.location.map(|l| l.to_dms()).unwrap_or_default()),
        ("Address", frame.formatted_address.clone().unwrap_or_default()),
        ("Picture", frame.picture_filename.clone().unwrap_or_default()),
        ("Note", frame.note.clone().unwrap_or_default()),
    ]
}

fn load_frame(ctx: &Context, id: i64) -> Result<(Frame, Roll)> {
    let storage = ctx.storage();
    let frame = storage
        .get_frame(id)?
        .ok_or_else(|| Error::not_found("frame", id))?;
    let roll = storage
        .get_roll(frame.roll_id)?
        .ok_or_else(|| Error::not_found("roll", frame.roll_id))?;
    Ok((frame, roll))
}

pub(super) async fn frame(ctx: &Context, cmd: FrameCommand, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    match cmd {
        FrameCommand::Add {
            roll: roll_id,
            count,
            fields,
        } => {
            let roll = storage
                .get_roll(roll_id)?
                .ok_or_else(|| Error::not_found("roll", roll_id))?;
            let mut frame = storage.new_frame_for_roll(roll_id)?;
            if let Some(count) = count {
                frame.count = count;
            }
            apply_frame_fields(&mut frame, &fields);
            settle(ctx, &roll, &mut frame, &fields, out)?;
            let id = storage.add_frame(&frame)?;
            writeln!(out, "Added frame {id} (#{} on roll {})", frame.count, frame.roll_id)?;
        }
        FrameCommand::Edit {
            id,
            count,
            clear,
            fields,
        } => {
            let (mut frame, roll) = load_frame(ctx, id)?;
            for field in clear {
                clear_field(&mut frame, field);
            }
            if let Some(count) = count {
                frame.count = count;
            }
            apply_frame_fields(&mut frame, &fields);
            settle(ctx, &roll, &mut frame, &fields, out)?;
            storage.update_frame(&frame)?;
            writeln!(out, "Updated frame {id} (#{} on roll {})", frame.count, frame.roll_id)?;
        }
        FrameCommand::List { roll, sort, output } => {
            if storage.get_roll(roll)?.is_none() {
                return Err(Error::not_found("roll", roll));
            }
            let frames = storage.list_frames(roll, sort.unwrap_or(ctx.config().display.frame_sort))?;
            match output.format {
                OutputFormat::Json => write_json(out, &frames)?,
                OutputFormat::Table => {
                    let mut table = Table::new(&["ID", "#", "DATE", "SHUTTER", "APERTURE", "COMP", "FOCAL", "LENS"]);
                    for frame in &frames {
                        table.row(vec![
                            opt(frame.id),
                            frame.count.to_string(),
                            frame.date.format(DATE_FORMAT).to_string(),
                            opt(frame.shutter),
                            frame.aperture.map(|a| format!("f/{a}")).unwrap_or_default(),
                            opt(frame.exposure_comp),
                            opt(frame.focal_length),
                            opt(frame.lens_id),
                        ]);
                    }
                    table.write_to(out)?;
                }
                OutputFormat::Plain => {
                    for frame in &frames {
                        let mut settings = Vec::new();
                        if let Some(shutter) = frame.shutter {
                            settings.push(shutter.to_string());
                        }
                        if let Some(aperture) = frame.aperture {
                            settings.push(format!("f/{aperture}"));
                        }
                        writeln!(
                            out,
                            "{}\t#{}\t{}\t{}",
                            opt(frame.id),
                            frame.count,
                            frame.date.format(DATE_FORMAT),
                            settings.join(" ")
                        )?;
                    }
                }
            }
        }
        FrameCommand::Show(args) => {
            let (frame, _) = load_frame(ctx, args.id)?;
            if args.output.format == OutputFormat::Json {
                write_json(out, &frame)?;
            } else {
                write_fields(out, &frame_fields(&frame))?;
            }
        }
        FrameCommand::Delete { id } => {
            deleted("frame", id, storage.delete_frame(id)?)?;
            writeln!(out, "Deleted frame {id}")?;
        }
        FrameCommand::Locate { id, location, lookup } => {
            let (mut frame, _) = load_frame(ctx, id)?;
            frame.location = Some(location);
            frame.formatted_address = None;
            if lookup {
                match ctx.geocoder()?.reverse(location).await {
                    Ok(address) => frame.formatted_address = address,
                    Err(e) => {
                        warn!("Address lookup failed: {}", e);
                        writeln!(out, "Address lookup failed: {e}")?;
                    }
                }
            }
            storage.update_frame(&frame)?;
            writeln!(out, "Frame {id} located at {}", location.to_dms())?;
            if let Some(address) = &frame.formatted_address {
                writeln!(out, "{address}")?;
            }
        }
        FrameCommand::Picture { id, file } => {
            let (mut frame, _) = load_frame(ctx, id)?;
            let name = ctx.pictures().import_in_background(file).await?;
            info!("Attached picture {} to frame {}", name, id);
            frame.picture_filename = Some(name.clone());
            storage.update_frame(&frame)?;
            writeln!(out, "Frame {id} picture: {name}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::super::test_support::{context, run_line};
    use crate::error::{Error, Result};
    use crate::exposure::ShutterSpeed;
    use crate::geocode::{GeocodeMatch, Geocoder};
    use crate::model::Location;

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn reverse(&self, _location: Location) -> Result<Option<String>> {
            Ok(Some("Esplanadi, Helsinki".to_string()))
        }

        async fn search(&self, _query: &str) -> Result<Vec<GeocodeMatch>> {
            Ok(Vec::new())
        }
    }

    async fn roll_with_camera_and_lens(ctx: &super::Context) {
        run_line(ctx, &["camera", "add", "Nikon", "FM2", "--min-shutter", "1/4000", "--max-shutter", "1"])
            .await
            .unwrap();
        run_line(
            ctx,
            &["lens", "add", "Nikon", "AI-S 50", "--min-aperture", "1.4", "--max-aperture", "16", "--min-focal", "50", "--max-focal", "50"],
        )
        .await
        .unwrap();
        run_line(ctx, &["filter", "add", "Hoya", "Yellow"]).await.unwrap();
        run_line(ctx, &["mount", "lens", "add", "1", "1"]).await.unwrap();
        run_line(ctx, &["mount", "filter", "add", "1", "1"]).await.unwrap();
        run_line(ctx, &["roll", "add", "Test roll", "--camera", "1"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_frame_add_inherits_from_previous() {
        let ctx = context();
        roll_with_camera_and_lens(&ctx).await;

        run_line(
            &ctx,
            &["frame", "add", "1", "--lens", "1", "--focal-length", "50", "--filter", "1", "--shutter", "1/125"],
        )
        .await
        .unwrap();
        let text = run_line(&ctx, &["frame", "add", "1", "--aperture", "8"]).await.unwrap();
        assert!(text.contains("#2 on roll 1"));

        let second = ctx.storage().get_frame(2).unwrap().unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.lens_id, Some(1));
        assert_eq!(second.focal_length, Some(50));
        assert_eq!(second.filter_ids, vec![1]);
        assert!(second.shutter.is_none());
    }

    #[tokio::test]
    async fn test_frame_rejects_value_outside_camera_range() {
        let ctx = context();
        roll_with_camera_and_lens(&ctx).await;

        let err = run_line(&ctx, &["frame", "add", "1", "--shutter", "1/8000"]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "shutter", .. }));

        let err = run_line(&ctx, &["frame", "add", "1", "--lens", "1", "--aperture", "1.2"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "aperture", .. }));
        assert!(ctx.storage().list_frames(1, crate::storage::FrameSort::Count).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_frame_bulb_always_offered() {
        let ctx = context();
        roll_with_camera_and_lens(&ctx).await;
        run_line(&ctx, &["frame", "add", "1", "--shutter", "B"]).await.unwrap();
        assert_eq!(
            ctx.storage().get_frame(1).unwrap().unwrap().shutter,
            Some(ShutterSpeed::Bulb)
        );
    }

    #[tokio::test]
    async fn test_frame_rejects_unmountable_lens() {
        let ctx = context();
        roll_with_camera_and_lens(&ctx).await;
        run_line(&ctx, &["lens", "add", "Canon", "FD 50"]).await.unwrap();

        let err = run_line(&ctx, &["frame", "add", "1", "--lens", "2"]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "lens", .. }));
    }

    #[tokio::test]
    async fn test_inherited_lens_dropped_after_unmount() {
        let ctx = context();
        roll_with_camera_and_lens(&ctx).await;
        run_line(&ctx, &["frame", "add", "1", "--lens", "1"]).await.unwrap();
        run_line(&ctx, &["mount", "lens", "remove", "1", "1"]).await.unwrap();

        let text = run_line(&ctx, &["frame", "add", "1"]).await.unwrap();
        assert!(text.contains("cleared: lens"));
        assert!(ctx.storage().get_frame(2).unwrap().unwrap().lens_id.is_none());
    }

    #[tokio::test]
    async fn test_frame_edit_and_clear() {
        let ctx = context();
        roll_with_camera_and_lens(&ctx).await;
        run_line(&ctx, &["frame", "add", "1", "--lens", "1", "--note", "first"]).await.unwrap();

        run_line(&ctx, &["frame", "edit", "1", "--clear", "lens,note", "--comp", "-1/3"])
            .await
            .unwrap();
        let frame = ctx.storage().get_frame(1).unwrap().unwrap();
        assert!(frame.lens_id.is_none());
        assert!(frame.note.is_none());
        assert_eq!(frame.exposure_comp.unwrap().to_string(), "-1/3");
    }

    #[tokio::test]
    async fn test_frame_locate_with_lookup() {
        let ctx = context().with_geocoder(Arc::new(FixedGeocoder));
        run_line(&ctx, &["roll", "add", "R"]).await.unwrap();
        run_line(&ctx, &["frame", "add", "1"]).await.unwrap();

        let text = run_line(&ctx, &["frame", "locate", "1", "60.1675,24.9500", "--lookup"])
            .await
            .unwrap();
        assert!(text.contains("Esplanadi, Helsinki"));

        let frame = ctx.storage().get_frame(1).unwrap().unwrap();
        assert!((frame.location.unwrap().latitude - 60.1675).abs() < 1e-9);
        assert_eq!(frame.formatted_address.as_deref(), Some("Esplanadi, Helsinki"));
    }

    #[tokio::test]
    async fn test_frame_locate_without_key_fails_cleanly() {
        let ctx = context();
        run_line(&ctx, &["roll", "add", "R"]).await.unwrap();
        run_line(&ctx, &["frame", "add", "1"]).await.unwrap();

        let err = run_line(&ctx, &["frame", "locate", "1", "1,1", "--lookup"]).await.unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        assert!(ctx.storage().get_frame(1).unwrap().unwrap().location.is_none());
    }

    #[tokio::test]
    async fn test_frame_picture_attaches_file() {
        let pictures = tempfile::TempDir::new().unwrap();
        let mut config = crate::config::Config::default();
        config.storage.pictures_dir = Some(pictures.path().to_path_buf());
        let ctx = super::Context::new(config, crate::storage::Storage::open_in_memory().unwrap());
        run_line(&ctx, &["roll", "add", "R"]).await.unwrap();
        run_line(&ctx, &["frame", "add", "1"]).await.unwrap();

        let source = pictures.path().join("source.png");
        image::RgbImage::new(8, 8).save(&source).unwrap();
        let text = run_line(&ctx, &["frame", "picture", "1", source.to_str().unwrap()])
            .await
            .unwrap();
        assert!(text.contains(".jpg"));

        let name = ctx.storage().get_frame(1).unwrap().unwrap().picture_filename.unwrap();
        assert!(pictures.path().join(name).exists());
    }
}
