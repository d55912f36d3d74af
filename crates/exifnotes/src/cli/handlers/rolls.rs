//! Roll commands.

use std::collections::HashMap;
use std::io::Write;

use tracing::info;

use super::{deleted, guard_delete, optional_text, Context};
use crate::cli::output::{opt, write_fields, write_json, Table};
use crate::cli::{OutputFormat, RollCommand, RollFields};
use crate::error::{Error, Result};
use crate::export::RollExport;
use crate::model::{Roll, DATE_FORMAT};
use crate::storage::{RollFilter, RollSummary, Storage};

fn date(value: Option<chrono::NaiveDateTime>) -> String {
    value.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

fn apply_roll_fields(storage: &Storage, roll: &mut Roll, fields: RollFields) -> Result<()> {
    if let Some(camera_id) = fields.camera {
        if storage.get_camera(camera_id)?.is_none() {
            return Err(Error::not_found("camera", camera_id));
        }
        roll.camera_id = Some(camera_id);
    }
    if let Some(film_id) = fields.film {
        let stock = storage
            .get_film_stock(film_id)?
            .ok_or_else(|| Error::not_found("film stock", film_id))?;
        roll.film_stock_id = Some(film_id);
        if fields.iso.is_none() {
            roll.iso = stock.iso;
        }
    }
    if let Some(iso) = fields.iso {
        roll.iso = iso;
    }
    if let Some(push_pull) = fields.push_pull {
        roll.push_pull = (!push_pull.is_zero()).then_some(push_pull);
    }
    if let Some(format) = fields.format {
        roll.format = format;
    }
    if let Some(note) = fields.note {
        roll.note = optional_text(note);
    }
    Ok(())
}

/// Report frames whose stored values the roll's gear no longer offers.
fn report_stale_frames(ctx: &Context, roll: &Roll, out: &mut dyn Write) -> Result<()> {
    let Some(roll_id) = roll.id else {
        return Ok(());
    };
    let storage = ctx.storage();
    for frame in storage.list_frames(roll_id, ctx.config().display.frame_sort)? {
        let options = storage.frame_options(roll, frame.lens_id)?;
        if let Err(e) = options.check(&frame) {
            writeln!(out, "Frame #{} needs attention: {e}", frame.count)?;
        }
    }
    Ok(())
}

fn write_rolls(rolls: &[RollSummary], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, rolls),
        OutputFormat::Table => {
            let mut table = Table::new(&["ID", "NAME", "LOADED", "FRAMES", "CAMERA", "FILM", "ISO"]);
            for summary in rolls {
                let roll = &summary.roll;
                table.row(vec![
                    opt(roll.id),
                    roll.name.clone(),
                    roll.date.format("%Y-%m-%d").to_string(),
                    summary.frame_count.to_string(),
                    summary.camera.clone().unwrap_or_default(),
                    summary.film_stock.clone().unwrap_or_default(),
                    roll.iso.to_string(),
                ]);
            }
            table.write_to(out)
        }
        OutputFormat::Plain => {
            for summary in rolls {
                let roll = &summary.roll;
                let archived = if roll.archived { " [archived]" } else { "" };
                writeln!(
                    out,
                    "{}\t{}\t{} frame(s){archived}",
                    opt(roll.id),
                    roll.name,
                    summary.frame_count
                )?;
            }
            Ok(())
        }
    }
}

fn show_roll(ctx: &Context, id: i64, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    let export = RollExport::load(storage, id)?;
    if format == OutputFormat::Json {
        return write_json(out, &export);
    }

    let roll = &export.roll;
    write_fields(
        out,
        &[
            ("ID", opt(roll.id)),
            ("Name", roll.name.clone()),
            ("Loaded", date(Some(roll.date))),
            ("Unloaded", date(roll.unloaded)),
            ("Developed", date(roll.developed)),
            ("Camera", opt(export.camera.as_ref())),
            ("Film stock", opt(export.film_stock.as_ref())),
            ("ISO", roll.iso.to_string()),
            ("Push/pull", opt(roll.push_pull)),
            ("Format", roll.format.to_string()),
            ("Archived", roll.archived.to_string()),
            ("Note", roll.note.clone().unwrap_or_default()),
        ],
    )?;

    if export.frames.is_empty() {
        return Ok(());
    }
    writeln!(out)?;

    let lens_names: HashMap<i64, String> = export
        .frames
        .iter()
        .filter_map(|f| f.lens.as_ref())
        .filter_map(|l| l.id.map(|id| (id, l.to_string())))
        .collect();
    let frames = storage.list_frames(id, ctx.config().display.frame_sort)?;

    let mut table = Table::new(&["#", "DATE", "SHUTTER", "APERTURE", "COMP", "FOCAL", "LENS", "NOTE"]);
    for frame in &frames {
        table.row(vec![
            frame.count.to_string(),
            frame.date.format(DATE_FORMAT).to_string(),
            opt(frame.shutter),
            frame.aperture.map(|a| format!("f/{a}")).unwrap_or_default(),
            opt(frame.exposure_comp),
            frame.focal_length.map(|mm| format!("{mm}mm")).unwrap_or_default(),
            frame
                .lens_id
                .and_then(|id| lens_names.get(&id).cloned())
                .unwrap_or_default(),
            frame.note.clone().unwrap_or_default(),
        ]);
    }
    table.write_to(out)
}

pub(super) fn roll(ctx: &Context, cmd: RollCommand, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    match cmd {
        RollCommand::Add { name, date, fields } => {
            let mut roll = Roll::new(name);
            if let Some(date) = date {
                roll.date = date;
            }
            apply_roll_fields(storage, &mut roll, fields)?;
            let id = storage.add_roll(&roll)?;
            writeln!(out, "Added roll {id}: {}", roll.name)?;
        }
        RollCommand::Edit {
            id,
            name,
            date,
            unloaded,
            developed,
            no_camera,
            fields,
        } => {
            let mut roll = storage
                .get_roll(id)?
                .ok_or_else(|| Error::not_found("roll", id))?;
            let previous_camera = roll.camera_id;
            if let Some(name) = name {
                roll.name = name;
            }
            if let Some(date) = date {
                roll.date = date;
            }
            if let Some(unloaded) = unloaded {
                roll.unloaded = Some(unloaded);
            }
            if let Some(developed) = developed {
                roll.developed = Some(developed);
            }
            if no_camera {
                roll.camera_id = None;
            }
            apply_roll_fields(storage, &mut roll, fields)?;
            storage.update_roll(&roll)?;
            writeln!(out, "Updated roll {id}: {}", roll.name)?;

            if roll.camera_id != previous_camera {
                report_stale_frames(ctx, &roll, out)?;
            }
        }
        RollCommand::List {
            archived,
            all,
            sort,
            output,
        } => {
            let filter = if all {
                RollFilter::All
            } else if archived {
                RollFilter::Archived
            } else {
                RollFilter::Active
            };
            let sort = sort.unwrap_or(ctx.config().display.roll_sort);
            write_rolls(&storage.list_rolls(filter, sort)?, output.format, out)?;
        }
        RollCommand::Show(args) => show_roll(ctx, args.id, args.output.format, out)?,
        RollCommand::Archive { id } => {
            storage.set_roll_archived(id, true)?;
            writeln!(out, "Archived roll {id}")?;
        }
        RollCommand::Unarchive { id } => {
            storage.set_roll_archived(id, false)?;
            writeln!(out, "Restored roll {id}")?;
        }
        RollCommand::Delete(args) => {
            let has_frames = storage.next_frame_count(args.id)? > 1;
            guard_delete("roll", args.id, has_frames, args.force)?;
            deleted("roll", args.id, storage.delete_roll(args.id)?)?;
            writeln!(out, "Deleted roll {}", args.id)?;
        }
        RollCommand::Export { id, format, output } => {
            let export = RollExport::load(storage, id)?;
            let rendered = export.render(format, &ctx.config().exif)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    info!("Exported roll {} as {} to {}", id, format, path.display());
                    writeln!(out, "Exported roll {id} to {}", path.display())?;
                }
                None => out.write_all(rendered.as_bytes())?,
            }
        }
    }
    Ok(())
}
