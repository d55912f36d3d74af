//! Cameras, lenses, filters, film stocks and what mounts on what.

use std::io::Write;

use super::{deleted, guard_delete, optional_text, Context};
use crate::cli::output::{opt, write_fields, write_json, Table};
use crate::cli::{
    CameraCommand, CameraFields, FilmCommand, FilmFields, FilterCommand, LensCommand, LensFields,
    LinkCommand, MountCommand, OutputFormat,
};
use crate::error::{Error, Result};
use crate::model::{Camera, FilmStock, Filter, Lens};
use crate::storage::FilmStockQuery;

fn range<T: ToString>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{} - {}", min.to_string(), max.to_string()),
        _ => String::new(),
    }
}

// === Cameras ===

fn apply_camera_fields(camera: &mut Camera, fields: CameraFields, out: &mut dyn Write) -> Result<()> {
    if let Some(serial) = fields.serial {
        camera.serial_number = optional_text(serial);
    }
    if let Some(increment) = fields.shutter_increments {
        if camera.set_shutter_increments(increment) {
            writeln!(out, "Shutter range cleared: not on the {increment} stop dial")?;
        }
    }
    if let (Some(min), Some(max)) = (fields.min_shutter, fields.max_shutter) {
        camera.min_shutter = Some(min);
        camera.max_shutter = Some(max);
    }
    if let Some(increment) = fields.comp_increments {
        camera.exposure_comp_increments = increment;
    }
    Ok(())
}

fn camera_fields(camera: &Camera) -> Vec<(&'static str, String)> {
    vec![
        ("ID", opt(camera.id)),
        ("Make", camera.make.clone()),
        ("Model", camera.model.clone()),
        ("Serial number", camera.serial_number.clone().unwrap_or_default()),
        ("Shutter range", range(camera.min_shutter, camera.max_shutter)),
        ("Shutter increments", camera.shutter_increments.to_string()),
        ("Compensation increments", camera.exposure_comp_increments.to_string()),
    ]
}

fn write_cameras(cameras: &[Camera], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, cameras),
        OutputFormat::Table => {
            let mut table = Table::new(&["ID", "MAKE", "MODEL", "SERIAL", "SHUTTER"]);
            for camera in cameras {
                table.row(vec![
                    opt(camera.id),
                    camera.make.clone(),
                    camera.model.clone(),
                    camera.serial_number.clone().unwrap_or_default(),
                    range(camera.min_shutter, camera.max_shutter),
                ]);
            }
            table.write_to(out)
        }
        OutputFormat::Plain => {
            for camera in cameras {
                writeln!(out, "{}\t{camera}", opt(camera.id))?;
            }
            Ok(())
        }
    }
}

pub(super) fn camera(ctx: &Context, cmd: CameraCommand, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    match cmd {
        CameraCommand::Add { make, model, fields } => {
            let mut camera = Camera::new(make, model);
            apply_camera_fields(&mut camera, fields, out)?;
            let id = storage.add_camera(&camera)?;
            writeln!(out, "Added camera {id}: {camera}")?;
        }
        CameraCommand::Edit {
            id,
            make,
            model,
            no_shutter_range,
            fields,
        } => {
            let mut camera = storage
                .get_camera(id)?
                .ok_or_else(|| Error::not_found("camera", id))?;
            if let Some(make) = make {
                camera.make = make;
            }
            if let Some(model) = model {
                camera.model = model;
            }
            if no_shutter_range {
                camera.min_shutter = None;
                camera.max_shutter = None;
            }
            apply_camera_fields(&mut camera, fields, out)?;
            storage.update_camera(&camera)?;
            writeln!(out, "Updated camera {id}: {camera}")?;
        }
        CameraCommand::List(output) => {
            write_cameras(&storage.list_cameras()?, output.format, out)?;
        }
        CameraCommand::Show(args) => {
            let camera = storage
                .get_camera(args.id)?
                .ok_or_else(|| Error::not_found("camera", args.id))?;
            let lenses = storage.lenses_for_camera(args.id)?;
            if args.output.format == OutputFormat::Json {
                write_json(out, &serde_json::json!({ "camera": camera, "lenses": lenses }))?;
            } else {
                let mut fields = camera_fields(&camera);
                fields.push((
                    "Mountable lenses",
                    lenses.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
                ));
                write_fields(out, &fields)?;
            }
        }
        CameraCommand::Delete(args) => {
            guard_delete("camera", args.id, storage.is_camera_in_use(args.id)?, args.force)?;
            deleted("camera", args.id, storage.delete_camera(args.id)?)?;
            writeln!(out, "Deleted camera {}", args.id)?;
        }
    }
    Ok(())
}

// === Lenses ===

fn apply_lens_fields(lens: &mut Lens, fields: LensFields, out: &mut dyn Write) -> Result<()> {
    if let Some(serial) = fields.serial {
        lens.serial_number = optional_text(serial);
    }
    if let Some(increment) = fields.aperture_increments {
        if lens.set_aperture_increments(increment) {
            writeln!(out, "Aperture range cleared: not on the {increment} stop ring")?;
        }
    }
    if let (Some(min), Some(max)) = (fields.min_aperture, fields.max_aperture) {
        lens.min_aperture = Some(min);
        lens.max_aperture = Some(max);
    }
    if let (Some(min), Some(max)) = (fields.min_focal, fields.max_focal) {
        lens.min_focal_length = Some(min);
        lens.max_focal_length = Some(max);
    }
    Ok(())
}

fn write_lenses(lenses: &[Lens], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, lenses),
        OutputFormat::Table => {
            let mut table = Table::new(&["ID", "MAKE", "MODEL", "APERTURE", "FOCAL"]);
            for lens in lenses {
                table.row(vec![
                    opt(lens.id),
                    lens.make.clone(),
                    lens.model.clone(),
                    range(lens.min_aperture, lens.max_aperture),
                    range(lens.min_focal_length, lens.max_focal_length),
                ]);
            }
            table.write_to(out)
        }
        OutputFormat::Plain => {
            for lens in lenses {
                writeln!(out, "{}\t{lens}", opt(lens.id))?;
            }
            Ok(())
        }
    }
}

pub(super) fn lens(ctx: &Context, cmd: LensCommand, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    match cmd {
        LensCommand::Add { make, model, fields } => {
            let mut lens = Lens::new(make, model);
            apply_lens_fields(&mut lens, fields, out)?;
            let id = storage.add_lens(&lens)?;
            writeln!(out, "Added lens {id}: {lens}")?;
        }
        LensCommand::Edit {
            id,
            make,
            model,
            no_aperture_range,
            no_focal_range,
            fields,
        } => {
            let mut lens = storage
                .get_lens(id)?
                .ok_or_else(|| Error::not_found("lens", id))?;
            if let Some(make) = make {
                lens.make = make;
            }
            if let Some(model) = model {
                lens.model = model;
            }
            if no_aperture_range {
                lens.min_aperture = None;
                lens.max_aperture = None;
            }
            if no_focal_range {
                lens.min_focal_length = None;
                lens.max_focal_length = None;
            }
            apply_lens_fields(&mut lens, fields, out)?;
            storage.update_lens(&lens)?;
            writeln!(out, "Updated lens {id}: {lens}")?;
        }
        LensCommand::List { camera, output } => {
            let lenses = match camera {
                Some(camera_id) => {
                    if storage.get_camera(camera_id)?.is_none() {
                        return Err(Error::not_found("camera", camera_id));
                    }
                    storage.lenses_for_camera(camera_id)?
                }
                None => storage.list_lenses()?,
            };
            write_lenses(&lenses, output.format, out)?;
        }
        LensCommand::Show(args) => {
            let lens = storage
                .get_lens(args.id)?
                .ok_or_else(|| Error::not_found("lens", args.id))?;
            let cameras = storage.cameras_for_lens(args.id)?;
            let filters = storage.filters_for_lens(args.id)?;
            if args.output.format == OutputFormat::Json {
                write_json(
                    out,
                    &serde_json::json!({ "lens": lens, "cameras": cameras, "filters": filters }),
                )?;
            } else {
                let join = |names: Vec<String>| names.join(", ");
                write_fields(
                    out,
                    &[
                        ("ID", opt(lens.id)),
                        ("Make", lens.make.clone()),
                        ("Model", lens.model.clone()),
                        ("Serial number", lens.serial_number.clone().unwrap_or_default()),
                        ("Aperture range", range(lens.min_aperture, lens.max_aperture)),
                        ("Aperture increments", lens.aperture_increments.to_string()),
                        ("Focal length", range(lens.min_focal_length, lens.max_focal_length)),
                        ("Cameras", join(cameras.iter().map(ToString::to_string).collect())),
                        ("Filters", join(filters.iter().map(ToString::to_string).collect())),
                    ],
                )?;
            }
        }
        LensCommand::Delete(args) => {
            guard_delete("lens", args.id, storage.is_lens_in_use(args.id)?, args.force)?;
            deleted("lens", args.id, storage.delete_lens(args.id)?)?;
            writeln!(out, "Deleted lens {}", args.id)?;
        }
    }
    Ok(())
}

// === Filters ===

fn write_filters(filters: &[Filter], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, filters),
        OutputFormat::Table => {
            let mut table = Table::new(&["ID", "MAKE", "MODEL"]);
            for filter in filters {
                table.row(vec![opt(filter.id), filter.make.clone(), filter.model.clone()]);
            }
            table.write_to(out)
        }
        OutputFormat::Plain => {
            for filter in filters {
                writeln!(out, "{}\t{filter}", opt(filter.id))?;
            }
            Ok(())
        }
    }
}

pub(super) fn filter(ctx: &Context, cmd: FilterCommand, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    match cmd {
        FilterCommand::Add { make, model } => {
            let filter = Filter::new(make, model);
            let id = storage.add_filter(&filter)?;
            writeln!(out, "Added filter {id}: {filter}")?;
        }
        FilterCommand::Edit { id, make, model } => {
            let mut filter = storage
                .get_filter(id)?
                .ok_or_else(|| Error::not_found("filter", id))?;
            if let Some(make) = make {
                filter.make = make;
            }
            if let Some(model) = model {
                filter.model = model;
            }
            storage.update_filter(&filter)?;
            writeln!(out, "Updated filter {id}: {filter}")?;
        }
        FilterCommand::List { lens, output } => {
            let filters = match lens {
                Some(lens_id) => {
                    if storage.get_lens(lens_id)?.is_none() {
                        return Err(Error::not_found("lens", lens_id));
                    }
                    storage.filters_for_lens(lens_id)?
                }
                None => storage.list_filters()?,
            };
            write_filters(&filters, output.format, out)?;
        }
        FilterCommand::Show(args) => {
            let filter = storage
                .get_filter(args.id)?
                .ok_or_else(|| Error::not_found("filter", args.id))?;
            let lenses = storage.lenses_for_filter(args.id)?;
            if args.output.format == OutputFormat::Json {
                write_json(out, &serde_json::json!({ "filter": filter, "lenses": lenses }))?;
            } else {
                write_fields(
                    out,
                    &[
                        ("ID", opt(filter.id)),
                        ("Make", filter.make.clone()),
                        ("Model", filter.model.clone()),
                        (
                            "Lenses",
                            lenses.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
                        ),
                    ],
                )?;
            }
        }
        FilterCommand::Delete(args) => {
            guard_delete("filter", args.id, storage.is_filter_in_use(args.id)?, args.force)?;
            deleted("filter", args.id, storage.delete_filter(args.id)?)?;
            writeln!(out, "Deleted filter {}", args.id)?;
        }
    }
    Ok(())
}

// === Film stocks ===

fn apply_film_fields(stock: &mut FilmStock, fields: FilmFields) {
    if let Some(film_type) = fields.film_type {
        stock.film_type = film_type;
    }
    if let Some(process) = fields.process {
        stock.process = process;
    }
}

fn write_film_stocks(stocks: &[FilmStock], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, stocks),
        OutputFormat::Table => {
            let mut table = Table::new(&["ID", "MAKE", "MODEL", "ISO", "TYPE", "PROCESS", "SOURCE"]);
            for stock in stocks {
                table.row(vec![
                    opt(stock.id),
                    stock.make.clone(),
                    stock.model.clone(),
                    stock.iso.to_string(),
                    stock.film_type.to_string(),
                    stock.process.to_string(),
                    if stock.preadded { "catalog" } else { "custom" }.to_string(),
                ]);
            }
            table.write_to(out)
        }
        OutputFormat::Plain => {
            for stock in stocks {
                writeln!(out, "{}\t{stock}\tISO {}", opt(stock.id), stock.iso)?;
            }
            Ok(())
        }
    }
}

pub(super) fn film(ctx: &Context, cmd: FilmCommand, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    match cmd {
        FilmCommand::Add {
            make,
            model,
            iso,
            fields,
        } => {
            let mut stock = FilmStock::new(make, model, iso);
            apply_film_fields(&mut stock, fields);
            let id = storage.add_film_stock(&stock)?;
            writeln!(out, "Added film stock {id}: {stock}")?;
        }
        FilmCommand::Edit {
            id,
            make,
            model,
            iso,
            fields,
        } => {
            let mut stock = storage
                .get_film_stock(id)?
                .ok_or_else(|| Error::not_found("film stock", id))?;
            if let Some(make) = make {
                stock.make = make;
            }
            if let Some(model) = model {
                stock.model = model;
            }
            if let Some(iso) = iso {
                stock.iso = iso;
            }
            apply_film_fields(&mut stock, fields);
            storage.update_film_stock(&stock)?;
            writeln!(out, "Updated film stock {id}: {stock}")?;
        }
        FilmCommand::List {
            make,
            custom,
            builtin,
            output,
        } => {
            let query = FilmStockQuery {
                make,
                preadded: match (custom, builtin) {
                    (true, _) => Some(false),
                    (_, true) => Some(true),
                    _ => None,
                },
            };
            write_film_stocks(&storage.list_film_stocks(&query)?, output.format, out)?;
        }
        FilmCommand::Makes => {
            for make in storage.film_stock_makes()? {
                writeln!(out, "{make}")?;
            }
        }
        FilmCommand::Show(args) => {
            let stock = storage
                .get_film_stock(args.id)?
                .ok_or_else(|| Error::not_found("film stock", args.id))?;
            if args.output.format == OutputFormat::Json {
                write_json(out, &stock)?;
            } else {
                write_fields(
                    out,
                    &[
                        ("ID", opt(stock.id)),
                        ("Make", stock.make.clone()),
                        ("Model", stock.model.clone()),
                        ("ISO", stock.iso.to_string()),
                        ("Type", stock.film_type.to_string()),
                        ("Process", stock.process.to_string()),
                        ("Catalog", stock.preadded.to_string()),
                    ],
                )?;
            }
        }
        FilmCommand::Delete(args) => {
            guard_delete(
                "film stock",
                args.id,
                storage.is_film_stock_in_use(args.id)?,
                args.force,
            )?;
            deleted("film stock", args.id, storage.delete_film_stock(args.id)?)?;
            writeln!(out, "Deleted film stock {}", args.id)?;
        }
    }
    Ok(())
}

// === Mountables ===

pub(super) fn mount(ctx: &Context, cmd: MountCommand, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    match cmd {
        MountCommand::Lens(LinkCommand::Add { holder, item }) => {
            storage.add_camera_lens(holder, item)?;
            writeln!(out, "Lens {item} mounts on camera {holder}")?;
        }
        MountCommand::Lens(LinkCommand::Remove { holder, item }) => {
            if storage.remove_camera_lens(holder, item)? {
                writeln!(out, "Lens {item} no longer mounts on camera {holder}")?;
            } else {
                writeln!(out, "Lens {item} was not linked to camera {holder}")?;
            }
        }
        MountCommand::Lens(LinkCommand::List { holder, output }) => {
            if storage.get_camera(holder)?.is_none() {
                return Err(Error::not_found("camera", holder));
            }
            write_lenses(&storage.lenses_for_camera(holder)?, output.format, out)?;
        }
        MountCommand::Filter(LinkCommand::Add { holder, item }) => {
            storage.add_lens_filter(holder, item)?;
            writeln!(out, "Filter {item} fits lens {holder}")?;
        }
        MountCommand::Filter(LinkCommand::Remove { holder, item }) => {
            if storage.remove_lens_filter(holder, item)? {
                writeln!(out, "Filter {item} no longer fits lens {holder}")?;
            } else {
                writeln!(out, "Filter {item} was not linked to lens {holder}")?;
            }
        }
        MountCommand::Filter(LinkCommand::List { holder, output }) => {
            if storage.get_lens(holder)?.is_none() {
                return Err(Error::not_found("lens", holder));
            }
            write_filters(&storage.filters_for_lens(holder)?, output.format, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, run_line};
    use crate::error::Error;

    #[tokio::test]
    async fn test_camera_add_edit_show() {
        let ctx = context();
        let text = run_line(
            &ctx,
            &["camera", "add", "Nikon", "FM2", "--min-shutter", "1/4000", "--max-shutter", "1", "--serial", "N123"],
        )
        .await
        .unwrap();
        assert!(text.starts_with("Added camera 1: Nikon FM2"));

        run_line(&ctx, &["camera", "edit", "1", "--model", "FM2n"]).await.unwrap();
        let camera = ctx.storage().get_camera(1).unwrap().unwrap();
        assert_eq!(camera.model, "FM2n");
        assert_eq!(camera.serial_number.as_deref(), Some("N123"));
        assert!(camera.min_shutter.is_some());

        let shown = run_line(&ctx, &["camera", "show", "1"]).await.unwrap();
        assert!(shown.contains("Shutter range:"));
        assert!(shown.contains("1/4000 - 1\""));
    }

    #[tokio::test]
    async fn test_camera_edit_increment_clears_range() {
        let ctx = context();
        run_line(&ctx, &["camera", "add", "Canon", "AE-1", "--min-shutter", "1/1250", "--max-shutter", "1"])
            .await
            .unwrap();
        let text = run_line(&ctx, &["camera", "edit", "1", "--shutter-increments", "full"])
            .await
            .unwrap();
        assert!(text.contains("Shutter range cleared"));
        assert!(ctx.storage().get_camera(1).unwrap().unwrap().min_shutter.is_none());
    }

    #[tokio::test]
    async fn test_camera_validation_leaves_database_untouched() {
        let ctx = context();
        let err = run_line(&ctx, &["camera", "add", "Nikon", " "]).await.unwrap_err();
        assert!(err.is_validation());
        assert!(ctx.storage().list_cameras().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_missing_record() {
        let ctx = context();
        let err = run_line(&ctx, &["lens", "edit", "9", "--model", "X"]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_lens_list_for_camera_and_table() {
        let ctx = context();
        run_line(&ctx, &["camera", "add", "Leica", "M6"]).await.unwrap();
        run_line(
            &ctx,
            &["lens", "add", "Leica", "Summicron 50", "--min-aperture", "2", "--max-aperture", "16", "--min-focal", "50", "--max-focal", "50"],
        )
        .await
        .unwrap();
        run_line(&ctx, &["lens", "add", "Nikon", "AI 28"]).await.unwrap();
        run_line(&ctx, &["mount", "lens", "add", "1", "1"]).await.unwrap();

        let plain = run_line(&ctx, &["lens", "list", "--camera", "1"]).await.unwrap();
        assert_eq!(plain, "1\tLeica Summicron 50\n");

        let table = run_line(&ctx, &["lens", "list", "-f", "table"]).await.unwrap();
        assert!(table.starts_with("ID  MAKE"));
        assert!(table.contains("2.0 - 16"));
        assert!(table.contains("50 - 50"));
    }

    #[tokio::test]
    async fn test_delete_in_use_requires_force() {
        let ctx = context();
        run_line(&ctx, &["camera", "add", "Nikon", "F3"]).await.unwrap();
        run_line(&ctx, &["roll", "add", "Roll one", "--camera", "1"]).await.unwrap();

        let err = run_line(&ctx, &["camera", "delete", "1"]).await.unwrap_err();
        assert!(matches!(err, Error::InUse { entity: "camera", id: 1 }));
        assert!(ctx.storage().get_camera(1).unwrap().is_some());

        run_line(&ctx, &["camera", "delete", "1", "--force"]).await.unwrap();
        assert!(ctx.storage().get_camera(1).unwrap().is_none());
        assert!(ctx.storage().get_roll(1).unwrap().unwrap().camera_id.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let ctx = context();
        let err = run_line(&ctx, &["filter", "delete", "3"]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_film_list_custom_only() {
        let ctx = context();
        run_line(&ctx, &["film", "add", "Homebrew", "Lab 100", "--iso", "100", "--type", "bw_negative"])
            .await
            .unwrap();
        let json = run_line(&ctx, &["film", "list", "--custom", "-f", "json"]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let stocks = value.as_array().unwrap();
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0]["model"], "Lab 100");
        assert_eq!(stocks[0]["film_type"], "bw_negative");
    }

    #[tokio::test]
    async fn test_mount_filter_and_list() {
        let ctx = context();
        run_line(&ctx, &["lens", "add", "Nikon", "AI 50"]).await.unwrap();
        run_line(&ctx, &["filter", "add", "Hoya", "Red 25A"]).await.unwrap();
        run_line(&ctx, &["mount", "filter", "add", "1", "1"]).await.unwrap();

        let listed = run_line(&ctx, &["mount", "filter", "list", "1"]).await.unwrap();
        assert_eq!(listed, "1\tHoya Red 25A\n");

        let removed = run_line(&ctx, &["mount", "filter", "remove", "1", "1"]).await.unwrap();
        assert!(removed.contains("no longer fits"));
        assert!(run_line(&ctx, &["mount", "filter", "list", "5"]).await.unwrap_err().is_not_found());
    }
}
