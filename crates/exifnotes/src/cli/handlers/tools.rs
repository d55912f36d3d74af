//! Value lists, geocoding, pictures, database maintenance, status and
//! configuration.

use std::io::Write;

use super::Context;
use crate::cli::output::write_json;
use crate::cli::{ConfigCommand, DbCommand, GeocodeCommand, PicturesCommand, ValuesCommand};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::exposure::{aperture_values, compensation_values, shutter_values};

const MASKED: &str = "********";

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(super) fn values(ctx: &Context, cmd: ValuesCommand, out: &mut dyn Write) -> Result<()> {
    match cmd {
        ValuesCommand::Shutter { increment } => {
            writeln!(out, "{}", join(shutter_values(increment)))?;
        }
        ValuesCommand::Aperture { increment } => {
            writeln!(out, "{}", join(&aperture_values(increment)))?;
        }
        ValuesCommand::Compensation { increment } => {
            writeln!(out, "{}", join(&compensation_values(increment)))?;
        }
        ValuesCommand::Frame { roll, lens, json } => {
            let storage = ctx.storage();
            let roll = storage
                .get_roll(roll)?
                .ok_or_else(|| Error::not_found("roll", roll))?;
            let options = storage.frame_options(&roll, lens)?;
            if json {
                write_json(out, &options)?;
                return Ok(());
            }

            let ids = |ids: &Option<Vec<i64>>| {
                ids.as_ref().map_or_else(|| "any".to_string(), |ids| join(ids))
            };
            let (min, max) = options.focal_length_range;
            writeln!(out, "Shutter:      {}", join(&options.shutter_values))?;
            writeln!(out, "Aperture:     {}", join(&options.aperture_values))?;
            writeln!(out, "Compensation: {}", join(&options.compensation_values))?;
            writeln!(out, "Focal length: {min}-{max} mm")?;
            writeln!(out, "Lenses:       {}", ids(&options.lens_ids))?;
            writeln!(out, "Filters:      {}", ids(&options.filter_ids))?;
        }
    }
    Ok(())
}

pub(super) async fn geocode(ctx: &Context, cmd: GeocodeCommand, out: &mut dyn Write) -> Result<()> {
    let geocoder = ctx.geocoder()?;
    match cmd {
        GeocodeCommand::Reverse { location } => match geocoder.reverse(location).await? {
            Some(address) => writeln!(out, "{address}")?,
            None => writeln!(out, "No address found for {}", location.to_dms())?,
        },
        GeocodeCommand::Search { query, json } => {
            let matches = geocoder.search(&query).await?;
            if json {
                write_json(out, &matches)?;
            } else if matches.is_empty() {
                writeln!(out, "No places match \"{query}\"")?;
            } else {
                for found in &matches {
                    writeln!(out, "{}\t{}", found.location, found.formatted_address)?;
                }
            }
        }
    }
    Ok(())
}

pub(super) fn pictures(ctx: &Context, cmd: PicturesCommand, out: &mut dyn Write) -> Result<()> {
    match cmd {
        PicturesCommand::Clean { dry_run } => {
            let store = ctx.pictures();
            let referenced = ctx.storage().picture_filenames()?;
            if dry_run {
                let unused = store.unused(&referenced)?;
                for name in &unused {
                    writeln!(out, "Would remove {name}")?;
                }
                writeln!(out, "{} unused picture(s)", unused.len())?;
            } else {
                let removed = store.remove_unused(&referenced)?;
                for name in &removed {
                    writeln!(out, "Removed {name}")?;
                }
                writeln!(out, "{} unused picture(s) removed", removed.len())?;
            }
        }
    }
    Ok(())
}

pub(super) fn db(ctx: &Context, cmd: DbCommand, out: &mut dyn Write) -> Result<()> {
    match cmd {
        DbCommand::Backup { target } => {
            ctx.storage().backup_to(&target)?;
            writeln!(out, "Database backed up to {}", target.display())?;
        }
    }
    Ok(())
}

pub(super) fn status(ctx: &Context, json: bool, out: &mut dyn Write) -> Result<()> {
    let storage = ctx.storage();
    let stats = storage.stats()?;
    let schema_version = storage.schema_version()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "pictures_dir": ctx.config().pictures_dir(),
            "schema_version": schema_version,
            "stats": stats,
        });
        write_json(out, &status)?;
    } else {
        writeln!(out, "exifnotes status")?;
        writeln!(out, "----------------")?;
        writeln!(out, "Database:      {}", storage.path().display())?;
        writeln!(out, "Schema:        v{schema_version}")?;
        writeln!(out, "Size:          {} bytes", stats.db_size_bytes)?;
        writeln!(out, "Pictures:      {}", ctx.config().pictures_dir().display())?;
        writeln!(out)?;
        writeln!(out, "{stats}")?;
    }
    Ok(())
}

/// The configuration as shown to the user, with the API key hidden.
fn masked(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.geocoding.api_key.is_some() {
        shown.geocoding.api_key = Some(MASKED.to_string());
    }
    shown
}

pub(super) fn config(config: &Config, cmd: ConfigCommand, out: &mut dyn Write) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = masked(config);
            if json {
                write_json(out, &config)?;
            } else {
                let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
                writeln!(out, "Current Configuration")?;
                writeln!(out, "=====================")?;
                writeln!(out)?;
                writeln!(out, "[Storage]")?;
                writeln!(out, "  Database path:      {}", config.database_path().display())?;
                writeln!(out, "  Pictures dir:       {}", config.pictures_dir().display())?;
                writeln!(out)?;
                writeln!(out, "[Exif]")?;
                writeln!(out, "  Artist:             {}", text(&config.exif.artist_name))?;
                writeln!(out, "  Copyright:          {}", text(&config.exif.copyright_info))?;
                writeln!(out, "  ExifTool:           {}", config.exif.exiftool().display())?;
                writeln!(
                    out,
                    "  Pictures path:      {}",
                    config
                        .exif
                        .pictures_path
                        .as_ref()
                        .map_or_else(|| "(current directory)".to_string(), |p| p.display().to_string())
                )?;
                writeln!(out, "  File ending:        {}", config.exif.file_ending)?;
                writeln!(out, "  Ignore warnings:    {}", config.exif.ignore_warnings)?;
                writeln!(out)?;
                writeln!(out, "[Geocoding]")?;
                writeln!(out, "  API key:            {}", text(&config.geocoding.api_key))?;
                writeln!(out, "  Endpoint:           {}", config.geocoding.endpoint)?;
                writeln!(out, "  Timeout:            {:?}", config.geocoding_timeout())?;
                writeln!(out)?;
                writeln!(out, "[Pictures]")?;
                writeln!(out, "  Max dimension:      {}", config.pictures.max_dimension)?;
                writeln!(out, "  JPEG quality:       {}", config.pictures.jpeg_quality)?;
                writeln!(out)?;
                writeln!(out, "[Display]")?;
                writeln!(out, "  Roll sort:          {}", config.display.roll_sort)?;
                writeln!(out, "  Frame sort:         {}", config.display.frame_sort)?;
            }
        }
        ConfigCommand::Path => {
            writeln!(out, "{}", Config::default_config_path().display())?;
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            writeln!(out, "Validating configuration: {}", path.display())?;
            match Config::load_from(Some(path)) {
                Ok(_) => writeln!(out, "Configuration is valid.")?,
                Err(e) => writeln!(out, "Configuration error: {e}")?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::super::test_support::{context, run_line};
    use super::*;
    use crate::geocode::{GeocodeMatch, Geocoder};
    use crate::model::Location;
    use crate::storage::Storage;

    struct Atlas;

    #[async_trait]
    impl Geocoder for Atlas {
        async fn reverse(&self, location: Location) -> Result<Option<String>> {
            if location.latitude > 0.0 {
                Ok(Some("Senaatintori, Helsinki".to_string()))
            } else {
                Ok(None)
            }
        }

        async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>> {
            if query.contains("Helsinki") {
                Ok(vec![GeocodeMatch {
                    formatted_address: "Helsinki, Finland".to_string(),
                    location: Location::new(60.1699, 24.9384).unwrap(),
                }])
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[tokio::test]
    async fn test_values_lists() {
        let ctx = context();
        let text = run_line(&ctx, &["values", "shutter", "full"]).await.unwrap();
        assert!(text.starts_with("1/8000 1/4000"));
        assert!(!text.contains("1/3200"));

        let text = run_line(&ctx, &["values", "aperture", "full"]).await.unwrap();
        assert!(text.contains("5.6 8.0 11"));

        let text = run_line(&ctx, &["values", "compensation", "half"]).await.unwrap();
        assert!(text.contains("-1/2 0 +1/2"));
    }

    #[tokio::test]
    async fn test_values_for_frame() {
        let ctx = context();
        run_line(&ctx, &["roll", "add", "R"]).await.unwrap();

        let text = run_line(&ctx, &["values", "frame", "1"]).await.unwrap();
        assert!(text.contains("Lenses:       any"));
        assert!(text.contains(" B\n"));

        let json = run_line(&ctx, &["values", "frame", "1", "--json"]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["lens_ids"].is_null());
        assert!(value["shutter_values"].as_array().unwrap().len() > 10);

        let err = run_line(&ctx, &["values", "frame", "7"]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_geocode_commands() {
        let ctx = context().with_geocoder(Arc::new(Atlas));
        let text = run_line(&ctx, &["geocode", "reverse", "60.17,24.95"]).await.unwrap();
        assert_eq!(text.trim(), "Senaatintori, Helsinki");

        let text = run_line(&ctx, &["geocode", "reverse", "-33.9,18.4"]).await.unwrap();
        assert!(text.starts_with("No address found"));

        let text = run_line(&ctx, &["geocode", "search", "Helsinki"]).await.unwrap();
        assert!(text.contains("Helsinki, Finland"));

        let json = run_line(&ctx, &["geocode", "search", "nowhere", "--json"]).await.unwrap();
        assert_eq!(json.trim(), "[]");
    }

    #[tokio::test]
    async fn test_pictures_clean() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.pictures_dir = Some(dir.path().to_path_buf());
        let ctx = Context::new(config, Storage::open_in_memory().unwrap());
        std::fs::write(dir.path().join("0123456789abcdef.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"mine").unwrap();

        let text = run_line(&ctx, &["pictures", "clean", "--dry-run"]).await.unwrap();
        assert!(text.contains("Would remove 0123456789abcdef.jpg"));
        assert!(!text.contains("notes.txt"));
        assert!(dir.path().join("0123456789abcdef.jpg").exists());

        let text = run_line(&ctx, &["pictures", "clean"]).await.unwrap();
        assert!(text.contains("Removed 0123456789abcdef.jpg"));
        assert!(!text.contains("notes.txt"));
        assert!(!dir.path().join("0123456789abcdef.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_db_backup() {
        let dir = TempDir::new().unwrap();
        let ctx = context();
        run_line(&ctx, &["roll", "add", "Kept"]).await.unwrap();

        let target = dir.path().join("backup.db");
        let target_arg = target.to_str().unwrap();
        run_line(&ctx, &["db", "backup", target_arg]).await.unwrap();

        let copy = Storage::open(&target).unwrap();
        assert_eq!(copy.stats().unwrap().rolls, 1);

        let err = run_line(&ctx, &["db", "backup", target_arg]).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_config_show_masks_api_key() {
        let mut config = Config::default();
        config.geocoding.api_key = Some("secret-key".to_string());

        let mut out = Vec::new();
        super::config(&config, ConfigCommand::Show { json: false }, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[Geocoding]"));
        assert!(!text.contains("secret-key"));

        let mut out = Vec::new();
        super::config(&config, ConfigCommand::Show { json: true }, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["geocoding"]["api_key"], MASKED);
    }

    #[test]
    fn test_config_validate_reports_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pictures]\njpeg_quality = 0\n").unwrap();

        let mut out = Vec::new();
        super::config(&Config::default(), ConfigCommand::Validate { file: Some(path) }, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Configuration error"));
    }
}
