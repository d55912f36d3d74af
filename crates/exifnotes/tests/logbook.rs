//! End-to-end use of the logbook through the public API.

use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use tempfile::TempDir;

use exifnotes::cli::{Cli, Context};
use exifnotes::config::ExifConfig;
use exifnotes::export::{ExportFormat, RollExport};
use exifnotes::geocode::{GeocodeMatch, Geocoder};
use exifnotes::storage::FrameSort;
use exifnotes::{Config, Location, Result, ShutterSpeed, Storage};

struct Offline;

#[async_trait]
impl Geocoder for Offline {
    async fn reverse(&self, _location: Location) -> Result<Option<String>> {
        Ok(Some("Kauppatori, Helsinki".to_string()))
    }

    async fn search(&self, _query: &str) -> Result<Vec<GeocodeMatch>> {
        Ok(Vec::new())
    }
}

async fn run(ctx: &Context, line: &str) -> Result<String> {
    let mut argv = vec!["exifnotes"];
    argv.extend(line.split_whitespace());
    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    ctx.execute(cli.command, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

fn context(dir: &TempDir) -> Context {
    let mut config = Config::default();
    config.storage.database_path = Some(dir.path().join("exifnotes.db"));
    config.storage.pictures_dir = Some(dir.path().join("pictures"));
    Context::open(config).unwrap().with_geocoder(Arc::new(Offline))
}

#[tokio::test]
async fn test_shoot_and_export_a_roll() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    run(&ctx, "camera add Nikon FM2 --min-shutter 1/4000 --max-shutter 1").await.unwrap();
    run(&ctx, "lens add Nikon 50/1.4 --min-aperture 1.4 --max-aperture 16 --min-focal 50 --max-focal 50")
        .await
        .unwrap();
    run(&ctx, "mount lens add 1 1").await.unwrap();
    run(&ctx, "roll add Summer --camera 1 --iso 400").await.unwrap();

    run(&ctx, "frame add 1 --lens 1 --focal-length 50 --shutter 1/125 --aperture 5.6")
        .await
        .unwrap();
    run(&ctx, "frame add 1 --shutter 1/250 --aperture 8 --comp -1/3").await.unwrap();
    run(&ctx, "frame locate 2 60.1676,24.9532 --lookup").await.unwrap();

    let storage = ctx.storage();
    let frames = storage.list_frames(1, FrameSort::Count).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].lens_id, Some(1));
    assert_eq!(frames[1].shutter, Some(ShutterSpeed::Fraction(250)));
    assert_eq!(frames[1].formatted_address.as_deref(), Some("Kauppatori, Helsinki"));

    let export = RollExport::load(storage, 1).unwrap();
    let exif = ExifConfig {
        artist_name: Some("A. Photographer".to_string()),
        ..ExifConfig::default()
    };

    let csv = export.render(ExportFormat::Csv, &exif).unwrap();
    assert!(csv.contains("Summer"));
    assert!(csv.contains("Nikon FM2"));
    assert!(csv.contains("f/5.6"));

    let commands = export.render(ExportFormat::Exiftool, &exif).unwrap();
    let lines: Vec<&str> = commands.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("-FNumber=5.6"));
    assert!(lines[0].ends_with("*_1.jpg"));
    assert!(lines[1].contains("-ExposureCompensation=-0.33"));
}

#[tokio::test]
async fn test_rejected_frame_leaves_roll_unchanged() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    run(&ctx, "camera add Canon AE-1 --min-shutter 1/1000 --max-shutter 2").await.unwrap();
    run(&ctx, "roll add Winter --camera 1").await.unwrap();

    let err = run(&ctx, "frame add 1 --shutter 1/4000").await.unwrap_err();
    assert!(err.to_string().contains("shutter"));
    assert_eq!(ctx.storage().stats().unwrap().frames, 0);
}

#[tokio::test]
async fn test_database_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let ctx = context(&dir);
        run(&ctx, "roll add Kept").await.unwrap();
        run(&ctx, "frame add 1 --note first").await.unwrap();
    }

    let storage = Storage::open(dir.path().join("exifnotes.db")).unwrap();
    let frame = storage.get_frame(1).unwrap().unwrap();
    assert_eq!(frame.note.as_deref(), Some("first"));
    assert_eq!(storage.next_frame_count(1).unwrap(), 2);
}
