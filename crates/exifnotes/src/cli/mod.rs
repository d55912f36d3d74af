//! Command-line interface for exifnotes.
//!
//! This module provides the CLI structure and command handlers for the
//! `exifnotes` binary.

mod commands;
mod handlers;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CameraCommand, CameraFields, ConfigCommand, DbCommand, DeleteArgs, FilmCommand, FilmFields,
    FilterCommand, FormatArg, FrameCommand, FrameField, FrameFields, GeocodeCommand, LensCommand,
    LensFields, LinkCommand, MountCommand, OutputFormat, PicturesCommand, RollCommand, RollFields,
    ShowArgs, StatusCommand, ValuesCommand,
};
pub use handlers::{run, Context};

/// exifnotes - Metadata logbook for film photographers
///
/// Records cameras, lenses, filters, film stocks, rolls and the exposure
/// settings of every frame, and exports them for ExifTool.
#[derive(Debug, Parser)]
#[command(name = "exifnotes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage cameras
    #[command(subcommand)]
    Camera(CameraCommand),

    /// Manage lenses
    #[command(subcommand)]
    Lens(LensCommand),

    /// Manage filters
    #[command(subcommand)]
    Filter(FilterCommand),

    /// Manage film stocks
    #[command(subcommand)]
    Film(FilmCommand),

    /// Manage rolls
    #[command(subcommand)]
    Roll(RollCommand),

    /// Manage frames
    #[command(subcommand)]
    Frame(FrameCommand),

    /// Manage which lenses and filters fit which gear
    #[command(subcommand)]
    Mount(MountCommand),

    /// Print the value lists offered for exposure settings
    #[command(subcommand)]
    Values(ValuesCommand),

    /// Look up addresses and coordinates
    #[command(subcommand)]
    Geocode(GeocodeCommand),

    /// Manage complementary pictures
    #[command(subcommand)]
    Pictures(PicturesCommand),

    /// Database maintenance
    #[command(subcommand)]
    Db(DbCommand),

    /// Show database status
    Status(StatusCommand),

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::{ExposureOffset, ShutterSpeed};
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_debug() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "exifnotes");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        let mut cli = parse(&["exifnotes", "status"]);
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);
        cli.verbose = 1;
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);
        cli.verbose = 2;
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
        cli.quiet = true;
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["exifnotes", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_camera_add() {
        let cli = parse(&[
            "exifnotes",
            "camera",
            "add",
            "Nikon",
            "F3",
            "--min-shutter",
            "1/2000",
            "--max-shutter",
            "8\"",
            "--shutter-increments",
            "full",
        ]);
        match cli.command {
            Command::Camera(CameraCommand::Add { make, model, fields }) => {
                assert_eq!(make, "Nikon");
                assert_eq!(model, "F3");
                assert_eq!(fields.min_shutter, Some(ShutterSpeed::Fraction(2000)));
                assert!(fields.max_shutter.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_shutter_range_needs_both_bounds() {
        assert!(Cli::try_parse_from(["exifnotes", "camera", "add", "A", "B", "--min-shutter", "1/1000"])
            .is_err());
    }

    #[test]
    fn test_parse_invalid_shutter() {
        assert!(Cli::try_parse_from([
            "exifnotes",
            "frame",
            "add",
            "1",
            "--shutter",
            "fast"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_frame_add_negative_comp() {
        let cli = parse(&["exifnotes", "frame", "add", "3", "--comp", "-1/3", "--filter", "2", "--filter", "5"]);
        match cli.command {
            Command::Frame(FrameCommand::Add { roll, count, fields }) => {
                assert_eq!(roll, 3);
                assert!(count.is_none());
                assert_eq!(fields.comp, Some(ExposureOffset::from_sixths(-2)));
                assert_eq!(fields.filters, vec![2, 5]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_frame_edit_clear() {
        let cli = parse(&["exifnotes", "frame", "edit", "9", "--clear", "lens,focal-length"]);
        match cli.command {
            Command::Frame(FrameCommand::Edit { clear, .. }) => {
                assert_eq!(clear, vec![FrameField::Lens, FrameField::FocalLength]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_frame_locate_southern_hemisphere() {
        let cli = parse(&["exifnotes", "frame", "locate", "4", "-33.8568,151.2153", "--lookup"]);
        match cli.command {
            Command::Frame(FrameCommand::Locate { id, location, lookup }) => {
                assert_eq!(id, 4);
                assert!(location.latitude < 0.0);
                assert!(lookup);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_roll_list_flags_conflict() {
        assert!(Cli::try_parse_from(["exifnotes", "roll", "list", "--archived", "--all"]).is_err());
        let cli = parse(&["exifnotes", "roll", "list", "--sort", "name", "-f", "json"]);
        assert!(matches!(
            cli.command,
            Command::Roll(RollCommand::List { all: false, archived: false, sort: Some(_), .. })
        ));
    }

    #[test]
    fn test_parse_roll_export() {
        let cli = parse(&["exifnotes", "roll", "export", "2", "--format", "exiftool", "-o", "out.sh"]);
        assert!(matches!(
            cli.command,
            Command::Roll(RollCommand::Export { id: 2, output: Some(_), .. })
        ));
    }

    #[test]
    fn test_parse_mount_lens() {
        let cli = parse(&["exifnotes", "mount", "lens", "add", "1", "4"]);
        assert!(matches!(
            cli.command,
            Command::Mount(MountCommand::Lens(LinkCommand::Add { holder: 1, item: 4 }))
        ));
    }

    #[test]
    fn test_parse_delete_force() {
        let cli = parse(&["exifnotes", "lens", "delete", "7", "--force"]);
        assert!(matches!(
            cli.command,
            Command::Lens(LensCommand::Delete(DeleteArgs { id: 7, force: true }))
        ));
    }

    #[test]
    fn test_parse_values_default_increment() {
        let cli = parse(&["exifnotes", "values", "shutter"]);
        assert!(matches!(
            cli.command,
            Command::Values(ValuesCommand::Shutter { increment: crate::exposure::Increment::Third })
        ));
    }
}
