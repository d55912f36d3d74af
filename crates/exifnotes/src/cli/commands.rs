//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Args, Subcommand, ValueEnum};

use crate::export::ExportFormat;
use crate::exposure::{Aperture, CompIncrement, ExposureOffset, Increment, ShutterSpeed};
use crate::model::{parse_datetime, FilmFormat, FilmProcess, FilmType, LightSource, Location};
use crate::storage::{FrameSort, RollSort};

fn parse_date(input: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(input).map_err(|e| e.to_string())
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

/// Output format argument shared by list and show commands.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct FormatArg {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Delete command arguments.
#[derive(Debug, Clone, Copy, Args)]
pub struct DeleteArgs {
    /// Row id of the record
    pub id: i64,

    /// Delete even if other records reference it
    #[arg(long)]
    pub force: bool,
}

/// Show command arguments.
#[derive(Debug, Clone, Copy, Args)]
pub struct ShowArgs {
    /// Row id of the record
    pub id: i64,

    #[command(flatten)]
    pub output: FormatArg,
}

// === Cameras ===

/// Optional camera settings shared by `add` and `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct CameraFields {
    /// Serial number (empty to clear)
    #[arg(long)]
    pub serial: Option<String>,

    /// Fastest shutter speed, e.g. 1/4000
    #[arg(long, requires = "max_shutter")]
    pub min_shutter: Option<ShutterSpeed>,

    /// Slowest shutter speed, e.g. 30"
    #[arg(long, requires = "min_shutter")]
    pub max_shutter: Option<ShutterSpeed>,

    /// Shutter speed increments
    #[arg(long)]
    pub shutter_increments: Option<Increment>,

    /// Exposure compensation increments
    #[arg(long)]
    pub comp_increments: Option<CompIncrement>,
}

/// Camera commands.
#[derive(Debug, Subcommand)]
pub enum CameraCommand {
    /// Add a camera
    Add {
        /// Manufacturer
        make: String,
        /// Model name
        model: String,
        #[command(flatten)]
        fields: CameraFields,
    },

    /// Change a camera
    Edit {
        /// Row id of the camera
        id: i64,
        /// New manufacturer
        #[arg(long)]
        make: Option<String>,
        /// New model name
        #[arg(long)]
        model: Option<String>,
        /// Forget the shutter speed range
        #[arg(long, conflicts_with_all = ["min_shutter", "max_shutter"])]
        no_shutter_range: bool,
        #[command(flatten)]
        fields: CameraFields,
    },

    /// List cameras
    List(FormatArg),

    /// Show one camera with its mountable lenses
    Show(ShowArgs),

    /// Delete a camera
    Delete(DeleteArgs),
}

// === Lenses ===

/// Optional lens settings shared by `add` and `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct LensFields {
    /// Serial number (empty to clear)
    #[arg(long)]
    pub serial: Option<String>,

    /// Widest aperture, e.g. 1.4
    #[arg(long, requires = "max_aperture")]
    pub min_aperture: Option<Aperture>,

    /// Narrowest aperture, e.g. 16
    #[arg(long, requires = "min_aperture")]
    pub max_aperture: Option<Aperture>,

    /// Shortest focal length in mm
    #[arg(long, requires = "max_focal")]
    pub min_focal: Option<u32>,

    /// Longest focal length in mm
    #[arg(long, requires = "min_focal")]
    pub max_focal: Option<u32>,

    /// Aperture increments
    #[arg(long)]
    pub aperture_increments: Option<Increment>,
}

/// Lens commands.
#[derive(Debug, Subcommand)]
pub enum LensCommand {
    /// Add a lens
    Add {
        /// Manufacturer
        make: String,
        /// Model name
        model: String,
        #[command(flatten)]
        fields: LensFields,
    },

    /// Change a lens
    Edit {
        /// Row id of the lens
        id: i64,
        /// New manufacturer
        #[arg(long)]
        make: Option<String>,
        /// New model name
        #[arg(long)]
        model: Option<String>,
        /// Forget the aperture range
        #[arg(long, conflicts_with_all = ["min_aperture", "max_aperture"])]
        no_aperture_range: bool,
        /// Forget the focal length range
        #[arg(long, conflicts_with_all = ["min_focal", "max_focal"])]
        no_focal_range: bool,
        #[command(flatten)]
        fields: LensFields,
    },

    /// List lenses
    List {
        /// Only lenses mountable on this camera
        #[arg(long)]
        camera: Option<i64>,
        #[command(flatten)]
        output: FormatArg,
    },

    /// Show one lens with its cameras and filters
    Show(ShowArgs),

    /// Delete a lens
    Delete(DeleteArgs),
}

// === Filters ===

/// Filter commands.
#[derive(Debug, Subcommand)]
pub enum FilterCommand {
    /// Add a filter
    Add {
        /// Manufacturer
        make: String,
        /// Model name
        model: String,
    },

    /// Change a filter
    Edit {
        /// Row id of the filter
        id: i64,
        /// New manufacturer
        #[arg(long)]
        make: Option<String>,
        /// New model name
        #[arg(long)]
        model: Option<String>,
    },

    /// List filters
    List {
        /// Only filters mountable on this lens
        #[arg(long)]
        lens: Option<i64>,
        #[command(flatten)]
        output: FormatArg,
    },

    /// Show one filter
    Show(ShowArgs),

    /// Delete a filter
    Delete(DeleteArgs),
}

// === Film stocks ===

/// Optional film stock settings shared by `add` and `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilmFields {
    /// Emulsion type
    #[arg(long = "type")]
    pub film_type: Option<FilmType>,

    /// Development process
    #[arg(long)]
    pub process: Option<FilmProcess>,
}

/// Film stock commands.
#[derive(Debug, Subcommand)]
pub enum FilmCommand {
    /// Add a film stock
    Add {
        /// Manufacturer
        make: String,
        /// Model name
        model: String,
        /// Box speed (0 if unknown)
        #[arg(long, default_value_t = 0)]
        iso: u32,
        #[command(flatten)]
        fields: FilmFields,
    },

    /// Change a film stock
    Edit {
        /// Row id of the film stock
        id: i64,
        /// New manufacturer
        #[arg(long)]
        make: Option<String>,
        /// New model name
        #[arg(long)]
        model: Option<String>,
        /// New box speed
        #[arg(long)]
        iso: Option<u32>,
        #[command(flatten)]
        fields: FilmFields,
    },

    /// List film stocks
    List {
        /// Only stocks from this manufacturer
        #[arg(long)]
        make: Option<String>,
        /// Only stocks you added yourself
        #[arg(long, conflicts_with = "builtin")]
        custom: bool,
        /// Only stocks from the built-in catalog
        #[arg(long)]
        builtin: bool,
        #[command(flatten)]
        output: FormatArg,
    },

    /// List film manufacturers
    Makes,

    /// Show one film stock
    Show(ShowArgs),

    /// Delete a film stock
    Delete(DeleteArgs),
}

// === Rolls ===

/// Optional roll settings shared by `add` and `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct RollFields {
    /// Camera the roll is loaded in
    #[arg(long)]
    pub camera: Option<i64>,

    /// Film stock
    #[arg(long)]
    pub film: Option<i64>,

    /// Rated ISO (defaults to the film stock's)
    #[arg(long)]
    pub iso: Option<u32>,

    /// Push or pull in stops, e.g. +1 or -1/2
    #[arg(long, allow_hyphen_values = true)]
    pub push_pull: Option<ExposureOffset>,

    /// Film format
    #[arg(long)]
    pub format: Option<FilmFormat>,

    /// Note (empty to clear)
    #[arg(long)]
    pub note: Option<String>,
}

/// Roll commands.
#[derive(Debug, Subcommand)]
pub enum RollCommand {
    /// Load a new roll
    Add {
        /// Roll name
        name: String,
        /// Load date (defaults to now)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
        #[command(flatten)]
        fields: RollFields,
    },

    /// Change a roll
    Edit {
        /// Row id of the roll
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// Load date
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
        /// Unload date
        #[arg(long, value_parser = parse_date)]
        unloaded: Option<NaiveDateTime>,
        /// Development date
        #[arg(long, value_parser = parse_date)]
        developed: Option<NaiveDateTime>,
        /// Remove the camera
        #[arg(long, conflicts_with = "camera")]
        no_camera: bool,
        #[command(flatten)]
        fields: RollFields,
    },

    /// List rolls
    List {
        /// Show archived rolls instead of active ones
        #[arg(long, conflicts_with = "all")]
        archived: bool,
        /// Show active and archived rolls
        #[arg(long)]
        all: bool,
        /// Sort order (defaults to the configured one)
        #[arg(long)]
        sort: Option<RollSort>,
        #[command(flatten)]
        output: FormatArg,
    },

    /// Show a roll with its frames
    Show(ShowArgs),

    /// Move a roll to the archive
    Archive {
        /// Row id of the roll
        id: i64,
    },

    /// Bring a roll back from the archive
    Unarchive {
        /// Row id of the roll
        id: i64,
    },

    /// Delete a roll and its frames
    Delete(DeleteArgs),

    /// Export a roll
    Export {
        /// Row id of the roll
        id: i64,
        /// Export format
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

// === Frames ===

/// Frame fields that `frame edit --clear` can reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrameField {
    /// Lens
    Lens,
    /// Shutter speed
    Shutter,
    /// Aperture
    Aperture,
    /// Exposure compensation
    Comp,
    /// Focal length
    FocalLength,
    /// Note
    Note,
    /// GPS location and address
    Location,
    /// Filters
    Filters,
    /// Complementary picture
    Picture,
}

/// Optional frame settings shared by `add` and `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct FrameFields {
    /// Exposure date (defaults to now)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDateTime>,

    /// Lens used
    #[arg(long)]
    pub lens: Option<i64>,

    /// Shutter speed, e.g. 1/125 or B
    #[arg(long)]
    pub shutter: Option<ShutterSpeed>,

    /// Aperture, e.g. 5.6
    #[arg(long)]
    pub aperture: Option<Aperture>,

    /// Exposure compensation, e.g. -1/3
    #[arg(long, allow_hyphen_values = true)]
    pub comp: Option<ExposureOffset>,

    /// Focal length in mm
    #[arg(long)]
    pub focal_length: Option<u32>,

    /// Filters used (replaces the current set)
    #[arg(long = "filter", value_name = "ID")]
    pub filters: Vec<i64>,

    /// Number of exposures on the frame
    #[arg(long)]
    pub exposures: Option<u32>,

    /// Flash fired
    #[arg(long)]
    pub flash: Option<bool>,

    /// Light source
    #[arg(long)]
    pub light: Option<LightSource>,

    /// Note (empty to clear)
    #[arg(long)]
    pub note: Option<String>,
}

/// Frame commands.
#[derive(Debug, Subcommand)]
pub enum FrameCommand {
    /// Add the next frame to a roll
    Add {
        /// Row id of the roll
        roll: i64,
        /// Frame number (defaults to the one after the last frame)
        #[arg(long)]
        count: Option<u32>,
        #[command(flatten)]
        fields: FrameFields,
    },

    /// Change a frame
    Edit {
        /// Row id of the frame
        id: i64,
        /// New frame number
        #[arg(long)]
        count: Option<u32>,
        /// Reset these fields
        #[arg(long, value_enum, value_delimiter = ',')]
        clear: Vec<FrameField>,
        #[command(flatten)]
        fields: FrameFields,
    },

    /// List the frames of a roll
    List {
        /// Row id of the roll
        roll: i64,
        /// Sort order (defaults to the configured one)
        #[arg(long)]
        sort: Option<FrameSort>,
        #[command(flatten)]
        output: FormatArg,
    },

    /// Show one frame
    Show(ShowArgs),

    /// Delete a frame
    Delete {
        /// Row id of the frame
        id: i64,
    },

    /// Set the GPS location of a frame
    Locate {
        /// Row id of the frame
        id: i64,
        /// Coordinates as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        location: Location,
        /// Look up the address for the coordinates
        #[arg(long)]
        lookup: bool,
    },

    /// Attach a complementary picture to a frame
    Picture {
        /// Row id of the frame
        id: i64,
        /// Image file to import
        file: PathBuf,
    },
}

// === Mountables ===

/// Link commands shared by `mount lens` and `mount filter`.
#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Mark as mountable
    Add {
        /// Row id of the holder (camera or lens)
        holder: i64,
        /// Row id of the mounted item (lens or filter)
        item: i64,
    },

    /// Remove a mountable link
    Remove {
        /// Row id of the holder (camera or lens)
        holder: i64,
        /// Row id of the mounted item (lens or filter)
        item: i64,
    },

    /// List what mounts on a holder
    List {
        /// Row id of the holder (camera or lens)
        holder: i64,
        #[command(flatten)]
        output: FormatArg,
    },
}

/// Mountable commands.
#[derive(Debug, Subcommand)]
pub enum MountCommand {
    /// Lenses on cameras
    #[command(subcommand)]
    Lens(LinkCommand),

    /// Filters on lenses
    #[command(subcommand)]
    Filter(LinkCommand),
}

// === Value lists ===

/// Value list commands.
#[derive(Debug, Subcommand)]
pub enum ValuesCommand {
    /// Shutter speeds for an increment
    Shutter {
        /// Increment
        #[arg(default_value = "third")]
        increment: Increment,
    },

    /// Apertures for an increment
    Aperture {
        /// Increment
        #[arg(default_value = "third")]
        increment: Increment,
    },

    /// Exposure compensation steps for an increment
    Compensation {
        /// Increment
        #[arg(default_value = "third")]
        increment: CompIncrement,
    },

    /// Everything the frame editor offers for a roll and lens
    Frame {
        /// Row id of the roll
        roll: i64,
        /// Lens on the camera
        #[arg(long)]
        lens: Option<i64>,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

// === Geocoding ===

/// Geocoding commands.
#[derive(Debug, Subcommand)]
pub enum GeocodeCommand {
    /// Address at coordinates
    Reverse {
        /// Coordinates as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        location: Location,
    },

    /// Places matching a query
    Search {
        /// Free-text query
        query: String,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

// === Pictures ===

/// Complementary picture commands.
#[derive(Debug, Subcommand)]
pub enum PicturesCommand {
    /// Delete stored pictures no frame references
    Clean {
        /// Only list what would be deleted
        #[arg(long)]
        dry_run: bool,
    },
}

// === Database ===

/// Database commands.
#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// Copy the database to a new file
    Backup {
        /// Target file (must not exist)
        target: PathBuf,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
