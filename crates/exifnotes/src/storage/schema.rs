//! `SQLite` schema definitions for exifnotes.
//!
//! Value types such as shutter speeds and apertures are stored as their
//! display text and parsed back on read. Dates use [`crate::model::DATE_FORMAT`].

/// SQL statement to create the cameras table.
pub const CREATE_CAMERAS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS cameras (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    serial_number TEXT,
    min_shutter TEXT,
    max_shutter TEXT,
    shutter_increments TEXT NOT NULL DEFAULT 'third',
    exposure_comp_increments TEXT NOT NULL DEFAULT 'third'
)
";

/// SQL statement to create the lenses table.
pub const CREATE_LENSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS lenses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    serial_number TEXT,
    min_aperture TEXT,
    max_aperture TEXT,
    min_focal_length INTEGER,
    max_focal_length INTEGER,
    aperture_increments TEXT NOT NULL DEFAULT 'third'
)
";

/// SQL statement to create the filters table.
pub const CREATE_FILTERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS filters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    make TEXT NOT NULL,
    model TEXT NOT NULL
)
";

/// SQL statement to create the film stocks table.
pub const CREATE_FILM_STOCKS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS film_stocks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    iso INTEGER NOT NULL DEFAULT 0,
    film_type TEXT NOT NULL DEFAULT 'unknown',
    process TEXT NOT NULL DEFAULT 'unknown',
    preadded INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create the rolls table.
pub const CREATE_ROLLS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS rolls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    date TEXT NOT NULL,
    unloaded TEXT,
    developed TEXT,
    note TEXT,
    camera_id INTEGER REFERENCES cameras(id) ON DELETE SET NULL,
    film_stock_id INTEGER REFERENCES film_stocks(id) ON DELETE SET NULL,
    iso INTEGER NOT NULL DEFAULT 0,
    push_pull TEXT,
    format TEXT NOT NULL DEFAULT '35mm',
    archived INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create the frames table.
pub const CREATE_FRAMES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS frames (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    roll_id INTEGER NOT NULL REFERENCES rolls(id) ON DELETE CASCADE,
    count INTEGER NOT NULL,
    date TEXT NOT NULL,
    lens_id INTEGER REFERENCES lenses(id) ON DELETE SET NULL,
    shutter TEXT,
    aperture TEXT,
    note TEXT,
    latitude REAL,
    longitude REAL,
    formatted_address TEXT,
    exposure_comp TEXT,
    no_of_exposures INTEGER NOT NULL DEFAULT 1,
    flash_used INTEGER NOT NULL DEFAULT 0,
    focal_length INTEGER,
    light_source TEXT NOT NULL DEFAULT 'unknown',
    picture_filename TEXT
)
";

/// SQL statement to create the camera/lens mountable links.
pub const CREATE_LINK_CAMERA_LENS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS link_camera_lens (
    camera_id INTEGER NOT NULL REFERENCES cameras(id) ON DELETE CASCADE,
    lens_id INTEGER NOT NULL REFERENCES lenses(id) ON DELETE CASCADE,
    PRIMARY KEY (camera_id, lens_id)
)
";

/// SQL statement to create the lens/filter mountable links.
pub const CREATE_LINK_LENS_FILTER_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS link_lens_filter (
    lens_id INTEGER NOT NULL REFERENCES lenses(id) ON DELETE CASCADE,
    filter_id INTEGER NOT NULL REFERENCES filters(id) ON DELETE CASCADE,
    PRIMARY KEY (lens_id, filter_id)
)
";

/// SQL statement to create the filters-used-on-frame links.
pub const CREATE_LINK_FRAME_FILTER_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS link_frame_filter (
    frame_id INTEGER NOT NULL REFERENCES frames(id) ON DELETE CASCADE,
    filter_id INTEGER NOT NULL REFERENCES filters(id) ON DELETE CASCADE,
    PRIMARY KEY (frame_id, filter_id)
)
";

/// Index for listing the frames of a roll.
pub const CREATE_FRAMES_ROLL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_frames_roll ON frames(roll_id, count)
";

/// Index for finding rolls shot with a camera.
pub const CREATE_ROLLS_CAMERA_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_rolls_camera ON rolls(camera_id)
";

/// Index for finding frames shot with a lens.
pub const CREATE_FRAMES_LENS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_frames_lens ON frames(lens_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_CAMERAS_TABLE,
    CREATE_LENSES_TABLE,
    CREATE_FILTERS_TABLE,
    CREATE_FILM_STOCKS_TABLE,
    CREATE_ROLLS_TABLE,
    CREATE_FRAMES_TABLE,
    CREATE_LINK_CAMERA_LENS_TABLE,
    CREATE_LINK_LENS_FILTER_TABLE,
    CREATE_LINK_FRAME_FILTER_TABLE,
    CREATE_FRAMES_ROLL_INDEX,
    CREATE_ROLLS_CAMERA_INDEX,
    CREATE_FRAMES_LENS_INDEX,
    CREATE_METADATA_TABLE,
];
