//! Font loading utilities for the kpi_report crate.
//!
//! The renderer needs a complete TrueType family on disk. Search order: the
//! `KPI_REPORT_FONTS_DIR` environment variable, an `assets/fonts` directory
//! next to the running binary, the crate's own `assets/fonts`, and finally
//! the system-wide Liberation directory most Linux distributions ship.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{self, FontData, FontFamily};
use log::warn;

/// Family name of the fonts the renderer loads.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "LiberationSans";

/// Files that must be present in the resolved font directory.
pub const FONT_FILES: [&str; 4] = [
    "LiberationSans-Regular.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Italic.ttf",
    "LiberationSans-BoldItalic.ttf",
];

/// Environment variable that overrides the font search path.
pub const FONTS_DIR_ENV: &str = "KPI_REPORT_FONTS_DIR";

const SYSTEM_FONT_DIR: &str = "/usr/share/fonts/truetype/liberation";

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(path) = env::var(FONTS_DIR_ENV) {
        if !path.trim().is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|path| !path.is_file())
        .collect()
}

fn has_complete_family(path: &Path) -> bool {
    path.is_dir() && missing_font_files(path).is_empty()
}

fn describe_candidate(path: &Path) -> String {
    if !path.is_dir() {
        return format!("{} (directory missing)", path.display());
    }

    let missing = missing_font_files(path)
        .iter()
        .map(|file| {
            file.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} (missing files [{}])", path.display(), missing)
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        if has_complete_family(&candidate) {
            return Ok(candidate);
        }
        attempts.push(describe_candidate(&candidate));
    }

    let system = PathBuf::from(SYSTEM_FONT_DIR);
    if has_complete_family(&system) {
        warn!(
            "bundled fonts not found; using the system family at {}",
            system.display()
        );
        return Ok(system);
    }
    attempts.push(describe_candidate(&system));

    Err(Error::new(
        format!(
            "Unable to locate the {} fonts. Checked: {}. See assets/fonts/README.md or set {}.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "report fonts not found"),
    ))
}

/// Loads the report font family from the first usable search location.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory()?;
    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load the {} fonts from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        )
    })
}

/// Returns true when a complete font family can be resolved.
///
/// Rendering tests consult this to skip gracefully on machines without the
/// fonts installed.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
}
