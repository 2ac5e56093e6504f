//! Font discovery for PDF output.
//!
//! Reports prefer the Roboto family shipped under `assets/fonts`. The directory is searched in
//! this order: `HOD_REPORTS_FONTS_DIR`, `assets/fonts` next to the executable, then the crate's
//! own `assets/fonts`. When none of them holds all four faces the loader falls back to Liberation
//! Sans from the usual system locations.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

use crate::config::FONTS_DIR_ENV;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Family used when the bundled fonts are missing.
pub const FALLBACK_FONT_FAMILY_NAME: &str = "LiberationSans";

const FALLBACK_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/TTF",
];

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env::var_os(FONTS_DIR_ENV) {
        if !path.is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push_unique(&mut candidates, bin_dir.join("assets/fonts"));
        }
    }

    push_unique(
        &mut candidates,
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"),
    );

    candidates
}

fn missing_font_files(path: &Path, family: &str) -> Vec<String> {
    ["Regular", "Bold", "Italic", "BoldItalic"]
        .iter()
        .map(|face| format!("{}-{}.ttf", family, face))
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_font_files(&candidate, DEFAULT_FONT_FAMILY_NAME);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate bundled fonts. Checked: {}. See assets/fonts/README.md or set {}.",
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn fallback_font_directory() -> Option<PathBuf> {
    FALLBACK_DIRECTORIES
        .iter()
        .map(PathBuf::from)
        .find(|directory| missing_font_files(directory, FALLBACK_FONT_FAMILY_NAME).is_empty())
}

fn load_family(directory: &Path, name: &str) -> Result<FontFamily<FontData>, Error> {
    debug!("loading font family {} from {}", name, directory.display());
    fonts::from_files(directory, name, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                name,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns the bundled Roboto family, or Liberation Sans when the bundled fonts are missing.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    let err = match resolve_font_directory() {
        Ok(directory) => return load_family(&directory, DEFAULT_FONT_FAMILY_NAME),
        Err(err) if fonts_missing(&err) => err,
        Err(err) => return Err(err),
    };

    match fallback_font_directory() {
        Some(directory) => {
            warn!(
                "Bundled fonts unavailable ({}); falling back to '{}' from {}.",
                err,
                FALLBACK_FONT_FAMILY_NAME,
                directory.display()
            );
            load_family(&directory, FALLBACK_FONT_FAMILY_NAME)
        }
        None => {
            warn!("Bundled fonts unavailable ({}); no system fallback found", err);
            Err(Error::new(
                format!(
                    "Bundled fonts unavailable and no {} installation was found: {}",
                    FALLBACK_FONT_FAMILY_NAME, err
                ),
                io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
            ))
        }
    }
}

/// Indicates whether a usable font family (bundled or fallback) is present on disk.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok() || fallback_font_directory().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_faces_are_listed_by_file_name() {
        let missing = missing_font_files(Path::new("/nonexistent"), DEFAULT_FONT_FAMILY_NAME);
        assert_eq!(
            missing,
            vec![
                "Roboto-Regular.ttf",
                "Roboto-Bold.ttf",
                "Roboto-Italic.ttf",
                "Roboto-BoldItalic.ttf",
            ]
        );
    }

    #[test]
    fn candidates_end_with_the_crate_assets() {
        let candidates = font_directory_candidates();
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
        assert_eq!(candidates.last(), Some(&manifest));
    }
}
