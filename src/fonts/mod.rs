//! Font discovery for sheet exports.
//!
//! `genpdf` embeds TrueType fonts, so a family has to be found on disk before a
//! document can be created.  The bundled Roboto family is searched first (see
//! `assets/fonts/README.md`); when it is missing, a few well known system
//! families are tried before giving up.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Overrides the bundled font directory.
pub const FONTS_DIR_VAR: &str = "FICHA_FONTS_DIR";

/// Overrides the directory searched for system fallback families.
pub const FALLBACK_FONTS_DIR_VAR: &str = "FICHA_FALLBACK_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

struct SystemFamily {
    name: &'static str,
    directories: &'static [&'static str],
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "Liberation Sans",
        directories: &[
            "/usr/share/fonts/truetype/liberation",
            "/usr/share/fonts/liberation-sans",
            "/usr/share/fonts/TTF",
        ],
        regular: "LiberationSans-Regular.ttf",
        bold: "LiberationSans-Bold.ttf",
        italic: "LiberationSans-Italic.ttf",
        bold_italic: "LiberationSans-BoldItalic.ttf",
    },
    SystemFamily {
        name: "DejaVu Sans",
        directories: &[
            "/usr/share/fonts/truetype/dejavu",
            "/usr/share/fonts/dejavu-sans-fonts",
            "/usr/share/fonts/TTF",
        ],
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
    SystemFamily {
        name: "Arial",
        directories: &[
            "C:\\Windows\\Fonts",
            "/Library/Fonts",
            "/System/Library/Fonts/Supplemental",
        ],
        regular: "arial.ttf",
        bold: "arialbd.ttf",
        italic: "ariali.ttf",
        bold_italic: "arialbi.ttf",
    },
];

/// Returns the directory holding the fonts shipped with the crate.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_VAR) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            candidates.push(bin_dir.join("assets/fonts"));
        }
    }

    candidates.push(bundled_fonts_source_dir());
    candidates.dedup();
    candidates
}

fn missing_font_files(path: &Path) -> Vec<&'static str> {
    FONT_FILES
        .iter()
        .copied()
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

        let missing = missing_font_files(&candidate);
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
            "Unable to locate the {} font family. Checked: {}. See assets/fonts/README.md or set {}.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_VAR
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_bundled_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory()?;
    debug!("Loading {} fonts from {}", DEFAULT_FONT_FAMILY_NAME, directory.display());

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn load_font(path: &Path) -> Result<FontData, Error> {
    FontData::load(path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load font at {}: {}", path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn load_system_family(
    family: &SystemFamily,
    directory: &Path,
) -> Result<FontFamily<FontData>, Error> {
    Ok(FontFamily {
        regular: load_font(&directory.join(family.regular))?,
        bold: load_font(&directory.join(family.bold))?,
        italic: load_font(&directory.join(family.italic))?,
        bold_italic: load_font(&directory.join(family.bold_italic))?,
    })
}

fn system_fallback_font_family() -> Result<(FontFamily<FontData>, &'static str), Error> {
    let override_dir = env_path(FALLBACK_FONTS_DIR_VAR);

    for family in SYSTEM_FAMILIES {
        let directories: Vec<PathBuf> = match &override_dir {
            Some(directory) => vec![directory.clone()],
            None => family.directories.iter().map(PathBuf::from).collect(),
        };

        for directory in directories {
            if !directory.join(family.regular).is_file() {
                continue;
            }
            match load_system_family(family, &directory) {
                Ok(loaded) => return Ok((loaded, family.name)),
                Err(err) => debug!("Skipping {} in {}: {}", family.name, directory.display(), err),
            }
        }
    }

    Err(Error::new(
        "No system fallback font family found",
        io::Error::new(io::ErrorKind::NotFound, "system fonts not found"),
    ))
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns the bundled Roboto family, falling back to a system family when the
/// bundled files are missing.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family() {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_fallback_font_family() {
            Ok((fallback, name)) => {
                warn!("Bundled fonts unavailable ({}); falling back to '{}'.", err, name);
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Bundled fonts unavailable ({}); system fallback failed: {}",
                    err, fallback_err
                );
                Err(Error::new(
                    format!(
                        "Bundled fonts unavailable and system fallback failed: {}",
                        fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether a usable font family can be found.
pub fn fonts_available() -> bool {
    resolve_font_directory().is_ok() || system_fallback_font_family().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_reports_not_found() {
        let err = Error::new(
            "gone",
            io::Error::new(io::ErrorKind::NotFound, "fonts directory not found"),
        );
        assert!(fonts_missing(&err));

        let other = Error::new("broken", ErrorKind::InvalidData);
        assert!(!fonts_missing(&other));
    }

    #[test]
    fn empty_directory_lists_every_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(missing_font_files(dir.path()), FONT_FILES);
    }
}
