//! Persisted UI preferences.
//!
//! A [`Profile`] is a flat store of section/key/value strings. The runtime
//! uses it to restore the placement of top-level windows that carry a
//! persist key. Every failure here falls back to defaults: a missing or
//! malformed value means "not stored".

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::{CasementError, Result};
use crate::geometry::Rect;
use crate::logging::targets;

/// Section under which window placements are stored.
pub const PLACEMENT_SECTION: &str = "placement";

/// A store of persisted preferences.
pub trait Profile {
    /// Read a value.
    fn get(&self, section: &str, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&mut self, section: &str, key: &str, value: &str);

    /// Persist pending writes.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A profile that lives only in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryProfile {
    values: HashMap<(String, String), String>,
}

impl MemoryProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Profile for MemoryProfile {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .get(&(section.to_owned(), key.to_owned()))
            .cloned()
    }

    fn set(&mut self, section: &str, key: &str, value: &str) {
        self.values
            .insert((section.to_owned(), key.to_owned()), value.to_owned());
    }
}

/// A profile backed by an INI file.
#[derive(Debug)]
pub struct IniProfile {
    path: PathBuf,
    ini: Ini,
    dirty: bool,
}

impl IniProfile {
    /// Open the profile at `path`. A missing file yields an empty profile.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ini = if path.exists() {
            Ini::load_from_file(&path).map_err(|e| match e {
                ini::Error::Io(source) => CasementError::ProfileIo {
                    path: path.clone(),
                    source,
                },
                ini::Error::Parse(err) => CasementError::ProfileParse {
                    path: path.clone(),
                    message: err.to_string(),
                },
            })?
        } else {
            Ini::new()
        };
        Ok(Self {
            path,
            ini,
            dirty: false,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Profile for IniProfile {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get_from(Some(section), key).map(str::to_owned)
    }

    fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.ini
            .write_to_file(&self.path)
            .map_err(|source| CasementError::ProfileIo {
                path: self.path.clone(),
                source,
            })?;
        self.dirty = false;
        Ok(())
    }
}

/// Parse a stored placement ("left,top,right,bottom").
pub fn parse_placement(section: &str, key: &str, value: &str) -> Result<Rect> {
    let invalid = || CasementError::profile_value(section, key, value);
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    match parts.as_slice() {
        &[left, top, right, bottom] if right >= left && bottom >= top => {
            Ok(Rect::new(left, top, right, bottom))
        }
        _ => Err(invalid()),
    }
}

/// Format a placement for storage.
pub fn format_placement(rect: Rect) -> String {
    format!("{},{},{},{}", rect.left, rect.top, rect.right, rect.bottom)
}

/// Load the placement stored under `key`, or `None` on any failure.
pub(crate) fn load_placement(profile: &dyn Profile, key: &str) -> Option<Rect> {
    let value = profile.get(PLACEMENT_SECTION, key)?;
    match parse_placement(PLACEMENT_SECTION, key, &value) {
        Ok(rect) => Some(rect),
        Err(err) => {
            tracing::debug!(target: targets::PROFILE, %err, "ignoring stored placement");
            None
        }
    }
}

pub(crate) fn save_placement(profile: &mut dyn Profile, key: &str, rect: Rect) {
    profile.set(PLACEMENT_SECTION, key, &format_placement(rect));
    tracing::trace!(target: targets::PROFILE, key, ?rect, "placement saved");
}
