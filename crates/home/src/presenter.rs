//! Pictogram lookup for devices.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use domotica_core::{Device, Presenter, normalize};

/// [`Presenter`] that resolves `<dir>/<device>.png` and remembers it.
///
/// Nothing is drawn; a front end reads [`last_shown`](Pictograms::last_shown).
#[derive(Debug)]
pub struct Pictograms {
    dir: PathBuf,
    last: Mutex<Option<PathBuf>>,
}

impl Pictograms {
    /// Pictograms under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: Mutex::new(None),
        }
    }

    /// Pictogram path for a device name, with accents and `ñ` folded.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", normalize(name)))
    }

    /// Directory searched.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path resolved by the most recent [`show`](Presenter::show).
    pub fn last_shown(&self) -> Option<PathBuf> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Presenter for Pictograms {
    fn show(&self, device: Device) {
        let path = self.path_for(&device.dsl_name());
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "pictogram not found");
        }
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_folded() {
        let p = Pictograms::new("img");
        assert_eq!(p.path_for("baño"), Path::new("img/bano.png"));
        assert_eq!(p.path_for("Batería"), Path::new("img/bateria.png"));
    }

    #[test]
    fn show_remembers_path() {
        let p = Pictograms::new("pics");
        assert!(p.last_shown().is_none());
        p.show(Device::Televisor);
        assert_eq!(p.last_shown(), Some(PathBuf::from("pics/televisor.png")));
    }
}
