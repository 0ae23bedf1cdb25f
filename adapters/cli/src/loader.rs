use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use gesture_cast_core::{Point2, Polyline, SpellId};
use gesture_cast_patterns::{blob, PatternError, ResourceLoader};
use tracing::info;

/// File extension of pattern blobs stored on disk.
const BLOB_EXTENSION: &str = "bytes";

/// Reads pattern blobs named `<spell>.bytes` from a directory.
#[derive(Clone, Debug)]
pub(crate) struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        blob_path(&self.root, name)
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load_pattern_blob(&self, name: &str) -> Result<Vec<u8>, PatternError> {
        fs::read(self.path_for(name)).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                PatternError::Missing {
                    name: name.to_owned(),
                }
            } else {
                PatternError::Io {
                    name: name.to_owned(),
                    source,
                }
            }
        })
    }
}

fn blob_path(root: &Path, name: &str) -> PathBuf {
    root.join(name).with_extension(BLOB_EXTENSION)
}

/// Canonical stroke shipped for every spell.
pub(crate) fn builtin_pattern(spell: SpellId) -> Polyline {
    let points: &[(f32, f32)] = match spell {
        SpellId::Pudding => &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
        SpellId::Sleep => &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
        SpellId::Flies => &[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)],
        SpellId::Frog => &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
        SpellId::Whirls => &[
            (0.5, 0.5),
            (1.0, 0.5),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
            (1.0, 0.0),
        ],
        SpellId::Darkness => &[(0.0, 0.0), (0.25, 1.0), (0.5, 0.0), (0.75, 1.0), (1.0, 0.0)],
    };
    points.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

/// Writes the built-in pattern of every spell into `dir`.
pub(crate) fn write_builtin_patterns(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create pattern directory {}", dir.display()))?;

    for spell in SpellId::ALL {
        let bytes = blob::encode(&builtin_pattern(spell))
            .with_context(|| format!("failed to encode the {} pattern", spell.name()))?;
        let path = blob_path(dir, spell.name());
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write pattern blob {}", path.display()))?;
        info!(spell = spell.name(), path = %path.display(), "wrote pattern blob");
    }
    Ok(())
}
