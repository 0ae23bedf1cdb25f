#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Library of reference spell patterns loaded once per session.
//!
//! Each spell's pattern is read through a [`ResourceLoader`], decoded from the
//! binary format described in [`blob`], normalized into the unit square and
//! densified so that recognition compares strokes at a comparable granularity.
//! Loading never fails as a whole: a missing or malformed resource only makes
//! its spell unrecognizable for the session.

pub mod blob;
mod geometry;

use std::collections::{BTreeMap, HashMap};

use gesture_cast_core::{Polyline, SpellId};
use thiserror::Error;
use tracing::{debug, warn};

pub use geometry::{densify, normalize, FlatStrokes};

/// Reasons a single reference pattern could not be loaded.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The loader has no resource under the requested name.
    #[error("pattern resource `{name}` is not available")]
    Missing {
        /// Name requested from the loader.
        name: String,
    },
    /// The loader failed while reading the resource.
    #[error("failed to read pattern resource `{name}`")]
    Io {
        /// Name requested from the loader.
        name: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The blob ends before the header does.
    #[error("pattern blob is {len} bytes, shorter than its header")]
    Truncated {
        /// Length of the blob in bytes.
        len: usize,
    },
    /// The blob does not open with the expected magic constant.
    #[error("pattern blob magic {found:?} is not recognized")]
    BadMagic {
        /// First four bytes of the blob.
        found: [u8; 4],
    },
    /// The header describes a layout other than a flat array of 2D points.
    #[error("unsupported pattern layout (height {height}, type {data_type}, size {data_size})")]
    UnsupportedLayout {
        /// Declared number of components per entry.
        height: u8,
        /// Declared component data type.
        data_type: u8,
        /// Declared component size in bytes.
        data_size: u8,
    },
    /// The payload length disagrees with the header.
    #[error("pattern payload is {actual} bytes but the header declares {expected}")]
    SizeMismatch {
        /// Payload length implied by the header.
        expected: usize,
        /// Payload length actually present.
        actual: usize,
    },
    /// A coordinate is NaN or infinite.
    #[error("pattern contains non-finite coordinates")]
    NonFinite,
    /// The pattern cannot be normalized because its bounding box has no area.
    #[error("pattern with {points} points is degenerate")]
    Degenerate {
        /// Number of points in the pattern.
        points: usize,
    },
    /// The pattern has more points than the format can describe.
    #[error("pattern has {points} points, more than a blob can hold")]
    TooManyPoints {
        /// Number of points in the pattern.
        points: usize,
    },
}

/// Source of raw pattern blobs keyed by spell resource name.
pub trait ResourceLoader {
    /// Returns the raw bytes of the named pattern resource.
    fn load_pattern_blob(&self, name: &str) -> Result<Vec<u8>, PatternError>;
}

/// In-memory loader backed by a name to bytes map.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the blob stored under `name`.
    #[must_use]
    pub fn with_blob(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let _ = self.blobs.insert(name.into(), bytes);
        self
    }
}

impl ResourceLoader for MemoryLoader {
    fn load_pattern_blob(&self, name: &str) -> Result<Vec<u8>, PatternError> {
        self.blobs
            .get(name)
            .cloned()
            .ok_or_else(|| PatternError::Missing {
                name: name.to_owned(),
            })
    }
}

/// Parameters controlling how reference patterns are prepared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternConfig {
    /// Maximum spacing between consecutive points of a densified pattern,
    /// measured in normalized units.
    pub densify_step: f32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self { densify_step: 0.05 }
    }
}

/// Canonical stroke for a single spell.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferencePattern {
    spell: SpellId,
    normalized: Polyline,
    densified: Polyline,
}

impl ReferencePattern {
    /// Normalizes and densifies a raw pattern.
    pub fn new(spell: SpellId, raw: &Polyline, densify_step: f32) -> Result<Self, PatternError> {
        let normalized = normalize(raw, FlatStrokes::Pin)
            .ok_or(PatternError::Degenerate { points: raw.len() })?;
        let densified = densify(&normalized, densify_step);
        Ok(Self {
            spell,
            normalized,
            densified,
        })
    }

    /// Spell represented by the pattern.
    #[must_use]
    pub const fn spell(&self) -> SpellId {
        self.spell
    }

    /// Raw pattern mapped into the unit square.
    #[must_use]
    pub fn normalized(&self) -> &Polyline {
        &self.normalized
    }

    /// Normalized pattern resampled at the library's densify step.
    #[must_use]
    pub fn densified(&self) -> &Polyline {
        &self.densified
    }
}

/// Immutable mapping from spell to reference pattern.
#[derive(Clone, Debug, Default)]
pub struct PatternLibrary {
    config: PatternConfig,
    patterns: BTreeMap<SpellId, ReferencePattern>,
}

impl PatternLibrary {
    /// Loads every spell's pattern, skipping the ones that fail.
    #[must_use]
    pub fn load(loader: &impl ResourceLoader, config: PatternConfig) -> Self {
        let mut patterns = BTreeMap::new();
        for spell in SpellId::ALL {
            match load_pattern(loader, spell, config) {
                Ok(pattern) => {
                    debug!(
                        spell = spell.name(),
                        points = pattern.normalized.len(),
                        densified = pattern.densified.len(),
                        "loaded reference pattern"
                    );
                    let _ = patterns.insert(spell, pattern);
                }
                Err(error) => {
                    warn!(spell = spell.name(), %error, "skipping reference pattern");
                }
            }
        }
        Self { config, patterns }
    }

    /// Builds a library from in-memory raw patterns.
    pub fn from_polylines(
        polylines: impl IntoIterator<Item = (SpellId, Polyline)>,
        config: PatternConfig,
    ) -> Result<Self, PatternError> {
        let mut patterns = BTreeMap::new();
        for (spell, raw) in polylines {
            let pattern = ReferencePattern::new(spell, &raw, config.densify_step)?;
            let _ = patterns.insert(spell, pattern);
        }
        Ok(Self { config, patterns })
    }

    /// Configuration the library was prepared with.
    #[must_use]
    pub const fn config(&self) -> PatternConfig {
        self.config
    }

    /// Looks up the pattern for a spell.
    #[must_use]
    pub fn get(&self, spell: SpellId) -> Option<&ReferencePattern> {
        self.patterns.get(&spell)
    }

    /// Reports whether the spell has a loaded pattern.
    #[must_use]
    pub fn contains(&self, spell: SpellId) -> bool {
        self.patterns.contains_key(&spell)
    }

    /// Iterator over loaded patterns in spell order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferencePattern> {
        self.patterns.values()
    }

    /// Number of loaded patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Reports whether no pattern loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn load_pattern(
    loader: &impl ResourceLoader,
    spell: SpellId,
    config: PatternConfig,
) -> Result<ReferencePattern, PatternError> {
    let bytes = loader.load_pattern_blob(spell.name())?;
    let raw = blob::decode(&bytes)?;
    ReferencePattern::new(spell, &raw, config.densify_step)
}
