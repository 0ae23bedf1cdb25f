#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides which spell, if any, a captured stroke traces.
//!
//! The stroke is normalized into the unit square and walked against every
//! densified reference pattern. For each reference point the stroke cursor only
//! moves forward until it comes within the match tolerance, and the relative
//! progress along both polylines must stay within the progress tolerance. A
//! reference whose walk reaches its final point accepts the stroke.

use gesture_cast_core::{Point2, Polyline, SpellMatch};
use gesture_cast_patterns::{normalize, FlatStrokes, PatternConfig, PatternLibrary};
use tracing::trace;

const MATCH_TOLERANCE_STEPS: f32 = 3.0;
const DEFAULT_PROGRESS_TOLERANCE: f32 = 0.2;

/// Policy applied when more than one reference accepts a stroke.
///
/// References are always evaluated in spell declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// The first accepting reference wins and evaluation stops.
    FirstMatch,
    /// Every reference is evaluated and the last accepting one wins.
    #[default]
    LastMatch,
}

/// Tolerances steering the recognizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    /// Distance, in normalized units, at which a stroke point reaches a
    /// reference point.
    pub match_tolerance: f32,
    /// Largest allowed gap between the relative progress along the stroke
    /// and along the reference.
    pub progress_tolerance: f32,
    /// Winner selection among several accepting references.
    pub tie_break: TieBreak,
    /// Treatment of strokes that are flat along one axis.
    pub flat_strokes: FlatStrokes,
}

impl MatchConfig {
    /// Derives the default tolerances for patterns densified at `densify_step`.
    #[must_use]
    pub fn for_densify_step(densify_step: f32) -> Self {
        Self {
            match_tolerance: densify_step * MATCH_TOLERANCE_STEPS,
            progress_tolerance: DEFAULT_PROGRESS_TOLERANCE,
            tie_break: TieBreak::default(),
            flat_strokes: FlatStrokes::default(),
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::for_densify_step(PatternConfig::default().densify_step)
    }
}

/// Stateless spell recognizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recognizer {
    config: MatchConfig,
}

impl Recognizer {
    /// Creates a recognizer using the supplied tolerances.
    #[must_use]
    pub const fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Tolerances used by the recognizer.
    #[must_use]
    pub const fn config(&self) -> MatchConfig {
        self.config
    }

    /// Compares a captured stroke against every reference in the library.
    #[must_use]
    pub fn recognize(&self, captured: &Polyline, library: &PatternLibrary) -> SpellMatch {
        let Some(stroke) = normalize(captured, self.config.flat_strokes) else {
            trace!(points = captured.len(), "degenerate stroke");
            return SpellMatch::Unrecognized;
        };

        let mut verdict = SpellMatch::Unrecognized;
        for pattern in library.iter() {
            if !self.accepts(stroke.points(), pattern.densified().points()) {
                continue;
            }

            verdict = SpellMatch::Recognized(pattern.spell());
            if self.config.tie_break == TieBreak::FirstMatch {
                break;
            }
        }
        verdict
    }

    fn accepts(&self, stroke: &[Point2], reference: &[Point2]) -> bool {
        if stroke.is_empty() || reference.is_empty() {
            return false;
        }

        let stroke_len = stroke.len() as f32;
        let reference_len = reference.len() as f32;
        let mut cursor = 0;

        for (index, target) in reference.iter().enumerate() {
            while cursor < stroke.len()
                && stroke[cursor].distance(*target) >= self.config.match_tolerance
            {
                cursor += 1;
            }
            if cursor == stroke.len() {
                return false;
            }

            let stroke_progress = cursor as f32 / stroke_len;
            let reference_progress = index as f32 / reference_len;
            if (stroke_progress - reference_progress).abs() > self.config.progress_tolerance {
                return false;
            }
        }
        true
    }
}
