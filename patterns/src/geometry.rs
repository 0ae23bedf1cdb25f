//! Polyline normalization and densification shared by patterns and strokes.

use gesture_cast_core::{Point2, Polyline};

/// Treatment of strokes whose bounding box is flat along exactly one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlatStrokes {
    /// Pin the flat axis to zero and normalize the other axis.
    #[default]
    Pin,
    /// Treat the stroke as degenerate.
    Reject,
}

/// Maps a polyline into the unit square `[0, 1] x [0, 1]`.
///
/// Every point is translated by the negated lower-left corner of the bounding
/// box and scaled per axis by the reciprocal of the box's extent. Returns
/// `None` for fewer than two points, for a box that is flat on both axes, and
/// for a box flat on one axis when `flat` is [`FlatStrokes::Reject`].
#[must_use]
pub fn normalize(polyline: &Polyline, flat: FlatStrokes) -> Option<Polyline> {
    if polyline.len() < 2 {
        return None;
    }

    let bounds = polyline.bounds()?;
    let (width, height) = (bounds.width(), bounds.height());
    let has_width = width > 0.0;
    let has_height = height > 0.0;

    if !has_width && !has_height {
        return None;
    }
    if (!has_width || !has_height) && flat == FlatStrokes::Reject {
        return None;
    }

    let origin = bounds.min();
    let scale = |value: f32, min: f32, extent: f32, present: bool| {
        if present {
            (value - min) / extent
        } else {
            0.0
        }
    };

    Some(
        polyline
            .points()
            .iter()
            .map(|point| {
                Point2::new(
                    scale(point.x(), origin.x(), width, has_width),
                    scale(point.y(), origin.y(), height, has_height),
                )
            })
            .collect(),
    )
}

/// Resamples a polyline so consecutive points are at most `step` apart.
///
/// Each segment is walked from its start in increments of `step`, emitting the
/// interpolated points, and the final point of the input closes the result.
/// Zero-length segments contribute nothing. A non-positive step returns the
/// input unchanged.
#[must_use]
pub fn densify(polyline: &Polyline, step: f32) -> Polyline {
    let points = polyline.points();
    let Some(&last) = points.last() else {
        return Polyline::new();
    };
    if step.is_nan() || step <= 0.0 {
        return polyline.clone();
    }

    let mut dense = Polyline::new();
    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let length = from.distance(to);
        let mut index = 0_usize;
        loop {
            let travelled = index as f32 * step;
            if travelled >= length {
                break;
            }
            dense.push(from.lerp(to, travelled / length));
            index += 1;
        }
    }
    dense.push(last);
    dense
}
