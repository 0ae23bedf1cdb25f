//! Binary resource format for reference patterns.
//!
//! A blob is an 8-byte header followed by `width * height * data_size` bytes
//! of payload:
//!
//! | offset | size | field       |
//! |--------|------|-------------|
//! | 0      | 4    | magic       |
//! | 4      | 1    | width       |
//! | 5      | 1    | height      |
//! | 6      | 1    | data type   |
//! | 7      | 1    | data size   |
//!
//! The only supported layout is a flat array of 2D points: `height == 2`,
//! data type [`DATA_TYPE_FLOAT`] and 4-byte little-endian `f32` components.
//! `width` is the number of points.

use gesture_cast_core::{Point2, Polyline};

use crate::PatternError;

/// Fixed constant opening every pattern blob.
pub const MAGIC: [u8; 4] = *b"GCPT";
/// Length of the blob header in bytes.
pub const HEADER_LEN: usize = 8;
/// Data type tag for IEEE-754 floating point components.
pub const DATA_TYPE_FLOAT: u8 = 1;

const COMPONENTS_PER_POINT: u8 = 2;
const FLOAT_SIZE: u8 = 4;

/// Decodes a blob into its raw point list.
pub fn decode(bytes: &[u8]) -> Result<Polyline, PatternError> {
    if bytes.len() < HEADER_LEN {
        return Err(PatternError::Truncated { len: bytes.len() });
    }

    let (header, payload) = bytes.split_at(HEADER_LEN);
    let found = [header[0], header[1], header[2], header[3]];
    if found != MAGIC {
        return Err(PatternError::BadMagic { found });
    }

    let (width, height, data_type, data_size) = (header[4], header[5], header[6], header[7]);
    if height != COMPONENTS_PER_POINT || data_type != DATA_TYPE_FLOAT || data_size != FLOAT_SIZE
    {
        return Err(PatternError::UnsupportedLayout {
            height,
            data_type,
            data_size,
        });
    }

    let expected = usize::from(width) * usize::from(height) * usize::from(data_size);
    if payload.len() != expected {
        return Err(PatternError::SizeMismatch {
            expected,
            actual: payload.len(),
        });
    }

    let stride = usize::from(COMPONENTS_PER_POINT) * usize::from(FLOAT_SIZE);
    let points: Vec<Point2> = payload
        .chunks_exact(stride)
        .map(|chunk| {
            let x = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let y = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            Point2::new(x, y)
        })
        .collect();

    if points.iter().any(|point| !point.x().is_finite() || !point.y().is_finite()) {
        return Err(PatternError::NonFinite);
    }

    Ok(Polyline::from_points(points))
}

/// Encodes a point list into a blob.
pub fn encode(polyline: &Polyline) -> Result<Vec<u8>, PatternError> {
    let width = u8::try_from(polyline.len()).map_err(|_| PatternError::TooManyPoints {
        points: polyline.len(),
    })?;

    let payload_len =
        usize::from(width) * usize::from(COMPONENTS_PER_POINT) * usize::from(FLOAT_SIZE);
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload_len);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&[width, COMPONENTS_PER_POINT, DATA_TYPE_FLOAT, FLOAT_SIZE]);
    for point in polyline.points() {
        bytes.extend_from_slice(&point.x().to_le_bytes());
        bytes.extend_from_slice(&point.y().to_le_bytes());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(width: u8, height: u8, data_type: u8, data_size: u8) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[width, height, data_type, data_size]);
        bytes
    }

    #[test]
    fn decodes_little_endian_point_pairs() {
        let mut bytes = header(2, 2, DATA_TYPE_FLOAT, 4);
        for value in [0.0_f32, 1.0, 2.5, -3.0] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let polyline = decode(&bytes).expect("valid blob decodes");

        assert_eq!(
            polyline.points(),
            &[Point2::new(0.0, 1.0), Point2::new(2.5, -3.0)]
        );
    }

    #[test]
    fn encoded_blob_carries_expected_header() {
        let polyline = Polyline::from_points(vec![Point2::new(1.0, 2.0)]);
        let bytes = encode(&polyline).expect("encodes");
        assert_eq!(&bytes[..HEADER_LEN], &header(1, 2, DATA_TYPE_FLOAT, 4)[..]);
        assert_eq!(bytes.len(), HEADER_LEN + 8);
        assert_eq!(decode(&bytes).expect("decodes"), polyline);
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(
            decode(&MAGIC),
            Err(PatternError::Truncated { len: 4 })
        ));
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = b"NOPE".to_vec();
        bytes.extend_from_slice(&[0, 2, DATA_TYPE_FLOAT, 4]);
        assert!(matches!(
            decode(&bytes),
            Err(PatternError::BadMagic { found }) if &found == b"NOPE"
        ));
    }

    #[test]
    fn rejects_unsupported_height() {
        let mut bytes = header(1, 3, DATA_TYPE_FLOAT, 4);
        bytes.extend_from_slice(&[0; 12]);
        assert!(matches!(
            decode(&bytes),
            Err(PatternError::UnsupportedLayout { height: 3, .. })
        ));
    }

    #[test]
    fn rejects_unsupported_data_type_and_size() {
        let mut bytes = header(1, 2, 7, 4);
        bytes.extend_from_slice(&[0; 8]);
        assert!(matches!(
            decode(&bytes),
            Err(PatternError::UnsupportedLayout { data_type: 7, .. })
        ));

        let mut bytes = header(1, 2, DATA_TYPE_FLOAT, 8);
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(
            decode(&bytes),
            Err(PatternError::UnsupportedLayout { data_size: 8, .. })
        ));
    }

    #[test]
    fn rejects_payload_size_mismatch() {
        let mut bytes = header(2, 2, DATA_TYPE_FLOAT, 4);
        bytes.extend_from_slice(&[0; 12]);
        assert!(matches!(
            decode(&bytes),
            Err(PatternError::SizeMismatch {
                expected: 16,
                actual: 12
            })
        ));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut bytes = header(1, 2, DATA_TYPE_FLOAT, 4);
        bytes.extend_from_slice(&f32::NAN.to_le_bytes());
        bytes.extend_from_slice(&0.0_f32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(PatternError::NonFinite)));
    }

    #[test]
    fn encode_rejects_oversized_polylines() {
        let polyline: Polyline = (0..300).map(|i| Point2::new(i as f32, 0.0)).collect();
        assert!(matches!(
            encode(&polyline),
            Err(PatternError::TooManyPoints { points: 300 })
        ));
    }
}
