//! Physical unit helpers. All label geometry is expressed in PDF points.

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// PDF points per centimetre.
pub const POINTS_PER_CM: f32 = POINTS_PER_INCH / 2.54;

/// Convert centimetres to points.
pub fn cm(value: f32) -> f32 {
    value * POINTS_PER_CM
}

/// Convert points to centimetres.
pub fn to_cm(points: f32) -> f32 {
    points / POINTS_PER_CM
}

/// Pixels per point at the given raster resolution.
pub fn px_per_point(dpi: f32) -> f32 {
    dpi / POINTS_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_inch_is_72_points() {
        assert!((cm(2.54) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn cm_round_trips() {
        assert!((to_cm(cm(3.8)) - 3.8).abs() < 1e-5);
    }

    #[test]
    fn px_per_point_at_72_dpi_is_one() {
        assert_eq!(px_per_point(72.0), 1.0);
    }
}
