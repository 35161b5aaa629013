use crate::catalog::SensorFov;
use crate::params::{Camera, Telescope};

/// Angular field of view of one sensor dimension behind a given focal
/// length, exact form: `2 * atan(d / 2f)` in degrees.
pub fn fov_degrees(dimension_mm: f64, focal_length_mm: f64) -> f64 {
    (dimension_mm / (2.0 * focal_length_mm)).atan().to_degrees() * 2.0
}

/// Linear small-angle approximation, adequate for long focal lengths.
pub fn fov_degrees_approx(dimension_mm: f64, focal_length_mm: f64) -> f64 {
    (dimension_mm / focal_length_mm).to_degrees()
}

/// Width/height FOV of a rig, in degrees.
pub fn sensor_fov(telescope: &Telescope, camera: &Camera) -> SensorFov {
    SensorFov {
        w: fov_degrees(camera.sensor_width, telescope.focal_length),
        h: fov_degrees(camera.sensor_height, telescope.focal_length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fov_matches_reference_rig() {
        // 600mm with a 23.5mm-wide sensor.
        let fov = fov_degrees(23.5, 600.0);
        assert!((fov - 2.2438).abs() < 0.01, "got {}", fov);
    }

    #[test]
    fn approximation_tracks_exact_form_for_long_focal_lengths() {
        let exact = fov_degrees(23.5, 2000.0);
        let approx = fov_degrees_approx(23.5, 2000.0);
        assert!((exact - approx).abs() < 0.001);
    }

    #[test]
    fn sensor_fov_covers_both_dimensions() {
        let fov = sensor_fov(
            &Telescope { focal_length: 600.0 },
            &Camera { sensor_width: 23.5, sensor_height: 15.7 },
        );
        assert!(fov.w > fov.h);
    }
}
