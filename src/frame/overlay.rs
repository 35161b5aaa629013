use crate::catalog::{ObjectRecord, SensorFov};

/// Computed display geometry for the framing view: the sensor overlay
/// and the loaded image, both as percentages of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub sensor_width_percent: f64,
    pub sensor_height_percent: f64,
    /// Scale applied to the image so its angular scale stays consistent
    /// with the overlay when previewing a different viewing FOV.
    pub image_scale_percent: f64,
}

/// Unified geometry boundary over the two FOV descriptor shapes the
/// backend has emitted: explicit `image_fov` + sensor FOV in degrees,
/// or the legacy precomputed percent rectangle. Returns `None` when the
/// record carries neither.
pub fn overlay_layout(
    record: &ObjectRecord,
    rig_fov: SensorFov,
    viewing_fov: Option<f64>,
) -> Option<OverlayLayout> {
    if let Some(image_fov) = record.image_fov {
        if image_fov <= 0.0 {
            return None;
        }
        let sensor = record.sensor_fov.unwrap_or(rig_fov);
        let view = viewing_fov.filter(|v| *v > 0.0).unwrap_or(image_fov);
        return Some(OverlayLayout {
            sensor_width_percent: sensor.w / view * 100.0,
            sensor_height_percent: sensor.h / view * 100.0,
            image_scale_percent: image_fov / view * 100.0,
        });
    }

    record.fov_rectangle.map(|rect| OverlayLayout {
        sensor_width_percent: rect.width_percent,
        sensor_height_percent: rect.height_percent,
        image_scale_percent: 100.0,
    })
}

/// Transient, per-object framing state: drag offset in pixels relative
/// to the viewport center, rotation in degrees, and an optional
/// requested viewing FOV. Never persisted; resets whenever the selected
/// object changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramingState {
    pub offset_x: f64,
    pub offset_y: f64,
    pub rotation_deg: f64,
    pub viewing_fov: Option<f64>,
    anchor: Option<String>,
}

impl FramingState {
    /// Call on every selection change; a different object name resets
    /// offset, rotation and viewing FOV.
    pub fn track_selection(&mut self, name: Option<&str>) {
        if self.anchor.as_deref() != name {
            *self = Self { anchor: name.map(String::from), ..Self::default() };
        }
    }

    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    pub fn rotate_to(&mut self, degrees: f64) {
        self.rotation_deg = degrees.rem_euclid(360.0);
    }

    pub fn request_viewing_fov(&mut self, fov: f64) {
        self.viewing_fov = (fov > 0.0).then_some(fov);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FovRectangle;

    fn rig() -> SensorFov {
        SensorFov { w: 2.2438, h: 1.4992 }
    }

    #[test]
    fn matching_viewing_fov_fills_the_frame() {
        let mut record = ObjectRecord::new("M 31");
        record.image_fov = Some(2.2438);
        let layout = overlay_layout(&record, rig(), Some(2.2438)).unwrap();
        assert!((layout.sensor_width_percent - 100.0).abs() < 1e-9);
        assert!((layout.image_scale_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zooming_out_shrinks_image_and_overlay_together() {
        let mut record = ObjectRecord::new("M 31");
        record.image_fov = Some(2.0);
        let layout = overlay_layout(&record, rig(), Some(4.0)).unwrap();
        assert!((layout.image_scale_percent - 50.0).abs() < 1e-9);
        assert!((layout.sensor_width_percent - rig().w / 4.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn server_supplied_sensor_fov_wins_over_rig() {
        let mut record = ObjectRecord::new("M 31");
        record.image_fov = Some(2.0);
        record.sensor_fov = Some(SensorFov { w: 1.0, h: 1.0 });
        let layout = overlay_layout(&record, rig(), None).unwrap();
        assert!((layout.sensor_width_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn legacy_rectangle_is_only_a_fallback() {
        let mut record = ObjectRecord::new("M 31");
        record.fov_rectangle = Some(FovRectangle { width_percent: 40.0, height_percent: 30.0 });
        let layout = overlay_layout(&record, rig(), None).unwrap();
        assert_eq!(layout.sensor_width_percent, 40.0);
        assert_eq!(layout.image_scale_percent, 100.0);

        record.image_fov = Some(2.2438);
        let layout = overlay_layout(&record, rig(), None).unwrap();
        assert!((layout.sensor_width_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_descriptor_means_no_layout() {
        let record = ObjectRecord::new("M 31");
        assert!(overlay_layout(&record, rig(), None).is_none());
    }

    #[test]
    fn framing_state_resets_on_new_selection_only() {
        let mut state = FramingState::default();
        state.track_selection(Some("M 31"));
        state.drag(12.0, -4.0);
        state.rotate_to(450.0);
        assert_eq!(state.rotation_deg, 90.0);

        state.track_selection(Some("M 31"));
        assert_eq!(state.offset_x, 12.0);

        state.track_selection(Some("M 42"));
        assert_eq!(state.offset_x, 0.0);
        assert_eq!(state.offset_y, 0.0);
        assert_eq!(state.rotation_deg, 0.0);
        assert_eq!(state.viewing_fov, None);
    }
}
