//! Detections consumed from the upstream object-detection collaborator.

use super::geometry::BoundingBox;

/// Class id the upstream detector assigns to people.
pub const PERSON_CLASS_ID: u32 = 0;

/// One detection from the upstream network, in pixel coordinates of the
/// reporting RGB frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detection {
    /// Left edge (pixels).
    pub x1: f32,
    /// Top edge (pixels).
    pub y1: f32,
    /// Right edge (pixels).
    pub x2: f32,
    /// Bottom edge (pixels).
    pub y2: f32,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
    /// Class id.
    pub class_id: u32,
}

impl Detection {
    /// Box width in pixels.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Box height in pixels.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Width-over-height aspect ratio, with the degenerate-height guard the
    /// pose heuristics are tuned against.
    pub fn aspect_ratio(&self) -> f32 {
        self.width() / self.height().max(1.0)
    }

    /// Vertical box midpoint in normalized frame coordinates (0 = top).
    pub fn center_y_normalized(&self, frame_height: f32) -> f32 {
        if frame_height <= 0.0 {
            return 0.0;
        }
        (self.y1 + self.y2) / 2.0 / frame_height
    }

    /// Bottom edge in normalized frame coordinates.
    pub fn bottom_normalized(&self, frame_height: f32) -> f32 {
        if frame_height <= 0.0 {
            return 0.0;
        }
        self.y2 / frame_height
    }

    /// Whether this is a person detection.
    pub fn is_person(&self) -> bool {
        self.class_id == PERSON_CLASS_ID
    }

    /// Convert to a frame-normalized bounding box.
    pub fn to_normalized(&self, frame_width: f32, frame_height: f32) -> BoundingBox {
        if frame_width <= 0.0 || frame_height <= 0.0 {
            return BoundingBox::default();
        }
        BoundingBox::from_corners(
            self.x1 / frame_width,
            self.y1 / frame_height,
            self.x2 / frame_width,
            self.y2 / frame_height,
        )
    }
}

/// Select the dominant subject: the highest-confidence person detection at or
/// above the confidence floor.
pub fn select_person(detections: &[Detection], min_confidence: f32) -> Option<&Detection> {
    detections
        .iter()
        .filter(|d| d.is_person() && d.confidence >= min_confidence)
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
}

/// Screen-space fall pre-screen over the raw detection list: a very
/// horizontal person box whose bottom edge sits near the bottom of the frame.
/// Feeds the combined fall flag alongside the depth-based detector.
pub fn screen_fall_hint(detections: &[Detection], frame_height: f32, min_confidence: f32) -> bool {
    detections
        .iter()
        .filter(|d| d.is_person() && d.confidence >= min_confidence)
        .any(|d| d.aspect_ratio() > 2.0 && d.bottom_normalized(frame_height) > 0.8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Detection {
        Detection {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id: PERSON_CLASS_ID,
        }
    }

    #[test]
    fn test_select_person_prefers_highest_confidence() {
        let detections = vec![
            person(0.0, 0.0, 50.0, 150.0, 0.6),
            person(10.0, 10.0, 60.0, 160.0, 0.9),
            Detection {
                class_id: 7,
                ..person(0.0, 0.0, 10.0, 10.0, 0.99)
            },
        ];

        let selected = select_person(&detections, 0.5).unwrap();
        assert!((selected.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_select_person_respects_floor() {
        let detections = vec![person(0.0, 0.0, 50.0, 150.0, 0.3)];
        assert!(select_person(&detections, 0.5).is_none());
    }

    #[test]
    fn test_aspect_ratio_guard() {
        let degenerate = person(10.0, 20.0, 40.0, 20.0, 0.9);
        assert!((degenerate.aspect_ratio() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_fall_hint() {
        // Wide box, bottom edge at 90% of a 200 px frame.
        let fallen = person(0.0, 150.0, 120.0, 180.0, 0.8);
        assert!(screen_fall_hint(&[fallen], 200.0, 0.5));

        // Same geometry higher in the frame is not a hint.
        let lying_mid = person(0.0, 50.0, 120.0, 80.0, 0.8);
        assert!(!screen_fall_hint(&[lying_mid], 200.0, 0.5));
    }

    #[test]
    fn test_to_normalized() {
        let det = person(80.0, 60.0, 240.0, 180.0, 0.9);
        let bbox = det.to_normalized(320.0, 240.0);
        assert!((bbox.x - 0.25).abs() < 1e-6);
        assert!((bbox.y - 0.25).abs() < 1e-6);
        assert!((bbox.width - 0.5).abs() < 1e-6);
        assert!((bbox.height - 0.5).abs() < 1e-6);
    }
}
