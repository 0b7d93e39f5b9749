//! Discrete body pose labels.

/// Closed set of body poses the classifier can report.
///
/// The discriminants are the wire ordinals and also the tie-break order of
/// the majority vote: when two labels have equal counts, the lower ordinal
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PoseLabel {
    /// No stable classification.
    #[default]
    Unknown = 0,
    /// Horizontal, deliberate (e.g. in bed).
    Lying = 1,
    /// Upright torso, lower in frame.
    Sitting = 2,
    /// Fully upright.
    Standing = 3,
    /// Horizontal and low in frame after a descent.
    Fallen = 4,
}

impl PoseLabel {
    /// All labels in stable ordinal order.
    pub const ALL: [PoseLabel; 5] = [
        PoseLabel::Unknown,
        PoseLabel::Lying,
        PoseLabel::Sitting,
        PoseLabel::Standing,
        PoseLabel::Fallen,
    ];

    /// Wire ordinal of this label.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PoseLabel::Unknown => "unknown",
            PoseLabel::Lying => "lying",
            PoseLabel::Sitting => "sitting",
            PoseLabel::Standing => "standing",
            PoseLabel::Fallen => "fallen",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_match_position_in_all() {
        for (i, label) in PoseLabel::ALL.iter().enumerate() {
            assert_eq!(label.ordinal() as usize, i);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(PoseLabel::Fallen.to_string(), "fallen");
        assert_eq!(PoseLabel::default().to_string(), "unknown");
    }
}
