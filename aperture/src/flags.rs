//! Result flags and caller-facing input options.

use bitflags::bitflags;

bitflags! {
    /// Conditions encountered while measuring a single aperture.
    ///
    /// Flags accumulate over the whole call; none of them indicate failure.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ApertureFlags: u16 {
        /// The aperture bounding box was clipped at an image edge.
        const TRUNCATED = 0x0010;
        /// At least one masked pixel overlapped the aperture.
        const HAS_MASKED = 0x0020;
        /// No valid pixel fell inside the region (Kron radius only).
        const ALL_MASKED = 0x0040;
        /// The flux-weighted ratio was ill-defined (Kron radius only).
        const NON_POSITIVE = 0x0080;
    }
}

bitflags! {
    /// How the error and mask planes of a [`Frame`](crate::Frame) are interpreted.
    ///
    /// Whether the error is a scalar or a per-pixel plane is carried by
    /// [`ErrorInput`](crate::ErrorInput) itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct InputOptions: u16 {
        /// Error values are variances rather than standard deviations.
        const ERROR_IS_VARIANCE = 0x0001;
        /// Masked area is dropped from the aperture area instead of rescaling
        /// the flux to compensate for it.
        const MASK_IGNORE = 0x0004;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_accumulate() {
        let mut flags = ApertureFlags::empty();
        flags |= ApertureFlags::TRUNCATED;
        flags |= ApertureFlags::HAS_MASKED;

        assert!(flags.contains(ApertureFlags::TRUNCATED));
        assert!(flags.contains(ApertureFlags::HAS_MASKED));
        assert!(!flags.intersects(ApertureFlags::ALL_MASKED | ApertureFlags::NON_POSITIVE));
    }

    #[test]
    fn test_options_json() {
        let options = InputOptions::ERROR_IS_VARIANCE | InputOptions::MASK_IGNORE;
        let json = serde_json::to_string(&options).unwrap();
        let parsed: InputOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
