//! File-size tiers
//!
//! Bigger files are analyzed at a lower rate and, above 5 MiB, only over a
//! prefix, so analysis time stays bounded.

/// Bytes per MiB
pub const MIB: u64 = 1_048_576;

/// Upper bound of the small tier (inclusive)
pub const SMALL_TIER_MAX_BYTES: u64 = 3 * MIB;
/// Upper bound of the medium tier (inclusive)
pub const MEDIUM_TIER_MAX_BYTES: u64 = 5 * MIB;

/// Analysis window for large files, in seconds
pub const LARGE_TIER_CAP_SECS: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Up to 3 MiB
    Small,
    /// Over 3 MiB, up to 5 MiB
    Medium,
    /// Over 5 MiB
    Large,
}

impl Tier {
    pub fn for_file_size(bytes: u64) -> Self {
        if bytes <= SMALL_TIER_MAX_BYTES {
            Tier::Small
        } else if bytes <= MEDIUM_TIER_MAX_BYTES {
            Tier::Medium
        } else {
            Tier::Large
        }
    }

    pub fn params(self) -> TierParams {
        match self {
            Tier::Small => TierParams {
                tier: self,
                sample_rate: 44100,
                max_duration: None,
                waveform_samples: 5000,
                include_waveform: true,
            },
            Tier::Medium => TierParams {
                tier: self,
                sample_rate: 22050,
                max_duration: None,
                waveform_samples: 5000,
                include_waveform: true,
            },
            Tier::Large => TierParams {
                tier: self,
                sample_rate: 22050,
                max_duration: Some(LARGE_TIER_CAP_SECS),
                waveform_samples: 2000,
                include_waveform: false,
            },
        }
    }
}

/// Default analysis parameters for a tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierParams {
    pub tier: Tier,
    /// Analysis sample rate in Hz
    pub sample_rate: u32,
    /// Decode at most this many seconds
    pub max_duration: Option<f64>,
    /// Waveform length when a waveform is produced
    pub waveform_samples: usize,
    /// Whether a waveform is produced when the caller does not say
    pub include_waveform: bool,
}

impl TierParams {
    pub fn for_file_size(bytes: u64) -> Self {
        Tier::for_file_size(bytes).params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::for_file_size(0), Tier::Small);
        assert_eq!(Tier::for_file_size(3 * MIB), Tier::Small);
        assert_eq!(Tier::for_file_size(3 * MIB + 1), Tier::Medium);
        assert_eq!(Tier::for_file_size(5 * MIB), Tier::Medium);
        assert_eq!(Tier::for_file_size(5 * MIB + 1), Tier::Large);
        assert_eq!(Tier::for_file_size(u64::MAX), Tier::Large);
    }

    #[test]
    fn test_tier_params() {
        let small = TierParams::for_file_size(MIB);
        assert_eq!(small.sample_rate, 44100);
        assert_eq!(small.max_duration, None);
        assert_eq!(small.waveform_samples, 5000);
        assert!(small.include_waveform);

        let medium = TierParams::for_file_size(4 * MIB);
        assert_eq!(medium.sample_rate, 22050);
        assert_eq!(medium.max_duration, None);
        assert_eq!(medium.waveform_samples, 5000);

        let large = TierParams::for_file_size(10 * MIB);
        assert_eq!(large.sample_rate, 22050);
        assert_eq!(large.max_duration, Some(120.0));
        assert_eq!(large.waveform_samples, 2000);
        assert!(!large.include_waveform);
    }
}
