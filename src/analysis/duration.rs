//! Duration reconciliation
//!
//! The decoded buffer may be only a prefix of the file, so the reported
//! duration comes from the cheapest source that can be trusted:
//!
//! 1. the tag hint, when there is no cap or it clearly exceeds the cap
//! 2. the container probe
//! 3. the tag hint, even if it is within the cap tolerance
//! 4. the decoded buffer, when nothing was capped
//! 5. a full uncapped decode
//! 6. the cap itself

use crate::error::{DecodeError, ProbeError};
use crate::model::SampleBuffer;

/// A hint within this many seconds of the cap may be the cap itself
pub const CAP_TOLERANCE_SECS: f64 = 1.0;

/// Pick the true track duration in seconds
///
/// `probe` and `full_load` are only called when needed.
pub fn reconcile_duration<P, L>(
    hint: Option<f64>,
    cap: Option<f64>,
    decoded: &SampleBuffer,
    probe: P,
    full_load: L,
) -> f64
where
    P: FnOnce() -> Result<f64, ProbeError>,
    L: FnOnce() -> Result<f64, DecodeError>,
{
    let hint = hint.filter(|secs| usable(*secs));
    let cap = cap.filter(|secs| usable(*secs));

    if let Some(hint) = hint {
        match cap {
            None => return hint,
            Some(cap) if hint > cap + CAP_TOLERANCE_SECS => return hint,
            Some(_) => {}
        }
    }

    match probe() {
        Ok(secs) if usable(secs) => return secs,
        Ok(secs) => log::debug!("Probe returned unusable duration {}", secs),
        Err(e) => log::debug!("Duration probe failed: {}", e),
    }

    if let Some(hint) = hint {
        return hint;
    }

    let Some(cap) = cap else {
        return decoded.duration_secs();
    };

    match full_load() {
        Ok(secs) if usable(secs) => secs,
        Ok(_) => cap,
        Err(e) => {
            log::warn!("Full decode for duration failed, reporting cap: {}", e);
            cap
        }
    }
}

fn usable(secs: f64) -> bool {
    secs.is_finite() && secs > 0.0
}
