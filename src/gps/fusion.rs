// src/gps/fusion.rs
//! Fusion of partial GGA/VTG records into completed fixes

use super::fix::{FixRecord, PartialGga, PartialVtg};

/// Accumulates partial records until one of each sentence type has arrived.
///
/// Each slot is last-write-wins: a second GGA before any VTG simply replaces
/// the pending position. Once both slots are filled the combined fix is
/// emitted and the accumulator resets, so every emission consumes exactly
/// one partial of each type. A sentence type that never arrives leaves the
/// other partial pending indefinitely.
#[derive(Debug, Default)]
pub struct FusionAccumulator {
    gga: Option<PartialGga>,
    vtg: Option<PartialVtg>,
}

impl FusionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a position partial, emitting a fix if this completes one.
    pub fn absorb_gga(&mut self, partial: PartialGga) -> Option<FixRecord> {
        self.gga = Some(partial);
        self.try_complete()
    }

    /// Merge a course partial, emitting a fix if this completes one.
    pub fn absorb_vtg(&mut self, partial: PartialVtg) -> Option<FixRecord> {
        self.vtg = Some(partial);
        self.try_complete()
    }

    /// True when no partial data is pending.
    pub fn is_empty(&self) -> bool {
        self.gga.is_none() && self.vtg.is_none()
    }

    fn try_complete(&mut self) -> Option<FixRecord> {
        match (self.gga.take(), self.vtg.take()) {
            (Some(gga), Some(vtg)) => Some(FixRecord {
                coordinate: gga.coordinate,
                date: gga.date,
                time: gga.time,
                speed_kmh: vtg.speed_kmh,
                bearing: vtg.bearing,
                fix_quality: gga.fix_quality,
            }),
            (gga, vtg) => {
                self.gga = gga;
                self.vtg = vtg;
                None
            }
        }
    }
}
