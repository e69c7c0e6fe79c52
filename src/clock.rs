//! Wall-clock stamps with microsecond resolution.
//!
//! `Stamp` plays both roles the scheduler needs: an absolute instant
//! (whole seconds since the Unix epoch plus microseconds) and a relative
//! duration between two instants. Arithmetic keeps the microsecond field
//! normalized below one second, carrying into or borrowing from the
//! seconds field as needed.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytemuck::{Pod, Zeroable};

/// Unit scale for the sub-second field; `micros` always stays below this.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Seconds-plus-microseconds time value, usable as instant or duration.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Pod, Zeroable)]
pub struct Stamp {
    pub secs: u64,
    pub micros: u64,
}

impl Stamp {
    pub const ZERO: Stamp = Stamp { secs: 0, micros: 0 };

    /// New stamp from seconds and microseconds; a `micros` value at or
    /// above one second is folded into `secs`.
    pub fn new(secs: u64, micros: u64) -> Self {
        Stamp {
            secs: secs + micros / MICROS_PER_SEC,
            micros: micros % MICROS_PER_SEC,
        }
    }

    /// Whole-second stamp.
    pub fn from_secs(secs: u64) -> Self {
        Stamp { secs, micros: 0 }
    }

    /// Stamp from a raw microsecond count.
    pub fn from_micros(micros: u64) -> Self {
        Stamp::new(0, micros)
    }

    /// Current wall-clock time. A clock set before the epoch reads as zero.
    pub fn wall() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Stamp {
                secs: d.as_secs(),
                micros: d.subsec_micros() as u64,
            },
            Err(_) => Stamp::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.secs == 0 && self.micros == 0
    }

    /// Sum of two stamps, carrying microsecond overflow into seconds.
    pub fn add(self, rhs: Stamp) -> Stamp {
        let mut secs = self.secs + rhs.secs;
        let mut micros = self.micros + rhs.micros;
        if micros >= MICROS_PER_SEC {
            secs += 1;
            micros -= MICROS_PER_SEC;
        }
        Stamp { secs, micros }
    }

    /// Difference `self - rhs`, borrowing from seconds when the
    /// microsecond field underflows, clamped to zero when `rhs` is not
    /// earlier than `self`.
    pub fn saturating_sub(self, rhs: Stamp) -> Stamp {
        if self <= rhs {
            return Stamp::ZERO;
        }
        if self.micros < rhs.micros {
            Stamp {
                secs: self.secs - rhs.secs - 1,
                micros: self.micros + MICROS_PER_SEC - rhs.micros,
            }
        } else {
            Stamp {
                secs: self.secs - rhs.secs,
                micros: self.micros - rhs.micros,
            }
        }
    }

    /// Conversion for handing offsets to blocking wait primitives.
    pub fn as_duration(self) -> Duration {
        Duration::new(self.secs, (self.micros * 1_000) as u32)
    }
}
