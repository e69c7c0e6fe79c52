//! Interval-timer scheduling for single-threaded event loops.
//!
//! This module contains a slot-based `TimerStore` of recurring timers.
//! Callers arm timers with a fixed interval, ask for the offset to the
//! earliest deadline, block on their own wait primitive, then collect
//! and rearm whatever fired.
pub mod timers;

pub use timers::{TimerHandle, TimerStore};
