//! Slot-based store of recurring interval timers.
//!
//! The store is a flat, append-only `Vec` of slots, deliberately not a
//! priority structure: every deadline query is a linear scan, which is
//! the right trade at the handful-of-timers scale this targets. Slots
//! are recycled through an explicit `Free`/`Armed` state rather than a
//! zero-interval sentinel, and each slot carries a generation counter
//! so that disarming invalidates every outstanding handle to it.
use log::{debug, trace};

use crate::{clock::Stamp, ArmillaError};

/// Occupancy of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Armed { interval: Stamp, deadline: Stamp },
}

#[derive(Debug)]
struct TimerSlot {
    state: SlotState,
    generation: u64,
}

impl TimerSlot {
    fn free() -> Self {
        TimerSlot {
            state: SlotState::Free,
            generation: 0,
        }
    }
}

/// Handle to one occupancy of a store slot.
///
/// Carries the slot index plus the generation observed when the slot was
/// armed. Disarming bumps the generation, so every copy of the handle
/// goes stale at once; rearming leaves it valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    index: usize,
    generation: u64,
}

impl TimerHandle {
    /// Index of the slot this handle names.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Growable, append-only store of recurring interval timers.
///
/// Starts with a single free slot and grows one slot at a time when
/// `arm` finds none free; slots are recycled, never removed. All
/// operations are synchronous and O(n) in the slot count; the blocking
/// wait between deadlines belongs to the caller.
#[derive(Debug)]
pub struct TimerStore {
    slots: Vec<TimerSlot>,
}

impl Default for TimerStore {
    fn default() -> Self {
        TimerStore::new()
    }
}

impl TimerStore {
    /// New store holding a single free slot.
    pub fn new() -> Self {
        TimerStore {
            slots: vec![TimerSlot::free()],
        }
    }

    /// Arms a timer with the given interval, recycling the first free
    /// slot or growing the store by one. The deadline is `now + interval`.
    pub fn arm(&mut self, now: Stamp, interval: Stamp) -> Result<TimerHandle, ArmillaError> {
        if interval.is_zero() {
            return Err(ArmillaError::ZeroInterval);
        }
        let index = match self
            .slots
            .iter()
            .position(|s| matches!(s.state, SlotState::Free))
        {
            Some(index) => index,
            None => {
                // the only allocation point after construction
                self.slots
                    .try_reserve(1)
                    .map_err(|_| ArmillaError::StoreExhausted)?;
                self.slots.push(TimerSlot::free());
                debug!("timer store grew to {} slots", self.slots.len());
                self.slots.len() - 1
            }
        };
        let deadline = now.add(interval);
        let slot = &mut self.slots[index];
        slot.state = SlotState::Armed { interval, deadline };
        trace!(
            "armed slot {} due at {}s {}us",
            index,
            deadline.secs,
            deadline.micros
        );
        Ok(TimerHandle {
            index,
            generation: slot.generation,
        })
    }

    /// `arm` against the current wall clock.
    pub fn arm_now(&mut self, interval: Stamp) -> Result<TimerHandle, ArmillaError> {
        self.arm(Stamp::wall(), interval)
    }

    /// Offset from `now` until the earliest armed deadline, clamped to
    /// zero once that deadline has passed, along with the handle of the
    /// timer it belongs to. `None` when nothing is armed, which is
    /// distinct from an already-due zero offset.
    pub fn next_offset(&self, now: Stamp) -> Option<(TimerHandle, Stamp)> {
        let (handle, deadline) = self.earliest()?;
        Some((handle, deadline.saturating_sub(now)))
    }

    /// `next_offset` against the current wall clock.
    pub fn next_offset_now(&self) -> Option<(TimerHandle, Stamp)> {
        self.next_offset(Stamp::wall())
    }

    /// The armed timer with the earliest deadline at or before `now`,
    /// or `None` when nothing is due yet. Ties between equal deadlines
    /// resolve to the lowest slot index.
    pub fn expired(&self, now: Stamp) -> Option<TimerHandle> {
        let (handle, deadline) = self.earliest()?;
        if deadline <= now {
            Some(handle)
        } else {
            None
        }
    }

    /// `expired` against the current wall clock.
    pub fn expired_now(&self) -> Option<TimerHandle> {
        self.expired(Stamp::wall())
    }

    /// Advances the slot's deadline to `now + interval` from its stored
    /// interval; the slot stays armed and the handle stays valid.
    pub fn rearm(&mut self, handle: TimerHandle, now: Stamp) -> Result<(), ArmillaError> {
        let slot = self.slot_mut(handle)?;
        if let SlotState::Armed { interval, deadline } = &mut slot.state {
            *deadline = now.add(*interval);
            trace!(
                "rearmed slot {} due at {}s {}us",
                handle.index,
                deadline.secs,
                deadline.micros
            );
        }
        Ok(())
    }

    /// `rearm` against the current wall clock.
    pub fn rearm_now(&mut self, handle: TimerHandle) -> Result<(), ArmillaError> {
        self.rearm(handle, Stamp::wall())
    }

    /// Returns the slot to the free pool and invalidates the handle and
    /// all copies of it. The slot's storage stays for future `arm` calls.
    pub fn disarm(&mut self, handle: TimerHandle) -> Result<(), ArmillaError> {
        let slot = self.slot_mut(handle)?;
        slot.state = SlotState::Free;
        slot.generation += 1;
        debug!("disarmed slot {}", handle.index);
        Ok(())
    }

    /// Total slots, armed or free. Never shrinks.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently armed slots.
    pub fn armed_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Armed { .. }))
            .count()
    }

    /// True when no slot is armed and there is nothing to wait for.
    pub fn is_idle(&self) -> bool {
        self.armed_count() == 0
    }

    /// Earliest-deadline armed slot; ties resolve to the lowest index.
    fn earliest(&self) -> Option<(TimerHandle, Stamp)> {
        let mut best: Option<(TimerHandle, Stamp)> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            if let SlotState::Armed { deadline, .. } = slot.state {
                let replace = match best {
                    Some((_, floor)) => deadline < floor,
                    None => true,
                };
                if replace {
                    best = Some((
                        TimerHandle {
                            index,
                            generation: slot.generation,
                        },
                        deadline,
                    ));
                }
            }
        }
        best
    }

    fn slot_mut(&mut self, handle: TimerHandle) -> Result<&mut TimerSlot, ArmillaError> {
        let slot = self
            .slots
            .get_mut(handle.index)
            .ok_or(ArmillaError::StaleHandle)?;
        if slot.generation != handle.generation || slot.state == SlotState::Free {
            return Err(ArmillaError::StaleHandle);
        }
        Ok(slot)
    }
}
