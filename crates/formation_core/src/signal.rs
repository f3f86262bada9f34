//! Control signals and the latest-value cell that carries them.
//!
//! The sensor pipeline publishes a [`HandSignal`] at its own cadence; the
//! simulation loop reads whatever was published last. There is no queue:
//! a slow consumer skips signals, a slow producer leaves the consumer
//! reading a stale value. Neither side ever waits for the other.

use crate::regime::Regime;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

// ============================================================================
// HandSignal
// ============================================================================

/// Compact per-frame summary of the tracked hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandSignal {
    /// Pointer X in `[-1, 1]`, mirrored for a front camera.
    pub x: f32,
    /// Pointer Y in `[-1, 1]`, up-positive.
    pub y: f32,
    pub is_detected: bool,
    pub is_clenched: bool,
    /// Openness in `[0, 1]`: 0 is a fist, 1 a wide open palm.
    pub spread: f32,
}

impl HandSignal {
    /// Neutral signal for "no hand". Spread sits at the midpoint so scale
    /// logic stays neutral.
    pub const ABSENT: HandSignal = HandSignal {
        x: 0.0,
        y: 0.0,
        is_detected: false,
        is_clenched: false,
        spread: 0.5,
    };
}

impl Default for HandSignal {
    fn default() -> Self {
        Self::ABSENT
    }
}

// ============================================================================
// Pointer fallback and combined input
// ============================================================================

/// Manual pointer state used when no hand is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    /// Normalized device X in `[-1, 1]`.
    pub x: f32,
    /// Normalized device Y in `[-1, 1]`, up-positive.
    pub y: f32,
    /// Primary button held; substitutes for a clenched hand.
    pub held: bool,
}

/// Everything the simulator reads at the start of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    pub hand: HandSignal,
    pub pointer: PointerState,
}

impl ControlInput {
    pub fn new(hand: HandSignal, pointer: PointerState) -> Self {
        Self { hand, pointer }
    }

    /// Hand clench while a hand is tracked, pointer button otherwise.
    #[inline]
    pub fn effective_clench(&self) -> bool {
        if self.hand.is_detected {
            self.hand.is_clenched
        } else {
            self.pointer.held
        }
    }

    #[inline]
    pub fn regime(&self) -> Regime {
        Regime::from_clench(self.effective_clench())
    }
}

// ============================================================================
// Latest<T>
// ============================================================================

/// Single-slot, last-writer-wins cell shared between threads.
///
/// Cloning yields another handle to the same slot. Each publish bumps a
/// sequence number so readers can tell how stale their view is.
#[derive(Debug)]
pub struct Latest<T> {
    shared: Arc<Slot<T>>,
}

#[derive(Debug)]
struct Slot<T> {
    value: RwLock<T>,
    sequence: AtomicU64,
}

impl<T: Copy> Latest<T> {
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Slot {
                value: RwLock::new(initial),
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Overwrite the slot. A poisoned lock is recovered: the value is plain
    /// data, so a panicking writer cannot leave it half-written.
    pub fn publish(&self, value: T) {
        let mut slot = self
            .shared
            .value
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = value;
        self.shared.sequence.fetch_add(1, Ordering::Release);
    }

    /// Most recently published value.
    pub fn get(&self) -> T {
        *self
            .shared
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of publishes so far.
    pub fn sequence(&self) -> u64 {
        self.shared.sequence.load(Ordering::Acquire)
    }
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Copy + Default> Default for Latest<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
