use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel for "infinite" proof / disproof numbers.
///
/// Kept well below `u64::MAX` so threshold arithmetic (`delta2 + 1`, sums of child phis) never
/// overflows.
pub const INFTY: u64 = u32::MAX as u64;

/// Proof number (`phi`) and disproof number (`delta`) of a position, from the point of view of
/// the player to move.
///
/// Legal values:
/// - `(0, INFTY)`: proven win for the player to move,
/// - `(INFTY, 0)`: proven loss for the player to move,
/// - otherwise both finite and `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub phi: u64,
    pub delta: u64,
}

impl Bounds {
    #[inline]
    pub const fn new(phi: u64, delta: u64) -> Self {
        Self { phi, delta }
    }

    #[inline]
    pub const fn winning() -> Self {
        Self::new(0, INFTY)
    }

    #[inline]
    pub const fn losing() -> Self {
        Self::new(INFTY, 0)
    }

    /// Thresholds used for the root call: search until solved.
    #[inline]
    pub const fn unbounded() -> Self {
        Self::new(INFTY, INFTY)
    }

    #[inline]
    pub fn is_winning(&self) -> bool {
        self.phi == 0
    }

    #[inline]
    pub fn is_losing(&self) -> bool {
        self.delta == 0
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.is_winning() || self.is_losing()
    }

    /// Whether the pair lies in the legal invariant space.
    pub fn is_valid(&self) -> bool {
        if self.phi > INFTY || self.delta > INFTY {
            return false;
        }
        match (self.phi, self.delta) {
            (0, d) => d == INFTY,
            (p, 0) => p == INFTY,
            (p, d) => p < INFTY && d < INFTY,
        }
    }

    /// Halts debug builds on bounds outside the legal space.
    #[inline]
    pub fn check(&self) {
        debug_assert!(self.is_valid(), "bounds outside the legal space: {self}");
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |f: &mut fmt::Formatter<'_>, v: u64| {
            if v == INFTY {
                write!(f, "inf")
            } else {
                write!(f, "{v}")
            }
        };
        show(f, self.phi)?;
        write!(f, ":")?;
        show(f, self.delta)
    }
}
