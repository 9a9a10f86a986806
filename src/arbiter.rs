//! Resource arbiter shared by every stateful peripheral owner.
//!
//! One instance per logical owner (switch reader, LED, display).  The
//! owner calls [`Arbiter::acquire`] to take the unit and [`Arbiter::free`]
//! to hand it back; the release completes `RELEASE_DELAY` ticks later so
//! transient device settling is masked from the next command.
//!
//! ```text
//!   acquire() ──▶ busy, !available ──clk_in──▶ !busy, !available (owned)
//!   free()    ──▶ release armed ──RELEASE_DELAY × clk_in──▶ busy, available
//!                                               └──next clk_in──▶ !busy, available
//! ```

use log::debug;

/// Deferred-release ownership flags for one peripheral owner.
#[derive(Debug, Clone)]
pub struct Arbiter<const RELEASE_DELAY: u16 = 2> {
    /// A command is in progress; new commands are refused.
    busy: bool,
    /// No exclusive owner.
    available: bool,
    acquire_pending: bool,
    release_pending: bool,
    release_counter: u16,
    /// `busy` was asserted by the release edge and drops on the next tick.
    busy_hold: bool,
}

impl<const RELEASE_DELAY: u16> Default for Arbiter<RELEASE_DELAY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RELEASE_DELAY: u16> Arbiter<RELEASE_DELAY> {
    pub const fn new() -> Self {
        Self {
            busy: false,
            available: true,
            acquire_pending: false,
            release_pending: false,
            release_counter: RELEASE_DELAY,
            busy_hold: false,
        }
    }

    /// Take ownership.  Fails without side effects when already owned.
    pub fn acquire(&mut self) -> bool {
        if !self.available {
            return false;
        }
        self.available = false;
        self.busy = true;
        self.acquire_pending = true;
        true
    }

    /// Arm the deferred release.  Never fails; re-arming restarts the delay.
    pub fn free(&mut self) {
        self.release_pending = true;
        self.release_counter = RELEASE_DELAY;
    }

    /// Advance one tick.
    pub fn clk_in(&mut self) {
        if self.busy_hold {
            self.busy_hold = false;
            self.busy = false;
        }

        if self.acquire_pending {
            self.acquire_pending = false;
            self.busy = false;
        }

        if self.release_pending {
            self.release_counter = self.release_counter.saturating_sub(1);
            if self.release_counter == 0 {
                self.release_pending = false;
                self.release_counter = RELEASE_DELAY;
                self.available = true;
                // Held for this tick only so a command cannot race the release.
                self.busy = true;
                self.busy_hold = true;
                debug!("Arbiter: released");
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.busy
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_release_pending(&self) -> bool {
        self.release_pending
    }
}
