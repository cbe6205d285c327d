// Copyright 2018 Ian Johnson

// This file is part of Chip-8.

// Chip-8 is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Chip-8 is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Chip-8.  If not, see <http://www.gnu.org/licenses/>.

//! The delay and sound timers.

use std::default::Default;

/// The two 60 Hz down-counters behind the `DT` and `ST` registers.
///
/// The timers have no notion of time themselves; the host calls `tick` at
/// 60 Hz.
#[derive(Debug, Default)]
pub struct Timers {
    /// The delay timer.
    dt: u8,
    /// The sound timer.
    st: u8,
}

impl Timers {
    /// Returns a new pair of timers, both at zero.
    pub fn new() -> Self {
        Timers::default()
    }

    /// Returns the value of the delay timer.
    pub fn dt(&self) -> u8 {
        self.dt
    }

    /// Sets the value of the delay timer.
    pub fn set_dt(&mut self, val: u8) {
        self.dt = val;
    }

    /// Returns the value of the sound timer.
    pub fn st(&self) -> u8 {
        self.st
    }

    /// Sets the value of the sound timer.
    pub fn set_st(&mut self, val: u8) {
        self.st = val;
    }

    /// Performs one tick, decrementing each non-zero counter.
    ///
    /// Returns `true` exactly when the sound timer goes from 1 to 0, which
    /// is the edge on which the sound callback must fire.
    pub fn tick(&mut self) -> bool {
        if self.dt > 0 {
            self.dt -= 1;
        }
        if self.st > 0 {
            self.st -= 1;
            return self.st == 0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::Timers;

    #[test]
    fn tick_decrements_and_reports_sound_edge() {
        let mut timers = Timers::new();
        timers.set_dt(2);
        timers.set_st(1);

        assert!(timers.tick());
        assert_eq!(timers.dt(), 1);
        assert_eq!(timers.st(), 0);

        assert!(!timers.tick());
        assert_eq!(timers.dt(), 0);
        assert_eq!(timers.st(), 0);

        assert!(!timers.tick());
    }
}
