//! Clock control.
//!
//! For more information, please see the CLOCK chapter of [nRF52832 Product
//! Specification].
//!
//! [nRF52832 Product Specification]: https://infocenter.nordicsemi.com/pdf/nRF52832_PS_v1.8.pdf

use crate::mmio::Bus;
use crate::{Error, Result};

/// Base address of the CLOCK peripheral.
const CLOCK_BASE: usize = 0x4000_0000;

/// Start HFCLK crystal oscillator.
const TASKS_HFCLKSTART: usize = CLOCK_BASE;

/// Stop HFCLK crystal oscillator.
const TASKS_HFCLKSTOP: usize = CLOCK_BASE + 0x004;

/// HFCLK oscillator started.
const EVENTS_HFCLKSTARTED: usize = CLOCK_BASE + 0x100;

/// Status indicating that the HFCLKSTART task has been triggered.
const HFCLKRUN: usize = CLOCK_BASE + 0x408;

/// HFCLK status.
const HFCLKSTAT: usize = CLOCK_BASE + 0x40c;

/// HFCLKSTAT.SRC: the clock is sourced from the crystal oscillator.
const HFCLKSTAT_SRC: u32 = 1 << 0;

/// HFCLKSTAT.STATE: the clock is running.
const HFCLKSTAT_STATE: u32 = 1 << 16;

/// How long [`start_hfclk`] waits for the oscillator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockWait {
    /// Poll until the clock runs, no matter how long it takes.
    Forever,

    /// Poll at most this number of times.
    Polls(u32),
}

/// HFCLK source.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Source {
    /// 64 MHz internal oscillator.
    Rc,

    /// 64 MHz crystal oscillator.
    Xtal,
}

/// Decoded HFCLKSTAT register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HfclkStatus {
    /// The clock is running.
    pub running: bool,

    /// Source of the clock.
    pub source: Source,
}

impl From<u32> for HfclkStatus {
    fn from(stat: u32) -> HfclkStatus {
        HfclkStatus {
            running: stat & HFCLKSTAT_STATE != 0,
            source: if stat & HFCLKSTAT_SRC != 0 {
                Source::Xtal
            } else {
                Source::Rc
            },
        }
    }
}

/// Starts the HFCLK crystal oscillator and waits until it runs.
pub fn start_hfclk<B: Bus>(bus: &B, wait: ClockWait) -> Result<()> {
    bus.write(EVENTS_HFCLKSTARTED, 0);
    bus.write(TASKS_HFCLKSTART, 1);

    match wait {
        ClockWait::Forever => {
            while bus.read(HFCLKSTAT) & HFCLKSTAT_STATE == 0 {}
            Ok(())
        }
        ClockWait::Polls(polls) => {
            for _ in 0..polls {
                if bus.read(HFCLKSTAT) & HFCLKSTAT_STATE != 0 {
                    return Ok(());
                }
            }
            Err(Error::ClockStartTimeout)
        }
    }
}

/// Stops the HFCLK crystal oscillator.
pub fn stop_hfclk<B: Bus>(bus: &B) {
    bus.write(TASKS_HFCLKSTOP, 1);
}

/// Returns the HFCLK status.
pub fn hfclk_status<B: Bus>(bus: &B) -> HfclkStatus {
    bus.read(HFCLKSTAT).into()
}

/// Returns true if the HFCLKSTART task has been triggered.
pub fn hfclk_start_requested<B: Bus>(bus: &B) -> bool {
    bus.read(HFCLKRUN) & 1 != 0
}
