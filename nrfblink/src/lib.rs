//! nrfblink drives the LED of an nRF52832 board from bare metal.
//!
//! The crate talks to the peripherals through plain register writes. Every
//! driver is generic over a [`mmio::Bus`], which is [`mmio::Mmio`] on the
//! chip and a register simulator in the unit tests.
//!
//! Two blinking strategies are available (see [`config::Strategy`]): a
//! software busy-wait loop and a TIMER compare interrupt. In the second case
//! the [`blinker::Blinker`] is moved into an [`irqcell::IrqCell`] and only
//! the interrupt handler touches it afterwards.
//!
//! The firmware is expected to be linked with the `link.x` script shipped
//! with the `blinky` crate. The following example shows the Cargo
//! configuration used to build it.
//!
//! ```text
//! [target.thumbv7em-none-eabihf]
//! runner = "probe-rs run --chip nRF52832_xxAA"
//! rustflags = [
//!     "-Clink-arg=-Tlink.x",
//! ]
//! ```

#![no_std]

pub mod blinker;
pub mod clock;
pub mod config;
pub mod cpu;
pub mod gpio;
pub mod mmio;
pub mod nvic;
pub mod print;
pub mod sequencer;
pub mod timer;

#[cfg(test)]
mod mock;

use core::fmt;

/// nrfblink error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The high-frequency clock did not report itself running in time.
    ClockStartTimeout,

    /// Invalid GPIO pin.
    InvalidGpioPin(u32),

    /// Invalid TIMER instance.
    InvalidTimer(usize),

    /// The TIMER instance does not have this compare channel.
    InvalidCompareChannel(usize),

    /// The prescaler is out of the 0..=9 range.
    InvalidPrescaler(u8),

    /// The compare value is zero or does not fit the bit width.
    InvalidCompareValue(u32),

    /// The compare event was still set after clearing it.
    EventNotAcknowledged(usize),

    /// The blinker has no timer attached.
    TimerNotConfigured,

    /// A blinker is already installed for the interrupt handler.
    HandlerAlreadyInstalled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ClockStartTimeout => write!(f, "HFCLK start timeout"),
            Error::InvalidGpioPin(pin) => write!(f, "invalid GPIO pin: {pin}"),
            Error::InvalidTimer(n) => write!(f, "invalid TIMER: {n}"),
            Error::InvalidCompareChannel(ch) => {
                write!(f, "invalid compare channel: {ch}")
            }
            Error::InvalidPrescaler(p) => write!(f, "invalid prescaler: {p}"),
            Error::InvalidCompareValue(v) => {
                write!(f, "invalid compare value: {v:#x}")
            }
            Error::EventNotAcknowledged(ch) => {
                write!(f, "COMPARE[{ch}] event not acknowledged")
            }
            Error::TimerNotConfigured => write!(f, "no timer configured"),
            Error::HandlerAlreadyInstalled => {
                write!(f, "interrupt handler already installed")
            }
        }
    }
}

/// nrfblink result.
pub type Result<T> = core::result::Result<T, Error>;
