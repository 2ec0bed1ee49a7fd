//! Firmware configuration.
//!
//! Everything is known at build time, so the configuration is a `const`
//! value built with the `with_*` methods of [`Config`].

use crate::clock::ClockWait;
use crate::cpu;
use crate::gpio::Pin;
use crate::timer;

/// LED pin of the development board.
pub const LED: Pin = match Pin::new(5) {
    Ok(pin) => pin,
    Err(_) => panic!("invalid LED pin"),
};

/// Busy-wait iterations between two toggles of the software strategy.
pub const BUSY_WAIT_CYCLES: u32 = 1_000_000;

/// Banner printed once at startup.
pub const BANNER: &str = "SEGGER Real-Time-Terminal Sample\r\n\r\n";

/// Time between two toggles of the software strategy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delay {
    /// Core clock cycles.
    Cycles(u32),

    /// Milliseconds, converted to cycles of the 64 MHz core clock. It is a
    /// lower bound: the loop overhead is not accounted for.
    Millis(u32),
}

impl Delay {
    /// Returns the delay in core clock cycles, saturating at 32 bits.
    pub const fn cycles(self) -> u32 {
        match self {
            Delay::Cycles(cycles) => cycles,
            Delay::Millis(ms) => ms.saturating_mul(cpu::CORE_CLOCK_FREQ / 1000),
        }
    }
}

/// How the LED is toggled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The foreground loop toggles the LED and busy-waits.
    SoftwareDelay(Delay),

    /// A TIMER compare interrupt toggles the LED; the foreground sleeps.
    HardwareTimer(timer::Config),
}

/// Firmware configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// LED pin.
    pub led: Pin,

    /// How long to wait for the high-frequency clock.
    pub clock_wait: ClockWait,

    /// Toggle strategy.
    pub strategy: Strategy,

    /// Banner printed at startup.
    pub banner: &'static str,
}

impl Config {
    /// LED on pin 5 toggled every second by TIMER0, waiting forever for the
    /// clock.
    pub const DEFAULT: Config = Config {
        led: LED,
        clock_wait: ClockWait::Forever,
        strategy: Strategy::HardwareTimer(timer::Config::DEFAULT),
        banner: BANNER,
    };

    /// Returns the configuration with another LED pin.
    pub const fn with_led(self, led: Pin) -> Config {
        Config { led, ..self }
    }

    /// Returns the configuration with another clock wait policy.
    pub const fn with_clock_wait(self, clock_wait: ClockWait) -> Config {
        Config { clock_wait, ..self }
    }

    /// Returns the configuration with another toggle strategy.
    pub const fn with_strategy(self, strategy: Strategy) -> Config {
        Config { strategy, ..self }
    }

    /// Returns the configuration with another banner.
    pub const fn with_banner(self, banner: &'static str) -> Config {
        Config { banner, ..self }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_units() {
        assert_eq!(Delay::Cycles(BUSY_WAIT_CYCLES).cycles(), 1_000_000);
        assert_eq!(Delay::Millis(1).cycles(), 64_000);
        assert_eq!(Delay::Millis(500).cycles(), 32_000_000);
        assert_eq!(Delay::Millis(u32::MAX).cycles(), u32::MAX);
    }

    #[test]
    fn builders() {
        const CONFIG: Config = Config::DEFAULT
            .with_strategy(Strategy::SoftwareDelay(Delay::Millis(250)))
            .with_clock_wait(ClockWait::Polls(10));

        assert_eq!(CONFIG.led.index(), 5);
        assert_eq!(CONFIG.banner, BANNER);
        assert_eq!(CONFIG.clock_wait, ClockWait::Polls(10));
        assert_eq!(
            CONFIG.strategy,
            Strategy::SoftwareDelay(Delay::Millis(250))
        );
        assert_eq!(
            Config::default().strategy,
            Strategy::HardwareTimer(timer::Config::DEFAULT)
        );
    }
}
