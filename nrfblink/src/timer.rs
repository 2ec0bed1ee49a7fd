//! TIMER driver.
//!
//! A TIMER counts the ticks of the 16 MHz base clock divided by
//! `2^prescaler` and generates a COMPARE[n] event when the counter matches
//! the value of CC[n]. The events are edge-free registers: they stay set
//! until software writes 0 to them.
//!
//! For more information, please see the TIMER chapter of [nRF52832 Product
//! Specification].
//!
//! [nRF52832 Product Specification]: https://infocenter.nordicsemi.com/pdf/nRF52832_PS_v1.8.pdf

use crate::mmio::Bus;
use crate::nvic::Irq;
use crate::{Error, Result};

/// Base addresses of the TIMER instances.
const TIMER_BASES: [usize; NTIMERS] = [
    0x4000_8000,
    0x4000_9000,
    0x4000_a000,
    0x4001_a000,
    0x4001_b000,
];

/// Start Timer.
const TASKS_START: usize = 0x000;

/// Stop Timer.
const TASKS_STOP: usize = 0x004;

/// Increment Timer (Counter mode only).
const TASKS_COUNT: usize = 0x008;

/// Clear time.
const TASKS_CLEAR: usize = 0x00c;

/// Shut down timer.
const TASKS_SHUTDOWN: usize = 0x010;

/// Base offset of TASKS_CAPTURE[n] registers.
const TASKS_CAPTURE_BASE: usize = 0x040;

/// Base offset of EVENTS_COMPARE[n] registers.
const EVENTS_COMPARE_BASE: usize = 0x140;

/// Shortcut register.
const SHORTS: usize = 0x200;

/// Enable interrupt.
const INTENSET: usize = 0x304;

/// Disable interrupt.
const INTENCLR: usize = 0x308;

/// Timer mode selection.
const MODE: usize = 0x504;

/// Configure the number of bits used by the TIMER.
const BITMODE: usize = 0x508;

/// Timer prescaler register.
const PRESCALER: usize = 0x510;

/// Base offset of CC[n] registers.
const CC_BASE: usize = 0x540;

/// Number of TIMER instances.
const NTIMERS: usize = 5;

/// Largest prescaler accepted by the hardware.
const MAX_PRESCALER: u8 = 9;

/// Frequency of the clock feeding the prescaler.
pub const BASE_CLOCK_FREQ: u32 = 16_000_000;

/// Returns the tick frequency of a TIMER using `prescaler`. Prescalers above
/// 9 are out of range and computed as 9; [`Config::validate`] rejects them.
pub const fn tick_hz(prescaler: u8) -> u32 {
    let prescaler = if prescaler > MAX_PRESCALER {
        MAX_PRESCALER
    } else {
        prescaler
    };
    BASE_CLOCK_FREQ >> prescaler
}

/// Represents a TIMER instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Instance(usize);

impl Instance {
    pub const TIMER0: Instance = Instance(0);
    pub const TIMER1: Instance = Instance(1);
    pub const TIMER2: Instance = Instance(2);
    pub const TIMER3: Instance = Instance(3);
    pub const TIMER4: Instance = Instance(4);

    /// Returns the base address of the instance.
    fn base(self) -> usize {
        TIMER_BASES[self.0]
    }

    /// Returns the number of capture/compare channels of the instance.
    pub fn channels(self) -> usize {
        if self.0 < 3 {
            4
        } else {
            6
        }
    }

    /// Returns the interrupt line of the instance.
    pub fn irq(self) -> Irq {
        match self.0 {
            0 => Irq::Timer0,
            1 => Irq::Timer1,
            2 => Irq::Timer2,
            3 => Irq::Timer3,
            _ => Irq::Timer4,
        }
    }
}

impl TryFrom<usize> for Instance {
    type Error = Error;

    fn try_from(n: usize) -> Result<Instance> {
        if n >= NTIMERS {
            return Err(Error::InvalidTimer(n));
        }
        Ok(Instance(n))
    }
}

/// Timer mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Count the ticks of the prescaled clock.
    Timer,

    /// Count TASKS_COUNT triggers.
    Counter,

    /// Count TASKS_COUNT triggers, low power.
    LowPowerCounter,
}

impl From<Mode> for u32 {
    fn from(mode: Mode) -> u32 {
        match mode {
            Mode::Timer => 0,
            Mode::Counter => 1,
            Mode::LowPowerCounter => 2,
        }
    }
}

/// Bit width of the counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BitMode {
    Bits8,
    Bits16,
    Bits24,
    Bits32,
}

impl BitMode {
    /// Largest value the counter reaches.
    pub const fn max(self) -> u32 {
        match self {
            BitMode::Bits8 => 0xff,
            BitMode::Bits16 => 0xffff,
            BitMode::Bits24 => 0xff_ffff,
            BitMode::Bits32 => 0xffff_ffff,
        }
    }
}

impl From<BitMode> for u32 {
    fn from(bits: BitMode) -> u32 {
        match bits {
            BitMode::Bits16 => 0,
            BitMode::Bits8 => 1,
            BitMode::Bits24 => 2,
            BitMode::Bits32 => 3,
        }
    }
}

/// What happens when the counter matches the compare value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Repeat {
    /// The counter is cleared and keeps running, so the event fires every
    /// period.
    Periodic,

    /// The counter is cleared and stopped, so the event fires once per
    /// [`Timer::start`].
    OneShot,
}

/// Configuration of a TIMER raising a compare interrupt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// TIMER instance.
    pub instance: Instance,

    /// Timer mode.
    pub mode: Mode,

    /// Bit width of the counter.
    pub bit_mode: BitMode,

    /// The base clock is divided by `2^prescaler`.
    pub prescaler: u8,

    /// Compare channel raising the interrupt.
    pub channel: usize,

    /// Compare value, in ticks.
    pub ticks: u32,

    /// Behaviour on compare match.
    pub repeat: Repeat,
}

impl Config {
    /// TIMER0 ticking at 4 MHz with an interrupt every 4_000_000 ticks, that
    /// is, every second.
    pub const DEFAULT: Config = Config {
        instance: Instance::TIMER0,
        mode: Mode::Timer,
        bit_mode: BitMode::Bits32,
        prescaler: 2,
        channel: 0,
        ticks: 4_000_000,
        repeat: Repeat::Periodic,
    };

    /// Returns a periodic configuration of `instance` firing every `millis`
    /// milliseconds. The tick count saturates at 32 bits. The result is not
    /// validated: an out of range prescaler is caught by
    /// [`Config::validate`].
    pub const fn from_period_millis(
        instance: Instance,
        prescaler: u8,
        millis: u32,
    ) -> Config {
        let ticks = tick_hz(prescaler) as u64 * millis as u64 / 1000;
        let ticks = if ticks > u32::MAX as u64 {
            u32::MAX
        } else {
            ticks as u32
        };

        Config {
            instance,
            prescaler,
            ticks,
            ..Config::DEFAULT
        }
    }

    /// Returns the time between two compare events, in microseconds. It
    /// fails if the configuration does not validate.
    pub fn period_micros(&self) -> Result<u64> {
        self.validate()?;
        Ok(self.ticks as u64 * 1_000_000 / tick_hz(self.prescaler) as u64)
    }

    /// Checks that the hardware can run this configuration.
    pub fn validate(&self) -> Result<()> {
        if self.prescaler > MAX_PRESCALER {
            return Err(Error::InvalidPrescaler(self.prescaler));
        }
        if self.channel >= self.instance.channels() {
            return Err(Error::InvalidCompareChannel(self.channel));
        }
        if self.ticks == 0 || self.ticks > self.bit_mode.max() {
            return Err(Error::InvalidCompareValue(self.ticks));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::DEFAULT
    }
}

/// A TIMER instance behind a [`Bus`].
#[derive(Debug, Clone)]
pub struct Timer<B> {
    /// Register access.
    bus: B,

    /// TIMER instance.
    instance: Instance,
}

impl<B: Bus> Timer<B> {
    /// Returns the driver of `instance`.
    pub fn new(bus: B, instance: Instance) -> Timer<B> {
        Timer { bus, instance }
    }

    /// Returns the TIMER instance.
    pub fn instance(&self) -> Instance {
        self.instance
    }

    /// Returns the address of the register at `offset`.
    fn reg(&self, offset: usize) -> usize {
        self.instance.base() + offset
    }

    /// Returns an error if the instance does not have compare channel `ch`.
    fn check_channel(&self, ch: usize) -> Result<()> {
        if ch >= self.instance.channels() {
            return Err(Error::InvalidCompareChannel(ch));
        }
        Ok(())
    }

    /// Stops and clears the timer and programs `config`, which must target
    /// this instance. The timer is left stopped with the compare interrupt
    /// enabled.
    pub fn configure(&self, config: &Config) -> Result<()> {
        config.validate()?;
        if config.instance != self.instance {
            return Err(Error::InvalidTimer(config.instance.0));
        }
        self.check_channel(config.channel)?;

        // The compare value and the prescaler must not change while the
        // counter runs.
        self.stop();
        self.clear();

        self.bus.write(self.reg(MODE), config.mode.into());
        self.bus.write(self.reg(BITMODE), config.bit_mode.into());
        self.bus.write(self.reg(PRESCALER), config.prescaler.into());
        self.set_compare(config.channel, config.ticks)?;
        self.bus
            .write(self.reg(EVENTS_COMPARE_BASE + config.channel * 4), 0);

        let clear = 1 << config.channel;
        let stop = 1 << (config.channel + 8);
        let shorts = match config.repeat {
            Repeat::Periodic => clear,
            Repeat::OneShot => clear | stop,
        };
        self.bus.write(self.reg(SHORTS), shorts);

        self.enable_interrupt(config.channel)
    }

    /// Starts the timer from a zero count.
    pub fn start(&self) {
        self.stop();
        self.clear();
        self.bus.write(self.reg(TASKS_START), 1);
    }

    /// Stops the timer. The count is kept until the next clear.
    pub fn stop(&self) {
        self.bus.write(self.reg(TASKS_STOP), 1);
    }

    /// Clears the count.
    pub fn clear(&self) {
        self.bus.write(self.reg(TASKS_CLEAR), 1);
    }

    /// Increments the count. Only effective in counter mode.
    pub fn count(&self) {
        self.bus.write(self.reg(TASKS_COUNT), 1);
    }

    /// Stops the timer and powers it down.
    pub fn shutdown(&self) {
        self.bus.write(self.reg(TASKS_SHUTDOWN), 1);
    }

    /// Sets the compare value of channel `ch`.
    pub fn set_compare(&self, ch: usize, ticks: u32) -> Result<()> {
        self.check_channel(ch)?;
        self.bus.write(self.reg(CC_BASE + ch * 4), ticks);
        Ok(())
    }

    /// Returns the compare value of channel `ch`.
    pub fn compare(&self, ch: usize) -> Result<u32> {
        self.check_channel(ch)?;
        Ok(self.bus.read(self.reg(CC_BASE + ch * 4)))
    }

    /// Copies the current count into CC[ch] and returns it.
    pub fn capture(&self, ch: usize) -> Result<u32> {
        self.check_channel(ch)?;
        self.bus.write(self.reg(TASKS_CAPTURE_BASE + ch * 4), 1);
        Ok(self.bus.read(self.reg(CC_BASE + ch * 4)))
    }

    /// Enables the interrupt of compare channel `ch`.
    pub fn enable_interrupt(&self, ch: usize) -> Result<()> {
        self.check_channel(ch)?;
        self.bus.write(self.reg(INTENSET), 1 << (16 + ch));
        Ok(())
    }

    /// Disables the interrupt of compare channel `ch`.
    pub fn disable_interrupt(&self, ch: usize) -> Result<()> {
        self.check_channel(ch)?;
        self.bus.write(self.reg(INTENCLR), 1 << (16 + ch));
        Ok(())
    }

    /// Returns true if the COMPARE[ch] event is set.
    pub fn event_pending(&self, ch: usize) -> Result<bool> {
        self.check_channel(ch)?;
        Ok(self.bus.read(self.reg(EVENTS_COMPARE_BASE + ch * 4)) != 0)
    }

    /// Clears the COMPARE[ch] event. Until it is cleared, the interrupt line
    /// keeps being asserted.
    pub fn acknowledge(&self, ch: usize) -> Result<()> {
        self.check_channel(ch)?;

        let addr = self.reg(EVENTS_COMPARE_BASE + ch * 4);
        self.bus.write(addr, 0);

        // Reading back the register also flushes the write before the
        // handler returns.
        if self.bus.read(addr) != 0 {
            return Err(Error::EventNotAcknowledged(ch));
        }

        Ok(())
    }
}
