//! GPIO operations.
//!
//! For more information, please see the GPIO chapter of [nRF52832 Product
//! Specification].
//!
//! [nRF52832 Product Specification]: https://infocenter.nordicsemi.com/pdf/nRF52832_PS_v1.8.pdf

use crate::mmio::Bus;
use crate::{Error, Result};

/// Base address of GPIO port P0.
const GPIO_BASE: usize = 0x5000_0000;

/// Write GPIO port.
const OUT: usize = GPIO_BASE + 0x504;

/// Set individual bits in GPIO port.
const OUTSET: usize = GPIO_BASE + 0x508;

/// Clear individual bits in GPIO port.
const OUTCLR: usize = GPIO_BASE + 0x50c;

/// Read GPIO port.
const IN: usize = GPIO_BASE + 0x510;

/// Direction of GPIO pins.
const DIR: usize = GPIO_BASE + 0x514;

/// DIR set register.
const DIRSET: usize = GPIO_BASE + 0x518;

/// DIR clear register.
const DIRCLR: usize = GPIO_BASE + 0x51c;

/// Latch register indicating what GPIO pins have met the criteria set in the
/// PIN_CNF[n].SENSE registers.
const LATCH: usize = GPIO_BASE + 0x520;

/// Select between default DETECT signal behaviour and LDETECT mode.
const DETECTMODE: usize = GPIO_BASE + 0x524;

/// Base address of PIN_CNF[n] registers.
const PIN_CNF_BASE: usize = GPIO_BASE + 0x700;

/// Number of GPIO pins.
pub const NPINS: u32 = 32;

/// A GPIO pin of port P0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pin(u32);

impl Pin {
    /// Returns the pin with index `pin`.
    pub const fn new(pin: u32) -> Result<Pin> {
        if pin >= NPINS {
            return Err(Error::InvalidGpioPin(pin));
        }
        Ok(Pin(pin))
    }

    /// Returns the index of the pin.
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns the bit of the pin in the port registers.
    pub const fn mask(self) -> u32 {
        1 << self.0
    }
}

impl TryFrom<u32> for Pin {
    type Error = Error;

    fn try_from(pin: u32) -> Result<Pin> {
        Pin::new(pin)
    }
}

impl From<Pin> for u32 {
    fn from(pin: Pin) -> u32 {
        pin.0
    }
}

/// Pin direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Input pin.
    Input,

    /// Output pin.
    Output,
}

impl From<Direction> for u32 {
    fn from(dir: Direction) -> u32 {
        match dir {
            Direction::Input => 0,
            Direction::Output => 1,
        }
    }
}

/// Pull configuration of a pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pull {
    /// No pull.
    Disabled,

    /// Pull down on pin.
    Down,

    /// Pull up on pin.
    Up,
}

impl From<Pull> for u32 {
    fn from(pull: Pull) -> u32 {
        match pull {
            Pull::Disabled => 0,
            Pull::Down => 1,
            Pull::Up => 3,
        }
    }
}

/// Drive configuration of a pin. `S` is standard drive, `H` high drive and
/// `D` disconnected, for "0" and "1" respectively.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Drive {
    S0S1,
    H0S1,
    S0H1,
    H0H1,
    D0S1,
    D0H1,
    S0D1,
    H0D1,
}

impl From<Drive> for u32 {
    fn from(drive: Drive) -> u32 {
        match drive {
            Drive::S0S1 => 0,
            Drive::H0S1 => 1,
            Drive::S0H1 => 2,
            Drive::H0H1 => 3,
            Drive::D0S1 => 4,
            Drive::D0H1 => 5,
            Drive::S0D1 => 6,
            Drive::H0D1 => 7,
        }
    }
}

/// Pin sensing mechanism.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sense {
    /// Disabled.
    Disabled,

    /// Sense for high level.
    High,

    /// Sense for low level.
    Low,
}

impl From<Sense> for u32 {
    fn from(sense: Sense) -> u32 {
        match sense {
            Sense::Disabled => 0,
            Sense::High => 2,
            Sense::Low => 3,
        }
    }
}

/// DETECT signal behaviour.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DetectMode {
    /// DETECT directly connected to PIN DETECT signals.
    Default,

    /// Use the latched LDETECT behaviour.
    Latched,
}

/// Full configuration of a pin, written to its PIN_CNF register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinConfig {
    /// Pin direction.
    pub dir: Direction,

    /// Connect the input buffer.
    pub input_connected: bool,

    /// Pull configuration.
    pub pull: Pull,

    /// Drive configuration.
    pub drive: Drive,

    /// Sensing mechanism.
    pub sense: Sense,
}

impl PinConfig {
    /// Push-pull output with the input buffer disconnected.
    pub const fn output() -> PinConfig {
        PinConfig {
            dir: Direction::Output,
            input_connected: false,
            pull: Pull::Disabled,
            drive: Drive::S0S1,
            sense: Sense::Disabled,
        }
    }

    /// Input with the given pull configuration.
    pub const fn input(pull: Pull) -> PinConfig {
        PinConfig {
            dir: Direction::Input,
            input_connected: true,
            pull,
            drive: Drive::S0S1,
            sense: Sense::Disabled,
        }
    }
}

impl From<PinConfig> for u32 {
    fn from(cnf: PinConfig) -> u32 {
        let dir: u32 = cnf.dir.into();
        let input: u32 = if cnf.input_connected { 0 } else { 1 };
        let pull: u32 = cnf.pull.into();
        let drive: u32 = cnf.drive.into();
        let sense: u32 = cnf.sense.into();

        dir | (input << 1) | (pull << 2) | (drive << 8) | (sense << 16)
    }
}

/// Configures the direction of a GPIO pin. The direction of the other pins
/// is left untouched.
pub fn set_direction<B: Bus>(bus: &B, pin: Pin, dir: Direction) {
    // DIRSET/DIRCLR only act on the bits written as 1.
    match dir {
        Direction::Output => bus.write(DIRSET, pin.mask()),
        Direction::Input => bus.write(DIRCLR, pin.mask()),
    }
}

/// Returns the direction of a GPIO pin.
pub fn direction<B: Bus>(bus: &B, pin: Pin) -> Direction {
    if bus.read(DIR) & pin.mask() != 0 {
        Direction::Output
    } else {
        Direction::Input
    }
}

/// Drives a GPIO pin high if `level` is true, low otherwise.
pub fn write<B: Bus>(bus: &B, pin: Pin, level: bool) {
    if level {
        bus.write(OUTSET, pin.mask());
    } else {
        bus.write(OUTCLR, pin.mask());
    }
}

/// Returns the level of a GPIO pin.
pub fn read<B: Bus>(bus: &B, pin: Pin) -> bool {
    bus.read(IN) & pin.mask() != 0
}

/// Returns the level a GPIO pin is driven to.
pub fn output_level<B: Bus>(bus: &B, pin: Pin) -> bool {
    bus.read(OUT) & pin.mask() != 0
}

/// Writes the full configuration of a GPIO pin.
pub fn configure<B: Bus>(bus: &B, pin: Pin, cnf: PinConfig) {
    let addr = PIN_CNF_BASE + pin.index() as usize * 4;
    bus.write(addr, cnf.into());
}

/// Returns the LATCH register.
pub fn latch<B: Bus>(bus: &B) -> u32 {
    bus.read(LATCH)
}

/// Clears the latched DETECT status of a GPIO pin.
pub fn clear_latch<B: Bus>(bus: &B, pin: Pin) {
    bus.write(LATCH, pin.mask());
}

/// Selects the DETECT signal behaviour.
pub fn set_detect_mode<B: Bus>(bus: &B, mode: DetectMode) {
    let val = match mode {
        DetectMode::Default => 0,
        DetectMode::Latched => 1,
    };
    bus.write(DETECTMODE, val);
}
