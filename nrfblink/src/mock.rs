//! Register simulator backing the unit tests.
//!
//! Registers are plain words in a map. The handful of registers whose
//! hardware behavior matters to the drivers (shadow set/clear registers,
//! write-1-to-clear latches and the HFCLK start sequence) are modelled
//! explicitly. Every access is recorded in a trace.

extern crate std;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::vec::Vec;

use crate::mmio::Bus;

const GPIO_OUT: usize = 0x5000_0504;
const GPIO_OUTSET: usize = 0x5000_0508;
const GPIO_OUTCLR: usize = 0x5000_050c;
const GPIO_DIR: usize = 0x5000_0514;
const GPIO_DIRSET: usize = 0x5000_0518;
const GPIO_DIRCLR: usize = 0x5000_051c;
const GPIO_LATCH: usize = 0x5000_0520;

const CLOCK_TASKS_HFCLKSTART: usize = 0x4000_0000;
const CLOCK_TASKS_HFCLKSTOP: usize = 0x4000_0004;
const CLOCK_HFCLKRUN: usize = 0x4000_0408;
const CLOCK_HFCLKSTAT: usize = 0x4000_040c;

const NVIC_ISER: usize = 0xe000_e100;
const NVIC_ICER: usize = 0xe000_e180;
const NVIC_ISPR: usize = 0xe000_e200;
const NVIC_ICPR: usize = 0xe000_e280;

/// A recorded register access.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    /// Read of a register and the value returned.
    Read(usize, u32),

    /// Write of a value into a register.
    Write(usize, u32),
}

/// Simulated register file.
#[derive(Default)]
pub struct MockBus {
    /// Register values.
    regs: RefCell<BTreeMap<usize, u32>>,

    /// Access trace.
    trace: RefCell<Vec<Access>>,

    /// Registers ignoring writes.
    sticky: RefCell<BTreeSet<usize>>,

    /// Number of HFCLKSTAT reads before the oscillator reports running.
    /// `None` means it never does.
    hfclk_settle: Cell<Option<u32>>,

    /// Reads of HFCLKSTAT left before the oscillator settles.
    hfclk_countdown: Cell<Option<u32>>,
}

impl MockBus {
    /// Returns a zeroed register file whose HFCLK settles immediately.
    pub fn new() -> MockBus {
        let bus = MockBus::default();
        bus.hfclk_settle.set(Some(0));
        bus
    }

    /// Configures the number of HFCLKSTAT polls before the oscillator
    /// settles. `None` simulates a dead oscillator.
    pub fn hfclk_settles_after(&self, polls: Option<u32>) {
        self.hfclk_settle.set(polls);
    }

    /// Makes `addr` ignore writes.
    pub fn make_sticky(&self, addr: usize) {
        self.sticky.borrow_mut().insert(addr);
    }

    /// Returns the value of a register without recording the access.
    pub fn get(&self, addr: usize) -> u32 {
        self.regs.borrow().get(&addr).copied().unwrap_or(0)
    }

    /// Sets the value of a register without recording the access, as the
    /// hardware would do.
    pub fn set(&self, addr: usize, val: u32) {
        self.regs.borrow_mut().insert(addr, val);
    }

    /// Returns the recorded accesses.
    pub fn trace(&self) -> Vec<Access> {
        self.trace.borrow().clone()
    }

    /// Returns the recorded writes.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.trace
            .borrow()
            .iter()
            .filter_map(|access| match *access {
                Access::Write(addr, val) => Some((addr, val)),
                Access::Read(..) => None,
            })
            .collect()
    }

    /// Returns the recorded writes to `addr`.
    pub fn writes_to(&self, addr: usize) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|&(a, _)| a == addr)
            .map(|(_, val)| val)
            .collect()
    }

    /// Forgets the recorded accesses.
    pub fn clear_trace(&self) {
        self.trace.borrow_mut().clear();
    }

    fn update(&self, addr: usize, f: impl FnOnce(u32) -> u32) {
        let val = self.get(addr);
        self.set(addr, f(val));
    }
}

impl Bus for MockBus {
    fn read(&self, addr: usize) -> u32 {
        if addr == CLOCK_HFCLKSTAT {
            if let Some(left) = self.hfclk_countdown.get() {
                if left == 0 {
                    self.hfclk_countdown.set(None);
                    self.update(CLOCK_HFCLKSTAT, |v| v | (1 << 16) | 1);
                } else {
                    self.hfclk_countdown.set(Some(left - 1));
                }
            }
        }

        let val = match addr {
            GPIO_OUTSET | GPIO_OUTCLR => self.get(GPIO_OUT),
            GPIO_DIRSET | GPIO_DIRCLR => self.get(GPIO_DIR),
            _ => self.get(addr),
        };
        self.trace.borrow_mut().push(Access::Read(addr, val));
        val
    }

    fn write(&self, addr: usize, val: u32) {
        self.trace.borrow_mut().push(Access::Write(addr, val));

        if self.sticky.borrow().contains(&addr) {
            return;
        }

        match addr {
            GPIO_OUTSET => self.update(GPIO_OUT, |v| v | val),
            GPIO_OUTCLR => self.update(GPIO_OUT, |v| v & !val),
            GPIO_DIRSET => self.update(GPIO_DIR, |v| v | val),
            GPIO_DIRCLR => self.update(GPIO_DIR, |v| v & !val),
            GPIO_LATCH => self.update(GPIO_LATCH, |v| v & !val),
            NVIC_ISER => self.update(NVIC_ISER, |v| v | val),
            NVIC_ICER => self.update(NVIC_ISER, |v| v & !val),
            NVIC_ISPR => self.update(NVIC_ISPR, |v| v | val),
            NVIC_ICPR => self.update(NVIC_ISPR, |v| v & !val),
            CLOCK_TASKS_HFCLKSTART if val & 1 != 0 => {
                self.set(CLOCK_HFCLKRUN, 1);
                self.hfclk_countdown.set(self.hfclk_settle.get());
            }
            CLOCK_TASKS_HFCLKSTOP if val & 1 != 0 => {
                self.set(CLOCK_HFCLKRUN, 0);
                self.set(CLOCK_HFCLKSTAT, 0);
                self.hfclk_countdown.set(None);
            }
            _ => self.set(addr, val),
        }
    }
}
