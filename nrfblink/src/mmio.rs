//! Memory mapped I/O operations.
//!
//! For more information, please see [nRF52832 Product Specification].
//!
//! [nRF52832 Product Specification]: https://infocenter.nordicsemi.com/pdf/nRF52832_PS_v1.8.pdf

use core::ptr::{read_volatile, write_volatile};

/// Access to 32-bit registers. `addr` is always the absolute address of the
/// register.
pub trait Bus {
    /// Reads register.
    fn read(&self, addr: usize) -> u32;

    /// Writes value into register.
    fn write(&self, addr: usize, val: u32);
}

impl<B: Bus + ?Sized> Bus for &B {
    fn read(&self, addr: usize) -> u32 {
        (**self).read(addr)
    }

    fn write(&self, addr: usize, val: u32) {
        (**self).write(addr, val)
    }
}

/// The peripherals of the running chip.
#[derive(Debug, Copy, Clone)]
pub struct Mmio(());

impl Mmio {
    /// Returns a handle to the memory mapped peripherals.
    ///
    /// # Safety
    ///
    /// Every access through the handle goes to a raw address, thus it is
    /// only sound on an nRF52832.
    pub const unsafe fn new() -> Mmio {
        Mmio(())
    }
}

impl Bus for Mmio {
    fn read(&self, addr: usize) -> u32 {
        unsafe { read(addr) }
    }

    fn write(&self, addr: usize, val: u32) {
        unsafe { write(addr, val) }
    }
}

/// Reads register at `addr`.
///
/// # Safety
///
/// This function reads an arbitrary memory address, thus it is unsafe.
pub unsafe fn read(addr: usize) -> u32 {
    read_volatile(addr as *const u32)
}

/// Writes value into register at `addr`.
///
/// # Safety
///
/// This function writes to an arbitrary memory address, thus it is unsafe.
pub unsafe fn write(addr: usize, val: u32) {
    write_volatile(addr as *mut u32, val)
}
