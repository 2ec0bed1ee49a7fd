//! CPU specific operations.
//!
//! On the host, the instructions are replaced by spin loop hints so the
//! code using them can be unit tested.

#[cfg(target_arch = "arm")]
use core::arch::asm;

/// The Cortex-M4 core runs at 64 MHz.
pub const CORE_CLOCK_FREQ: u32 = 64_000_000;

/// Number of core exceptions following the reset vector, from NMI to
/// SysTick.
pub const NEXCEPTIONS: usize = 14;

/// wfi instruction.
///
/// Wait For Interrupt is a hint instruction that suspends execution until
/// an interrupt occurs.
#[inline(always)]
pub fn wfi() {
    #[cfg(target_arch = "arm")]
    unsafe {
        asm!("wfi", options(nomem, nostack, preserves_flags))
    };

    #[cfg(not(target_arch = "arm"))]
    core::hint::spin_loop();
}

/// Wait at least `cycles`.
pub fn delay(cycles: u32) {
    if cycles == 0 {
        return;
    }

    #[cfg(target_arch = "arm")]
    unsafe {
        asm!(
            r#"
                1:
                    subs {cycles}, {cycles}, #1
                    bne 1b
            "#,
            cycles = inout(reg) cycles => _,
            options(nomem, nostack)
        )
    };

    #[cfg(not(target_arch = "arm"))]
    for _ in 0..cycles {
        core::hint::spin_loop();
    }
}

/// Entry of a vector table.
#[derive(Copy, Clone)]
pub union Vector {
    /// Exception or interrupt handler.
    handler: unsafe extern "C" fn(),

    /// Reserved entry.
    reserved: usize,
}

impl Vector {
    /// Reserved entry.
    pub const RESERVED: Vector = Vector { reserved: 0 };

    /// Entry pointing to [`default_handler`].
    pub const DEFAULT: Vector = Vector {
        handler: default_handler,
    };

    /// Returns an entry pointing to `handler`.
    pub const fn handler(handler: unsafe extern "C" fn()) -> Vector {
        Vector { handler }
    }
}

/// Handler of the exceptions and interrupts nobody registered.
pub unsafe extern "C" fn default_handler() {
    loop {
        wfi();
    }
}

/// Core exceptions table. It is placed by the linker right after the reset
/// vector.
#[cfg(target_os = "none")]
#[link_section = ".vector_table.exceptions"]
#[no_mangle]
#[used]
pub static __EXCEPTIONS: [Vector; NEXCEPTIONS] = [
    // NMI.
    Vector::DEFAULT,
    // HardFault.
    Vector::DEFAULT,
    // MemManage.
    Vector::DEFAULT,
    // BusFault.
    Vector::DEFAULT,
    // UsageFault.
    Vector::DEFAULT,
    Vector::RESERVED,
    Vector::RESERVED,
    Vector::RESERVED,
    Vector::RESERVED,
    // SVCall.
    Vector::DEFAULT,
    // DebugMonitor.
    Vector::DEFAULT,
    Vector::RESERVED,
    // PendSV.
    Vector::DEFAULT,
    // SysTick.
    Vector::DEFAULT,
];

/// Zeroes `.bss` and copies `.data` from flash. The symbols are defined by
/// the linker script.
///
/// # Safety
///
/// It must be called once, from the reset handler, before touching any
/// static.
#[cfg(target_os = "none")]
pub unsafe fn init_ram() {
    use core::ptr::{addr_of, addr_of_mut, read_volatile, write_volatile};

    extern "C" {
        static mut __sbss: u32;
        static mut __ebss: u32;
        static mut __sdata: u32;
        static mut __edata: u32;
        static __sidata: u32;
    }

    let mut dst = addr_of_mut!(__sbss);
    let end = addr_of_mut!(__ebss);
    while dst < end {
        write_volatile(dst, 0);
        dst = dst.add(1);
    }

    let mut dst = addr_of_mut!(__sdata);
    let end = addr_of_mut!(__edata);
    let mut src = addr_of!(__sidata);
    while dst < end {
        write_volatile(dst, read_volatile(src));
        dst = dst.add(1);
        src = src.add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_entries_are_words() {
        assert_eq!(core::mem::size_of::<Vector>(), core::mem::size_of::<usize>());
    }

    #[test]
    fn delay_returns() {
        delay(0);
        delay(1_000);
        wfi();
    }
}
