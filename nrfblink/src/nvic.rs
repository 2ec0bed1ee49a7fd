//! Nested Vectored Interrupt Controller.
//!
//! Only the device interrupt lines are handled here. Their numbers are the
//! peripheral IDs of the [nRF52832 Product Specification].
//!
//! [nRF52832 Product Specification]: https://infocenter.nordicsemi.com/pdf/nRF52832_PS_v1.8.pdf

use crate::mmio::Bus;

/// Base address of the Interrupt Set-Enable Registers.
const NVIC_ISER_BASE: usize = 0xe000_e100;

/// Base address of the Interrupt Clear-Enable Registers.
const NVIC_ICER_BASE: usize = 0xe000_e180;

/// Base address of the Interrupt Set-Pending Registers.
const NVIC_ISPR_BASE: usize = 0xe000_e200;

/// Base address of the Interrupt Clear-Pending Registers.
const NVIC_ICPR_BASE: usize = 0xe000_e280;

/// Number of device interrupt lines of the nRF52832.
pub const NIRQS: usize = 39;

/// Device interrupt lines used by nrfblink.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Irq {
    /// POWER and CLOCK.
    PowerClock = 0,

    /// TIMER0.
    Timer0 = 8,

    /// TIMER1.
    Timer1 = 9,

    /// TIMER2.
    Timer2 = 10,

    /// TIMER3.
    Timer3 = 26,

    /// TIMER4.
    Timer4 = 27,
}

impl Irq {
    /// Returns the offset of the register holding the bit of the line and
    /// the bit itself.
    fn reg_mask(self) -> (usize, u32) {
        let n = self as usize;
        ((n / 32) * 4, 1 << (n % 32))
    }
}

impl From<Irq> for usize {
    fn from(irq: Irq) -> usize {
        irq as usize
    }
}

/// Enables an interrupt line.
pub fn enable<B: Bus>(bus: &B, irq: Irq) {
    let (off, mask) = irq.reg_mask();
    bus.write(NVIC_ISER_BASE + off, mask);
}

/// Disables an interrupt line.
pub fn disable<B: Bus>(bus: &B, irq: Irq) {
    let (off, mask) = irq.reg_mask();
    bus.write(NVIC_ICER_BASE + off, mask);
}

/// Returns true if the interrupt line is enabled.
pub fn is_enabled<B: Bus>(bus: &B, irq: Irq) -> bool {
    let (off, mask) = irq.reg_mask();
    bus.read(NVIC_ISER_BASE + off) & mask != 0
}

/// Marks an interrupt line as pending.
pub fn pend<B: Bus>(bus: &B, irq: Irq) {
    let (off, mask) = irq.reg_mask();
    bus.write(NVIC_ISPR_BASE + off, mask);
}

/// Removes the pending state of an interrupt line.
pub fn unpend<B: Bus>(bus: &B, irq: Irq) {
    let (off, mask) = irq.reg_mask();
    bus.write(NVIC_ICPR_BASE + off, mask);
}

/// Returns true if the interrupt line is pending.
pub fn is_pending<B: Bus>(bus: &B, irq: Irq) -> bool {
    let (off, mask) = irq.reg_mask();
    bus.read(NVIC_ISPR_BASE + off) & mask != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;

    #[test]
    fn enable_and_disable() {
        let bus = MockBus::new();

        enable(&bus, Irq::Timer0);
        enable(&bus, Irq::Timer4);
        assert_eq!(bus.writes_to(NVIC_ISER_BASE), [1 << 8, 1 << 27]);
        assert!(is_enabled(&bus, Irq::Timer0));
        assert!(is_enabled(&bus, Irq::Timer4));

        disable(&bus, Irq::Timer0);
        assert_eq!(bus.writes_to(NVIC_ICER_BASE), [1 << 8]);
        assert!(!is_enabled(&bus, Irq::Timer0));
        assert!(is_enabled(&bus, Irq::Timer4));
    }

    #[test]
    fn pending_state() {
        let bus = MockBus::new();

        pend(&bus, Irq::Timer2);
        assert!(is_pending(&bus, Irq::Timer2));
        assert!(!is_pending(&bus, Irq::Timer1));

        unpend(&bus, Irq::Timer2);
        assert_eq!(bus.writes_to(NVIC_ICPR_BASE), [1 << 10]);
        assert!(!is_pending(&bus, Irq::Timer2));
    }

    #[test]
    fn lines_fit_the_vector_table() {
        for irq in [
            Irq::PowerClock,
            Irq::Timer0,
            Irq::Timer1,
            Irq::Timer2,
            Irq::Timer3,
            Irq::Timer4,
        ] {
            assert!(usize::from(irq) < NIRQS);
        }
    }
}
