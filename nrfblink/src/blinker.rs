//! LED blinker.
//!
//! A [`Blinker`] owns everything needed to toggle the LED: the bus, the pin,
//! the current state and, when blinking from the TIMER interrupt, the timer
//! whose compare event must be acknowledged. Whoever holds the blinker is
//! the only writer of the pin.

use crate::gpio::{self, Pin};
use crate::mmio::Bus;
use crate::nvic;
use crate::timer::Timer;
use crate::{Error, Result};

/// LED blinker.
pub struct Blinker<B: Bus> {
    /// Register access.
    bus: B,

    /// LED pin.
    led: Pin,

    /// Last level written to the LED.
    state: bool,

    /// Timer and compare channel driving the toggles, if any.
    compare: Option<(Timer<B>, usize)>,

    /// Number of toggles so far.
    toggles: u32,

    /// Last compare event error not yet reported.
    last_error: Option<Error>,

    /// Number of compare event errors so far.
    errors: u32,
}

impl<B: Bus> Blinker<B> {
    /// Returns a blinker for `led`. The first toggle drives it high.
    pub fn new(bus: B, led: Pin) -> Blinker<B> {
        Blinker {
            bus,
            led,
            state: false,
            compare: None,
            toggles: 0,
            last_error: None,
            errors: 0,
        }
    }

    /// Attaches the timer whose COMPARE[`channel`] event triggers the
    /// toggles.
    pub fn with_timer(mut self, timer: Timer<B>, channel: usize) -> Blinker<B> {
        self.compare = Some((timer, channel));
        self
    }

    /// Returns the bus used by the blinker.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns the LED pin.
    pub fn led(&self) -> Pin {
        self.led
    }

    /// Returns the last level written to the LED.
    pub fn state(&self) -> bool {
        self.state
    }

    /// Returns the number of toggles so far.
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    /// Returns the number of compare event errors so far.
    pub fn errors(&self) -> u32 {
        self.errors
    }

    /// Returns the last compare event error and forgets it.
    pub fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    /// Returns the attached timer.
    pub fn timer(&self) -> Option<&Timer<B>> {
        self.compare.as_ref().map(|(timer, _)| timer)
    }

    /// Flips the state and writes it to the LED. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.state = !self.state;
        gpio::write(&self.bus, self.led, self.state);
        self.toggles = self.toggles.wrapping_add(1);
        self.state
    }

    /// Handles a compare event: acknowledges it and toggles the LED.
    ///
    /// If the event cannot be acknowledged it stays set, so the timer is
    /// stopped, the channel interrupt is disabled at the TIMER and its line
    /// at the NVIC. The LED is left untouched and the error is kept for
    /// [`Blinker::take_error`]. Nothing is printed, as this runs in
    /// interrupt context.
    pub fn on_compare(&mut self) -> Result<bool> {
        if let Some((timer, channel)) = &self.compare {
            if let Err(err) = timer.acknowledge(*channel) {
                timer.stop();
                let _ = timer.disable_interrupt(*channel);
                nvic::disable(&self.bus, timer.instance().irq());

                self.last_error = Some(err);
                self.errors = self.errors.wrapping_add(1);
                return Err(err);
            }
        }

        Ok(self.toggle())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::mock::MockBus;
    use crate::timer::{Config, Instance};
    use crate::Error;

    const OUTSET: usize = 0x5000_0508;
    const OUTCLR: usize = 0x5000_050c;
    const TIMER0_EVENTS_COMPARE0: usize = 0x4000_8140;
    const TIMER0_TASKS_STOP: usize = 0x4000_8004;
    const TIMER0_INTENSET: usize = 0x4000_8304;
    const TIMER0_INTENCLR: usize = 0x4000_8308;
    const NVIC_ICER: usize = 0xe000_e180;

    fn led() -> Pin {
        Pin::try_from(5).unwrap()
    }

    /// Returns the levels written to `pin`, in order.
    fn pin_writes(bus: &MockBus, pin: Pin) -> Vec<bool> {
        bus.writes()
            .into_iter()
            .filter_map(|(addr, val)| match addr {
                OUTSET if val == pin.mask() => Some(true),
                OUTCLR if val == pin.mask() => Some(false),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_toggle_drives_high() {
        let bus = MockBus::new();
        let mut blinker = Blinker::new(&bus, led());

        assert!(!blinker.state());
        assert!(blinker.toggle());
        assert_eq!(bus.writes(), [(OUTSET, 1u32 << 5)]);
        assert!(!blinker.toggle());
        assert_eq!(blinker.toggles(), 2);
    }

    #[test]
    fn compare_events_alternate_the_led() {
        const EVENTS: usize = 9;

        let bus = MockBus::new();
        let timer = Timer::new(&bus, Instance::TIMER0);
        timer.configure(&Config::DEFAULT).unwrap();
        timer.start();
        let mut blinker = Blinker::new(&bus, led()).with_timer(timer, 0);
        bus.clear_trace();

        for i in 0..EVENTS {
            bus.set(TIMER0_EVENTS_COMPARE0, 1);
            assert_eq!(blinker.on_compare(), Ok(i % 2 == 0));
            assert_eq!(bus.get(TIMER0_EVENTS_COMPARE0), 0);
        }

        let levels = pin_writes(&bus, led());
        assert_eq!(levels.len(), EVENTS);
        for (i, level) in levels.iter().enumerate() {
            assert_eq!(*level, i % 2 == 0);
        }
        assert_eq!(blinker.toggles(), EVENTS as u32);
    }

    #[test]
    fn event_is_acknowledged_before_the_pin_write() {
        let bus = MockBus::new();
        let timer = Timer::new(&bus, Instance::TIMER0);
        let mut blinker = Blinker::new(&bus, led()).with_timer(timer, 0);
        bus.set(TIMER0_EVENTS_COMPARE0, 1);

        blinker.on_compare().unwrap();

        let writes = bus.writes();
        let ack = writes
            .iter()
            .position(|&w| w == (TIMER0_EVENTS_COMPARE0, 0))
            .unwrap();
        let set = writes.iter().position(|&(a, _)| a == OUTSET).unwrap();
        assert!(ack < set);
    }

    #[test]
    fn stuck_event_stops_the_timer() {
        let bus = MockBus::new();
        let timer = Timer::new(&bus, Instance::TIMER0);
        let mut blinker = Blinker::new(&bus, led()).with_timer(timer, 0);
        bus.set(TIMER0_EVENTS_COMPARE0, 1);
        bus.make_sticky(TIMER0_EVENTS_COMPARE0);

        assert_eq!(blinker.on_compare(), Err(Error::EventNotAcknowledged(0)));
        assert_eq!(bus.writes_to(TIMER0_TASKS_STOP), [1]);
        assert!(pin_writes(&bus, led()).is_empty());
        assert!(!blinker.state());
    }

    #[test]
    fn stuck_event_disables_the_interrupt() {
        let bus = MockBus::new();
        let timer = Timer::new(&bus, Instance::TIMER0);
        timer.configure(&Config::DEFAULT).unwrap();
        assert_eq!(bus.get(TIMER0_INTENSET), 1 << 16);
        let mut blinker = Blinker::new(&bus, led()).with_timer(timer, 0);
        bus.set(TIMER0_EVENTS_COMPARE0, 1);
        bus.make_sticky(TIMER0_EVENTS_COMPARE0);

        assert!(blinker.on_compare().is_err());

        assert_eq!(bus.writes_to(TIMER0_INTENCLR), [1 << 16]);
        assert_eq!(bus.writes_to(NVIC_ICER), [1 << 8]);
        assert!(!nvic::is_enabled(&bus, nvic::Irq::Timer0));

        assert_eq!(blinker.errors(), 1);
        assert_eq!(blinker.take_error(), Some(Error::EventNotAcknowledged(0)));
        assert_eq!(blinker.take_error(), None);
    }

    #[test]
    fn other_pins_are_never_written() {
        let bus = MockBus::new();
        bus.set(0x5000_0504, 0x0000_ff00);
        let mut blinker = Blinker::new(&bus, led());

        for _ in 0..4 {
            blinker.toggle();
            assert_eq!(bus.get(0x5000_0504) & !led().mask(), 0x0000_ff00);
        }
    }
}
