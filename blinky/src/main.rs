//! Blinks the LED of an nRF52832 board.
//!
//! By default the LED toggles every second from the TIMER0 compare
//! interrupt. With the `busy-wait` feature it toggles from a delay loop.

#![no_std]
#![no_main]

use irqcell::IrqCell;
use nrfblink::blinker::Blinker;
use nrfblink::config::Config;
use nrfblink::mmio::Mmio;
use nrfblink::sequencer;
use nrfblink_macros::{entrypoint, interrupt_handler, interrupt_vector_table};

#[cfg(not(feature = "busy-wait"))]
const CONFIG: Config = Config::DEFAULT;

#[cfg(feature = "busy-wait")]
const CONFIG: Config = Config::DEFAULT.with_strategy(
    nrfblink::config::Strategy::SoftwareDelay(nrfblink::config::Delay::Cycles(
        nrfblink::config::BUSY_WAIT_CYCLES,
    )),
);

/// Blinker owned by the TIMER0 interrupt.
static BLINKER: IrqCell<Blinker<Mmio>> = IrqCell::new();

/// Firmware main function.
#[entrypoint]
fn main() -> ! {
    let bus = unsafe { Mmio::new() };

    match sequencer::run(bus, &CONFIG, &BLINKER) {
        Ok(never) => match never {},
        Err(err) => panic!("startup error: {err}"),
    }
}

/// TIMER0 interrupt handler.
#[interrupt_handler]
fn timer0_handler() {
    sequencer::on_timer_interrupt(&BLINKER);
}

interrupt_vector_table! {
    Timer0 => timer0_handler,
}
