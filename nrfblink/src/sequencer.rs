//! Startup sequence and main loops.
//!
//! [`init`] brings the board up in a fixed order: HFCLK, TIMER (hardware
//! strategy only), RTT and banner, LED direction. Then either the
//! foreground loop blinks the LED itself or the blinker is handed to the
//! TIMER interrupt and the foreground sleeps.

use core::convert::Infallible;

use irqcell::IrqCell;

use crate::blinker::Blinker;
use crate::clock;
use crate::config::{Config, Delay, Strategy};
use crate::cpu;
use crate::gpio::{self, Direction};
use crate::mmio::Bus;
use crate::nvic::{self, Irq};
use crate::timer::Timer;
use crate::{print, println, Error, Result};

/// Brings up the clock, the timer, the RTT channel and the LED pin, in this
/// order, and returns the blinker driving the LED. With the hardware
/// strategy the timer is already counting when this function returns, but
/// its interrupt line is still disabled in the NVIC.
pub fn init<B: Bus + Clone>(bus: B, config: &Config) -> Result<Blinker<B>> {
    clock::start_hfclk(&bus, config.clock_wait)?;

    let compare = match config.strategy {
        Strategy::HardwareTimer(timer_config) => {
            let timer = Timer::new(bus.clone(), timer_config.instance);
            timer.configure(&timer_config)?;
            timer.start();
            Some((timer, timer_config.channel))
        }
        Strategy::SoftwareDelay(_) => None,
    };

    print::init();
    crate::print!("{}", config.banner);

    gpio::set_direction(&bus, config.led, Direction::Output);

    let blinker = Blinker::new(bus, config.led);
    Ok(match compare {
        Some((timer, channel)) => blinker.with_timer(timer, channel),
        None => blinker,
    })
}

/// Toggles the LED and waits `delay`. Returns the level written.
pub fn step_software_delay<B: Bus>(blinker: &mut Blinker<B>, delay: Delay) -> bool {
    let level = blinker.toggle();
    cpu::delay(delay.cycles());
    level
}

/// Blinks the LED from the foreground, forever.
pub fn run_software_delay<B: Bus>(mut blinker: Blinker<B>, delay: Delay) -> ! {
    loop {
        step_software_delay(&mut blinker, delay);
    }
}

/// Moves `blinker` into `cell` and enables the interrupt line of its timer.
/// Any stale pending interrupt is discarded first. Returns the enabled line.
pub fn arm_hardware_timer<B: Bus + Clone>(
    cell: &IrqCell<Blinker<B>>,
    blinker: Blinker<B>,
) -> Result<Irq> {
    let irq = blinker
        .timer()
        .ok_or(Error::TimerNotConfigured)?
        .instance()
        .irq();
    let bus = blinker.bus().clone();

    cell.install(blinker)
        .map_err(|_| Error::HandlerAlreadyInstalled)?;

    nvic::unpend(&bus, irq);
    nvic::enable(&bus, irq);

    Ok(irq)
}

/// Arms the timer interrupt and sleeps forever, reporting the error that
/// made the handler give up, if any. It only returns if the interrupt cannot
/// be armed.
pub fn run_hardware_timer<B: Bus + Clone>(
    cell: &IrqCell<Blinker<B>>,
    blinker: Blinker<B>,
) -> Result<Infallible> {
    let bus = blinker.bus().clone();
    let irq = arm_hardware_timer(cell, blinker)?;

    loop {
        cpu::wfi();
        report_timer_error(&bus, irq, cell);
    }
}

/// Prints the error recorded by the TIMER interrupt handler, from the
/// foreground. The blinker is only borrowed once the handler has disabled
/// `irq`, so the handler never finds it borrowed because of this function.
pub fn report_timer_error<B: Bus>(
    bus: &B,
    irq: Irq,
    cell: &IrqCell<Blinker<B>>,
) -> Option<Error> {
    if nvic::is_enabled(bus, irq) {
        return None;
    }

    let err = cell.lock()?.take_error()?;
    println!("timer interrupt: {err}");
    Some(err)
}

/// Runs the firmware described by `config`. It only returns on a startup
/// error.
pub fn run<B: Bus + Clone>(
    bus: B,
    config: &Config,
    cell: &IrqCell<Blinker<B>>,
) -> Result<Infallible> {
    let blinker = init(bus, config)?;

    match config.strategy {
        Strategy::SoftwareDelay(delay) => run_software_delay(blinker, delay),
        Strategy::HardwareTimer(_) => run_hardware_timer(cell, blinker),
    }
}

/// Body of the TIMER interrupt handler. It never blocks: if the blinker is
/// missing or already borrowed the interrupt is ignored. It does not print;
/// errors are recorded in the blinker and reported by
/// [`report_timer_error`].
pub fn on_timer_interrupt<B: Bus>(cell: &IrqCell<Blinker<B>>) {
    if let Some(mut blinker) = cell.lock() {
        let _ = blinker.on_compare();
    }
}
