//! RTT writer and print macros.
//!
//! The output goes to up-channel 0 of the SEGGER RTT control block, read by
//! the debug probe. The channel blocks the caller when its buffer is full,
//! so no output is lost while a probe is attached. On the host the output is
//! discarded.

use core::fmt;

/// Implements a writer on top of the RTT up-channel.
pub struct RttWriter;

impl fmt::Write for RttWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        sink::write(s.as_bytes());
        Ok(())
    }
}

/// Sets up the RTT control block. Output printed before this call is
/// discarded. Calling it again has no effect.
pub fn init() {
    sink::init();
}

#[cfg(target_os = "none")]
mod sink {
    use irqcell::IrqCell;
    use rtt_target::{rtt_init_default, ChannelMode, UpChannel};

    /// Up-channel 0, once initialized.
    static CHANNEL: IrqCell<UpChannel> = IrqCell::new();

    pub fn init() {
        if CHANNEL.is_installed() {
            return;
        }

        let channels = rtt_init_default!();
        let mut up = channels.up.0;
        up.set_mode(ChannelMode::BlockIfFull);
        let _ = CHANNEL.install(up);
    }

    pub fn write(bytes: &[u8]) {
        // A writer interrupted by a handler that prints keeps the channel,
        // the handler's output is dropped.
        if let Some(mut channel) = CHANNEL.lock() {
            channel.write(bytes);
        }
    }
}

#[cfg(not(target_os = "none"))]
mod sink {
    pub fn init() {}

    pub fn write(_bytes: &[u8]) {}
}

/// Print to the RTT up-channel.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        let _ = core::fmt::Write::write_fmt(
            &mut $crate::print::RttWriter,
            core::format_args!($($arg)*),
        );
    };
}

/// Print to the RTT up-channel, with a newline.
#[macro_export]
macro_rules! println {
    () => {
        $crate::println!("");
    };

    ($($arg:tt)*) => {
        let _ = core::fmt::Write::write_fmt(
            &mut $crate::print::RttWriter,
            core::format_args!("{}\r\n", core::format_args!($($arg)*)),
        );
    };
}
