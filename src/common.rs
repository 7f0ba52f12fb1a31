// Licensed under the Apache-2.0 license

//! Shared logging plumbing for the WIB driver kit.
//!
//! Hardware drivers in this crate take a [`Logger`] type parameter
//! (defaulting to [`NoOpLogger`]) instead of writing to a concrete UART, so
//! the same driver code runs on the board, under test, and in host tools.

/// Sink for driver diagnostics.
///
/// Implementations must not block for longer than a register access; drivers
/// call this from inside polling loops.
pub trait Logger {
    /// Record one formatted message.
    fn log(&mut self, args: core::fmt::Arguments<'_>);
}

/// Logger that discards everything. The default for all drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&mut self, _args: core::fmt::Arguments<'_>) {}
}

/// Logger that forwards messages to an [`embedded_io::Write`] sink, one
/// message per line. Typically wrapped around the board UART.
pub struct WriteLogger<W> {
    sink: W,
}

impl<W: embedded_io::Write> WriteLogger<W> {
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Give back the underlying sink.
    pub fn release(self) -> W {
        self.sink
    }
}

impl<W: embedded_io::Write> Logger for WriteLogger<W> {
    fn log(&mut self, args: core::fmt::Arguments<'_>) {
        // Diagnostics are best-effort; a full UART must not fail a transaction.
        let _ = self.sink.write_fmt(args);
        let _ = self.sink.write_all(b"\r\n");
    }
}
