//! Byte stream trait and transport adapters.

/// Byte-level serial transport the bridge reads MAVLink from.
///
/// Calls are polled and must not block: `read_byte` returns `None` instead of
/// waiting for data.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ByteStream {
    /// Check whether at least one byte can be read without blocking.
    fn available(&mut self) -> bool;

    /// Read one byte, or `None` if nothing is buffered.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue bytes for transmission toward the serial peer.
    fn write(&mut self, data: &[u8]);

    /// Push out anything queued by [`ByteStream::write`].
    fn flush(&mut self);
}

impl<T: ByteStream + ?Sized> ByteStream for &mut T {
    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, data: &[u8]) {
        (**self).write(data)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

#[cfg(feature = "embedded-io")]
pub use self::embedded::EmbeddedIoStream;

#[cfg(feature = "embedded-io")]
mod embedded {
    use super::ByteStream;
    use embedded_io::{Read, ReadReady, Write};

    /// [`ByteStream`] over a blocking `embedded-io` peripheral, such as a
    /// buffered HAL UART.
    ///
    /// I/O errors are logged and reported as "no data"; a write error drops the
    /// rest of the buffer.
    pub struct EmbeddedIoStream<T> {
        io: T,
    }

    impl<T> EmbeddedIoStream<T> {
        pub fn new(io: T) -> Self {
            Self { io }
        }

        pub fn inner(&self) -> &T {
            &self.io
        }

        pub fn inner_mut(&mut self) -> &mut T {
            &mut self.io
        }

        pub fn into_inner(self) -> T {
            self.io
        }
    }

    impl<T: Read + ReadReady + Write> ByteStream for EmbeddedIoStream<T> {
        fn available(&mut self) -> bool {
            match self.io.read_ready() {
                Ok(ready) => ready,
                Err(_) => {
                    warn!("serial read_ready error");
                    false
                }
            }
        }

        fn read_byte(&mut self) -> Option<u8> {
            if !self.available() {
                return None;
            }
            let mut byte = [0u8; 1];
            match self.io.read(&mut byte) {
                Ok(1) => Some(byte[0]),
                Ok(_) => None,
                Err(_) => {
                    warn!("serial read error");
                    None
                }
            }
        }

        fn write(&mut self, data: &[u8]) {
            if self.io.write_all(data).is_err() {
                warn!("serial write error");
            }
        }

        fn flush(&mut self) {
            if self.io.flush().is_err() {
                warn!("serial flush error");
            }
        }
    }

}
