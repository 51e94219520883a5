use std::io::{self, Read};

/// Default progress frequency: 8 MiB
pub const DEFAULT_FREQUENCY: u64 = 8 * 1024 * 1024;

/// A reader wrapper that reports how far into the input file we are.
///
/// The callback receives the cumulative byte count each time it crosses a
/// multiple of `frequency`. A single large read that crosses several
/// multiples fires the callback once per multiple, in order.
#[derive(Debug)]
pub struct InstrumentedReader<R, F>
where
    R: Read,
    F: FnMut(u64),
{
    inner: R,
    callback: F,
    frequency: u64,
    total_read: u64,
    next_threshold: u64,
}

impl<R, F> InstrumentedReader<R, F>
where
    R: Read,
    F: FnMut(u64),
{
    pub fn new(inner: R, callback: F) -> Self {
        Self::with_frequency(inner, DEFAULT_FREQUENCY, callback)
    }

    /// A `frequency` of 0 falls back to [`DEFAULT_FREQUENCY`].
    pub fn with_frequency(inner: R, frequency: u64, callback: F) -> Self {
        let frequency = if frequency == 0 { DEFAULT_FREQUENCY } else { frequency };
        Self {
            inner,
            callback,
            frequency,
            total_read: 0,
            next_threshold: frequency,
        }
    }

    fn record(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.total_read = self.total_read.saturating_add(n as u64);
        while self.total_read >= self.next_threshold {
            (self.callback)(self.total_read);
            match self.next_threshold.checked_add(self.frequency) {
                Some(next) => self.next_threshold = next,
                None => {
                    self.next_threshold = u64::MAX;
                    break;
                }
            }
        }
    }
}

impl<R, F> Read for InstrumentedReader<R, F>
where
    R: Read,
    F: FnMut(u64),
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.record(n);
        Ok(n)
    }

    fn read_vectored(&mut self, bufs: &mut [io::IoSliceMut<'_>]) -> io::Result<usize> {
        let n = self.inner.read_vectored(bufs)?;
        self.record(n);
        Ok(n)
    }
}
