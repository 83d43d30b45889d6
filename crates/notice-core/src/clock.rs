//! Monotonic time source for the control loop.

use embedded_hal::delay::DelayNs;

/// Millisecond clock plus the delay used for the cooperative loop tick.
///
/// `now_ms` must be monotonic; the inter-play wait is measured against it.
pub trait Clock: DelayNs {
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&self) -> u64 {
        T::now_ms(self)
    }
}
