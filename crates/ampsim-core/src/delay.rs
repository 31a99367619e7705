//! Fractional delay line for modulated effects.
//!
//! [`InterpolatedDelay`] is a fixed-capacity circular buffer read at a
//! fractional offset with linear interpolation between the two neighboring
//! integer positions. The chorus engine keeps one per channel.
//!
//! # Cursor Convention
//!
//! The write cursor always points at the next slot to be overwritten. A read
//! with delay `d` addresses `write_pos - 1 - d (mod capacity)`, so `d == 0.0`
//! returns the most recently written sample.

/// Interpolated delay line using a circular buffer (heap-allocated).
///
/// # Memory
///
/// The buffer is allocated during construction and never reallocates. No
/// allocations occur during audio processing.
///
/// # Example
///
/// ```rust
/// use ampsim_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(64);
/// delay.write(0.5);
/// assert_eq!(delay.read(0.0), 0.5);
///
/// delay.write(1.0);
/// assert_eq!(delay.read(0.5), 0.75);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    /// Circular buffer storage
    buffer: Vec<f32>,
    /// Next slot to be overwritten
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a new delay line holding `capacity` samples.
    ///
    /// The longest readable delay is `capacity - 2` so that both
    /// interpolation neighbors are always inside the written history.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "Delay capacity must be at least 2 samples");

        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Creates a delay line able to hold `max_seconds` at `sample_rate`,
    /// plus the interpolation guard.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let max_samples = (sample_rate * max_seconds).ceil().max(0.0) as usize + 2;
        Self::new(max_samples)
    }

    /// Longest delay (in samples) that [`read`](Self::read) honors.
    #[inline]
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    /// Reads a delayed sample with linear interpolation.
    ///
    /// `delay_samples` is clamped to `[0, max_delay()]`; NaN reads as zero
    /// delay.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.max(0.0).min(self.max_delay());

        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let read_pos = (self.write_pos + len - delay_int - 1) % len;
        let a = self.buffer[read_pos];
        if frac == 0.0 {
            return a;
        }

        let b = self.buffer[(read_pos + len - 1) % len];
        a + (b - a) * frac
    }

    /// Writes a sample at the write cursor and advances it.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Writes `sample`, then reads `delay_samples` behind it.
    ///
    /// With zero delay the output is `sample` itself.
    #[inline]
    pub fn write_then_read(&mut self, sample: f32, delay_samples: f32) -> f32 {
        self.write(sample);
        self.read(delay_samples)
    }

    /// Clears the delay line (sets all samples to 0) and rewinds the cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Returns the buffer capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Current write cursor.
    pub fn write_position(&self) -> usize {
        self.write_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_returns_last_written() {
        let mut delay = InterpolatedDelay::new(16);
        for i in 0..40 {
            let x = i as f32 * 0.25 - 3.0;
            assert_eq!(delay.write_then_read(x, 0.0), x);
        }
    }

    #[test]
    fn test_integer_delay() {
        let mut delay = InterpolatedDelay::new(100);
        for i in 0..10 {
            delay.write(i as f32);
        }
        assert_eq!(delay.read(0.0), 9.0);
        assert_eq!(delay.read(3.0), 6.0);
        assert_eq!(delay.read(9.0), 0.0);
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let mut delay = InterpolatedDelay::new(16);
        delay.write(0.0);
        delay.write(1.0);
        // 0.25 samples back from 1.0 toward 0.0
        assert!((delay.read(0.25) - 0.75).abs() < 1e-7);
    }

    #[test]
    fn test_delay_is_clamped() {
        let mut delay = InterpolatedDelay::new(8);
        for i in 0..8 {
            delay.write(i as f32 + 1.0);
        }
        assert_eq!(delay.max_delay(), 6.0);
        assert_eq!(delay.read(100.0), delay.read(6.0));
        assert_eq!(delay.read(-5.0), delay.read(0.0));
        assert_eq!(delay.read(f32::NAN), delay.read(0.0));
    }

    #[test]
    fn test_wraparound() {
        let mut delay = InterpolatedDelay::new(4);
        for i in 0..11 {
            delay.write(i as f32);
        }
        assert_eq!(delay.read(0.0), 10.0);
        assert_eq!(delay.read(2.0), 8.0);
    }

    #[test]
    fn test_clear() {
        let mut delay = InterpolatedDelay::new(8);
        delay.write(1.0);
        delay.clear();
        assert_eq!(delay.write_position(), 0);
        assert_eq!(delay.read(0.0), 0.0);
    }

    #[test]
    fn test_from_time() {
        let delay = InterpolatedDelay::from_time(48000.0, 0.01);
        assert!(delay.max_delay() >= 480.0);
    }
}
