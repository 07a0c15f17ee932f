//! Audio capture pipeline pieces: resampling and frame chunking.
//!
//! Capture hands the pipeline PCM16 mono at whatever rate the device
//! runs. The uplink wants 16 kHz in ~100 ms frames, fire-and-forget, so
//! this module does the pure sample work and leaves sending to the
//! narrator client.

/// Uplink sample rate in Hz.
pub const SAMPLE_RATE: u32 = 16_000;

/// Samples per uplink frame (~100 ms at 16 kHz).
pub const FRAME_SAMPLES: usize = 1_600;

/// Linear-interpolation resample of PCM16 mono to 16 kHz.
pub fn resample_to_16k(samples: &[i16], input_rate: u32) -> Vec<i16> {
    if input_rate == SAMPLE_RATE || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = input_rate as f64 / SAMPLE_RATE as f64;
    let out_len = ((samples.len() as f64) / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let left = pos.floor() as usize;
        let right = (left + 1).min(samples.len() - 1);
        let frac = pos - left as f64;
        let sample = samples[left] as f64 * (1.0 - frac) + samples[right] as f64 * frac;
        out.push(sample.round() as i16);
    }

    out
}

/// Splits a sample stream into fixed-size frames, carrying the
/// remainder across pushes. A trailing partial frame is dropped when
/// capture stops; the uplink has no acknowledgement or retry, so a
/// short tail is not worth padding.
#[derive(Debug, Clone, Default)]
pub struct FrameChunker {
    remainder: Vec<i16>,
}

impl FrameChunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed captured samples, returning every whole frame now available.
    pub fn push(&mut self, samples: &[i16]) -> Vec<Vec<i16>> {
        self.remainder.extend_from_slice(samples);

        let whole = self.remainder.len() / FRAME_SAMPLES;
        let mut frames = Vec::with_capacity(whole);
        for chunk in self.remainder.chunks_exact(FRAME_SAMPLES).take(whole) {
            frames.push(chunk.to_vec());
        }
        self.remainder.drain(..whole * FRAME_SAMPLES);

        frames
    }

    /// Samples currently buffered below a whole frame.
    pub fn pending(&self) -> usize {
        self.remainder.len()
    }

    /// Discard any buffered partial frame (capture stopped).
    pub fn reset(&mut self) {
        self.remainder.clear();
    }
}
