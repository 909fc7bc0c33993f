use crate::signal_processing::{ButterworthCoefficients, ChannelFilterState};

/// Low-pass filter for a single speaker
///
/// Owns the coefficients for the speaker's current cutoff and one
/// [`ChannelFilterState`] per channel index seen so far. Channel states are
/// created lazily; a cutoff change swaps the coefficients and zeroes every
/// channel's history, since history recorded under another cutoff is
/// meaningless.
#[derive(Debug, Clone)]
pub struct SpeakerFilter {
    coefficients: ButterworthCoefficients,
    channels: Vec<ChannelFilterState>,
}

impl SpeakerFilter {
    pub fn new(cutoff_hz: u32) -> Self {
        Self {
            coefficients: ButterworthCoefficients::lowpass(cutoff_hz),
            channels: Vec::new(),
        }
    }

    pub fn cutoff_hz(&self) -> u32 {
        self.coefficients.cutoff_hz()
    }

    pub fn coefficients(&self) -> &ButterworthCoefficients {
        &self.coefficients
    }

    /// Number of channels that have been observed for this speaker
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelFilterState> {
        self.channels.get(index)
    }

    /// State for `index`, created on first use
    pub fn channel_mut(&mut self, index: usize) -> &mut ChannelFilterState {
        if index >= self.channels.len() {
            self.channels.resize_with(index + 1, ChannelFilterState::new);
        }
        &mut self.channels[index]
    }

    /// Redesign for `cutoff_hz` and zero the history of every channel
    ///
    /// Channel slots are kept, so a cutoff change on the audio thread does
    /// not reallocate.
    pub fn retune(&mut self, cutoff_hz: u32) {
        self.coefficients = ButterworthCoefficients::lowpass(cutoff_hz);
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    /// Filter an interleaved buffer in place
    ///
    /// Samples are laid out as `frame * channels + channel`. Every channel of
    /// a frame is advanced before moving to the next frame. A trailing partial
    /// frame is left untouched.
    pub fn process_interleaved(&mut self, samples: &mut [i16], channels: usize) {
        if channels == 0 {
            return;
        }
        if self.channels.len() < channels {
            self.channels.resize_with(channels, ChannelFilterState::new);
        }

        let coefficients = &self.coefficients;
        for frame in samples.chunks_exact_mut(channels) {
            for (sample, state) in frame.iter_mut().zip(self.channels.iter_mut()) {
                let filtered = state.process_sample(coefficients, *sample as f64);
                // Saturating, truncating toward zero.
                *sample = filtered as i16;
            }
        }
    }
}
