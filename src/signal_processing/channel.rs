use crate::constants::FILTER_ORDER;
use crate::signal_processing::ButterworthCoefficients;

/// Filter memory for one audio channel of one speaker
///
/// Holds the last `FILTER_ORDER` inputs and outputs in circular buffers
/// sharing a single write index. Advancing one sample is O(order) with no
/// heap activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFilterState {
    x: [f64; FILTER_ORDER],
    y: [f64; FILTER_ORDER],
    index: usize,
}

impl ChannelFilterState {
    pub fn new() -> Self {
        Self {
            x: [0.0; FILTER_ORDER],
            y: [0.0; FILTER_ORDER],
            index: 0,
        }
    }

    /// Run one sample through the direct-form-I recurrence
    ///
    /// `y = b0*x + sum_{i=1..N} (b[i]*x[n-i] - a[i]*y[n-i])`
    #[inline]
    pub fn process_sample(&mut self, coefficients: &ButterworthCoefficients, input: f64) -> f64 {
        let b = coefficients.feedforward();
        let a = coefficients.feedback();

        let mut output = b[0] * input;
        for i in 1..=FILTER_ORDER {
            let past = (self.index + FILTER_ORDER - i) % FILTER_ORDER;
            output += b[i] * self.x[past] - a[i] * self.y[past];
        }

        self.x[self.index] = input;
        self.y[self.index] = output;
        self.index = (self.index + 1) % FILTER_ORDER;

        output
    }

    /// Zero both histories and rewind the write index
    pub fn reset(&mut self) {
        self.x = [0.0; FILTER_ORDER];
        self.y = [0.0; FILTER_ORDER];
        self.index = 0;
    }

    /// True when no input or output has left a trace in the history
    pub fn is_silent(&self) -> bool {
        self.x.iter().chain(self.y.iter()).all(|&v| v == 0.0)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Past inputs, in storage order
    pub fn inputs(&self) -> &[f64; FILTER_ORDER] {
        &self.x
    }

    /// Past outputs, in storage order
    pub fn outputs(&self) -> &[f64; FILTER_ORDER] {
        &self.y
    }
}

impl Default for ChannelFilterState {
    fn default() -> Self {
        Self::new()
    }
}
