/// Streaming arithmetic mean: O(1) memory, O(1) per fold.
///
/// Each fold rescales the running mean, which accumulates floating-point
/// drift over very long histories; fold counts here are one per tested
/// input, small enough that the drift stays far below timer noise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningAverage {
    average: f64,
    count: u64,
}

impl RunningAverage {
    /// An empty average: mean 0.0, count 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one value into the mean.
    pub fn add(&mut self, value: f64) {
        let n = self.count as f64;
        self.average = (self.average * n + value) / (n + 1.0);
        self.count += 1;
    }

    /// The mean of every value folded in so far; 0.0 when empty.
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Number of values folded in so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}
