/// Ordered, bounded list of playback speeds.
///
/// Stepping past either end stays at that end.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLadder {
    rates: Vec<f64>,
}

impl RateLadder {
    /// `rates` must be non-empty and strictly ascending (checked by config validation)
    pub fn new(rates: Vec<f64>) -> Self {
        debug_assert!(!rates.is_empty());
        Self { rates }
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn slowest(&self) -> f64 {
        self.rates[0]
    }

    pub fn fastest(&self) -> f64 {
        self.rates[self.rates.len() - 1]
    }

    pub fn contains(&self, rate: f64) -> bool {
        self.rates.contains(&rate)
    }

    /// Next faster rate, or the current one at the top
    pub fn faster(&self, current: f64) -> f64 {
        let index = self.index_of(current);
        self.rates[(index + 1).min(self.rates.len() - 1)]
    }

    /// Next slower rate, or the current one at the bottom
    pub fn slower(&self, current: f64) -> f64 {
        let index = self.index_of(current);
        self.rates[index.saturating_sub(1)]
    }

    /// Position of `rate`, snapping an off-ladder value to the nearest rung
    fn index_of(&self, rate: f64) -> usize {
        self.rates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - rate).abs().total_cmp(&(*b - rate).abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

impl Default for RateLadder {
    fn default() -> Self {
        Self::new(vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0])
    }
}
