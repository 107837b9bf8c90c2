/// The default seed used to derive background register values.
pub const DEFAULT_BACKGROUND_SEED: u64 = 0x5eed_a7a5;

/// Settings shared by every case in a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarnessConfig {
    /// The seed mixed with each case identity to derive its background register values.
    pub background_seed: u64,
    /// Should the general purpose registers be filled with pseudo-random values before setup?
    /// When disabled they keep their reset value of zero.
    pub randomize_background: bool,
}

impl HarnessConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.background_seed = seed;
        self
    }

    pub fn with_randomized_background(mut self, state: bool) -> Self {
        self.randomize_background = state;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            background_seed: DEFAULT_BACKGROUND_SEED,
            randomize_background: true,
        }
    }
}
