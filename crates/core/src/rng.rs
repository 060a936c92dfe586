use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform randomness consumed by the economy.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let idx = (self.next_unit() * len as f64).floor() as usize;
        idx.min(len - 1)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }
}

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds from the thread rng; the chosen seed is still reported by `seed`.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for RngState {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Replays a fixed list of unit values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
