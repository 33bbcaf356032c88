// Injectable randomness for confirmation codes, snow particles and demo picks

use rand::{Rng, RngCore};

pub const CONFIRMATION_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Uniform random source. Every rand RNG is one, tests can plug in fixed sequences.
pub trait RandomSource {
    // Uniform index in 0..bound. bound must be non-zero.
    fn next_index(&mut self, bound: usize) -> usize;

    // Uniform float in [0, 1)
    fn next_unit(&mut self) -> f64;
}

impl<R: RngCore> RandomSource for R {
    fn next_index(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }

    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

pub fn generate_confirmation_code<R: RandomSource + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| CONFIRMATION_ALPHABET[rng.next_index(CONFIRMATION_ALPHABET.len())] as char)
        .collect()
}

// Picks `count` distinct positions out of 0..len using a partial Fisher-Yates shuffle
pub fn choose_distinct<R: RandomSource + ?Sized>(rng: &mut R, len: usize, count: usize) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..len).collect();
    let count = count.min(len);
    for i in 0..count {
        let j = i + rng.next_index(len - i);
        positions.swap(i, j);
    }
    positions.truncate(count);
    positions
}

// Replays a fixed list of indices, wrapping around. Handy for deterministic codes.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<usize>,
    position: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<usize>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    fn next_raw(&mut self) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

impl RandomSource for SequenceRandom {
    // Yields 0 for an empty range instead of dividing by zero
    fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.next_raw() % bound
    }

    fn next_unit(&mut self) -> f64 {
        (self.next_raw() % 100) as f64 / 100.0
    }
}
