//! String-seeded pseudo-random stream.
//!
//! The seed string is hashed with `cyrb128` (over its UTF-16 code units) into
//! four 32-bit lanes, which then drive an `sfc32` generator. Two streams built
//! from the same seed string produce identical sequences, so deals and Monte
//! Carlo runs are reproducible from a seed alone.

use rand::{Error, RngCore, SeedableRng};

const UNIT_SCALE: f64 = 4_294_967_296.0;

/// Small fast counter generator seeded from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl SeededRng {
    pub fn from_seed_str(seed: &str) -> Self {
        let [a, b, c, d] = cyrb128(seed);
        Self { a, b, c, d }
    }

    /// Numeric seeds are hashed through their decimal string form.
    pub fn from_number(seed: u64) -> Self {
        Self::from_seed_str(&seed.to_string())
    }

    /// Next float in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        unit(self)
    }

    fn step(&mut self) -> u32 {
        let mut t = self.a.wrapping_add(self.b);
        self.a = self.b ^ (self.b >> 9);
        self.b = self.c.wrapping_add(self.c << 3);
        self.c = self.c.rotate_left(21);
        self.d = self.d.wrapping_add(1);
        t = t.wrapping_add(self.d);
        self.c = self.c.wrapping_add(t);
        t
    }
}

/// Maps one 32-bit word of `rng` onto `[0, 1)`.
pub fn unit<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.next_u32()) / UNIT_SCALE
}

fn cyrb128(seed: &str) -> [u32; 4] {
    let mut h1: u32 = 1_779_033_703;
    let mut h2: u32 = 3_144_134_277;
    let mut h3: u32 = 1_013_904_242;
    let mut h4: u32 = 2_773_480_762;
    for code_unit in seed.encode_utf16() {
        let k = u32::from(code_unit);
        h1 = h2 ^ (h1 ^ k).wrapping_mul(597_399_067);
        h2 = h3 ^ (h2 ^ k).wrapping_mul(2_869_860_233);
        h3 = h4 ^ (h3 ^ k).wrapping_mul(951_274_213);
        h4 = h1 ^ (h4 ^ k).wrapping_mul(2_716_044_179);
    }
    h1 = (h3 ^ (h1 >> 18)).wrapping_mul(597_399_067);
    h2 = (h4 ^ (h2 >> 22)).wrapping_mul(2_869_860_233);
    h3 = (h1 ^ (h3 >> 17)).wrapping_mul(951_274_213);
    h4 = (h2 ^ (h4 >> 19)).wrapping_mul(2_716_044_179);
    [h1 ^ h2 ^ h3 ^ h4, h2 ^ h1, h3 ^ h1, h4 ^ h1]
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.step());
        let high = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.step().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SeededRng {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let lane = |offset: usize| {
            u32::from_le_bytes([
                seed[offset],
                seed[offset + 1],
                seed[offset + 2],
                seed[offset + 3],
            ])
        };
        Self {
            a: lane(0),
            b: lane(4),
            c: lane(8),
            d: lane(12),
        }
    }
}
