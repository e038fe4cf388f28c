use num_bigint::BigUint;
use rand::Rng;

pub mod config;
pub mod error;
pub mod keys;
pub mod number;
pub mod prime_gen;
pub mod stream;

use config::*;
pub use error::*;
pub use keys::*;
pub use number::*;
pub use prime_gen::*;
pub use stream::*;

use crate::ss_log;

/// Key generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchmidtSamoa {
    /// Target size of the public value `n`.
    pub nbits: u64,
    /// Miller-Rabin rounds per candidate.
    pub rounds: u32,
    /// More than one searches for `p` and `q` concurrently.
    pub threads: usize,
}

impl Default for SchmidtSamoa {
    fn default() -> Self {
        Self { nbits: DEFAULT_BITS, rounds: DEFAULT_ROUNDS, threads: 1 }
    }
}

impl SchmidtSamoa {
    pub fn new(nbits: u64, rounds: u32) -> Self {
        Self { nbits, rounds, ..Self::default() }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    fn check(&self) -> Result<()> {
        if self.nbits < MIN_BITS {
            return Err(Error::Domain(format!("key size must be at least {} bits, got {}", MIN_BITS, self.nbits)));
        }
        if self.rounds == 0 {
            return Err(Error::Domain("Miller-Rabin rounds must be positive".to_string()));
        }
        Ok(())
    }

    /// Picks `pbits` from `[nbits/5, 2*nbits/5]` and gives the rest to `q`,
    /// so that `2 * pbits + qbits == nbits`.
    fn split_bits<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(u64, u64)> {
        let (lower, upper) = (self.nbits / 5, 2 * self.nbits / 5);
        let pbits = rng.gen_range(lower..=upper);
        match self.nbits.checked_sub(2 * pbits) {
            Some(qbits) if qbits > 0 && pbits > 1 => Ok((pbits, qbits)),
            _ => Err(Error::Domain(format!("cannot split {} bits between p and q", self.nbits))),
        }
    }

    /// Generates a fresh key pair from `rng`.
    ///
    /// The result only depends on the state of `rng`, whatever `threads` is.
    /// [`Error::NoInverse`] means the primes were unlucky and the caller
    /// should try again.
    pub fn generate_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<KeyPair> {
        self.check()?;
        let (pbits, qbits) = self.split_bits(rng)?;
        ss_log!("pbits {}, qbits {}", pbits, qbits);
        let (p, mut q) = generate_prime_pair(pbits, qbits, self.rounds, self.threads, rng)?;
        while q == p {
            q = generate_random_prime(qbits, self.rounds, rng)?;
        }
        KeyPair::from_primes(p, q)
    }
}

/// Key pair for a public value of about `nbits` bits, see
/// [`SchmidtSamoa::generate_key`].
pub fn generate_key_pair<R: Rng + ?Sized>(nbits: u64, iterations: u32, rng: &mut R) -> Result<KeyPair> {
    SchmidtSamoa::new(nbits, iterations).generate_key(rng)
}

/// `m^n mod n`: the public value is both exponent and modulus.
pub fn encrypt_block(m: &BigUint, n: &BigUint) -> Result<BigUint> {
    pow_mod(m, n, n)
}

/// `c^d mod pq`.
pub fn decrypt_block(c: &BigUint, d: &BigUint, pq: &BigUint) -> Result<BigUint> {
    pow_mod(c, d, pq)
}
