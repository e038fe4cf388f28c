use num_bigint::BigUint;
use num_traits::One;
use crate::ss::error::{Error, Result};
use crate::ss::keys::{PrivateKey, PublicKey};
use crate::ss::number::{lcm, mod_inverse};

/// Both halves of a key, with the primes they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub p: BigUint,
    pub q: BigUint,
    /// Public value `p^2 * q`, used as both exponent and modulus.
    pub n: BigUint,
    /// Private exponent, `n^-1 mod lcm(p - 1, q - 1)`.
    pub d: BigUint,
    /// Private modulus `p * q`.
    pub pq: BigUint,
}

impl KeyPair {
    /// Derives the rest of the key from two distinct primes.
    ///
    /// Fails with [`Error::NoInverse`] when `n` shares a factor with
    /// `lcm(p - 1, q - 1)`, which happens when `p | q - 1` or `q | p - 1`.
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<Self> {
        let one = BigUint::one();
        if p <= one || q <= one {
            return Err(Error::Domain("key primes must be greater than 1".to_string()));
        }
        if p == q {
            return Err(Error::Domain("key primes must be distinct".to_string()));
        }
        let pq = &p * &q;
        let n = &pq * &p;
        let lambda = lcm(&(&p - &one), &(&q - &one));
        let d = mod_inverse(&(&n % &lambda), &lambda)?;
        Ok(Self { p, q, n, d, pq })
    }

    pub fn public_key(&self, owner: &str) -> PublicKey {
        PublicKey { n: self.n.clone(), owner: owner.to_string() }
    }

    pub fn private_key(&self) -> PrivateKey {
        PrivateKey { pq: self.pq.clone(), d: self.d.clone() }
    }

    /// `(name, value, bit size)` for every component, in display order.
    pub fn components(&self) -> Vec<(&'static str, &BigUint, u64)> {
        vec![
            ("prime number p", &self.p, self.p.bits()),
            ("prime number q", &self.q, self.q.bits()),
            ("public key", &self.n, self.n.bits()),
            ("private exponent", &self.d, self.d.bits()),
            ("private modulus", &self.pq, self.pq.bits()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num_bigint::BigUint;
    use crate::ss::keys::KeyPair;

    #[test]
    fn test_simple_data() -> Result<(), Box<dyn Error>> {
        let keys = KeyPair::from_primes(BigUint::from(7u32), BigUint::from(11u32))?;
        assert_eq!(keys.n, BigUint::from(539u32));
        assert_eq!(keys.pq, BigUint::from(77u32));
        // lcm(6, 10) = 30, 539 mod 30 = 29, 29 * 29 = 841 = 28 * 30 + 1
        assert_eq!(keys.d, BigUint::from(29u32));
        assert_eq!(keys.public_key("alice").owner, "alice");
        assert_eq!(keys.private_key().d, keys.d);
        Ok(())
    }

    #[test]
    fn test_no_inverse() {
        // 3 divides 7 - 1
        let res = KeyPair::from_primes(BigUint::from(3u32), BigUint::from(7u32));
        assert!(matches!(res, Err(crate::Error::NoInverse)));
    }

    #[test]
    fn test_bad_primes() {
        let res = KeyPair::from_primes(BigUint::from(7u32), BigUint::from(7u32));
        assert!(matches!(res, Err(crate::Error::Domain(_))));
        let res = KeyPair::from_primes(BigUint::from(1u32), BigUint::from(7u32));
        assert!(matches!(res, Err(crate::Error::Domain(_))));
    }

    #[test]
    fn test_components() -> Result<(), Box<dyn Error>> {
        let keys = KeyPair::from_primes(BigUint::from(7u32), BigUint::from(11u32))?;
        let components = keys.components();
        assert_eq!(components.len(), 5);
        assert_eq!(components[2], ("public key", &keys.n, 10));
        Ok(())
    }
}
