use std::mem;
use num::Integer;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use crate::ss::error::{Error, Result};

/// Greatest common divisor by iterated remainders. `gcd(0, 0) == 0`.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let (mut a, mut b) = (a.clone(), b.clone());
    while !b.is_zero() {
        let r = &a % &b;
        a = mem::replace(&mut b, r);
    }
    a
}

/// Least common multiple, `lcm(0, x) == 0`.
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    if a.is_zero() || b.is_zero() {
        return BigUint::zero();
    }
    a / gcd(a, b) * b
}

/// Inverse of `a` modulo `n`, reduced into `[0, n)`.
///
/// Runs the extended Euclidean algorithm keeping only the Bézout coefficient
/// of `a`. Fails with [`Error::NoInverse`] when `gcd(a, n) != 1` or `n == 0`.
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> Result<BigUint> {
    if n.is_zero() {
        return Err(Error::NoInverse);
    }
    let modulus = BigInt::from(n.clone());
    let (mut r, mut r_next) = (modulus.clone(), BigInt::from(a % n));
    let (mut t, mut t_next) = (BigInt::zero(), BigInt::one());
    while !r_next.is_zero() {
        let q = &r / &r_next;
        let r_new = &r - &q * &r_next;
        r = mem::replace(&mut r_next, r_new);
        let t_new = &t - &q * &t_next;
        t = mem::replace(&mut t_next, t_new);
    }
    if !r.is_one() {
        return Err(Error::NoInverse);
    }
    t.mod_floor(&modulus).to_biguint().ok_or(Error::NoInverse)
}

/// `base^exponent mod modulus`. A zero modulus is rejected.
pub fn pow_mod(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::Domain("modulus must be positive".to_string()));
    }
    Ok(fast_modular_exponent(base, exponent, modulus))
}

/// Square-and-multiply over the bits of `q`, least significant first.
/// `n` must be non-zero.
pub(crate) fn fast_modular_exponent(a: &BigUint, q: &BigUint, n: &BigUint) -> BigUint {
    let mut r = BigUint::one() % n;
    let mut a = a % n;
    let bits = q.bits();
    for i in 0..bits {
        if q.bit(i) { r = (r * &a) % n; }
        if i + 1 < bits { a = (&a * &a) % n; }
    }
    r
}
