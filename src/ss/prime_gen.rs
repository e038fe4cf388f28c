use std::thread;
use chrono::Local;
use crossbeam_channel::bounded;
use num::Integer;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::ss::error::{Error, Result};
use crate::ss::number::fast_modular_exponent;
use crate::ss_log;

/// Miller-Rabin test with `rounds` random witnesses drawn from `rng`.
///
/// A prime is never rejected. A composite survives with probability at most
/// `4^-rounds`. Values below 4 and even values are decided without witnesses.
///
/// `rounds` must be positive: with no witness every odd value passes.
/// [`generate_random_prime`] checks this and returns [`Error::Domain`].
pub fn is_probable_prime<R: Rng + ?Sized>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
    debug_assert!(rounds > 0, "Miller-Rabin needs at least one round");
    let two = BigUint::from(2u32);
    if n < &two { return false; }
    if *n == two || *n == BigUint::from(3u32) { return true; }
    if n.is_even() { return false; }

    // n - 1 = 2^s * r, r odd
    let n_minus_1 = n - 1u32;
    let s = n_minus_1.trailing_zeros().unwrap_or(0);
    let r = &n_minus_1 >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let mut y = fast_modular_exponent(&a, &r, n);
        if y.is_one() || y == n_minus_1 { continue; }
        for _ in 1..s {
            y = (&y * &y) % n;
            if y.is_one() { return false; }
            if y == n_minus_1 { continue 'witness; }
        }
        return false;
    }
    true
}

/// Random probable prime found by scanning odd values upward from a uniform
/// draw below `2^(bits-1)`.
///
/// The result is not guaranteed to have exactly `bits` significant bits.
pub fn generate_random_prime<R: Rng + ?Sized>(bits: u64, rounds: u32, rng: &mut R) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::Domain(format!("prime size must be at least 2 bits, got {}", bits)));
    }
    if rounds == 0 {
        return Err(Error::Domain("Miller-Rabin rounds must be positive".to_string()));
    }
    let start = Local::now().timestamp_millis();
    let bound = BigUint::one() << (bits - 1);
    let mut candidate = rng.gen_biguint_below(&bound);
    candidate.set_bit(0, true);
    let mut try_times = 1;
    while !is_probable_prime(&candidate, rounds, rng) {
        candidate += 2u32;
        try_times += 1;
    }
    ss_log!("Done {}-bit prime generation in {} tries after {} ms",
        bits, try_times, Local::now().timestamp_millis() - start);
    Ok(candidate)
}

/// Searches for a `pbits` prime and a `qbits` prime, on one worker thread
/// each when `threads > 1`, one after the other otherwise.
///
/// Each search owns a `StdRng` seeded from `rng`, so the pair only depends
/// on the state of `rng` and never on `threads`.
pub fn generate_prime_pair<R: Rng + ?Sized>(pbits: u64, qbits: u64, rounds: u32, threads: usize, rng: &mut R) -> Result<(BigUint, BigUint)> {
    let jobs = [(pbits, rng.gen::<u64>()), (qbits, rng.gen::<u64>())];
    if threads <= 1 {
        let [(pbits, pseed), (qbits, qseed)] = jobs;
        let p = generate_random_prime(pbits, rounds, &mut StdRng::seed_from_u64(pseed))?;
        let q = generate_random_prime(qbits, rounds, &mut StdRng::seed_from_u64(qseed))?;
        return Ok((p, q));
    }
    let (tx, rx) = bounded(jobs.len());
    thread::scope(|scope| {
        for (index, (bits, seed)) in jobs.into_iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let _ = tx.send((index, generate_random_prime(bits, rounds, &mut rng)));
            });
        }
    });
    drop(tx);
    let mut found: [Option<BigUint>; 2] = [None, None];
    for (index, prime) in rx.iter() {
        found[index] = Some(prime?);
    }
    match found {
        [Some(p), Some(q)] => Ok((p, q)),
        _ => Err(Error::Domain("prime search worker exited without a result".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num_bigint::BigUint;
    use num_traits::One;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use super::{generate_prime_pair, generate_random_prime, is_probable_prime};

    fn is_prime_naive(n: u64) -> bool {
        if n < 2 { return false; }
        let mut d = 2;
        while d * d <= n {
            if n % d == 0 { return false; }
            d += 1;
        }
        true
    }

    #[test]
    fn test_small_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let res = (0u32..40)
            .filter(|x| is_probable_prime(&BigUint::from(*x), 20, &mut rng))
            .collect::<Vec<_>>();
        assert_eq!(res, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37]);
    }

    #[test]
    fn test_miller_rabin() {
        let mut rng = StdRng::seed_from_u64(7);
        // Carmichael numbers fool Fermat but not Miller-Rabin
        for c in [561u64, 1105, 1729, 2465, 2821, 6601, 8911, 41041] {
            assert!(!is_probable_prime(&BigUint::from(c), 50, &mut rng), "{} reported prime", c);
        }
        let mersenne = BigUint::from(2u32).pow(127u32) - BigUint::one();
        assert!(is_probable_prime(&mersenne, 50, &mut rng));
        let composite = BigUint::from(2u32).pow(128u32) + BigUint::one();
        assert!(!is_probable_prime(&composite, 50, &mut rng));
    }

    #[test]
    fn gen_prime() -> Result<(), Box<dyn Error>> {
        let mut rng = StdRng::seed_from_u64(42);
        for bits in [2u64, 8, 64, 128] {
            let prime = generate_random_prime(bits, 50, &mut rng)?;
            assert!(is_probable_prime(&prime, 50, &mut rng));
            assert!(prime.bits() <= bits);
        }
        Ok(())
    }

    #[test]
    fn gen_prime_rejects_bad_parameters() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(generate_random_prime(1, 50, &mut rng), Err(crate::Error::Domain(_))));
        assert!(matches!(generate_random_prime(64, 0, &mut rng), Err(crate::Error::Domain(_))));
    }

    #[test]
    fn gen_prime_is_seeded() -> Result<(), Box<dyn Error>> {
        let a = generate_random_prime(96, 50, &mut StdRng::seed_from_u64(3))?;
        let b = generate_random_prime(96, 50, &mut StdRng::seed_from_u64(3))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "at least one round")]
    fn test_zero_rounds_is_refused() {
        // 9 is odd and composite, it would pass with no witness
        is_probable_prime(&BigUint::from(9u32), 0, &mut StdRng::seed_from_u64(1));
    }

    #[test]
    fn gen_prime_pair() -> Result<(), Box<dyn Error>> {
        let (p, q) = generate_prime_pair(60, 90, 50, 2, &mut StdRng::seed_from_u64(9))?;
        let (p2, q2) = generate_prime_pair(60, 90, 50, 2, &mut StdRng::seed_from_u64(9))?;
        assert_eq!((&p, &q), (&p2, &q2));
        let (p1, q1) = generate_prime_pair(60, 90, 50, 1, &mut StdRng::seed_from_u64(9))?;
        assert_eq!((&p, &q), (&p1, &q1));
        let mut rng = StdRng::seed_from_u64(10);
        assert!(is_probable_prime(&p, 50, &mut rng));
        assert!(is_probable_prime(&q, 50, &mut rng));
        assert!(p.bits() <= 60 && q.bits() <= 90);
        Ok(())
    }

    proptest! {
        #[test]
        fn matches_trial_division(n in 0u64..200_000, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            prop_assert_eq!(is_probable_prime(&BigUint::from(n), 50, &mut rng), is_prime_naive(n));
        }
    }
}
