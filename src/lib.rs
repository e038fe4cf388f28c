//! Schmidt-Samoa public-key cryptosystem.
//!
//! The public value `n = p^2 * q` is both the encryption exponent and the
//! modulus; the private key is `d = n^-1 mod lcm(p - 1, q - 1)` together with
//! `pq`. Byte streams are cut into blocks that start with a `0xff` marker
//! byte and travel as one lowercase hex number per line.
//!
//! ```no_run
//! use std::io::Cursor;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let keys = ss::generate_key_pair(256, 50, &mut StdRng::seed_from_u64(42)).unwrap();
//! let mut cipher = Vec::new();
//! ss::encrypt_stream(&mut Cursor::new(b"hello"), &mut cipher, &keys.n).unwrap();
//! let mut plain = Vec::new();
//! ss::decrypt_stream(&mut Cursor::new(cipher), &mut plain, &keys.d, &keys.pq).unwrap();
//! assert_eq!(plain, b"hello");
//! ```

pub mod ss;

pub use crate::ss::*;
