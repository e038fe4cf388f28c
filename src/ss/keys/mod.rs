pub mod key_pair;
pub mod key_reader;
pub mod key_writer;

pub use key_pair::*;
pub use key_reader::*;
pub use key_writer::*;

use num_bigint::BigUint;

/// Contents of a public key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigUint,
    pub owner: String,
}

/// Contents of a private key file: private modulus `pq` and exponent `d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub pq: BigUint,
    pub d: BigUint,
}
