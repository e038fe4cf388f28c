use lazy_static::lazy_static;
use ss::config::{DEFAULT_BITS, DEFAULT_ROUNDS};
use crate::app::SS;

lazy_static! {
    pub static ref CONFIG_DEF: SS = SS {
        mode: String::from("keygen"),
        bits: DEFAULT_BITS,
        iters: DEFAULT_ROUNDS,
        pubkey: String::from("ss.pub"),
        privkey: String::from("ss.priv"),
        input: String::from("stdin"),
        output: String::from("stdout"),
        owner: None,
        seed: None,
        threads: num_cpus::get(),
        verbose: false,
    };
}
