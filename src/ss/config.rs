use lazy_static::lazy_static;
use mut_static::MutStatic;

/// Leading byte of every plaintext block.
pub const MARKER: u8 = 0xff;
/// Smallest public value size accepted by key generation.
pub const MIN_BITS: u64 = 256;
pub const DEFAULT_BITS: u64 = 256;
/// Miller-Rabin rounds used when the caller does not choose.
pub const DEFAULT_ROUNDS: u32 = 50;

lazy_static! {
    pub static ref SILENT: MutStatic<bool> = MutStatic::from(true);
}

pub fn is_silent() -> bool {
    SILENT.read().map(|s| *s).unwrap_or(true)
}

pub fn set_silent(silent: bool) {
    if let Ok(mut s) = SILENT.write() {
        *s = silent;
    }
}

/// Print a diagnostic line to stderr unless [`SILENT`] is set.
#[macro_export]
macro_rules! ss_log {
    ($($arg: tt)*) => {
        if !$crate::ss::config::is_silent() { eprintln!($($arg)*); }
    };
}
