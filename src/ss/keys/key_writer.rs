use std::io::Write;
use num_bigint::BigUint;
use crate::ss::error::{Error, Result};
use crate::ss::keys::{PrivateKey, PublicKey};

/// Writes `n` as lowercase hex, then `owner`, one per line.
pub fn write_public<W: Write + ?Sized>(n: &BigUint, owner: &str, writer: &mut W) -> Result<()> {
    if owner.contains(|c: char| c == '\n' || c == '\r') {
        return Err(Error::Domain(format!("owner name {:?} spans several lines", owner)));
    }
    writeln!(writer, "{:x}", n)?;
    writeln!(writer, "{}", owner)?;
    writer.flush()?;
    Ok(())
}

/// Writes `pq` then `d` as lowercase hex, one per line.
pub fn write_private<W: Write + ?Sized>(pq: &BigUint, d: &BigUint, writer: &mut W) -> Result<()> {
    writeln!(writer, "{:x}", pq)?;
    writeln!(writer, "{:x}", d)?;
    writer.flush()?;
    Ok(())
}

impl PublicKey {
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_public(&self.n, &self.owner, writer)
    }
}

impl PrivateKey {
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_private(&self.pq, &self.d, writer)
    }
}
