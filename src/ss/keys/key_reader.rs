use std::io::BufRead;
use num_bigint::BigUint;
use crate::ss::error::{Error, Result};
use crate::ss::keys::{PrivateKey, PublicKey};

/// Line-at-a-time text reader that counts lines and strips `\n` / `\r\n`.
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), line: 0 }
    }

    /// Number of the line returned last, starting at 1.
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// The next line without its terminator, `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        let text = std::str::from_utf8(&self.buf)
            .map_err(|_| Error::Format(format!("line {} is not valid UTF-8", self.line)))?;
        Ok(Some(text.trim_end_matches('\n').trim_end_matches('\r').to_string()))
    }

    fn expect_line(&mut self, field: &str) -> Result<String> {
        self.next_line()?.ok_or_else(|| Error::Format(format!("missing {}", field)))
    }

    fn expect_hex(&mut self, field: &str) -> Result<BigUint> {
        parse_hex(&self.expect_line(field)?, field)
    }
}

/// Checked hexadecimal parse, upper or lower case, surrounding whitespace
/// ignored.
pub fn parse_hex(text: &str, field: &str) -> Result<BigUint> {
    let text = text.trim();
    let invalid = || Error::Format(format!("{} is not a hexadecimal number: {:?}", field, text));
    if text.is_empty() || !text.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    BigUint::parse_bytes(text.as_bytes(), 16).ok_or_else(invalid)
}

/// Reads a public key file: modulus line, then owner line.
pub fn read_public<R: BufRead>(reader: R) -> Result<(BigUint, String)> {
    let mut reader = LineReader::new(reader);
    let n = reader.expect_hex("public modulus")?;
    let owner = reader.expect_line("owner name")?;
    Ok((n, owner))
}

/// Reads a private key file: modulus line, then exponent line.
pub fn read_private<R: BufRead>(reader: R) -> Result<(BigUint, BigUint)> {
    let mut reader = LineReader::new(reader);
    let pq = reader.expect_hex("private modulus")?;
    let d = reader.expect_hex("private exponent")?;
    Ok((pq, d))
}

impl PublicKey {
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let (n, owner) = read_public(reader)?;
        Ok(Self { n, owner })
    }
}

impl PrivateKey {
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let (pq, d) = read_private(reader)?;
        Ok(Self { pq, d })
    }
}
