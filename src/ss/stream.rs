use std::io::{BufRead, Read, Write};
use std::thread;
use crossbeam_channel::{bounded, Receiver, Sender};
use num_bigint::BigUint;
use crate::ss::config::MARKER;
use crate::ss::error::{Error, Result};
use crate::ss::keys::{parse_hex, LineReader};
use crate::ss::{decrypt_block, encrypt_block};
use crate::ss_log;

/// Blocks handed to the workers per batch, per thread.
const BATCH_PER_THREAD: usize = 64;

/// Width in bytes of one plaintext block under `modulus`, marker included:
/// `floor((bits(isqrt(modulus)) - 1) / 8)`.
pub fn block_size(modulus: &BigUint) -> usize {
    (modulus.sqrt().bits().saturating_sub(1) / 8) as usize
}

fn checked_block_size(modulus: &BigUint) -> Result<usize> {
    let k = block_size(modulus);
    if k < 2 {
        return Err(Error::Domain(format!("modulus of {} bits is too small to carry data", modulus.bits())));
    }
    Ok(k)
}

fn batch_len(threads: usize) -> usize {
    threads.max(1) * BATCH_PER_THREAD
}

/// Marker byte followed by up to `len` input bytes. Only the marker when the
/// input is exhausted.
fn read_chunk<R: Read + ?Sized>(input: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut chunk = Vec::with_capacity(len + 1);
    chunk.push(MARKER);
    (&mut *input).take(len as u64).read_to_end(&mut chunk)?;
    Ok(chunk)
}

/// Applies `f` to every item on `threads` workers, keeping input order.
fn map_blocks<T, U, F>(items: Vec<T>, threads: usize, f: F) -> Result<Vec<U>>
where
    T: Send,
    U: Send,
    F: Fn(T) -> Result<U> + Sync,
{
    let count = items.len();
    if threads <= 1 || count <= 1 {
        return items.into_iter().map(f).collect();
    }
    let (map_tx, map_rx): (Sender<(usize, T)>, Receiver<(usize, T)>) = bounded(threads);
    let (reduce_tx, reduce_rx) = bounded(count);
    let f = &f;
    thread::scope(|scope| {
        for _ in 0..threads.min(count) {
            let r = map_rx.clone();
            let s = reduce_tx.clone();
            scope.spawn(move || {
                for (index, item) in r.iter() {
                    if s.send((index, f(item))).is_err() { break; }
                }
            });
        }
        for item in items.into_iter().enumerate() {
            if map_tx.send(item).is_err() { break; }
        }
        drop(map_tx);
    });
    drop(reduce_tx);
    let mut res_collect = reduce_rx.iter().collect::<Vec<(usize, Result<U>)>>();
    if res_collect.len() != count {
        return Err(Error::Domain(format!("{} of {} blocks came back from the workers", res_collect.len(), count)));
    }
    res_collect.sort_by_key(|r| r.0);
    res_collect.into_iter().map(|r| r.1).collect()
}

/// Encrypts `input` into lines of lowercase hex, one per block of
/// `block_size(n) - 1` data bytes. Returns the number of blocks written;
/// empty input writes nothing.
pub fn encrypt_stream<R: Read + ?Sized, W: Write + ?Sized>(input: &mut R, output: &mut W, n: &BigUint) -> Result<usize> {
    encrypt_stream_with(input, output, n, 1)
}

/// [`encrypt_stream`] spreading the modular exponentiations over `threads`
/// workers. The output does not depend on `threads`.
pub fn encrypt_stream_with<R: Read + ?Sized, W: Write + ?Sized>(input: &mut R, output: &mut W, n: &BigUint, threads: usize) -> Result<usize> {
    let k = checked_block_size(n)?;
    ss_log!("block size {} bytes, {} data bytes per block", k, k - 1);
    let batch = batch_len(threads);
    let mut blocks = 0;
    loop {
        let mut chunks = Vec::with_capacity(batch);
        let mut exhausted = false;
        while chunks.len() < batch {
            let chunk = read_chunk(input, k - 1)?;
            if chunk.len() == 1 {
                exhausted = true;
                break;
            }
            chunks.push(chunk);
        }
        let cipher = map_blocks(chunks, threads, |chunk| encrypt_block(&BigUint::from_bytes_be(&chunk), n))?;
        for c in &cipher {
            writeln!(output, "{:x}", c)?;
        }
        blocks += cipher.len();
        if exhausted { break; }
    }
    output.flush()?;
    ss_log!("encrypted {} blocks", blocks);
    Ok(blocks)
}

/// Inverse of [`encrypt_stream`]: reads one hex block per line, decrypts it
/// under `(d, pq)` and writes the data bytes after the marker. Blank lines are
/// skipped.
pub fn decrypt_stream<R: BufRead + ?Sized, W: Write + ?Sized>(input: &mut R, output: &mut W, d: &BigUint, pq: &BigUint) -> Result<usize> {
    decrypt_stream_with(input, output, d, pq, 1)
}

/// [`decrypt_stream`] on `threads` workers.
pub fn decrypt_stream_with<R: BufRead + ?Sized, W: Write + ?Sized>(input: &mut R, output: &mut W, d: &BigUint, pq: &BigUint, threads: usize) -> Result<usize> {
    let k = checked_block_size(pq)?;
    ss_log!("private block size {} bytes", k);
    let mut reader = LineReader::new(input);
    let batch = batch_len(threads);
    let mut blocks = 0;
    loop {
        let mut cipher = Vec::with_capacity(batch);
        let mut exhausted = false;
        while cipher.len() < batch {
            match reader.next_line()? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    let field = format!("ciphertext line {}", reader.line_number());
                    cipher.push(parse_hex(&line, &field)?);
                }
                None => {
                    exhausted = true;
                    break;
                }
            }
        }
        let first = blocks;
        let plain = map_blocks(cipher.into_iter().enumerate().collect(), threads, |(i, c): (usize, BigUint)| {
            let m = decrypt_block(&c, d, pq)?.to_bytes_be();
            match m.split_first() {
                Some((&MARKER, data)) => Ok(data.to_vec()),
                _ => Err(Error::Format(format!("block {} does not decrypt to a marked block, wrong key or corrupt input", first + i + 1))),
            }
        })?;
        for data in &plain {
            output.write_all(data)?;
        }
        blocks += plain.len();
        if exhausted { break; }
    }
    output.flush()?;
    ss_log!("decrypted {} blocks", blocks);
    Ok(blocks)
}
