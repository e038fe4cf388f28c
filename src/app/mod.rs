use std::env;
use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ss::{decrypt_stream_with, encrypt_stream_with, KeyPair, PrivateKey, PublicKey, SchmidtSamoa};
use ss::ss_log;

pub mod config;

use config::*;

/// Fresh primes tried before giving up on a modular inverse.
const KEYGEN_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Keygen,
    Encrypt,
    Decrypt,
}

#[macro_export]
macro_rules! ss_t {
    ($CONFIG: expr, $NAME: ident) => {
#[derive(Debug, Clone, Parser)]
#[clap(name = "ss", about = "Schmidt-Samoa key generation, encryption and decryption")]
pub struct $NAME {
    #[clap(short, long, value_parser, default_value = $CONFIG.mode.as_str(), help = "Run mode: keygen, encrypt or decrypt")]
    pub mode: String,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.bits, help = "Minimum bits needed for public key n")]
    pub bits: u64,
    #[clap(long, value_parser, default_value_t = $CONFIG.iters, help = "Miller-Rabin iterations for testing primes")]
    pub iters: u32,
    #[clap(short = 'n', long, value_parser, default_value = $CONFIG.pubkey.as_str(), help = "Public key file")]
    pub pubkey: String,
    #[clap(short = 'd', long, value_parser, default_value = $CONFIG.privkey.as_str(), help = "Private key file")]
    pub privkey: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.input.as_str(), help = "Input filename")]
    pub input: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.output.as_str(), help = "Output filename")]
    pub output: String,
    #[clap(short = 'u', long, value_parser, help = "Owner name stored in the public key (default: $USER)")]
    pub owner: Option<String>,
    #[clap(short, long, value_parser, help = "Random seed for key generation (default: current time)")]
    pub seed: Option<u64>,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.threads, help = "Calculate in <THREADS> threads")]
    pub threads: usize,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.verbose, help = "Display verbose program output")]
    pub verbose: bool,
}
    };
}

ss_t!(CONFIG_DEF, SS);

impl SS {
    fn run_mode(&self) -> Result<RunMode, Box<dyn Error>> {
        match self.mode.as_str() {
            "keygen" | "generate" => Ok(RunMode::Keygen),
            "encrypt" | "encode" => Ok(RunMode::Encrypt),
            "decrypt" | "decode" => Ok(RunMode::Decrypt),
            m => Err(format!("Unknown run mode {:?}! available: keygen(default), encrypt, decrypt", m).into()),
        }
    }

    /// Input stream, with a progress bar over it when verbose and reading a file.
    pub fn reader(&self) -> Result<(Box<dyn BufRead>, Option<ProgressBar>), Box<dyn Error>> {
        let file = match self.input.as_str() {
            "stdin" => {
                let reader: Box<dyn BufRead> = Box::new(BufReader::new(io::stdin()));
                return Ok((reader, None));
            }
            f => File::open(f).map_err(|e| format!("Could not read {}: {}", f, e))?,
        };
        if !self.verbose {
            let reader: Box<dyn BufRead> = Box::new(BufReader::new(file));
            return Ok((reader, None));
        }
        let pb = ProgressBar::new(file.metadata()?.len());
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"));
        let reader: Box<dyn BufRead> = Box::new(BufReader::new(pb.wrap_read(file)));
        Ok((reader, Some(pb)))
    }

    pub fn writer(&self) -> Result<Box<dyn Write>, Box<dyn Error>> {
        match self.output.as_str() {
            "stdout" => Ok(Box::new(io::stdout())),
            f => {
                let file = File::create(f).map_err(|e| format!("Could not write {}: {}", f, e))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }

    fn owner(&self) -> String {
        self.owner.clone().unwrap_or_else(|| env::var("USER").unwrap_or_default())
    }

    fn generate_key(&self) -> Result<KeyPair, Box<dyn Error>> {
        let seed = self.seed.unwrap_or_else(|| Local::now().timestamp() as u64);
        ss_log!("random seed {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let generator = SchmidtSamoa::new(self.bits, self.iters).with_threads(self.threads);
        for attempt in 1..=KEYGEN_ATTEMPTS {
            match generator.generate_key(&mut rng) {
                Err(ss::Error::NoInverse) => ss_log!("attempt {}: no private exponent for these primes, retrying", attempt),
                res => return Ok(res?),
            }
        }
        Err(format!("no usable key pair after {} attempts", KEYGEN_ATTEMPTS).into())
    }

    fn create_private_file(&self) -> Result<File, Box<dyn Error>> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&self.privkey).map_err(|e| format!("Could not write {}: {}", self.privkey, e))?;
        // mode() only applies on creation, an existing file keeps its bits
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| format!("Could not restrict {}: {}", self.privkey, e))?;
        }
        Ok(file)
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        match self.run_mode()? {
            RunMode::Keygen => {
                let key_pair = self.generate_key()?;
                let owner = self.owner();
                let mut pbfile = BufWriter::new(File::create(&self.pubkey)
                    .map_err(|e| format!("Could not write {}: {}", self.pubkey, e))?);
                let mut pvfile = BufWriter::new(self.create_private_file()?);
                key_pair.public_key(&owner).write_to(&mut pbfile)?;
                key_pair.private_key().write_to(&mut pvfile)?;
                ss_log!("\tusername = {}", owner);
                for (name, value, bits) in key_pair.components() {
                    ss_log!("\t{} = {}", name, value);
                    ss_log!("\t{} bit size: {}", name, bits);
                }
                ss_log!("Generated key files: {}, {}", self.pubkey, self.privkey);
            }
            RunMode::Encrypt => {
                let pbfile = File::open(&self.pubkey).map_err(|e| format!("Could not read {}: {}", self.pubkey, e))?;
                let key = PublicKey::read_from(BufReader::new(pbfile))?;
                ss_log!("\tusername = {}", key.owner);
                ss_log!("\tpublic key = {}", key.n);
                ss_log!("\tpublic key bit size: {}", key.n.bits());
                let (mut reader, pb) = self.reader()?;
                let mut writer = self.writer()?;
                let blocks = encrypt_stream_with(&mut reader, &mut writer, &key.n, self.threads)?;
                if let Some(pb) = &pb { pb.finish_with_message("Done"); }
                ss_log!("Done, {} blocks", blocks);
            }
            RunMode::Decrypt => {
                let pvfile = File::open(&self.privkey).map_err(|e| format!("Could not read {}: {}", self.privkey, e))?;
                let key = PrivateKey::read_from(BufReader::new(pvfile))?;
                ss_log!("\tprivate exponent = {}", key.d);
                ss_log!("\tprivate exponent bit size: {}", key.d.bits());
                ss_log!("\tprivate modulus = {}", key.pq);
                ss_log!("\tprivate modulus bit size: {}", key.pq.bits());
                let (mut reader, pb) = self.reader()?;
                let mut writer = self.writer()?;
                let blocks = decrypt_stream_with(&mut reader, &mut writer, &key.d, &key.pq, self.threads)?;
                if let Some(pb) = &pb { pb.finish_with_message("Done"); }
                ss_log!("Done, {} blocks", blocks);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::fs;
    use std::path::{Path, PathBuf};
    use clap::Parser;
    use crate::app::{RunMode, SS};
    use crate::app::config::CONFIG_DEF;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ss-app-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args(dir: &Path, mode: &str, input: &str, output: &str) -> Vec<String> {
        let path = |f: &str| dir.join(f).to_string_lossy().into_owned();
        vec![
            "ss".to_string(), "-m".to_string(), mode.to_string(),
            "-n".to_string(), path("ss.pub"), "-d".to_string(), path("ss.priv"),
            "-i".to_string(), path(input), "-o".to_string(), path(output),
            "-s".to_string(), "42".to_string(), "-u".to_string(), "tester".to_string(),
            "-t".to_string(), "2".to_string(),
        ]
    }

    #[test]
    fn test_defaults() {
        let ss = SS::parse_from(["ss"]);
        assert_eq!(ss.mode, "keygen");
        assert_eq!(ss.bits, 256);
        assert_eq!(ss.iters, 50);
        assert_eq!(ss.pubkey, "ss.pub");
        assert_eq!(ss.privkey, "ss.priv");
        assert_eq!(ss.threads, CONFIG_DEF.threads);
        assert!(!ss.verbose);
    }

    #[test]
    fn test_run_mode() {
        let mut ss = SS::parse_from(["ss", "-m", "encrypt"]);
        assert_eq!(ss.run_mode().unwrap(), RunMode::Encrypt);
        ss.mode = "decode".to_string();
        assert_eq!(ss.run_mode().unwrap(), RunMode::Decrypt);
        ss.mode = "sign".to_string();
        assert!(ss.run_mode().is_err());
    }

    #[test]
    fn function_test() -> Result<(), Box<dyn Error>> {
        let dir = scratch("function");
        let data = b"\x00\x00Schmidt-Samoa through files\n".repeat(20);
        fs::write(dir.join("plain.txt"), &data)?;

        SS::parse_from(args(&dir, "keygen", "unused", "unused")).run()?;
        let public = fs::read_to_string(dir.join("ss.pub"))?;
        assert_eq!(public.lines().nth(1), Some("tester"));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.join("ss.priv"))?.permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        SS::parse_from(args(&dir, "encrypt", "plain.txt", "cipher.txt")).run()?;
        SS::parse_from(args(&dir, "decrypt", "cipher.txt", "decoded.txt")).run()?;
        assert_eq!(fs::read(dir.join("decoded.txt"))?, data);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_private_file_is_restricted() -> Result<(), Box<dyn Error>> {
        use std::os::unix::fs::PermissionsExt;
        let dir = scratch("restrict");
        let privkey = dir.join("ss.priv");
        fs::write(&privkey, "stale\n")?;
        fs::set_permissions(&privkey, fs::Permissions::from_mode(0o644))?;

        SS::parse_from(args(&dir, "keygen", "unused", "unused")).run()?;
        assert_eq!(fs::metadata(&privkey)?.permissions().mode() & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&privkey)?.lines().count(), 2);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_missing_key_file() {
        let dir = scratch("missing");
        let mut ss = SS::parse_from(args(&dir, "encrypt", "plain.txt", "cipher.txt"));
        assert!(ss.run().is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
