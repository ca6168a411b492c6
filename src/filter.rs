use crate::bitmap::Bitmap;
use crate::common::bytes2hr;
use crate::config::BloomConfig;
use crate::error::{FilterError, Result};
use crate::hash::{HasherPool, optimal_params};
use crate::key::FilterKey;
use rand::TryRngCore;
use rand::rngs::OsRng;
use std::io::{BufRead, BufReader, Read, Write};
use std::sync::RwLock;
use tracing::debug;

/// First line of every dump stream.
const MAGIC: &[u8] = b"saltbloom:v1";

/// State guarded by the filter's readers-writer lock.
///
/// The bitmap, the salts and the modulus must move together: an `add` that
/// computed its indices against one salt set but touched another filter
/// generation's bits would break the no-false-negative guarantee.
struct FilterCore {
    capacity: u64,
    rate: f64,
    salt_size: usize,
    bit_count: u64,
    salts: Vec<Vec<u8>>,
    bits: Bitmap,
}

/// A salted Bloom filter.
///
/// Construction derives the optimal bit count `m` and round count `k` from
/// the configured capacity and false positive rate, then draws one random
/// salt per round from the operating system's secure random source. Each
/// membership operation hashes `key bytes || salt bytes` once per round and
/// reduces the digest modulo `m` to a bit index.
///
/// The filter owns an unlocked [`Bitmap`] and guards it, the salts and the
/// modulus with a single readers-writer lock, so the whole "compute k
/// indices, touch k bits" sequence is one critical section. [`add`] and
/// [`restore`] are writers; [`contains`] and [`dump`] are readers and run
/// concurrently. A filter is shared across threads as `Arc<BloomFilter>`
/// with no external locking.
///
/// Bits are only ever set, never cleared, so `contains` has no false
/// negatives: any key passed to [`add`] reports present forever after.
///
/// [`add`]: BloomFilter::add
/// [`contains`]: BloomFilter::contains
/// [`dump`]: BloomFilter::dump
/// [`restore`]: BloomFilter::restore
pub struct BloomFilter {
    pool: HasherPool,
    core: RwLock<FilterCore>,
}

impl BloomFilter {
    pub fn new(config: BloomConfig) -> Result<Self> {
        config.validate()?;

        let (bit_count, rounds) =
            optimal_params(config.capacity, config.false_positive_rate);
        debug!(
            bits = bit_count,
            rounds,
            capacity = config.capacity,
            rate = config.false_positive_rate,
            "derived optimal filter parameters"
        );

        let mut salts = Vec::with_capacity(rounds as usize);
        for _ in 0..rounds {
            salts.push(generate_salt(config.salt_size)?);
        }

        Ok(Self {
            pool: HasherPool::new(config.hasher),
            core: RwLock::new(FilterCore {
                capacity: config.capacity,
                rate: config.false_positive_rate,
                salt_size: config.salt_size,
                bit_count,
                salts,
                bits: Bitmap::new(bit_count),
            }),
        })
    }

    /// Inserts a key. Infallible once the filter exists.
    pub fn add<'a>(&self, key: impl Into<FilterKey<'a>>) {
        let key = key.into();
        let value = key.to_bytes();
        let mut hasher = self.pool.get();

        {
            let mut core = self.core.write().expect("filter lock poisoned");
            for i in 0..core.salts.len() {
                hasher.reset();
                hasher.update(&value);
                hasher.update(&core.salts[i]);
                let index = hasher.finish() % core.bit_count;
                core.bits.set(index);
            }
        }

        self.pool.put(hasher);
    }

    /// Tests a key: `false` means definitely absent, `true` means possibly
    /// present. Short-circuits on the first unset bit.
    pub fn contains<'a>(&self, key: impl Into<FilterKey<'a>>) -> bool {
        let key = key.into();
        let value = key.to_bytes();
        let mut hasher = self.pool.get();

        let found = {
            let core = self.core.read().expect("filter lock poisoned");
            core.salts.iter().all(|salt| {
                hasher.reset();
                hasher.update(&value);
                hasher.update(salt);
                core.bits.has(hasher.finish() % core.bit_count)
            })
        };

        self.pool.put(hasher);
        found
    }

    /// Writes a consistent snapshot of the filter state to `w`.
    ///
    /// The stream is the magic line, a decimal salt count line, one
    /// newline-terminated fixed-width salt per round, then the raw bitmap
    /// bytes with no trailing delimiter. Two dumps with no mutation in
    /// between are byte-identical.
    pub fn dump(&self, w: &mut impl Write) -> Result<()> {
        let core = self.core.read().expect("filter lock poisoned");

        w.write_all(MAGIC)
            .and_then(|_| w.write_all(b"\n"))
            .map_err(|e| io_stage("write header", e))?;

        let count = format!("{}\n", core.salts.len());
        w.write_all(count.as_bytes())
            .map_err(|e| io_stage("write salt count", e))?;

        for salt in &core.salts {
            w.write_all(salt)
                .and_then(|_| w.write_all(b"\n"))
                .map_err(|e| io_stage("write salt", e))?;
        }

        w.write_all(&core.bits.dump())
            .map_err(|e| io_stage("write bitmap", e))?;

        Ok(())
    }

    /// Replaces the salts and the bitmap payload with the contents of a
    /// dump stream.
    ///
    /// The whole stream is parsed and validated into staged locals first;
    /// the filter state is swapped only after validation succeeds, so a
    /// failed restore leaves the filter untouched.
    ///
    /// The hash modulus is not altered: a dump is meant to be restored into
    /// a filter constructed with the same capacity and rate, and the caller
    /// is responsible for matching the payload length to the filter's bit
    /// count.
    pub fn restore(&self, r: &mut impl Read) -> Result<()> {
        let mut core = self.core.write().expect("filter lock poisoned");
        let mut reader = BufReader::new(r);

        let mut head = Vec::new();
        reader
            .read_until(b'\n', &mut head)
            .map_err(|e| io_stage("read header", e))?;
        if !head.ends_with(b"\n") || &head[..head.len() - 1] != MAGIC {
            return Err(FilterError::CorruptHeader);
        }

        let mut count_line = Vec::new();
        reader
            .read_until(b'\n', &mut count_line)
            .map_err(|e| io_stage("read salt count", e))?;
        if !count_line.ends_with(b"\n") {
            return Err(FilterError::InvalidSaltCount);
        }
        let count = std::str::from_utf8(&count_line[..count_line.len() - 1])
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|&n| n > 0)
            .ok_or(FilterError::InvalidSaltCount)? as usize;

        let mut salts = Vec::with_capacity(count);
        for i in 0..count {
            let mut salt = Vec::new();
            reader
                .read_until(b'\n', &mut salt)
                .map_err(|e| io_stage("read salt", e))?;
            if !salt.ends_with(b"\n") {
                return Err(FilterError::TruncatedSalt { index: i });
            }
            salt.pop();
            if salt.len() != core.salt_size {
                return Err(FilterError::InvalidSaltLength {
                    index: i,
                    want: core.salt_size,
                    got: salt.len(),
                });
            }
            salts.push(salt);
        }

        let mut payload = Vec::new();
        reader
            .read_to_end(&mut payload)
            .map_err(|e| io_stage("read bitmap", e))?;

        debug!(
            rounds = count,
            payload_bytes = payload.len(),
            "restoring filter state"
        );
        core.salts = salts;
        core.bits.restore(&payload);

        Ok(())
    }

    /// Deep-copies this filter's state into `dst`: salts, bit count, bitmap
    /// payload, and the capacity/rate/salt-width configuration.
    ///
    /// Both filters are locked exclusively, source before destination.
    /// Copying a filter onto itself is a no-op.
    pub fn copy_to(&self, dst: &BloomFilter) {
        if std::ptr::eq(self, dst) {
            return;
        }

        let src = self.core.write().expect("filter lock poisoned");
        let mut out = dst.core.write().expect("filter lock poisoned");

        src.bits.copy_to(&mut out.bits);
        out.bit_count = src.bit_count;
        out.salts = src.salts.clone();
        out.capacity = src.capacity;
        out.rate = src.rate;
        out.salt_size = src.salt_size;
    }

    /// The element capacity the filter was sized for.
    pub fn capacity(&self) -> u64 {
        self.core.read().expect("filter lock poisoned").capacity
    }

    /// The configured false positive rate.
    pub fn false_positive_rate(&self) -> f64 {
        self.core.read().expect("filter lock poisoned").rate
    }

    /// The derived bit count `m`, also the hash modulus.
    pub fn bit_count(&self) -> u64 {
        self.core.read().expect("filter lock poisoned").bit_count
    }

    /// The number of hash rounds `k`.
    pub fn hash_rounds(&self) -> usize {
        self.core.read().expect("filter lock poisoned").salts.len()
    }

    /// Size of the backing bitmap in bytes.
    pub fn approx_memory_bytes(&self) -> usize {
        self.core
            .read()
            .expect("filter lock poisoned")
            .bits
            .byte_size()
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.read().expect("filter lock poisoned");
        write!(
            f,
            "BloomFilter {{ capacity: {}, false_positive_rate: {}, bits: {}, rounds: {}, memory: {} }}",
            core.capacity,
            core.rate,
            core.bit_count,
            core.salts.len(),
            bytes2hr(core.bits.byte_size())
        )
    }
}

/// Draws `size` random bytes from the OS source. Newline bytes are remapped
/// to `~` so the newline-delimited dump format stays parseable.
fn generate_salt(size: usize) -> Result<Vec<u8>> {
    let mut salt = vec![0u8; size];
    OsRng.try_fill_bytes(&mut salt)?;
    for b in &mut salt {
        if *b == b'\n' {
            *b = b'~';
        }
    }
    Ok(salt)
}

fn io_stage(stage: &'static str, source: std::io::Error) -> FilterError {
    FilterError::Io { stage, source }
}
