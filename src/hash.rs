use fnv::FnvHasher;
use murmur3::murmur3_x64_128;
use std::hash::Hasher;
use std::io::Cursor;
use std::sync::Mutex;

/// One hash round of a Bloom filter operation.
///
/// A round digests `key bytes || salt bytes` and yields a 64-bit value that
/// the filter reduces modulo its bit count. Implementations are stateful and
/// reused through a [`HasherPool`], so `reset` must return the instance to
/// its initial state.
pub trait RoundHasher: Send {
    fn reset(&mut self);
    fn update(&mut self, bytes: &[u8]);
    fn finish(&self) -> u64;
}

/// FNV-1a 64-bit round hasher. The default algorithm.
#[derive(Default)]
pub struct FnvRoundHasher {
    inner: FnvHasher,
}

impl RoundHasher for FnvRoundHasher {
    fn reset(&mut self) {
        self.inner = FnvHasher::default();
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.write(bytes);
    }

    fn finish(&self) -> u64 {
        self.inner.finish()
    }
}

/// Murmur3 x64 128-bit round hasher, truncated to the first 8 digest bytes
/// interpreted big-endian. Buffers its input because the digest is one-shot.
#[derive(Default)]
pub struct Murmur3RoundHasher {
    buf: Vec<u8>,
}

impl RoundHasher for Murmur3RoundHasher {
    fn reset(&mut self) {
        self.buf.clear();
    }

    fn update(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        let digest = murmur3_x64_128(&mut Cursor::new(&self.buf), 0)
            .expect("Failed to compute Murmur3 hash");
        (digest >> 64) as u64
    }
}

/// Constructor for the hash algorithm a filter uses on every round.
pub type HasherFactory = fn() -> Box<dyn RoundHasher>;

pub fn fnv_round_hasher() -> Box<dyn RoundHasher> {
    Box::new(FnvRoundHasher::default())
}

pub fn murmur3_round_hasher() -> Box<dyn RoundHasher> {
    Box::new(Murmur3RoundHasher::default())
}

/// A grow-on-demand free list of [`RoundHasher`] instances.
///
/// Borrowing never blocks on a busy instance: `get` pops an idle hasher or
/// builds a fresh one, and the instance is reset before it is handed out.
/// A borrowed hasher is owned exclusively until it is returned with `put`.
pub struct HasherPool {
    build: HasherFactory,
    idle: Mutex<Vec<Box<dyn RoundHasher>>>,
}

impl HasherPool {
    pub fn new(build: HasherFactory) -> Self {
        Self {
            build,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Box<dyn RoundHasher> {
        let recycled = self.idle.lock().expect("hasher pool poisoned").pop();
        let mut hasher = recycled.unwrap_or_else(self.build);
        hasher.reset();
        hasher
    }

    pub fn put(&self, hasher: Box<dyn RoundHasher>) {
        self.idle.lock().expect("hasher pool poisoned").push(hasher);
    }
}

/// Derives the optimal bit count `m` and hash round count `k` for a filter
/// sized for `capacity` elements at the target false positive `rate`.
///
/// `m = ceil(-n * ln(p) / (ln 2)^2)`, `k = ceil((m / n) * ln 2)`, both
/// floored at 1. `k` is computed from the unceiled `m` so the pair matches
/// the published optimum rather than compounding rounding.
pub fn optimal_params(capacity: u64, rate: f64) -> (u64, u64) {
    let ln2 = std::f64::consts::LN_2;

    let mut m = -(capacity as f64) * rate.ln() / (ln2 * ln2);
    if m < 1.0 {
        m = 1.0;
    }

    let mut k = (m / capacity as f64) * ln2;
    if k < 1.0 {
        k = 1.0;
    }

    (m.ceil() as u64, k.ceil() as u64)
}
