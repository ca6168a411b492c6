use bitvec::{order::Lsb0, vec::BitVec};
use std::sync::RwLock;

/// Bits per storage byte.
const BLOCK_SIZE: u64 = 8;

/// A dense, byte-backed bit array with `O(1)` addressed access.
///
/// `Bitmap` performs no internal synchronization: the caller owns the
/// critical section. [`BloomFilter`](crate::BloomFilter) relies on this to
/// wrap several bit operations inside one higher-level lock without paying
/// for double synchronization. When each operation should be independently
/// atomic, use [`SharedBitmap`] instead.
///
/// Out-of-range indices are a deliberate no-op for mutators and read as
/// absent for queries; no operation panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    bits: BitVec<u8, Lsb0>,
}

impl Bitmap {
    /// Creates a bitmap able to address every bit index up to and including
    /// `max_index`, rounding storage up to whole bytes.
    pub fn new(max_index: u64) -> Self {
        let size = max_index / BLOCK_SIZE + 1;
        Self {
            bits: BitVec::from_vec(vec![0u8; size as usize]),
        }
    }

    /// Number of addressable bits. Always `byte_size() * 8`.
    pub fn capacity_bits(&self) -> u64 {
        self.bits.len() as u64
    }

    /// Size of the backing storage in bytes.
    pub fn byte_size(&self) -> usize {
        self.bits.as_raw_slice().len()
    }

    /// Sets bit `index` to 1. Out-of-range indices are ignored.
    pub fn set(&mut self, index: u64) {
        if index >= self.capacity_bits() {
            return;
        }
        self.bits.set(index as usize, true);
    }

    /// Clears bit `index` to 0. Out-of-range indices are ignored.
    pub fn clear(&mut self, index: u64) {
        if index >= self.capacity_bits() {
            return;
        }
        self.bits.set(index as usize, false);
    }

    /// Returns whether bit `index` is set. Out-of-range indices read as
    /// `false`.
    pub fn has(&self, index: u64) -> bool {
        if index >= self.capacity_bits() {
            return false;
        }
        self.bits[index as usize]
    }

    /// Returns a defensive copy of the raw backing bytes.
    pub fn dump(&self) -> Vec<u8> {
        self.bits.as_raw_slice().to_vec()
    }

    /// Replaces the backing storage with a copy of `data` and recomputes the
    /// capacity from the new length. The only way to resize a bitmap.
    pub fn restore(&mut self, data: &[u8]) {
        self.bits = BitVec::from_slice(data);
    }

    /// Deep-copies storage and capacity into `dst`.
    pub fn copy_to(&self, dst: &mut Bitmap) {
        dst.bits = self.bits.clone();
    }
}

/// A [`Bitmap`] behind a readers-writer lock: every operation is
/// independently atomic.
///
/// `set`/`clear`/`restore`/`copy_to` take the lock exclusively; `has`,
/// `dump` and the size accessors take it shared. The locking regime travels
/// with the type, so copying between two `SharedBitmap`s yields replicas
/// with identical behavior.
#[derive(Debug)]
pub struct SharedBitmap {
    inner: RwLock<Bitmap>,
}

impl SharedBitmap {
    pub fn new(max_index: u64) -> Self {
        Self {
            inner: RwLock::new(Bitmap::new(max_index)),
        }
    }

    pub fn capacity_bits(&self) -> u64 {
        self.inner.read().expect("bitmap lock poisoned").capacity_bits()
    }

    pub fn byte_size(&self) -> usize {
        self.inner.read().expect("bitmap lock poisoned").byte_size()
    }

    pub fn set(&self, index: u64) {
        self.inner.write().expect("bitmap lock poisoned").set(index);
    }

    pub fn clear(&self, index: u64) {
        self.inner.write().expect("bitmap lock poisoned").clear(index);
    }

    pub fn has(&self, index: u64) -> bool {
        self.inner.read().expect("bitmap lock poisoned").has(index)
    }

    pub fn dump(&self) -> Vec<u8> {
        self.inner.read().expect("bitmap lock poisoned").dump()
    }

    pub fn restore(&self, data: &[u8]) {
        self.inner
            .write()
            .expect("bitmap lock poisoned")
            .restore(data);
    }

    /// Deep-copies storage and capacity into `dst`. Locks the source before
    /// the destination.
    pub fn copy_to(&self, dst: &SharedBitmap) {
        if std::ptr::eq(self, dst) {
            return;
        }
        let src = self.inner.write().expect("bitmap lock poisoned");
        let mut out = dst.inner.write().expect("bitmap lock poisoned");
        src.copy_to(&mut out);
    }
}
