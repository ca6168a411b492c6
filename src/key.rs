use std::borrow::Cow;
use std::fmt::Debug;

/// A value in its canonical form for hashing.
///
/// The conversion is a closed dispatch: byte sequences and text pass through
/// unchanged, fixed-width integers encode as varints, and anything else goes
/// through the [`render`](FilterKey::render) fallback. Equal keys always
/// produce equal bytes, which is what the no-false-negative guarantee of the
/// filter rests on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey<'a> {
    Bytes(&'a [u8]),
    Str(&'a str),
    Int(i64),
    Uint(u64),
    Rendered(String),
}

impl FilterKey<'_> {
    /// Lossy last-resort conversion: the `Debug` rendering of the value.
    ///
    /// The output depends on field layout and is not a stable wire format.
    /// Callers needing exact reproducibility should pass pre-serialized
    /// bytes instead.
    pub fn render<T: Debug>(value: &T) -> FilterKey<'static> {
        FilterKey::Rendered(format!("{value:?}"))
    }

    /// Canonical byte encoding of the key.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            FilterKey::Bytes(b) => Cow::Borrowed(*b),
            FilterKey::Str(s) => Cow::Borrowed(s.as_bytes()),
            FilterKey::Int(v) => Cow::Owned(encode_varint(*v)),
            FilterKey::Uint(v) => Cow::Owned(encode_uvarint(*v)),
            FilterKey::Rendered(s) => Cow::Borrowed(s.as_bytes()),
        }
    }
}

fn encode_uvarint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

fn encode_varint(value: i64) -> Vec<u8> {
    // Zig-zag mapping so small magnitudes of either sign stay short.
    let mut ux = (value as u64) << 1;
    if value < 0 {
        ux = !ux;
    }
    encode_uvarint(ux)
}

impl<'a> From<&'a [u8]> for FilterKey<'a> {
    fn from(value: &'a [u8]) -> Self {
        FilterKey::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for FilterKey<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        FilterKey::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for FilterKey<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        FilterKey::Bytes(value)
    }
}

impl<'a> From<&'a str> for FilterKey<'a> {
    fn from(value: &'a str) -> Self {
        FilterKey::Str(value)
    }
}

impl<'a> From<&'a String> for FilterKey<'a> {
    fn from(value: &'a String) -> Self {
        FilterKey::Str(value)
    }
}

macro_rules! filter_key_from_signed {
    ($($ty:ty),+) => {$(
        impl From<$ty> for FilterKey<'_> {
            fn from(value: $ty) -> Self {
                FilterKey::Int(value as i64)
            }
        }
    )+};
}

macro_rules! filter_key_from_unsigned {
    ($($ty:ty),+) => {$(
        impl From<$ty> for FilterKey<'_> {
            fn from(value: $ty) -> Self {
                FilterKey::Uint(value as u64)
            }
        }
    )+};
}

filter_key_from_signed!(i8, i16, i32, i64, isize);
filter_key_from_unsigned!(u8, u16, u32, u64, usize);
