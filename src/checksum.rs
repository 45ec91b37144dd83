//! Checksums used by Chapter 10 packets.
//!
//! The packet header, the secondary header and the packet trailer all use plain arithmetic sums
//! which wrap around at the width of the checksum. Multi-byte elements are decoded in little
//! endian byte order, which is the byte order of all Chapter 10 packet fields.
//!
//! This module also contains [GenericCrc], a CRC with run-time parameters which is not used for
//! the packet checksums. Its parameters can be taken from the algorithm catalogue of the [crc]
//! crate, which also performs the calculation.
use alloc::boxed::Box;
use core::fmt::{self, Debug};
use core::mem::size_of;
use num_traits::{WrappingAdd, Zero};
use paste::paste;

/// Checksum type field of the packet flags.
#[derive(Debug, PartialEq, Eq, num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[bitbybit::bitenum(u2, exhaustive = true)]
#[repr(u8)]
pub enum ChecksumType {
    /// No data checksum present.
    None = 0,
    /// 8 bit arithmetic sum.
    Bits8 = 1,
    /// 16 bit arithmetic sum.
    Bits16 = 2,
    /// 32 bit arithmetic sum.
    Bits32 = 3,
}

impl ChecksumType {
    /// Width of the checksum trailer in bytes.
    #[inline]
    pub const fn width(&self) -> usize {
        match self {
            ChecksumType::None => 0,
            ChecksumType::Bits8 => 1,
            ChecksumType::Bits16 => 2,
            ChecksumType::Bits32 => 4,
        }
    }
}

/// Unsigned integer element of an arithmetic sum checksum.
pub trait ChecksumWord: Copy + Debug + Eq + WrappingAdd + Zero {
    /// Width of the element in bytes.
    const WIDTH: usize = size_of::<Self>();

    /// Decode the element from the start of a little endian byte slice.
    ///
    /// Panics if the slice is shorter than [Self::WIDTH].
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Write the element to the start of a byte slice in little endian byte order.
    ///
    /// Panics if the slice is shorter than [Self::WIDTH].
    fn write_le_slice(self, bytes: &mut [u8]);

    /// The value plus one, wrapping around. Used to store intentionally wrong checksums.
    fn wrapping_inc(self) -> Self;
}

/// Wrapping arithmetic sum of `length` consecutive little endian elements of `data`.
///
/// Only complete elements are summed, so at most `data.len() / T::WIDTH` elements contribute
/// to the result.
pub fn checksum<T: ChecksumWord>(data: &[u8], length: usize) -> T {
    data.chunks_exact(T::WIDTH)
        .take(length)
        .fold(T::zero(), |sum, chunk| sum.wrapping_add(&T::from_le_slice(chunk)))
}

macro_rules! checksum_word_impl {
    ($($ty: ident: $bits: literal,)+) => {
        $(
            impl ChecksumWord for $ty {
                #[inline]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0; size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..size_of::<$ty>()]);
                    $ty::from_le_bytes(raw)
                }

                #[inline]
                fn write_le_slice(self, bytes: &mut [u8]) {
                    bytes[..size_of::<$ty>()].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn wrapping_inc(self) -> Self {
                    self.wrapping_add(1)
                }
            }

            paste! {
                #[doc = "Wrapping " $bits " bit sum over all complete elements of `data`."]
                #[inline]
                pub fn [<sum $bits>](data: &[u8]) -> $ty {
                    checksum::<$ty>(data, data.len() / size_of::<$ty>())
                }
            }
        )+
    }
}

checksum_word_impl!(u8: 8, u16: 16, u32: 32,);

/// Parameters of a CRC according to the Rocksoft model.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrcParams {
    /// Width in bits, 8 to 32.
    pub width: u8,
    pub poly: u32,
    pub init: u32,
    pub xorout: u32,
    /// Reflect every input byte.
    pub refin: bool,
    /// Reflect the final register value.
    pub refout: bool,
}

macro_rules! crc_params_from_catalog {
    ($($ty: ident,)+) => {
        $(
            impl From<&crc::Algorithm<$ty>> for CrcParams {
                fn from(algorithm: &crc::Algorithm<$ty>) -> Self {
                    Self {
                        width: algorithm.width,
                        poly: algorithm.poly as u32,
                        init: algorithm.init as u32,
                        xorout: algorithm.xorout as u32,
                        refin: algorithm.refin,
                        refout: algorithm.refout,
                    }
                }
            }
        )+
    }
}

crc_params_from_catalog!(u8, u16, u32,);

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported CRC width {0}, must be between 8 and 32")]
pub struct InvalidCrcWidthError(pub u8);

/// Configurable CRC with a width between 8 and 32 bits.
///
/// Algorithms without input reflection use the single table implementation of the [crc] crate.
/// Algorithms with input reflection use the table-less implementation.
///
/// The [crc] crate requires a `'static` algorithm description. The description built from the
/// parameters is leaked, so a [GenericCrc] should be created once and then be reused.
pub struct GenericCrc {
    params: CrcParams,
    engine: CrcEngine,
}

enum CrcEngine {
    Bitwise(crc::Crc<u32, crc::NoTable>),
    Table(crc::Crc<u32, crc::Table<1>>),
}

impl GenericCrc {
    pub fn new(params: CrcParams) -> Result<Self, InvalidCrcWidthError> {
        if !(8..=32).contains(&params.width) {
            return Err(InvalidCrcWidthError(params.width));
        }
        let algorithm: &'static crc::Algorithm<u32> = Box::leak(Box::new(crc::Algorithm {
            width: params.width,
            poly: params.poly,
            init: params.init,
            refin: params.refin,
            refout: params.refout,
            xorout: params.xorout,
            check: 0,
            residue: 0,
        }));
        let engine = if params.refin {
            CrcEngine::Bitwise(crc::Crc::<u32, crc::NoTable>::new(algorithm))
        } else {
            CrcEngine::Table(crc::Crc::<u32, crc::Table<1>>::new(algorithm))
        };
        Ok(Self { params, engine })
    }

    #[inline]
    pub fn params(&self) -> &CrcParams {
        &self.params
    }

    pub fn checksum(&self, data: &[u8]) -> u32 {
        match &self.engine {
            CrcEngine::Bitwise(crc) => crc.checksum(data),
            CrcEngine::Table(crc) => crc.checksum(data),
        }
    }
}

impl Debug for GenericCrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericCrc")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
