//! Little-endian byte codec shared by every wire entity
//!
//! Reading is an extension trait over any [`std::io::Read`] source, so the
//! same entity code decodes from slices, cursors and buffered files. Writing
//! targets an infallible in-memory sink.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{CodecError, Result};
use crate::types::{ByteString, Hash, ShortHash};

/// Sequential little-endian reads with end-of-stream detection
///
/// Every read returns `Err` when the source cannot supply the declared
/// number of bytes; nothing is consumed silently past the end.
pub trait Reader: Read {
    #[inline]
    fn read_byte(&mut self) -> Result<u8> {
        Ok(ReadBytesExt::read_u8(self)?)
    }

    #[inline]
    fn read_u16_le(&mut self) -> Result<u16> {
        Ok(ReadBytesExt::read_u16::<LittleEndian>(self)?)
    }

    #[inline]
    fn read_u32_le(&mut self) -> Result<u32> {
        Ok(ReadBytesExt::read_u32::<LittleEndian>(self)?)
    }

    #[inline]
    fn read_u64_le(&mut self) -> Result<u64> {
        Ok(ReadBytesExt::read_u64::<LittleEndian>(self)?)
    }

    /// Satoshi variable-length integer
    ///
    /// - value < 0xfd: 1 byte
    /// - 0xfd: 2-byte uint16 follows
    /// - 0xfe: 4-byte uint32 follows
    /// - 0xff: 8-byte uint64 follows
    fn read_var_int(&mut self) -> Result<u64> {
        let marker = self.read_byte()?;
        Ok(match marker {
            0xfd => self.read_u16_le()? as u64,
            0xfe => self.read_u32_le()? as u64,
            0xff => self.read_u64_le()?,
            value => value as u64,
        })
    }

    #[inline]
    fn read_hash(&mut self) -> Result<Hash> {
        let mut hash = [0u8; 32];
        self.read_exact(&mut hash)?;
        Ok(hash)
    }

    #[inline]
    fn read_short_hash(&mut self) -> Result<ShortHash> {
        let mut hash = [0u8; 20];
        self.read_exact(&mut hash)?;
        Ok(hash)
    }

    /// Read exactly `size` bytes.
    ///
    /// The buffer grows with the bytes actually available, so a corrupt
    /// length prefix cannot force a large allocation up front.
    fn read_data(&mut self, size: u64) -> Result<ByteString> {
        let mut data = Vec::new();
        let found = Read::take(&mut *self, size).read_to_end(&mut data)? as u64;
        if found != size {
            return Err(CodecError::Truncated {
                expected: size,
                found,
            });
        }
        Ok(data)
    }
}

impl<R: Read + ?Sized> Reader for R {}

/// Sequential little-endian writes into an in-memory sink
pub trait Writer {
    fn write_bytes(&mut self, data: &[u8]);

    #[inline]
    fn write_byte(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    #[inline]
    fn write_u16_le(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline]
    fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline]
    fn write_u64_le(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_var_int(&mut self, value: u64) {
        if value < 0xfd {
            self.write_byte(value as u8);
        } else if value <= 0xffff {
            self.write_byte(0xfd);
            self.write_u16_le(value as u16);
        } else if value <= 0xffff_ffff {
            self.write_byte(0xfe);
            self.write_u32_le(value as u32);
        } else {
            self.write_byte(0xff);
            self.write_u64_le(value);
        }
    }

    #[inline]
    fn write_hash(&mut self, hash: &Hash) {
        self.write_bytes(hash);
    }
}

impl Writer for Vec<u8> {
    #[inline]
    fn write_bytes(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

/// Width in bytes of `value` encoded as a satoshi variable-length integer
pub fn variable_uint_size(value: u64) -> u64 {
    if value < 0xfd {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Byte-exact wire codec for an entity.
///
/// `from_data` resets the entity, parses sequentially and resets again on any
/// failure, so a partially parsed value is never observable.
pub trait Serializable: Default {
    /// Parse from `source`, replacing the current contents.
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()>;

    /// Append the wire encoding to `sink`.
    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W);

    /// Exact length of the wire encoding.
    fn serialized_size(&self) -> u64;

    /// Return to the zeroed/invalid default state.
    fn reset(&mut self);

    fn factory_from_data<R: Read + ?Sized>(source: &mut R) -> Result<Self> {
        let mut instance = Self::default();
        instance.from_data(source)?;
        Ok(instance)
    }

    /// Parse from the front of `data`; trailing bytes are ignored.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut source = data;
        Self::factory_from_data(&mut source)
    }

    fn to_data(&self) -> ByteString {
        let mut data = Vec::with_capacity(self.serialized_size() as usize);
        self.to_writer(&mut data);
        debug_assert_eq!(data.len() as u64, self.serialized_size());
        data
    }
}
