//! Structured binary encoding used on the discovery wire.
//!
//! Records are RLP encoded: byte strings, minimal big endian integers and
//! lists. A [`Serializer`] writes its fields inline, so a composite record
//! can embed another one's fields into its own list; `to_bytes` and
//! `from_bytes` wrap the fields into a standalone list.

mod error;
mod reader;
mod writer;

pub use error::ReaderError;
pub use reader::Reader;
pub use writer::{encoded_u64_len, encoded_value_len, Writer};

pub trait Serializer {
    /// Read the record's fields from the current list scope.
    fn read(reader: &mut Reader) -> Result<Self, ReaderError>
    where
        Self: Sized;

    /// Write the record's fields inline, without an enclosing list.
    fn write(&self, writer: &mut Writer);

    /// Upper bound of the inline encoded size, in bytes.
    fn size(&self) -> usize;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size() + 3);
        let mut writer = Writer::new(&mut bytes);
        writer.write_list(|writer| self.write(writer));
        bytes
    }

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decode a standalone record.
    ///
    /// The record list must span the whole input.
    fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let mut reader = Reader::new(bytes);
        let value = reader.read_list(Self::read)?;
        if !reader.is_complete() {
            return Err(ReaderError::TrailingData(reader.size()));
        }
        Ok(value)
    }

    fn from_hex(hex: &str) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let bytes = hex::decode(hex).map_err(|_| ReaderError::InvalidValue)?;
        Self::from_bytes(&bytes)
    }
}
