use super::ReaderError;

/// Offset of single-item string headers.
pub(crate) const STRING_OFFSET: u8 = 0x80;
/// Offset of list headers.
pub(crate) const LIST_OFFSET: u8 = 0xc0;
/// Payloads shorter than this use the one-byte header form.
pub(crate) const SHORT_ITEM_LIMIT: usize = 56;

/// Header of the next item in the input.
#[derive(Debug, Clone, Copy)]
struct Header {
    /// Whether the item is a list.
    list: bool,
    /// Offset of the payload relative to the item start.
    offset: usize,
    /// Payload length in bytes.
    len: usize,
}

/// Cursor over an RLP encoded byte slice.
///
/// A reader either walks the top level of a packet or the payload of a
/// single list; `is_complete` reports whether that scope has been fully
/// consumed.
pub struct Reader<'a> {
    bytes: &'a [u8],
    total: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, total: 0 }
    }

    /// Whether every item of the current scope has been read.
    pub fn is_complete(&self) -> bool {
        self.total >= self.bytes.len()
    }

    /// Number of bytes not yet consumed in the current scope.
    pub fn size(&self) -> usize {
        self.bytes.len().saturating_sub(self.total)
    }

    fn byte_at(&self, index: usize) -> Result<u8, ReaderError> {
        self.bytes
            .get(index)
            .copied()
            .ok_or(ReaderError::UnexpectedEnd)
    }

    // Big endian length prefix of a long item
    fn read_length(&self, start: usize, len_of_len: usize) -> Result<usize, ReaderError> {
        let end = start
            .checked_add(len_of_len)
            .ok_or(ReaderError::UnexpectedEnd)?;
        let bytes = self
            .bytes
            .get(start..end)
            .ok_or(ReaderError::UnexpectedEnd)?;
        if bytes.first() == Some(&0) {
            return Err(ReaderError::NonCanonicalSize);
        }
        if len_of_len > std::mem::size_of::<usize>() {
            return Err(ReaderError::IntegerOverflow(std::mem::size_of::<usize>()));
        }

        let len = bytes
            .iter()
            .fold(0usize, |acc, byte| (acc << 8) | *byte as usize);
        if len < SHORT_ITEM_LIMIT {
            return Err(ReaderError::NonCanonicalSize);
        }
        Ok(len)
    }

    fn peek_header(&self) -> Result<Header, ReaderError> {
        let first = self.byte_at(self.total)?;
        let header = match first {
            0x00..=0x7f => Header {
                list: false,
                offset: 0,
                len: 1,
            },
            0x80..=0xb7 => {
                let len = (first - STRING_OFFSET) as usize;
                // A single byte below 0x80 must be encoded as itself
                if len == 1 && self.byte_at(self.total + 1)? < STRING_OFFSET {
                    return Err(ReaderError::NonCanonicalSize);
                }
                Header {
                    list: false,
                    offset: 1,
                    len,
                }
            }
            0xb8..=0xbf => {
                let len_of_len = (first - 0xb7) as usize;
                Header {
                    list: false,
                    offset: 1 + len_of_len,
                    len: self.read_length(self.total + 1, len_of_len)?,
                }
            }
            0xc0..=0xf7 => Header {
                list: true,
                offset: 1,
                len: (first - LIST_OFFSET) as usize,
            },
            0xf8..=0xff => {
                let len_of_len = (first - 0xf7) as usize;
                Header {
                    list: true,
                    offset: 1 + len_of_len,
                    len: self.read_length(self.total + 1, len_of_len)?,
                }
            }
        };

        Ok(header)
    }

    // Returns the payload of the next item and advances past it
    fn take(&mut self, header: Header) -> Result<&'a [u8], ReaderError> {
        let start = self
            .total
            .checked_add(header.offset)
            .ok_or(ReaderError::UnexpectedEnd)?;
        let end = start
            .checked_add(header.len)
            .ok_or(ReaderError::UnexpectedEnd)?;
        let payload = self
            .bytes
            .get(start..end)
            .ok_or(ReaderError::UnexpectedEnd)?;
        self.total = end;
        Ok(payload)
    }

    /// Read the next raw byte string.
    pub fn read_value(&mut self) -> Result<&'a [u8], ReaderError> {
        let header = self.peek_header()?;
        if header.list {
            return Err(ReaderError::ExpectedValue);
        }
        self.take(header)
    }

    /// Read the next byte string, requiring an exact length.
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], ReaderError> {
        let value = self.read_value()?;
        value.try_into().map_err(|_| ReaderError::InvalidValue)
    }

    /// Read the next item as an unsigned integer.
    ///
    /// Zero is the empty string, leading zero bytes are rejected.
    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        let value = self.read_value()?;
        if value.len() > 8 {
            return Err(ReaderError::IntegerOverflow(8));
        }
        if value.first() == Some(&0) {
            return Err(ReaderError::LeadingZeros);
        }
        Ok(value
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | *byte as u64))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let value = self.read_u64()?;
        u32::try_from(value).map_err(|_| ReaderError::IntegerOverflow(4))
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let value = self.read_u64()?;
        u16::try_from(value).map_err(|_| ReaderError::IntegerOverflow(2))
    }

    /// Read the next list, handing its payload to `f`.
    ///
    /// Items left unread by `f` are skipped, so newer peers may append
    /// fields to a record without breaking older decoders.
    pub fn read_list<T, F>(&mut self, f: F) -> Result<T, ReaderError>
    where
        F: FnOnce(&mut Reader<'a>) -> Result<T, ReaderError>,
    {
        let header = self.peek_header()?;
        if !header.list {
            return Err(ReaderError::ExpectedList);
        }
        let payload = self.take(header)?;
        let mut inner = Reader::new(payload);
        f(&mut inner)
    }
}
