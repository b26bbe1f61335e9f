use super::reader::{LIST_OFFSET, SHORT_ITEM_LIMIT, STRING_OFFSET};

/// Appends RLP encoded items to a byte buffer.
pub struct Writer<'a> {
    bytes: &'a mut Vec<u8>,
    total: usize,
}

impl<'a> Writer<'a> {
    pub fn new(bytes: &'a mut Vec<u8>) -> Self {
        Self { bytes, total: 0 }
    }

    /// Number of bytes written through this writer.
    pub fn total_write(&self) -> usize {
        self.total
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
        self.total += bytes.len();
    }

    fn write_header(&mut self, offset: u8, len: usize) {
        if len < SHORT_ITEM_LIMIT {
            self.push(&[offset + len as u8]);
        } else {
            let len_bytes = len.to_be_bytes();
            let skip = len_bytes.iter().take_while(|b| **b == 0).count();
            let len_bytes = &len_bytes[skip..];
            // 0xb7 / 0xf7 followed by the length of the length
            self.push(&[offset + 55 + len_bytes.len() as u8]);
            self.push(len_bytes);
        }
    }

    /// Write a raw byte string.
    pub fn write_value(&mut self, value: &[u8]) {
        match value {
            [byte] if *byte < STRING_OFFSET => self.push(&[*byte]),
            _ => {
                self.write_header(STRING_OFFSET, value.len());
                self.push(value);
            }
        }
    }

    /// Write an unsigned integer as its minimal big endian byte string.
    pub fn write_u64(&mut self, value: u64) {
        let bytes = value.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        self.write_value(&bytes[skip..]);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_u64(value as u64);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_u64(value as u64);
    }

    /// Write a list whose items are produced by `f`.
    pub fn write_list<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Writer),
    {
        let mut payload = Vec::new();
        {
            let mut inner = Writer::new(&mut payload);
            f(&mut inner);
        }
        self.write_header(LIST_OFFSET, payload.len());
        self.push(&payload);
    }
}

/// Number of bytes `value` takes once encoded as a byte string item.
pub fn encoded_value_len(value: &[u8]) -> usize {
    match value {
        [byte] if *byte < STRING_OFFSET => 1,
        _ if value.len() < SHORT_ITEM_LIMIT => 1 + value.len(),
        _ => {
            let len_of_len = std::mem::size_of::<usize>() - (value.len().leading_zeros() / 8) as usize;
            1 + len_of_len + value.len()
        }
    }
}

/// Number of bytes `value` takes once encoded as an integer item.
pub fn encoded_u64_len(value: u64) -> usize {
    let significant = 8 - (value.leading_zeros() / 8) as usize;
    match significant {
        0 => 1,
        1 if value < STRING_OFFSET as u64 => 1,
        n => 1 + n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::Reader;
    use proptest::prelude::*;

    fn encode<F: FnOnce(&mut Writer)>(f: F) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut writer = Writer::new(&mut bytes);
        f(&mut writer);
        bytes
    }

    #[test]
    fn test_write_string() {
        assert_eq!(encode(|w| w.write_value(b"dog")), vec![0x83, b'd', b'o', b'g']);
        assert_eq!(encode(|w| w.write_value(b"")), vec![0x80]);
        assert_eq!(encode(|w| w.write_value(&[0x7f])), vec![0x7f]);
        assert_eq!(encode(|w| w.write_value(&[0x80])), vec![0x81, 0x80]);
    }

    #[test]
    fn test_write_integers() {
        assert_eq!(encode(|w| w.write_u64(0)), vec![0x80]);
        assert_eq!(encode(|w| w.write_u64(15)), vec![0x0f]);
        assert_eq!(encode(|w| w.write_u64(1024)), vec![0x82, 0x04, 0x00]);
        assert_eq!(encode(|w| w.write_u16(30303)), vec![0x82, 0x76, 0x5f]);
    }

    #[test]
    fn test_write_long_string() {
        let value = [0x11u8; 60];
        let bytes = encode(|w| w.write_value(&value));
        assert_eq!(&bytes[..2], &[0xb8, 60]);
        assert_eq!(bytes.len(), 62);
    }

    #[test]
    fn test_write_list() {
        let bytes = encode(|w| {
            w.write_list(|w| {
                w.write_value(b"cat");
                w.write_value(b"dog");
            })
        });
        assert_eq!(bytes, vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']);
        assert_eq!(encode(|w| w.write_list(|_| {})), vec![0xc0]);
    }

    #[test]
    fn test_total_write() {
        let mut bytes = Vec::new();
        let mut writer = Writer::new(&mut bytes);
        writer.write_list(|w| w.write_u64(1024));
        assert_eq!(writer.total_write(), 4);
        assert_eq!(writer.as_bytes(), &[0xc3, 0x82, 0x04, 0x00]);
    }

    #[test]
    fn test_encoded_u64_len() {
        for value in [0u64, 1, 127, 128, 255, 256, 65535, 65536, u64::MAX] {
            let bytes = encode(|w| w.write_u64(value));
            assert_eq!(encoded_u64_len(value), bytes.len(), "value {}", value);
        }
    }

    #[test]
    fn test_encoded_value_len() {
        for len in [0usize, 1, 55, 56, 255, 256, 65_535, 65_536, 70_000] {
            let value = vec![0xaa; len];
            let bytes = encode(|w| w.write_value(&value));
            assert_eq!(encoded_value_len(&value), bytes.len(), "length {}", len);
        }
        assert_eq!(encoded_value_len(&[0x7f]), 1);
    }

    proptest! {
        #[test]
        fn test_u64_round_trip(value in any::<u64>()) {
            let bytes = encode(|w| w.write_u64(value));
            let mut reader = Reader::new(&bytes);
            prop_assert_eq!(reader.read_u64().unwrap(), value);
            prop_assert!(reader.is_complete());
        }

        #[test]
        fn test_value_round_trip(value in proptest::collection::vec(any::<u8>(), 0..300)) {
            let bytes = encode(|w| w.write_value(&value));
            let mut reader = Reader::new(&bytes);
            prop_assert_eq!(reader.read_value().unwrap(), &value[..]);
        }
    }
}
