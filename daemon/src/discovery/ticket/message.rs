use disco_common::serializer::{
    encoded_u64_len, encoded_value_len, Reader, ReaderError, Serializer, Writer,
};

/// Response to a topic registration request the issuer chose to throttle.
///
/// `request_id` echoes the requester's correlation id. `ticket` is opaque to
/// the requester and must be sent back unchanged no earlier than `wait_time`
/// milliseconds after receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketMessage {
    pub request_id: Vec<u8>,
    pub ticket: Vec<u8>,
    pub wait_time: u64,
}

impl TicketMessage {
    pub fn new(request_id: Vec<u8>, ticket: Vec<u8>, wait_time: u64) -> Self {
        Self {
            request_id,
            ticket,
            wait_time,
        }
    }
}

impl Serializer for TicketMessage {
    // All three fields are mandatory
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let request_id = reader.read_value()?.to_vec();
        let ticket = reader.read_value()?.to_vec();
        let wait_time = reader.read_u64()?;
        Ok(Self {
            request_id,
            ticket,
            wait_time,
        })
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_value(&self.request_id);
        writer.write_value(&self.ticket);
        writer.write_u64(self.wait_time);
    }

    fn size(&self) -> usize {
        encoded_value_len(&self.request_id)
            + encoded_value_len(&self.ticket)
            + encoded_u64_len(self.wait_time)
    }
}
