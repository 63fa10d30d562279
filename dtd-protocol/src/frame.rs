//! Binary frame encoding and decoding for the terminal radio link.
//!
//! Frame format:
//! - START (1 byte): 0xA5
//! - VER (1 byte): protocol version
//! - CMD (1 byte): command identifier
//! - TARGET (1 byte): detector group id
//! - LEN (1 byte): payload length
//! - PAYLOAD (0..=9 bytes)
//! - CHECKSUM (1 byte): XOR of VER, CMD, TARGET, LEN and all PAYLOAD bytes
//! - END (1 byte): 0x5A
//!
//! Marker bytes inside the payload are not escaped. A payload (or checksum)
//! byte equal to `FRAME_END` makes the frame unrecoverable from a byte
//! stream; in practice payloads are a single status byte and never collide.

use heapless::Vec;

/// Frame start marker
pub const FRAME_START: u8 = 0xA5;

/// Frame end marker
pub const FRAME_END: u8 = 0x5A;

/// Protocol version written into every frame
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Maximum complete frame size, markers included
pub const MAX_FRAME_LEN: usize = 16;

/// START + VER + CMD + TARGET + LEN + CHECKSUM + END
pub const FRAME_OVERHEAD: usize = 7;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_LEN - FRAME_OVERHEAD;

/// Receive accumulation buffer size
pub const RX_BUFFER_SIZE: usize = 64;

/// Errors that can occur during frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds `MAX_PAYLOAD_SIZE`
    PayloadTooLarge,
    /// Output buffer too small for the encoded frame
    BufferTooSmall,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Protocol version byte
    pub version: u8,
    /// Command identifier
    pub command: u8,
    /// Target detector (group) id
    pub target: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a frame for the current protocol version
    pub fn new(command: u8, target: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            version: PROTOCOL_VERSION,
            command,
            target,
            payload: payload_vec,
        })
    }

    /// XOR checksum over the header fields and payload
    pub fn checksum(version: u8, command: u8, target: u8, payload: &[u8]) -> u8 {
        let mut checksum = version ^ command ^ target ^ (payload.len() as u8);
        for &byte in payload {
            checksum ^= byte;
        }
        checksum
    }

    /// Total encoded length of this frame
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let len = self.payload.len();
        buffer[0] = FRAME_START;
        buffer[1] = self.version;
        buffer[2] = self.command;
        buffer[3] = self.target;
        buffer[4] = len as u8;
        buffer[5..5 + len].copy_from_slice(&self.payload);
        buffer[5 + len] = Self::checksum(self.version, self.command, self.target, &self.payload);
        buffer[6 + len] = FRAME_END;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_LEN];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode exactly one frame spanning the whole of `bytes`
    ///
    /// Returns `None` for anything that is not a valid frame: too short,
    /// marker mismatch, declared length disagreeing with the actual size,
    /// or checksum mismatch.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < FRAME_OVERHEAD {
            return None;
        }
        if bytes[0] != FRAME_START || bytes[bytes.len() - 1] != FRAME_END {
            return None;
        }

        let version = bytes[1];
        let command = bytes[2];
        let target = bytes[3];
        let len = bytes[4] as usize;
        if FRAME_OVERHEAD + len != bytes.len() {
            return None;
        }

        let payload = &bytes[5..5 + len];
        if Self::checksum(version, command, target, payload) != bytes[5 + len] {
            return None;
        }

        let mut payload_vec = Vec::new();
        payload_vec.extend_from_slice(payload).ok()?;

        Some(Self {
            version,
            command,
            target,
            payload: payload_vec,
        })
    }
}

/// Encode a command for `target` into wire bytes
pub fn encode_frame(
    command: u8,
    target: u8,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
    Frame::new(command, target, payload)?.encode_to_vec()
}

/// Decode one complete frame; `None` if the bytes are not a valid frame
pub fn decode_frame(bytes: &[u8]) -> Option<Frame> {
    Frame::decode(bytes)
}

/// Accumulates received bytes until a valid frame can be extracted
///
/// Reads from the radio arrive in arbitrary chunks, possibly with line
/// noise before or between frames.
#[derive(Debug, Clone, Default)]
pub struct RxBuffer {
    buf: Vec<u8, RX_BUFFER_SIZE>,
    overflows: u32,
}

impl RxBuffer {
    /// Create an empty receive buffer
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflows: 0,
        }
    }

    /// Append received bytes
    ///
    /// When the buffer is full, the oldest bytes are dropped up to the
    /// next START marker (or all of them, if there is none) and the
    /// overflow counter is incremented.
    pub fn push(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.buf.is_full() {
                self.overflows = self.overflows.saturating_add(1);
                match self.buf[1..].iter().position(|&b| b == FRAME_START) {
                    Some(offset) => self.consume(offset + 1),
                    None => self.buf.clear(),
                }
            }
            let _ = self.buf.push(byte);
        }
    }

    /// Extract the first valid frame in the buffer, if any
    ///
    /// Each candidate spans a START marker up to the first END marker
    /// after it. Bytes before the first START marker are discarded, and
    /// bytes up to and including the accepted frame are consumed.
    /// Invalid candidates stay until pushed out by newer bytes.
    pub fn take_frame(&mut self) -> Option<Frame> {
        match self.buf.iter().position(|&b| b == FRAME_START) {
            Some(0) => {}
            Some(start) => self.consume(start),
            None => {
                self.buf.clear();
                return None;
            }
        }

        let mut search_from = 0;

        while let Some(offset) = self.buf[search_from..]
            .iter()
            .position(|&b| b == FRAME_START)
        {
            let start = search_from + offset;
            let end = start + 1 + self.buf[start + 1..].iter().position(|&b| b == FRAME_END)?;

            if let Some(frame) = decode_frame(&self.buf[start..=end]) {
                self.consume(end + 1);
                return Some(frame);
            }
            search_from = start + 1;
        }

        None
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of times the buffer overflowed and dropped old bytes
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    fn consume(&mut self, count: usize) {
        let remaining = self.buf.len() - count;
        self.buf.copy_within(count.., 0);
        self.buf.truncate(remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_empty_payload() {
        let encoded = encode_frame(0x10, 3, &[]).unwrap();

        assert_eq!(encoded.len(), 7);
        assert_eq!(encoded[0], FRAME_START);
        assert_eq!(encoded[1], PROTOCOL_VERSION);
        assert_eq!(encoded[2], 0x10);
        assert_eq!(encoded[3], 3);
        assert_eq!(encoded[4], 0);
        assert_eq!(encoded[5], 0x01 ^ 0x10 ^ 3); // checksum
        assert_eq!(encoded[6], FRAME_END);
    }

    #[test]
    fn test_encode_status_payload() {
        let encoded = encode_frame(0x20, 2, &[1]).unwrap();

        assert_eq!(encoded.len(), 8);
        assert_eq!(encoded[4], 1);
        assert_eq!(encoded[5], 1);
        assert_eq!(encoded[6], 0x01 ^ 0x20 ^ 2 ^ 1 ^ 1);
    }

    #[test]
    fn test_encode_into_small_buffer() {
        let frame = Frame::new(0x20, 1, &[1, 2]).unwrap();
        let mut buffer = [0u8; 8];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_max_payload_fits() {
        let payload = [0x11u8; MAX_PAYLOAD_SIZE];
        let encoded = encode_frame(0x30, 9, &payload).unwrap();
        assert_eq!(encoded.len(), MAX_FRAME_LEN);
    }

    #[test]
    fn test_decode_rejects_short_input() {
        assert_eq!(decode_frame(&[FRAME_START, 1, 0x10, 0, 0, FRAME_END]), None);
        assert_eq!(decode_frame(&[]), None);
    }

    #[test]
    fn test_decode_rejects_marker_mismatch() {
        let mut encoded = encode_frame(0x10, 1, b"OK").unwrap();
        encoded[0] = 0x00;
        assert_eq!(decode_frame(&encoded), None);

        let mut encoded = encode_frame(0x10, 1, b"OK").unwrap();
        let last = encoded.len() - 1;
        encoded[last] = 0x00;
        assert_eq!(decode_frame(&encoded), None);
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        let mut encoded = encode_frame(0x20, 1, &[2]).unwrap();
        encoded[4] = 2;
        assert_eq!(decode_frame(&encoded), None);
    }

    #[test]
    fn test_rx_buffer_skips_noise() {
        let mut rx = RxBuffer::new();
        rx.push(&[0x00, 0xFF, 0x12]);
        rx.push(&encode_frame(0x20, 4, &[2]).unwrap());

        let frame = rx.take_frame().unwrap();
        assert_eq!(frame.command, 0x20);
        assert_eq!(frame.target, 4);
        assert_eq!(&frame.payload[..], &[2]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_rx_buffer_split_reads() {
        let encoded = encode_frame(0x10, 1, b"OK").unwrap();
        let mut rx = RxBuffer::new();

        rx.push(&encoded[..3]);
        assert_eq!(rx.take_frame(), None);

        rx.push(&encoded[3..]);
        assert_eq!(rx.take_frame().map(|f| f.command), Some(0x10));
    }

    #[test]
    fn test_rx_buffer_first_valid_frame_wins() {
        let mut rx = RxBuffer::new();
        rx.push(&encode_frame(0x20, 1, &[1]).unwrap());
        rx.push(&encode_frame(0x20, 2, &[2]).unwrap());

        assert_eq!(rx.take_frame().map(|f| f.target), Some(1));
        assert_eq!(rx.take_frame().map(|f| f.target), Some(2));
        assert_eq!(rx.take_frame(), None);
    }

    #[test]
    fn test_rx_buffer_stray_start_marker() {
        let mut rx = RxBuffer::new();
        rx.push(&[FRAME_START, 0x33]);
        rx.push(&encode_frame(0x20, 5, &[1]).unwrap());

        assert_eq!(rx.take_frame().map(|f| f.target), Some(5));
    }

    #[test]
    fn test_rx_buffer_overflow_drops_noise() {
        let mut rx = RxBuffer::new();
        rx.push(&[0u8; RX_BUFFER_SIZE]);
        assert_eq!(rx.overflows(), 0);

        rx.push(&[0u8; 2]);
        assert_eq!(rx.overflows(), 1);
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn test_rx_buffer_frame_across_full_boundary() {
        let mut rx = RxBuffer::new();
        rx.push(&[0u8; RX_BUFFER_SIZE - 4]);
        rx.push(&encode_frame(0x20, 6, &[1]).unwrap());

        assert_eq!(rx.overflows(), 1);
        let frame = rx.take_frame().unwrap();
        assert_eq!(frame.target, 6);
        assert_eq!(&frame.payload[..], &[1]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_rx_buffer_take_discards_leading_noise() {
        let mut rx = RxBuffer::new();
        rx.push(&[0x11; 40]);
        assert_eq!(rx.take_frame(), None);
        assert!(rx.is_empty());

        let encoded = encode_frame(0x10, 2, b"OK").unwrap();
        rx.push(&[0x22, 0x33]);
        rx.push(&encoded[..4]);
        assert_eq!(rx.take_frame(), None);
        assert_eq!(rx.len(), 4);

        rx.push(&encoded[4..]);
        assert_eq!(rx.take_frame().map(|f| f.target), Some(2));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            command in any::<u8>(),
            target in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        ) {
            let encoded = encode_frame(command, target, &payload).unwrap();
            let frame = decode_frame(&encoded).unwrap();

            prop_assert_eq!(frame.version, PROTOCOL_VERSION);
            prop_assert_eq!(frame.command, command);
            prop_assert_eq!(frame.target, target);
            prop_assert_eq!(&frame.payload[..], &payload[..]);
        }

        #[test]
        fn prop_checksum_bit_flip_rejected(
            command in any::<u8>(),
            target in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
            bit in 0u8..8,
        ) {
            let mut encoded = encode_frame(command, target, &payload).unwrap();
            let checksum_index = encoded.len() - 2;
            encoded[checksum_index] ^= 1 << bit;

            prop_assert_eq!(decode_frame(&encoded), None);
        }

        #[test]
        fn prop_oversize_payload_rejected(
            payload in proptest::collection::vec(any::<u8>(), (MAX_PAYLOAD_SIZE + 1)..64),
        ) {
            prop_assert_eq!(encode_frame(0x20, 1, &payload), Err(FrameError::PayloadTooLarge));
        }
    }
}
