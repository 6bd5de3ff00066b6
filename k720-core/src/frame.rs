//! K720 frame structure and encoding/decoding

use std::fmt;
use std::io::Read;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{
    HEADER_SIZE, MAX_PAYLOAD_SIZE, TRAILER_SIZE,
    address::Address,
    checksum,
    constants::{ENQ, ETX, STX},
    error::{Error, Result},
    reader::read_exact,
};

/// K720 data frame
///
/// # Frame Structure
///
/// ```text
/// ┌─────┬──────────┬──────────┬─────────┬─────┬─────┐
/// │ STX │ Address  │  Length  │ Payload │ ETX │ BCC │
/// │ 02  │ 2 bytes  │ 2 bytes  │ N bytes │ 03  │  1  │
/// │     │ (ASCII)  │ (hi, lo) │         │     │     │
/// └─────┴──────────┴──────────┴─────────┴─────┴─────┘
/// ```
///
/// The address is two ASCII decimal digits. The BCC is the XOR of
/// every preceding byte, STX included.
///
/// # Examples
///
/// ```
/// use k720_core::Frame;
///
/// let frame = Frame::new(15, &b"GV"[..]).unwrap();
/// let encoded = frame.encode();
/// assert_eq!(&encoded[..5], &[0x02, b'1', b'5', 0x00, 0x02]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Device the frame is addressed to (or sent from)
    pub address: Address,

    /// Command code and arguments, or response data
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame, validating address and payload
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if `address > 15`
    /// - [`Error::EmptyPayload`] if `payload` is empty
    /// - [`Error::PayloadTooLarge`] if `payload` exceeds 255 bytes
    pub fn new(address: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let address = Address::new(address)?;
        let payload = payload.into();

        if payload.is_empty() {
            return Err(Error::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self { address, payload })
    }

    /// Parse one complete frame from a buffer
    ///
    /// Applies the same checks as [`decode_response`].
    pub fn parse(mut buf: &[u8], address: Address) -> Result<Self> {
        let raw = decode_response(&mut buf, address)?;
        let payload = extract_payload(&raw)?;
        Ok(Self { address, payload })
    }

    /// Encode frame to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());

        buf.put_u8(STX);
        buf.put_slice(&self.address.to_ascii());
        buf.put_slice(&encode_length(self.payload.len()));
        buf.put_slice(&self.payload);
        buf.put_u8(ETX);

        let bcc = checksum::calculate(&buf);
        buf.put_u8(bcc);

        buf
    }

    /// Get total encoded size
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + TRAILER_SIZE
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("address", &self.address.value())
            .field("payload", &hex::encode_upper(&self.payload))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[{}](len={}, payload={})",
            self.address,
            self.payload.len(),
            String::from_utf8_lossy(&self.payload)
        )
    }
}

/// Encode a command frame for `address`
///
/// # Examples
///
/// ```
/// use k720_core::frame::encode_command;
///
/// let bytes = encode_command(5, b"RF").unwrap();
/// assert_eq!(bytes.len(), 9);
/// assert!(encode_command(16, b"RF").is_err());
/// assert!(encode_command(5, b"").is_err());
/// ```
pub fn encode_command(address: u8, payload: &[u8]) -> Result<BytesMut> {
    Ok(Frame::new(address, Bytes::copy_from_slice(payload))?.encode())
}

/// Encode the three-byte enquiry that polls `address` for its response
pub fn encode_enquiry(address: u8) -> Result<BytesMut> {
    let address = Address::new(address)?;

    let mut buf = BytesMut::with_capacity(3);
    buf.put_u8(ENQ);
    buf.put_slice(&address.to_ascii());

    Ok(buf)
}

/// Length field for an outbound frame
///
/// The high byte is always zero, matching what deployed firmware
/// expects; [`Frame::new`] rejects payloads the low byte cannot hold.
pub fn encode_length(len: usize) -> [u8; 2] {
    [0x00, (len & 0xFF) as u8]
}

/// Payload length announced by an inbound length field
///
/// Devices combine the two bytes as `255 * high + low`.
pub fn decode_length(high: u8, low: u8) -> usize {
    0xFF * high as usize + low as usize
}

/// Read and validate one response frame from `reader`
///
/// Fields are checked in wire order and the first mismatch aborts:
/// STX, address, length, payload, ETX, BCC.
///
/// Returns the whole frame, framing bytes included.
pub fn decode_response<R: Read + ?Sized>(reader: &mut R, address: Address) -> Result<Bytes> {
    let mut frame = BytesMut::with_capacity(HEADER_SIZE + TRAILER_SIZE + 32);

    let [stx] = read_field::<R, 1>(reader, "start marker")?;
    trace!(stx = format!("0x{:02X}", stx), "Read start marker");
    if stx != STX {
        return Err(Error::MalformedStart { received: stx });
    }
    frame.put_u8(stx);

    let addr = read_field::<R, 2>(reader, "address")?;
    trace!(address = %String::from_utf8_lossy(&addr), "Read address");
    let expected = address.to_ascii();
    if addr != expected {
        return Err(Error::AddressMismatch {
            expected,
            received: addr,
        });
    }
    frame.put_slice(&addr);

    let mut len = [0u8; 2];
    let n = read_exact(reader, &mut len)?;
    if n != len.len() {
        return Err(Error::ShortLength { actual: n });
    }
    let payload_len = decode_length(len[0], len[1]);
    trace!(high = len[0], low = len[1], payload_len, "Read length");
    frame.put_slice(&len);

    let mut payload = vec![0u8; payload_len];
    let n = read_exact(reader, &mut payload)?;
    if n != payload_len {
        return Err(Error::LengthMismatch {
            expected: payload_len,
            actual: n,
        });
    }
    trace!(payload = %hex::encode_upper(&payload), "Read payload");
    frame.put_slice(&payload);

    let [etx] = read_field::<R, 1>(reader, "end marker")?;
    trace!(etx = format!("0x{:02X}", etx), "Read end marker");
    if etx != ETX {
        return Err(Error::MalformedEnd { received: etx });
    }
    frame.put_u8(etx);

    let [bcc] = read_field::<R, 1>(reader, "checksum")?;
    let expected = checksum::calculate(&frame);
    trace!(
        bcc = format!("0x{:02X}", bcc),
        expected = format!("0x{:02X}", expected),
        "Read checksum"
    );
    if bcc != expected {
        return Err(Error::ChecksumMismatch {
            expected,
            received: bcc,
        });
    }
    frame.put_u8(bcc);

    Ok(frame.freeze())
}

/// Slice the payload out of a decoded frame
///
/// # Errors
///
/// [`Error::FrameTooShort`] if the frame has no complete header, or if
/// its length field points past the end of the buffer.
pub fn extract_payload(frame: &Bytes) -> Result<Bytes> {
    if frame.len() < HEADER_SIZE {
        return Err(Error::FrameTooShort {
            expected: HEADER_SIZE,
            actual: frame.len(),
        });
    }

    let end = HEADER_SIZE + decode_length(frame[3], frame[4]);
    if end > frame.len() {
        return Err(Error::FrameTooShort {
            expected: end,
            actual: frame.len(),
        });
    }

    Ok(frame.slice(HEADER_SIZE..end))
}

/// Render bytes as `0x02 0x31 0x35 ...`
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_field<R: Read + ?Sized, const N: usize>(
    reader: &mut R,
    field: &'static str,
) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    if read_exact(reader, &mut buf)? != N {
        return Err(Error::Truncated { field });
    }
    Ok(buf)
}
