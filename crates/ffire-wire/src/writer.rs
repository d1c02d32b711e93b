use crate::error::WireEncodeError;
use ffire_schema::MAX_WIRE_LENGTH;

/// Appends the fixed-width little-endian atoms of §5 to a growing buffer.
///
/// Unlike a schema-aware encoder, `WireWriter` knows nothing about `Type` —
/// it is the shared oracle every codegen target's emitted writer code must
/// agree with bit-for-bit, so it only ever writes the atoms §5 names.
pub struct WireWriter {
    buf: Vec<u8>,
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WireWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Writes a `uint16` length prefix followed by the raw bytes, per §5.
    pub fn string(&mut self, s: &str) -> Result<(), WireEncodeError> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_WIRE_LENGTH {
            return Err(WireEncodeError::StringTooLong { len: bytes.len() });
        }
        self.buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Writes the `uint16` element-count header for an array. Elements
    /// themselves are written by the caller, one atom write per element.
    pub fn array_header(&mut self, len: usize) -> Result<(), WireEncodeError> {
        if len > MAX_WIRE_LENGTH {
            return Err(WireEncodeError::ArrayTooLong { len });
        }
        self.buf.extend_from_slice(&(len as u16).to_le_bytes());
        Ok(())
    }

    /// Writes the single-byte optional presence prefix (0 = absent, 1 = present).
    pub fn optional_tag(&mut self, present: bool) {
        self.buf.push(u8::from(present));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_little_endian_integers() {
        let mut w = WireWriter::new();
        w.i32(0x0102_0304);
        assert_eq!(w.into_bytes(), vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn writes_length_prefixed_string() {
        let mut w = WireWriter::new();
        w.string("hi").unwrap();
        assert_eq!(w.into_bytes(), vec![2, 0, b'h', b'i']);
    }

    #[test]
    fn rejects_oversized_string() {
        let mut w = WireWriter::new();
        let s = "a".repeat(65_536);
        assert!(matches!(
            w.string(&s),
            Err(WireEncodeError::StringTooLong { len: 65_536 })
        ));
    }

    #[test]
    fn optional_tag_writes_single_byte() {
        let mut w = WireWriter::new();
        w.optional_tag(true);
        w.optional_tag(false);
        assert_eq!(w.into_bytes(), vec![1, 0]);
    }
}
