use crate::error::WireDecodeError;

/// Reads the fixed-width little-endian atoms of §5 from a borrowed byte
/// slice, advancing an internal cursor. Mirrors the cursor-based decoder
/// shape used elsewhere in this workspace, but every atom here has a fixed
/// width — there is no varint path in this wire format.
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `WireDecodeError::TrailingBytes` if any unread bytes remain.
    /// Called once by a top-level decode, never mid-recursion.
    pub fn expect_exhausted(&self) -> Result<(), WireDecodeError> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(WireDecodeError::TrailingBytes)
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireDecodeError> {
        if self.pos + n > self.data.len() {
            return Err(WireDecodeError::EndOfInput);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn bool(&mut self) -> Result<bool, WireDecodeError> {
        Ok(self.take(1)?[0] != 0)
    }

    pub fn i8(&mut self) -> Result<i8, WireDecodeError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn i16(&mut self) -> Result<i16, WireDecodeError> {
        let b: [u8; 2] = self.take(2)?.try_into().expect("slice of len 2");
        Ok(i16::from_le_bytes(b))
    }

    pub fn i32(&mut self) -> Result<i32, WireDecodeError> {
        let b: [u8; 4] = self.take(4)?.try_into().expect("slice of len 4");
        Ok(i32::from_le_bytes(b))
    }

    pub fn i64(&mut self) -> Result<i64, WireDecodeError> {
        let b: [u8; 8] = self.take(8)?.try_into().expect("slice of len 8");
        Ok(i64::from_le_bytes(b))
    }

    pub fn f32(&mut self) -> Result<f32, WireDecodeError> {
        let b: [u8; 4] = self.take(4)?.try_into().expect("slice of len 4");
        Ok(f32::from_le_bytes(b))
    }

    pub fn f64(&mut self) -> Result<f64, WireDecodeError> {
        let b: [u8; 8] = self.take(8)?.try_into().expect("slice of len 8");
        Ok(f64::from_le_bytes(b))
    }

    fn u16_header(&mut self) -> Result<u16, WireDecodeError> {
        let b: [u8; 2] = self.take(2)?.try_into().expect("slice of len 2");
        Ok(u16::from_le_bytes(b))
    }

    pub fn string(&mut self) -> Result<String, WireDecodeError> {
        let len = self.u16_header()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| WireDecodeError::InvalidUtf8)
    }

    /// Reads the `uint16` element-count header for an array. Elements are
    /// read by the caller, one atom read per element.
    pub fn array_header(&mut self) -> Result<usize, WireDecodeError> {
        Ok(self.u16_header()? as usize)
    }

    /// Reads the single-byte optional presence prefix. Liberal like the
    /// bool atom (§4.3): `0x00` means absent, any other byte present.
    pub fn optional_tag(&mut self) -> Result<bool, WireDecodeError> {
        Ok(self.take(1)?[0] != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_integers() {
        let mut r = WireReader::new(&[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(r.i32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn reads_length_prefixed_string() {
        let mut r = WireReader::new(&[2, 0, b'h', b'i']);
        assert_eq!(r.string().unwrap(), "hi");
    }

    #[test]
    fn end_of_input_on_truncated_atom() {
        let mut r = WireReader::new(&[1, 2]);
        assert!(matches!(r.i32(), Err(WireDecodeError::EndOfInput)));
    }

    #[test]
    fn invalid_utf8_in_string_body() {
        let mut r = WireReader::new(&[2, 0, 0xff, 0xfe]);
        assert!(matches!(r.string(), Err(WireDecodeError::InvalidUtf8)));
    }

    #[test]
    fn optional_tag_is_liberal_like_bool() {
        let mut r = WireReader::new(&[7]);
        assert_eq!(r.optional_tag().unwrap(), true);
    }

    #[test]
    fn trailing_bytes_detected() {
        let mut r = WireReader::new(&[1, 2]);
        r.i8().unwrap();
        assert!(matches!(r.expect_exhausted(), Err(WireDecodeError::TrailingBytes)));
    }
}
