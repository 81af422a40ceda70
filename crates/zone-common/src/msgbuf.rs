// msgbuf.rs — growable little-endian wire buffer with a read cursor.
// Converted from: myq2-common/src/qcommon.rs (SizeBuf) and the
// msg_write_*/msg_read_* free functions in myq2-common/src/common.rs,
// folded into methods on one struct. Reads past the end of the buffer
// return a sentinel (-1 for signed reads, `None` for the decoded-packet
// helpers) instead of panicking, matching the teacher's own bounds
// behavior and spec.md §7 ("nothing in the hot path panics").

#[derive(Debug, Clone, Default)]
pub struct MsgBuf {
    pub data: Vec<u8>,
    pub readcount: usize,
}

impl MsgBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, readcount: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.readcount = 0;
    }

    // ---- writers ----

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.data.push(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Writes `bytes` into a fixed-width field, NUL-padding or truncating
    /// to exactly `width` bytes (used for the 16-byte file-send display
    /// name and the NUL-terminated redirect arena name).
    pub fn write_fixed(&mut self, bytes: &[u8], width: usize) {
        let n = bytes.len().min(width);
        self.data.extend_from_slice(&bytes[..n]);
        self.data.resize(self.data.len() + (width - n), 0);
    }

    // ---- readers ----

    pub fn begin_reading(&mut self) {
        self.readcount = 0;
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.readcount)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let rc = self.readcount;
        self.readcount += 1;
        self.data.get(rc).copied()
    }

    pub fn read_i8(&mut self) -> Option<i8> {
        self.read_u8().map(|b| b as i8)
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        let rc = self.readcount;
        self.readcount += 2;
        if rc + 2 > self.data.len() {
            return None;
        }
        Some(u16::from_le_bytes([self.data[rc], self.data[rc + 1]]))
    }

    pub fn read_i16(&mut self) -> Option<i16> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        let rc = self.readcount;
        self.readcount += 4;
        if rc + 4 > self.data.len() {
            return None;
        }
        Some(u32::from_le_bytes([
            self.data[rc],
            self.data[rc + 1],
            self.data[rc + 2],
            self.data[rc + 3],
        ]))
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_bytes(&mut self, n: usize) -> Option<&[u8]> {
        let rc = self.readcount;
        if rc + n > self.data.len() {
            return None;
        }
        self.readcount += n;
        Some(&self.data[rc..rc + n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_fields() {
        let mut buf = MsgBuf::new();
        buf.write_u8(7);
        buf.write_i16(-300);
        buf.write_u32(123456);
        buf.begin_reading();
        assert_eq!(buf.read_u8(), Some(7));
        assert_eq!(buf.read_i16(), Some(-300));
        assert_eq!(buf.read_u32(), Some(123456));
    }

    #[test]
    fn read_past_end_returns_none() {
        let mut buf = MsgBuf::from_bytes(vec![1, 2]);
        buf.begin_reading();
        assert_eq!(buf.read_u8(), Some(1));
        assert_eq!(buf.read_u8(), Some(2));
        assert_eq!(buf.read_u8(), None);
    }

    #[test]
    fn fixed_field_pads_and_truncates() {
        let mut buf = MsgBuf::new();
        buf.write_fixed(b"hi", 4);
        assert_eq!(&buf.data, &[b'h', b'i', 0, 0]);

        let mut buf2 = MsgBuf::new();
        buf2.write_fixed(b"toolongname", 4);
        assert_eq!(&buf2.data, b"tool");
    }
}
