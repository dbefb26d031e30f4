use bytes::{Buf, BufMut};
use commonware_codec::{Error, ReadExt, Write};
use uuid::Uuid;

/// Longest prefix of `s` that fits in `max_len` bytes without splitting a character.
///
/// Writers and readers share the same bound, so anything written can be read back.
pub fn bounded_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Write `s` as length-prefixed UTF-8, truncated to `max_len` bytes.
pub fn write_string(s: &str, max_len: usize, writer: &mut impl BufMut) {
    let bytes = bounded_str(s, max_len).as_bytes();
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Read length-prefixed UTF-8 of at most `max_len` bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("String", "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("String", "invalid UTF-8"))
}

pub fn string_encode_size(s: &str, max_len: usize) -> usize {
    4 + bounded_str(s, max_len).len()
}

/// Write a UUID as two big-endian u64 halves.
pub fn write_uuid(id: &Uuid, writer: &mut impl BufMut) {
    let (hi, lo) = id.as_u64_pair();
    hi.write(writer);
    lo.write(writer);
}

pub fn read_uuid(reader: &mut impl Buf) -> Result<Uuid, Error> {
    let hi = u64::read(reader)?;
    let lo = u64::read(reader)?;
    Ok(Uuid::from_u64_pair(hi, lo))
}

pub const UUID_ENCODE_SIZE: usize = 16;
