// zeno-vm - Portable chunk serialization
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Binary serialization of [`Chunk`]s.
//!
//! The on-disk layout (conventionally `.zbc` files), little-endian:
//!
//! ```text
//! "ZBC1"                                  magic + format version
//! u32 code_len, code bytes
//! u32 const_count, const[0]..const[n-1]   tagged values
//! u32 local_count, local[0]..local[n-1]   u32 length + UTF-8 bytes
//! ```
//!
//! A value is a one-byte tag plus a variant payload: nil has none,
//! bool is one byte, numbers are 8-byte IEEE-754, strings are a u32
//! length plus UTF-8 bytes. Opaque host handles are not portable and
//! are rejected on write.
//!
//! Compiled chunks can be persisted and reloaded without re-running
//! the compiler; `deserialize(serialize(c))` reproduces `c` for any
//! chunk built from serializable variants.

use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::chunk::Chunk;
use crate::value::Value;

/// Magic header pinning the format version. Future revisions bump the
/// trailing digit.
pub const MAGIC: &[u8; 4] = b"ZBC1";

const TAG_NIL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_NUM: u8 = 2;
const TAG_STR: u8 = 3;

/// Serialization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The constant pool holds an opaque host handle, which has no
    /// portable representation.
    UnserializableObject,
    /// Writing the output file failed.
    Io(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::UnserializableObject => {
                write!(f, "cannot serialize an object constant: host handles are not portable")
            }
            EncodeError::Io(msg) => write!(f, "write failed: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream does not start with the `ZBC1` magic.
    BadMagic,
    /// The stream ended inside a section.
    UnexpectedEof,
    /// An unrecognized value tag.
    UnknownValueTag(u8),
    /// A string payload was not valid UTF-8.
    InvalidUtf8,
    /// Reading the input file failed.
    Io(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BadMagic => write!(f, "invalid magic number"),
            DecodeError::UnexpectedEof => write!(f, "unexpected end of input"),
            DecodeError::UnknownValueTag(tag) => write!(f, "unknown value tag {}", tag),
            DecodeError::InvalidUtf8 => write!(f, "invalid UTF-8 in string"),
            DecodeError::Io(msg) => write!(f, "read failed: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Serialize a chunk to its portable byte representation.
pub fn serialize(chunk: &Chunk) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(16 + chunk.code.len());
    out.extend_from_slice(MAGIC);

    write_u32(&mut out, chunk.code.len() as u32);
    out.extend_from_slice(&chunk.code);

    write_u32(&mut out, chunk.constants.len() as u32);
    for value in &chunk.constants {
        write_value(&mut out, value)?;
    }

    write_u32(&mut out, chunk.local_names.len() as u32);
    for name in &chunk.local_names {
        write_string(&mut out, name);
    }

    Ok(out)
}

/// Deserialize a chunk from its portable byte representation.
pub fn deserialize(bytes: &[u8]) -> Result<Chunk, DecodeError> {
    let mut r = Reader::new(bytes);

    if r.read_bytes(4)? != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let code_len = r.read_u32()? as usize;
    let code = r.read_bytes(code_len)?.to_vec();

    let const_count = r.read_u32()? as usize;
    let mut constants = Vec::with_capacity(const_count.min(256));
    for _ in 0..const_count {
        constants.push(read_value(&mut r)?);
    }

    let local_count = r.read_u32()? as usize;
    let mut local_names = Vec::with_capacity(local_count.min(256));
    for _ in 0..local_count {
        local_names.push(read_string(&mut r)?);
    }

    Ok(Chunk {
        code,
        constants,
        local_names,
    })
}

/// Serialize a chunk into a file (conventionally `*.zbc`).
pub fn save_to_file(chunk: &Chunk, path: impl AsRef<Path>) -> Result<(), EncodeError> {
    let bytes = serialize(chunk)?;
    fs::write(path, bytes).map_err(|e| EncodeError::Io(e.to_string()))
}

/// Load a chunk from a file written by [`save_to_file`].
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Chunk, DecodeError> {
    let bytes = fs::read(path).map_err(|e| DecodeError::Io(e.to_string()))?;
    deserialize(&bytes)
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    write_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Nil => out.push(TAG_NIL),
        Value::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*b));
        }
        Value::Num(n) => {
            out.push(TAG_NUM);
            out.extend_from_slice(&n.to_le_bytes());
        }
        Value::Str(s) => {
            out.push(TAG_STR);
            write_string(out, s);
        }
        Value::Obj(_) => return Err(EncodeError::UnserializableObject),
    }
    Ok(())
}

fn read_value(r: &mut Reader<'_>) -> Result<Value, DecodeError> {
    let tag = r.read_u8()?;
    Ok(match tag {
        TAG_NIL => Value::Nil,
        TAG_BOOL => Value::Bool(r.read_u8()? != 0),
        TAG_NUM => Value::Num(f64::from_le_bytes(r.read_array()?)),
        TAG_STR => Value::Str(Rc::from(read_string(r)?)),
        other => return Err(DecodeError::UnknownValueTag(other)),
    })
}

fn read_string(r: &mut Reader<'_>) -> Result<String, DecodeError> {
    let len = r.read_u32()? as usize;
    let bytes = r.read_bytes(len)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8)
}

/// A bounds-checked byte reader.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, offset: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or(DecodeError::UnexpectedEof)?;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or(DecodeError::UnexpectedEof)?;
        self.offset = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::OpCode;
    use std::any::Any;
    use zeno_core::Native;

    fn sample_chunk() -> Chunk {
        Chunk {
            code: vec![OpCode::Constant as u8, 0, OpCode::Return as u8],
            constants: vec![Value::str("hello")],
            local_names: vec!["var1".to_string()],
        }
    }

    #[test]
    fn round_trip_preserves_all_sections() {
        let chunk = sample_chunk();
        let bytes = serialize(&chunk).unwrap();
        let decoded = deserialize(&bytes).unwrap();
        assert_eq!(decoded, chunk);
    }

    #[test]
    fn round_trip_covers_every_serializable_variant() {
        let chunk = Chunk {
            code: vec![OpCode::Return as u8],
            constants: vec![
                Value::Nil,
                Value::Bool(true),
                Value::Bool(false),
                Value::Num(-12.75),
                Value::str(""),
                Value::str("héllo"),
            ],
            local_names: vec![],
        };
        let decoded = deserialize(&serialize(&chunk).unwrap()).unwrap();
        assert_eq!(decoded, chunk);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = serialize(&sample_chunk()).unwrap();
        bytes[0] = b'X';
        assert_eq!(deserialize(&bytes), Err(DecodeError::BadMagic));
    }

    #[test]
    fn rejects_truncated_stream() {
        let bytes = serialize(&sample_chunk()).unwrap();
        for len in 0..bytes.len() {
            let err = deserialize(&bytes[..len]).unwrap_err();
            assert_eq!(err, DecodeError::UnexpectedEof, "truncated at {}", len);
        }
    }

    #[test]
    fn rejects_unknown_value_tag() {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        write_u32(&mut out, 0); // no code
        write_u32(&mut out, 1); // one constant
        out.push(9); // bogus tag
        assert_eq!(deserialize(&out), Err(DecodeError::UnknownValueTag(9)));
    }

    #[test]
    fn rejects_object_constants_on_write() {
        let handle: Rc<dyn Any> = Rc::new(0u8);
        let chunk = Chunk {
            code: vec![OpCode::Return as u8],
            constants: vec![Value::Obj(Native::Opaque(handle))],
            local_names: vec![],
        };
        assert_eq!(serialize(&chunk), Err(EncodeError::UnserializableObject));
    }

    #[test]
    fn rejects_invalid_utf8_string() {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        write_u32(&mut out, 0);
        write_u32(&mut out, 1);
        out.push(TAG_STR);
        write_u32(&mut out, 2);
        out.extend_from_slice(&[0xff, 0xfe]);
        assert_eq!(deserialize(&out), Err(DecodeError::InvalidUtf8));
    }
}
