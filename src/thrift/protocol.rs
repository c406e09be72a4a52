// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The Thrift compact protocol: short-form field headers with delta-encoded field
//! ids, zig-zag varints for signed integers, inline-encoded booleans, and
//! STOP-terminated structs. See the Apache Thrift compact protocol specification;
//! this module implements only the read side, and only the pieces `parquet_format`
//! needs.

use crate::errors::Result;

const COMPACT_STOP: u8 = 0x00;
const COMPACT_BOOLEAN_TRUE: u8 = 0x01;
const COMPACT_BOOLEAN_FALSE: u8 = 0x02;
const COMPACT_BYTE: u8 = 0x03;
const COMPACT_I16: u8 = 0x04;
const COMPACT_I32: u8 = 0x05;
const COMPACT_I64: u8 = 0x06;
const COMPACT_DOUBLE: u8 = 0x07;
const COMPACT_BINARY: u8 = 0x08;
const COMPACT_LIST: u8 = 0x09;
const COMPACT_SET: u8 = 0x0A;
const COMPACT_MAP: u8 = 0x0B;
const COMPACT_STRUCT: u8 = 0x0C;

/// A field header as decoded off the wire: its compact type code and resolved
/// field id (after applying the delta against the enclosing struct's last id).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldHeader {
  pub field_type: u8,
  pub field_id: i16,
  /// For boolean fields the value is packed into the type code itself; other
  /// field types still need their value read separately.
  pub bool_value: Option<bool>,
}

/// Reads the compact protocol over an in-memory byte slice. Parquet's metadata
/// structures are always read in full into memory before being decoded (the
/// footer length is known up front), so a slice cursor is sufficient — no
/// streaming I/O is needed here.
pub struct CompactInputProtocol<'a> {
  buf: &'a [u8],
  pos: usize,
  // One "last field id" per currently-open struct, for delta decoding.
  last_field_id_stack: Vec<i16>,
}

impl<'a> CompactInputProtocol<'a> {
  pub fn new(buf: &'a [u8]) -> Self {
    CompactInputProtocol { buf, pos: 0, last_field_id_stack: Vec::new() }
  }

  pub fn position(&self) -> usize { self.pos }

  fn read_byte(&mut self) -> Result<u8> {
    if self.pos >= self.buf.len() {
      return corrupt_metadata_err!("Unexpected end of Thrift metadata at offset {}", self.pos);
    }
    let b = self.buf[self.pos];
    self.pos += 1;
    Ok(b)
  }

  fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
    if self.pos + n > self.buf.len() {
      return corrupt_metadata_err!("Unexpected end of Thrift metadata reading {} bytes", n);
    }
    let slice = &self.buf[self.pos..self.pos + n];
    self.pos += n;
    Ok(slice)
  }

  /// Unsigned LEB128 varint, as used for all compact-protocol lengths/sizes.
  fn read_uvarint(&mut self) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
      let byte = self.read_byte()?;
      result |= ((byte & 0x7F) as u64) << shift;
      if byte & 0x80 == 0 { break; }
      shift += 7;
      if shift >= 70 { return corrupt_metadata_err!("Varint too long"); }
    }
    Ok(result)
  }

  fn read_zigzag_varint(&mut self) -> Result<i64> {
    let raw = self.read_uvarint()?;
    Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
  }

  pub fn read_struct_begin(&mut self) {
    self.last_field_id_stack.push(0);
  }

  pub fn read_struct_end(&mut self) {
    self.last_field_id_stack.pop();
  }

  /// Reads the next field header. Returns `None` on the struct's STOP byte.
  pub fn read_field_begin(&mut self) -> Result<Option<FieldHeader>> {
    let header = self.read_byte()?;
    if header == COMPACT_STOP {
      return Ok(None);
    }
    let modifier = (header & 0xF0) >> 4;
    let field_type = header & 0x0F;

    let last = *self.last_field_id_stack.last().unwrap_or(&0);
    let field_id = if modifier == 0 {
      // Long form: explicit zigzag-varint field id follows.
      self.read_zigzag_varint()? as i16
    } else {
      last + modifier as i16
    };
    if let Some(top) = self.last_field_id_stack.last_mut() { *top = field_id; }

    let bool_value = match field_type {
      COMPACT_BOOLEAN_TRUE => Some(true),
      COMPACT_BOOLEAN_FALSE => Some(false),
      _ => None,
    };
    Ok(Some(FieldHeader { field_type, field_id, bool_value }))
  }

  pub fn read_byte_value(&mut self) -> Result<i8> { Ok(self.read_byte()? as i8) }

  pub fn read_i16(&mut self) -> Result<i16> { Ok(self.read_zigzag_varint()? as i16) }

  pub fn read_i32(&mut self) -> Result<i32> { Ok(self.read_zigzag_varint()? as i32) }

  pub fn read_i64(&mut self) -> Result<i64> { self.read_zigzag_varint() }

  pub fn read_double(&mut self) -> Result<f64> {
    let bytes = self.read_bytes(8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(f64::from_le_bytes(raw))
  }

  pub fn read_binary(&mut self) -> Result<Vec<u8>> {
    let len = self.read_uvarint()? as usize;
    Ok(self.read_bytes(len)?.to_vec())
  }

  pub fn read_string(&mut self) -> Result<String> {
    let bytes = self.read_binary()?;
    String::from_utf8(bytes).or_else(|_| corrupt_metadata_err!("Invalid UTF-8 in Thrift string"))
  }

  /// Returns `(element_type, size)`. Works identically for LIST and SET headers.
  pub fn read_list_begin(&mut self) -> Result<(u8, usize)> {
    let header = self.read_byte()?;
    let size_nibble = (header & 0xF0) >> 4;
    let elem_type = header & 0x0F;
    let size = if size_nibble == 0x0F {
      self.read_uvarint()? as usize
    } else {
      size_nibble as usize
    };
    Ok((elem_type, size))
  }

  /// Returns `(key_type, value_type, size)`.
  pub fn read_map_begin(&mut self) -> Result<(u8, u8, usize)> {
    let size = self.read_uvarint()? as usize;
    if size == 0 {
      return Ok((0, 0, 0));
    }
    let kv_types = self.read_byte()?;
    Ok(((kv_types & 0xF0) >> 4, kv_types & 0x0F, size))
  }

  pub fn read_bool(&mut self) -> Result<bool> {
    // Only reachable for bools nested inside a list/map/struct field (not a
    // top-level struct field, whose value is packed into the field header).
    Ok(self.read_byte()? == COMPACT_BOOLEAN_TRUE)
  }

  /// Skips a value of the given compact `field_type`, recursing into
  /// structs/lists/maps. Used to ignore fields this reader doesn't model.
  pub fn skip(&mut self, field_type: u8) -> Result<()> {
    match field_type {
      COMPACT_BOOLEAN_TRUE | COMPACT_BOOLEAN_FALSE => {}
      COMPACT_BYTE => { self.read_byte()?; }
      COMPACT_I16 | COMPACT_I32 | COMPACT_I64 => { self.read_zigzag_varint()?; }
      COMPACT_DOUBLE => { self.read_double()?; }
      COMPACT_BINARY => { self.read_binary()?; }
      COMPACT_LIST | COMPACT_SET => {
        let (elem_type, size) = self.read_list_begin()?;
        for _ in 0..size { self.skip(elem_type)?; }
      }
      COMPACT_MAP => {
        let (key_type, value_type, size) = self.read_map_begin()?;
        for _ in 0..size {
          self.skip(key_type)?;
          self.skip(value_type)?;
        }
      }
      COMPACT_STRUCT => {
        self.read_struct_begin();
        loop {
          match self.read_field_begin()? {
            None => break,
            Some(field) => {
              if field.bool_value.is_none() {
                self.skip(field.field_type)?;
              }
            }
          }
        }
        self.read_struct_end();
      }
      other => return corrupt_metadata_err!("Cannot skip unknown Thrift type code {}", other),
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zigzag_varint_roundtrip() {
    // i32(-1) zigzag-encodes to 1, a single-byte varint.
    let mut proto = CompactInputProtocol::new(&[0x01]);
    assert_eq!(proto.read_i32().unwrap(), -1);
  }

  #[test]
  fn test_field_header_delta_and_stop() {
    // struct { 1: i32 a = 5; 2: i32 b = 6; STOP }
    // field 1: short-form header (delta=1, type=I32) then zigzag(5)=10
    // field 2: short-form header (delta=1, type=I32) then zigzag(6)=12
    let bytes = [0x15, 0x0A, 0x15, 0x0C, 0x00];
    let mut proto = CompactInputProtocol::new(&bytes);
    proto.read_struct_begin();
    let f1 = proto.read_field_begin().unwrap().unwrap();
    assert_eq!(f1.field_id, 1);
    assert_eq!(proto.read_i32().unwrap(), 5);
    let f2 = proto.read_field_begin().unwrap().unwrap();
    assert_eq!(f2.field_id, 2);
    assert_eq!(proto.read_i32().unwrap(), 6);
    assert!(proto.read_field_begin().unwrap().is_none());
    proto.read_struct_end();
  }

  #[test]
  fn test_skip_unknown_struct_field() {
    // An inner struct with one unknown i32 field, followed by a sibling field the
    // caller does know about; skip() must leave the cursor exactly past it.
    let inner = [0x15u8, 0x02, 0x00]; // field 1: i32 = 1, STOP
    let mut bytes = vec![0x1C]; // outer field 1: STRUCT
    bytes.extend_from_slice(&inner);
    bytes.push(0x15); // outer field 2: i32
    bytes.push(0x08); // zigzag(4)
    bytes.push(0x00); // outer STOP
    let mut proto = CompactInputProtocol::new(&bytes);
    proto.read_struct_begin();
    let f1 = proto.read_field_begin().unwrap().unwrap();
    proto.skip(f1.field_type).unwrap();
    let f2 = proto.read_field_begin().unwrap().unwrap();
    assert_eq!(f2.field_id, 2);
    assert_eq!(proto.read_i32().unwrap(), 4);
    assert!(proto.read_field_begin().unwrap().is_none());
  }
}
