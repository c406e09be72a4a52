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

//! Definition/repetition level encode/decode. Levels are small non-negative
//! integers (`0..=max_level`) and use one of two wire representations: the
//! hybrid RLE/bit-packed run stream (`Encoding::RLE`), or, for older files, a
//! single raw bit-packed run with no run headers at all (`Encoding::BIT_PACKED`).

use crate::basic::Encoding;
use crate::errors::Result;
use crate::util::bit_util::{self, BitReader, BitWriter};
use crate::util::memory::ByteBufferPtr;

use super::rle_encoding::{RleDecoder, RleEncoder};

enum InternalEncoder {
  Rle(RleEncoder),
  BitPacked { writer: BitWriter, bit_width: u8 },
}

pub struct LevelEncoder {
  encoding: Encoding,
  bit_width: u8,
  inner: InternalEncoder,
}

impl LevelEncoder {
  /// `buffer` must be at least `LevelEncoder::max_buffer_size(encoding, max_level,
  /// num_values)` bytes.
  pub fn new(encoding: Encoding, max_level: i16, num_values: usize, buffer: Vec<u8>) -> Self {
    let bit_width = bit_util::num_required_bits(max_level as u64);
    let inner = match encoding {
      Encoding::RLE => {
        // Reserve a 4-byte length prefix; `consume` fills it in.
        InternalEncoder::Rle(RleEncoder::new_from_buf(bit_width, buffer, 4))
      }
      Encoding::BIT_PACKED => {
        InternalEncoder::BitPacked { writer: BitWriter::new_from_buf(buffer, 0), bit_width }
      }
      other => panic!("Level encoding must be RLE or BIT_PACKED, got {}", other),
    };
    LevelEncoder { encoding, bit_width, inner }
  }

  pub fn max_buffer_size(encoding: Encoding, max_level: i16, num_values: usize) -> usize {
    let bit_width = bit_util::num_required_bits(max_level as u64);
    match encoding {
      Encoding::RLE => 4 + RleEncoder::max_buffer_size(bit_width, num_values),
      _ => (bit_width as usize * num_values + 7) / 8,
    }
  }

  /// Encodes `levels`, returning how many were actually written (fewer only if
  /// the destination buffer ran out of room).
  pub fn put(&mut self, levels: &[i16]) -> Result<usize> {
    let mut n = 0;
    for &level in levels {
      let ok = match &mut self.inner {
        InternalEncoder::Rle(enc) => enc.put(level as u64)?,
        InternalEncoder::BitPacked { writer, bit_width } => {
          writer.put_value(level as u64, *bit_width as usize)
        }
      };
      if !ok { break; }
      n += 1;
    }
    Ok(n)
  }

  /// Finalizes the stream and returns the encoded bytes (including, for RLE, the
  /// little-endian 4-byte length prefix the DataPage v1 layout requires).
  pub fn consume(self) -> Result<Vec<u8>> {
    match self.inner {
      InternalEncoder::Rle(mut enc) => {
        enc.flush()?;
        let mut buf = enc.consume();
        let payload_len = (buf.len() - 4) as u32;
        buf[0..4].copy_from_slice(&payload_len.to_le_bytes());
        Ok(buf)
      }
      InternalEncoder::BitPacked { writer, .. } => Ok(writer.consume()),
    }
  }

  pub fn encoding(&self) -> Encoding { self.encoding }
}

enum InternalDecoder {
  Rle(RleDecoder),
  BitPacked { reader: BitReader, bit_width: u8 },
}

pub struct LevelDecoder {
  inner: InternalDecoder,
}

impl LevelDecoder {
  pub fn new(encoding: Encoding, max_level: i16) -> Self {
    let bit_width = bit_util::num_required_bits(max_level as u64);
    let inner = match encoding {
      Encoding::RLE => InternalDecoder::Rle(RleDecoder::new(bit_width)),
      Encoding::BIT_PACKED => {
        InternalDecoder::BitPacked { reader: BitReader::new(ByteBufferPtr::new(vec![])), bit_width }
      }
      other => panic!("Level encoding must be RLE or BIT_PACKED, got {}", other),
    };
    LevelDecoder { inner }
  }

  /// Sets the encoded bytes for this page's level stream (the RLE 4-byte length
  /// prefix, if any, must already have been stripped by the caller).
  pub fn set_data(&mut self, data: ByteBufferPtr) {
    match &mut self.inner {
      InternalDecoder::Rle(dec) => dec.set_data(data),
      InternalDecoder::BitPacked { reader, .. } => reader.reset(data),
    }
  }

  pub fn get(&mut self, buffer: &mut [i16]) -> Result<usize> {
    match &mut self.inner {
      InternalDecoder::Rle(dec) => dec.get_batch(buffer),
      InternalDecoder::BitPacked { reader, bit_width } => {
        let mut n = 0;
        for slot in buffer.iter_mut() {
          match reader.get_value::<i16>(*bit_width as usize) {
            Some(v) => { *slot = v; n += 1; }
            None => break,
          }
        }
        Ok(n)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn roundtrip(encoding: Encoding, max_level: i16, levels: &[i16]) -> Vec<i16> {
    let size = LevelEncoder::max_buffer_size(encoding, max_level, levels.len());
    let mut encoder = LevelEncoder::new(encoding, max_level, levels.len(), vec![0; size]);
    let written = encoder.put(levels).unwrap();
    assert_eq!(written, levels.len());
    let bytes = encoder.consume().unwrap();

    let mut decoder = LevelDecoder::new(encoding, max_level);
    let data = if encoding == Encoding::RLE {
      ByteBufferPtr::new(bytes).start_from(4)
    } else {
      ByteBufferPtr::new(bytes)
    };
    decoder.set_data(data);
    let mut out = vec![0i16; levels.len()];
    let n = decoder.get(&mut out).unwrap();
    out.truncate(n);
    out
  }

  #[test]
  fn test_rle_level_roundtrip() {
    let levels = vec![0i16, 1, 1, 0, 1, 1, 1, 0, 0, 0, 1];
    assert_eq!(roundtrip(Encoding::RLE, 1, &levels), levels);
  }

  #[test]
  fn test_bit_packed_level_roundtrip() {
    let levels: Vec<i16> = (0..20).map(|i| i % 3).collect();
    assert_eq!(roundtrip(Encoding::BIT_PACKED, 2, &levels), levels);
  }

  #[test]
  fn test_rle_level_length_prefix() {
    let levels = vec![1i16; 9];
    let size = LevelEncoder::max_buffer_size(Encoding::RLE, 1, levels.len());
    let mut encoder = LevelEncoder::new(Encoding::RLE, 1, levels.len(), vec![0; size]);
    encoder.put(&levels).unwrap();
    let bytes = encoder.consume().unwrap();
    let declared_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    assert_eq!(declared_len, bytes.len() - 4);
  }
}
