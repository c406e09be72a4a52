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

//! Encoders for the value encodings this reader needs to be able to *produce*,
//! which in a read-only library means exactly one place: building page fixtures
//! for the column-reader tests. `PlainEncoder` and `DictEncoder` mirror the wire
//! formats `decoding.rs` consumes.

use std::collections::HashMap;
use std::io::Write;

use crate::basic::Encoding;
use crate::data_type::*;
use crate::errors::Result;
use crate::util::bit_util;
use crate::util::memory::ByteBuffer;

use super::rle_encoding::RleEncoder;

pub trait Encoder<T: DataType> {
  fn put(&mut self, values: &[T::T]) -> Result<()>;

  /// Finalizes the stream and returns the encoded bytes.
  fn flush_buffer(&mut self) -> Result<Vec<u8>>;

  fn encoding(&self) -> Encoding;
}

// ----------------------------------------------------------------------
// PLAIN encoding

pub struct PlainEncoder<T: DataType> {
  buffer: ByteBuffer,
  _phantom: std::marker::PhantomData<T>,
}

impl<T: DataType> PlainEncoder<T> {
  pub fn new() -> Self { PlainEncoder { buffer: ByteBuffer::new(), _phantom: std::marker::PhantomData } }
}

impl<T: DataType> Default for PlainEncoder<T> {
  fn default() -> Self { Self::new() }
}

impl Encoder<BoolType> for PlainEncoder<BoolType> {
  fn put(&mut self, values: &[bool]) -> Result<()> {
    let mut packed = vec![0u8; (values.len() + 7) / 8];
    for (i, v) in values.iter().enumerate() {
      if *v { bit_util::set_array_bit(&mut packed, i); }
    }
    self.buffer.write_all(&packed).unwrap();
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<Vec<u8>> { Ok(self.buffer.consume().as_ref().to_vec()) }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

macro_rules! plain_encoder_fixed_width {
  ($ty:ty, $rty:ty) => {
    impl Encoder<$ty> for PlainEncoder<$ty> {
      fn put(&mut self, values: &[$rty]) -> Result<()> {
        for v in values {
          self.buffer.write_all(&v.to_le_bytes()).unwrap();
        }
        Ok(())
      }

      fn flush_buffer(&mut self) -> Result<Vec<u8>> { Ok(self.buffer.consume().as_ref().to_vec()) }
      fn encoding(&self) -> Encoding { Encoding::PLAIN }
    }
  };
}

plain_encoder_fixed_width!(Int32Type, i32);
plain_encoder_fixed_width!(Int64Type, i64);
plain_encoder_fixed_width!(FloatType, f32);
plain_encoder_fixed_width!(DoubleType, f64);

impl Encoder<Int96Type> for PlainEncoder<Int96Type> {
  fn put(&mut self, values: &[Int96]) -> Result<()> {
    for v in values {
      for word in v.data() { self.buffer.write_all(&word.to_le_bytes()).unwrap(); }
    }
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<Vec<u8>> { Ok(self.buffer.consume().as_ref().to_vec()) }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

impl Encoder<ByteArrayType> for PlainEncoder<ByteArrayType> {
  fn put(&mut self, values: &[ByteArray]) -> Result<()> {
    for v in values {
      self.buffer.write_all(&(v.len() as u32).to_le_bytes()).unwrap();
      self.buffer.write_all(v.data()).unwrap();
    }
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<Vec<u8>> { Ok(self.buffer.consume().as_ref().to_vec()) }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

impl Encoder<FixedLenByteArrayType> for PlainEncoder<FixedLenByteArrayType> {
  fn put(&mut self, values: &[ByteArray]) -> Result<()> {
    for v in values { self.buffer.write_all(v.data()).unwrap(); }
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<Vec<u8>> { Ok(self.buffer.consume().as_ref().to_vec()) }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

// ----------------------------------------------------------------------
// RLE_DICTIONARY encoding

/// Builds a chunk's dictionary page (in encounter order) and the RLE-encoded
/// index stream a `DictDecoder` expects (one leading bit-width byte, then the
/// hybrid run stream).
pub struct DictEncoder<T: DataType> {
  uniques: Vec<T::T>,
  index_of: HashMap<String, u32>,
  indices: Vec<u32>,
  _phantom: std::marker::PhantomData<T>,
}

impl<T: DataType> DictEncoder<T> {
  pub fn new() -> Self {
    DictEncoder { uniques: Vec::new(), index_of: HashMap::new(), indices: Vec::new(),
      _phantom: std::marker::PhantomData }
  }

  pub fn put(&mut self, values: &[T::T]) -> Result<()> {
    for v in values {
      let key = format!("{:?}", v);
      let idx = *self.index_of.entry(key).or_insert_with(|| {
        self.uniques.push(v.clone());
        (self.uniques.len() - 1) as u32
      });
      self.indices.push(idx);
    }
    Ok(())
  }

  pub fn num_entries(&self) -> usize { self.uniques.len() }

  /// The dictionary page payload: the unique values, PLAIN-encoded, in first
  /// -seen order.
  pub fn write_dict(&self) -> Result<Vec<u8>>
  where
    PlainEncoder<T>: Encoder<T>,
  {
    let mut encoder: PlainEncoder<T> = PlainEncoder::new();
    encoder.put(&self.uniques)?;
    encoder.flush_buffer()
  }

  /// The index-stream page payload: a leading bit-width byte followed by the
  /// RLE/bit-packed hybrid encoding of `self.indices`.
  pub fn write_indices(&self) -> Result<Vec<u8>> {
    let bit_width = bit_util::num_required_bits((self.uniques.len().max(1) - 1) as u64).max(1);
    let size = 1 + RleEncoder::max_buffer_size(bit_width, self.indices.len());
    let mut rle = RleEncoder::new_from_buf(bit_width, vec![0; size], 1);
    for &idx in &self.indices { rle.put(idx as u64)?; }
    rle.flush()?;
    let mut buf = rle.consume();
    buf[0] = bit_width;
    Ok(buf)
  }
}

impl<T: DataType> Default for DictEncoder<T> {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::encodings::decoding::{Decoder, DictDecoder, PlainDecoder};
  use crate::util::memory::ByteBufferPtr;

  #[test]
  fn test_plain_encode_decode_int32() {
    let values = vec![1, 2, 3, -4, 5];
    let mut encoder: PlainEncoder<Int32Type> = PlainEncoder::new();
    encoder.put(&values).unwrap();
    let bytes = encoder.flush_buffer().unwrap();

    let mut decoder: PlainDecoder<Int32Type> = PlainDecoder::new(-1);
    decoder.set_data(ByteBufferPtr::new(bytes), values.len()).unwrap();
    let mut out = vec![0; values.len()];
    decoder.get(&mut out).unwrap();
    assert_eq!(out, values);
  }

  #[test]
  fn test_dict_encode_decode_round_trip() {
    let values = vec![10, 20, 10, 30, 20, 10];
    let mut dict: DictEncoder<Int32Type> = DictEncoder::new();
    dict.put(&values).unwrap();
    let dict_bytes = dict.write_dict().unwrap();
    let index_bytes = dict.write_indices().unwrap();

    let mut dict_page_decoder: PlainDecoder<Int32Type> = PlainDecoder::new(-1);
    dict_page_decoder.set_data(ByteBufferPtr::new(dict_bytes), dict.num_entries()).unwrap();

    let mut decoder: DictDecoder<Int32Type> = DictDecoder::new();
    decoder.set_dict(Box::new(dict_page_decoder)).unwrap();
    decoder.set_data(ByteBufferPtr::new(index_bytes), values.len()).unwrap();
    let mut out = vec![0; values.len()];
    decoder.get(&mut out).unwrap();
    assert_eq!(out, values);
  }
}
