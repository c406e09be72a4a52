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

use std::cmp;
use std::marker::PhantomData;
use std::mem;

use crate::basic::Encoding;
use crate::data_type::*;
use crate::errors::Result;
use crate::schema::types::ColumnDescPtr;
use crate::util::bit_util::BitReader;
use crate::util::memory::ByteBufferPtr;

use super::rle_encoding::RleDecoder;

// ----------------------------------------------------------------------
// Decoders

pub trait Decoder<T: DataType> {
  /// Sets the data to decode to be `data`, which should contain `num_values` of values
  /// to decode.
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()>;

  /// Consumes values from this decoder and write the results to `buffer`. This will try
  /// to fill up `buffer`.
  ///
  /// Returns the actual number of values decoded, which should be equal to `buffer.len()`
  /// unless the remaining number of values is less than `buffer.len()`.
  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize>;

  /// Returns the number of values left in this decoder stream.
  fn values_left(&self) -> usize;

  /// Returns the encoding for this decoder.
  fn encoding(&self) -> Encoding;
}

/// Gets a decoder for the column descriptor `descr` and encoding type `encoding`.
///
/// `PLAIN_DICTIONARY`/`RLE_DICTIONARY` are not returned here: a `DictDecoder` needs
/// the column's dictionary page decoded first via `DictDecoder::set_dict`, which the
/// column reader does explicitly.
pub fn get_decoder<T: DataType>(
  descr: ColumnDescPtr,
  encoding: Encoding,
) -> Result<Box<dyn Decoder<T>>> {
  let decoder: Box<dyn Decoder<T>> = match encoding {
    Encoding::PLAIN => Box::new(PlainDecoder::new(descr.type_length())),
    Encoding::RLE_DICTIONARY | Encoding::PLAIN_DICTIONARY => {
      return general_err!("Cannot initialize a dictionary decoder through this function")
    }
    e => return nyi_err!("Encoding {} is not supported.", e),
  };
  Ok(decoder)
}

// ----------------------------------------------------------------------
// PLAIN decoding

pub struct PlainDecoder<T: DataType> {
  // Number of values left to decode.
  num_values: usize,

  // The current starting index in the byte array.
  start: usize,

  // The length for the type `T`. Only used when `T` is `FixedLenByteArrayType`.
  type_length: i32,

  // The byte array to decode from.
  data: Option<ByteBufferPtr>,

  // Read `data` bit by bit. Only set if `T` is `BoolType`.
  bit_reader: Option<BitReader>,

  _phantom: PhantomData<T>,
}

impl<T: DataType> PlainDecoder<T> {
  pub fn new(type_length: i32) -> Self {
    PlainDecoder { data: None, bit_reader: None, type_length, num_values: 0, start: 0,
      _phantom: PhantomData }
  }
}

impl Decoder<BoolType> for PlainDecoder<BoolType> {
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    self.num_values = num_values;
    self.bit_reader = Some(BitReader::new(data));
    Ok(())
  }

  fn get(&mut self, buffer: &mut [bool]) -> Result<usize> {
    let bit_reader = self.bit_reader.as_mut().expect("set_data() must be called first");
    let num_values = cmp::min(buffer.len(), self.num_values);
    for slot in buffer.iter_mut().take(num_values) {
      *slot = match bit_reader.get_value::<bool>(1) {
        Some(v) => v,
        None => return eof_err!("Not enough bytes to decode"),
      };
    }
    self.num_values -= num_values;
    Ok(num_values)
  }

  fn values_left(&self) -> usize { self.num_values }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

macro_rules! plain_decoder_fixed_width {
  ($ty:ty, $rty:ty) => {
    impl Decoder<$ty> for PlainDecoder<$ty> {
      fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
        self.num_values = num_values;
        self.start = 0;
        self.data = Some(data);
        Ok(())
      }

      fn get(&mut self, buffer: &mut [$rty]) -> Result<usize> {
        let data = self.data.as_ref().expect("set_data() must be called first");
        let num_values = cmp::min(buffer.len(), self.num_values);
        let type_size = mem::size_of::<$rty>();
        let bytes_to_decode = type_size * num_values;
        if data.len() < self.start + bytes_to_decode {
          return eof_err!("Not enough bytes to decode");
        }
        let src = data.range(self.start, bytes_to_decode);
        let src = src.as_ref();
        for (i, slot) in buffer.iter_mut().take(num_values).enumerate() {
          let mut raw = [0u8; mem::size_of::<$rty>()];
          raw.copy_from_slice(&src[i * type_size..(i + 1) * type_size]);
          *slot = <$rty>::from_le_bytes(raw);
        }
        self.start += bytes_to_decode;
        self.num_values -= num_values;
        Ok(num_values)
      }

      fn values_left(&self) -> usize { self.num_values }
      fn encoding(&self) -> Encoding { Encoding::PLAIN }
    }
  };
}

plain_decoder_fixed_width!(Int32Type, i32);
plain_decoder_fixed_width!(Int64Type, i64);
plain_decoder_fixed_width!(FloatType, f32);
plain_decoder_fixed_width!(DoubleType, f64);

impl Decoder<Int96Type> for PlainDecoder<Int96Type> {
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    self.num_values = num_values;
    self.start = 0;
    self.data = Some(data);
    Ok(())
  }

  fn get(&mut self, buffer: &mut [Int96]) -> Result<usize> {
    let data = self.data.as_ref().expect("set_data() must be called first");
    let num_values = cmp::min(buffer.len(), self.num_values);
    if data.len() < self.start + 12 * num_values { return eof_err!("Not enough bytes to decode"); }
    for slot in buffer.iter_mut().take(num_values) {
      let word = data.range(self.start, 12);
      let bytes = word.as_ref();
      let e0 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
      let e1 = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
      let e2 = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
      slot.set_data(e0, e1, e2);
      self.start += 12;
    }
    self.num_values -= num_values;
    Ok(num_values)
  }

  fn values_left(&self) -> usize { self.num_values }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

impl Decoder<ByteArrayType> for PlainDecoder<ByteArrayType> {
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    self.num_values = num_values;
    self.start = 0;
    self.data = Some(data);
    Ok(())
  }

  fn get(&mut self, buffer: &mut [ByteArray]) -> Result<usize> {
    let data = self.data.as_ref().expect("set_data() must be called first");
    let num_values = cmp::min(buffer.len(), self.num_values);
    for slot in buffer.iter_mut().take(num_values) {
      if data.len() < self.start + 4 { return eof_err!("Not enough bytes to decode"); }
      let len = read_num_bytes!(u32, 4, data.range(self.start, 4).as_ref()) as usize;
      self.start += 4;
      if data.len() < self.start + len { return eof_err!("Not enough bytes to decode"); }
      slot.set_data(data.range(self.start, len));
      self.start += len;
    }
    self.num_values -= num_values;
    Ok(num_values)
  }

  fn values_left(&self) -> usize { self.num_values }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

impl Decoder<FixedLenByteArrayType> for PlainDecoder<FixedLenByteArrayType> {
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    self.num_values = num_values;
    self.start = 0;
    self.data = Some(data);
    Ok(())
  }

  fn get(&mut self, buffer: &mut [ByteArray]) -> Result<usize> {
    let data = self.data.as_ref().expect("set_data() must be called first");
    assert!(self.type_length > 0, "FIXED_LEN_BYTE_ARRAY requires a positive type_length");
    let type_length = self.type_length as usize;
    let num_values = cmp::min(buffer.len(), self.num_values);
    for slot in buffer.iter_mut().take(num_values) {
      if data.len() < self.start + type_length { return eof_err!("Not enough bytes to decode"); }
      slot.set_data(data.range(self.start, type_length));
      self.start += type_length;
    }
    self.num_values -= num_values;
    Ok(num_values)
  }

  fn values_left(&self) -> usize { self.num_values }
  fn encoding(&self) -> Encoding { Encoding::PLAIN }
}

// ----------------------------------------------------------------------
// RLE_DICTIONARY / PLAIN_DICTIONARY decoding

pub struct DictDecoder<T: DataType> {
  // The dictionary, which maps ids to the values. Shared (not cloned) across
  // every data page in the same chunk, since a chunk has at most one dictionary.
  dictionary: std::rc::Rc<Vec<T::T>>,

  has_dictionary: bool,

  rle_decoder: Option<RleDecoder>,

  num_values: usize,
}

impl<T: DataType> DictDecoder<T> {
  pub fn new() -> Self {
    Self { dictionary: std::rc::Rc::new(vec![]), has_dictionary: false, rle_decoder: None, num_values: 0 }
  }

  /// Builds a decoder sharing an already-decoded dictionary (O(1), no copy).
  pub fn from_shared_dict(dictionary: std::rc::Rc<Vec<T::T>>) -> Self {
    Self { dictionary, has_dictionary: true, rle_decoder: None, num_values: 0 }
  }

  /// Decodes the dictionary page itself (PLAIN-encoded) via `decoder`, retaining the
  /// result as this column chunk's index table.
  pub fn set_dict(&mut self, mut decoder: Box<dyn Decoder<T>>) -> Result<()> {
    let num_values = decoder.values_left();
    let mut values = vec![T::T::default(); num_values];
    decoder.get(&mut values)?;
    self.dictionary = std::rc::Rc::new(values);
    self.has_dictionary = true;
    Ok(())
  }

  /// The decoded dictionary, shareable with sibling decoders for later pages in
  /// the same chunk.
  pub fn dictionary(&self) -> std::rc::Rc<Vec<T::T>> { self.dictionary.clone() }
}

impl<T: DataType> Default for DictDecoder<T> {
  fn default() -> Self { Self::new() }
}

impl<T: DataType> Decoder<T> for DictDecoder<T> {
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    if data.is_empty() {
      return corrupt_data_err!("Dictionary-indices page is empty");
    }
    // First byte in `data` is the bit width used for the index stream.
    let bit_width = data.as_ref()[0];
    let mut rle_decoder = RleDecoder::new(bit_width);
    rle_decoder.set_data(data.start_from(1));
    self.num_values = num_values;
    self.rle_decoder = Some(rle_decoder);
    Ok(())
  }

  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    if !self.has_dictionary {
      return corrupt_data_err!("RLE_DICTIONARY encoding used without a dictionary page");
    }
    let rle = self.rle_decoder.as_mut().expect("set_data() must be called first");
    let num_values = cmp::min(buffer.len(), self.num_values);
    let read = rle.get_batch_with_dict(&self.dictionary[..], buffer, num_values)?;
    self.num_values -= read;
    Ok(read)
  }

  fn values_left(&self) -> usize { self.num_values }
  fn encoding(&self) -> Encoding { Encoding::RLE_DICTIONARY }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn byte_array_of(s: &str) -> ByteArray { ByteArray::from(s) }

  fn encode_plain_i32(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
  }

  #[test]
  fn test_plain_decode_int32() {
    let data = vec![42, 18, 52];
    let bytes = encode_plain_i32(&data);
    let mut decoder: PlainDecoder<Int32Type> = PlainDecoder::new(-1);
    decoder.set_data(ByteBufferPtr::new(bytes), 3).unwrap();
    let mut buffer = vec![0; 3];
    assert_eq!(decoder.get(&mut buffer).unwrap(), 3);
    assert_eq!(buffer, data);
    assert_eq!(decoder.values_left(), 0);
  }

  #[test]
  fn test_plain_decode_bool() {
    let data = vec![true, false, true, true, false, false, true, false, true, true];
    let mut bytes = vec![0u8; 2];
    for (i, v) in data.iter().enumerate() {
      if *v { bytes[i / 8] |= 1 << (i % 8); }
    }
    let mut decoder: PlainDecoder<BoolType> = PlainDecoder::new(-1);
    decoder.set_data(ByteBufferPtr::new(bytes), data.len()).unwrap();
    let mut buffer = vec![false; data.len()];
    assert_eq!(decoder.get(&mut buffer).unwrap(), data.len());
    assert_eq!(buffer, data);
  }

  #[test]
  fn test_plain_decode_byte_array() {
    let mut bytes = vec![];
    for s in &["hello", "parquet"] {
      bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
      bytes.extend_from_slice(s.as_bytes());
    }
    let mut decoder: PlainDecoder<ByteArrayType> = PlainDecoder::new(-1);
    decoder.set_data(ByteBufferPtr::new(bytes), 2).unwrap();
    let mut buffer = vec![ByteArray::new(), ByteArray::new()];
    assert_eq!(decoder.get(&mut buffer).unwrap(), 2);
    assert_eq!(buffer, vec![byte_array_of("hello"), byte_array_of("parquet")]);
  }

  #[test]
  fn test_plain_decode_fixed_len_byte_array() {
    let bytes: Vec<u8> = b"birdcomeflow".to_vec();
    let mut decoder: PlainDecoder<FixedLenByteArrayType> = PlainDecoder::new(4);
    decoder.set_data(ByteBufferPtr::new(bytes), 3).unwrap();
    let mut buffer = vec![ByteArray::new(), ByteArray::new(), ByteArray::new()];
    assert_eq!(decoder.get(&mut buffer).unwrap(), 3);
    assert_eq!(buffer[0].data(), b"bird");
    assert_eq!(buffer[1].data(), b"come");
    assert_eq!(buffer[2].data(), b"flow");
  }

  #[test]
  fn test_dict_decode_requires_dictionary() {
    let mut decoder: DictDecoder<Int32Type> = DictDecoder::new();
    let err = decoder.set_data(ByteBufferPtr::new(vec![2, 0b00000101]), 1)
      .and_then(|_| decoder.get(&mut [0i32]));
    assert!(err.is_err());
  }
}
