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

//! Parquet's hybrid RLE / bit-packed run encoding. Used for definition/repetition
//! levels and for dictionary indices.
//!
//! A stream is a sequence of runs, each preceded by a ULEB128 header `h`:
//! - `h & 1 == 0`: a repeated run of `h >> 1` copies of one `bit_width`-wide value.
//! - `h & 1 == 1`: a bit-packed run of `(h >> 1) * 8` values packed at `bit_width`
//!   bits each, LSB-first.

use std::cmp;
use std::mem;

use crate::errors::Result;
use crate::util::bit_util::{BitPackable, BitReader, BitWriter};
use crate::util::memory::ByteBufferPtr;

/// Number of values grouped per bit-packed "8-group" when encoding; matches the
/// `(h >> 1) * 8` relationship from the format.
const VALUES_PER_GROUP: usize = 8;

pub struct RleEncoder {
  bit_width: u8,
  buffer: Vec<u8>,
  start_offset: usize,
  cur_offset: usize,

  // Buffered values not yet flushed as a run.
  buffered_values: [u64; VALUES_PER_GROUP],
  num_buffered_values: usize,

  // State for a repeated run in progress.
  current_value: u64,
  repeat_count: usize,

  // Byte position in `buffer` reserved for a bit-packed run's ULEB128 header
  // (written retroactively once the run's length is known).
  bit_packed_header_pos: Option<usize>,
  // Number of 8-value groups written into the current bit-packed run so far.
  bit_packed_num_groups: usize,
}

impl RleEncoder {
  pub fn new(bit_width: u8, buffer_len: usize) -> Self {
    Self::new_from_buf(bit_width, vec![0; buffer_len], 0)
  }

  /// Creates an encoder writing into `buffer` starting at `start`. The first
  /// `start` bytes of `buffer` are reserved for a caller-written length prefix.
  pub fn new_from_buf(bit_width: u8, buffer: Vec<u8>, start: usize) -> Self {
    RleEncoder {
      bit_width,
      buffer,
      start_offset: start,
      cur_offset: start,
      buffered_values: [0; VALUES_PER_GROUP],
      num_buffered_values: 0,
      current_value: 0,
      repeat_count: 0,
      bit_packed_header_pos: None,
      bit_packed_num_groups: 0,
    }
  }

  pub fn min_buffer_size(bit_width: u8) -> usize {
    // One ULEB128 header byte (worst case bit_width needs 2) plus one aligned value.
    2 + ((bit_width as usize + 7) / 8)
  }

  pub fn max_buffer_size(bit_width: u8, num_values: usize) -> usize {
    let bytes_per_run = (bit_width as usize * VALUES_PER_GROUP + 7) / 8;
    let num_groups = (num_values + VALUES_PER_GROUP - 1) / VALUES_PER_GROUP;
    num_groups * (bytes_per_run + 1) + 8
  }

  pub fn len(&self) -> usize { self.cur_offset - self.start_offset }

  /// Buffers `value` (`bit_width` bits of it). Returns `false` if the destination
  /// buffer has no room left for this value.
  pub fn put(&mut self, value: u64) -> Result<bool> {
    if self.repeat_count == 0 && self.num_buffered_values == 0 {
      self.current_value = value;
      self.repeat_count = 1;
    } else if self.repeat_count > 0 {
      if value == self.current_value {
        self.repeat_count += 1;
      } else {
        if self.repeat_count >= VALUES_PER_GROUP {
          if !self.flush_repeated_run() { return Ok(false); }
        } else {
          for _ in 0..self.repeat_count {
            self.buffered_values[self.num_buffered_values] = self.current_value;
            self.num_buffered_values += 1;
          }
          self.repeat_count = 0;
        }
        self.current_value = value;
        self.repeat_count = 1;
      }
    } else {
      self.buffered_values[self.num_buffered_values] = value;
      self.num_buffered_values += 1;
      if self.num_buffered_values == VALUES_PER_GROUP {
        if !self.flush_bit_packed_group() { return Ok(false); }
      }
    }
    Ok(true)
  }

  fn flush_repeated_run(&mut self) -> bool {
    let header = (self.repeat_count << 1) as u64;
    if !self.write_vlq(header) { return false; }
    let num_bytes = (self.bit_width as usize + 7) / 8;
    if self.cur_offset + num_bytes > self.buffer.len() { return false; }
    let bytes = (self.current_value as u64).to_le_bytes();
    self.buffer[self.cur_offset..self.cur_offset + num_bytes]
      .copy_from_slice(&bytes[..num_bytes]);
    self.cur_offset += num_bytes;
    self.repeat_count = 0;
    true
  }

  fn flush_bit_packed_group(&mut self) -> bool {
    if self.bit_packed_header_pos.is_none() {
      // Reserve space for the header; it's filled in once we know how many
      // groups this bit-packed run spans.
      self.bit_packed_header_pos = Some(self.cur_offset);
      self.cur_offset += 1;
      self.bit_packed_num_groups = 0;
    }
    let bytes_needed = (self.bit_width as usize * VALUES_PER_GROUP + 7) / 8;
    if self.cur_offset + bytes_needed > self.buffer.len() { return false; }

    let mut writer = BitWriter::new_from_buf(mem::take(&mut self.buffer), self.cur_offset);
    for v in &self.buffered_values {
      writer.put_value(*v, self.bit_width as usize);
    }
    writer.flush();
    self.cur_offset = writer.byte_offset();
    self.buffer = writer.buffer().to_vec();

    self.num_buffered_values = 0;
    self.bit_packed_num_groups += 1;
    true
  }

  fn write_vlq(&mut self, mut value: u64) -> bool {
    loop {
      if self.cur_offset >= self.buffer.len() { return false; }
      let mut byte = (value & 0x7F) as u8;
      value >>= 7;
      if value != 0 { byte |= 0x80; }
      self.buffer[self.cur_offset] = byte;
      self.cur_offset += 1;
      if value == 0 { break; }
    }
    true
  }

  fn close_bit_packed_run(&mut self) {
    if let Some(pos) = self.bit_packed_header_pos.take() {
      let header = ((self.bit_packed_num_groups << 1) | 1) as u8;
      self.buffer[pos] = header;
      self.bit_packed_num_groups = 0;
    }
  }

  /// Flushes any buffered-but-not-yet-emitted run. Safe to call repeatedly.
  pub fn flush(&mut self) -> Result<()> {
    if self.repeat_count >= VALUES_PER_GROUP {
      self.flush_repeated_run();
    } else if self.num_buffered_values > 0 {
      // Pad the final partial group with the last repeated value (0 if none seen).
      let pad = if self.repeat_count > 0 { self.current_value } else { 0 };
      for _ in self.num_buffered_values..VALUES_PER_GROUP {
        self.buffered_values[self.num_buffered_values] = pad;
        self.num_buffered_values += 1;
      }
      self.num_buffered_values = VALUES_PER_GROUP;
      self.flush_bit_packed_group();
    } else if self.repeat_count > 0 {
      for _ in 0..self.repeat_count {
        self.buffered_values[self.num_buffered_values] = self.current_value;
        self.num_buffered_values += 1;
      }
      self.repeat_count = 0;
      let pad_from = self.num_buffered_values;
      for i in pad_from..VALUES_PER_GROUP {
        self.buffered_values[i] = self.current_value;
      }
      self.num_buffered_values = VALUES_PER_GROUP;
      self.flush_bit_packed_group();
    }
    self.close_bit_packed_run();
    Ok(())
  }

  pub fn consume(mut self) -> Vec<u8> {
    self.buffer.truncate(self.cur_offset);
    self.buffer
  }
}

pub struct RleDecoder {
  bit_width: u8,
  bit_reader: BitReader,

  // Remaining values in the run currently being consumed.
  rle_left: usize,
  rle_value: u64,
  bit_packed_left: usize,
}

impl RleDecoder {
  pub fn new(bit_width: u8) -> Self {
    RleDecoder {
      bit_width,
      bit_reader: BitReader::from(vec![]),
      rle_left: 0,
      rle_value: 0,
      bit_packed_left: 0,
    }
  }

  pub fn set_data(&mut self, data: ByteBufferPtr) {
    self.bit_reader.reset(data);
    self.rle_left = 0;
    self.bit_packed_left = 0;
  }

  fn read_header(&mut self) -> bool {
    match self.bit_reader.get_vlq_int() {
      Some(header) => {
        if header & 1 == 0 {
          self.rle_left = (header >> 1) as usize;
          let num_bytes = (self.bit_width as usize + 7) / 8;
          self.rle_value = self.bit_reader.get_aligned::<u64>(num_bytes).unwrap_or(0);
        } else {
          self.bit_packed_left = ((header >> 1) as usize) * VALUES_PER_GROUP;
        }
        true
      }
      None => false,
    }
  }

  /// Decodes up to `buffer.len()` values into `buffer`, returning how many were
  /// actually produced (fewer only once the stream is exhausted).
  pub fn get_batch<T: BitPackable>(&mut self, buffer: &mut [T]) -> Result<usize> {
    let mut n = 0;
    while n < buffer.len() {
      if self.rle_left == 0 && self.bit_packed_left == 0 {
        if !self.read_header() { break; }
      }
      if self.rle_left > 0 {
        let batch = cmp::min(self.rle_left, buffer.len() - n);
        for i in 0..batch {
          buffer[n + i] = T::from_u64(self.rle_value);
        }
        n += batch;
        self.rle_left -= batch;
      } else if self.bit_packed_left > 0 {
        let batch = cmp::min(self.bit_packed_left, buffer.len() - n);
        for i in 0..batch {
          match self.bit_reader.get_value::<u64>(self.bit_width as usize) {
            Some(v) => buffer[n + i] = T::from_u64(v),
            None => { self.bit_packed_left = 0; return Ok(n + i); }
          }
        }
        n += batch;
        self.bit_packed_left -= batch;
      }
    }
    Ok(n)
  }

  /// Like `get_batch`, but resolves each decoded index into `dict[index]` rather
  /// than returning the raw index. `CorruptData` if an index is out of range.
  pub fn get_batch_with_dict<T: Clone>(
    &mut self, dict: &[T], buffer: &mut [T], max_values: usize
  ) -> Result<usize> {
    let mut indices = vec![0u32; cmp::min(buffer.len(), max_values)];
    let n = self.get_batch(&mut indices)?;
    for i in 0..n {
      let idx = indices[i] as usize;
      if idx >= dict.len() {
        return corrupt_data_err!(
          "Dictionary index {} out of range (dictionary has {} entries)", idx, dict.len());
      }
      buffer[i] = dict[idx].clone();
    }
    Ok(n)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn roundtrip(bit_width: u8, values: &[u64]) -> Vec<u64> {
    let size = RleEncoder::max_buffer_size(bit_width, values.len());
    let mut encoder = RleEncoder::new(bit_width, size);
    for v in values { assert!(encoder.put(*v).unwrap()); }
    encoder.flush().unwrap();
    let bytes = encoder.consume();

    let mut decoder = RleDecoder::new(bit_width);
    decoder.set_data(ByteBufferPtr::new(bytes));
    let mut out = vec![0u64; values.len()];
    let n = decoder.get_batch(&mut out).unwrap();
    out.truncate(n);
    out
  }

  #[test]
  fn test_rle_repeated_run() {
    let values = vec![5u64; 20];
    assert_eq!(roundtrip(3, &values), values);
  }

  #[test]
  fn test_rle_bit_packed_run() {
    let values: Vec<u64> = (0..16).map(|i| i % 4).collect();
    assert_eq!(roundtrip(2, &values), values);
  }

  #[test]
  fn test_rle_mixed_runs() {
    let mut values = vec![1u64; 10];
    values.extend((0..16).map(|i| i % 3));
    values.extend(vec![7u64; 4]);
    assert_eq!(roundtrip(3, &values), values);
  }

  #[test]
  fn test_rle_dict_out_of_range() {
    let dict = vec![10i32, 20, 30];
    let size = RleEncoder::max_buffer_size(2, 1);
    let mut encoder = RleEncoder::new(2, size);
    encoder.put(3).unwrap();
    encoder.flush().unwrap();
    let bytes = encoder.consume();

    let mut decoder = RleDecoder::new(2);
    decoder.set_data(ByteBufferPtr::new(bytes));
    let mut out = vec![0i32; 1];
    let err = decoder.get_batch_with_dict(&dict, &mut out, 1);
    assert!(err.is_err());
  }
}
