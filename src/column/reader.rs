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

//! C4: streams a column chunk's page sequence into a flat value buffer plus its
//! parallel definition/repetition-level streams.

use std::mem;

use crate::basic::Encoding;
use crate::data_type::*;
use crate::encodings::decoding::{get_decoder, Decoder, DictDecoder, PlainDecoder};
use crate::encodings::levels::LevelDecoder;
use crate::errors::Result;
use crate::schema::types::ColumnDescPtr;

use super::page::{Page, PageReader};

/// Dispatches to a concrete `ColumnReaderImpl<T>` without the caller needing to
/// know the leaf's physical type ahead of time. Downcasting out of this enum uses
/// `get_typed_column_reader`, which trusts the caller to request the variant that
/// matches; see its doc comment.
pub enum ColumnReader {
  BoolColumnReader(ColumnReaderImpl<BoolType>),
  Int32ColumnReader(ColumnReaderImpl<Int32Type>),
  Int64ColumnReader(ColumnReaderImpl<Int64Type>),
  Int96ColumnReader(ColumnReaderImpl<Int96Type>),
  FloatColumnReader(ColumnReaderImpl<FloatType>),
  DoubleColumnReader(ColumnReaderImpl<DoubleType>),
  ByteArrayColumnReader(ColumnReaderImpl<ByteArrayType>),
  FixedLenByteArrayColumnReader(ColumnReaderImpl<FixedLenByteArrayType>),
}

pub fn get_column_reader(descr: ColumnDescPtr, page_reader: Box<dyn PageReader>) -> ColumnReader {
  match descr.physical_type() {
    crate::basic::Type::BOOLEAN => ColumnReader::BoolColumnReader(ColumnReaderImpl::new(descr, page_reader)),
    crate::basic::Type::INT32 => ColumnReader::Int32ColumnReader(ColumnReaderImpl::new(descr, page_reader)),
    crate::basic::Type::INT64 => ColumnReader::Int64ColumnReader(ColumnReaderImpl::new(descr, page_reader)),
    crate::basic::Type::INT96 => ColumnReader::Int96ColumnReader(ColumnReaderImpl::new(descr, page_reader)),
    crate::basic::Type::FLOAT => ColumnReader::FloatColumnReader(ColumnReaderImpl::new(descr, page_reader)),
    crate::basic::Type::DOUBLE => ColumnReader::DoubleColumnReader(ColumnReaderImpl::new(descr, page_reader)),
    crate::basic::Type::BYTE_ARRAY => ColumnReader::ByteArrayColumnReader(ColumnReaderImpl::new(descr, page_reader)),
    crate::basic::Type::FIXED_LEN_BYTE_ARRAY =>
      ColumnReader::FixedLenByteArrayColumnReader(ColumnReaderImpl::new(descr, page_reader)),
  }
}

/// Unwraps a `ColumnReader` into the `ColumnReaderImpl<T>` its variant was built
/// from. `T` must match the variant the caller received from `get_column_reader`
/// (which is always true when `T` is chosen from `descr.physical_type()`, as every
/// caller in this crate does) — the transmute only changes the static type of an
/// already-correct value, it does not reinterpret bytes of a different shape.
pub fn get_typed_column_reader<T: DataType>(r: ColumnReader) -> ColumnReaderImpl<T> {
  match r {
    ColumnReader::BoolColumnReader(r) => unsafe { mem::transmute(r) },
    ColumnReader::Int32ColumnReader(r) => unsafe { mem::transmute(r) },
    ColumnReader::Int64ColumnReader(r) => unsafe { mem::transmute(r) },
    ColumnReader::Int96ColumnReader(r) => unsafe { mem::transmute(r) },
    ColumnReader::FloatColumnReader(r) => unsafe { mem::transmute(r) },
    ColumnReader::DoubleColumnReader(r) => unsafe { mem::transmute(r) },
    ColumnReader::ByteArrayColumnReader(r) => unsafe { mem::transmute(r) },
    ColumnReader::FixedLenByteArrayColumnReader(r) => unsafe { mem::transmute(r) },
  }
}

/// One decoded batch: values (present-only, in order) plus optional parallel
/// definition/repetition-level streams (one entry per logical slot, present or
/// not) and the number of non-null, top-level records those slots span.
pub struct ColumnReaderImpl<T: DataType>
where
  PlainDecoder<T>: Decoder<T>,
{
  descr: ColumnDescPtr,
  page_reader: Box<dyn PageReader>,

  def_level_decoder: Option<LevelDecoder>,
  rep_level_decoder: Option<LevelDecoder>,
  current_decoder: Option<Box<dyn Decoder<T>>>,
  // Set once, from this chunk's (at most one) dictionary page; shared cheaply
  // with a fresh `DictDecoder` for every RLE_DICTIONARY-encoded data page.
  dictionary: Option<std::rc::Rc<Vec<T::T>>>,

  // Values remaining in the page currently being consumed.
  num_buffered_values: usize,
  num_decoded_values: usize,
}

impl<T: DataType> ColumnReaderImpl<T>
where
  PlainDecoder<T>: Decoder<T>,
{
  pub fn new(descr: ColumnDescPtr, page_reader: Box<dyn PageReader>) -> Self {
    ColumnReaderImpl {
      descr,
      page_reader,
      def_level_decoder: None,
      rep_level_decoder: None,
      current_decoder: None,
      dictionary: None,
      num_buffered_values: 0,
      num_decoded_values: 0,
    }
  }

  /// Decodes up to `batch_size` logical slots (present or null) into the three
  /// output buffers, advancing across page boundaries as needed. Returns
  /// `(values_written, levels_written)`: `levels_written` is the number of
  /// logical slots produced (== `values_written` when `max_def_level == 0`,
  /// i.e. the column has no optional/repeated ancestor).
  pub fn read_batch(
    &mut self,
    batch_size: usize,
    mut def_levels: Option<&mut Vec<i16>>,
    mut rep_levels: Option<&mut Vec<i16>>,
    values: &mut Vec<T::T>,
  ) -> Result<(usize, usize)> {
    let mut total_levels_read = 0;
    let mut total_values_read = 0;

    while total_levels_read < batch_size {
      if self.num_buffered_values == self.num_decoded_values {
        if !self.read_new_page()? { break; }
      }
      let remaining_levels = self.num_buffered_values - self.num_decoded_values;
      let want = (batch_size - total_levels_read).min(remaining_levels.max(1));

      let mut def_buf = vec![0i16; want];
      let mut rep_buf = vec![0i16; want];
      let levels_read = self.read_rep_levels(&mut rep_buf)?.max(self.read_def_levels(&mut def_buf)?);
      let levels_read = if self.descr.max_def_level() == 0 && self.descr.max_rep_level() == 0 {
        want
      } else {
        levels_read
      };

      let max_def_level = self.descr.max_def_level();
      let num_present = if self.def_level_decoder.is_some() {
        def_buf[..levels_read].iter().filter(|&&d| d == max_def_level).count()
      } else {
        levels_read
      };

      let mut value_buf = vec![T::T::default(); num_present];
      let values_read = self.read_values(&mut value_buf)?;
      values.extend_from_slice(&value_buf[..values_read]);

      if let Some(ref mut out) = def_levels {
        out.extend_from_slice(&def_buf[..levels_read]);
      }
      if let Some(ref mut out) = rep_levels {
        out.extend_from_slice(&rep_buf[..levels_read]);
      }

      self.num_decoded_values += levels_read;
      total_levels_read += levels_read;
      total_values_read += values_read;
    }

    Ok((total_values_read, total_levels_read))
  }

  fn read_rep_levels(&mut self, buffer: &mut [i16]) -> Result<usize> {
    match &mut self.rep_level_decoder {
      Some(decoder) => decoder.get(buffer),
      None => Ok(buffer.len()),
    }
  }

  fn read_def_levels(&mut self, buffer: &mut [i16]) -> Result<usize> {
    match &mut self.def_level_decoder {
      Some(decoder) => decoder.get(buffer),
      None => {
        for slot in buffer.iter_mut() { *slot = self.descr.max_def_level(); }
        Ok(buffer.len())
      }
    }
  }

  fn read_values(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    match &mut self.current_decoder {
      Some(decoder) => decoder.get(buffer),
      None => general_err!("read_values() called before a page was loaded"),
    }
  }

  fn read_new_page(&mut self) -> Result<bool> {
    loop {
      match self.page_reader.get_next_page()? {
        None => return Ok(false),
        Some(Page::DictionaryPage { buf, num_values, encoding, .. }) => {
          match encoding {
            Encoding::PLAIN | Encoding::PLAIN_DICTIONARY => {}
            other => return nyi_err!("Dictionary page encoding {} is not supported", other),
          };
          let mut decoder: PlainDecoder<T> = PlainDecoder::new(self.descr.type_length());
          decoder.set_data(buf, num_values as usize)?;
          let mut dict_decoder: DictDecoder<T> = DictDecoder::new();
          dict_decoder.set_dict(Box::new(decoder))?;
          self.dictionary = Some(dict_decoder.dictionary());
        }
        Some(Page::DataPage { buf, num_values, encoding, def_level_encoding, rep_level_encoding, .. }) => {
          self.num_buffered_values = num_values as usize;
          self.num_decoded_values = 0;

          let mut offset = 0;
          if self.descr.max_rep_level() > 0 {
            let len = read_u32_le(buf.as_ref(), offset)? as usize;
            offset += 4;
            let mut decoder = LevelDecoder::new(rep_level_encoding, self.descr.max_rep_level());
            decoder.set_data(buf.range(offset, len));
            self.rep_level_decoder = Some(decoder);
            offset += len;
          } else {
            self.rep_level_decoder = None;
          }

          if self.descr.max_def_level() > 0 {
            let len = read_u32_le(buf.as_ref(), offset)? as usize;
            offset += 4;
            let mut decoder = LevelDecoder::new(def_level_encoding, self.descr.max_def_level());
            decoder.set_data(buf.range(offset, len));
            self.def_level_decoder = Some(decoder);
            offset += len;
          } else {
            self.def_level_decoder = None;
          }

          self.current_decoder = Some(self.configure_value_decoder(encoding, buf.start_from(offset))?);
          return Ok(true);
        }
        Some(Page::DataPageV2 {
          buf, num_values, num_nulls, encoding,
          def_levels_byte_len, rep_levels_byte_len, ..
        }) => {
          self.num_buffered_values = num_values as usize;
          self.num_decoded_values = 0;
          let _ = num_nulls;

          let mut offset = 0;
          if self.descr.max_rep_level() > 0 {
            let len = rep_levels_byte_len as usize;
            let mut decoder = LevelDecoder::new(Encoding::RLE, self.descr.max_rep_level());
            decoder.set_data(buf.range(offset, len));
            self.rep_level_decoder = Some(decoder);
            offset += len;
          } else {
            self.rep_level_decoder = None;
          }
          if self.descr.max_def_level() > 0 {
            let len = def_levels_byte_len as usize;
            let mut decoder = LevelDecoder::new(Encoding::RLE, self.descr.max_def_level());
            decoder.set_data(buf.range(offset, len));
            self.def_level_decoder = Some(decoder);
            offset += len;
          } else {
            self.def_level_decoder = None;
          }

          self.current_decoder = Some(self.configure_value_decoder(encoding, buf.start_from(offset))?);
          return Ok(true);
        }
      }
    }
  }

  fn configure_value_decoder(
    &mut self, encoding: Encoding, data: crate::util::memory::ByteBufferPtr,
  ) -> Result<Box<dyn Decoder<T>>> {
    let num_values = self.num_buffered_values;
    match encoding {
      Encoding::RLE_DICTIONARY | Encoding::PLAIN_DICTIONARY => {
        let dictionary = match self.dictionary.clone() {
          Some(dictionary) => dictionary,
          None => return corrupt_data_err!(
            "RLE_DICTIONARY-encoded data page with no preceding dictionary page"),
        };
        let mut dict_decoder = DictDecoder::from_shared_dict(dictionary);
        dict_decoder.set_data(data, num_values)?;
        Ok(Box::new(dict_decoder))
      }
      other => {
        let mut decoder = get_decoder::<T>(self.descr.clone(), other)?;
        decoder.set_data(data, num_values)?;
        Ok(decoder)
      }
    }
  }
}

fn read_u32_le(buf: &[u8], offset: usize) -> Result<u32> {
  if buf.len() < offset + 4 {
    return eof_err!("Not enough bytes to read level-stream length prefix");
  }
  Ok(u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]))
}
