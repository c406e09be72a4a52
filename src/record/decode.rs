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

//! Glue between C4 (`column::reader`) and C5 (`record::assembly`): decodes one
//! column chunk's full page stream into a per-row nested `Value` sequence.

use crate::column::reader::{ColumnReader, ColumnReaderImpl};
use crate::data_type::{ByteArray, DataType, Int96};
use crate::encodings::decoding::{Decoder, PlainDecoder};
use crate::errors::Result;
use crate::file::options::ParquetOptions;
use crate::schema::types::ColumnDescriptor;

use super::assembly::{flat_to_hierarchy, slot_to_value};
use super::value::{IntoValue, Value};

/// Decodes exactly `total_values` logical slots (the chunk's full value count,
/// nulls included) from `reader`, then assembles them into one `Value` per row.
pub fn decode_column(
  reader: ColumnReader, descr: &ColumnDescriptor, total_values: usize, options: &ParquetOptions,
) -> Result<Vec<Value>> {
  match reader {
    ColumnReader::BoolColumnReader(r) => decode_typed(r, descr, total_values, options),
    ColumnReader::Int32ColumnReader(r) => decode_typed(r, descr, total_values, options),
    ColumnReader::Int64ColumnReader(r) => decode_typed(r, descr, total_values, options),
    ColumnReader::Int96ColumnReader(r) => decode_typed(r, descr, total_values, options),
    ColumnReader::FloatColumnReader(r) => decode_typed(r, descr, total_values, options),
    ColumnReader::DoubleColumnReader(r) => decode_typed(r, descr, total_values, options),
    ColumnReader::ByteArrayColumnReader(r) => decode_typed(r, descr, total_values, options),
    ColumnReader::FixedLenByteArrayColumnReader(r) => decode_typed(r, descr, total_values, options),
  }
}

fn decode_typed<T: DataType>(
  mut reader: ColumnReaderImpl<T>, descr: &ColumnDescriptor, total_values: usize, options: &ParquetOptions,
) -> Result<Vec<Value>>
where
  PlainDecoder<T>: Decoder<T>,
  T::T: IntoValue,
{
  let mut values = Vec::new();
  let mut def_levels = Vec::new();
  let mut rep_levels = Vec::new();
  reader.read_batch(total_values, Some(&mut def_levels), Some(&mut rep_levels), &mut values)?;

  let max_def_level = descr.max_def_level();
  let mut value_iter = values.into_iter();
  let mut slots = Vec::with_capacity(def_levels.len());
  for &d in &def_levels {
    let v = if d == max_def_level { value_iter.next() } else { None };
    slots.push(slot_to_value(v, d, descr, options));
  }

  Ok(flat_to_hierarchy(descr.max_rep_level(), slots, &rep_levels))
}

#[allow(dead_code)]
fn _assert_into_value_coverage() {
  fn assert_impl<T: IntoValue>() {}
  assert_impl::<bool>();
  assert_impl::<i32>();
  assert_impl::<i64>();
  assert_impl::<Int96>();
  assert_impl::<f32>();
  assert_impl::<f64>();
  assert_impl::<ByteArray>();
}
