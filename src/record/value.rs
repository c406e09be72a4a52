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

//! The tagged-variant value type the repetition assembler and row projector
//! build against: nesting depth is only known at runtime, so there is one `Value`
//! type rather than a generic container per leaf. `Struct` uses an ordered
//! `Vec<(String, Value)>` rather than a `HashMap` since `Value` holds floats and
//! isn't `Eq`/`Hash`, and field order (schema leaf order) is worth preserving.

use crate::basic::LogicalType;
use crate::data_type::{ByteArray, Int96};
use crate::file::options::ParquetOptions;
use crate::schema::types::ColumnDescriptor;

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
  Bool(bool),
  Int32(i32),
  Int64(i64),
  Int96(Int96),
  Float(f32),
  Double(f64),
  Bytes(Vec<u8>),
  Str(String),
  /// Unscaled integer value plus the leaf's recorded (precision, scale).
  Decimal(i128, i32, i32),
  /// Days since the Unix epoch.
  Date(i32),
  /// Milliseconds since the Unix epoch.
  TimestampMillis(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Primitive(PrimitiveValue),
  List(Vec<Value>),
  Struct(Vec<(String, Value)>),
  Map(Vec<(Value, Value)>),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
}

/// Converts one decoded physical value into its logical `Value`, per the leaf's
/// recorded logical type and the caller's `ParquetOptions`.
pub trait IntoValue {
  fn into_value(self, descr: &ColumnDescriptor, options: &ParquetOptions) -> Value;
}

impl IntoValue for bool {
  fn into_value(self, _descr: &ColumnDescriptor, _options: &ParquetOptions) -> Value {
    Value::Primitive(PrimitiveValue::Bool(self))
  }
}

impl IntoValue for i32 {
  fn into_value(self, descr: &ColumnDescriptor, _options: &ParquetOptions) -> Value {
    match descr.logical_type() {
      Some(LogicalType::DATE) => Value::Primitive(PrimitiveValue::Date(self)),
      Some(LogicalType::DECIMAL { precision, scale }) =>
        Value::Primitive(PrimitiveValue::Decimal(self as i128, *precision, *scale)),
      _ => Value::Primitive(PrimitiveValue::Int32(self)),
    }
  }
}

impl IntoValue for i64 {
  fn into_value(self, descr: &ColumnDescriptor, _options: &ParquetOptions) -> Value {
    match descr.logical_type() {
      Some(LogicalType::TIMESTAMP_MILLIS) =>
        Value::Primitive(PrimitiveValue::TimestampMillis(self)),
      Some(LogicalType::DECIMAL { precision, scale }) =>
        Value::Primitive(PrimitiveValue::Decimal(self as i128, *precision, *scale)),
      _ => Value::Primitive(PrimitiveValue::Int64(self)),
    }
  }
}

impl IntoValue for Int96 {
  fn into_value(self, _descr: &ColumnDescriptor, _options: &ParquetOptions) -> Value {
    Value::Primitive(PrimitiveValue::Int96(self))
  }
}

impl IntoValue for f32 {
  fn into_value(self, _descr: &ColumnDescriptor, _options: &ParquetOptions) -> Value {
    Value::Primitive(PrimitiveValue::Float(self))
  }
}

impl IntoValue for f64 {
  fn into_value(self, _descr: &ColumnDescriptor, _options: &ParquetOptions) -> Value {
    Value::Primitive(PrimitiveValue::Double(self))
  }
}

/// Big-endian two's-complement decode, as Parquet stores DECIMAL bytes.
fn decimal_from_be_bytes(bytes: &[u8]) -> i128 {
  let negative = !bytes.is_empty() && bytes[0] & 0x80 != 0;
  let mut buf = if negative { [0xffu8; 16] } else { [0u8; 16] };
  let start = 16 - bytes.len().min(16);
  buf[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(16)..]);
  i128::from_be_bytes(buf)
}

impl IntoValue for ByteArray {
  fn into_value(self, descr: &ColumnDescriptor, options: &ParquetOptions) -> Value {
    match descr.logical_type() {
      Some(LogicalType::DECIMAL { precision, scale }) =>
        Value::Primitive(PrimitiveValue::Decimal(decimal_from_be_bytes(self.data()), *precision, *scale)),
      _ if descr.is_utf8() => match self.as_utf8() {
        Some(s) => Value::Primitive(PrimitiveValue::Str(s.to_string())),
        None => Value::Primitive(PrimitiveValue::Bytes(self.data().to_vec())),
      },
      _ if options.treat_byte_array_as_string => match self.as_utf8() {
        Some(s) => Value::Primitive(PrimitiveValue::Str(s.to_string())),
        None => Value::Primitive(PrimitiveValue::Bytes(self.data().to_vec())),
      },
      _ => Value::Primitive(PrimitiveValue::Bytes(self.data().to_vec())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decimal_from_be_bytes_positive() {
    assert_eq!(decimal_from_be_bytes(&[0x01, 0x00]), 256);
  }

  #[test]
  fn test_decimal_from_be_bytes_negative() {
    // -1 as a single two's-complement byte.
    assert_eq!(decimal_from_be_bytes(&[0xff]), -1);
  }
}
