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

//! Physical value representations used while decoding column chunks, and the
//! `DataType` marker types that tie a physical `Type` to its Rust representation.

use crate::basic::Type;
use crate::util::memory::ByteBufferPtr;

/// A run of 12 bytes: INT96 is stored as (julian day: u32, nanos-of-day: u64) packed
/// little-endian into three u32 words for historical reasons.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Int96 {
  value: Vec<u32>,
}

impl Int96 {
  pub fn new() -> Self { Int96 { value: vec![0, 0, 0] } }

  pub fn data(&self) -> &[u32] { &self.value }

  pub fn set_data(&mut self, elem0: u32, elem1: u32, elem2: u32) {
    self.value = vec![elem0, elem1, elem2];
  }

  pub fn set_raw(&mut self, data: Vec<u32>) {
    assert_eq!(data.len(), 3);
    self.value = data;
  }

  /// Days since the Julian epoch, per the upper 4 bytes of the wire layout.
  pub fn julian_day(&self) -> i32 { self.value[2] as i32 }

  /// Nanoseconds into `julian_day`, per the lower 8 bytes of the wire layout.
  pub fn nanos_of_day(&self) -> i64 {
    ((self.value[1] as i64) << 32) | (self.value[0] as i64)
  }
}

/// A variable-length byte sequence: backing storage for BYTE_ARRAY and
/// FIXED_LEN_BYTE_ARRAY leaves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ByteArray {
  data: Option<ByteBufferPtr>,
}

impl ByteArray {
  pub fn new() -> Self { ByteArray { data: None } }

  pub fn data(&self) -> &[u8] {
    self.data.as_ref().map(|p| p.as_ref()).unwrap_or(&[])
  }

  pub fn len(&self) -> usize { self.data().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub fn set_data(&mut self, data: ByteBufferPtr) { self.data = Some(data); }

  /// Interprets the bytes as UTF-8. Returns `None` on invalid sequences; the caller
  /// decides whether that's fatal (a `UTF8`-annotated leaf should always succeed).
  pub fn as_utf8(&self) -> Option<&str> { std::str::from_utf8(self.data()).ok() }
}

impl From<Vec<u8>> for ByteArray {
  fn from(data: Vec<u8>) -> Self {
    let mut v = ByteArray::new();
    v.set_data(ByteBufferPtr::new(data));
    v
  }
}

impl<'a> From<&'a str> for ByteArray {
  fn from(data: &'a str) -> Self { ByteArray::from(data.as_bytes().to_vec()) }
}

/// Marker trait connecting a physical `Type` to the Rust type used to hold its
/// decoded values, plus the constant needed to dispatch a decoder/encoder for it.
pub trait DataType: 'static {
  type T: std::fmt::Debug + Default + Clone + PartialEq + Send;

  fn get_physical_type() -> Type;

  fn get_type_size() -> usize;
}

macro_rules! make_type {
  ($name:ident, $physical_ty:path, $native_ty:ty, $size:expr) => {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct $name {}

    impl DataType for $name {
      type T = $native_ty;

      fn get_physical_type() -> Type { $physical_ty }

      fn get_type_size() -> usize { $size }
    }
  };
}

make_type!(BoolType, Type::BOOLEAN, bool, 1);
make_type!(Int32Type, Type::INT32, i32, 4);
make_type!(Int64Type, Type::INT64, i64, 8);
make_type!(Int96Type, Type::INT96, Int96, 12);
make_type!(FloatType, Type::FLOAT, f32, 4);
make_type!(DoubleType, Type::DOUBLE, f64, 8);
make_type!(ByteArrayType, Type::BYTE_ARRAY, ByteArray, 0);
make_type!(FixedLenByteArrayType, Type::FIXED_LEN_BYTE_ARRAY, ByteArray, 0);

/// Little-endian byte view of a fixed-width native value, used by `PlainEncoder`.
pub trait AsBytes {
  fn as_bytes(&self) -> &[u8];
}

macro_rules! as_bytes_numeric {
  ($ty:ty) => {
    impl AsBytes for $ty {
      fn as_bytes(&self) -> &[u8] {
        unsafe {
          std::slice::from_raw_parts(self as *const Self as *const u8, std::mem::size_of::<Self>())
        }
      }
    }
  };
}

as_bytes_numeric!(i32);
as_bytes_numeric!(i64);
as_bytes_numeric!(u32);
as_bytes_numeric!(u64);
as_bytes_numeric!(f32);
as_bytes_numeric!(f64);

impl AsBytes for Int96 {
  fn as_bytes(&self) -> &[u8] {
    unsafe {
      std::slice::from_raw_parts(self.value.as_ptr() as *const u8, 12)
    }
  }
}
