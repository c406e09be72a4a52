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

//! Basic enums shared across the metadata, schema and encoding layers. These mirror
//! the small fixed vocabularies of the Parquet format itself rather than anything
//! specific to one component.

use std::fmt;

use crate::errors::ParquetError;

/// Physical (on-disk) type of a leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
  BOOLEAN,
  INT32,
  INT64,
  INT96,
  FLOAT,
  DOUBLE,
  BYTE_ARRAY,
  FIXED_LEN_BYTE_ARRAY,
}

/// Converted/logical type annotation carried by a `SchemaElement`. Distinct from the
/// physical type: e.g. a `UTF8` leaf is physically `BYTE_ARRAY`.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
  UTF8,
  MAP,
  MAP_KEY_VALUE,
  LIST,
  ENUM,
  DECIMAL { precision: i32, scale: i32 },
  DATE,
  TIME_MILLIS,
  TIME_MICROS,
  TIMESTAMP_MILLIS,
  TIMESTAMP_MICROS,
  UINT_8,
  UINT_16,
  UINT_32,
  UINT_64,
  INT_8,
  INT_16,
  INT_32,
  INT_64,
  JSON,
  BSON,
  INTERVAL,
}

/// Repetition of a schema node: whether it may be absent (`OPTIONAL`), must be
/// present exactly once (`REQUIRED`), or may occur any number of times (`REPEATED`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
  REQUIRED,
  OPTIONAL,
  REPEATED,
}

/// Compression codec applied to a column chunk's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
  UNCOMPRESSED,
  SNAPPY,
  GZIP,
}

/// Value/level encoding used by a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
  PLAIN,
  PLAIN_DICTIONARY,
  RLE,
  BIT_PACKED,
  RLE_DICTIONARY,
}

/// Kind of a page within a column chunk's page stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
  DATA_PAGE,
  INDEX_PAGE,
  DICTIONARY_PAGE,
  DATA_PAGE_V2,
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:?}", self) }
}

impl fmt::Display for LogicalType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:?}", self) }
}

impl fmt::Display for Repetition {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:?}", self) }
}

impl fmt::Display for Compression {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:?}", self) }
}

impl fmt::Display for Encoding {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:?}", self) }
}

impl fmt::Display for PageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:?}", self) }
}

impl std::convert::TryFrom<i32> for Type {
  type Error = ParquetError;
  fn try_from(value: i32) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Type::BOOLEAN),
      1 => Ok(Type::INT32),
      2 => Ok(Type::INT64),
      3 => Ok(Type::INT96),
      4 => Ok(Type::FLOAT),
      5 => Ok(Type::DOUBLE),
      6 => Ok(Type::BYTE_ARRAY),
      7 => Ok(Type::FIXED_LEN_BYTE_ARRAY),
      _ => corrupt_metadata_err!("Invalid physical type code {}", value),
    }
  }
}

impl std::convert::TryFrom<i32> for Repetition {
  type Error = ParquetError;
  fn try_from(value: i32) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Repetition::REQUIRED),
      1 => Ok(Repetition::OPTIONAL),
      2 => Ok(Repetition::REPEATED),
      _ => corrupt_metadata_err!("Invalid repetition code {}", value),
    }
  }
}

impl std::convert::TryFrom<i32> for Compression {
  type Error = ParquetError;
  fn try_from(value: i32) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Compression::UNCOMPRESSED),
      1 => Ok(Compression::SNAPPY),
      2 => Ok(Compression::GZIP),
      // LZO, BROTLI, LZ4, ZSTD and later codecs are recognized by the wire format
      // but this reader implements only the plug-in set named in scope.
      other => Err(ParquetError::UnsupportedCodec(format!(
        "codec code {} is not one of UNCOMPRESSED/SNAPPY/GZIP", other
      ))),
    }
  }
}

impl std::convert::TryFrom<i32> for Encoding {
  type Error = ParquetError;
  fn try_from(value: i32) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Encoding::PLAIN),
      2 => Ok(Encoding::PLAIN_DICTIONARY),
      3 => Ok(Encoding::RLE),
      4 => Ok(Encoding::BIT_PACKED),
      8 => Ok(Encoding::RLE_DICTIONARY),
      other => Err(ParquetError::UnsupportedEncoding(format!(
        "encoding code {} is not supported", other
      ))),
    }
  }
}

impl std::convert::TryFrom<i32> for PageType {
  type Error = ParquetError;
  fn try_from(value: i32) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(PageType::DATA_PAGE),
      1 => Ok(PageType::INDEX_PAGE),
      2 => Ok(PageType::DICTIONARY_PAGE),
      3 => Ok(PageType::DATA_PAGE_V2),
      _ => corrupt_metadata_err!("Invalid page type code {}", value),
    }
  }
}
