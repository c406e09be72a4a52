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

//! Typed readers for the handful of `parquet.thrift` structs this reader needs,
//! hand-written against `super::protocol::CompactInputProtocol` in place of
//! generated bindings. Field ids below are those of the published Parquet
//! Thrift IDL.

use std::convert::TryFrom;

use crate::basic::{Compression, Encoding, LogicalType, PageType, Repetition, Type as PhysicalType};
use crate::errors::Result;
use crate::schema::types::SchemaElement;

use super::protocol::CompactInputProtocol;

fn converted_type_from_code(code: i32) -> Result<LogicalType> {
  Ok(match code {
    0 => LogicalType::UTF8,
    1 => LogicalType::MAP,
    2 => LogicalType::MAP_KEY_VALUE,
    3 => LogicalType::LIST,
    4 => LogicalType::ENUM,
    5 => LogicalType::DECIMAL { precision: -1, scale: -1 }, // filled in by caller
    6 => LogicalType::DATE,
    7 => LogicalType::TIME_MILLIS,
    8 => LogicalType::TIME_MICROS,
    9 => LogicalType::TIMESTAMP_MILLIS,
    10 => LogicalType::TIMESTAMP_MICROS,
    11 => LogicalType::UINT_8,
    12 => LogicalType::UINT_16,
    13 => LogicalType::UINT_32,
    14 => LogicalType::UINT_64,
    15 => LogicalType::INT_8,
    16 => LogicalType::INT_16,
    17 => LogicalType::INT_32,
    18 => LogicalType::INT_64,
    19 => LogicalType::JSON,
    20 => LogicalType::BSON,
    21 => LogicalType::INTERVAL,
    other => return corrupt_metadata_err!("Unknown ConvertedType code {}", other),
  })
}

pub fn read_schema_element(proto: &mut CompactInputProtocol) -> Result<SchemaElement> {
  proto.read_struct_begin();
  let mut physical_type = None;
  let mut type_length = None;
  let mut repetition = None;
  let mut name = None;
  let mut num_children = 0i32;
  let mut converted_code = None;
  let mut scale = None;
  let mut precision = None;

  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => physical_type = Some(PhysicalType::try_from(proto.read_i32()?)?),
      2 => type_length = Some(proto.read_i32()?),
      3 => repetition = Some(Repetition::try_from(proto.read_i32()?)?),
      4 => name = Some(proto.read_string()?),
      5 => num_children = proto.read_i32()?,
      6 => converted_code = Some(proto.read_i32()?),
      7 => scale = Some(proto.read_i32()?),
      8 => precision = Some(proto.read_i32()?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();

  let mut logical_type = match converted_code {
    Some(code) => Some(converted_type_from_code(code)?),
    None => None,
  };
  if let (Some(LogicalType::DECIMAL { .. }), Some(p), Some(s)) = (&logical_type, precision, scale) {
    logical_type = Some(LogicalType::DECIMAL { precision: p, scale: s });
  }

  Ok(SchemaElement {
    name: name.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "SchemaElement missing required field 'name'".to_string()))?,
    repetition,
    physical_type,
    logical_type,
    num_children,
    type_length,
    precision,
    scale,
  })
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
  pub max: Option<Vec<u8>>,
  pub min: Option<Vec<u8>>,
  pub null_count: Option<i64>,
  pub distinct_count: Option<i64>,
  pub max_value: Option<Vec<u8>>,
  pub min_value: Option<Vec<u8>>,
}

fn read_statistics(proto: &mut CompactInputProtocol) -> Result<Statistics> {
  proto.read_struct_begin();
  let mut stats = Statistics::default();
  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => stats.max = Some(proto.read_binary()?),
      2 => stats.min = Some(proto.read_binary()?),
      3 => stats.null_count = Some(proto.read_i64()?),
      4 => stats.distinct_count = Some(proto.read_i64()?),
      5 => stats.max_value = Some(proto.read_binary()?),
      6 => stats.min_value = Some(proto.read_binary()?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();
  Ok(stats)
}

#[derive(Debug, Clone)]
pub struct KeyValue {
  pub key: String,
  pub value: Option<String>,
}

fn read_key_value(proto: &mut CompactInputProtocol) -> Result<KeyValue> {
  proto.read_struct_begin();
  let mut key = None;
  let mut value = None;
  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => key = Some(proto.read_string()?),
      2 => value = Some(proto.read_string()?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();
  Ok(KeyValue {
    key: key.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "KeyValue missing required field 'key'".to_string()))?,
    value,
  })
}

#[derive(Debug, Clone)]
pub struct ColumnMetaData {
  pub physical_type: PhysicalType,
  pub encodings: Vec<Encoding>,
  pub path_in_schema: Vec<String>,
  pub codec: Compression,
  pub num_values: i64,
  pub total_uncompressed_size: i64,
  pub total_compressed_size: i64,
  pub data_page_offset: i64,
  pub index_page_offset: Option<i64>,
  pub dictionary_page_offset: Option<i64>,
  pub statistics: Option<Statistics>,
}

fn read_column_meta_data(proto: &mut CompactInputProtocol) -> Result<ColumnMetaData> {
  proto.read_struct_begin();
  let mut physical_type = None;
  let mut encodings = Vec::new();
  let mut path_in_schema = Vec::new();
  let mut codec = None;
  let mut num_values = None;
  let mut total_uncompressed_size = None;
  let mut total_compressed_size = None;
  let mut data_page_offset = None;
  let mut index_page_offset = None;
  let mut dictionary_page_offset = None;
  let mut statistics = None;

  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => physical_type = Some(PhysicalType::try_from(proto.read_i32()?)?),
      2 => {
        let (_, size) = proto.read_list_begin()?;
        for _ in 0..size { encodings.push(Encoding::try_from(proto.read_i32()?)?); }
      }
      3 => {
        let (_, size) = proto.read_list_begin()?;
        for _ in 0..size { path_in_schema.push(proto.read_string()?); }
      }
      4 => codec = Some(Compression::try_from(proto.read_i32()?)?),
      5 => num_values = Some(proto.read_i64()?),
      6 => total_uncompressed_size = Some(proto.read_i64()?),
      7 => total_compressed_size = Some(proto.read_i64()?),
      8 => {
        let (_, size) = proto.read_list_begin()?;
        for _ in 0..size { read_key_value(proto)?; }
      }
      9 => data_page_offset = Some(proto.read_i64()?),
      10 => index_page_offset = Some(proto.read_i64()?),
      11 => dictionary_page_offset = Some(proto.read_i64()?),
      12 => statistics = Some(read_statistics(proto)?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();

  Ok(ColumnMetaData {
    physical_type: physical_type.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "ColumnMetaData missing required field 'type'".to_string()))?,
    encodings,
    path_in_schema,
    codec: codec.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "ColumnMetaData missing required field 'codec'".to_string()))?,
    num_values: num_values.unwrap_or(0),
    total_uncompressed_size: total_uncompressed_size.unwrap_or(0),
    total_compressed_size: total_compressed_size.unwrap_or(0),
    data_page_offset: data_page_offset.unwrap_or(0),
    index_page_offset,
    dictionary_page_offset,
    statistics,
  })
}

#[derive(Debug, Clone)]
pub struct ColumnChunk {
  pub file_path: Option<String>,
  pub file_offset: i64,
  pub meta_data: Option<ColumnMetaData>,
}

fn read_column_chunk(proto: &mut CompactInputProtocol) -> Result<ColumnChunk> {
  proto.read_struct_begin();
  let mut file_path = None;
  let mut file_offset = 0i64;
  let mut meta_data = None;
  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => file_path = Some(proto.read_string()?),
      2 => file_offset = proto.read_i64()?,
      3 => meta_data = Some(read_column_meta_data(proto)?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();
  Ok(ColumnChunk { file_path, file_offset, meta_data })
}

#[derive(Debug, Clone)]
pub struct RowGroup {
  pub columns: Vec<ColumnChunk>,
  pub total_byte_size: i64,
  pub num_rows: i64,
}

fn read_row_group(proto: &mut CompactInputProtocol) -> Result<RowGroup> {
  proto.read_struct_begin();
  let mut columns = Vec::new();
  let mut total_byte_size = 0i64;
  let mut num_rows = 0i64;
  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => {
        let (_, size) = proto.read_list_begin()?;
        for _ in 0..size { columns.push(read_column_chunk(proto)?); }
      }
      2 => total_byte_size = proto.read_i64()?,
      3 => num_rows = proto.read_i64()?,
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();
  Ok(RowGroup { columns, total_byte_size, num_rows })
}

#[derive(Debug, Clone)]
pub struct FileMetaData {
  pub version: i32,
  pub schema: Vec<SchemaElement>,
  pub num_rows: i64,
  pub row_groups: Vec<RowGroup>,
  pub key_value_metadata: Vec<KeyValue>,
  pub created_by: Option<String>,
}

/// Reads a top-level `FileMetaData` struct, as found in the file's trailing footer.
pub fn read_file_metadata(proto: &mut CompactInputProtocol) -> Result<FileMetaData> {
  proto.read_struct_begin();
  let mut version = 0i32;
  let mut schema = Vec::new();
  let mut num_rows = 0i64;
  let mut row_groups = Vec::new();
  let mut key_value_metadata = Vec::new();
  let mut created_by = None;

  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => version = proto.read_i32()?,
      2 => {
        let (_, size) = proto.read_list_begin()?;
        for _ in 0..size { schema.push(read_schema_element(proto)?); }
      }
      3 => num_rows = proto.read_i64()?,
      4 => {
        let (_, size) = proto.read_list_begin()?;
        for _ in 0..size { row_groups.push(read_row_group(proto)?); }
      }
      5 => {
        let (_, size) = proto.read_list_begin()?;
        for _ in 0..size { key_value_metadata.push(read_key_value(proto)?); }
      }
      6 => created_by = Some(proto.read_string()?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();

  Ok(FileMetaData { version, schema, num_rows, row_groups, key_value_metadata, created_by })
}

#[derive(Debug, Clone)]
pub struct DataPageHeader {
  pub num_values: i32,
  pub encoding: Encoding,
  pub definition_level_encoding: Encoding,
  pub repetition_level_encoding: Encoding,
  pub statistics: Option<Statistics>,
}

fn read_data_page_header(proto: &mut CompactInputProtocol) -> Result<DataPageHeader> {
  proto.read_struct_begin();
  let mut num_values = 0i32;
  let mut encoding = None;
  let mut def_enc = None;
  let mut rep_enc = None;
  let mut statistics = None;
  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => num_values = proto.read_i32()?,
      2 => encoding = Some(Encoding::try_from(proto.read_i32()?)?),
      3 => def_enc = Some(Encoding::try_from(proto.read_i32()?)?),
      4 => rep_enc = Some(Encoding::try_from(proto.read_i32()?)?),
      5 => statistics = Some(read_statistics(proto)?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();
  Ok(DataPageHeader {
    num_values,
    encoding: encoding.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "DataPageHeader missing required field 'encoding'".to_string()))?,
    definition_level_encoding: def_enc.unwrap_or(Encoding::RLE),
    repetition_level_encoding: rep_enc.unwrap_or(Encoding::RLE),
    statistics,
  })
}

#[derive(Debug, Clone)]
pub struct DataPageHeaderV2 {
  pub num_values: i32,
  pub num_nulls: i32,
  pub num_rows: i32,
  pub encoding: Encoding,
  pub definition_levels_byte_length: i32,
  pub repetition_levels_byte_length: i32,
  pub is_compressed: bool,
  pub statistics: Option<Statistics>,
}

fn read_data_page_header_v2(proto: &mut CompactInputProtocol) -> Result<DataPageHeaderV2> {
  proto.read_struct_begin();
  let mut num_values = 0i32;
  let mut num_nulls = 0i32;
  let mut num_rows = 0i32;
  let mut encoding = None;
  let mut def_len = 0i32;
  let mut rep_len = 0i32;
  let mut is_compressed = true;
  let mut statistics = None;
  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => num_values = proto.read_i32()?,
      2 => num_nulls = proto.read_i32()?,
      3 => num_rows = proto.read_i32()?,
      4 => encoding = Some(Encoding::try_from(proto.read_i32()?)?),
      5 => def_len = proto.read_i32()?,
      6 => rep_len = proto.read_i32()?,
      7 => is_compressed = field.bool_value.unwrap_or(true),
      8 => statistics = Some(read_statistics(proto)?),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();
  Ok(DataPageHeaderV2 {
    num_values, num_nulls, num_rows,
    encoding: encoding.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "DataPageHeaderV2 missing required field 'encoding'".to_string()))?,
    definition_levels_byte_length: def_len,
    repetition_levels_byte_length: rep_len,
    is_compressed,
    statistics,
  })
}

#[derive(Debug, Clone)]
pub struct DictionaryPageHeader {
  pub num_values: i32,
  pub encoding: Encoding,
  pub is_sorted: Option<bool>,
}

fn read_dictionary_page_header(proto: &mut CompactInputProtocol) -> Result<DictionaryPageHeader> {
  proto.read_struct_begin();
  let mut num_values = 0i32;
  let mut encoding = None;
  let mut is_sorted = None;
  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => num_values = proto.read_i32()?,
      2 => encoding = Some(Encoding::try_from(proto.read_i32()?)?),
      3 => is_sorted = field.bool_value,
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();
  Ok(DictionaryPageHeader {
    num_values,
    encoding: encoding.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "DictionaryPageHeader missing required field 'encoding'".to_string()))?,
    is_sorted,
  })
}

#[derive(Debug, Clone)]
pub enum PageHeaderDetail {
  Data(DataPageHeader),
  DataV2(DataPageHeaderV2),
  Dictionary(DictionaryPageHeader),
}

#[derive(Debug, Clone)]
pub struct PageHeader {
  pub page_type: PageType,
  pub uncompressed_page_size: i32,
  pub compressed_page_size: i32,
  pub detail: Option<PageHeaderDetail>,
}

pub fn read_page_header(proto: &mut CompactInputProtocol) -> Result<PageHeader> {
  proto.read_struct_begin();
  let mut page_type = None;
  let mut uncompressed_page_size = 0i32;
  let mut compressed_page_size = 0i32;
  let mut detail = None;

  while let Some(field) = proto.read_field_begin()? {
    match field.field_id {
      1 => page_type = Some(PageType::try_from(proto.read_i32()?)?),
      2 => uncompressed_page_size = proto.read_i32()?,
      3 => compressed_page_size = proto.read_i32()?,
      4 => { proto.read_i32()?; } // crc, ignored per spec
      5 => detail = Some(PageHeaderDetail::Data(read_data_page_header(proto)?)),
      6 => proto.skip(field.field_type)?, // index_page_header: unused by this reader
      7 => detail = Some(PageHeaderDetail::Dictionary(read_dictionary_page_header(proto)?)),
      8 => detail = Some(PageHeaderDetail::DataV2(read_data_page_header_v2(proto)?)),
      _ => proto.skip(field.field_type)?,
    }
  }
  proto.read_struct_end();

  Ok(PageHeader {
    page_type: page_type.ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
      "PageHeader missing required field 'type'".to_string()))?,
    uncompressed_page_size,
    compressed_page_size,
    detail,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn varint(mut v: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
      let mut byte = (v & 0x7F) as u8;
      v >>= 7;
      if v != 0 { byte |= 0x80; }
      out.push(byte);
      if v == 0 { break; }
    }
    out
  }

  fn zigzag(v: i64) -> u64 { ((v << 1) ^ (v >> 63)) as u64 }

  #[test]
  fn test_read_key_value() {
    // struct { 1: string key = "k"; 2: string value = "v"; STOP }
    let mut bytes = vec![0x18]; // field 1, BINARY
    bytes.extend(varint(1));
    bytes.push(b'k');
    bytes.push(0x18); // field 2 (delta 1), BINARY
    bytes.extend(varint(1));
    bytes.push(b'v');
    bytes.push(0x00);
    let mut proto = CompactInputProtocol::new(&bytes);
    let kv = read_key_value(&mut proto).unwrap();
    assert_eq!(kv.key, "k");
    assert_eq!(kv.value, Some("v".to_string()));
  }

  #[test]
  fn test_read_file_metadata_minimal() {
    // FileMetaData { 1: i32 version = 1; 3: i64 num_rows = 7; STOP }
    // (no schema, no row_groups -- both default to empty lists)
    let mut bytes = vec![0x15]; // field 1 (delta 1), I32
    bytes.extend(varint(zigzag(1)));
    bytes.push(0x26); // field 3 (delta 2), I64
    bytes.extend(varint(zigzag(7)));
    bytes.push(0x00);
    let mut proto = CompactInputProtocol::new(&bytes);
    let md = read_file_metadata(&mut proto).unwrap();
    assert_eq!(md.version, 1);
    assert_eq!(md.num_rows, 7);
    assert!(md.schema.is_empty());
    assert!(md.row_groups.is_empty());
  }
}
