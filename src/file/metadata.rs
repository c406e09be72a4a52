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

//! The decoded, immutable footer: per-row-group, per-column-chunk descriptors plus
//! the reconstructed logical schema. Built once at `open()` and shared for the life
//! of the reader (C2).

use std::rc::Rc;

use crate::basic::{Compression, Encoding, Type as PhysicalType};
use crate::errors::Result;
use crate::schema::types::{build_schema, ColumnDescPtr, SchemaDescriptor};
use crate::thrift::parquet_format;

#[derive(Debug, Clone, Default)]
pub struct Statistics {
  pub null_count: Option<i64>,
  pub distinct_count: Option<i64>,
  pub min_bytes: Option<Vec<u8>>,
  pub max_bytes: Option<Vec<u8>>,
}

impl Statistics {
  pub fn from_thrift(s: &parquet_format::Statistics) -> Self {
    Statistics {
      null_count: s.null_count,
      distinct_count: s.distinct_count,
      // Prefer the newer `min_value`/`max_value` fields; fall back to the
      // deprecated `min`/`max` ones some older writers still emit.
      min_bytes: s.min_value.clone().or_else(|| s.min.clone()),
      max_bytes: s.max_value.clone().or_else(|| s.max.clone()),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
  column_descr: ColumnDescPtr,
  physical_type: PhysicalType,
  encodings: Vec<Encoding>,
  codec: Compression,
  num_values: i64,
  total_uncompressed_size: i64,
  total_compressed_size: i64,
  data_page_offset: i64,
  dictionary_page_offset: Option<i64>,
  statistics: Option<Statistics>,
}

impl ColumnChunkMetaData {
  pub fn column_descr(&self) -> &ColumnDescPtr { &self.column_descr }
  pub fn physical_type(&self) -> PhysicalType { self.physical_type }
  pub fn encodings(&self) -> &[Encoding] { &self.encodings }
  pub fn compression(&self) -> Compression { self.codec }
  pub fn num_values(&self) -> i64 { self.num_values }
  pub fn total_uncompressed_size(&self) -> i64 { self.total_uncompressed_size }
  pub fn total_compressed_size(&self) -> i64 { self.total_compressed_size }
  pub fn data_page_offset(&self) -> i64 { self.data_page_offset }
  pub fn dictionary_page_offset(&self) -> Option<i64> { self.dictionary_page_offset }
  pub fn statistics(&self) -> Option<&Statistics> { self.statistics.as_ref() }

  /// Where to start reading this chunk's page stream: the dictionary page if one
  /// exists and precedes the first data page, otherwise the first data page.
  pub fn starting_offset(&self) -> i64 {
    match self.dictionary_page_offset {
      Some(off) if off < self.data_page_offset => off,
      _ => self.data_page_offset,
    }
  }
}

#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
  columns: Vec<ColumnChunkMetaData>,
  total_byte_size: i64,
  num_rows: i64,
}

impl RowGroupMetaData {
  pub fn num_columns(&self) -> usize { self.columns.len() }
  pub fn column(&self, i: usize) -> &ColumnChunkMetaData { &self.columns[i] }
  pub fn columns(&self) -> &[ColumnChunkMetaData] { &self.columns }
  pub fn total_byte_size(&self) -> i64 { self.total_byte_size }
  pub fn num_rows(&self) -> i64 { self.num_rows }
}

#[derive(Debug, Clone)]
pub struct FileMetaData {
  version: i32,
  num_rows: i64,
  created_by: Option<String>,
  schema_descr: Rc<SchemaDescriptor>,
}

impl FileMetaData {
  pub fn version(&self) -> i32 { self.version }
  pub fn num_rows(&self) -> i64 { self.num_rows }
  pub fn created_by(&self) -> Option<&str> { self.created_by.as_deref() }
  pub fn schema_descr(&self) -> &SchemaDescriptor { &self.schema_descr }
}

/// The fully decoded footer: file-level metadata plus every row group's column
/// chunk descriptors, in file order.
#[derive(Debug, Clone)]
pub struct ParquetMetaData {
  file_metadata: FileMetaData,
  row_groups: Vec<RowGroupMetaData>,
}

impl ParquetMetaData {
  pub fn file_metadata(&self) -> &FileMetaData { &self.file_metadata }
  pub fn num_row_groups(&self) -> usize { self.row_groups.len() }
  pub fn row_group(&self, i: usize) -> &RowGroupMetaData { &self.row_groups[i] }
  pub fn row_groups(&self) -> &[RowGroupMetaData] { &self.row_groups }
}

/// Builds a `ParquetMetaData` from the raw Thrift `FileMetaData`, validating
/// version and row-count invariants along the way.
pub fn build_metadata(thrift_md: parquet_format::FileMetaData) -> Result<ParquetMetaData> {
  if thrift_md.version != 1 && thrift_md.version != 2 {
    return Err(crate::errors::ParquetError::UnsupportedVersion(
      format!("version {} is not one of {{1, 2}}", thrift_md.version)));
  }

  let schema_descr = Rc::new(build_schema(&thrift_md.schema)?);

  let mut row_groups = Vec::with_capacity(thrift_md.row_groups.len());
  for rg in &thrift_md.row_groups {
    if rg.columns.len() != schema_descr.num_columns() {
      return corrupt_metadata_err!(
        "Row group has {} columns, schema has {} leaves",
        rg.columns.len(), schema_descr.num_columns());
    }
    let mut columns = Vec::with_capacity(rg.columns.len());
    for (i, col) in rg.columns.iter().enumerate() {
      let meta = col.meta_data.as_ref().ok_or_else(|| crate::errors::ParquetError::CorruptMetadata(
        "ColumnChunk missing required 'meta_data'".to_string()))?;
      columns.push(ColumnChunkMetaData {
        column_descr: schema_descr.column(i),
        physical_type: meta.physical_type,
        encodings: meta.encodings.clone(),
        codec: meta.codec,
        num_values: meta.num_values,
        total_uncompressed_size: meta.total_uncompressed_size,
        total_compressed_size: meta.total_compressed_size,
        data_page_offset: meta.data_page_offset,
        dictionary_page_offset: meta.dictionary_page_offset,
        statistics: meta.statistics.as_ref().map(Statistics::from_thrift),
      });
    }
    row_groups.push(RowGroupMetaData {
      columns,
      total_byte_size: rg.total_byte_size,
      num_rows: rg.num_rows,
    });
  }

  let sum_rows: i64 = row_groups.iter().map(|rg| rg.num_rows).sum();
  if sum_rows != thrift_md.num_rows {
    return corrupt_metadata_err!(
      "Row group row counts sum to {}, file metadata says {}", sum_rows, thrift_md.num_rows);
  }

  Ok(ParquetMetaData {
    file_metadata: FileMetaData {
      version: thrift_md.version,
      num_rows: thrift_md.num_rows,
      created_by: thrift_md.created_by,
      schema_descr,
    },
    row_groups,
  })
}
