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

//! Core read path for the Apache Parquet columnar file format: footer and
//! schema decode, the page-level decode pipeline, repetition/definition
//! assembly, and row/column projection. Write support is out of scope.

#[macro_use]
mod macros;

pub mod basic;
pub mod column;
pub mod compression;
pub mod data_type;
pub mod encodings;
pub mod errors;
pub mod file;
pub mod record;
pub mod schema;
pub mod thrift;
pub mod util;

use std::convert::TryFrom;
use std::fs::File;
use std::path::Path;

pub use errors::{ColumnReadError, ParquetError, Result};
pub use file::options::{ParquetOptions, ReaderOptions};
pub use record::{DataSet, Row, RowIterator, Value};

use file::reader::{ChunkReader, FileReader, SerializedFileReader};
use schema::types::SchemaDescriptor;

/// Opens a Parquet file at `path` with default `ParquetOptions`, validating
/// the footer and decoding the schema eagerly; nothing else is read until
/// `read_dataset`/`iter_rows` is called.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
  open_with_options(path, ParquetOptions::new())
}

/// Like `open`, but with caller-supplied `ParquetOptions` governing how
/// un-annotated BYTE_ARRAY leaves are exposed.
pub fn open_with_options<P: AsRef<Path>>(path: P, parquet_options: ParquetOptions) -> Result<Reader<File>> {
  let file = File::open(path)?;
  Reader::new(file, parquet_options)
}

/// A handle on an open Parquet file: its decoded `FileMetaData`/schema, plus
/// the row-major and column-major read paths. `FileMetadata` and the schema
/// are decoded once at open and live for the reader's lifetime; row group and
/// page bytes are only read on demand by `read_dataset`/`iter_rows`.
pub struct Reader<R: ChunkReader> {
  file_reader: SerializedFileReader<R>,
  parquet_options: ParquetOptions,
}

impl<R: ChunkReader> Reader<R> {
  /// Wraps an already-open `ChunkReader` source (a `File`, or any other byte
  /// source supporting bounded, repeated reads) as a `Reader`.
  pub fn new(chunk_reader: R, parquet_options: ParquetOptions) -> Result<Self> {
    let file_reader = SerializedFileReader::new(chunk_reader)?;
    Ok(Reader { file_reader, parquet_options })
  }

  /// The file's logical schema: the hierarchical tree of structs/lists/maps
  /// rebuilt from the flat `SchemaElement` list, plus every leaf's dotted
  /// path and def/rep level bounds.
  pub fn schema(&self) -> &SchemaDescriptor { self.file_reader.metadata().file_metadata().schema_descr() }

  /// Total row count across every row group, before any `ReaderOptions`
  /// offset/count/column projection is applied.
  pub fn total_rows(&self) -> i64 { self.file_reader.metadata().file_metadata().num_rows() }

  /// Decodes the whole file (minus whatever `reader_options` excludes) into a
  /// column-major `DataSet`.
  pub fn read_dataset(&self, reader_options: &ReaderOptions) -> Result<DataSet> {
    record::dataset::read_dataset(&self.file_reader, self.schema(), reader_options, &self.parquet_options)
  }

  /// A lazy, row-major iterator; each row group is decoded on first touch,
  /// one row group ahead of what's been emitted.
  pub fn iter_rows(&self, reader_options: &ReaderOptions) -> std::result::Result<RowIterator<'_>, ColumnReadError> {
    RowIterator::new(&self.file_reader, self.schema(), reader_options, self.parquet_options)
  }
}

impl TryFrom<File> for Reader<File> {
  type Error = ParquetError;

  fn try_from(file: File) -> Result<Self> { Reader::new(file, ParquetOptions::new()) }
}
