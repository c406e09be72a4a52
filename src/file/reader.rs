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

//! C2: validates the footer, decodes it into `ParquetMetaData`, and hands out
//! page streams for individual column chunks. `ChunkReader` abstracts the
//! underlying byte source (a `File`, or an in-memory buffer for tests) behind
//! `read`/`seek`/`length`, per the single-owner, single-threaded model: a
//! `SerializedFileReader` and everything it hands out share one cursor-free
//! source via reference-counted clones, never a thread-shared one.

use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::rc::Rc;

use crate::basic::Compression;
use crate::compression::{create_codec, Codec};
use crate::errors::{ParquetError, Result};
use crate::file::metadata::{ParquetMetaData, RowGroupMetaData};
use crate::thrift::parquet_format;
use crate::thrift::protocol::CompactInputProtocol;
use crate::util::memory::ByteBufferPtr;

use super::metadata::build_metadata;
use crate::column::page::{Page, PageReader};

const FOOTER_LEN: usize = 8;
const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];

/// Total byte length of the underlying source.
pub trait Length {
  fn len(&self) -> u64;
}

/// A byte source `SerializedFileReader` can read bounded ranges out of,
/// independent of whether it's a `File` or an in-memory buffer.
pub trait ChunkReader: Length {
  type T: Read;

  /// Returns a `Read` positioned at `start` that yields at most `length` bytes.
  fn get_read(&self, start: u64, length: usize) -> Result<Self::T>;
}

impl Length for File {
  fn len(&self) -> u64 { self.metadata().map(|m| m.len()).unwrap_or(0) }
}

/// Bounds a cloned file handle's reads to `[start, start + length)`.
pub struct FileSource {
  file: File,
  end: u64,
  pos: u64,
}

impl FileSource {
  fn new(mut file: File, start: u64, length: usize) -> io::Result<Self> {
    file.seek(SeekFrom::Start(start))?;
    Ok(FileSource { file, end: start + length as u64, pos: start })
  }
}

impl Read for FileSource {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let remaining = self.end.saturating_sub(self.pos) as usize;
    if remaining == 0 { return Ok(0); }
    let want = buf.len().min(remaining);
    let n = self.file.read(&mut buf[..want])?;
    self.pos += n as u64;
    Ok(n)
  }
}

impl ChunkReader for File {
  type T = FileSource;

  fn get_read(&self, start: u64, length: usize) -> Result<Self::T> {
    let clone = self.try_clone()?;
    Ok(FileSource::new(clone, start, length)?)
  }
}

impl Length for ByteBufferPtr {
  fn len(&self) -> u64 { ByteBufferPtr::len(self) as u64 }
}

impl ChunkReader for ByteBufferPtr {
  type T = io::Cursor<ByteBufferPtr>;

  fn get_read(&self, start: u64, length: usize) -> Result<Self::T> {
    let slice = self.range(start as usize, length);
    Ok(io::Cursor::new(slice))
  }
}

// ----------------------------------------------------------------------
// Footer parsing

/// Reads and decodes the trailing footer: `<thrift bytes> <u32 LE len> PAR1`,
/// validating the leading/trailing magic markers first.
fn parse_metadata<R: ChunkReader>(chunk_reader: &R) -> Result<ParquetMetaData> {
  let file_size = chunk_reader.len();
  if file_size < FOOTER_LEN as u64 {
    return Err(ParquetError::NotParquet(
      format!("file is only {} bytes, too small to contain a footer", file_size)));
  }

  let mut leading_magic = [0u8; 4];
  chunk_reader.get_read(0, 4)?.read_exact(&mut leading_magic)?;
  if leading_magic != PARQUET_MAGIC {
    return Err(ParquetError::NotParquet("leading magic bytes are not 'PAR1'".to_string()));
  }

  let mut footer = [0u8; FOOTER_LEN];
  chunk_reader.get_read(file_size - FOOTER_LEN as u64, FOOTER_LEN)?.read_exact(&mut footer)?;
  if footer[4..8] != PARQUET_MAGIC {
    return Err(ParquetError::NotParquet("trailing magic bytes are not 'PAR1'".to_string()));
  }

  let metadata_len = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]) as u64;
  let footer_start = file_size - FOOTER_LEN as u64;
  if metadata_len > footer_start {
    return corrupt_metadata_err!(
      "Footer declares {} metadata bytes but only {} bytes precede it", metadata_len, footer_start);
  }
  let metadata_start = footer_start - metadata_len;

  let mut metadata_buf = vec![0u8; metadata_len as usize];
  chunk_reader.get_read(metadata_start, metadata_len as usize)?.read_exact(&mut metadata_buf)?;

  let mut proto = CompactInputProtocol::new(&metadata_buf);
  let thrift_md = parquet_format::read_file_metadata(&mut proto)?;
  build_metadata(thrift_md)
}

// ----------------------------------------------------------------------
// APIs for file & row group readers

/// Top-level handle on an open Parquet file: metadata plus per-row-group readers.
pub trait FileReader {
  fn metadata(&self) -> &ParquetMetaData;

  fn num_row_groups(&self) -> usize;

  /// Row group readers don't do bounds checking on `i`.
  fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>>;
}

/// Handle on one row group: its metadata plus page readers for individual
/// column chunks.
pub trait RowGroupReader {
  fn metadata(&self) -> &RowGroupMetaData;

  fn num_columns(&self) -> usize;

  fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>>;
}

/// A `FileReader`/`RowGroupReader` pair backed by a `ChunkReader` byte source.
pub struct SerializedFileReader<R: ChunkReader> {
  chunk_reader: Rc<R>,
  metadata: ParquetMetaData,
}

impl<R: ChunkReader> SerializedFileReader<R> {
  pub fn new(chunk_reader: R) -> Result<Self> {
    let metadata = parse_metadata(&chunk_reader)?;
    Ok(SerializedFileReader { chunk_reader: Rc::new(chunk_reader), metadata })
  }
}

impl TryFrom<File> for SerializedFileReader<File> {
  type Error = ParquetError;
  fn try_from(file: File) -> Result<Self> { Self::new(file) }
}

impl<R: ChunkReader> FileReader for SerializedFileReader<R> {
  fn metadata(&self) -> &ParquetMetaData { &self.metadata }

  fn num_row_groups(&self) -> usize { self.metadata.num_row_groups() }

  fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>> {
    let row_group_metadata = self.metadata.row_group(i);
    Ok(Box::new(SerializedRowGroupReader {
      chunk_reader: self.chunk_reader.clone(),
      metadata: row_group_metadata,
    }))
  }
}

pub struct SerializedRowGroupReader<'a, R: ChunkReader> {
  chunk_reader: Rc<R>,
  metadata: &'a RowGroupMetaData,
}

impl<'a, R: ChunkReader> RowGroupReader for SerializedRowGroupReader<'a, R> {
  fn metadata(&self) -> &RowGroupMetaData { self.metadata }

  fn num_columns(&self) -> usize { self.metadata.num_columns() }

  fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>> {
    let col = self.metadata.column(i);
    let col_start = col.starting_offset() as u64;
    let col_length = col.total_compressed_size() as usize;
    let source = self.chunk_reader.get_read(col_start, col_length)?;
    Ok(Box::new(SerializedPageReader::new(source, col.num_values(), col.compression())))
  }
}

/// Streams a column chunk's pages out of a bounded `Read`, decompressing each
/// page's payload as it's read.
pub struct SerializedPageReader<T: Read> {
  buf: T,
  decompressor: Box<dyn Codec>,
  seen_num_values: i64,
  total_num_values: i64,
}

impl<T: Read> SerializedPageReader<T> {
  pub fn new(buf: T, total_num_values: i64, compression: Compression) -> Self {
    SerializedPageReader {
      buf,
      decompressor: create_codec(compression),
      seen_num_values: 0,
      total_num_values,
    }
  }

  fn read_page_header(&mut self) -> Result<parquet_format::PageHeader> {
    // The compact protocol's struct decoder needs the whole struct's bytes in
    // memory; page headers are small and bounded, so read a generous chunk and
    // let the protocol tell us how much of it the header actually consumed.
    let mut scratch = Vec::new();
    let mut byte = [0u8; 1];
    // A PageHeader has no outer length prefix, so we grow the scratch buffer one
    // byte at a time until the protocol parses successfully, bounded well below
    // any plausible header size.
    const MAX_PAGE_HEADER_SIZE: usize = 16 * 1024;
    loop {
      let n = self.buf.read(&mut byte)?;
      if n == 0 {
        return eof_err!("Unexpected EOF while reading a page header");
      }
      scratch.push(byte[0]);
      let mut proto = CompactInputProtocol::new(&scratch);
      match parquet_format::read_page_header(&mut proto) {
        Ok(header) if proto.position() == scratch.len() => return Ok(header),
        _ if scratch.len() >= MAX_PAGE_HEADER_SIZE => {
          return corrupt_metadata_err!("Page header exceeds {} bytes", MAX_PAGE_HEADER_SIZE);
        }
        _ => continue,
      }
    }
  }
}

impl<T: Read> PageReader for SerializedPageReader<T> {
  fn get_next_page(&mut self) -> Result<Option<Page>> {
    if self.seen_num_values >= self.total_num_values {
      return Ok(None);
    }
    let header = self.read_page_header()?;

    let compressed_len = header.compressed_page_size as usize;
    let mut raw = vec![0u8; compressed_len];
    self.buf.read_exact(&mut raw)?;

    let detail = header.detail.ok_or_else(|| ParquetError::CorruptMetadata(
      "PageHeader has no data/dictionary detail".to_string()))?;

    let page = match detail {
      parquet_format::PageHeaderDetail::Dictionary(dict_header) => {
        let mut decompressed = Vec::new();
        self.decompressor.decompress(&raw, &mut decompressed)?;
        if decompressed.len() != header.uncompressed_page_size as usize {
          return corrupt_data_err!("Actual decompressed size doesn't match the expected one ({} vs {})",
            decompressed.len(), header.uncompressed_page_size);
        }
        self.seen_num_values += dict_header.num_values as i64;
        Page::DictionaryPage {
          buf: ByteBufferPtr::new(decompressed),
          num_values: dict_header.num_values as u32,
          encoding: dict_header.encoding,
          is_sorted: dict_header.is_sorted.unwrap_or(false),
        }
      }
      parquet_format::PageHeaderDetail::Data(data_header) => {
        let mut decompressed = Vec::new();
        self.decompressor.decompress(&raw, &mut decompressed)?;
        if decompressed.len() != header.uncompressed_page_size as usize {
          return corrupt_data_err!("Actual decompressed size doesn't match the expected one ({} vs {})",
            decompressed.len(), header.uncompressed_page_size);
        }
        self.seen_num_values += data_header.num_values as i64;
        Page::DataPage {
          buf: ByteBufferPtr::new(decompressed),
          num_values: data_header.num_values as u32,
          encoding: data_header.encoding,
          def_level_encoding: data_header.definition_level_encoding,
          rep_level_encoding: data_header.repetition_level_encoding,
          statistics: data_header.statistics.as_ref().map(
            crate::file::metadata::Statistics::from_thrift),
        }
      }
      parquet_format::PageHeaderDetail::DataV2(header_v2) => {
        // Levels in a v2 page are never compressed; only the values payload is,
        // and only when `is_compressed` says so.
        let level_bytes = (header_v2.definition_levels_byte_length
          + header_v2.repetition_levels_byte_length) as usize;
        let mut decompressed = raw[..level_bytes].to_vec();
        let rest = &raw[level_bytes..];
        if header_v2.is_compressed {
          self.decompressor.decompress(rest, &mut decompressed)?;
        } else {
          decompressed.extend_from_slice(rest);
        }
        if decompressed.len() != header.uncompressed_page_size as usize {
          return corrupt_data_err!("Actual decompressed size doesn't match the expected one ({} vs {})",
            decompressed.len(), header.uncompressed_page_size);
        }
        self.seen_num_values += header_v2.num_values as i64;
        Page::DataPageV2 {
          buf: ByteBufferPtr::new(decompressed),
          num_values: header_v2.num_values as u32,
          num_nulls: header_v2.num_nulls as u32,
          num_rows: header_v2.num_rows as u32,
          encoding: header_v2.encoding,
          def_levels_byte_len: header_v2.definition_levels_byte_length as u32,
          rep_levels_byte_len: header_v2.repetition_levels_byte_length as u32,
          is_compressed: header_v2.is_compressed,
          statistics: header_v2.statistics.as_ref().map(
            crate::file::metadata::Statistics::from_thrift),
        }
      }
    };
    Ok(Some(page))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_short_file_is_not_parquet() {
    let data = ByteBufferPtr::new(vec![0u8; 4]);
    let err = parse_metadata(&data).unwrap_err();
    assert!(matches!(err, ParquetError::NotParquet(_)));
  }

  #[test]
  fn test_bad_trailing_magic_is_not_parquet() {
    let mut bytes = vec![b'P', b'A', b'R', b'1'];
    bytes.extend_from_slice(&[0u8; 8]);
    bytes[8..12].copy_from_slice(b"XXXX");
    let data = ByteBufferPtr::new(bytes);
    let err = parse_metadata(&data).unwrap_err();
    assert!(matches!(err, ParquetError::NotParquet(_)));
  }
}
