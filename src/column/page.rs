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

//! A `Page` is the decompressed payload of one page plus the header fields the
//! column reader needs to interpret it. `PageReader` is the sequential source a
//! `ColumnReaderImpl` consumes, implemented over a chunk's byte range by
//! `file::reader::SerializedPageReader`, and by an in-memory fixture in tests.

use crate::basic::Encoding;
use crate::errors::Result;
use crate::file::metadata::Statistics;
use crate::util::memory::ByteBufferPtr;

#[derive(Debug, Clone)]
pub enum Page {
  DictionaryPage {
    buf: ByteBufferPtr,
    num_values: u32,
    encoding: Encoding,
    is_sorted: bool,
  },
  DataPage {
    buf: ByteBufferPtr,
    num_values: u32,
    encoding: Encoding,
    def_level_encoding: Encoding,
    rep_level_encoding: Encoding,
    statistics: Option<Statistics>,
  },
  DataPageV2 {
    buf: ByteBufferPtr,
    num_values: u32,
    num_nulls: u32,
    num_rows: u32,
    encoding: Encoding,
    def_levels_byte_len: u32,
    rep_levels_byte_len: u32,
    is_compressed: bool,
    statistics: Option<Statistics>,
  },
}

impl Page {
  pub fn num_values(&self) -> u32 {
    match self {
      Page::DictionaryPage { num_values, .. } => *num_values,
      Page::DataPage { num_values, .. } => *num_values,
      Page::DataPageV2 { num_values, .. } => *num_values,
    }
  }

  pub fn encoding(&self) -> Encoding {
    match self {
      Page::DictionaryPage { encoding, .. } => *encoding,
      Page::DataPage { encoding, .. } => *encoding,
      Page::DataPageV2 { encoding, .. } => *encoding,
    }
  }

  pub fn buffer(&self) -> &ByteBufferPtr {
    match self {
      Page::DictionaryPage { buf, .. } => buf,
      Page::DataPage { buf, .. } => buf,
      Page::DataPageV2 { buf, .. } => buf,
    }
  }
}

/// Sequential source of decompressed pages for one column chunk.
pub trait PageReader {
  /// Returns the next page, or `None` once the chunk's pages are exhausted.
  fn get_next_page(&mut self) -> Result<Option<Page>>;
}
