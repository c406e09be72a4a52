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

//! C6, row-major half: a lazy iterator over logical rows, honouring the
//! caller's skip/limit/column-projection options. Decodes one row group's
//! worth of a projected column at a time (never a single row in isolation —
//! see the design note on why per-row random access inside a chunk is not
//! attempted) and slices out the rows the pagination window actually wants.

use std::collections::VecDeque;

use crate::column::reader::get_column_reader;
use crate::errors::ColumnReadError;
use crate::file::options::{ParquetOptions, ReaderOptions};
use crate::file::reader::FileReader;
use crate::schema::types::{path_is_selected, ColumnPath, SchemaDescriptor};

use super::decode::decode_column;
use super::value::Value;

/// One logical row: its projected leaves, in schema order, each paired with
/// the dotted path it came from.
#[derive(Debug, Clone)]
pub struct Row {
  pub columns: Vec<(ColumnPath, Value)>,
}

impl Row {
  pub fn get(&self, path: &str) -> Option<&Value> {
    self.columns.iter().find(|(p, _)| p.to_string() == path).map(|(_, v)| v)
  }
}

pub struct RowIterator<'a> {
  file_reader: &'a dyn FileReader,
  schema_descr: &'a SchemaDescriptor,
  selected: Vec<usize>,
  parquet_options: ParquetOptions,
  offset: i64,
  count: i64,
  emitted: i64,
  row_group_idx: usize,
  running_row: i64,
  buffered: VecDeque<Row>,
  done: bool,
}

impl<'a> RowIterator<'a> {
  pub fn new(
    file_reader: &'a dyn FileReader, schema_descr: &'a SchemaDescriptor,
    options: &ReaderOptions, parquet_options: ParquetOptions,
  ) -> Result<Self, ColumnReadError> {
    options.validate().map_err(|e| ColumnReadError { path: "<options>".to_string(), cause: e })?;
    let selected = (0..schema_descr.num_columns())
      .filter(|&i| path_is_selected(options.columns.as_deref(), schema_descr.column(i).path()))
      .collect();
    Ok(RowIterator {
      file_reader,
      schema_descr,
      selected,
      parquet_options,
      offset: options.offset,
      count: options.count,
      emitted: 0,
      row_group_idx: 0,
      running_row: 0,
      buffered: VecDeque::new(),
      done: false,
    })
  }

  /// Decodes and buffers the next non-empty row-group window, per the
  /// pagination formula: a row group spanning `[pos, pos + n)` is skipped
  /// entirely if `pos + n <= offset`; otherwise it contributes
  /// `min(count - emitted, n - max(0, offset - pos))` rows starting at
  /// `max(0, offset - pos)`.
  fn fill_buffer(&mut self) -> Result<bool, ColumnReadError> {
    while self.buffered.is_empty() {
      if self.count != -1 && self.emitted >= self.count { return Ok(false); }
      if self.row_group_idx >= self.file_reader.num_row_groups() { return Ok(false); }

      let rg = self.file_reader.get_row_group(self.row_group_idx)
        .map_err(|e| ColumnReadError { path: "<row-group>".to_string(), cause: e })?;
      let n = rg.metadata().num_rows();
      let pos = self.running_row;
      self.running_row += n;
      self.row_group_idx += 1;

      if pos + n <= self.offset { continue; }

      let skip = (self.offset - pos).max(0);
      let available = n - skip;
      let take = if self.count == -1 { available } else { (self.count - self.emitted).min(available) };
      if take <= 0 { continue; }

      let mut per_column = Vec::with_capacity(self.selected.len());
      for &i in &self.selected {
        let descr = self.schema_descr.column(i);
        let col_meta = rg.metadata().column(i);
        let page_reader = rg.get_column_page_reader(i)
          .map_err(|e| ColumnReadError { path: descr.path().to_string(), cause: e })?;
        let column_reader = get_column_reader(descr.clone(), page_reader);
        let nested = decode_column(column_reader, &descr, col_meta.num_values() as usize, &self.parquet_options)
          .map_err(|e| ColumnReadError { path: descr.path().to_string(), cause: e })?;
        let lo = skip as usize;
        let hi = (skip + take) as usize;
        if hi > nested.len() {
          return Err(ColumnReadError {
            path: descr.path().to_string(),
            cause: crate::errors::ParquetError::CorruptData(format!(
              "row group declares {} rows but column decoded only {}", n, nested.len())),
          });
        }
        per_column.push((descr.path().clone(), nested[lo..hi].to_vec()));
      }

      for r in 0..take as usize {
        let columns = per_column.iter().map(|(p, vals)| (p.clone(), vals[r].clone())).collect();
        self.buffered.push_back(Row { columns });
      }
    }
    Ok(true)
  }
}

impl<'a> Iterator for RowIterator<'a> {
  type Item = Result<Row, ColumnReadError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done { return None; }
    if self.buffered.is_empty() {
      match self.fill_buffer() {
        Ok(true) => {}
        Ok(false) => { self.done = true; return None; }
        Err(e) => { self.done = true; return Some(Err(e)); }
      }
    }
    match self.buffered.pop_front() {
      Some(row) => { self.emitted += 1; Some(Ok(row)) }
      None => { self.done = true; None }
    }
  }
}
