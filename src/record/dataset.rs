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

//! C6, column-major half: decodes every selected leaf across every row group
//! and concatenates the per-row-group nested sequences under the leaf's
//! dotted path, producing one flat, whole-file `DataSet`.

use crate::column::reader::get_column_reader;
use crate::errors::Result;
use crate::file::options::{ParquetOptions, ReaderOptions};
use crate::file::reader::FileReader;
use crate::schema::types::{path_is_selected, ColumnPath, SchemaDescriptor};

use super::decode::decode_column;
use super::value::Value;

/// A whole-file, column-major materialization: one `Vec<Value>` per projected
/// leaf, each entry being that leaf's (possibly nested) value for one row.
pub struct DataSet {
  columns: Vec<(ColumnPath, Vec<Value>)>,
}

impl DataSet {
  pub fn column_paths(&self) -> impl Iterator<Item = &ColumnPath> { self.columns.iter().map(|(p, _)| p) }

  pub fn column(&self, path: &str) -> Option<&[Value]> {
    self.columns.iter().find(|(p, _)| p.to_string() == path).map(|(_, v)| v.as_slice())
  }

  pub fn num_rows(&self) -> usize { self.columns.first().map(|(_, v)| v.len()).unwrap_or(0) }

  pub fn num_columns(&self) -> usize { self.columns.len() }
}

/// Builds a `DataSet` for every leaf `options.columns` accepts, honouring
/// `options.offset`/`options.count` the same way the row-major iterator does,
/// applied uniformly across every projected column after the full per-leaf
/// sequence has been assembled.
pub fn read_dataset(
  file_reader: &dyn FileReader, schema_descr: &SchemaDescriptor,
  options: &ReaderOptions, parquet_options: &ParquetOptions,
) -> Result<DataSet> {
  options.validate()?;

  let selected: Vec<usize> = (0..schema_descr.num_columns())
    .filter(|&i| path_is_selected(options.columns.as_deref(), schema_descr.column(i).path()))
    .collect();

  let mut columns: Vec<(ColumnPath, Vec<Value>)> = selected
    .iter()
    .map(|&i| (schema_descr.column(i).path().clone(), Vec::new()))
    .collect();

  for rg_idx in 0..file_reader.num_row_groups() {
    let rg = file_reader.get_row_group(rg_idx)?;
    for (slot, &i) in selected.iter().enumerate() {
      let descr = schema_descr.column(i);
      let col_meta = rg.metadata().column(i);
      let page_reader = rg.get_column_page_reader(i)?;
      let column_reader = get_column_reader(descr.clone(), page_reader);
      let nested = decode_column(column_reader, &descr, col_meta.num_values() as usize, parquet_options)?;
      columns[slot].1.extend(nested);
    }
  }

  let total_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
  let start = (options.offset as usize).min(total_rows);
  let end = if options.count == -1 {
    total_rows
  } else {
    (start + options.count as usize).min(total_rows)
  };
  for (_, values) in columns.iter_mut() {
    *values = values[start..end].to_vec();
  }

  Ok(DataSet { columns })
}
