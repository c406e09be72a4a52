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

//! Caller-supplied options for a read: which rows (`ReaderOptions`) and how to
//! interpret un-annotated BYTE_ARRAY leaves (`ParquetOptions`).

use crate::errors::Result;
use crate::schema::types::PathPredicate;

/// Controls which rows and columns a `read_dataset`/`iter_rows` call produces.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
  /// Rows to skip before the first emitted row.
  pub offset: i64,
  /// Rows to emit after skipping `offset`; `-1` means all remaining rows.
  pub count: i64,
  /// Columns to project; `None` means every leaf.
  pub columns: Option<Vec<PathPredicate>>,
}

impl ReaderOptions {
  pub fn new() -> Self { ReaderOptions { offset: 0, count: -1, columns: None } }

  pub fn with_offset(mut self, offset: i64) -> Self { self.offset = offset; self }

  pub fn with_count(mut self, count: i64) -> Self { self.count = count; self }

  pub fn with_columns(mut self, columns: Vec<PathPredicate>) -> Self {
    self.columns = Some(columns);
    self
  }

  /// Checks the boundary rules named in the external-interface section: a
  /// negative offset or a count below `-1` is an `InvalidArgument`, not a
  /// silently-clamped value.
  pub fn validate(&self) -> Result<()> {
    if self.offset < 0 {
      return Err(crate::errors::ParquetError::InvalidArgument(
        format!("offset must be >= 0, got {}", self.offset)));
    }
    if self.count < -1 {
      return Err(crate::errors::ParquetError::InvalidArgument(
        format!("count must be >= -1, got {}", self.count)));
    }
    Ok(())
  }
}

impl Default for ReaderOptions {
  fn default() -> Self { Self::new() }
}

/// Interpretation choices that don't affect which rows/columns are read, only
/// how a leaf's raw bytes are exposed to the caller.
#[derive(Debug, Clone, Copy)]
pub struct ParquetOptions {
  /// When `true` (the default), a BYTE_ARRAY leaf with no UTF8 annotation is
  /// still exposed as a string; a UTF8-annotated leaf is always a string
  /// regardless of this flag.
  pub treat_byte_array_as_string: bool,
}

impl ParquetOptions {
  pub fn new() -> Self { ParquetOptions { treat_byte_array_as_string: true } }
}

impl Default for ParquetOptions {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate_rejects_negative_offset() {
    let opts = ReaderOptions::new().with_offset(-1);
    assert!(opts.validate().is_err());
  }

  #[test]
  fn test_validate_rejects_count_below_negative_one() {
    let opts = ReaderOptions::new().with_count(-2);
    assert!(opts.validate().is_err());
  }

  #[test]
  fn test_validate_accepts_defaults() {
    assert!(ReaderOptions::new().validate().is_ok());
  }

  #[test]
  fn test_validate_accepts_unbounded_count() {
    assert!(ReaderOptions::new().with_count(-1).validate().is_ok());
  }
}
