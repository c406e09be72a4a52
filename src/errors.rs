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

use std::io;

use quick_error::quick_error;

quick_error! {
  /// The error kinds surfaced by the reader. Every read operation is fatal on error:
  /// there is no retry and no partial result.
  #[derive(Debug)]
  pub enum ParquetError {
    /// Generic error, usually wraps another error or a context message that doesn't
    /// fit one of the more specific kinds below.
    General(message: String) {
      display("Parquet error: {}", message)
      description(message)
    }
    /// The input isn't a Parquet file: magic bytes are missing or the file is too
    /// small to contain a footer.
    NotParquet(message: String) {
      display("Not a Parquet file: {}", message)
      description(message)
    }
    /// The footer declares a format version this reader doesn't understand.
    UnsupportedVersion(message: String) {
      display("Unsupported Parquet version: {}", message)
      description(message)
    }
    /// A value or level encoding outside the supported set was encountered.
    UnsupportedEncoding(message: String) {
      display("Unsupported encoding: {}", message)
      description(message)
    }
    /// A compression codec outside {UNCOMPRESSED, SNAPPY, GZIP} was encountered.
    UnsupportedCodec(message: String) {
      display("Unsupported codec: {}", message)
      description(message)
    }
    /// The Thrift-encoded footer could not be decoded, or its contents are
    /// internally inconsistent (bad type codes, truncated struct, size mismatch).
    CorruptMetadata(message: String) {
      display("Corrupt Parquet metadata: {}", message)
      description(message)
    }
    /// A page's encoded payload could not be decoded: length mismatch after
    /// decompression, impossible bit width, dictionary index out of range, etc.
    CorruptData(message: String) {
      display("Corrupt Parquet data: {}", message)
      description(message)
    }
    /// A caller-supplied option was invalid (negative offset, count < -1, ...).
    InvalidArgument(message: String) {
      display("Invalid argument: {}", message)
      description(message)
    }
    /// Not enough bytes were available to finish decoding a value.
    EOF(message: String) {
      display("Unexpected EOF: {}", message)
      description(message)
    }
    /// A feature is recognized but intentionally not implemented by this reader.
    NYI(message: String) {
      display("Not yet implemented: {}", message)
      description(message)
    }
    /// I/O failure from the underlying byte source.
    Io(err: io::Error) {
      from()
      display("IO error: {}", err)
      description(err.description())
      cause(err)
    }
  }
}

/// Error surfaced for a single column while iterating rows. Wraps the underlying
/// cause and the dotted path of the column that failed; iteration aborts immediately
/// after this is returned, there is no per-column recovery.
#[derive(Debug)]
pub struct ColumnReadError {
  pub path: String,
  pub cause: ParquetError,
}

impl std::fmt::Display for ColumnReadError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "error reading column '{}': {}", self.path, self.cause)
  }
}

impl std::error::Error for ColumnReadError {}

pub type Result<T> = ::std::result::Result<T, ParquetError>;
