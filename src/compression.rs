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

//! Page-payload decompression. Each chunk records one `Compression` codec in its
//! `ColumnMetaData`; every page in that chunk is decompressed the same way before
//! C4 interprets its level/value streams.

use std::io::Read;

use crate::basic::Compression;
use crate::errors::Result;

pub trait Codec {
  /// Decompresses `input` into `output`, appending to whatever `output` already
  /// holds. The caller knows the expected uncompressed length up front (it's
  /// recorded in the page header) and checks it after this returns.
  fn decompress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()>;
}

struct NoneCodec;

impl Codec for NoneCodec {
  fn decompress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
    output.extend_from_slice(input);
    Ok(())
  }
}

struct SnappyCodec;

impl Codec for SnappyCodec {
  fn decompress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
    let mut decoder = snap::raw::Decoder::new();
    let decompressed = decoder.decompress_vec(input)
      .map_err(|e| crate::errors::ParquetError::CorruptData(format!("SNAPPY decode failed: {}", e)))?;
    output.extend_from_slice(&decompressed);
    Ok(())
  }
}

struct GzipCodec;

impl Codec for GzipCodec {
  fn decompress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
    let mut decoder = flate2::read::GzDecoder::new(input);
    decoder.read_to_end(output)
      .map_err(|e| crate::errors::ParquetError::CorruptData(format!("GZIP decode failed: {}", e)))?;
    Ok(())
  }
}

/// Constructs the `Codec` named by a chunk's `Compression`.
pub fn create_codec(codec: Compression) -> Box<dyn Codec> {
  match codec {
    Compression::UNCOMPRESSED => Box::new(NoneCodec),
    Compression::SNAPPY => Box::new(SnappyCodec),
    Compression::GZIP => Box::new(GzipCodec),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_none_codec_passthrough() {
    let mut codec = create_codec(Compression::UNCOMPRESSED);
    let mut out = Vec::new();
    codec.decompress(b"hello world", &mut out).unwrap();
    assert_eq!(out, b"hello world");
  }

  #[test]
  fn test_snappy_roundtrip() {
    let original = b"the quick brown fox jumps over the lazy dog, the quick brown fox";
    let compressed = snap::raw::Encoder::new().compress_vec(original).unwrap();
    let mut codec = create_codec(Compression::SNAPPY);
    let mut out = Vec::new();
    codec.decompress(&compressed, &mut out).unwrap();
    assert_eq!(out, original);
  }

  #[test]
  fn test_gzip_roundtrip() {
    use std::io::Write;
    let original = b"the quick brown fox jumps over the lazy dog";
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(original).unwrap();
    let compressed = encoder.finish().unwrap();
    let mut codec = create_codec(Compression::GZIP);
    let mut out = Vec::new();
    codec.decompress(&compressed, &mut out).unwrap();
    assert_eq!(out, original);
  }
}
