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

//! Small buffer types used by the decoders. `ByteBufferPtr` is a cheap, clonable,
//! range-able view over a shared byte buffer: slicing it never copies.

use std::io::{self, Write};
use std::rc::Rc;

/// An immutable, reference-counted view of some range of an owned byte buffer.
/// Cloning and sub-slicing (`range`/`start_from`) are O(1): they only adjust the
/// start/len window into the shared `Rc<Vec<u8>>`.
#[derive(Clone, Debug)]
pub struct ByteBufferPtr {
  data: Rc<Vec<u8>>,
  start: usize,
  len: usize,
}

impl ByteBufferPtr {
  pub fn new(data: Vec<u8>) -> Self {
    let len = data.len();
    ByteBufferPtr { data: Rc::new(data), start: 0, len }
  }

  pub fn len(&self) -> usize { self.len }

  pub fn is_empty(&self) -> bool { self.len == 0 }

  pub fn start(&self) -> usize { self.start }

  /// The whole buffer, as a new `ByteBufferPtr` sharing the same backing storage.
  pub fn all(&self) -> Self { self.range(0, self.len) }

  /// Sub-range `[start, start+len)` relative to this view's own window.
  pub fn range(&self, start: usize, len: usize) -> Self {
    assert!(start + len <= self.len, "range [{}, {}) out of bounds (len {})",
      start, start + len, self.len);
    ByteBufferPtr { data: self.data.clone(), start: self.start + start, len }
  }

  /// Everything from `start` (relative to this view) to the end.
  pub fn start_from(&self, start: usize) -> Self {
    assert!(start <= self.len, "start {} out of bounds (len {})", start, self.len);
    self.range(start, self.len - start)
  }
}

impl AsRef<[u8]> for ByteBufferPtr {
  fn as_ref(&self) -> &[u8] { &self.data[self.start..self.start + self.len] }
}

impl PartialEq for ByteBufferPtr {
  fn eq(&self, other: &Self) -> bool { self.as_ref() == other.as_ref() }
}

/// A growable byte buffer, written into via `io::Write`, then consumed into an
/// immutable `ByteBufferPtr`. Used by the (test-only) encoders to build page payloads.
pub struct ByteBuffer {
  buf: Vec<u8>,
}

impl ByteBuffer {
  pub fn new() -> Self { ByteBuffer { buf: Vec::new() } }

  pub fn with_capacity(capacity: usize) -> Self {
    ByteBuffer { buf: vec![0; capacity] }
  }

  pub fn size(&self) -> usize { self.buf.len() }

  pub fn data(&self) -> &[u8] { &self.buf }

  pub fn mut_data(&mut self) -> &mut [u8] { &mut self.buf }

  pub fn set_data(&mut self, data: Vec<u8>) { self.buf = data; }

  pub fn clear(&mut self) { self.buf.clear(); }

  /// Takes ownership of the accumulated bytes, leaving this buffer empty.
  pub fn consume(&mut self) -> ByteBufferPtr { ByteBufferPtr::new(std::mem::take(&mut self.buf)) }
}

impl Default for ByteBuffer {
  fn default() -> Self { Self::new() }
}

impl Write for ByteBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.buf.extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_byte_buffer_ptr_range() {
    let buf = ByteBufferPtr::new(vec![0, 1, 2, 3, 4, 5]);
    let sub = buf.range(2, 3);
    assert_eq!(sub.as_ref(), &[2, 3, 4]);
    let sub2 = sub.start_from(1);
    assert_eq!(sub2.as_ref(), &[3, 4]);
  }

  #[test]
  fn test_byte_buffer_write_consume() {
    let mut buf = ByteBuffer::new();
    buf.write_all(&[1, 2, 3]).unwrap();
    let ptr = buf.consume();
    assert_eq!(ptr.as_ref(), &[1, 2, 3]);
    assert_eq!(buf.size(), 0);
  }
}
