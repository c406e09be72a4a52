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

//! Random data generators shared by the unit tests in `encodings` and `column`.

use rand::distributions::uniform::SampleUniform;
use rand::distributions::Standard;
use rand::prelude::Distribution;
use rand::{thread_rng, Rng};

use crate::data_type::{ByteArray, DataType, FixedLenByteArrayType};

pub trait RandGen<T: DataType> {
  fn gen(len: i32) -> T::T;

  fn gen_vec(len: i32, total: usize) -> Vec<T::T> {
    (0..total).map(|_| Self::gen(len)).collect()
  }
}

impl<T: DataType> RandGen<T> for T
where
  Standard: Distribution<T::T>,
{
  fn gen(_: i32) -> T::T {
    thread_rng().gen::<T::T>()
  }
}

impl RandGen<FixedLenByteArrayType> for FixedLenByteArrayType {
  fn gen(len: i32) -> ByteArray {
    let mut rng = thread_rng();
    let value_len = if len < 0 { rng.gen_range(0, 128) } else { len as usize };
    ByteArray::from(random_bytes(value_len))
  }
}

pub fn random_bytes(n: usize) -> Vec<u8> {
  let mut rng = thread_rng();
  (0..n).map(|_| rng.gen::<u8>()).collect()
}

pub fn random_bools(n: usize) -> Vec<bool> {
  let mut rng = thread_rng();
  (0..n).map(|_| rng.gen::<bool>()).collect()
}

pub fn random_numbers<T>(n: usize) -> Vec<T>
where
  Standard: Distribution<T>,
{
  let mut rng = thread_rng();
  (0..n).map(|_| rng.gen::<T>()).collect()
}

pub fn random_numbers_range<T>(n: usize, low: T, high: T, result: &mut Vec<T>)
where
  T: PartialOrd + SampleUniform + Copy,
{
  let mut rng = thread_rng();
  for _ in 0..n {
    result.push(rng.gen_range(low, high));
  }
}
