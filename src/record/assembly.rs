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

//! C5: converts between a leaf's flat (value, repetition-level) stream and
//! nested `Value::List` sequences of depth `R`, and back. Operates purely on
//! the repetition axis; the caller (C4/C6 glue in `reader.rs`/`dataset.rs`)
//! decides how a null definition level becomes `Value::Null` vs. an empty
//! inner list before handing values here.

use crate::schema::types::ColumnDescriptor;

use super::value::{IntoValue, Value};

/// One decoded definition-level slot, as handed to the assembler. `Value`
/// covers every present leaf, including an explicit null; `EmptyList` signals
/// a present-but-zero-element repeated container (spec's "empty list, not
/// null" boundary case) and must never be appended into a container as if it
/// were an element — it IS the container, already closed with nothing in it.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
  Value(Value),
  EmptyList,
}

/// Builds the nested sequence for one leaf from its flat slots and parallel
/// repetition levels (one entry each, same length). `max_rep_level == 0` is the
/// degenerate, unnested case: the values are returned unchanged (an `EmptyList`
/// slot cannot occur here — there is no repetition to be empty of).
///
/// Maintains one open container per nesting depth `0..max_rep_level`. A rep
/// level of `0` closes every open container and starts a fresh top-level
/// record; a rep level of `r` closes (and folds upward) the containers at
/// depths `[r, R)` and starts fresh ones there, keeping depths `[0, r)` open.
/// An `EmptyList` slot still drives this open/close bookkeeping but appends
/// nothing, so the innermost container it lands in closes as an observably
/// empty `Value::List(vec![])` rather than a one-element list.
pub fn flat_to_hierarchy(max_rep_level: i16, slots: Vec<Slot>, rep_levels: &[i16]) -> Vec<Value> {
  assert_eq!(slots.len(), rep_levels.len(), "slots and rep_levels must be the same length");
  if max_rep_level == 0 {
    return slots.into_iter().map(|s| match s {
      Slot::Value(v) => v,
      Slot::EmptyList => unreachable!("EmptyList slot with max_rep_level == 0"),
    }).collect();
  }
  let r = max_rep_level as usize;
  let mut top_level = Vec::new();
  let mut stack: Option<Vec<Vec<Value>>> = None;

  for (slot, &rep_level) in slots.into_iter().zip(rep_levels.iter()) {
    let keep = rep_level as usize;
    match stack.as_mut() {
      None => {
        let mut fresh = vec![Vec::new(); r];
        if let Slot::Value(v) = slot { fresh[r - 1].push(v); }
        stack = Some(fresh);
      }
      Some(open) => {
        close_from(open, keep, &mut top_level);
        if let Slot::Value(v) = slot { open[r - 1].push(v); }
      }
    }
  }
  if let Some(mut open) = stack {
    close_from(&mut open, 0, &mut top_level);
  }
  top_level
}

/// Closes the open containers at 0-indexed depths `[keep, open.len())`, folding
/// each into its parent at `keep - 1`; the outermost one (`keep == 0`) folds
/// into `top_level` instead since it has no parent.
fn close_from(open: &mut [Vec<Value>], keep: usize, top_level: &mut Vec<Value>) {
  for i in (keep..open.len()).rev() {
    let finished = Value::List(std::mem::take(&mut open[i]));
    if i == 0 {
      top_level.push(finished);
    } else {
      open[i - 1].push(finished);
    }
  }
}

/// Inverse of `flat_to_hierarchy`: depth-first pre-order traversal of `nested`,
/// emitting one repetition level per leaf. The first leaf of each top-level
/// record is `0`; the first leaf under a container that just diverged from the
/// previous leaf's path at depth `d` (0-indexed) is `d + 1`; every other leaf is
/// `max_rep_level` (its own level, since it continues the same innermost list).
pub fn hierarchy_to_flat(max_rep_level: i16, nested: Vec<Value>) -> (Vec<Value>, Vec<i16>) {
  if max_rep_level == 0 {
    let n = nested.len();
    return (nested, vec![0i16; n]);
  }
  let r = max_rep_level as usize;
  let mut values = Vec::new();
  let mut rep_levels = Vec::new();
  for record in nested {
    let mut flattener = Flattener { r, values: &mut values, rep_levels: &mut rep_levels, prev_path: None };
    let mut path = Vec::with_capacity(r);
    flattener.visit(record, &mut path);
  }
  (values, rep_levels)
}

struct Flattener<'a> {
  r: usize,
  values: &'a mut Vec<Value>,
  rep_levels: &'a mut Vec<i16>,
  prev_path: Option<Vec<usize>>,
}

impl<'a> Flattener<'a> {
  fn visit(&mut self, node: Value, path: &mut Vec<usize>) {
    match node {
      Value::List(items) => {
        for (i, item) in items.into_iter().enumerate() {
          path.push(i);
          self.visit(item, path);
          path.pop();
        }
      }
      leaf => {
        let rep = match &self.prev_path {
          None => 0,
          Some(prev) => {
            let mut diverge_at = self.r;
            for i in 0..self.r {
              if path.get(i) != prev.get(i) { diverge_at = i; break; }
            }
            (diverge_at + 1).min(self.r) as i16
          }
        };
        self.values.push(leaf);
        self.rep_levels.push(rep);
        self.prev_path = Some(path.clone());
      }
    }
  }
}

/// Translates one decoded (value-or-absent, definition-level) slot into the
/// `Slot` the assembler should act on. An absent value at `max_def_level − 1`
/// under a repeated leaf is a present-but-empty list, not a null, per the
/// format's encoding of zero-length repeated groups — `flat_to_hierarchy`
/// closes that container empty rather than appending anything into it.
pub fn slot_to_value<T: IntoValue>(
  value: Option<T>, def_level: i16, descr: &ColumnDescriptor, options: &crate::file::options::ParquetOptions,
) -> Slot {
  match value {
    Some(v) => Slot::Value(v.into_value(descr, options)),
    None if descr.max_rep_level() > 0 && def_level == descr.max_def_level() - 1 => Slot::EmptyList,
    None => Slot::Value(Value::Null),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::value::PrimitiveValue;

  fn int(v: i32) -> Value { Value::Primitive(PrimitiveValue::Int32(v)) }

  fn list(items: Vec<Value>) -> Value { Value::List(items) }

  fn slots(values: Vec<Value>) -> Vec<Slot> { values.into_iter().map(Slot::Value).collect() }

  #[test]
  fn test_s1_flat_to_hierarchy() {
    let values = slots(vec![int(1), int(2), int(3), int(4)]);
    let rep_levels = [0, 1, 0, 1];
    let nested = flat_to_hierarchy(1, values, &rep_levels);
    assert_eq!(nested, vec![list(vec![int(1), int(2)]), list(vec![int(3), int(4)])]);
  }

  #[test]
  fn test_s2_flat_to_hierarchy_depth_two() {
    let a: Vec<Value> = (9..=18).map(int).collect();
    let b: Vec<Value> = vec![6, 7, 19, 20, 21, 22, 23].into_iter().map(int).collect();
    let mut values = a.clone();
    values.extend(b.clone());
    let mut rep_levels = vec![0i16];
    rep_levels.extend(std::iter::repeat(2i16).take(9));
    rep_levels.push(1);
    rep_levels.extend(std::iter::repeat(2i16).take(6));

    let nested = flat_to_hierarchy(2, slots(values), &rep_levels);
    assert_eq!(nested, vec![list(vec![list(a), list(b)])]);
  }

  #[test]
  fn test_empty_list_not_double_wrapped() {
    // A single present-but-empty top-level list: one EmptyList slot at rep 0.
    let nested = flat_to_hierarchy(1, vec![Slot::EmptyList], &[0]);
    assert_eq!(nested, vec![list(vec![])]);
  }

  #[test]
  fn test_empty_list_among_records() {
    // record 0: empty list. record 1: [1, 2].
    let values = vec![Slot::EmptyList, Slot::Value(int(1)), Slot::Value(int(2))];
    let rep_levels = [0, 0, 1];
    let nested = flat_to_hierarchy(1, values, &rep_levels);
    assert_eq!(nested, vec![list(vec![]), list(vec![int(1), int(2)])]);
  }

  #[test]
  fn test_s3_hierarchy_to_flat() {
    let nested = vec![list(vec![int(1), int(2)]), list(vec![int(3), int(4)])];
    let (values, rep_levels) = hierarchy_to_flat(1, nested);
    assert_eq!(values, vec![int(1), int(2), int(3), int(4)]);
    assert_eq!(rep_levels, vec![0, 1, 0, 1]);
  }

  #[test]
  fn test_round_trip_depth_one() {
    let values = vec![int(1), int(2), int(3), int(4), int(5)];
    let rep_levels = [0, 1, 1, 0, 1];
    let nested = flat_to_hierarchy(1, slots(values.clone()), &rep_levels);
    let (flat_values, flat_reps) = hierarchy_to_flat(1, nested.clone());
    assert_eq!(flat_values, values);
    assert_eq!(flat_reps, rep_levels);
    assert_eq!(flat_to_hierarchy(1, slots(flat_values), &flat_reps), nested);
  }

  #[test]
  fn test_round_trip_depth_two() {
    let values: Vec<Value> = (0..12).map(int).collect();
    let rep_levels = [0i16, 2, 2, 1, 2, 0, 2, 1, 2, 2, 1, 2];
    let nested = flat_to_hierarchy(2, slots(values.clone()), &rep_levels);
    let (flat_values, flat_reps) = hierarchy_to_flat(2, nested.clone());
    assert_eq!(flat_values, values);
    assert_eq!(flat_reps, rep_levels);
    assert_eq!(flat_to_hierarchy(2, slots(flat_values), &flat_reps), nested);
  }

  #[test]
  fn test_round_trip_depth_zero() {
    let values = vec![int(1), int(2), int(3)];
    let rep_levels = [0i16, 0, 0];
    let nested = flat_to_hierarchy(0, slots(values.clone()), &rep_levels);
    assert_eq!(nested, values);
    let (flat_values, flat_reps) = hierarchy_to_flat(0, nested);
    assert_eq!(flat_values, values);
    assert_eq!(flat_reps, vec![0, 0, 0]);
  }
}
