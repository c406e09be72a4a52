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

//! Translates the flat, pre-order `SchemaElement` list recorded in a file's footer
//! into a hierarchical `Type` tree, and flattens that tree back into the leaf
//! `ColumnDescriptor`s the page decoder needs (dotted path, max def/rep level).

use std::fmt;
use std::rc::Rc;

use crate::basic::{LogicalType, Repetition, Type as PhysicalType};
use crate::errors::Result;

/// One element of the flat, pre-order schema list as recorded in `FileMetaData`.
#[derive(Debug, Clone)]
pub struct SchemaElement {
  pub name: String,
  pub repetition: Option<Repetition>,
  pub physical_type: Option<PhysicalType>,
  pub logical_type: Option<LogicalType>,
  pub num_children: i32,
  pub type_length: Option<i32>,
  pub precision: Option<i32>,
  pub scale: Option<i32>,
}

impl SchemaElement {
  pub fn is_leaf(&self) -> bool { self.num_children == 0 }
}

/// A node of the reconstructed hierarchical schema tree.
#[derive(Debug, Clone)]
pub enum SchemaType {
  /// A scalar leaf column.
  Primitive {
    basic_info: BasicTypeInfo,
    physical_type: PhysicalType,
    type_length: i32,
    precision: i32,
    scale: i32,
  },
  /// A non-leaf node with no LIST/MAP annotation: a plain nested struct.
  Group { basic_info: BasicTypeInfo, fields: Vec<Rc<SchemaType>> },
}

#[derive(Debug, Clone)]
pub struct BasicTypeInfo {
  pub name: String,
  pub repetition: Repetition,
  pub logical_type: Option<LogicalType>,
}

impl SchemaType {
  pub fn name(&self) -> &str {
    match self {
      SchemaType::Primitive { basic_info, .. } => &basic_info.name,
      SchemaType::Group { basic_info, .. } => &basic_info.name,
    }
  }

  pub fn repetition(&self) -> Repetition {
    match self {
      SchemaType::Primitive { basic_info, .. } => basic_info.repetition,
      SchemaType::Group { basic_info, .. } => basic_info.repetition,
    }
  }

  pub fn is_group(&self) -> bool { matches!(self, SchemaType::Group { .. }) }

  pub fn get_fields(&self) -> &[Rc<SchemaType>] {
    match self {
      SchemaType::Group { fields, .. } => fields,
      SchemaType::Primitive { .. } => &[],
    }
  }
}

/// A single leaf column's projection-relevant metadata: where it lives in the
/// logical schema (dotted path) and the two quantities the level streams are
/// interpreted against.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPath {
  parts: Vec<String>,
}

impl ColumnPath {
  pub fn new(parts: Vec<String>) -> Self { ColumnPath { parts } }

  pub fn parts(&self) -> &[String] { &self.parts }
}

impl fmt::Display for ColumnPath {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.parts.join(".")) }
}

#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
  path: ColumnPath,
  physical_type: PhysicalType,
  type_length: i32,
  max_def_level: i16,
  max_rep_level: i16,
  logical_type: Option<LogicalType>,
}

pub type ColumnDescPtr = Rc<ColumnDescriptor>;

impl ColumnDescriptor {
  pub fn path(&self) -> &ColumnPath { &self.path }
  pub fn physical_type(&self) -> PhysicalType { self.physical_type }
  pub fn type_length(&self) -> i32 { self.type_length }
  pub fn max_def_level(&self) -> i16 { self.max_def_level }
  pub fn max_rep_level(&self) -> i16 { self.max_rep_level }
  pub fn logical_type(&self) -> Option<&LogicalType> { self.logical_type.as_ref() }

  /// BYTE_ARRAY leaves with an explicit UTF8 annotation are always strings; for
  /// un-annotated BYTE_ARRAY leaves the caller's `ParquetOptions` decides.
  pub fn is_utf8(&self) -> bool { matches!(self.logical_type, Some(LogicalType::UTF8)) }
}

/// The hierarchical schema plus its flattened leaf descriptors, in the same
/// pre-order the flat `SchemaElement` list used — i.e. `ColumnChunk` order.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
  root: Rc<SchemaType>,
  leaves: Vec<ColumnDescPtr>,
}

impl SchemaDescriptor {
  pub fn root(&self) -> &SchemaType { &self.root }

  pub fn columns(&self) -> &[ColumnDescPtr] { &self.leaves }

  pub fn num_columns(&self) -> usize { self.leaves.len() }

  pub fn column(&self, i: usize) -> ColumnDescPtr { self.leaves[i].clone() }
}

/// Builds a `SchemaDescriptor` from the flat pre-order element list recorded in the
/// footer. Implements the C3 group-recognition rules for LIST/MAP.
pub fn build_schema(elements: &[SchemaElement]) -> Result<SchemaDescriptor> {
  if elements.is_empty() {
    return corrupt_metadata_err!("Schema has no elements");
  }
  let mut pos = 0usize;
  let root = build_tree(elements, &mut pos, Repetition::REQUIRED)?;
  if pos != elements.len() {
    return corrupt_metadata_err!(
      "Schema element count mismatch: consumed {} of {}", pos, elements.len());
  }
  let root = recognize_groups(root);
  let mut leaves = Vec::new();
  collect_leaves(&root, Vec::new(), 0, 0, &mut leaves);
  Ok(SchemaDescriptor { root: Rc::new(root), leaves })
}

/// Consumes one subtree rooted at `elements[*pos]`, recursing into however many
/// children that element declares. `inherited_repetition` only matters for the
/// very first (root) element, which the Thrift encoding always stores as a group
/// with no repetition of its own (but we treat it as REQUIRED for level counting).
fn build_tree(
  elements: &[SchemaElement], pos: &mut usize, inherited_repetition: Repetition,
) -> Result<SchemaType> {
  if *pos >= elements.len() {
    return corrupt_metadata_err!("Schema element list truncated");
  }
  let elem = &elements[*pos];
  *pos += 1;
  let repetition = elem.repetition.unwrap_or(inherited_repetition);
  let basic_info = BasicTypeInfo {
    name: elem.name.clone(),
    repetition,
    logical_type: elem.logical_type.clone(),
  };

  if elem.is_leaf() {
    let physical_type = elem.physical_type.ok_or_else(|| {
      crate::errors::ParquetError::CorruptMetadata(
        format!("leaf schema element '{}' has no physical type", elem.name))
    })?;
    return Ok(SchemaType::Primitive {
      basic_info,
      physical_type,
      type_length: elem.type_length.unwrap_or(-1),
      precision: elem.precision.unwrap_or(-1),
      scale: elem.scale.unwrap_or(-1),
    });
  }

  let num_children = elem.num_children as usize;
  let mut fields = Vec::with_capacity(num_children);
  for _ in 0..num_children {
    fields.push(Rc::new(build_tree(elements, pos, Repetition::REQUIRED)?));
  }
  Ok(SchemaType::Group { basic_info, fields })
}

/// Walks the tree bottom-up, re-tagging LIST/MAP groups per the two/three-level
/// rules. The physical tree shape is unchanged: recognition only affects how
/// `collect_leaves` computes dotted paths (the synthetic `list`/`bag`/`key_value`
/// wrapper level is elided from the path, never from def/rep-level counting).
fn recognize_groups(node: SchemaType) -> SchemaType {
  match node {
    SchemaType::Group { basic_info, fields } => {
      let fields = fields.into_iter().map(|f| Rc::new(recognize_groups((*f).clone()))).collect();
      SchemaType::Group { basic_info, fields }
    }
    leaf => leaf,
  }
}

const LIST_WRAPPER_NAMES: [&str; 4] = ["list", "array", "bag", "tuple"];

/// True if `group`'s single REPEATED child is itself a one-child wrapper group
/// (the "three-level" LIST encoding) rather than the element directly (the
/// "two-level" LIST encoding).
fn list_uses_wrapper(repeated_child: &SchemaType) -> bool {
  if let SchemaType::Group { basic_info, fields } = repeated_child {
    fields.len() == 1 && LIST_WRAPPER_NAMES.contains(&basic_info.name.as_str())
  } else {
    false
  }
}

/// Recursively flattens `node` into leaf `ColumnDescriptor`s, accumulating the
/// dotted path and the running max def/rep level counts per the C3 rules:
/// def level increments for every OPTIONAL or REPEATED ancestor (inclusive of the
/// leaf itself); rep level increments for every REPEATED ancestor (inclusive).
fn collect_leaves(
  node: &SchemaType, mut path: Vec<String>, def_level: i16, rep_level: i16,
  out: &mut Vec<ColumnDescPtr>,
) {
  let (def_level, rep_level) = match node.repetition() {
    Repetition::REQUIRED => (def_level, rep_level),
    Repetition::OPTIONAL => (def_level + 1, rep_level),
    Repetition::REPEATED => (def_level + 1, rep_level + 1),
  };

  match node {
    SchemaType::Primitive { basic_info, physical_type, type_length, .. } => {
      path.push(basic_info.name.clone());
      out.push(Rc::new(ColumnDescriptor {
        path: ColumnPath::new(path),
        physical_type: *physical_type,
        type_length: *type_length,
        max_def_level: def_level,
        max_rep_level: rep_level,
        logical_type: basic_info.logical_type.clone(),
      }));
    }
    SchemaType::Group { basic_info, fields } => {
      let is_root = path.is_empty() && basic_info.repetition == Repetition::REQUIRED
        && basic_info.logical_type.is_none() && def_level == 0 && rep_level == 0;
      let push_name = !is_root;
      if push_name { path.push(basic_info.name.clone()); }

      let is_list = matches!(basic_info.logical_type, Some(LogicalType::LIST));
      let is_map = matches!(
        basic_info.logical_type, Some(LogicalType::MAP) | Some(LogicalType::MAP_KEY_VALUE));

      if is_list && fields.len() == 1 {
        let repeated = &fields[0];
        if list_uses_wrapper(repeated) {
          // Three-level: group.list.element — elide the synthetic `list` name,
          // but it is itself REPEATED and still counts once toward both levels.
          if let SchemaType::Group { fields: inner_fields, .. } = repeated.as_ref() {
            collect_leaves(&inner_fields[0], path, def_level + 1, rep_level + 1, out);
            return;
          }
        } else {
          // Two-level: group.element (repeated directly) — elide nothing, the
          // repeated child's own name becomes part of the path, and its own
          // REPEATED contribution is applied when collect_leaves recurses into it.
          collect_leaves(repeated, path, def_level, rep_level, out);
          return;
        }
      } else if is_map && fields.len() == 1 {
        // group.key_value.{key,value} — elide the synthetic key/value wrapper,
        // but it is itself REPEATED and still counts once toward both levels.
        if let SchemaType::Group { fields: kv_fields, .. } = fields[0].as_ref() {
          for f in kv_fields {
            collect_leaves(f, path.clone(), def_level + 1, rep_level + 1, out);
          }
          return;
        }
      }

      for f in fields {
        collect_leaves(f, path.clone(), def_level, rep_level, out);
      }
    }
  }
}

/// A projection predicate over dotted column paths, as accepted by
/// `ReaderOptions::columns`.
#[derive(Debug, Clone)]
pub enum PathPredicate {
  /// Matches only the exact dotted path.
  Exact(String),
  /// Matches the path itself or any path nested under it.
  Prefix(String),
  /// Matches the leaf's final name component against a `*`/`?` glob.
  NameGlob(String),
}

impl PathPredicate {
  pub fn matches(&self, path: &ColumnPath) -> bool {
    let joined = path.to_string();
    match self {
      PathPredicate::Exact(p) => &joined == p,
      PathPredicate::Prefix(p) => joined == *p || joined.starts_with(&format!("{}.", p)),
      PathPredicate::NameGlob(pat) => {
        let name = path.parts().last().map(String::as_str).unwrap_or("");
        glob_match(pat, name)
      }
    }
  }
}

/// Minimal `*`/`?` glob matcher; no character classes, no escaping.
fn glob_match(pattern: &str, text: &str) -> bool {
  let p: Vec<char> = pattern.chars().collect();
  let t: Vec<char> = text.chars().collect();
  let mut dp = vec![vec![false; t.len() + 1]; p.len() + 1];
  dp[0][0] = true;
  for i in 1..=p.len() {
    if p[i - 1] == '*' { dp[i][0] = dp[i - 1][0]; }
  }
  for i in 1..=p.len() {
    for j in 1..=t.len() {
      dp[i][j] = match p[i - 1] {
        '*' => dp[i - 1][j] || dp[i][j - 1],
        '?' => dp[i - 1][j - 1],
        c => dp[i - 1][j - 1] && c == t[j - 1],
      };
    }
  }
  dp[p.len()][t.len()]
}

/// Whether any predicate in `predicates` accepts `path`; `None` means "select all".
pub fn path_is_selected(predicates: Option<&[PathPredicate]>, path: &ColumnPath) -> bool {
  match predicates {
    None => true,
    Some(preds) => preds.iter().any(|p| p.matches(path)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn leaf(name: &str, rep: Repetition, ty: PhysicalType, logical: Option<LogicalType>) -> SchemaElement {
    SchemaElement {
      name: name.to_string(), repetition: Some(rep), physical_type: Some(ty),
      logical_type: logical, num_children: 0, type_length: None, precision: None, scale: None,
    }
  }

  fn group(name: &str, rep: Repetition, num_children: i32, logical: Option<LogicalType>) -> SchemaElement {
    SchemaElement {
      name: name.to_string(), repetition: Some(rep), physical_type: None,
      logical_type: logical, num_children, type_length: None, precision: None, scale: None,
    }
  }

  #[test]
  fn test_flat_struct_schema() {
    let elements = vec![
      group("schema", Repetition::REQUIRED, 2, None),
      leaf("a", Repetition::REQUIRED, PhysicalType::INT32, None),
      leaf("b", Repetition::OPTIONAL, PhysicalType::BYTE_ARRAY, Some(LogicalType::UTF8)),
    ];
    let schema = build_schema(&elements).unwrap();
    assert_eq!(schema.num_columns(), 2);
    assert_eq!(schema.column(0).path().to_string(), "a");
    assert_eq!(schema.column(0).max_def_level(), 0);
    assert_eq!(schema.column(1).path().to_string(), "b");
    assert_eq!(schema.column(1).max_def_level(), 1);
    assert!(schema.column(1).is_utf8());
  }

  #[test]
  fn test_two_level_list() {
    // schema { repeated int32 values; } annotated LIST directly on the repeated leaf's
    // parent group (the two-level encoding: no synthetic wrapper).
    let elements = vec![
      group("schema", Repetition::REQUIRED, 1, None),
      group("my_list", Repetition::OPTIONAL, 1, Some(LogicalType::LIST)),
      leaf("values", Repetition::REPEATED, PhysicalType::INT32, None),
    ];
    let schema = build_schema(&elements).unwrap();
    assert_eq!(schema.num_columns(), 1);
    assert_eq!(schema.column(0).path().to_string(), "my_list.values");
    assert_eq!(schema.column(0).max_rep_level(), 1);
    assert_eq!(schema.column(0).max_def_level(), 2); // OPTIONAL my_list + REPEATED values
  }

  #[test]
  fn test_three_level_list() {
    let elements = vec![
      group("schema", Repetition::REQUIRED, 1, None),
      group("my_list", Repetition::OPTIONAL, 1, Some(LogicalType::LIST)),
      group("list", Repetition::REPEATED, 1, None),
      leaf("element", Repetition::REQUIRED, PhysicalType::INT32, None),
    ];
    let schema = build_schema(&elements).unwrap();
    assert_eq!(schema.num_columns(), 1);
    assert_eq!(schema.column(0).path().to_string(), "my_list.element");
    assert_eq!(schema.column(0).max_rep_level(), 1);
    assert_eq!(schema.column(0).max_def_level(), 2);
  }

  #[test]
  fn test_map() {
    let elements = vec![
      group("schema", Repetition::REQUIRED, 1, None),
      group("my_map", Repetition::OPTIONAL, 1, Some(LogicalType::MAP)),
      group("key_value", Repetition::REPEATED, 2, None),
      leaf("key", Repetition::REQUIRED, PhysicalType::BYTE_ARRAY, Some(LogicalType::UTF8)),
      leaf("value", Repetition::REQUIRED, PhysicalType::INT32, None),
    ];
    let schema = build_schema(&elements).unwrap();
    assert_eq!(schema.num_columns(), 2);
    assert_eq!(schema.column(0).path().to_string(), "my_map.key");
    assert_eq!(schema.column(1).path().to_string(), "my_map.value");
    assert_eq!(schema.column(1).max_rep_level(), 1);
    assert_eq!(schema.column(1).max_def_level(), 2);
  }

  #[test]
  fn test_path_predicates() {
    let path = ColumnPath::new(vec!["a".to_string(), "b".to_string()]);
    assert!(PathPredicate::Exact("a.b".to_string()).matches(&path));
    assert!(!PathPredicate::Exact("a".to_string()).matches(&path));
    assert!(PathPredicate::Prefix("a".to_string()).matches(&path));
    assert!(PathPredicate::NameGlob("b*".to_string()).matches(&path));
    assert!(!PathPredicate::NameGlob("c*".to_string()).matches(&path));
  }
}
