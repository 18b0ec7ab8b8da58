// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Plan execution: populate a shape from one source value.
//!
//! Projection walks the shape and mapping in lockstep, copying leaf
//! values verbatim, recursing into nested records and iterating lists.
//! Output objects preserve slot order. Absent or null optional records
//! project to `null` without invoking the nested mapping.

use crate::error::Result;
use crate::shape::{Mapping, Shape, SlotKind, Source};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Project one record value through a shape and its mapping.
///
/// `embeds` holds the already-fetched embed values, keyed by embed name.
pub(crate) fn project(
    shape: &Shape,
    mapping: &Mapping,
    src: &Value,
    embeds: &HashMap<String, Value>,
) -> Result<Value> {
    let mut out = Map::with_capacity(shape.slots.len());
    for (slot, source) in shape.slots.iter().zip(mapping.entries.iter()) {
        let value = match (&slot.kind, source) {
            (SlotKind::Leaf, Source::Field { access }) => read_path(src, access)
                .cloned()
                .unwrap_or(Value::Null),
            (
                SlotKind::Record(sub) | SlotKind::OptionalRecord(sub),
                Source::Record { access, mapping },
            ) => match read_path(src, access) {
                None | Some(Value::Null) => Value::Null,
                Some(nested) => project(sub, mapping, nested, embeds)?,
            },
            (SlotKind::List(sub), Source::List { access, mapping }) => {
                match read_path(src, access) {
                    Some(Value::Array(items)) => {
                        let mut list = Vec::with_capacity(items.len());
                        for item in items {
                            list.push(project(sub, mapping, item, embeds)?);
                        }
                        Value::Array(list)
                    }
                    _ => Value::Null,
                }
            }
            (SlotKind::Record(sub), Source::Embed { name, mapping }) => match embeds.get(name) {
                Some(fetched) => project(sub, mapping, fetched, embeds)?,
                None => Value::Null,
            },
            (kind, source) => {
                unreachable!("shape slot {:?} mismatches mapping entry {:?}", kind, source)
            }
        };
        out.insert(slot.name.clone(), value);
    }
    Ok(Value::Object(out))
}

/// Read the value at a declared-name access path.
///
/// Returns `None` when any step is missing or descends through a
/// non-object (e.g. a flattened path crossing an absent optional).
pub(crate) fn read_path<'a>(value: &'a Value, access: &[String]) -> Option<&'a Value> {
    let mut current = value;
    for step in access {
        current = current.as_object()?.get(step)?;
    }
    Some(current)
}
