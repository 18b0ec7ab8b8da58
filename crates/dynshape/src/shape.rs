// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shape and mapping construction.
//!
//! Given a catalog, an ordered field selection and the active embeds,
//! [`build_plan`] derives a [`Shape`] (the output structure: ordered
//! slots, each a leaf or a nested shape) and a parallel [`Mapping`]
//! (per-slot instructions for where each output value comes from). The
//! shape is a tagged variant tree built once and cached; no nominal
//! output type is synthesized at runtime.
//!
//! Output order is the order of first appearance of each top-level group
//! in the selection; with an empty selection, catalog order. Requesting
//! the exact same full path twice is an error, not a silent merge.

use crate::catalog::{FieldDescriptor, FieldKind, TypeCatalog};
use crate::embed::EmbedDescriptor;
use crate::error::{FormatError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The output structure for one (source type, selection) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Output slots in emission order.
    pub slots: Vec<ShapeSlot>,
}

/// One output field slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSlot {
    /// Output key.
    pub name: String,
    /// Slot structure.
    pub kind: SlotKind,
}

/// Structure of a shape slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotKind {
    /// A single value copied through unchanged.
    Leaf,
    /// A projected sub-record.
    Record(Shape),
    /// A projected sub-record that may be absent.
    OptionalRecord(Shape),
    /// A list of projected sub-records; the shape describes one element.
    List(Shape),
}

/// Leaf-to-source instructions for populating a [`Shape`].
///
/// Entries parallel the shape's slots one to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    /// Data source per slot, in slot order.
    pub entries: Vec<Source>,
}

/// Where one output slot's data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Copy the value at `access` in the current record value.
    Field { access: Vec<String> },
    /// Project the nested record found at `access` with the child
    /// mapping. Absent or null sources project to `null` without
    /// invoking the child.
    Record { access: Vec<String>, mapping: Mapping },
    /// Project each element of the list found at `access`.
    List { access: Vec<String>, mapping: Mapping },
    /// Project the fetched value of the named embed.
    Embed { name: String, mapping: Mapping },
}

/// One embed a plan depends on, with the resolved id location.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedUse {
    /// Embed name.
    pub name: String,
    /// Access path of the id leaf in the host record.
    pub id_access: Vec<String>,
}

/// A fully built projection plan: shape, mapping and required embeds.
///
/// Immutable once built; shared via `Arc` between concurrent callers.
#[derive(Debug)]
pub struct FormatPlan {
    /// Output structure.
    pub shape: Shape,
    /// Population instructions, parallel to the shape.
    pub mapping: Mapping,
    /// Embeds to fetch before projecting, in first-use order.
    pub embeds: Vec<EmbedUse>,
}

/// Build the plan for one catalog and selection.
///
/// Fails fast with the first error encountered; no partial plan is
/// returned.
pub(crate) fn build_plan(
    catalog: &TypeCatalog,
    fields: &[&str],
    embeds: &[&str],
    registry: &HashMap<String, Arc<EmbedDescriptor>>,
) -> Result<FormatPlan> {
    let mut active: Vec<(&str, &Arc<EmbedDescriptor>)> = Vec::with_capacity(embeds.len());
    for name in embeds {
        let descriptor = registry
            .get(*name)
            .ok_or_else(|| FormatError::UnknownEmbed((*name).to_string()))?;
        active.push((*name, descriptor));
    }

    let owned: Vec<String> = fields.iter().map(|f| (*f).to_string()).collect();
    let mut used = Vec::new();
    let (shape, mapping) = build_level(catalog, &owned, &active, "", &mut used)?;

    let mut uses = Vec::with_capacity(used.len());
    for name in used {
        let descriptor = registry
            .get(&name)
            .ok_or_else(|| FormatError::UnknownEmbed(name.clone()))?;
        let id_leaf = catalog
            .field(&descriptor.id_field)
            .ok_or_else(|| FormatError::UnknownField(descriptor.id_field.clone()))?;
        uses.push(EmbedUse {
            name,
            id_access: id_leaf.access.clone(),
        });
    }

    Ok(FormatPlan {
        shape,
        mapping,
        embeds: uses,
    })
}

/// Build one nesting level of the shape and mapping.
///
/// `prefix` carries the dotted path walked so far, for error messages.
/// `active` is non-empty only at the top level: embeds do not nest.
fn build_level(
    catalog: &TypeCatalog,
    fields: &[String],
    active: &[(&str, &Arc<EmbedDescriptor>)],
    prefix: &str,
    used: &mut Vec<String>,
) -> Result<(Shape, Mapping)> {
    // The "select everything" default: catalog order, embed groups after.
    let default_fields;
    let fields = if fields.is_empty() {
        default_fields = default_selection(catalog, active);
        &default_fields[..]
    } else {
        fields
    };

    let mut slots = Vec::new();
    let mut entries = Vec::new();
    let mut seen = HashSet::with_capacity(fields.len());
    let mut done: HashSet<&str> = HashSet::new();

    for field in fields {
        if !seen.insert(field.as_str()) {
            return Err(FormatError::DuplicateField(format!("{}{}", prefix, field)));
        }
        let (head, rest) = match field.find('.') {
            Some(idx) => (&field[..idx], Some(&field[idx + 1..])),
            None => (field.as_str(), None),
        };
        if head.is_empty() {
            return Err(FormatError::UnknownField(format!("{}{}", prefix, field)));
        }
        if done.contains(head) {
            continue;
        }

        // An active embed namespace shadows a same-named catalog field.
        if let Some((_, descriptor)) = active.iter().find(|(name, _)| *name == head) {
            done.insert(head);
            let subfields = subpaths(fields, head);
            let (subshape, submapping) = build_level(
                &descriptor.catalog,
                &subfields,
                &[],
                &format!("{}{}.", prefix, head),
                used,
            )?;
            slots.push(ShapeSlot {
                name: head.to_string(),
                kind: SlotKind::Record(subshape),
            });
            entries.push(Source::Embed {
                name: head.to_string(),
                mapping: submapping,
            });
            if !used.iter().any(|u| u == head) {
                used.push(head.to_string());
            }
            continue;
        }

        if let Some(group) = catalog.group(head) {
            done.insert(head);
            let subfields = subpaths(fields, head);
            let (slot, entry) = build_group(group, &subfields, prefix, used)?;
            slots.push(slot);
            entries.push(entry);
            continue;
        }

        match rest {
            None => match catalog.field(head) {
                Some(leaf) => {
                    slots.push(ShapeSlot {
                        name: head.to_string(),
                        kind: SlotKind::Leaf,
                    });
                    entries.push(Source::Field {
                        access: leaf.access.clone(),
                    });
                }
                None => {
                    return Err(FormatError::UnknownField(format!("{}{}", prefix, field)));
                }
            },
            // A dotted path whose head is not a group (a primitive leaf,
            // or nothing at all) is unknown; this also rejects malformed
            // paths with empty segments.
            Some(_) => {
                return Err(FormatError::UnknownField(format!("{}{}", prefix, field)));
            }
        }
    }

    Ok((Shape { slots }, Mapping { entries }))
}

/// Build the slot and mapping entry for one record-valued group.
fn build_group(
    group: &FieldDescriptor,
    subfields: &[String],
    prefix: &str,
    used: &mut Vec<String>,
) -> Result<(ShapeSlot, Source)> {
    let subprefix = format!("{}{}.", prefix, group.name);
    let (kind, entry) = match &group.kind {
        FieldKind::Record(subcatalog) => {
            let (shape, mapping) = build_level(subcatalog, subfields, &[], &subprefix, used)?;
            (
                SlotKind::Record(shape),
                Source::Record {
                    access: group.access.clone(),
                    mapping,
                },
            )
        }
        FieldKind::OptionalRecord(subcatalog) => {
            let (shape, mapping) = build_level(subcatalog, subfields, &[], &subprefix, used)?;
            (
                SlotKind::OptionalRecord(shape),
                Source::Record {
                    access: group.access.clone(),
                    mapping,
                },
            )
        }
        FieldKind::RecordList(subcatalog) => {
            let (shape, mapping) = build_level(subcatalog, subfields, &[], &subprefix, used)?;
            (
                SlotKind::List(shape),
                Source::List {
                    access: group.access.clone(),
                    mapping,
                },
            )
        }
        FieldKind::Primitive => {
            // Groups are record-valued by construction.
            unreachable!("primitive descriptor registered as group {}", group.name)
        }
    };
    Ok((
        ShapeSlot {
            name: group.name.clone(),
            kind,
        },
        entry,
    ))
}

/// All entries nested under `head.`, with the prefix stripped.
///
/// A bare mention of the group contributes nothing: on its own it means
/// "everything", while dotted siblings narrow the group to their subset.
fn subpaths(fields: &[String], head: &str) -> Vec<String> {
    let mut prefix = String::with_capacity(head.len() + 1);
    prefix.push_str(head);
    prefix.push('.');
    fields
        .iter()
        .filter_map(|f| f.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

/// The default field list: every visible catalog field, then every field
/// of each active embed under its namespace.
fn default_selection(
    catalog: &TypeCatalog,
    active: &[(&str, &Arc<EmbedDescriptor>)],
) -> Vec<String> {
    let mut fields: Vec<String> = catalog.field_names().map(str::to_string).collect();
    for (name, descriptor) in active {
        for leaf in descriptor.catalog.field_names() {
            fields.push(format!("{}.{}", name, leaf));
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecordType;

    fn catalog() -> Arc<TypeCatalog> {
        let address = Arc::new(
            RecordType::builder("Address")
                .field("city")
                .field("zip")
                .build(),
        );
        let ty = RecordType::builder("User")
            .field("id")
            .field("name")
            .record_field("address", &address)
            .record_list_field("past", &address)
            .build();
        TypeCatalog::build(&ty)
    }

    fn slot_names(shape: &Shape) -> Vec<&str> {
        shape.slots.iter().map(|s| s.name.as_str()).collect()
    }

    fn build(fields: &[&str]) -> Result<FormatPlan> {
        build_plan(&catalog(), fields, &[], &HashMap::new())
    }

    #[test]
    fn test_order_of_first_occurrence() {
        let plan = build(&["name", "address.zip", "id", "address.city"]).expect("plan");
        assert_eq!(slot_names(&plan.shape), vec!["name", "address", "id"]);
        match &plan.shape.slots[1].kind {
            SlotKind::Record(sub) => assert_eq!(slot_names(sub), vec!["zip", "city"]),
            other => panic!("expected record slot, got {:?}", other),
        }
    }

    #[test]
    fn test_default_selection_expands_catalog_order() {
        let plan = build(&[]).expect("plan");
        assert_eq!(slot_names(&plan.shape), vec!["id", "name", "address", "past"]);
        match &plan.shape.slots[3].kind {
            SlotKind::List(sub) => assert_eq!(slot_names(sub), vec!["city", "zip"]),
            other => panic!("expected list slot, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_group_selects_all() {
        let plan = build(&["address"]).expect("plan");
        match &plan.shape.slots[0].kind {
            SlotKind::Record(sub) => assert_eq!(slot_names(sub), vec!["city", "zip"]),
            other => panic!("expected record slot, got {:?}", other),
        }
    }

    #[test]
    fn test_dotted_sibling_narrows_bare_group() {
        let plan = build(&["address", "address.zip"]).expect("plan");
        match &plan.shape.slots[0].kind {
            SlotKind::Record(sub) => assert_eq!(slot_names(sub), vec!["zip"]),
            other => panic!("expected record slot, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_full_path() {
        let err = build(&["id", "id"]).expect_err("duplicate");
        assert!(matches!(err, FormatError::DuplicateField(p) if p == "id"));

        let err = build(&["address.zip", "address.zip"]).expect_err("duplicate");
        assert!(matches!(err, FormatError::DuplicateField(p) if p == "address.zip"));
    }

    #[test]
    fn test_unknown_field_keeps_full_path() {
        let err = build(&["bogus"]).expect_err("unknown");
        assert!(matches!(err, FormatError::UnknownField(p) if p == "bogus"));

        let err = build(&["address.bogus"]).expect_err("unknown");
        assert!(matches!(err, FormatError::UnknownField(p) if p == "address.bogus"));
    }

    #[test]
    fn test_primitive_with_suffix_rejected() {
        let err = build(&["id.sub"]).expect_err("suffix");
        assert!(matches!(err, FormatError::UnknownField(p) if p == "id.sub"));
    }

    #[test]
    fn test_empty_segment_rejected() {
        let err = build(&["address..zip"]).expect_err("empty segment");
        assert!(matches!(err, FormatError::UnknownField(p) if p == "address..zip"));

        let err = build(&[""]).expect_err("empty path");
        assert!(matches!(err, FormatError::UnknownField(p) if p.is_empty()));
    }

    #[test]
    fn test_unknown_embed() {
        let err = build_plan(&catalog(), &[], &["author"], &HashMap::new()).expect_err("embed");
        assert!(matches!(err, FormatError::UnknownEmbed(n) if n == "author"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let fields = ["name", "address.zip", "past.city"];
        let first = build(&fields).expect("plan");
        let second = build(&fields).expect("plan");
        assert_eq!(first.shape, second.shape);
        assert_eq!(first.mapping, second.mapping);
    }
}
