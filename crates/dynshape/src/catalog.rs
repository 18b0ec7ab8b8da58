// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type catalogs: the parsed, flattened description of one record type's
//! externally visible fields.
//!
//! A catalog lists leaf fields in declaration order, with nested record
//! leaves flattened under dotted names (`parent.child`), mirroring the
//! default "select everything" field list. Record-valued fields are
//! additionally kept as *groups* carrying the catalog of their element
//! type, which the shape builder descends into for nested selections.
//!
//! A field whose type is the catalog's own record type (directly, behind
//! an optional, or anywhere up the in-progress build stack) is retained
//! as an opaque primitive leaf instead of being expanded, so catalogs of
//! self-referential types always terminate.

use crate::schema::{FieldType, RecordType};
use std::sync::Arc;

/// Field classification within a catalog.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Copied through unchanged.
    Primitive,
    /// Nested record with its own catalog.
    Record(Arc<TypeCatalog>),
    /// Optional nested record; absent projects to `null`.
    OptionalRecord(Arc<TypeCatalog>),
    /// List of records; the catalog describes one element.
    RecordList(Arc<TypeCatalog>),
}

/// One externally visible field of a record type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// External key; dotted for leaves flattened out of nested records.
    pub name: String,
    /// Declared-name steps from the enclosing record to the value.
    pub access: Vec<String>,
    /// Field classification.
    pub kind: FieldKind,
    /// Promoted from an embedded sub-record. Internal bookkeeping only;
    /// never affects output naming.
    pub anonymous: bool,
}

/// Ordered catalog of one record type's visible fields.
#[derive(Debug)]
pub struct TypeCatalog {
    type_name: String,
    /// Flattened visible fields; also the default field selection.
    fields: Vec<FieldDescriptor>,
    /// Record-valued fields resolvable by top-level name.
    groups: Vec<FieldDescriptor>,
}

impl TypeCatalog {
    /// Build the catalog for a record type.
    ///
    /// Excluded fields are skipped; nested records are flattened; self
    /// references become opaque leaves.
    pub fn build(ty: &RecordType) -> Arc<Self> {
        let mut stack = Vec::new();
        Self::build_inner(ty, &mut stack)
    }

    fn build_inner(ty: &RecordType, stack: &mut Vec<String>) -> Arc<Self> {
        stack.push(ty.name.clone());
        let mut fields = Vec::new();
        let mut groups = Vec::new();

        for field in &ty.fields {
            if field.exclude {
                continue;
            }
            let key = field.key().to_string();
            let access = vec![field.name.clone()];

            match &field.ty {
                FieldType::Primitive | FieldType::SelfRecord => {
                    fields.push(FieldDescriptor {
                        name: key,
                        access,
                        kind: FieldKind::Primitive,
                        anonymous: field.anonymous,
                    });
                }
                FieldType::Record(sub) | FieldType::OptionalRecord(sub)
                    if stack.contains(&sub.name) =>
                {
                    // Cycle through another type instance: opaque leaf.
                    fields.push(FieldDescriptor {
                        name: key,
                        access,
                        kind: FieldKind::Primitive,
                        anonymous: field.anonymous,
                    });
                }
                FieldType::Record(sub) | FieldType::OptionalRecord(sub) => {
                    let subcatalog = Self::build_inner(sub, stack);
                    let kind = if matches!(field.ty, FieldType::OptionalRecord(_)) {
                        FieldKind::OptionalRecord(subcatalog.clone())
                    } else {
                        FieldKind::Record(subcatalog.clone())
                    };
                    groups.push(FieldDescriptor {
                        name: key.clone(),
                        access: access.clone(),
                        kind,
                        anonymous: field.anonymous,
                    });
                    for leaf in subcatalog.fields() {
                        fields.push(FieldDescriptor {
                            name: format!("{}.{}", key, leaf.name),
                            access: access
                                .iter()
                                .chain(leaf.access.iter())
                                .cloned()
                                .collect(),
                            kind: leaf.kind.clone(),
                            anonymous: field.anonymous && leaf.anonymous,
                        });
                    }
                }
                FieldType::RecordList(sub) => {
                    if stack.contains(&sub.name) {
                        fields.push(FieldDescriptor {
                            name: key,
                            access,
                            kind: FieldKind::Primitive,
                            anonymous: field.anonymous,
                        });
                    } else {
                        let subcatalog = Self::build_inner(sub, stack);
                        let descriptor = FieldDescriptor {
                            name: key,
                            access,
                            kind: FieldKind::RecordList(subcatalog),
                            anonymous: field.anonymous,
                        };
                        groups.push(descriptor.clone());
                        fields.push(descriptor);
                    }
                }
            }
        }

        stack.pop();
        Arc::new(Self {
            type_name: ty.name.clone(),
            fields,
            groups,
        })
    }

    /// Name of the described record type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Flattened visible fields, in order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get a flattened field by its (possibly dotted) name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a record-valued group by its top-level name.
    pub fn group(&self, name: &str) -> Option<&FieldDescriptor> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Names of the flattened visible fields: the default selection.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
