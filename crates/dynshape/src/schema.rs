// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record metadata: the data-driven field table a record type supplies
//! once, in place of runtime reflection.
//!
//! A [`RecordType`] lists the declared fields of one record in declaration
//! order, each optionally carrying an external name tag, an exclusion
//! marker, an `omit_empty` marker (a hint for the downstream serializer,
//! ignored by the projection core) and an `anonymous` marker for embedded
//! sub-records. Types that want the typed entry points implement
//! [`Record`].

use serde::Serialize;
use std::sync::Arc;

/// Classification of a declared field's type.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Any non-record value: numbers, strings, booleans, lists of
    /// primitives, maps. Copied through projection unchanged.
    Primitive,
    /// A nested record value.
    Record(Arc<RecordType>),
    /// An optional nested record; absence serializes to `null`.
    OptionalRecord(Arc<RecordType>),
    /// A list of record values.
    RecordList(Arc<RecordType>),
    /// The enclosing record type itself, directly or behind an optional.
    /// Retained as an opaque leaf so catalog construction terminates.
    SelfRecord,
}

/// One declared field of a record type.
#[derive(Debug, Clone)]
pub struct RecordField {
    /// Declared name: the key under which the field appears in the
    /// serialized source value.
    pub name: String,
    /// External name tag; the declared name is used when absent.
    pub tag: Option<String>,
    /// Excluded fields never appear in any catalog or output.
    pub exclude: bool,
    /// Omit-when-empty hint for the output encoder. The core always
    /// includes a selected field regardless of emptiness.
    pub omit_empty: bool,
    /// True for fields promoted from an embedded sub-record.
    pub anonymous: bool,
    /// Field type classification.
    pub ty: FieldType,
}

impl RecordField {
    /// Create a field with the default external name.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            tag: None,
            exclude: false,
            omit_empty: false,
            anonymous: false,
            ty,
        }
    }

    /// Set the external name tag.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Mark the field as excluded.
    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// Mark the field as omit-when-empty for the serializer.
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Mark the field as promoted from an embedded sub-record.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// External key of the field.
    pub fn key(&self) -> &str {
        self.tag.as_deref().unwrap_or(&self.name)
    }
}

/// The declared fields of one record type, in declaration order.
#[derive(Debug, Clone)]
pub struct RecordType {
    /// Type name; the cache identity of the type, unique per formatter.
    pub name: String,
    /// Declared fields.
    pub fields: Vec<RecordField>,
}

impl RecordType {
    /// Start building a record type.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name)
    }

    /// Get a declared field by its external key.
    pub fn field(&self, key: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.key() == key)
    }
}

/// Fluent builder for [`RecordType`], one call per declared field.
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<RecordField>,
}

impl RecordTypeBuilder {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a primitive field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(RecordField::new(name, FieldType::Primitive));
        self
    }

    /// Add a primitive field with an external name tag.
    pub fn tagged_field(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.fields
            .push(RecordField::new(name, FieldType::Primitive).tagged(tag));
        self
    }

    /// Add an excluded field.
    pub fn excluded_field(mut self, name: impl Into<String>) -> Self {
        self.fields
            .push(RecordField::new(name, FieldType::Primitive).excluded());
        self
    }

    /// Add a nested record field.
    pub fn record_field(mut self, name: impl Into<String>, ty: &Arc<RecordType>) -> Self {
        self.fields
            .push(RecordField::new(name, FieldType::Record(ty.clone())));
        self
    }

    /// Add an optional nested record field.
    pub fn optional_record_field(mut self, name: impl Into<String>, ty: &Arc<RecordType>) -> Self {
        self.fields
            .push(RecordField::new(name, FieldType::OptionalRecord(ty.clone())));
        self
    }

    /// Add a list-of-records field.
    pub fn record_list_field(mut self, name: impl Into<String>, ty: &Arc<RecordType>) -> Self {
        self.fields
            .push(RecordField::new(name, FieldType::RecordList(ty.clone())));
        self
    }

    /// Add an embedded (anonymous) sub-record field.
    pub fn embedded_field(mut self, name: impl Into<String>, ty: &Arc<RecordType>) -> Self {
        self.fields
            .push(RecordField::new(name, FieldType::Record(ty.clone())).anonymous());
        self
    }

    /// Add a field whose type is the enclosing record type itself.
    pub fn self_record_field(mut self, name: impl Into<String>) -> Self {
        self.fields
            .push(RecordField::new(name, FieldType::SelfRecord));
        self
    }

    /// Add a fully configured field.
    pub fn push(mut self, field: RecordField) -> Self {
        self.fields.push(field);
        self
    }

    /// Build the record type.
    pub fn build(self) -> RecordType {
        RecordType {
            name: self.name,
            fields: self.fields,
        }
    }
}

/// Implemented by types that know their own record metadata.
///
/// The metadata table is consulted on the first `format` call for the
/// type and memoized by type name, so `record_type` may build it fresh
/// on each invocation.
pub trait Record: Serialize {
    /// The field metadata table for this type.
    fn record_type() -> Arc<RecordType>;
}
