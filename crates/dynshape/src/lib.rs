// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dynshape - dynamic sparse-fieldset projection
//!
//! Lets an API expose a single backing record type while each caller
//! selects an arbitrary, possibly nested, subset of its fields:
//!
//! ```text
//! GET https://api.example.com/v1/articles
//! [{"id":1,"title":"...","body":"...","authorId":3}]
//!
//! GET https://api.example.com/v1/articles?select=title,authorId
//! [{"title":"...","authorId":3}]
//! ```
//!
//! The output matches the shape and field order the caller asked for,
//! including fields pulled in from externally fetched side resources
//! ("embeds"). Derived shapes and their source mappings are cached per
//! (type, selection) pair, so the recursive derivation runs once per
//! distinct selection an application actually issues.
//!
//! ## Quick Start
//!
//! ```rust
//! use dynshape::{Formatter, Record, RecordType, Result};
//! use serde::Serialize;
//! use std::sync::Arc;
//!
//! #[derive(Serialize)]
//! struct Article {
//!     id: u64,
//!     title: String,
//!     author_id: u64,
//! }
//!
//! impl Record for Article {
//!     fn record_type() -> Arc<RecordType> {
//!         Arc::new(
//!             RecordType::builder("Article")
//!                 .field("id")
//!                 .field("title")
//!                 .tagged_field("author_id", "authorId")
//!                 .build(),
//!         )
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let formatter = Formatter::new();
//!     let article = Article { id: 7, title: "hello".to_string(), author_id: 3 };
//!
//!     let out = formatter.format_object(&article, &["title", "authorId"], &[])?;
//!     assert_eq!(out.to_string(), r#"{"title":"hello","authorId":3}"#);
//!
//!     // Empty selection: every visible field, in declaration order.
//!     let out = formatter.format_object(&article, &[], &[])?;
//!     assert_eq!(out.to_string(), r#"{"id":7,"title":"hello","authorId":3}"#);
//!     Ok(())
//! }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Formatter`] | Context object owning the catalog, plan and embed tables |
//! | [`Record`] | Ties a serializable type to its field metadata |
//! | [`RecordType`] | Declared field table of one record type |
//! | [`TypeCatalog`] | Parsed, flattened visible-field description |
//! | [`Shape`] / [`Mapping`] | Derived output structure and its population plan |
//!
//! ## Modules Overview
//!
//! - [`schema`](RecordType) - field metadata a record type supplies once
//! - [`catalog`](TypeCatalog) - flattened catalogs with a recursion guard
//!   for self-referential types
//! - [`shape`](Shape) - selection-driven shape and mapping derivation
//! - [`Formatter`] - concurrent memoization and the projection entry
//!   points
//!
//! Values are `serde_json::Value` throughout; the projected output is
//! serializer-ready and meant to be handed to an external encoder.

mod catalog;
mod embed;
mod error;
mod formatter;
mod project;
mod schema;
mod shape;

pub use catalog::{FieldDescriptor, FieldKind, TypeCatalog};
pub use embed::{EmbedDescriptor, EmbedFn};
pub use error::{FetchError, FormatError, Result};
pub use formatter::Formatter;
pub use schema::{FieldType, Record, RecordField, RecordType, RecordTypeBuilder};
pub use shape::{EmbedUse, FormatPlan, Mapping, Shape, ShapeSlot, SlotKind, Source};
