// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Embed descriptors: externally fetched side resources merged into the
//! output under their own namespace.
//!
//! An embed pairs a name with the host field holding the lookup id, a
//! fetch callback and the catalog of the fetched value's record type.
//! Registration happens once per process on the owning
//! [`Formatter`](crate::Formatter); lookups happen at shape-build time.

use crate::catalog::TypeCatalog;
use crate::error::FetchError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Fetch callback: resolves a lookup id to the embedded value.
///
/// The returned value is treated opaquely by the core and projected
/// through the embed's result catalog. The callback is invoked
/// synchronously from within projection, so its latency sits on the
/// critical path of the `format` call.
pub type EmbedFn = Box<dyn Fn(&Value) -> std::result::Result<Value, FetchError> + Send + Sync>;

/// A registered embed.
pub struct EmbedDescriptor {
    /// Embed name; the namespace its fields appear under.
    pub(crate) name: String,
    /// Leaf field of the host catalog whose value is the lookup id.
    pub(crate) id_field: String,
    /// Fetch callback.
    pub(crate) fetch: EmbedFn,
    /// Catalog of the fetched value's record type.
    pub(crate) catalog: Arc<TypeCatalog>,
}

impl EmbedDescriptor {
    /// Embed name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host field holding the lookup id.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Catalog of the fetched value's record type.
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }
}

impl fmt::Debug for EmbedDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedDescriptor")
            .field("name", &self.name)
            .field("id_field", &self.id_field)
            .field("result_type", &self.catalog.type_name())
            .finish_non_exhaustive()
    }
}
