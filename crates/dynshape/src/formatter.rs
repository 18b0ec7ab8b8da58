// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The formatter: a context object owning the catalog, plan and embed
//! tables, shared by arbitrarily many concurrent callers.
//!
//! Catalogs are memoized by record type name; plans by (type name,
//! canonical selection signature). Lookups take a read lock; a miss
//! builds outside any lock (builds are pure functions of their inputs)
//! and inserts under a write lock, last writer wins. Once cached, a plan
//! is immutable and read without synchronization.
//!
//! Build failures are never cached; the next identical call simply fails
//! again before any expensive work.

use crate::catalog::TypeCatalog;
use crate::embed::{EmbedDescriptor, EmbedFn};
use crate::error::{FetchError, FormatError, Result};
use crate::project::{project, read_path};
use crate::schema::{Record, RecordType};
use crate::shape::{build_plan, FormatPlan};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache key for built plans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    type_name: String,
    signature: String,
}

/// Dynamic sparse-fieldset formatter.
///
/// One per application, constructed at startup; embeds are registered
/// once, then `format_*` may be called from any number of threads.
#[derive(Debug, Default)]
pub struct Formatter {
    catalogs: RwLock<HashMap<String, Arc<TypeCatalog>>>,
    plans: RwLock<HashMap<PlanKey, Arc<FormatPlan>>>,
    embeds: RwLock<HashMap<String, Arc<EmbedDescriptor>>>,
}

impl Formatter {
    /// Create an empty formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an embed under `name`.
    ///
    /// `id_field` names the host leaf field whose value is passed to
    /// `fetch`; `result_type` describes the fetched value's record type,
    /// whose catalog is built and cached immediately. Registering the
    /// same name again replaces the previous descriptor.
    pub fn register_embed<F>(
        &self,
        name: &str,
        id_field: &str,
        fetch: F,
        result_type: &RecordType,
    ) -> Result<()>
    where
        F: Fn(&Value) -> std::result::Result<Value, FetchError> + Send + Sync + 'static,
    {
        let catalog = self.catalog_for(result_type);
        let descriptor = Arc::new(EmbedDescriptor {
            name: name.to_string(),
            id_field: id_field.to_string(),
            fetch: Box::new(fetch) as EmbedFn,
            catalog,
        });
        self.embeds.write().insert(name.to_string(), descriptor);
        log::debug!("[FORMAT] registered embed {} (id field {})", name, id_field);
        Ok(())
    }

    /// Format one record, returning only the selected fields (or all
    /// visible fields when `fields` is empty), including the selected
    /// embeds.
    ///
    /// An empty selection always goes through the "select all" shape;
    /// the source value is never returned untouched, so fields excluded
    /// by their metadata can never leak.
    ///
    /// # Example
    ///
    /// ```
    /// use dynshape::{Formatter, Record, RecordType};
    /// use serde::Serialize;
    /// use std::sync::Arc;
    ///
    /// #[derive(Serialize)]
    /// struct Article {
    ///     id: u64,
    ///     title: String,
    /// }
    ///
    /// impl Record for Article {
    ///     fn record_type() -> Arc<RecordType> {
    ///         Arc::new(RecordType::builder("Article").field("id").field("title").build())
    ///     }
    /// }
    ///
    /// # fn main() -> dynshape::Result<()> {
    /// let formatter = Formatter::new();
    /// let article = Article { id: 7, title: "hello".to_string() };
    /// let out = formatter.format_object(&article, &["title"], &[])?;
    /// assert_eq!(out.to_string(), r#"{"title":"hello"}"#);
    /// # Ok(())
    /// # }
    /// ```
    pub fn format_object<T: Record>(
        &self,
        value: &T,
        fields: &[&str],
        embeds: &[&str],
    ) -> Result<Value> {
        let ty = T::record_type();
        let src = serde_json::to_value(value)?;
        self.format_value(&ty, &src, fields, embeds)
    }

    /// Format a list of records, reusing one plan for every element.
    ///
    /// The first element error aborts the whole call; no partial list is
    /// returned.
    pub fn format_list<T: Record>(
        &self,
        values: &[T],
        fields: &[&str],
        embeds: &[&str],
    ) -> Result<Value> {
        let ty = T::record_type();
        let plan = self.plan_for(&ty, fields, embeds)?;
        let mut out = Vec::with_capacity(values.len());
        for value in values {
            let src = serde_json::to_value(value)?;
            if !src.is_object() {
                return Err(FormatError::NotARecord(ty.name.clone()));
            }
            out.push(self.project_with(&plan, &src)?);
        }
        Ok(Value::Array(out))
    }

    /// Format an already-serialized record value of the given type.
    pub fn format_value(
        &self,
        ty: &RecordType,
        value: &Value,
        fields: &[&str],
        embeds: &[&str],
    ) -> Result<Value> {
        if !value.is_object() {
            return Err(FormatError::NotARecord(ty.name.clone()));
        }
        let plan = self.plan_for(ty, fields, embeds)?;
        self.project_with(&plan, value)
    }

    /// Look up or build the catalog for a record type.
    fn catalog_for(&self, ty: &RecordType) -> Arc<TypeCatalog> {
        if let Some(catalog) = self.catalogs.read().get(&ty.name) {
            return catalog.clone();
        }
        log::debug!("[FORMAT] catalog miss: parsing record type {}", ty.name);
        let catalog = TypeCatalog::build(ty);
        self.catalogs
            .write()
            .insert(ty.name.clone(), catalog.clone());
        catalog
    }

    /// Look up or build the plan for one (type, selection) pair.
    fn plan_for(&self, ty: &RecordType, fields: &[&str], embeds: &[&str]) -> Result<Arc<FormatPlan>> {
        let key = PlanKey {
            type_name: ty.name.clone(),
            signature: signature(fields, embeds),
        };
        if let Some(plan) = self.plans.read().get(&key) {
            log::trace!("[FORMAT] plan hit for {} sig={}", key.type_name, key.signature);
            return Ok(plan.clone());
        }
        log::debug!(
            "[FORMAT] plan miss: building shape for {} sig={}",
            key.type_name,
            key.signature
        );
        let catalog = self.catalog_for(ty);
        let plan = {
            let registry = self.embeds.read();
            Arc::new(build_plan(&catalog, fields, embeds, &registry)?)
        };
        self.plans.write().insert(key, plan.clone());
        Ok(plan)
    }

    /// Fetch the plan's embeds from the original source value, then
    /// project.
    fn project_with(&self, plan: &FormatPlan, src: &Value) -> Result<Value> {
        let mut fetched = HashMap::new();
        if !plan.embeds.is_empty() {
            let registry = self.embeds.read();
            for usage in &plan.embeds {
                let descriptor = registry
                    .get(&usage.name)
                    .ok_or_else(|| FormatError::UnknownEmbed(usage.name.clone()))?;
                let id = read_path(src, &usage.id_access)
                    .cloned()
                    .unwrap_or(Value::Null);
                let value =
                    (descriptor.fetch)(&id).map_err(|source| FormatError::EmbedFetchFailed {
                        name: usage.name.clone(),
                        source,
                    })?;
                fetched.insert(usage.name.clone(), value);
            }
        }
        project(&plan.shape, &plan.mapping, src, &fetched)
    }
}

/// Canonical cache signature: fields then embeds, order preserved.
fn signature(fields: &[&str], embeds: &[&str]) -> String {
    let mut signature = fields.join("|");
    signature.push_str("||");
    signature.push_str(&embeds.join("|"));
    signature
}
