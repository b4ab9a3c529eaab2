//! Records and filters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{StoreError, StoreResult};

/// Field name → value. `None` is a JSON `null`.
pub type Fields = BTreeMap<String, Option<String>>;

/// A single stored entity: an `id` plus arbitrary string/null fields.
///
/// Serializes flat, e.g. `{"id": "..", "name": "..", "email": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field. Setting `id` is ignored.
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        if name != "id" {
            self.fields.insert(name, value);
        }
    }

    /// Fetch a field by name.
    ///
    /// Returns `Ok(None)` for a null value and [`StoreError::FieldNotFound`]
    /// when the record has no such field at all.
    pub fn field(&self, name: &str) -> StoreResult<Option<&str>> {
        if name == "id" {
            return Ok(Some(&self.id));
        }
        self.fields
            .get(name)
            .map(Option::as_deref)
            .ok_or_else(|| StoreError::FieldNotFound {
                field: name.to_string(),
                id: self.id.clone(),
            })
    }

    /// Fetch a field that must be present and non-null.
    pub fn required(&self, name: &str) -> StoreResult<&str> {
        self.field(name)?.ok_or_else(|| StoreError::InvalidField {
            field: name.to_string(),
            reason: "unexpected null".to_string(),
        })
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Drop the id and keep the fields, e.g. to pass as update data.
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Replace every field except `id`.
    pub(crate) fn replace(&mut self, mut data: Fields) {
        data.remove("id");
        self.fields = data;
    }

    /// Overlay `data` onto the existing fields, keeping `id`.
    pub(crate) fn merge(&mut self, data: Fields) {
        for (name, value) in data {
            self.set(name, value);
        }
    }
}

/// Selection filter.
///
/// A filter carrying `id` selects by exact id. Otherwise a record matches when
/// any filter field, compared case-insensitively, is a substring of the
/// record's field of the same name. A record lacking any filter field is an
/// error, even if another field matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    fields: BTreeMap<String, String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().with("id", id)
    }

    /// Search the same `term` across several fields.
    pub fn search(fields: &[&str], term: &str) -> Self {
        fields
            .iter()
            .fold(Self::new(), |filter, field| filter.with(*field, term))
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn matches(&self, record: &Record) -> StoreResult<bool> {
        if let Some(id) = self.fields.get("id") {
            return Ok(record.id == *id);
        }

        // Every filter field must exist, whichever one matches first.
        let mut values = Vec::with_capacity(self.fields.len());
        for (name, needle) in &self.fields {
            values.push((record.field(name)?, needle));
        }

        Ok(values.into_iter().any(|(value, needle)| {
            value.is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
        }))
    }
}
