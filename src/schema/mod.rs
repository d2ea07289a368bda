//! Declarative collection and index definitions.
//!
//! Each submodule owns one collection: its `$jsonSchema` validator and the
//! indexes created on it. The bootstrap routine walks [`collections`] in
//! order and never special-cases a collection by name.

use std::time::Duration;

use mongodb::{
    IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};

pub mod carts;
pub mod restaurants;
pub mod users;

#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub validator: fn() -> Document,
    pub indexes: &'static [IndexSpec],
}

impl CollectionSpec {
    /// The full `validator` option passed to `createCollection`.
    pub fn validator_document(&self) -> Document {
        doc! { "$jsonSchema": (self.validator)() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: &'static [(&'static str, i32)],
    pub unique: bool,
    pub expire_after_secs: Option<u64>,
}

impl IndexSpec {
    pub const fn new(keys: &'static [(&'static str, i32)]) -> Self {
        Self {
            keys,
            unique: false,
            expire_after_secs: None,
        }
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn expire_after(mut self, secs: u64) -> Self {
        self.expire_after_secs = Some(secs);
        self
    }

    /// Same name the server would generate, e.g. `address.city_1`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, direction)| format!("{field}_{direction}"))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn key_document(&self) -> Document {
        let mut keys = Document::new();
        for (field, direction) in self.keys {
            keys.insert(*field, *direction);
        }
        keys
    }

    pub fn to_model(&self) -> IndexModel {
        let options = IndexOptions::builder()
            .name(self.name())
            .unique(self.unique.then_some(true))
            .expire_after(self.expire_after_secs.map(Duration::from_secs))
            .build();

        IndexModel::builder()
            .keys(self.key_document())
            .options(options)
            .build()
    }
}

/// Collections in creation order.
pub fn collections() -> &'static [CollectionSpec] {
    const ALL: &[CollectionSpec] = &[users::SPEC, restaurants::SPEC, carts::SPEC];
    ALL
}

pub fn index_count() -> usize {
    collections().iter().map(|spec| spec.indexes.len()).sum()
}
