//! Model-id mapping between caller-visible and backend-internal ids.
//!
//! An id with no mapping translates to an empty string in either direction,
//! which makes a mapper double as an allow-list.

use std::collections::HashMap;
use std::fmt;

/// Bidirectional model-id translation.
pub trait ModelMapper: Send + Sync + fmt::Debug {
    /// Public id → backend id. Empty when the id is not allowed.
    fn to_backend(&self, id: &str) -> String;

    /// Backend id → public id. Empty when the backend model is not exposed.
    fn from_backend(&self, id: &str) -> String;
}

/// A mapper built from a fixed table of `(public, backend)` pairs.
#[derive(Clone, Debug, Default)]
pub struct StaticModelMapper {
    to_backend: HashMap<String, String>,
    from_backend: HashMap<String, String>,
}

impl StaticModelMapper {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut mapper = StaticModelMapper::default();
        for (public, backend) in pairs {
            let (public, backend) = (public.into(), backend.into());
            mapper.from_backend.insert(backend.clone(), public.clone());
            mapper.to_backend.insert(public, backend);
        }
        mapper
    }

    pub fn len(&self) -> usize {
        self.to_backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_backend.is_empty()
    }
}

impl ModelMapper for StaticModelMapper {
    fn to_backend(&self, id: &str) -> String {
        self.to_backend.get(id).cloned().unwrap_or_default()
    }

    fn from_backend(&self, id: &str) -> String {
        self.from_backend.get(id).cloned().unwrap_or_default()
    }
}
