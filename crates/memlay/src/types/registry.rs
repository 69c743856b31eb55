// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Explicit name-to-descriptor registry.
//!
//! The registry is a plain object owned by the schema-definition context;
//! there is no process-wide type table. Lookups of unregistered names fail
//! with [`Error::InvalidType`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{PrimitiveKind, TypeDescriptor, ALL_PRIMITIVES};

/// Maps type names to descriptors.
///
/// Canonical primitive names (`int8` .. `float64`) plus the legacy alias
/// spellings (capitalized names and `char`) are pre-registered by
/// [`TypeRegistry::with_primitives`]; every alias resolves to the same
/// shared descriptor.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    map: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with all primitive descriptors and their aliases.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        for kind in ALL_PRIMITIVES {
            let desc = Arc::new(TypeDescriptor::primitive(kind));
            registry.map.insert(kind.name().to_string(), desc.clone());
            registry.map.insert(capitalize(kind.name()), desc);
        }
        // C-style alias: char is an unsigned byte.
        let u8_desc = registry.map[PrimitiveKind::U8.name()].clone();
        registry.map.insert("char".to_string(), u8_desc.clone());
        registry.map.insert("Char".to_string(), u8_desc);
        registry
    }

    /// Register a descriptor under its own name.
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register(&mut self, desc: Arc<TypeDescriptor>) {
        log::debug!("registering type {}", desc.name);
        self.map.insert(desc.name.clone(), desc);
    }

    /// Register a descriptor under an additional alias.
    pub fn register_alias(&mut self, alias: impl Into<String>, desc: Arc<TypeDescriptor>) {
        self.map.insert(alias.into(), desc);
    }

    /// Look up a descriptor by name or alias.
    pub fn lookup(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        self.map
            .get(name)
            .cloned()
            .ok_or_else(|| Error::InvalidType(name.to_string()))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        let reg = TypeRegistry::with_primitives();
        assert_eq!(reg.lookup("uint32").unwrap().size(), 4);
        assert_eq!(reg.lookup("float64").unwrap().size(), 8);
    }

    #[test]
    fn aliases_share_descriptors() {
        let reg = TypeRegistry::with_primitives();
        let canonical = reg.lookup("uint8").unwrap();
        assert!(Arc::ptr_eq(&canonical, &reg.lookup("Uint8").unwrap()));
        assert!(Arc::ptr_eq(&canonical, &reg.lookup("char").unwrap()));
    }

    #[test]
    fn unknown_name_is_invalid_type() {
        let reg = TypeRegistry::with_primitives();
        assert_eq!(
            reg.lookup("uint128").unwrap_err(),
            Error::InvalidType("uint128".to_string())
        );
    }

    #[test]
    fn register_custom_type() {
        let mut reg = TypeRegistry::with_primitives();
        let elem = reg.lookup("uint16").unwrap();
        let desc = Arc::new(TypeDescriptor::array(elem, 4));
        reg.register(desc.clone());
        assert!(Arc::ptr_eq(&reg.lookup("uint16[4]").unwrap(), &desc));
    }
}
