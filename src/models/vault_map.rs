//! Vault to recipient mapping
//!
//! Parsed from a JSON object such as
//! `{"vault-a": ["ops@example.com"], "vault-b": ["a@example.com", "b@example.com"]}`.
//! Vaults are visited in the order they appear in the document.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::ReportError;

/// Recipients of one vault's report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecipients {
    pub vault_id: String,
    pub recipients: Vec<String>,
}

/// Ordered mapping from vault id to its distribution list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultEmailMap {
    entries: Vec<VaultRecipients>,
}

impl VaultEmailMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a vault's recipients, keeping its first position
    pub fn insert(&mut self, vault_id: impl Into<String>, recipients: Vec<String>) {
        let vault_id = vault_id.into();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.vault_id == vault_id) {
            existing.recipients = recipients;
        } else {
            self.entries.push(VaultRecipients {
                vault_id,
                recipients,
            });
        }
    }

    /// Recipients for a vault
    pub fn recipients(&self, vault_id: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.vault_id == vault_id)
            .map(|e| e.recipients.as_slice())
    }

    /// Iterate in document order
    pub fn iter(&self) -> impl Iterator<Item = &VaultRecipients> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for VaultEmailMap {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(s)
            .map_err(|e| ReportError::Config(format!("Invalid vault email map: {}", e)))
    }
}

impl<'de> Deserialize<'de> for VaultEmailMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = VaultEmailMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping vault ids to lists of email addresses")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = VaultEmailMap::new();
                while let Some((vault_id, recipients)) =
                    access.next_entry::<String, Vec<String>>()?
                {
                    if vault_id.is_empty() {
                        return Err(de::Error::custom("vault id must not be empty"));
                    }
                    map.insert(vault_id, recipients);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}
