//! Catalog manifests: a catalog described in YAML or JSON.
//!
//! ```yaml
//! namespace: App::Http
//! namespaces:
//!   - App::Http::Admin::Empty
//! handlers:
//!   App::Http::Get: []
//!   App::Http::FooItem::GetFooItem:
//!     - { name: id, type: int }
//!   App::Http::FooItems::GetFooItems:
//!     - { name: page, type: int, optional: true }
//! values:
//!   Value::Id:
//!     - { name: id, type: int }
//! ```
//!
//! Positions are assigned from list order, so `position` can be omitted.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::Catalog;
use crate::types::ParameterDescriptor;

/// Serialization format of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ManifestFormat::Json,
            _ => ManifestFormat::Yaml,
        }
    }
}

/// On-disk shape of a catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub namespace: String,
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub handlers: BTreeMap<String, Vec<ParameterDescriptor>>,
    #[serde(default)]
    pub values: BTreeMap<String, Vec<ParameterDescriptor>>,
}

impl Manifest {
    /// Parse a manifest from text
    ///
    /// # Errors
    ///
    /// Returns an error when the text does not parse in the given format.
    pub fn parse(content: &str, format: ManifestFormat) -> anyhow::Result<Self> {
        let manifest = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content).context("Invalid YAML manifest")?,
            ManifestFormat::Json => serde_json::from_str(content).context("Invalid JSON manifest")?,
        };
        Ok(manifest)
    }

    /// Build and validate the catalog this manifest describes
    ///
    /// # Errors
    ///
    /// Returns an error when [`Catalog::validate`] rejects the declarations.
    pub fn into_catalog(self) -> anyhow::Result<Catalog> {
        let mut catalog = Catalog::new(&self.namespace);
        for namespace in &self.namespaces {
            catalog.add_namespace(namespace);
        }
        for (type_name, params) in self.values {
            catalog.add_value_type(&type_name, params);
        }
        for (handler_id, params) in self.handlers {
            catalog.add_handler(&handler_id, params);
        }
        catalog.validate()?;
        Ok(catalog)
    }
}

impl Catalog {
    /// Load a catalog from a manifest file (`.json` as JSON, otherwise YAML)
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, does not parse, or
    /// fails validation.
    pub fn from_manifest_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {:?}", path))?;
        let catalog = Self::from_manifest_str(&content, ManifestFormat::from_path(path))
            .with_context(|| format!("Failed to load manifest {:?}", path))?;
        info!(
            manifest = %path.display(),
            namespace = %catalog.root_namespace(),
            handlers = catalog.len(),
            "Catalog manifest loaded"
        );
        Ok(catalog)
    }

    /// Load a catalog from manifest text
    ///
    /// # Errors
    ///
    /// Returns an error when the text does not parse or fails validation.
    pub fn from_manifest_str(content: &str, format: ManifestFormat) -> anyhow::Result<Self> {
        Manifest::parse(content, format)?.into_catalog()
    }
}
