//! Read-only catalogue of bundled presets, encodings, transforms and
//! stylesheets.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::error::ConfigResult;
use crate::properties::Properties;
use crate::transform::{SortAttributes, SortElements, StripComments, Transform};
use crate::validator::{ValidationOptions, check_properties};

const BUNDLED_PRESETS: [(&str, &str); 3] = [
    ("pretty", include_str!("../resources/presets/pretty.properties")),
    ("compact", include_str!("../resources/presets/compact.properties")),
    ("raw", include_str!("../resources/presets/raw.properties")),
];

const BUNDLED_STYLESHEETS: [(&str, &str); 1] = [(
    "identity.xslt",
    include_str!("../resources/stylesheets/identity.xslt"),
)];

const WELL_KNOWN_ENCODINGS: [&str; 6] = [
    "UTF-8",
    "UTF-16",
    "ISO-8859-1",
    "US-ASCII",
    "windows-1252",
    "Shift_JIS",
];

#[derive(Default)]
pub struct Registry {
    /// In registration order; the first one is the default.
    presets: Vec<(String, Properties)>,
    encodings: Vec<String>,
    transforms: BTreeMap<String, Arc<dyn Transform>>,
    resources: BTreeMap<String, String>,
}

impl Registry {
    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Everything shipped with the crate.
    pub fn builtin() -> ConfigResult<Self> {
        let mut registry = Self::empty();
        for (name, text) in BUNDLED_PRESETS {
            registry = registry.with_preset(name, Properties::parse(text)?)?;
        }
        for (name, stylesheet) in BUNDLED_STYLESHEETS {
            registry = registry.with_resource(name, stylesheet);
        }
        registry.encodings = WELL_KNOWN_ENCODINGS.iter().map(|e| e.to_string()).collect();
        Ok(registry
            .with_transform(Arc::new(SortAttributes))
            .with_transform(Arc::new(SortElements))
            .with_transform(Arc::new(StripComments)))
    }

    /// Registers a preset after validating it leniently; location keys are
    /// stripped.
    pub fn with_preset(
        mut self,
        name: impl Into<String>,
        properties: Properties,
    ) -> ConfigResult<Self> {
        let name = name.into();
        let checked = check_properties(&properties, ValidationOptions::preset())?;
        debug!("Loaded preset {} ({} properties)", name, checked.len());
        self.presets.retain(|(existing, _)| *existing != name);
        self.presets.push((name, checked));
        Ok(self)
    }

    pub fn with_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms
            .insert(transform.name().to_string(), transform);
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, stylesheet: impl Into<String>) -> Self {
        self.resources.insert(name.into(), stylesheet.into());
        self
    }

    pub fn preset(&self, name: &str) -> Option<&Properties> {
        self.presets
            .iter()
            .find(|(preset, _)| preset == name)
            .map(|(_, properties)| properties)
    }

    pub fn default_preset(&self) -> Option<(&str, &Properties)> {
        self.presets
            .first()
            .map(|(name, properties)| (name.as_str(), properties))
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|(name, _)| name.as_str())
    }

    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }

    pub fn transform(&self, name: &str) -> Option<Arc<dyn Transform>> {
        self.transforms.get(name).cloned()
    }

    pub fn transform_names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub fn resource(&self, name: &str) -> Option<&str> {
        self.resources.get(name).map(String::as_str)
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("presets", &self.preset_names().collect::<Vec<_>>())
            .field("encodings", &self.encodings)
            .field("transforms", &self.transform_names().collect::<Vec<_>>())
            .field("resources", &self.resource_names().collect::<Vec<_>>())
            .finish()
    }
}
