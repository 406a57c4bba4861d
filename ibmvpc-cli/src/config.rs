//! JSON configuration file: the resources to manage and the data sources to read

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use ibmvpc_core::resource::{Resource, Value};
use ibmvpc_core::schema::ResourceSchema;
use ibmvpc_provider::schemas;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    resources: Vec<BlockConfig>,
    #[serde(default)]
    data: Vec<BlockConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockConfig {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

impl BlockConfig {
    fn into_resource(self, read_only: bool) -> Resource {
        // JSON null means "unset"
        self.attributes
            .iter()
            .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
            .fold(
                Resource::new(self.resource_type.clone(), self.name.clone())
                    .with_read_only(read_only),
                |r, (k, v)| r.with_attribute(k, v),
            )
    }
}

/// Parsed configuration, managed resources first in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub resources: Vec<Resource>,
    pub data: Vec<Resource>,
}

impl Configuration {
    /// Managed resources followed by data sources
    pub fn all(&self) -> Vec<Resource> {
        self.resources.iter().chain(&self.data).cloned().collect()
    }
}

pub fn load(path: &Path) -> Result<Configuration, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn parse(content: &str) -> Result<Configuration, String> {
    let file: ConfigFile =
        serde_json::from_str(content).map_err(|e| format!("Parse error: {}", e))?;

    let config = Configuration {
        resources: file
            .resources
            .into_iter()
            .map(|b| b.into_resource(false))
            .collect(),
        data: file.data.into_iter().map(|b| b.into_resource(true)).collect(),
    };

    let mut seen = HashSet::new();
    for resource in config.resources.iter().chain(&config.data) {
        if !seen.insert(resource.id.clone()) {
            return Err(format!("Duplicate declaration of {}", resource.id));
        }
    }
    Ok(config)
}

pub fn schemas_by_type() -> HashMap<String, ResourceSchema> {
    schemas::all_schemas()
        .into_iter()
        .map(|s| (s.resource_type.clone(), s))
        .collect()
}

/// Check every block against its schema and fill in schema defaults.
///
/// All problems are reported together, one per line.
pub fn validate(config: &mut Configuration) -> Result<(), String> {
    let schemas = schemas_by_type();
    let data_sources: HashSet<&'static str> = ibmvpc_provider::resources::resource_types()
        .iter()
        .filter(|t| t.is_data_source())
        .map(|t| t.name())
        .collect();

    let mut errors = Vec::new();
    for resource in config.resources.iter_mut().chain(config.data.iter_mut()) {
        let id = resource.id.clone();
        let Some(schema) = schemas.get(&id.resource_type) else {
            errors.push(format!("{}: unknown type {}", id, id.resource_type));
            continue;
        };
        let is_data_source = data_sources.contains(id.resource_type.as_str());
        if is_data_source != resource.read_only {
            let section = if is_data_source { "data" } else { "resources" };
            errors.push(format!("{}: {} must be declared under \"{}\"", id, id.resource_type, section));
            continue;
        }

        schema.apply_defaults(&mut resource.attributes);
        if let Err(type_errors) = schema.validate(&resource.attributes) {
            errors.extend(type_errors.into_iter().map(|e| format!("{}: {}", id, e)));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}
