//! Terminal output for plans, data sources and schemas

use std::collections::HashMap;

use colored::Colorize;
use ibmvpc_core::effect::Effect;
use ibmvpc_core::plan::Plan;
use ibmvpc_core::resource::Value;
use ibmvpc_core::schema::ResourceSchema;

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let strs: Vec<_> = keys
                .into_iter()
                .map(|k| format!("{}: {}", k, format_value(&map[k])))
                .collect();
            format!("{{{}}}", strs.join(", "))
        }
    }
}

pub fn format_effect(effect: &Effect) -> String {
    match effect {
        Effect::Create(r) => format!("Create {}", r.id),
        Effect::Update { id, .. } => format!("Update {}", id),
        Effect::Delete(state) => format!("Delete {}", state.id),
        Effect::Read(r) => format!("Read {}", r.id),
    }
}

fn sorted_keys(attributes: &HashMap<String, Value>) -> Vec<&String> {
    let mut keys: Vec<_> = attributes.keys().collect();
    keys.sort_by(|a, b| match (a.as_str(), b.as_str()) {
        ("name", _) => std::cmp::Ordering::Less,
        (_, "name") => std::cmp::Ordering::Greater,
        _ => a.cmp(b),
    });
    keys
}

pub fn print_plan(plan: &Plan) {
    if plan.mutation_count() == 0 {
        println!("{}", "No changes. Infrastructure is up-to-date.".green());
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();

    for effect in plan.effects() {
        match effect {
            Effect::Create(r) => {
                println!("  {} {}", "+".green().bold(), r.id.to_string().cyan().bold());
                for key in sorted_keys(&r.attributes) {
                    println!(
                        "      {}: {}",
                        key,
                        format_value(&r.attributes[key]).green()
                    );
                }
            }
            Effect::Update {
                id,
                from,
                to,
                changed_attributes,
            } => {
                println!("  {} {}", "~".yellow().bold(), id.to_string().cyan().bold());
                for key in changed_attributes {
                    let old = from
                        .attributes
                        .get(key)
                        .map(format_value)
                        .unwrap_or_else(|| "(none)".to_string());
                    let new = to
                        .attributes
                        .get(key)
                        .map(format_value)
                        .unwrap_or_else(|| "(none)".to_string());
                    println!("      {}: {} → {}", key, old.red(), new.green());
                }
            }
            Effect::Delete(state) => {
                println!("  {} {}", "-".red().bold(), state.id.to_string().cyan().bold());
                if let Some(identifier) = &state.identifier {
                    println!("      {}: {}", "identifier".bold(), identifier.red());
                }
            }
            Effect::Read(r) => {
                println!("  {} {}", "<=".blue().bold(), r.id.to_string().cyan());
            }
        }
    }

    println!();
    let summary = plan.summary();
    println!(
        "Plan: {} to add, {} to change, {} to destroy.",
        summary.create.to_string().green(),
        summary.update.to_string().yellow(),
        summary.delete.to_string().red()
    );
}

/// Print what a data source returned
pub fn print_data(attributes: &HashMap<String, Value>) {
    for key in sorted_keys(attributes) {
        match &attributes[key] {
            Value::List(items) => {
                println!("      {}: {} item(s)", key, items.len());
                for item in items {
                    println!("        - {}", format_value(item).dimmed());
                }
            }
            value => println!("      {}: {}", key, format_value(value)),
        }
    }
}

pub fn print_schema(schema: &ResourceSchema) {
    println!("{}", schema.resource_type.cyan().bold());
    if let Some(description) = &schema.description {
        println!("  {}", description);
    }
    for attr in schema.sorted_attributes() {
        let flags = attr.flags();
        let flags = if attr.required {
            flags.yellow()
        } else {
            flags.normal()
        };
        print!("    {} ({}, {})", attr.name.bold(), attr.attr_type, flags);
        if let Some(default) = &attr.default {
            print!(" default {}", format_value(default));
        }
        println!();
        if let Some(description) = &attr.description {
            println!("        {}", description.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibmvpc_core::resource::{Resource, ResourceId, State};

    #[test]
    fn format_nested_value_is_stable() {
        let server = Value::Map(
            [
                ("zone_affinity".to_string(), Value::from("us-south-1")),
                ("address".to_string(), Value::from("10.0.0.4")),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(
            format_value(&Value::List(vec![server, Value::Int(3), Value::Bool(true)])),
            r#"[{address: "10.0.0.4", zone_affinity: "us-south-1"}, 3, true]"#
        );
    }

    #[test]
    fn effect_labels() {
        let resource = Resource::new("is_vpc_dns_config", "spoke");
        assert_eq!(
            format_effect(&Effect::Create(resource.clone())),
            "Create is_vpc_dns_config.spoke"
        );
        assert_eq!(
            format_effect(&Effect::Delete(State::not_found(ResourceId::new(
                "is_virtual_endpoint_gateway",
                "egw"
            )))),
            "Delete is_virtual_endpoint_gateway.egw"
        );
        assert_eq!(
            format_effect(&Effect::Read(resource.with_read_only(true))),
            "Read is_vpc_dns_config.spoke"
        );
    }
}
