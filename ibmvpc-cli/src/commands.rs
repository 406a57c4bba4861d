//! Subcommand implementations
//!
//! Each command works against a `Provider` and a `StateBackend` so the same
//! code runs with the IBM provider or an in-memory one.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use ibmvpc_core::differ::create_plan;
use ibmvpc_core::effect::Effect;
use ibmvpc_core::plan::Plan;
use ibmvpc_core::provider::{Provider, ProviderError};
use ibmvpc_core::resource::{Resource, ResourceId, State};
use ibmvpc_state::{LockInfo, ResourceState, StateBackend, StateFile};

use crate::config::{self, Configuration};
use crate::display::{format_effect, print_data, print_plan, print_schema};

fn load_validated(file: &Path) -> Result<Configuration, String> {
    let mut config = config::load(file)?;
    config::validate(&mut config)?;
    Ok(config)
}

async fn read_state_file(backend: &dyn StateBackend) -> Result<StateFile, String> {
    Ok(backend
        .read_state()
        .await
        .map_err(|e| format!("Failed to read state: {}", e))?
        .unwrap_or_default())
}

async fn write_state_file(backend: &dyn StateBackend, state: &mut StateFile) -> Result<(), String> {
    state.increment_serial();
    backend
        .write_state(state)
        .await
        .map_err(|e| format!("Failed to write state: {}", e))
}

async fn release(backend: &dyn StateBackend, lock: &LockInfo) {
    if let Err(e) = backend.release_lock(lock).await {
        log::warn!("Failed to release state lock {}: {}", lock.id, e);
    }
}

/// Read the current state of every managed resource that is either declared
/// or recorded in the state file.
async fn read_current_states(
    provider: &dyn Provider,
    state_file: &StateFile,
    desired: &[Resource],
) -> Result<HashMap<ResourceId, State>, String> {
    let mut ids: Vec<ResourceId> = desired
        .iter()
        .filter(|r| !r.is_data_source())
        .map(|r| r.id.clone())
        .collect();
    for recorded in &state_file.resources {
        let id = recorded.id();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let mut current = HashMap::new();
    for id in ids {
        let prior = state_file.find_resource(&id).map(ResourceState::to_state);
        let identifier = prior.as_ref().and_then(|s| s.identifier.clone());
        let state = provider
            .read(&id, identifier.as_deref(), prior.as_ref())
            .await
            .map_err(|e| format!("Failed to read state: {}", e))?;
        current.insert(id, state);
    }
    Ok(current)
}

async fn build_plan(
    provider: &dyn Provider,
    state_file: &StateFile,
    config: &Configuration,
) -> Result<Plan, String> {
    let desired = config.all();
    let current = read_current_states(provider, state_file, &desired).await?;
    Ok(create_plan(&desired, &current))
}

pub fn run_validate(file: &Path) -> Result<(), String> {
    println!("{}", "Validating...".cyan());
    let config = load_validated(file)?;

    println!(
        "{}",
        format!(
            "✓ {} resources and {} data sources validated successfully.",
            config.resources.len(),
            config.data.len()
        )
        .green()
        .bold()
    );
    for resource in config.resources.iter().chain(&config.data) {
        println!("  • {}", resource.id);
    }
    Ok(())
}

pub async fn run_plan(
    provider: &dyn Provider,
    backend: &dyn StateBackend,
    file: &Path,
) -> Result<(), String> {
    let config = load_validated(file)?;
    let state_file = read_state_file(backend).await?;
    let plan = build_plan(provider, &state_file, &config).await?;
    print_plan(&plan);
    Ok(())
}

pub async fn run_apply(
    provider: &dyn Provider,
    backend: &dyn StateBackend,
    file: &Path,
) -> Result<(), String> {
    let config = load_validated(file)?;
    let lock = backend
        .acquire_lock("apply")
        .await
        .map_err(|e| e.to_string())?;
    let result = apply_locked(provider, backend, &config).await;
    release(backend, &lock).await;
    result
}

async fn apply_locked(
    provider: &dyn Provider,
    backend: &dyn StateBackend,
    config: &Configuration,
) -> Result<(), String> {
    let mut state_file = read_state_file(backend).await?;
    let plan = build_plan(provider, &state_file, config).await?;

    if plan.is_empty() {
        println!("{}", "No changes needed.".green());
        return Ok(());
    }

    print_plan(&plan);
    println!();
    println!("{}", "Applying changes...".cyan().bold());
    println!();

    let mut success_count = 0;
    let mut failure_count = 0;
    let mut changed = false;

    for effect in plan.effects() {
        let result = match effect {
            Effect::Create(resource) => provider.create(resource).await.map(Some),
            Effect::Update { id, from, to, .. } => match &from.identifier {
                Some(identifier) => provider.update(id, identifier, from, to).await.map(Some),
                None => Err(ProviderError::new("No identifier recorded; cannot update")
                    .for_resource(id.clone())),
            },
            Effect::Delete(state) => {
                let identifier = state.identifier.clone().unwrap_or_default();
                provider
                    .delete(&state.id, &identifier, state)
                    .await
                    .map(|()| None)
            }
            Effect::Read(resource) => match provider.read_data_source(resource).await {
                Ok(state) => {
                    println!("  {} {}", "✓".green(), format_effect(effect));
                    print_data(&state.attributes);
                    continue;
                }
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(Some(state)) => {
                println!("  {} {}", "✓".green(), format_effect(effect));
                if let Some(recorded) = ResourceState::from_state(&state, provider.name()) {
                    state_file.upsert_resource(recorded);
                    changed = true;
                }
                success_count += 1;
            }
            Ok(None) => {
                println!("  {} {}", "✓".green(), format_effect(effect));
                state_file.remove_resource(effect.resource_id());
                changed = true;
                success_count += 1;
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), format_effect(effect), e);
                failure_count += 1;
            }
        }
    }

    if changed {
        write_state_file(backend, &mut state_file).await?;
    }

    println!();
    if failure_count == 0 {
        println!(
            "{}",
            format!("Apply complete! {} changes applied.", success_count)
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(format!(
            "Apply failed. {} succeeded, {} failed.",
            success_count, failure_count
        ))
    }
}

/// Re-read every recorded resource and store what the provider reports.
/// Resources that no longer exist are dropped from state.
pub async fn run_refresh(provider: &dyn Provider, backend: &dyn StateBackend) -> Result<(), String> {
    let lock = backend
        .acquire_lock("refresh")
        .await
        .map_err(|e| e.to_string())?;
    let result = refresh_locked(provider, backend).await;
    release(backend, &lock).await;
    result
}

async fn refresh_locked(provider: &dyn Provider, backend: &dyn StateBackend) -> Result<(), String> {
    let mut state_file = read_state_file(backend).await?;
    if state_file.resources.is_empty() {
        println!("{}", "No resources in state.".yellow());
        return Ok(());
    }

    let current = read_current_states(provider, &state_file, &[]).await?;
    for recorded in state_file.resources.clone() {
        let id = recorded.id();
        match current.get(&id) {
            Some(state) if state.exists => {
                if let Some(updated) = ResourceState::from_state(state, provider.name()) {
                    state_file.upsert_resource(updated);
                }
                println!("  {} {}", "✓".green(), id);
            }
            _ => {
                state_file.remove_resource(&id);
                println!("  {} {} {}", "-".red(), id, "(gone, removed from state)".dimmed());
            }
        }
    }

    write_state_file(backend, &mut state_file).await?;
    println!("{}", "Refresh complete.".green().bold());
    Ok(())
}

fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool, String> {
    print!("{} ", prompt);
    io::stdout().flush().map_err(|e| e.to_string())?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| format!("Failed to read answer: {}", e))?;
    Ok(answer.trim() == "yes")
}

/// Delete every resource in state, newest first
pub async fn run_destroy(
    provider: &dyn Provider,
    backend: &dyn StateBackend,
    auto_approve: bool,
) -> Result<(), String> {
    let lock = backend
        .acquire_lock("destroy")
        .await
        .map_err(|e| e.to_string())?;
    let result = destroy_locked(provider, backend, auto_approve).await;
    release(backend, &lock).await;
    result
}

async fn destroy_locked(
    provider: &dyn Provider,
    backend: &dyn StateBackend,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state_file = read_state_file(backend).await?;
    if state_file.resources.is_empty() {
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    for recorded in state_file.resources.iter().rev() {
        println!("  {} {}", "-".red().bold(), recorded.id());
    }
    println!();

    if !auto_approve
        && !confirm(
            "Do you really want to destroy all resources? Only 'yes' will be accepted:",
            &mut io::stdin().lock(),
        )?
    {
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    let mut success_count = 0;
    let mut failure_count = 0;
    for recorded in state_file.resources.clone().into_iter().rev() {
        let id = recorded.id();
        let prior = recorded.to_state();
        let identifier = recorded.identifier.clone().unwrap_or_default();
        match provider.delete(&id, &identifier, &prior).await {
            Ok(()) => {
                println!("  {} Delete {}", "✓".green(), id);
                state_file.remove_resource(&id);
                success_count += 1;
            }
            Err(e) => {
                println!("  {} Delete {} - {}", "✗".red(), id, e);
                failure_count += 1;
            }
        }
    }

    write_state_file(backend, &mut state_file).await?;

    println!();
    if failure_count == 0 {
        println!(
            "{}",
            format!("Destroy complete! {} resources destroyed.", success_count)
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(format!(
            "Destroy failed. {} succeeded, {} failed.",
            success_count, failure_count
        ))
    }
}

pub fn run_schema(resource_type: Option<&str>) -> Result<(), String> {
    let schemas = config::schemas_by_type();
    match resource_type {
        Some(name) => {
            let schema = schemas
                .get(name)
                .ok_or_else(|| format!("Unknown resource type: {}", name))?;
            print_schema(schema);
        }
        None => {
            let mut names: Vec<_> = schemas.keys().collect();
            names.sort();
            for name in names {
                print_schema(&schemas[name]);
                println!();
            }
        }
    }
    Ok(())
}

pub async fn run_force_unlock(backend: &dyn StateBackend, lock_id: &str) -> Result<(), String> {
    backend
        .force_unlock(lock_id)
        .await
        .map_err(|e| format!("Failed to unlock state: {}", e))?;
    println!("{}", format!("Lock {} released.", lock_id).green());
    Ok(())
}
