//! Tool Registry - the live set of proxied tools.
//!
//! This module provides:
//! - Registration and removal, each flushed to disk before returning
//! - Snapshot listing and lookup for the protocol handlers
//!
//! Mutations hold the write lock across read-modify-flush and only commit
//! the new map once the flush succeeded, so memory never diverges from the
//! file. There is no cross-process lock: two proxies writing the same file
//! race with last-writer-wins.

use std::sync::{PoisonError, RwLock};
use tracing::{info, instrument};

use super::definition::ToolDefinition;
use super::error::{ToolError, ToolResult};
use super::store::{RegistryStore, ToolMap};

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all registered tools.
#[derive(Debug)]
pub struct ToolRegistry {
    store: RegistryStore,
    tools: RwLock<ToolMap>,
}

impl ToolRegistry {
    /// Load the registry from its store.
    pub fn load(store: RegistryStore) -> ToolResult<Self> {
        let tools = store.load()?;
        info!(
            "Loaded {} proxied tool(s) from {}",
            tools.len(),
            store.path().display()
        );
        Ok(Self {
            store,
            tools: RwLock::new(tools),
        })
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    /// Register a tool, replacing any existing tool of the same name.
    #[instrument(skip(self, description, signature, script_path, command))]
    pub fn add_tool(
        &self,
        name: &str,
        description: &str,
        signature: &str,
        script_path: Option<&str>,
        command: Option<&str>,
    ) -> ToolResult<ToolDefinition> {
        let def = ToolDefinition::new(name, description, signature, script_path, command)?;

        self.mutate(|tools| {
            tools.insert(def.name.clone(), def.clone());
            Ok(())
        })?;

        info!("Registered tool '{}'", def.name);
        Ok(def)
    }

    /// Remove a tool by name. Names are trimmed as on registration.
    #[instrument(skip(self))]
    pub fn remove_tool(&self, name: &str) -> ToolResult<ToolDefinition> {
        let name = name.trim();
        let mut removed = None;
        self.mutate(|tools| {
            removed = tools.remove(name);
            match removed {
                Some(_) => Ok(()),
                None => Err(ToolError::not_found(name)),
            }
        })?;

        info!("Unregistered tool '{}'", name);
        removed.ok_or_else(|| ToolError::not_found(name))
    }

    /// Snapshot of all tools, ordered by name.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.read().values().cloned().collect()
    }

    pub fn lookup(&self, name: &str) -> Option<ToolDefinition> {
        self.read().get(name.trim()).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Re-read the file, discarding the in-memory state.
    pub fn reload(&self) -> ToolResult<()> {
        let mut guard = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        *guard = self.store.load()?;
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ToolMap> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to a copy of the map, flush it, then commit it.
    fn mutate<F>(&self, change: F) -> ToolResult<()>
    where
        F: FnOnce(&mut ToolMap) -> ToolResult<()>,
    {
        let mut guard = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        change(&mut next)?;
        self.store.save(&next)?;
        *guard = next;
        Ok(())
    }
}
