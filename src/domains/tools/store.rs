//! Registry Store - load and save the per-user registry file.
//!
//! The file is a JSON object mapping tool name to its stored entry:
//!
//! ```json
//! {
//!   "add_numbers": {
//!     "description": "Adds two numbers",
//!     "parameters": "a:int,b:int",
//!     "scriptPath": "/home/me/add.sh"
//!   }
//! }
//! ```
//!
//! Saves go through a temporary file in the same directory that is renamed
//! over the target, so readers only ever see a complete file.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use super::definition::{StoredTool, ToolDefinition};
use super::error::{ToolError, ToolResult};

/// In-memory form of the registry contents, ordered by tool name.
pub type ToolMap = BTreeMap<String, ToolDefinition>;

/// File-backed storage for tool definitions.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every definition from disk.
    ///
    /// A missing file is an empty registry. An unreadable or malformed file
    /// is an error; it is never treated as empty.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> ToolResult<ToolMap> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Registry file does not exist yet, starting empty");
                return Ok(ToolMap::new());
            }
            Err(e) => return Err(ToolError::persistence("read", &self.path, e)),
        };

        if data.trim().is_empty() {
            return Err(ToolError::corrupt(&self.path, "file is empty"));
        }

        let stored: BTreeMap<String, StoredTool> =
            serde_json::from_str(&data).map_err(|e| ToolError::corrupt(&self.path, e))?;

        let mut tools = ToolMap::new();
        for (name, entry) in stored {
            let def = entry
                .into_definition(&name)
                .map_err(|e| ToolError::corrupt(&self.path, format!("entry '{name}': {e}")))?;
            tools.insert(def.name.clone(), def);
        }

        debug!("Loaded {} tool(s)", tools.len());
        Ok(tools)
    }

    /// Atomically replace the registry file with `tools`.
    #[instrument(skip(self, tools), fields(path = %self.path.display(), count = tools.len()))]
    pub fn save(&self, tools: &ToolMap) -> ToolResult<()> {
        let stored: BTreeMap<&str, StoredTool> = tools
            .iter()
            .map(|(name, def)| (name.as_str(), StoredTool::from(def)))
            .collect();

        let json = serde_json::to_vec_pretty(&stored)
            .map_err(|e| ToolError::persistence("encode", &self.path, io::Error::other(e)))?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| ToolError::persistence("create directory for", dir, e))?;

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| ToolError::persistence("write", &self.path, e))?;
        tmp.write_all(&json)
            .and_then(|()| tmp.write_all(b"\n"))
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| ToolError::persistence("write", &self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| ToolError::persistence("replace", &self.path, e.error))?;

        debug!("Registry flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RegistryStore {
        RegistryStore::new(dir.path().join("proxy_config.json"))
    }

    fn sample() -> ToolDefinition {
        ToolDefinition::new("add", "Adds", "a:int,b:int", None, Some("echo $a")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut tools = ToolMap::new();
        tools.insert("add".to_string(), sample());
        store.save(&tools).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, tools);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::new(dir.path().join(".mcpt").join("proxy_config.json"));
        store.save(&ToolMap::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut tools = ToolMap::new();
        tools.insert("add".to_string(), sample());
        store.save(&tools).unwrap();
        store.save(&tools).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ToolError::Corrupt { .. }));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_entry_without_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"bad": {"description": "no source", "parameters": "x:int"}}"#,
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_reads_hand_written_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"greet": {"description": "Say hi", "parameters": "who", "scriptPath": "/usr/local/bin/greet"}}"#,
        )
        .unwrap();

        let tools = store.load().unwrap();
        let greet = &tools["greet"];
        assert_eq!(greet.script_path(), Some(Path::new("/usr/local/bin/greet")));
        assert_eq!(greet.parameters.len(), 1);
    }
}
