//! Intern tables for engine, file and function ids.
//!
//! A dump defines each id once, on its first occurrence, and refers to it
//! by number afterwards. Tables only grow: a bound id is never rebound,
//! and definition fragments repeated for a bound id are ignored.

use crate::parser::{EngineRef, FunctionName, FunctionRef};
use crate::utils::error::{ReferenceError, ReferenceKind};
use log::trace;
use std::collections::HashMap;

/// Interned function descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub file_id: u64,
    pub name: FunctionName,
}

/// Id → value tables owned by a single aggregation pass
///
/// **Public** - exposed read-only through `TreeBuilder::tables`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternTables {
    engines: HashMap<u64, String>,
    files: HashMap<u64, String>,
    functions: HashMap<u64, FunctionEntry>,
}

impl InternTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine_of(&self, id: u64) -> Option<&str> {
        self.engines.get(&id).map(String::as_str)
    }

    pub fn file_of(&self, id: u64) -> Option<&str> {
        self.files.get(&id).map(String::as_str)
    }

    pub fn function_of(&self, id: u64) -> Option<&FunctionEntry> {
        self.functions.get(&id)
    }

    /// Number of (engines, files, functions) bound so far
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.engines.len(), self.files.len(), self.functions.len())
    }

    /// Resolve an engine reference, binding its name on first sight
    ///
    /// # Errors
    /// * `ReferenceError` - bare reference to an engine id never defined
    pub(crate) fn resolve_engine(&mut self, engine: &EngineRef) -> Result<&str, ReferenceError> {
        if !self.engines.contains_key(&engine.id) {
            let name = engine.name.clone().ok_or(ReferenceError {
                kind: ReferenceKind::Engine,
                id: engine.id,
            })?;
            trace!("Interned engine {:x} = {}", engine.id, name);
            self.engines.insert(engine.id, name);
        }
        Ok(self.engines[&engine.id].as_str())
    }

    /// Resolve a function reference to `(file path, function name)`
    ///
    /// An unseen function id requires its definition, which in turn requires
    /// the file path the first time that file id appears. For a known
    /// function id any definition present on the line is not consulted.
    ///
    /// # Errors
    /// * `ReferenceError` - bare reference to an unseen function or file id
    pub(crate) fn resolve_function(
        &mut self,
        function: &FunctionRef,
    ) -> Result<(&str, &FunctionName), ReferenceError> {
        if !self.functions.contains_key(&function.id) {
            let def = function.definition.as_ref().ok_or(ReferenceError {
                kind: ReferenceKind::Function,
                id: function.id,
            })?;

            let file_id = def.file.id;
            if !self.files.contains_key(&file_id) {
                let path = def.file.path.clone().ok_or(ReferenceError {
                    kind: ReferenceKind::File,
                    id: file_id,
                })?;
                trace!("Interned file {:x} = {}", file_id, path);
                self.files.insert(file_id, path);
            }

            trace!("Interned function {:x} = {}", function.id, def.name);
            self.functions.insert(
                function.id,
                FunctionEntry {
                    file_id,
                    name: def.name.clone(),
                },
            );
        }

        let entry = &self.functions[&function.id];
        let path = self.files.get(&entry.file_id).ok_or(ReferenceError {
            kind: ReferenceKind::File,
            id: entry.file_id,
        })?;
        Ok((path.as_str(), &entry.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{FilePos, FunctionDef};

    fn defined(id: u64, file_id: u64, path: Option<&str>, name: &str) -> FunctionRef {
        FunctionRef {
            id,
            definition: Some(FunctionDef {
                file: FilePos {
                    id: file_id,
                    path: path.map(str::to_string),
                    offset: "0".to_string(),
                },
                name: FunctionName::Named(name.to_string()),
            }),
        }
    }

    fn bare(id: u64) -> FunctionRef {
        FunctionRef {
            id,
            definition: None,
        }
    }

    #[test]
    fn test_function_definition_binds_file_and_function() {
        let mut tables = InternTables::new();
        let (path, name) = tables
            .resolve_function(&defined(1, 1, Some("a.c"), "foo"))
            .unwrap();
        assert_eq!(path, "a.c");
        assert_eq!(name, &FunctionName::Named("foo".to_string()));
        assert_eq!(tables.file_of(1), Some("a.c"));
        assert_eq!(tables.sizes(), (0, 1, 1));
    }

    #[test]
    fn test_file_reference_reuses_bound_path() {
        let mut tables = InternTables::new();
        tables
            .resolve_function(&defined(1, 1, Some("a.c"), "foo"))
            .unwrap();
        let (path, _) = tables.resolve_function(&defined(2, 1, None, "bar")).unwrap();
        assert_eq!(path, "a.c");
    }

    #[test]
    fn test_known_function_ignores_new_definition() {
        let mut tables = InternTables::new();
        tables
            .resolve_function(&defined(1, 1, Some("a.c"), "foo"))
            .unwrap();
        // A conflicting fragment for a bound id is not re-validated
        let (path, name) = tables
            .resolve_function(&defined(1, 9, Some("other.c"), "renamed"))
            .unwrap();
        assert_eq!(path, "a.c");
        assert_eq!(name.to_string(), "foo");
        assert_eq!(tables.file_of(9), None);
    }

    #[test]
    fn test_unknown_function_reference() {
        let mut tables = InternTables::new();
        let err = tables.resolve_function(&bare(1)).unwrap_err();
        assert_eq!(
            err,
            ReferenceError {
                kind: ReferenceKind::Function,
                id: 1
            }
        );
    }

    #[test]
    fn test_unknown_file_reference() {
        let mut tables = InternTables::new();
        let err = tables
            .resolve_function(&defined(1, 4, None, "foo"))
            .unwrap_err();
        assert_eq!(err.kind, ReferenceKind::File);
        assert_eq!(err.id, 4);
        // Nothing is bound by a failed resolution
        assert_eq!(tables.sizes(), (0, 0, 0));
    }

    #[test]
    fn test_engine_binding() {
        let mut tables = InternTables::new();
        let def = EngineRef {
            id: 1,
            name: Some("python".to_string()),
        };
        assert_eq!(tables.resolve_engine(&def).unwrap(), "python");
        let reference = EngineRef { id: 1, name: None };
        assert_eq!(tables.resolve_engine(&reference).unwrap(), "python");

        let unknown = EngineRef { id: 2, name: None };
        assert_eq!(
            tables.resolve_engine(&unknown).unwrap_err().kind,
            ReferenceKind::Engine
        );
    }
}
