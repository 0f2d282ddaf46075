//! Include-file resolution.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Resolves `#include` requests to file contents.
///
/// `is_system` distinguishes `<name>` from `"name"` includes.
pub trait IncludeHandler {
    fn include(&mut self, name: &str, is_system: bool) -> io::Result<String>;
}

/// Default handler that searches the working directory and a list of
/// additional search paths.
#[derive(Debug, Default)]
pub struct FileIncludeHandler {
    pub search_paths: Vec<PathBuf>,
}

impl FileIncludeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }
}

impl IncludeHandler for FileIncludeHandler {
    fn include(&mut self, name: &str, _is_system: bool) -> io::Result<String> {
        match fs::read_to_string(name) {
            Ok(text) => return Ok(text),
            Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
            Err(_) => {}
        }
        for dir in &self.search_paths {
            let candidate = dir.join(name);
            match fs::read_to_string(&candidate) {
                Ok(text) => return Ok(text),
                Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
                Err(_) => {}
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("include file not found: '{}'", name),
        ))
    }
}

/// In-memory handler used by tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryIncludeHandler {
    files: Vec<(String, String)>,
}

impl MemoryIncludeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.push((name.into(), text.into()));
    }
}

impl IncludeHandler for MemoryIncludeHandler {
    fn include(&mut self, name: &str, _is_system: bool) -> io::Result<String> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("include file not found: '{}'", name),
                )
            })
    }
}
