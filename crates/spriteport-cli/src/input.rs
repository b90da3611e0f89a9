//! Expansion of command-line paths into importable source files.

use spriteport_import::is_valid_source;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source files found for a list of command-line paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceSet {
    /// Importable files, in argument order; directory contents sorted.
    pub sources: Vec<PathBuf>,
    /// Explicitly named files that are not importable.
    pub ignored: Vec<PathBuf>,
}

/// Expands `paths`: files are kept as given, directories are walked
/// recursively for `.ase`/`.aseprite` files.
///
/// Paths that do not exist are kept so the import reports them per file.
pub fn expand_sources<P: AsRef<Path>>(paths: &[P]) -> SourceSet {
    let mut set = SourceSet::default();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .min_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_valid_source(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            set.sources.extend(found);
        } else if is_valid_source(path) || !path.exists() {
            set.sources.push(path.to_path_buf());
        } else {
            set.ignored.push(path.to_path_buf());
        }
    }
    set.sources.dedup();
    set
}
