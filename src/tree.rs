//! Stubbing a directory of compiled classes

use std::fs;
use std::path::Path;

use log::{debug, info};
use walkdir::WalkDir;

use crate::common::config::Config;
use crate::common::error::Result;

/// Counts reported by `stub_tree`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StubSummary {
    pub written: usize,
    /// Anonymous and local classes left out of the output.
    pub skipped: usize,
}

fn is_class_file(path: &Path) -> bool {
    path.extension().map(|e| e == "class").unwrap_or(false)
}

/// Stub every `.class` file under `input_dir` into the same relative path
/// under `output_dir`. Files are visited in file name order; anything that is
/// not a class file is ignored.
pub fn stub_tree(input_dir: &Path, output_dir: &Path, config: &Config) -> Result<StubSummary> {
    let mut summary = StubSummary::default();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_class_file(path) {
            continue;
        }

        let bytes = fs::read(path)?;
        let class = crate::read_class(&bytes)?;
        if config.skip_anonymous_and_local && class.is_anonymous_or_local() {
            debug!("skipping anonymous or local class {}", class.name());
            summary.skipped += 1;
            continue;
        }

        // strip_prefix cannot fail for entries yielded under input_dir
        let relative = path.strip_prefix(input_dir).unwrap_or(path);
        let target = output_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, class.to_stub_bytes(config)?)?;
        debug!("wrote {}", target.display());
        summary.written += 1;
    }
    info!(
        "stubbed {} classes from {} ({} skipped)",
        summary.written,
        input_dir.display(),
        summary.skipped
    );
    Ok(summary)
}
