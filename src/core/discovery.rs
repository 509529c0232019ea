//! Builds the initial watch set
//!
//! The tree under the root is walked depth-first in file-name order. Dot
//! directories are pruned before they are read, so permission errors inside
//! them never surface. Explicitly named files are resolved after the walk.

use std::path::{Path, PathBuf};
use ignore::WalkBuilder;
use tracing::{debug, warn};
use crate::config::WatchConfig;
use crate::error::DiscoveryError;
use super::filter::PathFilter;
use super::target::WatchTarget;

/// Result of a discovery pass
#[derive(Debug)]
pub struct Discovery {
    /// Ordered by id, ids start at 1
    pub targets: Vec<WatchTarget>,
    /// Directories entered, the root included
    pub scanned_dirs: usize,
}

pub fn discover(config: &WatchConfig) -> Result<Discovery, DiscoveryError> {
    let filter = PathFilter::from_config(config);
    let mut targets: Vec<WatchTarget> = Vec::new();
    let mut scanned_dirs = 0;

    let dir_filter = filter.clone();
    let walker = WalkBuilder::new(&config.root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            entry.depth() == 0 || !is_dir || dir_filter.should_enter(entry.file_name())
        })
        .build();

    for result in walker {
        let entry = result?;
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            scanned_dirs += 1;
            debug!("* entering directory: {}", entry.path().display());
            continue;
        }

        debug!("   > checking {}", entry.path().display());
        if !filter.should_watch(entry.file_name(), file_type) {
            continue;
        }

        let metadata = entry.metadata()?;
        push_target(&mut targets, entry.into_path(), metadata, config.max_files)?;
    }

    for name in &config.file_names {
        let metadata = match std::fs::metadata(name) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("## {} invalid file name: {}", name.display(), err);
                continue;
            }
        };
        if !metadata.is_file() {
            warn!("## {} invalid file name: not a regular file", name.display());
            continue;
        }
        if is_already_watched(&targets, name) {
            warn!("## {} is already being watched", name.display());
            continue;
        }
        push_target(&mut targets, name.clone(), metadata, config.max_files)?;
    }

    Ok(Discovery { targets, scanned_dirs })
}

fn push_target(
    targets: &mut Vec<WatchTarget>,
    path: PathBuf,
    metadata: std::fs::Metadata,
    max_files: usize,
) -> Result<(), DiscoveryError> {
    if targets.len() >= max_files {
        return Err(DiscoveryError::TooManyFiles { limit: max_files });
    }

    let id = targets.len() as u64 + 1;
    let target = WatchTarget::new(id, path.clone(), metadata)
        .map_err(|source| DiscoveryError::Metadata { path, source })?;
    debug!("   + adding {} ({})", target.path.display(), target.id);
    targets.push(target);
    Ok(())
}

fn is_already_watched(targets: &[WatchTarget], path: &Path) -> bool {
    let Ok(wanted) = std::fs::canonicalize(path) else {
        return false;
    };
    targets
        .iter()
        .filter_map(|t| std::fs::canonicalize(&t.path).ok())
        .any(|p| p == wanted)
}
