use crate::error::{MeterError, Result};
use crate::normalizer::normalize_line;
use crate::types::{Event, ProjectLabel};
use crate::utils::dedup::is_duplicate;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;

// Capacity constants for performance optimization
const INITIAL_HASH_CAPACITY: usize = 1024;
const ALL_EVENTS_CAPACITY: usize = 1024;

/// Events read from every data directory, in arrival order
#[derive(Debug, Default)]
pub struct LoadedEvents {
    pub events: Vec<Event>,
    pub stats: LoadStats,
}

/// Counters describing what the loader skipped
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub files: usize,
    pub lines: usize,
    pub malformed: usize,
    pub discarded: usize,
    pub duplicates: usize,
}

impl LoadStats {
    fn merge(&mut self, other: LoadStats) {
        self.files += other.files;
        self.lines += other.lines;
        self.malformed += other.malformed;
        self.discarded += other.discarded;
        self.duplicates += other.duplicates;
    }
}

enum LineOutcome {
    Event(Event),
    Discarded,
    Malformed,
}

/// Collect all JSONL shards under `projects/`, sorted by path
///
/// The project label of each shard is the name of its project directory.
fn collect_jsonl_files(projects_path: &Path) -> Result<Vec<(PathBuf, ProjectLabel)>> {
    let project_dirs: Vec<PathBuf> = fs::read_dir(projects_path)
        .map_err(|source| MeterError::DirectoryAccess {
            path: projects_path.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();

    // Parallel scan of all project directories for JSONL files
    let mut files: Vec<(PathBuf, ProjectLabel)> = project_dirs
        .par_iter()
        .flat_map(|project_dir| {
            let label = ProjectLabel::from(
                project_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            match fs::read_dir(project_dir) {
                Ok(entries) => entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
                    .map(|path| (path, label.clone()))
                    .collect::<Vec<_>>(),
                Err(e) => {
                    log::warn!("skipping project directory {}: {e}", project_dir.display());
                    Vec::new()
                }
            }
        })
        .collect();

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Read and normalize one shard, keeping line order
fn process_jsonl_file(path: &Path, project: &ProjectLabel) -> Result<(Vec<Event>, LoadStats)> {
    let contents = fs::read_to_string(path).map_err(|source| MeterError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let outcomes: Vec<LineOutcome> = contents
        .par_lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match normalize_line(line, Some(project)) {
            Ok(Some(event)) => LineOutcome::Event(event),
            Ok(None) => LineOutcome::Discarded,
            Err(e) => {
                log::debug!("{}: {e}", path.display());
                LineOutcome::Malformed
            }
        })
        .collect();

    let mut stats = LoadStats {
        files: 1,
        lines: outcomes.len(),
        ..Default::default()
    };
    let mut events = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            LineOutcome::Event(event) => events.push(event),
            LineOutcome::Discarded => stats.discarded += 1,
            LineOutcome::Malformed => stats.malformed += 1,
        }
    }

    if stats.malformed > 0 || stats.discarded > 0 {
        log::debug!(
            "{}: {} events, {} discarded, {} malformed",
            path.display(),
            events.len(),
            stats.discarded,
            stats.malformed
        );
    }

    Ok((events, stats))
}

/// Load every shard below one base directory
fn load_base_path(base_path: &Path) -> Result<(Vec<Event>, LoadStats)> {
    let projects_path = base_path.join("projects");
    if !projects_path.is_dir() {
        log::debug!("no projects directory under {}", base_path.display());
        return Ok((Vec::new(), LoadStats::default()));
    }

    let files = collect_jsonl_files(&projects_path)?;

    // Process files in parallel; collect preserves the sorted file order
    let results: Vec<_> = files
        .par_iter()
        .map(|(path, project)| match process_jsonl_file(path, project) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{e}");
                (Vec::new(), LoadStats::default())
            }
        })
        .collect();

    let mut events = Vec::with_capacity(ALL_EVENTS_CAPACITY);
    let mut stats = LoadStats::default();
    for (file_events, file_stats) in results {
        events.extend(file_events);
        stats.merge(file_stats);
    }
    Ok((events, stats))
}

/// Load all events from the given data directories
///
/// Bases are read concurrently but merged in the order given. Duplicates
/// across shards are dropped here already, keeping the first occurrence.
pub async fn load_all_events(claude_paths: &[PathBuf]) -> Result<LoadedEvents> {
    let tasks: Vec<_> = claude_paths
        .iter()
        .cloned()
        .map(|base_path| task::spawn_blocking(move || load_base_path(&base_path)))
        .collect();

    let mut loaded = LoadedEvents {
        events: Vec::with_capacity(ALL_EVENTS_CAPACITY),
        stats: LoadStats::default(),
    };
    let mut processed_hashes = HashSet::with_capacity(INITIAL_HASH_CAPACITY);

    for task in tasks {
        let (events, stats) = task.await??;
        loaded.stats.merge(stats);
        for event in events {
            if is_duplicate(&event, &mut processed_hashes) {
                loaded.stats.duplicates += 1;
                continue;
            }
            loaded.events.push(event);
        }
    }

    log::info!(
        "loaded {} events from {} files ({} duplicates, {} discarded, {} malformed)",
        loaded.events.len(),
        loaded.stats.files,
        loaded.stats.duplicates,
        loaded.stats.discarded,
        loaded.stats.malformed
    );

    Ok(loaded)
}
