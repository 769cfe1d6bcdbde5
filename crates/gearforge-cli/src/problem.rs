//! Problem files and search configuration from the command line.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use gearforge::{SearchConfig, SearchRequest, ThreadCount};

/// Reads a JSON problem file into a search request.
pub fn load_problem(path: &Path) -> Result<SearchRequest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading problem file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing problem file {}", path.display()))
}

/// Loads `config` if given, then applies the thread flags.
///
/// `.yaml` and `.yml` files are read as YAML, anything else as TOML.
///
/// `--cooperative` wins over `--threads`.
pub fn resolve_config(
    config: Option<&Path>,
    threads: Option<usize>,
    cooperative: bool,
) -> Result<SearchConfig> {
    let mut search_config = match config {
        Some(path) => {
            let yaml = path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            let loaded = if yaml {
                SearchConfig::from_yaml_file(path)
            } else {
                SearchConfig::load(path)
            };
            loaded.with_context(|| format!("loading search config {}", path.display()))?
        }
        None => SearchConfig::default(),
    };
    if let Some(n) = threads {
        search_config = search_config.with_thread_count(ThreadCount::Count(n));
    }
    if cooperative {
        search_config = search_config.with_thread_count(ThreadCount::None);
    }
    search_config.validate()?;
    Ok(search_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearforge::{ItemCategory, StatId};
    use gearforge_test::{bolt_combo, hp_item, test_weapon};
    use std::io::Write;

    #[test]
    fn test_problem_round_trips_through_file() {
        let request = SearchRequest::new(test_weapon())
            .with_combo(bolt_combo())
            .with_items(vec![hp_item("Cap", ItemCategory::Helmet, 40)]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&request).unwrap()).unwrap();

        let loaded = load_problem(file.path()).unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].stat(StatId::Hp), 40);
        assert_eq!(loaded.combo.len(), 2);
        assert!(loaded.weapon.is_some());
    }

    #[test]
    fn test_bad_problem_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_problem(file.path()).unwrap_err();
        assert!(err.to_string().contains("parsing problem file"));
    }

    #[test]
    fn test_thread_flags() {
        let config = resolve_config(None, Some(3), false).unwrap();
        assert_eq!(config.thread_count, ThreadCount::Count(3));

        let config = resolve_config(None, Some(3), true).unwrap();
        assert_eq!(config.thread_count, ThreadCount::None);
    }

    #[test]
    fn test_config_file_is_loaded() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "partitions_per_worker = 2\nyield_interval = 77").unwrap();
        let config = resolve_config(Some(file.path()), None, false).unwrap();
        assert_eq!(config.partitions_per_worker, 2);
        assert_eq!(config.yield_interval, 77);

        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "progress_interval: 9").unwrap();
        let config = resolve_config(Some(file.path()), None, true).unwrap();
        assert_eq!(config.progress_interval, 9);
        assert_eq!(config.thread_count, ThreadCount::None);
    }
}
