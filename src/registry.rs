//! Check registry: filesystem discovery and static registration.
//!
//! Checks are standalone executables that report pass/fail via their exit
//! code. The `CheckSource` trait is the seam between the orchestrator and the
//! two providers: `ScanSource` enumerates a checks directory (plus an optional
//! plugin directory) on every invocation, while `StaticSource` carries
//! compiled-in registrations with explicit category metadata.

use crate::models::CheckDescriptor;
use regex::Regex;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Sentinel category for checks without a `Category:` marker.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Number of leading lines scanned for the category marker. Bounded so that
/// discovery tolerates arbitrarily large or malformed check bodies.
const CATEGORY_SCAN_LINES: usize = 40;

/// A provider of runnable check descriptors.
pub trait CheckSource {
    fn checks(&self) -> Vec<CheckDescriptor>;
}

fn category_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Category:\s*([\w-]+)").expect("valid category regex"))
}

/// Category tag from the first lines of a check file, lower-cased.
///
/// Read failures fall back to `"uncategorized"`; they never abort discovery.
pub fn category_of(path: &Path) -> String {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return UNCATEGORIZED.to_string(),
    };
    let reader = std::io::BufReader::new(file);
    for line in reader.lines().take(CATEGORY_SCAN_LINES) {
        let line = match line {
            Ok(l) => l,
            Err(_) => return UNCATEGORIZED.to_string(),
        };
        if let Some(caps) = category_regex().captures(&line) {
            return caps[1].trim().to_lowercase();
        }
    }
    UNCATEGORIZED.to_string()
}

fn qualifying_children(dir: &Path, extension: &str, exclude: &[String]) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };
    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if exclude.iter().any(|x| x == &name) {
            continue;
        }
        out.push(path);
    }
    out
}

/// Enumerate check scripts under `root_dir` (non-recursive), appending the
/// children of `plugin_dir` when it exists. The result is sorted by name for
/// determinism. Individual unreadable entries are skipped, never fatal.
pub fn discover(
    root_dir: &Path,
    extension: &str,
    exclude: &[String],
    plugin_dir: Option<&Path>,
) -> Vec<CheckDescriptor> {
    let mut files = qualifying_children(root_dir, extension, exclude);
    if let Some(plugins) = plugin_dir {
        files.extend(qualifying_children(plugins, extension, exclude));
    }
    let mut checks: Vec<CheckDescriptor> = files
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let category = category_of(&path);
            CheckDescriptor {
                name,
                category,
                path,
            }
        })
        .collect();
    checks.sort_by(|a, b| a.name.cmp(&b.name));
    checks
}

/// Filesystem-scanning provider; descriptors are recomputed on every call.
pub struct ScanSource {
    root_dir: PathBuf,
    extension: String,
    exclude: Vec<String>,
    plugin_dir: Option<PathBuf>,
}

impl ScanSource {
    pub fn new(
        root_dir: PathBuf,
        extension: &str,
        exclude: Vec<String>,
        plugin_dir: Option<PathBuf>,
    ) -> Self {
        ScanSource {
            root_dir,
            extension: extension.to_string(),
            exclude,
            plugin_dir,
        }
    }
}

impl CheckSource for ScanSource {
    fn checks(&self) -> Vec<CheckDescriptor> {
        discover(
            &self.root_dir,
            &self.extension,
            &self.exclude,
            self.plugin_dir.as_deref(),
        )
    }
}

/// Compiled-in registry populated at startup via `register`. Category is
/// explicit metadata here, so no header sniffing is involved.
#[derive(Default)]
pub struct StaticSource {
    entries: Vec<CheckDescriptor>,
}

impl StaticSource {
    pub fn new() -> Self {
        StaticSource::default()
    }

    pub fn register(&mut self, name: &str, category: &str, path: PathBuf) {
        self.entries.push(CheckDescriptor {
            name: name.to_string(),
            category: category.to_lowercase(),
            path,
        });
    }
}

impl CheckSource for StaticSource {
    fn checks(&self) -> Vec<CheckDescriptor> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_check(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_discover_sorted_and_deterministic() {
        let dir = tempdir().unwrap();
        write_check(dir.path(), "b_check.sh", "#!/bin/sh\nexit 0\n");
        write_check(dir.path(), "a_check.sh", "#!/bin/sh\nexit 0\n");
        write_check(dir.path(), "notes.txt", "not a check\n");
        let first = discover(dir.path(), "sh", &[], None);
        let second = discover(dir.path(), "sh", &[], None);
        let names: Vec<_> = first.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a_check.sh", "b_check.sh"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_discover_excludes_and_plugins() {
        let dir = tempdir().unwrap();
        write_check(dir.path(), "run_all.sh", "#!/bin/sh\n");
        write_check(dir.path(), "z_check.sh", "#!/bin/sh\n");
        let plugins = dir.path().join("plugins");
        fs::create_dir(&plugins).unwrap();
        write_check(&plugins, "extra_check.sh", "#!/bin/sh\n# Category: Plugin\n");
        let checks = discover(
            dir.path(),
            "sh",
            &["run_all.sh".to_string()],
            Some(&plugins),
        );
        let names: Vec<_> = checks.iter().map(|c| c.name.as_str()).collect();
        // Plugin entries participate in the final full sort.
        assert_eq!(names, vec!["extra_check.sh", "z_check.sh"]);
        assert_eq!(checks[0].category, "plugin");
    }

    #[test]
    fn test_missing_plugin_dir_is_ignored() {
        let dir = tempdir().unwrap();
        write_check(dir.path(), "only.sh", "#!/bin/sh\n");
        let phantom = dir.path().join("no_such_dir");
        let checks = discover(dir.path(), "sh", &[], Some(&phantom));
        assert_eq!(checks.len(), 1);
    }

    #[test]
    fn test_category_case_insensitive() {
        let dir = tempdir().unwrap();
        let p = write_check(dir.path(), "c.sh", "#!/bin/sh\n# category: Testing\nexit 0\n");
        assert_eq!(category_of(&p), "testing");
    }

    #[test]
    fn test_category_fallback_uncategorized() {
        let dir = tempdir().unwrap();
        let p = write_check(dir.path(), "c.sh", "#!/bin/sh\nexit 0\n");
        assert_eq!(category_of(&p), UNCATEGORIZED);
        assert_eq!(category_of(&dir.path().join("absent.sh")), UNCATEGORIZED);
    }

    #[test]
    fn test_category_marker_beyond_scan_window_ignored() {
        let dir = tempdir().unwrap();
        let mut body = String::from("#!/bin/sh\n");
        for _ in 0..50 {
            body.push_str("# filler\n");
        }
        body.push_str("# Category: Hidden\n");
        let p = write_check(dir.path(), "deep.sh", &body);
        assert_eq!(category_of(&p), UNCATEGORIZED);
    }

    #[test]
    fn test_static_source_sorted_with_explicit_metadata() {
        let mut src = StaticSource::new();
        src.register("z_check.sh", "Hygiene", PathBuf::from("/opt/z_check.sh"));
        src.register("a_check.sh", "testing", PathBuf::from("/opt/a_check.sh"));
        let checks = src.checks();
        assert_eq!(checks[0].name, "a_check.sh");
        assert_eq!(checks[1].category, "hygiene");
    }
}
