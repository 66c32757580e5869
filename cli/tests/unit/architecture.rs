//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries hold.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(test)]") || trimmed.starts_with("#[cfg(all(test") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Production (non-test, non-comment) lines of every file under `src/<layer>`.
fn production_lines(layer: &str) -> Vec<(String, usize, String)> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut out = Vec::new();
    for file in collect_rs_files(&root.join("src").join(layer)) {
        let rel = file.strip_prefix(root).unwrap_or(&file).display().to_string();
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") || trimmed.starts_with("#[cfg(test)]") {
                continue;
            }
            out.push((rel.clone(), i + 1, line.to_owned()));
        }
    }
    out
}

fn violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    production_lines(layer)
        .into_iter()
        .filter(|(_, _, line)| forbidden.iter().any(|f| line.contains(f)))
        .map(|(rel, n, line)| format!("{rel}:{n}: {}", line.trim()))
        .collect()
}

#[test]
fn domain_performs_no_io() {
    let found = violations(
        "domain",
        &[
            "tokio",
            "std::fs",
            "std::process",
            "println!",
            "eprintln!",
            "crate::application",
            "crate::infra",
        ],
    );
    assert!(found.is_empty(), "domain/ must stay pure:\n{}", found.join("\n"));
}

#[test]
fn application_depends_only_on_ports() {
    let found = violations(
        "application",
        &[
            "crate::infra",
            "crate::output",
            "crate::cli",
            "crate::app::",
            "crate::app;",
            "std::process",
            "println!",
        ],
    );
    assert!(
        found.is_empty(),
        "application/ must go through port traits:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_cli_or_output() {
    let found = violations("infra", &["crate::cli", "crate::output", "println!", "eprintln!"]);
    assert!(found.is_empty(), "infra/ must not present output:\n{}", found.join("\n"));
}

#[test]
fn no_shell_interpretation_of_commands() {
    let found = violations("application", &["\"sh\"", "\"bash\"", "\"-c\""]);
    assert!(
        found.is_empty(),
        "commands must be argument vectors, not shell strings:\n{}",
        found.join("\n")
    );
}

#[test]
fn only_app_constructs_the_process_runner() {
    let found: Vec<String> = ["application", "domain", "output"]
        .iter()
        .flat_map(|layer| violations(layer, &["TokioCommandRunner"]))
        .collect();
    assert!(
        found.is_empty(),
        "TokioCommandRunner belongs to infra/ and app.rs:\n{}",
        found.join("\n")
    );
}
