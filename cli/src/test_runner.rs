use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use blocks::Sprite;
use blocks::scene::{Scene, SceneError, SceneParser};
use engine::{EngineConfig, ManualClock, Stage};

const DEFAULT_LIMIT_MS: u64 = 60_000;
const POSITION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

/// Final state one sprite must be in once the run ends. Unset fields are not
/// checked.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedSprite {
    pub name: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub direction: Option<f64>,
    pub cursor: Option<usize>,
    pub complete: Option<bool>,
    /// Expected speech bubble text; `""` means no bubble.
    pub say: Option<String>,
    /// Expected thought bubble text; `""` means no bubble.
    pub think: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Expectations {
    #[serde(default)]
    pub sprite: Vec<ExpectedSprite>,
}

/// Test keys that sit next to the scene tables in a `.test.toml` file. The
/// scene loader ignores them.
#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Stage time after which the run is cut short.
    #[serde(default = "default_limit")]
    pub limit_ms: u64,

    /// If true, the test expects loading to fail.
    #[serde(default)]
    pub expect_parse_error: bool,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    /// Each entry checks message substring and optionally the source line.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    #[serde(default)]
    pub expect: Expectations,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT_MS
}

fn parse_test_file(content: &str) -> Result<TestConfig, String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM
    toml::from_str(content).map_err(|e| format!("TOML parse error: {}", e))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("cannot read file: {}", e)),
            };
        }
    };

    let config = match parse_test_file(&content) {
        Ok(config) => config,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("test header error: {}", e)),
            };
        }
    };

    let description = config.description.clone();
    let outcome = match evaluate(&content, &config) {
        None => TestOutcome::Pass,
        Some(reason) => TestOutcome::Fail(reason),
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Load, run and check one scene. Returns `Some(reason)` on the first mismatch.
fn evaluate(source: &str, config: &TestConfig) -> Option<String> {
    let parse_result = SceneParser::new(source.to_string(), 0).parse();

    if config.expect_parse_error {
        return match parse_result {
            Err(_) => None,
            Ok(_) => Some("expected parse error, but loading succeeded".into()),
        };
    }

    let scene: Scene = match parse_result {
        Ok(scene) => scene,
        Err(errs) => {
            let msgs: Vec<String> = errs.iter().map(|e| e.message.clone()).collect();
            return Some(format!("unexpected parse error: {}", msgs.join("; ")));
        }
    };

    if let Some(expected_warnings) = &config.expect_warnings {
        if let Some(reason) = check_warnings(source, &scene.warnings, expected_warnings) {
            return Some(reason);
        }
    }

    let engine_config = match EngineConfig::from_scene_source(source, 0) {
        Ok(c) => c,
        Err(e) => return Some(format!("invalid [engine] table: {}", e)),
    };

    let mut stage = Stage::from_scene(ManualClock::new(), engine_config, scene);
    let summary = engine::run_until_idle(&mut stage, config.limit_ms);
    if !summary.completed {
        return Some(format!(
            "run did not finish within {} ms ({} ticks)",
            config.limit_ms, summary.ticks
        ));
    }

    for expected in &config.expect.sprite {
        let Some(actual) = stage.sprite_named(&expected.name) else {
            return Some(format!("no sprite named \"{}\"", expected.name));
        };
        if let Some(reason) = check_sprite(actual, expected) {
            return Some(format!("{}: {}", expected.name, reason));
        }
    }

    None
}

fn check_sprite(actual: &Sprite, expected: &ExpectedSprite) -> Option<String> {
    let numbers = [
        ("x", expected.x, actual.state.x),
        ("y", expected.y, actual.state.y),
        ("direction", expected.direction, actual.state.direction),
    ];
    for (field, want, got) in numbers {
        if let Some(want) = want {
            if (want - got).abs() > POSITION_TOLERANCE {
                return Some(format!("expected {} = {}, got {}", field, want, got));
            }
        }
    }

    if let Some(want) = expected.cursor {
        if want != actual.cursor {
            return Some(format!("expected cursor = {}, got {}", want, actual.cursor));
        }
    }
    if let Some(want) = expected.complete {
        if want != actual.complete {
            return Some(format!("expected complete = {}, got {}", want, actual.complete));
        }
    }

    let bubbles = [
        ("say", &expected.say, &actual.state.say),
        ("think", &expected.think, &actual.state.think),
    ];
    for (field, want, got) in bubbles {
        let Some(want) = want else { continue };
        let got = got.as_ref().map(|b| b.text.as_str()).unwrap_or("");
        if want != got {
            return Some(format!("expected {} = \"{}\", got \"{}\"", field, want, got));
        }
    }

    None
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

/// Check that actual warnings match expectations. Returns `Some(reason)` on mismatch.
fn check_warnings(
    source: &str,
    warnings: &[SceneError],
    expected: &[ExpectedWarning],
) -> Option<String> {
    let actual_warnings: Vec<&SceneError> = warnings.iter().filter(|d| d.is_warning()).collect();

    if actual_warnings.len() != expected.len() {
        let actual_msgs: Vec<String> = actual_warnings
            .iter()
            .map(|w| format!("  - {}", w))
            .collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            actual_warnings.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual_warnings.iter().zip(expected.iter()).enumerate() {
        let msg = actual.to_string();

        if !msg.contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, msg
            ));
        }

        if let Some(expected_line) = expected.line {
            let actual_line = byte_offset_to_line(source, actual.span.start);
            if actual_line != expected_line {
                return Some(format!(
                    "warning[{}]: expected on line {}, but span is on line {}",
                    i, expected_line, actual_line
                ));
            }
        }
    }

    None
}

/// Discover `.test.toml` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(".test.toml") {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.toml files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn ok_label(no_color: bool) -> &'static str {
    if no_color { "ok" } else { "\x1b[32mok\x1b[0m" }
}

fn failed_label(no_color: bool) -> &'static str {
    if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

fn label_for<'a>(result: &'a TestResult) -> &'a str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(".test.toml"))
            .unwrap_or("?")
    })
}

/// Run all `.test.toml` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no .test.toml files found in {}", path.display());
            return 1;
        }
        filter_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", bold(header, no_color));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), label_for(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), label_for(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", ok_label(no_color), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            failed_label(no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

fn filter_categories(
    all_categories: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all_categories;
    }

    let mut filtered = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let mut found = false;
        for (cat, files) in &all_categories {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                filtered.insert(cat.clone(), files.clone());
                found = true;
            }
        }
        if !found {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all_categories
                    .keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}
