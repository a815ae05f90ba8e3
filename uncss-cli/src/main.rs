//! uncss CLI - remove unused CSS rules based on real pages.
//!
//! Features:
//! - Stylesheet discovery from `<link rel="stylesheet">` tags
//! - Explicit stylesheet override via --stylesheet
//! - Multi-page analysis with a used-selector union
//! - Per-document usage caching for unchanged pages
//! - Plain or JSON report output

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use uncss_core::{
    init_structured_logging, load_config, print_json, print_plain, HtmlDocument, Uncss,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Remove unused CSS rules based on real pages")]
pub struct Cli {
    /// HTML files to analyze
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    /// CSS files to clean (skips discovery from <link> tags)
    #[arg(long, short = 's', num_args = 1..)]
    stylesheet: Vec<PathBuf>,

    /// Selectors or /patterns/ to always retain
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Selector modifiers to strip before matching (state classes)
    #[arg(long, num_args = 1..)]
    ignore_modifiers: Vec<String>,

    /// Upper bound on pages analyzed concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Directory for the per-page usage cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Write cleaned CSS to a file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Print the selector usage report after the CSS
    #[arg(long)]
    report: bool,

    /// Output the report in JSON format
    #[arg(long)]
    json: bool,

    /// Directory to load uncss.toml from
    #[arg(long, default_value = ".")]
    config_root: PathBuf,
}

/// Collect the stylesheets to clean, in order. Explicit --stylesheet
/// paths win; otherwise hrefs are discovered from the pages' link tags
/// and resolved relative to each page's directory. Duplicates (the same
/// sheet linked from several pages) are read once.
fn gather_stylesheets(cli: &Cli, pages: &[(PathBuf, HtmlDocument)]) -> Result<Vec<PathBuf>> {
    if !cli.stylesheet.is_empty() {
        return Ok(cli.stylesheet.clone());
    }

    let mut sheets = Vec::new();
    for (path, document) in pages {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for href in document.stylesheet_hrefs() {
            if href.contains("://") || href.starts_with("//") {
                eprintln!("[WARN] skipping remote stylesheet: {}", href);
                continue;
            }
            let resolved = base.join(&href);
            if !sheets.contains(&resolved) {
                sheets.push(resolved);
            }
        }
    }
    if sheets.is_empty() {
        return Err(anyhow!(
            "no stylesheets found; link them from the pages or pass --stylesheet"
        ));
    }
    Ok(sheets)
}

/// Concatenate stylesheet sources. With more than one sheet, each gets a
/// banner comment naming its origin, so the cleaned output stays
/// attributable.
fn concat_stylesheets(sheets: &[(PathBuf, String)]) -> String {
    if sheets.len() == 1 {
        return sheets[0].1.clone();
    }
    let mut out = String::new();
    for (path, source) in sheets {
        out.push_str(&format!("/*** uncss> filename: {} ***/\n", path.display()));
        out.push_str(source);
        if !source.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Validates output file paths.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    for component in p.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(anyhow!(
                "Path traversal (..) not allowed in output paths: {}",
                path
            ));
        }
    }

    Ok(p)
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] uncss internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    // 1. Load the pages
    let mut pages = Vec::with_capacity(cli.pages.len());
    for path in &cli.pages {
        let document = HtmlDocument::from_file(path)
            .with_context(|| format!("Failed to load page: {}", path.display()))?;
        pages.push((path.clone(), document));
    }

    // 2. Gather and read stylesheets
    let sheet_paths = gather_stylesheets(&cli, &pages)?;
    let mut sheets = Vec::with_capacity(sheet_paths.len());
    for path in &sheet_paths {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read stylesheet: {}", path.display()))?;
        sheets.push((path.clone(), source));
    }
    let css = concat_stylesheets(&sheets);

    // 3. Build the runner: flags accumulate on top of uncss.toml
    let mut runner = Uncss::new();
    match load_config(&cli.config_root) {
        Ok(Some(cfg)) => runner = runner.with_config(&cfg),
        Ok(None) => {}
        Err(e) => {
            eprintln!("[WARN] config load failed: {}", e);
        }
    }
    runner = runner
        .ignore(cli.ignore.iter().cloned())
        .ignore_modifiers(cli.ignore_modifiers.iter().cloned());
    if let Some(limit) = cli.concurrency {
        runner = runner.concurrency(limit);
    }
    if let Some(ref dir) = cli.cache_dir {
        runner = runner.cache_dir(dir);
    }

    // 4. Run the removal pass
    let documents: Vec<HtmlDocument> = pages.into_iter().map(|(_, d)| d).collect();
    let (cleaned, report) = runner
        .process(&documents, &css)
        .context("Removal run failed")?;

    // 5. Emit the cleaned CSS
    if let Some(ref file) = cli.output {
        let safe_path =
            validate_output_path(file).with_context(|| format!("Invalid output path: {}", file))?;
        fs::write(&safe_path, &cleaned)
            .with_context(|| format!("Failed to write CSS to {}", safe_path.display()))?;
        eprintln!("[uncss] Cleaned CSS written to {}", safe_path.display());
    } else {
        println!("{}", cleaned);
    }

    // 6. Report
    if cli.report {
        if cli.json {
            print_json(&report);
        } else {
            print_plain(&report);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("uncss_cli_test")
            .join(format!("{}_{}", name, id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    fn cli_for(pages: Vec<PathBuf>) -> Cli {
        Cli {
            pages,
            stylesheet: Vec::new(),
            ignore: Vec::new(),
            ignore_modifiers: Vec::new(),
            concurrency: None,
            cache_dir: None,
            output: None,
            report: false,
            json: false,
            config_root: PathBuf::from("."),
        }
    }

    // --- gather_stylesheets TESTS ---

    #[test]
    fn test_discovery_resolves_relative_to_page() {
        let dir = create_temp_dir("discover");
        let page_path = dir.join("site/index.html");
        create_file(
            &page_path,
            r#"<head><link rel="stylesheet" href="css/site.css"></head>"#,
        );
        create_file(&dir.join("site/css/site.css"), ".a{}");

        let document = HtmlDocument::from_file(&page_path).unwrap();
        let cli = cli_for(vec![page_path.clone()]);
        let sheets = gather_stylesheets(&cli, &[(page_path, document)]).unwrap();

        assert_eq!(sheets, vec![dir.join("site/css/site.css")]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_discovery_dedupes_shared_sheets() {
        let dir = create_temp_dir("dedupe");
        let markup = r#"<head><link rel="stylesheet" href="site.css"></head>"#;
        let a = dir.join("a.html");
        let b = dir.join("b.html");
        create_file(&a, markup);
        create_file(&b, markup);

        let pages = vec![
            (a.clone(), HtmlDocument::from_file(&a).unwrap()),
            (b.clone(), HtmlDocument::from_file(&b).unwrap()),
        ];
        let cli = cli_for(vec![a, b]);
        let sheets = gather_stylesheets(&cli, &pages).unwrap();
        assert_eq!(sheets.len(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_discovery_skips_remote_sheets() {
        let dir = create_temp_dir("remote");
        let page_path = dir.join("index.html");
        create_file(
            &page_path,
            r#"<head>
                <link rel="stylesheet" href="https://cdn.example.com/lib.css">
                <link rel="stylesheet" href="local.css">
            </head>"#,
        );

        let document = HtmlDocument::from_file(&page_path).unwrap();
        let cli = cli_for(vec![page_path.clone()]);
        let sheets = gather_stylesheets(&cli, &[(page_path, document)]).unwrap();
        assert_eq!(sheets, vec![dir.join("local.css")]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_explicit_stylesheets_skip_discovery() {
        let dir = create_temp_dir("explicit");
        let page_path = dir.join("index.html");
        create_file(
            &page_path,
            r#"<head><link rel="stylesheet" href="linked.css"></head>"#,
        );

        let document = HtmlDocument::from_file(&page_path).unwrap();
        let mut cli = cli_for(vec![page_path.clone()]);
        cli.stylesheet = vec![PathBuf::from("explicit.css")];
        let sheets = gather_stylesheets(&cli, &[(page_path, document)]).unwrap();
        assert_eq!(sheets, vec![PathBuf::from("explicit.css")]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_stylesheets_is_an_error() {
        let dir = create_temp_dir("none");
        let page_path = dir.join("index.html");
        create_file(&page_path, "<body></body>");

        let document = HtmlDocument::from_file(&page_path).unwrap();
        let cli = cli_for(vec![page_path.clone()]);
        assert!(gather_stylesheets(&cli, &[(page_path, document)]).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    // --- concat_stylesheets TESTS ---

    #[test]
    fn test_single_sheet_gets_no_banner() {
        let sheets = vec![(PathBuf::from("a.css"), ".a{}".to_string())];
        assert_eq!(concat_stylesheets(&sheets), ".a{}");
    }

    #[test]
    fn test_multiple_sheets_get_banners() {
        let sheets = vec![
            (PathBuf::from("a.css"), ".a{}".to_string()),
            (PathBuf::from("b.css"), ".b{}".to_string()),
        ];
        let out = concat_stylesheets(&sheets);
        assert!(out.contains("/*** uncss> filename: a.css ***/"));
        assert!(out.contains("/*** uncss> filename: b.css ***/"));
        let a = out.find(".a{}").unwrap();
        let b = out.find(".b{}").unwrap();
        assert!(a < b);
    }

    // --- validate_output_path TESTS ---

    #[test]
    fn test_output_path_rejects_traversal() {
        assert!(validate_output_path("../escape.css").is_err());
        assert!(validate_output_path("ok/../../escape.css").is_err());
        assert!(validate_output_path("/absolute.css").is_err());
        assert!(validate_output_path("clean.css").is_ok());
    }
}
