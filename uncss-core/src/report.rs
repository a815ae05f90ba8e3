//! Run reporting - selector inventories and output formatting.

use crate::filter::UnusedRule;
use crate::usage::UsageIndex;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

/// Summary of one analysis run.
///
/// `all` lists every selector of the input stylesheet in document order;
/// `used` and `unused` partition it by whether any analyzed page matched
/// the selector's normalized form. `counts` maps each selector to the
/// number of documents it matched in, zeros included.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub all: Vec<String>,
    pub used: Vec<String>,
    pub unused: Vec<String>,
    pub counts: BTreeMap<String, usize>,
    pub unused_rules: Vec<UnusedRule>,
}

impl Report {
    /// Partition the full selector inventory by usage. `normalize` maps a
    /// raw selector to the form the usage index is keyed by.
    pub fn build(
        all: Vec<String>,
        usage: &UsageIndex,
        unused_rules: Vec<UnusedRule>,
        normalize: impl Fn(&str) -> String,
    ) -> Self {
        let mut used = Vec::new();
        let mut unused = Vec::new();
        let mut counts = BTreeMap::new();
        for selector in &all {
            let key = normalize(selector);
            let count = usage.count(&key);
            counts.insert(selector.clone(), count);
            // An empty key means the selector is never queried and always
            // kept; report it on the side the output agrees with.
            if key.is_empty() || usage.contains(&key) {
                used.push(selector.clone());
            } else {
                unused.push(selector.clone());
            }
        }
        Self {
            all,
            used,
            unused,
            counts,
            unused_rules,
        }
    }
}

/// Prints a report in plain text format.
pub fn print_plain(report: &Report) {
    if report.unused.is_empty() {
        println!("No unused selectors found ({} total).", report.all.len());
    } else {
        println!(
            "UNUSED SELECTORS ({} of {}):",
            report.unused.len(),
            report.all.len()
        );
        for selector in &report.unused {
            println!("- {}", selector);
        }
    }
}

/// Prints a report in JSON format.
///
/// Falls back to a minimal shape if serialization fails (should never
/// happen with these types, but all cases are handled).
pub fn print_json(report: &Report) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            match serde_json::to_string(&json!({ "unused": report.unused })) {
                Ok(fallback) => println!("{}", fallback),
                Err(_) => println!("{{\"unused\": {:?}}}", report.unused),
            }
        }
    }
}
