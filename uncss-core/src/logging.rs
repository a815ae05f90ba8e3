//! Structured logging setup using **tracing**.
//!
//! Analysis code logs through the `tracing` macros directly; this module
//! only owns the one-time subscriber setup for binaries. Library
//! consumers that install their own subscriber should skip it.

/// Initializes the global tracing collector (subscriber).
///
/// This should be called *once* at the beginning of the application's
/// runtime. It configures structured JSON output to stderr.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=uncss=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json() // Output logs in JSON format
        .with_ansi(false) // Disable ANSI codes in JSON output
        .with_level(true) // Include the log level field
        .with_target(true) // Include the module path (target)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG env var
        .with_writer(std::io::stderr) // Write to stderr (keeps stdout clean for tool output)
        .init();
}
