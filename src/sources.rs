//! Corpus source listing.

use anyhow::Result;

use crate::config::Config;

/// Print the configured corpus entries and whether they look healthy.
pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<6} {:<50} STATUS", "KIND", "SOURCE");

    for file in &config.corpus.files {
        let status = if file.exists() { "OK" } else { "MISSING" };
        println!("{:<6} {:<50} {}", "file", file.display().to_string(), status);
    }

    for dir in &config.corpus.dirs {
        let status = if dir.root.exists() { "OK" } else { "MISSING" };
        println!("{:<6} {:<50} {}", "dir", dir.root.display().to_string(), status);
    }

    for url in &config.corpus.urls {
        // Reachability is only known at fetch time.
        println!("{:<6} {:<50} {}", "url", url, "CONFIGURED");
    }

    if config.corpus.files.is_empty()
        && config.corpus.dirs.is_empty()
        && config.corpus.urls.is_empty()
    {
        println!("(no corpus entries configured)");
    }

    Ok(())
}
