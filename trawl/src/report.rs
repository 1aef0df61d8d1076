use anyhow::Context;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use trawl_scanner::CrawlResult;
use url::Url;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Generate a crawl report from results, grouped by host
pub fn generate_crawl_report(results: &[CrawlResult]) -> String {
    let divider = "━".repeat(52);
    let mut report = String::new();
    report.push_str(&format!("{}\n\n", divider));
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages crawled: {}\n", results.len()));

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    report.push_str(&format!("  Failed requests: {}\n", failed));

    let total_links: usize = results.iter().map(|r| r.links_found.len()).sum();
    report.push_str(&format!("  Total links found: {}\n", total_links));

    let total_forms: usize = results.iter().map(|r| r.forms_found).sum();
    report.push_str(&format!("  Total forms found: {}\n", total_forms));

    let total_scripts: usize = results.iter().map(|r| r.scripts_found).sum();
    report.push_str(&format!("  Total scripts found: {}\n", total_scripts));

    let max_depth = results.iter().map(|r| r.request.depth).max().unwrap_or(0);
    report.push_str(&format!("  Deepest hop: {}\n", max_depth));

    report.push_str(&format!("\n{}\n\n", divider));

    let mut by_host: BTreeMap<String, Vec<&CrawlResult>> = BTreeMap::new();
    for result in results {
        if let Ok(url) = Url::parse(result.url())
            && let Some(host) = url.host_str()
        {
            by_host.entry(host.to_string()).or_default().push(result);
        }
    }

    for (host, host_results) in by_host.iter() {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages found\n\n", host_results.len()));

        for result in host_results {
            let path = extract_url_path(result.url());

            if let Some(ref error) = result.error {
                report.push_str(&format!("  {} {} {}\n", "ERR".red(), path, error.bright_black()));
                continue;
            }

            let status = result.status_code.to_string();
            let status_str = match result.status_code {
                200..=299 => status.green(),
                300..=399 => status.cyan(),
                400..=499 => status.yellow(),
                500..=599 => status.red(),
                _ => status.white(),
            };

            let mut line = format!("  {} {}", status_str, path);
            if let Some(ref content_type) = result.content_type
                && !content_type.starts_with("text/html")
            {
                line.push_str(&format!(" {}", content_type.bright_black()));
            }
            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    report
}

/// Write one JSON object per result.
pub fn write_jsonl(results: &[CrawlResult], path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for result in results {
        serde_json::to_writer(&mut writer, result)
            .with_context(|| format!("Failed to serialize result for {}", result.url()))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
