use crate::report::{generate_crawl_report, write_jsonl};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trawl_scanner::{Crawler, FilterOptions, Strategy};
use url::Url;

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("⚠️  Skipping invalid URL '{}'", line);
    None
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Build filter options from the crawl arguments
pub fn filter_options_from_args(args: &ArgMatches) -> FilterOptions {
    let mut options = FilterOptions::default();
    if let Some(max_url_length) = args.get_one::<usize>("max-url-length") {
        options = options.with_max_url_length(*max_url_length);
    }
    if let Some(max_sequence_count) = args.get_one::<usize>("max-sequence-count") {
        options = options.with_max_sequence_count(*max_sequence_count);
    }
    options
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn print_banner() {
    println!("{}", "trawl".bright_cyan().bold());
    println!(
        "{}\n",
        format!("v{} - bounded-memory crawl frontier", env!("CARGO_PKG_VERSION")).bright_black()
    );
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) {
    init_tracing(sub_matches.get_flag("verbose"));

    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches
        .get_one::<String>("hosts-file")
        .map(|raw| expand_path(raw));
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&10);
    let max_depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&3);
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let auto_follow = sub_matches.get_flag("auto-follow");
    let output = sub_matches
        .get_one::<String>("output")
        .map(|raw| expand_path(raw));

    let strategy = match sub_matches
        .get_one::<String>("strategy")
        .map(|s| s.parse::<Strategy>())
        .unwrap_or(Ok(Strategy::BreadthFirst))
    {
        Ok(strategy) => strategy,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let urls = match load_urls_from_source(url, hosts_file.as_ref()) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let filter_options = filter_options_from_args(sub_matches);

    if !quiet {
        println!("\n🕷️  Crawling {} host(s)", urls.len());
        println!("Workers: {}", threads);
        println!("Max depth: {}", max_depth);
        println!("Strategy: {}", strategy);
        println!(
            "Cross-domain: {}\n",
            if auto_follow {
                "auto (follow all)"
            } else {
                "disabled (same domain only)"
            }
        );
    }

    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    };

    let processed = Arc::new(AtomicUsize::new(0));
    let processed_clone = processed.clone();
    let spinner_clone = spinner.clone();
    let progress_callback: trawl_scanner::ProgressCallback =
        Arc::new(move |_worker_id: usize, url: String| {
            let count = processed_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = spinner_clone {
                pb.set_message(format!("Crawling... {} URLs processed ({})", count, url));
            }
        });

    let crawler = Crawler::with_timeout(timeout)
        .with_max_depth(max_depth)
        .with_strategy(strategy)
        .with_filter_options(filter_options)
        .with_auto_follow(auto_follow)
        .with_progress_callback(progress_callback);

    let mut all_results = Vec::new();
    for (idx, url_str) in urls.iter().enumerate() {
        if let Some(ref pb) = spinner
            && urls.len() > 1
        {
            pb.println(format!("Crawling host {}/{}: {}", idx + 1, urls.len(), url_str));
        }

        match crawler.crawl(url_str, threads).await {
            Ok(results) => {
                info!("Crawled {} pages from {}", results.len(), url_str);
                all_results.extend(results)
            }
            Err(e) => eprintln!("[!]  Failed to crawl {}: {}", url_str, e),
        }
    }

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Crawl complete! {} URLs processed",
            processed.load(Ordering::Relaxed)
        ));
    }

    match output {
        Some(path) => {
            if let Err(e) = write_jsonl(&all_results, &path) {
                eprintln!("✗ {:#}", e);
                std::process::exit(1);
            }
            if !quiet {
                println!("\n✓ Wrote {} results to {}", all_results.len(), path.display());
            }
        }
        None => print!("{}", generate_crawl_report(&all_results)),
    }
}
