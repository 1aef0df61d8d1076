use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("trawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("trawl")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a host or collection of hosts, deduplicating URLs and page \
                content along the way.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to crawl")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to crawl")
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum number of hops away from the seed URL")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(-s --"strategy" <STRATEGY>)
                        .required(false)
                        .help("Order in which discovered links are visited")
                        .value_parser(["breadth-first", "depth-first"])
                        .default_value("breadth-first"),
                )
                .arg(
                    arg!(--"max-url-length" <BYTES>)
                        .required(false)
                        .help("URLs longer than this are treated as crawl loops")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2097152"),
                )
                .arg(
                    arg!(--"max-sequence-count" <COUNT>)
                        .required(false)
                        .help("URLs repeating the same chunk this many times are treated as crawl loops")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"auto-follow")
                        .required(false)
                        .help("Follow cross-domain links (default: stay on the seed's domain)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write results as JSON lines to this file (default: report to screen)"),
                )
                .arg(
                    arg!(-v --"verbose")
                        .required(false)
                        .help("Enable debug logging")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
