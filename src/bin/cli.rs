//! Hitlog CLI
//!
//! Command-line client for a running Hitlog server:
//! - Count distinct queries under a date prefix
//! - List the most popular queries
//! - Check status
//! - Generate a config file

use clap::{Parser, Subcommand};
use hitlog::api::dto::{CountResponse, HealthResponse, PopularResponse};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hitlog-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query a Hitlog server")]
#[command(long_about = "Hitlog counts and ranks search queries by date prefix.\nDates go from a year (2015) down to a second (\"2015-08-03 00:00:07\").")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8080", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count distinct queries under a date prefix
    Count {
        /// Date prefix, e.g. 2015-08 or "2015-08-03 00:05"
        date: String,
    },

    /// Show the most popular queries under a date prefix
    Popular {
        /// Date prefix, e.g. 2015-08 or "2015-08-03 00:05"
        date: String,
        /// Number of queries to show
        #[arg(short, long, default_value = "10")]
        size: usize,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Count { date } => {
            let url = format!("{}/1/queries/count/{}", cli.api_url, encode_date(&date));
            let response = client.get(&url).send().await?;

            if !response.status().is_success() {
                fail("Count", response).await;
            }

            let data: CountResponse = response.json().await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&data)?),
                _ => println!("{}: {} distinct queries", date, data.count),
            }
        }

        Commands::Popular { date, size } => {
            let url = format!(
                "{}/1/queries/popular/{}?size={}",
                cli.api_url,
                encode_date(&date),
                size
            );
            let response = client.get(&url).send().await?;

            if !response.status().is_success() {
                fail("Popular", response).await;
            }

            let data: PopularResponse = response.json().await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&data)?),
                _ => print_table(&data),
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: HealthResponse = resp.json().await?;

                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(&health)?);
                        return Ok(());
                    }

                    println!("Hitlog v{}", health.version);
                    println!();
                    println!("API Status: {}", health.status);
                    println!();
                    println!("Index:");
                    println!("  Events: {}", health.total_events);
                    println!("  Distinct queries: {}", health.distinct_queries);
                    match (health.years.first(), health.years.last()) {
                        (Some(first), Some(last)) if first != last => {
                            println!("  Years: {}-{}", first, last)
                        }
                        (Some(year), _) => println!("  Years: {}", year),
                        _ => println!("  Years: none"),
                    }
                    println!();
                    println!("Uptime: {}", format_duration(health.uptime_seconds));
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Hitlog API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Hitlog server is running:");
                    eprintln!("  cargo run --bin hitlog -- -f hn_logs.tsv");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = hitlog::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Report a failed request and exit
async fn fail(what: &str, response: reqwest::Response) -> ! {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    eprintln!("{} failed ({}): {}", what, status, text);
    std::process::exit(1);
}

/// Percent-encode a date prefix as a single path segment
fn encode_date(date: &str) -> String {
    urlencoding::encode(date.trim()).into_owned()
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_table(data: &PopularResponse) {
    if data.queries.is_empty() {
        println!("No queries for this date");
        return;
    }

    let width = data
        .queries
        .iter()
        .map(|q| q.query.len())
        .max()
        .unwrap_or(0)
        .clamp(5, 80);

    println!("{:>4}  {:<width$}  {:>8}", "#", "Query", "Count", width = width);
    println!("{}", "-".repeat(width + 16));

    for (rank, entry) in data.queries.iter().enumerate() {
        println!(
            "{:>4}  {:<width$}  {:>8}",
            rank + 1,
            entry.query,
            entry.count,
            width = width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_date() {
        assert_eq!(encode_date("2015-08"), "2015-08");
        assert_eq!(encode_date(" 2015-08-03 00:05 "), "2015-08-03%2000%3A05");
    }

    #[test]
    fn test_encode_date_reserved_characters() {
        assert_eq!(encode_date("2015/08"), "2015%2F08");
        assert_eq!(encode_date("2015-08#x"), "2015-08%23x");
        assert_eq!(encode_date("2015-08?size=1"), "2015-08%3Fsize%3D1");
        assert_eq!(encode_date("2015%"), "2015%25");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(3_725), "1h 2m");
        assert_eq!(format_duration(90_000), "1d 1h");
    }
}
