use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use string_service::endpoint::strings::{CountRequest, UppercaseRequest};
use string_service::endpoint::{Context, Endpoint};
use string_service::transport::client::{count_endpoint, uppercase_endpoint};

#[derive(Parser)]
#[command(name = "string-cli")]
#[command(about = "Client for the string service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upper-case a string
    Uppercase { s: String },
    /// Count the characters of a string
    Count { s: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let ctx = Context::background().with_timeout(Duration::from_secs(cli.timeout));

    match cli.command {
        Commands::Uppercase { s } => {
            let response = uppercase_endpoint(client, &cli.url)
                .call(ctx, UppercaseRequest { s })
                .await?;
            print_json(&response)?;
        }
        Commands::Count { s } => {
            let response = count_endpoint(client, &cli.url)
                .call(ctx, CountRequest { s })
                .await?;
            print_json(&response)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
