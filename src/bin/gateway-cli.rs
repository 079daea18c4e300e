use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the payment gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check RPC reachability and cache statistics
    Health,
    /// Resolve a transaction reference against a pool address
    TxInfo {
        symbol: String,
        reference: String,
        #[arg(long)]
        pool: String,
    },
    /// Quote the current transfer fee for a rail
    Fee { symbol: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::TxInfo {
            symbol,
            reference,
            pool,
        } => {
            client
                .get(format!("{}/{}/oracle/transactionInfo", base, symbol))
                .query(&[("reference", reference), ("poolAddress", pool)])
                .send()
                .await?
        }
        Commands::Fee { symbol } => client.get(format!("{}/{}/tx/fee", base, symbol)).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    // Error bodies are JSON statuses too; fall back to raw text otherwise.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
