use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Management CLI for the proxy manager", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "secret")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List proxies known to the control plane
    List,
    /// List proxies declared by container labels
    Containers,
    /// Create a proxy
    Add {
        /// Host to match, e.g. app.example.com
        #[arg(short = 'm', long = "match")]
        host: String,
        /// Upstream dial target, e.g. localhost:9000
        #[arg(short = 'u', long)]
        upstream: String,
    },
    /// Delete a proxy by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert("X-Key", HeaderValue::from_str(&cli.key)?);

    let res = match cli.command {
        Commands::List => {
            client.get(format!("{}/proxies", cli.url))
                .send()
                .await?
        }
        Commands::Containers => {
            client.get(format!("{}/container-proxies", cli.url))
                .send()
                .await?
        }
        Commands::Add { host, upstream } => {
            client.post(format!("{}/proxies", cli.url))
                .headers(headers)
                .json(&json!({ "match": host, "upstream": upstream }))
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client.delete(format!("{}/proxies/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: management API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
