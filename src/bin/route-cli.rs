use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Management CLI for the route registry", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all routes
    List,
    /// Show a single route
    Get { name: String },
    /// Create a new route
    Create(RouteArgs),
    /// Replace an existing route
    Update(RouteArgs),
    /// Delete a route
    Delete { name: String },
}

#[derive(Args)]
struct RouteArgs {
    /// Unique route name (slug)
    #[arg(long)]
    name: String,
    /// Inbound host
    #[arg(long)]
    host: String,
    /// Inbound path
    #[arg(long)]
    path: String,
    /// Backend URL
    #[arg(long)]
    backend: String,
    /// Whether the route is enabled
    #[arg(long, action = clap::ArgAction::Set)]
    enabled: bool,
}

impl RouteArgs {
    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "host": self.host,
            "path": self.path,
            "backend": self.backend,
            "enabled": self.enabled,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match &cli.command {
        Commands::List => client.get(format!("{}/routes", base)).send().await?,
        Commands::Get { name } => {
            client
                .get(format!("{}/routes/{}", base, name))
                .send()
                .await?
        }
        Commands::Create(route) => {
            client
                .post(format!("{}/routes", base))
                .json(&route.to_json())
                .send()
                .await?
        }
        Commands::Update(route) => {
            client
                .put(format!("{}/routes/{}", base, route.name))
                .json(&route.to_json())
                .send()
                .await?
        }
        Commands::Delete { name } => {
            client
                .delete(format!("{}/routes/{}", base, name))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: registry returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
