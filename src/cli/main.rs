use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use reqwest::Client;

#[derive(Parser)]
#[command(name = "iris-cli")]
#[command(about = "Iris consensus service CLI", version, long_about = None)]
struct Cli {
    #[arg(short, long, env = "IRIS_ENDPOINT", default_value = "http://localhost:5000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

/// Flower measurements in centimetres
#[derive(Args)]
struct Measurements {
    #[arg(long)]
    sepal_length: f64,

    #[arg(long)]
    sepal_width: f64,

    #[arg(long)]
    petal_length: f64,

    #[arg(long)]
    petal_width: f64,
}

impl Measurements {
    fn query(&self) -> [(&'static str, f64); 4] {
        [
            ("sepal_length", self.sepal_length),
            ("sepal_width", self.sepal_width),
            ("petal_length", self.petal_length),
            ("petal_width", self.petal_width),
        ]
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Predict with the support vector machine
    Svm(Measurements),

    /// Predict with the decision tree
    Tree(Measurements),

    /// Consensus of the two local models
    Consensus(Measurements),

    /// Accuracy-weighted consensus of the external models
    External(Measurements),

    /// Check server health
    Health,

    /// Describe the loaded models
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    let (path, measurements) = match &cli.command {
        Commands::Svm(m) => ("predict_svm", Some(m)),
        Commands::Tree(m) => ("predict_decision_tree", Some(m)),
        Commands::Consensus(m) => ("predict", Some(m)),
        Commands::External(m) => ("consensus_predict", Some(m)),
        Commands::Health => ("health", None),
        Commands::Models => ("models", None),
    };

    let url = format!("{}/{}", cli.endpoint.trim_end_matches('/'), path);
    let mut request = client.get(&url);
    if let Some(m) = measurements {
        request = request.query(&m.query());
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;
    let status = response.status();

    let body: serde_json::Value = response
        .json()
        .await
        .context("Server returned a non-JSON body")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("request failed with HTTP {}", status);
    }

    Ok(())
}
