use clap::Parser;
use log::debug;
use weather_recommender::{OutputFormat, Provider, Recommender};

#[derive(Parser)]
#[command(name = "weather-recommender")]
#[command(about = "Weather- and budget-aware things to do near a place", version)]
struct Cli {
    /// Place to recommend around, e.g. "Seoul" or "Jamsil, Seoul"
    location: String,

    /// Budget in KRW (0 means any budget)
    #[arg(long, default_value_t = 0.0)]
    budget: f64,

    /// Interest to steer the suggestions; repeatable
    #[arg(long = "interest")]
    interests: Vec<String>,

    /// Output format: html, text, json or places
    #[arg(long, default_value = "html")]
    format: OutputFormat,

    /// Text-generation provider: google, openai or anthropic
    #[arg(long, env = "RECOMMENDER_PROVIDER")]
    provider: Option<Provider>,

    /// Model override for the provider
    #[arg(long)]
    model: Option<String>,

    /// Save the rendered report to the reports directory
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut builder = Recommender::builder()
        .location(cli.location)
        .budget_krw(cli.budget)
        .format(cli.format);
    for interest in cli.interests {
        builder = builder.interest(interest);
    }
    if let Some(provider) = cli.provider {
        builder = builder.provider(provider);
    }
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if cli.save {
        builder = builder.save_report(true);
    }

    let result = builder.build().await?;
    debug!("Raw generator output:\n{}", result.report.raw_text);

    println!("{}", result.rendered);
    if let Some(path) = result.saved_to {
        eprintln!("Report saved to {}", path.display());
    }

    Ok(())
}
