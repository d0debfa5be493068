use std::io::Write;

use anyhow::{Context, Result};
use log::{info, warn};

use travel_digest::client::ApiClient;
use travel_digest::config::Config;
use travel_digest::filter::Classifier;
use travel_digest::pipeline::{Pipeline, PipelineSettings};
use travel_digest::types::Taxonomy;
use travel_digest::{notify, report, storage};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(buf, "[{}] {}", record.level().as_str().to_lowercase(), record.args())
        })
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env()?;

    let taxonomy = match &config.taxonomy_file {
        Some(path) => storage::load_taxonomy(path)?,
        None => Taxonomy::travel(),
    };
    let classifier = Classifier::new(taxonomy, config.match_mode)?;
    info!(
        "Classifier ready: {} keywords, {:?} matching",
        classifier.keywords().len(),
        config.match_mode
    );

    let client = ApiClient::new(&config)?;
    let pipeline = Pipeline::new(&client, &classifier, PipelineSettings::from(&config));
    let selection = pipeline.run().context("Funding round selection failed")?;
    let rows = &selection.records;

    println!();
    println!("{}", report::render(rows));

    let today = chrono::Local::now().date_naive();
    let file_name = storage::csv_file_name(config.target_matches, today);
    let path = storage::save_csv(&config.output_dir, &file_name, rows)?;
    info!("Saved {} rows to {}", rows.len(), path.display());

    if let Some(webhook) = &config.slack_webhook_url {
        match notify::send_slack(webhook, &notify::format_message(rows)) {
            Ok(()) => info!("Posted to Slack."),
            Err(e) => warn!("Slack post failed: {:#}", e),
        }
    }

    Ok(())
}
