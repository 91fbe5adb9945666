// src/main.rs

use anyhow::Context;
use clap::Parser;
use sim_dev_search::cli::{Args, Command};
use sim_dev_search::extractor::ReposInfoExtractor;
use sim_dev_search::model::DevelopersInfo;
use sim_dev_search::similarity::SimilarDevelopersFinder;
use sim_dev_search::stargazers::{GithubClient, StargazersTopExtractor};
use sim_dev_search::store::{default_similar_path, read_json, write_json};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let start_time = Instant::now();

    match args.command {
        Command::Prog {
            repos,
            file_path,
            clone_dir,
        } => {
            let developers = ReposInfoExtractor::new(repos, clone_dir)
                .extract()
                .context("Failed to extract developers information")?;
            tracing::info!("Found {} developers in {:.2?}", developers.len(), start_time.elapsed());
            write_json(&file_path, &developers)?;
            println!("Developers information has been saved to {}.", file_path.display());
        }
        Command::Top {
            repos,
            file_path,
            api_token,
            top_size,
            max_pages,
            stargazers_limit,
        } => {
            let mut extractor = StargazersTopExtractor::new(GithubClient::new(api_token)?).with_top_size(top_size);
            if let Some(max_pages) = max_pages {
                extractor = extractor.with_max_pages(max_pages);
            }
            if let Some(limit) = stargazers_limit {
                extractor = extractor.with_stargazers_limit(limit);
            }
            let top = extractor
                .repositories_top(&repos)
                .context("Failed to rank starred repositories")?;
            write_json(&file_path, &top)?;
            println!("Repositories top has been saved to {}.", file_path.display());
        }
        Command::SimDev {
            user_email,
            in_file_path,
            out_file_path,
            similar_developers_number,
            parameters_top_size,
        } => {
            let developers: DevelopersInfo = read_json(&in_file_path)
                .with_context(|| format!("Exception while getting json from {}", in_file_path.display()))?;
            let similar = SimilarDevelopersFinder::new(similar_developers_number, parameters_top_size)
                .find(&developers, &user_email)?;

            let out_file_path = out_file_path.unwrap_or_else(|| default_similar_path(&user_email));
            write_json(&out_file_path, &similar)?;
            println!(
                "Similar developers information has been saved to {}.",
                out_file_path.display()
            );
        }
    }

    tracing::info!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sim_dev_search={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
