// src/cli.rs

use crate::similarity::{DEFAULT_PARAMETERS_TOP_SIZE, DEFAULT_SIMILAR_DEVELOPERS_NUMBER};
use crate::stargazers::DEFAULT_TOP_SIZE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Similar developers search tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get information about developers and their commits
    Prog {
        /// Local paths or URLs of git repositories
        #[arg(short, long = "repos", num_args = 1.., default_value = "https://github.com/ishepard/pydriller")]
        repos: Vec<String>,

        /// Where to save the extracted developers information
        #[arg(short, long, default_value = "results/programmers_commits.json")]
        file_path: PathBuf,

        /// Directory remote repositories are cloned into
        #[arg(long, default_value_os_t = std::env::temp_dir().join("sim-dev-search"))]
        clone_dir: PathBuf,
    },

    /// Get the GitHub repositories most popular among the stargazers of the given ones
    Top {
        /// GitHub repository URLs
        #[arg(short, long = "repos", num_args = 1.., default_value = "https://github.com/pytorch/pytorch")]
        repos: Vec<String>,

        /// Where to save the repositories top
        #[arg(short, long, default_value = "results/repositories_top.json")]
        file_path: PathBuf,

        /// GitHub API access token
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        api_token: Option<String>,

        /// Number of repositories to keep
        #[arg(long, default_value_t = DEFAULT_TOP_SIZE)]
        top_size: usize,

        /// Maximum number of pages fetched per listing
        #[arg(long)]
        max_pages: Option<u32>,

        /// Only look at the starred repositories of this many stargazers
        #[arg(long)]
        stargazers_limit: Option<usize>,
    },

    /// Find developers similar to the given one
    #[command(name = "sim-dev", alias = "sim_dev")]
    SimDev {
        /// E-mail of the developer to find similar ones for
        #[arg(short, long)]
        user_email: String,

        /// File with developers information produced by `prog`
        #[arg(short, long, default_value = "results/programmers_commits.json")]
        in_file_path: PathBuf,

        /// Where to save the result [default: results/similar_developers_for_<email>.json]
        #[arg(short, long)]
        out_file_path: Option<PathBuf>,

        /// Number of similar developers to report
        #[arg(short = 'n', long, default_value_t = DEFAULT_SIMILAR_DEVELOPERS_NUMBER)]
        similar_developers_number: usize,

        /// Number of top languages and identifiers reported per developer
        #[arg(short = 't', long, default_value_t = DEFAULT_PARAMETERS_TOP_SIZE)]
        parameters_top_size: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_sim_dev_with_defaults() {
        let args = Args::parse_from(["sim-dev-search", "sim_dev", "-u", "a@x.com"]);
        match args.command {
            Command::SimDev {
                user_email,
                in_file_path,
                out_file_path,
                similar_developers_number,
                parameters_top_size,
            } => {
                assert_eq!(user_email, "a@x.com");
                assert_eq!(in_file_path, PathBuf::from("results/programmers_commits.json"));
                assert!(out_file_path.is_none());
                assert_eq!(similar_developers_number, 15);
                assert_eq!(parameters_top_size, 15);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_multiple_repos() {
        let args = Args::parse_from(["sim-dev-search", "-v", "prog", "-r", "a", "b", "-f", "out.json"]);
        assert_eq!(args.verbose, 1);
        match args.command {
            Command::Prog { repos, file_path, .. } => {
                assert_eq!(repos, vec!["a", "b"]);
                assert_eq!(file_path, PathBuf::from("out.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
