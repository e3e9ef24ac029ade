// FILE: src/cli/mod.rs

mod config;
mod handlers;

use crate::assignment::Scope;
use crate::error::{ReplayError, Result};
use crate::ReplayOptions;
use clap::{Arg, ArgAction, Command, ValueEnum};
use std::time::Instant;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct Cli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

impl Cli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        self.setup_logging(matches.get_count("verbose"))?;

        let result = match matches.subcommand() {
            Some(("apply", sub_matches)) => handlers::handle_apply_command(self, sub_matches),
            Some(("schemas", sub_matches)) => handlers::handle_schemas_command(sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(sub_matches),
            Some(("inspect", sub_matches)) => handlers::handle_inspect_command(sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        };
        log::debug!("Finished in {}ms", self.start_time.elapsed().as_millis());
        result
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("Contentify Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("apply")
                    .about("Replay rows into a design document")
                    .arg(Arg::new("document").help("Document JSON file").required(true).index(1))
                    .arg(Arg::new("rows").help("Rows JSON file").required(true).index(2))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output document file"))
                    .arg(Arg::new("selection").long("selection").help("Only fill containers inside the saved selection").action(ArgAction::SetTrue))
                    .arg(Arg::new("no-images").long("no-images").help("Skip fetching image fields").action(ArgAction::SetTrue))
                    .arg(Arg::new("concurrency").long("concurrency").value_name("N").value_parser(clap::value_parser!(usize)).help("Concurrent image downloads"))
                    .arg(Arg::new("debug").short('d').long("debug").help("Enable debug mode with per-phase logging").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Show detailed import statistics").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("schemas")
                    .about("List the property mapping schemas")
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("text").help("Output format")),
            )
            .subcommand(
                Command::new("check")
                    .about("Validate row files")
                    .arg(Arg::new("input").help("Rows JSON file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all JSON files in directory recursively").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("inspect")
                    .about("Show containers and deep-cache statistics of a document")
                    .arg(Arg::new("document").help("Document JSON file").required(true).index(1)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    /// Defaults, then the config file, then command-line flags
    pub fn build_replay_options(&self, matches: &clap::ArgMatches) -> Result<ReplayOptions> {
        let mut options = ReplayOptions::default();
        self.config.apply_to(&mut options);

        if matches.get_flag("debug") {
            options.debug_mode = true;
        }
        if matches.get_flag("selection") {
            options.scope = Scope::Selection;
        }
        if matches.get_flag("no-images") {
            options.fetch_images = false;
        }
        if let Some(concurrency) = matches.get_one::<usize>("concurrency") {
            if *concurrency == 0 {
                return Err(ReplayError::config("--concurrency must be at least 1"));
            }
            options.max_concurrent_images = *concurrency;
        }
        Ok(options)
    }

    pub fn output_directory(&self) -> Option<&str> {
        self.config.output_directory.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_matches(args: &[&str]) -> clap::ArgMatches {
        let cli = Cli::new();
        let matches = cli.build_cli().get_matches_from(args);
        matches.subcommand_matches("apply").unwrap().clone()
    }

    #[test]
    fn test_flags_override_defaults() {
        let matches = apply_matches(&[
            "contentify",
            "apply",
            "doc.json",
            "rows.json",
            "--selection",
            "--no-images",
            "--concurrency",
            "6",
        ]);
        let options = Cli::new().build_replay_options(&matches).unwrap();
        assert_eq!(options.scope, Scope::Selection);
        assert!(!options.fetch_images);
        assert_eq!(options.max_concurrent_images, 6);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let matches = apply_matches(&["contentify", "apply", "doc.json", "rows.json", "--concurrency", "0"]);
        assert!(Cli::new().build_replay_options(&matches).is_err());
    }

    #[test]
    fn test_command_tree_is_valid() {
        Cli::new().build_cli().debug_assert();
    }
}
