use clap::{Arg, ArgAction, Command};
use log::{debug, error, info, LevelFilter};
use std::path::PathBuf;

mod audit;
mod config;
mod data_loader;
mod error;
mod external;
mod fusion;
mod isoform;
mod junction;
mod merge;
mod pipeline;
mod report;
mod support;

use config::RunConfig;
use external::{BlastPromiscuityFilter, NoPostFilter, PostFilter};

fn cli() -> Command {
    Command::new("fusion-filter")
        .version(env!("CARGO_PKG_VERSION"))
        .author("NaotoKubota")
        .about("Merges and filters fusion candidates by junction and spanning read support")
        .arg(Arg::new("fusion-preds")
            .long("fusion-preds")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .help("Fusion candidate table (tab-delimited, optionally gzipped)"))
        .arg(Arg::new("out-prefix")
            .long("out-prefix")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .help("Output prefix for the output files"))
        .arg(Arg::new("genome-lib-dir")
            .long("genome-lib-dir")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .help("Genome library directory used by the blast and promiscuity filter"))
        .arg(Arg::new("min-junction-reads")
            .long("min-junction-reads")
            .default_value("1")
            .value_parser(clap::value_parser!(u32))
            .help("Minimum number of junction reads"))
        .arg(Arg::new("min-sum-frags")
            .long("min-sum-frags")
            .default_value("2")
            .value_parser(clap::value_parser!(u32))
            .help("Minimum junction reads plus spanning fragments"))
        .arg(Arg::new("min-novel-junction-support")
            .long("min-novel-junction-support")
            .default_value("3")
            .value_parser(clap::value_parser!(u32))
            .help("Minimum junction reads for fusions with a non-reference splice"))
        .arg(Arg::new("min-alt-pct-junction")
            .long("min-alt-pct-junction")
            .default_value("10")
            .value_parser(clap::value_parser!(f64))
            .help("Minimum percent of the dominant isoform's junction reads to keep a minor isoform"))
        .arg(Arg::new("aggregate-novel-junction-dist")
            .long("aggregate-novel-junction-dist")
            .default_value("5")
            .value_parser(clap::value_parser!(u64))
            .help("Maximum breakpoint distance for merging non-reference splice variants"))
        .arg(Arg::new("require-LDAS")
            .long("require-LDAS")
            .default_value("true")
            .value_parser(clap::value_parser!(bool))
            .help("Require long double anchor support for fusions without spanning fragments"))
        .arg(Arg::new("max-promiscuity")
            .long("max-promiscuity")
            .default_value("10")
            .value_parser(clap::value_parser!(u32))
            .help("Maximum number of partners allowed for a given fusion gene"))
        .arg(Arg::new("min-pct-dom-promiscuity")
            .long("min-pct-dom-promiscuity")
            .default_value("20")
            .value_parser(clap::value_parser!(u32))
            .help("Minimum percent of dominant partner support for promiscuous genes"))
        .arg(Arg::new("evalue")
            .long("evalue")
            .default_value("1e-3")
            .value_parser(clap::value_parser!(f64))
            .help("E-value threshold for blast similarity between fusion partners"))
        .arg(Arg::new("blast-filter-exe")
            .long("blast-filter-exe")
            .default_value("blast_and_promiscuity_filter.pl")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Executable for the blast and promiscuity filter"))
        .arg(Arg::new("skip-blast-filter")
            .long("skip-blast-filter")
            .action(ArgAction::SetTrue)
            .help("Skip the blast and promiscuity filter"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Enable verbose output to print all arguments"))
}

fn main() {
    let matches = cli().get_matches();
    let verbose = matches.get_flag("verbose");

    // Initialize the logger with the appropriate level
    if verbose {
        env_logger::Builder::from_default_env()
            .filter(None, LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter(None, LevelFilter::Info)
            .init();
    }

    let config = match RunConfig::from_matches(&matches).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Running fusion-filter");
    debug!("Fusion predictions: {:?}", config.fusion_preds);
    debug!("Output prefix: {:?}", config.out_prefix);
    debug!("Genome library: {:?}", config.genome_lib_dir);
    debug!("Filter parameters: {:?}", config.filter);
    debug!("Post-filter parameters: {:?}", config.post_filter);

    let post_filter: Box<dyn PostFilter> = if config.skip_blast_filter {
        info!("Skipping blast and promiscuity filter");
        Box::new(NoPostFilter)
    } else {
        Box::new(BlastPromiscuityFilter {
            exe: config.blast_filter_exe.clone(),
            genome_lib_dir: config.genome_lib_dir.clone(),
            params: config.post_filter.clone(),
        })
    };

    if let Err(e) = pipeline::run(&config, post_filter.as_ref()) {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Finished processing");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let matches = cli()
            .try_get_matches_from([
                "fusion-filter",
                "--fusion-preds",
                "preds.tsv",
                "--out-prefix",
                "out/sample",
                "--genome-lib-dir",
                "lib",
            ])
            .unwrap();
        let config = RunConfig::from_matches(&matches).unwrap();
        assert_eq!(config.filter, config::FilterParams::default());
        assert_eq!(config.post_filter, config::PostFilterParams::default());
        assert!(!config.skip_blast_filter);
        assert_eq!(config.out_prefix, PathBuf::from("out/sample"));
    }

    #[test]
    fn test_cli_overrides() {
        let matches = cli()
            .try_get_matches_from([
                "fusion-filter",
                "--fusion-preds",
                "preds.tsv",
                "--out-prefix",
                "out/sample",
                "--genome-lib-dir",
                "lib",
                "--min-novel-junction-support",
                "5",
                "--require-LDAS",
                "false",
                "--aggregate-novel-junction-dist",
                "10",
                "--skip-blast-filter",
            ])
            .unwrap();
        let config = RunConfig::from_matches(&matches).unwrap();
        assert_eq!(config.filter.min_novel_junction_support, 5);
        assert!(!config.filter.require_long_double_anchor_support);
        assert_eq!(config.filter.aggregate_novel_junction_dist, 10);
        assert!(config.skip_blast_filter);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(cli()
            .try_get_matches_from(["fusion-filter", "--out-prefix", "x", "--genome-lib-dir", "lib"])
            .is_err());
    }
}
