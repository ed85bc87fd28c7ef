use almanac::build::build_site;
use almanac::config::Config;
use anyhow::Result;
use clap::{crate_version, App, Arg, ArgMatches};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("almanac")
        .version(crate_version!())
        .about("Builds a static site from a directory of dated posts")
        .arg(
            Arg::with_name("SOURCE")
                .help("The site source directory")
                .default_value(".")
                .index(1),
        )
        .arg(
            Arg::with_name("DESTINATION")
                .help("The output directory (overrides `destination` in _config.yml)")
                .index(2),
        )
        .arg(
            Arg::with_name("lsi")
                .long("lsi")
                .help("Rank related posts by similarity"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log per-post detail"),
        )
        .get_matches();

    init_logging(matches.is_present("verbose"));
    if let Err(e) = run(&matches) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn run(matches: &ArgMatches) -> Result<()> {
    let source = Path::new(matches.value_of("SOURCE").unwrap_or("."));
    let mut config = Config::from_directory(source)?;
    if let Some(destination) = matches.value_of("DESTINATION") {
        config.destination = PathBuf::from(destination);
    }
    if matches.is_present("lsi") {
        config.lsi = true;
    }

    // No similarity engine ships with the binary; library users can pass one.
    build_site(source, &config, None)?;
    Ok(())
}
