use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use wrapgen_codegen::{GenConfig, Generator, Verbatim};
use wrapgen_reflect::Universe;

fn cli() -> Command {
    Command::new("wrapgen")
        .about("Generate origami wrapper packages for Go types and functions")
        .arg(
            Arg::new("universe")
                .help("JSON description of the Go types and functions to wrap")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Generator config, TOML or JSON by extension"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory wrapper packages are written under"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .help("Namespace prefix of generated class and function names"),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .help("Stop discovering classes past this depth, 0 for no limit")
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("blacklist")
                .long("blacklist")
                .help("Package whose types are passed around as opaque values")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .help("Function or type to generate, as pkgpath.Name; defaults to the roots listed in the universe")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("no-format")
                .long("no-format")
                .help("Write generated files without running gofmt")
                .action(ArgAction::SetTrue),
        )
}

/// The config file, if any, with command line overrides applied.
fn load_config(matches: &ArgMatches) -> Result<GenConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => GenConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config: {path}"))?,
        None => GenConfig::default(),
    };
    if let Some(output) = matches.get_one::<String>("output") {
        config.output_root = PathBuf::from(output);
    }
    if let Some(prefix) = matches.get_one::<String>("prefix") {
        config.name_prefix = Some(prefix.clone());
    }
    if let Some(depth) = matches.get_one::<i64>("max-depth") {
        config.max_depth = *depth;
    }
    if let Some(packages) = matches.get_many::<String>("blacklist") {
        config.blacklist.packages.extend(packages.cloned());
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<ExitCode> {
    let path = matches
        .get_one::<String>("universe")
        .context("universe is required")?;
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read universe: {path}"))?;
    let universe = Universe::from_json(&json).with_context(|| format!("Failed to parse universe: {path}"))?;
    let config = load_config(matches)?;

    let roots: Vec<String> = match matches.get_many::<String>("root") {
        Some(roots) => roots.cloned().collect(),
        None => universe.roots().to_vec(),
    };
    if roots.is_empty() {
        bail!("No roots to generate: pass --root or list roots in {path}");
    }

    let mut generator = Generator::new(&universe, config);
    if matches.get_flag("no-format") {
        generator = generator.with_formatter(Arc::new(Verbatim));
    }

    let mut first_error = None;
    for name in &roots {
        let result = universe
            .resolve_root(name)
            .map_err(anyhow::Error::from)
            .and_then(|root| generator.generate(&root).map_err(anyhow::Error::from))
            .with_context(|| format!("Failed to generate {name}"));
        if let Err(err) = result {
            log::error!("{err:#}");
            first_error.get_or_insert(err);
        }
    }

    let registry = generator.session().registry();
    for (package, entry) in &registry {
        log::info!(
            "{package}: {} classes, {} functions",
            entry.classes.len(),
            entry.functions.len()
        );
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(&cli().get_matches())
}
