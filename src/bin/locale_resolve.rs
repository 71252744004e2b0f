//! locale_resolve - show which localized file a static asset request maps to
//!
//! Builds the same handler a server would register and runs one request
//! through it. Exit status: 0 found, 1 not found, 2 unsupported language,
//! 3 any other failure.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use rust_i18n::t;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use localized_static::i18n::init_locale;
use localized_static::{
    FileSystemLocation, HandlerConfig, ResolveError, ResourceHandler, StaticRequest,
};

rust_i18n::i18n!("locales", fallback = "en");

const EXIT_NOT_FOUND: u8 = 1;
const EXIT_UNSUPPORTED_LANGUAGE: u8 = 2;
const EXIT_FAILURE: u8 = 3;

fn build_cli() -> Command {
    Command::new("locale_resolve")
        .about(t!("help.locale_resolve.about").to_string())
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .arg(
            Arg::new("path")
                .help(t!("help.locale_resolve.path").to_string())
                .required(true)
                .index(1)
        )
        .arg(
            Arg::new("root")
                .long("root")
                .short('r')
                .help(t!("help.locale_resolve.root").to_string())
                .value_name("DIR")
                .action(ArgAction::Append)
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help(t!("help.locale_resolve.lang").to_string())
                .value_name("LANG")
                .action(ArgAction::Append)
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .help(t!("help.locale_resolve.query").to_string())
                .value_name("QUERY")
        )
        .arg(
            Arg::new("accept_language")
                .long("accept-language")
                .short('a')
                .help(t!("help.locale_resolve.accept_language").to_string())
                .value_name("HEADER")
        )
        .arg(
            Arg::new("fallback")
                .long("fallback")
                .short('f')
                .help(t!("help.locale_resolve.fallback").to_string())
                .value_name("LANG")
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help(t!("help.locale_resolve.config").to_string())
                .value_name("FILE")
        )
        .arg(
            Arg::new("cache")
                .long("cache")
                .help(t!("help.locale_resolve.cache").to_string())
                .action(ArgAction::SetTrue)
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file first, then command-line overrides.
fn load_config(matches: &ArgMatches) -> Result<HandlerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => HandlerConfig::load(&PathBuf::from(path))
            .context(t!("locale_resolve.failed_load_config").to_string())?,
        None => HandlerConfig::default(),
    };

    if let Some(roots) = matches.get_many::<String>("root") {
        config.locations = roots.cloned().collect();
    }
    if let Some(fallback) = matches.get_one::<String>("fallback") {
        config.fallback_language = fallback.clone();
    }
    if matches.get_flag("cache") {
        config.cache = true;
    }

    config.validate()?;
    Ok(config)
}

/// The request a browser would have sent.
fn build_request(matches: &ArgMatches, parameter: &str) -> StaticRequest {
    let mut request = matches
        .get_one::<String>("query")
        .map(|query| StaticRequest::from_query(query))
        .unwrap_or_default();

    if let Some(langs) = matches.get_many::<String>("lang") {
        for lang in langs {
            request = request.with_parameter(parameter, lang.clone());
        }
    }
    if let Some(header) = matches.get_one::<String>("accept_language") {
        request = request.with_header("Accept-Language", header.clone());
    }

    request
}

fn run(matches: &ArgMatches) -> Result<Option<PathBuf>> {
    let config = load_config(matches)?;

    let mut locations = Vec::with_capacity(config.locations.len());
    for root in &config.locations {
        let path = PathBuf::from(root);
        if !path.is_dir() {
            bail!("{}", t!("locale_resolve.root_not_directory", path = path.display().to_string()));
        }
        locations.push(FileSystemLocation::new(path));
    }

    let handler = ResourceHandler::localized(&config, locations);
    let request = build_request(matches, &config.language_parameter);
    // Validated by clap.
    let path = matches.get_one::<String>("path").map(String::as_str).unwrap_or("/");

    let resolved = handler.handle(&request, path)?;
    Ok(resolved.map(|location| location.path().to_path_buf()))
}

fn main() -> ExitCode {
    init_locale();
    init_tracing();

    let matches = build_cli().get_matches();
    let path = matches.get_one::<String>("path").cloned().unwrap_or_default();

    match run(&matches) {
        Ok(Some(resolved)) => {
            println!("{}", t!("locale_resolve.resolved", path = resolved.display().to_string()));
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}", t!("locale_resolve.not_found", path = path));
            ExitCode::from(EXIT_NOT_FOUND)
        }
        Err(err) => match err.downcast_ref::<ResolveError>() {
            Some(resolve_err) => {
                eprintln!("{}", resolve_err.localized_message());
                if resolve_err.is_client_error() {
                    ExitCode::from(EXIT_UNSUPPORTED_LANGUAGE)
                } else {
                    ExitCode::from(EXIT_FAILURE)
                }
            }
            None => {
                eprintln!("{:#}", err);
                ExitCode::from(EXIT_FAILURE)
            }
        },
    }
}
