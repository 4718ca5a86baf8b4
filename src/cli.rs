use clap::{crate_authors, crate_description, crate_version, Arg, ArgAction, Command};
use pretty_env_logger::env_logger::Builder;
use std::env;
use std::io::Write;
use std::process::exit;

use zonesync_rs::common::ProviderRegistry;
use zonesync_rs::service::CorrectionStatus;
use zonesync_rs::Config;

const ENV_PREFIX: &str = "ZONESYNC";

fn set_logger_level(b: &mut Builder) {
    let mut b = b;
    if env::var("RUST_LOG").is_err() {
        b = b.filter_level(log::LevelFilter::Info)
    }
    b.init();
}

fn setup_logger() {
    // Adapted from env_logger examples. <3 Systemd support
    match std::env::var("RUST_LOG_STYLE") {
        Ok(s) if s == "SYSTEMD" => {
            let builder = &mut pretty_env_logger::env_logger::builder();
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "<{}>{}: {}",
                    match record.level() {
                        log::Level::Error => 3,
                        log::Level::Warn => 4,
                        log::Level::Info => 6,
                        log::Level::Debug => 7,
                        log::Level::Trace => 7,
                    },
                    record.target(),
                    record.args()
                )
            });
            set_logger_level(builder);
        }
        _ => {
            let builder = &mut pretty_env_logger::formatted_builder();
            set_logger_level(builder);
        }
    };
}

fn load_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

pub(crate) fn main() {
    let cli = Command::new("ZoneSync")
        .about(format!(
            "{}\n{} {}",
            crate_description!(),
            "Configuration is managed using ZONESYNC_* environment variables.",
            "Nested settings are separated by a double underscore.",
        ))
        .arg(
            Arg::new("check")
                .action(ArgAction::SetTrue)
                .short('t')
                .long("test")
                .help("Check the configuration"),
        )
        .arg(
            Arg::new("dry-run")
                .action(ArgAction::SetTrue)
                .long("dry-run")
                .help("Show corrections without applying them"),
        )
        .arg(
            Arg::new("provider")
                .action(ArgAction::Set)
                .long("provider")
                .help("Provider to converge, overriding ZONESYNC_PROVIDER"),
        )
        .version(crate_version!())
        .author(crate_authors!("\n"));

    let args = cli.get_matches();

    setup_logger();

    let mut config = match load_config() {
        Ok(c) => c,
        Err(err) => {
            println!("{err}");
            exit(2);
        }
    };
    if let Some(provider) = args.get_one::<String>("provider") {
        config.provider = provider.clone();
    }

    let registry = ProviderRegistry::with_builtin();
    let mut service = match config.get_service(&registry) {
        Ok(s) => s,
        Err(err) => {
            println!("{err}");
            exit(2);
        }
    };

    if args.get_flag("check") {
        tracing::info!(providers = registry.names().join(","), "Configuration is valid.");
        exit(0);
    }

    let reports = match service.sync(args.get_flag("dry-run")) {
        Ok(reports) => reports,
        Err(err) => {
            tracing::error!("{err}");
            exit(1);
        }
    };

    let mut success = true;
    for report in &reports {
        if let Ok(changes) = &report.outcome {
            for rejected in &changes.rejected {
                tracing::warn!(zone = report.zone, "Skipped record: {rejected}");
            }
            let applied = changes
                .corrections
                .iter()
                .filter(|c| matches!(c.status, CorrectionStatus::Applied))
                .count();
            tracing::info!(
                zone = report.zone,
                pass_id = report.pass_id.to_string(),
                nameservers = changes.nameservers.join(","),
                unchanged = changes.unchanged,
                corrections = changes.corrections.len(),
                applied = applied,
                "Zone completed",
            );
        }
        success &= report.is_success();
    }

    if !success {
        exit(1);
    }
}
