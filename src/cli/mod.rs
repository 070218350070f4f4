use std::{
    env, fs,
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::config::{CONFIG_FILE_NAME, Config, default_config_json, load_config, load_config_or_default};
use crate::core::collector::{CollectOptions, Collector};
use crate::core::remote::SyncClient;
use crate::core::store::{StoreWriter, WriteMode};

mod args;
mod report;

pub use args::{
    Arguments, CollectCommand, Command, CommonArgs, DiffCommand, HealthCommand, PullCommand,
    PushCommand,
};

/// Run the CLI and return the process exit code.
pub fn run_cli(args: Arguments) -> Result<u8> {
    let Some(command) = args.with_command_or_help() else {
        return Ok(0);
    };

    match command {
        Command::Init => init(),
        Command::Collect(cmd) => collect(cmd),
        Command::Diff(cmd) => diff(cmd),
        Command::Push(cmd) => push(cmd),
        Command::Pull(cmd) => pull(cmd),
        Command::Health(cmd) => health(cmd),
    }
}

fn init() -> Result<u8> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("{} already exists", CONFIG_FILE_NAME);
    }
    fs::write(config_path, default_config_json()?)?;
    println!("{} {}", "created:".bold().green(), CONFIG_FILE_NAME);
    Ok(0)
}

fn collect(cmd: CollectCommand) -> Result<u8> {
    let config = resolve_config(&cmd.common)?;
    let collector = Collector::new(&config)?;
    let options = CollectOptions {
        paths: (!cmd.paths.is_empty()).then(|| cmd.paths.clone()),
        modules: (!cmd.modules.is_empty()).then(|| cmd.modules.clone()),
    };
    let outcome = collector.collect(&options);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&outcome.records)?);
    } else {
        report::print_collect_stats(&outcome.stats, cmd.common.verbose);
    }
    Ok(0)
}

fn diff(cmd: DiffCommand) -> Result<u8> {
    let config = resolve_config(&cmd.common)?;
    let collector = Collector::new(&config)?;
    let outcome = collector.collect(&CollectOptions::default());
    let existing =
        collector.scan_existing_translations(std::slice::from_ref(&config.default_language));
    let diff = collector.analyze_differences(&outcome.records, &existing);

    report::print_collect_stats(&outcome.stats, cmd.common.verbose);
    report::print_diff(&diff);
    Ok(0)
}

fn push(cmd: PushCommand) -> Result<u8> {
    let config = resolve_config(&cmd.common)?;
    let client = remote_client(&config, &cmd.common)?;
    let collector = Collector::new(&config)?;

    if cmd.init {
        // First-time integration: bulk-push resolved values per language.
        let mut failed = false;
        for language in &config.languages {
            let records = collector.scan_existing_translations(std::slice::from_ref(language));
            if records.is_empty() {
                continue;
            }
            match client.init_translations(&records, language) {
                Ok(_) => println!(
                    "{} {}: {} record(s)",
                    "initialized:".bold().green(),
                    language,
                    records.len()
                ),
                Err(err) => {
                    failed = true;
                    eprintln!("{} {}: {}", "error:".bold().red(), language, err);
                }
            }
        }
        return Ok(u8::from(failed));
    }

    let outcome = collector.collect(&CollectOptions::default());
    let existing =
        collector.scan_existing_translations(std::slice::from_ref(&config.default_language));
    let diff = collector.analyze_differences(&outcome.records, &existing);
    report::print_collect_stats(&outcome.stats, cmd.common.verbose);

    if diff.new.is_empty() {
        println!("Nothing new to push.");
        return Ok(0);
    }
    let batch_size = cmd.batch_size.unwrap_or(config.remote.batch_size);
    let outcomes = client.batch_upload(&diff.new, &config.languages, batch_size);
    report::print_batch_outcomes(&outcomes);

    // Partial failure is expected and reported inline; only a fully failed
    // upload signals failure to the shell.
    let all_failed = !outcomes.is_empty() && outcomes.iter().all(|o| !o.success);
    Ok(u8::from(all_failed))
}

fn pull(cmd: PullCommand) -> Result<u8> {
    let config = resolve_config(&cmd.common)?;
    let client = remote_client(&config, &cmd.common)?;
    let collector = Collector::new(&config)?;

    let mode = if cmd.dry_run {
        WriteMode::Preview
    } else if cmd.overwrite {
        WriteMode::Overwrite
    } else {
        WriteMode::Merge
    };
    let languages = if cmd.languages.is_empty() {
        config.languages.clone()
    } else {
        cmd.languages.clone()
    };

    let writer = StoreWriter::new(&config.store_root)
        .with_force(cmd.force)
        .with_confirm(Box::new(stdin_confirm));
    let reports = collector.pull_languages(&client, &writer, &languages, mode);
    report::print_pull_reports(&reports);

    let all_failed = !reports.is_empty() && reports.iter().all(|r| !r.errors.is_empty());
    Ok(u8::from(all_failed))
}

fn health(cmd: HealthCommand) -> Result<u8> {
    let config = resolve_config(&cmd.common)?;
    let client = remote_client(&config, &cmd.common)?;
    if client.check_connection() {
        println!("{} remote service reachable", "ok:".bold().green());
        Ok(0)
    } else {
        println!("{} remote service unreachable", "error:".bold().red());
        Ok(1)
    }
}

fn resolve_config(common: &CommonArgs) -> Result<Config> {
    let mut config = match &common.config {
        Some(path) => load_config(path)?,
        None => {
            let cwd = env::current_dir().context("Failed to determine working directory")?;
            load_config_or_default(&cwd)?
        }
    };
    if let Some(api_url) = &common.api_url {
        config.remote.api_url = api_url.clone();
    }
    Ok(config)
}

fn remote_client(config: &Config, common: &CommonArgs) -> Result<SyncClient> {
    if config.remote.api_url.is_empty() {
        bail!("Remote API URL is not configured (set remote.apiUrl or --api-url)");
    }
    let Some(token) = &common.token else {
        bail!("API token required (use --token or LOCSYNC_API_TOKEN)");
    };
    Ok(SyncClient::new(&config.remote, token.clone()))
}

fn stdin_confirm(path: &Path) -> bool {
    eprint!("Overwrite {}? [y/N] ", path.display());
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}
