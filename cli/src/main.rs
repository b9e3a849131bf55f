use colored::*;
use gumdrop::Options;
use log::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

mod discover;
mod keys;
mod prompt;
mod transport;

use cuddleberry_model::config::{Settings, SETTINGS_FILE};
use cuddleberry_model::*;
use crate::keys::GithubKeys;
use crate::prompt::{Prompt, ProfileArgs};
use crate::transport::ssh::Ssh;

fn main() {
    let opts = MyOptions::parse_args_default_or_exit();
    init_logging(opts.verbose);

    let command = match opts.command {
        Some(command) => command,
        None => {
            println!("Must specify a subcommand!");
            std::process::exit(1);
        }
    };

    let settings_path = opts
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));

    let result = Settings::load(&settings_path).and_then(|settings| match command {
        Command::Help(opts) => handle_help(opts),
        Command::Setup(opts) => handle_setup(opts, &settings),
        Command::Check(opts) => handle_check(opts, &settings),
        Command::List(_) => handle_list(),
        Command::Next(opts) => handle_next(opts, &settings),
    });

    if let Err(err) = result {
        eprintln!("{}", format!("{}", err).red());
        std::process::exit(1);
    }
}

/**
 * RUST_LOG wins, otherwise progress is shown at info and everything sent to
 * the device at debug when asked to be verbose
 */
fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();

    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) if verbose => {
            builder.filter_level(LevelFilter::Debug);
        }
        Err(_) => {
            builder.filter_level(LevelFilter::Info);
        }
    }
    builder.init();
}

fn handle_help(opts: HelpOpts) -> Result<()> {
    match opts.free.first() {
        Some(name) => match MyOptions::command_usage(name) {
            Some(usage) => println!("{}", usage),
            None => return Err(Error::Config(format!("no such command: {}", name))),
        },
        None => {
            println!("Usage: cuddleberry [OPTIONS] COMMAND [ARGS]\n");
            println!("{}", MyOptions::usage());
            if let Some(commands) = MyOptions::command_list() {
                println!("\nAvailable commands:\n{}", commands);
            }
        }
    }
    Ok(())
}

/**
 * Look for the device the way it announces itself out of the box
 */
fn discover_device(settings: &Settings) -> std::net::Ipv4Addr {
    discover::discover(
        &settings.device.mdns_name,
        settings.device.port,
        Duration::from_secs(1),
    )
}

/**
 * This function provisions a single device from start to finish.
 *
 * Every task which is already complete on the device is skipped, so an
 * interrupted run can simply be started again.
 */
fn handle_setup(opts: SetupOpts, settings: &Settings) -> Result<()> {
    println!("\nLet's cuddle some Pis! π");

    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());

    let keys_path = opts
        .keys
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.keys.file.clone());
    let source = GithubKeys::new(&settings.keys.url)?;
    let batch = opts.batch;
    let user = opts.user;

    keys::ensure_authorized_keys(&keys_path, &source, || match user {
        Some(user) => Ok(user),
        None if batch => Err(Error::Keys(format!(
            "{} does not exist and no --user was given",
            keys_path.display()
        ))),
        None => prompt.ask("Enter your GitHub username to pull public keys", None),
    })?;

    // Resolve the selection before any questions, a typo should not cost a
    // round of prompts
    let tasks = task::select(&opts.only)?;

    let args = ProfileArgs {
        target: opts.target,
        prefix: opts.prefix,
        suffix: opts.suffix,
        nfs: opts.nfs,
        batch,
    };
    let profile = prompt::collect_profile(&mut prompt, settings, args, || {
        discover_device(settings)
    })?;

    let connector = Ssh::new(profile.address, &settings.device);
    let driver = Driver::new(
        &connector,
        settings.device.clone(),
        settings.artifact_dir.clone(),
        keys_path,
        tasks,
    );
    let report = driver.provision(profile)?;

    println!(
        "{}",
        format!(
            "\n{} ({}) provisioned, {} task(s) applied",
            report.config.hostname,
            report.config.address,
            report.applied()
        )
        .green()
    );
    for (name, outcome) in report.outcomes.iter() {
        match outcome {
            Outcome::Applied => println!("  {} {}", "applied".green(), name),
            Outcome::Skipped => println!("  {} {}", "skipped".yellow(), name),
        }
    }

    if opts.record {
        hostname::record(&settings.artifact_dir, &report.config)?;
    }
    Ok(())
}

/**
 * Report which tasks the device still needs without changing anything
 */
fn handle_check(opts: CheckOpts, settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());

    let args = ProfileArgs {
        target: opts.target,
        prefix: opts.prefix,
        suffix: Some(settings.defaults.password_suffix.clone()),
        nfs: opts.nfs,
        batch: opts.batch,
    };
    let profile = prompt::collect_profile(&mut prompt, settings, args, || {
        discover_device(settings)
    })?;

    let connector = Ssh::new(profile.address, &settings.device);
    let driver = Driver::new(
        &connector,
        settings.device.clone(),
        settings.artifact_dir.clone(),
        settings.keys.file.clone(),
        task::catalog(),
    );
    let (config, statuses) = driver.inspect(profile)?;

    println!("\n{} would become {}", config.address, config.hostname);
    for (name, status) in statuses.iter() {
        match status {
            Status::Complete => println!("  {} {}", "complete".green(), name),
            Status::Pending => println!("  {} {}", "pending".yellow(), name),
        }
    }
    Ok(())
}

fn handle_list() -> Result<()> {
    for (index, task) in task::catalog().iter().enumerate() {
        println!("{:>2}. {}", index + 1, task.name());
    }
    Ok(())
}

fn handle_next(opts: NextOpts, settings: &Settings) -> Result<()> {
    let prefix = opts
        .prefix
        .unwrap_or_else(|| settings.defaults.hostname_prefix.clone());
    println!("{}", hostname::generate(&settings.artifact_dir, &prefix)?);
    Ok(())
}

#[derive(Debug, Options)]
struct MyOptions {
    // Options here can be accepted with any command (or none at all),
    // but they must come before the command name.
    #[options(help = "print help message")]
    help: bool,
    #[options(help = "be verbose")]
    verbose: bool,
    #[options(help = "settings file (default: cuddleberry.yml)", meta = "PATH")]
    config: Option<String>,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "show help for a command")]
    Help(HelpOpts),
    #[options(help = "Provision a freshly imaged device")]
    Setup(SetupOpts),
    #[options(help = "Report which tasks a device still needs")]
    Check(CheckOpts),
    #[options(help = "List the tasks in the order they are applied")]
    List(ListOpts),
    #[options(help = "Print the hostname the next device would get")]
    Next(NextOpts),
}

#[derive(Debug, Options)]
struct HelpOpts {
    #[options(free)]
    free: Vec<String>,
}

#[derive(Debug, Options)]
struct SetupOpts {
    #[options(help = "print help message")]
    help: bool,
    #[options(help = "address of the device, skips discovery", meta = "IP")]
    target: Option<String>,
    #[options(help = "hostname prefix, the first host will be <prefix>0")]
    prefix: Option<String>,
    #[options(help = "password suffix, passwords will be <hostname><suffix>")]
    suffix: Option<String>,
    #[options(help = "share a data directory over NFS")]
    nfs: bool,
    #[options(help = "file holding the public keys to install", meta = "PATH")]
    keys: Option<String>,
    #[options(help = "GitHub user to pull public keys from if the keys file is missing")]
    user: Option<String>,
    #[options(help = "only run the named task, may be repeated", meta = "TASK")]
    only: Vec<String>,
    #[options(help = "record the device so the next run picks the following hostname")]
    record: bool,
    #[options(help = "never prompt, use flags and settings")]
    batch: bool,
}

#[derive(Debug, Options)]
struct CheckOpts {
    #[options(help = "print help message")]
    help: bool,
    #[options(help = "address of the device, skips discovery", meta = "IP")]
    target: Option<String>,
    #[options(help = "hostname prefix")]
    prefix: Option<String>,
    #[options(help = "check the NFS tasks too")]
    nfs: bool,
    #[options(help = "never prompt, use flags and settings")]
    batch: bool,
}

#[derive(Debug, Options)]
struct ListOpts {
    #[options(help = "print help message")]
    help: bool,
}

#[derive(Debug, Options)]
struct NextOpts {
    #[options(help = "print help message")]
    help: bool,
    #[options(help = "hostname prefix")]
    prefix: Option<String>,
}
