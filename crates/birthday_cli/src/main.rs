//! Command-line entry point.
//!
//! # Responsibility
//! - Smoke-check `birthday_core` linkage without the Flutter runtime.
//! - Run the daily check from cron and manage the list from a terminal.

use birthday_core::config::DB_PATH_ENV;
use birthday_core::db::open_db;
use birthday_core::{
    export_json, import_json, init_logging_from_config, list_view, scroll_target,
    BirthdayDraft, BirthdayRepository, BirthdayService, Clock, CoreConfig, DailyCheckService,
    LogNotifier, NotifyChannel, OutboxNotifier, SortOrder, SqliteBirthdayRepository, SystemClock,
    UNPARSEABLE_DISTANCE,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

/// Birthday notifier: keeps a list of birthdays and greets on the day.
#[derive(Parser)]
#[command(name = "birthday")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file; overrides the configuration.
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print ping and core version.
    Ping,

    /// List birthdays with today/soon badges.
    List {
        #[arg(long, value_enum, default_value_t = SortArg::DateAsc)]
        sort: SortArg,

        /// Case-insensitive name filter.
        #[arg(long, default_value = "")]
        filter: String,

        /// Reference date as YYYY-MM-DD (default: local date).
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Append a birthday.
    Add {
        name: String,
        /// Day and month as dd-mm or dd/mm.
        date: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Custom greeting; the default greeting is used when empty.
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Replace the birthday at a list position.
    Edit {
        index: usize,
        name: String,
        date: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Delete the birthday at a list position.
    Delete { index: usize },

    /// Greet everyone whose birthday is today.
    Check {
        /// Reference date as YYYY-MM-DD (default: local date).
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Write the list as a JSON document to stdout.
    Export,

    /// Replace the list with a JSON document.
    Import { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    DateAsc,
    DateDesc,
    NameAsc,
    NameDesc,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::DateAsc => Self::DateAsc,
            SortArg::DateDesc => Self::DateDesc,
            SortArg::NameAsc => Self::NameAsc,
            SortArg::NameDesc => Self::NameDesc,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load_from_file(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }
    init_logging_from_config(&config)?;

    if let Commands::Ping = cli.command {
        println!("birthday_core ping={}", birthday_core::ping());
        println!("birthday_core version={}", birthday_core::core_version());
        return Ok(());
    }

    let conn = open_db(config.resolve_db_path()).map_err(|err| err.to_string())?;
    let repo = SqliteBirthdayRepository::try_new(&conn).map_err(|err| err.to_string())?;

    match cli.command {
        Commands::Ping => Ok(()),
        Commands::List {
            sort,
            filter,
            today,
        } => {
            let today = today.unwrap_or_else(|| SystemClock.today());
            let records = repo.load_all().map_err(|err| err.to_string())?;
            let items = list_view(&records, today, sort.into(), &filter);
            let target = scroll_target(&items);
            for (position, item) in items.iter().enumerate() {
                let badge = if item.flags.is_today {
                    "today"
                } else if item.flags.is_soon {
                    "soon"
                } else {
                    ""
                };
                let days = if item.flags.days_until == UNPARSEABLE_DISTANCE {
                    "?".to_string()
                } else {
                    item.flags.days_until.to_string()
                };
                let marker = if target == Some(position) { '>' } else { ' ' };
                println!(
                    "{marker} [{}] {:<24} {:<6} {:>4}d {badge}",
                    item.index, item.record.name, item.record.date, days
                );
            }
            Ok(())
        }
        Commands::Add {
            name,
            date,
            phone,
            message,
        } => {
            let draft = BirthdayDraft::new(name, date).phone(phone).message(message);
            let record = BirthdayService::new(repo)
                .create(draft)
                .map_err(|err| err.to_string())?;
            println!("added {}", record.id);
            Ok(())
        }
        Commands::Edit {
            index,
            name,
            date,
            phone,
            message,
        } => {
            let draft = BirthdayDraft::new(name, date).phone(phone).message(message);
            let record = BirthdayService::new(repo)
                .save_at(Some(index), draft)
                .map_err(|err| err.to_string())?;
            println!("saved {}", record.id);
            Ok(())
        }
        Commands::Delete { index } => {
            BirthdayService::new(repo)
                .delete_at(index)
                .map_err(|err| err.to_string())?;
            println!("deleted [{index}]");
            Ok(())
        }
        Commands::Check { today } => {
            let today = today.unwrap_or_else(|| SystemClock.today());
            let settings = config.notify.clone();
            match settings.channel {
                NotifyChannel::Log => {
                    let report = DailyCheckService::new(repo, LogNotifier, settings)
                        .run(today)
                        .map_err(|err| err.to_string())?;
                    println!(
                        "checked={} matched={} notified={} failed={}",
                        report.checked,
                        report.matched(),
                        report.notified,
                        report.failed
                    );
                }
                NotifyChannel::Whatsapp => {
                    let outbox = OutboxNotifier::new();
                    DailyCheckService::new(repo, &outbox, settings)
                        .run(today)
                        .map_err(|err| err.to_string())?;
                    for delivery in outbox.drain() {
                        println!("{}\t{}", delivery.recipient_name, delivery.link);
                    }
                }
            }
            Ok(())
        }
        Commands::Export => {
            let records = repo.load_all().map_err(|err| err.to_string())?;
            println!("{}", export_json(&records).map_err(|err| err.to_string())?);
            Ok(())
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|err| format!("failed to read `{}`: {err}", file.display()))?;
            let records = import_json(&text).map_err(|err| err.to_string())?;
            repo.replace_all(&records).map_err(|err| err.to_string())?;
            println!("imported {}", records.len());
            Ok(())
        }
    }
}
