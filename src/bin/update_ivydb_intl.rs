use std::{error::Error, path::Path};

use clap::{Parser, Subcommand};
use ivydb_obtain::{Ensured, Retriever, RetrieverConfig};
use jiff::{civil::Date, Zoned};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Without a command, download yesterday's archive and never fail
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Download the archive for the day
    Fetch {
        /// Day, e.g. 2015-09-14
        #[arg(short, long)]
        date: Date,
    },
    /// Unzip an already downloaded archive
    Extract {
        #[arg(short, long)]
        date: Date,
    },
    /// Delete the unzipped files for the day
    Purge {
        #[arg(short, long)]
        date: Date,
    },
    /// Download the archive unless it is already there
    Ensure {
        #[arg(short, long)]
        date: Date,
    },
}

/// Run this job every day at 7:00AM
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    let env_file = format!(".env/{}.env", args.env);
    if let Err(e) = dotenvy::from_path(Path::new(&env_file)) {
        warn!("could not load {}: {}", env_file, e);
    }

    let config = RetrieverConfig::from_env();
    let Some(command) = args.command else {
        let today = Zoned::now().date();
        match config.and_then(|c| Retriever::from_config(c).fetch_previous_day(today)) {
            Ok(path) => info!("downloaded {}", path.display()),
            Err(e) => warn!("nothing downloaded for the day before {}: {}", today, e),
        }
        return Ok(());
    };

    let retriever = Retriever::from_config(config?);
    match command {
        Cmd::Fetch { date } => {
            retriever.fetch_date(date)?;
        }
        Cmd::Extract { date } => retriever.extract(date)?,
        Cmd::Purge { date } => {
            let n = retriever.purge(date)?;
            info!("removed {} files for {}", n, date);
        }
        Cmd::Ensure { date } => match retriever.ensure(date)? {
            Ensured::AlreadyPresent(path) => info!("{} already there", path.display()),
            Ensured::Fetched(path) => info!("downloaded {}", path.display()),
        },
    }

    Ok(())
}
