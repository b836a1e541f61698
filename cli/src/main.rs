mod render;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use mykad::ap::JpnAp;
use mykad::pcsc::{self, Context};
use mykad::{card, nfc, Card};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const WAIT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Pcsc(#[from] pcsc::Error),

    #[error("Failed to select MyKad application (AID): {0}")]
    Select(#[source] card::Error),

    #[error(transparent)]
    Read(#[from] mykad::Error),

    #[error("Failed to write the output: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Exit code of the process, telling a missing reader, a missing card and a foreign card apart.
    fn exit_code(&self) -> u8 {
        fn transport(e: &nfc::Error) -> u8 {
            match e {
                nfc::Error::NoReader => 1,
                nfc::Error::NoCard => 2,
                nfc::Error::Transmit(_) => 4,
            }
        }

        match self {
            Self::Pcsc(pcsc::Error::ReaderNotFound | pcsc::Error::PcscError(_)) => 1,
            Self::Pcsc(pcsc::Error::CardNotFound | pcsc::Error::ConnectFailed(_)) => 2,
            Self::Select(card::Error::TransportUnavailable(e)) => transport(e),
            Self::Select(_) => 3,
            Self::Read(mykad::Error::Card(card::Error::TransportUnavailable(e))) => transport(e),
            Self::Read(_) | Self::Io(_) => 4,
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Parser)]
#[command(name = "mykad")]
#[command(about = "Read the personal record, address and photo stored on your MyKad card")]
#[command(version)]
struct Cli {
    /// Prints the record as JSON, with the photo embedded as a data URL
    #[arg(long)]
    json: bool,

    /// Uses the first reader whose name contains this text
    #[arg(short, long)]
    reader: Option<String>,

    /// Waits for a card to be inserted instead of failing
    #[arg(short, long)]
    wait: bool,

    /// Writes the photo as a JPEG file to the path
    #[arg(short, long)]
    photo: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = Context::try_new()?;
    let device = match &cli.reader {
        Some(name) => ctx.open_by_name(name).map_err(|e| {
            if let (pcsc::Error::ReaderNotFound, Ok(readers)) = (&e, ctx.readers()) {
                warn!("No reader matches {:?}; available: {:?}", name, readers);
            }

            e
        })?,
        None => ctx.open()?,
    };

    info!("Using reader: {}", device.name());

    let pcsc_card = match cli.wait {
        true => device.wait_for_card(&ctx, WAIT_INTERVAL)?,
        _ => device.connect(&ctx)?,
    };

    let card = Rc::new(Card::new(Box::new(pcsc_card)));
    let mut jpn_ap = JpnAp::open((), card).map_err(Error::Select)?;
    let profile = jpn_ap.read_mykad(())?;

    debug!("Read the record with a photo of {} octets", profile.photo_len());

    if let Some(path) = &cli.photo {
        fs::write(path, &profile.photo)?;
    }

    let mut stdout = io::stdout().lock();
    match cli.json {
        true => render::json(&mut stdout, &profile)?,
        _ => render::text(&mut stdout, &profile)?,
    }

    Ok(stdout.flush()?)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
