use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use pokecard::card::{is_slider_value, HP_MAX, HP_MIN, HP_STEP};
use pokecard::ingest::{accepts_extension, ACCEPTED_EXTENSIONS};
use pokecard::platform::{DirectorySink, LogNotifier};
use pokecard::{CardDescription, MoveField, MoveSlot, Studio, StudioConfig, UploadedFile};

#[derive(Parser)]
#[command(name = "pokecard", version, about = "Build trading cards and export them as PNG")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply edits and export the card as `<name>.png`
    Export {
        #[command(flatten)]
        edits: Edits,

        /// Directory to save into
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Capture multiplier
        #[arg(long, default_value_t = 2)]
        scale: u32,

        /// Largest accepted upload in bytes
        #[arg(long)]
        max_upload_bytes: Option<u64>,
    },
    /// Apply edits and print the resulting card and its preview outline
    Show {
        #[command(flatten)]
        edits: Edits,
    },
}

#[derive(Args)]
struct Edits {
    /// Start from a card saved as JSON
    #[arg(long)]
    card: Option<PathBuf>,

    #[arg(long)]
    name: Option<String>,

    /// Artwork file (jpeg, png, webp or gif)
    #[arg(long)]
    image: Option<PathBuf>,

    #[arg(long)]
    hp: Option<i32>,

    #[arg(long = "type")]
    element_type: Option<String>,

    #[arg(long)]
    move_one_name: Option<String>,
    #[arg(long)]
    move_one_damage: Option<String>,
    #[arg(long)]
    move_one_description: Option<String>,

    #[arg(long)]
    move_two_name: Option<String>,
    #[arg(long)]
    move_two_damage: Option<String>,
    #[arg(long)]
    move_two_description: Option<String>,

    /// Randomize type, hit points and damage after the other edits
    #[arg(long)]
    randomize: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

async fn load_card(path: &PathBuf) -> anyhow::Result<CardDescription> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

async fn build_studio(edits: &Edits, config: StudioConfig, out: PathBuf) -> anyhow::Result<Studio> {
    let card = match &edits.card {
        Some(path) => load_card(path).await?,
        None => CardDescription::default(),
    };
    let mut studio = Studio::with_card(
        config,
        card,
        Arc::new(DirectorySink::new(out)),
        Arc::new(LogNotifier),
    )?;

    if let Some(name) = &edits.name {
        studio.store_mut().set_name(name.as_str());
    }
    if let Some(hp) = edits.hp {
        if !is_slider_value(hp) {
            bail!("--hp must be a multiple of {} between {} and {}", HP_STEP, HP_MIN, HP_MAX);
        }
        studio.store_mut().set_hit_points(hp);
    }
    if let Some(t) = &edits.element_type {
        studio.store_mut().set_element_type(t.as_str());
    }

    let move_edits = [
        (MoveSlot::One, MoveField::Name, &edits.move_one_name),
        (MoveSlot::One, MoveField::Damage, &edits.move_one_damage),
        (MoveSlot::One, MoveField::Description, &edits.move_one_description),
        (MoveSlot::Two, MoveField::Name, &edits.move_two_name),
        (MoveSlot::Two, MoveField::Damage, &edits.move_two_damage),
        (MoveSlot::Two, MoveField::Description, &edits.move_two_description),
    ];
    for (slot, field, value) in move_edits {
        if let Some(v) = value {
            studio.store_mut().set_move_field(slot, field, v.as_str());
        }
    }

    if let Some(path) = &edits.image {
        if !accepts_extension(path) {
            bail!(
                "{}: expected one of .{}",
                path.display(),
                ACCEPTED_EXTENSIONS.join(", .")
            );
        }
        let file = UploadedFile::from_path(path).await?;
        studio.upload(&file).await?;
    }
    if edits.randomize {
        studio.randomize();
    }
    Ok(studio)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command).await {
        // Problems the user can fix by changing the input exit with 2.
        let code = match e.downcast_ref::<pokecard::Error>() {
            Some(err) if err.is_user_recoverable() => 2,
            _ => 1,
        };
        eprintln!("pokecard: {:#}", e);
        std::process::exit(code);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Export {
            edits,
            out,
            scale,
            max_upload_bytes,
        } => {
            let mut config = StudioConfig {
                supersample: scale,
                ..Default::default()
            };
            if let Some(limit) = max_upload_bytes {
                config.max_upload_bytes = limit;
            }
            let studio = build_studio(&edits, config, out).await?;
            let exported = studio.download().await?;
            println!("{}", exported.location);
            println!(
                "{}x{} sha256:{}",
                exported.width,
                exported.height,
                exported.sha256_hex()
            );
        }
        Command::Show { edits } => {
            let studio = build_studio(&edits, StudioConfig::default(), PathBuf::from(".")).await?;
            println!("{}", serde_json::to_string_pretty(&*studio.card())?);
            if let Some(tree) = studio.preview() {
                print!("{}", tree.outline());
            }
        }
    }
    Ok(())
}
