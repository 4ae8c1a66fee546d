//! Cardsmith CLI
//!
//! Thin wrapper around cardsmith-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Start a new card document
//! cardsmith new --name "Ali Hassan" --out card.json
//!
//! # Apply edits to a document
//! cardsmith edit card.json --set tagline="Product Designer" --add-phone 0551234567
//!
//! # Render the static markup of a card
//! cardsmith render card.json --face back --settle
//!
//! # Export the contact card
//! cardsmith vcard card.json
//!
//! # Store a card and print its shareable link
//! cardsmith save card.json
//!
//! # Look up stored cards
//! cardsmith list
//! cardsmith show <id>
//! cardsmith view "/card.html?id=<id>"
//!
//! # Inspect the crash-recovery snapshot
//! cardsmith recover
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cardsmith_core::share::{build_link, parse_link};
use cardsmith_core::{
    render::settle, CardEditor, CardId, CardState, CardStore, Direction, EditorConfig, Face,
    ImageSlot, InlineUploader, ItemKey, ItemKind, LocalFileProbe, QrSource, RecoveryFile,
    StaticMarkup, Storage, Target,
};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cardsmith - two-sided business card editor
#[derive(Parser)]
#[command(name = "cardsmith")]
#[command(version = "0.1.0")]
#[command(about = "Cardsmith - two-sided business card editor")]
#[command(
    long_about = "Edit, render and share two-sided business cards. Documents are plain JSON; stored cards get a shareable viewer link."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Data directory (default: ~/.cardsmith/data)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Editor configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print or write an empty card document
    New {
        /// Initial name on the card
        #[arg(long)]
        name: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Apply edits to a card document as one undoable step
    Edit {
        /// Card document (JSON)
        file: PathBuf,

        /// Set a text input (KEY=VALUE)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        inputs: Vec<String>,

        /// Add a phone number
        #[arg(long = "add-phone", value_name = "NUMBER")]
        phones: Vec<String>,

        /// Add a social link (PLATFORM=VALUE)
        #[arg(long = "add-social", value_name = "PLATFORM=VALUE")]
        socials: Vec<String>,

        /// Move an item to a face (ITEM=front|back)
        #[arg(long = "place", value_name = "ITEM=FACE")]
        placements: Vec<String>,

        /// Shift an item (ITEM=DIRECTION[:STEP])
        #[arg(long = "move", value_name = "ITEM=DIRECTION[:STEP]")]
        moves: Vec<String>,

        /// QR source (custom, upload, auto-contact, auto-link) with an optional address
        #[arg(long, value_name = "SOURCE[=ADDRESS]")]
        qr: Option<String>,

        /// Embed a local image file into a slot (SLOT=PATH)
        #[arg(long = "image", value_name = "SLOT=PATH")]
        images: Vec<String>,

        /// Write to this file instead of overwriting the input
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render the static markup of a card
    Render {
        /// Card document (JSON)
        file: PathBuf,

        /// Which face to render
        #[arg(long, value_enum, default_value_t = FaceArg::Both)]
        face: FaceArg,

        /// Check every image and replace broken ones with placeholders
        #[arg(long)]
        settle: bool,
    },

    /// Print the contact card (vCard 3.0) of a card
    Vcard {
        /// Card document (JSON)
        file: PathBuf,
    },

    /// Store a card and print its id and shareable link
    Save {
        /// Card document (JSON)
        file: PathBuf,
    },

    /// List stored cards
    List,

    /// Print a stored card document
    Show {
        /// Card ID
        id: String,
    },

    /// Print the shareable link of a stored card
    Link {
        /// Card ID
        id: String,
    },

    /// Render the stored card a shareable link points to
    View {
        /// Shareable link (`/card.html?id=...`)
        link: String,
    },

    /// Delete a stored card
    Delete {
        /// Card ID
        id: String,
    },

    /// Print the crash-recovery snapshot, if any
    Recover {
        /// Remove the snapshot after printing it
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FaceArg {
    Front,
    Back,
    Both,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default data directory (~/.cardsmith/data)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cardsmith")
        .join("data")
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn read_state(path: &Path) -> Result<CardState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    CardState::from_json(&json).with_context(|| format!("Invalid card document {}", path.display()))
}

fn write_state(state: &CardState, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn open_storage(data_dir: &Path) -> Result<Storage> {
    Storage::new(data_dir.join("cards.redb")).context("Failed to open card storage")
}

/// Parse a card ID (base58)
fn parse_card_id(s: &str) -> Result<CardId> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        anyhow::bail!("Invalid card ID '{}'", s);
    }
    Ok(CardId(s.to_string()))
}

/// Split `KEY=VALUE`
fn split_pair(s: &str) -> Result<(&str, &str)> {
    s.split_once('=')
        .map(|(k, v)| (k.trim(), v))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", s))
}

fn parse_item_key(s: &str) -> Result<ItemKey> {
    s.parse().map_err(|e| anyhow::anyhow!("Invalid item '{}': {}", s, e))
}

/// Parse `DIRECTION[:STEP]`
fn parse_move(s: &str) -> Result<(Direction, Option<i32>)> {
    let (direction, step) = match s.split_once(':') {
        Some((d, step)) => {
            let step = step
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid step '{}'", step))?;
            (d, Some(step))
        }
        None => (s, None),
    };
    Ok((direction.parse()?, step))
}

fn fetch_card(storage: &Storage, id: &CardId) -> Result<CardState> {
    storage
        .fetch(id)?
        .ok_or_else(|| anyhow::anyhow!("Card not found: {}", id))
}

/// Cancel `token` on Ctrl-C
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let config = load_config(cli.config.as_deref())?;
    debug!(?data_dir, ?config, "Starting");

    match cli.command {
        Commands::New { name, out } => {
            let mut state = CardState::default();
            if let Some(name) = name {
                state.set_input("name", name);
            }
            write_state(&state, out.as_deref())?;
        }

        Commands::Edit {
            file,
            inputs,
            phones,
            socials,
            placements,
            moves,
            qr,
            images,
            out,
        } => {
            let mut editor = CardEditor::from_config(config)
                .with_recovery(RecoveryFile::in_dir(&data_dir));
            editor.load(read_state(&file)?);

            for pair in &inputs {
                let (key, value) = split_pair(pair)?;
                editor.set_input(key, value);
            }
            for phone in &phones {
                let key = editor.add_item(ItemKind::Phone, Some(phone.as_str()));
                println!("Added {}", key);
            }
            for pair in &socials {
                let (platform, value) = split_pair(pair)?;
                let key = editor.add_item(ItemKind::Social(platform.to_string()), Some(value));
                println!("Added {}", key);
            }
            for pair in &placements {
                let (item, face) = split_pair(pair)?;
                let face: Face = face.parse()?;
                editor.set_placement(&parse_item_key(item)?, face)?;
            }
            for pair in &moves {
                let (item, spec) = split_pair(pair)?;
                let key = parse_item_key(item)?;
                let position = match parse_move(spec)? {
                    (direction, Some(step)) => editor.move_item(&key, direction, step)?,
                    (direction, None) => editor.nudge(&key, direction)?,
                };
                println!("{} at ({}, {})", key, position.x, position.y);
            }
            if let Some(qr) = &qr {
                let (source, address) = match qr.split_once('=') {
                    Some((source, address)) => (source, Some(address)),
                    None => (qr.as_str(), None),
                };
                let source: QrSource = source.parse()?;
                if source == QrSource::AutoLink {
                    let storage = open_storage(&data_dir)?;
                    println!("Link: {}", editor.select_auto_link(&storage)?);
                } else {
                    editor.set_qr_source(source, address);
                }
            }
            for pair in &images {
                let (slot, path) = split_pair(pair)?;
                let slot: ImageSlot = slot.parse()?;
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read image {}", path))?;
                editor
                    .upload_image(&InlineUploader, slot, path, bytes)
                    .await?;
            }

            editor.commit();
            write_state(editor.state(), Some(out.as_deref().unwrap_or(&file)))?;
        }

        Commands::Render { file, face, settle: settle_images } => {
            let state = read_state(&file)?;
            let engine = config.render_engine();
            let tree = match face {
                FaceArg::Both => engine.build(&state, Target::Static),
                FaceArg::Front => engine.build_face(&state, Face::Front, Target::Static),
                FaceArg::Back => engine.build_face(&state, Face::Back, Target::Static),
            };

            let tree = if settle_images {
                let base_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
                let cancel = CancellationToken::new();
                cancel_on_interrupt(cancel.clone());
                let settled = settle(tree, &LocalFileProbe::new(base_dir), &cancel).await?;
                for src in &settled.broken {
                    eprintln!("Broken image: {}", src);
                }
                settled.tree
            } else {
                tree
            };
            println!("{}", StaticMarkup::new().serialize(&tree));
        }

        Commands::Vcard { file } => {
            let state = read_state(&file)?;
            print!("{}", cardsmith_core::vcard::contact_card(&state));
        }

        Commands::Save { file } => {
            let storage = open_storage(&data_dir)?;
            let mut editor = CardEditor::from_config(config);
            editor.load(read_state(&file)?);
            let id = editor.save(&storage)?;

            // Keep the document in step with the stored id
            write_state(editor.state(), Some(file.as_path()))?;
            println!("Saved card");
            println!("  ID: {}", id);
            println!("  Link: {}", build_link(&editor.config().viewer_path, &id));
        }

        Commands::List => {
            let storage = open_storage(&data_dir)?;
            let mut cards = storage.list_cards()?;
            if cards.is_empty() {
                println!("No cards stored.");
            } else {
                cards.sort_by(|a, b| b.1.cmp(&a.1));
                println!("Cards:");
                for (id, saved_at) in cards {
                    let saved = chrono::DateTime::from_timestamp(saved_at, 0)
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| saved_at.to_string());
                    println!("  {}  (saved {})", id, saved);
                }
            }
        }

        Commands::Show { id } => {
            let storage = open_storage(&data_dir)?;
            let state = fetch_card(&storage, &parse_card_id(&id)?)?;
            write_state(&state, None)?;
        }

        Commands::Link { id } => {
            let storage = open_storage(&data_dir)?;
            let id = parse_card_id(&id)?;
            fetch_card(&storage, &id)?;
            println!("{}", build_link(&config.viewer_path, &id));
        }

        Commands::View { link } => {
            let storage = open_storage(&data_dir)?;
            let id = parse_link(&link)?;
            let state = fetch_card(&storage, &id)?;
            println!("{}", config.render_engine().static_markup(&state));
        }

        Commands::Delete { id } => {
            let storage = open_storage(&data_dir)?;
            let id = parse_card_id(&id)?;
            storage.delete_card(&id)?;
            println!("Deleted card {}", id);
        }

        Commands::Recover { clear } => {
            let recovery = RecoveryFile::in_dir(&data_dir);
            match recovery.read()? {
                Some(state) => {
                    write_state(&state, None)?;
                    if clear {
                        recovery.clear()?;
                    }
                }
                None => println!("No recovery snapshot."),
            }
        }
    }

    Ok(())
}
