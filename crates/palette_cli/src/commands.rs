//! CLI command definitions and dispatch.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use palette_core::{
    AppPaths, CollectionSource, ContentRef, ContentResolver, EntryVariant, Folder, JsonFileStore,
    NodeId, PaletteSession, PaletteSettings, ReferencePath, SortMode, StepOutcome, SCENE_SCHEME,
};
use palette_fs::FsContentResolver;
use std::path::PathBuf;

type Session = PaletteSession<JsonFileStore>;

/// Asset Palette: curated shortcuts to project content
#[derive(Debug, Parser)]
#[command(name = "palette", version, about, long_about = None)]
pub struct Cli {
    /// Also log to the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Keep settings, collections and logs under this directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the folder tree and the entries of the active folder
    Show,
    /// Create a new collection file and make it current
    NewCollection {
        path: PathBuf,
    },
    /// Make a collection current: `personal` or a collection file
    Use {
        collection: String,
    },
    /// Folder management
    Folder(FolderArgs),
    /// Set the sort mode for every folder
    Sort {
        /// unsorted, alphabetical, reverse_alphabetical or by_kind
        mode: SortMode,
    },
    /// Add project content to the active folder
    Drop(DropArgs),
    /// Entry management
    Entry(EntryArgs),
}

#[derive(Debug, Args)]
pub struct FolderArgs {
    #[command(subcommand)]
    pub command: FolderCommand,
}

#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a folder
    Add {
        name: String,
        /// Parent folder ID (omit for a root folder)
        #[arg(short, long)]
        parent: Option<NodeId>,
    },
    /// Delete a folder and everything in it
    Remove { id: NodeId },
    /// Rename a folder
    Rename { id: NodeId, name: String },
    /// Move a folder under another one, or to the root list
    Move {
        id: NodeId,
        #[arg(short, long)]
        parent: Option<NodeId>,
        /// Position among the new siblings (default: last)
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// Make a folder active, by ID or by reference path
    Select { target: String },
}

#[derive(Debug, Args)]
pub struct DropArgs {
    /// Files, directories or scene:// references
    #[arg(required = true)]
    pub items: Vec<String>,

    /// Project root the items are resolved against
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Answer for items that could be either an asset or a macro
    #[arg(long = "as", value_enum)]
    pub decision: Option<VariantArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VariantArg {
    Asset,
    Macro,
}

impl From<VariantArg> for EntryVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Asset => EntryVariant::Asset,
            VariantArg::Macro => EntryVariant::Macro,
        }
    }
}

#[derive(Debug, Args)]
pub struct EntryArgs {
    #[command(subcommand)]
    pub command: EntryCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    /// Remove entries by ID
    Remove {
        #[arg(required = true)]
        ids: Vec<NodeId>,
    },
}

impl Cli {
    pub fn paths(&self) -> Result<AppPaths> {
        match &self.data_dir {
            Some(dir) => Ok(AppPaths::at(dir)),
            None => AppPaths::from_project_dirs(),
        }
    }

    /// Run the command against the stored palette and persist the result
    pub fn execute(&self, paths: &AppPaths) -> Result<()> {
        let mut settings = PaletteSettings::load(&paths.settings_file);
        let mut session = open_session(paths, &mut settings)?;

        match &self.command {
            Commands::Show => show(&mut session),
            Commands::NewCollection { path } => {
                session.store().create(path)?;
                session.switch_collection(CollectionSource::File(path.clone()))?;
                println!("Created and switched to {}", path.display());
            }
            Commands::Use { collection } => {
                let source = parse_source(collection);
                session.switch_collection(source)?;
                println!("Using '{}'", session.collection().name());
            }
            Commands::Folder(args) => folder(&mut session, &args.command)?,
            Commands::Sort { mode } => {
                session.set_sort_mode(*mode)?;
                println!("Sorting by {}", mode.display_name());
            }
            Commands::Drop(args) => drop_items(&mut session, &settings, args)?,
            Commands::Entry(args) => match &args.command {
                EntryCommand::Remove { ids } => {
                    for id in ids {
                        let entry = session.remove_entry(*id)?;
                        println!("Removed '{}'", entry.display_name());
                    }
                }
            },
        }

        if session.is_dirty() {
            session.save()?;
        }
        session.apply_to_settings(&mut settings);
        settings.save(&paths.settings_file)
    }
}

fn open_session(paths: &AppPaths, settings: &mut PaletteSettings) -> Result<Session> {
    let store = JsonFileStore::new(paths.personal_collection_file.clone());
    match PaletteSession::open(store.clone(), settings) {
        Ok(session) => Ok(session),
        Err(e) if settings.current_collection != CollectionSource::Personal => {
            tracing::warn!("{:#}, falling back to the personal collection", e);
            settings.current_collection = CollectionSource::Personal;
            settings.active_folder = None;
            PaletteSession::open(store, settings)
        }
        Err(e) => Err(e),
    }
}

fn parse_source(collection: &str) -> CollectionSource {
    if collection.eq_ignore_ascii_case("personal") {
        CollectionSource::Personal
    } else {
        CollectionSource::File(PathBuf::from(collection))
    }
}

fn folder(session: &mut Session, command: &FolderCommand) -> Result<()> {
    match command {
        FolderCommand::Add { name, parent } => {
            let id = session.add_folder(*parent, name.as_str())?;
            println!("Created folder '{}' [{}]", name, id);
        }
        FolderCommand::Remove { id } => {
            session.remove_folder(*id)?;
            println!("Deleted folder {}", id);
        }
        FolderCommand::Rename { id, name } => {
            session.rename_folder(*id, name.as_str())?;
            println!("Renamed folder {} to '{}'", id, name);
        }
        FolderCommand::Move { id, parent, index } => {
            session.move_folder(*id, *parent, *index)?;
            println!("Moved folder {}", id);
        }
        FolderCommand::Select { target } => {
            select_folder(session, target)?;
            let active = session.active_folder();
            if let Some(folder) = session.collection().folder(active) {
                println!("Active folder: '{}'", folder.name());
            }
        }
    }
    Ok(())
}

fn select_folder(session: &mut Session, target: &str) -> Result<()> {
    if target.contains(':') {
        let path: ReferencePath = target.parse()?;
        if path.resolve_folder(session.collection()).is_none() {
            anyhow::bail!("No folder at {}", path);
        }
        session.set_active_folder(path)?;
    } else {
        let id: NodeId = target
            .parse()
            .with_context(|| format!("'{}' is neither a folder ID nor a reference path", target))?;
        session.select_folder(id)?;
    }
    Ok(())
}

/// Content reference for a command-line item. Paths that exist are made
/// relative to the project root; anything else is passed through.
/// Relative items are taken from the project root, not the working directory
fn to_content_ref(resolver: &FsContentResolver, item: &str) -> ContentRef {
    if item.starts_with(SCENE_SCHEME) {
        return ContentRef::new(item);
    }
    resolver
        .root()
        .join(item)
        .canonicalize()
        .ok()
        .and_then(|abs| resolver.content_ref(&abs))
        .unwrap_or_else(|| resolver.canonical(&ContentRef::new(item)))
}

fn prompt_variant(item: &ContentRef) -> Result<Option<EntryVariant>> {
    let choices = ["Asset", "Macro", "Cancel drop"];
    let choice = dialoguer::Select::new()
        .with_prompt(format!("Add '{}' as", item))
        .items(&choices)
        .default(0)
        .interact()
        .context("Input error")?;
    Ok(match choice {
        0 => Some(EntryVariant::Asset),
        1 => Some(EntryVariant::Macro),
        _ => None,
    })
}

fn drop_items(session: &mut Session, settings: &PaletteSettings, args: &DropArgs) -> Result<()> {
    let resolver = FsContentResolver::new(&args.root)?.with_script_extensions(&settings.script_extensions);
    let items: Vec<ContentRef> = args.items.iter().map(|item| to_content_ref(&resolver, item)).collect();
    session.begin_ingest(items);

    loop {
        match session.run_ingest(&resolver)? {
            StepOutcome::AwaitingInput(item) => {
                let variant = match args.decision {
                    Some(arg) => Some(arg.into()),
                    None => prompt_variant(&item)?,
                };
                match variant {
                    Some(variant) => {
                        session.provide_decision(variant);
                    }
                    None => {
                        session.cancel_ingest();
                        println!("Drop cancelled, nothing added");
                        return Ok(());
                    }
                }
            }
            StepOutcome::Committed { added } => {
                println!("Added {} entr{}", added, if added == 1 { "y" } else { "ies" });
                return Ok(());
            }
            StepOutcome::Idle | StepOutcome::Processing => return Ok(()),
        }
    }
}

fn show(session: &mut Session) {
    fn print_folder(folder: &Folder, depth: usize, active: NodeId) {
        let marker = if folder.id() == active { "*" } else { " " };
        println!(
            "{}{} {} [{}] ({} entries)",
            "  ".repeat(depth),
            marker,
            folder.name(),
            folder.id(),
            folder.entries().len()
        );
        for child in folder.children() {
            print_folder(child, depth + 1, active);
        }
    }

    let active = session.active_folder();
    println!(
        "{} ({}), sorted by {}",
        session.collection().name(),
        session.source().display_name(),
        session.sort_mode().display_name()
    );
    for root in session.collection().root_folders() {
        print_folder(root, 0, active);
    }

    let Some(folder) = session.collection().folder(active) else {
        return;
    };
    println!();
    println!("Entries in '{}':", folder.name());
    if folder.entries().is_empty() {
        println!("  (empty)");
    }
    for entry in folder.entries() {
        println!(
            "  {:<5}  {:<24} {}  [{}]",
            entry.variant().display_name(),
            entry.display_name(),
            entry.content(),
            entry.id()
        );
    }
}
