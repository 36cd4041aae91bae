//! modctl CLI
//!
//! Manage a catalog of application modules and their schema entities.
//! The list commands run the interactive pager; create/remove/map are
//! plain prompted commands.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use modctl::pager::{ColumnSpec, DataSourceError, PageState, Pager};
use modctl::prompt::{prompt_confirm, prompt_id, prompt_required};
use modctl::schema::{scan_app_migrations, scan_module_migrations};
use modctl::store::CatalogStore;
use modctl::types::{Entity, Module, SortDirection};

#[derive(Parser)]
#[command(name = "modctl")]
#[command(about = "Manage the module and entity catalog")]
#[command(version)]
struct Cli {
    /// Catalog file location (default: the user data directory)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage modules
    #[command(subcommand)]
    Modules(ModulesCommand),

    /// Manage entities inside modules
    #[command(subcommand)]
    Entities(EntitiesCommand),
}

#[derive(Subcommand)]
enum ModulesCommand {
    /// Page through existing modules
    List(ListArgs),

    /// Interactively create a new module
    Create,

    /// Delete a module (and its entities) by ID
    Remove,

    /// Map a migrations directory into catalog modules and entities
    Map {
        /// Migrations directory to scan
        #[arg(long)]
        dir: PathBuf,

        /// Restrict the scan to one module subdirectory
        #[arg(long)]
        module: Option<String>,

        /// Module name representing the main app (prompted when absent)
        #[arg(long)]
        app_name: Option<String>,
    },
}

#[derive(Subcommand)]
enum EntitiesCommand {
    /// Page through the entities of a module
    List {
        /// Module ID to filter entities
        #[arg(long)]
        module: u64,

        #[command(flatten)]
        paging: ListArgs,
    },

    /// Interactively add an entity to a module
    Add {
        /// Module ID to add the entity to
        #[arg(long)]
        module: u64,
    },

    /// Interactively delete an entity by module ID and name
    Remove,
}

/// Shared paging flags for the list commands.
#[derive(Args)]
struct ListArgs {
    /// Items per page
    #[arg(long, default_value_t = 10)]
    limit: u64,

    /// Field to sort by
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort direction
    #[arg(long, value_enum, default_value_t = SortDirection::Asc)]
    sort_direction: SortDirection,

    /// Page number to start on
    #[arg(long, default_value_t = 1)]
    page: u64,
}

impl ListArgs {
    fn into_state(self) -> PageState {
        let mut state = PageState::new(self.page, self.limit);
        state.sort_by = self.sort_by;
        state.sort_direction = self.sort_direction;
        state
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Modules(cmd) => match cmd {
            ModulesCommand::List(args) => cmd_modules_list(cli.catalog, args),
            ModulesCommand::Create => cmd_modules_create(cli.catalog),
            ModulesCommand::Remove => cmd_modules_remove(cli.catalog),
            ModulesCommand::Map { dir, module, app_name } => {
                cmd_modules_map(cli.catalog, dir, module, app_name)
            }
        },
        Commands::Entities(cmd) => match cmd {
            EntitiesCommand::List { module, paging } => {
                cmd_entities_list(cli.catalog, module, paging)
            }
            EntitiesCommand::Add { module } => cmd_entities_add(cli.catalog, module),
            EntitiesCommand::Remove => cmd_entities_remove(cli.catalog),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Stderr logging, silent at the default `warn` level so the pager's
/// redrawn screen stays clean. Override with MODCTL_LOG.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("MODCTL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_store(catalog: Option<PathBuf>) -> Result<CatalogStore, String> {
    let result = match catalog {
        Some(path) => CatalogStore::open(path),
        None => CatalogStore::open_default(),
    };
    result.map_err(|e| e.to_string())
}

// ============================================================================
// LIST COMMANDS (interactive pager)
// ============================================================================

fn cmd_modules_list(catalog: Option<PathBuf>, args: ListArgs) -> Result<(), String> {
    let store = open_store(catalog)?;
    let state = args.into_state();

    let columns = ColumnSpec::new([
        ("id", "ID"),
        ("created_at", "Created At"),
        ("title", "Module"),
        ("entities", "Entities"),
    ]);

    let pager = Pager::new(
        "Welcome to the Modules List Command!",
        "modules",
        columns,
        |s: &PageState| store.query_modules(s).map_err(DataSourceError::from),
    )
    .with_hint("To see the entities inside a module, run 'modctl entities list --module=<id>'");

    pager.run(state).map_err(|e| e.to_string())
}

fn cmd_entities_list(catalog: Option<PathBuf>, module: u64, args: ListArgs) -> Result<(), String> {
    let store = open_store(catalog)?;
    let mut state = args.into_state();
    state.filters.insert("module".to_string(), module.to_string());

    let columns = ColumnSpec::new([
        ("id", "ID"),
        ("created_at", "Created At"),
        ("name", "Entity Name"),
        ("label", "Entity Label"),
        ("module", "Module"),
    ]);

    let pager = Pager::new(
        "Welcome to the Module Entities List Command!",
        "entities",
        columns,
        |s: &PageState| store.query_entities(s).map_err(DataSourceError::from),
    );

    pager.run(state).map_err(|e| e.to_string())
}

// ============================================================================
// PROMPTED COMMANDS
// ============================================================================

fn cmd_modules_create(catalog: Option<PathBuf>) -> Result<(), String> {
    let mut store = open_store(catalog)?;

    println!("Welcome to the Modules Create Command!");
    println!("This command will help you add a new module.");
    println!();
    println!("  >> New Module:");
    println!("------------------------------------------------------");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let title = prompt_required(&mut input, &mut output, "Module Title", 100)
        .map_err(|e| e.to_string())?;

    let module = store.create_module(&title).map_err(|e| e.to_string())?;

    println!("  >> Module added successfully!");
    print_module(&module);
    Ok(())
}

fn cmd_modules_remove(catalog: Option<PathBuf>) -> Result<(), String> {
    let mut store = open_store(catalog)?;

    println!("Welcome to the Module Removal Command!");
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let id = prompt_id(&mut input, &mut output, "Please, enter the Module ID you want to remove")
        .map_err(|e| e.to_string())?;

    let module = store.remove_module(id).map_err(|e| e.to_string())?;
    println!("  >> Module '{}' (ID {}) removed successfully!", module.title, module.id);
    Ok(())
}

fn cmd_entities_add(catalog: Option<PathBuf>, module_id: u64) -> Result<(), String> {
    let mut store = open_store(catalog)?;

    println!("Welcome to the Module Entity Add Command!");
    println!(
        "This command will help you add a new entity to the module with ID {}.",
        module_id
    );
    println!();
    println!("  >> New Entity:");
    println!("------------------------------------------------------");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let name = prompt_required(&mut input, &mut output, "Entity Name", 60)
        .map_err(|e| e.to_string())?;
    let label = prompt_required(&mut input, &mut output, "Entity Label", 60)
        .map_err(|e| e.to_string())?;

    let entity = store
        .add_entity(module_id, &name, &label)
        .map_err(|e| e.to_string())?;

    println!("  >> Entity added successfully!");
    print_entity(&entity);
    Ok(())
}

fn cmd_entities_remove(catalog: Option<PathBuf>) -> Result<(), String> {
    let mut store = open_store(catalog)?;

    println!("Welcome to the Module Entity Removal Command!");
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let module_id = prompt_id(
        &mut input,
        &mut output,
        "Please, enter the Module ID to remove an entity from",
    )
    .map_err(|e| e.to_string())?;
    let name = prompt_required(
        &mut input,
        &mut output,
        "Please, enter the Entity Name you want to remove",
        60,
    )
    .map_err(|e| e.to_string())?;

    println!("  >> Please confirm you want to remove the entity named '{}'.", name);
    let confirmed = prompt_confirm(&mut input, &mut output, "Type 'yes' to confirm")
        .map_err(|e| e.to_string())?;
    if !confirmed {
        println!("  >> Operation cancelled.");
        return Ok(());
    }

    let removed = store.remove_entity(module_id, &name).map_err(|e| e.to_string())?;
    if removed == 0 {
        println!("  >> No entity named '{}' found in module {}.", name, module_id);
    } else {
        println!("  >> Entity '{}' removed successfully!", name);
    }
    Ok(())
}

// ============================================================================
// MODULE MAPPING
// ============================================================================

fn cmd_modules_map(
    catalog: Option<PathBuf>,
    dir: PathBuf,
    only_module: Option<String>,
    app_name: Option<String>,
) -> Result<(), String> {
    let mut store = open_store(catalog)?;

    let discovered =
        scan_module_migrations(&dir, only_module.as_deref()).map_err(|e| e.to_string())?;

    for migrations in discovered {
        let title = capitalize(&migrations.module);
        println!("  >> Mapping module {}'s entities...", title);

        let module = store.ensure_module(&title).map_err(|e| e.to_string())?;
        let new_entities =
            map_tables(&mut store, module.id, &migrations.tables).map_err(|e| e.to_string())?;

        println!(
            "  >> Module '{}' mapped successfully with the following new entities:",
            title
        );
        for entity in &new_entities {
            println!("    -> {} ({})", entity.name, entity.label);
        }
        println!();
    }

    // The main app is represented as a module of its own.
    let app_name = match app_name {
        Some(name) => name,
        None => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            prompt_required(
                &mut input,
                &mut output,
                "Please, define the main app name as a module (Ex.: 'General')",
                100,
            )
            .map_err(|e| e.to_string())?
        }
    };

    let app_module = store.ensure_module(&app_name).map_err(|e| e.to_string())?;
    let app_tables = scan_app_migrations(&dir).map_err(|e| e.to_string())?;
    let new_entities =
        map_tables(&mut store, app_module.id, &app_tables).map_err(|e| e.to_string())?;

    println!(
        "  >> Module '{}' mapped successfully with the following new entities:",
        app_name
    );
    for entity in &new_entities {
        println!("    -> {} ({})", entity.name, entity.label);
    }
    println!();

    Ok(())
}

/// Insert the tables a scan found, skipping ones the module already has.
fn map_tables(
    store: &mut CatalogStore,
    module_id: u64,
    tables: &[String],
) -> Result<Vec<Entity>, modctl::store::StoreError> {
    let mut inserted = Vec::new();
    for table in tables {
        if store.has_entity(module_id, table) {
            continue;
        }
        inserted.push(store.add_entity(module_id, table, table)?);
    }
    Ok(inserted)
}

// ============================================================================
// OUTPUT HELPERS
// ============================================================================

fn print_module(module: &Module) {
    println!("    -> id: {}", module.id);
    println!("    -> key: {}", module.key);
    println!("    -> title: {}", module.title);
    println!("    -> created_at: {}", module.created_at);
}

fn print_entity(entity: &Entity) {
    println!("    -> id: {}", entity.id);
    println!("    -> module_id: {}", entity.module_id);
    println!("    -> name: {}", entity.name);
    println!("    -> label: {}", entity.label);
    println!("    -> created_at: {}", entity.created_at);
}

/// Uppercase the first letter, as module directory names are lowercase.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
