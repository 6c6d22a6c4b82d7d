//! apidesk CLI: Command-line interface for the apidesk publisher console

mod logging;

use apidesk_engine::{
    fetch_directory, parse_document, Access, ApiRecord, ApiType, Config, ContentEditor,
    DefinitionSource, DescriptionType, FileStore, HttpDefinitionSource, StoreError, APIDESK_DIR,
    SCOPE_API_CREATE,
};
use apidesk_tui::Backends;
use clap::{Parser, Subcommand};
use logging::{setup_logging, LogTarget};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Publisher console for API descriptions, overviews and AsyncAPI servers
#[derive(Parser)]
#[command(name = "apidesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui {
        /// API to open (defaults to the first API by name)
        api_id: Option<String>,

        /// Fetch the AsyncAPI definition from the configured publisher URL
        #[arg(long)]
        remote: bool,
    },

    /// Initialize .apidesk/ directory and config
    Init,

    /// Register an API in the local store
    Add {
        /// API ID (a random UUID when omitted)
        api_id: Option<String>,

        /// Display name
        #[arg(long)]
        name: String,

        /// Short description
        #[arg(long)]
        description: Option<String>,

        /// Markdown file with the overview
        #[arg(long)]
        overview_file: Option<PathBuf>,

        /// AsyncAPI definition (JSON) to import
        #[arg(long)]
        asyncapi: Option<PathBuf>,

        /// Register as an API product
        #[arg(long)]
        product: bool,
    },

    /// List registered APIs
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print an API record and whether the configured user may edit it
    Show {
        api_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the protocol servers of an API
    Servers {
        api_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Fetch the AsyncAPI definition from the configured publisher URL
        #[arg(long)]
        remote: bool,
    },

    /// Replace the description or overview of an API
    Edit {
        api_id: String,

        /// Field to edit: description or overview
        #[arg(long = "type", value_name = "TYPE")]
        description_type: DescriptionType,

        /// File holding the new content
        #[arg(long)]
        from_file: PathBuf,
    },
}

const CONFIG_FILE: &str = "config.json";

fn main() {
    let cli = Cli::parse();
    let apidesk_dir = Path::new(APIDESK_DIR);

    let target = log_target(cli.command.as_ref(), apidesk_dir);
    if let Err(e) = setup_logging(target, apidesk_dir) {
        eprintln!("Warning: {e}");
    }
    tracing::debug!(?target, "logging initialized");

    let rt = Runtime::new().unwrap_or_else(|e| fail(format!("Failed to create tokio runtime: {e}")));

    match cli.command {
        None => cmd_tui(&rt, None, false),
        Some(Commands::Tui { api_id, remote }) => cmd_tui(&rt, api_id, remote),
        Some(Commands::Init) => cmd_init(),
        Some(Commands::Add {
            api_id,
            name,
            description,
            overview_file,
            asyncapi,
            product,
        }) => cmd_add(api_id, name, description, overview_file, asyncapi, product),
        Some(Commands::List { json }) => cmd_list(json),
        Some(Commands::Show { api_id, json }) => cmd_show(&api_id, json),
        Some(Commands::Servers {
            api_id,
            json,
            remote,
        }) => cmd_servers(&rt, &api_id, json, remote),
        Some(Commands::Edit {
            api_id,
            description_type,
            from_file,
        }) => cmd_edit(&rt, &api_id, description_type, &from_file),
    }
}

/// The TUI logs to a file inside an initialized `.apidesk`; everything
/// else, including a TUI run before `init`, logs to stderr.
fn log_target(command: Option<&Commands>, apidesk_dir: &Path) -> LogTarget {
    match command {
        None | Some(Commands::Tui { .. }) if apidesk_dir.is_dir() => LogTarget::File,
        _ => LogTarget::Stderr,
    }
}

/// Print an error and exit non-zero.
fn fail(message: impl Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn open_store() -> FileStore {
    let apidesk_dir = Path::new(APIDESK_DIR);
    if !apidesk_dir.exists() {
        fail(".apidesk directory not found. Run `apidesk init` first.");
    }
    FileStore::new(apidesk_dir).unwrap_or_else(|e| fail(e))
}

fn load_config() -> Config {
    let path = Path::new(APIDESK_DIR).join(CONFIG_FILE);
    Config::load_or_default(&path).unwrap_or_else(|e| fail(format!("{}: {e}", path.display())))
}

fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(format!("{}: {e}", path.display())))
}

/// The remote definition source, if a publisher URL is configured.
fn remote_source(config: &Config) -> HttpDefinitionSource {
    let Some(url) = &config.publisher_url else {
        fail("publisher_url is not set in .apidesk/config.json");
    };
    HttpDefinitionSource::new(url.clone(), config.resolved_token())
}

fn edit_access(config: &Config, record: &ApiRecord) -> Access {
    Access::check(&[SCOPE_API_CREATE], &config.user, Some(record.access()))
}

fn cmd_tui(rt: &Runtime, api_id: Option<String>, remote: bool) {
    let store = open_store();
    let config = load_config();

    let api = match api_id {
        Some(id) => store.read_record(&id),
        None => store.list_apis().and_then(|apis| {
            apis.into_iter()
                .next()
                .ok_or_else(|| StoreError::ApiNotFound("(none registered)".to_string()))
        }),
    }
    .unwrap_or_else(|e| fail(e));

    let store = Arc::new(store);
    let definitions: Arc<dyn DefinitionSource> = if remote {
        Arc::new(remote_source(&config))
    } else {
        store.clone()
    };
    let backends = Backends {
        content: store,
        definitions,
        fetch_timeout: config.fetch_timeout(),
    };

    if let Err(e) = rt.block_on(apidesk_tui::run_tui(api, config.user, backends)) {
        fail(e);
    }
}

fn cmd_init() {
    let apidesk_dir = Path::new(APIDESK_DIR);
    if let Err(e) = FileStore::new(apidesk_dir) {
        fail(format!("Failed to create {}: {e}", apidesk_dir.display()));
    }

    let config_path = apidesk_dir.join(CONFIG_FILE);
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        match Config::default().save(&config_path) {
            Ok(()) => println!("Created {}", config_path.display()),
            Err(e) => fail(format!("Failed to write config: {e}")),
        }
    }

    println!("\nInitialization complete!");
    println!("Register an API with `apidesk add --name <name>`");
}

fn cmd_add(
    api_id: Option<String>,
    name: String,
    description: Option<String>,
    overview_file: Option<PathBuf>,
    asyncapi: Option<PathBuf>,
    product: bool,
) {
    let store = open_store();

    let mut record = match api_id {
        Some(id) => ApiRecord::with_id(id, name),
        None => ApiRecord::new(name),
    };
    record.description = description;
    record.overview = overview_file.as_deref().map(read_file);
    if product {
        record.api_type = ApiType::ApiProduct;
    }

    // Validate the definition before anything is written.
    let definition = asyncapi.as_deref().map(|path| {
        let raw = read_file(path);
        if let Err(e) = parse_document(&raw) {
            fail(format!("{}: {e}", path.display()));
        }
        raw
    });

    if let Err(e) = store.create_api(&record) {
        fail(e);
    }
    if let Some(raw) = definition {
        if let Err(e) = store.import_definition(&record.id, &raw) {
            fail(e);
        }
    }

    println!("Added {} ({})", record.name, record.id);
}

fn cmd_list(json: bool) {
    let apis = open_store().list_apis().unwrap_or_else(|e| fail(e));

    if json {
        match serde_json::to_string_pretty(&apis) {
            Ok(out) => println!("{out}"),
            Err(e) => fail(e),
        }
        return;
    }

    if apis.is_empty() {
        println!("No APIs registered");
        return;
    }
    for api in &apis {
        let kind = match api.api_type {
            ApiType::Api => "",
            ApiType::ApiProduct => " [product]",
        };
        println!("  {}  {}{kind}", api.id, api.name);
    }
    println!("\n{} API(s)", apis.len());
}

fn cmd_show(api_id: &str, json: bool) {
    let store = open_store();
    let config = load_config();
    let record = store.read_record(api_id).unwrap_or_else(|e| fail(e));
    let editable = edit_access(&config, &record).is_allowed();

    if json {
        let value = serde_json::json!({ "api": record, "editable": editable });
        match serde_json::to_string_pretty(&value) {
            Ok(out) => println!("{out}"),
            Err(e) => fail(e),
        }
        return;
    }

    println!("{} ({})", record.name, record.id);
    println!("  Type: {:?}", record.api_type);
    println!("  Lifecycle: {}", record.lifecycle_status);
    println!("  Updated: {}", record.updated_at.to_rfc3339());
    println!(
        "  Editable by {}: {}",
        config.user.username,
        if editable { "yes" } else { "no" }
    );
    println!("  Action: {}", ContentEditor::button_label(&record));

    for description_type in [DescriptionType::Description, DescriptionType::Overview] {
        println!("\n{}", description_type.label());
        let content = record.content(description_type);
        if content.is_empty() {
            println!("  (none)");
        } else {
            for line in content.lines() {
                println!("  {line}");
            }
        }
    }
}

fn cmd_servers(rt: &Runtime, api_id: &str, json: bool, remote: bool) {
    let config = load_config();
    let source: Box<dyn DefinitionSource> = if remote {
        Box::new(remote_source(&config))
    } else {
        Box::new(open_store())
    };

    let directory = rt
        .block_on(fetch_directory(source.as_ref(), api_id, config.fetch_timeout()))
        .unwrap_or_else(|e| fail(e));

    if json {
        let servers: Vec<_> = directory
            .iter()
            .map(|(name, endpoint)| {
                serde_json::json!({
                    "name": name,
                    "protocol": endpoint.protocol(),
                    "url": endpoint.url(),
                    "protocolVersion": endpoint.protocol_version,
                    "description": endpoint.description,
                })
            })
            .collect();
        match serde_json::to_string_pretty(&servers) {
            Ok(out) => println!("{out}"),
            Err(e) => fail(e),
        }
        return;
    }

    if directory.is_empty() {
        println!("No servers declared");
        return;
    }
    println!("Protocols & Endpoints\n");
    for (name, endpoint) in directory.iter() {
        println!("{name}");
        println!("  - [{}] {}", endpoint.protocol(), endpoint.url());
    }
}

fn cmd_edit(rt: &Runtime, api_id: &str, description_type: DescriptionType, from_file: &Path) {
    let store = open_store();
    let config = load_config();
    let content = read_file(from_file);
    let record = store.read_record(api_id).unwrap_or_else(|e| fail(e));

    let mut editor = ContentEditor::new(description_type);
    if let Err(e) = editor.open(&record, edit_access(&config, &record)) {
        fail(e);
    }
    if let Err(e) = editor.update_draft(content) {
        fail(e);
    }
    match rt.block_on(editor.save(&store, api_id)) {
        Ok(updated) => println!("Updated {} of {}", description_type, updated.name),
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tui_logs_to_file_only_when_initialized() {
        let dir = tempfile::TempDir::new().unwrap();
        let apidesk_dir = dir.path().join(APIDESK_DIR);

        assert_eq!(log_target(None, &apidesk_dir), LogTarget::Stderr);
        assert!(!apidesk_dir.exists());

        std::fs::create_dir(&apidesk_dir).unwrap();
        assert_eq!(log_target(None, &apidesk_dir), LogTarget::File);
        let tui = Commands::Tui {
            api_id: None,
            remote: false,
        };
        assert_eq!(log_target(Some(&tui), &apidesk_dir), LogTarget::File);
        assert_eq!(
            log_target(Some(&Commands::List { json: false }), &apidesk_dir),
            LogTarget::Stderr
        );
    }

    #[test]
    fn test_no_command_opens_tui() {
        let cli = Cli::try_parse_from(["apidesk"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_edit_parses_type() {
        let cli = Cli::try_parse_from([
            "apidesk",
            "edit",
            "pizza",
            "--type",
            "overview",
            "--from-file",
            "overview.md",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Edit {
                api_id,
                description_type,
                from_file,
            }) => {
                assert_eq!(api_id, "pizza");
                assert_eq!(description_type, DescriptionType::Overview);
                assert_eq!(from_file, PathBuf::from("overview.md"));
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn test_edit_rejects_unknown_type() {
        let result = Cli::try_parse_from([
            "apidesk",
            "edit",
            "pizza",
            "--type",
            "summary",
            "--from-file",
            "x.md",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_add_id_is_optional() {
        let cli = Cli::try_parse_from(["apidesk", "add", "--name", "PizzaShack", "--product"])
            .unwrap();
        match cli.command {
            Some(Commands::Add {
                api_id,
                name,
                product,
                ..
            }) => {
                assert!(api_id.is_none());
                assert_eq!(name, "PizzaShack");
                assert!(product);
            }
            _ => panic!("expected add command"),
        }
    }
}
