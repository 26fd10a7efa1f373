use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use productstore::{Config, Error, Page, Product, ProductService, SqliteStore, Uuid, jsonl};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "productstore")]
#[command(about = "ProductStore CLI - manage product records backed by SQLite")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the product database (overrides config and environment)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new product
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// Show a single product
    Show { id: Uuid },

    /// Change a product's name or description
    Update {
        id: Uuid,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 'D', long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,
    },

    /// Delete a product (no error if it does not exist)
    Delete { id: Uuid },

    /// List products, newest first, one page at a time
    List {
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Products per page (default from config)
        #[arg(short = 's', long)]
        page_size: Option<usize>,
    },

    /// Find products whose name contains TEXT, ignoring case
    Search { text: String },

    /// Print the number of products
    Count,

    /// Write every product to a JSONL file
    Export { file: PathBuf },

    /// Load products from a JSONL file, keeping their ids and timestamps
    Import { file: PathBuf },
}

fn main() {
    // Setup tracing
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        report(&e);
        process::exit(1);
    }
}

/// Validation failures are shown against the offending field
fn report(err: &eyre::Report) {
    match err.downcast_ref::<Error>() {
        Some(Error::Validation(v)) => {
            eprintln!("{} {}: {}", "Invalid".red().bold(), v.field().bold(), v);
        }
        _ => eprintln!("{} {:#}", "Error:".red().bold(), err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    debug!(?config, "Resolved configuration");

    let store = SqliteStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open store at {}", config.data_dir.display()))?;
    let mut service = ProductService::new(store);

    let result = execute(&mut service, cli.command, &config);

    // Release the store whether or not the command succeeded
    let closed = service.into_store().close();
    result?;
    closed.context("Failed to close store")?;

    Ok(())
}

fn execute(service: &mut ProductService<SqliteStore>, command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Add { name, description } => {
            let product = service.create(&name, description.as_deref())?;
            println!("{} {}", "Created".green().bold(), product.id);
            print_product(&product);
        }
        Commands::Show { id } => {
            let product = service.get(id)?.ok_or(Error::NotFound(id))?;
            print_product(&product);
        }
        Commands::Update {
            id,
            name,
            description,
            clear_description,
        } => {
            let mut product = service.get(id)?.ok_or(Error::NotFound(id))?;
            if let Some(name) = name {
                product.name = name;
            }
            if clear_description {
                product.description = None;
            } else if let Some(description) = description {
                product.description = Some(description);
            }

            let updated = service.update(&product)?;
            println!("{} {}", "Updated".green().bold(), updated.id);
            print_product(&updated);
        }
        Commands::Delete { id } => {
            service.delete(id)?;
            println!("{} {}", "Deleted".green().bold(), id);
        }
        Commands::List { page, page_size } => {
            let page = service.page(page, page_size.unwrap_or(config.page_size))?;
            print_table(&page.items);
            print_page_info(&page);
        }
        Commands::Search { text } => {
            let results = service.search(&text)?;
            print_table(&results);
            println!("Search results: {}", results.len());
        }
        Commands::Count => {
            println!("{}", service.total_count()?);
        }
        Commands::Export { file } => {
            let products = service.list_all()?;
            let count = jsonl::write_jsonl(&file, &products)?;
            println!("Exported {} products to {}", count, file.display());
        }
        Commands::Import { file } => {
            let products = jsonl::read_jsonl_latest(&file)?;
            let summary = service
                .import_all(&products)
                .with_context(|| format!("Failed to import products from {}", file.display()))?;
            println!(
                "Imported {} products from {} ({} already present)",
                summary.imported,
                file.display(),
                summary.skipped
            );
        }
    }

    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

fn print_product(product: &Product) {
    println!("  {} {}", format!("{:<12}", "id:").dimmed(), product.id);
    println!("  {} {}", format!("{:<12}", "name:").dimmed(), product.name);
    println!("  {} {}", format!("{:<12}", "description:").dimmed(), product.description_or_empty());
    println!("  {} {}", format!("{:<12}", "created:").dimmed(), format_timestamp(product.created_at));
    println!("  {} {}", format!("{:<12}", "updated:").dimmed(), format_timestamp(product.updated_at));
}

fn print_table(products: &[Product]) {
    if products.is_empty() {
        println!("{}", "No products".dimmed());
        return;
    }

    println!(
        "{}",
        format!("{:<36}  {:<50}  {:<19}  {}", "ID", "NAME", "CREATED", "DESCRIPTION").bold()
    );
    for product in products {
        println!(
            "{:<36}  {:<50}  {:<19}  {}",
            product.id.to_string(),
            product.name,
            format_timestamp(product.created_at),
            truncate(product.description_or_empty(), 40)
        );
    }
}

fn print_page_info(page: &Page) {
    println!(
        "Page {} of {} (total: {})",
        page.number, page.total_pages, page.total_count
    );
}
