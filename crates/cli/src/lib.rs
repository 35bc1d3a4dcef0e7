pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use commands::compare::{CompareArgs, StrategyKind};
use commands::products::{parse_spec, AddProductArgs, EditProductArgs};
use partsdesk_core::analytics::Period;
use partsdesk_core::catalog::{CatalogFilter, PriceRange, SortOrder};
use partsdesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use partsdesk_core::domain::product::ProductPatch;
use partsdesk_core::inventory::Role;

#[derive(Debug, Parser)]
#[command(
    name = "partsdesk",
    about = "PartsDesk storefront operator CLI",
    long_about = "Compare motor parts, report income and stock movement, and manage inventory.",
    after_help = "Examples:\n  partsdesk seed\n  partsdesk compare --ids 1,2,4\n  partsdesk income --period week\n  partsdesk stock --id 7 --change -1 --role staff"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load (must exist when given)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override store.data_dir")]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Score selected products side by side")]
    Compare {
        #[arg(long, value_delimiter = ',', required = true, help = "Product ids, comma separated")]
        ids: Vec<u64>,
        #[arg(long, value_enum, default_value_t = StrategyKind::Standout)]
        strategy: StrategyKind,
        #[arg(long, help = "Search term; also narrows the catalog used for price range")]
        search: Option<String>,
        #[arg(long, default_value_t = SortOrder::PriceAsc)]
        sort: SortOrder,
    },
    #[command(about = "Bucket sales income for today, this week or this month")]
    Income {
        #[arg(long, default_value_t = Period::Day)]
        period: Period,
        #[arg(long, help = "Reference instant in RFC 3339; defaults to the local clock")]
        now: Option<String>,
    },
    #[command(about = "Low stock, fast and slow movers, and top sellers")]
    Analytics,
    #[command(about = "List products with search, filters and sort")]
    Catalog {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long, help = "`min-max`, `min-+` or `min+`")]
        price_range: Option<PriceRange>,
        #[arg(long, default_value_t = SortOrder::PriceAsc)]
        sort: SortOrder,
    },
    #[command(about = "Restock (positive change) or sell (negative change) units")]
    Stock {
        #[arg(long)]
        id: u64,
        #[arg(long, allow_negative_numbers = true)]
        change: i64,
        #[arg(long, default_value = "staff")]
        role: Role,
    },
    #[command(about = "Overwrite a product's stock level")]
    SetStock {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        quantity: u32,
        #[arg(long, default_value = "staff")]
        role: Role,
    },
    #[command(about = "Add a product to the catalog (admin only)")]
    AddProduct {
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        quantity: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "spec", value_parser = parse_spec, help = "key=value, repeatable")]
        specs: Vec<(String, String)>,
        #[arg(long, default_value = "admin")]
        role: Role,
    },
    #[command(about = "Change fields of an existing product (admin only)")]
    EditProduct {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long, help = "An empty value clears the description")]
        description: Option<String>,
        #[arg(long = "spec", value_parser = parse_spec, help = "key=value, repeatable; key= removes")]
        specs: Vec<(String, String)>,
        #[arg(long, default_value = "admin")]
        role: Role,
    },
    #[command(about = "Remove a product from the catalog (admin only)")]
    DeleteProduct {
        #[arg(long)]
        id: u64,
        #[arg(long, default_value = "admin")]
        role: Role,
    },
    #[command(about = "Populate an empty local store with demo products and sales")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                data_dir: self.data_dir.clone(),
                log_level: self.log_level.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    // A broken config is reported by the command itself.
    if let Ok(config) = AppConfig::load(options.clone()) {
        logging::init_logging(&config);
    }

    let result = dispatch(cli.command, &options);
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn dispatch(command: Command, options: &LoadOptions) -> commands::CommandResult {
    match command {
        Command::Compare { ids, strategy, search, sort } => {
            commands::compare::run(options, CompareArgs { ids, strategy, search, sort })
        }
        Command::Income { period, now } => commands::income::run(options, period, now.as_deref()),
        Command::Analytics => commands::analytics::run(options),
        Command::Catalog { search, category, brand, price_range, sort } => {
            let filter = CatalogFilter { search, category, brand, price_range };
            commands::catalog::run(options, filter, sort)
        }
        Command::Stock { id, change, role } => commands::stock::adjust(options, id, change, role),
        Command::SetStock { id, quantity, role } => {
            commands::stock::set(options, id, quantity, role)
        }
        Command::AddProduct { name, brand, category, price, quantity, description, specs, role } => {
            commands::products::add(
                options,
                AddProductArgs { name, brand, category, price, quantity, description, specs, role },
            )
        }
        Command::EditProduct {
            id,
            name,
            brand,
            category,
            price,
            quantity,
            description,
            specs,
            role,
        } => {
            let patch = ProductPatch {
                name,
                brand,
                category,
                price,
                quantity,
                description,
                specs: specs.into_iter().collect(),
            };
            commands::products::edit(options, EditProductArgs { id, patch, role })
        }
        Command::DeleteProduct { id, role } => commands::products::delete(options, id, role),
        Command::Seed => commands::seed::run(options),
        Command::Config => commands::config::run(options),
    }
}
