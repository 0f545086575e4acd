use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use trade_value_scanner::{
    config::Config,
    domain::{
        group, order_duplicates, Basis, Catalog, ItemIdentity, ItemInstance, SideTotals,
        SimilaritySort, TradeSide, TradeState,
    },
    error::{Error, Result},
    infra::{CacheStatus, CatalogClient},
    util::{
        parse_timestamp,
        persistence::{load_persisted_state_at, save_persisted_state_at, state_path, PersistSaveError},
    },
};

#[derive(Parser)]
#[command(name = "trade-value-scanner", version, about = "Compare trade sides and find items of similar value")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show both sides with totals and the difference
    Totals,
    /// List catalog items worth about as much as one side
    Similar(SimilarArgs),
    /// Put a catalog item on a side
    Add {
        #[arg(long, value_enum)]
        side: SideArg,
        #[arg(long)]
        id: u64,
        #[arg(long)]
        variant: Option<String>,
        /// Unix seconds or RFC 3339
        #[arg(long)]
        acquired_at: Option<String>,
    },
    /// Take an item instance off a side
    Remove {
        #[arg(long, value_enum)]
        side: SideArg,
        #[arg(long)]
        key: String,
    },
    /// Value an instance clean or duped
    Basis {
        #[arg(long, value_enum)]
        side: SideArg,
        #[arg(long)]
        key: String,
        #[arg(value_enum)]
        basis: BasisArg,
    },
    /// Copy one side onto the other
    Mirror {
        #[arg(long, value_enum)]
        from: SideArg,
    },
    /// Exchange the two sides
    Swap,
    /// Empty a side
    Clear {
        #[arg(long, value_enum)]
        side: SideArg,
    },
}

#[derive(Args)]
struct SimilarArgs {
    #[arg(long, value_enum, default_value = "offer")]
    side: SideArg,
    #[arg(long)]
    range: Option<f64>,
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long)]
    sort: Option<SimilaritySort>,
    /// Compare duped values; items without one are skipped
    #[arg(long)]
    duped: bool,
    /// Only items of this category
    #[arg(long = "type")]
    type_filter: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Offer,
    Request,
}

impl From<SideArg> for TradeSide {
    fn from(value: SideArg) -> Self {
        match value {
            SideArg::Offer => TradeSide::Offer,
            SideArg::Request => TradeSide::Request,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BasisArg {
    Clean,
    Duped,
}

impl From<BasisArg> for Basis {
    fn from(value: BasisArg) -> Self {
        match value {
            BasisArg::Clean => Basis::Clean,
            BasisArg::Duped => Basis::Duped,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };
    config.logging.init();

    if let Err(err) = run(cli.command, &config).await {
        tracing::error!(error = %err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let path = path.cloned().or_else(Config::default_path);
    match path {
        Some(path) => Ok(Config::load_or_default(path)?),
        None => Ok(Config::default()),
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let path = state_path();
    let path = path.as_deref();
    let mut state = TradeState::default();
    if let Some(saved) = path.and_then(load_persisted_state_at) {
        state.apply_persisted(saved);
    }

    match command {
        Command::Totals => {
            print_side(&state, TradeSide::Offer);
            print_side(&state, TradeSide::Request);
            print_difference(state.difference());
            Ok(())
        }
        Command::Similar(args) => {
            let catalog = load_catalog(config).await?;
            sync_with_catalog(&mut state, &catalog, path)?;
            let side: TradeSide = args.side.into();

            let mut options = config.search.options();
            if let Some(range) = args.range {
                options.range = range;
            }
            if let Some(limit) = args.limit {
                options.limit = limit;
            }
            if let Some(sort) = args.sort {
                options.sort = sort;
            }
            if args.duped {
                options.basis = Basis::Duped;
            }
            options.type_filter = args.type_filter;

            let target = state.totals(side).total;
            println!(
                "Items near {} ({}) within ±{} [{}]",
                format_amount(target),
                side.label(),
                format_amount(options.range),
                options.sort.label()
            );
            let candidates = state.suggest(side, catalog.items(), options);
            if candidates.is_empty() {
                println!("  nothing in range");
            }
            for candidate in candidates {
                let demand = candidate.item.demand.as_deref().unwrap_or("Unknown");
                let demand_delta = candidate
                    .demand_delta
                    .map(|delta| format!(" ({delta:+})"))
                    .unwrap_or_default();
                println!(
                    "  {:<32} {:>14}  Δ {:>12}  {}{}",
                    candidate.item.display_name(),
                    format_amount(candidate.value),
                    format_amount(candidate.value_delta),
                    demand,
                    demand_delta
                );
            }
            Ok(())
        }
        Command::Add {
            side,
            id,
            variant,
            acquired_at,
        } => {
            let catalog = load_catalog(config).await?;
            sync_with_catalog(&mut state, &catalog, path)?;
            let identity = ItemIdentity::new(id, variant);
            let item = catalog
                .get(&identity)
                .cloned()
                .ok_or_else(|| Error::UnknownItem(identity.to_string()))?;
            let acquired_at = acquired_at.as_deref().and_then(|raw| {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() {
                    tracing::warn!(raw, "ignoring unparseable acquisition time");
                }
                parsed
            });

            let name = item.display_name();
            let key = state.add(side.into(), item, acquired_at);
            println!("Added {name} as {key}");
            save(&state, path)
        }
        Command::Remove { side, key } => {
            let side: TradeSide = side.into();
            if !state.remove(side, &key) {
                return Err(Error::UnknownInstance {
                    side: side.label(),
                    key,
                });
            }
            save(&state, path)
        }
        Command::Basis { side, key, basis } => {
            let side: TradeSide = side.into();
            let basis: Basis = basis.into();
            if !state.set_basis(side, &key, basis) {
                return Err(Error::UnknownInstance {
                    side: side.label(),
                    key,
                });
            }
            save(&state, path)
        }
        Command::Mirror { from } => {
            state.mirror(from.into());
            save(&state, path)
        }
        Command::Swap => {
            state.swap();
            save(&state, path)
        }
        Command::Clear { side } => {
            state.clear(side.into());
            save(&state, path)
        }
    }
}

async fn load_catalog(config: &Config) -> Result<Catalog> {
    let client = CatalogClient::with_base_url(&config.catalog.base_url)?
        .with_disk_cache(
            trade_value_scanner::infra::cache::default_cache_path(),
            config.catalog.ttl(),
        );
    let payload = client.get_catalog().await?;
    if payload.status == CacheStatus::Stale {
        eprintln!("warning: catalog could not be refreshed; values may be out of date");
    }
    Ok(payload.data)
}

/// Re-syncs held item snapshots with `catalog`, saving when anything changed.
fn sync_with_catalog(state: &mut TradeState, catalog: &Catalog, path: Option<&Path>) -> Result<usize> {
    let changed = state.refresh_from(catalog);
    if changed > 0 {
        tracing::info!(changed, "refreshed held items from catalog");
        save(state, path)?;
    }
    Ok(changed)
}

fn save(state: &TradeState, path: Option<&Path>) -> Result<()> {
    let path = path.ok_or(PersistSaveError::StorageUnavailable)?;
    save_persisted_state_at(path, &state.to_persisted())?;
    Ok(())
}

fn print_side(state: &TradeState, side: TradeSide) {
    let instances = state.side(side);
    let totals = state.totals(side);
    let ordinals = order_duplicates(instances, |instance| instance.acquired_at);

    println!("{} ({} items)", side.label(), instances.len());
    for entry in group(instances) {
        println!("  {:>3}x {}", entry.count, entry.representative.display_name());
        for instance in group_members(instances, entry.identity) {
            let ordinal = ordinals
                .get(&instance.key)
                .map(|n| format!(" #{n}"))
                .unwrap_or_default();
            println!(
                "        {}{} [{}]",
                instance.key,
                ordinal,
                state.basis_of(side, &instance.key).label()
            );
        }
    }
    print_totals(&totals);
}

fn group_members<'a>(
    instances: &'a [ItemInstance],
    identity: &'a ItemIdentity,
) -> impl Iterator<Item = &'a ItemInstance> {
    instances
        .iter()
        .filter(move |i| i.identity().grouping_key() == identity.grouping_key())
}

fn print_totals(totals: &SideTotals) {
    println!(
        "  total {}  (clean {} x {}, duped {} x {})",
        format_amount(totals.total),
        totals.breakdown.clean.count,
        format_amount(totals.breakdown.clean.sum),
        totals.breakdown.duped.count,
        format_amount(totals.breakdown.duped.sum),
    );
}

fn print_difference(difference: f64) {
    let direction = if difference > 0.0 {
        "offer is worth more"
    } else if difference < 0.0 {
        "request is worth more"
    } else {
        "even"
    };
    println!("difference {} ({direction})", format_amount(difference.abs()));
}

fn format_amount(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
