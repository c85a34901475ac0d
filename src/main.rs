//! pool-router
//!
//! Drives connection requests through the data source registry against an
//! in-memory directory described by a TOML file, and reports which pools
//! served them.
//!
//! ```text
//!   config.toml ──▶ loader ──▶ InMemoryDirectory ([[pools]])
//!                          └─▶ DataSourceRegistry ([data_sources])
//!
//!   workers (spawn_blocking) ──▶ registry.connection(policy) ──▶ pool
//!                                                  │
//!                                     JSON summary ◀┘
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::{Parser, ValueEnum};

use pool_router::config::loader::load_config;
use pool_router::observability;
use pool_router::registry::{InMemoryConnection, InMemoryDirectory};
use pool_router::{DataSourceRegistry, Policy, PolicyCatalog, RegistryError, RoutedConnection, TrafficClass};

#[derive(Parser)]
#[command(name = "pool-router")]
#[command(about = "Route connection requests across interchangeable data source pools", long_about = None)]
struct Cli {
    /// Path to the TOML configuration.
    #[arg(short, long, default_value = "pool-router.toml")]
    config: PathBuf,

    /// Load balancing policy.
    #[arg(short, long, value_enum, default_value_t = PolicyArg::RoundRobin)]
    policy: PolicyArg,

    /// Routing key for the key-sticky policy.
    #[arg(short, long)]
    key: Option<String>,

    /// Traffic class to request connections for.
    #[arg(long, value_enum, default_value_t = ClassArg::Primary)]
    class: ClassArg,

    /// Total number of connection requests.
    #[arg(short = 'n', long, default_value_t = 100)]
    requests: usize,

    /// Number of concurrent workers.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    PassThrough,
    RoundRobin,
    Weighted,
    KeySticky,
}

#[derive(Clone, Copy, ValueEnum)]
enum ClassArg {
    Primary,
    Export,
    Repository,
}

impl From<ClassArg> for TrafficClass {
    fn from(arg: ClassArg) -> Self {
        match arg {
            ClassArg::Primary => TrafficClass::Primary,
            ClassArg::Export => TrafficClass::Export,
            ClassArg::Repository => TrafficClass::Repository,
        }
    }
}

type Registry = DataSourceRegistry<InMemoryDirectory>;

fn request(
    registry: &Registry,
    class: TrafficClass,
    policy: &Policy,
) -> Result<RoutedConnection<InMemoryConnection>, RegistryError> {
    match class {
        TrafficClass::Primary => registry.connection(policy),
        TrafficClass::Export => registry.export_connection(policy),
        TrafficClass::Repository => registry.repository_connection(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    observability::logging::init(&config.observability)?;
    observability::metrics::describe();

    tracing::info!(
        config = %cli.config.display(),
        pools = config.pools.len(),
        default = %config.data_sources.default,
        "Configuration loaded"
    );

    let directory = InMemoryDirectory::from_config(&config.pools);
    let settings = Arc::new(ArcSwap::from_pointee(config.data_sources.clone()));
    let registry = Arc::new(Registry::new(directory.clone(), Arc::new(directory), settings));

    let catalog = PolicyCatalog::new();
    let policy = match cli.policy {
        PolicyArg::PassThrough => catalog.pass_through(),
        PolicyArg::RoundRobin => catalog.round_robin(),
        PolicyArg::Weighted => catalog.weighted_round_robin(),
        PolicyArg::KeySticky => {
            let key = cli.key.as_deref().ok_or("--key is required for the key-sticky policy")?;
            catalog.key_sticky(key)?
        }
    };

    let class = TrafficClass::from(cli.class);
    let workers = cli.workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let count = cli.requests / workers + usize::from(worker < cli.requests % workers);
        let registry = registry.clone();
        let policy = policy.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            (0..count)
                .map(|_| {
                    request(&registry, class, &policy)
                        .map(|conn| conn.backend().to_string())
                        .map_err(|e| e.to_string())
                })
                .collect::<Vec<_>>()
        }));
    }

    let mut served: BTreeMap<String, usize> = BTreeMap::new();
    let mut errors: BTreeMap<String, usize> = BTreeMap::new();
    for handle in handles {
        for outcome in handle.await? {
            match outcome {
                Ok(backend) => *served.entry(backend).or_default() += 1,
                Err(e) => *errors.entry(e).or_default() += 1,
            }
        }
    }

    let summary = serde_json::json!({
        "class": class.as_str(),
        "policy": policy.name(),
        "requests": cli.requests,
        "state": format!("{:?}", registry.state(class)),
        "backends": registry.backend_names(class),
        "served": served,
        "errors": errors,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    tracing::info!("Done");
    Ok(())
}
