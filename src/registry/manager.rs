//! Data source registry.
//!
//! # Responsibilities
//! - Build each traffic class's backend list on first use, exactly once
//! - Keep the default pool at index 0 of the primary list
//! - Derive pool weights from their declared capacity
//! - Dispatch connection requests to the caller's policy

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::load_balancer::{Backend, LoadBalancer, Policy, DEFAULT_WEIGHT};
use crate::observability::metrics;
use crate::registry::slot::{BackendList, BackendSlot};
use crate::registry::{
    AttributeReader, ClassState, ConfigurationError, ConnectionSource, DataSourceSettings,
    Directory, LookupError, RegistryError, TrafficClass,
};

type SourceOf<D> = <D as Directory>::Source;
type ConnectionOf<D> = <SourceOf<D> as ConnectionSource>::Connection;

/// A connection together with the name of the pool that served it.
#[derive(Debug)]
pub struct RoutedConnection<C> {
    backend: String,
    connection: C,
}

impl<C> RoutedConnection<C> {
    pub fn new(backend: impl Into<String>, connection: C) -> Self {
        Self {
            backend: backend.into(),
            connection,
        }
    }

    /// Name of the pool the connection came from.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn into_inner(self) -> C {
        self.connection
    }
}

impl<C> Deref for RoutedConnection<C> {
    type Target = C;
    fn deref(&self) -> &C {
        &self.connection
    }
}

impl<C> DerefMut for RoutedConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.connection
    }
}

/// Chooses a pool per request and opens a connection from it.
pub struct DataSourceRegistry<D: Directory> {
    directory: D,
    attributes: Arc<dyn AttributeReader>,
    settings: Arc<dyn DataSourceSettings>,
    primary: BackendSlot<SourceOf<D>>,
    export: BackendSlot<SourceOf<D>>,
    repository: BackendSlot<SourceOf<D>>,
}

impl<D: Directory> DataSourceRegistry<D> {
    pub fn new(
        directory: D,
        attributes: Arc<dyn AttributeReader>,
        settings: Arc<dyn DataSourceSettings>,
    ) -> Self {
        Self {
            directory,
            attributes,
            settings,
            primary: BackendSlot::new(TrafficClass::Primary),
            export: BackendSlot::new(TrafficClass::Export),
            repository: BackendSlot::new(TrafficClass::Repository),
        }
    }

    /// Open a connection for query traffic.
    pub fn connection(&self, policy: &Policy) -> Result<RoutedConnection<ConnectionOf<D>>, RegistryError> {
        let backends = self.primary.get_or_try_init(|| self.build_primary())?;
        self.open(TrafficClass::Primary, backends, policy)
    }

    /// Open a connection for export traffic.
    pub fn export_connection(&self, policy: &Policy) -> Result<RoutedConnection<ConnectionOf<D>>, RegistryError> {
        let backends = self.export.get_or_try_init(|| {
            let name = self.settings.export_backend_name();
            Ok(vec![self.resolve_required(TrafficClass::Export, name)?])
        })?;
        self.open(TrafficClass::Export, backends, policy)
    }

    /// Open a connection from the repository pool. No balancing applies.
    pub fn repository_connection(&self) -> Result<RoutedConnection<ConnectionOf<D>>, RegistryError> {
        let backends = self.repository.get_or_try_init(|| {
            let name = self.settings.repository_backend_name();
            Ok(vec![self.resolve_required(TrafficClass::Repository, name)?])
        })?;
        self.open(TrafficClass::Repository, backends, &Policy::PassThrough)
    }

    /// Current state of a traffic class.
    pub fn state(&self, class: TrafficClass) -> ClassState {
        self.slot(class).state()
    }

    /// Ordered pool names of a ready traffic class.
    pub fn backend_names(&self, class: TrafficClass) -> Option<Vec<String>> {
        self.slot(class)
            .get()
            .map(|backends| backends.iter().map(|b| b.name().to_string()).collect())
    }

    /// Backends of a ready traffic class.
    pub fn backends(&self, class: TrafficClass) -> Option<&[Arc<Backend<SourceOf<D>>>]> {
        self.slot(class).get()
    }

    fn slot(&self, class: TrafficClass) -> &BackendSlot<SourceOf<D>> {
        match class {
            TrafficClass::Primary => &self.primary,
            TrafficClass::Export => &self.export,
            TrafficClass::Repository => &self.repository,
        }
    }

    fn open(
        &self,
        class: TrafficClass,
        backends: &[Arc<Backend<SourceOf<D>>>],
        policy: &Policy,
    ) -> Result<RoutedConnection<ConnectionOf<D>>, RegistryError> {
        let backend = match backends {
            [only] => only.clone(),
            _ => policy
                .next_server(backends)
                .ok_or(RegistryError::NoBackends(class))?,
        };

        tracing::debug!(
            class = %class,
            policy = policy.name(),
            backend = backend.name(),
            candidates = backends.len(),
            "Data source selected"
        );
        metrics::record_selection(class, policy.name(), backend.name());

        match backend.open() {
            Ok(connection) => Ok(RoutedConnection::new(backend.name(), connection)),
            Err(e) => {
                tracing::warn!(class = %class, backend = backend.name(), error = %e, "Failed to open connection");
                metrics::record_connection_error(class, backend.name());
                Err(e.into())
            }
        }
    }

    /// Default pool first, then every additional pool that resolves.
    fn build_primary(&self) -> Result<BackendList<SourceOf<D>>, ConfigurationError> {
        let default = self.resolve_required(TrafficClass::Primary, self.settings.default_backend_name())?;
        let mut backends = vec![default];

        for name in self.settings.extra_backend_names() {
            if backends.iter().any(|b| b.name() == name) {
                tracing::warn!(name = %name, "Data source configured more than once, ignoring duplicate");
                continue;
            }
            match self.resolve_backend(&name) {
                Ok(backend) => {
                    tracing::debug!(name = %name, weight = backend.weight(), "Additional data source found");
                    backends.push(backend);
                }
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Problem accessing additional configured data source, omitting it");
                }
            }
        }
        Ok(backends)
    }

    fn resolve_required(
        &self,
        class: TrafficClass,
        name: Option<String>,
    ) -> Result<Arc<Backend<SourceOf<D>>>, ConfigurationError> {
        let name = name.ok_or(ConfigurationError::Missing { class })?;
        self.resolve_backend(&name)
            .map_err(|source| ConfigurationError::Unresolvable { class, name, source })
    }

    fn resolve_backend(&self, name: &str) -> Result<Arc<Backend<SourceOf<D>>>, LookupError> {
        let source = self.directory.resolve(name)?;
        let weight = resolve_weight(self.attributes.as_ref(), name);
        Ok(Arc::new(Backend::new(name, weight, source)))
    }
}

/// Weight of a pool from its maximum pool size, or [`DEFAULT_WEIGHT`] when
/// the attribute is unreadable, not a number, or zero.
pub fn resolve_weight(attributes: &dyn AttributeReader, name: &str) -> u32 {
    match attributes.pool_max_size(name) {
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(weight) if weight > 0 => weight,
            _ => {
                tracing::warn!(
                    name = %name,
                    max_pool_size = %raw,
                    default = DEFAULT_WEIGHT,
                    "Unusable MaxPoolSize for data source, using default weight"
                );
                DEFAULT_WEIGHT
            }
        },
        Err(e) => {
            tracing::warn!(
                name = %name,
                error = %e,
                default = DEFAULT_WEIGHT,
                "Exception accessing properties of data source, using default weight"
            );
            DEFAULT_WEIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSourceConfig;
    use crate::load_balancer::PolicyCatalog;
    use crate::registry::InMemoryDirectory;

    const DEFAULT_POOL: &str = "dwhrep/jdbc/eniqPool";

    fn registry(directory: &InMemoryDirectory, additional: &str) -> DataSourceRegistry<InMemoryDirectory> {
        let settings = DataSourceConfig {
            default: DEFAULT_POOL.into(),
            additional: additional.into(),
            export: "csv/jdbc/exportPool".into(),
            repository: "repdb/jdbc/repPool".into(),
        };
        DataSourceRegistry::new(directory.clone(), Arc::new(directory.clone()), Arc::new(settings))
    }

    #[test]
    fn test_no_extra_data_sources() {
        let directory = InMemoryDirectory::new();
        directory.bind(DEFAULT_POOL, Some("3".into()));
        let registry = registry(&directory, "");

        let conn = registry.connection(&PolicyCatalog::new().round_robin()).unwrap();
        assert_eq!(conn.backend(), DEFAULT_POOL);
        assert_eq!(registry.backend_names(TrafficClass::Primary).unwrap(), [DEFAULT_POOL]);
    }

    #[test]
    fn test_default_data_source_always_first() {
        let directory = InMemoryDirectory::new();
        directory.bind("jdbcResource1", Some("5".into()));
        directory.bind("jdbcResource2", Some("5".into()));
        directory.bind(DEFAULT_POOL, Some("5".into()));
        let registry = registry(&directory, "jdbcResource1,jdbcResource2");

        registry.connection(&PolicyCatalog::new().pass_through()).unwrap();
        assert_eq!(
            registry.backend_names(TrafficClass::Primary).unwrap(),
            [DEFAULT_POOL, "jdbcResource1", "jdbcResource2"]
        );
    }

    #[test]
    fn test_pass_through_uses_default_with_many_pools() {
        let directory = InMemoryDirectory::new();
        for name in [DEFAULT_POOL, "eniqPool1", "eniqPool2", "eniqPool3", "eniqPool4", "eniqPool5"] {
            directory.bind(name, None);
        }
        let registry = registry(&directory, "eniqPool1,eniqPool2,eniqPool3,eniqPool4,eniqPool5");

        for _ in 0..10 {
            let conn = registry.connection(&Policy::PassThrough).unwrap();
            assert_eq!(conn.backend(), DEFAULT_POOL);
        }
        assert_eq!(directory.pool(DEFAULT_POOL).unwrap().opened(), 10);
    }

    #[test]
    fn test_attribute_failure_uses_default_weight() {
        let directory = InMemoryDirectory::new();
        directory.bind(DEFAULT_POOL, None);
        directory.bind("zeroPool", Some("0".into()));
        directory.bind("textPool", Some("lots".into()));
        directory.bind("bigPool", Some(" 40 ".into()));
        let registry = registry(&directory, "zeroPool,textPool,bigPool");

        registry.connection(&Policy::PassThrough).unwrap();
        let weights: Vec<u32> = registry
            .backends(TrafficClass::Primary)
            .unwrap()
            .iter()
            .map(|b| b.weight())
            .collect();
        assert_eq!(weights, [DEFAULT_WEIGHT, DEFAULT_WEIGHT, DEFAULT_WEIGHT, 40]);
    }

    #[test]
    fn test_duplicate_names_are_skipped() {
        let directory = InMemoryDirectory::new();
        directory.bind(DEFAULT_POOL, None);
        directory.bind("eniqPool1", None);
        let registry = registry(&directory, &format!("eniqPool1,{},eniqPool1", DEFAULT_POOL));

        registry.connection(&Policy::PassThrough).unwrap();
        assert_eq!(
            registry.backend_names(TrafficClass::Primary).unwrap(),
            [DEFAULT_POOL, "eniqPool1"]
        );
    }

    #[test]
    fn test_single_pool_never_consults_policy() {
        let directory = InMemoryDirectory::new();
        directory.bind(DEFAULT_POOL, None);
        let registry = registry(&directory, "");
        let catalog = PolicyCatalog::new();

        for _ in 0..3 {
            registry.connection(&catalog.round_robin()).unwrap();
        }
        // The shared cursor was never advanced by the registry
        let probe = crate::load_balancer::test_support::pools(2);
        assert_eq!(catalog.round_robin().next_server(&probe).unwrap().name(), "pool1");
    }

    #[test]
    fn test_connection_error_is_propagated() {
        let directory = InMemoryDirectory::new();
        directory.bind(DEFAULT_POOL, None).set_failing(true);
        let registry = registry(&directory, "");

        let err = registry.connection(&Policy::PassThrough).unwrap_err();
        match err {
            RegistryError::Connection(e) => assert_eq!(e.backend, DEFAULT_POOL),
            other => panic!("unexpected error: {other}"),
        }
        // Initialization itself succeeded
        assert_eq!(registry.state(TrafficClass::Primary), ClassState::Ready { backends: 1 });
    }

    #[test]
    fn test_classes_are_independent() {
        let directory = InMemoryDirectory::new();
        directory.bind(DEFAULT_POOL, None);
        let registry = registry(&directory, "");
        let policy = Policy::PassThrough;

        registry.connection(&policy).unwrap();
        assert!(matches!(
            registry.export_connection(&policy),
            Err(RegistryError::Configuration(ConfigurationError::Unresolvable { class: TrafficClass::Export, .. }))
        ));
        assert_eq!(registry.state(TrafficClass::Export), ClassState::Failed { attempts: 1 });
        assert_eq!(registry.state(TrafficClass::Repository), ClassState::Uninitialized);

        directory.bind("csv/jdbc/exportPool", None);
        directory.bind("repdb/jdbc/repPool", None);
        assert_eq!(registry.export_connection(&policy).unwrap().backend(), "csv/jdbc/exportPool");
        assert_eq!(registry.repository_connection().unwrap().backend(), "repdb/jdbc/repPool");
        assert_eq!(registry.backend_names(TrafficClass::Primary).unwrap(), [DEFAULT_POOL]);
    }
}
