//! Resolver configuration.

use std::{env, fmt, num::NonZeroUsize, path::PathBuf, sync::Arc};

use crate::{
    backend::{Backend, Families, SystemBackend},
    diag::{Diagnostics, FileSink},
    resolver::Resolver,
    DEFAULT_LOG_FILE,
};

/// Environment variable overriding the number of batch workers.
pub const WORKERS_ENV: &str = "HOSTLOOKUP_WORKERS";
/// Environment variable overriding the diagnostics log path.
pub const LOG_FILE_ENV: &str = "HOSTLOOKUP_LOG_FILE";

/// Builder for a [`Resolver`].
///
/// By default, the resolver asks for IPv4 and IPv6 addresses, runs one batch worker per available
/// CPU, and appends diagnostics to [`DEFAULT_LOG_FILE`] in the working directory.
pub struct ResolverBuilder {
    workers: Option<NonZeroUsize>,
    families: Families,
    log_file: PathBuf,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            workers: None,
            families: Families::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            diagnostics: None,
        }
    }

    /// Sets the number of worker threads used by [`Resolver::resolve_batch`].
    ///
    /// Without this, the host's available parallelism is used.
    pub fn workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Restricts forward lookups to the given address families.
    pub fn families(mut self, families: Families) -> Self {
        self.families = families;
        self
    }

    /// Sets the file diagnostics are appended to.
    ///
    /// Ignored if a sink was supplied with [`ResolverBuilder::diagnostics`].
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    /// Routes diagnostics to `sink` instead of a log file.
    pub fn diagnostics(mut self, sink: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Applies overrides from [`WORKERS_ENV`] and [`LOG_FILE_ENV`].
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = var(WORKERS_ENV) {
            match value.trim().parse::<NonZeroUsize>() {
                Ok(workers) => self.workers = Some(workers),
                Err(e) => log::warn!("ignoring {}={:?}: {}", WORKERS_ENV, value, e),
            }
        }
        if let Some(path) = var(LOG_FILE_ENV) {
            if path.is_empty() {
                log::warn!("ignoring empty {}", LOG_FILE_ENV);
            } else {
                self.log_file = path.into();
            }
        }
        self
    }

    /// Builds a resolver that uses the system resolver.
    pub fn build(self) -> Resolver {
        self.build_with(SystemBackend::new())
    }

    /// Builds a resolver on top of a custom [`Backend`].
    pub fn build_with<B: Backend>(self, backend: B) -> Resolver<B> {
        let diagnostics = match self.diagnostics {
            Some(sink) => sink,
            None => Arc::new(FileSink::new(self.log_file)),
        };
        Resolver::from_parts(backend, diagnostics, self.families, self.workers)
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResolverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBuilder")
            .field("workers", &self.workers)
            .field("families", &self.families)
            .field("log_file", &self.log_file)
            .field("custom_diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}
