//! Forward and reverse host name lookups.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    num::NonZeroUsize,
    sync::Arc,
};

use crate::{
    backend::{Backend, Families, Record, SystemBackend},
    config::ResolverBuilder,
    diag::Diagnostics,
    error::LookupError,
};

/// A host name resolver backed by a [`Backend`], the system resolver by default.
///
/// Lookups never fail loudly: the sentinel methods ([`Resolver::resolve`],
/// [`Resolver::reverse_lookup`], [`Resolver::reverse_lookup_verified`] and
/// [`Resolver::resolve_batch`]) return an empty result on any failure and record the reason in
/// the configured [`Diagnostics`] sink. The `try_*` variants return the [`LookupError`] instead.
///
/// The backend is started once when the resolver is built and cleaned up once when it is dropped.
/// If startup fails, every lookup through this resolver comes back empty without reaching the
/// backend.
pub struct Resolver<B: Backend = SystemBackend> {
    pub(crate) backend: B,
    pub(crate) diagnostics: Arc<dyn Diagnostics>,
    pub(crate) families: Families,
    pub(crate) workers: Option<NonZeroUsize>,
    initialized: bool,
}

impl Resolver {
    /// Creates a resolver with the default configuration.
    pub fn new() -> Self {
        ResolverBuilder::new().build()
    }

    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Resolver<B> {
    pub(crate) fn from_parts(
        backend: B,
        diagnostics: Arc<dyn Diagnostics>,
        families: Families,
        workers: Option<NonZeroUsize>,
    ) -> Self {
        let mut this = Self {
            backend,
            diagnostics,
            families,
            workers,
            initialized: false,
        };
        match this.backend.startup() {
            Ok(()) => this.initialized = true,
            Err(e) => {
                log::error!("resolver backend startup failed: {}", e);
                this.diagnostics
                    .record(&format!("Error: resolver backend startup failed: {}", e));
            }
        }
        this
    }

    /// Returns whether the backend started successfully.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn families(&self) -> Families {
        self.families
    }

    /// Resolves `hostname` to its IP addresses.
    ///
    /// Returns an empty list if the name does not exist, the backend fails, or the resolver is
    /// not initialized. The reason is recorded in the diagnostics sink.
    pub fn resolve(&self, hostname: &str) -> Vec<IpAddr> {
        self.try_resolve(hostname).unwrap_or_else(|e| {
            self.report(&e);
            Vec::new()
        })
    }

    /// Resolves `hostname` to its IP addresses, returning the reason for an empty result.
    ///
    /// Records that cannot be converted to an address are skipped (with a warning in the
    /// diagnostics sink), and the remaining addresses are returned. If no record converts, the
    /// lookup fails with [`LookupError::NoAddresses`].
    pub fn try_resolve(&self, hostname: &str) -> Result<Vec<IpAddr>, LookupError> {
        self.resolve_families(hostname, self.families)
    }

    fn resolve_families(
        &self,
        hostname: &str,
        families: Families,
    ) -> Result<Vec<IpAddr>, LookupError> {
        if !self.initialized {
            return Err(LookupError::NotInitialized);
        }
        if hostname.is_empty() {
            return Err(LookupError::EmptyHostname);
        }

        let records =
            self.backend
                .lookup_host(hostname, families)
                .map_err(|source| LookupError::Backend {
                    query: hostname.to_string(),
                    source,
                })?;

        let mut addrs = Vec::with_capacity(records.len());
        for record in records {
            match record {
                Record::Ip(ip) => addrs.push(ip),
                Record::Unsupported(reason) => self.warn(&format!(
                    "skipping unsupported address record for {}: {}",
                    hostname, reason
                )),
            }
        }

        if addrs.is_empty() {
            return Err(LookupError::NoAddresses {
                host: hostname.to_string(),
            });
        }
        log::trace!("{} -> {:?}", hostname, addrs);
        Ok(addrs)
    }

    /// Looks up the host name of the IP address written in `addr`.
    ///
    /// Returns an empty string if `addr` is not an IP address or the backend has no name for it.
    pub fn reverse_lookup(&self, addr: &str) -> String {
        self.try_reverse_lookup(addr).unwrap_or_else(|e| {
            self.report(&e);
            String::new()
        })
    }

    /// Looks up the host name of the IP address written in `addr`, returning the reason for a
    /// failure.
    ///
    /// `addr` is parsed as IPv4 first and only then as IPv6. Once it parses as IPv4, a backend
    /// failure ends the lookup.
    pub fn try_reverse_lookup(&self, addr: &str) -> Result<String, LookupError> {
        let ip = parse_addr(addr)?;
        self.reverse_ip(addr, ip)
    }

    /// `addr` is the caller's text for `ip`, reported as written.
    fn reverse_ip(&self, addr: &str, ip: IpAddr) -> Result<String, LookupError> {
        if !self.initialized {
            return Err(LookupError::NotInitialized);
        }
        let name = self
            .backend
            .lookup_addr(ip)
            .map_err(|source| LookupError::Backend {
                query: addr.to_string(),
                source,
            })?;
        log::trace!("{} -> {}", ip, name);
        Ok(name)
    }

    /// Looks up the host name of `addr` and confirms it by resolving that name back.
    ///
    /// Returns an empty string unless the name's addresses include `addr`.
    pub fn reverse_lookup_verified(&self, addr: &str) -> String {
        self.try_reverse_lookup_verified(addr).unwrap_or_else(|e| {
            self.report(&e);
            String::new()
        })
    }

    /// Forward-confirmed reverse lookup of `addr`, returning the reason for a failure.
    pub fn try_reverse_lookup_verified(&self, addr: &str) -> Result<String, LookupError> {
        let ip = parse_addr(addr)?;
        let name = self.reverse_ip(addr, ip)?;
        let addrs = self.resolve_families(&name, Families::of(ip))?;
        if addrs.contains(&ip) {
            Ok(name)
        } else {
            log::debug!("{} resolves to {:?}, not {}", name, addrs, ip);
            Err(LookupError::Unverified { addr: ip, name })
        }
    }

    pub(crate) fn report(&self, e: &LookupError) {
        log::warn!("{}", e);
        self.diagnostics.record(&format!("Error: {}", e));
    }

    pub(crate) fn warn(&self, message: &str) {
        log::warn!("{}", message);
        self.diagnostics.record(&format!("Warning: {}", message));
    }
}

impl<B: Backend> Drop for Resolver<B> {
    fn drop(&mut self) {
        if self.initialized {
            self.backend.cleanup();
        }
    }
}

impl<B: Backend + fmt::Debug> fmt::Debug for Resolver<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("backend", &self.backend)
            .field("families", &self.families)
            .field("workers", &self.workers)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

/// Parses an address as IPv4, and if that fails, as IPv6.
fn parse_addr(addr: &str) -> Result<IpAddr, LookupError> {
    if let Ok(v4) = addr.parse::<Ipv4Addr>() {
        return Ok(IpAddr::V4(v4));
    }
    if let Ok(v6) = addr.parse::<Ipv6Addr>() {
        return Ok(IpAddr::V6(v6));
    }
    Err(LookupError::InvalidAddress {
        input: addr.to_string(),
    })
}
