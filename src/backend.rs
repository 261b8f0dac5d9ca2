//! The operating system's name resolution facility.

use std::{io, net::IpAddr};

use bitflags::bitflags;
use dns_lookup::{getaddrinfo, lookup_addr, AddrFamily, AddrInfoHints, SockType};

bitflags! {
    /// Address families a forward lookup asks for.
    ///
    /// Both families are requested by default. An empty set is treated like the full set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Families: u8 {
        const IPV4 = 1 << 0;
        const IPV6 = 1 << 1;
    }
}

impl Families {
    /// The single family containing `ip`.
    pub fn of(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Families::IPV4,
            IpAddr::V6(_) => Families::IPV6,
        }
    }

    /// Returns whether `ip` belongs to one of the requested families.
    #[cfg(test)]
    pub(crate) fn admits(self, ip: IpAddr) -> bool {
        self.is_empty() || self.contains(Families::of(ip))
    }

    /// The `ai_family` hint matching this set: a single family, or unspecified.
    fn hint(self) -> Option<AddrFamily> {
        if self == Families::IPV4 {
            Some(AddrFamily::Inet)
        } else if self == Families::IPV6 {
            Some(AddrFamily::Inet6)
        } else {
            None
        }
    }
}

impl Default for Families {
    fn default() -> Self {
        Families::all()
    }
}

/// One address record returned by a forward lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// An IPv4 or IPv6 address.
    Ip(IpAddr),
    /// A record whose address could not be converted, with a description of why.
    Unsupported(String),
}

/// Access to a host name resolution facility.
///
/// A [`Resolver`] calls [`Backend::startup`] once when it is constructed and [`Backend::cleanup`]
/// once when it is dropped, if and only if startup succeeded. The lookup methods are called
/// concurrently from batch workers.
///
/// [`Resolver`]: crate::resolver::Resolver
pub trait Backend: Send + Sync {
    /// Acquires whatever process-wide state the lookups need.
    fn startup(&self) -> io::Result<()> {
        Ok(())
    }

    /// Releases the state acquired by [`Backend::startup`].
    fn cleanup(&self) {}

    /// Resolves `host` to its address records.
    fn lookup_host(&self, host: &str, families: Families) -> io::Result<Vec<Record>>;

    /// Finds the host name of `ip`.
    ///
    /// Must fail instead of returning the numeric form of `ip` when no name is known.
    fn lookup_addr(&self, ip: IpAddr) -> io::Result<String>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn startup(&self) -> io::Result<()> {
        (**self).startup()
    }

    fn cleanup(&self) {
        (**self).cleanup()
    }

    fn lookup_host(&self, host: &str, families: Families) -> io::Result<Vec<Record>> {
        (**self).lookup_host(host, families)
    }

    fn lookup_addr(&self, ip: IpAddr) -> io::Result<String> {
        (**self).lookup_addr(ip)
    }
}

/// The system resolver, reached through `getaddrinfo` and `getnameinfo`.
///
/// Honors the host's resolver configuration (`/etc/hosts`, `/etc/resolv.conf`, nsswitch, the
/// Windows DNS client). It needs no per-instance setup: dns-lookup starts Winsock on its own where
/// that is required.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

impl SystemBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for SystemBackend {
    fn lookup_host(&self, host: &str, families: Families) -> io::Result<Vec<Record>> {
        // The socket type only collapses the per-socktype duplicates getaddrinfo would return.
        let mut hints = AddrInfoHints {
            socktype: SockType::Stream.into(),
            ..AddrInfoHints::default()
        };
        if let Some(family) = families.hint() {
            hints.address = family.into();
        }

        log::trace!("getaddrinfo({:?}, hints: {:?})", host, families);
        let records = getaddrinfo(Some(host), None, Some(hints))
            .map_err(io::Error::from)?
            .map(|res| match res {
                Ok(info) => Record::Ip(info.sockaddr.ip()),
                Err(e) => Record::Unsupported(e.to_string()),
            })
            .collect();
        Ok(records)
    }

    fn lookup_addr(&self, ip: IpAddr) -> io::Result<String> {
        log::trace!("getnameinfo({}, NI_NAMEREQD)", ip);
        lookup_addr(&ip)
    }
}
