use std::{fmt, io, net::IpAddr};

/// Reasons a lookup produced no result.
///
/// The sentinel-returning methods on [`Resolver`] never hand these out; they are recorded in the
/// diagnostics sink instead. The `try_*` methods return them directly.
///
/// [`Resolver`]: crate::resolver::Resolver
#[derive(Debug)]
#[non_exhaustive]
pub enum LookupError {
    /// The backend's startup failed when the resolver was constructed.
    NotInitialized,
    /// An empty hostname was passed to a forward lookup.
    EmptyHostname,
    /// A batch lookup was started with no hostnames.
    EmptyBatch,
    /// The system resolver reported an error for `query`.
    Backend { query: String, source: io::Error },
    /// The system resolver succeeded, but none of its records could be converted.
    NoAddresses { host: String },
    /// The input of a reverse lookup is neither an IPv4 nor an IPv6 address.
    InvalidAddress { input: String },
    /// The name found by a reverse lookup does not resolve back to the address.
    Unverified { addr: IpAddr, name: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotInitialized => f.write_str("resolver backend not initialized"),
            LookupError::EmptyHostname => f.write_str("hostname is empty"),
            LookupError::EmptyBatch => f.write_str("no hostnames provided for batch resolution"),
            LookupError::Backend { query, source } => write!(f, "{} ({})", source, query),
            LookupError::NoAddresses { host } => write!(f, "no IP addresses resolved for {}", host),
            LookupError::InvalidAddress { input } => {
                write!(f, "could not resolve IP {}: not an IP address", input)
            }
            LookupError::Unverified { addr, name } => write!(
                f,
                "could not verify IP {}: {} does not resolve back to it",
                addr, name
            ),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LookupError> for io::Error {
    fn from(e: LookupError) -> io::Error {
        match e {
            LookupError::Backend { source, .. } => source,
            LookupError::NotInitialized => io::Error::new(io::ErrorKind::Other, e.to_string()),
            LookupError::EmptyHostname
            | LookupError::EmptyBatch
            | LookupError::InvalidAddress { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
            }
            LookupError::NoAddresses { .. } | LookupError::Unverified { .. } => {
                io::Error::new(io::ErrorKind::NotFound, e.to_string())
            }
        }
    }
}
