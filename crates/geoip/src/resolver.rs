//! Country resolution against a GeoLite2 database.
//!
//! The database is read fully into memory at startup and never mutated
//! afterwards, so a single [`CountryDb`] can be shared across consumer
//! tasks behind an `Arc` without locking.

use crate::error::{Error, Result};
use maxminddb::{geoip2, Reader};
use std::net::{IpAddr, ToSocketAddrs};
use std::path::Path;

/// Read-only IP-to-country lookup.
///
/// This is the seam between the enrichment transform and the database:
/// production code uses [`CountryDb`], tests can substitute an in-memory
/// table.
pub trait CountryLookup: Send + Sync {
    /// Country display name for the address, if the database covers it.
    fn country(&self, ip: IpAddr) -> Result<String>;
}

/// MaxMind GeoLite2 Country database, held fully in memory.
pub struct CountryDb {
    reader: Reader<Vec<u8>>,
}

impl CountryDb {
    /// Load the database from a `.mmdb` file.
    ///
    /// Any I/O or format error here is a startup failure; callers are
    /// expected to abort rather than join the consumer group without a
    /// working database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::open_readfile(path)?;
        tracing::debug!(
            "Loaded {} database with {} nodes",
            reader.metadata.database_type,
            reader.metadata.node_count
        );
        Ok(Self { reader })
    }

    /// Resolve a textual address (IP literal or hostname) to a country name.
    pub fn resolve(&self, source: &str) -> Result<String> {
        let ip = resolve_host(source)?;
        self.country(ip)
    }
}

impl CountryLookup for CountryDb {
    fn country(&self, ip: IpAddr) -> Result<String> {
        let record: geoip2::Country = self
            .reader
            .lookup(ip)
            .map_err(|e| Error::Lookup(e.to_string()))?
            .ok_or(Error::NoRecord(ip))?;

        // Entries for anonymous or satellite ranges can match without
        // carrying country names; treat those the same as no coverage.
        record
            .country
            .and_then(|c| c.names)
            .and_then(|names| names.get("en").map(|name| name.to_string()))
            .ok_or(Error::NoRecord(ip))
    }
}

/// Turn a source string into an IP address.
///
/// IP literals parse directly. Hostname-shaped strings go through the
/// system resolver; everything else is rejected as an invalid address.
pub fn resolve_host(source: &str) -> Result<IpAddr> {
    if let Ok(ip) = source.parse::<IpAddr>() {
        return Ok(ip);
    }

    if !is_hostname(source) {
        return Err(Error::InvalidAddress(source.to_string()));
    }

    let mut addrs = (source, 0u16)
        .to_socket_addrs()
        .map_err(|_| Error::AddressResolution(source.to_string()))?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| Error::AddressResolution(source.to_string()))
}

/// RFC 1123 shape check, enough to keep garbage away from the resolver.
fn is_hostname(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_resolve_host_ipv4_literal() {
        let ip = resolve_host("8.8.8.8").unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)));
    }

    #[test]
    fn test_resolve_host_ipv6_literal() {
        let ip = resolve_host("2001:4860:4860::8888").unwrap();
        assert_eq!(
            ip,
            IpAddr::V6(Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888))
        );
    }

    #[test]
    fn test_resolve_host_rejects_garbage() {
        let err = resolve_host("not an ip").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));

        let err = resolve_host("").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));

        let err = resolve_host("bad_host!name").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[test]
    fn test_resolve_host_loopback_name() {
        // Resolves via the hosts file, no network needed.
        let ip = resolve_host("localhost").unwrap();
        assert!(ip.is_loopback());
    }

    #[test]
    fn test_hostname_shape() {
        assert!(is_hostname("example.com"));
        assert!(is_hostname("telnet-gw-01.internal"));
        assert!(!is_hostname(".example.com"));
        assert!(!is_hostname("-bad.example.com"));
        assert!(!is_hostname("spaces are bad"));
    }
}
