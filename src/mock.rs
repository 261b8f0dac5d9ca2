//! Scriptable [`Backend`] for tests.

use std::{
    collections::HashMap,
    io,
    net::IpAddr,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use crate::backend::{Backend, Families, Record};

#[derive(Default)]
pub(crate) struct MockBackend {
    hosts: HashMap<String, Vec<Record>>,
    names: HashMap<IpAddr, String>,
    fail_startup: bool,
    delay: Option<Duration>,
    pub(crate) startups: AtomicUsize,
    pub(crate) cleanups: AtomicUsize,
    pub(crate) host_calls: AtomicUsize,
    pub(crate) addr_calls: AtomicUsize,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes `host` resolve to `addrs`. Hosts that were never added fail to resolve.
    pub(crate) fn host(self, host: &str, addrs: &[&str]) -> Self {
        let records = addrs
            .iter()
            .map(|addr| Record::Ip(addr.parse().unwrap()))
            .collect();
        self.records(host, records)
    }

    pub(crate) fn records(mut self, host: &str, records: Vec<Record>) -> Self {
        self.hosts.insert(host.to_string(), records);
        self
    }

    pub(crate) fn name(mut self, ip: &str, name: &str) -> Self {
        self.names.insert(ip.parse().unwrap(), name.to_string());
        self
    }

    pub(crate) fn failing_startup(mut self) -> Self {
        self.fail_startup = true;
        self
    }

    /// Sleeps in every forward lookup, so that lookups running on different workers overlap.
    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl Backend for MockBackend {
    fn startup(&self) -> io::Result<()> {
        self.startups.fetch_add(1, Ordering::SeqCst);
        if self.fail_startup {
            Err(io::Error::new(io::ErrorKind::Other, "startup refused"))
        } else {
            Ok(())
        }
    }

    fn cleanup(&self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the scripted records of `host`, dropping addresses outside `families` the way an
    /// `ai_family` hint would.
    fn lookup_host(&self, host: &str, families: Families) -> io::Result<Vec<Record>> {
        self.host_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        let records = self.hosts.get(host).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Name or service not known")
        })?;
        Ok(records
            .iter()
            .filter(|record| match record {
                Record::Ip(ip) => families.admits(*ip),
                Record::Unsupported(_) => true,
            })
            .cloned()
            .collect())
    }

    fn lookup_addr(&self, ip: IpAddr) -> io::Result<String> {
        self.addr_calls.fetch_add(1, Ordering::SeqCst);
        self.names.get(&ip).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Name or service not known")
        })
    }
}
