//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles keep their counters and record state behind `Arc`s so a test
//! can hand one copy to the `Reconciler` and keep another for assertions.

#![allow(dead_code)]

use ddns6_core::error::{Error, Result};
use ddns6_core::traits::{AddressSource, RecordRepository, RemoteRecord};
use ddns6_core::DomainName;
use std::io;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Parse an IPv6 literal
pub fn v6(s: &str) -> Ipv6Addr {
    s.parse().expect("valid IPv6 literal")
}

/// The domain used throughout the contract tests
pub fn test_domain() -> DomainName {
    DomainName::parse("home.example.com").expect("valid domain")
}

/// An address source that returns whatever the test sets
#[derive(Clone)]
pub struct StaticAddressSource {
    address: Arc<Mutex<Option<Ipv6Addr>>>,
    resolve_call_count: Arc<AtomicUsize>,
}

impl StaticAddressSource {
    pub fn new(address: Option<Ipv6Addr>) -> Self {
        Self {
            address: Arc::new(Mutex::new(address)),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change the address returned by later passes
    pub fn set(&self, address: Option<Ipv6Addr>) {
        *self.address.lock().unwrap() = address;
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }
}

impl AddressSource for StaticAddressSource {
    fn resolve(&self) -> Option<Ipv6Addr> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        *self.address.lock().unwrap()
    }

    fn describe(&self) -> String {
        "interface test0".to_string()
    }
}

/// An in-memory record repository that tracks calls
///
/// `create` appends a record, `update` rewrites one in place, so repeated
/// passes observe their own effects.
#[derive(Clone)]
pub struct MockRepository {
    records: Arc<Mutex<Vec<RemoteRecord>>>,
    next_id: Arc<AtomicUsize>,
    find_call_count: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<(String, Ipv6Addr)>>>,
    updated: Arc<Mutex<Vec<(String, Ipv6Addr)>>>,
    fail_find: Arc<AtomicBool>,
    fail_create: Arc<AtomicBool>,
    fail_update: Arc<AtomicBool>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(1000)),
            find_call_count: Arc::new(AtomicUsize::new(0)),
            created: Arc::new(Mutex::new(Vec::new())),
            updated: Arc::new(Mutex::new(Vec::new())),
            fail_find: Arc::new(AtomicBool::new(false)),
            fail_create: Arc::new(AtomicBool::new(false)),
            fail_update: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start with an existing record
    pub fn with_record(self, record_id: &str, label: &str, value: &str) -> Self {
        self.records
            .lock()
            .unwrap()
            .push(RemoteRecord::new(record_id, label, value));
        self
    }

    pub fn fail_find(&self, fail: bool) {
        self.fail_find.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    /// Get the number of times find() was called
    pub fn find_call_count(&self) -> usize {
        self.find_call_count.load(Ordering::SeqCst)
    }

    /// (label, address) pairs passed to create()
    pub fn created(&self) -> Vec<(String, Ipv6Addr)> {
        self.created.lock().unwrap().clone()
    }

    /// (record id, address) pairs passed to update()
    pub fn updated(&self) -> Vec<(String, Ipv6Addr)> {
        self.updated.lock().unwrap().clone()
    }

    /// Current record state
    pub fn records(&self) -> Vec<RemoteRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordRepository for MockRepository {
    async fn find(&self, host_label: &str) -> Result<Option<RemoteRecord>> {
        self.find_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "DescribeDomainRecords unavailable"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.label == host_label)
            .cloned())
    }

    async fn create(&self, host_label: &str, address: Ipv6Addr) -> Result<String> {
        self.created
            .lock()
            .unwrap()
            .push((host_label.to_string(), address));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "AddDomainRecord rejected"));
        }
        let record_id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.records.lock().unwrap().push(RemoteRecord::new(
            record_id.clone(),
            host_label,
            address.to_string(),
        ));
        Ok(record_id)
    }

    async fn update(&self, record_id: &str, address: Ipv6Addr) -> Result<()> {
        self.updated
            .lock()
            .unwrap()
            .push((record_id.to_string(), address));
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "UpdateDomainRecord rejected"));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.record_id == record_id)
            .ok_or_else(|| Error::not_found(format!("record {}", record_id)))?;
        record.value = address.to_string();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Captures formatted log output in memory
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the daemon's log format writing into this capture
    ///
    /// The returned guard keeps it installed for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = ddns6_core::logging::subscriber(tracing::Level::INFO, self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    /// Captured lines
    pub fn lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Whether any captured line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
