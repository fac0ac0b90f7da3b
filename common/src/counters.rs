use std::sync::atomic::{AtomicU64, Ordering};

/// Observable tallies of what the proxy did and what went wrong. Nothing here
/// feeds back into control decisions.
#[derive(Debug, Default)]
pub struct FailureCounters {
    datagrams_received: AtomicU64,
    decode_failures: AtomicU64,
    remote_failures: AtomicU64,
    unresolved_destinations: AtomicU64,
    send_failures: AtomicU64,
    instructions_sent: AtomicU64,
    stale_warnings: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub datagrams_received: u64,
    pub decode_failures: u64,
    pub remote_failures: u64,
    pub unresolved_destinations: u64,
    pub send_failures: u64,
    pub instructions_sent: u64,
    pub stale_warnings: u64,
}

impl FailureCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn datagram_received(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_failed(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remote_failed(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn destination_unresolved(&self) {
        self.unresolved_destinations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn send_failed(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn instruction_sent(&self) {
        self.instructions_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_warning(&self) {
        self.stale_warnings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            unresolved_destinations: self.unresolved_destinations.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            instructions_sent: self.instructions_sent.load(Ordering::Relaxed),
            stale_warnings: self.stale_warnings.load(Ordering::Relaxed),
        }
    }
}
