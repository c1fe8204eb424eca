//! Process-wide counters shared by the codec and the address resolver

use std::sync::atomic::{AtomicU64, Ordering};

use crate::protocol::{MessageType, Protocol};

/// Track codec and resolver counters without external dependencies.
pub(crate) struct Metrics;

static ENCODED_MESSAGES: AtomicU64 = AtomicU64::new(0);
static DECODED_MESSAGES: AtomicU64 = AtomicU64::new(0);
static CODEC_ERRORS: AtomicU64 = AtomicU64::new(0);
static HOSTNAME_LOOKUPS: AtomicU64 = AtomicU64::new(0);
static HOSTNAME_LOOKUP_FAILURES: AtomicU64 = AtomicU64::new(0);

struct ProtocolCounters {
    session: AtomicU64,
    service_log: AtomicU64,
    service_control: AtomicU64,
    consensus: AtomicU64,
    snapshot: AtomicU64,
}

static PROTOCOL_COUNTERS: ProtocolCounters = ProtocolCounters::new();

impl ProtocolCounters {
    const fn new() -> Self {
        Self {
            session: AtomicU64::new(0),
            service_log: AtomicU64::new(0),
            service_control: AtomicU64::new(0),
            consensus: AtomicU64::new(0),
            snapshot: AtomicU64::new(0),
        }
    }

    fn increment(&self, protocol: Protocol) {
        let counter = match protocol {
            Protocol::Session => &self.session,
            Protocol::ServiceLog => &self.service_log,
            Protocol::ServiceControl => &self.service_control,
            Protocol::Consensus => &self.consensus,
            Protocol::Snapshot => &self.snapshot,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Direction of message flow through the codec.
#[derive(Clone, Copy)]
pub(crate) enum MessageDirection {
    Encoded,
    Decoded,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_message(direction: MessageDirection, msg_type: MessageType) {
        match direction {
            MessageDirection::Encoded => {
                ENCODED_MESSAGES.fetch_add(1, Ordering::Relaxed);
            }
            MessageDirection::Decoded => {
                DECODED_MESSAGES.fetch_add(1, Ordering::Relaxed);
            }
        }
        PROTOCOL_COUNTERS.increment(msg_type.protocol());
    }

    #[inline]
    pub(crate) fn record_error() {
        CODEC_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_hostname_lookup(succeeded: bool) {
        HOSTNAME_LOOKUPS.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            HOSTNAME_LOOKUP_FAILURES.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            encoded_messages: ENCODED_MESSAGES.load(Ordering::Relaxed),
            decoded_messages: DECODED_MESSAGES.load(Ordering::Relaxed),
            codec_errors: CODEC_ERRORS.load(Ordering::Relaxed),
            session_messages: PROTOCOL_COUNTERS.session.load(Ordering::Relaxed),
            service_log_messages: PROTOCOL_COUNTERS.service_log.load(Ordering::Relaxed),
            service_control_messages: PROTOCOL_COUNTERS.service_control.load(Ordering::Relaxed),
            consensus_messages: PROTOCOL_COUNTERS.consensus.load(Ordering::Relaxed),
            snapshot_messages: PROTOCOL_COUNTERS.snapshot.load(Ordering::Relaxed),
            hostname_lookups: HOSTNAME_LOOKUPS.load(Ordering::Relaxed),
            hostname_lookup_failures: HOSTNAME_LOOKUP_FAILURES.load(Ordering::Relaxed),
        }
    }
}

/// Lightweight snapshot of process-wide counters.
#[derive(Default, Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    /// Messages encoded successfully
    pub encoded_messages: u64,
    /// Messages decoded successfully
    pub decoded_messages: u64,
    /// Encode or decode failures
    pub codec_errors: u64,
    /// Session protocol messages, both directions
    pub session_messages: u64,
    /// Service log messages, both directions
    pub service_log_messages: u64,
    /// Service control messages, both directions
    pub service_control_messages: u64,
    /// Consensus messages, both directions
    pub consensus_messages: u64,
    /// Snapshot entities, both directions
    pub snapshot_messages: u64,
    /// Hostname lookups sent to the resolution hook
    pub hostname_lookups: u64,
    /// Hostname lookups that produced no usable address
    pub hostname_lookup_failures: u64,
}

impl MetricsSnapshot {
    /// Share of hostname lookups that failed, if any were made.
    #[must_use]
    pub fn lookup_failure_ratio(&self) -> Option<f64> {
        if self.hostname_lookups == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        Some(self.hostname_lookup_failures as f64 / self.hostname_lookups as f64)
    }
}

/// Read the current process-wide counters.
#[must_use]
pub fn metrics_snapshot() -> MetricsSnapshot {
    Metrics::totals()
}
