//! Collaborators injected into every agent run: repository, clock, id
//! generator, notifier and tunables.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use clinicops_core::{CaseId, PurchaseOrderId};

use crate::repository::ClinicRepository;

/// Source of "now" for an agent run.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable instant, for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Mints ids for records created by agents.
pub trait IdGenerator: Send + Sync + 'static {
    fn case_id(&self) -> CaseId;
    fn purchase_order_id(&self) -> PurchaseOrderId;
}

/// UUIDv7 (time-ordered) ids.
#[derive(Debug, Default, Copy, Clone)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn case_id(&self) -> CaseId {
        CaseId::from_uuid(Uuid::now_v7())
    }

    fn purchase_order_id(&self) -> PurchaseOrderId {
        PurchaseOrderId::from_uuid(Uuid::now_v7())
    }
}

/// Deterministic ids (`case-1`, `po-2`, ...) sharing one counter.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn case_id(&self) -> CaseId {
        CaseId::new(format!("case-{}", self.bump()))
    }

    fn purchase_order_id(&self) -> PurchaseOrderId {
        PurchaseOrderId::new(format!("po-{}", self.bump()))
    }
}

/// Outbound patient messaging. Delivery is out of scope: implementations
/// record or log the message.
pub trait Notifier: Send + Sync + 'static {
    fn send_whatsapp(&self, to: &str, message: &str);
}

/// Writes each message as a structured log line.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_whatsapp(&self, to: &str, message: &str) {
        info!(channel = "whatsapp", to, message, "notification logged (not delivered)");
    }
}

/// In-memory notifier for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn send_whatsapp(&self, to: &str, message: &str) {
        if let Ok(mut guard) = self.sent.lock() {
            guard.push((to.to_string(), message.to_string()));
        }
    }
}

/// Business tunables for the agents.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Bookable slots per week (8 per day × 5 days).
    pub weekly_slot_capacity: u32,
    /// Availability above this many slots counts as "good".
    pub availability_margin: i64,
    /// Items with quantity strictly below this are low stock.
    pub low_stock_threshold: u64,
    /// More low-stock items than this is critical.
    pub critical_low_stock_count: usize,
    /// Fixed quantity for every replenishment order.
    pub reorder_quantity: u64,
    /// More unpaid invoices than this escalates follow-up.
    pub unpaid_escalation_count: usize,
    /// Advertised gap until the next scheduled run.
    pub run_interval: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            weekly_slot_capacity: 40,
            availability_margin: 10,
            low_stock_threshold: 5,
            critical_low_stock_count: 3,
            reorder_quantity: 100,
            unpaid_escalation_count: 5,
            run_interval: Duration::hours(24),
        }
    }
}

/// Everything an agent needs for one run.
pub struct AgentContext<R> {
    pub repo: Arc<R>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub notifier: Arc<dyn Notifier>,
    pub config: AgentConfig,
}

impl<R> Clone for AgentContext<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
            notifier: Arc::clone(&self.notifier),
            config: self.config.clone(),
        }
    }
}

impl<R: ClinicRepository> AgentContext<R> {
    /// Production defaults: system clock, UUIDv7 ids, log-only notifier.
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIdGenerator),
            notifier: Arc::new(LogNotifier),
            config: AgentConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn next_run(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.config.run_interval
    }
}
