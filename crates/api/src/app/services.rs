use std::sync::Arc;

use chrono::{DateTime, Utc};

use clinicops_agents::{AgentConfig, AgentContext, AgentSet};
use clinicops_infra::{BookingChain, InMemoryClinicStore};

/// Everything the handlers need, shared behind an `Extension`.
pub struct AppServices {
    store: Arc<InMemoryClinicStore>,
    agents: Arc<AgentSet<InMemoryClinicStore>>,
    booking: BookingChain,
}

impl AppServices {
    /// Fresh in-memory store with production collaborators.
    pub fn in_memory(config: AgentConfig) -> Self {
        let store = Arc::new(InMemoryClinicStore::new());
        Self::from_context(AgentContext::new(store).with_config(config))
    }

    /// Wire services around an existing context (custom clock, ids, notifier).
    pub fn from_context(ctx: AgentContext<InMemoryClinicStore>) -> Self {
        let store = Arc::clone(&ctx.repo);
        let agents = Arc::new(AgentSet::new(ctx));
        let booking = BookingChain::new(Arc::clone(&store), Arc::clone(&agents));
        Self {
            store,
            agents,
            booking,
        }
    }

    pub fn store(&self) -> &InMemoryClinicStore {
        &self.store
    }

    pub fn agents(&self) -> &Arc<AgentSet<InMemoryClinicStore>> {
        &self.agents
    }

    pub fn booking(&self) -> &BookingChain {
        &self.booking
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.agents.context().clock.now()
    }
}
