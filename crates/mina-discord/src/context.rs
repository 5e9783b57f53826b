use std::sync::Arc;

use mina_credits::CreditGate;
use mina_pipeline::QueryPipeline;

/// Shared state every Discord handler needs.
pub struct BotContext {
    pub pipeline: Arc<QueryPipeline>,
    pub credits: Arc<dyn CreditGate>,
}
