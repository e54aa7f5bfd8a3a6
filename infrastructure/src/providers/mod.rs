//! LLM provider adapters
//!
//! Only the deterministic mock ships with the harness; real provider clients
//! plug in by implementing [`LlmGateway`](ablation_application::LlmGateway).

mod mock;

pub use mock::MockLlmGateway;
