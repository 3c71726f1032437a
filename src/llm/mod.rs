//! LLM module for matchday
//!
//! Turns fixtures into prompts and prompts into insights via AWS Bedrock.

mod bedrock;
mod client;
mod prompts;

pub use bedrock::BedrockClient;
pub use client::{build_generator, Completion, InsightGenerator};
pub use prompts::{build_fixture_prompt, NO_EVENTS_FALLBACK};
