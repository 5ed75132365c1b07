pub mod analyzer;
pub mod extraction;
pub mod invoker;
pub mod llm;
pub mod prompts;

pub use analyzer::{AnalyzerError, AttackAnalyzer};
pub use invoker::{InvokeError, ModelCandidate, ModelInvoker};
pub use llm::GeminiClient;
