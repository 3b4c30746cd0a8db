mod anthropic;
mod base;
mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiCompatClient;

pub(crate) use base::normalize_v1_base_url;
