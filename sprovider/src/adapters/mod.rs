#[cfg(feature = "backend-openai-compatible")]
pub mod openai;
