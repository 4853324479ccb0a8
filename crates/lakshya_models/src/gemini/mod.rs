//! Google Gemini REST integration.

mod client;
mod conversion;
mod dto;
mod sse;

pub use client::GeminiBackend;
pub use dto::{
    GeminiCandidate, GeminiContent, GeminiFunctionCall, GeminiFunctionResponse, GeminiPart,
    GeminiRequest, GeminiResponse,
};
pub use sse::SseDecoder;
