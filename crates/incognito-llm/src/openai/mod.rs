mod client;

pub use client::{CompletionResponse, CompletionsClient};
