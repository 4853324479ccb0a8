//! Counselor chat, content tools and structured flows for Lakshya.
//!
//! Everything here sits on top of
//! [`ResilientGenerationClient`](lakshya_rate_limit::ResilientGenerationClient):
//!
//! - [`CounselorChat`] streams counselor replies through a
//!   [`StreamAccumulator`] and saves each session in the background
//! - [`FlowRunner`] runs single-shot [`Flow`]s that reply with JSON
//! - [`ToolRegistry`] lets the model look up colleges, careers, exams and
//!   scholarships in a [`DocumentStore`](lakshya_interface::DocumentStore)
//! - [`TemplateRenderer`] fills prompt templates from configuration

#![forbid(unsafe_code)]

mod accumulator;
mod chat;
mod extraction;
pub mod flows;
mod runner;
mod template;
mod tools;

pub use accumulator::{AccumulatorHandle, StreamAccumulator, spawn_accumulator};
pub use chat::{
    CHAT_SESSIONS_COLLECTION, COUNSELOR_TEMPLATE, ChatSessionDocument, ChatTurn, CounselorChat,
    StudentProfile, TurnStatus,
};
pub use extraction::extract_json;
pub use flows::{Flow, FlowKind};
pub use runner::FlowRunner;
pub use template::{TemplateRenderer, render_template};
pub use tools::{
    DEFAULT_RESULT_LIMIT, FindCareersArgs, FindCollegesArgs, FindExamsArgs, FindScholarshipsArgs,
    MAX_RESULT_LIMIT, ToolArgs, ToolInvocation, ToolLoopOutcome, ToolName, ToolOutput,
    ToolRegistry, run_with_tools,
};
