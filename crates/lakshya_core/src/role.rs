//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Author of a message in a conversation.
///
/// # Examples
///
/// ```
/// use lakshya_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::Tool), "Tool");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation
    System,
    /// The student
    User,
    /// The model (the backend calls this role "model")
    #[serde(alias = "model")]
    Assistant,
    /// Results returned from tool invocations
    Tool,
}
