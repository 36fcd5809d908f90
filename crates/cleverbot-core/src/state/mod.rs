//! Conversation state domain module.
//!
//! # Module Structure
//!
//! - `model`: Root and sub-conversation state (`RootState`, `SubState`)
//! - `mood`: Mood tuning parameters (`Mood`, `Moods`)
//! - `reply`: Reply fields decoded from the API (`ReplyData`)

mod model;
mod mood;
mod reply;

pub use model::{
    ConversationId, ConversationOptions, ConversationView, Conversations, Overrides, RootState,
    SubState,
};
pub use mood::{Mood, Moods};
pub use reply::{Interaction, ReplyData};
