//! Chat turn orchestration for StudyLab.
//!
//! Two layers:
//!
//! - [`accumulator`] — pure request construction: the recency window and
//!   the ordered merge of persona, course context, history, and the new
//!   utterance.
//! - [`engine`] — the side-effecting turn loop around the model provider:
//!   cached course context, graceful degradation on history outages, and
//!   exchange recording with strictly increasing timestamps.

pub mod accumulator;
pub mod engine;

pub use accumulator::{build_request, recency_window};
pub use engine::{ChatEngine, ChatReply};
