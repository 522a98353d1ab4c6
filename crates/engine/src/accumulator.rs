//! The conversation accumulator — pure request construction.
//!
//! Builds the ordered message sequence submitted to the model for one
//! turn: persona first, then a system turn carrying the course context,
//! then the selected recency window in original chronological order, then
//! the new user utterance last. Persona and context anchor every request
//! regardless of how much history exists; history never reorders relative
//! to its creation sequence.

use studylab_core::persona::Persona;
use studylab_core::turn::Turn;

/// Select the last `window` turns of `history` in chronological order.
///
/// Returns all of them when fewer exist; `window == 0` selects none.
pub fn recency_window(history: &[Turn], window: usize) -> &[Turn] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

/// Build the assembled request for one turn.
///
/// The context turn is omitted entirely when `context` is empty: with no
/// course material the request falls back to the persona alone rather
/// than carrying an empty system message.
pub fn build_request(
    persona: &Persona,
    context: &str,
    window: &[Turn],
    utterance: &str,
) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(window.len() + 3);

    turns.push(Turn::system(persona.render()));

    if !context.is_empty() {
        turns.push(Turn::system(context));
    }

    turns.extend(window.iter().cloned());
    turns.push(Turn::user(utterance));

    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use studylab_core::turn::Role;

    fn history(n: usize) -> Vec<Turn> {
        (1..=n).map(|i| Turn::user(format!("T{i}"))).collect()
    }

    #[test]
    fn window_selects_most_recent_in_order() {
        let turns = history(4);
        let window = recency_window(&turns, 2);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "T3");
        assert_eq!(window[1].content, "T4");
    }

    #[test]
    fn window_larger_than_history_takes_all() {
        let turns = history(3);
        assert_eq!(recency_window(&turns, 10).len(), 3);
    }

    #[test]
    fn zero_window_selects_none() {
        let turns = history(3);
        assert!(recency_window(&turns, 0).is_empty());
    }

    #[test]
    fn request_order_is_persona_context_history_utterance() {
        let persona = Persona::default_persona();
        let window = history(2);
        let request = build_request(&persona, "[Course Order]\n1. a", &window, "What's next?");

        assert_eq!(request.len(), 5);
        assert_eq!(request[0].role, Role::System);
        assert!(request[0].content.starts_with("You are StudyLab"));
        assert_eq!(request[1].role, Role::System);
        assert!(request[1].content.starts_with("[Course Order]"));
        assert_eq!(request[2].content, "T1");
        assert_eq!(request[3].content, "T2");
        assert_eq!(request[4].role, Role::User);
        assert_eq!(request[4].content, "What's next?");
    }

    #[test]
    fn empty_context_omits_context_turn() {
        let persona = Persona::default_persona();
        let request = build_request(&persona, "", &[], "Hello");

        assert_eq!(request.len(), 2);
        assert_eq!(request[0].role, Role::System);
        assert_eq!(request[1].role, Role::User);
    }

    #[test]
    fn zero_window_still_includes_persona_context_utterance() {
        let persona = Persona::default_persona();
        let turns = history(4);
        let window = recency_window(&turns, 0);
        let request = build_request(&persona, "context text", window, "Hi");

        assert_eq!(request.len(), 3);
        assert!(request.iter().all(|t| !t.content.starts_with("T")));
    }

    #[test]
    fn history_is_cloned_not_reordered() {
        let persona = Persona::default_persona();
        let mut turns = history(3);
        turns.push(Turn::assistant("A1"));
        let request = build_request(&persona, "ctx", &turns, "next");

        let contents: Vec<&str> = request.iter().map(|t| t.content.as_str()).collect();
        let t1 = contents.iter().position(|c| *c == "T1").unwrap();
        let t3 = contents.iter().position(|c| *c == "T3").unwrap();
        let a1 = contents.iter().position(|c| *c == "A1").unwrap();
        assert!(t1 < t3 && t3 < a1);
    }
}
