//! Property-based tests for the session transitions

use super::*;
use crate::events::ImageBlob;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Select(String),
    Reset,
    Attach(usize),
    Remove(usize),
    Submit(String),
    Deliver,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        "[0-7]".prop_map(Action::Select),
        Just(Action::Reset),
        (0usize..4).prop_map(Action::Attach),
        (0usize..5).prop_map(Action::Remove),
        prop_oneof![
            Just(String::new()),
            Just("hello".to_string()),
            Just("return".to_string()),
            "[a-z ]{0,12}",
        ]
        .prop_map(Action::Submit),
        Just(Action::Deliver),
    ]
}

fn attachments(n: usize) -> Vec<ImageAttachment> {
    (0..n)
        .map(|i| ImageBlob::from_path(format!("img-{i}.jpg")))
        .collect()
}

fn apply(session: &mut ChatSession, queue: &mut Vec<PendingReply>, action: Action) {
    match action {
        Action::Select(id) => {
            session.select_store(&id);
        }
        Action::Reset => session.reset_conversation(),
        Action::Attach(n) => {
            session.attach_images(attachments(n));
        }
        Action::Remove(i) => {
            session.remove_attachment(i);
        }
        Action::Submit(text) => {
            if let Some(reply) = session.submit(&text) {
                queue.push(reply);
            }
        }
        Action::Deliver => {
            if !queue.is_empty() {
                let reply = queue.remove(0);
                session.deliver_reply(reply);
            }
        }
    }
}

proptest! {
    #[test]
    fn composer_enabled_iff_store_selected(actions in prop::collection::vec(arb_action(), 0..40)) {
        let mut session = ChatSession::default();
        let mut queue = Vec::new();
        for action in actions {
            apply(&mut session, &mut queue, action);
            prop_assert_eq!(session.composer_enabled(), session.active_store().is_some());
        }
    }

    #[test]
    fn no_pending_attachments_without_composer(actions in prop::collection::vec(arb_action(), 0..40)) {
        let mut session = ChatSession::default();
        let mut queue = Vec::new();
        for action in actions {
            apply(&mut session, &mut queue, action);
            if !session.composer_enabled() {
                prop_assert!(session.pending_attachments().is_empty());
            }
        }
    }

    #[test]
    fn new_conversation_has_exactly_one_greeting(
        actions in prop::collection::vec(arb_action(), 0..40),
        store in prop::option::of("[1-5]"),
    ) {
        let mut session = ChatSession::default();
        let mut queue = Vec::new();
        for action in actions {
            apply(&mut session, &mut queue, action);
        }

        let expected = match store {
            Some(id) => {
                session.select_store(&id);
                Sender::Store
            }
            None => {
                session.reset_conversation();
                Sender::Assistant
            }
        };

        prop_assert_eq!(session.messages().len(), 1);
        prop_assert_eq!(session.messages()[0].sender, expected);
        prop_assert!(session.pending_attachments().is_empty());
    }

    #[test]
    fn replies_match_the_party_they_were_generated_for(
        actions in prop::collection::vec(arb_action(), 0..40),
    ) {
        let mut session = ChatSession::default();
        let mut queue = Vec::new();
        for action in actions {
            apply(&mut session, &mut queue, action);
            for reply in &queue {
                prop_assert_ne!(reply.message.sender, Sender::User);
            }
        }

        // With the default policy, every non-user message after the greeting
        // is authored by the current party.
        let current = if session.active_store().is_some() { Sender::Store } else { Sender::Assistant };
        for message in session.messages() {
            if message.sender != Sender::User {
                prop_assert_eq!(message.sender, current);
            }
        }
    }

    #[test]
    fn submit_turns_each_attachment_into_one_user_message(n in 0usize..5, text in "[a-z]{0,6}") {
        let mut session = ChatSession::default();
        session.select_store("3");
        session.attach_images(attachments(n));

        let before = session.messages().len();
        let reply = session.submit(&text);
        let appended = session.messages().len() - before;

        let expected = usize::from(!text.trim().is_empty()) + n;
        prop_assert_eq!(appended, expected);
        prop_assert_eq!(reply.is_some(), expected > 0);
        prop_assert!(session.messages()[before..].iter().all(|m| m.sender == Sender::User));
        prop_assert!(session.pending_attachments().is_empty());
    }
}
