use crate::catalog::{MARKETPLACE_NAME, Store};

pub const ASSISTANT_GREETING: &str =
    "Hi there! I'm Amy, your VoyageMart assistant. Choose a merchant to start shopping at VoyageMart!";

const SHIPPING_REPLY: &str =
    "We offer free shipping on orders over $50. Standard shipping takes 3-5 business days.";

const RETURN_REPLY: &str =
    "Our return policy allows returns within 30 days of purchase. Please keep the original packaging.";

const IMAGE_REPLY: &str =
    "Thank you for sharing the image. Our team will review it and get back to you shortly.";

const GENERIC_REPLY: &str =
    "Thank you for your message. Our customer service team will get back to you shortly.";

/// Opening message a merchant sends when the user picks it
pub fn store_greeting(store: &Store) -> String {
    format!(
        "Welcome to {} customer service! How can we help you today?",
        store.name
    )
}

/// Pick the canned reply for a submitted turn.
///
/// Predicates are plain substring tests on the lowercased text and the first
/// match wins, so "hi" also fires for words like "shipping" or "this".
pub fn canned_reply(text: &str, image_count: usize, active_store: Option<&Store>) -> String {
    let text = text.to_lowercase();

    if text.contains("hello") || text.contains("hi") {
        let name = active_store.map_or(MARKETPLACE_NAME, |store| store.name);
        format!("Hello! Welcome to {name}. How can I help you today?")
    } else if text.contains("shipping") {
        SHIPPING_REPLY.to_string()
    } else if text.contains("return") {
        RETURN_REPLY.to_string()
    } else if image_count > 0 {
        IMAGE_REPLY.to_string()
    } else {
        GENERIC_REPLY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_store;

    #[test]
    fn greeting_names_the_active_store() {
        let store = find_store("2");
        assert_eq!(
            canned_reply("Hello there", 0, store),
            "Hello! Welcome to Ocean Apparel. How can I help you today?"
        );
    }

    #[test]
    fn greeting_falls_back_to_marketplace() {
        assert_eq!(
            canned_reply("HELLO", 0, None),
            "Hello! Welcome to VoyageMart. How can I help you today?"
        );
    }

    #[test]
    fn greeting_wins_over_shipping() {
        let reply = canned_reply("hi, what about shipping", 0, None);
        assert!(reply.starts_with("Hello! Welcome to"));
    }

    #[test]
    fn shipping_word_alone_still_hits_greeting() {
        // "shipping" contains "hi"
        let reply = canned_reply("Shipping?", 0, None);
        assert!(reply.starts_with("Hello!"));
    }

    #[test]
    fn return_policy() {
        assert_eq!(canned_reply("Can I RETURN a coat?", 0, None), RETURN_REPLY);
    }

    #[test]
    fn return_wins_over_images() {
        assert_eq!(canned_reply("return", 2, None), RETURN_REPLY);
    }

    #[test]
    fn image_acknowledgement_without_text() {
        assert_eq!(canned_reply("", 1, None), IMAGE_REPLY);
    }

    #[test]
    fn generic_acknowledgement() {
        assert_eq!(canned_reply("Do you sell maps?", 0, None), GENERIC_REPLY);
        assert_eq!(canned_reply("", 0, None), GENERIC_REPLY);
    }
}
