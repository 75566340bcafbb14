//! Fixed reference data: merchants, the signed-in user and the assistant.

use once_cell::sync::Lazy;
use serde::Serialize;

/// A merchant the user can chat with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Store {
    pub id: &'static str,
    pub name: &'static str,
    pub avatar: &'static str,
    pub last_message: &'static str,
    pub unread: u32,
    pub products: &'static [&'static str],
}

impl Store {
    /// Case-insensitive substring match over the store name and its products
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .products
                .iter()
                .any(|product| product.to_lowercase().contains(&query))
    }
}

/// The signed-in shopper
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: &'static str,
    pub email: &'static str,
    pub avatar: &'static str,
    pub member_since: &'static str,
}

/// Identity used for replies when no merchant is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantIdentity {
    pub name: &'static str,
    pub avatar: &'static str,
}

pub const MARKETPLACE_NAME: &str = "VoyageMart";
pub const MARKETPLACE_TAGLINE: &str = "Set Sail for Endless Shopping Adventures";

static STORES: Lazy<Vec<Store>> = Lazy::new(|| {
    vec![
        Store {
            id: "1",
            name: "Nautical Treasures",
            avatar: "/placeholder.svg?height=40&width=40&text=NT",
            last_message: "Do you have any vintage compasses?",
            unread: 2,
            products: &["Vintage Compass", "Antique Map"],
        },
        Store {
            id: "2",
            name: "Ocean Apparel",
            avatar: "/placeholder.svg?height=40&width=40&text=OA",
            last_message: "When will the new swimwear collection arrive?",
            unread: 0,
            products: &["Swimwear", "Beach Towels"],
        },
        Store {
            id: "3",
            name: "Sailor's Delight",
            avatar: "/placeholder.svg?height=40&width=40&text=SD",
            last_message: "Is the captain's hat in stock?",
            unread: 1,
            products: &["Captain's Hat", "Sailor's Rope"],
        },
        Store {
            id: "4",
            name: "Voyage Essentials",
            avatar: "/placeholder.svg?height=40&width=40&text=VE",
            last_message: "Do you offer waterproof bags?",
            unread: 0,
            products: &["Waterproof Bag", "Travel Journal"],
        },
        Store {
            id: "5",
            name: "Maritime Collectibles",
            avatar: "/placeholder.svg?height=40&width=40&text=MC",
            last_message: "I'm looking for model ships.",
            unread: 3,
            products: &["Model Ship", "Nautical Decor"],
        },
    ]
});

static USER: UserProfile = UserProfile {
    name: "Jack Sparrow",
    email: "jack.sparrow@voyagemart.com",
    avatar: "/placeholder.svg?height=40&width=40",
    member_since: "May 2021",
};

static ASSISTANT: AssistantIdentity = AssistantIdentity {
    name: "Amy",
    avatar: "/placeholder.svg?height=40&width=40&text=Amy",
};

/// All stores in catalog order
pub fn stores() -> &'static [Store] {
    &STORES
}

/// Look up a store by its identifier
pub fn find_store(id: &str) -> Option<&'static Store> {
    STORES.iter().find(|store| store.id == id)
}

/// Resolve a store by id, falling back to a case-insensitive name match
pub fn resolve_store(reference: &str) -> Option<&'static Store> {
    let reference = reference.trim();
    find_store(reference).or_else(|| {
        STORES
            .iter()
            .find(|store| store.name.eq_ignore_ascii_case(reference))
    })
}

/// Stores whose name or products contain `query`, in catalog order.
/// An empty query matches everything.
pub fn filter_catalog(query: &str) -> Vec<&'static Store> {
    STORES.iter().filter(|store| store.matches(query)).collect()
}

pub fn user_profile() -> &'static UserProfile {
    &USER
}

pub fn assistant() -> &'static AssistantIdentity {
    &ASSISTANT
}
