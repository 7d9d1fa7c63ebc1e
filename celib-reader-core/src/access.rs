use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A catalog title the viewer can be asked to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub title: String,
    pub locator: String,
    #[serde(default)]
    pub price_cents: u64,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            locator: locator.into(),
            price_cents: 0,
        }
    }

    pub fn with_price(mut self, price_cents: u64) -> Self {
        self.price_cents = price_cents;
        self
    }

    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }
}

/// Titles the current user has purchased
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    purchased: HashSet<String>,
}

impl Entitlements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, id: impl Into<String>) {
        self.purchased.insert(id.into());
    }

    /// Free titles are always unlocked.
    pub fn is_unlocked(&self, document: &DocumentRef) -> bool {
        document.is_free() || self.purchased.contains(&document.id)
    }
}

impl<S: Into<String>> FromIterator<S> for Entitlements {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            purchased: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_titles_are_unlocked() {
        let book = DocumentRef::new("b1", "Free Book", "free.pdf");
        assert!(Entitlements::new().is_unlocked(&book));
    }

    #[test]
    fn paid_titles_need_a_purchase() {
        let book = DocumentRef::new("b2", "Paid Book", "paid.pdf").with_price(499);
        let mut entitlements = Entitlements::new();
        assert!(!entitlements.is_unlocked(&book));

        entitlements.grant("b2");
        assert!(entitlements.is_unlocked(&book));
    }

    #[test]
    fn collects_from_ids() {
        let entitlements: Entitlements = ["a", "b"].into_iter().collect();
        let book = DocumentRef::new("b", "B", "b.pdf").with_price(100);
        assert!(entitlements.is_unlocked(&book));
    }
}
