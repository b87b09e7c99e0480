//! Alias resolution
//!
//! Maps the many ways a user refers to a debt, bill, or provider ("my
//! slate card", "chase slate") onto one canonical identifier. Tables are
//! immutable once built and injected into the parser — there is no
//! module-level shared state, so deployments can customize vocabularies
//! and tests can run in isolation.

use crate::config::{CashFlowConfig, UserProfile};

/// Result of resolving free text against an alias table
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The canonical name of the best match
    pub name: String,
    /// Whether the match was exact (vs. substring)
    pub exact: bool,
    /// Other canonical names that also matched; non-empty means the
    /// resolution was ambiguous
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone)]
struct AliasEntry {
    canonical: String,
    /// Lowercased lexical variants, including the canonical name itself
    aliases: Vec<String>,
}

/// An immutable many-variants-to-one-name lookup table
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

/// Generic words that never identify an entity on their own
const STOPWORDS: &[&str] = &[
    "card", "credit", "debit", "loan", "bill", "payment", "account", "the", "with",
];

/// Derive lexical variants from a canonical name: the full lowercased
/// name plus each distinctive word in it.
fn derive_aliases(canonical: &str) -> Vec<String> {
    let full = canonical.to_lowercase();
    let mut aliases = vec![full.clone()];
    for word in full.split_whitespace() {
        if word.len() > 3 && !STOPWORDS.contains(&word) && !aliases.iter().any(|a| a == word) {
            aliases.push(word.to_string());
        }
    }
    aliases
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canonical name with derived aliases
    pub fn insert(&mut self, canonical: impl Into<String>) {
        let canonical = canonical.into();
        let aliases = derive_aliases(&canonical);
        self.entries.push(AliasEntry { canonical, aliases });
    }

    /// Add a canonical name with extra hand-picked variants
    pub fn insert_with(&mut self, canonical: impl Into<String>, extra: &[&str]) {
        let canonical = canonical.into();
        let mut aliases = derive_aliases(&canonical);
        for variant in extra {
            let v = variant.to_lowercase();
            if !aliases.contains(&v) {
                aliases.push(v);
            }
        }
        self.entries.push(AliasEntry { canonical, aliases });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve free text to a canonical name.
    ///
    /// Case-insensitive, exact-then-substring: when the whole text equals
    /// an alias that entry wins outright; otherwise every entry with an
    /// alias occurring inside the text matches. The first match is
    /// resolved and the rest are surfaced as alternatives.
    pub fn resolve(&self, text: &str) -> Option<Resolution> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let exact: Vec<&AliasEntry> = self
            .entries
            .iter()
            .filter(|e| e.aliases.iter().any(|a| *a == needle))
            .collect();

        let (matched, was_exact) = if exact.is_empty() {
            let sub: Vec<&AliasEntry> = self
                .entries
                .iter()
                .filter(|e| e.aliases.iter().any(|a| needle.contains(a.as_str())))
                .collect();
            (sub, false)
        } else {
            (exact, true)
        };

        let mut names: Vec<String> = Vec::new();
        for entry in matched {
            if !names.contains(&entry.canonical) {
                names.push(entry.canonical.clone());
            }
        }

        let mut names = names.into_iter();
        let name = names.next()?;
        Some(Resolution {
            name,
            exact: was_exact,
            alternatives: names.collect(),
        })
    }
}

/// The full vocabulary injected into the parser
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    pub debts: AliasTable,
    pub bills: AliasTable,
    pub providers: AliasTable,
    pub installments: AliasTable,
}

impl Lexicon {
    /// Build the vocabulary from the configuration and profile
    pub fn from_sources(config: &CashFlowConfig, profile: &UserProfile) -> Self {
        let mut debts = AliasTable::new();
        for debt in &profile.debts {
            debts.insert(debt.name.clone());
        }

        let mut bills = AliasTable::new();
        for name in config.recurring_weekly.keys() {
            bills.insert(name.clone());
        }
        for name in config.recurring_monthly.keys() {
            bills.insert(name.clone());
        }

        let mut providers = AliasTable::new();
        for name in config.providers.keys() {
            providers.insert(name.clone());
        }

        let mut installments = AliasTable::new();
        for name in config.installments.keys() {
            installments.insert(name.clone());
        }

        Self {
            debts,
            bills,
            providers,
            installments,
        }
    }
}
