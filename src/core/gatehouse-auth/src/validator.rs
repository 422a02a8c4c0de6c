//! In-memory credential validator.
//!
//! Credentials are indexed twice: by token (every credential) and by
//! case-folded label (labeled credentials only). The two indices are updated
//! one after the other, so a reader racing with [`Validator::add`] or
//! [`Validator::del`] may briefly see a label whose token entry is not there
//! yet, or not there anymore. Token lookups during that window miss, which an
//! inbound treats as a rejected connection.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::credential::{Account, Credential};
use crate::error::AuthError;
use crate::token::Token;

/// Concurrent store of valid users for one inbound.
pub struct Validator<A: Account> {
    labels: DashMap<String, Arc<Credential<A>>>,
    tokens: DashMap<A::Token, Arc<Credential<A>>>,
}

fn fold(label: &str) -> String {
    label.to_lowercase()
}

impl<A: Account> Validator<A> {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self {
            labels: DashMap::new(),
            tokens: DashMap::new(),
        }
    }

    /// Adds a credential. Its label must be empty or unique.
    ///
    /// The label is claimed atomically; on a collision nothing is stored.
    /// The token entry is written unconditionally and replaces any credential
    /// already stored under the same token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateLabel`] if another credential holds the
    /// same label, compared case-insensitively.
    pub fn add(&self, credential: impl Into<Credential<A>>) -> Result<(), AuthError> {
        let credential = Arc::new(credential.into());

        if credential.is_labeled() {
            match self.labels.entry(fold(credential.label())) {
                Entry::Occupied(_) => {
                    return Err(AuthError::DuplicateLabel(credential.label().to_string()));
                },
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(&credential));
                },
            }
        }

        self.tokens
            .insert(credential.token().clone(), Arc::clone(&credential));

        debug!(email = credential.label(), level = credential.level(), "User added");
        Ok(())
    }

    /// Removes the credential holding `label`.
    ///
    /// # Errors
    ///
    /// * [`AuthError::EmptyLabel`] - `label` is empty
    /// * [`AuthError::NotFound`] - no credential holds `label`
    pub fn del(&self, label: &str) -> Result<(), AuthError> {
        if label.is_empty() {
            return Err(AuthError::EmptyLabel);
        }

        let (_, credential) = self
            .labels
            .remove(&fold(label))
            .ok_or_else(|| AuthError::NotFound(label.to_string()))?;
        self.tokens.remove(credential.token());

        debug!(email = label, "User removed");
        Ok(())
    }

    /// Looks up a credential by token.
    pub fn get(&self, token: &A::Token) -> Option<Arc<Credential<A>>> {
        self.tokens.get(token).map(|entry| Arc::clone(entry.value()))
    }

    /// Looks up a credential by label, case-insensitively.
    pub fn get_by_label(&self, label: &str) -> Option<Arc<Credential<A>>> {
        self.labels
            .get(&fold(label))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Looks up a credential by label or token.
    ///
    /// `identifier` is first matched verbatim against the label index, then
    /// parsed as a token. Text that does not parse as a token is not found.
    pub fn load(&self, identifier: &str) -> Option<Arc<Credential<A>>> {
        if let Some(entry) = self.labels.get(identifier) {
            return Some(Arc::clone(entry.value()));
        }
        let token = A::Token::parse_token(identifier)?;
        self.get(&token)
    }

    /// Returns every labeled credential keyed by its case-folded label.
    ///
    /// A label whose token entry has been removed concurrently is skipped.
    pub fn get_all(&self) -> HashMap<String, Arc<Credential<A>>> {
        let labeled: Vec<(String, Arc<Credential<A>>)> = self
            .labels
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        labeled
            .into_iter()
            .filter(|(_, credential)| self.tokens.contains_key(credential.token()))
            .collect()
    }

    /// Number of labeled credentials.
    ///
    /// Anonymous credentials are not counted.
    pub fn get_count(&self) -> usize {
        self.labels.len()
    }

    /// Case-folded labels of every labeled credential, in no particular order.
    pub fn get_all_labels(&self) -> Vec<String> {
        self.labels.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl<A: Account> Default for Validator<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Account> fmt::Debug for Validator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("labels", &self.labels.len())
            .field("tokens", &self.tokens.len())
            .finish()
    }
}
