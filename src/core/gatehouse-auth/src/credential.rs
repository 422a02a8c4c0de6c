//! Users, accounts, and the credentials stored by a [`Validator`](crate::Validator).

use std::fmt;

use crate::token::Token;

/// Protocol-specific account material.
///
/// Each protocol defines its own account type; the token is derived from it
/// once, when the [`Credential`] is built.
pub trait Account: fmt::Debug + Send + Sync + 'static {
    /// Token type this account authenticates with.
    type Token: Token;

    /// Derives the token identifying this account.
    fn token(&self) -> Self::Token;
}

/// A provisioned proxy user.
#[derive(Debug, Clone)]
pub struct User<A> {
    /// Email used as the user's label. Empty for anonymous users.
    pub email: String,
    /// Policy level.
    pub level: u32,
    /// Protocol account.
    pub account: A,
}

impl<A> User<A> {
    /// Creates a user.
    pub fn new(email: impl Into<String>, level: u32, account: A) -> Self {
        Self {
            email: email.into(),
            level,
            account,
        }
    }

    /// Creates a user without a label.
    pub fn anonymous(level: u32, account: A) -> Self {
        Self::new(String::new(), level, account)
    }
}

/// A user together with the token resolved from its account.
pub struct Credential<A: Account> {
    token: A::Token,
    user: User<A>,
}

impl<A: Account> Credential<A> {
    /// Builds the credential for `user`, resolving its token.
    pub fn new(user: User<A>) -> Self {
        let token = user.account.token();
        Self { token, user }
    }

    /// Token this credential is indexed by.
    pub fn token(&self) -> &A::Token {
        &self.token
    }

    /// Label as provisioned (not case-folded). Empty for anonymous users.
    pub fn label(&self) -> &str {
        &self.user.email
    }

    /// Returns `true` if the credential has a label.
    pub fn is_labeled(&self) -> bool {
        !self.user.email.is_empty()
    }

    /// The stored user.
    pub fn user(&self) -> &User<A> {
        &self.user
    }

    /// The user's protocol account.
    pub fn account(&self) -> &A {
        &self.user.account
    }

    /// The user's policy level.
    pub fn level(&self) -> u32 {
        self.user.level
    }
}

impl<A: Account> From<User<A>> for Credential<A> {
    fn from(user: User<A>) -> Self {
        Self::new(user)
    }
}

impl<A: Account> fmt::Debug for Credential<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.token)
            .field("email", &self.user.email)
            .field("level", &self.user.level)
            .finish()
    }
}
