// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Operator authentication.
//!
//! [`authenticate`] maps `Authorization: Bearer <token>` to an [`ActingUser`]
//! and stores it in the request extensions. Handlers read it back through
//! [`RequestOperator`]; no handler ever takes a user name from a JSON body.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::agent::ActingUser;
use crate::domain::outcome::OperationOutcome;
use crate::domain::server_config::OperatorConfig;

/// Bearer token to operator lookup table.
#[derive(Debug, Clone, Default)]
pub struct OperatorDirectory {
    tokens: HashMap<String, ActingUser>,
}

impl OperatorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration. Operators whose `env:` token is unset are
    /// skipped with a warning.
    pub fn from_config(operators: &[OperatorConfig]) -> Self {
        let mut directory = Self::new();
        for operator in operators {
            match operator.resolved_token() {
                Some(token) => directory.insert(token, ActingUser::new(operator.username.clone())),
                None => warn!(username = %operator.username, "Operator token not resolvable, skipping"),
            }
        }
        directory
    }

    pub fn insert(&mut self, token: impl Into<String>, user: ActingUser) {
        self.tokens.insert(token.into(), user);
    }

    pub fn lookup(&self, token: &str) -> Option<ActingUser> {
        self.tokens.get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub async fn authenticate(
    State(directory): State<Arc<OperatorDirectory>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| directory.lookup(token.trim()));

    match user {
        Some(user) => {
            debug!(user = %user, path = %request.uri().path(), "Operator authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(OperationOutcome::failure("unauthorized")),
        )
            .into_response(),
    }
}

/// Acting user bound to the current request, if the auth layer set one.
#[derive(Debug, Clone)]
pub struct RequestOperator(pub Option<ActingUser>);

impl<S> FromRequestParts<S> for RequestOperator
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<ActingUser>().cloned()))
    }
}
