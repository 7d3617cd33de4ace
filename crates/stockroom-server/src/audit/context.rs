//! Who and where a mutation came from
//!
//! Every command receives an [`AuditContext`] explicitly. HTTP handlers get
//! one by extraction; background work uses [`AuditContext::system`].

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use uuid::Uuid;

use super::models::IP_ADDRESS_MAX_LENGTH;
use crate::middleware::auth::Actor;

/// Request origin attached to every audit record
///
/// # Example
///
/// ```
/// use stockroom_server::audit::AuditContext;
/// use uuid::Uuid;
///
/// let ctx = AuditContext::system()
///     .with_actor(Uuid::new_v4())
///     .with_origin_address("10.0.0.7");
///
/// assert!(ctx.actor_id.is_some());
/// assert!(ctx.origin_agent.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditContext {
    pub actor_id: Option<Uuid>,
    pub origin_address: Option<String>,
    pub origin_agent: Option<String>,
}

impl AuditContext {
    /// Context for mutations not triggered by a request (seeding, maintenance)
    #[must_use]
    pub const fn system() -> Self {
        Self {
            actor_id: None,
            origin_address: None,
            origin_agent: None,
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    #[must_use]
    pub fn with_origin_address(mut self, address: impl Into<String>) -> Self {
        let address: String = address.into();
        self.origin_address = Some(address.chars().take(IP_ADDRESS_MAX_LENGTH).collect());
        self
    }

    #[must_use]
    pub fn with_origin_agent(mut self, agent: impl Into<String>) -> Self {
        self.origin_agent = Some(agent.into());
        self
    }

    pub fn is_system(&self) -> bool {
        self.actor_id.is_none() && self.origin_address.is_none() && self.origin_agent.is_none()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuditContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mut ctx = AuditContext::system();

        if let Some(actor) = parts.extensions.get::<Actor>() {
            ctx = ctx.with_actor(actor.id);
        }

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            ctx = ctx.with_origin_address(addr.ip().to_string());
        }

        if let Some(agent) = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
        {
            ctx = ctx.with_origin_agent(agent);
        }

        Ok(ctx)
    }
}
