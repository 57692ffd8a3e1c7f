use rolegate_auth::SessionContext;
use rolegate_core::SessionId;

use crate::cookies::Flash;

/// Per-request context, built by the session middleware and handed to every
/// handler as an extension.
///
/// `session` is present only for a live (unexpired) session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    session: Option<(SessionId, SessionContext)>,
    flash: Option<Flash>,
}

impl RequestContext {
    pub fn new(session: Option<(SessionId, SessionContext)>, flash: Option<Flash>) -> Self {
        Self { session, flash }
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref().map(|(_, s)| s)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|(id, _)| *id)
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }
}
