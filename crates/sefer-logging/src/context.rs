//! Session context injection
//!
//! Thread-local storage for the current session, so every span created while
//! a [`SessionContextGuard`] is alive can be tagged with the session id and
//! the scope the user is browsing.

use std::cell::RefCell;

use sefer_core::Scope;
use uuid::Uuid;

/// Session context data stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContextData {
    /// Unique id for this session
    pub session_id: Uuid,
    /// The active scope, rendered as `level:name`
    pub scope: Option<String>,
}

thread_local! {
    static SESSION_CONTEXT: RefCell<Option<SessionContextData>> = const { RefCell::new(None) };
}

/// RAII guard for session context
///
/// Creating the guard sets the session context for the current thread.
/// Dropping it restores the previous context (if any).
///
/// # Example
///
/// ```ignore
/// use sefer_logging::SessionContextGuard;
/// use sefer_core::{Level, Scope};
///
/// let _guard = SessionContextGuard::new().with_scope(&Scope::place(Level::Zone, "Mekelle"));
/// tracing::info!("Building feed");
/// ```
pub struct SessionContextGuard {
    previous: Option<SessionContextData>,
}

impl SessionContextGuard {
    /// Start a session with a fresh id
    pub fn new() -> Self {
        Self::with_session_id(Uuid::new_v4())
    }

    /// Start a session with a known id
    pub fn with_session_id(session_id: Uuid) -> Self {
        Self::install(SessionContextData {
            session_id,
            scope: None,
        })
    }

    /// Record the scope the session is looking at
    pub fn with_scope(self, scope: &Scope) -> Self {
        Self::record_scope(scope);
        self
    }

    /// Record `scope` on the current thread's session, if one is active.
    ///
    /// Lets code deep inside a session update the scope without holding
    /// the guard.
    pub fn record_scope(scope: &Scope) {
        SESSION_CONTEXT.with(|ctx| {
            if let Some(data) = ctx.borrow_mut().as_mut() {
                data.scope = Some(scope.to_string());
            }
        });
    }

    fn install(data: SessionContextData) -> Self {
        let previous = SESSION_CONTEXT.with(|ctx| ctx.borrow_mut().replace(data));
        Self { previous }
    }

    /// Get the current session context (if any)
    pub fn current() -> Option<SessionContextData> {
        SESSION_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    pub fn current_session_id() -> Option<Uuid> {
        Self::current().map(|ctx| ctx.session_id)
    }

    pub fn current_scope() -> Option<String> {
        Self::current().and_then(|ctx| ctx.scope)
    }
}

impl Default for SessionContextGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionContextGuard {
    fn drop(&mut self) {
        SESSION_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}

/// Run a block inside a fresh session context
///
/// ```ignore
/// with_session_context!({
///     tracing::info!("Resolving selection");
/// });
/// ```
#[macro_export]
macro_rules! with_session_context {
    ($body:block) => {{
        let _guard = $crate::context::SessionContextGuard::new();
        $body
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use sefer_core::Level;

    #[test]
    fn test_session_context_guard() {
        assert!(SessionContextGuard::current().is_none());

        {
            let _guard = SessionContextGuard::new();
            let ctx = SessionContextGuard::current().unwrap();
            assert!(ctx.scope.is_none());
        }

        assert!(SessionContextGuard::current().is_none());
    }

    #[test]
    fn test_nested_contexts() {
        let outer = Uuid::new_v4();
        let inner = Uuid::new_v4();

        {
            let _outer = SessionContextGuard::with_session_id(outer);
            assert_eq!(SessionContextGuard::current_session_id(), Some(outer));

            {
                let _inner = SessionContextGuard::with_session_id(inner)
                    .with_scope(&Scope::place(Level::Woreda, "Ayder"));
                assert_eq!(SessionContextGuard::current_session_id(), Some(inner));
                assert_eq!(
                    SessionContextGuard::current_scope().as_deref(),
                    Some("woreda:Ayder")
                );
            }

            // Restored to the outer session, which never had a scope
            assert_eq!(SessionContextGuard::current_session_id(), Some(outer));
            assert!(SessionContextGuard::current_scope().is_none());
        }

        assert!(SessionContextGuard::current_session_id().is_none());
    }

    #[test]
    fn test_record_scope_updates_active_session() {
        // No session: nothing to record into
        SessionContextGuard::record_scope(&Scope::country());
        assert!(SessionContextGuard::current().is_none());

        let session = Uuid::new_v4();
        let _guard = SessionContextGuard::with_session_id(session);
        SessionContextGuard::record_scope(&Scope::place(Level::Zone, "Mekelle"));
        assert_eq!(SessionContextGuard::current_scope().as_deref(), Some("zone:Mekelle"));
        assert_eq!(SessionContextGuard::current_session_id(), Some(session));
    }

    #[test]
    fn test_macro_scopes_context() {
        let seen = with_session_context!({ SessionContextGuard::current_session_id() });
        assert!(seen.is_some());
        assert!(SessionContextGuard::current().is_none());
    }
}
