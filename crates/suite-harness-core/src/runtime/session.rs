// crates/suite-harness-core/src/runtime/session.rs
// ============================================================================
// Module: Session Swap
// Description: Replace the active session user and hand back the previous one.
// Purpose: Let tests act as another principal and restore afterwards.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`swap_session_user`] is not scoped: the caller owns restoration and does
//! it by swapping the returned user back in.

use crate::core::User;
use crate::interfaces::SessionError;
use crate::interfaces::SessionStore;

/// Installs `user` as the session user (or logs out on `None`) and returns
/// the user that was logged in before the call.
///
/// # Errors
///
/// Returns [`SessionError`] when the session cannot be read or written.
pub fn swap_session_user(
    session: &dyn SessionStore,
    user: Option<User>,
) -> Result<Option<User>, SessionError> {
    let previous = session.logged_in_user()?;
    match user {
        Some(user) => session.set_logged_in_user(user)?,
        None => session.remove_logged_in_user()?,
    }
    Ok(previous)
}
