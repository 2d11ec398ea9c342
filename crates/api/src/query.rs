//! Shared query parameter types for API handlers.

use std::str::FromStr;

use jobbit_core::enums::{ParticipantRole, ProfileRole};
use jobbit_core::pagination::PageWindow;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Message for a role the caller has no profile for.
pub const NO_PROFILE_FOR_ROLE: &str = "User has not available profile for this role";

/// `?page=N` (1-based).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

impl PageParams {
    pub fn window(&self, page_size: i64) -> PageWindow {
        PageWindow::new(self.page, page_size)
    }
}

/// Reject a page number past the end of a list of `count` items.
pub fn ensure_page(window: &PageWindow, count: i64) -> AppResult<()> {
    if window.is_valid(count) {
        Ok(())
    } else {
        Err(AppError::InvalidPage)
    }
}

/// `?role=` plus pagination, for role-scoped chat and transaction endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RoleParams {
    pub role: Option<String>,
    pub page: Option<i64>,
}

impl RoleParams {
    pub fn window(&self, page_size: i64) -> PageWindow {
        PageWindow::new(self.page, page_size)
    }
}

/// Parse a required `role` argument into a chat role.
pub fn require_participant_role(raw: Option<&str>) -> AppResult<ParticipantRole> {
    let values = ParticipantRole::values();
    let raw = raw.ok_or_else(|| {
        AppError::Detail(format!("Arg `role` is required. Possible values: {values:?}"))
    })?;
    ParticipantRole::from_str(raw).map_err(|_| {
        AppError::Detail(format!(
            "Bad value for arg `role`. Possible values: {values:?}"
        ))
    })
}

/// Parse a required `role` argument into a profile role.
pub fn require_profile_role(raw: Option<&str>) -> AppResult<ProfileRole> {
    let values = ProfileRole::values();
    let raw = raw.ok_or_else(|| {
        AppError::Detail(format!("Arg `role` is required. Possible values: {values:?}"))
    })?;
    ProfileRole::from_str(raw).map_err(|_| {
        AppError::Detail(format!(
            "Bad value for arg `role`. Possible values: {values:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_role_lists_values() {
        assert_matches!(
            require_participant_role(None),
            Err(AppError::Detail(msg))
                if msg == r#"Arg `role` is required. Possible values: ["CLIENT", "EXECUTOR", "MODERATOR"]"#
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_matches!(
            require_participant_role(Some("ADMIN")),
            Err(AppError::Detail(msg)) if msg.starts_with("Bad value for arg `role`")
        );
        assert_eq!(
            require_participant_role(Some("EXECUTOR")).unwrap(),
            ParticipantRole::Executor
        );
    }

    #[test]
    fn profile_role_excludes_moderators() {
        assert_eq!(
            require_profile_role(Some("CLIENT")).unwrap(),
            ProfileRole::Client
        );
        assert!(require_profile_role(Some("MODERATOR")).is_err());
        assert_matches!(
            require_profile_role(None),
            Err(AppError::Detail(msg))
                if msg == r#"Arg `role` is required. Possible values: ["CLIENT", "EXECUTOR"]"#
        );
    }

    #[test]
    fn page_past_end_is_rejected() {
        let params = PageParams { page: Some(3) };
        let window = params.window(10);
        assert!(ensure_page(&window, 25).is_ok());
        assert_matches!(ensure_page(&window, 20), Err(AppError::InvalidPage));
    }
}
