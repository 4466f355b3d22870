use crate::routes::Route;

use super::SessionState;

/// What the guard sees in the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Bootstrap has not settled yet.
    Pending,
    Authenticated,
    Anonymous,
}

/// What to do with a navigation to some route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    ShowLoading,
    Render,
    Redirect(Route),
}

pub fn evaluate(state: &SessionState) -> GuardState {
    if state.loading {
        GuardState::Pending
    } else if state.session.is_authenticated() {
        GuardState::Authenticated
    } else {
        GuardState::Anonymous
    }
}

/// Gate `route` on the current session. Public routes always render.
// UX-only gate; the API enforces access on every request.
pub fn decide(route: &Route, state: &SessionState) -> GuardDecision {
    if !route.is_protected() {
        return GuardDecision::Render;
    }
    match evaluate(state) {
        GuardState::Pending => GuardDecision::ShowLoading,
        GuardState::Authenticated => GuardDecision::Render,
        GuardState::Anonymous => GuardDecision::Redirect(Route::Login),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;

    fn state(loading: bool, subject: Option<&str>) -> SessionState {
        SessionState {
            session: Session {
                token: "t".to_string(),
                subject_id: subject.map(str::to_string),
                email: "ada@example.com".to_string(),
                display_name: None,
            },
            loading,
        }
    }

    #[test]
    fn test_loading_wins_over_session() {
        assert_eq!(evaluate(&state(true, Some("u1"))), GuardState::Pending);
        assert_eq!(evaluate(&state(true, None)), GuardState::Pending);
        assert_eq!(decide(&Route::Home, &state(true, Some("u1"))), GuardDecision::ShowLoading);
    }

    #[test]
    fn test_anonymous_redirects_to_entry() {
        assert_eq!(evaluate(&state(false, None)), GuardState::Anonymous);
        assert_eq!(
            decide(&Route::Home, &state(false, None)),
            GuardDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_authenticated_renders() {
        assert_eq!(evaluate(&state(false, Some("u1"))), GuardState::Authenticated);
        assert_eq!(decide(&Route::Home, &state(false, Some("u1"))), GuardDecision::Render);
    }

    #[test]
    fn test_public_routes_always_render() {
        for route in [
            Route::Login,
            Route::Register,
            Route::CreateAccount,
            Route::ForgotPassword,
            Route::NewPassword("abc".to_string()),
            Route::ConfirmAccount("abc".to_string()),
        ] {
            assert_eq!(decide(&route, &state(true, None)), GuardDecision::Render);
            assert_eq!(decide(&route, &state(false, None)), GuardDecision::Render);
        }
    }
}
