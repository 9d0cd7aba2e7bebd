use yew::prelude::*;

/// Properties for the analysis dashboard.
#[derive(Properties, PartialEq, Clone)]
pub struct AnalysisProps {
    /// Email of the signed-in user; attached to every backend request as the
    /// identity header (the email doubles as the session token).
    pub user_email: String,
}
