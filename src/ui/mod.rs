/// Rendering: every function here reads the session and reports what the
/// user did; none of them mutate [`SessionState`](crate::state::SessionState)
/// directly.
pub mod panels;
pub mod plot;
pub mod preview;
