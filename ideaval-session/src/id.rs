/// Session ids are cut to this many characters.
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Session id for an idea: lowercased, spaces turned into `-`, at most
/// [`MAX_SESSION_ID_LEN`] characters.
///
/// ```
/// use ideaval_session::generate_session_id;
///
/// assert_eq!(generate_session_id("Study Planner App"), "study-planner-app");
/// ```
pub fn generate_session_id(idea: &str) -> String {
    idea.to_lowercase().replace(' ', "-").chars().take(MAX_SESSION_ID_LEN).collect()
}
