/// Phrases wallet providers use when the user declines to sign.
pub const REJECTION_PHRASES: [&str; 3] = ["User rejected", "User denied", "user rejected"];

/// Whether an error message means the user cancelled the request.
pub fn is_user_rejection(message: &str) -> bool {
    REJECTION_PHRASES
        .iter()
        .any(|phrase| message.contains(phrase))
}
