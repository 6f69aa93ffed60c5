/// Keys that send the reply input.
pub(crate) fn is_submit_key(key: &str, shift: bool) -> bool {
    key == "Enter" && !shift
}

/// Keys that activate a non-button control carrying `role="button"`.
pub(crate) fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}
