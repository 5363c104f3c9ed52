pub const TEXT_COMMAND: &str = "\\text";

/// True when `value` must be shown as literal text rather than math.
pub fn is_literal(value: &str) -> bool {
    value.chars().any(char::is_alphabetic)
}

/// Escape the characters that are significant to the renderer.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wrap `value` for literal rendering.
pub fn text(value: &str) -> String {
    format!("{TEXT_COMMAND}{{{}}}", escape(value))
}

/// Markup for a value that is math unless it contains letters.
///
/// `Infinity`, `NaN` and exponent forms come back wrapped in `\text{...}` so
/// the renderer shows them literally.
pub fn math_or_text(value: &str) -> String {
    if is_literal(value) {
        text(value)
    } else {
        escape(value)
    }
}

/// Markup for an evaluation failure line.
pub fn error(prefix: &str, message: &str) -> String {
    text(&format!("{prefix}{message}"))
}
