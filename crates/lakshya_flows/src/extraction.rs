//! Locating JSON inside model replies.
//!
//! Models asked for JSON still wrap it in markdown fences or add a sentence
//! before it. Extraction tries, in order:
//! 1. a ```` ```json ```` fenced block
//! 2. any fenced block
//! 3. the first balanced `{...}` or `[...]`, whichever starts first

/// Extract the JSON text from a reply.
///
/// Returns `None` when the reply holds nothing that looks like JSON. The
/// returned slice is not parsed; callers deserialize it into their type.
///
/// # Examples
///
/// ```
/// use lakshya_flows::extract_json;
///
/// let reply = "Sure! Here it is:\n```json\n{\"career\": \"Architect\"}\n```";
/// assert_eq!(extract_json(reply), Some("{\"career\": \"Architect\"}"));
///
/// let reply = "Result: {\"score\": 80} hope that helps";
/// assert_eq!(extract_json(reply), Some("{\"score\": 80}"));
/// ```
pub fn extract_json(reply: &str) -> Option<&str> {
    if let Some(block) = fenced_block(reply, "```json") {
        return Some(block);
    }
    if let Some(block) = fenced_block(reply, "```") {
        if block.starts_with(['{', '[']) {
            return Some(block);
        }
    }

    let brace = reply.find('{');
    let bracket = reply.find('[');
    let order = match (brace, bracket) {
        (Some(b), Some(k)) if k < b => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    };
    order
        .into_iter()
        .find_map(|(open, close)| balanced(reply, open, close))
}

/// Contents of the first fenced block opened by `fence`.
///
/// An unterminated fence yields everything after it, which is how
/// truncated replies arrive.
fn fenced_block<'a>(reply: &'a str, fence: &str) -> Option<&'a str> {
    let start = reply.find(fence)? + fence.len();
    // Skip an info string such as "json" after a bare fence
    let body_start = reply[start..]
        .find('\n')
        .map_or(start, |newline| start + newline + 1);
    let body = &reply[body_start..];
    let block = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    let block = block.trim();
    (!block.is_empty()).then_some(block)
}

/// First `open ... close` span with balanced nesting, ignoring delimiters
/// inside string literals.
fn balanced(reply: &str, open: char, close: char) -> Option<&str> {
    let start = reply.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in reply[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
