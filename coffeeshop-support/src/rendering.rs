//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format resolution chains, type names,
//! and "did you mean?" suggestions in error output.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use coffeeshop_support::rendering::render_chain;
///
/// let chain = vec!["CommandBus", "CommandHandlerManager", "CommandBus"];
/// let rendered = render_chain(&chain);
/// assert_eq!(rendered, "CommandBus → CommandHandlerManager → CommandBus");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Renders a list of names as an indented bullet list, one per line.
///
/// ```
/// use coffeeshop_support::rendering::render_list;
///
/// assert_eq!(render_list(&["a", "b"], 4), "\n    - a\n    - b");
/// assert_eq!(render_list::<&str>(&[], 4), "");
/// ```
pub fn render_list<S: AsRef<str>>(items: &[S], indent: usize) -> String {
    let pad = " ".repeat(indent);
    items
        .iter()
        .map(|item| format!("\n{pad}- {}", item.as_ref()))
        .collect()
}

/// Shortens a qualified type name for display.
///
/// Both Rust (`::`) and namespace-style (`\`) separators are understood.
///
/// ```
/// use coffeeshop_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("my_app::commands::CommandBus"), "CommandBus");
/// assert_eq!(shorten_type_name(r"Vendor\Fully\Qualified\ClassName"), "ClassName");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
///     "Arc<dyn Logger>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut current_segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                current_segment.clear();
            }
            '\\' => current_segment.clear(),
            '<' | '>' | ',' | ' ' => {
                result.push_str(&current_segment);
                result.push(ch);
                current_segment.clear();
            }
            _ => current_segment.push(ch),
        }
    }

    result.push_str(&current_segment);
    result
}

/// Suggests known identifiers that look like `requested`.
///
/// Candidates are scored by substring containment, then short-name
/// containment, then common prefix and finally a loose character match
/// that catches single typos. Results are ordered best-first.
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter(|&&name| name != requested)
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();
            let name_short = shorten_type_name(name).to_lowercase();

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 80));
            }

            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();
            if common >= 3 {
                return Some((name, common * 10));
            }

            if is_close(&requested_short, &name_short) {
                return Some((name, 20));
            }

            None
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Loose "edit distance ≤ 3" heuristic: at least 60% of positions agree.
fn is_close(a: &str, b: &str) -> bool {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a_len.abs_diff(b_len) > 3 {
        return false;
    }

    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return true;
    }

    let common = a.chars().zip(b.chars()).filter(|(ca, cb)| ca == cb).count();
    common * 100 / max_len >= 60
}
