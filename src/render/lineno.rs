//! Line-number post-pass over rendered markup.

/// Prefix each line of already-rendered markup with a numbered marker.
///
/// Splits on literal `\n` only. Whatever follows the last newline is a
/// line of its own only if it holds text: closing tags of a run that spans
/// the final newline stay attached to the last line. Empty input still
/// gets line 1.
pub fn add_line_numbers(markup: &str) -> String {
    let segments: Vec<&str> = markup.split('\n').collect();
    let numbered = match segments.last() {
        Some(last) if segments.len() > 1 && !has_text(last) => segments.len() - 1,
        _ => segments.len(),
    };

    let mut out = String::with_capacity(markup.len() + markup.len() / 4 + 48);
    for (n, segment) in segments.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        if n < numbered {
            let number = n + 1;
            out.push_str(&format!(
                "<span class=\"lineno\" id=\"{}\">{}</span> ",
                line_id(number),
                number
            ));
        }
        out.push_str(segment);
    }
    out
}

/// Anything outside tags. Text is escaped, so every `<` opens a tag.
fn has_text(segment: &str) -> bool {
    let mut in_tag = false;
    for c in segment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => return true,
            _ => {}
        }
    }
    false
}

/// Element id of the marker for 1-based line `number`.
pub fn line_id(number: usize) -> String {
    format!("line-{}", number)
}
