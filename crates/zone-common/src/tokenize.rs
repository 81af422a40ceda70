// tokenize.rs — small command-line splitting helper.
// Converted from: myq2-common/src/cmd.rs (Cmd_TokenizeString), trimmed
// down from the full alias/cbuf machinery to just what chat-command
// multiplexing needs (spec.md §4.5): split a multi-command chat line on
// `|`, capping the number of pieces, and dropping empty tokens.

/// Splits `line` on `sep`, keeping at most `limit` non-empty pieces
/// (spec.md §4.5 `command_limit`). A `limit` of 0 means unlimited.
pub fn split_commands(line: &str, sep: char, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    for piece in line.split(sep) {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push(trimmed.to_string());
        if limit != 0 && out.len() >= limit {
            break;
        }
    }
    out
}

/// Wraps `text` at `width` columns, breaking only on spaces, and prefixes
/// each resulting line with two spaces (spec.md §4.5 SendWrappedText).
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };
        if candidate_len > width && !current.is_empty() {
            lines.push(format!("  {current}"));
            current = word.to_string();
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(format!("  {current}"));
    }
    if lines.is_empty() {
        lines.push("  ".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_caps() {
        let pieces = split_commands("spec||energy -t|obscene", '|', 2);
        assert_eq!(pieces, vec!["spec".to_string(), "energy -t".to_string()]);
    }

    #[test]
    fn wraps_on_spaces_with_two_space_prefix() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 12);
        for line in &lines {
            assert!(line.starts_with("  "));
            assert!(line.len() <= 14);
        }
        assert!(lines.len() > 1);
    }
}
