//! Parenthesis-insertion passes that make operator scope explicit.
//!
//! After these passes the structural split only needs "lowest-precedence
//! operator at depth 0, rightmost occurrence": every `!` and `^` sits inside
//! its own group and every unary minus is isolated in one. All input is ASCII
//! by the time these run.

use log::trace;

fn is_operand_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'.' || c == b'_'
}

/// Index of the `)` closing the `(` at `open`.
pub(crate) fn matching_parenthesis(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, &c) in bytes.iter().enumerate().skip(open) {
        match c {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Positions of `target` that are not enclosed by any parenthesis.
pub(crate) fn top_level_positions(bytes: &[u8], target: u8) -> Vec<usize> {
    let mut depth = 0usize;
    let mut positions = Vec::new();
    for (index, &c) in bytes.iter().enumerate() {
        match c {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if c == target && depth == 0 => positions.push(index),
            _ => {}
        }
    }
    positions
}

/// Splits on `separator` occurrences at depth 0.
pub(crate) fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for position in top_level_positions(text.as_bytes(), separator) {
        parts.push(&text[start..position]);
        start = position + 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Removes outer parenthesis pairs that enclose the whole text.
pub(crate) fn strip_global_parentheses(text: &str) -> &str {
    let mut text = text;
    while text.len() > 2
        && text.starts_with('(')
        && matching_parenthesis(text.as_bytes(), 0) == Some(text.len() - 1)
    {
        text = &text[1..text.len() - 1];
    }
    text
}

// Start of the operand that ends right before `end`, skipping nested groups.
fn operand_start(bytes: &[u8], end: usize) -> usize {
    let mut index = end;
    let mut depth = 0usize;
    while index > 0 {
        match bytes[index - 1] {
            b')' => depth += 1,
            b'(' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            c if depth == 0 && !is_operand_char(c) => break,
            _ => {}
        }
        index -= 1;
    }
    index
}

// End (exclusive) of the exponent starting at `start`; a leading `-` belongs to it.
fn operand_end(bytes: &[u8], start: usize) -> usize {
    let mut index = start;
    if bytes.get(index) == Some(&b'-') {
        index += 1;
    }
    let mut depth = 0usize;
    while index < bytes.len() {
        match bytes[index] {
            b'(' => depth += 1,
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            c if depth == 0 && !is_operand_char(c) => break,
            _ => {}
        }
        index += 1;
    }
    index
}

// End (exclusive) of the term a unary minus applies to.
fn negative_end(bytes: &[u8], start: usize) -> usize {
    let mut index = start;
    let mut depth = 0usize;
    while index < bytes.len() {
        match bytes[index] {
            b'(' => depth += 1,
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            b'+' | b'-' | b'*' | b'/' | b',' if depth == 0 => break,
            _ => {}
        }
        index += 1;
    }
    index
}

// True when `[start, end)` is exactly the content of one parenthesis pair.
fn is_enclosed(bytes: &[u8], start: usize, end: usize) -> bool {
    start > 0
        && end < bytes.len()
        && bytes[start - 1] == b'('
        && bytes[end] == b')'
        && matching_parenthesis(bytes, start - 1) == Some(end)
}

/// Wraps every `operand!` in its own group.
pub(crate) fn manage_factorial(text: &str) -> String {
    let mut text = text.to_string();
    let mut index = 0;
    while index < text.len() {
        let bytes = text.as_bytes();
        if bytes[index] == b'!' {
            let start = operand_start(bytes, index);
            if start < index && !is_enclosed(bytes, start, index + 1) {
                text.insert(index + 1, ')');
                text.insert(start, '(');
                trace!("Scoped factorial: {}", text);
                index += 1;
            }
        }
        index += 1;
    }
    text
}

/// Wraps every `base^exponent` in its own group.
pub(crate) fn manage_power(text: &str) -> String {
    let mut text = text.to_string();
    let mut index = 0;
    while index < text.len() {
        let bytes = text.as_bytes();
        if bytes[index] == b'^' {
            let start = operand_start(bytes, index);
            let end = operand_end(bytes, index + 1);
            if !is_enclosed(bytes, start, end) {
                text.insert(end, ')');
                text.insert(start, '(');
                trace!("Scoped power: {}", text);
                index += 1;
            }
        }
        index += 1;
    }
    text
}

/// Isolates every unary minus in its own group.
///
/// A minus following an operand becomes the addition of a negative term, so
/// `a-b` reads `a+(-b)`. After `*`, `/`, `,` or `^` the minus only needs a
/// group; after `(` it is already isolated.
pub(crate) fn manage_negative(text: &str) -> String {
    let mut text = text.to_string();
    let mut index = 0;
    while index < text.len() {
        let bytes = text.as_bytes();
        if bytes[index] != b'-' {
            index += 1;
            continue;
        }

        let opening = match index.checked_sub(1).map(|previous| bytes[previous]) {
            None => "(",
            Some(b'(') => {
                index += 1;
                continue;
            }
            Some(b'*' | b'/' | b',' | b'^') => "(",
            Some(_) => "+(",
        };

        let end = negative_end(bytes, index + 1);
        text.insert(end, ')');
        text.insert_str(index, opening);
        trace!("Scoped negative: {}", text);
        index += opening.len() + 1;
    }
    text.replace(")(", ")*(")
}
