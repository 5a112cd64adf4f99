//! Text rewriting that turns free-form input into a canonical expression.
//!
//! The output has no whitespace, explicit `*` for every implicit product,
//! validated parentheses, commas and call arities, and explicit groups around
//! every `!`, `^` and unary minus. [`ExpressionParser`](super::Parser) relies
//! on all of that to split without a precedence table.

use crate::ast::{scoping, NameResolver, ParseError};
use log::debug;

const SPECIAL_CHARACTERS: [char; 11] = ['(', ')', '.', ',', '!', '^', '+', '-', '*', '/', '_'];

const SIGN_COLLAPSES: [(&str, &str); 5] = [
    ("+-", "-"),
    ("-+", "-"),
    ("--", "+"),
    ("*+", "*"),
    ("/+", "/"),
];

const INVALID_SEQUENCES: [&str; 45] = [
    "(*", "(/", "(^", "(!", "(,", "+)", "-)", "*)", "/)", "^)", ",)", "++", "**", "//", "^^", ",,",
    "..", "+*", "+/", "+^", "+!", "+,", "-*", "-/", "-^", "-!", "-,", "*/", "*^", "*!", "*,", "/*",
    "/^", "/!", "/,", "^*", "^/", "^!", "^,", ",*", ",/", ",^", ",!", "!.", ").",
];

fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// The identifier ending right before `end`, if any.
fn identifier_before(text: &str, end: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = end;
    while start > 0 && is_word_char(bytes[start - 1]) {
        start -= 1;
    }
    while start < end && bytes[start].is_ascii_digit() {
        start += 1;
    }
    (start < end).then(|| &text[start..end])
}

fn check_not_trivial(text: &str) -> Result<(), ParseError> {
    if text.is_empty() {
        return Err(ParseError::format("empty expression"));
    }
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if SPECIAL_CHARACTERS.contains(&c) {
            return Err(ParseError::format(format!("'{}' is not an expression", c)));
        }
    }
    Ok(())
}

fn check_parentheses(text: &str) -> Result<(), ParseError> {
    let mut depth = 0i64;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::format("unbalanced parentheses"));
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::format("unbalanced parentheses"));
    }
    Ok(())
}

fn check_boundaries(text: &str) -> Result<(), ParseError> {
    if let Some(last) = text.chars().last() {
        if matches!(last, '+' | '-' | '*' | '/' | ',' | '^') {
            return Err(ParseError::format(format!("invalid trailing operator '{}'", last)));
        }
    }
    if let Some(first) = text.chars().next() {
        if matches!(first, '*' | '/' | '^' | '!' | ',') {
            return Err(ParseError::format(format!("invalid leading operator '{}'", first)));
        }
    }
    Ok(())
}

fn collapse_signs(mut text: String) -> String {
    loop {
        let mut changed = false;
        for (from, to) in SIGN_COLLAPSES {
            if text.contains(from) {
                text = text.replace(from, to);
                changed = true;
            }
        }
        if !changed {
            return text;
        }
    }
}

fn complete_decimal_points(text: String) -> String {
    let mut text = text
        .replace("*.", "*0.")
        .replace("/.", "/0.")
        .replace("+.", "+0.")
        .replace("-.", "-0.");
    if text.ends_with('.') {
        text.pop();
    }
    text
}

fn check_sequences(text: &str) -> Result<(), ParseError> {
    match INVALID_SEQUENCES.iter().find(|sequence| text.contains(*sequence)) {
        Some(sequence) => Err(ParseError::format(format!("invalid sequence '{}'", sequence))),
        None => Ok(()),
    }
}

fn check_characters(text: &str) -> Result<(), ParseError> {
    match text
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !SPECIAL_CHARACTERS.contains(c))
    {
        Some(c) => Err(ParseError::format(format!("invalid character '{}'", c))),
        None => Ok(()),
    }
}

fn drop_redundant_plus(text: String) -> String {
    let text = text.replace("(+", "(").replace(",+", ",").replace("^+", "^");
    match text.strip_prefix('+') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

fn drop_dangling_points(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '.' && chars.peek().is_some_and(|next| SPECIAL_CHARACTERS.contains(next)) {
            continue;
        }
        output.push(c);
    }
    output
}

// `)2` and `!2` become products, `2(` too unless the digit ends a function
// name; a `.` without a leading digit gets one.
fn separate_numbers(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + 8);
    let mut in_word = false;
    let mut in_number = false;
    for c in text.chars() {
        let previous = output.as_bytes().last().copied();
        let after_group = matches!(previous, Some(b')' | b'!'));
        if c.is_ascii_digit() {
            if !in_word {
                if !in_number && after_group {
                    output.push('*');
                }
                in_number = true;
            }
        } else if c == '.' {
            if after_group {
                output.push_str("*0");
            } else if !previous.is_some_and(|p| p.is_ascii_digit()) {
                output.push('0');
            }
            in_word = false;
            in_number = true;
        } else if c == '(' {
            if in_number {
                output.push('*');
            }
            in_word = false;
            in_number = false;
        } else if c.is_ascii_alphabetic() || c == '_' {
            if !in_word {
                in_word = true;
                in_number = false;
            }
        } else {
            in_word = false;
            in_number = false;
        }
        output.push(c);
    }
    output
}

fn join_groups(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        let previous = output.as_bytes().last().copied();
        let starts_operand = c == '(' || c.is_ascii_alphabetic() || c == '_';
        if starts_operand && matches!(previous, Some(b')' | b'!')) {
            output.push('*');
        }
        output.push(c);
    }
    output
}

fn check_numbers(text: &str) -> Result<(), ParseError> {
    let mut in_word = false;
    let mut points = 0;
    for (index, c) in text.chars().enumerate() {
        if c.is_ascii_alphabetic() || c == '_' {
            in_word = true;
            points = 0;
        } else if c.is_ascii_digit() {
            continue;
        } else if c == '.' && !in_word {
            points += 1;
            if points > 1 {
                return Err(ParseError::format(format!(
                    "invalid number near position {}",
                    index
                )));
            }
        } else {
            in_word = false;
            points = 0;
        }
    }
    Ok(())
}

enum Frame<'t> {
    Group,
    Call {
        name: &'t str,
        arity: (usize, usize),
        commas: usize,
        empty: bool,
    },
}

/// Validates and rewrites raw expression text.
pub struct Normalizer<'a> {
    resolver: &'a dyn NameResolver,
}

impl<'a> Normalizer<'a> {
    pub fn new(resolver: &'a dyn NameResolver) -> Self {
        Self { resolver }
    }

    /// Full pipeline: rewrite, scope `!`, `^` and unary minus, rewrite again.
    pub fn normalize(&self, input: &str) -> Result<String, ParseError> {
        let rewritten = self.rewrite(input)?;
        debug!("Rewritten expression: {}", rewritten);

        let scoped = scoping::manage_factorial(&rewritten);
        let scoped = scoping::manage_power(&scoped);
        let scoped = scoping::manage_negative(&scoped);
        let scoped = scoping::strip_global_parentheses(&scoped);
        debug!("Scoped expression: {}", scoped);

        self.rewrite(scoped)
    }

    /// The validation and rewriting steps, without the scoping passes.
    pub fn rewrite(&self, input: &str) -> Result<String, ParseError> {
        let text: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        check_not_trivial(&text)?;
        check_parentheses(&text)?;
        check_boundaries(&text)?;

        let text = collapse_signs(text);
        let text = complete_decimal_points(text);
        check_not_trivial(&text)?;
        check_sequences(&text)?;
        check_characters(&text)?;

        let text = drop_redundant_plus(text);
        if let Some(shorter) = self.remove_empty_group(&text) {
            return self.rewrite(&shorter);
        }

        let text = drop_dangling_points(&text);
        self.check_arguments(&text)?;
        let text = separate_numbers(&text);
        let text = join_groups(&text);
        check_numbers(&text)?;
        self.insert_implicit_products(&text)
    }

    // Drops the first `()` that does not follow a callable name.
    fn remove_empty_group(&self, text: &str) -> Option<String> {
        let mut from = 0;
        while let Some(offset) = text[from..].find("()") {
            let position = from + offset;
            match identifier_before(text, position) {
                Some(name) if self.resolver.is_callable(name) => from = position + 2,
                _ => {
                    let mut shorter = text.to_string();
                    shorter.replace_range(position..position + 2, "");
                    return Some(shorter);
                }
            }
        }
        None
    }

    fn check_arguments(&self, text: &str) -> Result<(), ParseError> {
        let bytes = text.as_bytes();
        let mut frames = Vec::new();

        for (index, &c) in bytes.iter().enumerate() {
            match c {
                b'(' => {
                    let call = identifier_before(text, index)
                        .and_then(|name| self.resolver.arity(name).map(|arity| (name, arity)));
                    frames.push(match call {
                        Some((name, arity)) => Frame::Call {
                            name,
                            arity,
                            commas: 0,
                            empty: bytes.get(index + 1) == Some(&b')'),
                        },
                        None => Frame::Group,
                    });
                }
                b',' => match frames.last_mut() {
                    Some(Frame::Call { commas, .. }) => *commas += 1,
                    _ => {
                        return Err(ParseError::format(format!(
                            "misplaced comma at position {}",
                            index
                        )))
                    }
                },
                b')' => {
                    if let Some(Frame::Call {
                        name,
                        arity: (min, max),
                        commas,
                        empty,
                    }) = frames.pop()
                    {
                        let count = if empty { 0 } else { commas + 1 };
                        if count < min || count > max {
                            return Err(ParseError::Argument(format!(
                                "{} expects {} to {} arguments, but got {}",
                                name, min, max, count
                            )));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    // Number-to-word and word-to-group products, and bare callable detection.
    fn insert_implicit_products(&self, text: &str) -> Result<String, ParseError> {
        let mut output = String::with_capacity(text.len() + 8);
        let mut word_start: Option<usize> = None;
        let mut in_number = false;

        for c in text.chars() {
            if c.is_ascii_digit() || c == '.' {
                if word_start.is_none() {
                    in_number = true;
                }
            } else if c.is_ascii_alphabetic() || c == '_' {
                if word_start.is_none() {
                    if in_number {
                        output.push('*');
                    }
                    in_number = false;
                    word_start = Some(output.len());
                }
            } else {
                if let Some(start) = word_start.take() {
                    let callable = self.resolver.is_callable(&output[start..]);
                    if c == '(' && !callable {
                        output.push('*');
                    } else if c != '(' && callable {
                        return Err(called_without_parentheses(&output[start..]));
                    }
                } else if c == '(' && in_number {
                    output.push('*');
                }
                in_number = false;
            }
            output.push(c);
        }

        if let Some(start) = word_start {
            if self.resolver.is_callable(&output[start..]) {
                return Err(called_without_parentheses(&output[start..]));
            }
        }
        Ok(output)
    }
}

fn called_without_parentheses(name: &str) -> ParseError {
    ParseError::format(format!("function '{}' called without parentheses", name))
}
