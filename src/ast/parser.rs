use crate::ast::scoping::{
    matching_parenthesis, split_top_level, strip_global_parentheses, top_level_positions,
};
use crate::ast::{ASTNode, NameResolver, Normalizer, Operator, ParseError};
use crate::functions;
use log::debug;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "ast/literal.pest"]
struct LiteralParser;

/// Operators in the order they are split on, loosest binding first.
const SPLIT_ORDER: [u8; 6] = [b'+', b'-', b'*', b'/', b'^', b'!'];

/// True when `text` is a valid variable or expression name.
pub(crate) fn is_identifier(text: &str) -> bool {
    LiteralParser::parse(Rule::identifier, text).is_ok()
}

fn ends_operand(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'.' | b'_' | b')' | b'!')
}

fn parse_literal(text: &str) -> Result<Option<ASTNode>, ParseError> {
    if LiteralParser::parse(Rule::literal, text).is_err() {
        return Ok(None);
    }
    let value: f64 = text
        .replace(',', ".")
        .parse()
        .map_err(|_| ParseError::NotSupported(format!("invalid number '{}'", text)))?;
    // keep the sign of a literal negative zero
    if value == 0.0 && text.starts_with('-') {
        return Ok(Some(ASTNode::Negate(Box::new(ASTNode::Number(0.0)))));
    }
    Ok(Some(ASTNode::Number(value)))
}

/// Turns expression text into an [`ASTNode`].
///
/// Text is normalized first, then split recursively at the rightmost
/// top-level occurrence of the loosest operator.
pub struct ExpressionParser<'a> {
    resolver: &'a dyn NameResolver,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(resolver: &'a dyn NameResolver) -> Self {
        Self { resolver }
    }

    pub fn parse_expression(&self, input: &str) -> Result<ASTNode, ParseError> {
        debug!("Parsing expression: {}", input);
        let normalized = Normalizer::new(self.resolver).normalize(input)?;
        debug!("Normalized expression: {}", normalized);
        let ast = self.build(&normalized)?;
        debug!("Parse result: {:?}", ast);
        Ok(ast)
    }

    /// Builds a tree from already-normalized text.
    pub fn build(&self, text: &str) -> Result<ASTNode, ParseError> {
        let text = strip_global_parentheses(text);
        if text.is_empty() {
            return Err(ParseError::format("empty operand"));
        }
        if let Some(node) = parse_literal(text)? {
            return Ok(node);
        }

        for operator in SPLIT_ORDER {
            if !text.as_bytes().contains(&operator) {
                continue;
            }
            if let Some(node) = self.split_on(text, operator)? {
                return Ok(node);
            }
        }

        self.build_atom(text)
    }

    fn split_on(&self, text: &str, operator: u8) -> Result<Option<ASTNode>, ParseError> {
        let bytes = text.as_bytes();
        let positions = top_level_positions(bytes, operator);

        match operator {
            b'!' => {
                let Some(&position) = positions.last() else {
                    return Ok(None);
                };
                if position != bytes.len() - 1 {
                    return Err(ParseError::NotSupported(format!(
                        "unexpected '{}' after factorial",
                        &text[position + 1..]
                    )));
                }
                let operand = self.build_operand(&text[..position])?;
                Ok(Some(ASTNode::Factorial(Box::new(operand))))
            }
            b'-' => {
                let binary = positions
                    .iter()
                    .rev()
                    .find(|&&position| position > 0 && ends_operand(bytes[position - 1]));
                match binary {
                    Some(&position) => self
                        .split_binary(text, position, Operator::Subtract)
                        .map(Some),
                    None if bytes[0] == b'-' => {
                        let operand = self.build_operand(&text[1..])?;
                        Ok(Some(ASTNode::Negate(Box::new(operand))))
                    }
                    None => Ok(None),
                }
            }
            _ => match positions.last() {
                Some(&position) => {
                    let operator = Operator::try_from(operator as char)?;
                    self.split_binary(text, position, operator).map(Some)
                }
                None => Ok(None),
            },
        }
    }

    fn split_binary(
        &self,
        text: &str,
        position: usize,
        operator: Operator,
    ) -> Result<ASTNode, ParseError> {
        let left = self.build_operand(&text[..position])?;
        let right = self.build_operand(&text[position + 1..])?;
        Ok(ASTNode::binary(left, operator, right))
    }

    fn build_operand(&self, text: &str) -> Result<ASTNode, ParseError> {
        if text.is_empty() {
            return Err(ParseError::format("empty operand"));
        }
        self.build(text)
    }

    // Constants, identifiers and calls.
    fn build_atom(&self, text: &str) -> Result<ASTNode, ParseError> {
        if let Some((name, value)) = functions::named_constant(text) {
            return Ok(ASTNode::Constant { name, value });
        }

        let Some(open) = text.find('(') else {
            if is_identifier(text) {
                return Ok(ASTNode::Identifier(text.to_string()));
            }
            return Err(ParseError::NotSupported(format!("'{}' is not supported", text)));
        };

        let close = matching_parenthesis(text.as_bytes(), open)
            .ok_or_else(|| ParseError::format(format!("unbalanced parentheses in '{}'", text)))?;
        if close != text.len() - 1 {
            return Err(ParseError::NotSupported(format!("'{}' is not supported", text)));
        }

        let name = &text[..open];
        let inner = &text[open + 1..close];
        let args = if inner.is_empty() {
            Vec::new()
        } else {
            split_top_level(inner, b',')
                .into_iter()
                .map(|arg| self.build_operand(arg))
                .collect::<Result<Vec<_>, _>>()?
        };
        self.build_call(name, args)
    }

    fn build_call(&self, name: &str, args: Vec<ASTNode>) -> Result<ASTNode, ParseError> {
        if let Some(spec) = self.resolver.find_function(name) {
            return spec.build(args);
        }

        if let Some(expression) = self.resolver.find_permanent_expression(name) {
            if args.len() != expression.arity() {
                return Err(ParseError::Argument(format!(
                    "{} expects {} arguments, but got {}",
                    name,
                    expression.arity(),
                    args.len()
                )));
            }
            return Ok(ASTNode::ExpressionCall {
                name: name.to_string(),
                args,
            });
        }

        Err(ParseError::NotSupported(format!(
            "function '{}' is not supported",
            name
        )))
    }
}
