//! Breaks a complex selector into the parts that must be present in content.

use cssparser::{ParseError, Parser, ParserInput, Token};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorPart {
    Class(String),
    Id(String),
    Tag(String),
    /// Attribute name; the value never decides retention.
    Attribute(String),
    /// `*`, `&`, pseudo-classes and pseudo-elements: never block retention.
    Neutral,
}

impl SelectorPart {
    /// The text compared against content tokens and safelist entries.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Class(v) | Self::Id(v) | Self::Tag(v) | Self::Attribute(v) => Some(v),
            Self::Neutral => None,
        }
    }
}

/// Split a single complex selector (no top-level commas) into parts.
///
/// Identifiers come from the `cssparser` tokenizer with escapes resolved, so
/// `.md\:flex` yields `Class("md:flex")`.
pub fn selector_parts(selector: &str) -> Vec<SelectorPart> {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let mut parts = Vec::new();
    // Whether the previous token was a type or universal selector
    let mut after_type = false;

    while let Ok(token) = parser.next_including_whitespace().cloned() {
        let mut is_type = false;
        match token {
            Token::Delim('.') => {
                if let Ok(Token::Ident(name)) = parser.next_including_whitespace() {
                    parts.push(SelectorPart::Class(name.to_string()));
                }
            }
            Token::IDHash(name) => parts.push(SelectorPart::Id(name.to_string())),
            Token::Ident(name) => {
                parts.push(SelectorPart::Tag(name.to_string()));
                is_type = true;
            }
            Token::Delim('*') => {
                parts.push(SelectorPart::Neutral);
                is_type = true;
            }
            Token::Delim('&') => parts.push(SelectorPart::Neutral),
            Token::SquareBracketBlock => {
                if let Ok(name) = parser.parse_nested_block(|p| attribute_name(p)) {
                    parts.push(SelectorPart::Attribute(name));
                }
            }
            Token::Colon => {
                skip_pseudo_name(&mut parser);
                parts.push(SelectorPart::Neutral);
            }
            Token::Delim('|') => {
                let state = parser.state();
                if !matches!(parser.next_including_whitespace(), Ok(Token::Delim('|'))) {
                    // `ns|tag`: what came before the bar was a namespace prefix
                    parser.reset(&state);
                    if after_type {
                        parts.pop();
                    }
                }
            }
            _ => {}
        }
        after_type = is_type;
    }

    parts
}

/// Consume `hover`, `:after` or `not(`; a function's arguments are skipped
/// with its block on the next read, so they never block a selector.
fn skip_pseudo_name(parser: &mut Parser<'_, '_>) {
    if matches!(parser.next_including_whitespace(), Ok(Token::Colon)) {
        let _ = parser.next_including_whitespace();
    }
}

/// `data-state="open" i` → `data-state`; `xlink|href` → `href`.
fn attribute_name<'i>(parser: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let mut name = String::new();
    while let Ok(token) = parser.next().cloned() {
        match token {
            Token::Ident(ident) => name = ident.to_string(),
            Token::Delim('|' | '*') => {}
            _ => break,
        }
    }
    Ok(name)
}
