//! Just enough CSS structure to decide rule inclusion.
//!
//! The stylesheet is split into top-level nodes: style rules, block at-rules
//! (recursed into when they group style rules), opaque at-rules, statements
//! and comments. Declaration blocks are kept as raw text. Whitespace before
//! each node is preserved so untouched parts serialize byte-for-byte.
//!
//! Tokenization is `cssparser`'s; nodes are cut from the source by position
//! so nothing is re-serialized from tokens.

use cssparser::{Delimiter, ParseError, Parser, ParserInput, SourcePosition, Token};

/// At-rules whose block holds style rules rather than declarations.
const GROUPING_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "layer",
    "container",
    "document",
    "-moz-document",
    "scope",
    "starting-style",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Rule(StyleRule),
    Group(GroupRule),
    AtBlock(AtBlock),
    Statement(Trivia),
    Comment(Trivia),
}

/// `selectors { declarations }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub leading: String,
    pub prelude: String,
    pub body: String,
}

/// `@media ... { rules }` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub leading: String,
    pub name: String,
    pub prelude: String,
    pub children: Vec<Node>,
    pub trailing: String,
}

/// Any other at-rule with a block, kept raw (`@keyframes`, `@font-face`, `@page`...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtBlock {
    pub leading: String,
    pub name: String,
    pub prelude: String,
    pub body: String,
}

/// Raw text plus its leading whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub leading: String,
    pub text: String,
}

impl StyleRule {
    /// Selectors of the prelude, split at commas outside any block.
    pub fn selectors(&self) -> Vec<String> {
        let mut input = ParserInput::new(&self.prelude);
        let mut parser = Parser::new(&mut input);
        let mut pieces = Vec::new();
        let mut start = parser.position();
        loop {
            let end = parser.position();
            let is_comma = parser
                .next_including_whitespace_and_comments()
                .map(|token| matches!(token, Token::Comma));
            match is_comma {
                Ok(true) => {
                    pieces.push(parser.slice(start..end));
                    start = parser.position();
                }
                Ok(false) => {}
                Err(_) => {
                    pieces.push(parser.slice(start..end));
                    break;
                }
            }
        }
        pieces
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Same rule with a new selector list.
    pub fn with_selectors(&self, selectors: &[String]) -> Self {
        let trailing_ws = &self.prelude[self.prelude.trim_end().len()..];
        Self {
            leading: self.leading.clone(),
            prelude: format!("{}{}", selectors.join(","), trailing_ws),
            body: self.body.clone(),
        }
    }
}

impl AtBlock {
    /// Lowercased name without vendor prefix (`-webkit-keyframes` → `keyframes`).
    pub fn base_name(&self) -> String {
        let name = self.name.to_ascii_lowercase();
        match name.strip_prefix('-') {
            Some(rest) => rest
                .split_once('-')
                .map(|(_, base)| base.to_string())
                .unwrap_or(name),
            None => name,
        }
    }
}

/// Parse a stylesheet into nodes. Never fails: malformed trailing input is
/// kept as a raw statement, and blocks left open at EOF are closed.
pub fn parse_stylesheet(input: &str) -> Vec<Node> {
    let mut input = ParserInput::new(input);
    let mut parser = Parser::new(&mut input);
    let (mut nodes, trailing) = node_list(&mut parser);
    if !trailing.is_empty() {
        nodes.push(Node::Statement(Trivia {
            leading: trailing,
            text: String::new(),
        }));
    }
    nodes
}

pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

pub fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Rule(rule) => {
            out.push_str(&rule.leading);
            out.push_str(&rule.prelude);
            out.push('{');
            out.push_str(&rule.body);
            out.push('}');
        }
        Node::Group(group) => {
            out.push_str(&group.leading);
            out.push('@');
            out.push_str(&group.name);
            out.push_str(&group.prelude);
            out.push('{');
            for child in &group.children {
                write_node(child, out);
            }
            out.push_str(&group.trailing);
            out.push('}');
        }
        Node::AtBlock(block) => {
            out.push_str(&block.leading);
            out.push('@');
            out.push_str(&block.name);
            out.push_str(&block.prelude);
            out.push('{');
            out.push_str(&block.body);
            out.push('}');
        }
        Node::Statement(trivia) | Node::Comment(trivia) => {
            out.push_str(&trivia.leading);
            out.push_str(&trivia.text);
        }
    }
}

/// `prop: value` pairs of a declaration block, lowercased property names.
/// Nested rules and anything else that is not `ident: value` are skipped.
pub fn declarations(body: &str) -> Vec<(String, String)> {
    let mut input = ParserInput::new(body);
    let mut parser = Parser::new(&mut input);
    let mut pairs = Vec::new();
    while !parser.is_exhausted() {
        if let Ok(pair) = parser.parse_until_after(Delimiter::Semicolon, |p| declaration(p)) {
            pairs.push(pair);
        }
    }
    pairs
}

fn declaration<'i>(parser: &mut Parser<'i, '_>) -> Result<(String, String), ParseError<'i, ()>> {
    let name = parser.expect_ident()?.to_ascii_lowercase();
    parser.expect_colon()?;
    parser.skip_whitespace();
    let value = rest_of_block(parser)?;
    Ok((name, value.trim().to_string()))
}

/// Where a prelude stopped.
enum Terminator {
    Block,
    Semicolon,
    End,
}

/// Nodes until the end of the current block (or of the input).
/// Returns the nodes and the whitespace before the end.
fn node_list(parser: &mut Parser<'_, '_>) -> (Vec<Node>, String) {
    let mut nodes = Vec::new();

    loop {
        let leading = whitespace(parser);
        let start = parser.position();
        let state = parser.state();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return (nodes, leading),
        };

        let node = match token {
            Token::Comment(_) => Node::Comment(Trivia {
                leading,
                text: parser.slice_from(start).to_string(),
            }),
            // Stray closing brace at top level: keep it verbatim
            Token::CloseCurlyBracket => Node::Statement(Trivia {
                leading,
                text: "}".to_string(),
            }),
            Token::AtKeyword(_) => at_rule(parser, leading, start),
            _ => {
                parser.reset(&state);
                style_rule(parser, leading, start)
            }
        };
        nodes.push(node);
    }
}

/// Called right after the at-keyword token.
fn at_rule(parser: &mut Parser<'_, '_>, leading: String, start: SourcePosition) -> Node {
    let name = parser.slice_from(start)[1..].to_string();
    let prelude_start = parser.position();

    match scan_prelude(parser) {
        (end, Terminator::Block) => {
            let prelude = parser.slice(prelude_start..end).to_string();
            if GROUPING_AT_RULES.contains(&name.to_ascii_lowercase().as_str()) {
                let (children, trailing) = parser
                    .parse_nested_block(|p| nested_nodes(p))
                    .unwrap_or_default();
                Node::Group(GroupRule {
                    leading,
                    name,
                    prelude,
                    children,
                    trailing,
                })
            } else {
                Node::AtBlock(AtBlock {
                    leading,
                    name,
                    prelude,
                    body: raw_block(parser),
                })
            }
        }
        (_, Terminator::Semicolon | Terminator::End) => Node::Statement(Trivia {
            leading,
            text: parser.slice_from(start).to_string(),
        }),
    }
}

fn style_rule(parser: &mut Parser<'_, '_>, leading: String, start: SourcePosition) -> Node {
    match scan_prelude(parser) {
        (end, Terminator::Block) => Node::Rule(StyleRule {
            leading,
            prelude: parser.slice(start..end).to_string(),
            body: raw_block(parser),
        }),
        // Stray declaration outside any block, or input ending mid-prelude
        (_, Terminator::Semicolon | Terminator::End) => Node::Statement(Trivia {
            leading,
            text: parser.slice_from(start).to_string(),
        }),
    }
}

/// Advance past the next `{` or `;` outside any block. Returns the position
/// just before it. Blocks opened inside the prelude are skipped whole.
fn scan_prelude(parser: &mut Parser<'_, '_>) -> (SourcePosition, Terminator) {
    loop {
        let end = parser.position();
        match parser.next_including_whitespace_and_comments() {
            Ok(Token::CurlyBracketBlock) => return (end, Terminator::Block),
            Ok(Token::Semicolon) => return (end, Terminator::Semicolon),
            Ok(_) => {}
            Err(_) => return (end, Terminator::End),
        }
    }
}

fn whitespace(parser: &mut Parser<'_, '_>) -> String {
    let start = parser.position();
    loop {
        let state = parser.state();
        if !matches!(
            parser.next_including_whitespace_and_comments(),
            Ok(Token::WhiteSpace(_))
        ) {
            parser.reset(&state);
            break;
        }
    }
    parser.slice_from(start).to_string()
}

/// Text of the block just opened, without its braces.
fn raw_block(parser: &mut Parser<'_, '_>) -> String {
    parser
        .parse_nested_block(|p| rest_of_block(p))
        .unwrap_or_default()
}

fn rest_of_block<'i>(parser: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let start = parser.position();
    while parser.next_including_whitespace_and_comments().is_ok() {}
    Ok(parser.slice_from(start).to_string())
}

fn nested_nodes<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<(Vec<Node>, String), ParseError<'i, ()>> {
    Ok(node_list(parser))
}
