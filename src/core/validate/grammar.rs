//! Recognizer for the CSS selector-list grammar over `cssparser` tokens.
//!
//! This only answers "does it parse"; it builds no AST. The accepted language
//! covers type/universal selectors with namespaces, classes, ids, attribute
//! selectors, pseudo-classes, pseudo-elements, functional pseudos, the `&`
//! nesting selector, and all combinators including the column combinator `||`.

use std::fmt;

use cssparser::{
    BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput, SourcePosition, Token,
};

/// Pseudo functions whose argument is itself a selector list.
const SELECTOR_ARG_PSEUDOS: &[&str] = &[
    "not",
    "is",
    "where",
    "matches",
    "any",
    "-webkit-any",
    "-moz-any",
    "has",
    "host",
    "host-context",
    "slotted",
    "global",
    "local",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Invalid {
    ExpectedSelector,
    ExpectedIdentifier,
    BadAttribute,
    EmptyArgument,
    UnclosedBlock,
}

impl Invalid {
    fn message(self) -> &'static str {
        match self {
            Self::ExpectedSelector => "expected selector",
            Self::ExpectedIdentifier => "expected identifier",
            Self::BadAttribute => "malformed attribute selector",
            Self::EmptyArgument => "empty pseudo-class argument",
            Self::UnclosedBlock => "unclosed block",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    /// 1-based column of the offending token.
    pub column: u32,
    pub message: &'static str,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at column {}", self.message, self.column)
    }
}

impl std::error::Error for SelectorError {}

fn selector_error(err: ParseError<'_, Invalid>) -> SelectorError {
    let message = match err.kind {
        ParseErrorKind::Custom(invalid) => invalid.message(),
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => "unexpected end of input",
        ParseErrorKind::Basic(_) => "unexpected token",
    };
    SelectorError {
        column: err.location.column,
        message,
    }
}

type ParseResult<'i, T = ()> = Result<T, ParseError<'i, Invalid>>;

/// Parse `input` as a complete selector list.
pub fn parse_selector_list(input: &str) -> Result<(), SelectorError> {
    let mut input = ParserInput::new(input);
    let mut parser = Parser::new(&mut input);
    parser
        .parse_entirely(|p| selector_list(p, false))
        .map_err(selector_error)
}

/// `relative` admits a leading combinator, as in `:has(> img)`.
fn selector_list<'i>(parser: &mut Parser<'i, '_>, relative: bool) -> ParseResult<'i> {
    loop {
        complex_selector(parser, relative)?;
        if parser.try_parse(|p| p.expect_comma()).is_err() {
            return Ok(());
        }
    }
}

fn nested_selector_list<'i>(parser: &mut Parser<'i, '_>, relative: bool) -> ParseResult<'i> {
    selector_list(parser, relative)?;
    parser.expect_exhausted()?;
    Ok(())
}

fn complex_selector<'i>(parser: &mut Parser<'i, '_>, relative: bool) -> ParseResult<'i> {
    parser.skip_whitespace();
    if relative && parser.try_parse(combinator).is_ok() {
        parser.skip_whitespace();
    }
    compound_selector(parser)?;

    loop {
        let before = parser.state();
        let had_whitespace = skip_significant_whitespace(parser);
        if parser.try_parse(combinator).is_ok() {
            parser.skip_whitespace();
            compound_selector(parser)?;
        } else if had_whitespace && starts_compound(parser) {
            // Descendant combinator
            compound_selector(parser)?;
        } else {
            parser.reset(&before);
            return Ok(());
        }
    }
}

/// Whitespace between compounds is a combinator, so it is consumed here
/// rather than skipped by `next()`.
fn skip_significant_whitespace(parser: &mut Parser<'_, '_>) -> bool {
    let mut found = false;
    loop {
        let state = parser.state();
        if matches!(parser.next_including_whitespace(), Ok(Token::WhiteSpace(_))) {
            found = true;
        } else {
            parser.reset(&state);
            return found;
        }
    }
}

/// `>`, `+`, `~` or `||`.
fn combinator<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    let token = parser.next_including_whitespace()?.clone();
    match token {
        Token::Delim('>' | '+' | '~') => Ok(()),
        Token::Delim('|') if matches!(parser.next_including_whitespace(), Ok(Token::Delim('|'))) => {
            Ok(())
        }
        _ => Err(parser.new_custom_error(Invalid::ExpectedSelector)),
    }
}

fn starts_compound(parser: &mut Parser<'_, '_>) -> bool {
    let state = parser.state();
    let starts = matches!(
        parser.next_including_whitespace(),
        Ok(Token::Ident(_)
            | Token::IDHash(_)
            | Token::Colon
            | Token::SquareBracketBlock
            | Token::Delim('.' | '*' | '&' | '|'))
    );
    parser.reset(&state);
    starts
}

fn compound_selector<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    let mut empty = !type_selector(parser)?;

    loop {
        let state = parser.state();
        let Ok(token) = parser.next_including_whitespace().cloned() else {
            parser.reset(&state);
            break;
        };
        match token {
            Token::IDHash(_) | Token::Delim('&') => {}
            Token::Delim('.') => class_name(parser)?,
            Token::SquareBracketBlock => attribute(parser)?,
            Token::Colon => pseudo(parser)?,
            _ => {
                parser.reset(&state);
                break;
            }
        }
        empty = false;
    }

    if empty {
        return Err(parser.new_custom_error(Invalid::ExpectedSelector));
    }
    Ok(())
}

/// Optional `ns|name`, `*|name`, `|name`, `name` or `*`. Returns whether one
/// was consumed.
fn type_selector<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, bool> {
    let state = parser.state();
    let Ok(token) = parser.next_including_whitespace().cloned() else {
        parser.reset(&state);
        return Ok(false);
    };
    match token {
        Token::Ident(_) | Token::Delim('*') => {
            let prefix_end = parser.state();
            if !(is_bar(parser) && element_name(parser)) {
                parser.reset(&prefix_end);
            }
            Ok(true)
        }
        Token::Delim('|') if element_name(parser) => Ok(true),
        Token::Delim('|') => Err(parser.new_custom_error(Invalid::ExpectedIdentifier)),
        _ => {
            parser.reset(&state);
            Ok(false)
        }
    }
}

fn is_bar(parser: &mut Parser<'_, '_>) -> bool {
    matches!(parser.next_including_whitespace(), Ok(Token::Delim('|')))
}

fn element_name(parser: &mut Parser<'_, '_>) -> bool {
    matches!(
        parser.next_including_whitespace(),
        Ok(Token::Ident(_) | Token::Delim('*'))
    )
}

fn class_name<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    let token = parser.next_including_whitespace()?.clone();
    match token {
        Token::Ident(_) => Ok(()),
        _ => Err(parser.new_custom_error(Invalid::ExpectedIdentifier)),
    }
}

/// Called right after `[`.
fn attribute<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    let open = parser.position();
    parser.parse_nested_block(|p| attribute_body(p))?;
    expect_closed(parser, open, ']')
}

fn attribute_body<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    parser.skip_whitespace();
    attribute_name(parser)?;
    if parser.is_exhausted() {
        return Ok(());
    }

    let operator = parser.next()?.clone();
    if !matches!(
        operator,
        Token::Delim('=')
            | Token::IncludeMatch
            | Token::DashMatch
            | Token::PrefixMatch
            | Token::SuffixMatch
            | Token::SubstringMatch
    ) {
        return Err(parser.new_custom_error(Invalid::BadAttribute));
    }

    parser.skip_whitespace();
    let value_start = parser.position();
    let value = parser.next_including_whitespace()?.clone();
    let valid_value = match value {
        Token::Ident(_) => true,
        Token::QuotedString(_) => is_terminated_string(parser.slice_from(value_start)),
        _ => false,
    };
    if !valid_value {
        return Err(parser.new_custom_error(Invalid::BadAttribute));
    }

    if let Ok(flag) = parser.try_parse(|p| p.expect_ident_cloned()) {
        if !flag.eq_ignore_ascii_case("i") && !flag.eq_ignore_ascii_case("s") {
            return Err(parser.new_custom_error(Invalid::BadAttribute));
        }
    }
    parser.expect_exhausted()?;
    Ok(())
}

fn attribute_name<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    let token = parser.next_including_whitespace()?.clone();
    match token {
        Token::Ident(_) | Token::Delim('*') => {
            let prefix_end = parser.state();
            if !(is_bar(parser) && is_ident(parser)) {
                parser.reset(&prefix_end);
            }
            Ok(())
        }
        Token::Delim('|') if is_ident(parser) => Ok(()),
        _ => Err(parser.new_custom_error(Invalid::BadAttribute)),
    }
}

fn is_ident(parser: &mut Parser<'_, '_>) -> bool {
    matches!(parser.next_including_whitespace(), Ok(Token::Ident(_)))
}

/// Called right after `:`.
fn pseudo<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    let mut token = parser.next_including_whitespace()?.clone();
    if matches!(token, Token::Colon) {
        token = parser.next_including_whitespace()?.clone();
    }

    match token {
        Token::Ident(_) => Ok(()),
        Token::Function(name) => {
            let open = parser.position();
            let name = name.to_ascii_lowercase();
            if SELECTOR_ARG_PSEUDOS.contains(&name.as_str()) {
                let relative = name == "has";
                parser.parse_nested_block(|p| nested_selector_list(p, relative))?;
            } else {
                parser.parse_nested_block(|p| opaque_argument(p))?;
            }
            expect_closed(parser, open, ')')
        }
        _ => Err(parser.new_custom_error(Invalid::ExpectedIdentifier)),
    }
}

/// Arguments like `2n + 1` or `en`: any non-empty run of well-formed tokens.
fn opaque_argument<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i> {
    let mut has_content = false;
    loop {
        let start = parser.position();
        let Ok(token) = parser.next_including_whitespace().cloned() else {
            break;
        };
        let well_formed = match token {
            Token::WhiteSpace(_) => continue,
            Token::BadString(_)
            | Token::BadUrl(_)
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::CloseCurlyBracket => false,
            Token::QuotedString(_) => is_terminated_string(parser.slice_from(start)),
            _ => true,
        };
        if !well_formed {
            return Err(parser.new_custom_error(Invalid::ExpectedSelector));
        }
        has_content = true;
    }

    if !has_content {
        return Err(parser.new_custom_error(Invalid::EmptyArgument));
    }
    Ok(())
}

/// The tokenizer closes blocks left open at EOF; reject those.
fn expect_closed<'i>(parser: &Parser<'i, '_>, open: SourcePosition, close: char) -> ParseResult<'i> {
    if parser.slice_from(open).ends_with(close) {
        Ok(())
    } else {
        Err(parser.new_custom_error(Invalid::UnclosedBlock))
    }
}

/// Strings running into EOF still tokenize as `QuotedString`.
fn is_terminated_string(raw: &str) -> bool {
    let Some(quote @ ('"' | '\'')) = raw.chars().next() else {
        return false;
    };
    let Some(content) = raw[1..].strip_suffix(quote) else {
        return false;
    };
    content.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0
}

#[cfg(test)]
mod tests {
    use crate::core::validate::grammar::*;

    fn ok(s: &str) -> bool {
        parse_selector_list(s).is_ok()
    }

    #[test]
    fn test_simple_selectors() {
        assert!(ok("btn"));
        assert!(ok(".btn"));
        assert!(ok("#main"));
        assert!(ok("*"));
        assert!(ok("btn-primary"));
        assert!(ok("_private"));
        assert!(ok("--custom"));
        assert!(ok("-webkit-box"));
        assert!(ok("item-"));
    }

    #[test]
    fn test_identifier_starts() {
        assert!(!ok("4"));
        assert!(!ok("4col"));
        assert!(!ok("-4"));
        assert!(!ok("-"));
        assert!(!ok(".1x"));
        assert!(ok(".\\31 x"));
        assert!(ok("über"));
    }

    #[test]
    fn test_compound_and_complex() {
        assert!(ok("a.btn#x[href]:hover::before"));
        assert!(ok("ul > li + li ~ li"));
        assert!(ok("div  p"));
        assert!(ok("col || td"));
        assert!(ok(".a,.b , .c"));
        assert!(ok("& > .child"));
    }

    #[test]
    fn test_bad_combinators() {
        assert!(!ok("> a"));
        assert!(!ok("a >"));
        assert!(!ok("a > > b"));
        assert!(!ok("a,"));
        assert!(!ok(",a"));
        assert!(!ok("a,,b"));
        assert!(!ok(""));
        assert!(!ok("   "));
    }

    #[test]
    fn test_namespaces() {
        assert!(ok("svg|rect"));
        assert!(ok("*|*"));
        assert!(ok("|a"));
        assert!(ok("[xlink|href]"));
    }

    #[test]
    fn test_attribute_selectors() {
        assert!(ok("[data-state]"));
        assert!(ok("[data-state=open]"));
        assert!(ok("[lang|=en]"));
        assert!(ok("[class~='btn']"));
        assert!(ok(r#"[href^="https://"]"#));
        assert!(ok("[href$='.pdf' i]"));
        assert!(ok("[ data-x *= y ]"));
        assert!(!ok("[data-x"));
        assert!(!ok("[=x]"));
        assert!(!ok("[a==b]"));
        assert!(!ok("[a='unterminated]"));
        assert!(!ok("[a=b c]"));
    }

    #[test]
    fn test_pseudo_selectors() {
        assert!(ok(":root"));
        assert!(ok("a:hover"));
        assert!(ok("p::first-line"));
        assert!(ok(":not(.a, .b)"));
        assert!(ok(":is(h1, h2) > a"));
        assert!(ok(":has(> img)"));
        assert!(ok("li:nth-child(2n + 1)"));
        assert!(ok(":lang(en)"));
        assert!(!ok(":"));
        assert!(!ok("a:"));
        assert!(!ok(":not()"));
        assert!(!ok(":not(.a"));
        assert!(!ok(":nth-child(2n"));
        assert!(!ok(":is(> a)"));
        assert!(!ok(":nth-child( )"));
    }

    #[test]
    fn test_prose_is_rejected() {
        assert!(!ok("Hello, world!"));
        assert!(!ok("what?"));
        assert!(!ok("50%"));
        assert!(!ok("a/b"));
        assert!(!ok("x)"));
    }

    #[test]
    fn test_escapes_are_resolved_by_the_tokenizer() {
        assert!(ok(r".md\:flex"));
        assert!(ok(r".w-1\/2"));
        assert!(ok(r"#\31 23"));
        assert!(!ok("#123"));
    }

    #[test]
    fn test_comments_between_parts() {
        assert!(ok("a/* x */.b"));
        assert!(ok(".a /* x */ > .b"));
    }

    #[test]
    fn test_error_reports_column() {
        let err = parse_selector_list("a!").unwrap_err();
        assert_eq!(err.column, 2);
        assert_eq!(err.to_string(), "unexpected token at column 2");

        let err = parse_selector_list("[data-x").unwrap_err();
        assert_eq!(err.message, "unclosed block");
    }
}
