//! CSS source -> stylesheet tree.
//!
//! A small recursive-descent parser producing the [`Stylesheet`] shape.
//! It is not a spec-complete CSS parser: it recognizes exactly the
//! structure the filtering engine needs (rules, nested at-rules,
//! comments, declarations) and keeps comments, which mainstream Rust
//! tokenizers throw away but which carry the `uncss:ignore` directive.
//! Malformed input is rejected with a typed error carrying the 1-indexed
//! source location, before any analysis runs.
//!
//! Comments between declarations inside a block are dropped; only
//! node-level comments are preserved.

use crate::error::{UncssError, UncssResult};
use crate::stylesheet::{AtRule, Comment, Declaration, Node, Position, Rule, Stylesheet};

/// Parse a complete stylesheet.
pub fn parse_stylesheet(source: &str) -> UncssResult<Stylesheet> {
    let mut parser = Parser::new(source);
    let nodes = parser.parse_nodes(false)?;
    Ok(Stylesheet { nodes })
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, token: &str) -> bool {
        self.src[self.pos..].starts_with(token)
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, message: impl Into<String>) -> UncssError {
        UncssError::parse(self.line, self.column, message)
    }

    /// Advance `n` bytes, keeping line/column in sync. UTF-8 continuation
    /// bytes do not advance the column.
    fn advance(&mut self, n: usize) {
        let end = (self.pos + n).min(self.bytes.len());
        for &b in &self.bytes[self.pos..end] {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.advance(1);
            } else {
                break;
            }
        }
    }

    fn parse_nodes(&mut self, nested: bool) -> UncssResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    if nested {
                        return Err(self.error("unexpected end of input, expected `}`"));
                    }
                    break;
                }
                Some(b'}') => {
                    if nested {
                        self.advance(1);
                        break;
                    }
                    return Err(self.error("unexpected `}`"));
                }
                Some(_) if self.starts_with("/*") => {
                    nodes.push(Node::Comment(self.parse_comment()?));
                }
                Some(b'@') => nodes.push(Node::AtRule(self.parse_at_rule()?)),
                Some(_) => nodes.push(Node::Rule(self.parse_rule()?)),
            }
        }
        Ok(nodes)
    }

    fn parse_comment(&mut self) -> UncssResult<Comment> {
        let position = self.position();
        let body = &self.src[self.pos + 2..];
        match body.find("*/") {
            Some(end) => {
                let text = body[..end].trim().to_string();
                self.advance(2 + end + 2);
                Ok(Comment {
                    text,
                    position: Some(position),
                })
            }
            None => Err(self.error("unterminated comment")),
        }
    }

    fn parse_at_rule(&mut self) -> UncssResult<AtRule> {
        let position = self.position();
        self.advance(1); // `@`
        let name_start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'-' {
                self.advance(1);
            } else {
                break;
            }
        }
        if self.pos == name_start {
            return Err(self.error("expected at-rule name after `@`"));
        }
        let name = self.src[name_start..self.pos].to_string();

        let params_start = self.pos;
        loop {
            match self.peek() {
                None | Some(b'{') | Some(b';') => break,
                Some(b'"') | Some(b'\'') => {
                    self.take_string()?;
                }
                Some(_) => self.advance(1),
            }
        }
        let params = self.src[params_start..self.pos].trim().to_string();

        let mut at = AtRule {
            name,
            params,
            children: Vec::new(),
            declarations: Vec::new(),
            has_block: false,
            position: Some(position),
        };

        match self.peek() {
            // statement at-rule (`@import ...;`), also tolerated at EOF
            None => {}
            Some(b';') => self.advance(1),
            Some(_) => {
                // must be `{`
                self.advance(1);
                at.has_block = true;
                if at.is_keyframes() || at.is_conditional() {
                    at.children = self.parse_nodes(true)?;
                } else {
                    at.declarations = self.parse_declaration_block()?;
                }
            }
        }
        Ok(at)
    }

    fn parse_rule(&mut self) -> UncssResult<Rule> {
        let position = self.position();
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error("unexpected end of input, expected `{`")),
                Some(b'{') => break,
                Some(b';') | Some(b'}') => {
                    return Err(self.error("expected `{` after selector"));
                }
                Some(b'"') | Some(b'\'') => {
                    self.take_string()?;
                }
                Some(_) => self.advance(1),
            }
        }
        let selectors = split_selectors(&self.src[start..self.pos]);
        if selectors.is_empty() {
            return Err(self.error("rule with empty selector"));
        }
        self.advance(1); // `{`
        let declarations = self.parse_declaration_block()?;
        Ok(Rule {
            selectors,
            declarations,
            position: Some(position),
        })
    }

    /// Consume a declaration block up to and including the closing `}`.
    fn parse_declaration_block(&mut self) -> UncssResult<Vec<Declaration>> {
        let mut raw = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error("unexpected end of input inside declaration block"));
                }
                Some(b'}') => {
                    self.advance(1);
                    break;
                }
                Some(_) if self.starts_with("/*") => {
                    self.parse_comment()?;
                }
                Some(b'"') | Some(b'\'') => {
                    let quoted = self.take_string()?;
                    raw.push_str(quoted);
                }
                Some(_) => {
                    let rest = &self.src[self.pos..];
                    let ch = rest
                        .chars()
                        .next()
                        .ok_or_else(|| self.error("invalid input"))?;
                    raw.push(ch);
                    self.advance(ch.len_utf8());
                }
            }
        }
        Ok(split_declarations(&raw))
    }

    /// Consume a quoted string (including quotes), honoring backslash
    /// escapes, and return it verbatim.
    fn take_string(&mut self) -> UncssResult<&'a str> {
        let start = self.pos;
        let quote = self.bytes[self.pos];
        self.advance(1);
        while let Some(b) = self.peek() {
            if b == b'\\' && self.pos + 1 < self.bytes.len() {
                self.advance(2);
                continue;
            }
            self.advance(1);
            if b == quote {
                return Ok(&self.src[start..self.pos]);
            }
        }
        Err(self.error("unterminated string"))
    }
}

/// Split comma-separated selectors, ignoring commas nested in parens,
/// brackets, or strings (`:is(a, b)`, `[data-x="a,b"]`).
fn split_selectors(text: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                current.push(ch);
                escaped = true;
            }
            '"' | '\'' => {
                current.push(ch);
                match quote {
                    Some(q) if q == ch => quote = None,
                    Some(_) => {}
                    None => quote = Some(ch),
                }
            }
            '(' | '[' if quote.is_none() => {
                current.push(ch);
                depth += 1;
            }
            ')' | ']' if quote.is_none() => {
                current.push(ch);
                depth = depth.saturating_sub(1);
            }
            ',' if quote.is_none() && depth == 0 => {
                let selector = normalize_selector_whitespace(&current);
                if !selector.is_empty() {
                    selectors.push(selector);
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    let selector = normalize_selector_whitespace(&current);
    if !selector.is_empty() {
        selectors.push(selector);
    }
    selectors
}

/// Collapse internal whitespace runs (including newlines) to single
/// spaces so selector strings compare stably.
fn normalize_selector_whitespace(selector: &str) -> String {
    selector.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a raw declaration block body on top-level semicolons.
fn split_declarations(raw: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in raw.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                current.push(ch);
                escaped = true;
            }
            '"' | '\'' => {
                current.push(ch);
                match quote {
                    Some(q) if q == ch => quote = None,
                    Some(_) => {}
                    None => quote = Some(ch),
                }
            }
            '(' if quote.is_none() => {
                current.push(ch);
                depth += 1;
            }
            ')' if quote.is_none() => {
                current.push(ch);
                depth = depth.saturating_sub(1);
            }
            ';' if quote.is_none() && depth == 0 => {
                if let Some(decl) = parse_declaration(&current) {
                    declarations.push(decl);
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if let Some(decl) = parse_declaration(&current) {
        declarations.push(decl);
    }
    declarations
}

fn parse_declaration(text: &str) -> Option<Declaration> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let colon = trimmed.find(':')?;
    let property = trimmed[..colon].trim();
    let value = trimmed[colon + 1..].trim();
    if property.is_empty() {
        return None;
    }
    Some(Declaration {
        property: property.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_rule() {
        let sheet = parse_stylesheet(".a{color:red} .b{color:blue}").unwrap();
        assert_eq!(sheet.nodes.len(), 2);
        match &sheet.nodes[0] {
            Node::Rule(rule) => {
                assert_eq!(rule.selectors, vec![".a"]);
                assert_eq!(rule.declarations.len(), 1);
                assert_eq!(rule.declarations[0].property, "color");
                assert_eq!(rule.declarations[0].value, "red");
            }
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_selector_list_with_nested_commas() {
        let sheet = parse_stylesheet(":is(h1, h2), [data-x=\"a,b\"] { margin: 0; }").unwrap();
        match &sheet.nodes[0] {
            Node::Rule(rule) => {
                assert_eq!(rule.selectors, vec![":is(h1, h2)", "[data-x=\"a,b\"]"]);
            }
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_comment_preserved() {
        let sheet = parse_stylesheet("/* uncss:ignore */\n.unused{color:red}").unwrap();
        assert_eq!(sheet.nodes.len(), 2);
        match &sheet.nodes[0] {
            Node::Comment(comment) => assert_eq!(comment.text, "uncss:ignore"),
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_media_nesting() {
        let sheet =
            parse_stylesheet("@media (min-width: 900px) { .unused { width: 50%; } }").unwrap();
        match &sheet.nodes[0] {
            Node::AtRule(at) => {
                assert_eq!(at.name, "media");
                assert_eq!(at.params, "(min-width: 900px)");
                assert_eq!(at.children.len(), 1);
                assert!(matches!(at.children[0], Node::Rule(_)));
            }
            other => panic!("expected at-rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_keyframes_stops() {
        let sheet =
            parse_stylesheet("@keyframes spin { from { opacity: 0; } 50% { opacity: 0.5; } }")
                .unwrap();
        match &sheet.nodes[0] {
            Node::AtRule(at) => {
                assert!(at.is_keyframes());
                assert_eq!(at.params, "spin");
                assert_eq!(at.children.len(), 2);
                match &at.children[1] {
                    Node::Rule(stop) => assert_eq!(stop.selectors, vec!["50%"]),
                    other => panic!("expected stop rule, got {:?}", other),
                }
            }
            other => panic!("expected at-rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_font_face_declarations() {
        let sheet =
            parse_stylesheet("@font-face { font-family: \"My Font\"; src: url(f.woff2); }")
                .unwrap();
        match &sheet.nodes[0] {
            Node::AtRule(at) => {
                assert!(at.children.is_empty());
                assert_eq!(at.declarations.len(), 2);
                assert_eq!(at.declarations[0].value, "\"My Font\"");
            }
            other => panic!("expected at-rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_statement_at_rule() {
        let sheet = parse_stylesheet("@import url(base.css);\n@charset \"utf-8\";").unwrap();
        assert_eq!(sheet.nodes.len(), 2);
        match &sheet.nodes[0] {
            Node::AtRule(at) => {
                assert!(!at.has_block);
                assert_eq!(at.params, "url(base.css)");
            }
            other => panic!("expected at-rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_declaration_value_with_url_colon() {
        let sheet = parse_stylesheet(".a { background: url(http://x/y.png); }").unwrap();
        match &sheet.nodes[0] {
            Node::Rule(rule) => {
                assert_eq!(rule.declarations[0].value, "url(http://x/y.png)");
            }
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_has_location() {
        let err = parse_stylesheet(".a { color: red;").unwrap_err();
        assert!(err.location().is_some());
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_parse_error_on_stray_brace() {
        assert!(parse_stylesheet("}").is_err());
        assert!(parse_stylesheet(".a{} }").is_err());
    }

    #[test]
    fn test_parse_position_tracking() {
        let sheet = parse_stylesheet(".a{}\n.b{}").unwrap();
        match &sheet.nodes[1] {
            Node::Rule(rule) => {
                let pos = rule.position.unwrap();
                assert_eq!(pos.line, 2);
                assert_eq!(pos.column, 1);
            }
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_roundtrip_through_display() {
        let css = "@media screen {\n  .a {\n    color: red;\n  }\n}\n";
        let sheet = parse_stylesheet(css).unwrap();
        assert_eq!(sheet.to_css(), css);
    }
}
