//! Minimal WKT reader.
//!
//! Reads the bracketed `KEYWORD["name", value, CHILD[...]]` structure shared
//! by WKT1 and WKT2 into a tree of nodes. No semantics are attached here;
//! [`crate::crs`] walks the tree for the pieces it needs.

use crate::error::{GridError, GridResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WktValue {
    Text(String),
    Number(f64),
    Word(String),
    Node(WktNode),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WktNode {
    pub keyword: String,
    pub values: Vec<WktValue>,
}

impl WktNode {
    pub fn parse(input: &str) -> GridResult<Self> {
        let mut parser = Parser {
            chars: input.chars().collect(),
            pos: 0,
        };
        parser.skip_whitespace();
        let keyword = parser.word();
        if keyword.is_empty() {
            return Err(GridError::invalid_wkt("expected a keyword at the start"));
        }
        let node = parser.node(keyword)?;
        parser.skip_whitespace();
        if parser.pos != parser.chars.len() {
            return Err(GridError::invalid_wkt(format!(
                "unexpected trailing content at offset {}",
                parser.pos
            )));
        }
        Ok(node)
    }

    /// The leading quoted name, e.g. `"WGS 84"` in `DATUM["WGS 84", ...]`.
    pub fn name(&self) -> Option<&str> {
        match self.values.first() {
            Some(WktValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Numeric value at a position in the argument list.
    pub fn number(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(WktValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    /// Direct children with the given keyword.
    pub fn children<'a, 'k>(&'a self, keyword: &'k str) -> impl Iterator<Item = &'a WktNode> + 'k
    where
        'a: 'k,
    {
        self.values.iter().filter_map(move |value| match value {
            WktValue::Node(node) if node.keyword.eq_ignore_ascii_case(keyword) => Some(node),
            _ => None,
        })
    }

    /// First direct child matching any of the keywords.
    pub fn child(&self, keywords: &[&str]) -> Option<&WktNode> {
        keywords
            .iter()
            .find_map(|keyword| self.children(keyword).next())
    }

    /// Depth-first search for the first node matching any of the keywords.
    pub fn find(&self, keywords: &[&str]) -> Option<&WktNode> {
        if keywords
            .iter()
            .any(|keyword| self.keyword.eq_ignore_ascii_case(keyword))
        {
            return Some(self);
        }
        self.values.iter().find_map(|value| match value {
            WktValue::Node(node) => node.find(keywords),
            _ => None,
        })
    }

    /// Code from an `ID["EPSG", code]` (or WKT1 `AUTHORITY`) child.
    pub fn epsg_code(&self) -> Option<i64> {
        let id = self.child(&["ID", "AUTHORITY"])?;
        if !id.name()?.eq_ignore_ascii_case("EPSG") {
            return None;
        }
        match id.values.get(1) {
            Some(WktValue::Number(v)) => Some(*v as i64),
            Some(WktValue::Text(s)) => s.parse().ok(),
            _ => None,
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn node(&mut self, keyword: String) -> GridResult<WktNode> {
        self.skip_whitespace();
        let close = match self.peek() {
            Some('[') => ']',
            Some('(') => ')',
            other => {
                return Err(GridError::invalid_wkt(format!(
                    "expected '[' after {}, found {:?}",
                    keyword, other
                )))
            }
        };
        self.pos += 1;

        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) && values.is_empty() {
                self.pos += 1;
                break;
            }
            values.push(self.value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                other => {
                    return Err(GridError::invalid_wkt(format!(
                        "unterminated {} node, found {:?}",
                        keyword, other
                    )))
                }
            }
        }

        Ok(WktNode { keyword, values })
    }

    fn value(&mut self) -> GridResult<WktValue> {
        match self.peek() {
            Some('"') => self.quoted().map(WktValue::Text),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                self.number().map(WktValue::Number)
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.word();
                let save = self.pos;
                self.skip_whitespace();
                if matches!(self.peek(), Some('[') | Some('(')) {
                    self.node(word).map(WktValue::Node)
                } else {
                    self.pos = save;
                    Ok(WktValue::Word(word))
                }
            }
            other => Err(GridError::invalid_wkt(format!(
                "unexpected character {:?} at offset {}",
                other, self.pos
            ))),
        }
    }

    fn quoted(&mut self) -> GridResult<String> {
        // opening quote
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('"') if self.chars.get(self.pos + 1) == Some(&'"') => {
                    text.push('"');
                    self.pos += 2;
                }
                Some('"') => {
                    self.pos += 1;
                    return Ok(text);
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
                None => return Err(GridError::invalid_wkt("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> GridResult<f64> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse()
            .map_err(|_| GridError::invalid_wkt(format!("invalid number '{}'", literal)))
    }
}
