use crate::rsql::{Comparison, Node, SearchOp};
use thiserror::Error as ThisError;

///
/// RSQL parser
///
/// Hand-written recursive descent over the raw query string. Whitespace is
/// not skipped: bare tokens end at the first reserved character, and stray
/// whitespace is a syntax error, exactly as in the source language. A failed
/// parse never yields a partial AST.
///

///
/// ParseError
///
/// Every positioned variant carries the byte offset where the failure was
/// detected.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ParseError {
    #[error("unterminated quoted string starting at {at}")]
    UnterminatedQuote { at: usize },

    #[error("unknown operator '{symbol}' at {at}")]
    UnknownOperator { symbol: String, at: usize },

    #[error("expected a selector at {at}")]
    EmptySelector { at: usize },

    #[error("expected an argument at {at}")]
    EmptyArgument { at: usize },

    #[error("empty value list at {at}")]
    EmptyList { at: usize },

    #[error("unbalanced parenthesis opened at {at}")]
    UnbalancedParen { at: usize },

    #[error("unexpected character '{ch}' at {at}")]
    UnexpectedChar { ch: char, at: usize },

    #[error("unexpected end of query")]
    UnexpectedEnd,

    #[error("unexpected trailing input at {at}")]
    TrailingInput { at: usize },
}

impl ParseError {
    /// Byte offset of the failure, when one is known.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::UnterminatedQuote { at }
            | Self::UnknownOperator { at, .. }
            | Self::EmptySelector { at }
            | Self::EmptyArgument { at }
            | Self::EmptyList { at }
            | Self::UnbalancedParen { at }
            | Self::UnexpectedChar { at, .. }
            | Self::TrailingInput { at } => Some(*at),
            Self::UnexpectedEnd => None,
        }
    }
}

/// Parse a raw query string into an AST.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let mut parser = Parser { input, pos: 0 };
    let node = parser.or_expr()?;

    match parser.peek() {
        None => Ok(node),
        Some(_) => Err(ParseError::TrailingInput { at: parser.pos }),
    }
}

///
/// Parser
///

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    // query := and_expr (',' and_expr)*
    fn or_expr(&mut self) -> Result<Node, ParseError> {
        let mut children = vec![self.and_expr()?];
        while self.peek() == Some(',') {
            self.bump();
            children.push(self.and_expr()?);
        }

        Ok(match children.len() {
            1 => children.swap_remove(0),
            _ => Node::Or(children),
        })
    }

    // and_expr := primary (';' primary)*
    fn and_expr(&mut self) -> Result<Node, ParseError> {
        let mut children = vec![self.primary()?];
        while self.peek() == Some(';') {
            self.bump();
            children.push(self.primary()?);
        }

        Ok(match children.len() {
            1 => children.swap_remove(0),
            _ => Node::And(children),
        })
    }

    // primary := '(' query ')' | comparison
    fn primary(&mut self) -> Result<Node, ParseError> {
        if self.peek() != Some('(') {
            return self.comparison();
        }

        let open = self.pos;
        self.bump();
        let node = self.or_expr()?;
        if self.peek() == Some(')') {
            self.bump();
            Ok(node)
        } else {
            Err(ParseError::UnbalancedParen { at: open })
        }
    }

    // comparison := selector operator argument
    fn comparison(&mut self) -> Result<Node, ParseError> {
        let selector = self.selector()?;
        let op = self.operator()?;
        let args = if op.takes_list() {
            self.list_args()?
        } else {
            vec![self.argument()?]
        };

        Ok(Node::Comparison(Comparison::new(selector, op, args)))
    }

    fn selector(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if is_selector_char(ch)) {
            self.bump();
        }

        if self.pos == start {
            return Err(ParseError::EmptySelector { at: start });
        }

        Ok(self.input[start..self.pos].to_string())
    }

    // operator := '==' | '!=' | '=' letters '='
    fn operator(&mut self) -> Result<SearchOp, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some('=') => {
                self.bump();
                match self.peek() {
                    Some('=') => {
                        self.bump();
                        Ok(SearchOp::Equal)
                    }
                    Some(ch) if ch.is_ascii_alphabetic() => {
                        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphabetic()) {
                            self.bump();
                        }
                        if self.peek() == Some('=') {
                            self.bump();
                        }
                        let symbol = &self.input[start..self.pos];
                        SearchOp::from_symbol(symbol).ok_or_else(|| ParseError::UnknownOperator {
                            symbol: symbol.to_string(),
                            at: start,
                        })
                    }
                    _ => Err(ParseError::UnknownOperator {
                        symbol: "=".to_string(),
                        at: start,
                    }),
                }
            }
            Some('!') => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    Ok(SearchOp::NotEqual)
                } else {
                    Err(ParseError::UnknownOperator {
                        symbol: "!".to_string(),
                        at: start,
                    })
                }
            }
            Some(ch) => Err(ParseError::UnexpectedChar { ch, at: self.pos }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    // argument := quoted | bare
    fn argument(&mut self) -> Result<String, ParseError> {
        if self.peek() == Some('"') {
            self.quoted()
        } else {
            self.bare()
        }
    }

    // Quoted strings may contain any reserved character except the quote
    // itself; there are no escape sequences.
    fn quoted(&mut self) -> Result<String, ParseError> {
        let open = self.pos;
        self.bump();
        let start = self.pos;

        while let Some(ch) = self.peek() {
            if ch == '"' {
                let value = self.input[start..self.pos].to_string();
                self.bump();
                return Ok(value);
            }
            self.bump();
        }

        Err(ParseError::UnterminatedQuote { at: open })
    }

    fn bare(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if !is_reserved(ch)) {
            self.bump();
        }

        if self.pos == start {
            return Err(ParseError::EmptyArgument { at: start });
        }

        Ok(self.input[start..self.pos].to_string())
    }

    // list := '(' argument (',' argument)* ')'
    fn list_args(&mut self) -> Result<Vec<String>, ParseError> {
        let open = self.pos;
        match self.peek() {
            Some('(') => self.bump(),
            Some(ch) => return Err(ParseError::UnexpectedChar { ch, at: self.pos }),
            None => return Err(ParseError::UnexpectedEnd),
        }

        if self.peek() == Some(')') {
            return Err(ParseError::EmptyList { at: open });
        }

        let mut args = vec![self.argument()?];
        loop {
            match self.peek() {
                Some(',') => {
                    self.bump();
                    args.push(self.argument()?);
                }
                Some(')') => {
                    self.bump();
                    return Ok(args);
                }
                Some(ch) => return Err(ParseError::UnexpectedChar { ch, at: self.pos }),
                None => return Err(ParseError::UnbalancedParen { at: open }),
            }
        }
    }
}

const fn is_selector_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}

const fn is_reserved(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '(' | ')' | ';' | ',' | '=' | '!' | '<' | '>' | '~'
    ) || ch.is_whitespace()
}

///
/// TESTS
///
