use std::fmt;
use std::rc::Rc;

use crate::diagnostic::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Float,
    QuotedString,
    Variable,
    Operator,
    LeftBracket,
    RightBracket,
    Newline,
    Eof,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "Identifier",
            TokenKind::Integer => "Integer",
            TokenKind::Float => "Float",
            TokenKind::QuotedString => "QuotedString",
            TokenKind::Variable => "Variable",
            TokenKind::Operator => "Operator",
            TokenKind::LeftBracket => "LeftBracket",
            TokenKind::RightBracket => "RightBracket",
            TokenKind::Newline => "EOL",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// One classified token. Immutable once produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Case-insensitive identifier match, used for keyword dispatch.
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(word)
    }
}

/// Why a block could not be extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockError {
    /// The first non-Newline token after the cursor is not `[`.
    NotFound { at: Position },
    /// End of input before the bracket nesting closed.
    Unclosed { at: Position },
    /// A `to` or `end` appeared inside the block.
    NestedProcedure { keyword: String, at: Position },
}

/// An immutable token arena plus a `[start, end)` view into it. Slicing
/// yields an independent view over the same arena; nothing is spliced or
/// consumed. Indices are absolute arena positions so nested views and their
/// cursors compose.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Rc<[Token]>,
    start: usize,
    end: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens.len();
        Self {
            tokens: tokens.into(),
            start: 0,
            end,
        }
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    pub fn end_index(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The token at an absolute index, if it lies inside this view.
    pub fn get(&self, index: usize) -> Option<&Token> {
        if index >= self.start && index < self.end {
            self.tokens.get(index)
        } else {
            None
        }
    }

    /// The raw tokens of `[start, end)`, clamped to this view.
    pub fn run(&self, start: usize, end: usize) -> &[Token] {
        let start = start.max(self.start).min(self.end);
        let end = end.max(start).min(self.end);
        &self.tokens[start..end]
    }

    /// An independent sub-view over the same arena.
    pub fn slice(&self, start: usize, end: usize) -> TokenStream {
        let start = start.max(self.start).min(self.end);
        let end = end.max(start).min(self.end);
        TokenStream {
            tokens: Rc::clone(&self.tokens),
            start,
            end,
        }
    }

    /// Extract the bracketed block that starts after `cursor`, skipping
    /// leading Newlines. Returns the enclosed view (brackets excluded,
    /// boundary Newlines stripped) and the absolute index of the closing
    /// bracket.
    pub fn extract_block(&self, cursor: usize) -> Result<(TokenStream, usize), BlockError> {
        let fallback = self
            .get(cursor)
            .map(Token::position)
            .unwrap_or_default();

        let mut index = cursor + 1;
        while let Some(token) = self.get(index) {
            if token.kind != TokenKind::Newline {
                break;
            }
            index += 1;
        }

        let open = match self.get(index) {
            Some(token) if token.kind == TokenKind::LeftBracket => index,
            Some(token) => return Err(BlockError::NotFound { at: token.position() }),
            None => return Err(BlockError::NotFound { at: fallback }),
        };

        let mut depth = 0usize;
        let mut index = open;
        let close = loop {
            let token = match self.get(index) {
                Some(token) if token.kind != TokenKind::Eof => token,
                _ => {
                    let at = self
                        .get(index)
                        .or_else(|| self.get(index.saturating_sub(1)))
                        .map(Token::position)
                        .unwrap_or(fallback);
                    return Err(BlockError::Unclosed { at });
                }
            };
            match token.kind {
                TokenKind::LeftBracket => depth += 1,
                TokenKind::RightBracket => {
                    depth -= 1;
                    if depth == 0 {
                        break index;
                    }
                }
                TokenKind::Identifier
                    if token.is_word("to") || token.is_word("end") =>
                {
                    return Err(BlockError::NestedProcedure {
                        keyword: token.text.to_uppercase(),
                        at: token.position(),
                    });
                }
                _ => {}
            }
            index += 1;
        };

        let mut inner_start = open + 1;
        let mut inner_end = close;
        while inner_start < inner_end
            && self.tokens[inner_start].kind == TokenKind::Newline
        {
            inner_start += 1;
        }
        while inner_end > inner_start
            && self.tokens[inner_end - 1].kind == TokenKind::Newline
        {
            inner_end -= 1;
        }

        Ok((self.slice(inner_start, inner_end), close))
    }
}
