mod tests;

use logos::Logos;

use crate::error::CompilerError;

/// Raw single-token patterns. Layout (NEWLINE/INDENT/DEDENT) and f-string
/// structure are synthesized by the `Lexer` wrapper below.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
enum RawToken {
    #[token("def")]
    Def,
    #[token("return")]
    Return,
    #[token("print")]
    Print,
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("in")]
    In,
    #[token("range")]
    Range,
    #[token("match")]
    Match,
    #[token("case")]
    Case,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("len")]
    Len,
    #[token("sep")]
    Sep,

    #[token("int")]
    Int,
    #[token("float")]
    Float,
    #[token("string")]
    StringType,
    #[token("bool")]
    Bool,
    #[token("list")]
    List,
    #[token("tuple")]
    Tuple,
    #[token("dict")]
    Dict,

    // Method names are a distinguished kind, not general identifiers.
    #[regex("append|upper|lower|strip|replace|split|find", priority = 10)]
    CallMethod,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    #[regex(r"[0-9]+")]
    Number,
    #[regex(r"[0-9]+\.[0-9]*|\.[0-9]+")]
    Floating,
    // A second decimal point is caught here so it can be reported as a
    // malformed number rather than as two tokens.
    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)\.[0-9.]*")]
    MalformedNumber,
    #[regex(r#""[^"\n]*""#)]
    StringLiteral,
    #[regex(r#""[^"\n]*"#)]
    UnterminatedString,
    #[token("f\"")]
    FStringStart,

    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("==")]
    Eq,
    #[token("=")]
    Equals,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessEq,
    #[token("<")]
    Less,
    #[token(">=")]
    GreaterEq,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // A newline plus everything up to the next piece of content, so blank
    // lines collapse into the token and the trailing run is the new
    // line's indentation.
    #[regex(r"\n[ \t\r\n]*")]
    Newline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Def,
    Return,
    Print,
    If,
    Elif,
    Else,
    For,
    While,
    In,
    Range,
    Match,
    Case,
    And,
    Or,
    Not,
    True,
    False,
    Len,
    Sep,

    Int,
    Float,
    StringType,
    Bool,
    List,
    Tuple,
    Dict,

    Identifier,
    Number,
    Floating,
    StringLiteral,
    CallMethod,

    FStringStart,
    FStringEnd,
    FStringExprStart,
    FStringExprEnd,
    FStringFormatSpec,

    Colon,
    Comma,
    Dot,
    Equals,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Newline,
    Indent,
    Dedent,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    FStringBody,
    FStringExpr,
}

pub struct Lexer<'a> {
    inner: logos::Lexer<'a, RawToken>,
    line: u32,
    indents: Vec<u32>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            inner: RawToken::lexer(source),
            line: 1,
            indents: vec![0],
        }
    }

    /// Produces the full token stream, INDENT/DEDENT included, ending in EOF.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompilerError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut mode = Mode::Normal;
        let mut brace_depth: u32 = 0;

        loop {
            if mode == Mode::FStringBody {
                let rem = self.inner.remainder();
                match rem.chars().next() {
                    None | Some('\n') => return Err(self.err("unterminated f-string")),
                    Some('"') => {
                        self.inner.bump(1);
                        self.emit(&mut tokens, TokenKind::FStringEnd, "");
                        mode = Mode::Normal;
                    }
                    Some('{') => {
                        self.inner.bump(1);
                        self.emit(&mut tokens, TokenKind::FStringExprStart, "{");
                        mode = Mode::FStringExpr;
                        brace_depth = 0;
                    }
                    Some('}') => return Err(self.err("unmatched '}' in f-string")),
                    Some(_) => {
                        let end = rem
                            .find(|c| matches!(c, '"' | '{' | '}' | '\n'))
                            .unwrap_or(rem.len());
                        let chunk = rem[..end].to_string();
                        self.inner.bump(end);
                        self.emit(&mut tokens, TokenKind::StringLiteral, &chunk);
                    }
                }
                continue;
            }

            let raw = match self.inner.next() {
                Some(Ok(raw)) => raw,
                Some(Err(())) => {
                    let found = self.inner.slice().to_string();
                    return Err(self.err(&format!("invalid character {:?}", found)));
                }
                None => break,
            };

            match raw {
                RawToken::MalformedNumber => {
                    let found = self.inner.slice().to_string();
                    return Err(self.err(&format!("malformed number {:?}", found)));
                }
                RawToken::UnterminatedString => {
                    return Err(self.err("unterminated string literal"));
                }
                _ => {}
            }

            match mode {
                Mode::Normal => match raw {
                    RawToken::Newline => self.handle_newline(&mut tokens)?,
                    RawToken::FStringStart => {
                        self.emit(&mut tokens, TokenKind::FStringStart, "");
                        mode = Mode::FStringBody;
                    }
                    other => self.emit_raw(&mut tokens, other),
                },
                Mode::FStringExpr => match raw {
                    RawToken::LBrace => {
                        brace_depth += 1;
                        self.emit_raw(&mut tokens, raw);
                    }
                    RawToken::RBrace if brace_depth == 0 => {
                        self.emit(&mut tokens, TokenKind::FStringExprEnd, "}");
                        mode = Mode::FStringBody;
                    }
                    RawToken::RBrace => {
                        brace_depth -= 1;
                        self.emit_raw(&mut tokens, raw);
                    }
                    RawToken::Colon if brace_depth == 0 => {
                        let rem = self.inner.remainder();
                        let end = rem
                            .find(|c| matches!(c, '}' | '"' | '\n'))
                            .unwrap_or(rem.len());
                        if !rem[end..].starts_with('}') {
                            return Err(self.err("unterminated f-string"));
                        }
                        let spec = rem[..end].to_string();
                        self.inner.bump(end);
                        self.emit(&mut tokens, TokenKind::FStringFormatSpec, &spec);
                    }
                    RawToken::Newline => return Err(self.err("unterminated f-string")),
                    RawToken::FStringStart => {
                        return Err(self.err("nested f-strings are not supported"));
                    }
                    other => self.emit_raw(&mut tokens, other),
                },
                Mode::FStringBody => unreachable!(),
            }
        }

        if mode != Mode::Normal {
            return Err(self.err("unterminated f-string"));
        }

        // Close the last line and any open blocks before EOF.
        let open_line = tokens
            .last()
            .map(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Dedent))
            .unwrap_or(false);
        if open_line {
            self.emit(&mut tokens, TokenKind::Newline, "");
        }
        while *self.indents.last().unwrap() > 0 {
            self.indents.pop();
            self.emit(&mut tokens, TokenKind::Dedent, "");
        }
        self.emit(&mut tokens, TokenKind::Eof, "");

        Ok(tokens)
    }

    fn handle_newline(&mut self, tokens: &mut Vec<Token>) -> Result<(), CompilerError> {
        let slice = self.inner.slice().to_string();
        let newline_count = slice.bytes().filter(|b| *b == b'\n').count() as u32;

        // Terminate the current line unless there is nothing to terminate.
        let has_content = tokens
            .last()
            .map(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent))
            .unwrap_or(false);
        if has_content {
            self.emit(tokens, TokenKind::Newline, "");
        }
        self.line += newline_count;

        if self.inner.remainder().is_empty() {
            // Trailing DEDENTs are produced at EOF.
            return Ok(());
        }

        // Indentation of the upcoming line: the run after the last newline,
        // with tabs counted as 4 spaces.
        let tail = &slice[slice.rfind('\n').unwrap() + 1..];
        let mut spaces: u32 = 0;
        for ch in tail.chars() {
            match ch {
                '\t' => spaces += 4,
                ' ' => spaces += 1,
                _ => {}
            }
        }

        let top = *self.indents.last().unwrap();
        if spaces > top {
            self.indents.push(spaces);
            self.emit(tokens, TokenKind::Indent, "");
        } else if spaces < top {
            while spaces < *self.indents.last().unwrap() {
                self.indents.pop();
                self.emit(tokens, TokenKind::Dedent, "");
            }
            if spaces != *self.indents.last().unwrap() {
                return Err(self.err("inconsistent indentation"));
            }
        }

        Ok(())
    }

    fn emit(&self, tokens: &mut Vec<Token>, kind: TokenKind, lexeme: &str) {
        tokens.push(Token {
            kind,
            lexeme: lexeme.to_string(),
            line: self.line,
        });
    }

    fn emit_raw(&self, tokens: &mut Vec<Token>, raw: RawToken) {
        let kind = match raw {
            RawToken::Def => TokenKind::Def,
            RawToken::Return => TokenKind::Return,
            RawToken::Print => TokenKind::Print,
            RawToken::If => TokenKind::If,
            RawToken::Elif => TokenKind::Elif,
            RawToken::Else => TokenKind::Else,
            RawToken::For => TokenKind::For,
            RawToken::While => TokenKind::While,
            RawToken::In => TokenKind::In,
            RawToken::Range => TokenKind::Range,
            RawToken::Match => TokenKind::Match,
            RawToken::Case => TokenKind::Case,
            RawToken::And => TokenKind::And,
            RawToken::Or => TokenKind::Or,
            RawToken::Not => TokenKind::Not,
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,
            RawToken::Len => TokenKind::Len,
            RawToken::Sep => TokenKind::Sep,
            RawToken::Int => TokenKind::Int,
            RawToken::Float => TokenKind::Float,
            RawToken::StringType => TokenKind::StringType,
            RawToken::Bool => TokenKind::Bool,
            RawToken::List => TokenKind::List,
            RawToken::Tuple => TokenKind::Tuple,
            RawToken::Dict => TokenKind::Dict,
            RawToken::CallMethod => TokenKind::CallMethod,
            RawToken::Identifier => TokenKind::Identifier,
            RawToken::Number => TokenKind::Number,
            RawToken::Floating => TokenKind::Floating,
            RawToken::StringLiteral => TokenKind::StringLiteral,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Equals => TokenKind::Equals,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::LessEq => TokenKind::LessEq,
            RawToken::Less => TokenKind::Less,
            RawToken::GreaterEq => TokenKind::GreaterEq,
            RawToken::Greater => TokenKind::Greater,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Newline
            | RawToken::FStringStart
            | RawToken::MalformedNumber
            | RawToken::UnterminatedString => {
                unreachable!("handled by the mode machine")
            }
        };
        let lexeme = match raw {
            RawToken::StringLiteral => {
                let s = self.inner.slice();
                s[1..s.len() - 1].to_string()
            }
            _ => self.inner.slice().to_string(),
        };
        tokens.push(Token {
            kind,
            lexeme,
            line: self.line,
        });
    }

    fn err(&self, message: &str) -> CompilerError {
        CompilerError::Lex {
            message: format!("{} at line {}", message, self.line),
        }
    }
}

