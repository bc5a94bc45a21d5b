#![cfg(test)]

use crate::error::CompilerError;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize().expect("lexing failed")
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

fn lex_err(source: &str) -> String {
    match Lexer::new(source).tokenize() {
        Ok(tokens) => panic!("expected a lex error, got {:?}", tokens),
        Err(CompilerError::Lex { message }) => message,
        Err(other) => panic!("expected a lex error, got {:?}", other),
    }
}

#[test]
fn lexes_a_simple_assignment() {
    assert_eq!(
        kinds("int x = 1\n"),
        vec![
            TokenKind::Int,
            TokenKind::Identifier,
            TokenKind::Equals,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn blocks_produce_indent_and_dedent() {
    assert_eq!(
        kinds("if true:\n    print(x)\n"),
        vec![
            TokenKind::If,
            TokenKind::True,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Print,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn tabs_count_as_four_spaces() {
    assert_eq!(
        kinds("if true:\n\tprint(x)\n"),
        kinds("if true:\n    print(x)\n")
    );
}

#[test]
fn indents_and_dedents_are_balanced() {
    let source = "\
def f(int a): int:
    if a > 0:
        return a
    return a
while true:
    print(1)
";
    let tokens = lex(source);
    let mut open = 0i32;
    for token in &tokens {
        match token.kind {
            TokenKind::Indent => open += 1,
            TokenKind::Dedent => {
                open -= 1;
                assert!(open >= 0, "dedent without matching indent");
            }
            _ => {}
        }
    }
    assert_eq!(open, 0);
}

#[test]
fn blank_lines_are_skipped() {
    let with_blanks = kinds("int x = 1\n\n\nint y = 2\n");
    let without = kinds("int x = 1\nint y = 2\n");
    assert_eq!(with_blanks, without);
}

#[test]
fn missing_trailing_newline_is_synthesized() {
    assert_eq!(kinds("int x = 1"), kinds("int x = 1\n"));
}

#[test]
fn eof_closes_open_blocks() {
    let tokens = lex("if true:\n    print(x)");
    let tail: Vec<TokenKind> = tokens[tokens.len() - 3..].iter().map(|t| t.kind).collect();
    assert_eq!(
        tail,
        vec![TokenKind::Newline, TokenKind::Dedent, TokenKind::Eof]
    );
}

#[test]
fn string_literal_lexeme_drops_the_quotes() {
    let tokens = lex("string s = \"hello\"\n");
    let lit = tokens
        .iter()
        .find(|t| t.kind == TokenKind::StringLiteral)
        .unwrap();
    assert_eq!(lit.lexeme, "hello");
}

#[test]
fn method_names_are_a_distinct_kind() {
    let tokens = lex("string t = s.upper()\n");
    let method = tokens
        .iter()
        .find(|t| t.kind == TokenKind::CallMethod)
        .unwrap();
    assert_eq!(method.lexeme, "upper");
}

#[test]
fn keyword_prefixes_stay_identifiers() {
    let tokens = lex("int iffy = 1\n");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].lexeme, "iffy");
}

#[test]
fn fstring_tokens_carry_chunks_and_specs() {
    let tokens = lex("string s = f\"v={x:>3}!\"\n");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::StringType,
            TokenKind::Identifier,
            TokenKind::Equals,
            TokenKind::FStringStart,
            TokenKind::StringLiteral,
            TokenKind::FStringExprStart,
            TokenKind::Identifier,
            TokenKind::FStringFormatSpec,
            TokenKind::FStringExprEnd,
            TokenKind::StringLiteral,
            TokenKind::FStringEnd,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[4].lexeme, "v=");
    assert_eq!(tokens[7].lexeme, ">3");
    assert_eq!(tokens[9].lexeme, "!");
}

#[test]
fn fstring_expressions_relex_as_general_tokens() {
    let tokens = lex("string s = f\"{a + 1}\"\n");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::StringType,
            TokenKind::Identifier,
            TokenKind::Equals,
            TokenKind::FStringStart,
            TokenKind::FStringExprStart,
            TokenKind::Identifier,
            TokenKind::Plus,
            TokenKind::Number,
            TokenKind::FStringExprEnd,
            TokenKind::FStringEnd,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn two_decimal_points_are_a_malformed_number() {
    let message = lex_err("float x = 1.2.3\n");
    assert!(message.contains("malformed number"), "{}", message);
    assert!(message.contains("line 1"), "{}", message);
}

#[test]
fn invalid_characters_cite_their_line() {
    let message = lex_err("int x = 1\nint y = @\n");
    assert!(message.contains("invalid character"), "{}", message);
    assert!(message.contains("line 2"), "{}", message);
}

#[test]
fn unterminated_strings_are_rejected() {
    let message = lex_err("string s = \"abc\n");
    assert!(message.contains("unterminated string"), "{}", message);
}

#[test]
fn unterminated_fstrings_are_rejected() {
    let message = lex_err("string s = f\"abc\n");
    assert!(message.contains("unterminated f-string"), "{}", message);
}

#[test]
fn inconsistent_indentation_is_an_error() {
    let message = lex_err("if true:\n    print(x)\n   print(x)\n");
    assert!(message.contains("inconsistent indentation"), "{}", message);
    assert!(message.contains("line 3"), "{}", message);
}

#[test]
fn partial_dedent_to_a_known_level_is_fine() {
    let source = "\
if true:
    if true:
        print(x)
    print(x)
print(x)
";
    let tokens = lex(source);
    let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
    let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
    assert_eq!(indents, 2);
    assert_eq!(dedents, 2);
}
