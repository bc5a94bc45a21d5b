pub mod ast;
pub mod error;
mod backend;
mod frontend;

use backend::codegen::Codegen;
use error::CompilerError;
use frontend::lexer::Lexer;
use frontend::parser::Parser;

/// Compiles MiniPy source code to a C translation unit.
/// Returns Ok(c_source) on success, Err(CompilerError) on failure.
pub fn compile(source: &str) -> Result<String, CompilerError> {
    let tokens = Lexer::new(source).tokenize()?;
    log::debug!("lexed {} tokens", tokens.len());

    let program = Parser::new(tokens).parse_program()?;
    log::debug!(
        "parsed {} top-level statements, {} helper headers",
        program.statements.len(),
        program.includes.len()
    );

    let mut codegen = Codegen::new();
    let c_source = codegen.compile(&program)?;
    log::debug!("emitted {} bytes of C", c_source.len());

    Ok(c_source)
}
