use std::fmt;

#[derive(Debug, Clone)]
pub enum CompilerError {
    Lex { message: String },
    Parse { message: String },
    Type { message: String },
    Codegen { message: String },
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerError::Lex { message } => write!(f, "Lex error: {}", message),
            CompilerError::Parse { message } => write!(f, "Parse error: {}", message),
            CompilerError::Type { message } => write!(f, "Type error: {}", message),
            CompilerError::Codegen { message } => write!(f, "Codegen error: {}", message),
        }
    }
}

impl std::error::Error for CompilerError {}
