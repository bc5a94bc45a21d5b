use crate::ast::{CollectionType, VarType};
use crate::error::CompilerError;
use crate::frontend::lexer::TokenKind;

use super::Parser;

impl Parser {
    /// Parses a type annotation: a scalar type name, `list[T]`, `tuple[T]`,
    /// or `dict[string, V]`. Containers nest exactly one level deep; the
    /// element and value slots only admit scalar type names.
    pub(super) fn parse_collection_type(&mut self) -> Result<CollectionType, CompilerError> {
        match self.peek_kind() {
            TokenKind::List => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let element = self.parse_scalar_type()?;
                self.expect(TokenKind::RBracket)?;

                let ty = CollectionType::list(element);
                self.include_for(&ty);
                Ok(ty)
            }
            TokenKind::Tuple => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let element = self.parse_scalar_type()?;
                self.expect(TokenKind::RBracket)?;

                let ty = CollectionType::tuple(element);
                self.include_for(&ty);
                Ok(ty)
            }
            TokenKind::Dict => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let line = self.line();
                let key = self.parse_scalar_type()?;
                if key != VarType::String {
                    return Err(CompilerError::Type {
                        message: format!("dictionary keys must be strings at line {}", line),
                    });
                }
                self.expect(TokenKind::Comma)?;
                let value = self.parse_scalar_type()?;
                self.expect(TokenKind::RBracket)?;

                let ty = CollectionType::dict(value);
                self.include_for(&ty);
                Ok(ty)
            }
            _ => {
                let base = self.parse_scalar_type()?;
                let ty = CollectionType::scalar(base);
                self.include_for(&ty);
                Ok(ty)
            }
        }
    }

    fn parse_scalar_type(&mut self) -> Result<VarType, CompilerError> {
        let base = match self.peek_kind() {
            TokenKind::Int => VarType::Int,
            TokenKind::Float => VarType::Float,
            TokenKind::StringType => VarType::String,
            TokenKind::Bool => VarType::Bool,
            found => {
                return Err(CompilerError::Parse {
                    message: format!("invalid type {:?} at line {}", found, self.line()),
                });
            }
        };
        self.advance();
        Ok(base)
    }
}
