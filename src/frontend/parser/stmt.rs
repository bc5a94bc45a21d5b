use crate::ast::{CollectionType, Node, VarType};
use crate::error::CompilerError;
use crate::frontend::lexer::TokenKind;
use crate::frontend::symbols::FunctionSig;

use super::expr::{assignable, ExprVal};
use super::Parser;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Result<Node, CompilerError> {
        match self.peek_kind() {
            TokenKind::Def => self.parse_function(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Int
            | TokenKind::Float
            | TokenKind::StringType
            | TokenKind::Bool
            | TokenKind::List
            | TokenKind::Tuple
            | TokenKind::Dict => self.parse_assignment(),
            TokenKind::Identifier => match self.peek_kind_at(1) {
                TokenKind::LParen => self.parse_call_stmt(),
                TokenKind::Dot => self.parse_method_stmt(),
                TokenKind::LBracket => self.parse_index_assignment(),
                TokenKind::Equals => self.parse_reassignment(),
                found => Err(CompilerError::Parse {
                    message: format!(
                        "unexpected {:?} after identifier at line {}",
                        found,
                        self.line()
                    ),
                }),
            },
            found => Err(CompilerError::Parse {
                message: format!("unexpected {:?} at line {}", found, self.line()),
            }),
        }
    }

    fn check_assignment(
        &self,
        target: &CollectionType,
        value: &ExprVal,
        line: u32,
    ) -> Result<(), CompilerError> {
        let ok = match target.base {
            VarType::Int => value.ty.base == VarType::Int,
            VarType::Float => value.ty.base.is_numeric(),
            VarType::String => value.ty.base == VarType::String,
            VarType::Bool => value.ty.base == VarType::Bool,
            VarType::List | VarType::Tuple | VarType::Dict => value.ty == *target,
            VarType::None => false,
        };
        if !ok {
            return Err(CompilerError::Type {
                message: format!(
                    "type mismatch in assignment: cannot assign {} to {} at line {}",
                    value.ty.describe(),
                    target.describe(),
                    line
                ),
            });
        }
        Ok(())
    }

    /// `<type> <name> = <expr>`. Binding a new name is a declaration; a
    /// visible name with the same type is a reassignment.
    fn parse_assignment(&mut self) -> Result<Node, CompilerError> {
        let ty = self.parse_collection_type()?;
        let name_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expression(0)?;
        self.check_assignment(&ty, &value, name_tok.line)?;

        let is_declaration = match self.variables().lookup(&name_tok.lexeme) {
            Some(existing) => {
                if existing != ty {
                    return Err(CompilerError::Type {
                        message: format!(
                            "conflicting declaration of '{}': was {}, now {} at line {}",
                            name_tok.lexeme,
                            existing.describe(),
                            ty.describe(),
                            name_tok.line
                        ),
                    });
                }
                false
            }
            None => {
                self.variables().define(name_tok.lexeme.clone(), ty);
                true
            }
        };

        self.expect(TokenKind::Newline)?;

        Ok(Node::Assign {
            prelude: value.prelude,
            name: name_tok.lexeme,
            expr: value.code,
            ty,
            is_declaration,
        })
    }

    /// `<name> = <expr>` for an already-declared variable.
    fn parse_reassignment(&mut self) -> Result<Node, CompilerError> {
        let name_tok = self.expect(TokenKind::Identifier)?;
        let ty = self.lookup_variable(&name_tok.lexeme, name_tok.line)?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expression(0)?;
        self.check_assignment(&ty, &value, name_tok.line)?;
        self.expect(TokenKind::Newline)?;

        Ok(Node::Assign {
            prelude: value.prelude,
            name: name_tok.lexeme,
            expr: value.code,
            ty,
            is_declaration: false,
        })
    }

    fn parse_function(&mut self) -> Result<Node, CompilerError> {
        let def_tok = self.expect(TokenKind::Def)?;
        if self.current_return().is_some() {
            return Err(CompilerError::Parse {
                message: format!(
                    "nested function definitions are not supported at line {}",
                    def_tok.line
                ),
            });
        }
        let name_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::LParen)?;

        let mut params: Vec<(String, CollectionType)> = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let ty = self.parse_collection_type()?;
                let param_tok = self.expect(TokenKind::Identifier)?;
                params.push((param_tok.lexeme, ty));
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        // The block colon is mandatory; a return type slots in before it.
        let mut return_type = CollectionType::NONE;
        if self.check(TokenKind::Colon) && self.peek_kind_at(1) != TokenKind::Newline {
            self.advance();
            return_type = self.parse_collection_type()?;
        }
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;

        // Recorded before the body so recursive calls resolve.
        self.function_table().insert(
            name_tok.lexeme.clone(),
            FunctionSig {
                params: params.iter().map(|(_, ty)| *ty).collect(),
                returns: return_type,
            },
        );

        let saved_scopes = self.enter_function_scope();
        for (param_name, param_ty) in &params {
            self.variables().define(param_name.clone(), *param_ty);
        }
        let saved_return = self.set_current_return(Some(return_type));

        let mut body = Vec::new();
        while !self.check(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::Dedent)?;

        self.set_current_return(saved_return);
        self.leave_function_scope(saved_scopes);

        Ok(Node::Function {
            name: name_tok.lexeme,
            params,
            return_type,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Node, CompilerError> {
        let ret_tok = self.expect(TokenKind::Return)?;
        let value = self.parse_expression(0)?;
        self.expect(TokenKind::Newline)?;

        let Some(expected) = self.current_return() else {
            return Err(CompilerError::Type {
                message: format!("'return' outside of a function at line {}", ret_tok.line),
            });
        };
        if expected.base == VarType::None {
            return Err(CompilerError::Type {
                message: format!(
                    "function has no return type but returns a value at line {}",
                    ret_tok.line
                ),
            });
        }
        if !assignable(&value.ty, &expected) {
            return Err(CompilerError::Type {
                message: format!(
                    "type mismatch in return: expected {}, found {} at line {}",
                    expected.describe(),
                    value.ty.describe(),
                    ret_tok.line
                ),
            });
        }

        Ok(Node::Return {
            prelude: value.prelude,
            expr: value.code,
            ty: expected,
        })
    }

    fn parse_call_stmt(&mut self) -> Result<Node, CompilerError> {
        let (name, line, args) = self.parse_call_parts()?;
        self.expect(TokenKind::Newline)?;
        let sig = self.check_call(&name, line, &args)?;

        let mut prelude = Vec::new();
        let mut codes = Vec::new();
        for arg in args {
            prelude.extend(arg.prelude);
            codes.push(arg.code);
        }

        let temp = if sig.returns.is_heap() {
            Some(self.next_temp("call"))
        } else {
            None
        };
        self.include_for(&sig.returns);

        Ok(Node::Call {
            prelude,
            temp,
            name,
            args: codes,
            return_type: sig.returns,
        })
    }

    fn parse_method_stmt(&mut self) -> Result<Node, CompilerError> {
        let (node, _, _) = self.parse_method_call()?;
        self.expect(TokenKind::Newline)?;
        Ok(node)
    }

    /// `name[index] = value` on a list or dict.
    fn parse_index_assignment(&mut self) -> Result<Node, CompilerError> {
        let var_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::LBracket)?;
        let index = self.parse_expression(0)?;
        self.expect(TokenKind::RBracket)?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expression(0)?;
        self.expect(TokenKind::Newline)?;

        let ty = self.lookup_variable(&var_tok.lexeme, var_tok.line)?;
        let code = match ty.base {
            VarType::List => {
                if index.ty.base != VarType::Int {
                    return Err(CompilerError::Type {
                        message: format!(
                            "list index must be an integer at line {}",
                            var_tok.line
                        ),
                    });
                }
                if !assignable(&value.ty, &CollectionType::scalar(ty.element)) {
                    return Err(CompilerError::Type {
                        message: format!("type mismatch in list assignment at line {}", var_tok.line),
                    });
                }
                self.include_for(&ty);
                format!("{}->data[{}] = {};", var_tok.lexeme, index.code, value.code)
            }
            VarType::Dict => {
                if index.ty.base != VarType::String {
                    return Err(CompilerError::Type {
                        message: format!("dict index must be a string at line {}", var_tok.line),
                    });
                }
                if !assignable(&value.ty, &CollectionType::scalar(ty.value)) {
                    return Err(CompilerError::Type {
                        message: format!("type mismatch in dict assignment at line {}", var_tok.line),
                    });
                }
                self.include_for(&ty);
                format!(
                    "dict_set_string_{}({}, {}, {});",
                    ty.value.c_name(),
                    var_tok.lexeme,
                    index.code,
                    value.code
                )
            }
            VarType::Tuple => {
                return Err(CompilerError::Type {
                    message: format!("tuple elements cannot be assigned at line {}", var_tok.line),
                });
            }
            _ => {
                return Err(CompilerError::Type {
                    message: format!(
                        "indexing is only supported for lists and dicts at line {}",
                        var_tok.line
                    ),
                });
            }
        };

        let mut prelude = index.prelude;
        prelude.extend(value.prelude);
        Ok(Node::Helper { prelude, code })
    }

    fn parse_print(&mut self) -> Result<Node, CompilerError> {
        self.expect(TokenKind::Print)?;
        self.expect(TokenKind::LParen)?;

        let mut prelude = Vec::new();
        let mut values = Vec::new();
        let mut separator = " ".to_string();

        if !self.check(TokenKind::RParen) {
            let first = self.parse_expression(0)?;
            self.include_for(&first.ty);
            prelude.extend(first.prelude);
            values.push((first.code, first.ty));

            while self.match_token(TokenKind::Comma) {
                if self.check(TokenKind::Sep) {
                    self.advance();
                    self.expect(TokenKind::Equals)?;
                    if !self.check(TokenKind::StringLiteral) {
                        return Err(CompilerError::Type {
                            message: format!(
                                "separator must be a string literal at line {}",
                                self.line()
                            ),
                        });
                    }
                    separator = self.advance().lexeme;
                    break;
                }
                let value = self.parse_expression(0)?;
                self.include_for(&value.ty);
                prelude.extend(value.prelude);
                values.push((value.code, value.ty));
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Newline)?;

        Ok(Node::Print {
            prelude,
            values,
            separator,
        })
    }

    fn parse_condition(&mut self) -> Result<(Vec<Node>, String), CompilerError> {
        let line = self.line();
        let value = self.parse_expression(0)?;
        if value.ty.base != VarType::Bool {
            return Err(CompilerError::Type {
                message: format!(
                    "condition must be a boolean, found {} at line {}",
                    value.ty.describe(),
                    line
                ),
            });
        }
        Ok((value.prelude, value.code))
    }

    fn parse_block(&mut self) -> Result<Vec<Node>, CompilerError> {
        self.variables().push_scope();
        let mut body = Vec::new();
        while !self.check(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::Dedent)?;
        self.variables().pop_scope();
        Ok(body)
    }

    fn parse_if(&mut self) -> Result<Node, CompilerError> {
        self.expect(TokenKind::If)?;
        let (cond_prelude, condition) = self.parse_condition()?;
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;
        let body = self.parse_block()?;

        let mut arms = vec![(cond_prelude, condition, body)];

        while self.check(TokenKind::Elif) {
            self.advance();
            let (elif_prelude, elif_condition) = self.parse_condition()?;
            self.expect(TokenKind::Colon)?;
            self.expect(TokenKind::Newline)?;
            self.expect(TokenKind::Indent)?;
            let elif_body = self.parse_block()?;
            arms.push((elif_prelude, elif_condition, elif_body));
        }

        let else_body = if self.match_token(TokenKind::Else) {
            self.expect(TokenKind::Colon)?;
            self.expect(TokenKind::Newline)?;
            self.expect(TokenKind::Indent)?;
            self.parse_block()?
        } else {
            Vec::new()
        };

        Ok(Node::If { arms, else_body })
    }

    fn parse_for(&mut self) -> Result<Node, CompilerError> {
        self.expect(TokenKind::For)?;
        let var_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::In)?;
        self.expect(TokenKind::Range)?;
        self.expect(TokenKind::LParen)?;

        let bound_line = self.line();
        let start = self.parse_expression(0)?;
        self.expect(TokenKind::Comma)?;
        let end = self.parse_expression(0)?;
        if start.ty.base != VarType::Int || end.ty.base != VarType::Int {
            return Err(CompilerError::Type {
                message: format!("range bounds must be integers at line {}", bound_line),
            });
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;

        // The loop variable lives in the body scope.
        self.variables().push_scope();
        self.variables()
            .define(var_tok.lexeme.clone(), CollectionType::scalar(VarType::Int));
        let mut body = Vec::new();
        while !self.check(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::Dedent)?;
        self.variables().pop_scope();

        let mut prelude = start.prelude;
        prelude.extend(end.prelude);

        Ok(Node::For {
            prelude,
            var: var_tok.lexeme,
            start: start.code,
            end: end.code,
            body,
        })
    }

    fn parse_while(&mut self) -> Result<Node, CompilerError> {
        self.expect(TokenKind::While)?;
        let (prelude, condition) = self.parse_condition()?;
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;
        let body = self.parse_block()?;

        Ok(Node::While {
            prelude,
            condition,
            body,
        })
    }

    fn parse_match(&mut self) -> Result<Node, CompilerError> {
        self.expect(TokenKind::Match)?;
        let line = self.line();
        let value = self.parse_expression(0)?;
        if value.ty.base != VarType::Int && value.ty.base != VarType::Bool {
            return Err(CompilerError::Type {
                message: format!("match expression must be int or bool at line {}", line),
            });
        }
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;

        let mut cases = Vec::new();
        let mut default = Vec::new();

        while self.check(TokenKind::Case) {
            self.advance();
            let pattern = match self.peek_kind() {
                TokenKind::Number | TokenKind::True | TokenKind::False => self.advance().lexeme,
                TokenKind::Identifier if self.peek().lexeme == "_" => {
                    self.advance();
                    "_".to_string()
                }
                found => {
                    return Err(CompilerError::Parse {
                        message: format!("invalid match pattern {:?} at line {}", found, self.line()),
                    });
                }
            };
            self.expect(TokenKind::Colon)?;
            self.expect(TokenKind::Newline)?;
            self.expect(TokenKind::Indent)?;
            let body = self.parse_block()?;

            if pattern == "_" {
                default = body;
            } else {
                cases.push((pattern, body));
            }
        }
        self.expect(TokenKind::Dedent)?;

        Ok(Node::Match {
            prelude: value.prelude,
            expr: value.code,
            cases,
            default,
        })
    }
}
