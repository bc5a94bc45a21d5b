use crate::ast::{CollectionType, Node, VarType};
use crate::error::CompilerError;
use crate::frontend::lexer::TokenKind;
use crate::frontend::symbols::FunctionSig;

use super::Parser;

/// A lowered expression: the C text of its value, its type, and any nodes
/// that must be emitted as statements before the value can be used.
pub(super) struct ExprVal {
    pub prelude: Vec<Node>,
    pub code: String,
    pub ty: CollectionType,
}

impl ExprVal {
    fn plain(code: String, ty: CollectionType) -> Self {
        ExprVal {
            prelude: Vec::new(),
            code,
            ty,
        }
    }
}

/// Assignment compatibility: exact type match, or int widening to float.
pub(super) fn assignable(from: &CollectionType, to: &CollectionType) -> bool {
    from == to || (to.base == VarType::Float && from.base == VarType::Int)
}

fn widen(a: VarType, b: VarType) -> VarType {
    if a == VarType::Float || b == VarType::Float {
        VarType::Float
    } else {
        VarType::Int
    }
}

/// Translates an f-string format spec (`[<|>|^][width][.prec][type]`) to a
/// printf conversion. `<` maps to the `-` flag; `>` and `^` keep printf's
/// default right alignment. Without an explicit type character the
/// conversion is chosen from the expression's type.
fn printf_spec(spec: &str, ty: &CollectionType) -> String {
    let mut out = String::from("%");
    let mut chars = spec.chars().peekable();

    match chars.peek() {
        Some('<') => {
            out.push('-');
            chars.next();
        }
        Some('>') | Some('^') => {
            chars.next();
        }
        _ => {}
    }
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            out.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    if chars.peek() == Some(&'.') {
        out.push('.');
        chars.next();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                out.push(*c);
                chars.next();
            } else {
                break;
            }
        }
    }
    match chars.next() {
        Some(c) => out.push(c),
        None => out.push_str(match ty.base {
            VarType::Int => "d",
            VarType::Float => "f",
            _ => "s",
        }),
    }

    out
}

impl Parser {
    pub(super) fn parse_expression(&mut self, min_bp: u8) -> Result<ExprVal, CompilerError> {
        let mut left = self.parse_primary()?;

        loop {
            let kind = self.peek_kind();
            let Some((lbp, rbp)) = Parser::infix_binding_power(kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            let line = self.line();
            self.advance();
            let right = self.parse_expression(rbp)?;
            left = self.combine_binary(left, kind, right, line)?;
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<ExprVal, CompilerError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let tok = self.advance();
                Ok(ExprVal::plain(
                    tok.lexeme,
                    CollectionType::scalar(VarType::Int),
                ))
            }
            TokenKind::Floating => {
                let tok = self.advance();
                Ok(ExprVal::plain(
                    tok.lexeme,
                    CollectionType::scalar(VarType::Float),
                ))
            }
            TokenKind::StringLiteral => {
                let tok = self.advance();
                self.include("string_utils.h");
                Ok(ExprVal::plain(
                    format!("\"{}\"", tok.lexeme),
                    CollectionType::scalar(VarType::String),
                ))
            }
            TokenKind::True | TokenKind::False => {
                let tok = self.advance();
                Ok(ExprVal::plain(
                    tok.lexeme,
                    CollectionType::scalar(VarType::Bool),
                ))
            }
            TokenKind::Identifier => match self.peek_kind_at(1) {
                TokenKind::LParen => self.parse_call_expr(),
                TokenKind::LBracket => self.parse_index_expr(),
                TokenKind::Dot => self.parse_method_expr(),
                _ => {
                    let tok = self.advance();
                    let ty = self.lookup_variable(&tok.lexeme, tok.line)?;
                    self.include_for(&ty);
                    Ok(ExprVal::plain(tok.lexeme, ty))
                }
            },
            TokenKind::FStringStart => self.parse_fstring(),
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LParen => self.parse_group_or_tuple(),
            TokenKind::LBrace => self.parse_dict_literal(),
            TokenKind::Len => self.parse_len(),
            TokenKind::Not | TokenKind::Minus => self.parse_prefix(),
            found => Err(CompilerError::Parse {
                message: format!("invalid expression {:?} at line {}", found, self.line()),
            }),
        }
    }

    fn parse_prefix(&mut self) -> Result<ExprVal, CompilerError> {
        let op = self.advance();
        let rbp = Parser::prefix_binding_power(op.kind).unwrap();
        let operand = self.parse_expression(rbp)?;

        match op.kind {
            TokenKind::Not => {
                if operand.ty.base != VarType::Bool {
                    return Err(CompilerError::Type {
                        message: format!(
                            "operand of 'not' must be a boolean, found {} at line {}",
                            operand.ty.describe(),
                            op.line
                        ),
                    });
                }
                Ok(ExprVal {
                    prelude: operand.prelude,
                    code: format!("(!{})", operand.code),
                    ty: CollectionType::scalar(VarType::Bool),
                })
            }
            TokenKind::Minus => {
                if !operand.ty.base.is_numeric() {
                    return Err(CompilerError::Type {
                        message: format!(
                            "operand of unary '-' must be numeric, found {} at line {}",
                            operand.ty.describe(),
                            op.line
                        ),
                    });
                }
                Ok(ExprVal {
                    prelude: operand.prelude,
                    code: format!("(-{})", operand.code),
                    ty: operand.ty,
                })
            }
            _ => unreachable!(),
        }
    }

    fn combine_binary(
        &mut self,
        left: ExprVal,
        op: TokenKind,
        right: ExprVal,
        line: u32,
    ) -> Result<ExprVal, CompilerError> {
        let mut prelude = left.prelude;
        prelude.extend(right.prelude);
        let (l, r) = (left.code, right.code);
        let (lt, rt) = (left.ty, right.ty);

        let both_numeric = lt.base.is_numeric() && rt.base.is_numeric();

        let (code, ty) = match op {
            TokenKind::Plus => {
                if both_numeric {
                    (
                        format!("({} + {})", l, r),
                        CollectionType::scalar(widen(lt.base, rt.base)),
                    )
                } else if lt.base == VarType::String && rt.base == VarType::String {
                    self.include("string_utils.h");
                    (
                        format!("str_concat({}, {})", l, r),
                        CollectionType::scalar(VarType::String),
                    )
                } else if lt.base == VarType::List && lt == rt {
                    self.include_for(&lt);
                    (format!("list_concat_{}({}, {})", lt.element.c_name(), l, r), lt)
                } else {
                    return Err(invalid_operands("+", &lt, &rt, line));
                }
            }
            TokenKind::Minus | TokenKind::Star => {
                if !both_numeric {
                    let symbol = if op == TokenKind::Minus { "-" } else { "*" };
                    return Err(invalid_operands(symbol, &lt, &rt, line));
                }
                let symbol = if op == TokenKind::Minus { "-" } else { "*" };
                (
                    format!("({} {} {})", l, symbol, r),
                    CollectionType::scalar(widen(lt.base, rt.base)),
                )
            }
            TokenKind::Slash => {
                if !both_numeric {
                    return Err(invalid_operands("/", &lt, &rt, line));
                }
                // Division always yields a float; int operands need the cast
                // or C truncates.
                let code = if lt.base == VarType::Int && rt.base == VarType::Int {
                    format!("((float){} / {})", l, r)
                } else {
                    format!("({} / {})", l, r)
                };
                (code, CollectionType::scalar(VarType::Float))
            }
            TokenKind::Eq | TokenKind::NotEq => {
                let symbol = if op == TokenKind::Eq { "==" } else { "!=" };
                let code = if both_numeric {
                    format!("({} {} {})", l, symbol, r)
                } else if lt == rt && lt.base == VarType::String {
                    self.include("string_utils.h");
                    format!("(strcmp({}, {}) {} 0)", l, r, symbol)
                } else if lt == rt && lt.base == VarType::Bool {
                    format!("({} {} {})", l, symbol, r)
                } else {
                    return Err(CompilerError::Type {
                        message: format!(
                            "cannot compare {} and {} at line {}",
                            lt.describe(),
                            rt.describe(),
                            line
                        ),
                    });
                };
                (code, CollectionType::scalar(VarType::Bool))
            }
            TokenKind::Less | TokenKind::Greater | TokenKind::LessEq | TokenKind::GreaterEq => {
                let symbol = match op {
                    TokenKind::Less => "<",
                    TokenKind::Greater => ">",
                    TokenKind::LessEq => "<=",
                    _ => ">=",
                };
                if !both_numeric {
                    return Err(invalid_operands(symbol, &lt, &rt, line));
                }
                (
                    format!("({} {} {})", l, symbol, r),
                    CollectionType::scalar(VarType::Bool),
                )
            }
            TokenKind::And | TokenKind::Or => {
                let symbol = if op == TokenKind::And { "&&" } else { "||" };
                if lt.base != VarType::Bool || rt.base != VarType::Bool {
                    let name = if op == TokenKind::And { "and" } else { "or" };
                    return Err(invalid_operands(name, &lt, &rt, line));
                }
                (
                    format!("({} {} {})", l, symbol, r),
                    CollectionType::scalar(VarType::Bool),
                )
            }
            _ => unreachable!("not a binary operator: {:?}", op),
        };

        Ok(ExprVal { prelude, code, ty })
    }

    /// `name(arg, ...)`, shared by expression and statement position.
    pub(super) fn parse_call_parts(
        &mut self,
    ) -> Result<(String, u32, Vec<ExprVal>), CompilerError> {
        let name_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression(0)?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok((name_tok.lexeme, name_tok.line, args))
    }

    pub(super) fn check_call(
        &self,
        name: &str,
        line: u32,
        args: &[ExprVal],
    ) -> Result<FunctionSig, CompilerError> {
        let sig = match self.functions_ref().get(name) {
            Some(sig) => sig.clone(),
            None => {
                return Err(CompilerError::Type {
                    message: format!("undefined function '{}' at line {}", name, line),
                });
            }
        };

        if sig.params.len() != args.len() {
            return Err(CompilerError::Type {
                message: format!(
                    "function '{}' expects {} arguments, found {} at line {}",
                    name,
                    sig.params.len(),
                    args.len(),
                    line
                ),
            });
        }
        for (index, (arg, param)) in args.iter().zip(sig.params.iter()).enumerate() {
            if !assignable(&arg.ty, param) {
                return Err(CompilerError::Type {
                    message: format!(
                        "argument {} of '{}' expects {}, found {} at line {}",
                        index + 1,
                        name,
                        param.describe(),
                        arg.ty.describe(),
                        line
                    ),
                });
            }
        }

        Ok(sig)
    }

    fn parse_call_expr(&mut self) -> Result<ExprVal, CompilerError> {
        let (name, line, args) = self.parse_call_parts()?;
        let sig = self.check_call(&name, line, &args)?;

        let mut prelude = Vec::new();
        let mut codes = Vec::new();
        for arg in args {
            prelude.extend(arg.prelude);
            codes.push(arg.code);
        }
        self.include_for(&sig.returns);

        Ok(ExprVal {
            prelude,
            code: format!("{}({})", name, codes.join(", ")),
            ty: sig.returns,
        })
    }

    fn parse_index_expr(&mut self) -> Result<ExprVal, CompilerError> {
        let var_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::LBracket)?;
        let index = self.parse_expression(0)?;
        self.expect(TokenKind::RBracket)?;

        let ty = self.lookup_variable(&var_tok.lexeme, var_tok.line)?;
        self.include_for(&ty);

        match ty.base {
            VarType::List | VarType::Tuple => {
                if index.ty.base != VarType::Int {
                    return Err(CompilerError::Type {
                        message: format!(
                            "{} index must be an integer at line {}",
                            ty.base.c_name(),
                            var_tok.line
                        ),
                    });
                }
                Ok(ExprVal {
                    prelude: index.prelude,
                    code: format!("{}->data[{}]", var_tok.lexeme, index.code),
                    ty: CollectionType::scalar(ty.element),
                })
            }
            VarType::Dict => {
                if index.ty.base != VarType::String {
                    return Err(CompilerError::Type {
                        message: format!("dict index must be a string at line {}", var_tok.line),
                    });
                }
                Ok(ExprVal {
                    prelude: index.prelude,
                    code: format!(
                        "dict_get_string_{}({}, {})",
                        ty.value.c_name(),
                        var_tok.lexeme,
                        index.code
                    ),
                    ty: CollectionType::scalar(ty.value),
                })
            }
            _ => Err(CompilerError::Type {
                message: format!(
                    "indexing is only supported for lists, tuples, and dicts at line {}",
                    var_tok.line
                ),
            }),
        }
    }

    fn parse_method_expr(&mut self) -> Result<ExprVal, CompilerError> {
        let line = self.line();
        let (node, temp, ty) = self.parse_method_call()?;
        let Some(temp) = temp else {
            return Err(CompilerError::Type {
                message: format!("method call does not produce a value at line {}", line),
            });
        };
        Ok(ExprVal {
            prelude: vec![node],
            code: temp,
            ty,
        })
    }

    /// `receiver.method(args)` against the fixed method table. Returns the
    /// lowered node, the temporary holding the result (if the method
    /// produces a value), and the result type.
    pub(super) fn parse_method_call(
        &mut self,
    ) -> Result<(Node, Option<String>, CollectionType), CompilerError> {
        let recv_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Dot)?;
        let method_tok = self.expect(TokenKind::CallMethod)?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression(0)?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let receiver_ty = self.lookup_variable(&recv_tok.lexeme, recv_tok.line)?;
        let line = method_tok.line;
        let method = method_tok.lexeme;

        let arity = |expected: usize| -> Result<(), CompilerError> {
            if args.len() != expected {
                Err(CompilerError::Type {
                    message: format!(
                        "method '{}' expects {} arguments, found {} at line {}",
                        method, expected, args.len(), line
                    ),
                })
            } else {
                Ok(())
            }
        };
        let string_arg = |arg: &ExprVal| -> Result<(), CompilerError> {
            if arg.ty.base != VarType::String {
                Err(CompilerError::Type {
                    message: format!(
                        "method '{}' expects string arguments, found {} at line {}",
                        method,
                        arg.ty.describe(),
                        line
                    ),
                })
            } else {
                Ok(())
            }
        };

        let return_type = match (receiver_ty.base, method.as_str()) {
            (VarType::List, "append") => {
                arity(1)?;
                let element = CollectionType::scalar(receiver_ty.element);
                if !assignable(&args[0].ty, &element) {
                    return Err(CompilerError::Type {
                        message: format!(
                            "'append' expects {}, found {} at line {}",
                            element.describe(),
                            args[0].ty.describe(),
                            line
                        ),
                    });
                }
                CollectionType::NONE
            }
            (VarType::String, "upper" | "lower" | "strip") => {
                arity(0)?;
                CollectionType::scalar(VarType::String)
            }
            (VarType::String, "replace") => {
                arity(2)?;
                string_arg(&args[0])?;
                string_arg(&args[1])?;
                CollectionType::scalar(VarType::String)
            }
            (VarType::String, "split") => {
                if args.len() > 1 {
                    arity(1)?;
                }
                if let Some(arg) = args.first() {
                    string_arg(arg)?;
                }
                self.include("list_string.h");
                CollectionType::list(VarType::String)
            }
            (VarType::String, "find") => {
                arity(1)?;
                string_arg(&args[0])?;
                CollectionType::scalar(VarType::Int)
            }
            _ => {
                return Err(CompilerError::Type {
                    message: format!(
                        "method '{}' is not defined for {} at line {}",
                        method,
                        receiver_ty.describe(),
                        line
                    ),
                });
            }
        };

        self.include_for(&receiver_ty);

        let temp = if return_type.base == VarType::None {
            None
        } else {
            Some(self.next_temp("method"))
        };

        let mut prelude = Vec::new();
        let mut codes = Vec::new();
        for arg in args {
            prelude.extend(arg.prelude);
            codes.push(arg.code);
        }

        let node = Node::MethodCall {
            prelude,
            temp: temp.clone(),
            receiver: recv_tok.lexeme,
            method,
            args: codes,
            receiver_ty,
            return_type,
        };

        Ok((node, temp, return_type))
    }

    fn parse_len(&mut self) -> Result<ExprVal, CompilerError> {
        let len_tok = self.advance();
        self.expect(TokenKind::LParen)?;
        let inner = self.parse_expression(0)?;
        self.expect(TokenKind::RParen)?;

        let code = match inner.ty.base {
            VarType::String => {
                self.include("string_utils.h");
                format!("strlen({})", inner.code)
            }
            VarType::List | VarType::Tuple | VarType::Dict => {
                self.include_for(&inner.ty);
                format!("{}->size", inner.code)
            }
            _ => {
                return Err(CompilerError::Type {
                    message: format!(
                        "len() is not defined for {} at line {}",
                        inner.ty.describe(),
                        len_tok.line
                    ),
                });
            }
        };

        Ok(ExprVal {
            prelude: inner.prelude,
            code,
            ty: CollectionType::scalar(VarType::Int),
        })
    }

    fn parse_fstring(&mut self) -> Result<ExprVal, CompilerError> {
        self.expect(TokenKind::FStringStart)?;

        let mut format = String::new();
        let mut rendered_args: Vec<String> = Vec::new();
        let mut prelude: Vec<Node> = Vec::new();

        loop {
            match self.peek_kind() {
                TokenKind::StringLiteral => {
                    let tok = self.advance();
                    format.push_str(&tok.lexeme.replace('%', "%%"));
                }
                TokenKind::FStringExprStart => {
                    self.advance();
                    let ExprVal {
                        prelude: inner_prelude,
                        code,
                        ty,
                    } = self.parse_expression(0)?;
                    prelude.extend(inner_prelude);

                    let spec = if self.check(TokenKind::FStringFormatSpec) {
                        Some(self.advance().lexeme)
                    } else {
                        None
                    };
                    self.expect(TokenKind::FStringExprEnd)?;

                    match spec {
                        Some(spec) => format.push_str(&printf_spec(&spec, &ty)),
                        None => format.push_str(ty.printf_conversion()),
                    }
                    self.include_for(&ty);
                    rendered_args.push(ty.printf_arg(&code));
                }
                TokenKind::FStringEnd => {
                    self.advance();
                    break;
                }
                found => {
                    return Err(CompilerError::Parse {
                        message: format!(
                            "unexpected {:?} in f-string at line {}",
                            found,
                            self.line()
                        ),
                    });
                }
            }
        }

        let temp = self.next_temp("string");
        let mut code = format!("char {}[1024];\n", temp);
        code.push_str(&format!("snprintf({}, 1024, \"{}\"", temp, format));
        for arg in &rendered_args {
            code.push_str(&format!(", {}", arg));
        }
        code.push_str(");");
        prelude.push(Node::Helper {
            prelude: Vec::new(),
            code,
        });

        self.include("string_utils.h");
        Ok(ExprVal {
            prelude,
            code: temp,
            ty: CollectionType::scalar(VarType::String),
        })
    }

    fn parse_list_literal(&mut self) -> Result<ExprVal, CompilerError> {
        let bracket = self.advance();
        if self.check(TokenKind::RBracket) {
            return Err(CompilerError::Type {
                message: format!(
                    "cannot infer the element type of an empty list literal at line {}",
                    bracket.line
                ),
            });
        }

        let first = self.parse_expression(0)?;
        let element = scalar_element(&first, "list elements", bracket.line)?;
        let mut prelude = first.prelude;
        let mut elements = vec![first.code];

        while self.match_token(TokenKind::Comma) {
            let line = self.line();
            let item = self.parse_expression(0)?;
            if item.ty.base != element {
                return Err(CompilerError::Type {
                    message: format!("inconsistent list element types at line {}", line),
                });
            }
            prelude.extend(item.prelude);
            elements.push(item.code);
        }
        self.expect(TokenKind::RBracket)?;

        let ty = CollectionType::list(element);
        self.include_for(&ty);

        let temp = self.next_temp("list");
        prelude.push(Node::List {
            temp: temp.clone(),
            element,
            elements,
        });

        Ok(ExprVal {
            prelude,
            code: temp,
            ty,
        })
    }

    /// `(e)` is grouping; `(a, b, ...)` is a tuple literal.
    fn parse_group_or_tuple(&mut self) -> Result<ExprVal, CompilerError> {
        let paren = self.advance();
        if self.check(TokenKind::RParen) {
            return Err(CompilerError::Type {
                message: format!(
                    "cannot infer the element type of an empty tuple literal at line {}",
                    paren.line
                ),
            });
        }

        let first = self.parse_expression(0)?;
        if !self.check(TokenKind::Comma) {
            self.expect(TokenKind::RParen)?;
            return Ok(ExprVal {
                prelude: first.prelude,
                code: format!("({})", first.code),
                ty: first.ty,
            });
        }

        let element = scalar_element(&first, "tuple elements", paren.line)?;
        let mut prelude = first.prelude;
        let mut elements = vec![first.code];

        while self.match_token(TokenKind::Comma) {
            let line = self.line();
            let item = self.parse_expression(0)?;
            if item.ty.base != element {
                return Err(CompilerError::Type {
                    message: format!("inconsistent tuple element types at line {}", line),
                });
            }
            prelude.extend(item.prelude);
            elements.push(item.code);
        }
        self.expect(TokenKind::RParen)?;

        let ty = CollectionType::tuple(element);
        self.include_for(&ty);

        let temp = self.next_temp("tuple");
        prelude.push(Node::Tuple {
            temp: temp.clone(),
            element,
            elements,
        });

        Ok(ExprVal {
            prelude,
            code: temp,
            ty,
        })
    }

    fn parse_dict_literal(&mut self) -> Result<ExprVal, CompilerError> {
        let brace = self.advance();
        if self.check(TokenKind::RBrace) {
            return Err(CompilerError::Type {
                message: format!(
                    "cannot infer the value type of an empty dict literal at line {}",
                    brace.line
                ),
            });
        }

        let mut prelude = Vec::new();
        let mut entries = Vec::new();
        let mut value_type = None;

        loop {
            let line = self.line();
            let key = self.parse_expression(0)?;
            if key.ty.base != VarType::String {
                return Err(CompilerError::Type {
                    message: format!("dictionary keys must be strings at line {}", line),
                });
            }
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression(0)?;
            let element = scalar_element(&value, "dict values", line)?;
            match value_type {
                None => value_type = Some(element),
                Some(expected) if expected != element => {
                    return Err(CompilerError::Type {
                        message: format!("inconsistent dictionary value types at line {}", line),
                    });
                }
                _ => {}
            }

            prelude.extend(key.prelude);
            prelude.extend(value.prelude);
            entries.push((key.code, value.code));

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        let value = value_type.unwrap();
        let ty = CollectionType::dict(value);
        self.include_for(&ty);

        let temp = self.next_temp("dict");
        prelude.push(Node::Dict {
            temp: temp.clone(),
            value,
            entries,
        });

        Ok(ExprVal {
            prelude,
            code: temp,
            ty,
        })
    }
}

fn scalar_element(value: &ExprVal, what: &str, line: u32) -> Result<VarType, CompilerError> {
    match value.ty.base {
        VarType::Int | VarType::Float | VarType::String | VarType::Bool => Ok(value.ty.base),
        _ => Err(CompilerError::Type {
            message: format!(
                "{} must be scalar values, found {} at line {}",
                what,
                value.ty.describe(),
                line
            ),
        }),
    }
}

fn invalid_operands(
    op: &str,
    left: &CollectionType,
    right: &CollectionType,
    line: u32,
) -> CompilerError {
    CompilerError::Type {
        message: format!(
            "invalid operand types for '{}': {} and {} at line {}",
            op,
            left.describe(),
            right.describe(),
            line
        ),
    }
}
