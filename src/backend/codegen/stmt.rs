use crate::ast::{CollectionType, Node, VarType};
use crate::error::CompilerError;

use super::Codegen;

fn push_line(out: &mut String, indent: usize, line: &str) {
    for _ in 0..indent {
        out.push_str("    ");
    }
    out.push_str(line);
    out.push('\n');
}

fn has_return(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Return { .. } => true,
        Node::If { arms, else_body } => {
            arms.iter().any(|(_, _, body)| has_return(body)) || has_return(else_body)
        }
        Node::For { body, .. } | Node::While { body, .. } => has_return(body),
        Node::Match { cases, default, .. } => {
            cases.iter().any(|(_, body)| has_return(body)) || has_return(default)
        }
        _ => false,
    })
}

fn require_temp<'a>(temp: &'a Option<String>, method: &str) -> Result<&'a str, CompilerError> {
    temp.as_deref().ok_or_else(|| CompilerError::Codegen {
        message: format!("method '{}' needs a result temporary", method),
    })
}

impl Codegen {
    /// Emits one function definition. Every `return` in the body jumps to
    /// the shared epilogue, where the function's owned locals are freed and
    /// `return_value` is handed back; the value being returned was released
    /// from the cleanup set at the return site.
    pub(super) fn emit_function(
        &mut self,
        node: &Node,
        out: &mut String,
    ) -> Result<(), CompilerError> {
        let Node::Function {
            name,
            params,
            return_type,
            body,
        } = node
        else {
            return Err(CompilerError::Codegen {
                message: "emit_function called on a non-function node".to_string(),
            });
        };

        let params_c: Vec<String> = params
            .iter()
            .map(|(param, ty)| format!("{} {}", ty.c_type(), param))
            .collect();
        out.push_str(&format!(
            "{} {}({})\n{{\n",
            return_type.c_type(),
            name,
            params_c.join(", ")
        ));

        self.reset_cleanup();

        let returns_value = return_type.base != VarType::None;
        if returns_value {
            let init = if return_type.is_heap() { " = NULL" } else { " = 0" };
            push_line(
                out,
                1,
                &format!("{} return_value{};", return_type.c_type(), init),
            );
        }

        for stmt in body {
            self.emit_node(stmt, out, 1)?;
        }

        if has_return(body) {
            out.push_str("epilogue:\n");
        }
        for (local, ty) in self.take_cleanup() {
            push_line(out, 1, &ty.free_call(&local));
        }
        if returns_value {
            push_line(out, 1, "return return_value;");
        }
        out.push_str("}\n");

        Ok(())
    }

    pub(super) fn emit_node(
        &mut self,
        node: &Node,
        out: &mut String,
        indent: usize,
    ) -> Result<(), CompilerError> {
        match node {
            Node::Helper { prelude, code } => {
                self.emit_all(prelude, out, indent)?;
                for line in code.split('\n') {
                    push_line(out, indent, line);
                }
            }

            Node::Assign {
                prelude,
                name,
                expr,
                ty,
                is_declaration,
            } => {
                self.emit_all(prelude, out, indent)?;
                match (ty.base, *is_declaration) {
                    // Strings own a private copy of their value.
                    (VarType::String, true) => {
                        push_line(
                            out,
                            indent,
                            &format!("char* {} = (char*)malloc(strlen({}) + 1);", name, expr),
                        );
                        push_line(out, indent, &format!("strcpy({}, {});", name, expr));
                        self.register(name, *ty, indent);
                    }
                    (VarType::String, false) => {
                        push_line(out, indent, &format!("free({});", name));
                        push_line(
                            out,
                            indent,
                            &format!("{} = (char*)malloc(strlen({}) + 1);", name, expr),
                        );
                        push_line(out, indent, &format!("strcpy({}, {});", name, expr));
                    }
                    // Containers arrive as freshly allocated pointers; the
                    // variable takes ownership from the temporary.
                    (VarType::List | VarType::Tuple | VarType::Dict, true) => {
                        push_line(out, indent, &format!("{} {} = {};", ty.c_type(), name, expr));
                        self.release(expr);
                        self.register(name, *ty, indent);
                    }
                    (VarType::List | VarType::Tuple | VarType::Dict, false) => {
                        self.release(expr);
                        push_line(out, indent, &format!("{} = {};", name, expr));
                    }
                    (_, true) => {
                        push_line(out, indent, &format!("{} {} = {};", ty.c_type(), name, expr));
                    }
                    (_, false) => {
                        push_line(out, indent, &format!("{} = {};", name, expr));
                    }
                }
            }

            Node::Function { .. } => {
                return Err(CompilerError::Codegen {
                    message: "function definitions cannot nest".to_string(),
                });
            }

            Node::Call {
                prelude,
                temp,
                name,
                args,
                return_type,
            } => {
                self.emit_all(prelude, out, indent)?;
                let call = format!("{}({})", name, args.join(", "));
                match temp {
                    Some(temp) => {
                        push_line(
                            out,
                            indent,
                            &format!("{} {} = {};", return_type.c_type(), temp, call),
                        );
                        self.register(temp, *return_type, indent);
                    }
                    None => push_line(out, indent, &format!("{};", call)),
                }
            }

            Node::MethodCall {
                prelude,
                temp,
                receiver,
                method,
                args,
                receiver_ty,
                return_type,
            } => {
                self.emit_all(prelude, out, indent)?;
                match method.as_str() {
                    "append" => {
                        push_line(
                            out,
                            indent,
                            &format!(
                                "list_append_{}({}, {});",
                                receiver_ty.element.c_name(),
                                receiver,
                                args[0]
                            ),
                        );
                    }
                    "upper" | "lower" | "strip" => {
                        let temp = require_temp(temp, method)?;
                        push_line(
                            out,
                            indent,
                            &format!("char* {} = str_{}({});", temp, method, receiver),
                        );
                        self.register(temp, *return_type, indent);
                    }
                    "replace" => {
                        let temp = require_temp(temp, method)?;
                        push_line(
                            out,
                            indent,
                            &format!(
                                "char* {} = str_replace({}, {}, {});",
                                temp, receiver, args[0], args[1]
                            ),
                        );
                        self.register(temp, *return_type, indent);
                    }
                    "split" => {
                        let temp = require_temp(temp, method)?;
                        let pattern = args.first().map(String::as_str).unwrap_or("NULL");
                        push_line(
                            out,
                            indent,
                            &format!("ListString* {} = str_split({}, {});", temp, receiver, pattern),
                        );
                        self.register(temp, *return_type, indent);
                    }
                    "find" => {
                        let temp = require_temp(temp, method)?;
                        push_line(
                            out,
                            indent,
                            &format!("int {} = str_find({}, {});", temp, receiver, args[0]),
                        );
                    }
                    other => {
                        return Err(CompilerError::Codegen {
                            message: format!("unknown method '{}'", other),
                        });
                    }
                }
            }

            Node::Return { prelude, expr, ty } => {
                self.emit_all(prelude, out, indent)?;
                if ty.is_heap() {
                    // The caller owns the value now.
                    self.release(expr);
                }
                push_line(out, indent, &format!("return_value = {};", expr));
                push_line(out, indent, "goto epilogue;");
            }

            Node::Print {
                prelude,
                values,
                separator,
            } => {
                self.emit_all(prelude, out, indent)?;
                let sep = separator.replace('%', "%%");
                let mut fmt = String::new();
                let mut args = String::new();
                for (index, (code, ty)) in values.iter().enumerate() {
                    if index > 0 {
                        fmt.push_str(&sep);
                    }
                    fmt.push_str(ty.printf_conversion());
                    args.push_str(&format!(", {}", ty.printf_arg(code)));
                }
                fmt.push_str("\\n");
                push_line(out, indent, &format!("printf(\"{}\"{});", fmt, args));
            }

            Node::If { arms, else_body } => {
                for (prelude, _, _) in arms {
                    self.emit_all(prelude, out, indent)?;
                }
                for (index, (_, condition, body)) in arms.iter().enumerate() {
                    let keyword = if index == 0 { "if" } else { "else if" };
                    push_line(out, indent, &format!("{} ({})", keyword, condition));
                    push_line(out, indent, "{");
                    self.emit_all(body, out, indent + 1)?;
                    push_line(out, indent, "}");
                }
                if !else_body.is_empty() {
                    push_line(out, indent, "else");
                    push_line(out, indent, "{");
                    self.emit_all(else_body, out, indent + 1)?;
                    push_line(out, indent, "}");
                }
            }

            Node::For {
                prelude,
                var,
                start,
                end,
                body,
            } => {
                self.emit_all(prelude, out, indent)?;
                push_line(
                    out,
                    indent,
                    &format!("for (int {} = {}; {} < {}; {}++)", var, start, var, end, var),
                );
                push_line(out, indent, "{");
                self.emit_all(body, out, indent + 1)?;
                push_line(out, indent, "}");
            }

            Node::While {
                prelude,
                condition,
                body,
            } => {
                self.emit_all(prelude, out, indent)?;
                push_line(out, indent, &format!("while ({})", condition));
                push_line(out, indent, "{");
                self.emit_all(body, out, indent + 1)?;
                push_line(out, indent, "}");
            }

            Node::Match {
                prelude,
                expr,
                cases,
                default,
            } => {
                self.emit_all(prelude, out, indent)?;
                push_line(out, indent, &format!("switch ({})", expr));
                push_line(out, indent, "{");
                for (pattern, body) in cases {
                    push_line(out, indent, &format!("case {}:", pattern));
                    self.emit_all(body, out, indent + 1)?;
                    push_line(out, indent + 1, "break;");
                }
                if !default.is_empty() {
                    push_line(out, indent, "default:");
                    self.emit_all(default, out, indent + 1)?;
                    push_line(out, indent + 1, "break;");
                }
                push_line(out, indent, "}");
            }

            Node::List {
                temp,
                element,
                elements,
            } => {
                push_line(
                    out,
                    indent,
                    &format!(
                        "List{}* {} = create_list_{}({});",
                        element.c_struct(),
                        temp,
                        element.c_name(),
                        elements.len()
                    ),
                );
                for item in elements {
                    push_line(
                        out,
                        indent,
                        &format!("list_append_{}({}, {});", element.c_name(), temp, item),
                    );
                }
                self.register(temp, CollectionType::list(*element), indent);
            }

            Node::Tuple {
                temp,
                element,
                elements,
            } => {
                push_line(
                    out,
                    indent,
                    &format!(
                        "Tuple{}* {} = create_tuple_{}({});",
                        element.c_struct(),
                        temp,
                        element.c_name(),
                        elements.len()
                    ),
                );
                for (index, item) in elements.iter().enumerate() {
                    push_line(out, indent, &format!("{}->data[{}] = {};", temp, index, item));
                }
                self.register(temp, CollectionType::tuple(*element), indent);
            }

            Node::Dict {
                temp,
                value,
                entries,
            } => {
                push_line(
                    out,
                    indent,
                    &format!(
                        "DictString{}* {} = create_dict_string_{}();",
                        value.c_struct(),
                        temp,
                        value.c_name()
                    ),
                );
                for (key, entry) in entries {
                    push_line(
                        out,
                        indent,
                        &format!(
                            "dict_set_string_{}({}, {}, {});",
                            value.c_name(),
                            temp,
                            key,
                            entry
                        ),
                    );
                }
                self.register(temp, CollectionType::dict(*value), indent);
            }
        }

        Ok(())
    }

    fn emit_all(
        &mut self,
        nodes: &[Node],
        out: &mut String,
        indent: usize,
    ) -> Result<(), CompilerError> {
        for node in nodes {
            self.emit_node(node, out, indent)?;
        }
        Ok(())
    }
}
