use std::collections::HashMap;

use crate::ast::CollectionType;

/// A function signature as recorded when its `def` header is parsed.
#[derive(Debug, Clone)]
pub struct FunctionSig {
    pub params: Vec<CollectionType>,
    pub returns: CollectionType,
}

/// Lexically scoped variable bindings. A scope is pushed for every function
/// body and every indented block, and popped on DEDENT, so a binding made
/// inside a block is not visible after it.
pub struct Scopes {
    scopes: Vec<HashMap<String, CollectionType>>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn define(&mut self, name: String, ty: CollectionType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, ty);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<CollectionType> {
        for scope in self.scopes.iter().rev() {
            if let Some(ty) = scope.get(name) {
                return Some(*ty);
            }
        }
        None
    }
}

pub type FunctionTable = HashMap<String, FunctionSig>;
