mod stmt;

use crate::ast::{CollectionType, Node, Program};
use crate::error::CompilerError;

/// Emits the C translation unit for a parsed program.
///
/// The emitter owns the cleanup set: heap-backed locals that must be freed
/// before the current function (or `main`) returns. Names are registered as
/// their declarations are emitted and removed again when ownership moves
/// (a container temporary handed to a variable, a value handed to the
/// caller through `return_value`).
pub struct Codegen {
    cleanup: Vec<(String, CollectionType)>,
}

impl Codegen {
    pub fn new() -> Self {
        Codegen {
            cleanup: Vec::new(),
        }
    }

    /// Assembles the full translation unit: sorted includes, function
    /// definitions, then `main` wrapping every top-level statement plus the
    /// global cleanup calls.
    pub fn compile(&mut self, program: &Program) -> Result<String, CompilerError> {
        let mut out = String::new();

        for include in &program.includes {
            out.push_str(&format!("#include \"{}\"\n", include));
        }
        out.push('\n');

        for node in &program.statements {
            if matches!(node, Node::Function { .. }) {
                self.emit_function(node, &mut out)?;
                out.push('\n');
            }
        }

        out.push_str("int main()\n{\n");
        self.cleanup.clear();
        for node in &program.statements {
            if !matches!(node, Node::Function { .. }) {
                self.emit_node(node, &mut out, 1)?;
            }
        }
        for (name, ty) in std::mem::take(&mut self.cleanup) {
            out.push_str(&format!("    {}\n", ty.free_call(&name)));
        }
        out.push_str("    return 0;\n}\n");

        Ok(out)
    }

    /// Heap locals declared directly in a function body join the cleanup
    /// set. Block-nested locals are already out of scope at the epilogue in
    /// C, so only level-1 declarations register.
    fn register(&mut self, name: &str, ty: CollectionType, indent: usize) {
        if indent == 1 && ty.is_heap() && !self.cleanup.iter().any(|(n, _)| n == name) {
            self.cleanup.push((name.to_string(), ty));
        }
    }

    /// Drops a name from the cleanup set when its pointer is handed over,
    /// so the emitted C never frees transferred ownership.
    fn release(&mut self, name: &str) {
        self.cleanup.retain(|(n, _)| n != name);
    }

    fn take_cleanup(&mut self) -> Vec<(String, CollectionType)> {
        std::mem::take(&mut self.cleanup)
    }

    fn reset_cleanup(&mut self) {
        self.cleanup.clear();
    }
}
