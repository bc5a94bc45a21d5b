/// Scalar and container base kinds of the MiniPy type system.
/// `None` stands for "no value": void returns and non-value statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Int,
    Float,
    String,
    Bool,
    List,
    Tuple,
    Dict,
    None,
}

impl VarType {
    pub fn is_heap(self) -> bool {
        matches!(
            self,
            VarType::String | VarType::List | VarType::Tuple | VarType::Dict
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, VarType::Int | VarType::Float)
    }

    /// Lowercase name used in helper function suffixes (`list_append_int`).
    pub fn c_name(self) -> &'static str {
        match self {
            VarType::Int => "int",
            VarType::Float => "float",
            VarType::String => "string",
            VarType::Bool => "bool",
            VarType::List => "list",
            VarType::Tuple => "tuple",
            VarType::Dict => "dict",
            VarType::None => "void",
        }
    }

    /// CamelCase name used in helper struct names (`ListInt`).
    pub fn c_struct(self) -> &'static str {
        match self {
            VarType::Int => "Int",
            VarType::Float => "Float",
            VarType::String => "String",
            VarType::Bool => "Bool",
            VarType::List => "List",
            VarType::Tuple => "Tuple",
            VarType::Dict => "Dict",
            VarType::None => "Void",
        }
    }

    /// Human-readable name for diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            VarType::None => "none",
            other => other.c_name(),
        }
    }
}

/// A complete MiniPy type. Unused slots hold `VarType::None`:
/// scalars use only `base`; lists and tuples use `base` + `element`;
/// dicts use `base` + `key` + `value` with `key` always `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionType {
    pub base: VarType,
    pub element: VarType,
    pub key: VarType,
    pub value: VarType,
}

impl CollectionType {
    pub const NONE: CollectionType = CollectionType::scalar(VarType::None);

    pub const fn scalar(base: VarType) -> Self {
        CollectionType {
            base,
            element: VarType::None,
            key: VarType::None,
            value: VarType::None,
        }
    }

    pub const fn list(element: VarType) -> Self {
        CollectionType {
            base: VarType::List,
            element,
            key: VarType::None,
            value: VarType::None,
        }
    }

    pub const fn tuple(element: VarType) -> Self {
        CollectionType {
            base: VarType::Tuple,
            element,
            key: VarType::None,
            value: VarType::None,
        }
    }

    pub const fn dict(value: VarType) -> Self {
        CollectionType {
            base: VarType::Dict,
            element: VarType::None,
            key: VarType::String,
            value,
        }
    }

    pub fn is_heap(&self) -> bool {
        self.base.is_heap()
    }

    /// The C type an expression of this type has in the emitted program.
    pub fn c_type(&self) -> String {
        match self.base {
            VarType::Int => "int".to_string(),
            VarType::Float => "float".to_string(),
            VarType::String => "char*".to_string(),
            VarType::Bool => "int".to_string(),
            VarType::List => format!("List{}*", self.element.c_struct()),
            VarType::Tuple => format!("Tuple{}*", self.element.c_struct()),
            VarType::Dict => format!("DictString{}*", self.value.c_struct()),
            VarType::None => "void".to_string(),
        }
    }

    /// The free call that releases a value of this type, without indentation.
    /// Only meaningful for heap-backed types.
    pub fn free_call(&self, name: &str) -> String {
        match self.base {
            VarType::String => format!("free_string({});", name),
            VarType::List => format!("free_list_{}({});", self.element.c_name(), name),
            VarType::Tuple => format!("free_tuple_{}({});", self.element.c_name(), name),
            VarType::Dict => format!("free_dict_string_{}({});", self.value.c_name(), name),
            _ => String::new(),
        }
    }

    /// Renders a value of this type as a `%s`-compatible printf argument.
    /// Scalars pass through, booleans become a ternary, containers go
    /// through their runtime `*_to_string_*` helpers.
    pub fn printf_arg(&self, expr: &str) -> String {
        match self.base {
            VarType::Bool => format!("{} ? \"true\" : \"false\"", expr),
            VarType::List => format!("list_to_string_{}({})", self.element.c_name(), expr),
            VarType::Tuple => format!("tuple_to_string_{}({})", self.element.c_name(), expr),
            VarType::Dict => format!("dict_to_string_string_{}({})", self.value.c_name(), expr),
            _ => expr.to_string(),
        }
    }

    /// Default printf conversion for a value of this type.
    pub fn printf_conversion(&self) -> &'static str {
        match self.base {
            VarType::Int => "%d",
            VarType::Float => "%f",
            _ => "%s",
        }
    }

    /// Surface-syntax rendering for diagnostics.
    pub fn describe(&self) -> String {
        match self.base {
            VarType::List => format!("list[{}]", self.element.display_name()),
            VarType::Tuple => format!("tuple[{}]", self.element.display_name()),
            VarType::Dict => format!("dict[string, {}]", self.value.display_name()),
            other => other.display_name().to_string(),
        }
    }

    /// Helper header this type depends on, if any.
    pub fn helper_header(&self) -> Option<String> {
        match self.base {
            VarType::String => Some("string_utils.h".to_string()),
            VarType::List => Some(format!("list_{}.h", self.element.c_name())),
            VarType::Tuple => Some(format!("tuple_{}.h", self.element.c_name())),
            VarType::Dict => Some(format!("dict_string_{}.h", self.value.c_name())),
            _ => None,
        }
    }
}
