use minipy::compile;
use minipy::error::CompilerError;

fn compile_ok(source: &str) -> String {
    match compile(source) {
        Ok(c_source) => c_source,
        Err(error) => panic!("compile failed: {}\nsource:\n{}", error, source),
    }
}

fn compile_err(source: &str) -> CompilerError {
    match compile(source) {
        Ok(c_source) => panic!("expected a compile error, got:\n{}", c_source),
        Err(error) => error,
    }
}

fn type_error(source: &str) -> String {
    match compile_err(source) {
        CompilerError::Type { message } => message,
        other => panic!("expected a type error, got {:?}", other),
    }
}

fn count_matches(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn arithmetic_assignment_and_print() {
    let c = compile_ok("int x = 1 + 2\nprint(x)\n");
    assert!(c.contains("#include \"common.h\""), "{}", c);
    assert!(c.contains("int x = (1 + 2);"), "{}", c);
    assert!(c.contains("printf(\"%d\\n\", x);"), "{}", c);
    assert!(c.contains("int main()"), "{}", c);
    assert!(c.contains("    return 0;\n}\n"), "{}", c);
}

#[test]
fn operator_precedence_is_conventional() {
    let c = compile_ok("int x = 1 + 2 * 3\nint y = (1 + 2) * 3\n");
    assert!(c.contains("int x = (1 + (2 * 3));"), "{}", c);
    assert!(c.contains("int y = (((1 + 2)) * 3);"), "{}", c);
}

#[test]
fn string_reassignment_frees_the_old_value_once() {
    let c = compile_ok("string s = \"ab\"\ns = s.upper()\nprint(s)\n");
    assert!(c.contains("char* temp_method_0 = str_upper(s);"), "{}", c);
    assert_eq!(count_matches(&c, "free(s);"), 1, "{}", c);
    assert_eq!(count_matches(&c, "free_string(s);"), 1, "{}", c);
    assert!(c.contains("printf(\"%s\\n\", s);"), "{}", c);
    // the free of the old value comes before the end-of-main cleanup
    assert!(c.find("free(s);").unwrap() < c.find("free_string(s);").unwrap());
}

#[test]
fn for_range_compiles_to_a_counting_loop() {
    let c = compile_ok("for i in range(0, 3):\n    print(i)\n");
    assert!(c.contains("for (int i = 0; i < 3; i++)"), "{}", c);
    assert!(c.contains("printf(\"%d\\n\", i);"), "{}", c);
}

#[test]
fn dict_literal_and_access() {
    let c = compile_ok("dict[string, int] m = {\"a\": 1, \"b\": 2}\nprint(m[\"a\"])\n");
    assert!(c.contains("#include \"dict_string_int.h\""), "{}", c);
    assert!(c.contains("DictStringInt* temp_dict_0 = create_dict_string_int();"), "{}", c);
    assert!(c.contains("dict_set_string_int(temp_dict_0, \"a\", 1);"), "{}", c);
    assert!(c.contains("dict_set_string_int(temp_dict_0, \"b\", 2);"), "{}", c);
    assert!(c.contains("DictStringInt* m = temp_dict_0;"), "{}", c);
    assert!(c.contains("printf(\"%d\\n\", dict_get_string_int(m, \"a\"));"), "{}", c);
    // ownership moved to m, so only m is freed
    assert!(c.contains("free_dict_string_int(m);"), "{}", c);
    assert!(!c.contains("free_dict_string_int(temp_dict_0);"), "{}", c);
}

#[test]
fn function_definition_and_call() {
    let source = "\
def add(int a, int b): int:
    return a + b
int r = add(2, 3)
print(r)
";
    let c = compile_ok(source);
    assert!(c.contains("int add(int a, int b)"), "{}", c);
    assert!(c.contains("int return_value = 0;"), "{}", c);
    assert!(c.contains("return_value = (a + b);"), "{}", c);
    assert!(c.contains("goto epilogue;"), "{}", c);
    assert!(c.contains("epilogue:"), "{}", c);
    assert!(c.contains("int r = add(2, 3);"), "{}", c);
    // functions come before main
    assert!(c.find("int add").unwrap() < c.find("int main").unwrap());
}

#[test]
fn call_argument_type_mismatch_cites_the_call_site() {
    let source = "\
def add(int a, int b): int:
    return a + b
int r = add(2, \"x\")
";
    let message = type_error(source);
    assert!(message.contains("add"), "{}", message);
    assert!(message.contains("line 3"), "{}", message);
}

#[test]
fn call_arity_is_checked() {
    let source = "\
def add(int a, int b): int:
    return a + b
int r = add(2)
";
    let message = type_error(source);
    assert!(message.contains("expects 2 arguments"), "{}", message);
}

#[test]
fn recursive_calls_resolve() {
    let source = "\
def fact(int n): int:
    if n < 2:
        return 1
    return n * fact(n - 1)
print(fact(5))
";
    let c = compile_ok(source);
    assert!(c.contains("return_value = (n * fact((n - 1)));"), "{}", c);
}

#[test]
fn heap_returns_are_captured_and_freed_at_the_call_site() {
    let source = "\
def dup(string s): string:
    return s.upper()
dup(\"hey\")
";
    let c = compile_ok(source);
    assert!(c.contains("char* return_value = NULL;"), "{}", c);
    assert!(c.contains("return_value = temp_method_0;"), "{}", c);
    // the returned temporary is not freed inside the function
    assert!(!c.contains("free_string(temp_method_0);"), "{}", c);
    assert!(c.contains("char* temp_call_1 = dup(\"hey\");"), "{}", c);
    assert!(c.contains("free_string(temp_call_1);"), "{}", c);
}

#[test]
fn void_functions_take_no_return_slot() {
    let c = compile_ok("def shout(string s):\n    print(s)\nshout(\"hi\")\n");
    assert!(c.contains("void shout(char* s)"), "{}", c);
    assert!(!c.contains("return_value"), "{}", c);
    assert!(c.contains("shout(\"hi\");"), "{}", c);
}

#[test]
fn list_literal_append_and_len() {
    let source = "\
list[int] xs = [1, 2]
xs.append(3)
print(len(xs))
";
    let c = compile_ok(source);
    assert!(c.contains("#include \"list_int.h\""), "{}", c);
    assert!(c.contains("ListInt* temp_list_0 = create_list_int(2);"), "{}", c);
    assert!(c.contains("list_append_int(temp_list_0, 1);"), "{}", c);
    assert!(c.contains("list_append_int(temp_list_0, 2);"), "{}", c);
    assert!(c.contains("ListInt* xs = temp_list_0;"), "{}", c);
    assert!(c.contains("list_append_int(xs, 3);"), "{}", c);
    assert!(c.contains("printf(\"%d\\n\", xs->size);"), "{}", c);
    assert!(c.contains("free_list_int(xs);"), "{}", c);
    assert!(!c.contains("free_list_int(temp_list_0);"), "{}", c);
}

#[test]
fn tuple_literal_and_indexing() {
    let c = compile_ok("tuple[int] t = (1, 2)\nprint(t[0])\n");
    assert!(c.contains("#include \"tuple_int.h\""), "{}", c);
    assert!(c.contains("TupleInt* temp_tuple_0 = create_tuple_int(2);"), "{}", c);
    assert!(c.contains("temp_tuple_0->data[0] = 1;"), "{}", c);
    assert!(c.contains("temp_tuple_0->data[1] = 2;"), "{}", c);
    assert!(c.contains("printf(\"%d\\n\", t->data[0]);"), "{}", c);
    assert!(c.contains("free_tuple_int(t);"), "{}", c);
}

#[test]
fn index_assignment_on_lists_and_dicts() {
    let c = compile_ok("list[int] xs = [1, 2]\nxs[0] = 5\n");
    assert!(c.contains("xs->data[0] = 5;"), "{}", c);

    let c = compile_ok("dict[string, int] m = {\"a\": 1}\nm[\"b\"] = 2\n");
    assert!(c.contains("dict_set_string_int(m, \"b\", 2);"), "{}", c);
}

#[test]
fn tuples_are_immutable() {
    let message = type_error("tuple[int] t = (1, 2)\nt[0] = 5\n");
    assert!(message.contains("tuple elements cannot be assigned"), "{}", message);
}

#[test]
fn booleans_print_as_words() {
    let c = compile_ok("bool ok = true\nprint(ok)\n");
    assert!(c.contains("int ok = true;"), "{}", c);
    assert!(c.contains("printf(\"%s\\n\", ok ? \"true\" : \"false\");"), "{}", c);
}

#[test]
fn containers_print_through_their_to_string_helpers() {
    let c = compile_ok("list[int] xs = [1]\nprint(xs)\n");
    assert!(c.contains("printf(\"%s\\n\", list_to_string_int(xs));"), "{}", c);
}

#[test]
fn print_separator_joins_the_format() {
    let c = compile_ok("print(1, 2, sep=\"-\")\n");
    assert!(c.contains("printf(\"%d-%d\\n\", 1, 2);"), "{}", c);
}

#[test]
fn fstrings_lower_to_snprintf_buffers() {
    let c = compile_ok("int n = 7\nbool ok = n > 3\nprint(f\"n={n} ok={ok}\")\n");
    assert!(c.contains("char temp_string_0[1024];"), "{}", c);
    assert!(
        c.contains("snprintf(temp_string_0, 1024, \"n=%d ok=%s\", n, ok ? \"true\" : \"false\");"),
        "{}",
        c
    );
    assert!(c.contains("printf(\"%s\\n\", temp_string_0);"), "{}", c);
}

#[test]
fn fstring_format_specs_map_to_printf() {
    let c = compile_ok("float x = 3.25\nprint(f\"{x:>8.2f}\")\n");
    assert!(c.contains("snprintf(temp_string_0, 1024, \"%8.2f\", x);"), "{}", c);

    let c = compile_ok("int y = 5\nprint(f\"{y:<5}\")\n");
    assert!(c.contains("snprintf(temp_string_0, 1024, \"%-5d\", y);"), "{}", c);
}

#[test]
fn percent_signs_in_fstring_text_are_escaped() {
    let c = compile_ok("int p = 50\nprint(f\"{p}% done\")\n");
    assert!(c.contains("\"%d%% done\""), "{}", c);
}

#[test]
fn string_concatenation_uses_the_runtime_helper() {
    let c = compile_ok("string a = \"x\"\nstring b = a + \"y\"\n");
    assert!(c.contains("str_concat(a, \"y\")"), "{}", c);
}

#[test]
fn string_equality_compares_contents() {
    let c = compile_ok("string a = \"x\"\nbool same = a == \"x\"\n");
    assert!(c.contains("int same = (strcmp(a, \"x\") == 0);"), "{}", c);
}

#[test]
fn integer_division_yields_a_float() {
    let c = compile_ok("float q = 7 / 2\n");
    assert!(c.contains("float q = ((float)7 / 2);"), "{}", c);
}

#[test]
fn elif_chains_become_else_if() {
    let source = "\
int x = 5
if x > 3:
    print(1)
elif x > 1:
    print(2)
else:
    print(3)
";
    let c = compile_ok(source);
    assert!(c.contains("if ((x > 3))"), "{}", c);
    assert!(c.contains("else if ((x > 1))"), "{}", c);
    assert!(c.contains("else\n"), "{}", c);
}

#[test]
fn while_loops_and_bare_reassignment() {
    let c = compile_ok("int n = 3\nwhile n > 0:\n    n = n - 1\nprint(n)\n");
    assert!(c.contains("while ((n > 0))"), "{}", c);
    assert!(c.contains("n = (n - 1);"), "{}", c);
}

#[test]
fn match_compiles_to_a_switch() {
    let source = "\
int x = 2
match x:
    case 1:
        print(1)
    case _:
        print(0)
";
    let c = compile_ok(source);
    assert!(c.contains("switch (x)"), "{}", c);
    assert!(c.contains("case 1:"), "{}", c);
    assert!(c.contains("default:"), "{}", c);
    assert_eq!(count_matches(&c, "break;"), 2, "{}", c);
}

#[test]
fn match_on_bool_accepts_literal_cases() {
    let source = "\
bool flag = true
match flag:
    case true:
        print(1)
    case false:
        print(0)
";
    let c = compile_ok(source);
    assert!(c.contains("case true:"), "{}", c);
    assert!(c.contains("case false:"), "{}", c);
}

#[test]
fn block_scopes_allow_redeclaration_after_dedent() {
    let source = "\
if true:
    int t = 1
    print(t)
int t = 2
print(t)
";
    let c = compile_ok(source);
    assert_eq!(count_matches(&c, "int t = "), 2, "{}", c);
}

#[test]
fn includes_are_emitted_once_in_sorted_order() {
    let source = "\
list[float] xs = [1.5]
tuple[bool] tb = (true, false)
dict[string, string] m = {\"a\": \"b\"}
string s = \"hi\"
";
    let c = compile_ok(source);
    let expected = "\
#include \"common.h\"
#include \"dict_string_string.h\"
#include \"list_float.h\"
#include \"string_utils.h\"
#include \"tuple_bool.h\"
";
    assert!(c.starts_with(expected), "{}", c);
    assert_eq!(count_matches(&c, "#include \"string_utils.h\""), 1, "{}", c);
}

#[test]
fn split_registers_the_string_list_header() {
    let c = compile_ok("string s = \"a b\"\nlist[string] parts = s.split()\n");
    assert!(c.contains("#include \"list_string.h\""), "{}", c);
    assert!(c.contains("ListString* temp_method_0 = str_split(s, NULL);"), "{}", c);
    assert!(c.contains("ListString* parts = temp_method_0;"), "{}", c);
}

#[test]
fn undefined_names_are_type_errors() {
    let message = type_error("print(y)\n");
    assert!(message.contains("undefined variable 'y'"), "{}", message);
    assert!(message.contains("line 1"), "{}", message);

    let message = type_error("int r = f(1)\n");
    assert!(message.contains("undefined function 'f'"), "{}", message);
}

#[test]
fn assignment_type_mismatches_are_rejected() {
    let message = type_error("int x = \"a\"\n");
    assert!(message.contains("type mismatch in assignment"), "{}", message);

    let message = type_error("int x = 1\nfloat x = 2.5\n");
    assert!(message.contains("conflicting declaration"), "{}", message);
}

#[test]
fn int_widens_to_float_but_not_the_reverse() {
    let c = compile_ok("float x = 3\n");
    assert!(c.contains("float x = 3;"), "{}", c);

    let message = type_error("int x = 3.5\n");
    assert!(message.contains("type mismatch"), "{}", message);
}

#[test]
fn dict_keys_must_be_strings() {
    let message = type_error("dict[int, int] m = {\"a\": 1}\n");
    assert!(message.contains("dictionary keys must be strings"), "{}", message);
}

#[test]
fn len_rejects_scalars() {
    let message = type_error("int x = 1\nprint(len(x))\n");
    assert!(message.contains("len() is not defined for int"), "{}", message);
    assert!(message.contains("line 2"), "{}", message);
}

#[test]
fn match_subjects_are_int_or_bool() {
    let message = type_error("string s = \"a\"\nmatch s:\n    case _:\n        print(1)\n");
    assert!(message.contains("match expression must be int or bool"), "{}", message);
}

#[test]
fn conditions_must_be_boolean() {
    let message = type_error("if 1:\n    print(1)\n");
    assert!(message.contains("condition must be a boolean"), "{}", message);
}

#[test]
fn logical_operators_require_booleans() {
    let message = type_error("bool b = 1 and 2\n");
    assert!(message.contains("'and'"), "{}", message);
}

#[test]
fn relational_operators_reject_strings() {
    let message = type_error("string a = \"x\"\nbool b = a < a\n");
    assert!(message.contains("'<'"), "{}", message);
}

#[test]
fn list_literals_must_be_homogeneous() {
    let message = type_error("list[int] xs = [1, \"a\"]\n");
    assert!(message.contains("inconsistent list element types"), "{}", message);
}

#[test]
fn methods_check_their_receiver() {
    let message = type_error("string s = \"a\"\ns.append(\"b\")\n");
    assert!(message.contains("'append'"), "{}", message);

    let message = type_error("list[int] xs = [1]\nxs.upper()\n");
    assert!(message.contains("'upper'"), "{}", message);
}

#[test]
fn append_checks_the_element_type() {
    let message = type_error("list[int] xs = [1]\nxs.append(\"a\")\n");
    assert!(message.contains("'append' expects int"), "{}", message);
}

#[test]
fn returns_are_checked_against_the_signature() {
    let message = type_error("def f(): int:\n    return \"a\"\n");
    assert!(message.contains("type mismatch in return"), "{}", message);

    let message = type_error("return 1\n");
    assert!(message.contains("'return' outside of a function"), "{}", message);
}

#[test]
fn functions_do_not_capture_main_locals() {
    let message = type_error("int g = 1\ndef f(): int:\n    return g\n");
    assert!(message.contains("undefined variable 'g'"), "{}", message);
}

#[test]
fn nested_function_definitions_are_rejected() {
    let source = "\
def outer(): int:
    def inner(): int:
        return 1
    return 2
";
    match compile_err(source) {
        CompilerError::Parse { message } => {
            assert!(message.contains("nested function definitions"), "{}", message);
        }
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn inconsistent_indentation_is_a_lex_error() {
    let source = "if true:\n    print(1)\n   print(2)\n";
    match compile_err(source) {
        CompilerError::Lex { message } => {
            assert!(message.contains("inconsistent indentation"), "{}", message);
            assert!(message.contains("line 3"), "{}", message);
        }
        other => panic!("expected a lex error, got {:?}", other),
    }
}

#[test]
fn temporaries_are_numbered_deterministically() {
    let source = "list[int] a = [1]\nlist[int] b = [2]\nstring s = f\"{len(a)}\"\n";
    let first = compile_ok(source);
    let second = compile_ok(source);
    assert_eq!(first, second);
    assert!(first.contains("temp_list_0"), "{}", first);
    assert!(first.contains("temp_list_1"), "{}", first);
    assert!(first.contains("temp_string_2"), "{}", first);
}
