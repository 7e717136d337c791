//! Crate-level conversion tests
//!
//! Whole programs through `parse`/`Transpiler`, covering block nesting,
//! routine header patching, and line passthrough for both source
//! conventions and both dialects.

#[cfg(test)]
mod tests {
    use crate::{parse, Dialect, ParseOptions, SourceConvention, Transpiler, UnsupportedConstruct, UnsupportedKind};

    fn python(source: &str) -> String {
        parse(source, ParseOptions::new(SourceConvention::Indentation, Dialect::Cambridge))
    }

    fn python_ib(source: &str) -> String {
        parse(source, ParseOptions::new(SourceConvention::Indentation, Dialect::Ib))
    }

    fn java(source: &str) -> String {
        parse(source, ParseOptions::new(SourceConvention::Braces, Dialect::Cambridge))
    }

    fn java_ib(source: &str) -> String {
        parse(source, ParseOptions::new(SourceConvention::Braces, Dialect::Ib))
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(python(""), "");
        assert_eq!(java("   \n\t\n"), "");
    }

    #[test]
    fn test_simple_if() {
        assert_eq!(python("if x > 0:\n    print(x)"), "IF x > 0 THEN\n   OUTPUT x\nENDIF");
        assert_eq!(python_ib("if x > 0:\n    print(x)"), "IF x > 0 THEN\n    OUTPUT x\nEND IF");
    }

    #[test]
    fn test_if_chain_has_single_terminator() {
        let src = "if a > 1:\n    print(1)\nelif a > 0:\n    print(2)\nelse:\n    print(3)";
        assert_eq!(
            python(src),
            "IF a > 1 THEN\n   OUTPUT 1\nELSE IF a > 0 THEN\n   OUTPUT 2\nELSE\n   OUTPUT 3\nENDIF"
        );
    }

    #[test]
    fn test_for_range_echoes_variable() {
        assert_eq!(python("for i in range(3):\n    print(i)"), "FOR i ← 0 TO 2\n   OUTPUT i\nNEXT i");
        assert_eq!(python_ib("for i in range(3):\n    print(i)"), "loop i from 0 to 2\n    OUTPUT i\nend loop");
    }

    #[test]
    fn test_try_chain_aligned() {
        let src = "try:\n    x = 1\nexcept ValueError:\n    print(\"bad\")\nfinally:\n    print(\"done\")";
        assert_eq!(
            python(src),
            "TRY\n   x ← 1\nCATCH ValueError\n   OUTPUT \"bad\"\nFINALLY\n   OUTPUT \"done\"\nENDTRY"
        );
    }

    #[test]
    fn test_nested_blocks_close_innermost_first() {
        let src = "while n > 0:\n    if n % 2 == 0:\n        print(n)\n    n -= 1\nprint(\"end\")";
        assert_eq!(
            python(src),
            "WHILE n > 0 DO\n   IF n MOD 2 = 0 THEN\n      OUTPUT n\n   ENDIF\n   n ← n - 1\nENDWHILE\nOUTPUT \"end\""
        );
    }

    #[test]
    fn test_function_header_patched_after_return() {
        let src = "def add(x, y):\n    return x + y\n\nprint(add(2, 3))";
        assert_eq!(
            python(src),
            "FUNCTION Add(x : INTEGER, y : INTEGER) RETURNS INTEGER\n   RETURN x + y\nENDFUNCTION\n\nOUTPUT Add(2, 3)"
        );
    }

    #[test]
    fn test_routine_without_return_is_procedure() {
        let src = "def greet(name):\n    print(\"Hi \" + name)\ngreet(\"Al\")";
        assert_eq!(
            python(src),
            "PROCEDURE Greet(name : STRING)\n   OUTPUT \"Hi \" & name\nENDPROCEDURE\nCALL Greet(\"Al\")"
        );
        assert_eq!(
            python_ib(src),
            "FUNCTION greet(name)\n    OUTPUT \"Hi \" + name\nEND FUNCTION\ngreet(\"Al\")"
        );
    }

    #[test]
    fn test_class_with_constructor_and_method() {
        let src = "\
class Dog:
    def __init__(self, name):
        self.name = name
    def speak(self):
        print(self.name)";
        let expected = "\
CLASS Dog
   PRIVATE name : STRING
   PUBLIC PROCEDURE NEW(name : STRING)
      self.name ← name
   ENDPROCEDURE
   PUBLIC PROCEDURE Speak()
      OUTPUT self.name
   ENDPROCEDURE
ENDCLASS";
        assert_eq!(python(src), expected);
    }

    #[test]
    fn test_comments_and_blank_lines_pass_through() {
        let src = "# setup\nx = 1\n\n    # indented note\ny = 2  # inline";
        assert_eq!(python(src), "// setup\nx ← 1\n\n    // indented note\ny ← 2  // inline");
    }

    #[test]
    fn test_docstring_becomes_comments() {
        let src = "\"\"\"Adds numbers.\nTwo of them.\n\"\"\"\nx = 1";
        let out = python(src);
        assert!(out.starts_with("// Adds numbers.\n// Two of them."));
        assert!(out.ends_with("x ← 1"));
    }

    #[test]
    fn test_unsupported_reported_once() {
        let mut reports: Vec<UnsupportedConstruct> = Vec::new();
        let src = "nums = [1, 2]\nevens = [x for x in nums if x % 2 == 0]\nprint(evens)";
        let out = Transpiler::new(ParseOptions::default())
            .on_unsupported(|c: &UnsupportedConstruct| reports.push(c.clone()))
            .convert(src);
        assert!(out.contains("// Unsupported: evens = [x for x in nums if x % 2 == 0]"));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, UnsupportedKind::Comprehension);
        assert_eq!(reports[0].line_number, 2);
        assert_eq!(reports[0].raw_line, "evens = [x for x in nums if x % 2 == 0]");
    }

    #[test]
    fn test_unsupported_inside_block_keeps_indent() {
        let out = python("for x in xs:\n    break");
        assert_eq!(out, "FOR EACH x IN xs\n   // Unsupported: break\nNEXT x");
    }

    #[test]
    fn test_java_if_else() {
        let src = "\
int x = 5;
if (x > 3) {
    System.out.println(\"big\");
} else {
    System.out.println(\"small\");
}";
        assert_eq!(
            java(src),
            "DECLARE x : INTEGER\nx ← 5\nIF x > 3 THEN\n   OUTPUT \"big\"\nELSE\n   OUTPUT \"small\"\nENDIF"
        );
    }

    #[test]
    fn test_java_else_on_following_line() {
        let src = "if (a) {\n    x = 1;\n}\nelse {\n    x = 2;\n}";
        assert_eq!(java_ib(src), "IF a THEN\n    x ← 1\nELSE\n    x ← 2\nEND IF");
    }

    #[test]
    fn test_java_counting_loop() {
        let src = "for (int i = 0; i < 5; i++) {\n    System.out.println(i);\n}";
        assert_eq!(java(src), "FOR i ← 0 TO 4\n   OUTPUT i\nNEXT i");
    }

    #[test]
    fn test_java_do_while() {
        let src = "do {\n    n = n - 1;\n} while (n > 0);";
        assert_eq!(java(src), "REPEAT\n   n ← n - 1\nUNTIL NOT (n > 0)");
    }

    #[test]
    fn test_java_allman_braces() {
        let src = "while (running)\n{\n    tick();\n}";
        assert_eq!(java(src), "WHILE running DO\n   CALL tick()\nENDWHILE");
    }

    #[test]
    fn test_java_try_catch() {
        let src = "try {\n    risky();\n} catch (IOException e) {\n    System.out.println(\"oops\");\n} finally {\n    done();\n}";
        assert_eq!(
            java_ib(src),
            "TRY\n    risky()\nCATCH IOException\n    OUTPUT \"oops\"\nFINALLY\n    done()\nEND TRY"
        );
    }

    #[test]
    fn test_java_nested_braceless_headers() {
        let src = "while (n > 0)\n    if (n % 3 == 0)\n        System.out.println(n);\nSystem.out.println(0);";
        assert_eq!(
            java_ib(src),
            "WHILE n > 0 DO\n    IF n mod 3 = 0 THEN\n        OUTPUT n\n    END IF\nEND WHILE\nOUTPUT 0"
        );
    }

    #[test]
    fn test_java_stray_brace_recovers() {
        assert_eq!(java("}\nSystem.out.println(1);"), "OUTPUT 1");
    }

    #[test]
    fn test_every_block_is_closed_at_end_of_input() {
        let out = python("if a:\n    while b:\n        for i in range(2):\n            print(i)");
        assert!(out.ends_with("      NEXT i\n   ENDWHILE\nENDIF"));
    }
}
