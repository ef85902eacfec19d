//! End-to-end rewrite tests
//!
//! Each case runs a full unit: parse, directives, globals, rewrite, splice.
//! Output is compared as text, so formatting and comments must survive.

#[cfg(test)]
mod tests {
    use crate::cache::GlobalsCache;
    use crate::options::{AssignmentPolicy, GlobalsOption, RewriteOptions, SourceKind};
    use crate::transform::{rewrite_source_with_cache, RewriteOutput};

    fn run(source: &str, options: &RewriteOptions) -> RewriteOutput {
        rewrite_source_with_cache(source, "test.js", options, &GlobalsCache::new())
            .unwrap_or_else(|e| panic!("rewrite of {:?} failed: {}", source, e))
    }

    fn transform(source: &str) -> String {
        run(source, &RewriteOptions::default()).code
    }

    fn transform_with(source: &str, options: &RewriteOptions) -> String {
        run(source, options).code
    }

    fn assert_unchanged(source: &str) {
        assert_eq!(transform(source), source, "expected no rewrite");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // FREE REFERENCES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_undefined_variable() {
        assert_eq!(transform("a;"), "this.a;");
    }

    #[test]
    fn test_basic_assignment() {
        assert_eq!(transform("x = 10;"), "this.x = 10;");
    }

    #[test]
    fn test_variable_declaration_initializer() {
        assert_eq!(transform("var x = y;"), "var x = this.y;");
    }

    #[test]
    fn test_self_initializer_is_free() {
        assert_eq!(transform("var x = x;"), "var x = this.x;");
    }

    #[test]
    fn test_self_initializer_only_for_bare_identifier() {
        assert_unchanged("var x = x + 1;");
    }

    #[test]
    fn test_member_expression() {
        assert_eq!(transform("foo.bar(10);"), "this.foo.bar(10);");
    }

    #[test]
    fn test_multiple_member_expressions() {
        assert_eq!(
            transform("y.x.z = 2;a.b.c = foo;"),
            "this.y.x.z = 2;this.a.b.c = this.foo;"
        );
    }

    #[test]
    fn test_nested_member_expressions() {
        assert_eq!(transform("hello.dear.sir();"), "this.hello.dear.sir();");
    }

    #[test]
    fn test_variables_inside_functions() {
        assert_eq!(
            transform("function f() { return hello + world; }"),
            "function f() { return this.hello + this.world; }"
        );
    }

    #[test]
    fn test_object_values_not_keys() {
        assert_eq!(
            transform("foo = { bar: 10, moo: car };"),
            "this.foo = { bar: 10, moo: this.car };"
        );
    }

    #[test]
    fn test_repeat_identifiers_across_functions() {
        assert_eq!(
            transform("function foo(a) { this.a = a; } function bar() { return a; }"),
            "function foo(a) { this.a = a; } function bar() { return this.a; }"
        );
    }

    #[test]
    fn test_function_arguments() {
        assert_eq!(transform("Object.keys(x);"), "Object.keys(this.x);");
    }

    #[test]
    fn test_computed_index_classified_independently() {
        assert_eq!(
            transform("history[history_index] = 10;"),
            "this.history[this.history_index] = 10;"
        );
        assert_eq!(transform("a.b = 1;"), "this.a.b = 1;");
    }

    #[test]
    fn test_computed_property_key() {
        assert_eq!(
            transform("var o = { [key]: 1 };"),
            "var o = { [this.key]: 1 };"
        );
    }

    #[test]
    fn test_shorthand_property_expanded() {
        assert_eq!(transform("var o = { car };"), "var o = { car: this.car };");
        assert_unchanged("var car = 1; var o = { car };");
    }

    #[test]
    fn test_optional_chain_root() {
        assert_eq!(transform("a?.b.c();"), "this.a?.b.c();");
    }

    #[test]
    fn test_expression_positions() {
        assert_eq!(transform("typeof maybe;"), "typeof this.maybe;");
        assert_eq!(transform("`${name}!`;"), "`${this.name}!`;");
        assert_eq!(transform("(a).b;"), "(this.a).b;");
        assert_eq!(transform("new Widget(opts);"), "new this.Widget(this.opts);");
    }

    #[test]
    fn test_update_and_for_of_targets() {
        assert_eq!(transform("count++;"), "this.count++;");
        assert_eq!(
            transform("for (item of list) {}"),
            "for (this.item of this.list) {}"
        );
    }

    #[test]
    fn test_destructuring_assignment_shorthand() {
        assert_eq!(transform("({ x } = o);"), "({ x: this.x } = this.o);");
        assert_eq!(
            transform("({ x = fallback } = o);"),
            "({ x: this.x = this.fallback } = this.o);"
        );
        assert_eq!(transform("[a, b] = pair;"), "[this.a, this.b] = this.pair;");
    }

    #[test]
    fn test_comments_and_formatting_survive() {
        assert_eq!(
            transform("/* keep */ a;   // trailing\n\n  b ;"),
            "/* keep */ this.a;   // trailing\n\n  this.b ;"
        );
    }

    #[test]
    fn test_multibyte_source_offsets() {
        assert_eq!(transform("var ñ = 'é'; ñ + a;"), "var ñ = 'é'; ñ + this.a;");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // LEFT ALONE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_defined_variables() {
        assert_unchanged("const x = 0;");
        assert_unchanged("var y = 0; function foo() { return y; }");
    }

    #[test]
    fn test_method_shorthand_key() {
        assert_unchanged("const x = { create() { return 'hey'; } };");
    }

    #[test]
    fn test_object_statements() {
        assert_unchanged("Object.assign({}, { a: 1, b: 10 });");
        assert_unchanged("var car = 1; var obj = { bar: 10, moo: car };");
    }

    #[test]
    fn test_member_property_of_bound_object() {
        assert_unchanged("var context = {}; context.id;");
    }

    #[test]
    fn test_chained_calls_on_literal() {
        assert_unchanged("[1,2,3].filter(e => e).map(e => e * 2);");
    }

    #[test]
    fn test_comma_separated_declarations() {
        assert_unchanged("var _ref2 = [1, 2], k = _ref2[0], v = _ref2[1];");
    }

    #[test]
    fn test_arrow_functions() {
        assert_unchanged("const squareArr = arr => arr.map(x => x * x);");
    }

    #[test]
    fn test_labels() {
        assert_unchanged("loop: for (;;) { break loop; }");
        assert_unchanged("outer: while (true) { continue outer; }");
    }

    #[test]
    fn test_scoped_bindings() {
        assert_unchanged("class A { m() { return A; } }");
        assert_unchanged("try {} catch (e) { e; }");
        assert_unchanged("for (let i = 0; i < 3; i++) { i; }");
        assert_unchanged("function f(a = 1, ...rest) { return [a, rest]; }");
        assert_unchanged("var g = function named() { return named; };");
    }

    #[test]
    fn test_hoisted_declarations() {
        assert_unchanged("later(); function later() {}");
        assert_unchanged("function f() { v = 1; var v; }");
    }

    #[test]
    fn test_receiver_chains() {
        assert_unchanged("this.a.b.c();");
        assert_eq!(transform("this.run(arg);"), "this.run(this.arg);");
        assert_eq!(transform("this[key];"), "this[this.key];");
    }

    #[test]
    fn test_arguments_inside_functions() {
        assert_unchanged("function f() { return arguments.length; }");
        assert_unchanged("function f() { return () => arguments[0]; }");

        let script = RewriteOptions::default().with_source_type(SourceKind::Script);
        assert_eq!(transform_with("arguments;", &script), "this.arguments;");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CLASSES AND MODERN SYNTAX
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_class_with_free_names() {
        let code = "
      function a(args = {}) { return args; }
      function spread(...args) { return args.join(' '); }
      const assets = {};
      Object.entries(assets).map(([k, v]) => console.log(k, v))

      class Instance extends Object {
        constructor(x, y) {
          super(x, y)
          this.x = x
          this.y = y
          foo = 'bar'
          bar = foo
        }
        create() {
          return foo;
        }
        get thing() {
          return foo + bar;
        }
      }

      module.exports = Instance
      ";
        let out = transform(code);
        assert!(out.contains("this.foo = 'bar'"));
        assert!(out.contains("this.bar = this.foo"));
        assert!(out.contains("return this.foo + this.bar;"));
        assert!(out.contains("this.module.exports = Instance"));
        assert!(out.contains("super(x, y)"));
        assert!(out.contains("console.log(k, v)"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // RECEIVER AND POLICY OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_custom_receiver() {
        let options = RewriteOptions::default().with_receiver("scope");
        assert_eq!(transform_with("a.b;", &options), "scope.a.b;");
        assert_eq!(transform_with("scope.x;", &options), "scope.x;");
        assert_eq!(transform_with("({ car });", &options), "({ car: scope.car });");
    }

    #[test]
    fn test_preserve_assignment_targets() {
        let options =
            RewriteOptions::default().with_assignment_targets(AssignmentPolicy::Preserve);
        assert_eq!(transform_with("x = 10; y;", &options), "x = 10; this.y;");
        assert_eq!(transform_with("count++;", &options), "count++;");
        assert_eq!(transform_with("({ x } = o);", &options), "({ x } = this.o);");
        assert_eq!(transform_with("x = x;", &options), "x = this.x;");
        // Member targets are not simple identifiers.
        assert_eq!(transform_with("a.b = 1;", &options), "this.a.b = 1;");
    }

    #[test]
    fn test_stats_count_every_classification() {
        let out = run("var x = 1; x + y + Math.PI; this.z;", &RewriteOptions::default());
        assert_eq!(out.stats.bound, 1);
        assert_eq!(out.stats.free, 1);
        assert_eq!(out.stats.global, 1);
        assert_eq!(out.stats.receiver, 1);
        assert_eq!(out.stats.rewritten(), 1);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DIRECTIVES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_global_comment() {
        assert_unchanged("// global x\nx = 10;");
    }

    #[test]
    fn test_multiple_global_comment() {
        assert_unchanged("/* global x, y */\nx = y + 10;");
    }

    #[test]
    fn test_other_comments_ignored() {
        assert_unchanged(
            "
      // global Sprite
      // some other comment
      var spr = Sprite;",
        );
        assert_eq!(
            transform("// globals Sprite\nSprite;"),
            "// globals Sprite\nthis.Sprite;"
        );
    }

    #[test]
    fn test_env_comment() {
        assert_unchanged("/* env browser */\nwindow.location;");
    }

    #[test]
    fn test_eslint_env_comment() {
        assert_unchanged("/* eslint-env browser */\nwindow.location;");
    }

    #[test]
    fn test_strict_ignores_directives() {
        let options = RewriteOptions::default().with_strict(true);
        assert_eq!(
            transform_with("// global x\nx;", &options),
            "// global x\nthis.x;"
        );
        assert_eq!(
            transform_with("/* env browser */\nwindow;", &options),
            "/* env browser */\nthis.window;"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ENVIRONMENTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_node_env() {
        let code = "
        require('fs');
        Array(10);
        NaN;
        JSON.parse(\"{}\");
        __dirname;
        setTimeout();
        undefined;
        console.log('foo');
        module.exports = {};";
        let options = RewriteOptions::default().with_env(["node"]);
        assert_eq!(transform_with(code, &options), code);
    }

    #[test]
    fn test_browser_env() {
        let code = "console.log('Hello!');\nwindow.location;HTMLElement;";
        let options = RewriteOptions::default().with_env(["browser"]);
        assert_eq!(transform_with(code, &options), code);
    }

    #[test]
    fn test_no_env_runtime_names_are_free() {
        assert_eq!(transform("require('fs');"), "this.require('fs');");
        assert_eq!(transform("window.location;"), "this.window.location;");
    }

    #[test]
    fn test_none_sentinel_discards_caller_env() {
        let options = RewriteOptions::default().with_env(["node"]);
        let out = run("/* env none */\nrequire('fs'); Object;", &options);
        assert_eq!(out.code, "/* env none */\nthis.require('fs'); Object;");
    }

    #[test]
    fn test_unknown_env_is_a_warning() {
        let options = RewriteOptions::default().with_env(["netscape", "browser"]);
        let out = run("window; navigator;", &options);
        assert_eq!(out.code, "window; navigator;");
        assert_eq!(out.environments, vec!["browser"]);
        assert_eq!(out.warnings, vec!["Unknown env 'netscape' specified"]);
    }

    #[test]
    fn test_unknown_env_directive_is_a_warning() {
        let out = run("/* env netscape */\nwindow;", &RewriteOptions::default());
        assert_eq!(out.code, "/* env netscape */\nthis.window;");
        assert!(out.environments.is_empty());
        assert_eq!(out.warnings, vec!["Unknown env 'netscape' specified"]);
    }

    #[test]
    fn test_intl_is_builtin() {
        assert_unchanged("Intl.DateTimeFormat();");
        assert_unchanged("new Intl.NumberFormat('en').format(1);");
    }

    #[test]
    fn test_browser_platform_apis() {
        let options = RewriteOptions::default().with_env(["browser"]);
        let code = "crypto.randomUUID();\nindexedDB.open('x');\ncaches.open('v1');\nrequestAnimationFrame(draw);";
        assert_eq!(
            transform_with(code, &options),
            "crypto.randomUUID();\nindexedDB.open('x');\ncaches.open('v1');\nrequestAnimationFrame(this.draw);"
        );
        assert_eq!(
            transform("indexedDB.open('x');"),
            "this.indexedDB.open('x');",
            "browser-only names need the environment"
        );
    }

    #[test]
    fn test_worker_envs() {
        let options = RewriteOptions::default().with_env(["worker"]);
        let code = "importScripts('a.js');\nself.postMessage(new OffscreenCanvas(1, 1));";
        assert_eq!(transform_with(code, &options), code);

        let options = RewriteOptions::default().with_env(["serviceworker"]);
        let code = "skipWaiting();\nclients.claim();\ncaches.open('v1');";
        assert_eq!(transform_with(code, &options), code);
    }

    #[test]
    fn test_environment_order_reported() {
        let options = RewriteOptions::default().with_env(["es2015"]);
        let out = run("/* env node */\n/* eslint-env mocha */\ndescribe;", &options);
        assert_eq!(out.environments, vec!["es2015", "mocha", "node"]);
        assert_eq!(out.code, "/* env node */\n/* eslint-env mocha */\ndescribe;");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // USER GLOBALS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_inline_globals() {
        let options = RewriteOptions::default()
            .with_globals(GlobalsOption::Names(vec!["foo_global".to_string()]));
        assert_eq!(transform_with("foo_global = 'bar';", &options), "foo_global = 'bar';");
    }

    #[test]
    fn test_globals_file_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("globals.json"), r#"{ "foo_global": true }"#).unwrap();

        let options = RewriteOptions::from_json(r#"{ "env": ["node"], "globals": "./globals" }"#)
            .unwrap()
            .with_cwd(dir.path());
        let code = "foo_global = 'bar';";
        assert_eq!(transform_with(code, &options), code);
    }
}
