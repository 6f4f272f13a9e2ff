//! End-to-end translation tests

use hrw4u_compiler::{compile, compile_str, reverse, reverse_str};
use hrw4u_core::{ErrorKind, ErrorMode, Settings};
use pretty_assertions::assert_eq;

const CANONICAL: &str = r#"VARS {
    flag_0: bool @0;
}

REMAP {
    if inbound.method == "GET" && outbound.req.X-Foo == "bar" with NOCASE {
        inbound.req.X-Bar = "baz";
    } elif inbound.url.path ~ /^\/api/ {
        keep_query("a,b");
    } else {
        break;
    }
    set-debug;
}

SEND_RESPONSE {
    if inbound.status > 399 || !(inbound.resp.X-Debug && !inbound.cookie.session) {
        inbound.resp.X-Error += "1";
        flag_0 = true;
    }
}
"#;

#[test]
fn test_golden_forward() {
    let source = r#"
REMAP {
    if outbound.req.X-Foo == "bar" with NOCASE && inbound.method == "GET" {
        inbound.req.X-Bar = "baz";
    }
}
"#;
    let expected = "\
cond %{REMAP_PSEUDO_HOOK} [AND]
cond %{HEADER:X-Foo} =\"bar\" [AND,NOCASE]
cond %{METHOD} =\"GET\"
    set-header X-Bar \"baz\"
";
    assert_eq!(compile_str(source).unwrap(), expected);
}

#[test]
fn test_dsl_round_trip() {
    let native = compile_str(CANONICAL).unwrap();
    let back = reverse_str(&native).unwrap();
    assert_eq!(back, CANONICAL);
}

#[test]
fn test_native_round_trip() {
    let native = compile_str(CANONICAL).unwrap();
    let again = compile_str(&reverse_str(&native).unwrap()).unwrap();
    assert_eq!(again, native);
}

#[test]
fn test_forward_output_is_deterministic() {
    let settings = Settings::default();
    let first = compile("rules.hrw4u", CANONICAL, &settings, ErrorMode::FailFast);
    assert!(first.is_ok());

    let second = compile("rules.hrw4u", CANONICAL, &Settings::default(), ErrorMode::FailFast);
    assert_eq!(first.output, second.output);

    let threads: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| compile_str(CANONICAL).unwrap()))
        .collect();
    for handle in threads {
        assert_eq!(handle.join().unwrap(), first.output);
    }

    let broken = "REMAP {\n    inbund.req.X = \"1\";\n    if inbound.metod == \"GET\" { break; }\n}\n";
    let a = compile("rules.hrw4u", broken, &settings, ErrorMode::CollectAll);
    let b = compile("rules.hrw4u", broken, &settings, ErrorMode::CollectAll);
    assert_eq!(a.errors.len(), 2);
    assert_eq!(a.errors, b.errors);
    assert_eq!(a.output, b.output);
}

#[test]
fn test_reverse_output_is_deterministic() {
    let native = compile_str(CANONICAL).unwrap();
    let settings = Settings::default();
    let first = reverse("rules.conf", &native, &settings, ErrorMode::FailFast);
    assert!(first.is_ok());

    for _ in 0..3 {
        let again = reverse("rules.conf", &native, &settings, ErrorMode::FailFast);
        assert_eq!(again.output, first.output);
    }
}

#[test]
fn test_unknown_symbol_single_error_with_suggestion() {
    let source = "REMAP {\n    if inbound.metod == \"GET\" {\n        break;\n    }\n}\n";
    let out = compile("rules.hrw4u", source, &Settings::default(), ErrorMode::FailFast);
    assert_eq!(out.errors.len(), 1);

    let error = &out.errors[0];
    assert_eq!(error.kind, ErrorKind::UnknownSymbol);
    assert_eq!((error.line, error.column), (2, 8));
    assert_eq!(error.snippet.as_deref(), Some("    if inbound.metod == \"GET\" {"));
    assert!(error.suggestions.iter().any(|s| s == "inbound.method"));
}

#[test]
fn test_collect_all_mode() {
    let source = r#"
REMAP {
    inbund.req.X = "1";
    inbound.resp.X = "2";
}
SEND_RESPONSE {
    if inbound.status > 399 with L {
        set-redirect("x");
    }
}
"#;
    let out = compile("rules.hrw4u", source, &Settings::default(), ErrorMode::CollectAll);
    let kinds: Vec<ErrorKind> = out.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::UnknownSymbol,
            ErrorKind::SectionRestriction,
            ErrorKind::ModifierNotAllowed,
            ErrorKind::InvalidArity,
        ]
    );
    let lines: Vec<usize> = out.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4, 7, 8]);

    let fail_fast = compile("rules.hrw4u", source, &Settings::default(), ErrorMode::FailFast);
    assert_eq!(fail_fast.errors.len(), 1);
}

#[test]
fn test_reverse_error_points_at_line() {
    let native = "cond %{REMAP_PSEUDO_HOOK} [AND]\n    set-hedaer X-A \"1\"\n";
    let out = reverse("rules.conf", native, &Settings::default(), ErrorMode::CollectAll);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].line, 2);
    assert_eq!(out.errors[0].kind, ErrorKind::UnknownSymbol);
}

#[test]
fn test_custom_indent() {
    let settings = Settings {
        output: hrw4u_core::config::OutputSettings { indent: 2 },
        ..Settings::default()
    };
    let out = compile("t.hrw4u", "REMAP { set-debug; }", &settings, ErrorMode::FailFast);
    assert_eq!(out.output, "cond %{REMAP_PSEUDO_HOOK} [AND]\n  set-debug\n");
}
