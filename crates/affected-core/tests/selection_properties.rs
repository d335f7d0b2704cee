//! End-to-end resolution properties over manifest, registry and report.

use affected_core::{
    parse_manifest, resolve, translate, StalenessReport, TestEntry, TestRegistry, VariantOutput,
};

const MANIFEST: &str = r#"[
    {"test": {"label": "//pkg:foo_test(//build/toolchain/fuchsia:x64)", "name": "foo_test"}},
    {"test": {"label": "//tools/lint:lint_tests(//build/toolchain:host_x64)", "path": "host_x64/lint_tests"}},
    {"test": {"label": "//zircon/system/utest/core:core-tests"}}
]"#;

fn registry() -> TestRegistry {
    TestRegistry::build(parse_manifest(MANIFEST).expect("manifest should parse"))
}

#[test]
fn translate_label_forms() {
    for (dir, name) in [("a/b", "c"), ("pkg", "foo_test"), ("x/y/z", "w")] {
        let label = format!("//{dir}:{name}");
        let expected = format!("obj/{dir}/{name}.stamp");
        assert_eq!(translate(&label), expected);
        assert_eq!(translate(&format!("{label}(//tc:x)")), expected);
    }
}

#[test]
fn resolve_empty_inputs_yield_empty_set() {
    assert!(resolve(Vec::<&str>::new(), &registry()).is_empty());

    let report = StalenessReport::new(vec![VariantOutput::from_stdout(
        "default",
        "[1/1] touch obj/pkg/foo_test.stamp\n",
    )]);
    assert!(resolve(report.lines(), &TestRegistry::default()).is_empty());
}

#[test]
fn collision_maps_to_later_entry() {
    let registry = TestRegistry::build(vec![
        TestEntry::new("//a:b(//tc:first)"),
        TestEntry::new("//a:b(//tc:second)"),
    ]);
    assert_eq!(registry.get("obj/a/b.stamp"), Some("//a:b(//tc:second)"));
}

#[test]
fn stale_stamp_selects_test() {
    let report = StalenessReport::new(vec![VariantOutput::from_stdout(
        "default",
        "[1/3] clang++ -c ../../pkg/foo.cc -o obj/pkg/foo.o\n\
         [2/3] ld obj/pkg/foo_test\n\
         [3/3] obj/pkg/foo_test.stamp\n",
    )]);

    let affected = resolve(report.lines(), &registry());
    assert_eq!(
        affected.into_vec(),
        vec!["//pkg:foo_test(//build/toolchain/fuchsia:x64)".to_string()]
    );
}

#[test]
fn no_stale_stamp_selects_nothing() {
    let report = StalenessReport::new(vec![VariantOutput::from_stdout(
        "default",
        "[1/1] touch obj/pkg/other.stamp\n",
    )]);
    assert!(resolve(report.lines(), &registry()).is_empty());
}

#[test]
fn overlapping_variants_select_label_once() {
    let report = StalenessReport::new(vec![
        VariantOutput::from_stdout(
            "default",
            "[1/2] touch obj/zircon/system/utest/core/core-tests.stamp\n\
             [2/2] touch obj/tools/lint/lint_tests.stamp\n",
        ),
        VariantOutput::from_stdout(
            "default.zircon",
            "[1/1] touch obj/zircon/system/utest/core/core-tests.stamp\n",
        ),
    ]);

    let affected = resolve(report.lines(), &registry());
    assert_eq!(affected.len(), 2);
    assert_eq!(
        affected.iter().collect::<Vec<_>>(),
        vec![
            "//tools/lint:lint_tests(//build/toolchain:host_x64)",
            "//zircon/system/utest/core:core-tests",
        ]
    );
}
