//! End-to-end pipeline tests over complete Java sources

use javafmt_core::{
    BraceStyle, BracketAlignment, FormatConfig, ImportOrder, Pipeline, SwitchCaseLabels,
};

fn pipeline(adjust: impl FnOnce(&mut FormatConfig)) -> Pipeline {
    let mut config = FormatConfig::default();
    adjust(&mut config);
    Pipeline::new(config)
}

#[test]
fn attach_style_reformats_a_small_class() {
    let pipeline = pipeline(|c| c.brace_style = BraceStyle::Attach);
    let out = pipeline.format("public  class Test\n{\n}").unwrap();
    assert_eq!(out.text, "public class Test {\n}");
}

#[test]
fn break_style_reformats_a_small_class() {
    let pipeline = pipeline(|_| {});
    let out = pipeline.format("public class Test {\n}").unwrap();
    assert_eq!(out.text, "public class Test\n{\n}");
}

#[test]
fn full_pass_sequence_on_a_realistic_file() {
    let source = concat!(
        "import java.util.Map;\n",
        "import java.io.File;\n",
        "\n",
        "final public class dataStore {\n",
        "static final int max_size = 64;\n",
        "private Map<String, File> Entries;\n",
        "public void Put(String Key, File value) {\n",
        "int Slot = hash(Key);\n",
        "store(Slot, value);\n",
        "}\n",
        "}\n",
    );
    let pipeline = pipeline(|c| {
        c.brace_style = BraceStyle::Attach;
        c.imports.order = ImportOrder::Sort;
    });
    let out = pipeline.format(source).unwrap();

    assert!(
        out.text
            .starts_with("import java.io.File;\nimport java.util.Map;\n"),
        "got:\n{}",
        out.text
    );
    assert!(out.text.contains("public final class DataStore {"), "got:\n{}", out.text);
    assert!(out.text.contains("    static final int MAX_SIZE = 64;"), "got:\n{}", out.text);
    assert!(out.text.contains("    private Map<String, File> entries;"), "got:\n{}", out.text);
    assert!(
        out.text.contains("    public void put(String key, File value) {"),
        "got:\n{}",
        out.text
    );
    assert!(out.text.contains("        int slot = hash(key);"), "got:\n{}", out.text);

    assert_eq!(out.renames.get("dataStore").map(String::as_str), Some("DataStore"));
    assert_eq!(out.renames.get("max_size").map(String::as_str), Some("MAX_SIZE"));
    assert_eq!(out.renames.get("Put").map(String::as_str), Some("put"));
    assert_eq!(out.renames.get("Key").map(String::as_str), Some("key"));
    assert_eq!(out.renames.get("Slot").map(String::as_str), Some("slot"));
}

#[test]
fn audit_reports_without_changing_the_file() {
    let pipeline = pipeline(|_| {});
    let source = "class widget { int Count; void Tick(int Delta) { int Old_value = Count; } }";
    let findings = pipeline.audit(source).unwrap();
    assert_eq!(
        findings,
        [
            "Class name 'widget' does not match the naming convention 'pascalcase'",
            "Field name 'Count' does not match the naming convention 'camelcase'",
            "Method name 'Tick' does not match the naming convention 'camelcase'",
            "Parameter name 'Delta' does not match the naming convention 'camelcase'",
            "Local variable name 'Old_value' does not match the naming convention 'camelcase'",
        ]
    );
}

#[test]
fn alignment_runs_after_formatting() {
    let pipeline = pipeline(|c| {
        c.brace_style = BraceStyle::Attach;
        c.aligns.after_open_bracket = BracketAlignment::BlockIndent;
    });
    let out = pipeline
        .format("class A { void m() { render(width, height, depth); } }")
        .unwrap();
    assert!(
        out.text
            .contains("render(\n            width, height, depth\n        );"),
        "got:\n{}",
        out.text
    );
}

#[test]
fn switch_layout_honors_label_indentation() {
    let pipeline = pipeline(|c| {
        c.brace_style = BraceStyle::Attach;
        c.indents.switch_case_labels = SwitchCaseLabels::NoIndent;
    });
    let out = pipeline
        .format("class A { void m(int x) { switch (x) { case 1: tick(); break; } } }")
        .unwrap();
    assert!(out.text.contains("\n        switch (x) {"), "got:\n{}", out.text);
    assert!(out.text.contains("\n        case 1:"), "got:\n{}", out.text);
    assert!(out.text.contains("\n            tick();"), "got:\n{}", out.text);
}

#[test]
fn formatting_is_idempotent_for_stable_configurations() {
    let pipeline = pipeline(|c| {
        c.brace_style = BraceStyle::Attach;
        c.max_line_length = -1;
        c.aligns.after_open_bracket = BracketAlignment::AlwaysBreak;
    });
    let source = concat!(
        "class Worker {\n",
        "    void run(int jobs) {\n",
        "        if (jobs > 0) {\n",
        "            dispatch(jobs, retries, timeout);\n",
        "        } else {\n",
        "            idle();\n",
        "        }\n",
        "    }\n",
        "}\n",
    );
    let once = pipeline.format(source).unwrap().text;
    let twice = pipeline.format(&once).unwrap().text;
    assert_eq!(once, twice);
}

#[test]
fn long_lines_wrap_to_the_configured_limit() {
    let pipeline = pipeline(|c| {
        c.brace_style = BraceStyle::Attach;
        c.max_line_length = 48;
    });
    let out = pipeline
        .format("class A { void m() { total = aaaa + bbbb + cccc + dddd + eeee + ffff + gggg; } }")
        .unwrap();
    for line in out.text.split('\n') {
        assert!(line.chars().count() <= 48, "line too long: {line:?}");
    }
}

#[test]
fn unparseable_regions_pass_through_unchanged() {
    let pipeline = pipeline(|c| c.brace_style = BraceStyle::Attach);
    let source = "class A {\n    ??? mystery tokens ;\n    void ok() {\n    }\n}";
    let out = pipeline.format(source).unwrap();
    assert!(out.text.contains("??? mystery tokens ;"), "got:\n{}", out.text);
    assert!(out.text.contains("    void ok() {"), "got:\n{}", out.text);
}

#[test]
fn comments_survive_every_pass() {
    let pipeline = pipeline(|c| c.brace_style = BraceStyle::Attach);
    let source = concat!(
        "class A {\n",
        "    // counts retries\n",
        "    int retries;\n",
        "    /* multi\n",
        "       line */\n",
        "    void tick() {\n",
        "    }\n",
        "}\n",
    );
    let out = pipeline.format(source).unwrap();
    assert!(out.text.contains("// counts retries"));
    assert!(out.text.contains("/* multi\n       line */"));
}

#[test]
fn constructor_follows_the_class_rename() {
    let pipeline = pipeline(|c| c.brace_style = BraceStyle::Attach);
    let out = pipeline
        .format("class cache { cache(int size) { this.size = size; } }")
        .unwrap();
    assert!(out.text.contains("class Cache {"), "got:\n{}", out.text);
    assert!(out.text.contains("Cache(int size) {"), "got:\n{}", out.text);
}
