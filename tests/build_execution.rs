//! Integration tests for loading and running build files

mod common;

use brisk::config::load_build_file;
use brisk::error::{BriskError, ConfigError, PropertyError, TargetError, TaskError};
use common::create_test_build;
use std::fs;
use std::io;
use std::path::Path;

fn run(build_path: &Path, targets: &[&str]) -> (brisk::Result<()>, String) {
    run_with_input(build_path, targets, "")
}

fn run_with_input(build_path: &Path, targets: &[&str], input: &str) -> (brisk::Result<()>, String) {
    let mut project = load_build_file(build_path, &[]).unwrap();
    let names: Vec<String> = targets.iter().map(|s| s.to_string()).collect();
    let mut out = Vec::new();
    let result = project.execute_with_io(&names, input.as_bytes(), &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_dependencies_and_top_level_tasks() {
    let (_dir, path) = create_test_build(
        r#"
name: demo
tasks:
  - echo: "project ${project.name}"
targets:
  - name: init
    tasks:
      - echo: init
  - name: compile
    depends: init
    tasks:
      - echo: compile
  - name: test
    depends: [compile]
    tasks:
      - echo: test
"#,
    );

    let (result, out) = run(&path, &["test"]);
    result.unwrap();
    assert_eq!(out, "project demo\ninit\ncompile\ntest\n");
}

#[test]
fn test_default_target() {
    let (_dir, path) = create_test_build(
        r#"
default: hello
targets:
  - name: hello
    tasks:
      - echo: hi
  - name: other
    tasks:
      - echo: other
"#,
    );

    let (result, out) = run(&path, &[]);
    result.unwrap();
    assert_eq!(out, "hi\n");
}

#[test]
fn test_no_default_runs_only_top_level() {
    let (_dir, path) = create_test_build(
        r#"
tasks:
  - echo: top
targets:
  - name: hello
    tasks:
      - echo: hi
"#,
    );

    let (result, out) = run(&path, &[]);
    result.unwrap();
    assert_eq!(out, "top\n");
}

#[test]
fn test_guards_use_truthiness() {
    let (_dir, path) = create_test_build(
        r#"
properties:
  zero: "0"
  falsy: "false"
  empty: ""
  indirect: "${empty}"
targets:
  - name: zero
    if: zero
    tasks: [{ echo: zero }]
  - name: falsy
    if: falsy
    tasks: [{ echo: falsy }]
  - name: empty
    if: empty
    tasks: [{ echo: empty }]
  - name: indirect
    if: indirect
    tasks: [{ echo: indirect }]
  - name: unset
    if: missing
    tasks: [{ echo: unset }]
  - name: unless
    unless: zero
    tasks: [{ echo: unless }]
  - name: all
    depends: zero, falsy, empty, indirect, unset, unless
"#,
    );

    let (result, out) = run(&path, &["all"]);
    result.unwrap();
    assert_eq!(out, "zero\nfalsy\n");
}

#[test]
fn test_guard_sees_property_set_by_dependency() {
    let (_dir, path) = create_test_build(
        r#"
targets:
  - name: configure
    tasks:
      - property: { name: release, value: "yes" }
  - name: package
    depends: configure
    if: release
    tasks:
      - echo: packaging
"#,
    );

    let (result, out) = run(&path, &["package"]);
    result.unwrap();
    assert_eq!(out, "packaging\n");
}

#[test]
fn test_runtime_cycle_through_call() {
    let (_dir, path) = create_test_build(
        r#"
targets:
  - name: a
    tasks:
      - call: { target: b }
  - name: b
    tasks:
      - call: { target: a }
"#,
    );

    let (result, _) = run(&path, &["a"]);
    match result {
        Err(BriskError::Target(TargetError::Cycle(chain))) => assert_eq!(chain, "a -> b -> a"),
        other => panic!("expected cycle, got {:?}", other),
    }
}

#[test]
fn test_call_params() {
    let (_dir, path) = create_test_build(
        r#"
targets:
  - name: greet
    tasks:
      - echo: "hello ${who}"
  - name: main
    tasks:
      - call: { target: greet, params: { who: alice } }
      - call:
          target: greet
          params:
            who: bob
"#,
    );

    let (result, out) = run(&path, &["main"]);
    result.unwrap();
    assert_eq!(out, "hello alice\nhello bob\n");
}

#[test]
fn test_static_cycle_rejected_at_load() {
    let (_dir, path) = create_test_build(
        r#"
targets:
  - name: a
    depends: b
  - name: b
    depends: a
"#,
    );

    let err = load_build_file(&path, &[]).unwrap_err();
    assert!(matches!(
        err,
        BriskError::Config(ConfigError::CircularDependency(_))
    ));
}

#[test]
fn test_property_cycle_fails_task() {
    let (_dir, path) = create_test_build(
        r#"
properties:
  a: "${b}"
  b: "${a}"
targets:
  - name: show
    tasks:
      - echo: "${a}"
"#,
    );

    let (result, out) = run(&path, &["show"]);
    assert!(matches!(
        result,
        Err(BriskError::Property(PropertyError::Cycle { .. }))
    ));
    assert!(out.is_empty());
}

#[test]
fn test_failure_stops_build() {
    let (_dir, path) = create_test_build(
        r#"
targets:
  - name: broken
    tasks:
      - echo: before
      - copy: { destination: out }
      - echo: after
"#,
    );

    let (result, out) = run(&path, &["broken"]);
    match result {
        Err(BriskError::Task(TaskError::MissingConfiguration {
            task,
            field,
            target,
        })) => {
            assert_eq!(task, "copy");
            assert_eq!(field, "source");
            assert_eq!(target, "broken");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(out, "before\n");
}

#[test]
fn test_file_tasks_relative_to_basedir() {
    let (dir, path) = create_test_build(
        r#"
basedir: work
properties:
  out: "${basedir}/out"
targets:
  - name: build
    tasks:
      - mkdir: { dir: "${out}/docs" }
      - echo: { message: "v=@VERSION@", file: "${out}/docs/version.txt" }
      - tokenfilter:
          file: out/docs/version.txt
          tokens: { VERSION: 1.4 }
      - copy: { source: out/docs, destination: dist }
      - move: { source: dist/version.txt, destination: dist/VERSION }
      - delete: { path: out }
"#,
    );
    fs::create_dir(dir.path().join("work")).unwrap();

    let (result, _) = run(&path, &["build"]);
    result.unwrap();

    let work = dir.path().join("work");
    assert_eq!(
        fs::read_to_string(work.join("dist/VERSION")).unwrap(),
        "v=1.4\n"
    );
    assert!(!work.join("out").exists());
}

#[test]
fn test_fileset_reference_across_tasks() {
    let (dir, path) = create_test_build(
        r#"
tasks:
  - fileset: { id: sources, dir: src, include: "**/*.rs", exclude: "gen/**" }
targets:
  - name: stage
    tasks:
      - mkdir: { dir: staged }
      - copy:
          fileset: { refid: sources }
          destination: staged
"#,
    );
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("gen")).unwrap();
    fs::create_dir_all(src.join("net")).unwrap();
    fs::write(src.join("lib.rs"), "").unwrap();
    fs::write(src.join("net/tcp.rs"), "").unwrap();
    fs::write(src.join("gen/out.rs"), "").unwrap();
    fs::write(src.join("README"), "").unwrap();

    let (result, _) = run(&path, &["stage"]);
    result.unwrap();

    let staged = dir.path().join("staged");
    assert!(staged.join("lib.rs").is_file());
    assert!(staged.join("net/tcp.rs").is_file());
    assert!(!staged.join("gen").exists());
    assert!(!staged.join("README").exists());
}

#[test]
fn test_input_task_reads_answer() {
    let (_dir, path) = create_test_build(
        r#"
targets:
  - name: ask
    tasks:
      - input:
          propertyname: color
          message: Pick a color
          validargs: red,green
      - echo: "chose ${color}"
"#,
    );

    let (result, out) = run_with_input(&path, &["ask"], "green\n");
    result.unwrap();
    assert_eq!(out, "Pick a color [red,green]? chose green\n");
}

#[test]
fn test_propertyfile_then_interpolation() {
    let (dir, path) = create_test_build(
        r#"
tasks:
  - propertyfile: { file: build.properties, prefix: cfg }
targets:
  - name: show
    tasks:
      - echo: "${cfg.url}"
"#,
    );
    fs::write(
        dir.path().join("build.properties"),
        "# deployment\nhost = example.org\nurl = https://${cfg.host}/app\n",
    )
    .unwrap();

    let (result, out) = run(&path, &["show"]);
    result.unwrap();
    assert_eq!(out, "https://example.org/app\n");
}

#[cfg(unix)]
#[test]
fn test_exec_output_property() {
    let (_dir, path) = create_test_build(
        r#"
targets:
  - name: rev
    tasks:
      - exec: { command: "echo abc", output: false, outputproperty: rev }
      - echo: "rev=${rev}"
"#,
    );

    let (result, out) = run(&path, &["rev"]);
    result.unwrap();
    assert_eq!(out, "rev=abc\n");
}

#[test]
fn test_overrides_win_over_build_file() {
    let (_dir, path) = create_test_build(
        r#"
properties:
  mode: debug
targets:
  - name: show
    tasks:
      - echo: "${mode}"
"#,
    );

    let overrides = vec![("mode".to_string(), "release".to_string())];
    let mut project = load_build_file(&path, &overrides).unwrap();
    let mut out = Vec::new();
    project
        .execute_with_io(&["show".to_string()], io::empty(), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "release\n");
}
