//! Expectation-based integration tests.
//!
//! This test runner discovers all `.cs` files in test-fixtures/specs and
//! verifies that the reported diagnostics match their `//~` comments.
//!
//! # Test Organization
//!
//! - Each `.cs` file is a test suite ("describe") for a concept
//! - Each top-level type in the file is a test case ("it")
//! - `//~` comments define expected diagnostics; a type without any
//!   expects none
//!
//! # Example
//!
//! ```text
//! // test-fixtures/specs/locals.cs
//! class LeakedLocal {
//!     void M() {
//!         var s = new MemoryStream();     //~ local: s
//!     }
//! }
//! ```

use disposal_lint::testing::{fixture_files, format_results, verify_file, VerificationError};
use std::path::{Path, PathBuf};

fn specs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-fixtures")
        .join("specs")
}

#[test]
fn run_expectation_tests() {
    let files = fixture_files(&specs_dir());
    assert!(!files.is_empty(), "no spec files found in {:?}", specs_dir());

    let mut total_pass = 0;
    let mut total_fail = 0;
    let mut all_output = String::new();

    for path in &files {
        match verify_file(path) {
            Ok(result) => {
                total_pass += result.pass_count();
                all_output.push_str(&format_results(&result));
            }
            Err(VerificationError::TestFailures(result)) => {
                total_pass += result.pass_count();
                total_fail += result.fail_count();
                all_output.push_str(&format_results(&result));
            }
            Err(e) => {
                all_output.push_str(&format!("{}: {}\n", path.display(), e));
                total_fail += 1;
            }
        }
    }

    println!("\n{}", all_output);
    println!("Total: {} passed, {} failed", total_pass, total_fail);

    if total_fail > 0 {
        panic!("{} expectation test(s) failed", total_fail);
    }
}

#[test]
fn test_local_specs() {
    run_spec_file(&specs_dir().join("locals.cs"));
}

#[test]
fn test_using_specs() {
    run_spec_file(&specs_dir().join("using.cs"));
}

#[test]
fn test_field_specs() {
    run_spec_file(&specs_dir().join("fields.cs"));
}

#[test]
fn test_property_specs() {
    run_spec_file(&specs_dir().join("properties.cs"));
}

#[test]
fn test_return_specs() {
    run_spec_file(&specs_dir().join("returns.cs"));
}

#[test]
fn test_ownership_specs() {
    run_spec_file(&specs_dir().join("ownership.cs"));
}

#[test]
fn test_await_specs() {
    run_spec_file(&specs_dir().join("await.cs"));
}

#[test]
fn test_top_level_specs() {
    run_spec_file(&specs_dir().join("top_level.cs"));
}

fn run_spec_file(path: &Path) {
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("?");
    match verify_file(path) {
        Ok(result) => {
            println!("{}", format_results(&result));
            assert!(result.total() > 0, "{} has no test cases", name);
        }
        Err(VerificationError::TestFailures(result)) => {
            println!("{}", format_results(&result));
            panic!("{} tests failed", name);
        }
        Err(e) => {
            panic!("Error running {} tests: {}", name, e);
        }
    }
}
