//! Integration tests for the Yul optimizer
//!
//! Tests the full pipeline: tokenize, parse, analyze, run memory load
//! forwarding, and print the result. Proof-dependent cases run on the
//! built-in solver; one parity test runs against z3 when it is installed.

use yulopt::analysis::has_unique_names;
use yulopt::dialect::EvmDialect;
use yulopt::lexer::tokenize;
use yulopt::opt::LoadForwarding;
use yulopt::parser::parse;
use yulopt::smt::Z3Solver;

/// Parse a program and return its canonical printed form
fn printed(source: &str) -> String {
    let block = parse(source, tokenize(source).unwrap()).unwrap();
    block.to_string()
}

/// Run load forwarding with the built-in solver and print the result
fn optimize(source: &str) -> String {
    let mut block = parse(source, tokenize(source).unwrap()).unwrap();
    LoadForwarding::run(&EvmDialect::new(), &mut block);
    block.to_string()
}

/// Assert that the optimizer leaves `source` untouched
fn assert_unchanged(source: &str) {
    assert_eq!(optimize(source), printed(source));
}

// ============================================
// Forwarding
// ============================================

#[test]
fn test_basic_forwarding() {
    insta::assert_snapshot!(
        optimize("let x := 0 let v := 5 mstore(x, v) let y := mload(x)"),
        @"{ let x := 0 let v := 5 mstore(x, v) let y := v }"
    );
}

#[test]
fn test_forwarding_into_call_argument() {
    assert_eq!(
        optimize("let x := 0 let v := 5 mstore(x, v) sstore(0, mload(x))"),
        "{ let x := 0 let v := 5 mstore(x, v) sstore(0, v) }"
    );
}

#[test]
fn test_two_tracked_words() {
    assert_eq!(
        optimize(
            "let a := 0 let b := 32 let v := 1 let w := 2 \
             mstore(a, v) mstore(b, w) let p := mload(a) let q := mload(b)"
        ),
        "{ let a := 0 let b := 32 let v := 1 let w := 2 \
           mstore(a, v) mstore(b, w) let p := v let q := w }"
    );
}

#[test]
fn test_idempotence() {
    let source = "let x := 0 let v := 5 mstore(x, v) let y := mload(x) sstore(0, mload(x))";
    let once = optimize(source);
    let inner = once
        .strip_prefix("{ ")
        .and_then(|s| s.strip_suffix(" }"))
        .unwrap();
    assert_eq!(optimize(inner), once);
}

// ============================================
// Non-simple stores
// ============================================

#[test]
fn test_literal_address_is_not_tracked() {
    assert_unchanged("let v := 5 mstore(0, v) let y := mload(0)");
}

#[test]
fn test_computed_address_is_not_tracked() {
    assert_unchanged("let x := 0 let v := 5 mstore(add(x, 0), v) let y := mload(x)");
}

// ============================================
// Invalidation footprints
// ============================================

#[test]
fn test_overlapping_calldatacopy_invalidates() {
    assert_unchanged("let x := 0 let v := 1 mstore(x, v) calldatacopy(x, 0, 64) let y := mload(x)");
}

#[test]
fn test_disjoint_extcodecopy_survives() {
    assert_eq!(
        optimize(
            "let a := 0 let d := 64 let v := 1 mstore(a, v) \
             extcodecopy(0, d, 0, 32) let y := mload(a)"
        ),
        "{ let a := 0 let d := 64 let v := 1 mstore(a, v) \
           extcodecopy(0, d, 0, 32) let y := v }"
    );
}

#[test]
fn test_call_invalidates_only_output_region() {
    assert_eq!(
        optimize(
            "let x := 0 let v := 1 mstore(x, v) let o := 64 \
             let ok := call(gas(), 0, 0, 0, 0, o, 32) let y := mload(x)"
        ),
        "{ let x := 0 let v := 1 mstore(x, v) let o := 64 \
           let ok := call(gas(), 0, 0, 0, 0, o, 32) let y := v }"
    );
}

#[test]
fn test_staticcall_output_overlap_invalidates() {
    assert_unchanged(
        "let x := 0 let v := 1 mstore(x, v) \
         let ok := staticcall(gas(), 0, 64, 32, x, 32) let y := mload(x)",
    );
}

#[test]
fn test_adjacent_mstore8_survives() {
    assert_eq!(
        optimize(
            "let x := 0 let v := 1 mstore(x, v) let b := 32 \
             mstore8(b, 7) let y := mload(x)"
        ),
        "{ let x := 0 let v := 1 mstore(x, v) let b := 32 \
           mstore8(b, 7) let y := v }"
    );
}

#[test]
fn test_mstore8_into_word_invalidates() {
    assert_unchanged(
        "let x := 0 let v := 1 mstore(x, v) let b := 31 mstore8(b, 7) let y := mload(x)",
    );
}

// ============================================
// Word-boundary arithmetic
// ============================================

#[test]
fn test_next_word_store_survives() {
    assert_eq!(
        optimize(
            "let x := 0 let v := 1 mstore(x, v) let z := add(x, 32) \
             let w := 2 mstore(z, w) let y := mload(x)"
        ),
        "{ let x := 0 let v := 1 mstore(x, v) let z := add(x, 32) \
           let w := 2 mstore(z, w) let y := v }"
    );
}

#[test]
fn test_nested_add_offsets() {
    assert_eq!(
        optimize(
            "let x := 0 let v := 1 mstore(x, v) let z := add(add(x, 32), 32) \
             let w := 2 mstore(z, w) let y := mload(x)"
        ),
        "{ let x := 0 let v := 1 mstore(x, v) let z := add(add(x, 32), 32) \
           let w := 2 mstore(z, w) let y := v }"
    );
}

#[test]
fn test_last_byte_overlap_invalidates() {
    assert_unchanged(
        "let x := 0 let v := 1 mstore(x, v) let z := add(x, 31) \
         let w := 2 mstore(z, w) let y := mload(x)",
    );
}

#[test]
fn test_unmodeled_arithmetic_is_conservative() {
    // sub is not encoded precisely, so the store address is unknown
    assert_unchanged(
        "let x := 64 let v := 1 mstore(x, v) let z := sub(x, 32) \
         let w := 2 mstore(z, w) let y := mload(x)",
    );
}

// ============================================
// Control flow
// ============================================

#[test]
fn test_switch_without_memory_writes_preserves_entry() {
    assert_eq!(
        optimize(
            "let x := 0 let v := 1 mstore(x, v) \
             switch x case 0 { sstore(0, 1) } default { sstore(0, 2) } \
             let y := mload(x)"
        ),
        "{ let x := 0 let v := 1 mstore(x, v) \
           switch x case 0 { sstore(0, 1) } default { sstore(0, 2) } \
           let y := v }"
    );
}

#[test]
fn test_switch_case_store_invalidates() {
    assert_unchanged(
        "let x := 0 let v := 1 let w := 2 mstore(x, v) \
         switch x case 0 { mstore(x, w) } default { sstore(0, 1) } \
         let y := mload(x)",
    );
}

#[test]
fn test_store_before_loop_is_not_forwarded_inside() {
    assert_unchanged(
        "let x := 0 let v := 1 mstore(x, v) \
         for { let i := 0 } lt(i, 2) { } { sstore(i, mload(x)) }",
    );
}

#[test]
fn test_user_function_with_memory_write_invalidates() {
    assert_unchanged(
        "function store(p, q) { mstore8(p, q) } \
         let x := 0 let v := 1 mstore(x, v) store(0, 2) let y := mload(x)",
    );
}

#[test]
fn test_pure_user_function_preserves_entry() {
    assert_eq!(
        optimize(
            "function id(p) -> r { r := p } \
             let x := 0 let v := 1 mstore(x, v) let z := id(v) let y := mload(x)"
        ),
        "{ function id(p) -> r { r := p } \
           let x := 0 let v := 1 mstore(x, v) let z := id(v) let y := v }"
    );
}

// ============================================
// Suppression and preconditions
// ============================================

#[test]
fn test_msize_disables_the_pass() {
    assert_unchanged("let x := 0 let v := 5 mstore(x, v) let y := mload(x) let m := msize()");
}

#[test]
fn test_msize_inside_function_disables_the_pass() {
    assert_unchanged(
        "function f() -> m { m := msize() } \
         let x := 0 let v := 5 mstore(x, v) let y := mload(x)",
    );
}

#[test]
fn test_shadowed_names_are_detected() {
    let source = "let x := 0 { let x := 1 }";
    let block = parse(source, tokenize(source).unwrap()).unwrap();
    assert!(!has_unique_names(&block));
}

#[test]
#[should_panic(expected = "unique variable names")]
fn test_shadowed_names_are_rejected() {
    optimize("let x := 0 { let x := 1 }");
}

// ============================================
// Pipeline errors
// ============================================

#[test]
fn test_lexer_rejects_unknown_characters() {
    assert!(tokenize("let x := @").is_err());
}

#[test]
fn test_parser_rejects_missing_identifier() {
    let source = "let := 5";
    let tokens = tokenize(source).unwrap();
    assert!(parse(source, tokens).is_err());
}

#[test]
fn test_parser_rejects_oversized_literal() {
    let source = "let x := 0x10000000000000000000000000000000000000000000000000000000000000000";
    let tokens = tokenize(source).unwrap();
    assert!(parse(source, tokens).is_err());
}

// ============================================
// External solver parity
// ============================================

// Exercised only when a z3 binary is installed
#[test]
fn test_z3_backend_matches_builtin() {
    if !Z3Solver::new().is_available() {
        return;
    }
    let source = "let x := 0 let v := 1 mstore(x, v) let z := add(x, 32) \
                  let w := 2 mstore(z, w) let y := mload(x)";
    let mut block = parse(source, tokenize(source).unwrap()).unwrap();
    LoadForwarding::run_with_solver(&EvmDialect::new(), &mut block, Box::new(Z3Solver::new()));
    assert_eq!(block.to_string(), optimize(source));
}
