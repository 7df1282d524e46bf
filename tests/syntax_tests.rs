//! Syntax conformance tests
//!
//! Each test pins down one rule of the notation: how a piece of text parses,
//! and for canonical forms, that encoding gives the same text back.

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use uri_charge::{
    charge, encode_charge, parse_charge, parse_charge_with_options, tokenize, Charge, Number,
    UcOptions, UcToken, UcValue,
};

fn parse(text: &str) -> Charge {
    parse_charge(text).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e))
}

fn assert_canonical(text: &str, expected: Charge) {
    assert_eq!(parse(text), expected, "parsing {:?}", text);
    assert_eq!(encode_charge(&expected).as_deref(), Some(text), "encoding {:?}", expected);
}

// Primitives

#[test]
fn test_booleans_and_null() {
    assert_canonical("!", charge!(true));
    assert_canonical("-", charge!(false));
    assert_canonical("--", charge!(null));
}

#[test]
fn test_numbers() {
    assert_canonical("13", charge!(13));
    assert_canonical("-7", charge!(-7));
    assert_canonical("2.5", charge!(2.5));
    assert_eq!(parse("1e3"), charge!(1000.0));
    assert_eq!(parse("0x1F"), charge!(31));
    assert_eq!(parse("-0x10"), charge!(-16));
}

#[test]
fn test_special_numbers() {
    assert_canonical("!Infinity", Charge::from(Number::Infinity));
    assert_canonical("!-Infinity", Charge::from(Number::NegativeInfinity));
    assert!(matches!(
        parse("!NaN"),
        Charge::Single(UcValue::Number(Number::NaN))
    ));
}

#[test]
fn test_bigints() {
    assert_canonical("0n42", Charge::from(BigInt::from(42)));
    assert_canonical("-0n42", Charge::from(BigInt::from(-42)));
    assert_eq!(parse("0n0xff"), Charge::from(BigInt::from(255)));
    assert_eq!(parse("0nabc"), charge!("0nabc"));
}

#[test]
fn test_strings() {
    assert_canonical("hello", charge!("hello"));
    assert_canonical("'", charge!(""));
    assert_canonical("'123", charge!("123"));
    assert_canonical("'-", charge!("-"));
    assert_canonical("'--", charge!("--"));
    assert_eq!(parse("'abc"), charge!("abc"));
    assert_eq!(parse("1a"), charge!("1a"));
    assert_eq!(parse("a:b@c"), charge!("a:b@c"));
}

#[test]
fn test_percent_escapes_are_text() {
    assert_canonical("%21", charge!("!"));
    assert_canonical("a%2Cb", charge!("a,b"));
    assert_canonical("%28x%29", charge!("(x)"));
    assert_canonical("%24", charge!("$"));
    assert_eq!(parse("caf%C3%A9"), charge!("café"));
}

#[test]
fn test_padding_is_trimmed() {
    assert_eq!(parse("  a  "), charge!("a"));
    assert_eq!(parse("a( 1 )b(x y)"), charge!({ "a": 1, "b": "x y" }));
    assert_eq!(parse("\r\n1,\t2\n"), charge!([1, 2]));
}

// Lists

#[test]
fn test_comma_lists() {
    assert_canonical("1,2,3", charge!([1, 2, 3]));
    assert_canonical(",", charge!([]));
    assert_eq!(parse("1,"), charge!([1]));
    assert_eq!(parse(",1,,2"), charge!([1, 2]));
}

#[test]
fn test_group_lists() {
    assert_canonical("(1)", charge!([1]));
    assert_canonical("(1,2)(3,4)", charge!([[1, 2], [3, 4]]));
    assert_canonical("(1,2)(),3", charge!([[1, 2], [], 3]));
    assert_eq!(parse("(1)(2)"), charge!([1, 2]));
    assert_eq!(parse("((1))((2))"), charge!([[1], [2]]));
}

#[test]
fn test_tail_map_after_group() {
    assert_eq!(parse("(1)key(2)"), charge!([1, { "key": 2 }]));
    assert_eq!(parse("(1)key"), charge!([1, { "key": "" }]));
    assert_canonical("((1))key", charge!([[1], { "key": "" }]));
}

// Maps

#[test]
fn test_maps() {
    assert_canonical("a(1)b(x)", charge!({ "a": 1, "b": "x" }));
    assert_canonical("a(1)b", charge!({ "a": 1, "b": "" }));
    assert_canonical("a(b(c(d)))", charge!({ "a": { "b": { "c": "d" } } }));
    assert_canonical("k(1,2)(3,4)", charge!({ "k": [[1, 2], [3, 4]] }));
    assert_canonical("k()", charge!({ "k": [] }));
}

#[test]
fn test_map_key_forms() {
    assert_canonical("$", charge!({}));
    assert_canonical("$(1)", charge!({ "": 1 }));
    assert_eq!(parse("$a"), charge!({ "a": "" }));
    assert_eq!(parse("$1(x)"), charge!({ "1": "x" }));
    assert_canonical("a%20b(1)", charge!({ "a b": 1 }));
}

#[test]
fn test_repeated_keys() {
    assert_eq!(parse("a(1)b(2)a(3)"), charge!({ "a": 3, "b": 2 }));
    let keys: Vec<String> = parse("a(1)b(2)a(3)")
        .as_map()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn test_maps_in_lists() {
    assert_canonical("foo(bar(test)),1", charge!([{ "foo": { "bar": "test" } }, 1]));
    assert_canonical("a(1),b(2)", charge!([{ "a": 1 }, { "b": 2 }]));
}

// Unbalanced input

#[test]
fn test_unbalanced_parentheses() {
    assert_eq!(parse("a(b"), charge!({ "a": "b" }));
    assert_eq!(parse("a(b(c"), charge!({ "a": { "b": "c" } }));
    assert_eq!(parse("a)b"), charge!("a"));
    assert_eq!(parse(")"), Charge::None);
}

#[test]
fn test_empty_input() {
    assert_eq!(parse(""), Charge::None);
    assert_eq!(parse("   "), Charge::None);
}

// Lexing

#[test]
fn test_plus_handling() {
    assert_eq!(parse("a+b"), charge!("a+b"));
    assert_eq!(
        parse_charge_with_options("a+b", &UcOptions::params()).unwrap(),
        charge!("a b")
    );
    assert_eq!(
        parse_charge_with_options("+x+", &UcOptions::params()).unwrap(),
        charge!("x")
    );
    assert_eq!(
        parse_charge_with_options("k(++1+)", &UcOptions::params()).unwrap(),
        charge!({ "k": 1 })
    );
}

#[test]
fn test_padding_compression() {
    let input = " ".repeat(1000);
    let tokens = tokenize(&input).unwrap();
    let runs: Vec<usize> = tokens.iter().map(UcToken::decoded_len).collect();
    assert_eq!(runs, vec![255, 255, 255, 235]);
    assert_eq!(UcToken::join(&tokens), input);
}
