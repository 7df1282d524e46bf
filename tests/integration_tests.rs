use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use uri_charge::{
    charge, encode_charge, encode_charge_as, from_charge, from_str, parse_charge,
    parse_charge_chunks, parse_charge_with_entities, parse_charge_with_options, to_charge,
    to_string, Charge, Error, UcEntities, UcOptions, UcPlacement, UcSearchParams, UcValue,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    note: Option<String>,
    total: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Status {
    Pending,
    Shipped(String),
    Cancelled { reason: String },
}

#[test]
fn test_simple_struct() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let text = to_string(&user).unwrap();
    assert_eq!(text, "id(123)name(Alice)active(!)tags(admin,developer)");

    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct_round_trip() {
    let order = Order {
        order_id: 7,
        customer: User {
            id: 1,
            name: "Bob Smith".to_string(),
            active: false,
            tags: vec![],
        },
        items: vec![
            Product {
                sku: "A-1".to_string(),
                price: 9.99,
                quantity: 2,
            },
            Product {
                sku: "42".to_string(),
                price: 0.5,
                quantity: 1,
            },
        ],
        note: None,
        total: 20.48,
    };

    let text = to_string(&order).unwrap();
    assert!(!text.contains("note"));

    let order_back: Order = from_str(&text).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_single_item_vec_round_trip() {
    let user = User {
        id: 2,
        name: String::new(),
        active: true,
        tags: vec!["solo".to_string()],
    };

    let text = to_string(&user).unwrap();
    assert_eq!(text, "id(2)name(')active(!)tags((solo))");
    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_enum_round_trip() {
    for status in [
        Status::Pending,
        Status::Shipped("ups".to_string()),
        Status::Cancelled {
            reason: "out of stock".to_string(),
        },
    ] {
        let text = to_string(&status).unwrap();
        let back: Status = from_str(&text).unwrap();
        assert_eq!(status, back);
    }
    assert_eq!(to_string(&Status::Pending).unwrap(), "Pending");
    assert_eq!(to_string(&Status::Shipped("x".into())).unwrap(), "Shipped(x)");
}

#[test]
fn test_top_level_list_with_map() {
    let charge = parse_charge("foo(bar(test)),1").unwrap();
    assert_eq!(charge, charge!([{ "foo": { "bar": "test" } }, 1]));
}

#[test]
fn test_empty_list_round_trip() {
    let empty = Charge::List(vec![]);
    assert_eq!(encode_charge(&empty).unwrap(), ",");
    assert_eq!(parse_charge(",").unwrap(), empty);
}

#[test]
fn test_numeric_string_escape() {
    let text = encode_charge(&Charge::from("123")).unwrap();
    assert_eq!(text, "'123");
    assert_eq!(parse_charge(&text).unwrap(), Charge::from("123"));
}

#[test]
fn test_suffix_elision() {
    let map = charge!({ "a": 1, "b": "" });
    let text = encode_charge(&map).unwrap();
    assert_eq!(text, "a(1)b");
    assert_eq!(parse_charge(&text).unwrap(), map);
}

#[test]
fn test_list_adjacency_in_entry() {
    let nested = charge!([[1, 2], [3, 4]]);
    assert_eq!(
        encode_charge_as(&nested, UcPlacement::Entry).unwrap(),
        "(1,2)(3,4)"
    );

    let map = charge!({ "k": [[1, 2], [3, 4]] });
    let text = encode_charge(&map).unwrap();
    assert_eq!(text, "k(1,2)(3,4)");
    assert_eq!(parse_charge(&text).unwrap(), map);
}

#[test]
fn test_tail_map_equivalence() {
    assert_eq!(
        parse_charge("(1)key(2)").unwrap(),
        parse_charge("(1)(key(2))").unwrap()
    );
    assert_eq!(parse_charge("(1)key(2)").unwrap(), charge!([1, { "key": 2 }]));
}

#[test]
fn test_dollar_forms() {
    assert_eq!(parse_charge("$").unwrap(), charge!({}));
    assert_eq!(parse_charge("$(1)").unwrap(), charge!({ "": 1 }));
}

#[test]
fn test_unbalanced_parentheses() {
    assert_eq!(parse_charge("a(b").unwrap(), charge!({ "a": "b" }));
    assert_eq!(parse_charge("a)b").unwrap(), charge!("a"));
}

#[test]
fn test_query_params() {
    let params = UcSearchParams::parse("a=1&b=2&a=3").unwrap();
    assert_eq!(
        params.iter().collect::<Vec<_>>(),
        vec![("a", "1"), ("b", "2"), ("a", "3")]
    );

    let params = UcSearchParams::parse("baz=(21)(22)").unwrap();
    assert_eq!(params.charge("baz").unwrap(), charge!([21, 22]));
}

#[test]
fn test_entities() {
    let date = parse_charge("!date:2024-01-15T10:30:00Z").unwrap();
    assert_eq!(
        date.as_date(),
        Some(&Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
    );

    assert!(matches!(
        parse_charge("!foo"),
        Err(Error::UnrecognizedEntity { .. })
    ));

    let mut entities = UcEntities::default();
    entities.add_raw_fallback();
    let foo = parse_charge_with_entities("!foo", &UcOptions::default(), &entities).unwrap();
    assert_eq!(foo, Charge::Single(UcValue::Entity("!foo".to_string())));
    assert_eq!(encode_charge(&foo).unwrap(), "!foo");
}

#[test]
fn test_date_round_trip() {
    let when = Utc.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap();
    let charge = Charge::from(when);
    let text = encode_charge(&charge).unwrap();
    assert!(text.starts_with("!date:"));
    assert_eq!(parse_charge(&text).unwrap(), charge);
}

#[test]
fn test_bigint_values() {
    let big: BigInt = "123456789012345678901234567890".parse().unwrap();
    let charge = Charge::from(big.clone());
    assert_eq!(
        encode_charge(&charge).unwrap(),
        "0n123456789012345678901234567890"
    );
    assert_eq!(parse_charge("0n123456789012345678901234567890").unwrap(), charge);
    assert_eq!(to_charge(&u64::MAX).unwrap(), Charge::from(BigInt::from(u64::MAX)));
    assert_eq!(from_str::<u64>(&to_string(&u64::MAX).unwrap()).unwrap(), u64::MAX);
}

#[test]
fn test_special_numbers() {
    let list = parse_charge("!NaN,!Infinity,!-Infinity").unwrap();
    assert!(list.at(0).as_f64().unwrap().is_nan());
    assert_eq!(list.at(1).as_f64(), Some(f64::INFINITY));
    assert_eq!(list.at(2).as_f64(), Some(f64::NEG_INFINITY));
}

#[test]
fn test_chunked_input() {
    let whole = parse_charge("name(J%C3%BCrgen)tags(a,b)").unwrap();
    let chunked =
        parse_charge_chunks(["name(J%C", "3%BCrg", "en)tags(a", ",b)"], &UcOptions::default())
            .unwrap();
    assert_eq!(whole, chunked);
    assert_eq!(whole.get("name").as_str(), Some("Jürgen"));
}

#[test]
fn test_depth_limit() {
    let options = UcOptions::new().with_max_depth(2);
    assert!(matches!(
        parse_charge_with_options("a(b(c(d)))", &options),
        Err(Error::DepthExceeded { limit: 2 })
    ));

    let lenient = options.with_strict(false);
    let charge = parse_charge_with_options("a(b(c(d)))", &lenient).unwrap();
    assert_eq!(charge, charge!({ "a": { "b": {} } }));
}

fn wrapping_entities() -> UcEntities {
    let mut entities = UcEntities::new();
    entities
        .add_entity_str("!wrap", |ctx, rx| {
            rx.set_string(format!("wrapped {}", ctx.args().len()));
            true
        })
        .unwrap();
    entities
}

#[test]
fn test_directive_argument_errors_follow_policy() {
    let entities = wrapping_entities();
    assert!(matches!(
        parse_charge_with_entities("!wrap(!nope)", &UcOptions::new(), &entities),
        Err(Error::UnrecognizedEntity { entity }) if entity == "!nope"
    ));

    let charge =
        parse_charge_with_entities("!wrap(!nope)", &UcOptions::lenient(), &entities).unwrap();
    assert_eq!(charge, charge!("wrapped 1"));
}

#[test]
fn test_nested_directives_are_depth_limited() {
    let entities = wrapping_entities();

    let nested = format!("{}1{}", "!wrap(".repeat(6), ")".repeat(6));
    let options = UcOptions::new().with_max_depth(2);
    assert!(matches!(
        parse_charge_with_entities(&nested, &options, &entities),
        Err(Error::DepthExceeded { limit: 2 })
    ));

    let deep = "!wrap(".repeat(10_000);
    assert!(matches!(
        parse_charge_with_entities(&deep, &UcOptions::new(), &entities),
        Err(Error::DepthExceeded { limit: 128 })
    ));
    let charge = parse_charge_with_entities(&deep, &UcOptions::lenient(), &entities).unwrap();
    assert_eq!(charge, charge!("wrapped 1"));
}

#[test]
fn test_from_charge_with_json_interop() {
    let charge = parse_charge("id(5)name(Eve)active(-)tags(x,y)").unwrap();
    let json = serde_json::to_value(&charge).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "id": 5, "name": "Eve", "active": false, "tags": ["x", "y"] })
    );

    let user: User = from_charge(charge).unwrap();
    assert_eq!(user.name, "Eve");

    let back: Charge = serde_json::from_value(json).unwrap();
    assert_eq!(back.get("tags").len(), 2);
}

#[test]
fn test_unencodable() {
    assert!(matches!(
        to_string(&None::<u8>),
        Err(Error::Unencodable(_))
    ));
}
