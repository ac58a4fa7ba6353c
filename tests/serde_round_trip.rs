//! Serialization round trips for the plain-data sum types.
#![cfg(feature = "serde")]

use watershed::{Either, Ior, NonEmptyVec, Validation};

#[test]
fn either_round_trips() {
    let right: Either<String, i32> = Either::right(42);
    let json = serde_json::to_string(&right).unwrap();
    let back: Either<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, right);

    let left: Either<String, i32> = Either::left("e".to_string());
    let json = serde_json::to_string(&left).unwrap();
    let back: Either<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, left);
}

#[test]
fn validation_round_trips() {
    let failure: Validation<i32, Vec<String>> =
        Validation::failure(vec!["a".to_string(), "b".to_string()]);
    let json = serde_json::to_string(&failure).unwrap();
    let back: Validation<i32, Vec<String>> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, failure);
}

#[test]
fn ior_round_trips() {
    let both: Ior<i32, String> = Ior::Both(1, "a".to_string());
    let json = serde_json::to_string(&both).unwrap();
    let back: Ior<i32, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, both);
}

#[test]
fn nonempty_round_trips() {
    let nev = NonEmptyVec::new(1, vec![2, 3]);
    let json = serde_json::to_string(&nev).unwrap();
    let back: NonEmptyVec<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, nev);
}
