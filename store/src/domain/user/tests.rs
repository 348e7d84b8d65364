//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn demo_user() -> User {
    User::try_from_strings("1", "demo", "demo@example.com").expect("fixture user is valid")
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case(" 1", UserValidationError::InvalidId)]
#[case("1\n", UserValidationError::InvalidId)]
fn user_id_rejects_blank_or_padded_values(
    #[case] raw: &str,
    #[case] expected: UserValidationError,
) {
    let err = UserId::new(raw).expect_err("invalid ids must fail");
    assert_eq!(err, expected);
}

#[rstest]
#[case(json!("7"), "7")]
#[case(json!(7), "7")]
#[case(json!(-2), "-2")]
fn user_ids_decode_from_strings_and_numbers(
    #[case] value: serde_json::Value,
    #[case] expected: &str,
) {
    let id: UserId = serde_json::from_value(value).expect("id decodes");
    assert_eq!(id.as_ref(), expected);
    assert_eq!(serde_json::to_value(&id).expect("id encodes"), json!(expected));
}

#[rstest]
fn padded_textual_user_ids_still_fail_to_decode() {
    assert!(serde_json::from_value::<UserId>(json!(" 7")).is_err());
}

#[rstest]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("demo", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("demo@", UserValidationError::InvalidEmail)]
#[case("a@b@c", UserValidationError::InvalidEmail)]
fn email_rejects_malformed_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = EmailAddress::new(raw).expect_err("malformed email must fail");
    assert_eq!(err, expected);
}

#[rstest]
fn username_and_email_are_trimmed() {
    let user = User::try_from_strings("u1", "  chef  ", " chef@example.com ")
        .expect("padded inputs are trimmed");
    assert_eq!(user.username().as_ref(), "chef");
    assert_eq!(user.email().as_ref(), "chef@example.com");
}

#[rstest]
fn blank_username_is_rejected() {
    let err = User::try_from_strings("u1", " ", "chef@example.com").expect_err("blank username");
    assert_eq!(err, UserValidationError::EmptyUsername);
}

#[rstest]
fn serialises_as_flat_camel_case_object(demo_user: User) {
    let value = serde_json::to_value(&demo_user).expect("user serialises");
    assert_eq!(
        value,
        json!({ "id": "1", "username": "demo", "email": "demo@example.com" })
    );
}

#[rstest]
fn deserialisation_revalidates_fields() {
    let result = serde_json::from_value::<User>(json!({
        "id": "",
        "username": "demo",
        "email": "demo@example.com"
    }));
    assert!(result.is_err(), "empty ids must not deserialise");
}

#[rstest]
fn deserialisation_round_trips_persisted_session(demo_user: User) {
    let blob = serde_json::to_string(&demo_user).expect("user serialises");
    let decoded: User = serde_json::from_str(&blob).expect("blob decodes");
    assert_eq!(decoded, demo_user);
}
