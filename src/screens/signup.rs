use serde_json::{Value, json};

use super::{Chain, ChainStep, FieldDef, Schema, Values, endpoints};

pub const STUDENT_ROLE: &str = "student";

pub fn schema() -> Schema {
    Schema::new()
        .field(FieldDef::new("last_name").required("Last name is required"))
        .field(FieldDef::new("first_name").required("First name is required"))
        .field(
            FieldDef::new("email")
                .email("Invalid email address")
                .required("Email is required"),
        )
        .field(
            FieldDef::new("phone_number")
                .numeric("Phone number must be a number")
                .required("Phone number is required"),
        )
        .field(
            FieldDef::new("password")
                .min_length(8, "Password must be at least 8 characters")
                .required("Password is required"),
        )
        .field(
            FieldDef::new("password_confirmation")
                .matches("password", "Passwords must match")
                .required("Password confirmation is required"),
        )
        .field(FieldDef::new("user_role"))
}

pub fn initial_values() -> Values {
    Values::new()
        .with("last_name", "")
        .with("first_name", "")
        .with("email", "")
        .with("phone_number", "")
        .with("password", "")
        .with("password_confirmation", "")
        .with("user_role", STUDENT_ROLE)
}

pub fn chain() -> Chain {
    Chain::start(
        ChainStep::post("signup", endpoints::SIGNUP, |values, _| {
            Ok(json!({ "user": Value::Object(values.to_json()) }))
        })
        .with_credentials(),
    )
}
