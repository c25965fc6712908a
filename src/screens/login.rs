use serde_json::{Value, json};

use super::{Chain, ChainStep, FieldDef, Schema, Values, endpoints};

pub fn schema() -> Schema {
    Schema::new()
        .field(
            FieldDef::new("email")
                .email("Invalid email address")
                .required("Email is required"),
        )
        .field(
            FieldDef::new("password")
                .min_length(8, "Password must be at least 8 characters")
                .required("Password is required"),
        )
}

pub fn initial_values() -> Values {
    Values::new().with("email", "").with("password", "")
}

pub fn chain() -> Chain {
    Chain::start(
        ChainStep::post("login", endpoints::LOGIN, |values, _| {
            let user = values.pick(&["email", "password"]);
            Ok(json!({ "user": Value::Object(user) }))
        })
        .with_credentials(),
    )
}
