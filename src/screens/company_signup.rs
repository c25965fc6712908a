//! Company registration: creates the company, then its first admin user
//! carrying the new company's id.
use serde_json::{Value, json};

use super::{Chain, ChainStep, FieldDef, Schema, Values, endpoints, prior_id};

pub const ADMIN_ROLE: &str = "admin";

const COMPANY_FIELDS: [&str; 5] = [
    "company_name",
    "company_register",
    "address",
    "company_email",
    "company_phone_number",
];

const USER_FIELDS: [&str; 7] = [
    "last_name",
    "first_name",
    "email",
    "phone_number",
    "password",
    "password_confirmation",
    "user_role",
];

pub fn schema() -> Schema {
    Schema::new()
        .field(FieldDef::new("company_name").required("Company name is required."))
        .field(FieldDef::new("company_register").required("Registration number is required."))
        .field(FieldDef::new("address").required("Address is required."))
        .field(
            FieldDef::new("company_email")
                .email("Enter a valid email.")
                .required("Company email is required."),
        )
        .field(FieldDef::new("company_phone_number").required("Company phone number is required."))
        .field(FieldDef::new("last_name").required("Last name is required."))
        .field(FieldDef::new("first_name").required("First name is required."))
        .field(
            FieldDef::new("email")
                .email("Enter a valid email.")
                .required("Email is required."),
        )
        .field(FieldDef::new("phone_number").required("Phone number is required."))
        .field(
            FieldDef::new("password")
                .min_length(8, "Password must be at least 8 characters.")
                .required("Password is required."),
        )
        .field(
            FieldDef::new("password_confirmation")
                .matches("password", "Passwords must match.")
                .required("Password confirmation is required."),
        )
        .field(FieldDef::new("user_role"))
}

pub fn initial_values() -> Values {
    COMPANY_FIELDS
        .iter()
        .chain(USER_FIELDS.iter())
        .fold(Values::new(), |values, name| values.with(name, ""))
        .with("user_role", ADMIN_ROLE)
}

pub fn chain() -> Chain {
    let create_company = ChainStep::post("create-company", endpoints::COMPANIES, |values, _| {
        Ok(json!({ "company": Value::Object(values.pick(&COMPANY_FIELDS)) }))
    })
    .with_credentials();

    let create_user = ChainStep::post("create-user", endpoints::SIGNUP, |values, prior| {
        let company_id = prior
            .first()
            .and_then(prior_id)
            .ok_or("company response carried no id")?;

        let mut user = values.pick(&USER_FIELDS);
        user.insert("company_id".into(), company_id);
        Ok(json!({ "user": Value::Object(user) }))
    })
    .with_credentials();

    Chain::start(create_company).then(create_user)
}
