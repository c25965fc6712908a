use serde_json::Value;

use super::{Chain, ChainStep, FieldDef, Schema, Values, endpoints};

fn dated(name: &str, required: &str, invalid: &str) -> FieldDef {
    FieldDef::new(name).required(required).date(invalid)
}

pub fn schema() -> Schema {
    Schema::new()
        .field(FieldDef::new("course_name").required("Course name is required."))
        .field(FieldDef::new("description"))
        .field(FieldDef::new("duration").required("Course duration is required."))
        .field(FieldDef::new("type").required("Course type is required."))
        .field(dated(
            "registration_start_date",
            "Registration start date is required.",
            "Registration start date must be a valid date.",
        ))
        .field(dated(
            "registration_due_date",
            "Registration due date is required.",
            "Registration due date must be a valid date.",
        ))
        .field(dated(
            "start_date",
            "Start date is required.",
            "Start date must be a valid date.",
        ))
        .field(
            FieldDef::new("company_id")
                .required("Company ID is required.")
                .numeric("Company ID must be a number."),
        )
}

pub fn initial_values() -> Values {
    Values::new()
        .with("course_name", "")
        .with("description", "")
        .with("duration", "")
        .with("type", "")
        .with("registration_start_date", "")
        .with("registration_due_date", "")
        .with("start_date", "")
        .with("company_id", 0)
}

pub fn chain() -> Chain {
    Chain::start(
        ChainStep::post("create-course", endpoints::COURSES, |values, _| {
            // same reading the numeric rule accepted
            let company_id = values
                .get("company_id")
                .and_then(|id| id.as_json_number())
                .ok_or("company_id is not a number")?;

            let mut course = values.to_json();
            course.insert("company_id".into(), Value::Number(company_id));
            Ok(Value::Object(course))
        })
        .with_credentials(),
    )
}
