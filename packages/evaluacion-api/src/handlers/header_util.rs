//! Alert headers attached to mutation responses.
//!
//! Clients read `X-{app}-alert` and `X-{app}-params` to show a notification
//! after a create, update or delete, and `X-{app}-error` after a rejected
//! request.

/// Entity name used in alert keys.
pub const ENTITY_NAME: &str = "evaluacion";

/// A list of header name/value pairs to attach to a response.
pub type Headers = Vec<(String, String)>;

/// Generic alert with a message key and a parameter.
pub fn create_alert(application_name: &str, message: &str, param: &str) -> Headers {
    vec![
        (format!("X-{}-alert", application_name), message.to_string()),
        (format!("X-{}-params", application_name), param.to_string()),
    ]
}

pub fn entity_creation_alert(application_name: &str, param: &str) -> Headers {
    create_alert(
        application_name,
        &format!("{}.{}.created", application_name, ENTITY_NAME),
        param,
    )
}

pub fn entity_update_alert(application_name: &str, param: &str) -> Headers {
    create_alert(
        application_name,
        &format!("{}.{}.updated", application_name, ENTITY_NAME),
        param,
    )
}

pub fn entity_deletion_alert(application_name: &str, param: &str) -> Headers {
    create_alert(
        application_name,
        &format!("{}.{}.deleted", application_name, ENTITY_NAME),
        param,
    )
}

/// Failure alert, e.g. `error.idexists`.
pub fn failure_alert(application_name: &str, error_key: &str) -> Headers {
    vec![
        (
            format!("X-{}-error", application_name),
            format!("error.{}", error_key),
        ),
        (
            format!("X-{}-params", application_name),
            ENTITY_NAME.to_string(),
        ),
    ]
}
