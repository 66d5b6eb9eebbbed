//! HTTP endpoint implementations for the Evaluacion resource.

pub mod evaluacion_handlers;
pub mod header_util;
pub mod request_utils;
pub mod response;

pub use evaluacion_handlers::{
    create_evaluacion, delete_evaluacion, get_all_evaluacions, get_evaluacion, update_evaluacion,
};
pub use request_utils::{build_response, map_db_error_to_router_error};
pub use response::error_response;
