pub mod health_checks;
pub mod jobs;
pub mod json_error;
pub mod validated_json;
