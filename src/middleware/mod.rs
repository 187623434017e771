pub mod record_request;
