pub(crate) mod admin;
pub(crate) mod context;
pub(crate) mod error;

pub(crate) use error::ApiError;
