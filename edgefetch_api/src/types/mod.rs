mod error;
pub use self::error::{ErrorBody, ErrorResponse};

mod fetch;
pub use self::fetch::{FetchFailure, FetchResult};
