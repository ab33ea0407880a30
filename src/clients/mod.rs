mod flower;
mod worker_http;

pub use flower::Flower;
pub use worker_http::HttpTransport;
