pub mod client;
pub mod http_client;
pub mod models;

pub use client::ApiClient;
pub use http_client::{HttpClient, HttpMethod, HttpResponse, ReqwestHttpClient};
