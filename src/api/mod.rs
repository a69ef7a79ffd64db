pub mod factory;
pub mod http;
pub mod provider;
pub mod upload;

pub use factory::create_clients;
pub use http::HttpContentApi;
pub use provider::{ContentApi, ListQuery, Page, SortOrder, UploadGateway};
pub use upload::HttpUploadGateway;
