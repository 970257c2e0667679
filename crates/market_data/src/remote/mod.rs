pub mod chart_response;
pub mod http_client;

pub use chart_response::{ChartResponse, SearchResponse};
pub use http_client::HttpQuoteClient;
