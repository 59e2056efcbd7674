pub mod query;
pub mod search;
pub mod thumbnails;
pub mod transport;

pub use query::{encode, encode_bytes, EncodedQuery};
pub use search::{SearchClient, SearchSettings};
pub use thumbnails::ThumbnailFetcher;
pub use transport::{HttpTransport, Transport};
