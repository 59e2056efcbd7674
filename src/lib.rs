pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use config::Config;
pub use error::{
    Alert, AlertKind, AppResult, EncodingError, FetchError, SearchError, TransportError,
};
pub use models::{
    ImageBytes, MovieRecord, SearchGeneration, SearchResult, SlotId, ThumbnailDelivery,
};
pub use services::{
    encode, EncodedQuery, HttpTransport, SearchClient, SearchSettings, ThumbnailFetcher, Transport,
};
pub use session::{
    AlertSurface, DeliveryPumpHandle, Renderer, ResultBoard, SearchSession, SubmitOutcome,
};
