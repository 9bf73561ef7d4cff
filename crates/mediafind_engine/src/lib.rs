//! Mediafind engine: backend transport and effect execution.
mod engine;
mod settings;
mod transport;
mod types;

pub use engine::EngineHandle;
pub use settings::{TransportSettings, DEFAULT_API_BASE};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    CatalogItem, DispatchSeq, EngineEvent, EngineStopped, FailureKind, JobSnapshot, JobStatus,
    MediaKind, MediaType, SearchHit, SearchRequest, SearchResponse, SubmitReceipt,
    SubscriptionId, TransportError,
};
