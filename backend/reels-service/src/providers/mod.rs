/// External AI service clients
///
/// One module per provider, each a typed reqwest client with explicit
/// timeouts and status handling. Orchestration lives in services/.
pub mod openai;
pub mod pinecone;

pub use openai::OpenAiClient;
pub use pinecone::{PineconeClient, QueryMatch, VectorMetadata, VectorRecord};
