pub mod audio;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod http;
pub mod pipeline;
pub mod session;
pub mod sink;

pub use audio::{AssembledAudio, AudioAssembler, AudioFile};
pub use config::Config;
pub use dispatch::{JobDispatcher, LatestResult};
pub use error::UplinkError;
pub use history::{HistoryStore, JsonlHistory};
pub use http::{create_router, AppState};
pub use pipeline::{GeminiPipeline, MockPipeline, PipelineError, Transcriber, Translator};
pub use session::{Begin, Outcome, SessionRegistry, SessionSnapshot, SessionStatus};
pub use sink::{ByteSink, FsByteSink, MemorySink};
