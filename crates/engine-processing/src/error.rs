use connectors::sql::base::destination::Destination;
use engine_core::error::SinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Write session for {path} failed: {source}")]
    Sink {
        path: String,
        #[source]
        source: SinkError,
    },

    /// The producer side of the event stream gave up.
    #[error("Upstream event stream failed: {0}")]
    Upstream(String),

    #[error("Delete events for {path} require an id column")]
    DeleteWithoutId { path: String },

    #[error("The offset receiver was closed before a commit could be acknowledged")]
    OffsetChannelClosed,
}

impl PipelineError {
    pub fn sink(destination: &Destination, source: SinkError) -> Self {
        PipelineError::Sink {
            path: destination.path.to_string(),
            source,
        }
    }
}
