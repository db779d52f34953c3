use connectors::sql::base::requests::DEFAULT_BATCH_SIZE;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ReadSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
