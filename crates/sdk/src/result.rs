use serde::{Deserialize, Serialize};

use crate::Event;

/// Where in the delivery path a transaction failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStage {
    Decode,
    Ante,
    Route,
    Msg,
}

impl TxStage {
    /// Result code reported for a failure in this stage.
    pub fn code(&self) -> u32 {
        match self {
            TxStage::Decode => 1,
            TxStage::Ante => 2,
            TxStage::Route => 3,
            TxStage::Msg => 4,
        }
    }
}

/// Outcome of delivering one transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TxResult {
    /// 0 on success.
    pub code: u32,
    pub stage: Option<TxStage>,
    pub log: String,
    pub events: Vec<Event>,

    /// Handler outputs, one per message.
    pub data: Vec<Vec<u8>>,
}

impl TxResult {
    pub fn success(data: Vec<Vec<u8>>, events: Vec<Event>) -> Self {
        Self {
            code: 0,
            stage: None,
            log: String::new(),
            events,
            data,
        }
    }

    pub fn failure(stage: TxStage, log: impl Into<String>) -> Self {
        Self {
            code: stage.code(),
            stage: Some(stage),
            log: log.into(),
            events: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}
