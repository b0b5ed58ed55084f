use kartalla::simulation::SubscriptionChange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionDto {
    pub changed: bool,
    pub unsubscribe: Vec<String>,
    pub subscribe: Vec<String>,
}

impl SubscriptionDto {
    pub fn from(change: Option<SubscriptionChange>) -> Self {
        match change {
            Some(change) => Self {
                changed: true,
                unsubscribe: change.unsubscribe,
                subscribe: change.subscribe,
            },
            None => Self::default(),
        }
    }
}
