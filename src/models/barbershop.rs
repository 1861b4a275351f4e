use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barbershop {
    pub id: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub image_url: String,
    pub phones: Vec<String>,
    pub owner_id: Option<String>,
}

impl Barbershop {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarbershopService {
    pub id: String,
    pub barbershop_id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price_in_cents: i64,
}

/// Id and name only, for owner pickers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarbershopSummary {
    pub id: String,
    pub name: String,
}
