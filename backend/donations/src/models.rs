//! Donation entity, its lifecycle status, and the inbound request schema.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::distance::DistanceEstimator;
use crate::errors::{Result, ServiceError};

pub const DEFAULT_DONOR: &str = "Web Form User";
pub const DEFAULT_ITEM_NAME: &str = "New Food Donation";
pub const DEFAULT_READY_TIME: &str = "ASAP";

const MISSING_DATA: &str = "Missing required data";

/// Lifecycle status of a donation.
///
/// ```text
/// pending ──► claimed ──► delivered
/// ```
///
/// Only `pending → claimed` is reachable through the API. `delivered` is a
/// legal stored value and is reported as-is when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Claimed,
    Delivered,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A donation row as stored in / read from the database.
///
/// Field and column names are the wire names the dashboard consumes, so the
/// mixed `donor_phone` / `donorAddress` casing is intentional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donation {
    pub id: i64,
    pub name: String,
    pub donor: Option<String>,
    pub donor_phone: Option<String>,
    #[serde(rename = "donorAddress")]
    #[sqlx(rename = "donorAddress")]
    pub donor_address: Option<String>,
    #[serde(rename = "receiverAddress")]
    #[sqlx(rename = "receiverAddress")]
    pub receiver_address: Option<String>,
    #[serde(rename = "receiverPhone")]
    #[sqlx(rename = "receiverPhone")]
    pub receiver_phone: Option<String>,
    pub servings: Option<String>,
    pub distance: Option<String>,
    #[serde(rename = "readyTime")]
    #[sqlx(rename = "readyTime")]
    pub ready_time: Option<String>,
    pub status: DonationStatus,
    pub icon: Option<String>,
    #[serde(rename = "foodType")]
    #[sqlx(rename = "foodType")]
    pub food_type: Option<String>,
}

/// Column values for a donation that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub name: String,
    pub donor: String,
    pub donor_phone: Option<String>,
    pub donor_address: Option<String>,
    pub receiver_address: Option<String>,
    pub receiver_phone: Option<String>,
    pub food_type: Option<String>,
    pub servings: String,
    pub distance: String,
    pub ready_time: String,
}

/// Body of `POST /api/donations` as submitted by the donor form.
///
/// JSON `null` is treated the same as an absent key. Build it from a JSON
/// object with `try_from`; other JSON shapes are not a valid submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDonationRequest {
    pub quantity: Option<Value>,
    pub donorname: Option<String>,
    pub itemname: Option<String>,
    #[serde(rename = "donorPhone")]
    pub donor_phone: Option<String>,
    #[serde(rename = "donorAddress")]
    pub donor_address: Option<String>,
    #[serde(rename = "receiverAddress")]
    pub receiver_address: Option<String>,
    #[serde(rename = "receiverPhone")]
    pub receiver_phone: Option<String>,
    #[serde(rename = "foodType")]
    pub food_type: Option<String>,
    #[serde(rename = "pickupTime")]
    pub pickup_time: Option<String>,
}

impl TryFrom<Map<String, Value>> for CreateDonationRequest {
    type Error = ServiceError;

    fn try_from(body: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(body))
            .map_err(|_| ServiceError::Validation(MISSING_DATA.to_string()))
    }
}

impl CreateDonationRequest {
    /// Validate the request and map it onto entity columns, applying the
    /// form defaults. The distance is estimated only once validation passed.
    pub fn into_new_donation(self, estimator: &dyn DistanceEstimator) -> Result<NewDonation> {
        let quantity = self
            .quantity
            .filter(|q| !q.is_object() && !q.is_array())
            .ok_or_else(|| ServiceError::Validation(MISSING_DATA.to_string()))?;
        let distance = estimator.estimate(self.donor_address.as_deref());

        Ok(NewDonation {
            name: self
                .itemname
                .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string()),
            donor: self.donorname.unwrap_or_else(|| DEFAULT_DONOR.to_string()),
            donor_phone: self.donor_phone,
            donor_address: self.donor_address,
            receiver_address: self.receiver_address,
            receiver_phone: self.receiver_phone,
            food_type: self.food_type,
            servings: format!("{} Servings", render_quantity(&quantity)),
            distance,
            ready_time: self
                .pickup_time
                .unwrap_or_else(|| DEFAULT_READY_TIME.to_string()),
        })
    }
}

/// Render a quantity the way a person typed it: strings verbatim, numbers
/// in their JSON form.
fn render_quantity(quantity: &Value) -> String {
    match quantity {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
