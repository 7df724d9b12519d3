//! Common types used across the application

use crate::core::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Diameter given to newly added stumps, in inches
const DEFAULT_DIAMETER: f64 = 18.0;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// One grinding unit within a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stump {
    pub id: String,
    /// Diameter in inches
    pub diameter: f64,
    /// Free-text label, display only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_description: Option<String>,
    /// Linear feet of exposed root to chase
    pub root_chasing_ft: f64,
    pub haul_away: bool,
    /// Grind 8" deep instead of 6"
    pub deep_grind: bool,
    /// Site access narrower than the machine
    pub access_issue: bool,
}

impl Stump {
    pub fn new(location: Option<String>) -> Self {
        Self {
            id: new_id(),
            diameter: DEFAULT_DIAMETER,
            location_description: location,
            root_chasing_ft: 0.0,
            haul_away: false,
            deep_grind: false,
            access_issue: false,
        }
    }

    /// Apply every field set in `update`. An empty location clears it.
    pub fn apply(&mut self, update: &StumpUpdate) {
        if let Some(diameter) = update.diameter {
            self.diameter = diameter;
        }
        if let Some(location) = &update.location_description {
            self.location_description = if location.trim().is_empty() {
                None
            } else {
                Some(location.clone())
            };
        }
        if let Some(feet) = update.root_chasing_ft {
            self.root_chasing_ft = feet;
        }
        if let Some(haul_away) = update.haul_away {
            self.haul_away = haul_away;
        }
        if let Some(deep_grind) = update.deep_grind {
            self.deep_grind = deep_grind;
        }
        if let Some(access_issue) = update.access_issue {
            self.access_issue = access_issue;
        }
    }
}

impl Default for Stump {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Field-level edit of a stump; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StumpUpdate {
    pub diameter: Option<f64>,
    pub location_description: Option<String>,
    pub root_chasing_ft: Option<f64>,
    pub haul_away: Option<bool>,
    pub deep_grind: Option<bool>,
    pub access_issue: Option<bool>,
}

impl StumpUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Lifecycle status of a job. Does not affect pricing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    #[default]
    Draft,
    Sent,
    Completed,
    Archived,
}

impl std::str::FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "SENT" => Ok(Self::Sent),
            "COMPLETED" => Ok(Self::Completed),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(Error::Serialization(format!("unknown job status: {}", other))),
        }
    }
}

/// A client engagement: ordered stumps plus job-level fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub id: String,
    pub client_name: String,
    pub address: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Order matters: only the first stump is priced without the volume discount
    pub stumps: Vec<Stump>,
    /// Flat amount added to the subtotal
    pub access_fee: f64,
}

impl Job {
    /// A fresh draft job holding one default stump
    pub fn new() -> Self {
        Self {
            id: new_id(),
            client_name: String::new(),
            address: String::new(),
            status: JobStatus::Draft,
            created_at: Utc::now(),
            stumps: vec![Stump::new(Some("Front yard".to_string()))],
            access_fee: 0.0,
        }
    }

    /// Append a default stump labelled by its position
    pub fn add_stump(&mut self) -> &Stump {
        let label = format!("Stump {}", self.stumps.len() + 1);
        self.stumps.push(Stump::new(Some(label)));
        &self.stumps[self.stumps.len() - 1]
    }

    pub fn update_stump(&mut self, id: &str, update: &StumpUpdate) -> Result<()> {
        let stump = self
            .stumps
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::StumpNotFound(id.to_string()))?;
        stump.apply(update);
        Ok(())
    }

    /// Remove a stump by id, refusing to remove the last one
    pub fn remove_stump(&mut self, id: &str) -> Result<Stump> {
        let index = self
            .stumps
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::StumpNotFound(id.to_string()))?;

        if self.stumps.len() <= 1 {
            return Err(Error::LastStump);
        }

        Ok(self.stumps.remove(index))
    }

    /// Id of the stump at a 1-based position
    pub fn stump_id_at(&self, position: usize) -> Result<String> {
        position
            .checked_sub(1)
            .and_then(|i| self.stumps.get(i))
            .map(|s| s.id.clone())
            .ok_or_else(|| Error::StumpNotFound(format!("#{}", position)))
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a quote calculation (not persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    /// Job subtotal after the call-out floor
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    /// Line price per stump id, before the call-out floor
    pub stump_prices: HashMap<String, f64>,
    /// Estimated chip weight across haul-away stumps, in tonnes
    pub haul_weight_tonnes: f64,
}

impl QuoteResult {
    /// Sum of the per-stump line prices. Can be below `subtotal` when the
    /// call-out floor applied.
    pub fn line_item_sum(&self) -> f64 {
        self.stump_prices.values().sum()
    }

    /// Chip estimate in kilograms, `None` when nothing is hauled
    pub fn chip_estimate_kg(&self) -> Option<f64> {
        if self.haul_weight_tonnes > 0.0 {
            Some(self.haul_weight_tonnes * 1000.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_has_one_default_stump() {
        let job = Job::new();
        assert_eq!(job.status, JobStatus::Draft);
        assert_eq!(job.stumps.len(), 1);

        let stump = &job.stumps[0];
        assert_eq!(stump.diameter, 18.0);
        assert_eq!(stump.location_description.as_deref(), Some("Front yard"));
        assert!(!stump.haul_away && !stump.deep_grind && !stump.access_issue);
    }

    #[test]
    fn test_add_stump_labels_by_position() {
        let mut job = Job::new();
        let id = job.add_stump().id.clone();

        assert_eq!(job.stumps.len(), 2);
        assert_eq!(job.stumps[1].id, id);
        assert_eq!(job.stumps[1].location_description.as_deref(), Some("Stump 2"));
        assert_ne!(job.stumps[0].id, job.stumps[1].id);
    }

    #[test]
    fn test_update_stump_in_place() {
        let mut job = Job::new();
        let id = job.stumps[0].id.clone();

        let update = StumpUpdate {
            diameter: Some(24.0),
            deep_grind: Some(true),
            location_description: Some(" ".to_string()),
            ..Default::default()
        };
        job.update_stump(&id, &update).unwrap();

        let stump = &job.stumps[0];
        assert_eq!(stump.diameter, 24.0);
        assert!(stump.deep_grind);
        assert!(!stump.haul_away);
        assert_eq!(stump.location_description, None);
    }

    #[test]
    fn test_update_unknown_stump() {
        let mut job = Job::new();
        let result = job.update_stump("missing", &StumpUpdate::default());
        assert!(matches!(result, Err(Error::StumpNotFound(_))));
    }

    #[test]
    fn test_remove_refuses_last_stump() {
        let mut job = Job::new();
        let first = job.stumps[0].id.clone();
        assert!(matches!(job.remove_stump(&first), Err(Error::LastStump)));

        let second = job.add_stump().id.clone();
        let removed = job.remove_stump(&first).unwrap();
        assert_eq!(removed.id, first);
        assert_eq!(job.stumps.len(), 1);
        assert_eq!(job.stumps[0].id, second);
    }

    #[test]
    fn test_stump_id_at_is_one_based() {
        let mut job = Job::new();
        job.add_stump();
        assert_eq!(job.stump_id_at(2).unwrap(), job.stumps[1].id);
        assert!(job.stump_id_at(0).is_err());
        assert!(job.stump_id_at(3).is_err());
    }

    #[test]
    fn test_job_json_shape() {
        let job = Job::new();
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["status"], "DRAFT");
        assert_eq!(value["accessFee"], 0.0);
        assert_eq!(value["stumps"][0]["rootChasingFt"], 0.0);
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("sent".parse::<JobStatus>().unwrap(), JobStatus::Sent);
        assert!("paid".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_chip_estimate_only_when_hauling() {
        let mut quote = QuoteResult {
            subtotal: 0.0,
            tax_amount: 0.0,
            total: 0.0,
            stump_prices: HashMap::new(),
            haul_weight_tonnes: 0.0,
        };
        assert_eq!(quote.chip_estimate_kg(), None);

        quote.haul_weight_tonnes = 0.5;
        assert_eq!(quote.chip_estimate_kg(), Some(500.0));
    }
}
