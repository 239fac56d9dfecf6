use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase, EntityKind};
use crate::collection::Patch;
use crate::error::ValidationErrors;
use crate::panel::{FormData, FormValidator, FromForm};
use crate::status::{BadgeStyle, Status, StatusFlow};

/// Default win probability for a new opportunity, in percent.
pub const DEFAULT_PROBABILITY: u8 = 10;

/// Pipeline stage of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStage {
    #[default]
    New,
    Qualified,
    Proposition,
    Won,
}

impl std::fmt::Display for OpportunityStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for OpportunityStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(OpportunityStage::New),
            "qualified" => Ok(OpportunityStage::Qualified),
            "proposition" | "proposal" => Ok(OpportunityStage::Proposition),
            "won" => Ok(OpportunityStage::Won),
            _ => Err(format!("Invalid opportunity stage: {}", s)),
        }
    }
}

impl Status for OpportunityStage {
    const ALL: &'static [Self] = &[
        OpportunityStage::New,
        OpportunityStage::Qualified,
        OpportunityStage::Proposition,
        OpportunityStage::Won,
    ];
    const FLOW: StatusFlow<Self> = StatusFlow::Cycle;

    fn badge(self) -> BadgeStyle {
        match self {
            OpportunityStage::New => BadgeStyle::Neutral,
            OpportunityStage::Qualified => BadgeStyle::Info,
            OpportunityStage::Proposition => BadgeStyle::Progress,
            OpportunityStage::Won => BadgeStyle::Success,
        }
    }

    fn label(self) -> &'static str {
        match self {
            OpportunityStage::New => "new",
            OpportunityStage::Qualified => "qualified",
            OpportunityStage::Proposition => "proposition",
            OpportunityStage::Won => "won",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(flatten)]
    pub base: EntityBase,
    pub name: String,
    pub customer: String,
    pub amount: f64,
    /// Win probability, 0-100.
    pub probability: u8,
    pub expected_close: Option<NaiveDate>,
    pub stage: OpportunityStage,
}

impl Opportunity {
    pub fn new(name: String, customer: String, amount: f64, sequence_number: u32) -> Self {
        Self {
            base: EntityBase::new(sequence_number),
            name,
            customer,
            amount,
            probability: DEFAULT_PROBABILITY,
            expected_close: None,
            stage: OpportunityStage::default(),
        }
    }

    /// Amount scaled by win probability.
    pub fn weighted_amount(&self) -> f64 {
        self.amount * f64::from(self.probability) / 100.0
    }
}

/// Update payload for an opportunity
#[derive(Debug, Clone, Default)]
pub struct OpportunityUpdate {
    pub name: Option<String>,
    pub customer: Option<String>,
    pub amount: Option<f64>,
    pub probability: Option<u8>,
    pub expected_close: Option<Option<NaiveDate>>,
    pub stage: Option<OpportunityStage>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Patch<Opportunity> for OpportunityUpdate {
    fn apply(self, opp: &mut Opportunity) {
        if let Some(name) = self.name {
            opp.name = name;
        }
        if let Some(customer) = self.customer {
            opp.customer = customer;
        }
        if let Some(amount) = self.amount {
            opp.amount = amount;
        }
        if let Some(probability) = self.probability {
            opp.probability = probability;
        }
        if let Some(expected_close) = self.expected_close {
            opp.expected_close = expected_close;
        }
        if let Some(stage) = self.stage {
            opp.stage = stage;
        }
        opp.base.apply_tag_changes(self.add_tags, &self.remove_tags);
    }
}

impl Entity for Opportunity {
    type Status = OpportunityStage;
    type Update = OpportunityUpdate;

    const KIND: EntityKind = EntityKind::Opportunity;
    const HAS_AMOUNT: bool = true;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> OpportunityStage {
        self.stage
    }

    fn set_status(&mut self, stage: OpportunityStage) {
        self.stage = stage;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.customer.as_str()]
    }

    fn amount(&self) -> Option<f64> {
        Some(self.amount)
    }
}

impl FromForm for Opportunity {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "customer",
        "amount",
        "probability",
        "expected_close",
        "stage",
        "tags",
        "remove_tags",
    ];

    fn from_form(form: &FormData, sequence_number: u32) -> Result<Self, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown_on_create(Self::FIELDS);
        let name = v.required("name");
        let customer = v.required("customer");
        let amount = v.money("amount");
        let probability = v.percent("probability");
        let expected_close = v.date("expected_close");
        let stage = v.status::<OpportunityStage>("stage");
        let tags = v.list("tags");
        v.finish()?;

        let mut opp = Opportunity::new(name, customer, amount, sequence_number);
        opp.probability = probability.unwrap_or(DEFAULT_PROBABILITY);
        opp.expected_close = expected_close;
        opp.stage = stage.unwrap_or_default();
        opp.base.tags = tags;
        Ok(opp)
    }

    fn update_from_form(form: &FormData) -> Result<OpportunityUpdate, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown(Self::FIELDS);
        let update = OpportunityUpdate {
            name: v.patch_required("name"),
            customer: v.patch_required("customer"),
            amount: v.patch_money("amount"),
            probability: v.percent("probability"),
            expected_close: v.patch_date("expected_close"),
            stage: v.status("stage"),
            add_tags: v.list("tags"),
            remove_tags: v.list("remove_tags"),
        };
        v.finish()?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_amount() {
        let mut opp = Opportunity::new("ERP rollout".into(), "Acme".into(), 50_000.0, 1);
        opp.probability = 40;
        assert_eq!(opp.weighted_amount(), 20_000.0);
    }

    #[test]
    fn test_from_form_defaults() {
        let form = FormData::new()
            .with("name", "ERP rollout")
            .with("customer", "Acme")
            .with("amount", "12,500");

        let opp = Opportunity::from_form(&form, 1).unwrap();

        assert_eq!(opp.amount, 12_500.0);
        assert_eq!(opp.probability, DEFAULT_PROBABILITY);
        assert_eq!(opp.stage, OpportunityStage::New);
    }

    #[test]
    fn test_from_form_rejects_bad_amount() {
        let form = FormData::new()
            .with("name", "ERP rollout")
            .with("customer", "Acme")
            .with("amount", "lots");

        let errors = Opportunity::from_form(&form, 1).unwrap_err();
        assert_eq!(errors.for_field("amount")[0].message, "must be a number");
    }

    #[test]
    fn test_stage_accepts_proposal_alias() {
        assert_eq!("Proposal".parse::<OpportunityStage>(), Ok(OpportunityStage::Proposition));
    }
}
