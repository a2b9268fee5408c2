//! Advisor context
//!
//! Collects what an external language-model advisor needs to answer
//! questions about a user's finances: profile highlights, the health score,
//! the risk picture and the projections. Prompt wording stays with the
//! advisor; this module only supplies data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::FinancialReport;
use crate::models::{HealthStatus, PredictionSet, RiskSeverity, UserFinancialProfile};
use crate::risk::AssessedRisk;
use crate::store::USER_ID_KEY;

/// Rough subject of a user question, used to pick supporting data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionTopic {
    Vacation,
    EmergencyFund,
    HomePurchase,
    Retirement,
    General,
}

impl QuestionTopic {
    /// Keyword match, first topic wins
    pub fn classify(question: &str) -> Self {
        let q = question.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| q.contains(w));

        if has(&["vacation", "trip", "travel"]) {
            Self::Vacation
        } else if has(&["emergency", "fund"]) {
            Self::EmergencyFund
        } else if has(&["house", "property"]) {
            Self::HomePurchase
        } else if has(&["retirement", "pension"]) {
            Self::Retirement
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vacation => "vacation",
            Self::EmergencyFund => "emergency_fund",
            Self::HomePurchase => "home_purchase",
            Self::Retirement => "retirement",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for QuestionTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The profile fields an advisor cares about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileHighlights {
    pub age: u32,
    pub household_size: u32,
    pub number_of_kids: u32,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_surplus: f64,
    pub savings: f64,
    pub investments: f64,
    pub debts: f64,
    pub net_worth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl ProfileHighlights {
    pub fn from_profile(profile: &UserFinancialProfile) -> Self {
        Self {
            age: profile.age,
            household_size: profile.household_size,
            number_of_kids: profile.number_of_kids,
            monthly_income: profile.net_monthly_income,
            monthly_expenses: profile.fixed_costs_total,
            monthly_surplus: profile.monthly_surplus(),
            savings: profile.savings_total,
            investments: profile.investments_total,
            debts: profile.debts_total,
            net_worth: profile.computed_net_worth(),
            goal: profile.user_goals.map(|g| g.as_str().to_string()),
        }
    }
}

/// Structured context handed to the advisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub profile: ProfileHighlights,
    pub health_score: f64,
    pub health_status: HealthStatus,
    pub risks: Vec<AssessedRisk>,
    pub action_items: Vec<String>,
    pub predictions: PredictionSet,
    /// False when projections rest on neutral defaults
    pub model_backed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<QuestionTopic>,
}

impl AdvisorContext {
    pub fn assemble(profile: &UserFinancialProfile, report: &FinancialReport) -> Self {
        Self {
            user_id: profile
                .extra
                .get(USER_ID_KEY)
                .and_then(|v| v.as_str())
                .map(String::from),
            profile: ProfileHighlights::from_profile(profile),
            health_score: report.health_score,
            health_status: report.health_status,
            risks: report.risks.clone(),
            action_items: report
                .action_items
                .iter()
                .map(|item| item.message().to_string())
                .collect(),
            predictions: report.predictions,
            model_backed: !report.baseline.is_neutral(),
            topic: None,
        }
    }

    /// Attach the topic of the question being asked
    pub fn for_question(mut self, question: &str) -> Self {
        self.topic = Some(QuestionTopic::classify(question));
        self
    }

    /// High severity risks only
    pub fn high_risks(&self) -> impl Iterator<Item = &AssessedRisk> {
        self.risks
            .iter()
            .filter(|r| r.severity == RiskSeverity::High)
    }

    /// Convert context to template variables for the advisor's prompts
    pub fn to_template_vars(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        let p = &self.profile;

        vars.insert("age", p.age.to_string());
        vars.insert("household_size", p.household_size.to_string());
        vars.insert("monthly_income", format!("{:.2}", p.monthly_income));
        vars.insert("monthly_expenses", format!("{:.2}", p.monthly_expenses));
        vars.insert("monthly_surplus", format!("{:.2}", p.monthly_surplus));
        vars.insert("savings", format!("{:.2}", p.savings));
        vars.insert("investments", format!("{:.2}", p.investments));
        vars.insert("net_worth", format!("{:.2}", p.net_worth));
        vars.insert(
            "goal",
            p.goal.clone().unwrap_or_else(|| "Not specified".to_string()),
        );

        vars.insert("health_score", format!("{:.1}", self.health_score));
        vars.insert("health_status", self.health_status.to_string());

        let risks = self
            .risks
            .iter()
            .map(|r| format!("{}: {:.1} ({})", r.category, r.score, r.severity))
            .collect::<Vec<_>>()
            .join(", ");
        vars.insert("risks", risks);

        if !self.action_items.is_empty() {
            vars.insert("action_items", self.action_items.join("\n"));
        }

        let projections = self
            .predictions
            .iter()
            .map(|(horizon, p)| {
                format!(
                    "{}: savings {:.0}, returns {:.0}, {}",
                    horizon, p.savings_growth, p.investment_returns, p.health_status
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        vars.insert("projections", projections);

        if let Some(topic) = self.topic {
            vars.insert("topic", topic.to_string());
        }

        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BaselinePredictions;
    use crate::store::stamp;
    use chrono::Utc;

    fn context() -> AdvisorContext {
        let profile = stamp("u42", UserFinancialProfile::sample(), Utc::now());
        let report = FinancialReport::build(&profile, BaselinePredictions::neutral());
        AdvisorContext::assemble(&profile, &report)
    }

    #[test]
    fn test_assemble() {
        let ctx = context();

        assert_eq!(ctx.user_id.as_deref(), Some("u42"));
        assert_eq!(ctx.profile.monthly_surplus, 6_500.0);
        assert_eq!(ctx.profile.net_worth, 2_250_000.0);
        assert_eq!(ctx.profile.goal.as_deref(), Some("Retirement savings"));
        assert_eq!(ctx.risks.len(), 5);
        assert!(!ctx.model_backed);
        assert!(ctx.topic.is_none());
    }

    #[test]
    fn test_template_vars() {
        let vars = context().for_question("Can I afford a trip to Japan?").to_template_vars();

        assert_eq!(vars.get("monthly_income"), Some(&"65000.00".to_string()));
        assert_eq!(vars.get("health_status"), Some(&"Good".to_string()));
        assert_eq!(vars.get("topic"), Some(&"vacation".to_string()));
        assert!(vars["risks"].starts_with("Debt Risk:"));
        assert_eq!(vars["projections"].lines().count(), 3);
    }

    #[test]
    fn test_question_topics() {
        assert_eq!(QuestionTopic::classify("Emergency savings?"), QuestionTopic::EmergencyFund);
        assert_eq!(QuestionTopic::classify("Should I buy a HOUSE"), QuestionTopic::HomePurchase);
        assert_eq!(QuestionTopic::classify("pension plans"), QuestionTopic::Retirement);
        assert_eq!(QuestionTopic::classify("what is a SIP"), QuestionTopic::General);
    }
}
