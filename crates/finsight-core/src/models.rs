//! Domain models for Finsight

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Household income structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    #[default]
    SingleIncome,
    DualIncome,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleIncome => "single_income",
            Self::DualIncome => "dual_income",
        }
    }
}

impl std::str::FromStr for IncomeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single_income" | "single" => Ok(Self::SingleIncome),
            "dual_income" | "dual" => Ok(Self::DualIncome),
            _ => Err(format!("Unknown income type: {}", s)),
        }
    }
}

impl std::fmt::Display for IncomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Self-reported social class bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SocialClass {
    Poor,
    LowerMiddle,
    #[default]
    Middle,
    UpperMiddle,
    Rich,
}

impl SocialClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::LowerMiddle => "lower_middle",
            Self::Middle => "middle",
            Self::UpperMiddle => "upper_middle",
            Self::Rich => "rich",
        }
    }
}

impl std::str::FromStr for SocialClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "poor" => Ok(Self::Poor),
            "lower_middle" => Ok(Self::LowerMiddle),
            "middle" => Ok(Self::Middle),
            "upper_middle" => Ok(Self::UpperMiddle),
            "rich" => Ok(Self::Rich),
            _ => Err(format!("Unknown social class: {}", s)),
        }
    }
}

impl std::fmt::Display for SocialClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A yes/no answer as entered on the profile form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl std::str::FromStr for YesNo {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Self::Yes),
            "no" | "n" | "false" => Ok(Self::No),
            _ => Err(format!("Expected yes or no, got: {}", s)),
        }
    }
}

impl std::fmt::Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Primary financial goal picked on the profile form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserGoal {
    #[serde(rename = "Build emergency fund")]
    BuildEmergencyFund,
    #[serde(rename = "Retirement savings")]
    RetirementSavings,
    #[serde(rename = "Pay off debt")]
    PayOffDebt,
    #[serde(rename = "Buy a new car")]
    BuyNewCar,
    #[serde(rename = "Upgrade to a bigger house")]
    UpgradeHouse,
    #[serde(rename = "Plan a family vacation")]
    FamilyVacation,
    #[serde(rename = "Start an education fund")]
    EducationFund,
    #[serde(rename = "Save for kids' college")]
    KidsCollege,
    #[serde(rename = "Invest in stock market")]
    StockMarket,
    #[serde(rename = "Open a PPF account")]
    PpfAccount,
    #[serde(rename = "Increase term insurance")]
    TermInsurance,
    #[serde(rename = "Down payment for a house")]
    HouseDownPayment,
    #[serde(rename = "Start a small business")]
    SmallBusiness,
    #[serde(rename = "Build wealth for kids")]
    WealthForKids,
    #[serde(rename = "Fund children's marriage")]
    ChildrensMarriage,
    #[serde(rename = "Pay medical bills")]
    MedicalBills,
    #[serde(rename = "Renovate home")]
    RenovateHome,
    #[serde(rename = "Build passive income")]
    PassiveIncome,
    #[serde(rename = "Travel abroad next year")]
    TravelAbroad,
    #[serde(rename = "Repay credit card dues")]
    CreditCardDues,
}

impl UserGoal {
    pub const ALL: [UserGoal; 20] = [
        Self::BuildEmergencyFund,
        Self::RetirementSavings,
        Self::PayOffDebt,
        Self::BuyNewCar,
        Self::UpgradeHouse,
        Self::FamilyVacation,
        Self::EducationFund,
        Self::KidsCollege,
        Self::StockMarket,
        Self::PpfAccount,
        Self::TermInsurance,
        Self::HouseDownPayment,
        Self::SmallBusiness,
        Self::WealthForKids,
        Self::ChildrensMarriage,
        Self::MedicalBills,
        Self::RenovateHome,
        Self::PassiveIncome,
        Self::TravelAbroad,
        Self::CreditCardDues,
    ];

    /// The label shown on the form and stored in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuildEmergencyFund => "Build emergency fund",
            Self::RetirementSavings => "Retirement savings",
            Self::PayOffDebt => "Pay off debt",
            Self::BuyNewCar => "Buy a new car",
            Self::UpgradeHouse => "Upgrade to a bigger house",
            Self::FamilyVacation => "Plan a family vacation",
            Self::EducationFund => "Start an education fund",
            Self::KidsCollege => "Save for kids' college",
            Self::StockMarket => "Invest in stock market",
            Self::PpfAccount => "Open a PPF account",
            Self::TermInsurance => "Increase term insurance",
            Self::HouseDownPayment => "Down payment for a house",
            Self::SmallBusiness => "Start a small business",
            Self::WealthForKids => "Build wealth for kids",
            Self::ChildrensMarriage => "Fund children's marriage",
            Self::MedicalBills => "Pay medical bills",
            Self::RenovateHome => "Renovate home",
            Self::PassiveIncome => "Build passive income",
            Self::TravelAbroad => "Travel abroad next year",
            Self::CreditCardDues => "Repay credit card dues",
        }
    }
}

impl std::str::FromStr for UserGoal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|goal| goal.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown goal: {}", s))
    }
}

impl std::fmt::Display for UserGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Names of the monthly expense categories, in form order
pub const EXPENSE_CATEGORIES: [&str; 9] = [
    "rent_mortgage",
    "utilities",
    "insurance",
    "transportation",
    "groceries",
    "clothes",
    "phone",
    "subscriptions",
    "miscellaneous",
];

/// A household's financial snapshot as submitted from the profile form
///
/// Every field has a default, so partial documents deserialize cleanly:
/// amounts default to 0 and categorical answers to the form's defaults.
/// Keys the engine does not know (timestamps, user id) are kept in `extra`
/// so a stored document reloads unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFinancialProfile {
    pub household_size: u32,
    pub number_of_kids: u32,
    pub age: u32,
    pub income_type: IncomeType,
    #[serde(rename = "class", alias = "social_class")]
    pub social_class: SocialClass,
    pub owns_home: YesNo,

    pub gross_monthly_income: f64,
    pub net_monthly_income: f64,

    pub assets_total: f64,
    pub investments_total: f64,
    /// Savings balance; treated as an annual stock by the ratios
    pub savings_total: f64,
    pub emergency_fund: f64,
    pub debts_total: f64,
    pub total_net_worth: f64,

    pub rent_mortgage: f64,
    pub utilities: f64,
    pub insurance: f64,
    pub transportation: f64,
    pub groceries: f64,
    pub clothes: f64,
    pub phone: f64,
    pub subscriptions: f64,
    pub miscellaneous: f64,
    pub fixed_costs_total: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_goals: Option<UserGoal>,
    pub financial_stress: YesNo,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for UserFinancialProfile {
    fn default() -> Self {
        Self {
            household_size: 1,
            number_of_kids: 0,
            age: 30,
            income_type: IncomeType::default(),
            social_class: SocialClass::default(),
            owns_home: YesNo::No,
            gross_monthly_income: 0.0,
            net_monthly_income: 0.0,
            assets_total: 0.0,
            investments_total: 0.0,
            savings_total: 0.0,
            emergency_fund: 0.0,
            debts_total: 0.0,
            total_net_worth: 0.0,
            rent_mortgage: 0.0,
            utilities: 0.0,
            insurance: 0.0,
            transportation: 0.0,
            groceries: 0.0,
            clothes: 0.0,
            phone: 0.0,
            subscriptions: 0.0,
            miscellaneous: 0.0,
            fixed_costs_total: 0.0,
            user_goals: None,
            financial_stress: YesNo::No,
            extra: BTreeMap::new(),
        }
    }
}

impl UserFinancialProfile {
    /// The demo household offered by the profile form
    pub fn sample() -> Self {
        Self {
            household_size: 4,
            number_of_kids: 2,
            age: 35,
            income_type: IncomeType::DualIncome,
            social_class: SocialClass::Middle,
            owns_home: YesNo::Yes,
            gross_monthly_income: 80_000.0,
            net_monthly_income: 65_000.0,
            assets_total: 2_500_000.0,
            investments_total: 400_000.0,
            savings_total: 150_000.0,
            emergency_fund: 200_000.0,
            debts_total: 800_000.0,
            total_net_worth: 2_250_000.0,
            rent_mortgage: 20_000.0,
            utilities: 3_000.0,
            insurance: 4_000.0,
            transportation: 8_000.0,
            groceries: 12_000.0,
            clothes: 3_000.0,
            phone: 2_000.0,
            subscriptions: 1_500.0,
            miscellaneous: 5_000.0,
            fixed_costs_total: 58_500.0,
            user_goals: Some(UserGoal::RetirementSavings),
            financial_stress: YesNo::No,
            extra: BTreeMap::new(),
        }
    }

    /// Monthly expense categories paired with their names
    pub fn expense_categories(&self) -> [(&'static str, f64); 9] {
        [
            (EXPENSE_CATEGORIES[0], self.rent_mortgage),
            (EXPENSE_CATEGORIES[1], self.utilities),
            (EXPENSE_CATEGORIES[2], self.insurance),
            (EXPENSE_CATEGORIES[3], self.transportation),
            (EXPENSE_CATEGORIES[4], self.groceries),
            (EXPENSE_CATEGORIES[5], self.clothes),
            (EXPENSE_CATEGORIES[6], self.phone),
            (EXPENSE_CATEGORIES[7], self.subscriptions),
            (EXPENSE_CATEGORIES[8], self.miscellaneous),
        ]
    }

    pub fn expense_categories_total(&self) -> f64 {
        self.expense_categories().iter().map(|(_, v)| v).sum()
    }

    pub fn computed_net_worth(&self) -> f64 {
        self.assets_total + self.investments_total + self.savings_total - self.debts_total
    }

    /// Net income left after fixed costs
    pub fn monthly_surplus(&self) -> f64 {
        self.net_monthly_income - self.fixed_costs_total
    }

    /// Re-derive the totals from their parts.
    ///
    /// `fixed_costs_total` is only replaced when at least one category is
    /// filled in, so callers that only know the total keep it.
    pub fn normalized(mut self) -> Self {
        let categories = self.expense_categories_total();
        if categories > 0.0 {
            self.fixed_costs_total = categories;
        }
        self.total_net_worth = self.computed_net_worth();
        self
    }

    /// Check that every amount is a finite, non-negative number
    pub fn validate(&self) -> Result<()> {
        if self.household_size == 0 {
            return Err(Error::InvalidData(
                "household_size must be at least 1".to_string(),
            ));
        }

        let amounts = [
            ("gross_monthly_income", self.gross_monthly_income),
            ("net_monthly_income", self.net_monthly_income),
            ("assets_total", self.assets_total),
            ("investments_total", self.investments_total),
            ("savings_total", self.savings_total),
            ("emergency_fund", self.emergency_fund),
            ("debts_total", self.debts_total),
            ("fixed_costs_total", self.fixed_costs_total),
        ];

        for (name, value) in amounts.into_iter().chain(self.expense_categories()) {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidData(format!(
                    "{} must be a non-negative amount, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Risk factors
// ============================================================================

/// The five independent risk categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Debt Risk")]
    Debt,
    #[serde(rename = "Emergency Fund")]
    EmergencyFund,
    #[serde(rename = "Investment Risk")]
    Investment,
    #[serde(rename = "Insurance Coverage")]
    Insurance,
    #[serde(rename = "Expense Management")]
    ExpenseManagement,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        Self::Debt,
        Self::EmergencyFund,
        Self::Investment,
        Self::Insurance,
        Self::ExpenseManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debt => "Debt Risk",
            Self::EmergencyFund => "Emergency Fund",
            Self::Investment => "Investment Risk",
            Self::Insurance => "Insurance Coverage",
            Self::ExpenseManagement => "Expense Management",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category risk scores, each in [0, 10]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorSet {
    #[serde(rename = "Debt Risk")]
    pub debt: f64,
    #[serde(rename = "Emergency Fund")]
    pub emergency_fund: f64,
    #[serde(rename = "Investment Risk")]
    pub investment: f64,
    #[serde(rename = "Insurance Coverage")]
    pub insurance: f64,
    #[serde(rename = "Expense Management")]
    pub expense_management: f64,
}

impl RiskFactorSet {
    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Debt => self.debt,
            RiskCategory::EmergencyFund => self.emergency_fund,
            RiskCategory::Investment => self.investment,
            RiskCategory::Insurance => self.insurance,
            RiskCategory::ExpenseManagement => self.expense_management,
        }
    }

    /// All five scores in fixed category order
    pub fn entries(&self) -> [(RiskCategory, f64); 5] {
        RiskCategory::ALL.map(|category| (category, self.get(category)))
    }
}

/// Tri-level bucketing used for risk display and suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskSeverity {
    High,
    Medium,
    Low,
}

impl RiskSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Display colour used by the dashboard
    pub fn color(&self) -> &'static str {
        match self {
            Self::High => "red",
            Self::Medium => "yellow",
            Self::Low => "green",
        }
    }
}

impl std::fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Health score
// ============================================================================

/// Label for an overall health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Predictions
// ============================================================================

/// Forecast horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "1_year")]
    OneYear,
    #[serde(rename = "3_year")]
    ThreeYears,
    #[serde(rename = "10_year")]
    TenYears,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Self::OneYear, Self::ThreeYears, Self::TenYears];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneYear => "1_year",
            Self::ThreeYears => "3_year",
            Self::TenYears => "10_year",
        }
    }

    pub fn years(&self) -> u32 {
        match self {
            Self::OneYear => 1,
            Self::ThreeYears => 3,
            Self::TenYears => 10,
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status label attached to a horizon projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionStatus {
    Excellent,
    Good,
    Moderate,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl ProjectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::HighRisk => "High Risk",
        }
    }
}

impl std::fmt::Display for ProjectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forecast for a single horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonProjection {
    pub savings_growth: f64,
    pub investment_returns: f64,
    /// Risk on a 0-10 scale
    pub risk_score: f64,
    pub health_status: ProjectionStatus,
}

/// Forecasts keyed by horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    #[serde(rename = "1_year")]
    pub one_year: HorizonProjection,
    #[serde(rename = "3_year")]
    pub three_years: HorizonProjection,
    #[serde(rename = "10_year")]
    pub ten_years: HorizonProjection,
}

impl PredictionSet {
    pub fn get(&self, horizon: Horizon) -> &HorizonProjection {
        match horizon {
            Horizon::OneYear => &self.one_year,
            Horizon::ThreeYears => &self.three_years,
            Horizon::TenYears => &self.ten_years,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Horizon, &HorizonProjection)> {
        Horizon::ALL.into_iter().map(move |h| (h, self.get(h)))
    }
}

/// Where a set of baseline predictions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// Trained forests
    Model,
    /// Predictor untrained or degraded
    NeutralDefault,
}

/// The four scalar outputs of the trained predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselinePredictions {
    pub expense_prediction: f64,
    pub investment_potential: f64,
    /// Probability of the financially stressed class, in [0, 1]
    pub risk_probability: f64,
    pub insurance_need: f64,
    pub source: PredictionSource,
}

impl BaselinePredictions {
    pub const NEUTRAL_RISK_PROBABILITY: f64 = 0.5;

    /// Values used whenever no trained model is available
    pub fn neutral() -> Self {
        Self {
            expense_prediction: 0.0,
            investment_potential: 0.0,
            risk_probability: Self::NEUTRAL_RISK_PROBABILITY,
            insurance_need: 0.0,
            source: PredictionSource::NeutralDefault,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.source == PredictionSource::NeutralDefault
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_form_defaults() {
        let profile: UserFinancialProfile =
            serde_json::from_str(r#"{"net_monthly_income": 5000}"#).unwrap();

        assert_eq!(profile.household_size, 1);
        assert_eq!(profile.age, 30);
        assert_eq!(profile.income_type, IncomeType::SingleIncome);
        assert_eq!(profile.social_class, SocialClass::Middle);
        assert_eq!(profile.owns_home, YesNo::No);
        assert_eq!(profile.financial_stress, YesNo::No);
        assert_eq!(profile.net_monthly_income, 5000.0);
        assert_eq!(profile.debts_total, 0.0);
        assert!(profile.user_goals.is_none());
        assert!(profile.extra.is_empty());
    }

    #[test]
    fn test_class_key_and_alias() {
        let stored: UserFinancialProfile = serde_json::from_str(r#"{"class": "rich"}"#).unwrap();
        assert_eq!(stored.social_class, SocialClass::Rich);

        let aliased: UserFinancialProfile =
            serde_json::from_str(r#"{"social_class": "upper_middle"}"#).unwrap();
        assert_eq!(aliased.social_class, SocialClass::UpperMiddle);

        let json = serde_json::to_value(&aliased).unwrap();
        assert_eq!(json["class"], "upper_middle");
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let raw = r#"{
            "net_monthly_income": 65000,
            "user_goals": "Pay off debt",
            "last_updated": "2024-03-01T10:00:00Z",
            "user_id": "u-42"
        }"#;
        let profile: UserFinancialProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.user_goals, Some(UserGoal::PayOffDebt));
        assert_eq!(profile.extra["user_id"], "u-42");

        let reloaded: UserFinancialProfile =
            serde_json::from_str(&serde_json::to_string(&profile).unwrap()).unwrap();
        assert_eq!(reloaded, profile);
    }

    #[test]
    fn test_sample_totals_are_consistent() {
        let sample = UserFinancialProfile::sample();
        assert_eq!(sample.expense_categories_total(), sample.fixed_costs_total);
        assert_eq!(sample.computed_net_worth(), sample.total_net_worth);
        assert_eq!(sample.clone().normalized(), sample);
    }

    #[test]
    fn test_normalized_keeps_total_without_categories() {
        let profile = UserFinancialProfile {
            fixed_costs_total: 1200.0,
            assets_total: 100.0,
            debts_total: 300.0,
            ..Default::default()
        }
        .normalized();

        assert_eq!(profile.fixed_costs_total, 1200.0);
        assert_eq!(profile.total_net_worth, -200.0);
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        let profile = UserFinancialProfile {
            debts_total: -1.0,
            ..Default::default()
        };
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("debts_total"));

        let nan = UserFinancialProfile {
            groceries: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        assert!(UserFinancialProfile::sample().validate().is_ok());
    }

    #[test]
    fn test_goal_labels_parse() {
        for goal in UserGoal::ALL {
            assert_eq!(goal.as_str().parse::<UserGoal>().unwrap(), goal);
            let json = serde_json::to_string(&goal).unwrap();
            assert_eq!(json, format!("\"{}\"", goal.as_str()));
        }
        assert!("Buy a yacht".parse::<UserGoal>().is_err());
    }

    #[test]
    fn test_risk_factor_set_keys() {
        let set = RiskFactorSet {
            debt: 1.0,
            emergency_fund: 2.0,
            investment: 3.0,
            insurance: 4.0,
            expense_management: 5.0,
        };
        let json = serde_json::to_value(set).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        for category in RiskCategory::ALL {
            assert!(json.get(category.as_str()).is_some());
        }
        assert_eq!(set.entries()[4], (RiskCategory::ExpenseManagement, 5.0));
    }

    #[test]
    fn test_prediction_set_horizon_keys() {
        let projection = HorizonProjection {
            savings_growth: 1.0,
            investment_returns: 2.0,
            risk_score: 5.0,
            health_status: ProjectionStatus::HighRisk,
        };
        let set = PredictionSet {
            one_year: projection,
            three_years: projection,
            ten_years: projection,
        };
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json["1_year"]["health_status"], "High Risk");
        assert!(json.get("3_year").is_some());
        assert!(json.get("10_year").is_some());
        assert_eq!(set.iter().count(), 3);
    }
}
