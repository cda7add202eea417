use market_core::GameError;
use serde::{Deserialize, Serialize};

/// Qualitative polarity of a headline. Display only, it never moves prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Strongly bullish
    VeryPositive,

    /// Moderately bullish
    Positive,

    Neutral,

    /// Cuts both ways
    Mixed,

    /// Moderately bearish
    Negative,

    /// Strongly bearish
    VeryNegative,
}

impl Sentiment {
    /// Numeric score (-1.0 to 1.0); mixed news scores as neutral
    pub fn to_score(&self) -> f64 {
        match self {
            Sentiment::VeryPositive => 1.0,
            Sentiment::Positive => 0.5,
            Sentiment::Neutral | Sentiment::Mixed => 0.0,
            Sentiment::Negative => -0.5,
            Sentiment::VeryNegative => -1.0,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.to_score() > 0.0
    }

    pub fn is_negative(&self) -> bool {
        self.to_score() < 0.0
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Sentiment::VeryPositive => "Very Positive",
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Mixed => "Mixed",
            Sentiment::Negative => "Negative",
            Sentiment::VeryNegative => "Very Negative",
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "very_positive" => Ok(Sentiment::VeryPositive),
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "mixed" => Ok(Sentiment::Mixed),
            "negative" => Ok(Sentiment::Negative),
            "very_negative" => Ok(Sentiment::VeryNegative),
            _ => Err(GameError::InvalidInput(format!("Invalid sentiment: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Election,
    Fed,
    Crisis,
    Geopolitical,
    Economic,
    Market,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Election,
        EventCategory::Fed,
        EventCategory::Crisis,
        EventCategory::Geopolitical,
        EventCategory::Economic,
        EventCategory::Market,
    ];
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Election => write!(f, "election"),
            EventCategory::Fed => write!(f, "fed"),
            EventCategory::Crisis => write!(f, "crisis"),
            EventCategory::Geopolitical => write!(f, "geopolitical"),
            EventCategory::Economic => write!(f, "economic"),
            EventCategory::Market => write!(f, "market"),
        }
    }
}

impl std::str::FromStr for EventCategory {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|c| c.to_string() == s.to_lowercase())
            .ok_or_else(|| GameError::InvalidInput(format!("Invalid event category: {}", s)))
    }
}

/// A headline in the static catalog, not yet placed on a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub text: &'static str,
    pub sentiment: Sentiment,
    pub category: EventCategory,
}

impl CatalogEntry {
    const fn new(text: &'static str, sentiment: Sentiment, category: EventCategory) -> Self {
        Self {
            text,
            sentiment,
            category,
        }
    }

    /// Place this headline at `trigger_month` of a session.
    pub fn schedule_at(&self, trigger_month: u32) -> EconomicEvent {
        EconomicEvent {
            text: self.text.to_string(),
            sentiment: self.sentiment,
            category: self.category,
            trigger_month,
        }
    }
}

/// A headline scheduled into one game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicEvent {
    pub text: String,
    pub sentiment: Sentiment,
    pub category: EventCategory,
    /// Month index at which the event becomes due; always < game length
    pub trigger_month: u32,
}

use EventCategory::*;
use Sentiment::*;

pub static CATALOG: &[CatalogEntry] = &[
    // Elections
    CatalogEntry::new("Presidential election ends in a divided government", Mixed, Election),
    CatalogEntry::new("Incumbent party wins in a landslide, investors expect policy continuity", Positive, Election),
    CatalogEntry::new("Contested election result triggers weeks of uncertainty", Negative, Election),
    CatalogEntry::new("New administration unveils sweeping corporate tax cuts", VeryPositive, Election),
    CatalogEntry::new("Midterm elections shift control of Congress", Neutral, Election),
    // Federal Reserve
    CatalogEntry::new("Federal Reserve cuts interest rates by 50 basis points", VeryPositive, Fed),
    CatalogEntry::new("Fed raises rates to fight rising inflation", Negative, Fed),
    CatalogEntry::new("Fed signals rates will stay higher for longer", Negative, Fed),
    CatalogEntry::new("Fed launches a new round of quantitative easing", Positive, Fed),
    CatalogEntry::new("Fed holds rates steady, citing balanced risks", Neutral, Fed),
    // Crises
    CatalogEntry::new("Major investment bank collapses as credit markets freeze", VeryNegative, Crisis),
    CatalogEntry::new("Global pandemic forces widespread lockdowns", VeryNegative, Crisis),
    CatalogEntry::new("Housing bubble bursts as mortgage defaults surge", VeryNegative, Crisis),
    CatalogEntry::new("Regional bank run prompts emergency deposit guarantees", Negative, Crisis),
    CatalogEntry::new("Sovereign debt crisis spreads across emerging markets", Negative, Crisis),
    // Geopolitics
    CatalogEntry::new("Armed conflict erupts in a major oil-producing region", Negative, Geopolitical),
    CatalogEntry::new("Trade war escalates with new tariffs on imports", Negative, Geopolitical),
    CatalogEntry::new("Historic trade agreement signed between major economies", Positive, Geopolitical),
    CatalogEntry::new("Peace accord eases tensions in a long-running conflict", Positive, Geopolitical),
    CatalogEntry::new("Sanctions imposed on a major commodity exporter", Mixed, Geopolitical),
    // Economy
    CatalogEntry::new("GDP growth beats expectations for a third straight quarter", Positive, Economic),
    CatalogEntry::new("Unemployment falls to a 50-year low", Positive, Economic),
    CatalogEntry::new("Inflation hits a 40-year high", Negative, Economic),
    CatalogEntry::new("Economy officially enters recession", VeryNegative, Economic),
    CatalogEntry::new("Consumer spending surges through the holiday season", Positive, Economic),
    // Markets
    CatalogEntry::new("Tech stocks rally on an artificial intelligence breakthrough", VeryPositive, Market),
    CatalogEntry::new("Flash crash wipes out billions in minutes before recovering", Mixed, Market),
    CatalogEntry::new("Record IPO wave signals investor exuberance", Positive, Market),
    CatalogEntry::new("Stocks post their worst week in over a decade", VeryNegative, Market),
    CatalogEntry::new("Earnings season delivers mixed results", Mixed, Market),
];

/// Catalog entries of one category, in catalog order.
pub fn catalog_by_category(catalog: &[CatalogEntry], category: EventCategory) -> Vec<&CatalogEntry> {
    catalog.iter().filter(|e| e.category == category).collect()
}
