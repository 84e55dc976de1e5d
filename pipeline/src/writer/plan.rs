use crate::stage::Validate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const FOCUS_TECHNICAL_IMPLEMENTATION: &str = "technical_implementation";
pub const FOCUS_EVIDENCE_AND_METRICS: &str = "evidence_and_metrics";
pub const FOCUS_CONCEPTUAL_DISTINCTIONS: &str = "conceptual_distinctions";
pub const FOCUS_ETHICAL_CONSIDERATIONS: &str = "ethical_considerations";

/// Article overview: audience, purpose, key message, and differentiation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ArticleOverview {
    /// Description of the target audience.
    pub target_audience: String,
    /// Main purpose of the article.
    pub purpose: String,
    /// Core message to convey.
    pub key_message: String,
    /// Value proposition for readers.
    pub value_proposition: String,
    /// Strategy based on identified content gaps.
    pub differentiation_strategy: String,
}

/// Required technical depth of a section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TechnicalDepth {
    High,
    Medium,
    Low,
    None,
}

/// Plan for a single article section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SectionPlan {
    /// Section title.
    pub title: String,
    /// Brief description of what this section covers.
    pub description: String,
    /// Estimated word count for this section.
    pub estimated_word_count: u32,
    /// Key points to cover in this section.
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Required evidence, statistics, or data for this section.
    #[serde(default)]
    pub evidence_needs: Vec<String>,
    pub technical_depth: TechnicalDepth,
    /// Types of practical examples needed.
    #[serde(default)]
    pub practical_examples: Vec<String>,
    /// Conceptual distinctions to make in this section.
    #[serde(default)]
    pub conceptual_distinctions: Vec<String>,
    /// Which focus areas this section addresses.
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

/// Mapping of focus-area types to the section titles that cover them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub struct FocusAreasMapping {
    #[serde(default)]
    pub technical_implementation: Vec<String>,
    #[serde(default)]
    pub evidence_and_metrics: Vec<String>,
    #[serde(default)]
    pub conceptual_distinctions: Vec<String>,
    #[serde(default)]
    pub ethical_considerations: Vec<String>,
}

/// A visual element opportunity in the article.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VisualOpportunity {
    /// Type of visual (e.g. "infographic", "diagram", "process_flow").
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// Where in the article this visual should appear.
    pub suggested_location: String,
    pub purpose: String,
}

/// Tone and style guidelines for the article.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ToneAndStyle {
    pub professional_tone: String,
    pub technical_accessibility_balance: String,
    pub critical_thinking: String,
    pub evidence_based_approach: String,
}

/// Structured article plan produced by the article planner stage and consumed,
/// in filtered form, by every writer stage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ArticlePlan {
    pub overview: ArticleOverview,
    /// Ordered article structure.
    pub structure: Vec<SectionPlan>,
    #[serde(default)]
    pub focus_areas_mapping: FocusAreasMapping,
    #[serde(default)]
    pub visual_opportunities: Vec<VisualOpportunity>,
    pub tone_and_style: ToneAndStyle,
}

impl Validate for ArticlePlan {
    fn validate(&self) -> Result<(), String> {
        if self.structure.is_empty() {
            return Err("article plan must contain at least one section".to_string());
        }
        Ok(())
    }
}
