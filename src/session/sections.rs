// The fixed eight-section answer framework.
//
// Every draft is organized into these sections, in this order. The order is
// meaningful: it is the order sections appear in the assembled document and
// the order unanswered sections are reported in review feedback.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SectionId
// ---------------------------------------------------------------------------

/// Identifies one of the eight fixed draft sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionId {
    Requirements,
    Apis,
    HighLevelDesign,
    DataModel,
    Scaling,
    Reliability,
    Tradeoffs,
    DeepDive,
}

impl SectionId {
    /// All section ids in catalog order.
    pub const ALL: [SectionId; 8] = [
        SectionId::Requirements,
        SectionId::Apis,
        SectionId::HighLevelDesign,
        SectionId::DataModel,
        SectionId::Scaling,
        SectionId::Reliability,
        SectionId::Tradeoffs,
        SectionId::DeepDive,
    ];

    /// The stable string key used in persisted payloads and user commands.
    pub fn key(&self) -> &'static str {
        match self {
            SectionId::Requirements => "requirements",
            SectionId::Apis => "apis",
            SectionId::HighLevelDesign => "highLevelDesign",
            SectionId::DataModel => "dataModel",
            SectionId::Scaling => "scaling",
            SectionId::Reliability => "reliability",
            SectionId::Tradeoffs => "tradeoffs",
            SectionId::DeepDive => "deepDive",
        }
    }

    /// Parse a section id from its string key. Returns `None` for anything
    /// outside the fixed catalog.
    pub fn parse(key: &str) -> Option<SectionId> {
        SectionId::ALL.iter().copied().find(|id| id.key() == key)
    }

    /// Display title for headings and feedback messages.
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::Requirements => "Requirements",
            SectionId::Apis => "APIs",
            SectionId::HighLevelDesign => "High-Level Design",
            SectionId::DataModel => "Data Model",
            SectionId::Scaling => "Scaling Plan",
            SectionId::Reliability => "Reliability & Failures",
            SectionId::Tradeoffs => "Trade-Offs",
            SectionId::DeepDive => "Deep Dive",
        }
    }

    /// Editor hint shown for an empty section.
    pub fn hint(&self) -> &'static str {
        match self {
            SectionId::Requirements => {
                "Clarify functional + non-functional requirements and constraints."
            }
            SectionId::Apis => {
                "Define critical APIs, request/response shape, and idempotency behavior."
            }
            SectionId::HighLevelDesign => {
                "List services, data flow, and request path from client to storage."
            }
            SectionId::DataModel => {
                "Core entities, indexes, partition keys, and consistency needs."
            }
            SectionId::Scaling => {
                "Read/write scaling, cache strategy, sharding, and traffic spikes."
            }
            SectionId::Reliability => {
                "Timeouts, retries, failover, DLQ, and graceful degradation."
            }
            SectionId::Tradeoffs => {
                "Document choices with reasons: consistency vs availability, cost vs latency."
            }
            SectionId::DeepDive => {
                "Pick one subsystem and explain internals (e.g., matching, feed fanout)."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
