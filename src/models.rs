use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::ColorClass;
use crate::infer::Resolved;
use crate::token::Token;

/// One cell of a client's scan window, in scan order (top-to-bottom,
/// left-to-right). `date_below` is preferred over `date_above` when both
/// neighbors carry something parseable.
#[derive(Debug, Clone)]
pub struct CellObservation {
    pub row: u32,
    pub column: u32,
    pub color: ColorClass,
    pub text: Option<String>,
    pub date_below: Option<Token>,
    pub date_above: Option<Token>,
}

/// Fully built per-client record. Populated in one pass, then serialized;
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub name: String,
    pub previous_completed: u32,
    /// Chronologically non-decreasing after inference; opaque entries first.
    pub paid_used: Vec<Resolved>,
    /// Paid cells with no resolvable date: pre-purchased, not yet consumed.
    pub paid_remaining: u32,
    pub unpaid: Vec<Resolved>,
    pub annotations: Vec<Annotation>,
}

impl ClientRecord {
    pub fn total_current(&self) -> u32 {
        self.paid_used.len() as u32 + self.paid_remaining + self.unpaid.len() as u32
    }

    pub fn total_all_time(&self) -> u32 {
        self.previous_completed + self.total_current()
    }

    pub fn to_entry(&self) -> ClientEntry {
        ClientEntry {
            paid: self.paid_used.iter().map(Resolved::render).collect(),
            unpaid: self.unpaid.iter().map(Resolved::render).collect(),
            stats: ClientStats {
                previous_completed: self.previous_completed,
                current_paid_used: self.paid_used.len() as u32,
                current_remaining: self.paid_remaining,
                current_unpaid: self.unpaid.len() as u32,
                total_current: self.total_current(),
                total_all_time: self.total_all_time(),
            },
            extra: self.annotations.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot document: field names and layout are a compatibility contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientStats {
    pub previous_completed: u32,
    pub current_paid_used: u32,
    pub current_remaining: u32,
    pub current_unpaid: u32,
    pub total_current: u32,
    pub total_all_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientEntry {
    pub paid: Vec<String>,
    pub unpaid: Vec<String>,
    pub stats: ClientStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enhancement {
    pub enabled: bool,
    pub reference_date: String,
    pub logic: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub clients: BTreeMap<String, ClientEntry>,
    pub updated: String,
    pub date_enhancement: Enhancement,
}
