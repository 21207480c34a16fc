use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::HierarchyResult;

/// Position of a node in its supplier chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// No upstream supplier: a manufacturer
    Root,
    /// One hop from a root
    Reseller,
    /// Two hops from a root, the deepest allowed position
    Retailer,
}

impl Tier {
    pub fn from_depth(depth: u8) -> Option<Self> {
        match depth {
            0 => Some(Tier::Root),
            1 => Some(Tier::Reseller),
            2 => Some(Tier::Retailer),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Root => "Root",
            Tier::Reseller => "Reseller",
            Tier::Retailer => "Retailer",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived classification attached to every node returned by the read path.
///
/// Never stored. A broken chain degrades to `Unclassifiable` so listings keep
/// rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Classification {
    Classified { depth: u8, tier: Tier },
    Unclassifiable { hierarchy_error: String },
}

impl Classification {
    pub fn from_walk(result: HierarchyResult<u8>) -> Self {
        match result {
            Ok(depth) => classify(depth),
            Err(err) => Classification::Unclassifiable {
                hierarchy_error: err.to_string(),
            },
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            Classification::Classified { tier, .. } => Some(*tier),
            Classification::Unclassifiable { .. } => None,
        }
    }

    pub fn depth(&self) -> Option<u8> {
        match self {
            Classification::Classified { depth, .. } => Some(*depth),
            Classification::Unclassifiable { .. } => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Classified { tier, .. } => write!(f, "{}", tier),
            Classification::Unclassifiable { hierarchy_error } => {
                write!(f, "Hierarchy error: {}", hierarchy_error)
            }
        }
    }
}

/// Map a depth onto its tier
pub fn classify(depth: u8) -> Classification {
    match Tier::from_depth(depth) {
        Some(tier) => Classification::Classified { depth, tier },
        None => Classification::Unclassifiable {
            hierarchy_error: format!("Depth {} is beyond the deepest tier", depth),
        },
    }
}
