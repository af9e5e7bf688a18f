//! Filter enums for CLI commands

use clap::ValueEnum;

use crate::core::waste::{Confidence, WasteCategory};

/// Minimum confidence filter for observation lists
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ConfidenceFilter {
    /// Only high-confidence observations
    High,
    /// Medium and high
    Medium,
    /// Every observation - default
    #[default]
    All,
}

impl ConfidenceFilter {
    /// Check if a confidence tier passes this filter
    pub fn matches(&self, confidence: Confidence) -> bool {
        match self {
            ConfidenceFilter::High => confidence == Confidence::High,
            ConfidenceFilter::Medium => confidence >= Confidence::Medium,
            ConfidenceFilter::All => true,
        }
    }
}

impl std::fmt::Display for ConfidenceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceFilter::High => write!(f, "high"),
            ConfidenceFilter::Medium => write!(f, "medium"),
            ConfidenceFilter::All => write!(f, "all"),
        }
    }
}

/// Waste filter for observation lists
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum WasteFilter {
    Defects,
    Waiting,
    Inventory,
    Overproduction,
    Transportation,
    Motion,
    Overprocessing,
    Talent,
}

impl WasteFilter {
    pub fn matches(&self, waste: WasteCategory) -> bool {
        WasteCategory::from(*self) == waste
    }
}

impl From<WasteFilter> for WasteCategory {
    fn from(filter: WasteFilter) -> Self {
        match filter {
            WasteFilter::Defects => WasteCategory::Defects,
            WasteFilter::Waiting => WasteCategory::Waiting,
            WasteFilter::Inventory => WasteCategory::Inventory,
            WasteFilter::Overproduction => WasteCategory::Overproduction,
            WasteFilter::Transportation => WasteCategory::Transportation,
            WasteFilter::Motion => WasteCategory::Motion,
            WasteFilter::Overprocessing => WasteCategory::Overprocessing,
            WasteFilter::Talent => WasteCategory::Talent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_filter_is_a_floor() {
        assert!(ConfidenceFilter::All.matches(Confidence::Low));
        assert!(!ConfidenceFilter::Medium.matches(Confidence::Low));
        assert!(ConfidenceFilter::Medium.matches(Confidence::Medium));
        assert!(ConfidenceFilter::Medium.matches(Confidence::High));
        assert!(!ConfidenceFilter::High.matches(Confidence::Medium));
    }

    #[test]
    fn test_waste_filter_maps_every_category() {
        for waste in WasteCategory::ALL {
            let filter = WasteFilter::from_str(waste.as_str(), true).unwrap();
            assert!(filter.matches(waste));
        }
    }
}
