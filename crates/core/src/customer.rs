//! Customer typing
//!
//! The detected customer type decides which qualification fields are
//! relevant. It is set once detected and rarely changes afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    /// Not yet classified
    #[default]
    Unknown,
    /// Opening a new cafe or food-service venue
    NewBusiness,
    /// Already operating one or more venues
    ExistingBusiness,
    /// Browsing, hobbyist, or explicitly not a business
    Casual,
}

impl CustomerType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NewBusiness => "new_business",
            Self::ExistingBusiness => "existing_business",
            Self::Casual => "casual",
        }
    }

    /// Business types go through qualification; casual visitors do not.
    pub fn is_qualifiable(&self) -> bool {
        matches!(self, Self::NewBusiness | Self::ExistingBusiness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifiable_types() {
        assert!(CustomerType::NewBusiness.is_qualifiable());
        assert!(CustomerType::ExistingBusiness.is_qualifiable());
        assert!(!CustomerType::Casual.is_qualifiable());
        assert!(!CustomerType::Unknown.is_qualifiable());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&CustomerType::NewBusiness).unwrap();
        assert_eq!(json, "\"new_business\"");
        assert_eq!(
            serde_json::from_str::<CustomerType>(&json).unwrap(),
            CustomerType::NewBusiness
        );
    }
}
