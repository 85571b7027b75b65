//! Qualification field schema
//!
//! Fields are a typed enum rather than free-form strings; which fields
//! matter is a pure lookup on the detected customer type.

use brewflow_core::CustomerType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Sentinel stored when the user explicitly refuses to share a contact
/// field. Counts as answered so the field is never re-asked, but does
/// not satisfy the contact requirement.
pub const USER_DECLINED: &str = "user_declined";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Email,
    Phone,
    // New-business qualification
    Timeline,
    CoffeeStyle,
    Equipment,
    Volume,
    // Existing-business qualification
    CurrentPainPoints,
    CafeCount,
    SupportNeeds,
    CurrentCoffeeStyle,
    CoffeePreference,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Timeline => "timeline",
            Self::CoffeeStyle => "coffee_style",
            Self::Equipment => "equipment",
            Self::Volume => "volume",
            Self::CurrentPainPoints => "current_pain_points",
            Self::CafeCount => "cafe_count",
            Self::SupportNeeds => "support_needs",
            Self::CurrentCoffeeStyle => "current_coffee_style",
            Self::CoffeePreference => "coffee_preference",
        }
    }

    /// Topic tag used for duplicate-question suppression
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Email | Self::Phone => "contact",
            other => other.as_str(),
        }
    }

    /// Short description used in extraction prompts
    pub fn description(&self) -> &'static str {
        match self {
            Self::Name => "the person's name",
            Self::Email => "their email address",
            Self::Phone => "their phone number",
            Self::Timeline => "when they plan to open (e.g. next spring, in 3 months)",
            Self::CoffeeStyle => "the coffee style they want to serve",
            Self::Equipment => "what espresso equipment they have or plan to buy",
            Self::Volume => "expected weekly coffee volume",
            Self::CurrentPainPoints => "problems with their current coffee supplier",
            Self::CafeCount => "how many locations they operate",
            Self::SupportNeeds => "what supplier support they need (training, servicing)",
            Self::CurrentCoffeeStyle => "the coffee they currently serve",
            Self::CoffeePreference => "roast or origin preferences",
        }
    }

    pub fn is_contact(&self) -> bool {
        matches!(self, Self::Email | Self::Phone)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields that must be present (and valid) before a lead is qualified.
/// Contact is handled separately: either email or phone satisfies it.
pub fn required_fields(customer_type: CustomerType) -> &'static [FieldName] {
    if customer_type.is_qualifiable() {
        &[FieldName::Name]
    } else {
        &[]
    }
}

/// Nice-to-have fields asked after the required set, in ask order
pub fn preferred_fields(customer_type: CustomerType) -> &'static [FieldName] {
    match customer_type {
        CustomerType::NewBusiness => &[
            FieldName::Timeline,
            FieldName::CoffeeStyle,
            FieldName::Equipment,
            FieldName::Volume,
        ],
        CustomerType::ExistingBusiness => &[
            FieldName::CurrentPainPoints,
            FieldName::CafeCount,
            FieldName::SupportNeeds,
            FieldName::CurrentCoffeeStyle,
            FieldName::CoffeePreference,
        ],
        CustomerType::Unknown | CustomerType::Casual => &[],
    }
}

/// Fields worth probing before the customer type is known
pub fn common_fields() -> &'static [FieldName] {
    &[
        FieldName::Name,
        FieldName::Email,
        FieldName::Phone,
        FieldName::Timeline,
    ]
}

fn answered(fields: &HashMap<FieldName, String>, field: FieldName) -> bool {
    fields
        .get(&field)
        .map(|v| !v.is_empty() && v != USER_DECLINED)
        .unwrap_or(false)
}

/// Whether the contact requirement is satisfied (email or phone)
pub fn has_contact(fields: &HashMap<FieldName, String>) -> bool {
    answered(fields, FieldName::Email) || answered(fields, FieldName::Phone)
}

/// Qualification completeness as a pure function of accumulated fields.
/// Independent of call order, prior stage, or signal counts.
pub fn is_qualified(fields: &HashMap<FieldName, String>, customer_type: CustomerType) -> bool {
    if !customer_type.is_qualifiable() {
        return false;
    }
    required_fields(customer_type)
        .iter()
        .all(|f| answered(fields, *f))
        && has_contact(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_set_per_type() {
        assert_eq!(
            required_fields(CustomerType::NewBusiness),
            &[FieldName::Name]
        );
        assert!(required_fields(CustomerType::Casual).is_empty());
        assert!(required_fields(CustomerType::Unknown).is_empty());
    }

    #[test]
    fn test_preferred_sets_differ_by_type() {
        assert_eq!(preferred_fields(CustomerType::NewBusiness).len(), 4);
        assert_eq!(preferred_fields(CustomerType::ExistingBusiness).len(), 5);
        assert!(preferred_fields(CustomerType::Casual).is_empty());
    }

    #[test]
    fn test_qualified_needs_name_and_one_contact() {
        let mut fields = HashMap::new();
        assert!(!is_qualified(&fields, CustomerType::NewBusiness));

        fields.insert(FieldName::Name, "Jane".to_string());
        assert!(!is_qualified(&fields, CustomerType::NewBusiness));

        fields.insert(FieldName::Email, "jane@example.com".to_string());
        assert!(is_qualified(&fields, CustomerType::NewBusiness));

        // Phone alone also satisfies contact
        let mut by_phone = HashMap::new();
        by_phone.insert(FieldName::Name, "Jane".to_string());
        by_phone.insert(FieldName::Phone, "+15551234567".to_string());
        assert!(is_qualified(&by_phone, CustomerType::ExistingBusiness));
    }

    #[test]
    fn test_declined_contact_does_not_qualify() {
        let mut fields = HashMap::new();
        fields.insert(FieldName::Name, "Jane".to_string());
        fields.insert(FieldName::Email, USER_DECLINED.to_string());
        fields.insert(FieldName::Phone, USER_DECLINED.to_string());
        assert!(!is_qualified(&fields, CustomerType::NewBusiness));
    }

    #[test]
    fn test_casual_never_qualifies() {
        let mut fields = HashMap::new();
        fields.insert(FieldName::Name, "Sam".to_string());
        fields.insert(FieldName::Email, "sam@example.com".to_string());
        assert!(!is_qualified(&fields, CustomerType::Casual));
    }

    #[test]
    fn test_completeness_is_pure() {
        let mut fields = HashMap::new();
        fields.insert(FieldName::Name, "Jane".to_string());
        fields.insert(FieldName::Phone, "+15551234567".to_string());
        let first = is_qualified(&fields, CustomerType::NewBusiness);
        let second = is_qualified(&fields, CustomerType::NewBusiness);
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn test_contact_fields_share_topic() {
        assert_eq!(FieldName::Email.topic(), "contact");
        assert_eq!(FieldName::Phone.topic(), "contact");
        assert_eq!(FieldName::Timeline.topic(), "timeline");
    }
}
