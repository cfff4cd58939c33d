//! Read-side item filtering.
//!
//! Conditions are AND-ed, case-insensitive, and a condition with a blank
//! value matches everything.

use serde::{Deserialize, Serialize};

use crate::item::TranslationItem;
use crate::workflow::TranslationState;

/// Most conditions a single filter may carry.
pub const MAX_FILTER_CONDITIONS: usize = 5;

/// Item field a condition looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Context,
    Key,
    SourceText,
}

impl FilterField {
    fn value<'a>(&self, item: &'a TranslationItem) -> &'a str {
        match self {
            FilterField::Context => &item.context,
            FilterField::Key => &item.key,
            FilterField::SourceText => &item.source_text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Contains,
    NotContains,
    Equals,
    StartsWith,
    EndsWith,
}

/// One `field operator value` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: FilterField,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
}

impl FilterCondition {
    pub fn new(field: FilterField, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    pub fn matches(&self, item: &TranslationItem) -> bool {
        if self.value.is_empty() {
            return true;
        }
        let haystack = self.field.value(item).to_lowercase();
        let needle = self.value.to_lowercase();
        match self.operator {
            FilterOperator::Contains => haystack.contains(&needle),
            FilterOperator::NotContains => !haystack.contains(&needle),
            FilterOperator::Equals => haystack == needle,
            FilterOperator::StartsWith => haystack.starts_with(&needle),
            FilterOperator::EndsWith => haystack.ends_with(&needle),
        }
    }
}

/// Filter over the item collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Restrict to a single state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TranslationState>,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: TranslationState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Reject filters over the condition cap.
    pub fn validate(&self) -> Result<(), String> {
        if self.conditions.len() > MAX_FILTER_CONDITIONS {
            return Err(format!(
                "at most {} filter conditions are allowed, got {}",
                MAX_FILTER_CONDITIONS,
                self.conditions.len()
            ));
        }
        Ok(())
    }

    pub fn matches(&self, item: &TranslationItem) -> bool {
        if let Some(state) = self.state {
            if item.state != state {
                return false;
            }
        }
        self.conditions.iter().all(|c| c.matches(item))
    }

    /// Matching items, in their original order.
    pub fn apply<'a, I>(&self, items: I) -> Vec<&'a TranslationItem>
    where
        I: IntoIterator<Item = &'a TranslationItem>,
    {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<TranslationItem> {
        vec![
            TranslationItem::new("app.btn.save", "Londoloza", "settings"),
            TranslationItem::new("app.btn.cancel", "Khansela", "settings"),
            TranslationItem::new("onboarding.welcome", "Siyakwamukela", "onboarding"),
        ]
    }

    fn keys(found: Vec<&TranslationItem>) -> Vec<&str> {
        found.into_iter().map(|i| i.key.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let items = items();
        assert_eq!(ItemFilter::new().apply(&items).len(), 3);
    }

    #[test]
    fn test_operators_are_case_insensitive() {
        let items = items();
        let cases = [
            (FilterOperator::Contains, "BTN", vec!["app.btn.save", "app.btn.cancel"]),
            (FilterOperator::NotContains, "btn", vec!["onboarding.welcome"]),
            (FilterOperator::Equals, "APP.BTN.SAVE", vec!["app.btn.save"]),
            (FilterOperator::StartsWith, "App.", vec!["app.btn.save", "app.btn.cancel"]),
            (FilterOperator::EndsWith, ".Cancel", vec!["app.btn.cancel"]),
        ];
        for (operator, value, expected) in cases {
            let filter = ItemFilter::new()
                .with_condition(FilterCondition::new(FilterField::Key, operator, value));
            assert_eq!(keys(filter.apply(&items)), expected, "{operator:?}");
        }
    }

    #[test]
    fn test_conditions_are_anded() {
        let items = items();
        let filter = ItemFilter::new()
            .with_condition(FilterCondition::new(
                FilterField::Context,
                FilterOperator::Equals,
                "settings",
            ))
            .with_condition(FilterCondition::new(
                FilterField::SourceText,
                FilterOperator::StartsWith,
                "lon",
            ));
        assert_eq!(keys(filter.apply(&items)), vec!["app.btn.save"]);
    }

    #[test]
    fn test_blank_value_passes() {
        let items = items();
        let filter = ItemFilter::new().with_condition(FilterCondition::new(
            FilterField::Key,
            FilterOperator::Equals,
            "",
        ));
        assert_eq!(filter.apply(&items).len(), 3);
    }

    #[test]
    fn test_state_restriction() {
        let mut items = items();
        items[2].state = TranslationState::Rejected;
        let filter = ItemFilter::new().with_state(TranslationState::Rejected);
        assert_eq!(keys(filter.apply(&items)), vec!["onboarding.welcome"]);
    }

    #[test]
    fn test_condition_cap() {
        let mut filter = ItemFilter::new();
        for _ in 0..MAX_FILTER_CONDITIONS {
            filter = filter.with_condition(FilterCondition::new(
                FilterField::Key,
                FilterOperator::Contains,
                "a",
            ));
        }
        assert!(filter.validate().is_ok());
        filter = filter.with_condition(FilterCondition::new(
            FilterField::Key,
            FilterOperator::Contains,
            "a",
        ));
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_deserialize_filter() {
        let filter: ItemFilter = serde_json::from_str(
            r#"{"state":"draft","conditions":[{"field":"source_text","operator":"not_contains","value":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(filter.state, Some(TranslationState::Draft));
        assert_eq!(filter.conditions[0].field, FilterField::SourceText);
        assert_eq!(filter.conditions[0].operator, FilterOperator::NotContains);
    }
}
