//! Listing filter criteria and their URL query-parameter form.
//!
//! Every criterion is a plain string. An empty string means "no constraint"
//! and is never written to the URL; a missing URL parameter reads back as an
//! empty string.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One of the five listing criteria. The string form is the URL parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Search,
    Location,
    Category,
    Type,
    Experience,
}

impl FilterField {
    /// URL parameter order used when serializing.
    pub const ALL: [FilterField; 5] = [
        FilterField::Search,
        FilterField::Location,
        FilterField::Category,
        FilterField::Type,
        FilterField::Experience,
    ];

    pub fn param_name(&self) -> &'static str {
        match self {
            FilterField::Search => "search",
            FilterField::Location => "location",
            FilterField::Category => "category",
            FilterField::Type => "type",
            FilterField::Experience => "experience",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilters {
    pub search: String,
    pub location: String,
    pub category: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub experience: String,
}

impl JobFilters {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Search => &self.search,
            FilterField::Location => &self.location,
            FilterField::Category => &self.category,
            FilterField::Type => &self.job_type,
            FilterField::Experience => &self.experience,
        }
    }

    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let slot = match field {
            FilterField::Search => &mut self.search,
            FilterField::Location => &mut self.location,
            FilterField::Category => &mut self.category,
            FilterField::Type => &mut self.job_type,
            FilterField::Experience => &mut self.experience,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Build filters from URL query pairs. Unknown keys are ignored and the
    /// first occurrence of a repeated key wins.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filters = Self::default();
        let mut seen = [false; 5];
        for (key, value) in pairs {
            let Ok(field) = key.as_ref().parse::<FilterField>() else {
                continue;
            };
            let idx = field as usize;
            if !seen[idx] {
                seen[idx] = true;
                filters.set(field, value);
            }
        }
        filters
    }

    pub fn from_query_string(query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
        Self::from_query_pairs(pairs)
    }

    /// Exactly the non-empty criteria, in `FilterField::ALL` order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        FilterField::ALL
            .iter()
            .filter_map(|f| {
                let value = self.get(*f);
                (!value.is_empty()).then_some((f.param_name(), value))
            })
            .collect()
    }

    /// URL-encoded query string without the leading `?`; empty when no
    /// criterion is set.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self.query_pairs()).unwrap_or_default()
    }
}
