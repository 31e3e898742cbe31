//! Declarative task template field descriptors.
//!
//! A template lists the input fields a request must provide and the output
//! fields a completed task reports back. The persistence gateway does not
//! depend on this module.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Whether a field is supplied by the requester or produced by the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    Input,
    Output,
}

/// Value type tag used by renderers to pick an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Text,
    Environment,
    Project,
    Database,
    Boolean,
}

/// One template field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub category: FieldCategory,
    /// Stable identifier used as the key in value maps.
    pub slug: String,
    /// Display label.
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldDescriptor {
    pub fn input(slug: &str, name: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            category: FieldCategory::Input,
            slug: slug.to_string(),
            name: name.to_string(),
            field_type,
            required,
        }
    }

    pub fn output(slug: &str, name: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            category: FieldCategory::Output,
            slug: slug.to_string(),
            name: name.to_string(),
            field_type,
            required,
        }
    }
}

/// A submitted field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Emptiness predicate used for required-field checks.
    ///
    /// Ids (`Int`) and flags (`Bool`) are never empty; `false` is a real answer.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(value) => value.trim().is_empty(),
            Self::Bool(_) | Self::Int(_) => false,
        }
    }
}

/// Named, ordered list of field descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl TaskTemplate {
    /// Checks declaration-level invariants.
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if self.name.trim().is_empty() {
            return Err(TemplateValidationError::EmptyName);
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            let slug = field.slug.trim();
            if slug.is_empty() {
                return Err(TemplateValidationError::EmptySlug);
            }
            if field.name.trim().is_empty() {
                return Err(TemplateValidationError::EmptyFieldName(slug.to_string()));
            }
            if !seen.insert(slug) {
                return Err(TemplateValidationError::DuplicateSlug(slug.to_string()));
            }
        }
        Ok(())
    }

    pub fn field(&self, slug: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.slug == slug)
    }

    pub fn input_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields_in(FieldCategory::Input)
    }

    pub fn output_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields_in(FieldCategory::Output)
    }

    /// Returns slugs of required fields in `category` whose value is absent
    /// or empty, in declaration order.
    pub fn missing_required(
        &self,
        values: &BTreeMap<String, FieldValue>,
        category: FieldCategory,
    ) -> Vec<&str> {
        self.fields_in(category)
            .filter(|field| field.required)
            .filter(|field| values.get(&field.slug).map_or(true, FieldValue::is_empty))
            .map(|field| field.slug.as_str())
            .collect()
    }

    fn fields_in(&self, category: FieldCategory) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |field| field.category == category)
    }
}

/// Built-in template for requesting a new database.
pub fn database_request_template() -> TaskTemplate {
    TaskTemplate {
        name: "bb.database.request".to_string(),
        fields: vec![
            FieldDescriptor::input("database-name", "Database name", FieldType::String, true),
            FieldDescriptor::input("environment", "Environment", FieldType::Environment, true),
            FieldDescriptor::input("project", "Project", FieldType::Project, false),
            FieldDescriptor::output("database", "Created database", FieldType::Database, true),
        ],
    }
}

/// Template declaration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    EmptyName,
    EmptySlug,
    EmptyFieldName(String),
    DuplicateSlug(String),
}

impl Display for TemplateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "template name must not be empty"),
            Self::EmptySlug => write!(f, "field slug must not be empty"),
            Self::EmptyFieldName(slug) => write!(f, "field `{slug}` must have a name"),
            Self::DuplicateSlug(slug) => write!(f, "duplicate field slug `{slug}`"),
        }
    }
}

impl Error for TemplateValidationError {}

#[cfg(test)]
mod tests {
    use super::{
        database_request_template, FieldCategory, FieldDescriptor, FieldType, FieldValue,
        TemplateValidationError,
    };
    use std::collections::BTreeMap;

    #[test]
    fn builtin_template_is_valid_and_split_by_category() {
        let template = database_request_template();
        assert_eq!(template.validate(), Ok(()));
        assert_eq!(template.input_fields().count(), 3);
        assert_eq!(template.output_fields().count(), 1);
        assert_eq!(
            template.field("environment").map(|field| field.field_type),
            Some(FieldType::Environment)
        );
    }

    #[test]
    fn missing_required_reports_absent_and_blank_values() {
        let template = database_request_template();
        let mut values = BTreeMap::new();
        values.insert("database-name".to_string(), FieldValue::Text("  ".to_string()));

        assert_eq!(
            template.missing_required(&values, FieldCategory::Input),
            vec!["database-name", "environment"]
        );

        values.insert("database-name".to_string(), FieldValue::Text("db1".to_string()));
        values.insert("environment".to_string(), FieldValue::Int(101));
        assert!(template
            .missing_required(&values, FieldCategory::Input)
            .is_empty());
        assert_eq!(
            template.missing_required(&values, FieldCategory::Output),
            vec!["database"]
        );
    }

    #[test]
    fn emptiness_treats_false_and_zero_as_present() {
        assert!(FieldValue::Null.is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Int(0).is_empty());
    }

    #[test]
    fn validate_rejects_duplicate_slugs() {
        let mut template = database_request_template();
        template.fields.push(FieldDescriptor::input(
            "project",
            "Project again",
            FieldType::Project,
            false,
        ));
        assert_eq!(
            template.validate(),
            Err(TemplateValidationError::DuplicateSlug("project".to_string()))
        );
    }

    #[test]
    fn field_values_deserialize_untagged() {
        let values: BTreeMap<String, FieldValue> =
            serde_json::from_str(r#"{"a": null, "b": true, "c": 7, "d": "x"}"#).unwrap();
        assert_eq!(values["a"], FieldValue::Null);
        assert_eq!(values["b"], FieldValue::Bool(true));
        assert_eq!(values["c"], FieldValue::Int(7));
        assert_eq!(values["d"], FieldValue::Text("x".to_string()));
    }
}
