//! Oxbow form and table schemas
//!
//! Forms and tables are described declaratively: a schema is data, built
//! once per screen and interpreted by whatever renders it. Validation
//! interprets exactly two flags, `required` and `pattern`; anything richer
//! belongs to the backend, which remains the authority on every write.

use oxbow_types::FieldOption;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input control a field renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Select,
    Checkbox,
    Textarea,
}

/// One field of a form schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Key of the field in the submitted value map
    pub name: String,

    /// Human-readable label
    pub label: String,

    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,

    /// Regular expression the rendered string value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Options for select fields, usually loaded from a fields endpoint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,

    #[serde(default)]
    pub disabled: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        FieldSchema {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            pattern: None,
            options: Vec::new(),
            disabled: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Horizontal alignment of a table column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One column of a table schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    /// Key of the column in each row object
    pub field: String,

    /// Header label
    pub header: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default)]
    pub align: Align,

    #[serde(default)]
    pub sortable: bool,
}

impl ColumnSchema {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        ColumnSchema {
            field: field.into(),
            header: header.into(),
            width: None,
            align: Align::Left,
            sortable: false,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// Why a value failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A required field is missing, null or empty
    MissingRequired,

    /// The value does not match the field's pattern
    PatternMismatch,

    /// The field's pattern itself is not a valid regular expression
    InvalidPattern,
}

/// One validation failure, addressed to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub kind: IssueKind,
}

/// A form: an ordered list of fields plus interpretation of their flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    pub fields: Vec<FieldSchema>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        FormSchema { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Validate a submitted value map against the schema
    ///
    /// Only `required` and `pattern` are interpreted. Disabled fields are
    /// skipped; they never reach the submitted payload. Patterns apply to
    /// string values; non-string values are not pattern-checked.
    pub fn validate(&self, values: &Map<String, Value>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for field in &self.fields {
            if field.disabled {
                continue;
            }

            let value = values.get(&field.name);

            if field.required && is_absent(value) {
                issues.push(ValidationIssue {
                    field: field.name.clone(),
                    message: format!("{} is required", field.label),
                    kind: IssueKind::MissingRequired,
                });
                continue;
            }

            if let (Some(pattern), Some(Value::String(text))) = (&field.pattern, value) {
                match Regex::new(pattern) {
                    Ok(regex) => {
                        if !regex.is_match(text) {
                            issues.push(ValidationIssue {
                                field: field.name.clone(),
                                message: format!("{} has an invalid format", field.label),
                                kind: IssueKind::PatternMismatch,
                            });
                        }
                    }
                    Err(_) => issues.push(ValidationIssue {
                        field: field.name.clone(),
                        message: format!("{} has an unusable pattern", field.label),
                        kind: IssueKind::InvalidPattern,
                    }),
                }
            }
        }

        issues
    }

    /// True when the value map passes every interpreted flag
    pub fn is_valid(&self, values: &Map<String, Value>) -> bool {
        self.validate(values).is_empty()
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vendor_form() -> FormSchema {
        FormSchema::new(vec![
            FieldSchema::new("vendorName", "Vendor name", FieldKind::Text).required(),
            FieldSchema::new("businessNumber", "Business number", FieldKind::Text)
                .pattern(r"^\d{3}-\d{2}-\d{5}$"),
            FieldSchema::new("isUse", "In use", FieldKind::Checkbox),
        ])
    }

    fn values(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_required_catches_missing_and_empty() {
        let form = vendor_form();

        let missing = form.validate(&values(json!({})));
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].kind, IssueKind::MissingRequired);
        assert_eq!(missing[0].field, "vendorName");

        let empty = form.validate(&values(json!({"vendorName": ""})));
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].kind, IssueKind::MissingRequired);
    }

    #[test]
    fn test_pattern_checks_string_values() {
        let form = vendor_form();

        let bad = form.validate(&values(json!({
            "vendorName": "ACME",
            "businessNumber": "12345"
        })));
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].kind, IssueKind::PatternMismatch);
        assert_eq!(bad[0].field, "businessNumber");

        let good = form.validate(&values(json!({
            "vendorName": "ACME",
            "businessNumber": "123-45-67890"
        })));
        assert!(good.is_empty());
    }

    #[test]
    fn test_optional_field_may_be_absent() {
        let form = vendor_form();
        let issues = form.validate(&values(json!({"vendorName": "ACME"})));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_disabled_fields_are_skipped() {
        let form = FormSchema::new(vec![
            FieldSchema::new("vendorCode", "Vendor code", FieldKind::Text)
                .required()
                .disabled(),
        ]);

        assert!(form.is_valid(&values(json!({}))));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let form = FormSchema::new(vec![
            FieldSchema::new("code", "Code", FieldKind::Text).pattern("([unclosed"),
        ]);

        let issues = form.validate(&values(json!({"code": "abc"})));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::InvalidPattern);
    }

    #[test]
    fn test_schema_roundtrips_as_json() {
        let form = vendor_form();
        let raw = serde_json::to_string(&form).unwrap();
        let parsed: FormSchema = serde_json::from_str(&raw).unwrap();

        assert_eq!(parsed.fields.len(), 3);
        assert!(parsed.field("vendorName").unwrap().required);
        assert_eq!(parsed.field("isUse").unwrap().kind, FieldKind::Checkbox);
    }

    #[test]
    fn test_column_builder() {
        let column = ColumnSchema::new("vendorName", "Vendor")
            .width(200)
            .align(Align::Center)
            .sortable();

        assert_eq!(column.width, Some(200));
        assert_eq!(column.align, Align::Center);
        assert!(column.sortable);
    }
}
