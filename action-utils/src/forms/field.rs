//! Form field kinds and attributes

use serde_json::Value;

/// HTML input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    /// Text input (default)
    #[default]
    Text,
    /// Email input
    Email,
    /// Password input, never prefilled
    Password,
    /// Number input; submitted values bind as JSON numbers when they parse
    Number,
    /// Telephone input
    Tel,
    /// URL input
    Url,
    /// Search input
    Search,
    /// Date input
    Date,
    /// Date and time input
    DateTimeLocal,
    /// Hidden input
    Hidden,
}

impl InputType {
    /// HTML `type` attribute value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Search => "search",
            Self::Date => "date",
            Self::DateTimeLocal => "datetime-local",
            Self::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field attribute flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
    /// Value must be present on submit
    pub required: bool,
    /// Rendered disabled
    pub disabled: bool,
    /// Rendered read-only
    pub readonly: bool,
}

/// Option for select dropdowns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Value attribute
    pub value: String,
    /// Display text
    pub label: String,
}

impl SelectOption {
    /// Create a select option
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Kind of form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// `<input>`
    Input(InputType),
    /// `<textarea>`
    Textarea {
        /// Visible text lines
        rows: Option<u32>,
    },
    /// `<select>`
    Select {
        /// Available options
        options: Vec<SelectOption>,
    },
    /// `<input type="checkbox">`, binds as a boolean
    Checkbox {
        /// Whether the box is ticked
        checked: bool,
    },
}

impl Default for FieldKind {
    fn default() -> Self {
        Self::Input(InputType::default())
    }
}

/// A form field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
    /// Submission name
    pub name: String,
    /// Field kind
    pub kind: FieldKind,
    /// Label text
    pub label: Option<String>,
    /// Placeholder text
    pub placeholder: Option<String>,
    /// Current value
    pub value: Option<String>,
    /// Attribute flags
    pub flags: FieldFlags,
    /// CSS class(es)
    pub class: Option<String>,
    /// Element ID (defaults to the name)
    pub id: Option<String>,
    /// Help text shown below the field
    pub help_text: Option<String>,
    /// Extra attributes, rendered in order
    pub attrs: Vec<(String, String)>,
}

impl FormField {
    /// Input field
    #[must_use]
    pub fn input(name: impl Into<String>, input_type: InputType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Input(input_type),
            ..Self::default()
        }
    }

    /// Textarea field
    #[must_use]
    pub fn textarea(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Textarea { rows: None },
            ..Self::default()
        }
    }

    /// Select field with no options yet
    #[must_use]
    pub fn select(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Select {
                options: Vec::new(),
            },
            ..Self::default()
        }
    }

    /// Unchecked checkbox
    #[must_use]
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Checkbox { checked: false },
            ..Self::default()
        }
    }

    /// ID attribute, falling back to the name
    #[must_use]
    pub fn effective_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Whether this is a hidden input
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self.kind, FieldKind::Input(InputType::Hidden))
    }

    /// Prefill from a data value
    ///
    /// Passwords are never prefilled; checkboxes take the value's truthiness.
    pub(crate) fn prefill(&mut self, value: &Value) {
        match &mut self.kind {
            FieldKind::Input(InputType::Password) => {}
            FieldKind::Checkbox { checked } => *checked = is_truthy(value),
            _ => self.value = display_value(value),
        }
    }

    /// Bind a submitted string into a data value
    pub(crate) fn bind(&mut self, submitted: Option<&str>) -> Value {
        match &mut self.kind {
            FieldKind::Checkbox { checked } => {
                *checked = submitted.is_some_and(|v| !v.is_empty() && v != "0");
                Value::Bool(*checked)
            }
            FieldKind::Input(InputType::Number) => {
                self.value = submitted.map(str::to_string);
                match submitted.map(str::trim) {
                    None | Some("") => Value::Null,
                    Some(text) => text
                        .parse::<i64>()
                        .map(Value::from)
                        .or_else(|_| text.parse::<f64>().map(Value::from))
                        .unwrap_or_else(|_| Value::String(text.to_string())),
                }
            }
            _ => {
                self.value = submitted.map(str::to_string);
                submitted.map_or(Value::Null, |v| Value::String(v.to_string()))
            }
        }
    }

    /// Whether the bound state satisfies `required`
    pub(crate) fn is_blank(&self) -> bool {
        match &self.kind {
            FieldKind::Checkbox { checked } => !checked,
            _ => self.value.as_deref().is_none_or(|v| v.trim().is_empty()),
        }
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_id() {
        let mut field = FormField::input("title", InputType::Text);
        assert_eq!(field.effective_id(), "title");
        field.id = Some("post_title".into());
        assert_eq!(field.effective_id(), "post_title");
    }

    #[test]
    fn test_prefill() {
        let mut title = FormField::input("title", InputType::Text);
        title.prefill(&json!("Hello"));
        assert_eq!(title.value.as_deref(), Some("Hello"));

        let mut count = FormField::input("count", InputType::Number);
        count.prefill(&json!(3));
        assert_eq!(count.value.as_deref(), Some("3"));

        let mut password = FormField::input("password", InputType::Password);
        password.prefill(&json!("secret"));
        assert_eq!(password.value, None);

        let mut agree = FormField::checkbox("agree");
        agree.prefill(&json!(true));
        assert_eq!(agree.kind, FieldKind::Checkbox { checked: true });
    }

    #[test]
    fn test_bind_number_and_checkbox() {
        let mut count = FormField::input("count", InputType::Number);
        assert_eq!(count.bind(Some("42")), json!(42));
        assert_eq!(count.bind(Some("1.5")), json!(1.5));
        assert_eq!(count.bind(Some("")), Value::Null);

        let mut agree = FormField::checkbox("agree");
        assert_eq!(agree.bind(Some("on")), json!(true));
        assert!(!agree.is_blank());
        assert_eq!(agree.bind(None), json!(false));
        assert!(agree.is_blank());
    }

    #[test]
    fn test_blank_text() {
        let mut title = FormField::input("title", InputType::Text);
        title.bind(Some("   "));
        assert!(title.is_blank());
        title.bind(Some("x"));
        assert!(!title.is_blank());
    }
}
