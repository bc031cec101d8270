//! Fluent form builder

use serde_json::{Map, Value};

use super::error::FormError;
use super::field::{FieldKind, FormField, InputType, SelectOption};
use super::form::Form;
use crate::params::Parameters;

/// Options passed when creating a form
///
/// Form types may adjust these in
/// [`FormType::configure_options`](super::FormType::configure_options)
/// before fields are built.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOptions {
    /// `action` attribute; empty submits to the current URL
    pub action: String,
    /// HTTP method
    pub method: String,
    /// `id` attribute
    pub id: Option<String>,
    /// `class` attribute
    pub class: Option<String>,
    /// Rendered as a hidden `_csrf_token` input
    pub csrf_token: Option<String>,
    /// Submit button text; no button when unset
    pub submit_label: Option<String>,
    /// Extra form attributes, e.g. `hx-post`
    pub attrs: Vec<(String, String)>,
    /// Free-form options for custom form types
    pub extra: Parameters,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            action: String::new(),
            method: "POST".to_string(),
            id: None,
            class: None,
            csrf_token: None,
            submit_label: None,
            attrs: Vec::new(),
            extra: Parameters::new(),
        }
    }
}

impl FormOptions {
    /// Options with an action URL
    #[must_use]
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    /// Set the method
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the CSRF token
    #[must_use]
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Set the submit label
    #[must_use]
    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = Some(label.into());
        self
    }

    /// Add an extra option value
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key, value);
        self
    }
}

/// Builder for a [`Form`]
///
/// ```rust
/// use action_utils::forms::{FormBuilder, FormOptions, InputType};
///
/// let form = FormBuilder::new("login", FormOptions::action("/login"))
///     .csrf_token("abc123")
///     .field("email", InputType::Email)
///         .label("Email Address")
///         .required()
///         .placeholder("you@example.com")
///         .done()
///     .field("password", InputType::Password)
///         .label("Password")
///         .required()
///         .done()
///     .submit("Sign In")
///     .get_form();
///
/// assert!(form.render().contains(r#"name="email""#));
/// ```
#[derive(Debug, Clone)]
pub struct FormBuilder {
    name: String,
    options: FormOptions,
    fields: Vec<FormField>,
    data: Map<String, Value>,
}

impl FormBuilder {
    /// Empty builder
    #[must_use]
    pub fn new(name: impl Into<String>, options: FormOptions) -> Self {
        Self {
            name: name.into(),
            options,
            fields: Vec::new(),
            data: Map::new(),
        }
    }

    /// Set initial data
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidData`] unless `data` is an object or null.
    pub fn with_data(mut self, data: Option<Value>) -> Result<Self, FormError> {
        self.data = match data {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => return Err(FormError::InvalidData(json_kind(&other).to_string())),
        };
        Ok(self)
    }

    /// Form name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current options
    #[must_use]
    pub const fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Initial data
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Fields added so far
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Whether a field with this name exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Remove a field by name
    #[must_use]
    pub fn remove(mut self, name: &str) -> Self {
        self.fields.retain(|f| f.name != name);
        self
    }

    /// Set the `action` attribute
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.options.action = action.into();
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.options.id = Some(id.into());
        self
    }

    /// Set the `class` attribute
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.options.class = Some(class.into());
        self
    }

    /// Set the CSRF token
    #[must_use]
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.options.csrf_token = Some(token.into());
        self
    }

    /// Set the submit button text
    #[must_use]
    pub fn submit(mut self, text: impl Into<String>) -> Self {
        self.options.submit_label = Some(text.into());
        self
    }

    /// Add a form attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.attrs.push((name.into(), value.into()));
        self
    }

    /// Start an input field
    #[must_use]
    pub fn field(self, name: impl Into<String>, input_type: InputType) -> FieldBuilder {
        FieldBuilder::new(self, FormField::input(name, input_type))
    }

    /// Start a textarea
    #[must_use]
    pub fn textarea(self, name: impl Into<String>) -> FieldBuilder {
        FieldBuilder::new(self, FormField::textarea(name))
    }

    /// Start a select
    #[must_use]
    pub fn select(self, name: impl Into<String>) -> FieldBuilder {
        FieldBuilder::new(self, FormField::select(name))
    }

    /// Start a checkbox
    #[must_use]
    pub fn checkbox(self, name: impl Into<String>) -> FieldBuilder {
        FieldBuilder::new(self, FormField::checkbox(name))
    }

    /// Add a hidden field
    #[must_use]
    pub fn hidden(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut field = FormField::input(name, InputType::Hidden);
        field.value = Some(value.into());
        self.add_field(field)
    }

    /// Add a pre-built field, replacing one with the same name
    #[must_use]
    pub fn add_field(mut self, field: FormField) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Build the form, prefilling fields from the initial data
    ///
    /// Values in the data take precedence over values set on the builder.
    #[must_use]
    pub fn get_form(self) -> Form {
        let mut fields = self.fields;
        for field in &mut fields {
            if let Some(value) = self.data.get(&field.name) {
                field.prefill(value);
            }
        }
        Form::new(self.name, self.options, fields, self.data)
    }
}

/// Builder for one field; [`done`](Self::done) returns to the form
#[derive(Debug)]
pub struct FieldBuilder {
    form: FormBuilder,
    field: FormField,
}

impl FieldBuilder {
    const fn new(form: FormBuilder, field: FormField) -> Self {
        Self { form, field }
    }

    /// Set the label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.field.label = Some(label.into());
        self
    }

    /// Set placeholder text
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.field.placeholder = Some(placeholder.into());
        self
    }

    /// Set the value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.field.value = Some(value.into());
        self
    }

    /// Mark as required
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.field.flags.required = true;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.field.flags.disabled = true;
        self
    }

    /// Mark as read-only
    #[must_use]
    pub const fn readonly(mut self) -> Self {
        self.field.flags.readonly = true;
        self
    }

    /// Set the CSS class
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.field.class = Some(class.into());
        self
    }

    /// Set the element ID
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.field.id = Some(id.into());
        self
    }

    /// Set help text
    #[must_use]
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.field.help_text = Some(text.into());
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field.attrs.push((name.into(), value.into()));
        self
    }

    /// Textarea rows; ignored for other kinds
    #[must_use]
    pub fn rows(mut self, count: u32) -> Self {
        if let FieldKind::Textarea { rows } = &mut self.field.kind {
            *rows = Some(count);
        }
        self
    }

    /// Add a select option; ignored for other kinds
    #[must_use]
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        if let FieldKind::Select { options } = &mut self.field.kind {
            options.push(SelectOption::new(value, label));
        }
        self
    }

    /// Tick a checkbox; ignored for other kinds
    #[must_use]
    pub fn checked(mut self) -> Self {
        if let FieldKind::Checkbox { checked } = &mut self.field.kind {
            *checked = true;
        }
        self
    }

    /// Finish the field
    #[must_use]
    pub fn done(self) -> FormBuilder {
        self.form.add_field(self.field)
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_are_kept_in_order() {
        let builder = FormBuilder::new("post", FormOptions::default())
            .field("title", InputType::Text)
            .required()
            .done()
            .textarea("body")
            .rows(5)
            .done()
            .hidden("ref", "home");

        let names: Vec<_> = builder.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title", "body", "ref"]);
        assert!(builder.fields()[0].flags.required);
        assert_eq!(builder.fields()[1].kind, FieldKind::Textarea { rows: Some(5) });
    }

    #[test]
    fn test_same_name_replaces_field() {
        let builder = FormBuilder::new("f", FormOptions::default())
            .field("a", InputType::Text)
            .done()
            .field("a", InputType::Email)
            .done();
        assert_eq!(builder.fields().len(), 1);
        assert_eq!(builder.fields()[0].kind, FieldKind::Input(InputType::Email));
    }

    #[test]
    fn test_remove_field() {
        let builder = FormBuilder::new("f", FormOptions::default())
            .field("a", InputType::Text)
            .done()
            .remove("a");
        assert!(!builder.has("a"));
    }

    #[test]
    fn test_with_data_rejects_scalars() {
        let result = FormBuilder::new("f", FormOptions::default()).with_data(Some(json!(3)));
        assert!(matches!(result, Err(FormError::InvalidData(kind)) if kind == "a number"));

        let builder = FormBuilder::new("f", FormOptions::default())
            .with_data(None)
            .unwrap();
        assert!(builder.data().is_empty());
    }

    #[test]
    fn test_data_prefills_fields() {
        let form = FormBuilder::new("post", FormOptions::default())
            .with_data(Some(json!({"title": "From data", "published": true})))
            .unwrap()
            .field("title", InputType::Text)
            .value("From builder")
            .done()
            .checkbox("published")
            .done()
            .get_form();

        assert_eq!(form.field("title").unwrap().value.as_deref(), Some("From data"));
        assert_eq!(
            form.field("published").unwrap().kind,
            FieldKind::Checkbox { checked: true }
        );
    }

    #[test]
    fn test_form_attributes_are_rendered() {
        let html = FormBuilder::new("search", FormOptions::action("/search"))
            .attr("hx-post", "/search")
            .attr("data-role", "filter")
            .get_form()
            .render();

        assert!(html.contains("hx-post=\"/search\""));
        assert!(html.contains("data-role=\"filter\""));
    }

    #[test]
    fn test_options_builders() {
        let options = FormOptions::action("/posts")
            .method("PUT")
            .csrf_token("t")
            .submit_label("Save")
            .with("locale", "en");
        assert_eq!(options.method, "PUT");
        assert_eq!(options.extra.get_str("locale"), Some("en"));
    }
}
