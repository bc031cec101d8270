//! Built forms: submission binding and validation state

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::builder::FormOptions;
use super::error::{FormError, ValidationErrors};
use super::field::FormField;
use super::render::{FormRenderOptions, FormRenderer};

/// Message recorded when a required field is blank
pub const REQUIRED_MESSAGE: &str = "This value should not be blank.";

/// A form ready to render or to receive a submission
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    options: FormOptions,
    fields: Vec<FormField>,
    data: Map<String, Value>,
    submitted: bool,
    errors: ValidationErrors,
}

impl Form {
    pub(crate) fn new(
        name: String,
        options: FormOptions,
        fields: Vec<FormField>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            name,
            options,
            fields,
            data,
            submitted: false,
            errors: ValidationErrors::new(),
        }
    }

    /// Form name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options the form was built with
    #[must_use]
    pub const fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Fields in render order
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Current data: the initial data with any submitted values bound over it
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Deserialize the current data
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Deserialize`] if the data does not fit `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, FormError> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }

    /// Bind submitted values
    ///
    /// Every field takes its submitted value, or none when absent, so an
    /// unticked checkbox binds `false`. Keys without a field are ignored.
    /// Required fields left blank record [`REQUIRED_MESSAGE`].
    pub fn submit<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let submitted: HashMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        self.errors.clear();
        for field in &mut self.fields {
            if field.flags.disabled {
                continue;
            }
            let value = field.bind(submitted.get(&field.name).map(String::as_str));
            self.data.insert(field.name.clone(), value);
            if field.flags.required && field.is_blank() {
                self.errors
                    .add_with_code(field.name.clone(), REQUIRED_MESSAGE, "required");
            }
        }
        self.submitted = true;

        tracing::debug!(
            form = %self.name,
            errors = self.errors.count(),
            "form submitted"
        );
    }

    /// Whether [`submit`](Self::submit) has been called
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Submitted with no validation errors
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.submitted && !self.errors.has_errors()
    }

    /// Validation errors from the last submission
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Add an application-level error, e.g. a uniqueness check
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Render with default options
    #[must_use]
    pub fn render(&self) -> String {
        FormRenderer::render(self)
    }

    /// Render with custom CSS classes
    #[must_use]
    pub fn render_with_options(&self, options: &FormRenderOptions) -> String {
        FormRenderer::render_with_options(self, options)
    }
}
