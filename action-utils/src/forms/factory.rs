//! Form types and the factory that builds them by name

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::builder::{FormBuilder, FormOptions};
use super::error::FormError;
use super::form::Form;

/// Name of the base type used by `create_form_builder`
pub const BASE_FORM_TYPE: &str = "form";

/// A reusable form definition
///
/// ```rust
/// use action_utils::forms::{FormBuilder, FormError, FormOptions, FormType, InputType};
///
/// struct PostType;
///
/// impl FormType for PostType {
///     fn name(&self) -> &str {
///         "post"
///     }
///
///     fn build_form(&self, builder: FormBuilder, _options: &FormOptions) -> Result<FormBuilder, FormError> {
///         Ok(builder
///             .field("title", InputType::Text).label("Title").required().done()
///             .textarea("body").label("Body").done())
///     }
/// }
/// ```
pub trait FormType: Send + Sync {
    /// Name the type is registered under, also used as the form name
    fn name(&self) -> &str;

    /// Adjust options before fields are built
    fn configure_options(&self, _options: &mut FormOptions) {}

    /// Add fields to the builder
    ///
    /// # Errors
    ///
    /// Implementations return [`FormError::Build`] when the options are unusable.
    fn build_form(
        &self,
        builder: FormBuilder,
        options: &FormOptions,
    ) -> Result<FormBuilder, FormError>;
}

/// The type behind `create_form_builder`: no fields of its own
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseFormType;

impl FormType for BaseFormType {
    fn name(&self) -> &str {
        BASE_FORM_TYPE
    }

    fn build_form(
        &self,
        builder: FormBuilder,
        _options: &FormOptions,
    ) -> Result<FormBuilder, FormError> {
        Ok(builder)
    }
}

/// Creates forms and form builders from registered types
#[cfg_attr(test, mockall::automock)]
pub trait FormFactory: Send + Sync {
    /// Form of `form_type`, named after the type
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownType`] for an unregistered type, or any
    /// error raised while building.
    fn create(
        &self,
        form_type: &str,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<Form, FormError> {
        self.create_builder(form_type, data, options)
            .map(FormBuilder::get_form)
    }

    /// Form of `form_type` with an explicit name
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    fn create_named(
        &self,
        name: &str,
        form_type: &str,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<Form, FormError>;

    /// Builder for `form_type`, with the type's fields already added
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    fn create_builder(
        &self,
        form_type: &str,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<FormBuilder, FormError>;
}

/// Form types keyed by name
///
/// The base [`BASE_FORM_TYPE`] is always present. Registering a type under
/// an existing name replaces it.
#[derive(Clone)]
pub struct FormRegistry {
    types: HashMap<String, Arc<dyn FormType>>,
}

impl std::fmt::Debug for FormRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.types.keys().collect();
        names.sort();
        f.debug_struct("FormRegistry").field("types", &names).finish()
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormRegistry {
    /// Registry holding only the base type
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };
        registry.register(BaseFormType);
        registry
    }

    /// Register a form type
    pub fn register<T: FormType + 'static>(&mut self, form_type: T) -> &mut Self {
        self.types
            .insert(form_type.name().to_string(), Arc::new(form_type));
        self
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with_type<T: FormType + 'static>(mut self, form_type: T) -> Self {
        self.register(form_type);
        self
    }

    /// Whether a type is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn build(
        &self,
        name: Option<&str>,
        form_type: &str,
        data: Option<Value>,
        mut options: FormOptions,
    ) -> Result<FormBuilder, FormError> {
        let definition = self
            .types
            .get(form_type)
            .ok_or_else(|| FormError::UnknownType(form_type.to_string()))?;

        definition.configure_options(&mut options);
        let builder = FormBuilder::new(name.unwrap_or(form_type), options.clone()).with_data(data)?;
        let builder = definition.build_form(builder, &options)?;

        tracing::debug!(form_type, fields = builder.fields().len(), "form built");
        Ok(builder)
    }
}

impl FormFactory for FormRegistry {
    fn create_named(
        &self,
        name: &str,
        form_type: &str,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<Form, FormError> {
        self.build(Some(name), form_type, data, options)
            .map(FormBuilder::get_form)
    }

    fn create_builder(
        &self,
        form_type: &str,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<FormBuilder, FormError> {
        self.build(None, form_type, data, options)
    }
}
