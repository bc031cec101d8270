//! Form building, submission binding and rendering
//!
//! Forms are described by a [`FormType`] and created through a
//! [`FormFactory`]. The bundled [`FormRegistry`] keeps types by name and
//! always includes the base `"form"` type, which is what
//! `create_form_builder` starts from.
//!
//! # Quick Start
//!
//! ```rust
//! use action_utils::forms::{FormFactory, FormOptions, FormRegistry, InputType};
//!
//! # fn example() -> Result<(), action_utils::forms::FormError> {
//! let forms = FormRegistry::new();
//!
//! let mut form = forms
//!     .create_builder("form", None, FormOptions::action("/search").method("GET"))?
//!     .field("q", InputType::Search)
//!         .label("Search")
//!         .required()
//!         .done()
//!     .submit("Go")
//!     .get_form();
//!
//! form.submit([("q", "axum")]);
//! assert!(form.is_valid());
//! assert_eq!(form.data()["q"], "axum");
//! # Ok(())
//! # }
//! ```
//!
//! Validation is limited to the `required` flag; application checks can
//! add their own messages with [`Form::add_error`].

mod builder;
mod error;
mod factory;
mod field;
mod form;
mod render;

pub use builder::{FieldBuilder, FormBuilder, FormOptions};
pub use error::{FieldError, FormError, ValidationErrors};
pub use factory::{BaseFormType, FormFactory, FormRegistry, FormType, BASE_FORM_TYPE};
pub use field::{FieldFlags, FieldKind, FormField, InputType, SelectOption};
pub use form::{Form, REQUIRED_MESSAGE};
pub use render::{FormRenderOptions, FormRenderer};

#[cfg(test)]
pub use factory::MockFormFactory;
