//! HTML rendering for forms

use std::fmt::Write;

use super::error::FieldError;
use super::field::{FieldKind, FormField, SelectOption};
use super::form::Form;

/// CSS classes used when rendering
#[derive(Debug, Clone)]
pub struct FormRenderOptions {
    /// Wrapper around label, input and messages
    pub group_class: String,
    /// Labels
    pub label_class: String,
    /// Input elements
    pub input_class: String,
    /// Error messages
    pub error_class: String,
    /// Help text
    pub help_class: String,
    /// Submit button
    pub submit_class: String,
    /// Added to inputs that have errors
    pub input_error_class: String,
}

impl Default for FormRenderOptions {
    fn default() -> Self {
        Self {
            group_class: "form-group".into(),
            label_class: "form-label".into(),
            input_class: "form-input".into(),
            error_class: "form-error".into(),
            help_class: "form-help".into(),
            submit_class: "form-submit".into(),
            input_error_class: "form-input-error".into(),
        }
    }
}

/// Renders forms to HTML
pub struct FormRenderer;

impl FormRenderer {
    /// Render with default classes
    #[must_use]
    pub fn render(form: &Form) -> String {
        Self::render_with_options(form, &FormRenderOptions::default())
    }

    /// Render with custom classes
    #[must_use]
    pub fn render_with_options(form: &Form, options: &FormRenderOptions) -> String {
        let settings = form.options();
        let mut html = String::with_capacity(1024);

        html.push_str("<form");
        Self::write_attr(&mut html, "name", form.name());
        Self::write_attr(&mut html, "action", &settings.action);
        Self::write_attr(&mut html, "method", &settings.method);
        if let Some(id) = &settings.id {
            Self::write_attr(&mut html, "id", id);
        }
        if let Some(class) = &settings.class {
            Self::write_attr(&mut html, "class", class);
        }
        for (name, value) in &settings.attrs {
            Self::write_attr(&mut html, name, value);
        }
        html.push_str(">\n");

        if let Some(token) = &settings.csrf_token {
            let _ = writeln!(
                html,
                r#"  <input type="hidden" name="_csrf_token" value="{}">"#,
                Self::escape_attr(token)
            );
        }

        for field in form.fields() {
            Self::render_field(&mut html, field, form.errors().for_field(&field.name), options);
        }

        if let Some(label) = &settings.submit_label {
            let _ = writeln!(
                html,
                r#"  <button type="submit" class="{}">{}</button>"#,
                Self::escape_attr(&options.submit_class),
                Self::escape_html(label)
            );
        }

        html.push_str("</form>");
        html
    }

    fn render_field(
        html: &mut String,
        field: &FormField,
        errors: &[FieldError],
        options: &FormRenderOptions,
    ) {
        if field.is_hidden() {
            html.push_str("  ");
            Self::render_input(html, field, "hidden", false, options);
            return;
        }

        let has_errors = !errors.is_empty();
        let _ = writeln!(html, r#"  <div class="{}">"#, Self::escape_attr(&options.group_class));

        let is_checkbox = matches!(field.kind, FieldKind::Checkbox { .. });
        if !is_checkbox {
            Self::render_label(html, field, options);
        }

        html.push_str("    ");
        match &field.kind {
            FieldKind::Input(input_type) => {
                Self::render_input(html, field, input_type.as_str(), has_errors, options);
            }
            FieldKind::Textarea { rows } => {
                Self::render_textarea(html, field, *rows, has_errors, options);
            }
            FieldKind::Select { options: choices } => {
                Self::render_select(html, field, choices, has_errors, options);
            }
            FieldKind::Checkbox { checked } => {
                Self::render_checkbox(html, field, *checked, has_errors, options);
                Self::render_label(html, field, options);
            }
        }

        for error in errors {
            let _ = writeln!(
                html,
                r#"    <span class="{}">{}</span>"#,
                Self::escape_attr(&options.error_class),
                Self::escape_html(&error.message)
            );
        }
        if let Some(help) = &field.help_text {
            let _ = writeln!(
                html,
                r#"    <span class="{}">{}</span>"#,
                Self::escape_attr(&options.help_class),
                Self::escape_html(help)
            );
        }

        html.push_str("  </div>\n");
    }

    fn render_label(html: &mut String, field: &FormField, options: &FormRenderOptions) {
        if let Some(label) = &field.label {
            let _ = writeln!(
                html,
                r#"    <label for="{}" class="{}">{}</label>"#,
                Self::escape_attr(field.effective_id()),
                Self::escape_attr(&options.label_class),
                Self::escape_html(label)
            );
        }
    }

    fn open_element(
        html: &mut String,
        tag: &str,
        field: &FormField,
        has_errors: bool,
        options: &FormRenderOptions,
    ) {
        html.push('<');
        html.push_str(tag);
        Self::write_attr(html, "name", &field.name);
        Self::write_attr(html, "id", field.effective_id());
        let class = Self::build_input_class(field, has_errors, options);
        if !class.is_empty() {
            Self::write_attr(html, "class", &class);
        }
    }

    fn write_flags(html: &mut String, field: &FormField) {
        if field.flags.required {
            html.push_str(" required");
        }
        if field.flags.disabled {
            html.push_str(" disabled");
        }
        if field.flags.readonly {
            html.push_str(" readonly");
        }
        for (name, value) in &field.attrs {
            Self::write_attr(html, name, value);
        }
    }

    fn render_input(
        html: &mut String,
        field: &FormField,
        input_type: &str,
        has_errors: bool,
        options: &FormRenderOptions,
    ) {
        html.push_str("<input");
        Self::write_attr(html, "type", input_type);
        Self::write_attr(html, "name", &field.name);
        Self::write_attr(html, "id", field.effective_id());
        if !field.is_hidden() {
            let class = Self::build_input_class(field, has_errors, options);
            Self::write_attr(html, "class", &class);
        }
        if let Some(value) = &field.value {
            Self::write_attr(html, "value", value);
        }
        if let Some(placeholder) = &field.placeholder {
            Self::write_attr(html, "placeholder", placeholder);
        }
        Self::write_flags(html, field);
        html.push_str(">\n");
    }

    fn render_textarea(
        html: &mut String,
        field: &FormField,
        rows: Option<u32>,
        has_errors: bool,
        options: &FormRenderOptions,
    ) {
        Self::open_element(html, "textarea", field, has_errors, options);
        if let Some(placeholder) = &field.placeholder {
            Self::write_attr(html, "placeholder", placeholder);
        }
        if let Some(rows) = rows {
            Self::write_attr(html, "rows", &rows.to_string());
        }
        Self::write_flags(html, field);
        html.push('>');
        if let Some(value) = &field.value {
            html.push_str(&Self::escape_html(value));
        }
        html.push_str("</textarea>\n");
    }

    fn render_select(
        html: &mut String,
        field: &FormField,
        choices: &[SelectOption],
        has_errors: bool,
        options: &FormRenderOptions,
    ) {
        Self::open_element(html, "select", field, has_errors, options);
        Self::write_flags(html, field);
        html.push_str(">\n");
        for choice in choices {
            html.push_str("      <option");
            Self::write_attr(html, "value", &choice.value);
            if field.value.as_ref() == Some(&choice.value) {
                html.push_str(" selected");
            }
            html.push('>');
            html.push_str(&Self::escape_html(&choice.label));
            html.push_str("</option>\n");
        }
        html.push_str("    </select>\n");
    }

    fn render_checkbox(
        html: &mut String,
        field: &FormField,
        checked: bool,
        has_errors: bool,
        options: &FormRenderOptions,
    ) {
        html.push_str("<input");
        Self::write_attr(html, "type", "checkbox");
        Self::write_attr(html, "name", &field.name);
        Self::write_attr(html, "id", field.effective_id());
        Self::write_attr(html, "class", &Self::build_input_class(field, has_errors, options));
        Self::write_attr(html, "value", "1");
        if checked {
            html.push_str(" checked");
        }
        Self::write_flags(html, field);
        html.push_str(">\n");
    }

    fn build_input_class(field: &FormField, has_errors: bool, options: &FormRenderOptions) -> String {
        let mut classes = vec![field.class.as_deref().unwrap_or(&options.input_class)];
        if has_errors {
            classes.push(&options.input_error_class);
        }
        classes.retain(|c| !c.is_empty());
        classes.join(" ")
    }

    fn write_attr(html: &mut String, name: &str, value: &str) {
        html.push(' ');
        html.push_str(name);
        html.push_str("=\"");
        html.push_str(&Self::escape_attr(value));
        html.push('"');
    }

    fn escape_attr(s: &str) -> String {
        Self::escape_html(s).replace('"', "&quot;")
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }
}
