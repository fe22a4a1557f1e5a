//! Form controls

use super::button::{self, ButtonOptions};
use super::{classes, escape};
use crate::domain::ValidationErrors;

const LABEL: &str = "block text-sm font-medium text-gray-700 mb-1";
const REQUIRED_MARK: &str = r#" <span class="text-error">*</span>"#;

const TEXT_BASE: &str = "w-full rounded-lg border px-3 py-2 text-gray-700 focus:outline-none focus:ring-2 focus:ring-primary focus:border-transparent";
const SOFT_BASE: &str = "w-full px-3 py-2 border rounded-lg text-gray-700 focus:outline-none focus:ring-2 focus:ring-primary/20 focus:border-primary";

/// Shared options of every control
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    pub label: Option<String>,
    pub placeholder: String,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
    pub helper_text: Option<String>,
    pub disabled: bool,
    pub extra_classes: String,
}

impl FieldOptions {
    pub fn labelled(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Picks up the first failure reported for `field`
    pub fn with_errors(mut self, errors: &ValidationErrors, field: &str) -> Self {
        self.error = errors.message_for(field).map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

fn control_id(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

fn label(id: &str, options: &FieldOptions) -> String {
    match options.label.as_deref() {
        None => String::new(),
        Some(text) => format!(
            r#"<label for="{}" class="{LABEL}">{}{}</label>"#,
            escape(id),
            escape(text),
            if options.required { REQUIRED_MARK } else { "" }
        ),
    }
}

fn footnote(options: &FieldOptions) -> String {
    if let Some(error) = &options.error {
        format!(r#"<p class="mt-1 text-sm text-error">{}</p>"#, escape(error))
    } else if let Some(help) = &options.helper_text {
        format!(r#"<p class="mt-1 text-sm text-gray-500">{}</p>"#, escape(help))
    } else {
        String::new()
    }
}

/// Boolean attributes, each with a leading space
fn flags(options: &FieldOptions) -> String {
    let mut out = String::new();
    if options.required {
        out.push_str(" required");
    }
    if options.disabled {
        out.push_str(" disabled");
    }
    out
}

/// Classes of text inputs and textareas
fn text_classes(options: &FieldOptions) -> String {
    classes([
        TEXT_BASE,
        if options.error.is_some() {
            "border-error focus:ring-error"
        } else {
            "border-gray-300"
        },
        if options.disabled {
            "bg-gray-100 cursor-not-allowed"
        } else {
            ""
        },
        options.extra_classes.as_str(),
    ])
}

/// Classes of password inputs and selects
fn soft_classes(options: &FieldOptions) -> String {
    let state = if options.error.is_some() {
        "border-error focus:border-error focus:ring-error/20"
    } else if options.disabled {
        "bg-gray-100 border-gray-300 text-gray-500 cursor-not-allowed"
    } else {
        "border-gray-300"
    };
    classes([SOFT_BASE, state, options.extra_classes.as_str()])
}

fn wrap(id: &str, options: &FieldOptions, control: String) -> String {
    format!(
        r#"<div class="mb-4">{}{control}{}</div>"#,
        label(id, options),
        footnote(options)
    )
}

pub fn text(name: &str, options: &FieldOptions) -> String {
    input("text", name, options)
}

/// Text-like input of another HTML type (`email`, `date`, `time`, `number`)
pub fn input(input_type: &str, name: &str, options: &FieldOptions) -> String {
    let id = control_id(name);
    let control = format!(
        r#"<input type="{}" id="{}" name="{}" placeholder="{}" value="{}" class="{}"{}>"#,
        escape(input_type),
        escape(&id),
        escape(name),
        escape(&options.placeholder),
        escape(&options.value),
        text_classes(options),
        flags(options)
    );
    wrap(&id, options, control)
}

/// Password input; `options.value` is never rendered
pub fn password(name: &str, options: &FieldOptions) -> String {
    let id = control_id(name);
    let control = format!(
        r#"<input type="password" id="{}" name="{}" placeholder="{}" class="{}"{}>"#,
        escape(&id),
        escape(name),
        escape(&options.placeholder),
        soft_classes(options),
        flags(options)
    );
    wrap(&id, options, control)
}

/// Dropdown; the option whose value equals `options.value` is selected
pub fn select(name: &str, choices: &[SelectOption], options: &FieldOptions) -> String {
    let id = control_id(name);
    let mut control = format!(
        r#"<select id="{}" name="{}" class="{}"{}>"#,
        escape(&id),
        escape(name),
        soft_classes(options),
        flags(options)
    );
    for choice in choices {
        control.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape(&choice.value),
            if choice.value == options.value {
                " selected"
            } else {
                ""
            },
            escape(&choice.text)
        ));
    }
    control.push_str("</select>");
    wrap(&id, options, control)
}

pub fn textarea(name: &str, rows: u32, options: &FieldOptions) -> String {
    let id = control_id(name);
    let control = format!(
        r#"<textarea id="{}" name="{}" placeholder="{}" rows="{rows}" class="{}"{}>{}</textarea>"#,
        escape(&id),
        escape(name),
        escape(&options.placeholder),
        text_classes(options),
        flags(options),
        escape(&options.value)
    );
    wrap(&id, options, control)
}

/// Form wrapper around pre-rendered `fields`, closed by a full-width submit button
pub fn form(action: &str, method: &str, fields: &[String], submit_text: &str) -> String {
    let method = if method.eq_ignore_ascii_case("get") {
        "get"
    } else {
        "post"
    };
    let submit = button::primary(
        submit_text,
        &ButtonOptions {
            full_width: true,
            ..ButtonOptions::submit()
        },
    );
    format!(
        r#"<form action="{}" method="{method}" class="space-y-4">{}{submit}</form>"#,
        escape(action),
        fields.concat()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_with_label_and_required_marker() {
        let html = text(
            "Full Name",
            &FieldOptions::labelled("Full name").required().value("Nadia"),
        );
        assert!(html.contains(r#"<label for="full_name" class="block text-sm font-medium text-gray-700 mb-1">Full name <span class="text-error">*</span></label>"#));
        assert!(html.contains(r#"name="Full Name""#));
        assert!(html.contains(r#"value="Nadia""#));
        assert!(html.contains("border-gray-300\" required>"));
    }

    #[test]
    fn test_error_replaces_helper_text() {
        let errors = ValidationErrors::single("gender", "This field is required");
        let options = FieldOptions {
            helper_text: Some("As on your NID".into()),
            ..FieldOptions::labelled("Gender")
        }
        .with_errors(&errors, "gender");
        let html = select(
            "gender",
            &[SelectOption::new("male", "Male"), SelectOption::new("female", "Female")],
            &options,
        );
        assert!(html.contains("border-error focus:border-error focus:ring-error/20"));
        assert!(html.contains(r#"<p class="mt-1 text-sm text-error">This field is required</p>"#));
        assert!(!html.contains("As on your NID"));
    }

    #[test]
    fn test_select_marks_current_value() {
        let html = select(
            "severity",
            &[SelectOption::new("Mild", "Mild"), SelectOption::new("Severe", "Severe")],
            &FieldOptions::default().value("Severe"),
        );
        assert!(html.contains(r#"<option value="Severe" selected>Severe</option>"#));
        assert!(html.contains(r#"<option value="Mild">Mild</option>"#));
    }

    #[test]
    fn test_password_never_echoes_value() {
        let html = password("password", &FieldOptions::default().value("hunter22"));
        assert!(!html.contains("hunter22"));
    }

    #[test]
    fn test_disabled_textarea_escapes_value() {
        let options = FieldOptions {
            disabled: true,
            ..FieldOptions::default().value("<script>")
        };
        let html = textarea("note_text", 6, &options);
        assert!(html.contains("bg-gray-100 cursor-not-allowed"));
        assert!(html.contains(r#"rows="6""#));
        assert!(html.contains(" disabled>&lt;script&gt;</textarea>"));
    }

    #[test]
    fn test_form_wrapper() {
        let html = form("/login", "POST", &[text("username", &FieldOptions::default())], "Sign in");
        assert!(html.starts_with(r#"<form action="/login" method="post" class="space-y-4">"#));
        assert!(html.contains(r#"<button type="submit""#));
        assert!(html.ends_with("Sign in</button></form>"));
    }
}
