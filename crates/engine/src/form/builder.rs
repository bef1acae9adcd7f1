//! Schema properties to form field entries.

use actrun_types::{BOOLEAN_FALSE, BOOLEAN_TRUE, FieldKind, FormField, InputSchema, PropertySchema};
use indexmap::IndexMap;
use serde_json::Value;

/// Build one field entry per schema property, in declared order.
///
/// Object properties that declare nested `properties` are flattened into
/// dotted entries (`parent.child`); the first entry of such a group carries
/// the group title. Every other property, including objects without nested
/// properties, yields exactly one entry.
pub fn build_form_fields(schema: &InputSchema) -> Vec<FormField> {
    let mut fields = Vec::with_capacity(schema.properties.len());
    collect_fields(&mut fields, None, &schema.properties, &schema.required, None);
    fields
}

fn collect_fields(
    fields: &mut Vec<FormField>,
    prefix: Option<&str>,
    properties: &IndexMap<String, PropertySchema>,
    required: &[String],
    group_title: Option<String>,
) {
    let mut pending_title = group_title;
    for (name, property) in properties {
        let full_name = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };
        let kind = FieldKind::from_property(property);

        if kind == FieldKind::Object && !property.properties.is_empty() {
            let inner_title = property.title.clone().unwrap_or_else(|| name.clone());
            let title = match pending_title.take() {
                Some(outer) => format!("{outer} / {inner_title}"),
                None => inner_title,
            };
            collect_fields(fields, Some(&full_name), &property.properties, &property.required, Some(title));
            continue;
        }

        fields.push(FormField {
            name: full_name,
            title: pending_title.take(),
            required: required.iter().any(|candidate| candidate == name),
            value: initial_value(kind, property),
            kind,
            options: enum_options(kind, property),
            property: property.clone(),
        });
    }
}

fn initial_value(kind: FieldKind, property: &PropertySchema) -> String {
    if kind == FieldKind::Boolean {
        let checked = match &property.default {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
            _ => false,
        };
        return if checked { BOOLEAN_TRUE } else { BOOLEAN_FALSE }.to_string();
    }

    match &property.default {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(structured @ (Value::Array(_) | Value::Object(_))) => {
            serde_json::to_string_pretty(structured).unwrap_or_else(|_| structured.to_string())
        }
        Some(scalar) => scalar.to_string(),
    }
}

fn enum_options(kind: FieldKind, property: &PropertySchema) -> Vec<String> {
    if kind != FieldKind::Enum {
        return Vec::new();
    }
    property.enum_values.iter().map(option_label).collect()
}

fn option_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
