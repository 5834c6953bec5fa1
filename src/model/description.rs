//! Descripción inmutable de un paso interceptado.
//!
//! El título se resuelve con precedencia fija:
//! título explícito > short-name > identificador humanizado. Los argumentos
//! ya renderizados se interpolan en marcadores `{0}`, `{1}`, ... o se anexan
//! entre paréntesis si el título no declara marcadores.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Valor inmutable creado en el momento de la intercepción.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDescription {
    /// Identificador del tipo de librería de pasos propietaria.
    pub library: String,
    /// Identificador de la operación dentro de la librería.
    pub operation: String,
    /// Título legible ya resuelto (con argumentos interpolados).
    pub title: String,
    /// Argumentos renderizados de la invocación.
    pub arguments: Vec<Value>,
    /// `true` si el paso se compone de pasos anidados.
    pub group: bool,
}

impl StepDescription {
    pub fn new(library: impl Into<String>, operation: impl Into<String>) -> Self {
        let operation = operation.into();
        let title = humanize(&operation);
        Self { library: library.into(),
               operation,
               title,
               arguments: Vec::new(),
               group: false }
    }

    /// Resuelve el título con la precedencia título > short-name > humanizado
    /// e interpola los argumentos renderizados.
    pub fn resolved(library: impl Into<String>,
                    operation: impl Into<String>,
                    title: Option<&str>,
                    short_name: Option<&str>,
                    arguments: Vec<Value>,
                    group: bool)
                    -> Self {
        let operation = operation.into();
        let base = match (title, short_name) {
            (Some(t), _) => t.to_string(),
            (None, Some(s)) => s.to_string(),
            (None, None) => humanize(&operation),
        };
        Self { library: library.into(),
               title: render_title(&base, &arguments),
               operation,
               arguments,
               group }
    }

    pub fn as_group(mut self) -> Self {
        self.group = true;
        self
    }
}

/// Convierte `open_account` o `openAccount` en "Open account".
pub fn humanize(identifier: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in identifier.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(current.clone());
                current.clear();
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(current.clone());
            current.clear();
            current.push(c.to_ascii_lowercase());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    let mut out = words.join(" ");
    if let Some(first) = out.get(0..1) {
        let upper = first.to_uppercase();
        out.replace_range(0..1, &upper);
    }
    out
}

/// Interpola `{0}`, `{1}`, ... con los argumentos renderizados; si el título
/// no declara marcadores y hay argumentos, los anexa entre paréntesis.
fn render_title(base: &str, arguments: &[Value]) -> String {
    let mut title = base.to_string();
    let mut any_placeholder = false;
    for (i, arg) in arguments.iter().enumerate() {
        let marker = format!("{{{i}}}");
        if title.contains(&marker) {
            any_placeholder = true;
            title = title.replace(&marker, &render_value(arg));
        }
    }
    if !any_placeholder && !arguments.is_empty() {
        let rendered: Vec<String> = arguments.iter().map(render_value).collect();
        title.push_str(&format!(" ({})", rendered.join(", ")));
    }
    title
}

/// Render plano de un argumento: strings sin comillas, el resto JSON compacto.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn humanizes_snake_and_camel_case() {
        assert_eq!(humanize("open_account"), "Open account");
        assert_eq!(humanize("addToCart"), "Add to cart");
        assert_eq!(humanize("checkout"), "Checkout");
    }

    #[test]
    fn explicit_title_wins_over_short_name() {
        let d = StepDescription::resolved("Traveller", "book_flight",
                                          Some("Books a flight"), Some("book"),
                                          vec![], false);
        assert_eq!(d.title, "Books a flight");
    }

    #[test]
    fn short_name_wins_over_humanized_identifier() {
        let d = StepDescription::resolved("Traveller", "book_flight", None, Some("book"),
                                          vec![], false);
        assert_eq!(d.title, "book");
    }

    #[test]
    fn placeholders_are_interpolated() {
        let d = StepDescription::resolved("Shopper", "add_to_cart",
                                          Some("Add {0} to the cart"), None,
                                          vec![json!("apples")], false);
        assert_eq!(d.title, "Add apples to the cart");
    }

    #[test]
    fn arguments_without_placeholders_are_appended() {
        let d = StepDescription::resolved("Shopper", "add_to_cart", None, None,
                                          vec![json!("apples"), json!(3)], false);
        assert_eq!(d.title, "Add to cart (apples, 3)");
    }
}
