use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-z_][a-z0-9_]*)(?:=([^>]*))?>").expect("valid variable regex"));

/// A placeholder found in a template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateVariable {
    pub name: String,
    pub default: Option<String>,
}

/// Parse variables from a template in format <param> or <param=default>.
/// Each name is reported once, keeping the first default seen.
pub fn parse_template_variables(template: &str) -> Vec<TemplateVariable> {
    let mut variables: Vec<TemplateVariable> = Vec::new();

    for cap in VARIABLE.captures_iter(template) {
        let name = cap[1].to_string();
        if variables.iter().any(|v| v.name == name) {
            continue;
        }
        let default = cap.get(2).map(|m| m.as_str().to_string());
        variables.push(TemplateVariable { name, default });
    }

    variables
}

/// Replace variables with provided values.
/// Blank values fall back to the default, then to an empty string.
pub fn replace_template_variables(template: &str, values: &HashMap<String, String>) -> String {
    VARIABLE
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match values.get(name).map(|v| v.trim()) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => caps.get(2).map(|d| d.as_str().to_string()).unwrap_or_default(),
            }
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables() {
        let vars = parse_template_variables("You are <role=a senior engineer>. <task> for <role>.");
        assert_eq!(
            vars,
            vec![
                TemplateVariable { name: "role".into(), default: Some("a senior engineer".into()) },
                TemplateVariable { name: "task".into(), default: None },
            ]
        );
    }

    #[test]
    fn test_html_is_not_a_variable() {
        assert!(parse_template_variables("Wrap it in <Div> or </p>").is_empty());
    }

    #[test]
    fn test_replace_variables() {
        let mut values = HashMap::new();
        values.insert("task".to_string(), "Review this diff".to_string());
        values.insert("role".to_string(), "   ".to_string());

        let rendered = replace_template_variables("As <role=an expert>: <task>. <extra>", &values);
        assert_eq!(rendered, "As an expert: Review this diff. ");
    }
}
