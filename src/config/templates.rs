//! HTML page templates for PDF transcripts.
//!
//! Templates can be customized by placing `lecture.html` and/or `plain.html`
//! in the configured template directory. Placeholders use `{{name}}` syntax.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// The two page layouts a transcript can be rendered with.
#[derive(Debug, Clone)]
pub struct Templates {
    /// Transcript preceded by a lecture metadata table.
    pub lecture: String,
    /// Transcript with only a title.
    pub plain: String,
}

const LECTURE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
  body { font-family: "DejaVu Sans", Arial, sans-serif; font-size: 11pt; line-height: 1.5; }
  h1 { font-size: 18pt; margin-bottom: 8pt; }
  table.meta { border-collapse: collapse; margin-bottom: 16pt; }
  table.meta th { text-align: left; padding: 2pt 12pt 2pt 0; vertical-align: top; }
  table.meta td { padding: 2pt 0; word-break: break-all; }
  .transcription p { margin: 0 0 4pt 0; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<table class="meta">
  <tr><th>Autor</th><td>{{author}}</td></tr>
  <tr><th>Beitragende</th><td>{{contributors}}</td></tr>
  <tr><th>Länge</th><td>{{duration}}</td></tr>
  <tr><th>Aufgezeichnet am</th><td>{{recorded_at}}</td></tr>
  <tr><th>Serie</th><td>{{series_title}}</td></tr>
  <tr><th>Link</th><td><a href="{{link}}">{{link}}</a></td></tr>
</table>
<div class="transcription">
{{transcription}}
</div>
</body>
</html>
"#;

const PLAIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
  body { font-family: "DejaVu Sans", Arial, sans-serif; font-size: 11pt; line-height: 1.5; }
  h1 { font-size: 18pt; margin-bottom: 16pt; }
  .transcription p { margin: 0 0 4pt 0; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<div class="transcription">
{{transcription}}
</div>
</body>
</html>
"#;

impl Default for Templates {
    fn default() -> Self {
        Self {
            lecture: LECTURE_TEMPLATE.to_string(),
            plain: PLAIN_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    /// Load the built-in templates, replacing each one found in `custom_dir`.
    pub fn load(custom_dir: Option<&Path>) -> crate::error::Result<Self> {
        let mut templates = Templates::default();

        if let Some(dir) = custom_dir {
            let lecture_path = dir.join("lecture.html");
            if lecture_path.exists() {
                templates.lecture = std::fs::read_to_string(&lecture_path)?;
            }

            let plain_path = dir.join("plain.html");
            if plain_path.exists() {
                templates.plain = std::fs::read_to_string(&plain_path)?;
            }
        }

        Ok(templates)
    }

    /// Render a template with the given variables.
    ///
    /// Values are inserted verbatim in a single pass, so placeholder syntax
    /// inside a value is never expanded. Unknown placeholders are kept as is.
    /// Callers escape values for HTML.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));
        re.replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_templates() {
        let templates = Templates::default();
        assert!(templates.lecture.contains("{{series_title}}"));
        assert!(templates.plain.contains("{{transcription}}"));
        assert!(!templates.plain.contains("{{author}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "<h1>{{title}}</h1><p>{{title}} by {{author}}</p>";
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "Lecture 1".to_string());
        vars.insert("author".to_string(), "Jane Doe".to_string());

        let result = Templates::render(template, &vars);
        assert_eq!(result, "<h1>Lecture 1</h1><p>Lecture 1 by Jane Doe</p>");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_in_values() {
        let template = "<title>{{title}}</title><a href=\"{{link}}\">{{link}}</a>{{body}}";
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "Lecture 1".to_string());
        vars.insert("link".to_string(), "https://tu/v.mp4".to_string());
        vars.insert("body".to_string(), "Syntax: {{title}} and {{link}}".to_string());

        // HashMap iteration order varies between runs
        for _ in 0..20 {
            let result = Templates::render(template, &vars);
            assert_eq!(
                result,
                "<title>Lecture 1</title><a href=\"https://tu/v.mp4\">https://tu/v.mp4</a>Syntax: {{title}} and {{link}}"
            );
        }
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let vars = HashMap::from([("title".to_string(), "Lecture 1".to_string())]);
        assert_eq!(Templates::render("{{title}} {{footer}}", &vars), "Lecture 1 {{footer}}");
    }

    #[test]
    fn test_load_custom_plain_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.html"), "<p>{{transcription}}</p>").unwrap();

        let templates = Templates::load(Some(dir.path())).unwrap();
        assert_eq!(templates.plain, "<p>{{transcription}}</p>");
        assert_eq!(templates.lecture, Templates::default().lecture);
    }
}
