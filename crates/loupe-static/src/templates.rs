//! HTML snapshot pages for inspecting a page's final state.

use minijinja::{context, Environment};

/// Everything a snapshot page shows.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Snapshot {
    /// Page title
    pub title: String,
    /// Whether the run passed its expectations
    pub passed: bool,
    /// Overlay stylesheet, inlined
    pub css: String,
    /// Serialized `<body>` content
    pub body: String,
    /// One line per trace entry
    pub trace: Vec<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a template engine with the built-in templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template_owned("snapshot.html".to_string(), SNAPSHOT_TEMPLATE.to_string())?;

        Ok(Self { env })
    }

    /// Render a snapshot page.
    pub fn render_snapshot(&self, snapshot: &Snapshot) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("snapshot.html")?;

        tracing::debug!("Rendering snapshot '{}'", snapshot.title);

        tmpl.render(context! {
            title => &snapshot.title,
            passed => snapshot.passed,
            css => &snapshot.css,
            body => &snapshot.body,
            trace => &snapshot.trace,
        })
    }
}

const SNAPSHOT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - loupe snapshot</title>
  <style>{{ css | safe }}</style>
</head>
<body>
  {{ body | safe }}
  <details class="loupe-trace" data-passed="{{ passed }}">
    <summary>{{ title }}: {% if passed %}passed{% else %}failed{% endif %}</summary>
    <ol>
    {% for line in trace %}
      <li>{{ line }}</li>
    {% endfor %}
    </ol>
  </details>
</body>
</html>"##;
