use serde::{Deserialize, Serialize};

use super::super::domain::{EmailTemplate, TemplateId};

pub(crate) fn suggest(
    templates: &[EmailTemplate],
    total_score: i64,
    premium_threshold: i32,
) -> Option<&EmailTemplate> {
    let preferred = if total_score > i64::from(premium_threshold) {
        "premium"
    } else {
        "basic"
    };

    templates
        .iter()
        .find(|template| template.name.to_lowercase().contains(preferred))
        .or_else(|| templates.first())
}

/// Values substituted into `{{name}}`, `{{email}}` and `{{score}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub name: String,
    pub email: String,
    pub score: i64,
}

impl RenderContext {
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "score" => Some(self.score.to_string()),
            _ => None,
        }
    }
}

/// Template output ready to hand to the email sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub template_id: TemplateId,
    pub subject: String,
    pub body: String,
}

impl EmailTemplate {
    pub fn render(&self, context: &RenderContext) -> RenderedEmail {
        RenderedEmail {
            template_id: self.id.clone(),
            subject: substitute(&self.subject, context),
            body: substitute(&self.body, context),
        }
    }
}

fn substitute(source: &str, context: &RenderContext) -> String {
    let mut output = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };

        output.push_str(&rest[..start]);
        let key = after_open[..end].trim();
        match context.lookup(key) {
            Some(value) => output.push_str(&value),
            None => output.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    output.push_str(rest);
    output
}
