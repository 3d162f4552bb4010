use crate::{Config, Database};
use anyhow::Result;
use std::collections::HashMap;
use tera::{Tera, Value};

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub templates: Tera,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let mut templates = Tera::default();

        templates.register_filter("format_date", format_date_filter);
        templates.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html")),
            ("post_list.html", include_str!("../../templates/post_list.html")),
            ("post_detail.html", include_str!("../../templates/post_detail.html")),
            ("posts_by.html", include_str!("../../templates/posts_by.html")),
            ("404.html", include_str!("../../templates/404.html")),
        ])?;

        Ok(Self {
            config,
            db,
            templates,
        })
    }
}

fn format_date_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date requires a string"))?;

    let format = args
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("%B %d, %Y");

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date_str) {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    Ok(Value::String(date_str.to_string()))
}
