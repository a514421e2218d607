use std::fmt::{self, Display};

use handlebars::Handlebars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Detail,
    NotFound,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Detail => "detail",
            Self::NotFound => "not-found",
        }
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

pub fn new() -> Handlebars<'static> {
    let mut tt = Handlebars::new();

    for (template, source) in [
        (Template::Index, include_str!("template/index.hbs")),
        (Template::Detail, include_str!("template/detail.hbs")),
        (Template::NotFound, include_str!("template/not-found.hbs")),
    ] {
        tt.register_template_string(template.as_str(), source)
            .unwrap();
    }

    tt.register_partial("stars", include_str!("template/stars.hbs"))
        .unwrap();

    tt
}
