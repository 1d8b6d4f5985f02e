//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary; the renderer is built once at
//! startup and shared through `AppState`.

use tera::{Context, Tera};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("_property_card.html", include_str!("../templates/_property_card.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("property_list.html", include_str!("../templates/property_list.html")),
    ("property_detail.html", include_str!("../templates/property_detail.html")),
    ("blog_list.html", include_str!("../templates/blog_list.html")),
    ("blog_post.html", include_str!("../templates/blog_post.html")),
    ("legal.html", include_str!("../templates/legal.html")),
    ("plans.html", include_str!("../templates/plans.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
];

pub struct PageRenderer {
    tera: Tera,
    site_name: String,
}

impl PageRenderer {
    pub fn new(site_name: impl Into<String>) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self {
            tera,
            site_name: site_name.into(),
        })
    }

    /// Render `name` with `context` plus the site-wide variables.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("site_name", &self.site_name);
        ctx.extend(context.clone());
        self.tera.render(name, &ctx)
    }
}
