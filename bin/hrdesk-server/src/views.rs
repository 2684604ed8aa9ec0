//! HTML templates, compiled into the binary.

use axum::response::Html;
use minijinja::{Environment, Value, context};
use serde::Serialize;

use crate::entities::User;
use crate::error::ServerError;

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("document_list.html", include_str!("../templates/document_list.html")),
    ("upload_document.html", include_str!("../templates/upload_document.html")),
    ("delete_document.html", include_str!("../templates/delete_document.html")),
];

/// Build the template environment. `.html` templates are auto-escaped.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

pub fn render<S: Serialize>(
    env: &Environment<'static>,
    name: &str,
    ctx: S,
) -> Result<Html<String>, ServerError> {
    Ok(Html(env.get_template(name)?.render(ctx)?))
}

/// The `user` variable the navigation bar reads.
pub fn user_context(user: &User) -> Value {
    context! {
        username => &user.username,
        is_admin => user.is_admin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_compile() {
        let env = environment().expect("templates compile");
        for (name, _) in TEMPLATES {
            assert!(env.get_template(name).is_ok(), "{name} missing");
        }
    }

    #[test]
    fn user_content_is_escaped() {
        let env = environment().unwrap();
        let Html(page) = render(
            &env,
            "home.html",
            context! {
                user => context! { username => "alice", is_admin => false },
                messages => vec![context! {
                    message_type => "user",
                    content => "<script>alert(1)</script>",
                    timestamp => "09:30",
                }],
            },
        )
        .unwrap();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert(1)</script>"));
    }
}
