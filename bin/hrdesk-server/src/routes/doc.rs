use crate::routes::{chat, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "hrdesk-server",
    description = "HR policy assistant API. HTML pages are not listed.",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(chat::ChatApi::openapi());
    root.merge(health::HealthApi::openapi());
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_endpoints_are_documented() {
        let docs = get_docs();
        for path in ["/chat/", "/chat/history/", "/health"] {
            assert!(docs.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
