use askama::Template;

use crate::models::Cohort;
use crate::ui::{CohortView, PageView};

#[derive(Template)]
#[template(path = "panel.html")]
pub struct PanelTemplate<'a> {
    pub view: &'a PageView,
    pub sections: Vec<&'a CohortView>,
    pub theme: &'static str,
    pub theme_color: &'static str,
    pub theme_toggle_label: &'static str,
    /// Text offered to the clipboard on this render, empty for none.
    pub clipboard: String,
    pub has_clipboard: bool,
    pub invite_link: &'a str,
    pub invite_expires: &'a str,
    pub invite_text: String,
    pub has_invite_link: bool,
    pub version: &'static str,
}

impl<'a> PanelTemplate<'a> {
    pub fn new(view: &'a PageView, clipboard: Option<String>) -> Self {
        let invite_link = view.invite.link();
        PanelTemplate {
            view,
            sections: Cohort::ALL.iter().map(|c| view.cohort(*c)).collect(),
            theme: view.theme.as_str(),
            theme_color: view.theme.meta_color(),
            theme_toggle_label: view.theme.toggle_label(),
            has_clipboard: clipboard.is_some(),
            clipboard: clipboard.unwrap_or_default(),
            invite_link,
            invite_expires: view.invite.expires(),
            invite_text: view.invite.text(),
            has_invite_link: !invite_link.is_empty(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InviteResponse;
    use crate::models::Theme;
    use crate::ui::render_invite_result;

    #[test]
    fn renders_both_sections_and_theme() {
        let view = PageView::new(Theme::Dark);
        let html = PanelTemplate::new(&view, None).render().unwrap();
        assert!(html.contains(r#"data-theme="dark""#));
        assert!(html.contains(r#"id="guest-section""#));
        assert!(html.contains(r#"id="members-section""#));
        assert!(!html.contains("data-copy="));
    }

    #[test]
    fn invite_link_is_rendered_and_offered_to_clipboard() {
        let mut view = PageView::new(Theme::Light);
        render_invite_result(
            &mut view,
            &InviteResponse {
                invite_url: Some("https://id.example.test/if/flow/x/?itoken=abc".into()),
                pk: Some("abc".into()),
                expires_friendly: Some("Mon, Jan 05, 2026, 10:00 AM UTC".into()),
            },
        );
        let clipboard = view.clipboard.take();
        let html = PanelTemplate::new(&view, clipboard).render().unwrap();
        assert!(html.contains("itoken=abc"));
        assert!(html.contains("data-copy="));
        assert!(html.contains("expires Mon, Jan 05, 2026, 10:00 AM UTC"));
    }
}
