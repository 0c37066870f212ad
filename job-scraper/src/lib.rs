pub mod ibps;

use serde::Serialize;

/// One recruitment notice as found on a listing page.
///
/// Built once through [`JobRecord::new`] and never mutated afterwards.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    title: String,
    location: Option<String>,
    post_date: Option<String>,
    /// absolute url of the notice, used to recognize duplicates
    link: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl JobRecord {
    /// Returns `None` when `title` or `link` is blank, those postings carry no usable data.
    pub fn new(
        title: impl Into<String>,
        location: Option<String>,
        post_date: Option<String>,
        link: impl Into<String>,
    ) -> Option<Self> {
        let title = non_blank(Some(title.into()))?;
        let link = non_blank(Some(link.into()))?;
        Some(Self {
            title,
            location: non_blank(location),
            post_date: non_blank(post_date),
            link,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn post_date(&self) -> Option<&str> {
        self.post_date.as_deref()
    }

    pub fn link(&self) -> &str {
        &self.link
    }
}
