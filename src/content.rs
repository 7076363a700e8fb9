use serde::{Deserialize, Serialize};

/// A LinkedIn post with a title, body text and hashtags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInPost {
    pub title: String,
    pub body: String,
    pub hashtags: Vec<String>,
}

/// A short post for X (Twitter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XPost {
    pub body: String,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogArticle {
    pub title: String,
    pub body: String,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInPoll {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselSlide {
    pub title: String,
    pub content: String,
}

/// A slide-deck style carousel presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carousel {
    pub title: String,
    pub slides: Vec<CarouselSlide>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSource {
    pub title: String,
    pub uri: String,
}

/// A search-grounded research report with cited sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub title: String,
    pub report: String,
    pub sources: Vec<ReportSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastScript {
    pub title: String,
    pub script: String,
}

/// One entry of a 7-day content plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSuggestion {
    pub day: String,
    pub topic: String,
}

/// Everything generated for one topic. The core generation call always fills
/// the LinkedIn post, the X post and the image prompt; the remaining kinds are
/// generated on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBundle {
    pub linkedin_post: LinkedInPost,
    pub x_post: XPost,
    pub image_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podcast_script: Option<PodcastScript>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_article: Option<BlogArticle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_poll: Option<LinkedInPoll>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carousel: Option<Carousel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_report: Option<ResearchReport>,
}

/// Discriminant for the content kinds a bundle can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ContentKind {
    Linkedin,
    X,
    Blog,
    Poll,
    Carousel,
    Report,
    Podcast,
}

impl ContentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Linkedin => "LinkedIn post",
            ContentKind::X => "X post",
            ContentKind::Blog => "Blog article",
            ContentKind::Poll => "LinkedIn poll",
            ContentKind::Carousel => "Carousel",
            ContentKind::Report => "Research report",
            ContentKind::Podcast => "Podcast script",
        }
    }
}

/// Target platform for a scheduled post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Platform {
    #[serde(rename = "LinkedIn")]
    Linkedin,
    X,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linkedin => write!(f, "LinkedIn"),
            Platform::X => write!(f, "X"),
        }
    }
}

/// The post content captured at scheduling time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScheduledContent {
    LinkedIn(LinkedInPost),
    X(XPost),
}

impl ScheduledContent {
    pub fn body(&self) -> &str {
        match self {
            ScheduledContent::LinkedIn(p) => &p.body,
            ScheduledContent::X(p) => &p.body,
        }
    }
}
