//! Rendering of a content bundle: terminal cards for stdout, a standalone
//! HTML page for export, and the plain-text form used for clipboard copies.

use crate::content::{ContentBundle, ContentKind};
use crate::markup::{normalize_plain_text, text_to_html};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn hashtag_line(tags: &[String]) -> String {
    tags.join(" ")
}

fn push_card(out: &mut String, heading: &str, body: &str) {
    out.push_str("== ");
    out.push_str(heading);
    out.push_str(" ==\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
}

/// Render every present part of a bundle as terminal text.
pub fn bundle_to_text(bundle: &ContentBundle) -> String {
    let mut out = String::new();

    let li = &bundle.linkedin_post;
    push_card(
        &mut out,
        &format!("LinkedIn: {}", li.title),
        &format!("{}\n{}", normalize_plain_text(&li.body), hashtag_line(&li.hashtags)),
    );

    let x = &bundle.x_post;
    push_card(
        &mut out,
        "X",
        &format!("{}\n{}", normalize_plain_text(&x.body), hashtag_line(&x.hashtags)),
    );

    push_card(&mut out, "Image prompt", &bundle.image_prompt);

    if let Some(blog) = &bundle.blog_article {
        push_card(
            &mut out,
            &format!("Blog: {}", blog.title),
            &format!("{}\n{}", normalize_plain_text(&blog.body), hashtag_line(&blog.hashtags)),
        );
    }
    if let Some(poll) = &bundle.linkedin_poll {
        let mut body = poll.question.clone();
        for (i, option) in poll.options.iter().enumerate() {
            body.push_str(&format!("\n  {}) {option}", i + 1));
        }
        push_card(&mut out, "Poll", &body);
    }
    if let Some(carousel) = &bundle.carousel {
        let mut body = String::new();
        for (i, slide) in carousel.slides.iter().enumerate() {
            body.push_str(&format!(
                "Slide {}: {}\n{}\n",
                i + 1,
                slide.title,
                normalize_plain_text(&slide.content)
            ));
        }
        push_card(&mut out, &format!("Carousel: {}", carousel.title), &body);
    }
    if let Some(report) = &bundle.research_report {
        let mut body = normalize_plain_text(&report.report);
        if !report.sources.is_empty() {
            body.push_str("\nSources:");
            for source in &report.sources {
                body.push_str(&format!("\n  - {} <{}>", source.title, source.uri));
            }
        }
        push_card(&mut out, &format!("Report: {}", report.title), &body);
    }
    if let Some(script) = &bundle.podcast_script {
        push_card(
            &mut out,
            &format!("Podcast: {}", script.title),
            &normalize_plain_text(&script.script),
        );
    }

    out
}

/// Render a bundle as a standalone HTML document, running every body through
/// the markup converter.
pub fn bundle_to_html(topic: &str, bundle: &ContentBundle) -> String {
    let mut sections = String::new();

    let li = &bundle.linkedin_post;
    sections.push_str(&format!(
        "<section><h2>LinkedIn: {}</h2>{}<p class=\"hashtags\">{}</p></section>\n",
        li.title,
        text_to_html(&li.body),
        hashtag_line(&li.hashtags)
    ));

    let x = &bundle.x_post;
    sections.push_str(&format!(
        "<section><h2>X</h2>{}<p class=\"hashtags\">{}</p></section>\n",
        text_to_html(&x.body),
        hashtag_line(&x.hashtags)
    ));

    sections.push_str(&format!(
        "<section><h2>Image prompt</h2><p>{}</p></section>\n",
        bundle.image_prompt
    ));

    if let Some(blog) = &bundle.blog_article {
        sections.push_str(&format!(
            "<section><h2>{}</h2>{}<p class=\"hashtags\">{}</p></section>\n",
            blog.title,
            text_to_html(&blog.body),
            hashtag_line(&blog.hashtags)
        ));
    }
    if let Some(poll) = &bundle.linkedin_poll {
        let options: String = poll
            .options
            .iter()
            .map(|o| format!("<li>{o}</li>"))
            .collect();
        sections.push_str(&format!(
            "<section><h2>Poll</h2><p>{}</p><ul>{options}</ul></section>\n",
            poll.question
        ));
    }
    if let Some(carousel) = &bundle.carousel {
        let slides: String = carousel
            .slides
            .iter()
            .map(|s| format!("<article><h3>{}</h3>{}</article>", s.title, text_to_html(&s.content)))
            .collect();
        sections.push_str(&format!(
            "<section><h2>{}</h2>{slides}</section>\n",
            carousel.title
        ));
    }
    if let Some(report) = &bundle.research_report {
        let sources: String = report
            .sources
            .iter()
            .map(|s| format!("<li><a href=\"{}\">{}</a></li>", s.uri, s.title))
            .collect();
        sections.push_str(&format!(
            "<section><h2>{}</h2>{}<ul class=\"sources\">{sources}</ul></section>\n",
            report.title,
            text_to_html(&report.report)
        ));
    }
    if let Some(script) = &bundle.podcast_script {
        sections.push_str(&format!(
            "<section><h2>Podcast: {}</h2>{}</section>\n",
            script.title,
            text_to_html(&script.script)
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{topic}</title>\n</head>\n<body>\n<h1>{topic}</h1>\n{sections}</body>\n</html>\n"
    )
}

/// Plain-text form of one part of a bundle, for the clipboard.
pub fn part_plain_text(bundle: &ContentBundle, kind: ContentKind) -> Result<String, BoxError> {
    let text = match kind {
        ContentKind::Linkedin => {
            let p = &bundle.linkedin_post;
            format!(
                "{}\n\n{}\n\n{}",
                p.title,
                normalize_plain_text(&p.body),
                hashtag_line(&p.hashtags)
            )
        }
        ContentKind::X => {
            let p = &bundle.x_post;
            format!("{}\n\n{}", normalize_plain_text(&p.body), hashtag_line(&p.hashtags))
        }
        ContentKind::Blog => {
            let p = bundle
                .blog_article
                .as_ref()
                .ok_or("no blog article in this bundle")?;
            format!(
                "{}\n\n{}\n\n{}",
                p.title,
                normalize_plain_text(&p.body),
                hashtag_line(&p.hashtags)
            )
        }
        ContentKind::Poll => {
            let p = bundle
                .linkedin_poll
                .as_ref()
                .ok_or("no LinkedIn poll in this bundle")?;
            let mut text = p.question.clone();
            for option in &p.options {
                text.push_str(&format!("\n* {option}"));
            }
            text
        }
        ContentKind::Carousel => {
            let p = bundle.carousel.as_ref().ok_or("no carousel in this bundle")?;
            let mut text = p.title.clone();
            for slide in &p.slides {
                text.push_str(&format!(
                    "\n\n{}\n{}",
                    slide.title,
                    normalize_plain_text(&slide.content)
                ));
            }
            text
        }
        ContentKind::Report => {
            let p = bundle
                .research_report
                .as_ref()
                .ok_or("no research report in this bundle")?;
            format!("{}\n\n{}", p.title, normalize_plain_text(&p.report))
        }
        ContentKind::Podcast => {
            let p = bundle
                .podcast_script
                .as_ref()
                .ok_or("no podcast script in this bundle")?;
            format!("{}\n\n{}", p.title, normalize_plain_text(&p.script))
        }
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{LinkedInPost, PodcastScript, XPost};

    fn bundle() -> ContentBundle {
        ContentBundle {
            linkedin_post: LinkedInPost {
                title: "Why data literacy matters".into(),
                body: "A hook.\n1. First takeaway\n2. Second takeaway".into(),
                hashtags: vec!["#data".into(), "#ai".into()],
            },
            x_post: XPost {
                body: "Short thought".into(),
                hashtags: vec!["#ai".into()],
            },
            image_prompt: "diverse team collaborating".into(),
            podcast_script: None,
            blog_article: None,
            linkedin_poll: None,
            carousel: None,
            research_report: None,
        }
    }

    #[test]
    fn html_export_runs_bodies_through_the_converter() {
        let html = bundle_to_html("Data literacy", &bundle());
        assert!(html.contains("<h1>Data literacy</h1>"));
        assert!(html.contains("<p>A hook.</p>"));
        assert!(html.contains("<ol><li>First takeaway</li><li>Second takeaway</li></ol>"));
        assert!(html.contains("#data #ai"));
    }

    #[test]
    fn terminal_text_normalizes_list_markers() {
        let text = bundle_to_text(&bundle());
        assert!(text.contains("1. First takeaway"));
        assert!(text.contains("== X =="));
        assert!(text.contains("diverse team collaborating"));
    }

    #[test]
    fn part_plain_text_for_linkedin_includes_title_and_tags() {
        let text = part_plain_text(&bundle(), ContentKind::Linkedin).unwrap();
        assert!(text.starts_with("Why data literacy matters"));
        assert!(text.ends_with("#data #ai"));
    }

    #[test]
    fn part_plain_text_reports_missing_parts() {
        let err = part_plain_text(&bundle(), ContentKind::Blog).unwrap_err();
        assert!(err.to_string().contains("no blog article"));
    }

    #[test]
    fn part_plain_text_strips_markup_from_scripts() {
        let mut b = bundle();
        b.podcast_script = Some(PodcastScript {
            title: "Episode 1".into(),
            script: "Host: Welcome.\n* point one\n* point two".into(),
        });
        let text = part_plain_text(&b, ContentKind::Podcast).unwrap();
        assert!(text.contains("Host: Welcome."));
        assert!(text.contains("* point one"));
    }
}
