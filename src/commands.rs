//! One handler per subcommand. Handlers wire the generation client, the two
//! core pipelines and the repositories together; they hold no state of their
//! own.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fs;
use std::path::PathBuf;

use crate::audio::{assemble, AudioSegment};
use crate::cli::{Cli, Command, ConfigCommand, SavedCommand, ScheduleCommand};
use crate::clipboard::copy_to_clipboard;
use crate::config::Config;
use crate::content::{ContentBundle, ContentKind, Platform, ScheduledContent};
use crate::generator::Generator;
use crate::markup::normalize_plain_text;
use crate::render::{bundle_to_html, bundle_to_text, part_plain_text};
use crate::store::{default_data_dir, default_schedule_time, SavedStore, ScheduleStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run(cli: Cli) -> Result<(), BoxError> {
    let mut config = Config::load();
    if let Some(key) = &cli.api_key {
        config.gemini_api_key = key.clone();
    }

    match cli.command {
        Command::Generate {
            topic,
            blog,
            poll,
            carousel,
            report,
            podcast,
            all,
            save,
            html,
        } => {
            let generator = Generator::new(&config.gemini_api_key)?;
            let mut bundle = generator.generate_core_posts(&topic).await?;
            log::info!("Core posts generated for \"{topic}\"");

            if blog || all {
                match generator.generate_blog_article(&topic).await {
                    Ok(article) => bundle.blog_article = Some(article),
                    Err(e) => log::error!("Failed to generate blog article: {e}"),
                }
            }
            if poll || all {
                match generator.generate_poll(&topic).await {
                    Ok(p) => bundle.linkedin_poll = Some(p),
                    Err(e) => log::error!("Failed to generate LinkedIn poll: {e}"),
                }
            }
            if carousel || all {
                match generator.generate_carousel(&topic).await {
                    Ok(c) => bundle.carousel = Some(c),
                    Err(e) => log::error!("Failed to generate carousel: {e}"),
                }
            }
            if report || all {
                match generator.generate_research_report(&topic).await {
                    Ok(r) => bundle.research_report = Some(r),
                    Err(e) => log::error!("Failed to generate research report: {e}"),
                }
            }
            if podcast || all {
                match generator.generate_podcast_script(&topic).await {
                    Ok(s) => bundle.podcast_script = Some(s),
                    Err(e) => log::error!("Failed to generate podcast script: {e}"),
                }
            }

            print!("{}", bundle_to_text(&bundle));

            if let Some(path) = html {
                fs::write(&path, bundle_to_html(&topic, &bundle))?;
                println!("Exported HTML to {}", path.display());
            }
            if save {
                let mut store = SavedStore::open(default_data_dir());
                let id = store.add(&topic, bundle)?;
                println!("Saved as {id}");
            }
            Ok(())
        }

        Command::Suggest { topic } => {
            let generator = Generator::new(&config.gemini_api_key)?;
            let suggestions = generator.generate_topic_suggestions(&topic).await?;
            for suggestion in &suggestions {
                println!("{:<10} {}", suggestion.day, suggestion.topic);
            }
            Ok(())
        }

        Command::Narrate { id, topic, output } => {
            let generator = Generator::new(&config.gemini_api_key)?;
            let script = match (&id, &topic) {
                (Some(id), _) => {
                    let store = SavedStore::open(default_data_dir());
                    let saved = store.get(id)?;
                    saved
                        .posts
                        .podcast_script
                        .clone()
                        .ok_or("saved bundle has no podcast script; generate one with `generate --podcast`")?
                }
                (None, Some(topic)) => generator.generate_podcast_script(topic).await?,
                (None, None) => return Err("pass --id or --topic".into()),
            };

            // The TTS engine gets the script as plain text, markers stripped.
            let plain = normalize_plain_text(&script.script);
            log::info!("Synthesizing narration for \"{}\"", script.title);
            let payload = generator.synthesize_speech(&plain).await?;
            let speech = AudioSegment::from_base64(&payload)?;
            log::info!(
                "Speech: {} samples, {:.1}s",
                speech.sample_count(),
                speech.duration_secs()
            );

            let theme = match &config.audio.theme_music {
                Some(path) => Some(AudioSegment::from_wav_file(path)?),
                None => None,
            };

            let format = config.audio.encode_format();
            let encoded = assemble(&speech, theme.as_ref(), format)?;

            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "{}.{}",
                    script.title.replace(' ', "_"),
                    format.extension()
                ))
            });
            fs::write(&path, &encoded.bytes)?;
            println!(
                "Wrote {} ({} bytes, {})",
                path.display(),
                encoded.bytes.len(),
                encoded.mime
            );
            Ok(())
        }

        Command::Saved { command } => {
            let mut store = SavedStore::open(default_data_dir());
            match command {
                SavedCommand::List => {
                    for entry in store.list() {
                        println!(
                            "{}  {}  {}",
                            &entry.id.to_string()[..8],
                            entry.saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                            entry.topic
                        );
                    }
                }
                SavedCommand::Show { id } => {
                    let entry = store.get(&id)?;
                    println!("Topic: {}\n", entry.topic);
                    print!("{}", bundle_to_text(&entry.posts));
                }
                SavedCommand::Edit { id, part } => {
                    let entry = store.get(&id)?;
                    let mut posts = entry.posts.clone();
                    let edited = edit_in_editor(current_part_text(&posts, part)?)?;
                    set_part_text(&mut posts, part, edited)?;
                    let id = store.update(&id, posts)?;
                    println!("Updated {id}");
                }
                SavedCommand::Delete { id } => {
                    let id = store.delete(&id)?;
                    println!("Deleted {id}");
                }
                SavedCommand::Export { id, output } => {
                    let entry = store.get(&id)?;
                    fs::write(&output, bundle_to_html(&entry.topic, &entry.posts))?;
                    println!("Exported HTML to {}", output.display());
                }
            }
            Ok(())
        }

        Command::Schedule { command } => {
            let mut store = ScheduleStore::open(default_data_dir());
            match command {
                ScheduleCommand::Add { id, platform, at } => {
                    let saved = SavedStore::open(default_data_dir());
                    let entry = saved.get(&id)?;
                    let content = match platform {
                        Platform::Linkedin => {
                            ScheduledContent::LinkedIn(entry.posts.linkedin_post.clone())
                        }
                        Platform::X => ScheduledContent::X(entry.posts.x_post.clone()),
                    };
                    let scheduled_at = match at {
                        Some(s) => parse_schedule_time(&s)?,
                        None => default_schedule_time(Utc::now()),
                    };
                    let topic = entry.topic.clone();
                    let id = store.add(platform, scheduled_at, &topic, content)?;
                    println!(
                        "Scheduled {} for {} ({id})",
                        platform,
                        scheduled_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                    );
                }
                ScheduleCommand::List => {
                    for entry in store.list() {
                        println!(
                            "{}  {}  {:<8}  {}",
                            &entry.id.to_string()[..8],
                            entry.scheduled_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                            entry.platform.to_string(),
                            entry.topic
                        );
                    }
                }
                ScheduleCommand::Remove { id } => {
                    let id = store.remove(&id)?;
                    println!("Unscheduled {id}");
                }
                ScheduleCommand::Due => {
                    // Print the full body so the post is ready to publish.
                    for entry in store.due(Utc::now()) {
                        println!(
                            "{}  {}  {:<8}  {}",
                            &entry.id.to_string()[..8],
                            entry.scheduled_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                            entry.platform.to_string(),
                            entry.topic
                        );
                        println!("{}\n", normalize_plain_text(entry.content.body()));
                    }
                }
            }
            Ok(())
        }

        Command::Copy { id, part } => {
            let store = SavedStore::open(default_data_dir());
            let entry = store.get(&id)?;
            let text = part_plain_text(&entry.posts, part)?;
            copy_to_clipboard(&text)?;
            println!("Copied {} to clipboard", part.label());
            Ok(())
        }

        Command::Config { command } => {
            match command {
                ConfigCommand::Show => {
                    let key = if config.gemini_api_key.is_empty() {
                        "(unset)".to_string()
                    } else {
                        format!("{}...", &config.gemini_api_key[..config.gemini_api_key.len().min(6)])
                    };
                    println!("API key:      {key}");
                    println!("Audio format: {:?}", config.audio.format);
                    println!("MP3 bitrate:  {} kbps", config.audio.bitrate_kbps);
                    match &config.audio.theme_music {
                        Some(path) => println!("Theme music:  {}", path.display()),
                        None => println!("Theme music:  (none)"),
                    }
                }
                ConfigCommand::SetKey { key } => {
                    config.gemini_api_key = key;
                    config.save()?;
                    println!("API key saved");
                }
                ConfigCommand::SetTheme { path } => {
                    match path {
                        Some(path) => {
                            // Validate now so narration doesn't fail later.
                            let theme = AudioSegment::from_wav_file(&path)?;
                            log::info!(
                                "Theme music: {} samples, {:.1}s, {} Hz",
                                theme.sample_count(),
                                theme.duration_secs(),
                                theme.sample_rate
                            );
                            config.audio.theme_music = Some(path);
                            config.save()?;
                            println!("Theme music set");
                        }
                        None => {
                            config.audio.theme_music = None;
                            config.save()?;
                            println!("Theme music cleared");
                        }
                    }
                }
                ConfigCommand::SetFormat { format, bitrate } => {
                    config.audio.format = format;
                    if let Some(bitrate) = bitrate {
                        config.audio.bitrate_kbps = bitrate;
                    }
                    config.save()?;
                    println!("Audio format saved");
                }
            }
            Ok(())
        }
    }
}

/// The editable main text of a bundle part.
fn current_part_text(posts: &ContentBundle, part: ContentKind) -> Result<String, BoxError> {
    match part {
        ContentKind::Linkedin => Ok(posts.linkedin_post.body.clone()),
        ContentKind::X => Ok(posts.x_post.body.clone()),
        ContentKind::Blog => Ok(posts
            .blog_article
            .as_ref()
            .ok_or("no blog article in this bundle")?
            .body
            .clone()),
        ContentKind::Podcast => Ok(posts
            .podcast_script
            .as_ref()
            .ok_or("no podcast script in this bundle")?
            .script
            .clone()),
        _ => Err(format!("{} cannot be edited as free text", part.label()).into()),
    }
}

fn set_part_text(
    posts: &mut ContentBundle,
    part: ContentKind,
    text: String,
) -> Result<(), BoxError> {
    match part {
        ContentKind::Linkedin => posts.linkedin_post.body = text,
        ContentKind::X => posts.x_post.body = text,
        ContentKind::Blog => {
            posts
                .blog_article
                .as_mut()
                .ok_or("no blog article in this bundle")?
                .body = text;
        }
        ContentKind::Podcast => {
            posts
                .podcast_script
                .as_mut()
                .ok_or("no podcast script in this bundle")?
                .script = text;
        }
        _ => return Err(format!("{} cannot be edited as free text", part.label()).into()),
    }
    Ok(())
}

/// Hand the text to $EDITOR (vi if unset) via a scratch file.
fn edit_in_editor(text: String) -> Result<String, BoxError> {
    let path = std::env::temp_dir().join(format!("post-studio-{}.txt", uuid::Uuid::new_v4()));
    fs::write(&path, &text)?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = std::process::Command::new(&editor).arg(&path).status()?;
    if !status.success() {
        let _ = fs::remove_file(&path);
        return Err(format!("{editor} exited with status {status}").into());
    }

    let edited = fs::read_to_string(&path)?;
    let _ = fs::remove_file(&path);
    Ok(edited.trim_end().to_string())
}

/// Accepts RFC 3339 ("2026-03-01T09:00:00Z") or a local wall-clock time
/// without zone ("2026-03-01T09:00").
fn parse_schedule_time(s: &str) -> Result<DateTime<Utc>, BoxError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    let naive = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .map_err(|_| format!("unrecognized time '{s}'; use RFC 3339 or YYYY-MM-DDTHH:MM"))?;
    match Local.from_local_datetime(&naive) {
        chrono::LocalResult::Single(t) | chrono::LocalResult::Ambiguous(t, _) => {
            Ok(t.with_timezone(&Utc))
        }
        chrono::LocalResult::None => Err(format!("time '{s}' does not exist locally").into()),
    }
}
