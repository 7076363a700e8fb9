//! Gemini REST client: every content kind the studio can produce comes from
//! one of the calls in this module. Requests carry the brand persona as a
//! prompt preamble; JSON-mode calls are parsed straight into the typed content
//! model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::content::{
    BlogArticle, Carousel, ContentBundle, LinkedInPoll, PodcastScript, ReportSource,
    ResearchReport, TopicSuggestion,
};

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const TEXT_MODEL: &str = "gemini-2.5-pro";
const FAST_MODEL: &str = "gemini-2.5-flash";
const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

const BRAND_PERSONA_PROMPT: &str = r#"You are the Communications Manager for the Kenya Data & AI Society.
Your job is to generate on-brand content.

Brand themes: leadership, public speaking, data literacy, AI innovation, ethics, and Kenyan/African context.
Voice: Professional, warm, clear, inspiring, community-driven, and ethically minded. Your tone is welcoming, as if inviting people into our community to tackle complex topics together.
Writing style:
- Start with a strong hook or question.
- Share a useful insight or tell a personal story.
- Connect to Kenya/Africa and mention the "Kenya Data & AI Society" where appropriate to build brand recognition.
- End with a community-centered CTA ("What can Kenya build next?", "Let's discuss...", "Join the conversation.").
- Use accessible language and avoid jargon.
- For LinkedIn posts, use numbered lists for key takeaways to improve readability.

Image prompts must be clean, modern, African-inspired, and aligned with data + AI themes (futuristic but grounded, diverse people collaborating, bold typography, etc.).

Your goal is to make every post feel alive, inspiring, unique to African innovation, and foster a sense of community."#;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Gemini request types
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: EmptyObject,
}

#[derive(Serialize)]
struct EmptyObject {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    multi_speaker_voice_config: MultiSpeakerVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MultiSpeakerVoiceConfig {
    speaker_voice_configs: Vec<SpeakerVoiceConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeakerVoiceConfig {
    speaker: String,
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

/// Gemini response types
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Deserialize)]
struct WebSource {
    title: Option<String>,
    uri: Option<String>,
}

/// Concatenated text of the first candidate, if any.
fn response_text(response: &GeminiResponse) -> Option<String> {
    let candidate = response.candidates.as_ref()?.first()?;
    let parts = &candidate.content.as_ref()?.parts;
    let text: String = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Inline audio payload of the first candidate, if any.
fn response_audio(response: &GeminiResponse) -> Option<String> {
    let candidate = response.candidates.as_ref()?.first()?;
    let part = candidate.content.as_ref()?.parts.first()?;
    Some(part.inline_data.as_ref()?.data.clone())
}

/// Build a research report from a grounded response. The title is the first
/// line of the text with any heading markers stripped; grounding chunks
/// without a URI are dropped.
fn report_from_response(topic: &str, response: &GeminiResponse) -> Option<ResearchReport> {
    let text = response_text(response)?;
    let first_line = text.lines().next().unwrap_or_default();
    let title = first_line.trim_start_matches('#').trim();
    let title = if title.is_empty() { topic } else { title };

    let sources = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|m| {
            m.grounding_chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.web.as_ref()?;
                    let uri = web.uri.clone().filter(|u| !u.is_empty())?;
                    Some(ReportSource {
                        title: web.title.clone().unwrap_or_else(|| "Unknown Source".into()),
                        uri,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Some(ResearchReport {
        title: title.to_string(),
        report: text,
        sources,
    })
}

/// Client for the generation service. One instance per invocation is fine;
/// calls are independent and stateless.
pub struct Generator {
    client: reqwest::Client,
    api_key: String,
}

impl Generator {
    pub fn new(api_key: &str) -> Result<Self, BoxError> {
        if api_key.is_empty() {
            return Err(
                "no Gemini API key configured; set GEMINI_API_KEY or run `post-studio config set-key`"
                    .into(),
            );
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
        })
    }

    async fn call(&self, model: &str, body: &GeminiRequest) -> Result<GeminiResponse, BoxError> {
        let url = format!("{GEMINI_BASE}/{model}:generateContent?key={}", self.api_key);
        let resp = self.client.post(&url).json(body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("Gemini API error {status}: {text}").into());
        }

        Ok(resp.json().await?)
    }

    fn prompt_request(prompt: String, config: Option<GenerationConfig>) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: config,
            tools: None,
        }
    }

    /// Run a JSON-mode generation call and parse the reply into `T`.
    async fn generate_json<T: DeserializeOwned>(
        &self,
        model: &str,
        prompt: String,
        what: &str,
    ) -> Result<T, BoxError> {
        let request = Self::prompt_request(
            prompt,
            Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                ..Default::default()
            }),
        );
        let response = self.call(model, &request).await?;
        let text = response_text(&response)
            .ok_or_else(|| format!("Failed to generate {what}: empty response"))?;
        serde_json::from_str(text.trim()).map_err(|e| {
            log::error!("Unparsable {what} response: {e}: {text}");
            format!("Failed to generate {what}. The model returned an invalid format.").into()
        })
    }

    /// The core set: LinkedIn post, X post and an image prompt.
    pub async fn generate_core_posts(&self, topic: &str) -> Result<ContentBundle, BoxError> {
        let prompt = format!(
            r#"{BRAND_PERSONA_PROMPT}

    Based on the topic "{topic}", generate a set of social media posts. The output must be a valid JSON object.

    JSON structure:
    - "linkedinPost": {{ "title": "...", "body": "...", "hashtags": ["...", "..."] }} (Body must include a numbered list for key takeaways)
    - "xPost": {{ "body": "...", "hashtags": ["...", "..."] }}
    - "imagePrompt": "A descriptive prompt for an AI image generator, following the brand guidelines."
    "#
        );
        self.generate_json(TEXT_MODEL, prompt, "core posts").await
    }

    pub async fn generate_blog_article(&self, topic: &str) -> Result<BlogArticle, BoxError> {
        let prompt = format!(
            r#"{BRAND_PERSONA_PROMPT}

    Generate a comprehensive blog article on the topic: "{topic}".
    The article should be well-structured, informative, and engaging, embodying our brand voice.
    It should include a compelling title, a main body of text with proper formatting (paragraphs, maybe lists), and a concluding summary.
    Also provide a list of relevant hashtags.
    Format the output as a JSON object: {{ "title": "...", "body": "...", "hashtags": ["...", "..."] }}"#
        );
        self.generate_json(TEXT_MODEL, prompt, "blog article").await
    }

    pub async fn generate_poll(&self, topic: &str) -> Result<LinkedInPoll, BoxError> {
        let prompt = format!(
            r#"{BRAND_PERSONA_PROMPT}

    Create a LinkedIn poll related to the topic: "{topic}".
    The poll should have a thought-provoking question that encourages community discussion, and between 2 to 4 distinct options.
    Format the output as a JSON object: {{ "question": "...", "options": ["...", "..."] }}"#
        );
        self.generate_json(FAST_MODEL, prompt, "LinkedIn poll").await
    }

    pub async fn generate_carousel(&self, topic: &str) -> Result<Carousel, BoxError> {
        let prompt = format!(
            r#"{BRAND_PERSONA_PROMPT}

    Create a LinkedIn-style carousel presentation about "{topic}".
    The carousel should have a main title and a series of 5 to 7 slides.
    Each slide needs a short, punchy title and a small amount of content (1-3 sentences or a short bullet list).
    The last slide should be a community-focused call to action.
    Format the output as a JSON object: {{ "title": "...", "slides": [{{ "title": "...", "content": "..." }}, ...] }}"#
        );
        self.generate_json(TEXT_MODEL, prompt, "carousel").await
    }

    pub async fn generate_podcast_script(&self, topic: &str) -> Result<PodcastScript, BoxError> {
        let prompt = format!(
            r#"{BRAND_PERSONA_PROMPT}

    Generate a short podcast script about "{topic}". The script should be engaging and conversational, suitable for a 3-4 minute monologue.
    Provide a catchy title and the script content.
    Format the output as a JSON object: {{ "title": "...", "script": "..." }}
    The script should be formatted with paragraphs and clearly marked with "Host:" for our text-to-speech engine."#
        );
        self.generate_json(TEXT_MODEL, prompt, "podcast script").await
    }

    pub async fn generate_topic_suggestions(
        &self,
        topic: &str,
    ) -> Result<Vec<TopicSuggestion>, BoxError> {
        let prompt = format!(
            r#"{BRAND_PERSONA_PROMPT}

    Based on the central theme "{topic}", generate a strategic 7-day content plan.
    For each day (Monday to Sunday), suggest a specific, engaging sub-topic.
    The output must be a valid JSON array of objects.

    JSON structure: [{{ "day": "Monday", "topic": "..." }}, {{ "day": "Tuesday", "topic": "..." }}, ...]
    "#
        );
        self.generate_json(TEXT_MODEL, prompt, "topic suggestions").await
    }

    /// Search-grounded research report. Not a JSON-mode call; the title is
    /// lifted from the first response line and sources from the grounding
    /// metadata.
    pub async fn generate_research_report(&self, topic: &str) -> Result<ResearchReport, BoxError> {
        let prompt = format!(
            r#"{BRAND_PERSONA_PROMPT}

    Generate an in-depth, factual research report on the topic: "{topic}".
    The report should be structured with a clear title and a detailed body, written in our accessible but authoritative voice.
    You MUST cite your sources using Google Search grounding.
    The report body should be well-formatted using Markdown."#
        );
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: None,
            tools: Some(vec![Tool {
                google_search: EmptyObject {},
            }]),
        };
        let response = self.call(TEXT_MODEL, &request).await?;
        report_from_response(topic, &response)
            .ok_or_else(|| "Failed to generate research report: empty response".into())
    }

    /// Synthesize podcast narration. Returns the base64 PCM payload for the
    /// audio assembly pipeline.
    pub async fn synthesize_speech(&self, script: &str) -> Result<String, BoxError> {
        let request = Self::prompt_request(
            script.to_string(),
            Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(SpeechConfig {
                    multi_speaker_voice_config: MultiSpeakerVoiceConfig {
                        speaker_voice_configs: vec![
                            SpeakerVoiceConfig {
                                speaker: "Host".into(),
                                voice_config: VoiceConfig {
                                    prebuilt_voice_config: PrebuiltVoiceConfig {
                                        voice_name: "Kore".into(),
                                    },
                                },
                            },
                            SpeakerVoiceConfig {
                                speaker: "Guest".into(),
                                voice_config: VoiceConfig {
                                    prebuilt_voice_config: PrebuiltVoiceConfig {
                                        voice_name: "Puck".into(),
                                    },
                                },
                            },
                        ],
                    },
                }),
                ..Default::default()
            }),
        );
        let response = self.call(TTS_MODEL, &request).await?;
        response_audio(&response).ok_or_else(|| "no audio data returned in TTS response".into())
    }
}
