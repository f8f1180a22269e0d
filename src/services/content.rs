//! Generated learning content: quiz questions, drill steps and module text.
//!
//! The endpoint speaks the OpenAI chat-completions shape. The model is asked
//! for JSON only; whatever it returns is parsed leniently and anything that
//! does not fit falls back to a fixed set the caller can always show.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{extract_json, Result, ServiceClient, ServiceError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillStep {
    pub step: u32,
    pub instruction: String,
    #[serde(default)]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub tip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleContent {
    pub title: String,
    pub summary: String,
    pub sections: Vec<ContentSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    pub heading: String,
    pub body: String,
}

/// Generated content, or the fixed substitute when generation failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated<T> {
    pub content: T,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl<T> Generated<T> {
    /// Keeps the generated value, or substitutes `fallback()` and records why.
    pub fn or_fallback(result: Result<T>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(content) => Self {
                content,
                fallback: false,
                reason: None,
            },
            Err(e) => Self {
                content: fallback(),
                fallback: true,
                reason: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    questions: Vec<QuizQuestion>,
}

#[derive(Debug, Deserialize)]
struct StepsEnvelope {
    steps: Vec<DrillStep>,
}

const SYSTEM_PROMPT: &str = "You write disaster-preparedness learning material for schools. \
Answer with JSON only, no prose.";

pub struct ContentClient {
    client: ServiceClient,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl ContentClient {
    pub fn new(client: ServiceClient, url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client,
            url,
            model,
            api_key,
        }
    }

    pub async fn quiz(&self, topic: &str, age: u8) -> Result<Vec<QuizQuestion>> {
        let prompt = format!(
            "Create 5 multiple-choice questions about {topic} safety for a {age}-year-old.\n\
             Schema: {{\"questions\":[{{\"question\":\"string\",\"options\":[\"string\"],\
             \"correctAnswer\":0,\"explanation\":\"string\"}}]}}"
        );
        let raw = self.complete(&prompt).await?;
        let questions = match parse_lenient::<QuestionsEnvelope>(&raw) {
            Ok(env) => env.questions,
            Err(_) => parse_lenient::<Vec<QuizQuestion>>(&raw)?,
        };
        let valid: Vec<QuizQuestion> = questions
            .into_iter()
            .filter(|q| q.options.len() >= 2 && q.correct_answer < q.options.len())
            .collect();
        if valid.is_empty() {
            return Err(ServiceError::Decode("no usable questions".into()));
        }
        Ok(valid)
    }

    pub async fn drill(&self, topic: &str, age: u8) -> Result<Vec<DrillStep>> {
        let prompt = format!(
            "Write a step-by-step {topic} drill scenario for a {age}-year-old.\n\
             Schema: {{\"steps\":[{{\"step\":1,\"instruction\":\"string\",\
             \"durationSecs\":30,\"tip\":\"string\"}}]}}"
        );
        let raw = self.complete(&prompt).await?;
        let mut steps = match parse_lenient::<StepsEnvelope>(&raw) {
            Ok(env) => env.steps,
            Err(_) => parse_lenient::<Vec<DrillStep>>(&raw)?,
        };
        if steps.is_empty() {
            return Err(ServiceError::Decode("no drill steps".into()));
        }
        steps.sort_by_key(|s| s.step);
        Ok(steps)
    }

    pub async fn module(&self, topic: &str, age: u8) -> Result<ModuleContent> {
        let prompt = format!(
            "Write a short learning module about {topic} preparedness for a {age}-year-old.\n\
             Schema: {{\"title\":\"string\",\"summary\":\"string\",\
             \"sections\":[{{\"heading\":\"string\",\"body\":\"string\"}}]}}"
        );
        let raw = self.complete(&prompt).await?;
        parse_lenient(&raw)
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(ServiceError::NotConfigured("content API key"));
        };
        let body = json!({
            "model": self.model,
            "temperature": 0.4,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });
        let url = self.url.clone();
        let resp: ChatResponse = self
            .client
            .send_json("content", |http| {
                http.post(&url)
                    .header("Authorization", format!("Bearer {api_key}"))
                    .json(&body)
            })
            .await?;
        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ServiceError::Decode("empty completion".into()))
    }
}

fn parse_lenient<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let json = extract_json(raw).ok_or_else(|| ServiceError::Decode("no JSON in completion".into()))?;
    serde_json::from_str(json).map_err(|e| ServiceError::Decode(e.to_string()))
}

pub fn fallback_quiz(topic: &str) -> Vec<QuizQuestion> {
    let q = |question: String, options: [&str; 4], correct_answer: usize, explanation: &str| QuizQuestion {
        question,
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
    };
    vec![
        q(
            format!("What is the first thing to do when a {topic} warning is issued?"),
            [
                "Ignore it until you see danger",
                "Follow the instructions from local authorities",
                "Post about it online",
                "Go outside to look",
            ],
            1,
            "Official instructions tell you whether to evacuate or shelter in place.",
        ),
        q(
            "Which item belongs in an emergency kit?".to_string(),
            ["Video game console", "Flashlight with spare batteries", "Glass vase", "Board games only"],
            1,
            "Power often fails during emergencies.",
        ),
        q(
            "Where should your family meet if you are separated?".to_string(),
            [
                "Wherever is closest",
                "A meeting point agreed in advance",
                "At the disaster site",
                "Nowhere, wait at home",
            ],
            1,
            "An agreed meeting point makes reuniting faster.",
        ),
    ]
}

pub fn fallback_drill(topic: &str) -> Vec<DrillStep> {
    let step = |step: u32, instruction: String, duration_secs: u32| DrillStep {
        step,
        instruction,
        duration_secs: Some(duration_secs),
        tip: None,
    };
    vec![
        step(1, format!("Listen for the {topic} alarm and stop what you are doing."), 10),
        step(2, "Follow your teacher's instructions and stay calm.".to_string(), 20),
        step(3, "Move to the assembly point using the marked route.".to_string(), 120),
        step(4, "Wait for the roll call and report anyone missing.".to_string(), 60),
    ]
}

pub fn fallback_module(topic: &str) -> ModuleContent {
    ModuleContent {
        title: format!("{topic} preparedness"),
        summary: format!("Key actions to stay safe before, during and after a {topic}."),
        sections: vec![
            ContentSection {
                heading: "Before".to_string(),
                body: "Know your risks, prepare an emergency kit and agree a family plan."
                    .to_string(),
            },
            ContentSection {
                heading: "During".to_string(),
                body: "Follow official instructions and move to safety without delay.".to_string(),
            },
            ContentSection {
                heading: "After".to_string(),
                body: "Check for injuries, avoid damaged areas and stay informed.".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_are_well_formed() {
        for q in fallback_quiz("flood") {
            assert!(q.correct_answer < q.options.len());
        }
        let steps = fallback_drill("fire");
        assert!(steps.windows(2).all(|w| w[0].step < w[1].step));
        assert_eq!(fallback_module("earthquake").sections.len(), 3);
    }

    #[test]
    fn missing_key_falls_back() {
        let out = Generated::or_fallback(
            Err(ServiceError::NotConfigured("content API key")),
            || fallback_drill("flood"),
        );
        assert!(out.fallback);
        assert_eq!(out.content.len(), 4);
        assert!(out.reason.as_deref().is_some_and(|r| r.contains("not configured")));
    }

    #[test]
    fn parse_lenient_accepts_fenced_output() {
        let raw = "```json\n{\"steps\":[{\"step\":2,\"instruction\":\"b\"},{\"step\":1,\"instruction\":\"a\"}]}\n```";
        let env: StepsEnvelope = parse_lenient(raw).expect("parse");
        assert_eq!(env.steps.len(), 2);
    }
}
