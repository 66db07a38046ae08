//! One handler per study feature: validate input, build the prompt, ask the
//! model, then format and persist the answer.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::artifact::ArtifactStore;
use crate::extract::{self, DocumentKind, UNSUPPORTED_MESSAGE};
use crate::format::{self, Style};
use crate::generation::{Generate, GenerationClient};
use crate::prompts::{self, AnswerMode, PaperRequest, UserType, MAX_MCQS, MIN_MCQS};
use crate::session::Session;

pub const MISSING_FILE: &str = "⚠️ Upload a file.";
pub const MISSING_PDF: &str = "⚠️ Upload a PDF.";
pub const MISSING_QUESTION: &str = "⚠️ Enter a question.";
pub const MISSING_CONTENT: &str = "⚠️ Paste some content.";
pub const MISSING_NOTES: &str = "⚠️ Write some notes first.";
pub const MISSING_PAPER_FIELDS: &str = "⚠️ Enter a subject and topic.";
pub const MISSING_PROFESSION: &str = "⚠️ Enter a profession.";
pub const MISSING_SUBJECT: &str = "⚠️ Enter a subject.";

/// What a panel shows after an action: the raw text, its HTML rendering and
/// the file it was saved to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    pub html: String,
    pub artifact: Option<PathBuf>,
}

impl Outcome {
    /// Warnings and errors are shown verbatim and never saved.
    pub fn notice(message: impl Into<String>) -> Self {
        let message = message.into();
        Outcome {
            html: message.clone(),
            text: message,
            artifact: None,
        }
    }

    fn rendered(text: String, style: Style, artifact: Option<PathBuf>) -> Self {
        Outcome {
            html: style.render(&text),
            text,
            artifact,
        }
    }

    pub fn display_text(&self) -> String {
        format::display_text(&self.text)
    }
}

/// Whitespace-only input counts as missing. Non-blank input is passed on
/// exactly as typed.
fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

pub struct Tutor<G> {
    client: GenerationClient<G>,
    store: ArtifactStore,
}

impl<G: Generate> Tutor<G> {
    pub fn new(client: GenerationClient<G>, store: ArtifactStore) -> Self {
        Tutor { client, store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    fn persist(&self, text: String, prefix: &str, style: Style) -> Outcome {
        match self.store.save(prefix, &text) {
            Ok(path) => Outcome::rendered(text, style, Some(path)),
            Err(e) => {
                error!(prefix, dir = %self.store.dir().display(), "Could not save artifact: {e}");
                let text = format!("{text}\n\n❌ Error: could not save output: {e}");
                Outcome::rendered(text, style, None)
            }
        }
    }

    async fn generate_and_save(&self, prompt: &str, prefix: &str, style: Style) -> Outcome {
        info!(prefix, "Running prompt");
        let result = self.client.generate_or_sentinel(prompt).await;
        self.persist(result, prefix, style)
    }

    pub async fn ask(&self, session: &Mutex<Session>, question: &str, style: Style) -> Outcome {
        if is_blank(question) {
            return Outcome::notice(MISSING_QUESTION);
        }
        let answer = self.client.generate_or_sentinel(question).await;
        session.lock().await.record_exchange(question, &answer);
        self.persist(answer, "Ask_AI", style)
    }

    pub async fn solve_assignment(&self, file: Option<&Path>, mode: AnswerMode, style: Style) -> Outcome {
        let Some(file) = file else {
            return Outcome::notice(MISSING_FILE);
        };
        match extract::extract_text_blocking(file.to_path_buf()).await {
            Ok(content) => {
                self.generate_and_save(&prompts::assignment(mode, &content), "Assignment_Solution", style)
                    .await
            }
            Err(e) => {
                error!(path = %file.display(), "Could not read assignment: {e}");
                Outcome::notice(e.user_message())
            }
        }
    }

    pub async fn generate_mcqs(&self, content: &str, count: u8, style: Style) -> Outcome {
        if is_blank(content) {
            return Outcome::notice(MISSING_CONTENT);
        }
        let count = count.clamp(MIN_MCQS, MAX_MCQS);
        self.generate_and_save(&prompts::mcq(count, content), "MCQs", style).await
    }

    pub async fn question_paper(&self, request: &PaperRequest, style: Style) -> Outcome {
        if is_blank(&request.subject) || is_blank(&request.topic) {
            return Outcome::notice(MISSING_PAPER_FIELDS);
        }
        self.generate_and_save(&prompts::question_paper(request), "Question_Paper", style)
            .await
    }

    pub async fn explain(&self, content: &str, style: Style) -> Outcome {
        if is_blank(content) {
            return Outcome::notice(MISSING_CONTENT);
        }
        self.generate_and_save(&prompts::explain(content), "Content_Explanation", style)
            .await
    }

    /// Notes are saved as typed; nothing is sent to the model.
    pub fn save_notes(&self, notes: &str, style: Style) -> Outcome {
        if is_blank(notes) {
            return Outcome::notice(MISSING_NOTES);
        }
        self.persist(notes.to_string(), "User_Notes", style)
    }

    pub async fn study_tip(&self, style: Style) -> Outcome {
        self.study_tip_on(Local::now().date_naive(), style).await
    }

    pub async fn study_tip_on(&self, today: NaiveDate, style: Style) -> Outcome {
        self.generate_and_save(&prompts::study_tip(today), "Daily_Tip", style).await
    }

    pub async fn daily_quote(&self, style: Style) -> Outcome {
        self.daily_quote_on(Local::now().date_naive(), style).await
    }

    pub async fn daily_quote_on(&self, today: NaiveDate, style: Style) -> Outcome {
        self.generate_and_save(&prompts::daily_quote(today), "Daily_Quote", style).await
    }

    pub async fn career_roadmap(&self, profession: &str, user_type: UserType, style: Style) -> Outcome {
        if is_blank(profession) {
            return Outcome::notice(MISSING_PROFESSION);
        }
        self.generate_and_save(&prompts::career_roadmap(profession, user_type), "Career_Roadmap", style)
            .await
    }

    pub async fn summarize_pdf(&self, file: Option<&Path>, style: Style) -> Outcome {
        let Some(file) = file else {
            return Outcome::notice(MISSING_PDF);
        };
        if DocumentKind::from_path(file) != Some(DocumentKind::Pdf) {
            return Outcome::notice(UNSUPPORTED_MESSAGE);
        }
        match extract::extract_text_blocking(file.to_path_buf()).await {
            Ok(content) => {
                self.generate_and_save(&prompts::summarize_notes(&content), "PDF_Summary", style)
                    .await
            }
            Err(e) => {
                error!(path = %file.display(), "Could not read PDF: {e}");
                Outcome::notice(e.user_message())
            }
        }
    }

    pub fn show_history(&self, session: &Session, style: Style) -> Outcome {
        Outcome::rendered(session.transcript(), style, None)
    }

    pub async fn book_recommendations(&self, subject: &str, style: Style) -> Outcome {
        if is_blank(subject) {
            return Outcome::notice(MISSING_SUBJECT);
        }
        self.generate_and_save(&prompts::book_recommendations(subject), "Book_Recommendations", style)
            .await
    }
}
