mod artifact;
mod config;
mod extract;
mod format;
mod gemini;
mod generation;
mod prompts;
mod session;
mod tutor;

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use iced::{
    alignment,
    clipboard,
    time,
    widget::{button, column, container, horizontal_space, pick_list, row, scrollable, slider, text, text_editor, text_input, Column},
    window, Element, Font, Length, Size, Subscription, Task, Theme,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use crate::artifact::ArtifactStore;
use crate::config::{Config, API_KEY_ENV, MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::format::{FontFamily, Style};
use crate::gemini::GeminiClient;
use crate::generation::GenerationClient;
use crate::prompts::{AnswerMode, Difficulty, PaperRequest, UserType, DEFAULT_MARKS, DEFAULT_MCQS, MAX_MCQS, MIN_MCQS};
use crate::session::Session;
use crate::tutor::{Outcome, Tutor};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
type Job = Pin<Box<dyn Future<Output = Outcome> + Send>>;

const INVALID_MARKS: &str = "⚠️ Marks must be a whole number.";
/// Multi-line inputs keep pasted line breaks.
const EDITOR_HEIGHT: f32 = 160.0;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> anyhow::Result<()> {
    let config = Config::load();
    if std::env::var_os("RUST_LOG").is_none() {
        set_log_level(reload_handle, config.log_level.as_filter_str());
    }

    let api_key = config.api_key();
    if api_key.is_none() {
        warn!(
            config = %Config::get_config_path().display(),
            "No Gemini API key found; set {API_KEY_ENV} or gemini.api_key"
        );
    }

    let backend = GeminiClient::with_config(&config.gemini, api_key).context("Failed to build HTTP client")?;
    info!(model = backend.get_model(), "Using Gemini backend");
    let client = GenerationClient::new(backend, config.retry_policy());
    let policy = client.policy();
    info!(attempts = policy.attempts, delay = ?policy.delay, "Retry policy");
    let tutor = Tutor::new(client, ArtifactStore::new(config.output.dir.clone()));

    let win = &config.window;
    let settings = window::Settings {
        size: Size::new(win.width as f32, win.height as f32),
        min_size: Some(Size::new(win.min_width as f32, win.min_height as f32)),
        position: window::Position::Centered,
        ..Default::default()
    };

    iced::application("Tutor Me AI", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(settings)
        .run_with(move || App::new(tutor, &config))
        .context("Failed to start the GUI")
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(filter_layer))
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    AskAi,
    Assignment,
    Mcq,
    QuestionPaper,
    Explainer,
    Notes,
    Daily,
    Career,
    PdfSummary,
    History,
    Books,
}

impl Tab {
    const ALL: [Tab; 11] = [
        Tab::AskAi,
        Tab::Assignment,
        Tab::Mcq,
        Tab::QuestionPaper,
        Tab::Explainer,
        Tab::Notes,
        Tab::Daily,
        Tab::Career,
        Tab::PdfSummary,
        Tab::History,
        Tab::Books,
    ];

    fn label(self) -> &'static str {
        match self {
            Tab::AskAi => "Ask AI",
            Tab::Assignment => "Assignment Solver",
            Tab::Mcq => "MCQ Generator",
            Tab::QuestionPaper => "Question Paper",
            Tab::Explainer => "Content Explainer",
            Tab::Notes => "Notes",
            Tab::Daily => "Daily Tip & Quote",
            Tab::Career => "Career Roadmap",
            Tab::PdfSummary => "PDF Notes Summarizer",
            Tab::History => "Chat History",
            Tab::Books => "Book Recommendations",
        }
    }
}

/// Every button that produces an output pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Action {
    Ask,
    Solve,
    Mcq,
    Paper,
    Explain,
    SaveNotes,
    Tip,
    Quote,
    Roadmap,
    Summarize,
    History,
    Books,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Ask => "Ask AI",
            Action::Solve => "Solve Assignment",
            Action::Mcq => "Generate MCQs",
            Action::Paper => "Generate Paper",
            Action::Explain => "Explain",
            Action::SaveNotes => "Save Notes",
            Action::Tip => "Get Tip",
            Action::Quote => "Get Quote",
            Action::Roadmap => "Generate Roadmap",
            Action::Summarize => "Summarize PDF",
            Action::History => "Show History",
            Action::Books => "Get Book Recommendations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upload {
    Assignment,
    Pdf,
}

#[derive(Debug, Clone)]
enum Message {
    TabSelected(Tab),
    FontChanged(FontFamily),
    SizeChanged(u16),
    QuestionChanged(String),
    ModeChanged(AnswerMode),
    McqContentEdited(text_editor::Action),
    McqCountChanged(u8),
    SubjectChanged(String),
    TopicChanged(String),
    MarksChanged(String),
    DifficultyChanged(Difficulty),
    ExplainContentEdited(text_editor::Action),
    NotesEdited(text_editor::Action),
    ProfessionChanged(String),
    UserTypeChanged(UserType),
    BookSubjectChanged(String),
    PickFile(Upload),
    FilePicked(Upload, Option<PathBuf>),
    Run(Action),
    Finished(Action, Outcome),
    CopyHtml(Action),
    Tick,
}

struct App {
    tutor: Arc<Tutor<GeminiClient>>,
    session: Arc<Mutex<Session>>,
    style: Style,
    tab: Tab,
    question: String,
    assignment_file: Option<PathBuf>,
    mode: AnswerMode,
    mcq_content: text_editor::Content,
    mcq_count: u8,
    subject: String,
    topic: String,
    marks: String,
    difficulty: Difficulty,
    explain_content: text_editor::Content,
    notes: text_editor::Content,
    profession: String,
    user_type: UserType,
    book_subject: String,
    pdf_file: Option<PathBuf>,
    outputs: HashMap<Action, Outcome>,
    pending: HashSet<Action>,
    loading_frame: usize,
}

impl App {
    fn new(tutor: Tutor<GeminiClient>, config: &Config) -> (Self, Task<Message>) {
        info!(output = %tutor.store().dir().display(), "Tutor ready");

        let app = App {
            tutor: Arc::new(tutor),
            session: Arc::new(Mutex::new(Session::new(config.history.max_entries))),
            style: Style::new(FontFamily::from_name(&config.display.font), config.display.font_size),
            tab: Tab::AskAi,
            question: String::new(),
            assignment_file: None,
            mode: AnswerMode::default(),
            mcq_content: text_editor::Content::new(),
            mcq_count: DEFAULT_MCQS,
            subject: String::new(),
            topic: String::new(),
            marks: DEFAULT_MARKS.to_string(),
            difficulty: Difficulty::default(),
            explain_content: text_editor::Content::new(),
            notes: text_editor::Content::new(),
            profession: String::new(),
            user_type: UserType::default(),
            book_subject: String::new(),
            pdf_file: None,
            outputs: HashMap::new(),
            pending: HashSet::new(),
            loading_frame: 0,
        };

        (app, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => self.tab = tab,
            Message::FontChanged(font) => self.style = Style::new(font, self.style.size),
            Message::SizeChanged(size) => self.style = Style::new(self.style.font, size),
            Message::QuestionChanged(value) => self.question = value,
            Message::ModeChanged(mode) => self.mode = mode,
            Message::McqContentEdited(action) => self.mcq_content.perform(action),
            Message::McqCountChanged(count) => self.mcq_count = count,
            Message::SubjectChanged(value) => self.subject = value,
            Message::TopicChanged(value) => self.topic = value,
            Message::MarksChanged(value) => self.marks = value,
            Message::DifficultyChanged(difficulty) => self.difficulty = difficulty,
            Message::ExplainContentEdited(action) => self.explain_content.perform(action),
            Message::NotesEdited(action) => self.notes.perform(action),
            Message::ProfessionChanged(value) => self.profession = value,
            Message::UserTypeChanged(user_type) => self.user_type = user_type,
            Message::BookSubjectChanged(value) => self.book_subject = value,
            Message::PickFile(upload) => return pick_file(upload),
            Message::FilePicked(upload, path) => {
                if path.is_some() {
                    match upload {
                        Upload::Assignment => self.assignment_file = path,
                        Upload::Pdf => self.pdf_file = path,
                    }
                }
            }
            Message::Run(action) => return self.run(action),
            Message::Finished(action, outcome) => {
                self.pending.remove(&action);
                self.outputs.insert(action, outcome);
            }
            Message::CopyHtml(action) => {
                if let Some(outcome) = self.outputs.get(&action) {
                    return clipboard::write(outcome.html.clone());
                }
            }
            Message::Tick => {
                if !self.pending.is_empty() {
                    self.loading_frame = (self.loading_frame + 1) % 80;
                }
            }
        }
        Task::none()
    }

    fn run(&mut self, action: Action) -> Task<Message> {
        if self.pending.contains(&action) {
            return Task::none();
        }

        let tutor = self.tutor.clone();
        let style = self.style;

        let job: Job = match action {
            Action::Ask => {
                let question = self.question.clone();
                let session = self.session.clone();
                Box::pin(async move { tutor.ask(&session, &question, style).await })
            }
            Action::Solve => {
                let file = self.assignment_file.clone();
                let mode = self.mode;
                Box::pin(async move { tutor.solve_assignment(file.as_deref(), mode, style).await })
            }
            Action::Mcq => {
                let content = editor_text(&self.mcq_content);
                let count = self.mcq_count;
                Box::pin(async move { tutor.generate_mcqs(&content, count, style).await })
            }
            Action::Paper => {
                let Ok(marks) = self.marks.trim().parse::<u32>() else {
                    self.outputs.insert(action, Outcome::notice(INVALID_MARKS));
                    return Task::none();
                };
                let request = PaperRequest {
                    subject: self.subject.clone(),
                    topic: self.topic.clone(),
                    marks,
                    difficulty: self.difficulty,
                };
                Box::pin(async move { tutor.question_paper(&request, style).await })
            }
            Action::Explain => {
                let content = editor_text(&self.explain_content);
                Box::pin(async move { tutor.explain(&content, style).await })
            }
            Action::SaveNotes => {
                let notes = editor_text(&self.notes);
                Box::pin(async move { tutor.save_notes(&notes, style) })
            }
            Action::Tip => Box::pin(async move { tutor.study_tip(style).await }),
            Action::Quote => Box::pin(async move { tutor.daily_quote(style).await }),
            Action::Roadmap => {
                let profession = self.profession.clone();
                let user_type = self.user_type;
                Box::pin(async move { tutor.career_roadmap(&profession, user_type, style).await })
            }
            Action::Summarize => {
                let file = self.pdf_file.clone();
                Box::pin(async move { tutor.summarize_pdf(file.as_deref(), style).await })
            }
            Action::History => {
                let session = self.session.clone();
                Box::pin(async move {
                    let session = session.lock().await;
                    tutor.show_history(&session, style)
                })
            }
            Action::Books => {
                let subject = self.book_subject.clone();
                Box::pin(async move { tutor.book_recommendations(&subject, style).await })
            }
        };

        self.pending.insert(action);
        Task::perform(job, move |outcome| Message::Finished(action, outcome))
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.pending.is_empty() {
            Subscription::none()
        } else {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let font_controls = row![
            text("Font Style"),
            pick_list(FontFamily::ALL, Some(self.style.font), Message::FontChanged),
            text(format!("Font Size: {}", self.style.size)),
            slider(MIN_FONT_SIZE..=MAX_FONT_SIZE, self.style.size, Message::SizeChanged).width(Length::Fixed(180.0)),
        ]
        .spacing(10)
        .align_y(alignment::Vertical::Center);

        let header = row![text("🎓 Tutor Me AI").size(24), horizontal_space(), font_controls]
            .spacing(10)
            .align_y(alignment::Vertical::Center);

        let tabs = Tab::ALL.into_iter().fold(Column::new().spacing(4), |tabs, tab| {
            let style: fn(&Theme, button::Status) -> button::Style =
                if tab == self.tab { button::primary } else { button::secondary };
            tabs.push(
                button(text(tab.label()).size(14))
                    .width(Length::Fill)
                    .style(style)
                    .on_press(Message::TabSelected(tab)),
            )
        });

        let panel = scrollable(container(self.panel()).padding(10).width(Length::Fill)).height(Length::Fill);

        let body = row![container(tabs).width(Length::Fixed(210.0)), panel].spacing(10);

        container(column![header, body].spacing(10).padding(10))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn panel(&self) -> Element<'_, Message> {
        let content: Column<'_, Message> = match self.tab {
            Tab::AskAi => column![
                text_input("Your Question", &self.question)
                    .on_input(Message::QuestionChanged)
                    .on_submit(Message::Run(Action::Ask))
                    .padding(10),
                self.action_button(Action::Ask),
                self.output(Action::Ask),
            ],
            Tab::Assignment => column![
                self.file_row(Upload::Assignment, self.assignment_file.as_ref()),
                labeled("Answer Style", pick_list(AnswerMode::ALL, Some(self.mode), Message::ModeChanged)),
                self.action_button(Action::Solve),
                self.output(Action::Solve),
            ],
            Tab::Mcq => column![
                text_editor(&self.mcq_content)
                    .placeholder("Paste Content")
                    .on_action(Message::McqContentEdited)
                    .height(Length::Fixed(EDITOR_HEIGHT))
                    .padding(10),
                labeled(
                    format!("Number of MCQs: {}", self.mcq_count),
                    slider(MIN_MCQS..=MAX_MCQS, self.mcq_count, Message::McqCountChanged).width(Length::Fixed(240.0)),
                ),
                self.action_button(Action::Mcq),
                self.output(Action::Mcq),
            ],
            Tab::QuestionPaper => column![
                text_input("Subject", &self.subject).on_input(Message::SubjectChanged).padding(10),
                text_input("Topic", &self.topic).on_input(Message::TopicChanged).padding(10),
                labeled(
                    "Marks",
                    text_input("100", &self.marks)
                        .on_input(Message::MarksChanged)
                        .width(Length::Fixed(120.0)),
                ),
                labeled("Difficulty", pick_list(Difficulty::ALL, Some(self.difficulty), Message::DifficultyChanged)),
                self.action_button(Action::Paper),
                self.output(Action::Paper),
            ],
            Tab::Explainer => column![
                text_editor(&self.explain_content)
                    .placeholder("Paste Content")
                    .on_action(Message::ExplainContentEdited)
                    .height(Length::Fixed(EDITOR_HEIGHT))
                    .padding(10),
                self.action_button(Action::Explain),
                self.output(Action::Explain),
            ],
            Tab::Notes => column![
                text_editor(&self.notes)
                    .placeholder("Write Notes")
                    .on_action(Message::NotesEdited)
                    .height(Length::Fixed(EDITOR_HEIGHT))
                    .padding(10),
                self.action_button(Action::SaveNotes),
                self.output(Action::SaveNotes),
            ],
            Tab::Daily => column![
                self.action_button(Action::Tip),
                self.output(Action::Tip),
                self.action_button(Action::Quote),
                self.output(Action::Quote),
            ],
            Tab::Career => column![
                text_input("Profession", &self.profession)
                    .on_input(Message::ProfessionChanged)
                    .padding(10),
                labeled("You Are", pick_list(UserType::ALL, Some(self.user_type), Message::UserTypeChanged)),
                self.action_button(Action::Roadmap),
                self.output(Action::Roadmap),
            ],
            Tab::PdfSummary => column![
                self.file_row(Upload::Pdf, self.pdf_file.as_ref()),
                self.action_button(Action::Summarize),
                self.output(Action::Summarize),
            ],
            Tab::History => column![self.action_button(Action::History), self.output(Action::History)],
            Tab::Books => column![
                text_input("Enter Subject Name", &self.book_subject)
                    .on_input(Message::BookSubjectChanged)
                    .on_submit(Message::Run(Action::Books))
                    .padding(10),
                self.action_button(Action::Books),
                self.output(Action::Books),
            ],
        };

        content.spacing(12).into()
    }

    fn action_button(&self, action: Action) -> Element<'_, Message> {
        button(text(action.label()))
            .padding(10)
            .on_press_maybe((!self.pending.contains(&action)).then_some(Message::Run(action)))
            .into()
    }

    fn file_row(&self, upload: Upload, file: Option<&PathBuf>) -> Element<'_, Message> {
        let label = match upload {
            Upload::Assignment => "Upload File",
            Upload::Pdf => "Upload Lecture PDF",
        };
        let chosen = file
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No file selected".to_string());

        row![button(text(label)).on_press(Message::PickFile(upload)), text(chosen)]
            .spacing(10)
            .align_y(alignment::Vertical::Center)
            .into()
    }

    fn output(&self, action: Action) -> Element<'_, Message> {
        if self.pending.contains(&action) {
            let loading_frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let loading_messages = [
                "Consulting your tutor...",
                "Flipping through the textbook...",
                "Sharpening pencils...",
                "Checking the syllabus...",
                "Thinking really hard...",
                "Grading the answer key...",
                "Reviewing lecture notes...",
                "Preparing a study plan...",
            ];
            let message_idx = (self.loading_frame / 10) % loading_messages.len();
            let spinner_idx = self.loading_frame % loading_frames.len();

            return row![text(loading_frames[spinner_idx]).size(24), text(loading_messages[message_idx]).size(15)]
                .spacing(10)
                .align_y(alignment::Vertical::Center)
                .into();
        }

        let Some(outcome) = self.outputs.get(&action) else {
            return Column::new().into();
        };

        let body = text(outcome.display_text())
            .size(f32::from(self.style.size))
            .font(Font::with_name(self.style.font.name()));

        let mut pane = column![container(body).padding(15).width(Length::Fill)].spacing(8);

        if let Some(path) = &outcome.artifact {
            pane = pane.push(text(format!("Saved to {}", path.display())).size(13));
        }

        pane.push(button(text("[Copy HTML]").size(14)).on_press(Message::CopyHtml(action)).padding(8))
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}

fn labeled<'a>(label: impl ToString, control: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    row![text(label.to_string()), control.into()]
        .spacing(10)
        .align_y(alignment::Vertical::Center)
        .into()
}

/// `Content::text` always ends with a newline the user never typed.
fn editor_text(content: &text_editor::Content) -> String {
    let mut text = content.text();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

fn pick_file(upload: Upload) -> Task<Message> {
    Task::perform(
        async move {
            let dialog = rfd::AsyncFileDialog::new();
            let dialog = match upload {
                Upload::Assignment => dialog
                    .set_title("Upload assignment")
                    .add_filter("Documents", &["txt", "docx", "pdf"]),
                Upload::Pdf => dialog.set_title("Upload lecture PDF").add_filter("PDF", &["pdf"]),
            };
            dialog.pick_file().await.map(|handle| handle.path().to_path_buf())
        },
        move |path| Message::FilePicked(upload, path),
    )
}
