//! Prompt templates and the selector values that feed them.

use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerMode {
    #[default]
    Short,
    Long,
    Simplified,
    Direct,
}

impl AnswerMode {
    pub const ALL: [AnswerMode; 4] = [AnswerMode::Short, AnswerMode::Long, AnswerMode::Simplified, AnswerMode::Direct];
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnswerMode::Short => "Short",
            AnswerMode::Long => "Long",
            AnswerMode::Simplified => "Simplified",
            AnswerMode::Direct => "Direct",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Mixed,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Mixed];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Mixed => "Mixed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserType {
    #[default]
    Student,
    WorkingProfessional,
    FreeLearner,
}

impl UserType {
    pub const ALL: [UserType; 3] = [UserType::Student, UserType::WorkingProfessional, UserType::FreeLearner];
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UserType::Student => "Student",
            UserType::WorkingProfessional => "Working Professional",
            UserType::FreeLearner => "Free Learner",
        })
    }
}

pub const MIN_MCQS: u8 = 1;
pub const MAX_MCQS: u8 = 20;
pub const DEFAULT_MCQS: u8 = 5;
pub const DEFAULT_MARKS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRequest {
    pub subject: String,
    pub topic: String,
    pub marks: u32,
    pub difficulty: Difficulty,
}

/// "05 March 2024", as used in the daily prompts.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d %B %Y").to_string()
}

pub fn assignment(mode: AnswerMode, content: &str) -> String {
    format!("Solve each question in {mode} style:\n\n{content}")
}

pub fn mcq(count: u8, content: &str) -> String {
    format!("Generate {count} MCQs with 4 options and correct answers:\n{content}")
}

pub fn question_paper(request: &PaperRequest) -> String {
    format!(
        "Generate an official exam paper:
Subject: {}
Topic: {}
Marks: {}
Difficulty: {}
Sections: MCQs, Short Answers, Long Answers",
        request.subject, request.topic, request.marks, request.difficulty
    )
}

pub fn explain(content: &str) -> String {
    format!("Explain this content simply:\n{content}")
}

pub fn study_tip(today: NaiveDate) -> String {
    format!("Motivational study tip for {}:", display_date(today))
}

pub fn daily_quote(today: NaiveDate) -> String {
    format!("Short motivational quote for students on {}:", display_date(today))
}

pub fn career_roadmap(profession: &str, user_type: UserType) -> String {
    format!("Career roadmap for {profession} (User type: {user_type}): Skills, Timeline, Courses.")
}

pub fn summarize_notes(content: &str) -> String {
    format!("Summarize these lecture notes:\n{content}")
}

pub fn book_recommendations(subject: &str) -> String {
    format!(
        "Recommend top books for learning {subject}. Include author, why the book is useful, and what topics it covers."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_fifth() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_daily_prompts_use_long_date() {
        assert_eq!(display_date(march_fifth()), "05 March 2024");
        assert_eq!(study_tip(march_fifth()), "Motivational study tip for 05 March 2024:");
        assert_eq!(
            daily_quote(march_fifth()),
            "Short motivational quote for students on 05 March 2024:"
        );
    }

    #[test]
    fn test_assignment_and_mcq() {
        assert_eq!(
            assignment(AnswerMode::Simplified, "1. Define force."),
            "Solve each question in Simplified style:\n\n1. Define force."
        );
        assert_eq!(
            mcq(5, "Cells"),
            "Generate 5 MCQs with 4 options and correct answers:\nCells"
        );
    }

    #[test]
    fn test_question_paper_lists_every_field() {
        let prompt = question_paper(&PaperRequest {
            subject: "Physics".to_string(),
            topic: "Optics".to_string(),
            marks: 80,
            difficulty: Difficulty::Hard,
        });
        assert_eq!(
            prompt,
            "Generate an official exam paper:\nSubject: Physics\nTopic: Optics\nMarks: 80\nDifficulty: Hard\nSections: MCQs, Short Answers, Long Answers"
        );
    }

    #[test]
    fn test_roadmap_uses_display_names() {
        assert_eq!(
            career_roadmap("Data Scientist", UserType::WorkingProfessional),
            "Career roadmap for Data Scientist (User type: Working Professional): Skills, Timeline, Courses."
        );
    }
}
