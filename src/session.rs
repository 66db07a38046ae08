use std::collections::VecDeque;

/// Question/answer transcript for one window. Oldest entries fall off once
/// `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct Session {
    history: VecDeque<String>,
    max_entries: usize,
}

impl Session {
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Session {
            history: VecDeque::with_capacity(max_entries.min(64)),
            max_entries,
        }
    }

    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        if self.history.len() >= self.max_entries {
            self.history.pop_front();
        }
        self.history.push_back(format!("You: {question}\nAI: {answer}\n---"));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn transcript(&self) -> String {
        self.entries().collect::<Vec<_>>().join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchanges_keep_call_order() {
        let mut session = Session::new(10);
        session.record_exchange("What is 2+2?", "4");
        session.record_exchange("Capital of France?", "Paris");

        let entries: Vec<_> = session.entries().collect();
        assert_eq!(entries, vec![
            "You: What is 2+2?\nAI: 4\n---",
            "You: Capital of France?\nAI: Paris\n---",
        ]);
        assert_eq!(
            session.transcript(),
            "You: What is 2+2?\nAI: 4\n---\n\nYou: Capital of France?\nAI: Paris\n---"
        );
    }

    #[test]
    fn test_oldest_entries_are_dropped() {
        let mut session = Session::new(2);
        session.record_exchange("a", "1");
        session.record_exchange("b", "2");
        session.record_exchange("c", "3");

        assert_eq!(session.len(), 2);
        assert!(session.entries().next().unwrap().starts_with("You: b"));
    }

    #[test]
    fn test_empty_transcript() {
        let session = Session::new(0);
        assert!(session.is_empty());
        assert_eq!(session.transcript(), "");
    }
}
