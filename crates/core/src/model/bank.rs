use crate::model::Question;

/// The full set of validated questions available to sessions.
///
/// Loaded once at startup; an empty bank is allowed and yields
/// immediately-completed sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Distinct category names, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.questions.iter().map(Question::category).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Questions whose category matches `name` exactly.
    pub fn in_category<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Question> {
        self.questions.iter().filter(move |q| q.category() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    fn question(text: &str, category: &str) -> Question {
        QuestionDraft {
            text: text.into(),
            category: category.into(),
            answers: vec!["A".into(), "B".into()],
            correct: "A".into(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn categories_are_sorted_and_distinct() {
        let bank = QuestionBank::new(vec![
            question("q1", "Music"),
            question("q2", "History"),
            question("q3", "Music"),
        ]);
        assert_eq!(bank.categories(), vec!["History", "Music"]);
    }

    #[test]
    fn in_category_filters_exactly() {
        let bank = QuestionBank::new(vec![
            question("q1", "History"),
            question("q2", "Music"),
        ]);
        let history: Vec<_> = bank.in_category("History").collect();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text(), "q1");
        assert_eq!(bank.in_category("history").count(), 0);
    }
}
