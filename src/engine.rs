// src/engine.rs

//! Quiz-session engine: paper assembly, choice normalization, grading and
//! the unlock decision. Everything here is pure; persistence stays in the
//! handlers.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::{
    config::{OPTIONS_PER_QUESTION, QUESTIONS_PER_TOPIC, TOPIC_FUNDAMENTALS, TOPIC_NORMALIZATION},
    error::AppError,
    models::{attempt::SubmittedAnswer, question::Question},
};

/// Rounds to one decimal place, matching the percentages stored on attempts.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage of `correct` over `total`, rounded to one decimal.
/// Zero total yields 0.0 (the "no data yet" rendering default).
pub fn pct(correct: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(correct as f64 / total as f64 * 100.0)
}

/// Per-topic tallies for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopicScores {
    pub fund_correct: i64,
    pub fund_total: i64,
    pub norm_correct: i64,
    pub norm_total: i64,
}

impl TopicScores {
    pub fn fund_pct(&self) -> f64 {
        pct(self.fund_correct, self.fund_total)
    }

    pub fn norm_pct(&self) -> f64 {
        pct(self.norm_correct, self.norm_total)
    }
}

/// One graded answer, carrying the canonical chosen text.
#[derive(Debug, Clone)]
pub struct GradedAnswer {
    pub quiz_id: i64,
    pub answer_text: String,
    pub is_correct: bool,
    pub time_sec: f64,
}

/// Result of grading a complete submission.
#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub answers: Vec<GradedAnswer>,
    pub items_total: i64,
    pub items_correct: i64,
    pub score_pct: f64,
    pub topics: TopicScores,
}

/// Unlock state derived from a student's latest finished attempt.
/// `NoAttempts` is distinct from `Locked` so the empty state renders
/// differently from an imperfect score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockStatus {
    NoAttempts,
    Locked,
    Unlocked,
}

impl UnlockStatus {
    pub fn unlocked(self) -> bool {
        matches!(self, UnlockStatus::Unlocked)
    }
}

/// Verifies the 15+15 shape of the question bank.
///
/// The bank is validated on every assembly call even though seeding
/// guarantees the shape; a malformed bank must never reach a student.
pub fn validate_bank(bank: &[Question]) -> Result<(), AppError> {
    let mut fund = 0usize;
    let mut norm = 0usize;
    let mut seen = HashSet::new();

    for q in bank {
        if !seen.insert(q.quiz_id) {
            return Err(AppError::BankIntegrity(format!(
                "duplicate question id {} in bank",
                q.quiz_id
            )));
        }
        if q.options.0.len() != OPTIONS_PER_QUESTION {
            return Err(AppError::BankIntegrity(format!(
                "question {} has {} options, expected {}",
                q.quiz_id,
                q.options.0.len(),
                OPTIONS_PER_QUESTION
            )));
        }
        if !q.options.0.iter().any(|o| o == &q.correct_text) {
            return Err(AppError::BankIntegrity(format!(
                "correct answer of question {} is not among its options",
                q.quiz_id
            )));
        }
        match q.two_category.as_str() {
            TOPIC_FUNDAMENTALS => fund += 1,
            TOPIC_NORMALIZATION => norm += 1,
            other => {
                return Err(AppError::BankIntegrity(format!(
                    "question {} has unrecognized topic '{}'",
                    q.quiz_id, other
                )));
            }
        }
    }

    if fund != QUESTIONS_PER_TOPIC || norm != QUESTIONS_PER_TOPIC {
        return Err(AppError::BankIntegrity(format!(
            "expected {}+{} questions per topic, found {}+{}",
            QUESTIONS_PER_TOPIC, QUESTIONS_PER_TOPIC, fund, norm
        )));
    }

    Ok(())
}

/// Assembles one quiz paper: the full validated bank in shuffled order,
/// interleaving the topics. Callers pass a seeded RNG for deterministic
/// papers in tests.
pub fn assemble_paper<R: Rng + ?Sized>(
    bank: &[Question],
    rng: &mut R,
) -> Result<Vec<Question>, AppError> {
    validate_bank(bank)?;

    let mut paper: Vec<Question> = bank.to_vec();
    paper.shuffle(rng);
    Ok(paper)
}

/// Canonicalizes a raw choice to the option text.
///
/// A single letter A-D (case-insensitive) is resolved against the stored
/// option order; anything else must match one option text exactly.
pub fn normalize_choice(question: &Question, raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let options = &question.options.0;

    if trimmed.chars().count() == 1 {
        let letter = trimmed.chars().next().unwrap().to_ascii_uppercase();
        if letter.is_ascii_uppercase() {
            let idx = (letter as usize) - ('A' as usize);
            if idx < options.len() {
                return Ok(options[idx].clone());
            }
        }
        return Err(AppError::InvalidChoice(format!(
            "'{}' is not a valid option letter for question {}",
            trimmed, question.quiz_id
        )));
    }

    if let Some(text) = options.iter().find(|o| o.as_str() == trimmed) {
        return Ok(text.clone());
    }

    Err(AppError::InvalidChoice(format!(
        "answer for question {} matches none of its options",
        question.quiz_id
    )))
}

/// Grades a complete submission against the assembled question set.
///
/// All-or-nothing: a missing, duplicate, unknown or invalid answer fails
/// the whole submission and nothing is persisted by the caller.
pub fn grade_submission(
    bank: &[Question],
    answers: &[SubmittedAnswer],
) -> Result<GradedSubmission, AppError> {
    let questions: HashMap<i64, &Question> = bank.iter().map(|q| (q.quiz_id, q)).collect();

    let mut by_question: HashMap<i64, &SubmittedAnswer> = HashMap::new();
    for ans in answers {
        if !questions.contains_key(&ans.quiz_id) {
            return Err(AppError::NotFound(format!(
                "Question {} is not part of this quiz",
                ans.quiz_id
            )));
        }
        if by_question.insert(ans.quiz_id, ans).is_some() {
            return Err(AppError::BadRequest(format!(
                "duplicate answer for question {}",
                ans.quiz_id
            )));
        }
    }

    if by_question.len() != bank.len() {
        return Err(AppError::IncompleteSubmission(format!(
            "{} of {} questions answered",
            by_question.len(),
            bank.len()
        )));
    }

    let mut graded = Vec::with_capacity(bank.len());
    let mut items_correct = 0i64;
    let mut fund_correct = 0i64;
    let mut fund_total = 0i64;
    let mut norm_correct = 0i64;
    let mut norm_total = 0i64;

    // Grade in bank order so review rows line up with question ids.
    for question in bank {
        let ans = by_question[&question.quiz_id];
        let answer_text = normalize_choice(question, &ans.chosen)?;
        let is_correct = answer_text == question.correct_text;

        if is_correct {
            items_correct += 1;
        }
        if question.two_category == TOPIC_FUNDAMENTALS {
            fund_total += 1;
            if is_correct {
                fund_correct += 1;
            }
        } else {
            norm_total += 1;
            if is_correct {
                norm_correct += 1;
            }
        }

        graded.push(GradedAnswer {
            quiz_id: question.quiz_id,
            answer_text,
            is_correct,
            time_sec: ans.time_sec,
        });
    }

    let items_total = bank.len() as i64;
    Ok(GradedSubmission {
        answers: graded,
        items_total,
        items_correct,
        score_pct: pct(items_correct, items_total),
        topics: TopicScores {
            fund_correct,
            fund_total,
            norm_correct,
            norm_total,
        },
    })
}

/// The gating decision: only the latest finished attempt counts, and both
/// topics must be perfect. Earlier attempts are irrelevant, so a regression
/// on a later attempt re-locks progression.
pub fn evaluate_unlock(latest: Option<&TopicScores>) -> UnlockStatus {
    match latest {
        None => UnlockStatus::NoAttempts,
        Some(topics) if topics.fund_pct() == 100.0 && topics.norm_pct() == 100.0 => {
            UnlockStatus::Unlocked
        }
        Some(_) => UnlockStatus::Locked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QUIZ_TOTAL_QUESTIONS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sqlx::types::Json;

    fn question(id: i64, topic: &str, correct: usize) -> Question {
        let options = vec![
            "Alpha".to_string(),
            "Beta".to_string(),
            "Gamma".to_string(),
            "Delta".to_string(),
        ];
        Question {
            quiz_id: id,
            question: format!("Question {}", id),
            two_category: topic.to_string(),
            correct_text: options[correct].clone(),
            options: Json(options),
            explanation: String::new(),
        }
    }

    /// 30 questions: ids 1-15 fundamentals, 16-30 normalization,
    /// correct answer always "Alpha".
    fn bank() -> Vec<Question> {
        let mut bank = Vec::new();
        for id in 1..=15 {
            bank.push(question(id, TOPIC_FUNDAMENTALS, 0));
        }
        for id in 16..=30 {
            bank.push(question(id, TOPIC_NORMALIZATION, 0));
        }
        bank
    }

    fn answers_all(bank: &[Question], chosen: impl Fn(&Question) -> String) -> Vec<SubmittedAnswer> {
        bank.iter()
            .map(|q| SubmittedAnswer {
                quiz_id: q.quiz_id,
                chosen: chosen(q),
                time_sec: 10.0,
            })
            .collect()
    }

    #[test]
    fn assembly_is_30_unique_questions_15_per_topic() {
        let bank = bank();
        let paper = assemble_paper(&bank, &mut rand::thread_rng()).unwrap();

        assert_eq!(paper.len(), QUIZ_TOTAL_QUESTIONS);
        let ids: HashSet<i64> = paper.iter().map(|q| q.quiz_id).collect();
        assert_eq!(ids.len(), QUIZ_TOTAL_QUESTIONS);

        let fund = paper
            .iter()
            .filter(|q| q.two_category == TOPIC_FUNDAMENTALS)
            .count();
        assert_eq!(fund, QUESTIONS_PER_TOPIC);
        assert_eq!(paper.len() - fund, QUESTIONS_PER_TOPIC);
    }

    #[test]
    fn assembly_is_deterministic_with_a_seeded_rng() {
        let bank = bank();
        let first = assemble_paper(&bank, &mut StdRng::seed_from_u64(7)).unwrap();
        let second = assemble_paper(&bank, &mut StdRng::seed_from_u64(7)).unwrap();

        let first_ids: Vec<i64> = first.iter().map(|q| q.quiz_id).collect();
        let second_ids: Vec<i64> = second.iter().map(|q| q.quiz_id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn assembly_rejects_an_unbalanced_bank() {
        let mut bank = bank();
        bank[0].two_category = TOPIC_NORMALIZATION.to_string(); // 14 + 16

        let err = assemble_paper(&bank, &mut rand::thread_rng()).unwrap_err();
        assert!(matches!(err, AppError::BankIntegrity(_)));
    }

    #[test]
    fn assembly_rejects_an_unknown_topic() {
        let mut bank = bank();
        bank[3].two_category = "Query Optimization".to_string();

        let err = assemble_paper(&bank, &mut rand::thread_rng()).unwrap_err();
        assert!(matches!(err, AppError::BankIntegrity(_)));
    }

    #[test]
    fn assembly_rejects_a_short_bank() {
        let mut bank = bank();
        bank.pop();

        let err = assemble_paper(&bank, &mut rand::thread_rng()).unwrap_err();
        assert!(matches!(err, AppError::BankIntegrity(_)));
    }

    #[test]
    fn normalize_accepts_letters_and_option_text() {
        let q = question(1, TOPIC_FUNDAMENTALS, 1);

        assert_eq!(normalize_choice(&q, "B").unwrap(), "Beta");
        assert_eq!(normalize_choice(&q, "b").unwrap(), "Beta");
        assert_eq!(normalize_choice(&q, " Beta ").unwrap(), "Beta");
        assert_eq!(normalize_choice(&q, "Delta").unwrap(), "Delta");
    }

    #[test]
    fn normalize_rejects_out_of_range_letters_and_foreign_text() {
        let q = question(1, TOPIC_FUNDAMENTALS, 0);

        assert!(matches!(
            normalize_choice(&q, "E").unwrap_err(),
            AppError::InvalidChoice(_)
        ));
        assert!(matches!(
            normalize_choice(&q, "Epsilon").unwrap_err(),
            AppError::InvalidChoice(_)
        ));
        assert!(matches!(
            normalize_choice(&q, "").unwrap_err(),
            AppError::InvalidChoice(_)
        ));
    }

    #[test]
    fn grading_a_perfect_submission_unlocks() {
        let bank = bank();
        let answers = answers_all(&bank, |q| q.correct_text.clone());

        let graded = grade_submission(&bank, &answers).unwrap();
        assert_eq!(graded.items_correct, 30);
        assert_eq!(graded.score_pct, 100.0);
        assert_eq!(graded.topics.fund_pct(), 100.0);
        assert_eq!(graded.topics.norm_pct(), 100.0);
        assert_eq!(
            evaluate_unlock(Some(&graded.topics)),
            UnlockStatus::Unlocked
        );
    }

    #[test]
    fn one_wrong_fundamentals_answer_locks_at_93_3() {
        let bank = bank();
        let answers = answers_all(&bank, |q| {
            if q.quiz_id == 1 {
                "Beta".to_string() // wrong, correct is Alpha
            } else {
                q.correct_text.clone()
            }
        });

        let graded = grade_submission(&bank, &answers).unwrap();
        assert_eq!(graded.items_correct, 29);
        assert_eq!(graded.score_pct, 96.7);
        assert_eq!(graded.topics.fund_pct(), 93.3);
        assert_eq!(graded.topics.norm_pct(), 100.0);
        assert_eq!(evaluate_unlock(Some(&graded.topics)), UnlockStatus::Locked);
    }

    #[test]
    fn letter_choices_grade_like_their_option_text() {
        let bank = bank();
        // Correct answer is always the first option, so "A" everywhere.
        let answers = answers_all(&bank, |_| "A".to_string());

        let graded = grade_submission(&bank, &answers).unwrap();
        assert_eq!(graded.score_pct, 100.0);
    }

    #[test]
    fn missing_answers_fail_as_incomplete() {
        let bank = bank();
        let mut answers = answers_all(&bank, |q| q.correct_text.clone());
        answers.pop();

        let err = grade_submission(&bank, &answers).unwrap_err();
        assert!(matches!(err, AppError::IncompleteSubmission(_)));
    }

    #[test]
    fn duplicate_answers_are_rejected() {
        let bank = bank();
        let mut answers = answers_all(&bank, |q| q.correct_text.clone());
        answers[1].quiz_id = answers[0].quiz_id;

        let err = grade_submission(&bank, &answers).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn unknown_question_ids_are_rejected() {
        let bank = bank();
        let mut answers = answers_all(&bank, |q| q.correct_text.clone());
        answers[0].quiz_id = 999;

        let err = grade_submission(&bank, &answers).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn an_invalid_choice_fails_the_whole_submission() {
        let bank = bank();
        let mut answers = answers_all(&bank, |q| q.correct_text.clone());
        answers[4].chosen = "E".to_string();

        let err = grade_submission(&bank, &answers).unwrap_err();
        assert!(matches!(err, AppError::InvalidChoice(_)));
    }

    #[test]
    fn no_attempts_is_not_locked() {
        let status = evaluate_unlock(None);
        assert_eq!(status, UnlockStatus::NoAttempts);
        assert!(!status.unlocked());
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        assert_eq!(pct(14, 15), 93.3);
        assert_eq!(pct(29, 30), 96.7);
        assert_eq!(pct(0, 0), 0.0);
        assert_eq!(round1(100.0), 100.0);
    }
}
