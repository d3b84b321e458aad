//! Heuristic scoring of a formal customer email

use std::path::Path;

use async_trait::async_trait;
use evalbench_core::utils::word_count;
use evalbench_core::{BenchResult, ResultExt};

use super::{EvaluationResult, Evaluator, SCORE_TOTAL};
use crate::tasks::Case;

const OUTPUT_FILE: &str = "output.txt";
const GREETING_CUES: &[&str] = &["cordial saludo", "estimad"];
const CLOSING_CUES: &[&str] = &["atentamente", "cordialmente"];
const MIN_WORDS: usize = 120;
const MAX_WORDS: usize = 220;

/// Checks four independent criteria: a greeting cue, a closing cue, the
/// case's literal `new_date` and a 120-220 word length.
///
/// Three or more criteria score 2, exactly two score 1, otherwise 0. Any
/// non-zero score passes.
#[derive(Debug, Clone, Default)]
pub struct FormalEmailEvaluator;

/// Individual criteria outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailCriteria {
    pub greeting: bool,
    pub closing: bool,
    pub date: bool,
    pub words: usize,
}

impl EmailCriteria {
    pub fn check(text: &str, new_date: Option<&str>) -> Self {
        let text = text.trim();
        let lower = text.to_lowercase();
        Self {
            greeting: GREETING_CUES.iter().any(|cue| lower.contains(cue)),
            closing: CLOSING_CUES.iter().any(|cue| lower.contains(cue)),
            date: new_date.is_some_and(|date| text.contains(date)),
            words: word_count(text),
        }
    }

    pub fn length_ok(&self) -> bool {
        (MIN_WORDS..=MAX_WORDS).contains(&self.words)
    }

    /// Number of criteria met, 0 to 4
    pub fn met(&self) -> usize {
        [self.greeting, self.closing, self.date, self.length_ok()]
            .iter()
            .filter(|ok| **ok)
            .count()
    }

    /// Criteria count folded onto the 0-2 scale
    pub fn score_total(&self) -> f64 {
        match self.met() {
            3.. => 2.0,
            2 => 1.0,
            _ => 0.0,
        }
    }
}

impl FormalEmailEvaluator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Evaluator for FormalEmailEvaluator {
    fn name(&self) -> &str {
        "formal_email"
    }

    async fn evaluate(
        &self,
        case: &Case,
        model_output: &str,
        workdir: &Path,
    ) -> BenchResult<EvaluationResult> {
        tokio::fs::create_dir_all(workdir).await.with_path(workdir)?;
        let output_path = workdir.join(OUTPUT_FILE);
        tokio::fs::write(&output_path, model_output)
            .await
            .with_path(&output_path)?;

        let criteria = EmailCriteria::check(model_output, case.get_str("new_date"));
        let total = criteria.score_total();
        let tone = if criteria.greeting && criteria.closing { 1.0 } else { 0.0 };

        Ok(EvaluationResult::new(total >= 1.0)
            .with_score("tone_formality", tone)
            .with_score("requirements", total)
            .with_score(SCORE_TOTAL, total)
            .with_notes(format!(
                "wc={}, saludo={}, cierre={}, fecha={}",
                criteria.words, criteria.greeting, criteria.closing, criteria.date
            )))
    }
}
