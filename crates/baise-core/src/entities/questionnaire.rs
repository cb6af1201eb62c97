use std::collections::{BTreeSet, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{PersonnelRef, Project};
use crate::enums::{EntityKind, PersonnelRole, QuestionnaireOutcome};
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// A qualification quiz gating personnel eligibility for a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub project_id: Option<Ref<Project>>,
    #[serde(default)]
    pub required_personnels: Vec<PersonnelRole>,
    /// Minimum percentage score to pass. Every attempt passes when unset.
    pub pass_score: Option<f64>,
    /// Retakes allowed after the first attempt. Unlimited when unset.
    pub retakes_limit: Option<u32>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Questionnaire {
    #[must_use]
    pub fn new(project_id: Option<Ref<Project>>) -> Self {
        Self {
            id: ObjectId::new(),
            project_id,
            required_personnels: Vec::new(),
            pass_score: None,
            retakes_limit: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }

    /// Whether staff in `role` must take this questionnaire.
    #[must_use]
    pub fn requires(&self, role: PersonnelRole) -> bool {
        self.required_personnels.contains(&role)
    }

    #[must_use]
    pub fn outcome_for(&self, percentage_score: f64) -> QuestionnaireOutcome {
        self.pass_score.map_or(QuestionnaireOutcome::Passed, |pass| {
            QuestionnaireOutcome::from_score(percentage_score, pass)
        })
    }

    /// Whether another attempt is allowed after `previous_attempts`.
    #[must_use]
    pub fn allows_attempt(&self, previous_attempts: usize) -> bool {
        self.retakes_limit.is_none_or(|retakes| {
            previous_attempts <= usize::try_from(retakes).unwrap_or(usize::MAX)
        })
    }
}

impl_entity!(Questionnaire, EntityKind::Questionnaire, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        self.project_id.map(Ref::target).into_iter().collect()
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        match self.pass_score {
            Some(score) if !(0.0..=100.0).contains(&score) => Err(CoreError::Validation(
                format!("passScore {score} is outside 0..=100"),
            )),
            _ => Ok(()),
        }
    }
});

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// One multiple-choice question. A question may have several correct options.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireQuestions {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub questionnaire_id: Ref<Questionnaire>,
    pub question_serial_number: Option<u32>,
    pub question: Option<String>,
    #[serde(default)]
    pub correct_option: Vec<String>,
    #[serde(default)]
    pub question_options: Vec<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl QuestionnaireQuestions {
    #[must_use]
    pub fn new(questionnaire_id: Ref<Questionnaire>, question: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            questionnaire_id,
            question_serial_number: None,
            question: Some(question.into()),
            correct_option: Vec::new(),
            question_options: Vec::new(),
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }

    /// An answer is correct when it selects exactly the correct options,
    /// in any order.
    #[must_use]
    pub fn is_correct<S: AsRef<str>>(&self, answer: &[S]) -> bool {
        let chosen: BTreeSet<&str> = answer.iter().map(|s| s.as_ref()).collect();
        let expected: BTreeSet<&str> = self.correct_option.iter().map(String::as_str).collect();
        !expected.is_empty() && chosen == expected
    }
}

impl_entity!(QuestionnaireQuestions, EntityKind::QuestionnaireQuestions, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        vec![self.questionnaire_id.target()]
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        if self.question_options.is_empty() {
            return Ok(());
        }
        match self
            .correct_option
            .iter()
            .find(|opt| !self.question_options.contains(opt))
        {
            Some(opt) => Err(CoreError::Validation(format!(
                "correct option '{opt}' is not among the question options"
            ))),
            None => Ok(()),
        }
    }
});

/// Percentage of `questions` answered correctly. Answers are keyed by
/// question id; a missing answer counts as wrong.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_answers(
    questions: &[QuestionnaireQuestions],
    answers: &HashMap<ObjectId, Vec<String>>,
) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| q.is_correct(a.as_slice())))
        .count();
    correct as f64 * 100.0 / questions.len() as f64
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A graded questionnaire attempt by one staff member.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResult {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub questionnaire_id: Ref<Questionnaire>,
    pub project_id: Option<Ref<Project>>,
    #[serde(flatten)]
    pub personnel: PersonnelRef,
    pub personnel_email: Option<String>,
    pub percentage_score: f64,
    pub status: QuestionnaireOutcome,
    pub questionnaire_completion_timestamp: Option<EpochMillis>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl QuestionnaireResult {
    /// Grade an attempt against `questionnaire`'s pass score.
    #[must_use]
    pub fn grade(
        questionnaire: &Questionnaire,
        personnel: PersonnelRef,
        percentage_score: f64,
        now: EpochMillis,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            questionnaire_id: Ref::new(questionnaire.id),
            project_id: questionnaire.project_id,
            personnel,
            personnel_email: None,
            percentage_score,
            status: questionnaire.outcome_for(percentage_score),
            questionnaire_completion_timestamp: Some(now),
            timestamps: Timestamps::at(now),
        }
    }
}

impl_entity!(QuestionnaireResult, EntityKind::QuestionnaireResult, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        std::iter::once(self.questionnaire_id.target())
            .chain(self.project_id.map(Ref::target))
            .chain(std::iter::once(self.personnel.target()))
            .collect()
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        if (0.0..=100.0).contains(&self.percentage_score) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "percentageScore {} is outside 0..=100",
                self.percentage_score
            )))
        }
    }
});
