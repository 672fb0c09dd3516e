//! Bundled four-stage clinical workflow
//!
//! interview → structuring → diagnostic synthesis → report drafting.
//!
//! The interview stage keeps asking until the question budget trips (or the
//! bank runs out). The remaining stages are deterministic text processing over
//! the transcript; their output is labelled as screening material for a
//! clinician, never as a diagnosis.

use futures::future::BoxFuture;

use crate::error::Result;

use super::{InterviewWorkflow, Interviewer, NO_RESPONSE};

/// Answers shorter than this get one follow-up question
const SHORT_ANSWER_CHARS: usize = 4;

const FOLLOW_UP: &str = "Could you tell me a little more about that?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Domain {
    Presenting,
    History,
    Mood,
    Anxiety,
    Sleep,
    Appetite,
    Substances,
    Risk,
    Functioning,
    Support,
    Medical,
    Goals,
}

impl Domain {
    const fn title(self) -> &'static str {
        match self {
            Self::Presenting => "Presenting complaint",
            Self::History => "History of the problem",
            Self::Mood => "Mood",
            Self::Anxiety => "Anxiety",
            Self::Sleep => "Sleep",
            Self::Appetite => "Appetite and energy",
            Self::Substances => "Substance use",
            Self::Risk => "Risk assessment",
            Self::Functioning => "Daily functioning",
            Self::Support => "Support network",
            Self::Medical => "Medical and treatment history",
            Self::Goals => "Expectations",
        }
    }
}

struct QuestionTemplate {
    domain: Domain,
    text: &'static str,
}

const QUESTION_BANK: &[QuestionTemplate] = &[
    QuestionTemplate {
        domain: Domain::Presenting,
        text: "You mentioned {topic}. In your own words, what brings you here today?",
    },
    QuestionTemplate {
        domain: Domain::History,
        text: "When did this start, and has it changed over time?",
    },
    QuestionTemplate {
        domain: Domain::Mood,
        text: "How would you describe your mood over the last two weeks?",
    },
    QuestionTemplate {
        domain: Domain::Anxiety,
        text: "Do you often feel worried, tense or on edge? In which situations?",
    },
    QuestionTemplate {
        domain: Domain::Sleep,
        text: "How are you sleeping: falling asleep, waking at night, feeling rested?",
    },
    QuestionTemplate {
        domain: Domain::Appetite,
        text: "Have you noticed changes in your appetite, weight or energy?",
    },
    QuestionTemplate {
        domain: Domain::Functioning,
        text: "How is {topic} affecting your work, studies or daily activities?",
    },
    QuestionTemplate {
        domain: Domain::Substances,
        text: "Do you use alcohol, cannabis or other substances, and has that changed recently?",
    },
    QuestionTemplate {
        domain: Domain::Risk,
        text: "Have you had thoughts of harming yourself or that life is not worth living?",
    },
    QuestionTemplate {
        domain: Domain::Support,
        text: "Who can you rely on for support at the moment?",
    },
    QuestionTemplate {
        domain: Domain::Medical,
        text: "Have you had any previous psychiatric care, medication or relevant medical conditions?",
    },
    QuestionTemplate {
        domain: Domain::Goals,
        text: "What would you most like to change or get help with?",
    },
];

struct Signal {
    label: &'static str,
    keywords: &'static [&'static str],
}

const SIGNALS: &[Signal] = &[
    Signal {
        label: "Sleep disturbance",
        keywords: &["sleep", "insomnia", "awake", "nightmare", "sommeil", "dors"],
    },
    Signal {
        label: "Anxiety symptoms",
        keywords: &["anxious", "anxiety", "worr", "nervous", "panic", "stress", "tense", "angoiss"],
    },
    Signal {
        label: "Depressive symptoms",
        keywords: &[
            "sad",
            "depress",
            "hopeless",
            "empty",
            "cry",
            "no energy",
            "exhausted",
            "triste",
        ],
    },
    Signal {
        label: "Substance use",
        keywords: &["alcohol", "drink", "cannabis", "drug", "alcool"],
    },
    Signal {
        label: "Trauma-related symptoms",
        keywords: &["trauma", "accident", "abuse", "flashback", "assault"],
    },
];

const RISK_KEYWORDS: &[&str] = &[
    "suicid",
    "kill myself",
    "end my life",
    "self-harm",
    "hurt myself",
    "harm myself",
    "not worth living",
];

#[derive(Debug, Clone)]
struct Exchange {
    domain: Domain,
    question: String,
    answer: String,
}

impl Exchange {
    fn answered(&self) -> bool {
        self.answer != NO_RESPONSE && !self.answer.trim().is_empty()
    }
}

struct ClinicalRecord {
    sections: Vec<(Domain, Vec<String>)>,
    unanswered: usize,
}

struct Synthesis {
    observations: Vec<&'static str>,
    risk_flag: bool,
}

/// Deterministic interview → structuring → synthesis → report pipeline
#[derive(Debug, Clone, Default)]
pub struct ClinicalInterviewWorkflow;

impl ClinicalInterviewWorkflow {
    /// Create the workflow
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn interview(&self, topic: &str, interviewer: &Interviewer) -> Result<Vec<Exchange>> {
        let mut exchanges = Vec::new();

        for template in QUESTION_BANK {
            let question = template.text.replace("{topic}", topic);
            let Some(answer) = ask_or_conclude(interviewer, &question).await? else {
                return Ok(exchanges);
            };
            let needs_follow_up =
                answer == NO_RESPONSE || answer.trim().chars().count() < SHORT_ANSWER_CHARS;
            exchanges.push(Exchange {
                domain: template.domain,
                question,
                answer,
            });

            if needs_follow_up {
                let Some(answer) = ask_or_conclude(interviewer, FOLLOW_UP).await? else {
                    return Ok(exchanges);
                };
                exchanges.push(Exchange {
                    domain: template.domain,
                    question: FOLLOW_UP.to_string(),
                    answer,
                });
            }
        }

        Ok(exchanges)
    }
}

/// `Ok(None)` when the question budget says to stop
async fn ask_or_conclude(interviewer: &Interviewer, question: &str) -> Result<Option<String>> {
    match interviewer.ask(question).await {
        Ok(answer) => Ok(Some(answer)),
        Err(e) if e.is_budget_exceeded() => {
            log::info!("[{}] Budget reached, drafting report", interviewer.session_id());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn structure(exchanges: &[Exchange]) -> ClinicalRecord {
    let mut sections: Vec<(Domain, Vec<String>)> = Vec::new();
    let mut unanswered = 0;

    for exchange in exchanges {
        if !exchange.answered() {
            unanswered += 1;
            continue;
        }
        let answer = exchange.answer.trim().to_string();
        match sections.iter_mut().find(|(domain, _)| *domain == exchange.domain) {
            Some((_, answers)) => answers.push(answer),
            None => sections.push((exchange.domain, vec![answer])),
        }
    }
    sections.sort_by_key(|(domain, _)| *domain);

    ClinicalRecord {
        sections,
        unanswered,
    }
}

fn is_denial(answer: &str) -> bool {
    let lower = answer.trim_start().to_lowercase();
    ["no", "never", "non", "jamais", "not really"].iter().any(|neg| {
        lower
            .strip_prefix(neg)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', ',', '.', '!']))
    })
}

fn synthesize(topic: &str, record: &ClinicalRecord) -> Synthesis {
    let corpus: Vec<String> = record
        .sections
        .iter()
        .flat_map(|(_, answers)| answers.iter())
        .filter(|answer| !is_denial(answer))
        .map(|answer| answer.to_lowercase())
        .collect();
    let topic = topic.to_lowercase();

    let observations = SIGNALS
        .iter()
        .filter(|signal| {
            signal.keywords.iter().any(|keyword| {
                topic.contains(keyword) || corpus.iter().any(|answer| answer.contains(keyword))
            })
        })
        .map(|signal| signal.label)
        .collect();

    let risk_flag = corpus
        .iter()
        .any(|answer| RISK_KEYWORDS.iter().any(|keyword| answer.contains(keyword)));

    Synthesis {
        observations,
        risk_flag,
    }
}

fn draft_report(
    topic: &str,
    exchanges: &[Exchange],
    record: &ClinicalRecord,
    synthesis: &Synthesis,
) -> String {
    let mut report = String::new();

    report.push_str("# Reason for consultation\n\n");
    report.push_str(&format!("**Topic raised by the patient:** {topic}\n\n"));
    report.push_str(&format!(
        "Structured interview of {} question(s); {} left unanswered.\n\n",
        exchanges.len(),
        record.unanswered
    ));

    report.push_str("# Clinical findings\n\n");
    if record.sections.is_empty() {
        report.push_str("No usable answers were collected during the interview.\n\n");
    }
    for (domain, answers) in &record.sections {
        report.push_str(&format!("## {}\n\n", domain.title()));
        for answer in answers {
            report.push_str(&format!("- {answer}\n"));
        }
        report.push('\n');
    }

    report.push_str("# Screening observations\n\n");
    if synthesis.observations.is_empty() {
        report.push_str("No specific symptom cluster stood out from the answers.\n\n");
    } else {
        for (idx, label) in synthesis.observations.iter().enumerate() {
            report.push_str(&format!("{}. {label}\n", idx + 1));
        }
        report.push('\n');
    }
    report.push_str(
        "*These observations are hypotheses drawn from self-report and must be confirmed by a clinician.*\n\n",
    );

    report.push_str("# Recommendations\n\n");
    if synthesis.risk_flag {
        report.push_str(
            "- **Priority:** the patient reported thoughts of self-harm; arrange an urgent clinical assessment.\n",
        );
    }
    report.push_str("- Review this summary with a mental health professional.\n");
    if !synthesis.observations.is_empty() {
        report.push_str("- Explore the screening observations above in a full clinical interview.\n");
    }
    if record.unanswered > 0 {
        report.push_str("- Revisit the unanswered questions at the next appointment.\n");
    }

    report
}

impl InterviewWorkflow for ClinicalInterviewWorkflow {
    fn run<'a>(
        &'a self,
        topic: &'a str,
        interviewer: &'a Interviewer,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let exchanges = self.interview(topic, interviewer).await?;
            log::debug!(
                "[{}] Interview stage done with {} exchange(s)",
                interviewer.session_id(),
                exchanges.len()
            );

            let record = structure(&exchanges);
            let synthesis = synthesize(topic, &record);
            Ok(draft_report(topic, &exchanges, &record, &synthesis))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetGuard;
    use crate::error::InterviewError;
    use crate::types::SessionId;
    use crate::workflow::AnswerSource;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct ScriptedSource {
        budget: BudgetGuard,
        turns: Mutex<u32>,
        answers: Vec<&'static str>,
        asked: Mutex<Vec<String>>,
    }

    impl AnswerSource for ScriptedSource {
        fn ask<'a>(&'a self, question: &'a str) -> BoxFuture<'a, Result<String>> {
            Box::pin(async move {
                let mut turns = self.turns.lock().await;
                let turn = self.budget.record_turn(&mut turns)?;
                self.asked.lock().await.push(question.to_string());
                Ok(self
                    .answers
                    .get(turn as usize - 1)
                    .copied()
                    .unwrap_or("I am not sure")
                    .to_string())
            })
        }
    }

    fn interviewer(source: Arc<ScriptedSource>) -> Interviewer {
        Interviewer::new(SessionId::new("test-session"), source)
    }

    #[tokio::test]
    async fn stops_at_budget_and_reports() {
        let source = Arc::new(ScriptedSource {
            budget: BudgetGuard::new(10),
            turns: Mutex::new(0),
            answers: vec!["I sleep poorly and worry all the time"; 10],
            asked: Mutex::new(Vec::new()),
        });

        let report = ClinicalInterviewWorkflow::new()
            .run("Generalized anxiety", &interviewer(source.clone()))
            .await
            .unwrap();

        assert_eq!(source.asked.lock().await.len(), 10);
        assert!(report.contains("# Clinical findings"));
        assert!(report.contains("Anxiety symptoms"));
        assert!(report.contains("Sleep disturbance"));
        assert!(report.contains("Generalized anxiety"));
    }

    #[tokio::test]
    async fn short_answer_gets_follow_up() {
        let source = Arc::new(ScriptedSource {
            budget: BudgetGuard::new(3),
            turns: Mutex::new(0),
            answers: vec!["ok", "It started in spring after I changed jobs", "fine"],
            asked: Mutex::new(Vec::new()),
        });

        ClinicalInterviewWorkflow::new()
            .run("Insomnia", &interviewer(source.clone()))
            .await
            .unwrap();

        let asked = source.asked.lock().await;
        assert_eq!(asked[1], FOLLOW_UP);
        assert!(asked[0].contains("Insomnia"));
    }

    #[tokio::test]
    async fn risk_statement_is_prioritised() {
        let source = Arc::new(ScriptedSource {
            budget: BudgetGuard::new(1),
            turns: Mutex::new(0),
            answers: vec!["Sometimes I think about suicide"],
            asked: Mutex::new(Vec::new()),
        });

        let report = ClinicalInterviewWorkflow::new()
            .run("Low mood", &interviewer(source))
            .await
            .unwrap();
        assert!(report.contains("**Priority:**"));
    }

    #[test]
    fn denials_do_not_raise_signals() {
        let exchanges = vec![Exchange {
            domain: Domain::Risk,
            question: "Thoughts of harming yourself?".into(),
            answer: "No, never thought about suicide".into(),
        }];
        let record = structure(&exchanges);
        let synthesis = synthesize("Checkup", &record);
        assert!(!synthesis.risk_flag);
    }

    #[test]
    fn unanswered_exchanges_are_counted() {
        let exchanges = vec![
            Exchange {
                domain: Domain::Mood,
                question: "Mood?".into(),
                answer: NO_RESPONSE.into(),
            },
            Exchange {
                domain: Domain::Mood,
                question: "Mood?".into(),
                answer: "Low most days".into(),
            },
        ];
        let record = structure(&exchanges);
        assert_eq!(record.unanswered, 1);
        assert_eq!(record.sections.len(), 1);
    }

    #[tokio::test]
    async fn other_errors_propagate() {
        struct Broken;
        impl AnswerSource for Broken {
            fn ask<'a>(&'a self, _question: &'a str) -> BoxFuture<'a, Result<String>> {
                Box::pin(async { Err(InterviewError::ChannelClosed) })
            }
        }

        let interviewer = Interviewer::new(SessionId::new("s"), Arc::new(Broken));
        let result = ClinicalInterviewWorkflow::new().run("x", &interviewer).await;
        assert!(matches!(result, Err(InterviewError::ChannelClosed)));
    }
}
